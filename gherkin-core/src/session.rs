//! Editing session
//!
//!     A [`Session`] owns everything one user edits: the scenario type, the statement
//!     slots of each clause, the saved [`Draft`], and the current example table. There
//!     is no shared or global state; each user gets a fresh `Session` and drops it when
//!     done. Catalogs are shared read-only through an `Arc`.
//!
//!     Every user action is one [`SessionEvent`]. Applying an event recomputes only what
//!     it can affect:
//!
//!     - statement edits recompute that slot's correction, then the scenario text and
//!       tags. Slots of a clause the scenario type does not use change nothing else.
//!     - the example table is reconciled only when the tag list actually changed. No
//!       tags means no table. Otherwise the table keeps the requested column count
//!       (all tags until the user picks one), capped at the number of tags. A table
//!       whose columns and row count already match is left alone.
//!     - draft events touch the draft (and, on restore, the slots) only.
//!
//!     A rejected event leaves the session as it was.

use crate::catalog::Vocabulary;
use crate::correction::{Corrector, Passthrough};
use crate::error::{GherkinError, Result};
use crate::render;
use crate::scenario::{self, ScenarioType};
use crate::statement::{ClauseKind, Statement};
use crate::table::{CellValue, ExampleTable, ResizePolicy};
use crate::tags::extract_tags;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Limits and policies a session runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub max_statements_per_clause: usize,
    pub resize_policy: ResizePolicy,
    pub default_rows: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            max_statements_per_clause: 10,
            resize_policy: ResizePolicy::Preserve,
            default_rows: 1,
        }
    }
}

/// One input slot: what was typed, its corrected form, and the keyword picked for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slot {
    pub raw_text: String,
    pub corrected_text: String,
    pub selection: Option<String>,
}

/// Saved raw text per clause, keyed by slot index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    given: BTreeMap<usize, String>,
    when: BTreeMap<usize, String>,
    then: BTreeMap<usize, String>,
}

impl Draft {
    pub fn clause(&self, clause: ClauseKind) -> &BTreeMap<usize, String> {
        match clause {
            ClauseKind::Given => &self.given,
            ClauseKind::When => &self.when,
            ClauseKind::Then => &self.then,
        }
    }

    fn clause_mut(&mut self, clause: ClauseKind) -> &mut BTreeMap<usize, String> {
        match clause {
            ClauseKind::Given => &mut self.given,
            ClauseKind::When => &mut self.when,
            ClauseKind::Then => &mut self.then,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.given.is_empty() && self.when.is_empty() && self.then.is_empty()
    }

    fn clear(&mut self) {
        self.given.clear();
        self.when.clear();
        self.then.clear();
    }
}

/// A single user action.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    ChangeScenarioType(ScenarioType),
    SetStatementCount {
        clause: ClauseKind,
        count: usize,
    },
    EditStatement {
        clause: ClauseKind,
        slot: usize,
        text: String,
    },
    /// `None` or an empty keyword clears the selection.
    SelectKeyword {
        clause: ClauseKind,
        slot: usize,
        keyword: Option<String>,
    },
    ResizeTable {
        columns: usize,
        rows: usize,
    },
    EditCell {
        row: usize,
        column: String,
        value: CellValue,
    },
    SaveDraft,
    ClearDraft,
    RestoreDraft,
}

pub struct Session {
    settings: SessionSettings,
    corrector: Box<dyn Corrector>,
    vocabulary: Arc<Vocabulary>,
    scenario_type: ScenarioType,
    slots: [Vec<Slot>; 3],
    draft: Draft,
    scenario_text: String,
    tags: Vec<String>,
    requested_columns: Option<usize>,
    requested_rows: usize,
    table: Option<ExampleTable>,
}

fn clause_index(clause: ClauseKind) -> usize {
    match clause {
        ClauseKind::Given => 0,
        ClauseKind::When => 1,
        ClauseKind::Then => 2,
    }
}

impl Session {
    /// Start a session with one empty slot per clause.
    pub fn new(
        settings: SessionSettings,
        corrector: Box<dyn Corrector>,
        vocabulary: Arc<Vocabulary>,
    ) -> Self {
        let requested_rows = settings.default_rows.max(1);
        let mut session = Session {
            settings,
            corrector,
            vocabulary,
            scenario_type: ScenarioType::default(),
            slots: [vec![Slot::default()], vec![Slot::default()], vec![Slot::default()]],
            draft: Draft::default(),
            scenario_text: String::new(),
            tags: Vec::new(),
            requested_columns: None,
            requested_rows,
            table: None,
        };
        session.scenario_text = session.assemble_current();
        session
    }

    /// A session with default settings, no correction and an empty vocabulary.
    pub fn plain() -> Self {
        Session::new(
            SessionSettings::default(),
            Box::new(Passthrough),
            Arc::new(Vocabulary::default()),
        )
    }

    pub fn apply(&mut self, event: SessionEvent) -> Result<()> {
        tracing::debug!(?event, "session event");
        match event {
            SessionEvent::ChangeScenarioType(scenario_type) => {
                self.set_scenario_type(scenario_type);
                Ok(())
            }
            SessionEvent::SetStatementCount { clause, count } => {
                self.set_statement_count(clause, count)
            }
            SessionEvent::EditStatement { clause, slot, text } => {
                self.edit_statement(clause, slot, text)
            }
            SessionEvent::SelectKeyword {
                clause,
                slot,
                keyword,
            } => self.select_keyword(clause, slot, keyword),
            SessionEvent::ResizeTable { columns, rows } => self.resize_table(columns, rows),
            SessionEvent::EditCell { row, column, value } => self.edit_cell(row, &column, value),
            SessionEvent::SaveDraft => {
                self.save_draft();
                Ok(())
            }
            SessionEvent::ClearDraft => {
                self.clear_draft();
                Ok(())
            }
            SessionEvent::RestoreDraft => {
                self.restore_draft();
                Ok(())
            }
        }
    }

    pub fn set_scenario_type(&mut self, scenario_type: ScenarioType) {
        if self.scenario_type != scenario_type {
            self.scenario_type = scenario_type;
            self.refresh();
        }
    }

    pub fn set_statement_count(&mut self, clause: ClauseKind, count: usize) -> Result<()> {
        let max = self.settings.max_statements_per_clause;
        if count == 0 || count > max {
            return Err(GherkinError::InvalidStatementCount { clause, count, max });
        }
        if clause == ClauseKind::When && count != 1 {
            return Err(GherkinError::InvalidScenarioShape {
                scenario: self.scenario_type,
                clause,
                count,
                reason: "exactly one is required",
            });
        }
        self.slots[clause_index(clause)].resize_with(count, Slot::default);
        if self.scenario_type.uses(clause) {
            self.refresh();
        }
        Ok(())
    }

    pub fn edit_statement(
        &mut self,
        clause: ClauseKind,
        slot: usize,
        text: impl Into<String>,
    ) -> Result<()> {
        let raw_text = text.into();
        let corrected_text = self.corrector.correct(&raw_text);
        let target = self.slot_mut(clause, slot)?;
        target.raw_text = raw_text;
        target.corrected_text = corrected_text;
        if self.scenario_type.uses(clause) {
            self.refresh();
        }
        Ok(())
    }

    pub fn select_keyword(
        &mut self,
        clause: ClauseKind,
        slot: usize,
        keyword: Option<String>,
    ) -> Result<()> {
        let keyword = keyword.filter(|k| !k.is_empty());
        if let Some(k) = &keyword {
            if !self.vocabulary.contains(k) {
                return Err(GherkinError::UnknownKeyword(k.clone()));
            }
        }
        self.slot_mut(clause, slot)?.selection = keyword;
        if self.scenario_type.uses(clause) {
            self.refresh();
        }
        Ok(())
    }

    pub fn resize_table(&mut self, columns: usize, rows: usize) -> Result<()> {
        let table = ExampleTable::resize(
            self.table.as_ref(),
            columns,
            rows,
            &self.tags,
            self.settings.resize_policy,
        )?;
        self.requested_columns = Some(columns);
        self.requested_rows = rows;
        self.table = Some(table);
        Ok(())
    }

    pub fn edit_cell(&mut self, row: usize, column: &str, value: impl Into<CellValue>) -> Result<()> {
        match self.table.as_mut() {
            Some(table) => table.edit(row, column, value),
            None => Err(GherkinError::OutOfBounds {
                row,
                column: column.to_string(),
                rows: 0,
                columns: Vec::new(),
            }),
        }
    }

    /// Snapshot the raw text of every slot, replacing any previous snapshot.
    pub fn save_draft(&mut self) {
        for clause in ClauseKind::ALL {
            let saved = self.slots[clause_index(clause)]
                .iter()
                .enumerate()
                .map(|(i, slot)| (i, slot.raw_text.clone()))
                .collect();
            *self.draft.clause_mut(clause) = saved;
        }
    }

    pub fn clear_draft(&mut self) {
        self.draft.clear();
    }

    /// Write the saved text back into the slots.
    ///
    /// Clauses grow to hold every saved slot, up to the statement limit. A restored text
    /// that is exactly a vocabulary keyword also restores the selection.
    pub fn restore_draft(&mut self) {
        if self.draft.is_empty() {
            return;
        }
        let max = self.settings.max_statements_per_clause;
        for clause in ClauseKind::ALL {
            let saved = self.draft.clause(clause).clone();
            let slots = &mut self.slots[clause_index(clause)];
            if clause != ClauseKind::When {
                if let Some(&last) = saved.keys().next_back() {
                    if last < max && last >= slots.len() {
                        slots.resize_with(last + 1, Slot::default);
                    }
                }
            }
            for (i, text) in saved {
                let Some(slot) = slots.get_mut(i) else {
                    continue;
                };
                slot.corrected_text = self.corrector.correct(&text);
                if self.vocabulary.contains(&text) {
                    slot.selection = Some(text.clone());
                }
                slot.raw_text = text;
            }
        }
        self.refresh();
    }

    pub fn scenario_type(&self) -> ScenarioType {
        self.scenario_type
    }

    pub fn scenario_text(&self) -> &str {
        &self.scenario_text
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn table(&self) -> Option<&ExampleTable> {
        self.table.as_ref()
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn slots(&self, clause: ClauseKind) -> &[Slot] {
        &self.slots[clause_index(clause)]
    }

    pub fn statement_count(&self, clause: ClauseKind) -> usize {
        self.slots(clause).len()
    }

    /// Corrected text of a slot, as shown next to its input.
    pub fn corrected(&self, clause: ClauseKind, slot: usize) -> Option<&str> {
        self.slots(clause)
            .get(slot)
            .map(|s| s.corrected_text.as_str())
    }

    /// The downloadable artifact.
    pub fn render(&self) -> String {
        render::render(&self.scenario_text, self.table.as_ref())
    }

    fn slot_mut(&mut self, clause: ClauseKind, slot: usize) -> Result<&mut Slot> {
        let slots = &mut self.slots[clause_index(clause)];
        let len = slots.len();
        slots.get_mut(slot).ok_or(GherkinError::SlotOutOfRange {
            clause,
            slot,
            slots: len,
        })
    }

    fn statements(&self, clause: ClauseKind) -> Vec<Statement> {
        if !self.scenario_type.uses(clause) {
            return Vec::new();
        }
        self.slots(clause)
            .iter()
            .enumerate()
            .map(|(i, slot)| Statement {
                clause,
                ordinal: i,
                raw_text: slot.raw_text.clone(),
                corrected_text: slot.corrected_text.clone(),
                vocabulary_selection: slot.selection.clone(),
            })
            .collect()
    }

    fn assemble_current(&self) -> String {
        let given = self.statements(ClauseKind::Given);
        let when = self.statements(ClauseKind::When);
        let then = self.statements(ClauseKind::Then);
        // Slot counts are validated on every change, so the shape always holds.
        scenario::assemble(self.scenario_type, &given, &when, &then).unwrap_or_default()
    }

    fn refresh(&mut self) {
        self.scenario_text = self.assemble_current();
        let tags = extract_tags(&self.scenario_text);
        if tags != self.tags {
            tracing::debug!(?tags, "tags changed");
            self.tags = tags;
            self.reconcile_table();
        }
    }

    fn reconcile_table(&mut self) {
        if self.tags.is_empty() {
            self.table = None;
            return;
        }
        let columns = self
            .requested_columns
            .unwrap_or(self.tags.len())
            .min(self.tags.len());
        if let Some(table) = &self.table {
            if table.columns() == &self.tags[..columns] && table.row_count() == self.requested_rows
            {
                return;
            }
        }
        self.table = ExampleTable::resize(
            self.table.as_ref(),
            columns,
            self.requested_rows,
            &self.tags,
            self.settings.resize_policy,
        )
        .ok();
    }
}
