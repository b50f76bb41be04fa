//! Statement composition
//!
//!     A statement line is the clause keyword (or `And` after the first statement of a
//!     clause) followed by exactly one space and the statement body. The body comes from
//!     the corrected text when it is non-empty (whitespace counts), otherwise from the
//!     vocabulary selection, otherwise it is empty. The body is trimmed afterwards, so a
//!     whitespace-only correction yields a bare keyword. An empty body still produces a
//!     line so that the number of lines always matches the number of input slots.
//!
//!     [`compose`] takes no raw text. The raw text only ever feeds correction, and its
//!     corrected form is what callers pass in.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Keyword used for every statement of a clause after the first one.
pub const AND: &str = "And";

/// The three Gherkin clause categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClauseKind {
    Given,
    When,
    Then,
}

impl ClauseKind {
    /// All clauses, in assembly order.
    pub const ALL: [ClauseKind; 3] = [ClauseKind::Given, ClauseKind::When, ClauseKind::Then];

    /// The keyword that opens this clause.
    pub fn keyword(self) -> &'static str {
        match self {
            ClauseKind::Given => "Given",
            ClauseKind::When => "When",
            ClauseKind::Then => "Then",
        }
    }

    /// Keyword for the statement at `ordinal` within this clause.
    pub fn keyword_for(self, ordinal: usize) -> &'static str {
        if ordinal == 0 {
            self.keyword()
        } else {
            AND
        }
    }
}

impl fmt::Display for ClauseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One input slot of the scenario form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub clause: ClauseKind,
    pub ordinal: usize,
    /// What the user typed. Only ever an input to correction.
    pub raw_text: String,
    pub corrected_text: String,
    pub vocabulary_selection: Option<String>,
}

impl Statement {
    pub fn new(clause: ClauseKind, ordinal: usize) -> Self {
        Statement {
            clause,
            ordinal,
            raw_text: String::new(),
            corrected_text: String::new(),
            vocabulary_selection: None,
        }
    }

    /// Set raw and corrected text together.
    pub fn with_text(mut self, raw: impl Into<String>, corrected: impl Into<String>) -> Self {
        self.raw_text = raw.into();
        self.corrected_text = corrected.into();
        self
    }

    pub fn with_selection(mut self, keyword: impl Into<String>) -> Self {
        self.vocabulary_selection = Some(keyword.into());
        self
    }

    /// The authoritative body before trimming.
    pub fn body(&self) -> &str {
        select_body(&self.corrected_text, self.vocabulary_selection.as_deref())
    }

    /// Render this statement as a canonical line.
    pub fn compose(&self) -> String {
        compose(
            self.clause,
            self.ordinal,
            &self.corrected_text,
            self.vocabulary_selection.as_deref(),
        )
    }
}

fn select_body<'a>(corrected_text: &'a str, vocabulary_selection: Option<&'a str>) -> &'a str {
    if !corrected_text.is_empty() {
        return corrected_text;
    }
    vocabulary_selection.unwrap_or_default()
}

/// Compose one statement line from its parts.
///
/// The raw text never reaches the output directly; callers pass its corrected form.
pub fn compose(
    clause: ClauseKind,
    ordinal: usize,
    corrected_text: &str,
    vocabulary_selection: Option<&str>,
) -> String {
    let body = select_body(corrected_text, vocabulary_selection).trim();
    format!("{} {}", clause.keyword_for(ordinal), body)
}
