//! Scenario description files
//!
//!     The CLI has no form to type into, so the statements come from a YAML (or JSON)
//!     file and are replayed into a [`Session`] as the events a user would produce:
//!
//!         type: SC
//!         given:
//!           - the battery is charged
//!           - keyword: ignition is on
//!         when:
//!           - the vehicle starts
//!         then:
//!           - the <indicator> light is <state>
//!         examples:
//!           columns: 2          # optional, defaults to every tag
//!           rows:
//!             - { indicator: "ON", state: lit }
//!
//!     A statement is either plain text or a map with `text` and/or `keyword`.

use anyhow::{bail, Context};
use gherkin_core::catalog::from_json_str;
use gherkin_core::scenario::validate_shape;
use gherkin_core::{CellValue, ClauseKind, ScenarioType, Session};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StatementEntry {
    Text(String),
    Detailed {
        #[serde(default)]
        text: String,
        #[serde(default)]
        keyword: Option<String>,
    },
}

impl StatementEntry {
    fn text(&self) -> &str {
        match self {
            StatementEntry::Text(text) => text,
            StatementEntry::Detailed { text, .. } => text,
        }
    }

    fn keyword(&self) -> Option<&str> {
        match self {
            StatementEntry::Text(_) => None,
            StatementEntry::Detailed { keyword, .. } => keyword.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExamplesEntry {
    #[serde(default)]
    pub columns: Option<usize>,
    #[serde(default)]
    pub row_count: Option<usize>,
    #[serde(default)]
    pub rows: Vec<BTreeMap<String, CellValue>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioFile {
    #[serde(rename = "type", default)]
    pub scenario_type: ScenarioType,
    #[serde(default)]
    pub given: Vec<StatementEntry>,
    #[serde(default)]
    pub when: Vec<StatementEntry>,
    #[serde(default)]
    pub then: Vec<StatementEntry>,
    #[serde(default)]
    pub examples: Option<ExamplesEntry>,
}

impl ScenarioFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let file = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => from_json_str(&source)
                .with_context(|| format!("invalid scenario file {}", path.display()))?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&source)
                .with_context(|| format!("invalid scenario file {}", path.display()))?,
            _ => bail!(
                "unsupported scenario file {} (expected .yaml, .yml or .json)",
                path.display()
            ),
        };
        Ok(file)
    }

    fn clause(&self, clause: ClauseKind) -> &[StatementEntry] {
        match clause {
            ClauseKind::Given => &self.given,
            ClauseKind::When => &self.when,
            ClauseKind::Then => &self.then,
        }
    }

    /// Replay this file into `session`.
    pub fn apply(&self, session: &mut Session) -> gherkin_core::Result<()> {
        validate_shape(
            self.scenario_type,
            self.given.len(),
            self.when.len(),
            self.then.len(),
        )?;
        session.set_scenario_type(self.scenario_type);

        for clause in ClauseKind::ALL {
            let entries = self.clause(clause);
            if entries.is_empty() {
                continue;
            }
            session.set_statement_count(clause, entries.len())?;
            for (slot, entry) in entries.iter().enumerate() {
                if !entry.text().is_empty() {
                    session.edit_statement(clause, slot, entry.text())?;
                }
                if let Some(keyword) = entry.keyword() {
                    session.select_keyword(clause, slot, Some(keyword.to_string()))?;
                }
            }
        }

        if let Some(examples) = &self.examples {
            let columns = examples.columns.unwrap_or(session.tags().len());
            let rows = examples.row_count.unwrap_or(examples.rows.len()).max(1);
            session.resize_table(columns, rows)?;
            for (row, cells) in examples.rows.iter().enumerate() {
                for (column, value) in cells {
                    session.edit_cell(row, column, value.clone())?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gherkin_core::GherkinError;

    fn parse(yaml: &str) -> ScenarioFile {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_apply_success_criteria() {
        let file = parse(
            r#"
type: SC
given:
  - the battery is charged
when:
  - text: the vehicle starts
then:
  - the <indicator> light is <state>
examples:
  rows:
    - { indicator: "ON", state: lit }
"#,
        );
        let mut session = Session::plain();
        file.apply(&mut session).unwrap();
        assert_eq!(session.tags(), &["indicator", "state"]);
        let table = session.table().unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.cell(0, "state"), Some(&CellValue::from("lit")));
        assert!(session.render().ends_with("|indicator|state |\n|ON       |lit   |"));
    }

    #[test]
    fn test_decimal_examples_keep_their_text() {
        let file = parse("given: ['<limit> at <speed>']\nexamples:\n  rows:\n    - { limit: 2.50, speed: 1.0 }\n");
        let mut session = Session::plain();
        file.apply(&mut session).unwrap();
        assert!(session.render().ends_with("|limit|speed |\n|2.50 |1.0  |"));
    }

    #[test]
    fn test_json_scenario_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.json");
        std::fs::write(
            &path,
            r#"{"given": ["<gear> selected"], "examples": {"columns": 1, "rows": [{"gear": "D"}]}}"#,
        )
        .unwrap();
        let file = ScenarioFile::load(&path).unwrap();
        let mut session = Session::plain();
        file.apply(&mut session).unwrap();
        assert!(session.render().ends_with("|gear |\n|D    |"));
    }

    #[test]
    fn test_dc_with_when_is_rejected() {
        let file = parse("type: DC\ngiven: [a]\nwhen: [b]\n");
        let err = file.apply(&mut Session::plain()).unwrap_err();
        assert!(matches!(err, GherkinError::InvalidScenarioShape { .. }));
    }

    #[test]
    fn test_examples_without_tags_are_rejected() {
        let file = parse("given: [plain]\nexamples:\n  rows:\n    - { a: 1 }\n");
        let err = file.apply(&mut Session::plain()).unwrap_err();
        assert!(matches!(err, GherkinError::InvalidTableShape { available: 0, .. }));
    }

    #[test]
    fn test_unknown_example_column_is_rejected() {
        let file = parse("given: ['<a>']\nexamples:\n  rows:\n    - { b: 1 }\n");
        let err = file.apply(&mut Session::plain()).unwrap_err();
        assert!(matches!(err, GherkinError::OutOfBounds { .. }));
    }
}
