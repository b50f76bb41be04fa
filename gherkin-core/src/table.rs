//! Example table model
//!
//!     The example table is a rectangular grid whose headers are always a prefix of the
//!     extracted tag sequence, in tag order. Its row count is chosen by the caller.
//!
//!     Every shape change builds a new table. What happens to the values already entered
//!     is decided by [`ResizePolicy`]:
//!
//!     - `Preserve` keeps every value whose (row, column) still exists in the new shape.
//!       Columns are matched by tag name, so a value follows its tag.
//!     - `Reset` discards every value on any shape change.
//!
//!     Edits never grow or clamp the table: addressing a missing row or column is an
//!     error.

use crate::error::{GherkinError, Result};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single example value.
///
/// Numbers keep the text they were written with, so `2.50` renders as `2.50` and not as
/// a reformatted float.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(String),
    Text(String),
}

impl CellValue {
    /// Classify scalar text as a number or free text.
    pub fn parse(text: &str) -> Self {
        if looks_numeric(text) {
            CellValue::Number(text.to_string())
        } else {
            CellValue::Text(text.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CellValue::Number(s) | CellValue::Text(s) => s,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, CellValue::Number(_))
    }
}

// `inf` and `NaN` parse as f64 but are words in a table.
fn looks_numeric(text: &str) -> bool {
    text.parse::<f64>().is_ok() && text.chars().any(|c| c.is_ascii_digit())
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // The YAML reader hands any plain scalar to `visit_str` verbatim. Other
        // deserializers fall back to the typed visits.
        deserializer.deserialize_str(CellVisitor)
    }
}

struct CellVisitor;

impl Visitor<'_> for CellVisitor {
    type Value = CellValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a string")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<CellValue, E> {
        Ok(CellValue::parse(value))
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> std::result::Result<CellValue, E> {
        Ok(CellValue::Text(value.to_string()))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<CellValue, E> {
        Ok(value.into())
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<CellValue, E> {
        Ok(CellValue::Number(value.to_string()))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> std::result::Result<CellValue, E> {
        Ok(value.into())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value.to_string())
    }
}

/// What a resize does with values already in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizePolicy {
    #[default]
    Preserve,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExampleTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<CellValue>>>,
}

impl ExampleTable {
    /// An empty table of the given shape.
    pub fn new(columns: Vec<String>, row_count: usize) -> Self {
        let width = columns.len();
        ExampleTable {
            columns,
            rows: vec![vec![None; width]; row_count],
        }
    }

    pub(crate) fn from_rows(columns: Vec<String>, rows: Vec<Vec<Option<CellValue>>>) -> Self {
        ExampleTable { columns, rows }
    }

    /// Build a table of `column_count` x `row_count` over the first `column_count` tags.
    ///
    /// When `previous` is given its values are carried over according to `policy`.
    pub fn resize(
        previous: Option<&ExampleTable>,
        column_count: usize,
        row_count: usize,
        available_tags: &[String],
        policy: ResizePolicy,
    ) -> Result<Self> {
        if column_count == 0 || column_count > available_tags.len() || row_count == 0 {
            return Err(GherkinError::InvalidTableShape {
                columns: column_count,
                rows: row_count,
                available: available_tags.len(),
            });
        }

        let mut table = ExampleTable::new(available_tags[..column_count].to_vec(), row_count);
        if let (Some(old), ResizePolicy::Preserve) = (previous, policy) {
            for (c, name) in table.columns.iter().enumerate() {
                let Some(old_c) = old.column_index(name) else {
                    continue;
                };
                for (r, row) in table.rows.iter_mut().enumerate().take(old.row_count()) {
                    row[c] = old.rows[r][old_c].clone();
                }
            }
        }
        tracing::debug!(
            columns = table.column_count(),
            rows = table.row_count(),
            ?policy,
            "example table resized"
        );
        Ok(table)
    }

    /// Set the value at `row` of the column headed `column`.
    pub fn edit(&mut self, row: usize, column: &str, value: impl Into<CellValue>) -> Result<()> {
        *self.slot_mut(row, column)? = Some(value.into());
        Ok(())
    }

    /// Reset the value at (`row`, `column`) to undefined.
    pub fn clear_cell(&mut self, row: usize, column: &str) -> Result<()> {
        *self.slot_mut(row, column)? = None;
        Ok(())
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let c = self.column_index(column)?;
        self.rows.get(row)?.get(c)?.as_ref()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Option<CellValue>]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Header row followed by data rows, every cell in its text form.
    ///
    /// Undefined cells become empty strings.
    pub fn text_rows(&self) -> Vec<Vec<String>> {
        let mut out = Vec::with_capacity(self.rows.len() + 1);
        out.push(self.columns.clone());
        for row in &self.rows {
            out.push(
                row.iter()
                    .map(|cell| cell.as_ref().map(ToString::to_string).unwrap_or_default())
                    .collect(),
            );
        }
        out
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    fn slot_mut(&mut self, row: usize, column: &str) -> Result<&mut Option<CellValue>> {
        let index = self.column_index(column);
        let rows = self.rows.len();
        match (index, self.rows.get_mut(row)) {
            (Some(c), Some(cells)) => Ok(&mut cells[c]),
            _ => Err(GherkinError::OutOfBounds {
                row,
                column: column.to_string(),
                rows,
                columns: self.columns.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tags(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cells_keep_their_written_form() {
        let cells: Vec<CellValue> =
            serde_yaml::from_str("[1.0, 2.50, 30, '7', lit, inf, true]").unwrap();
        let texts: Vec<String> = cells.iter().map(ToString::to_string).collect();
        assert_eq!(texts, ["1.0", "2.50", "30", "7", "lit", "inf", "true"]);
        assert!(cells[0].is_number());
        assert!(cells[1].is_number());
        assert!(!cells[4].is_number());
        assert!(!cells[5].is_number());
        assert_eq!(cells[2], CellValue::from(30i64));
    }

    #[test]
    fn test_resize_takes_tag_prefix() {
        let table =
            ExampleTable::resize(None, 2, 3, &tags(&["b", "a", "c"]), ResizePolicy::Preserve)
                .unwrap();
        assert_eq!(table.columns(), &["b", "a"]);
        assert_eq!(table.row_count(), 3);
        assert!(table.rows().all(|row| row.iter().all(Option::is_none)));
    }

    #[test]
    fn test_resize_rejects_bad_shapes() {
        let available = tags(&["a", "b"]);
        for (columns, rows) in [(0, 1), (3, 1), (1, 0)] {
            let err = ExampleTable::resize(None, columns, rows, &available, ResizePolicy::Preserve)
                .unwrap_err();
            assert_eq!(
                err,
                GherkinError::InvalidTableShape {
                    columns,
                    rows,
                    available: 2
                }
            );
        }
        assert!(ExampleTable::resize(None, 1, 1, &[], ResizePolicy::Preserve).is_err());
    }

    #[test]
    fn test_resize_preserves_surviving_cells() {
        let available = tags(&["speed", "gear", "lamp"]);
        let mut table =
            ExampleTable::resize(None, 3, 2, &available, ResizePolicy::Preserve).unwrap();
        table.edit(0, "speed", 30i64).unwrap();
        table.edit(1, "gear", "D").unwrap();
        table.edit(1, "lamp", "on").unwrap();

        let smaller =
            ExampleTable::resize(Some(&table), 2, 1, &available, ResizePolicy::Preserve).unwrap();
        assert_eq!(smaller.cell(0, "speed"), Some(&CellValue::from(30i64)));
        assert_eq!(smaller.cell(0, "gear"), None);
        assert_eq!(smaller.columns(), &["speed", "gear"]);

        let bigger =
            ExampleTable::resize(Some(&smaller), 3, 4, &available, ResizePolicy::Preserve)
                .unwrap();
        assert_eq!(bigger.cell(0, "speed"), Some(&CellValue::from(30i64)));
        // Removed coordinates are gone for good.
        assert_eq!(bigger.cell(1, "gear"), None);
        assert_eq!(bigger.cell(1, "lamp"), None);
        assert_eq!(bigger.row_count(), 4);
    }

    #[test]
    fn test_resize_reset_discards_values() {
        let available = tags(&["a"]);
        let mut table = ExampleTable::resize(None, 1, 1, &available, ResizePolicy::Reset).unwrap();
        table.edit(0, "a", "x").unwrap();
        let next = ExampleTable::resize(Some(&table), 1, 2, &available, ResizePolicy::Reset).unwrap();
        assert_eq!(next.cell(0, "a"), None);
    }

    #[test]
    fn test_values_follow_their_tag() {
        let mut table =
            ExampleTable::resize(None, 2, 1, &tags(&["a", "b"]), ResizePolicy::Preserve).unwrap();
        table.edit(0, "b", "kept").unwrap();
        let moved =
            ExampleTable::resize(Some(&table), 2, 1, &tags(&["b", "z"]), ResizePolicy::Preserve)
                .unwrap();
        assert_eq!(moved.cell(0, "b"), Some(&CellValue::from("kept")));
        assert_eq!(moved.cell(0, "z"), None);
    }

    #[test]
    fn test_edit_out_of_bounds() {
        let mut table =
            ExampleTable::resize(None, 1, 1, &tags(&["a", "b"]), ResizePolicy::Preserve).unwrap();
        let err = table.edit(1, "a", "x").unwrap_err();
        assert_eq!(
            err,
            GherkinError::OutOfBounds {
                row: 1,
                column: "a".to_string(),
                rows: 1,
                columns: vec!["a".to_string()],
            }
        );
        assert!(table.edit(0, "b", "x").is_err());
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.column_count(), 1);
    }

    #[test]
    fn test_clear_cell() {
        let mut table =
            ExampleTable::resize(None, 1, 1, &tags(&["a"]), ResizePolicy::Preserve).unwrap();
        table.edit(0, "a", 1.5).unwrap();
        assert_eq!(table.cell(0, "a").map(ToString::to_string).as_deref(), Some("1.5"));
        table.clear_cell(0, "a").unwrap();
        assert_eq!(table.cell(0, "a"), None);
    }

    #[test]
    fn test_text_rows_render_undefined_as_empty() {
        let mut table =
            ExampleTable::resize(None, 2, 2, &tags(&["n", "s"]), ResizePolicy::Preserve).unwrap();
        table.edit(0, "n", 7i64).unwrap();
        table.edit(1, "s", "hi").unwrap();
        assert_eq!(
            table.text_rows(),
            vec![
                vec!["n".to_string(), "s".to_string()],
                vec!["7".to_string(), String::new()],
                vec![String::new(), "hi".to_string()],
            ]
        );
    }

    proptest! {
        #[test]
        fn prop_resize_shape_is_idempotent(
            available in prop::collection::vec("[a-z]{1,6}", 1..6),
            columns_seed in 0usize..6,
            rows in 1usize..6,
        ) {
            let columns = columns_seed % available.len() + 1;
            let first = ExampleTable::resize(None, columns, rows, &available, ResizePolicy::Preserve).unwrap();
            let second = ExampleTable::resize(None, columns, rows, &available, ResizePolicy::Preserve).unwrap();
            prop_assert_eq!(first.columns(), second.columns());
            prop_assert_eq!(first.row_count(), second.row_count());
            prop_assert_eq!(first.columns(), &available[..columns]);
        }
    }
}
