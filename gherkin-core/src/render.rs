//! Document rendering
//!
//!     The artifact is the scenario body, optionally followed by an example table:
//!
//!         <scenario text>
//!         Examples:
//!         |speed|gear |
//!         |30   |D    |
//!
//!     Each column is padded to the width of its longest cell (header included) with
//!     trailing spaces. A row opens with `|` directly followed by the first cell, cells
//!     are joined with `|`, and every row closes with a single space and `|`. Downstream
//!     tooling reads the table back by column position, so this layout must not drift.
//!
//!     [`parse_document`] reads an artifact back into its scenario text and table.

use crate::table::{CellValue, ExampleTable};

/// Marker between scenario text and the table.
pub const EXAMPLES_HEADER: &str = "\nExamples:\n";

/// Render the scenario text followed by its example table, if there is one with rows.
pub fn render(scenario_text: &str, table: Option<&ExampleTable>) -> String {
    let Some(table) = table.filter(|t| t.row_count() > 0) else {
        return scenario_text.to_string();
    };

    let mut output = String::with_capacity(scenario_text.len() + 64);
    output.push_str(scenario_text);
    output.push_str(EXAMPLES_HEADER);
    output.push_str(&format_table_rows(&table.text_rows()).join("\n"));
    output
}

/// Format rows of text cells as aligned pipe rows. The first row is the header.
pub fn format_table_rows(rows: &[Vec<String>]) -> Vec<String> {
    let widths = column_widths(rows);

    rows.iter()
        .map(|row| {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(text, &width)| format!("{text:width$}"))
                .collect();
            format!("|{} |", cells.join("|"))
        })
        .collect()
}

fn column_widths(rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = Vec::new();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let width = cell.chars().count();
            if i >= widths.len() {
                widths.push(width);
            } else {
                widths[i] = widths[i].max(width);
            }
        }
    }
    widths
}

/// Split a rendered artifact back into scenario text and example table.
///
/// The split happens at the last `Examples:` marker. Cells are trimmed; empty cells
/// come back undefined and every other cell is classified by [`CellValue::parse`].
pub fn parse_document(text: &str) -> (String, Option<ExampleTable>) {
    let Some(at) = text.rfind(EXAMPLES_HEADER) else {
        return (text.to_string(), None);
    };
    let scenario = &text[..at];
    let mut lines = text[at + EXAMPLES_HEADER.len()..]
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with('|'));

    let Some(header) = lines.next() else {
        return (text.to_string(), None);
    };
    let columns = split_table_row(header);
    let rows = lines
        .map(|line| {
            let mut cells: Vec<Option<CellValue>> = split_table_row(line)
                .into_iter()
                .map(|cell| (!cell.is_empty()).then(|| CellValue::parse(&cell)))
                .collect();
            cells.resize(columns.len(), None);
            cells
        })
        .collect();

    (
        scenario.to_string(),
        Some(ExampleTable::from_rows(columns, rows)),
    )
}

/// Trimmed cells of one pipe row.
pub fn split_table_row(line: &str) -> Vec<String> {
    let line = line.trim();
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = line.strip_suffix('|').unwrap_or(line);

    line.split('|').map(|s| s.trim().to_string()).collect()
}
