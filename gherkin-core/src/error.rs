//! Error types for scenario assembly and example-table editing.
//!
//! Every structural rejection carries the offending dimensions so callers can
//! surface them verbatim. A signal lookup miss is not an error, see
//! [`crate::catalog::SignalLookup::NotFound`].

use crate::scenario::ScenarioType;
use crate::statement::ClauseKind;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GherkinError {
    /// Clause statement counts violate the DC/SC contract.
    #[error("invalid {scenario} scenario shape: {clause} clause has {count} statement(s), {reason}")]
    InvalidScenarioShape {
        scenario: ScenarioType,
        clause: ClauseKind,
        count: usize,
        reason: &'static str,
    },

    /// An example-table edit addressed a row or column that does not exist.
    #[error("cell ({row}, {column:?}) is out of bounds for a table of {rows} row(s) with columns {columns:?}")]
    OutOfBounds {
        row: usize,
        column: String,
        rows: usize,
        columns: Vec<String>,
    },

    /// A resize request broke the table preconditions.
    #[error("cannot shape example table as {columns} column(s) x {rows} row(s) with {available} tag(s) available")]
    InvalidTableShape {
        columns: usize,
        rows: usize,
        available: usize,
    },

    #[error("unknown keyword: {0:?}")]
    UnknownKeyword(String),

    #[error("{clause} clause cannot hold {count} statement(s), expected 1..={max}")]
    InvalidStatementCount {
        clause: ClauseKind,
        count: usize,
        max: usize,
    },

    #[error("{clause} slot {slot} does not exist ({slots} slot(s))")]
    SlotOutOfRange {
        clause: ClauseKind,
        slot: usize,
        slots: usize,
    },
}

pub type Result<T> = std::result::Result<T, GherkinError>;
