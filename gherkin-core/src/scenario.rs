//! Scenario assembly
//!
//!     Two scenario shapes are supported:
//!
//!     - DC (Drive Cycle): Given statements only.
//!     - SC (Success Criteria): one or more Given, exactly one When, one or more Then.
//!
//!     Lines are emitted in fixed clause order (Given, When, Then), each followed by a
//!     newline. Shape violations are rejected before anything is composed, so a caller
//!     never receives a partial body.

use crate::error::{GherkinError, Result};
use crate::statement::{ClauseKind, Statement};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ScenarioType {
    /// Drive Cycle.
    #[default]
    #[serde(rename = "DC", alias = "dc")]
    Dc,
    /// Success Criteria.
    #[serde(rename = "SC", alias = "sc")]
    Sc,
}

impl ScenarioType {
    /// Whether statements of `clause` take part in this scenario shape.
    pub fn uses(self, clause: ClauseKind) -> bool {
        match self {
            ScenarioType::Dc => clause == ClauseKind::Given,
            ScenarioType::Sc => true,
        }
    }
}

impl fmt::Display for ScenarioType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioType::Dc => f.write_str("DC"),
            ScenarioType::Sc => f.write_str("SC"),
        }
    }
}

/// Check clause statement counts against the scenario shape.
pub fn validate_shape(
    scenario: ScenarioType,
    given: usize,
    when: usize,
    then: usize,
) -> Result<()> {
    let reject = |clause, count, reason| {
        Err(GherkinError::InvalidScenarioShape {
            scenario,
            clause,
            count,
            reason,
        })
    };

    if given == 0 {
        return reject(ClauseKind::Given, given, "at least one is required");
    }
    match scenario {
        ScenarioType::Dc => {
            if when != 0 {
                return reject(ClauseKind::When, when, "DC scenarios take no When clause");
            }
            if then != 0 {
                return reject(ClauseKind::Then, then, "DC scenarios take no Then clause");
            }
        }
        ScenarioType::Sc => {
            if when != 1 {
                return reject(ClauseKind::When, when, "exactly one is required");
            }
            if then == 0 {
                return reject(ClauseKind::Then, then, "at least one is required");
            }
        }
    }
    Ok(())
}

/// Assemble composed statement lines into one scenario body.
pub fn assemble(
    scenario: ScenarioType,
    given: &[Statement],
    when: &[Statement],
    then: &[Statement],
) -> Result<String> {
    validate_shape(scenario, given.len(), when.len(), then.len())?;

    let clauses = [
        (ClauseKind::Given, given),
        (ClauseKind::When, when),
        (ClauseKind::Then, then),
    ];
    for (clause, statements) in clauses {
        check_clause_order(scenario, clause, statements)?;
    }

    let mut body = String::new();
    for (_, statements) in clauses {
        for statement in statements {
            let line = statement.compose();
            tracing::trace!(clause = %statement.clause, ordinal = statement.ordinal, %line, "composed statement");
            body.push_str(&line);
            body.push('\n');
        }
    }
    Ok(body)
}

// Statements must sit in their own clause, in slot order.
fn check_clause_order(
    scenario: ScenarioType,
    clause: ClauseKind,
    statements: &[Statement],
) -> Result<()> {
    let misplaced = statements
        .iter()
        .enumerate()
        .any(|(i, s)| s.clause != clause || s.ordinal != i);
    if misplaced {
        return Err(GherkinError::InvalidScenarioShape {
            scenario,
            clause,
            count: statements.len(),
            reason: "statements are out of clause or slot order",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn clause(kind: ClauseKind, bodies: &[&str]) -> Vec<Statement> {
        bodies
            .iter()
            .enumerate()
            .map(|(i, body)| Statement::new(kind, i).with_text(*body, *body))
            .collect()
    }

    #[test]
    fn test_dc_given_only() {
        let given = clause(ClauseKind::Given, &["engine is off", "door is open", "it rains"]);
        let body = assemble(ScenarioType::Dc, &given, &[], &[]).unwrap();
        assert_eq!(
            body,
            "Given engine is off\nAnd door is open\nAnd it rains\n"
        );
    }

    #[test]
    fn test_sc_fixed_clause_order() {
        let given = clause(ClauseKind::Given, &["a", "b"]);
        let when = clause(ClauseKind::When, &["c"]);
        let then = clause(ClauseKind::Then, &["d", "e"]);
        let body = assemble(ScenarioType::Sc, &given, &when, &then).unwrap();
        assert_eq!(body, "Given a\nAnd b\nWhen c\nThen d\nAnd e\n");
    }

    #[test]
    fn test_empty_statements_keep_line_count() {
        let given = vec![
            Statement::new(ClauseKind::Given, 0),
            Statement::new(ClauseKind::Given, 1),
        ];
        let body = assemble(ScenarioType::Dc, &given, &[], &[]).unwrap();
        assert_eq!(body, "Given \nAnd \n");
    }

    #[rstest]
    #[case(ScenarioType::Dc, 3, 1, 0, ClauseKind::When)]
    #[case(ScenarioType::Dc, 3, 0, 2, ClauseKind::Then)]
    #[case(ScenarioType::Dc, 0, 0, 0, ClauseKind::Given)]
    #[case(ScenarioType::Sc, 2, 2, 1, ClauseKind::When)]
    #[case(ScenarioType::Sc, 2, 0, 1, ClauseKind::When)]
    #[case(ScenarioType::Sc, 1, 1, 0, ClauseKind::Then)]
    #[case(ScenarioType::Sc, 0, 1, 1, ClauseKind::Given)]
    fn test_invalid_shapes(
        #[case] scenario: ScenarioType,
        #[case] given: usize,
        #[case] when: usize,
        #[case] then: usize,
        #[case] offending: ClauseKind,
    ) {
        let given = clause(ClauseKind::Given, &vec!["x"; given]);
        let when = clause(ClauseKind::When, &vec!["y"; when]);
        let then = clause(ClauseKind::Then, &vec!["z"; then]);
        match assemble(scenario, &given, &when, &then) {
            Err(GherkinError::InvalidScenarioShape { clause, .. }) => {
                assert_eq!(clause, offending)
            }
            other => panic!("expected InvalidScenarioShape, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_shape_counts() {
        assert!(validate_shape(ScenarioType::Dc, 3, 0, 0).is_ok());
        assert!(validate_shape(ScenarioType::Sc, 10, 1, 10).is_ok());
    }

    #[test]
    fn test_misplaced_statement_is_rejected() {
        let given = vec![Statement::new(ClauseKind::Then, 0)];
        let err = assemble(ScenarioType::Dc, &given, &[], &[]).unwrap_err();
        assert!(matches!(err, GherkinError::InvalidScenarioShape { .. }));

        let given = vec![Statement::new(ClauseKind::Given, 1)];
        assert!(assemble(ScenarioType::Dc, &given, &[], &[]).is_err());
    }

    #[test]
    fn test_shape_error_names_dimensions() {
        let err = validate_shape(ScenarioType::Sc, 2, 2, 1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid SC scenario shape: When clause has 2 statement(s), exactly one is required"
        );
    }
}
