use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::types::Dialect;

/// Strategy applied when an insert would violate the primary key or a unique index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Stop the statement and report the conflict; earlier changes of the statement stay.
    Fail,
    /// Skip the conflicting row silently.
    Ignore,
    /// Delete the conflicting row and store the new one.
    Replace,
    /// Undo the statement and report the conflict.
    #[default]
    Abort,
    /// Undo the enclosing transaction and report the conflict.
    Rollback,
}

/// How a Postgres insert reacts to a key conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PostgresConflict {
    Raise,
    DoNothing,
    DoUpdate,
}

/// Dialect-specific rendering of a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConflictClause {
    /// Keyword placed between `INSERT` and `INTO`.
    Sqlite(&'static str),
    Postgres(PostgresConflict),
}

impl ConflictPolicy {
    /// Whether the store swallows conflicts under this policy instead of reporting them.
    #[must_use]
    pub fn suppresses_conflicts(self) -> bool {
        matches!(self, ConflictPolicy::Ignore | ConflictPolicy::Replace)
    }

    #[must_use]
    pub fn is_supported(self, dialect: Dialect) -> bool {
        self.insert_clause(dialect).is_ok()
    }

    /// Map the policy onto the dialect's insert syntax.
    ///
    /// # Errors
    /// Returns `TableError::Config` when the dialect has no exact equivalent; a policy is
    /// never swapped for a neighbouring one.
    pub(crate) fn insert_clause(self, dialect: Dialect) -> Result<ConflictClause, TableError> {
        match dialect {
            Dialect::Sqlite => Ok(ConflictClause::Sqlite(match self {
                ConflictPolicy::Fail => "OR FAIL",
                ConflictPolicy::Ignore => "OR IGNORE",
                ConflictPolicy::Replace => "OR REPLACE",
                ConflictPolicy::Abort => "OR ABORT",
                ConflictPolicy::Rollback => "OR ROLLBACK",
            })),
            Dialect::Postgres => match self {
                ConflictPolicy::Abort => Ok(ConflictClause::Postgres(PostgresConflict::Raise)),
                ConflictPolicy::Ignore => {
                    Ok(ConflictClause::Postgres(PostgresConflict::DoNothing))
                }
                ConflictPolicy::Replace => {
                    Ok(ConflictClause::Postgres(PostgresConflict::DoUpdate))
                }
                ConflictPolicy::Fail | ConflictPolicy::Rollback => Err(TableError::Config(
                    format!("conflict policy {self:?} is not supported by {dialect:?}"),
                )),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_policy_maps_on_sqlite() {
        let clauses: Vec<_> = [
            ConflictPolicy::Fail,
            ConflictPolicy::Ignore,
            ConflictPolicy::Replace,
            ConflictPolicy::Abort,
            ConflictPolicy::Rollback,
        ]
        .into_iter()
        .map(|p| p.insert_clause(Dialect::Sqlite).unwrap())
        .collect();
        assert_eq!(
            clauses,
            [
                ConflictClause::Sqlite("OR FAIL"),
                ConflictClause::Sqlite("OR IGNORE"),
                ConflictClause::Sqlite("OR REPLACE"),
                ConflictClause::Sqlite("OR ABORT"),
                ConflictClause::Sqlite("OR ROLLBACK"),
            ]
        );
    }

    #[test]
    fn postgres_rejects_policies_without_equivalent() {
        for policy in [ConflictPolicy::Fail, ConflictPolicy::Rollback] {
            let err = policy.insert_clause(Dialect::Postgres).unwrap_err();
            assert!(matches!(err, TableError::Config(_)), "{err}");
            assert!(!policy.is_supported(Dialect::Postgres));
        }
        assert!(ConflictPolicy::Replace.is_supported(Dialect::Postgres));
    }

    #[test]
    fn parses_from_config_text() {
        let policy: ConflictPolicy = serde_json::from_str("\"replace\"").unwrap();
        assert_eq!(policy, ConflictPolicy::Replace);
        assert_eq!(
            ConflictPolicy::from_str("ignore", true).unwrap(),
            ConflictPolicy::Ignore
        );
    }
}
