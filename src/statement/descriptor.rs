use super::{
    ConflictPolicy, generate_creator, generate_deleter, generate_inserter, generate_updater,
};
use crate::entity::Entity;
use crate::error::TableError;
use crate::types::Dialect;

/// A table name and the four statements generated for it.
///
/// Built once; a [`Table`](crate::table::Table) replaces it wholesale on rename rather
/// than editing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    name: String,
    creator: String,
    inserter: String,
    updater: String,
    deleter: String,
}

impl TableDescriptor {
    /// Generate all statements for `T` under `name`.
    ///
    /// # Errors
    /// Returns `TableError::Schema` for an unusable entity shape or empty name, and
    /// `TableError::Config` when `dialect` cannot express `policy`.
    pub fn generate<T: Entity>(
        name: impl Into<String>,
        policy: ConflictPolicy,
        dialect: Dialect,
    ) -> Result<Self, TableError> {
        let name = name.into();
        Ok(Self {
            creator: generate_creator::<T>(&name, dialect)?,
            inserter: generate_inserter::<T>(&name, policy, dialect)?,
            updater: generate_updater::<T>(&name, dialect)?,
            deleter: generate_deleter::<T>(&name, dialect)?,
            name,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn creator(&self) -> &str {
        &self.creator
    }

    #[must_use]
    pub fn inserter(&self) -> &str {
        &self.inserter
    }

    #[must_use]
    pub fn updater(&self) -> &str {
        &self.updater
    }

    #[must_use]
    pub fn deleter(&self) -> &str {
        &self.deleter
    }
}
