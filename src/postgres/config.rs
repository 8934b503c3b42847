use deadpool_postgres::Config as PgConfig;

use super::PostgresStore;
use crate::error::StoreError;

/// Options for opening a [`PostgresStore`].
#[derive(Debug, Clone)]
pub struct PostgresOptions {
    pub config: PgConfig,
}

impl PostgresOptions {
    #[must_use]
    pub fn new(config: PgConfig) -> Self {
        Self { config }
    }

    /// Check that every connection field the pool needs is present.
    ///
    /// # Errors
    /// Returns `StoreError::ConfigError` naming the first missing field.
    pub fn validate(&self) -> Result<(), StoreError> {
        let cfg = &self.config;
        if cfg.dbname.is_none() {
            return Err(StoreError::ConfigError("dbname is required".to_string()));
        }
        if cfg.host.is_none() {
            return Err(StoreError::ConfigError("host is required".to_string()));
        }
        if cfg.port.is_none() {
            return Err(StoreError::ConfigError("port is required".to_string()));
        }
        if cfg.user.is_none() {
            return Err(StoreError::ConfigError("user is required".to_string()));
        }
        Ok(())
    }

    /// Open the store.
    ///
    /// # Errors
    /// Returns `StoreError` if validation or pool creation fails.
    pub async fn build(self) -> Result<PostgresStore, StoreError> {
        PostgresStore::connect(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_are_reported_in_order() {
        let mut cfg = PgConfig::new();
        let err = PostgresOptions::new(cfg.clone()).validate().unwrap_err();
        assert!(err.to_string().contains("dbname"));

        cfg.dbname = Some("tables".into());
        cfg.host = Some("localhost".into());
        cfg.port = Some(5432);
        let err = PostgresOptions::new(cfg.clone()).validate().unwrap_err();
        assert!(err.to_string().contains("user"));

        cfg.user = Some("tables".into());
        assert!(PostgresOptions::new(cfg).validate().is_ok());
    }
}
