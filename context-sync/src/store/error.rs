use sqlx::migrate::MigrateError;
use thiserror::Error;

/// Failures of the key-value store. Callers above the store log these and fall back to defaults.
#[derive(Debug, Error)]
pub enum StoreError {
	#[error("Failed to open key-value store: {0}")]
	Connection(#[source] sqlx::Error),
	#[error("Key-value query failed: {0}")]
	Query(#[source] sqlx::Error),
	#[error("Failed to migrate key-value store: {0}")]
	Migration(#[from] MigrateError),
}

impl From<sqlx::Error> for StoreError {
	fn from(error: sqlx::Error) -> Self {
		match error {
			sqlx::Error::Migrate(error) => Self::Migration(*error),
			other => Self::Query(other),
		}
	}
}
