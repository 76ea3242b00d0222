use crate::store::error::StoreError;
use async_trait::async_trait;

pub mod error;
pub mod sqlite;

/// Client-local persistent key-value storage that outlives a single run of the client.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
	async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
	/// Replaces the value stored under `key` in a single write.
	async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
