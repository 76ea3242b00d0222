use crate::store::KeyValueStore;
use crate::store::error::StoreError;
use async_trait::async_trait;
use sqlx::{SqlitePool, migrate, query, query_scalar};

#[derive(Clone)]
pub struct SqliteKeyValueStore {
	pool: SqlitePool,
}

impl SqliteKeyValueStore {
	pub async fn new(database_url: &str) -> Result<Self, StoreError> {
		let pool = SqlitePool::connect(database_url)
			.await
			.map_err(StoreError::Connection)?;
		let store = Self { pool };
		store.migrate().await?;

		Ok(store)
	}

	async fn migrate(&self) -> Result<(), StoreError> {
		migrate!().run(&self.pool).await.map_err(Into::into)
	}
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
	async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
		query_scalar(r"SELECT value FROM key_value WHERE key = ?1")
			.bind(key)
			.fetch_optional(&self.pool)
			.await
			.map_err(Into::into)
	}

	async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
		query(
			r"INSERT INTO key_value (key, value) VALUES (?1, ?2)
			ON CONFLICT (key) DO UPDATE SET value = excluded.value",
		)
		.bind(key)
		.bind(value)
		.execute(&self.pool)
		.await?;

		Ok(())
	}
}
