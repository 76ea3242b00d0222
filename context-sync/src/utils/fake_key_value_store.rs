use crate::store::KeyValueStore;
use crate::store::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct FakeKeyValueStore {
	values: parking_lot::Mutex<HashMap<String, String>>,
	failing_reads: AtomicBool,
	failing_writes: AtomicBool,
	write_count: AtomicUsize,
}

impl FakeKeyValueStore {
	pub fn insert(&self, key: &str, value: &str) {
		self.values.lock().insert(key.to_string(), value.to_string());
	}

	pub fn value(&self, key: &str) -> Option<String> {
		self.values.lock().get(key).cloned()
	}

	pub fn fail_reads(&self, failing: bool) {
		self.failing_reads.store(failing, Ordering::SeqCst);
	}

	pub fn fail_writes(&self, failing: bool) {
		self.failing_writes.store(failing, Ordering::SeqCst);
	}

	pub fn write_count(&self) -> usize {
		self.write_count.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl KeyValueStore for FakeKeyValueStore {
	async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
		if self.failing_reads.load(Ordering::SeqCst) {
			return Err(StoreError::Query(sqlx::Error::PoolClosed));
		}
		Ok(self.value(key))
	}

	async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
		if self.failing_writes.load(Ordering::SeqCst) {
			return Err(StoreError::Query(sqlx::Error::PoolClosed));
		}
		self.write_count.fetch_add(1, Ordering::SeqCst);
		self.insert(key, value);
		Ok(())
	}
}
