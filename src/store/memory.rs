//! Thread-safe in-memory [`CredentialStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{CredentialRecord, UserId},
	store::{CredentialStore, StoreError, StoreFuture, UpdateOutcome},
};

type StoreMap = Arc<RwLock<HashMap<UserId, CredentialRecord>>>;

/// Thread-safe storage backend that keeps records in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	fn upsert_now(map: StoreMap, record: CredentialRecord) -> Result<(), StoreError> {
		map.write().insert(record.id.clone(), record);

		Ok(())
	}

	fn find_now(map: StoreMap, id: UserId) -> Option<CredentialRecord> {
		map.read().get(&id).cloned()
	}

	fn update_now(map: StoreMap, record: CredentialRecord) -> UpdateOutcome {
		let mut guard = map.write();

		match guard.get_mut(&record.id) {
			Some(existing) => {
				*existing = record;

				UpdateOutcome::Updated
			},
			None => UpdateOutcome::Missing,
		}
	}
}
impl CredentialStore for MemoryStore {
	fn upsert(&self, record: CredentialRecord) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::upsert_now(map, record) })
	}

	fn find<'a>(&'a self, id: &'a UserId) -> StoreFuture<'a, Option<CredentialRecord>> {
		let map = self.0.clone();
		let id = id.to_owned();

		Box::pin(async move { Ok(Self::find_now(map, id)) })
	}

	fn update(&self, record: CredentialRecord) -> StoreFuture<'_, UpdateOutcome> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::update_now(map, record)) })
	}
}
