//! Storage contracts and built-in store implementations for credential records.
//!
//! The persistent store is an external collaborator; the broker only assumes a
//! key-value-by-user-id document interface. Two backends ship in-crate: [`MemoryStore`] for tests
//! and demos, [`FileStore`] for lightweight single-process deployments.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::CredentialRecord, auth::UserId};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract implemented by credential stores.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Creates or replaces the record for the contained user id.
	///
	/// Used exactly once per user, on the first successful code exchange.
	fn upsert(&self, record: CredentialRecord) -> StoreFuture<'_, ()>;

	/// Fetches the record for the given user id, if present.
	fn find<'a>(&'a self, id: &'a UserId) -> StoreFuture<'a, Option<CredentialRecord>>;

	/// Replaces an existing record in place; never creates one.
	///
	/// Refreshes go through this path so a failed or racing refresh can never materialize a
	/// record that the login flow did not create.
	fn update(&self, record: CredentialRecord) -> StoreFuture<'_, UpdateOutcome>;
}

/// Result of an update attempt against an existing record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateOutcome {
	/// The record existed and was replaced.
	Updated,
	/// No record exists for the user id; nothing was written.
	Missing,
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
