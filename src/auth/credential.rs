//! Persisted credential model: one record per external user id, tokens stored as ciphertexts.

// self
use crate::{_prelude::*, auth::UserId};

/// Vault ciphertexts for the provider token pair.
///
/// Both fields are always ciphertext; the invariant that plaintext never reaches the store is
/// enforced by the flow controllers, which encrypt before persisting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedTokens {
	/// Ciphertext of the provider access token.
	pub access_token: String,
	/// Ciphertext of the provider refresh token.
	pub refresh_token: String,
}

/// Stored credential keyed by the external user id.
///
/// Created exactly once on the first successful code exchange; refreshes mutate it in place.
/// The serde shape matches the store contract: `{id, auth: {access_token, refresh_token}}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
	/// External user identifier (primary key).
	pub id: UserId,
	/// Encrypted provider token pair.
	pub auth: EncryptedTokens,
}
impl CredentialRecord {
	/// Assembles a record from already-encrypted token material.
	pub fn new(id: UserId, access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
		Self {
			id,
			auth: EncryptedTokens {
				access_token: access_token.into(),
				refresh_token: refresh_token.into(),
			},
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_serializes_to_store_shape() {
		let record = CredentialRecord::new(
			UserId::new("abc123").expect("User id fixture should be valid."),
			"ct-access",
			"ct-refresh",
		);
		let value = serde_json::to_value(&record).expect("Record should serialize to JSON.");

		assert_eq!(
			value,
			serde_json::json!({
				"id": "abc123",
				"auth": { "access_token": "ct-access", "refresh_token": "ct-refresh" },
			}),
		);
	}
}
