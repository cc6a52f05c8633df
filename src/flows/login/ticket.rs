//! State generation and the sealed pending-authorization ticket.
//!
//! The binding between a login redirect and its callback travels as an opaque client-held value:
//! the pending authorization is serialized and encrypted under the vault key, so the client can
//! carry it across the redirect round-trip without being able to read or forge it (AES-GCM
//! authenticates the payload). A short TTL bounds how long an issued ticket stays usable.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{_prelude::*, auth::UserId, error::ConfigError, vault::Vault};

const STATE_LEN: usize = 32;
const TICKET_TTL: Duration = Duration::minutes(10);

/// Generates the anti-forgery state nonce bound to a login redirect.
///
/// 32 alphanumeric characters drawn from the thread-local CSPRNG; URL-safe, with negligible
/// collision probability between any two generated values.
pub fn generate_state() -> String {
	rand::rng().sample_iter(Alphanumeric).take(STATE_LEN).map(char::from).collect()
}

/// Ephemeral binding between a login redirect and the callback that completes it.
#[derive(Clone, Serialize, Deserialize)]
pub(crate) struct PendingAuthorization {
	pub(crate) state: String,
	pub(crate) user_id: UserId,
	#[serde(with = "time::serde::timestamp")]
	pub(crate) issued_at: OffsetDateTime,
}
impl PendingAuthorization {
	pub(crate) fn new(user_id: UserId) -> Self {
		Self { state: generate_state(), user_id, issued_at: OffsetDateTime::now_utc() }
	}

	/// Seals the binding into an opaque ticket for the redirect round-trip.
	pub(crate) fn seal(&self, vault: &Vault) -> Result<String> {
		let payload = serde_json::to_string(self).map_err(ConfigError::TicketEncode)?;

		Ok(vault.encrypt(&payload)?)
	}

	/// Opens a client-returned ticket.
	///
	/// The ticket is attacker-controlled input; any decryption or decoding failure is reported
	/// as a state mismatch rather than a vault fault.
	pub(crate) fn unseal(ticket: &str, vault: &Vault) -> Result<Self> {
		let payload = vault.decrypt(ticket).map_err(|_| Error::StateMismatch)?;

		serde_json::from_str(&payload).map_err(|_| Error::StateMismatch)
	}

	/// Checks the returned state against the sealed one and enforces the ticket TTL.
	pub(crate) fn validate(&self, returned_state: &str, now: OffsetDateTime) -> Result<()> {
		if now - self.issued_at > TICKET_TTL {
			return Err(Error::StateMismatch);
		}
		if returned_state != self.state {
			return Err(Error::StateMismatch);
		}

		Ok(())
	}
}
impl Debug for PendingAuthorization {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PendingAuthorization")
			.field("state", &self.state)
			.field("user_id", &self.user_id)
			.field("issued_at", &self.issued_at)
			.finish()
	}
}
