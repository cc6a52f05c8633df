//! Refresh controller: rotates a stored access token using the encrypted refresh token.
//!
//! Each refresh acquires the per-user flow guard so at most one rotation is in flight per id,
//! decrypts the stored refresh token, performs the `grant_type=refresh_token` call, re-encrypts,
//! and persists via an update (never an upsert). When the provider declines to rotate the
//! refresh token, the previously stored one is re-encrypted and kept—overwriting it with nothing
//! would strand the user on the next refresh. Any failure along the way leaves the stored record
//! untouched.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::CredentialRecord,
	flows::{Broker, common},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::UpdateOutcome,
};

impl Broker {
	/// Mints a fresh access token for the given external user id.
	pub async fn refresh(&self, id: &str) -> Result<()> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "refresh");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
		self.refresh_metrics.record_attempt();

		let result = span
			.instrument(async move {
				let user_id = common::parse_user_id(id, "id")?;
				let guard = self.flow_guard(&user_id);
				let _serialized = guard.lock().await;
				let current = self
					.store
					.find(&user_id)
					.await?
					.ok_or_else(|| Error::UnknownUser { id: user_id.to_string() })?;
				let refresh_plain = self.vault.decrypt(&current.auth.refresh_token)?;
				let refreshed = self.token_endpoint.refresh(&refresh_plain).await?;
				let access_token = self.vault.encrypt(refreshed.access_token.expose())?;
				let refresh_token = match &refreshed.refresh_token {
					Some(rotated) => self.vault.encrypt(rotated.expose())?,
					// No rotation from the provider; keep the previous refresh token alive.
					None => self.vault.encrypt(&refresh_plain)?,
				};
				let record = CredentialRecord::new(user_id.clone(), access_token, refresh_token);

				match self.store.update(record).await? {
					UpdateOutcome::Updated => Ok(()),
					// The record vanished between find and update; nothing was written.
					UpdateOutcome::Missing => Err(Error::UnknownUser { id: user_id.to_string() }),
				}
			})
			.await;

		match &result {
			Ok(_) => {
				self.refresh_metrics.record_success();
				obs::record_flow_outcome(KIND, FlowOutcome::Success);
			},
			Err(_) => {
				self.refresh_metrics.record_failure();
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
			},
		}

		result
	}
}
