//! Authorization flow controller: login redirect issuance and callback completion.
//!
//! [`Broker::begin_login`] builds the provider authorize URL and seals the pending flow into a
//! client-held ticket; [`Broker::complete_login`] validates the returned state against that
//! ticket, exchanges the code, encrypts both tokens, and persists the credential record. The
//! exchange is only ever attempted after the state check passes, and the record is only written
//! after the exchange succeeds, so a failed flow leaves no partial state behind.

pub mod ticket;

pub use ticket::generate_state;

// self
use crate::{
	_prelude::*,
	auth::{CredentialRecord, UserId},
	flows::{Broker, common, login::ticket::PendingAuthorization},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider,
};

/// Redirect handed to the front door when a login begins.
#[derive(Clone, Debug)]
pub struct LoginRedirect {
	/// Fully-formed authorize URL the user should be sent to.
	pub authorize_url: Url,
	/// Opaque sealed binding that must round-trip to the callback.
	pub ticket: String,
}

/// Successful callback result; carries no token material.
#[derive(Clone, Debug)]
pub struct CompletedLogin {
	/// External user the credential was stored for.
	pub user_id: UserId,
	/// Post-auth landing page the user should be redirected to.
	pub landing_url: Url,
}

impl Broker {
	/// Starts a login flow for the given external user id.
	///
	/// Returns the provider authorize URL (carrying `response_type=code`, the client id, the
	/// exact callback URL, the fixed playback scopes, and a fresh state nonce) together with the
	/// sealed ticket binding that state to the user id.
	pub fn begin_login(&self, userid: &str) -> Result<LoginRedirect> {
		const KIND: FlowKind = FlowKind::Login;

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = (|| {
			let user_id = common::parse_user_id(userid, "userid")?;
			let pending = PendingAuthorization::new(user_id);
			let ticket = pending.seal(&self.vault)?;
			let authorize_url = self.build_authorize_url(&pending.state);

			Ok(LoginRedirect { authorize_url, ticket })
		})();

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Completes a login flow from the provider callback.
	///
	/// Rejects the flow with [`Error::StateMismatch`] before any network call when the ticket is
	/// absent, unsealable, expired, or bound to a different state. On a match the authorization
	/// code is exchanged, both tokens are encrypted, and the credential record is upserted; the
	/// store write is awaited before success is reported. Plaintext tokens are never returned.
	pub async fn complete_login(
		&self,
		code: &str,
		state: &str,
		ticket: &str,
	) -> Result<CompletedLogin> {
		const KIND: FlowKind = FlowKind::Callback;

		let span = FlowSpan::new(KIND, "complete_login");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				if code.is_empty() {
					return Err(Error::MissingParameter { name: "code" });
				}
				if state.is_empty() {
					return Err(Error::MissingParameter { name: "state" });
				}
				// An absent binding is indistinguishable from a forged one.
				if ticket.is_empty() {
					return Err(Error::StateMismatch);
				}

				let pending = PendingAuthorization::unseal(ticket, &self.vault)?;

				pending.validate(state, OffsetDateTime::now_utc())?;

				let user_id = pending.user_id;
				let guard = self.flow_guard(&user_id);
				let _serialized = guard.lock().await;
				let tokens = self
					.token_endpoint
					.exchange_authorization_code(code, &self.config.callback_url)
					.await?;
				let access_token = self.vault.encrypt(tokens.access_token.expose())?;
				let refresh_token = self.vault.encrypt(tokens.refresh_token.expose())?;
				let record = CredentialRecord::new(user_id.clone(), access_token, refresh_token);

				self.store.upsert(record).await?;

				Ok(CompletedLogin { user_id, landing_url: self.config.landing_url.clone() })
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	fn build_authorize_url(&self, state: &str) -> Url {
		let mut url = self.endpoints.authorization.clone();
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("response_type", "code");
		pairs.append_pair("client_id", &self.config.client_id);
		pairs.append_pair("redirect_uri", self.config.callback_url.as_str());
		pairs.append_pair("scope", &provider::playback_scope());
		pairs.append_pair("state", state);

		drop(pairs);

		url
	}
}
