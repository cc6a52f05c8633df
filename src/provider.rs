//! Fixed Spotify endpoints and the playback scope set.
//!
//! The broker talks to exactly one provider; endpoints are only overridable so tests can point
//! flows at a mock server.

// self
use crate::{_prelude::*, error::ConfigError};

const AUTHORIZATION_ENDPOINT: &str = "https://accounts.spotify.com/authorize";
const TOKEN_ENDPOINT: &str = "https://accounts.spotify.com/api/token";

/// Scopes requested for every login; read and modify playback, nothing more.
pub const PLAYBACK_SCOPES: [&str; 2] = ["user-read-playback-state", "user-modify-playback-state"];

/// Authorization and token endpoints used by all flows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderEndpoints {
	/// Authorize endpoint users are redirected to for consent.
	pub authorization: Url,
	/// Token endpoint called for code exchanges and refreshes.
	pub token: Url,
}
impl ProviderEndpoints {
	/// Returns the production Spotify endpoints.
	pub fn spotify() -> Result<Self, ConfigError> {
		Self::new(AUTHORIZATION_ENDPOINT, TOKEN_ENDPOINT)
	}

	/// Builds endpoints from raw URL strings, validating both.
	pub fn new(authorization: &str, token: &str) -> Result<Self, ConfigError> {
		Ok(Self {
			authorization: Url::parse(authorization)
				.map_err(|source| ConfigError::InvalidEndpoint { source })?,
			token: Url::parse(token).map_err(|source| ConfigError::InvalidEndpoint { source })?,
		})
	}
}

/// Space-joined scope value appended to authorize URLs.
pub fn playback_scope() -> String {
	PLAYBACK_SCOPES.join(" ")
}
