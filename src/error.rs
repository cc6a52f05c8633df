//! Broker-level error types shared across flows, the vault, and stores.

// self
use crate::_prelude::*;

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
///
/// Every variant is recoverable at the controller boundary; the front door turns them into
/// structured responses instead of crashing the process.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Vault could not decrypt or encrypt a stored token.
	#[error(transparent)]
	Vault(#[from] crate::vault::VaultError),
	/// Token endpoint call failed; the stored record was left untouched.
	#[error(transparent)]
	ExchangeFailed(#[from] ExchangeError),
	/// External user identifier failed validation.
	#[error(transparent)]
	Identifier(#[from] crate::auth::IdentifierError),

	/// Caller omitted a required request parameter.
	#[error("Required parameter `{name}` is missing.")]
	MissingParameter {
		/// Name of the missing query parameter.
		name: &'static str,
	},
	/// Returned state does not match the state bound to the pending flow.
	#[error("State does not match.")]
	StateMismatch,
	/// Refresh was requested for an id with no stored credential.
	#[error("No stored credential exists for user `{id}`.")]
	UnknownUser {
		/// External user identifier that missed the store.
		id: String,
	},
}

/// Configuration and validation failures raised by the broker.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Required environment variable is absent.
	#[error("Environment variable `{name}` is not set.")]
	MissingEnv {
		/// Variable name.
		name: &'static str,
	},
	/// Environment variable holds a value that cannot be parsed as a URL.
	#[error("Environment variable `{name}` is not a valid URL.")]
	InvalidUrl {
		/// Variable name.
		name: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Listen port cannot be parsed.
	#[error("Environment variable `PORT` is not a valid port number.")]
	InvalidPort {
		/// Underlying parsing failure.
		#[source]
		source: std::num::ParseIntError,
	},
	/// Encryption key failed validation at startup.
	#[error("Encryption key is invalid.")]
	InvalidEncryptionKey(#[source] crate::vault::VaultError),
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Provider endpoint contains an invalid URL.
	#[error("Provider endpoint is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Callback URL cannot be used as an OAuth redirect URI.
	#[error("Callback URL is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Pending-authorization ticket could not be serialized for sealing.
	#[error("Pending authorization could not be encoded.")]
	TicketEncode(#[source] serde_json::Error),
}

/// Token endpoint failures surfaced as the broker's `ExchangeFailed` taxonomy.
///
/// The core performs no automatic retries; callers may retry transport-shaped variants.
#[derive(Debug, ThisError)]
pub enum ExchangeError {
	/// Provider rejected the grant (expired/invalid code or refresh token).
	#[error("Token endpoint rejected the grant: {reason}.")]
	Provider {
		/// Provider- or broker-supplied reason string.
		reason: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request exceeded the transport's bounded timeout.
	#[error("Request timed out while calling the token endpoint.")]
	Timeout {
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint responded with JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Code exchange response omitted the refresh token required for long-lived access.
	#[error("Token endpoint response is missing a refresh token.")]
	MissingRefreshToken,
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
	/// Catch-all for transport errors without a richer classification.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	Unexpected {
		/// Human-readable summary of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}
impl ExchangeError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
