//! Environment-sourced broker configuration.
//!
//! Everything the broker needs is injected explicitly at construction—there are no ambient
//! globals. The front door owns `PORT`; it is parsed here so a bad value fails at startup rather
//! than at bind time.

// std
use std::{env, path::PathBuf};
// self
use crate::{_prelude::*, error::ConfigError};

const ENV_CLIENT_ID: &str = "SPOTIFY_CLIENT_ID";
const ENV_CLIENT_SECRET: &str = "SPOTIFY_CLIENT_SECRET";
const ENV_ENCRYPTION_KEY: &str = "ENCRYPTION_KEY";
const ENV_STORE_PATH: &str = "STORE_PATH";
const ENV_CALLBACK_URL: &str = "CALLBACK_URL";
const ENV_LANDING_URL: &str = "LANDING_URL";
const ENV_PORT: &str = "PORT";

const DEFAULT_PORT: u16 = 8080;

/// Broker configuration, normally read from the environment once at startup.
#[derive(Clone, Debug)]
pub struct BrokerConfig {
	/// OAuth client identifier registered with the provider.
	pub client_id: String,
	/// OAuth client secret for the confidential client.
	pub client_secret: String,
	/// Hex-encoded 32-byte vault key; validated when the vault is built.
	pub encryption_key: String,
	/// Location of the file-backed store snapshot; `None` selects the in-memory store.
	pub store_path: Option<PathBuf>,
	/// Exact callback URL registered with the provider; the token endpoint validates this match.
	pub callback_url: Url,
	/// Post-auth landing page users are redirected to after a successful callback.
	pub landing_url: Url,
	/// Listen port for the HTTP front door.
	pub listen_port: u16,
}
impl BrokerConfig {
	/// Reads the configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Ok(Self {
			client_id: require(ENV_CLIENT_ID)?,
			client_secret: require(ENV_CLIENT_SECRET)?,
			encryption_key: require(ENV_ENCRYPTION_KEY)?,
			store_path: env::var(ENV_STORE_PATH).ok().map(PathBuf::from),
			callback_url: require_url(ENV_CALLBACK_URL)?,
			landing_url: require_url(ENV_LANDING_URL)?,
			listen_port: match env::var(ENV_PORT) {
				Ok(raw) =>
					raw.trim().parse().map_err(|source| ConfigError::InvalidPort { source })?,
				Err(_) => DEFAULT_PORT,
			},
		})
	}
}

fn require(name: &'static str) -> Result<String, ConfigError> {
	match env::var(name) {
		Ok(value) if !value.trim().is_empty() => Ok(value),
		_ => Err(ConfigError::MissingEnv { name }),
	}
}

fn require_url(name: &'static str) -> Result<Url, ConfigError> {
	let raw = require(name)?;

	Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl { name, source })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	// Environment mutation is process-wide, so the from_env cases run as one test.
	#[test]
	fn from_env_reads_and_validates() {
		let vars = [
			(ENV_CLIENT_ID, "client-id"),
			(ENV_CLIENT_SECRET, "client-secret"),
			(ENV_ENCRYPTION_KEY, "00ff"),
			(ENV_CALLBACK_URL, "http://localhost:8080/callback"),
			(ENV_LANDING_URL, "https://example.com/done"),
		];

		for (name, value) in vars {
			unsafe { env::set_var(name, value) };
		}
		unsafe {
			env::remove_var(ENV_STORE_PATH);
			env::remove_var(ENV_PORT);
		}

		let config = BrokerConfig::from_env().expect("Fully populated environment should parse.");

		assert_eq!(config.client_id, "client-id");
		assert_eq!(config.listen_port, DEFAULT_PORT);
		assert!(config.store_path.is_none());

		unsafe { env::set_var(ENV_PORT, "9090") };

		let config = BrokerConfig::from_env().expect("Explicit port should parse.");

		assert_eq!(config.listen_port, 9090);

		unsafe { env::set_var(ENV_PORT, "not-a-port") };

		assert!(matches!(BrokerConfig::from_env(), Err(ConfigError::InvalidPort { .. })));

		unsafe {
			env::remove_var(ENV_PORT);
			env::set_var(ENV_CALLBACK_URL, "not a url");
		}

		assert!(matches!(
			BrokerConfig::from_env(),
			Err(ConfigError::InvalidUrl { name: ENV_CALLBACK_URL, .. }),
		));

		unsafe { env::remove_var(ENV_CLIENT_ID) };

		assert!(matches!(
			BrokerConfig::from_env(),
			Err(ConfigError::MissingEnv { name: ENV_CLIENT_ID }),
		));
	}
}
