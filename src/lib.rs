//! Credential broker for Spotify playback access—exchanges authorization codes on behalf of
//! external chat-platform users, keeps their tokens encrypted at rest, and refreshes them on
//! demand without user re-interaction.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
pub mod store;
pub mod vault;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		config::BrokerConfig,
		flows::Broker,
		http::ReqwestHttpClient,
		provider::ProviderEndpoints,
		store::{CredentialStore, MemoryStore},
	};

	/// Client identifier baked into broker fixtures.
	pub const TEST_CLIENT_ID: &str = "test-client-id";
	/// Client secret baked into broker fixtures.
	pub const TEST_CLIENT_SECRET: &str = "test-client-secret";
	/// 32-byte hex vault key used across tests.
	pub const TEST_ENCRYPTION_KEY: &str =
		"0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

	/// Builds a broker configuration with fixture credentials and the provided callback URL.
	pub fn test_config(callback_url: &str) -> BrokerConfig {
		BrokerConfig {
			client_id: TEST_CLIENT_ID.into(),
			client_secret: TEST_CLIENT_SECRET.into(),
			encryption_key: TEST_ENCRYPTION_KEY.into(),
			store_path: None,
			callback_url: Url::parse(callback_url)
				.expect("Callback URL fixture should parse successfully."),
			landing_url: Url::parse("https://example.com/done")
				.expect("Landing URL fixture should parse successfully."),
			listen_port: 8080,
		}
	}

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs a [`Broker`] backed by an in-memory store and the insecure test transport,
	/// pointed at the provided (usually mocked) provider endpoints.
	pub fn build_test_broker(
		config: BrokerConfig,
		endpoints: ProviderEndpoints,
	) -> (Broker, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn CredentialStore> = store_backend.clone();
		let broker = Broker::with_http_client(config, endpoints, store, test_reqwest_http_client())
			.expect("Test broker construction should succeed.");

		(broker, store_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {httpmock as _, spotify_auth_broker as _, tokio as _};
