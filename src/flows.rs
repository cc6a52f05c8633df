//! High-level flow orchestrators: login redirect, callback exchange, and refresh.

pub mod common;
pub mod login;
pub mod refresh;

pub use login::*;
pub use refresh::*;

// self
use crate::{
	_prelude::*,
	auth::UserId,
	config::BrokerConfig,
	error::ConfigError,
	http::ReqwestHttpClient,
	oauth::TokenEndpoint,
	provider::ProviderEndpoints,
	store::CredentialStore,
	vault::Vault,
};

/// Coordinates the authorization and refresh flows for one provider.
///
/// The broker owns the vault, credential store, token endpoint facade, and per-user flow guards
/// so the individual flows can focus on their grant-specific logic. Everything is injected at
/// construction; the only process-wide state is the read-only vault key inside [`Vault`].
#[derive(Clone)]
pub struct Broker {
	/// Credential store that persists encrypted token records.
	pub store: Arc<dyn CredentialStore>,
	/// Configuration snapshot taken at construction.
	pub config: BrokerConfig,
	/// Provider endpoints used for redirects and token calls.
	pub endpoints: ProviderEndpoints,
	/// Shared counters for refresh flow outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	pub(crate) vault: Vault,
	pub(crate) token_endpoint: Arc<TokenEndpoint>,
	flow_guards: Arc<Mutex<HashMap<UserId, Arc<AsyncMutex<()>>>>>,
}
impl Broker {
	/// Creates a broker with the crate's default bounded-timeout transport.
	pub fn new(
		config: BrokerConfig,
		endpoints: ProviderEndpoints,
		store: Arc<dyn CredentialStore>,
	) -> Result<Self> {
		Self::with_http_client(config, endpoints, store, ReqwestHttpClient::default())
	}

	/// Creates a broker that reuses a caller-provided transport.
	pub fn with_http_client(
		config: BrokerConfig,
		endpoints: ProviderEndpoints,
		store: Arc<dyn CredentialStore>,
		http_client: ReqwestHttpClient,
	) -> Result<Self> {
		let vault =
			Vault::new(&config.encryption_key).map_err(ConfigError::InvalidEncryptionKey)?;
		let token_endpoint = Arc::new(TokenEndpoint::from_config(&config, &endpoints, http_client)?);

		Ok(Self {
			store,
			config,
			endpoints,
			refresh_metrics: Default::default(),
			vault,
			token_endpoint,
			flow_guards: Default::default(),
		})
	}

	pub(crate) fn flow_guard(&self, id: &UserId) -> Arc<AsyncMutex<()>> {
		let mut guards = self.flow_guards.lock();

		guards.entry(id.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
	}
}
impl Debug for Broker {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Broker")
			.field("endpoints", &self.endpoints)
			.field("client_id", &self.config.client_id)
			.field("callback_url", &self.config.callback_url)
			.finish()
	}
}
