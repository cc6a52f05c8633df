//! Internal facade over the `oauth2` crate for the two token endpoint grants.
//!
//! The remote RPC boundary is exactly what the provider documents: a POST form carrying
//! `grant_type`, client credentials, and either (`code`, `redirect_uri`) or (`refresh_token`),
//! answered with JSON `{access_token, refresh_token?, expires_in, ...}`. Client credentials are
//! sent in the request body (`client_secret_post`).

pub use oauth2;

// std
use std::borrow::Cow;
// crates.io
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, RedirectUrl, RefreshToken, RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError},
};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	config::BrokerConfig,
	error::{ConfigError, ExchangeError},
	http::{ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot},
	provider::ProviderEndpoints,
};

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Plaintext token pair returned by a successful code exchange.
///
/// Values live only for the remainder of the request; the flow encrypts them before persisting.
pub(crate) struct ExchangedTokens {
	pub(crate) access_token: TokenSecret,
	pub(crate) refresh_token: TokenSecret,
}

/// Plaintext result of a refresh call; the provider may decline to rotate the refresh token.
pub(crate) struct RefreshedTokens {
	pub(crate) access_token: TokenSecret,
	pub(crate) refresh_token: Option<TokenSecret>,
}

pub(crate) struct TokenEndpoint {
	oauth_client: ConfiguredBasicClient,
	http_client: ReqwestHttpClient,
}
impl TokenEndpoint {
	pub(crate) fn from_config(
		config: &BrokerConfig,
		endpoints: &ProviderEndpoints,
		http_client: ReqwestHttpClient,
	) -> Result<Self> {
		let auth_url = AuthUrl::new(endpoints.authorization.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let token_url = TokenUrl::new(endpoints.token.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let oauth_client = BasicClient::new(ClientId::new(config.client_id.clone()))
			.set_client_secret(ClientSecret::new(config.client_secret.clone()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url)
			.set_auth_type(AuthType::RequestBody);

		Ok(Self { oauth_client, http_client })
	}

	/// Performs the `authorization_code` grant with the exact redirect URI used at redirect time.
	pub(crate) async fn exchange_authorization_code(
		&self,
		code: &str,
		redirect_uri: &Url,
	) -> Result<ExchangedTokens> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.instrumented(meta.clone());
		let redirect_url = RedirectUrl::new(redirect_uri.to_string())
			.map_err(|source| ConfigError::InvalidRedirect { source })?;
		let response = self
			.oauth_client
			.exchange_code(AuthorizationCode::new(code.to_owned()))
			.set_redirect_uri(Cow::Owned(redirect_url))
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(meta.take(), err))?;
		let access_token = TokenSecret::new(response.access_token().secret().to_owned());
		let refresh_token = response
			.refresh_token()
			.map(|token| TokenSecret::new(token.secret().to_owned()))
			.ok_or(ExchangeError::MissingRefreshToken)?;

		Ok(ExchangedTokens { access_token, refresh_token })
	}

	/// Performs the `refresh_token` grant against the stored (decrypted) refresh token.
	pub(crate) async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.instrumented(meta.clone());
		let refresh_secret = RefreshToken::new(refresh_token.to_owned());
		let response = self
			.oauth_client
			.exchange_refresh_token(&refresh_secret)
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(meta.take(), err))?;

		Ok(RefreshedTokens {
			access_token: TokenSecret::new(response.access_token().secret().to_owned()),
			refresh_token: response
				.refresh_token()
				.map(|token| TokenSecret::new(token.secret().to_owned())),
		})
	}
}

fn map_request_error(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
) -> Error {
	let status = meta.as_ref().and_then(|value| value.status);

	match err {
		RequestTokenError::ServerResponse(response) =>
			map_server_response_error(response, status).into(),
		RequestTokenError::Request(error) => map_transport_error(status, error),
		RequestTokenError::Parse(error, _body) =>
			ExchangeError::MalformedResponse { source: error, status }.into(),
		RequestTokenError::Other(message) => ExchangeError::Unexpected { message, status }.into(),
	}
}

fn map_server_response_error(response: BasicErrorResponse, status: Option<u16>) -> ExchangeError {
	let reason = if let Some(description) = response.error_description() {
		description.clone()
	} else {
		response.error().as_ref().to_owned()
	};

	ExchangeError::Provider { reason, status }
}

fn map_transport_error(status: Option<u16>, err: HttpClientError<ReqwestError>) -> Error {
	match err {
		HttpClientError::Reqwest(inner) => {
			let inner = *inner;

			if inner.is_timeout() {
				ExchangeError::Timeout { status }.into()
			} else {
				ExchangeError::network(inner).into()
			}
		},
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => ExchangeError::Io(inner).into(),
		HttpClientError::Other(message) => ExchangeError::Unexpected { message, status }.into(),
		_ => ExchangeError::Unexpected {
			message: "HTTP client error occurred while calling the token endpoint".into(),
			status,
		}
		.into(),
	}
}
