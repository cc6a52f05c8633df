// crates.io
use httpmock::prelude::*;
// self
use spotify_auth_broker::{
	_preludet::*,
	auth::{CredentialRecord, UserId},
	error::ExchangeError,
	provider::ProviderEndpoints,
	store::{CredentialStore, MemoryStore},
	vault::Vault,
};

const CALLBACK_URL: &str = "http://localhost:8080/callback";

fn build_endpoints(server: &MockServer) -> ProviderEndpoints {
	ProviderEndpoints::new(&server.url("/authorize"), &server.url("/token"))
		.expect("Mock provider endpoints should parse successfully.")
}

fn test_vault() -> Vault {
	Vault::new(TEST_ENCRYPTION_KEY).expect("Test vault key should be valid.")
}

async fn seed_record(store: &MemoryStore, vault: &Vault, id: &str, access: &str, refresh: &str) {
	let record = CredentialRecord::new(
		UserId::new(id).expect("User id fixture should be valid."),
		vault.encrypt(access).expect("Seeding access token encryption should succeed."),
		vault.encrypt(refresh).expect("Seeding refresh token encryption should succeed."),
	);

	store.upsert(record).await.expect("Failed to seed credential record into the store.");
}

#[tokio::test]
async fn refresh_requires_an_id() {
	let server = MockServer::start_async().await;
	let (broker, _store) = build_test_broker(test_config(CALLBACK_URL), build_endpoints(&server));
	let err = broker.refresh("").await.expect_err("Empty id must be rejected.");

	assert!(matches!(err, Error::MissingParameter { name: "id" }));
}

#[tokio::test]
async fn refresh_unknown_user_performs_no_rpc() {
	let server = MockServer::start_async().await;
	let (broker, _store) = build_test_broker(test_config(CALLBACK_URL), build_endpoints(&server));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"A2\",\"token_type\":\"Bearer\",\"expires_in\":3600}");
		})
		.await;
	let err = broker.refresh("stranger").await.expect_err("Unknown user must be rejected.");

	assert!(matches!(err, Error::UnknownUser { ref id } if id == "stranger"));

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn refresh_rotates_both_tokens_when_provider_rotates() {
	let server = MockServer::start_async().await;
	let (broker, store) = build_test_broker(test_config(CALLBACK_URL), build_endpoints(&server));
	let vault = test_vault();

	seed_record(&store, &vault, "abc123", "A1", "R1").await;

	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.body_includes("grant_type=refresh_token")
				.body_includes("refresh_token=R1");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"A2\",\"refresh_token\":\"R2\",\"token_type\":\"Bearer\",\"expires_in\":3600}");
		})
		.await;

	broker.refresh("abc123").await.expect("Refresh should succeed.");

	mock.assert_async().await;

	let id = UserId::new("abc123").expect("User id fixture should be valid.");
	let record = store
		.find(&id)
		.await
		.expect("Store lookup should succeed.")
		.expect("Record should remain present after refresh.");

	assert_eq!(vault.decrypt(&record.auth.access_token).expect("Access should decrypt."), "A2");
	assert_eq!(vault.decrypt(&record.auth.refresh_token).expect("Refresh should decrypt."), "R2");
}

#[tokio::test]
async fn refresh_keeps_previous_refresh_token_without_rotation() {
	let server = MockServer::start_async().await;
	let (broker, store) = build_test_broker(test_config(CALLBACK_URL), build_endpoints(&server));
	let vault = test_vault();

	seed_record(&store, &vault, "abc123", "A1", "R1").await;

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token").body_includes("grant_type=refresh_token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"A2\",\"token_type\":\"Bearer\",\"expires_in\":3600}");
		})
		.await;

	broker.refresh("abc123").await.expect("Refresh without rotation should succeed.");

	mock.assert_async().await;

	let id = UserId::new("abc123").expect("User id fixture should be valid.");
	let record = store
		.find(&id)
		.await
		.expect("Store lookup should succeed.")
		.expect("Record should remain present after refresh.");

	assert_eq!(vault.decrypt(&record.auth.access_token).expect("Access should decrypt."), "A2");
	assert_eq!(
		vault.decrypt(&record.auth.refresh_token).expect("Refresh should decrypt."),
		"R1",
		"The previously stored refresh token must survive a non-rotating refresh.",
	);
}

#[tokio::test]
async fn failed_refresh_leaves_the_record_unchanged() {
	let server = MockServer::start_async().await;
	let (broker, store) = build_test_broker(test_config(CALLBACK_URL), build_endpoints(&server));
	let vault = test_vault();

	seed_record(&store, &vault, "abc123", "A1", "R1").await;

	let id = UserId::new("abc123").expect("User id fixture should be valid.");
	let before = store
		.find(&id)
		.await
		.expect("Store lookup should succeed.")
		.expect("Seeded record should be present.");
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\"}");
		})
		.await;
	let err = broker.refresh("abc123").await.expect_err("Provider rejection must surface.");

	assert!(matches!(err, Error::ExchangeFailed(ExchangeError::Provider { .. })));

	mock.assert_async().await;

	let after = store
		.find(&id)
		.await
		.expect("Store lookup should succeed.")
		.expect("Record should remain present after a failed refresh.");

	assert_eq!(after, before, "A failed refresh must leave the stored record byte-for-byte unchanged.");
	assert_eq!(broker.refresh_metrics.failures(), 1);
}

#[tokio::test]
async fn concurrent_refreshes_serialize_per_user() {
	let server = MockServer::start_async().await;
	let (broker, store) = build_test_broker(test_config(CALLBACK_URL), build_endpoints(&server));
	let vault = test_vault();

	seed_record(&store, &vault, "abc123", "A1", "R1").await;

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"A2\",\"refresh_token\":\"R2\",\"token_type\":\"Bearer\",\"expires_in\":3600}");
		})
		.await;
	let (first, second) = tokio::join!(broker.refresh("abc123"), broker.refresh("abc123"));

	first.expect("First concurrent refresh should succeed.");
	second.expect("Second concurrent refresh should succeed.");

	// Serialized, not deduplicated: each caller performs its own rotation.
	mock.assert_calls_async(2).await;

	let id = UserId::new("abc123").expect("User id fixture should be valid.");
	let record = store
		.find(&id)
		.await
		.expect("Store lookup should succeed.")
		.expect("Record should remain present after concurrent refreshes.");

	assert_eq!(vault.decrypt(&record.auth.access_token).expect("Access should decrypt."), "A2");
	assert_eq!(vault.decrypt(&record.auth.refresh_token).expect("Refresh should decrypt."), "R2");
	assert_eq!(broker.refresh_metrics.attempts(), 2);
	assert_eq!(broker.refresh_metrics.successes(), 2);
}
