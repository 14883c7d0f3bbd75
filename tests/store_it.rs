// std
use std::path::PathBuf;
// crates.io
use httpmock::prelude::*;
// self
use italent_broker::{
	_preludet::*,
	auth::AccessToken,
	flows::Broker,
	store::{CredentialStore, FileStore, MemoryStore},
	transport::ReqwestTransportErrorMapper,
};

fn store_path(test: &str) -> PathBuf {
	std::env::temp_dir()
		.join(format!("italent-broker-{}-{test}", std::process::id()))
		.join("credentials.json")
}

fn file_broker(store: FileStore) -> ReqwestTestBroker {
	let store: Arc<dyn CredentialStore> = Arc::new(store);

	Broker::with_http_client(
		store,
		test_credential_name(),
		test_reqwest_http_client(),
		Arc::new(ReqwestTransportErrorMapper),
	)
}

#[tokio::test]
async fn memory_store_round_trips_and_invalidates() {
	let store = MemoryStore::default();
	let name = test_credential_name();
	let token = AccessToken::issued("kept", OffsetDateTime::now_utc(), Duration::hours(1));
	let credentials = test_credentials("https://openapi.italent.cn").with_token(&token);

	store.put(name.clone(), credentials.clone()).await.expect("Put should succeed.");

	let fetched = store.get(&name).await.expect("Get should succeed.");

	assert_eq!(fetched, Some(credentials.clone()));

	let cleared = store
		.invalidate(&name)
		.await
		.expect("Invalidate should succeed.")
		.expect("Invalidated credentials should be returned.");

	assert!(cleared.cached_token().is_none());
	assert_eq!(cleared.app_key, TEST_APP_KEY);
	assert_eq!(store.snapshot(TEST_CREDENTIAL), Some(cleared));
}

#[tokio::test]
async fn file_store_keeps_tokens_across_restarts() {
	let server = MockServer::start_async().await;
	let path = store_path("restart");
	let _ = std::fs::remove_file(&path);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"persisted","expires_in":7200}"#);
		})
		.await;
	let store = FileStore::open(&path).expect("File store should open.");

	store
		.put(test_credential_name(), test_credentials(&server.base_url()))
		.await
		.expect("Seeding the file store should succeed.");

	let first = file_broker(store)
		.current_token()
		.await
		.expect("Initial token request should succeed.");
	let reopened = FileStore::open(&path).expect("File store should reopen.");
	let second = file_broker(reopened)
		.current_token()
		.await
		.expect("Persisted token should be reused.");

	assert_eq!(first.token.header_value(), "Bearer persisted");
	assert_eq!(second.token.header_value(), "Bearer persisted");

	mock.assert_calls_async(1).await;

	let _ = std::fs::remove_file(&path);
}
