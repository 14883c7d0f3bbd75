//! Demonstrates listing every AI interview activity through the broker's default reqwest
//! transport and in-memory credential store, with the token fetched on first use.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
use url::Url;
// self
use italent_broker::{
	auth::{CredentialName, Credentials},
	flows::{AI_INTERVIEW_ACTIVITIES_PATH, ReqwestBroker},
	store::{CredentialStore, MemoryStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"bearer\",\"expires_in\":7200}",
			);
		})
		.await;
	let first_page = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(AI_INTERVIEW_ACTIVITIES_PATH)
				.header("authorization", "Bearer demo-access")
				.json_body(json!({ "batchId": "" }));
			then.status(200).header("content-type", "application/json").body(
				json!({
					"code": "200",
					"data": {
						"items": [{ "activityId": "act-1", "name": "Backend engineer screening" }],
						"nextBatchId": "b2",
					},
				})
				.to_string(),
			);
		})
		.await;
	let last_page = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(AI_INTERVIEW_ACTIVITIES_PATH)
				.json_body(json!({ "batchId": "b2" }));
			then.status(200).header("content-type", "application/json").body(
				json!({
					"code": "200",
					"data": {
						"items": [{ "activityId": "act-2", "name": "Campus hiring" }],
						"nextBatchId": null,
					},
				})
				.to_string(),
			);
		})
		.await;
	let name = CredentialName::new("demo-tenant")?;
	let credentials = Credentials::new(Url::parse(&server.base_url())?, "demo-key", "demo-secret");
	let store = MemoryStore::default();

	store.put(name.clone(), credentials).await?;

	let store: Arc<dyn CredentialStore> = Arc::new(store);
	let broker = ReqwestBroker::new(store, name);
	let collected = broker.all_ai_interview_activities().await?;

	for item in &collected.items {
		println!("Activity: {item}.");
	}

	println!("Fetched {} page(s); stopped because {:?}.", collected.pages, collected.stop);

	token_mock.assert_async().await;
	first_page.assert_async().await;
	last_page.assert_async().await;

	Ok(())
}
