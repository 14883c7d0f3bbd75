//! Authenticated request execution for the iTalent HR open API: cached client-credential tokens,
//! one-shot refresh-and-retry, response normalization, and bounded cursor pagination.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod input;
pub mod normalize;
pub mod obs;
pub mod request;
pub mod store;
pub mod transport;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{CredentialName, Credentials},
		config::ApiConfig,
		flows::Broker,
		http::ReqwestHttpClient,
		store::{CredentialStore, MemoryStore},
		transport::ReqwestTransportErrorMapper,
	};

	/// Broker type alias used by reqwest-backed integration tests.
	pub type ReqwestTestBroker = Broker<ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Credential name seeded by [`build_reqwest_test_broker`].
	pub const TEST_CREDENTIAL: &str = "italent-test";
	/// App key seeded by [`build_reqwest_test_broker`].
	pub const TEST_APP_KEY: &str = "test-app-key";
	/// App secret seeded by [`build_reqwest_test_broker`].
	pub const TEST_APP_SECRET: &str = "test-app-secret";

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

	/// Returns the credential name used across integration tests.
	pub fn test_credential_name() -> CredentialName {
		CredentialName::new(TEST_CREDENTIAL).expect("Test credential name should be valid.")
	}

	/// Builds credentials pointing at the provided mock server base URL.
	pub fn test_credentials(base_url: &str) -> Credentials {
		let base_url = Url::parse(base_url).expect("Mock server base URL should parse.");

		Credentials::new(base_url, TEST_APP_KEY, TEST_APP_SECRET)
	}

	/// Constructs a [`Broker`] backed by an in-memory store seeded with `credentials`, the
	/// default configuration (with the inter-page delay disabled), and the reqwest transport.
	pub fn build_reqwest_test_broker(
		credentials: Credentials,
	) -> (ReqwestTestBroker, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::seeded(test_credential_name(), credentials));
		let store: Arc<dyn CredentialStore> = store_backend.clone();
		let mut config = ApiConfig::default();

		config.pagination.inter_page_delay_ms = 0;

		let broker = Broker::with_http_client(
			store,
			test_credential_name(),
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		)
		.with_config(config);

		(broker, store_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
