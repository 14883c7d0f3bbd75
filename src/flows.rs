//! Broker entry points: token lifecycle, retrying execution, pagination, and AI-interview calls.

pub mod ai_interview;
pub mod execute;
pub mod paginate;
pub mod token;

mod common;

pub use ai_interview::*;
pub use paginate::*;
pub use token::*;

// self
use crate::{
	_prelude::*,
	auth::CredentialName,
	config::ApiConfig,
	http::ApiHttpClient,
	store::CredentialStore,
	transport::TransportErrorMapper,
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, transport::ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Broker specialized for the crate's default reqwest transport stack.
pub type ReqwestBroker = Broker<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Executes authenticated iTalent API calls for one stored credential.
///
/// The broker owns the HTTP client, the credential store handle, and the configuration so the
/// individual entry points can focus on their own logic (token reuse, the one-shot retry,
/// pagination). Clones share the HTTP client, the metrics, and the singleflight guards.
#[derive(Clone)]
pub struct Broker<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Credential store holding app credentials and the cached token.
	pub store: Arc<dyn CredentialStore>,
	/// Name of the credential entry this broker authenticates with.
	pub credential: CredentialName,
	/// Token and pagination settings.
	pub config: ApiConfig,
	/// Shared counters for token exchanges.
	pub token_metrics: Arc<TokenMetrics>,
	flow_guards: Arc<Mutex<HashMap<CredentialName, Arc<AsyncMutex<()>>>>>,
}
impl<C, M> Broker<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a broker that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		store: Arc<dyn CredentialStore>,
		credential: CredentialName,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			store,
			credential,
			config: ApiConfig::default(),
			token_metrics: Default::default(),
			flow_guards: Default::default(),
		}
	}

	/// Replaces the configuration.
	pub fn with_config(mut self, config: ApiConfig) -> Self {
		self.config = config;

		self
	}

	/// Returns a broker for another credential entry that shares this broker's transport,
	/// metrics, and singleflight guards.
	pub fn for_credential(&self, credential: CredentialName) -> Self {
		Self {
			http_client: self.http_client.clone(),
			transport_mapper: self.transport_mapper.clone(),
			store: self.store.clone(),
			credential,
			config: self.config.clone(),
			token_metrics: self.token_metrics.clone(),
			flow_guards: self.flow_guards.clone(),
		}
	}
}
#[cfg(feature = "reqwest")]
impl Broker<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a new broker for the named credential entry.
	///
	/// The broker provisions its own reqwest-backed transport so callers do not need to pass
	/// HTTP handles explicitly.
	pub fn new(store: Arc<dyn CredentialStore>, credential: CredentialName) -> Self {
		Self::with_http_client(
			store,
			credential,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Debug for Broker<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Broker")
			.field("credential", &self.credential)
			.field("config", &self.config)
			.finish()
	}
}
