//! Credential-store contract and built-in store implementations.
//!
//! The broker never holds credentials itself; it reads them through [`CredentialStore::get`],
//! writes back freshly issued tokens with [`CredentialStore::put`], and clears a stale token
//! with [`CredentialStore::invalidate`].

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{CredentialName, Credentials},
};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for app credentials and their cached tokens.
///
/// Implementations must tolerate concurrent `put` calls for the same name; the broker may race
/// two refreshes, and either resulting token is valid.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Fetches the credentials stored under `name`, if present.
	fn get<'a>(&'a self, name: &'a CredentialName) -> StoreFuture<'a, Option<Credentials>>;

	/// Persists or replaces the credentials stored under `name`.
	fn put(&self, name: CredentialName, credentials: Credentials) -> StoreFuture<'_, ()>;

	/// Clears the cached token for `name`, returning the updated credentials if present.
	fn invalidate<'a>(&'a self, name: &'a CredentialName)
	-> StoreFuture<'a, Option<Credentials>>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
