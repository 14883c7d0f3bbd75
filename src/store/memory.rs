//! Thread-safe in-memory [`CredentialStore`] for hosts that manage persistence themselves.

// self
use crate::{
	_prelude::*,
	auth::{CredentialName, Credentials},
	store::{CredentialStore, StoreFuture},
};

type StoreMap = Arc<RwLock<HashMap<CredentialName, Credentials>>>;

/// Storage backend that keeps credentials in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Creates a store holding a single credential entry.
	pub fn seeded(name: CredentialName, credentials: Credentials) -> Self {
		Self(Arc::new(RwLock::new(HashMap::from_iter([(name, credentials)]))))
	}

	/// Returns a snapshot of the entry stored under `name`.
	pub fn snapshot(&self, name: &str) -> Option<Credentials> {
		self.0.read().get(name).cloned()
	}

	fn invalidate_now(map: StoreMap, name: &CredentialName) -> Option<Credentials> {
		let mut guard = map.write();
		let entry = guard.get_mut(name)?;

		*entry = entry.clone().without_token();

		Some(entry.clone())
	}
}
impl CredentialStore for MemoryStore {
	fn get<'a>(&'a self, name: &'a CredentialName) -> StoreFuture<'a, Option<Credentials>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().get(name).cloned()) })
	}

	fn put(&self, name: CredentialName, credentials: Credentials) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().insert(name, credentials);

			Ok(())
		})
	}

	fn invalidate<'a>(
		&'a self,
		name: &'a CredentialName,
	) -> StoreFuture<'a, Option<Credentials>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::invalidate_now(map, name)) })
	}
}
