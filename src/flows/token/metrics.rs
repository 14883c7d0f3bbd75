// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for token exchanges.
#[derive(Debug, Default)]
pub struct TokenMetrics {
	exchanges: AtomicU64,
	forced_refreshes: AtomicU64,
	failures: AtomicU64,
}
impl TokenMetrics {
	/// Returns the number of tokens issued by the token endpoint.
	pub fn exchanges(&self) -> u64 {
		self.exchanges.load(Ordering::Relaxed)
	}

	/// Returns the number of refreshes forced by an authorization failure.
	pub fn forced_refreshes(&self) -> u64 {
		self.forced_refreshes.load(Ordering::Relaxed)
	}

	/// Returns the number of token exchanges that failed.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	pub(crate) fn record_exchange(&self) {
		self.exchanges.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_forced_refresh(&self) {
		self.forced_refreshes.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}
}
