//! Optional observability helpers for broker requests.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `italent_broker.request` with the `kind`
//!   and `stage` (call site) fields, plus events for token refreshes and pagination stops.
//! - Enable `metrics` to increment the `italent_broker_request_total` counter for every
//!   attempt/success/failure, labeled by `kind` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Request kinds observed by the broker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestKind {
	/// Client-credentials exchange against the token endpoint.
	TokenExchange,
	/// One logical API call, including its possible retry.
	Execute,
	/// A cursor pagination run.
	Paginate,
}
impl RequestKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestKind::TokenExchange => "token_exchange",
			RequestKind::Execute => "execute",
			RequestKind::Paginate => "paginate",
		}
	}
}
impl Display for RequestKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
	/// Entry to a broker entry point.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl RequestOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestOutcome::Attempt => "attempt",
			RequestOutcome::Success => "success",
			RequestOutcome::Failure => "failure",
		}
	}

	/// Maps a result onto [`RequestOutcome::Success`] or [`RequestOutcome::Failure`].
	pub fn of<T, E>(result: &std::result::Result<T, E>) -> Self {
		match result {
			Ok(_) => RequestOutcome::Success,
			Err(_) => RequestOutcome::Failure,
		}
	}
}
impl Display for RequestOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
