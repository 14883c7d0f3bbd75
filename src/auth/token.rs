//! Bearer access tokens with expiry tracking.

// self
use crate::{_prelude::*, auth::Secret};

/// Lifecycle status of an access token at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStatus {
	/// Token is usable.
	Active,
	/// Token is usable but falls inside the preemptive refresh window.
	Expiring,
	/// Token reached its expiry instant.
	Expired,
}

/// Access token handed to callers as a ready-to-send `Authorization` header value.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
	/// Scheme-prefixed token (`Bearer ...`); callers must avoid logging it.
	pub value: Secret,
	/// Instant the token was issued, when known.
	pub issued_at: Option<OffsetDateTime>,
	/// Instant after which the token must not be used.
	pub expires_at: OffsetDateTime,
}
impl AccessToken {
	/// Builds a token from a raw token endpoint value issued at `issued_at`.
	///
	/// The expiry saturates at the largest representable instant.
	pub fn issued(raw: &str, issued_at: OffsetDateTime, lifetime: Duration) -> Self {
		Self {
			value: Secret::bearer(raw),
			issued_at: Some(issued_at),
			expires_at: issued_at.saturating_add(lifetime),
		}
	}

	/// Computes the status at `instant`, treating the last `window` before expiry as expiring.
	pub fn status_at(&self, instant: OffsetDateTime, window: Duration) -> TokenStatus {
		if instant >= self.expires_at {
			return TokenStatus::Expired;
		}
		if self.expires_at - instant <= window {
			return TokenStatus::Expiring;
		}

		TokenStatus::Active
	}

	/// Returns `true` if the token has expired at `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}

	/// Returns `true` if the token must be refreshed before use at `instant`.
	pub fn needs_refresh_at(&self, instant: OffsetDateTime, window: Duration) -> bool {
		!matches!(self.status_at(instant, window), TokenStatus::Active)
	}

	/// Returns the `Authorization` header value.
	pub fn header_value(&self) -> &str {
		self.value.expose()
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("value", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
