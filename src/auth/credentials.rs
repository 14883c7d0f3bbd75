//! App credentials as held by the credential store, including the cached bearer token.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Secret},
	config,
	error::ConfigError,
};

/// App credentials for one iTalent tenant plus the last issued token.
///
/// The cached token is stored as a scheme-prefixed header value with an absolute expiry in
/// Unix epoch milliseconds, matching how host credential stores persist expirable fields.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
	/// API base URL every request path is appended to.
	pub base_url: Url,
	/// App key issued by the open platform.
	pub app_key: String,
	/// App secret issued by the open platform.
	pub app_secret: Secret,
	/// Cached `Bearer ...` header value, when a token has been issued.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cached_token: Option<Secret>,
	/// Expiry of `cached_token` in Unix epoch milliseconds.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub token_expiry_epoch_ms: Option<i64>,
}
impl Credentials {
	/// Creates credentials without a cached token.
	pub fn new(base_url: Url, app_key: impl Into<String>, app_secret: impl Into<String>) -> Self {
		Self {
			base_url,
			app_key: app_key.into(),
			app_secret: Secret::new(app_secret),
			cached_token: None,
			token_expiry_epoch_ms: None,
		}
	}

	/// Creates credentials for the public iTalent endpoint ([`config::DEFAULT_BASE_URL`]).
	pub fn for_default_endpoint(
		app_key: impl Into<String>,
		app_secret: impl Into<String>,
	) -> Result<Self, ConfigError> {
		let base_url = Url::parse(config::DEFAULT_BASE_URL).map_err(|source| {
			ConfigError::InvalidUrl { url: config::DEFAULT_BASE_URL.into(), source }
		})?;

		Ok(Self::new(base_url, app_key, app_secret))
	}

	/// Returns a copy carrying `token` as the cached token.
	pub fn with_token(mut self, token: &AccessToken) -> Self {
		self.cached_token = Some(token.value.clone());
		self.token_expiry_epoch_ms = Some(to_epoch_ms(token.expires_at));

		self
	}

	/// Returns a copy with the cached token cleared, forcing the next fetch to re-authenticate.
	pub fn without_token(mut self) -> Self {
		self.cached_token = None;
		self.token_expiry_epoch_ms = None;

		self
	}

	/// Returns the cached token, if one is present with a known expiry.
	///
	/// A token without a recorded expiry is never reused.
	pub fn cached_token(&self) -> Option<AccessToken> {
		let value = self.cached_token.as_ref().filter(|secret| !secret.is_empty())?;
		let expires_at = self.token_expiry_epoch_ms.and_then(from_epoch_ms)?;

		Some(AccessToken { value: value.clone(), issued_at: None, expires_at })
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("base_url", &self.base_url.as_str())
			.field("app_key", &self.app_key)
			.field("app_secret", &"<redacted>")
			.field("cached_token", &self.cached_token.as_ref().map(|_| "<redacted>"))
			.field("token_expiry_epoch_ms", &self.token_expiry_epoch_ms)
			.finish()
	}
}

fn to_epoch_ms(instant: OffsetDateTime) -> i64 {
	i64::try_from(instant.unix_timestamp_nanos() / 1_000_000).unwrap_or(i64::MAX)
}

fn from_epoch_ms(ms: i64) -> Option<OffsetDateTime> {
	OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000).ok()
}
