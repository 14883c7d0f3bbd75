//! Client-credentials token lifecycle with caching + singleflight guards.
//!
//! [`Broker::current_token`] reuses the cached token until it enters the preemptive window, and
//! only then calls the token endpoint. [`Broker::refresh_token`] is the forced path taken after an
//! authorization failure. A per-credential singleflight guard makes concurrent callers wait for
//! the in-flight exchange instead of stampeding the token endpoint.

mod metrics;

pub use metrics::TokenMetrics;

// crates.io
use oauth2::HttpResponse;
use serde_json::json;
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Credentials},
	config::MAX_TOKEN_LIFETIME,
	error::{AuthExchangeError, ConfigError, TransportError},
	flows::{Broker, common},
	http::ApiHttpClient,
	obs::{self, RequestKind, RequestOutcome, RequestSpan},
	request::RequestDescriptor,
	transport::{self, TransportErrorMapper},
};

const CLIENT_CREDENTIALS_GRANT: &str = "client_credentials";

/// Token bound to the endpoint it was issued for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiSession {
	/// Base URL every request path is appended to.
	pub base_url: Url,
	/// Bearer token sent in the `Authorization` header.
	pub token: AccessToken,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
	#[serde(default)]
	access_token: Option<String>,
	#[serde(default)]
	expires_in: Option<Value>,
	#[serde(default)]
	error: Option<String>,
	#[serde(default)]
	error_description: Option<String>,
}

impl<C, M> Broker<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges the app key and secret for a new access token.
	///
	/// The token is returned scheme-prefixed (`Bearer ...`) and is not written to the store.
	pub async fn fetch_token(&self, credentials: &Credentials) -> Result<AccessToken> {
		const KIND: RequestKind = RequestKind::TokenExchange;

		let span = RequestSpan::new(KIND, "fetch_token");

		obs::record_request_outcome(KIND, RequestOutcome::Attempt);

		let result = span
			.instrument(async move {
				let body = json!({
					"grant_type": CLIENT_CREDENTIALS_GRANT,
					"app_key": credentials.app_key,
					"app_secret": credentials.app_secret.expose(),
				});
				let descriptor =
					RequestDescriptor::post(self.config.token_path.as_str()).json(body);
				let request = transport::build_request(&credentials.base_url, &descriptor, None)?;
				let response = self.dispatch(request, None).await?;

				parse_token_response(
					&response,
					OffsetDateTime::now_utc(),
					self.config.default_token_lifetime(),
				)
			})
			.await;

		match &result {
			Ok(_) => self.token_metrics.record_exchange(),
			Err(_) => self.token_metrics.record_failure(),
		}

		obs::record_request_outcome(KIND, RequestOutcome::of(&result));

		result
	}

	/// Returns a usable token, reusing the cached one when it is outside the preemptive window.
	///
	/// Newly issued tokens are written back to the credential store.
	pub async fn current_token(&self) -> Result<ApiSession> {
		let guard = common::flow_guard(self, &self.credential);
		let _singleflight = guard.lock().await;
		let credentials = self.load_credentials().await?;
		let now = OffsetDateTime::now_utc();
		let window = self.config.preemptive_window();
		let cached = credentials.cached_token();

		if let Some(token) = cached.as_ref().filter(|token| !token.needs_refresh_at(now, window)) {
			return Ok(ApiSession { base_url: credentials.base_url, token: token.clone() });
		}

		obs::record_token_refresh(if cached.is_some() { "expiring" } else { "missing" });

		self.renew(credentials).await
	}

	/// Discards the cached token and obtains a new one.
	pub async fn refresh_token(&self) -> Result<ApiSession> {
		let guard = common::flow_guard(self, &self.credential);
		let _singleflight = guard.lock().await;

		self.token_metrics.record_forced_refresh();
		obs::record_token_refresh("forced");

		let credentials = self.invalidate().await?;

		self.renew(credentials).await
	}

	/// Clears the cached token in the store, returning the updated credentials.
	pub async fn invalidate(&self) -> Result<Credentials> {
		self.store
			.invalidate(&self.credential)
			.await?
			.ok_or_else(|| self.missing_credentials())
	}

	/// Checks that the stored app key and secret are accepted by the token endpoint.
	///
	/// The issued token is discarded; the store is left untouched.
	pub async fn verify_credentials(&self) -> Result<()> {
		let credentials = self.load_credentials().await?;

		self.fetch_token(&credentials).await.map(|_| ())
	}

	async fn load_credentials(&self) -> Result<Credentials> {
		self.store.get(&self.credential).await?.ok_or_else(|| self.missing_credentials())
	}

	async fn renew(&self, credentials: Credentials) -> Result<ApiSession> {
		let token = self.fetch_token(&credentials).await?;
		let base_url = credentials.base_url.clone();

		self.store.put(self.credential.clone(), credentials.with_token(&token)).await?;

		Ok(ApiSession { base_url, token })
	}

	fn missing_credentials(&self) -> Error {
		ConfigError::MissingCredentials { name: self.credential.to_string() }.into()
	}
}

/// Parses a token endpoint response issued at `now`.
fn parse_token_response(
	response: &HttpResponse,
	now: OffsetDateTime,
	default_lifetime: Duration,
) -> Result<AccessToken> {
	let status = response.status();
	let mut de = serde_json::Deserializer::from_slice(response.body());
	let parsed: TokenResponse = match serde_path_to_error::deserialize(&mut de) {
		Ok(parsed) => parsed,
		Err(_) if !status.is_success() => return Err(status_error(response).into()),
		Err(source) =>
			return Err(TransportError::Decode { source, status: Some(status.as_u16()) }.into()),
	};

	if !status.is_success() {
		if parsed.error.is_none() && parsed.error_description.is_none() {
			return Err(status_error(response).into());
		}

		return Err(AuthExchangeError::from_fields(
			parsed.error,
			parsed.error_description,
			Some(status.as_u16()),
		)
		.into());
	}

	let Some(raw) = parsed.access_token.filter(|token| !token.is_empty()) else {
		return Err(AuthExchangeError::from_fields(
			parsed.error,
			parsed.error_description,
			Some(status.as_u16()),
		)
		.into());
	};
	let lifetime = parsed
		.expires_in
		.as_ref()
		.and_then(lifetime_secs)
		.filter(|secs| *secs > 0)
		.map(|secs| Duration::seconds(secs).min(MAX_TOKEN_LIFETIME))
		.unwrap_or(default_lifetime);

	Ok(AccessToken::issued(&raw, now, lifetime))
}

fn lifetime_secs(value: &Value) -> Option<i64> {
	match value {
		Value::Number(number) =>
			number.as_i64().or_else(|| number.as_f64().map(|secs| secs as i64)),
		Value::String(text) => text.trim().parse().ok(),
		_ => None,
	}
}

fn status_error(response: &HttpResponse) -> TransportError {
	TransportError::Status {
		status: response.status().as_u16(),
		body: transport::truncate_preview(String::from_utf8_lossy(response.body()).into_owned()),
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::StatusCode;
	use time::macros;
	// self
	use super::*;

	fn response(status: u16, body: &str) -> HttpResponse {
		let mut response = HttpResponse::new(body.as_bytes().to_vec());

		*response.status_mut() =
			StatusCode::from_u16(status).expect("Status fixture should be valid.");

		response
	}

	fn parse(status: u16, body: &str) -> Result<AccessToken> {
		parse_token_response(
			&response(status, body),
			macros::datetime!(2025-01-01 00:00 UTC),
			Duration::seconds(7_200),
		)
	}

	#[test]
	fn tokens_are_bearer_prefixed_and_expire_per_response() {
		let token = parse(200, r#"{"access_token":"abc","expires_in":600,"token_type":"bearer"}"#)
			.expect("Token response should parse.");

		assert_eq!(token.header_value(), "Bearer abc");
		assert_eq!(token.expires_at, macros::datetime!(2025-01-01 00:10 UTC));
	}

	#[test]
	fn missing_or_non_positive_lifetimes_use_the_default() {
		for body in [
			r#"{"access_token":"abc"}"#,
			r#"{"access_token":"abc","expires_in":0}"#,
			r#"{"access_token":"abc","expires_in":-5}"#,
			r#"{"access_token":"abc","expires_in":null}"#,
		] {
			let token = parse(200, body).expect("Token response should parse.");

			assert_eq!(token.expires_at, macros::datetime!(2025-01-01 02:00 UTC), "{body}");
		}
	}

	#[test]
	fn oversized_lifetimes_are_clamped() {
		for body in [
			r#"{"access_token":"abc","expires_in":999999999999}"#,
			r#"{"access_token":"abc","expires_in":9.9e300}"#,
			r#"{"access_token":"abc","expires_in":"9223372036854775807"}"#,
		] {
			let token = parse(200, body).expect("Oversized lifetimes should still parse.");

			assert_eq!(token.expires_at, macros::datetime!(2026-01-01 00:00 UTC), "{body}");
		}
	}

	#[test]
	fn missing_tokens_surface_the_server_reason() {
		let err = parse(200, r#"{"error":"invalid_client","error_description":"bad secret"}"#)
			.expect_err("Responses without a token should fail.");

		match err {
			Error::AuthExchange(inner) => {
				assert_eq!(inner.reason, "bad secret");
				assert_eq!(inner.error.as_deref(), Some("invalid_client"));
				assert_eq!(inner.status, Some(200));
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}

		match parse(200, "{}").expect_err("Empty objects should fail.") {
			Error::AuthExchange(inner) => assert_eq!(inner.reason, "unknown error"),
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn error_statuses_prefer_structured_reasons() {
		match parse(400, r#"{"error":"invalid_grant"}"#).expect_err("400 should fail.") {
			Error::AuthExchange(inner) => {
				assert_eq!(inner.reason, "invalid_grant");
				assert_eq!(inner.status, Some(400));
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}

		assert!(matches!(
			parse(502, "<html>bad gateway</html>").expect_err("502 should fail."),
			Error::Transport(TransportError::Status { status: 502, .. })
		));
	}

	#[test]
	fn non_object_success_bodies_are_decode_errors() {
		assert!(matches!(
			parse(200, r#"["abc"]"#).expect_err("Arrays are not token responses."),
			Error::Transport(TransportError::Decode { status: Some(200), .. })
		));
	}
}
