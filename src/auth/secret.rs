//! Secret wrapper that keeps app secrets and bearer tokens out of logs.

// self
use crate::_prelude::*;

/// Redacted secret wrapper; `Debug` and `Display` never print the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);
impl Secret {
	/// Authorization scheme prepended to issued access tokens.
	pub const BEARER_SCHEME: &'static str = "Bearer";

	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Wraps a raw access token as a `Bearer <token>` header value.
	///
	/// Values that already carry the scheme are kept as-is.
	pub fn bearer(raw: &str) -> Self {
		let raw = raw.trim();
		let has_scheme = raw
			.get(..Self::BEARER_SCHEME.len() + 1)
			.is_some_and(|head| head.eq_ignore_ascii_case("bearer "));

		if has_scheme { Self(raw.to_owned()) } else { Self(format!("{} {raw}", Self::BEARER_SCHEME)) }
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns `true` when the secret is empty.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl AsRef<str> for Secret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Secret").field(&"<redacted>").finish()
	}
}
impl Display for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = Secret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "Secret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn bearer_prefixes_once() {
		assert_eq!(Secret::bearer("abc").expose(), "Bearer abc");
		assert_eq!(Secret::bearer("Bearer abc").expose(), "Bearer abc");
		assert_eq!(Secret::bearer("bearer abc").expose(), "bearer abc");
		assert_eq!(Secret::bearer("Bearerabc").expose(), "Bearer Bearerabc");
	}
}
