//! Description of a single logical API call, independent of any token or transport.

// crates.io
use oauth2::http::Method;
// self
use crate::{_prelude::*, error::ValidationError};

/// One logical iTalent API call.
///
/// A descriptor is replayed verbatim on the retry after a token refresh, so it carries no
/// authorization state of its own.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestDescriptor {
	/// HTTP method.
	pub method: Method,
	/// Endpoint path appended to the credential's base URL.
	pub path: String,
	/// JSON request body.
	pub body: Option<Value>,
	/// Header timeout for this call; `None` keeps the transport default.
	pub timeout: Option<std::time::Duration>,
	/// Extra headers added after the authorization and content headers.
	pub headers: BTreeMap<String, String>,
}
impl RequestDescriptor {
	/// Creates a descriptor for `method` against `path`.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self { method, path: path.into(), body: None, timeout: None, headers: BTreeMap::new() }
	}

	/// Creates a `POST` descriptor, the method every iTalent business endpoint uses.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::POST, path)
	}

	/// Attaches a JSON body.
	pub fn json(mut self, body: Value) -> Self {
		self.body = Some(body);

		self
	}

	/// Parses `raw` as JSON and attaches it as the body.
	///
	/// Blank strings leave the descriptor without a body.
	pub fn json_str(self, raw: &str) -> Result<Self, ValidationError> {
		if raw.trim().is_empty() {
			return Ok(self);
		}

		let body = serde_json::from_str(raw)
			.map_err(|source| ValidationError::InvalidJson { field: "body", source })?;

		Ok(self.json(body))
	}

	/// Sets the header timeout.
	pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Sets the header timeout from milliseconds; `0` keeps the transport default.
	pub fn with_timeout_ms(self, timeout_ms: u64) -> Self {
		if timeout_ms == 0 {
			return self;
		}

		self.with_timeout(std::time::Duration::from_millis(timeout_ms))
	}

	/// Adds (or replaces) a custom header.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}
}
