//! Broker-level error types shared across flows, transports, and stores.

// self
use crate::_prelude::*;

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Caller input was rejected before anything was sent.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// The token endpoint did not issue an access token.
	#[error(transparent)]
	AuthExchange(#[from] AuthExchangeError),
	/// Transport failure on the first attempt (network, TLS, non-2xx status).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Transport failure on the attempt made after refreshing the access token.
	#[error("Request still failed after refreshing the access token: {source}")]
	TransportAfterRefresh {
		/// Failure observed on the retry attempt.
		#[source]
		source: TransportError,
	},
	/// The endpoint reported a failure inside a transport-successful response.
	#[error(transparent)]
	Business(#[from] BusinessError),
}
impl Error {
	/// Returns `true` when the failure is an HTTP 401 on the first attempt.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Transport(err) if err.is_unauthorized())
	}

	/// Returns the HTTP status attached to the failure, when one is known.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Transport(err) | Self::TransportAfterRefresh { source: err } => err.status(),
			Self::AuthExchange(err) => err.status,
			_ => None,
		}
	}
}

/// Configuration and request-construction failures raised by the broker.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed (bad method, header name, or header value).
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// A base URL or endpoint path does not form a valid URL.
	#[error("Endpoint URL `{url}` is invalid.")]
	InvalidUrl {
		/// URL string that failed to parse.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The credential store holds no entry for the configured name.
	#[error("No credentials are stored under `{name}`.")]
	MissingCredentials {
		/// Credential name that was looked up.
		name: String,
	},
	/// Configuration document could not be parsed.
	#[error("Configuration is invalid.")]
	Parse {
		/// Structured parsing failure with the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Configuration file could not be read.
	#[error("Configuration file {path} could not be read.")]
	Read {
		/// Path that failed to load.
		path: String,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Caller input rejected before any request is sent.
#[derive(Debug, ThisError)]
pub enum ValidationError {
	/// A JSON string input could not be parsed.
	#[error("The `{field}` input is not valid JSON: {source}.")]
	InvalidJson {
		/// Input name.
		field: &'static str,
		/// Parser failure.
		#[source]
		source: serde_json::Error,
	},
	/// A JSON input parsed, but is not an object.
	#[error("The `{field}` input must be a JSON object or a JSON object string.")]
	NotAnObject {
		/// Input name.
		field: &'static str,
	},
	/// Invite IDs were neither an array nor a JSON array string.
	#[error("Invite IDs must be a JSON array or a string containing a JSON array.")]
	InviteIdsNotArray,
	/// Too many invite IDs were supplied for a single request.
	#[error("At most {max} invite IDs are accepted per request, but {count} were provided.")]
	TooManyInviteIds {
		/// Number of IDs after trimming, blank filtering, and deduplication.
		count: usize,
		/// Maximum accepted per request.
		max: usize,
	},
}

/// The token endpoint answered without an access token.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Failed to obtain an access token: {reason}.")]
pub struct AuthExchangeError {
	/// Server-supplied `error_description`, falling back to `error`, verbatim.
	pub reason: String,
	/// Server-supplied `error` code, when present.
	pub error: Option<String>,
	/// HTTP status of the token response, when available.
	pub status: Option<u16>,
}
impl AuthExchangeError {
	/// Builds an error from the token endpoint's `error` and `error_description` fields.
	pub fn from_fields(
		error: Option<String>,
		error_description: Option<String>,
		status: Option<u16>,
	) -> Self {
		let reason = error_description
			.filter(|value| !value.is_empty())
			.or_else(|| error.clone().filter(|value| !value.is_empty()))
			.unwrap_or_else(|| "unknown error".into());

		Self { reason, error, status }
	}
}

/// Transport-level failures (network, IO, HTTP status, undecodable bodies).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// The endpoint answered with a non-success HTTP status.
	#[error("Endpoint responded with HTTP {status}: {body}")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Preview of the response body.
		body: String,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the iTalent API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// No response headers arrived within the per-call timeout.
	#[error("Timed out waiting for the iTalent API to send response headers.")]
	Timeout,
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the iTalent API.")]
	Io(#[from] std::io::Error),
	/// The response declared JSON but the body could not be decoded.
	#[error("The iTalent API returned malformed JSON.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Returns the HTTP status attached to the failure, when one is known.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } => Some(*status),
			Self::Decode { status, .. } => *status,
			_ => None,
		}
	}

	/// Returns `true` for HTTP 401 responses.
	pub fn is_unauthorized(&self) -> bool {
		self.status() == Some(401)
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() {
			return Self::Timeout;
		}

		Self::network(e)
	}
}

/// Which attempt of a logical request produced an outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attempt {
	/// The first attempt, made with the cached (or freshly fetched) token.
	Initial,
	/// The single retry made after forcing a token refresh.
	AfterRefresh,
}
impl Attempt {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Initial => "initial",
			Self::AfterRefresh => "after_refresh",
		}
	}

	/// Human-readable prefix used when surfacing business errors.
	pub const fn prefix(self) -> &'static str {
		match self {
			Self::Initial => "Request to the iTalent API failed",
			Self::AfterRefresh =>
				"Request to the iTalent API still failed after refreshing the access token",
		}
	}
}
impl Display for Attempt {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Endpoint-level failure reported inside a transport-successful response.
#[derive(Clone, Debug, PartialEq, ThisError)]
#[error(
	"{}: {} (error code: {}).",
	attempt_prefix(.attempt),
	message_or_default(.message),
	code_or_unknown(.code)
)]
pub struct BusinessError {
	/// Platform error code, stringified; `None` when the response carried none.
	pub code: Option<String>,
	/// Platform error message, when present.
	pub message: Option<String>,
	/// Attempt that produced the failure.
	pub attempt: Attempt,
	/// Full response body for diagnostics.
	pub body: Value,
}
impl BusinessError {
	/// Sentinel rendered when the platform omitted an error code.
	pub const UNKNOWN_CODE: &'static str = "UNKNOWN";

	/// Returns the platform error code, or [`Self::UNKNOWN_CODE`].
	pub fn code_or_unknown(&self) -> &str {
		code_or_unknown(&self.code)
	}
}

fn attempt_prefix(attempt: &Attempt) -> &'static str {
	attempt.prefix()
}

fn message_or_default(message: &Option<String>) -> &str {
	message.as_deref().filter(|value| !value.is_empty()).unwrap_or("unknown error")
}

fn code_or_unknown(code: &Option<String>) -> &str {
	code.as_deref().unwrap_or(BusinessError::UNKNOWN_CODE)
}
