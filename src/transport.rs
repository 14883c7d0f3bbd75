//! Authenticated transport: turns a [`RequestDescriptor`] plus a bearer token into exactly one
//! HTTP call and maps transport failures into broker errors.

// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
	http::{
		Request,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
	},
};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError, ValidationError},
	flows::{ApiSession, Broker},
	http::ApiHttpClient,
	request::RequestDescriptor,
};

/// Maximum number of characters kept from an error response body.
pub const BODY_PREVIEW_LIMIT: usize = 256;

const JSON_MEDIA_TYPE: &str = "application/json";

/// Maps HTTP transport failures into broker [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a broker error.
	fn map_transport_error(&self, error: HttpClientError<E>) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(&self, err: HttpClientError<ReqwestError>) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(*inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => map_io_error(inner).into(),
			HttpClientError::Other(message) =>
				TransportError::Network { source: message.into() }.into(),
			_ => TransportError::Network { source: "unrecognized HTTP client failure".into() }
				.into(),
		}
	}
}

impl<C, M> Broker<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Sends `descriptor` once with the session's token.
	///
	/// Non-2xx responses become [`TransportError::Status`] with a body preview; everything else
	/// is returned untouched for [`crate::normalize::interpret`].
	pub async fn send(
		&self,
		session: &ApiSession,
		descriptor: &RequestDescriptor,
	) -> Result<HttpResponse> {
		let authorization = session.token.header_value();
		let request = build_request(&session.base_url, descriptor, Some(authorization))?;
		let response = self.dispatch(request, descriptor.timeout).await?;

		ensure_success(response).map_err(Error::from)
	}

	/// Executes a prepared request through a fresh transport handle.
	pub(crate) async fn dispatch(
		&self,
		request: HttpRequest,
		timeout: Option<std::time::Duration>,
	) -> Result<HttpResponse> {
		let handle = self.http_client.handle(timeout);

		handle.call(request).await.map_err(|err| self.transport_mapper.map_transport_error(err))
	}
}

/// Joins `path` onto `base_url`, keeping any path prefix the base URL carries.
pub fn endpoint_url(base_url: &Url, path: &str) -> Result<Url, ConfigError> {
	let base = base_url.as_str().trim_end_matches('/');
	let joined = if path.starts_with('/') {
		format!("{base}{path}")
	} else {
		format!("{base}/{path}")
	};

	Url::parse(&joined).map_err(|source| ConfigError::InvalidUrl { url: joined, source })
}

/// Builds the HTTP request for `descriptor`, optionally carrying an `Authorization` header.
pub(crate) fn build_request(
	base_url: &Url,
	descriptor: &RequestDescriptor,
	authorization: Option<&str>,
) -> Result<HttpRequest> {
	let url = endpoint_url(base_url, &descriptor.path)?;
	let body = match &descriptor.body {
		Some(value) => serde_json::to_vec(value)
			.map_err(|source| ValidationError::InvalidJson { field: "body", source })?,
		None => Vec::new(),
	};
	let mut builder = Request::builder()
		.method(descriptor.method.clone())
		.uri(url.as_str())
		.header(CONTENT_TYPE, JSON_MEDIA_TYPE)
		.header(ACCEPT, JSON_MEDIA_TYPE);

	if let Some(value) = authorization {
		builder = builder.header(AUTHORIZATION, value);
	}
	for (name, value) in &descriptor.headers {
		builder = builder.header(name.as_str(), value.as_str());
	}

	builder.body(body).map_err(|e| ConfigError::from(e).into())
}

/// Passes 2xx responses through and turns everything else into [`TransportError::Status`].
pub(crate) fn ensure_success(response: HttpResponse) -> Result<HttpResponse, TransportError> {
	let status = response.status();

	if status.is_success() {
		return Ok(response);
	}

	Err(TransportError::Status {
		status: status.as_u16(),
		body: truncate_preview(String::from_utf8_lossy(response.body()).into_owned()),
	})
}

/// Shortens a response body to [`BODY_PREVIEW_LIMIT`] characters.
pub(crate) fn truncate_preview(body: String) -> String {
	if body.chars().count() <= BODY_PREVIEW_LIMIT {
		return body;
	}

	let mut buf = String::new();

	for (idx, ch) in body.chars().enumerate() {
		if idx >= BODY_PREVIEW_LIMIT {
			buf.push('…');

			break;
		}
		buf.push(ch);
	}

	buf
}

#[cfg(feature = "reqwest")]
fn map_io_error(err: std::io::Error) -> TransportError {
	if err.kind() == std::io::ErrorKind::TimedOut {
		return TransportError::Timeout;
	}

	TransportError::Io(err)
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}

	TransportError::from(err).into()
}
