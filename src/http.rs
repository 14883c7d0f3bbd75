//! HTTP client abstraction used for every outbound iTalent call.
//!
//! The broker only depends on [`ApiHttpClient`]. Each call asks the client for a short-lived
//! [`AsyncHttpClient`] handle carrying the call's header timeout, so custom transports can be
//! plugged in without touching flow code. Transports report a header timeout as
//! [`HttpClientError::Io`] with [`std::io::ErrorKind::TimedOut`].

// std
#[cfg(feature = "reqwest")] use std::{io, ops::Deref};
// crates.io
use oauth2::{AsyncHttpClient, HttpClientError};
#[cfg(feature = "reqwest")] use oauth2::{HttpRequest, HttpResponse};
// self
use crate::_prelude::*;

/// Abstraction over HTTP transports capable of executing iTalent API calls.
///
/// Implementations must be `Send + Sync + 'static` so they can be shared across broker
/// instances, and the handles they return must own whatever state their request futures need
/// so those futures stay `Send` while in flight.
pub trait ApiHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle bound to one call's timeout.
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds a handle that gives up waiting for response headers after `timeout`.
	///
	/// `None` leaves the transport's own defaults in place. The timeout never bounds reading the
	/// response body.
	fn handle(&self, timeout: Option<std::time::Duration>) -> Self::Handle;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiHttpClient for ReqwestHttpClient {
	type Handle = ReqwestHandle;
	type TransportError = ReqwestError;

	fn handle(&self, timeout: Option<std::time::Duration>) -> Self::Handle {
		ReqwestHandle { client: self.0.clone(), timeout }
	}
}

/// Handle returned by [`ReqwestHttpClient`] that satisfies [`ApiHttpClient`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHandle {
	client: ReqwestClient,
	timeout: Option<std::time::Duration>,
}
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for ReqwestHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future = Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			let pending = self.client.execute(request.try_into().map_err(Box::new)?);
			let response = match self.timeout {
				Some(limit) => tokio::time::timeout(limit, pending)
					.await
					.map_err(|_| HttpClientError::Io(header_timeout(limit)))?,
				None => pending.await,
			}
			.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

#[cfg(feature = "reqwest")]
fn header_timeout(limit: std::time::Duration) -> io::Error {
	io::Error::new(
		io::ErrorKind::TimedOut,
		format!("no response headers within {} ms", limit.as_millis()),
	)
}
