//! Retrying request execution.
//!
//! [`Broker::execute`] runs one logical call as an explicit state machine:
//!
//! ```text
//! Initial -> Sent(initial) -> Interpreted(initial) -> done
//!                 |                  |
//!                 +--> Refreshing <--+  (HTTP 401 / unauthorized envelope)
//!                          |
//!                          v
//!                 Sent(after_refresh) -> Interpreted(after_refresh) -> done
//! ```
//!
//! Refreshing is only reachable from the initial attempt, so a call is retried at most once.

// crates.io
use oauth2::HttpResponse;
// self
use crate::{
	_prelude::*,
	error::{Attempt, BusinessError},
	flows::{ApiSession, Broker},
	http::ApiHttpClient,
	normalize::{self, ResponseOutcome},
	obs::{self, RequestKind, RequestOutcome, RequestSpan},
	request::RequestDescriptor,
	transport::TransportErrorMapper,
};

enum ExecState {
	Initial,
	Sent { session: ApiSession, attempt: Attempt },
	Interpreted { response: HttpResponse, attempt: Attempt },
	Refreshing,
}

impl<C, M> Broker<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Executes `descriptor`, refreshing the token and retrying once on an authorization failure.
	///
	/// Authorization failures are an HTTP 401 or a response envelope whose code is `401` /
	/// `"UNAUTHORIZED"` or whose message is `"un-authorized"`. The result is never
	/// [`ResponseOutcome::BusinessError`]; business errors are returned as [`Error::Business`]
	/// tagged with the attempt that produced them.
	pub async fn execute(&self, descriptor: &RequestDescriptor) -> Result<ResponseOutcome> {
		const KIND: RequestKind = RequestKind::Execute;

		let span = RequestSpan::new(KIND, "execute");

		obs::record_request_outcome(KIND, RequestOutcome::Attempt);

		let result = span.instrument(self.run(descriptor)).await;

		obs::record_request_outcome(KIND, RequestOutcome::of(&result));

		result
	}

	async fn run(&self, descriptor: &RequestDescriptor) -> Result<ResponseOutcome> {
		let mut state = ExecState::Initial;

		loop {
			state = match state {
				ExecState::Initial => ExecState::Sent {
					session: self.current_token().await?,
					attempt: Attempt::Initial,
				},
				ExecState::Sent { session, attempt } =>
					match self.send(&session, descriptor).await {
						Ok(response) => ExecState::Interpreted { response, attempt },
						Err(err) if attempt == Attempt::Initial && err.is_unauthorized() =>
							ExecState::Refreshing,
						Err(err) => return Err(tag_attempt(err, attempt)),
					},
				ExecState::Interpreted { response, attempt } => {
					let outcome = normalize::interpret(&response)
						.map_err(|err| tag_attempt(err.into(), attempt))?;

					if attempt == Attempt::Initial && outcome.is_unauthorized() {
						ExecState::Refreshing
					} else {
						return finish(outcome, attempt);
					}
				},
				ExecState::Refreshing => ExecState::Sent {
					session: self.refresh_token().await?,
					attempt: Attempt::AfterRefresh,
				},
			};
		}
	}
}

fn finish(outcome: ResponseOutcome, attempt: Attempt) -> Result<ResponseOutcome> {
	match outcome {
		ResponseOutcome::BusinessError { code, message, body } =>
			Err(BusinessError { code, message, attempt, body }.into()),
		other => Ok(other),
	}
}

fn tag_attempt(err: Error, attempt: Attempt) -> Error {
	match (err, attempt) {
		(Error::Transport(source), Attempt::AfterRefresh) =>
			Error::TransportAfterRefresh { source },
		(err, _) => err,
	}
}
