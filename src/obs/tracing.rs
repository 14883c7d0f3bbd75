// self
use crate::{_prelude::*, flows::StopReason, obs::RequestKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedRequest<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedRequest<F> = F;

/// A span builder used by broker entry points.
#[derive(Clone, Debug)]
pub struct RequestSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl RequestSpan {
	/// Creates a new span tagged with the provided request kind + stage.
	pub fn new(kind: RequestKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("italent_broker.request", kind = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedRequest<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs that the cached token is being replaced; `reason` is a short static label.
pub fn record_token_refresh(reason: &'static str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(reason, "refreshing iTalent access token");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = reason;
	}
}

/// Logs why a pagination run stopped.
///
/// Natural stops are logged at `info`; the page cap and shape mismatches at `warn`, since both
/// may leave records unfetched.
pub fn record_pagination_stop(stop: &StopReason, pages: u32, items: usize) {
	#[cfg(feature = "tracing")]
	{
		match stop {
			StopReason::Exhausted =>
				tracing::info!(pages, items, "pagination finished: no continuation cursor"),
			StopReason::EmptyPage =>
				tracing::info!(pages, items, "pagination finished: empty page"),
			StopReason::PageCap { max_pages } => tracing::warn!(
				pages,
				items,
				max_pages,
				"pagination truncated: page cap reached with a cursor remaining"
			),
			StopReason::UnexpectedShape { page } => tracing::warn!(
				pages,
				items,
				page,
				"pagination stopped: page is missing the data field"
			),
			StopReason::NonJsonPage { page } => tracing::warn!(
				pages,
				items,
				page,
				"pagination stopped: page is not JSON"
			),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (stop, pages, items);
	}
}
