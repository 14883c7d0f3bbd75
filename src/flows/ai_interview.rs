//! AI-interview operations: arrange, cancel, and list activities.

// self
use crate::{
	_prelude::*,
	config::{self, MAX_INVITE_IDS},
	error::ValidationError,
	flows::{Broker, Collected, common},
	http::ApiHttpClient,
	input::JsonInput,
	normalize::ResponseOutcome,
	request::RequestDescriptor,
	transport::TransportErrorMapper,
};

/// Endpoint that schedules an AI interview.
pub const ARRANGE_AI_INTERVIEW_PATH: &str =
	"/AIInterview/api/v1/AIInterviewInvite/ArrangeAIInterview";
/// Endpoint that cancels AI interview invitations.
pub const CANCEL_AI_INTERVIEW_PATH: &str = "/AIInterview/api/v1/AIInterviewInvite/CancelAIInterview";
/// Cursor-paginated endpoint listing enabled AI interview activities.
pub const AI_INTERVIEW_ACTIVITIES_PATH: &str =
	"/AIInterview/api/v1/AIInterviewActivity/GetAIInterviewActivities";

/// Options accepted by [`Broker::cancel_ai_interview`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CancelOptions {
	/// Throttling applied across a batch of cancellation items.
	pub batching: Option<Batching>,
	/// Header timeout in milliseconds.
	pub timeout_ms: Option<u64>,
}

/// Sleep-between-batches throttling for item-indexed calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Batching {
	/// Items per batch; `-1` disables throttling and `0` is treated as `1`.
	pub size: i64,
	/// Pause before each new batch in milliseconds; `0` disables throttling.
	pub interval_ms: u64,
}
impl Batching {
	/// Returns the pause owed before processing the item at `item_index`.
	pub fn delay_before(&self, item_index: usize) -> Option<std::time::Duration> {
		if item_index == 0 || self.size < 0 || self.interval_ms == 0 {
			return None;
		}

		let size = usize::try_from(self.size.max(1)).unwrap_or(usize::MAX);

		(item_index % size == 0).then(|| std::time::Duration::from_millis(self.interval_ms))
	}
}
impl Default for Batching {
	fn default() -> Self {
		Self { size: 50, interval_ms: 1_000 }
	}
}

impl<C, M> Broker<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Schedules an AI interview; `info` must be a JSON object (or JSON object text).
	pub async fn arrange_ai_interview(&self, info: impl Into<JsonInput>) -> Result<ResponseOutcome> {
		let info = info.into().into_object("arrangeInterviewInfo")?;
		let descriptor = RequestDescriptor::post(ARRANGE_AI_INTERVIEW_PATH)
			.json(serde_json::json!({ "arrangeInterviewInfo": info }));

		self.execute(&descriptor).await
	}

	/// Cancels AI interview invitations.
	///
	/// `item_index` is the position of this call within a host-side batch and only drives
	/// [`CancelOptions::batching`]. Invite IDs are validated before any pause or request.
	pub async fn cancel_ai_interview(
		&self,
		item_index: usize,
		invite_ids: impl Into<JsonInput>,
		options: &CancelOptions,
	) -> Result<ResponseOutcome> {
		let invite_ids = normalize_invite_ids(invite_ids.into())?;

		let delay = options.batching.and_then(|batching| batching.delay_before(item_index));

		if let Some(delay) = delay {
			tokio::time::sleep(delay).await;
		}

		let descriptor = RequestDescriptor::post(CANCEL_AI_INTERVIEW_PATH)
			.json(serde_json::json!({ "inviteIds": invite_ids }))
			.with_timeout_ms(options.timeout_ms.unwrap_or_default());

		self.execute(&descriptor).await
	}

	/// Fetches the first page of AI interview activities.
	///
	/// Returns the page's `items` when present, otherwise the response unchanged.
	pub async fn ai_interview_activities(&self) -> Result<ResponseOutcome> {
		match self.execute(&activities_request("")).await? {
			ResponseOutcome::Payload(value) => {
				let items = common::value_at_path(&value, config::DEFAULT_DATA_PATH).cloned();

				Ok(ResponseOutcome::Payload(items.unwrap_or(value)))
			},
			other => Ok(other),
		}
	}

	/// Fetches every page of AI interview activities.
	pub async fn all_ai_interview_activities(&self) -> Result<Collected> {
		self.collect_all(activities_request).await
	}
}

/// Normalizes invite IDs.
///
/// Accepts a JSON array or JSON array text. `null` and `""` entries are dropped, the rest are
/// stringified and trimmed, blanks are dropped, and duplicates keep their first occurrence. More
/// than [`MAX_INVITE_IDS`] remaining IDs are rejected.
pub fn normalize_invite_ids(raw: JsonInput) -> Result<Vec<String>, ValidationError> {
	let mut seen = std::collections::HashSet::new();
	let ids = raw
		.into_array()?
		.into_iter()
		.filter_map(|value| match value {
			Value::Null => None,
			Value::String(text) => Some(text.trim().to_owned()),
			other => Some(other.to_string()),
		})
		.filter(|id| !id.is_empty())
		.filter(|id| seen.insert(id.clone()))
		.collect::<Vec<_>>();

	if ids.len() > MAX_INVITE_IDS {
		return Err(ValidationError::TooManyInviteIds { count: ids.len(), max: MAX_INVITE_IDS });
	}

	Ok(ids)
}

fn activities_request(batch_id: &str) -> RequestDescriptor {
	RequestDescriptor::post(AI_INTERVIEW_ACTIVITIES_PATH)
		.json(serde_json::json!({ "batchId": batch_id }))
}
