//! Cursor pagination with inter-page throttling and a hard page cap.
//!
//! [`collect_all`] drives any page fetcher; [`Broker::collect_all`] wires it to
//! [`Broker::execute`] so every page gets the one-shot refresh-and-retry treatment.

// self
use crate::{
	_prelude::*,
	config::PaginationConfig,
	error::{Attempt, BusinessError},
	flows::{Broker, common},
	http::ApiHttpClient,
	normalize::ResponseOutcome,
	obs::{self, RequestKind, RequestOutcome, RequestSpan},
	request::RequestDescriptor,
	transport::TransportErrorMapper,
};

/// Why a pagination run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum StopReason {
	/// The last page carried no continuation cursor.
	Exhausted,
	/// A page returned an empty item array.
	EmptyPage,
	/// The page cap was reached while a cursor remained; later records were not fetched.
	PageCap {
		/// Effective page cap.
		max_pages: u32,
	},
	/// A JSON page lacked the data field.
	UnexpectedShape {
		/// One-based index of the offending page.
		page: u32,
	},
	/// A page was not JSON; its bytes are kept in [`Collected::raw_body`].
	NonJsonPage {
		/// One-based index of the offending page.
		page: u32,
	},
}
impl StopReason {
	/// Returns `true` when records may remain unfetched.
	pub fn is_truncated(&self) -> bool {
		matches!(
			self,
			Self::PageCap { .. } | Self::UnexpectedShape { .. } | Self::NonJsonPage { .. }
		)
	}
}

/// Items gathered by a pagination run.
#[derive(Clone, Debug, PartialEq)]
pub struct Collected {
	/// Items from every page, in fetch order.
	pub items: Vec<Value>,
	/// Number of pages fetched.
	pub pages: u32,
	/// Why the run stopped.
	pub stop: StopReason,
	/// Body of the non-JSON page that ended the run, if any.
	pub raw_body: Option<Vec<u8>>,
}

/// Drains a cursor-paginated endpoint.
///
/// `fetch_page` receives the cursor (`""` for the first page) and returns the page's outcome.
/// Fetch errors propagate and discard whatever was accumulated. A first page without the data
/// field is returned as the collection itself (its elements when it is an array). A non-JSON page
/// ends the run with [`StopReason::NonJsonPage`] and its bytes in [`Collected::raw_body`].
pub async fn collect_all<F, Fut>(mut fetch_page: F, config: &PaginationConfig) -> Result<Collected>
where
	F: FnMut(String) -> Fut,
	Fut: Future<Output = Result<ResponseOutcome>>,
{
	let cap = config.page_cap();
	let delay = config.inter_page_delay();
	let mut items = Vec::new();
	let mut cursor = String::new();
	let mut page = 0_u32;
	let mut raw_body = None;
	let stop = loop {
		if page > 0 && !delay.is_zero() {
			tokio::time::sleep(delay).await;
		}

		page += 1;

		let response = match fetch_page(cursor.clone()).await? {
			ResponseOutcome::Payload(value) => value,
			ResponseOutcome::Binary(bytes) => {
				raw_body = Some(bytes);

				break StopReason::NonJsonPage { page };
			},
			ResponseOutcome::BusinessError { code, message, body } => {
				let attempt = Attempt::Initial;

				return Err(BusinessError { code, message, attempt, body }.into());
			},
		};
		let data = common::value_at_path(&response, &config.data_path).cloned();
		let next = common::value_at_path(&response, &config.cursor_path).and_then(cursor_value);
		let Some(data) = data else {
			if page == 1 {
				items = match response {
					Value::Array(elements) => elements,
					other => vec![other],
				};
			}

			break StopReason::UnexpectedShape { page };
		};

		match data {
			Value::Array(elements) if elements.is_empty() => break StopReason::EmptyPage,
			Value::Array(elements) => items.extend(elements),
			other => items.push(other),
		}

		let Some(next) = next else {
			break StopReason::Exhausted;
		};

		if page >= cap {
			break StopReason::PageCap { max_pages: cap };
		}

		cursor = next;
	};

	obs::record_pagination_stop(&stop, page, items.len());

	Ok(Collected { items, pages: page, stop, raw_body })
}

impl<C, M> Broker<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Drains a cursor-paginated endpoint using [`crate::config::ApiConfig::pagination`].
	///
	/// `make_request` builds the descriptor for a cursor (`""` for the first page); each page is
	/// sent through [`Broker::execute`].
	pub async fn collect_all<R>(&self, make_request: R) -> Result<Collected>
	where
		R: Fn(&str) -> RequestDescriptor,
	{
		const KIND: RequestKind = RequestKind::Paginate;

		let span = RequestSpan::new(KIND, "collect_all");

		obs::record_request_outcome(KIND, RequestOutcome::Attempt);

		let fetch_page = |cursor: String| {
			let descriptor = make_request(&cursor);

			async move { self.execute(&descriptor).await }
		};
		let result = span.instrument(collect_all(fetch_page, &self.config.pagination)).await;

		obs::record_request_outcome(KIND, RequestOutcome::of(&result));

		result
	}
}

/// Interprets a cursor field; absent, `null`, `""`, `0`, and `false` mean "no more pages".
fn cursor_value(value: &Value) -> Option<String> {
	match value {
		Value::Null | Value::Bool(false) => None,
		Value::String(text) if text.is_empty() => None,
		Value::String(text) => Some(text.clone()),
		Value::Number(number) if number.as_f64() == Some(0.0) => None,
		other => Some(other.to_string()),
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicU32, Ordering};
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::normalize::classify;

	fn config(max_pages: u32) -> PaginationConfig {
		PaginationConfig { max_pages, inter_page_delay_ms: 0, ..Default::default() }
	}

	async fn run(pages: Vec<Value>, max_pages: u32) -> (Result<Collected>, Vec<String>) {
		let cursors = Mutex::new(Vec::new());
		let pages = Mutex::new(pages.into_iter());
		let result = collect_all(
			|cursor| {
				cursors.lock().push(cursor);

				let next = pages.lock().next().map(ResponseOutcome::Payload);

				async move { Ok(next.expect("Test fetched more pages than scripted.")) }
			},
			&config(max_pages),
		)
		.await;

		(result, cursors.into_inner())
	}

	#[tokio::test]
	async fn stops_on_empty_page_with_union_of_earlier_pages() {
		let (result, cursors) = run(
			vec![
				json!({ "items": [1, 2], "nextBatchId": "b2" }),
				json!({ "items": [3], "nextBatchId": "b3" }),
				json!({ "items": [], "nextBatchId": "b4" }),
			],
			10,
		)
		.await;
		let collected = result.expect("Pagination should succeed.");

		assert_eq!(collected.items, vec![json!(1), json!(2), json!(3)]);
		assert_eq!(collected.pages, 3);
		assert_eq!(collected.stop, StopReason::EmptyPage);
		assert_eq!(cursors, vec!["", "b2", "b3"]);
	}

	#[tokio::test]
	async fn falsy_cursors_end_the_run() {
		for cursor in [Value::Null, json!(""), json!(0), json!(false)] {
			let (result, _) =
				run(vec![json!({ "items": ["a"], "nextBatchId": cursor.clone() })], 10).await;
			let collected = result.expect("Pagination should succeed.");

			assert_eq!(collected.stop, StopReason::Exhausted, "{cursor}");
			assert_eq!(collected.items, vec![json!("a")]);
		}
	}

	#[tokio::test]
	async fn numeric_cursors_are_stringified() {
		let (result, cursors) = run(
			vec![json!({ "items": [1], "nextBatchId": 42 }), json!({ "items": [2] })],
			10,
		)
		.await;

		assert_eq!(result.expect("Pagination should succeed.").stop, StopReason::Exhausted);
		assert_eq!(cursors, vec!["", "42"]);
	}

	#[tokio::test]
	async fn never_ending_cursor_stops_at_the_cap() {
		let calls = AtomicU32::new(0);
		let collected = collect_all(
			|_| {
				let page = calls.fetch_add(1, Ordering::SeqCst);

				async move {
					Ok(ResponseOutcome::Payload(json!({ "items": [page], "nextBatchId": "more" })))
				}
			},
			&config(3),
		)
		.await
		.expect("Pagination should succeed.");

		assert_eq!(calls.load(Ordering::SeqCst), 3);
		assert_eq!(collected.pages, 3);
		assert_eq!(collected.items, vec![json!(0), json!(1), json!(2)]);
		assert_eq!(collected.stop, StopReason::PageCap { max_pages: 3 });
		assert!(collected.stop.is_truncated());
	}

	#[tokio::test]
	async fn zero_cap_still_fetches_one_page() {
		let (result, cursors) = run(vec![json!({ "items": [1], "nextBatchId": "b2" })], 0).await;

		assert_eq!(
			result.expect("Pagination should succeed.").stop,
			StopReason::PageCap { max_pages: 1 }
		);
		assert_eq!(cursors.len(), 1);
	}

	#[tokio::test]
	async fn first_page_without_data_returns_the_raw_response() {
		let (array, _) = run(vec![json!([{ "id": 1 }, { "id": 2 }])], 10).await;
		let (object, _) = run(vec![json!({ "total": 0 })], 10).await;
		let array = array.expect("Pagination should succeed.");
		let object = object.expect("Pagination should succeed.");

		assert_eq!(array.items, vec![json!({ "id": 1 }), json!({ "id": 2 })]);
		assert_eq!(array.stop, StopReason::UnexpectedShape { page: 1 });
		assert_eq!(object.items, vec![json!({ "total": 0 })]);
	}

	#[tokio::test]
	async fn later_page_without_data_keeps_accumulated_items() {
		let (result, _) = run(
			vec![json!({ "items": [1], "nextBatchId": "b2" }), json!({ "unexpected": true })],
			10,
		)
		.await;
		let collected = result.expect("Pagination should succeed.");

		assert_eq!(collected.items, vec![json!(1)]);
		assert_eq!(collected.stop, StopReason::UnexpectedShape { page: 2 });
	}

	#[tokio::test]
	async fn scalar_and_null_data_are_single_elements() {
		let (result, _) = run(
			vec![
				json!({ "items": { "id": 1 }, "nextBatchId": "b2" }),
				json!({ "items": null, "nextBatchId": null }),
			],
			10,
		)
		.await;
		let collected = result.expect("Pagination should succeed.");

		assert_eq!(collected.items, vec![json!({ "id": 1 }), Value::Null]);
		assert_eq!(collected.stop, StopReason::Exhausted);
	}

	#[tokio::test]
	async fn fetch_errors_and_business_errors_propagate() {
		let err = collect_all(
			|_| async { Err::<ResponseOutcome, _>(crate::error::TransportError::Timeout.into()) },
			&config(10),
		)
		.await
		.expect_err("Transport failures should propagate.");

		assert!(matches!(err, Error::Transport(_)));

		let err = collect_all(
			|_| async {
				Ok(ResponseOutcome::BusinessError {
					code: Some("500".into()),
					message: None,
					body: serde_json::json!({ "code": "500" }),
				})
			},
			&config(10),
		)
		.await
		.expect_err("Business failures should propagate.");

		assert!(matches!(err, Error::Business(_)));
	}

	#[tokio::test]
	async fn non_json_first_page_keeps_its_bytes() {
		let collected = collect_all(
			|_| async { Ok(ResponseOutcome::Binary(b"%PDF".to_vec())) },
			&config(10),
		)
		.await
		.expect("Pagination should succeed.");

		assert!(collected.items.is_empty());
		assert_eq!(collected.pages, 1);
		assert_eq!(collected.stop, StopReason::NonJsonPage { page: 1 });
		assert!(collected.stop.is_truncated());
		assert_eq!(collected.raw_body.as_deref(), Some(&b"%PDF"[..]));
	}

	#[tokio::test]
	async fn non_json_later_page_keeps_accumulated_items() {
		let mut pages = vec![
			ResponseOutcome::Payload(json!({ "items": [1], "nextBatchId": "b2" })),
			ResponseOutcome::Binary(b"<html>".to_vec()),
		]
		.into_iter();
		let collected = collect_all(
			|_| {
				let next = pages.next();

				async move { Ok(next.expect("Test fetched more pages than scripted.")) }
			},
			&config(10),
		)
		.await
		.expect("Pagination should succeed.");

		assert_eq!(collected.items, vec![json!(1)]);
		assert_eq!(collected.stop, StopReason::NonJsonPage { page: 2 });
		assert_eq!(collected.raw_body, Some(b"<html>".to_vec()));
	}

	#[tokio::test]
	async fn business_errors_keep_their_envelope() {
		let err = collect_all(
			|_| async { Ok(classify(json!({ "code": "E7", "message": "quota exceeded" }))) },
			&config(10),
		)
		.await
		.expect_err("Business failures should propagate.");

		match err {
			Error::Business(inner) => {
				assert_eq!(inner.code_or_unknown(), "E7");
				assert_eq!(inner.body["message"], "quota exceeded");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[tokio::test]
	async fn delay_applies_between_pages_only() {
		let started = std::time::Instant::now();
		let mut pages = vec![
			json!({ "items": [1], "nextBatchId": "b2" }),
			json!({ "items": [2], "nextBatchId": "b3" }),
			json!({ "items": [3] }),
		]
		.into_iter();
		let collected = collect_all(
			|_| {
				let next = pages.next().map(ResponseOutcome::Payload);

				async move { Ok(next.expect("Test fetched more pages than scripted.")) }
			},
			&PaginationConfig { inter_page_delay_ms: 40, ..Default::default() },
		)
		.await
		.expect("Pagination should succeed.");

		assert_eq!(collected.pages, 3);
		assert!(started.elapsed() >= std::time::Duration::from_millis(80));
	}
}
