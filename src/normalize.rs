//! Response normalization: one [`ResponseOutcome`] for every transport-successful response.
//!
//! iTalent endpoints answer with one of two envelopes, `{code, data, message}` or
//! `{success, data, message, code}`. [`classify`] checks them in a fixed order:
//!
//! 1. a boolean `success` field decides on its own;
//! 2. otherwise a `code` field succeeds only when it is `200` or `"200"`;
//! 3. otherwise the response is a success.

// crates.io
use oauth2::{HttpResponse, http::header::CONTENT_TYPE};
// self
use crate::{_prelude::*, error::TransportError};

/// Classified result of a transport-successful response.
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseOutcome {
	/// Non-JSON body passed through untouched.
	Binary(Vec<u8>),
	/// Successful JSON response; the `data` field when present, otherwise the whole body.
	Payload(Value),
	/// The envelope reported a failure.
	BusinessError {
		/// Platform error code, stringified.
		code: Option<String>,
		/// Platform error message.
		message: Option<String>,
		/// Decoded response envelope.
		body: Value,
	},
}
impl ResponseOutcome {
	/// Returns the JSON payload, if this is a success payload.
	pub fn payload(&self) -> Option<&Value> {
		match self {
			Self::Payload(value) => Some(value),
			_ => None,
		}
	}

	/// Consumes the outcome, returning the JSON payload if there is one.
	pub fn into_payload(self) -> Option<Value> {
		match self {
			Self::Payload(value) => Some(value),
			_ => None,
		}
	}

	/// Returns `true` when a business error signals an expired or rejected token.
	///
	/// Recognized markers are the code `401` (number or string), the code `"UNAUTHORIZED"`, and
	/// the message `"un-authorized"`.
	pub fn is_unauthorized(&self) -> bool {
		let Self::BusinessError { code, message, .. } = self else {
			return false;
		};

		matches!(code.as_deref(), Some("401" | "UNAUTHORIZED"))
			|| message.as_deref() == Some("un-authorized")
	}
}

/// Interprets a transport-successful response.
///
/// A declared non-JSON content type yields [`ResponseOutcome::Binary`]; so does an undeclared
/// content type whose body does not parse as JSON. A declared JSON content type with a malformed
/// body is a [`TransportError::Decode`]. Empty bodies are treated as JSON `null`.
pub fn interpret(response: &HttpResponse) -> Result<ResponseOutcome, TransportError> {
	let body = response.body();
	let content_type = response
		.headers()
		.get(CONTENT_TYPE)
		.and_then(|value| value.to_str().ok())
		.map(|value| value.trim().to_ascii_lowercase())
		.filter(|value| !value.is_empty());

	if body.iter().all(u8::is_ascii_whitespace) {
		return match content_type {
			Some(media) if !is_json_media_type(&media) =>
				Ok(ResponseOutcome::Binary(body.to_vec())),
			_ => Ok(classify(Value::Null)),
		};
	}

	match content_type {
		Some(media) if !is_json_media_type(&media) => Ok(ResponseOutcome::Binary(body.to_vec())),
		Some(_) => {
			let mut de = serde_json::Deserializer::from_slice(body);
			let value: Value = serde_path_to_error::deserialize(&mut de).map_err(|source| {
				TransportError::Decode { source, status: Some(response.status().as_u16()) }
			})?;

			Ok(classify(value))
		},
		None => match serde_json::from_slice::<Value>(body) {
			Ok(value) => Ok(classify(value)),
			Err(_) => Ok(ResponseOutcome::Binary(body.to_vec())),
		},
	}
}

/// Classifies a decoded JSON response.
pub fn classify(value: Value) -> ResponseOutcome {
	let Value::Object(mut fields) = value else {
		return ResponseOutcome::Payload(value);
	};
	let success = match fields.get("success") {
		Some(Value::Bool(flag)) => *flag,
		_ => match fields.get("code") {
			Some(code) => is_success_code(code),
			None => true,
		},
	};

	if success {
		return match fields.remove("data") {
			Some(data) => ResponseOutcome::Payload(data),
			None => ResponseOutcome::Payload(Value::Object(fields)),
		};
	}

	let code = fields.get("code").and_then(stringify);
	let message = fields.get("message").and_then(stringify);

	ResponseOutcome::BusinessError { code, message, body: Value::Object(fields) }
}

fn is_json_media_type(media: &str) -> bool {
	let essence = media.split(';').next().unwrap_or_default().trim();

	essence == "application/json" || essence.ends_with("+json")
}

fn is_success_code(code: &Value) -> bool {
	match code {
		Value::Number(number) => number.as_f64() == Some(200.0),
		Value::String(text) => text.trim() == "200",
		_ => false,
	}
}

fn stringify(field: &Value) -> Option<String> {
	match field {
		Value::Null => None,
		Value::String(text) => Some(text.clone()),
		other => Some(other.to_string()),
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn response(content_type: Option<&str>, body: &[u8]) -> HttpResponse {
		let mut response = HttpResponse::new(body.to_vec());

		if let Some(value) = content_type {
			response
				.headers_mut()
				.insert(CONTENT_TYPE, value.parse().expect("Content type fixture should parse."));
		}

		response
	}

	#[test]
	fn code_envelope_unwraps_data() {
		assert_eq!(
			classify(json!({ "code": 200, "data": { "x": 1 } })),
			ResponseOutcome::Payload(json!({ "x": 1 }))
		);
		assert_eq!(
			classify(json!({ "code": "200", "data": null })),
			ResponseOutcome::Payload(Value::Null)
		);
		assert_eq!(
			classify(json!({ "code": 200, "total": 3 })),
			ResponseOutcome::Payload(json!({ "code": 200, "total": 3 }))
		);
	}

	#[test]
	fn success_flag_takes_priority_over_code() {
		assert_eq!(
			classify(json!({ "success": false, "message": "bad" })),
			ResponseOutcome::BusinessError {
				code: None,
				message: Some("bad".into()),
				body: json!({ "success": false, "message": "bad" }),
			}
		);
		assert_eq!(
			classify(json!({ "success": true, "code": "E100", "data": [1] })),
			ResponseOutcome::Payload(json!([1]))
		);
		assert_eq!(
			classify(json!({ "success": false, "code": 200, "message": "nope" })),
			ResponseOutcome::BusinessError {
				code: Some("200".into()),
				message: Some("nope".into()),
				body: json!({ "success": false, "code": 200, "message": "nope" }),
			}
		);
	}

	#[test]
	fn envelopes_without_markers_succeed() {
		assert_eq!(
			classify(json!({ "items": [] })),
			ResponseOutcome::Payload(json!({ "items": [] }))
		);
		assert_eq!(classify(json!(["a", "b"])), ResponseOutcome::Payload(json!(["a", "b"])));
		assert_eq!(classify(json!("ok")), ResponseOutcome::Payload(json!("ok")));
	}

	#[test]
	fn failing_codes_are_stringified() {
		assert_eq!(
			classify(json!({ "code": 40001, "message": "invalid param" })),
			ResponseOutcome::BusinessError {
				code: Some("40001".into()),
				message: Some("invalid param".into()),
				body: json!({ "code": 40001, "message": "invalid param" }),
			}
		);
	}

	#[test]
	fn unauthorized_markers_are_recognized() {
		let numeric = classify(json!({ "code": 401 }));
		let symbolic = classify(json!({ "code": "UNAUTHORIZED" }));
		let message = classify(json!({ "code": 500, "message": "un-authorized" }));
		let other = classify(json!({ "code": 403, "message": "forbidden" }));

		assert!(numeric.is_unauthorized());
		assert!(symbolic.is_unauthorized());
		assert!(message.is_unauthorized());
		assert!(!other.is_unauthorized());
		assert!(!ResponseOutcome::Payload(Value::Null).is_unauthorized());
	}

	#[test]
	fn content_type_drives_binary_detection() {
		let pdf = response(Some("application/pdf"), b"%PDF-1.7");
		let json = response(Some("application/json; charset=utf-8"), br#"{"code":200,"data":7}"#);
		let problem = response(Some("application/problem+json"), br#"{"code":200,"data":8}"#);
		let untyped_json = response(None, br#"{"code":200,"data":9}"#);
		let untyped_bytes = response(None, &[0xff, 0xfe, 0x00]);

		assert_eq!(
			interpret(&pdf).expect("PDF should pass through."),
			ResponseOutcome::Binary(b"%PDF-1.7".to_vec())
		);
		assert_eq!(
			interpret(&json).expect("JSON should decode."),
			ResponseOutcome::Payload(json!(7))
		);
		assert_eq!(
			interpret(&problem).expect("JSON suffix types should decode."),
			ResponseOutcome::Payload(json!(8))
		);
		assert_eq!(
			interpret(&untyped_json).expect("Untyped JSON should decode."),
			ResponseOutcome::Payload(json!(9))
		);
		assert_eq!(
			interpret(&untyped_bytes).expect("Untyped bytes should pass through."),
			ResponseOutcome::Binary(vec![0xff, 0xfe, 0x00])
		);
	}

	#[test]
	fn malformed_json_is_a_decode_error() {
		let broken = response(Some("application/json"), br#"{"code":200,"data":"#);

		assert!(matches!(
			interpret(&broken),
			Err(TransportError::Decode { status: Some(200), .. })
		));
	}

	#[test]
	fn empty_bodies_are_null_payloads() {
		assert_eq!(
			interpret(&response(Some("application/json"), b"")).expect("Empty JSON is allowed."),
			ResponseOutcome::Payload(Value::Null)
		);
		assert_eq!(
			interpret(&response(Some("text/plain"), b"")).expect("Empty text is allowed."),
			ResponseOutcome::Binary(Vec::new())
		);
	}
}
