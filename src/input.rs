//! Caller-supplied JSON parameters that may arrive as text or as already-parsed values.

// self
use crate::{_prelude::*, error::ValidationError};

/// A JSON parameter supplied either as JSON text or as a parsed value.
///
/// Workflow hosts hand over expression results as values and typed-in fields as strings; both
/// forms are accepted wherever the broker takes free-form JSON.
#[derive(Clone, Debug, PartialEq)]
pub enum JsonInput {
	/// JSON text still to be parsed.
	Text(String),
	/// Already-parsed JSON value.
	Value(Value),
}
impl JsonInput {
	/// Resolves the input into a JSON object, rejecting anything else.
	///
	/// `field` names the parameter in validation errors.
	pub fn into_object(self, field: &'static str) -> Result<Value, ValidationError> {
		let value = match self {
			Self::Text(raw) => serde_json::from_str::<Value>(&raw)
				.map_err(|source| ValidationError::InvalidJson { field, source })?,
			Self::Value(value) => value,
		};

		if !value.is_object() {
			return Err(ValidationError::NotAnObject { field });
		}

		Ok(value)
	}

	/// Resolves the input into the elements of a JSON array.
	///
	/// Blank text yields an empty list. Text that does not parse, or parses to a non-array, and
	/// non-array values are rejected with [`ValidationError::InviteIdsNotArray`].
	pub fn into_array(self) -> Result<Vec<Value>, ValidationError> {
		match self {
			Self::Text(raw) => {
				let trimmed = raw.trim();

				if trimmed.is_empty() {
					return Ok(Vec::new());
				}

				match serde_json::from_str::<Value>(trimmed) {
					Ok(Value::Array(values)) => Ok(values),
					_ => Err(ValidationError::InviteIdsNotArray),
				}
			},
			Self::Value(Value::Array(values)) => Ok(values),
			Self::Value(Value::Null) => Ok(Vec::new()),
			Self::Value(_) => Err(ValidationError::InviteIdsNotArray),
		}
	}
}
impl From<&str> for JsonInput {
	fn from(raw: &str) -> Self {
		Self::Text(raw.to_owned())
	}
}
impl From<String> for JsonInput {
	fn from(raw: String) -> Self {
		Self::Text(raw)
	}
}
impl From<Value> for JsonInput {
	fn from(value: Value) -> Self {
		Self::Value(value)
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn objects_accept_text_or_values() {
		assert_eq!(
			JsonInput::from(r#"{"jobId":"j-1"}"#)
				.into_object("arrangeInterviewInfo")
				.expect("Object text should parse."),
			json!({ "jobId": "j-1" })
		);
		assert_eq!(
			JsonInput::from(json!({ "jobId": "j-2" }))
				.into_object("arrangeInterviewInfo")
				.expect("Object values should pass."),
			json!({ "jobId": "j-2" })
		);
	}

	#[test]
	fn objects_reject_bad_text_and_non_objects() {
		assert!(matches!(
			JsonInput::from("{broken").into_object("arrangeInterviewInfo"),
			Err(ValidationError::InvalidJson { field: "arrangeInterviewInfo", .. })
		));
		assert!(matches!(
			JsonInput::from("[1,2]").into_object("arrangeInterviewInfo"),
			Err(ValidationError::NotAnObject { field: "arrangeInterviewInfo" })
		));
		assert!(matches!(
			JsonInput::from(Value::Null).into_object("arrangeInterviewInfo"),
			Err(ValidationError::NotAnObject { .. })
		));
	}

	#[test]
	fn arrays_accept_text_values_and_blank_text() {
		assert_eq!(
			JsonInput::from(r#" ["a", 2] "#).into_array().expect("Array text should parse."),
			vec![json!("a"), json!(2)]
		);
		assert_eq!(
			JsonInput::from(json!(["b"])).into_array().expect("Array values should pass."),
			vec![json!("b")]
		);
		assert!(JsonInput::from("   ").into_array().expect("Blank text is empty.").is_empty());
		assert!(matches!(
			JsonInput::from(r#"{"a":1}"#).into_array(),
			Err(ValidationError::InviteIdsNotArray)
		));
		assert!(matches!(
			JsonInput::from("not json").into_array(),
			Err(ValidationError::InviteIdsNotArray)
		));
	}
}
