//! Shared helpers for broker entry points (singleflight guards, dotted JSON paths).

// self
use crate::{
	_prelude::*,
	auth::CredentialName,
	flows::Broker,
	http::ApiHttpClient,
	transport::TransportErrorMapper,
};

/// Returns (and creates on demand) the singleflight guard for a credential entry.
pub(crate) fn flow_guard<C, M>(
	broker: &Broker<C, M>,
	name: &CredentialName,
) -> Arc<AsyncMutex<()>>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let mut guards = broker.flow_guards.lock();

	guards.entry(name.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
}

/// Resolves a dotted path (`result.items`, `rows.0.id`) inside a JSON value.
///
/// An empty path resolves to the value itself. Array segments must be decimal indices.
pub(crate) fn value_at_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
	if path.is_empty() {
		return Some(value);
	}

	path.split('.').try_fold(value, |current, segment| match current {
		Value::Object(fields) => fields.get(segment),
		Value::Array(items) => segment.parse::<usize>().ok().and_then(|idx| items.get(idx)),
		_ => None,
	})
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn dotted_paths_walk_objects_and_arrays() {
		let value = json!({ "result": { "items": [{ "id": "a" }], "next": null } });

		assert_eq!(value_at_path(&value, ""), Some(&value));
		assert_eq!(value_at_path(&value, "result.items.0.id"), Some(&json!("a")));
		assert_eq!(value_at_path(&value, "result.next"), Some(&Value::Null));
		assert_eq!(value_at_path(&value, "result.missing"), None);
		assert_eq!(value_at_path(&value, "result.items.x"), None);
		assert_eq!(value_at_path(&value, "result.next.deeper"), None);
	}
}
