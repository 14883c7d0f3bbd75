//! Broker configuration: token lifetime defaults and pagination limits.
//!
//! Every field has a default, so an empty JSON object (or [`ApiConfig::default`]) yields the
//! platform's documented behavior.

// std
use std::path::Path;
// self
use crate::{_prelude::*, error::ConfigError};

/// Public iTalent open API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://openapi.italent.cn";
/// Path of the client-credentials token endpoint.
pub const DEFAULT_TOKEN_PATH: &str = "/token";
/// Token lifetime assumed when the token endpoint omits `expires_in`.
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 7_200;
/// Longest token lifetime honored; larger `expires_in` values are clamped to it.
pub const MAX_TOKEN_LIFETIME: Duration = Duration::days(365);
/// Window before expiry in which cached tokens are refreshed early.
pub const DEFAULT_PREEMPTIVE_WINDOW_SECS: u64 = 60;
/// Hard ceiling on pages fetched by a single pagination run.
pub const DEFAULT_MAX_PAGES: u32 = 1_000;
/// Pause between consecutive page requests.
pub const DEFAULT_INTER_PAGE_DELAY_MS: u64 = 100;
/// Response field holding a page's items.
pub const DEFAULT_DATA_PATH: &str = "items";
/// Response field holding the continuation cursor.
pub const DEFAULT_CURSOR_PATH: &str = "nextBatchId";
/// Maximum invite IDs accepted by a single cancellation request.
pub const MAX_INVITE_IDS: usize = 100;

/// Top-level broker configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
	/// Token endpoint path, relative to the credential's base URL.
	pub token_path: String,
	/// Lifetime applied when the token endpoint omits (or zeroes) `expires_in`.
	pub default_token_lifetime_secs: u64,
	/// Cached tokens within this many seconds of expiry are refreshed before use.
	pub preemptive_window_secs: u64,
	/// Defaults for cursor pagination.
	pub pagination: PaginationConfig,
}
impl ApiConfig {
	/// Parses a JSON configuration document; missing fields keep their defaults.
	pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
		let mut de = serde_json::Deserializer::from_str(raw);

		serde_path_to_error::deserialize(&mut de).map_err(|source| ConfigError::Parse { source })
	}

	/// Reads and parses a JSON configuration file.
	pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let raw = std::fs::read_to_string(path)
			.map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;

		Self::from_json_str(&raw)
	}

	/// Lifetime applied when the token endpoint omits `expires_in`, capped at
	/// [`MAX_TOKEN_LIFETIME`].
	pub fn default_token_lifetime(&self) -> Duration {
		Duration::seconds(i64::try_from(self.default_token_lifetime_secs).unwrap_or(i64::MAX))
			.min(MAX_TOKEN_LIFETIME)
	}

	/// Preemptive refresh window.
	pub fn preemptive_window(&self) -> Duration {
		Duration::seconds(i64::try_from(self.preemptive_window_secs).unwrap_or(i64::MAX))
	}
}
impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			token_path: DEFAULT_TOKEN_PATH.into(),
			default_token_lifetime_secs: DEFAULT_TOKEN_LIFETIME_SECS,
			preemptive_window_secs: DEFAULT_PREEMPTIVE_WINDOW_SECS,
			pagination: PaginationConfig::default(),
		}
	}
}

/// Cursor pagination settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
	/// Dotted path to the page's items (e.g. `items` or `result.items`).
	pub data_path: String,
	/// Dotted path to the continuation cursor.
	pub cursor_path: String,
	/// Maximum number of pages fetched; values below 1 are treated as 1.
	pub max_pages: u32,
	/// Delay between page requests in milliseconds; 0 disables throttling.
	pub inter_page_delay_ms: u64,
}
impl PaginationConfig {
	/// Effective page cap (never below one page).
	pub fn page_cap(&self) -> u32 {
		self.max_pages.max(1)
	}

	/// Delay applied before every page after the first.
	pub fn inter_page_delay(&self) -> std::time::Duration {
		std::time::Duration::from_millis(self.inter_page_delay_ms)
	}
}
impl Default for PaginationConfig {
	fn default() -> Self {
		Self {
			data_path: DEFAULT_DATA_PATH.into(),
			cursor_path: DEFAULT_CURSOR_PATH.into(),
			max_pages: DEFAULT_MAX_PAGES,
			inter_page_delay_ms: DEFAULT_INTER_PAGE_DELAY_MS,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_match_platform_behavior() {
		let config = ApiConfig::default();

		assert_eq!(config.token_path, "/token");
		assert_eq!(config.default_token_lifetime(), Duration::seconds(7_200));
		assert_eq!(config.pagination.max_pages, 1_000);
		assert_eq!(config.pagination.inter_page_delay(), std::time::Duration::from_millis(100));
		assert_eq!(config.pagination.data_path, "items");
		assert_eq!(config.pagination.cursor_path, "nextBatchId");
	}

	#[test]
	fn partial_documents_keep_defaults() {
		let config = ApiConfig::from_json_str(r#"{"pagination":{"max_pages":0}}"#)
			.expect("Partial configuration should parse.");

		assert_eq!(config.pagination.page_cap(), 1);
		assert_eq!(config.pagination.data_path, "items");
		assert_eq!(config.default_token_lifetime_secs, 7_200);
	}

	#[test]
	fn files_load_and_missing_files_report_their_path() {
		let path = std::env::temp_dir()
			.join(format!("italent-broker-config-{}.json", std::process::id()));

		std::fs::write(&path, r#"{"token_path":"/oauth/token","pagination":{"data_path":"list"}}"#)
			.expect("Writing the temporary configuration should succeed.");

		let loaded = ApiConfig::from_path(&path);
		let _ = std::fs::remove_file(&path);
		let config = loaded.expect("Configuration file should load.");

		assert_eq!(config.token_path, "/oauth/token");
		assert_eq!(config.pagination.data_path, "list");
		assert_eq!(config.pagination.cursor_path, "nextBatchId");

		let err = ApiConfig::from_path(&path).expect_err("A missing file should be rejected.");

		match err {
			ConfigError::Read { path: reported, source } => {
				assert_eq!(reported, path.display().to_string());
				assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn default_lifetimes_are_capped() {
		let config = ApiConfig { default_token_lifetime_secs: u64::MAX, ..Default::default() };

		assert_eq!(config.default_token_lifetime(), MAX_TOKEN_LIFETIME);
	}

	#[test]
	fn parse_errors_report_the_offending_path() {
		let err = ApiConfig::from_json_str(r#"{"pagination":{"max_pages":"many"}}"#)
			.expect_err("A string page cap should be rejected.");

		match err {
			ConfigError::Parse { source } =>
				assert_eq!(source.path().to_string(), "pagination.max_pages"),
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}
}
