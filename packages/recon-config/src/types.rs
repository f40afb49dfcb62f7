use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub api: Api,
	#[serde(default)]
	pub query: Query,
	pub session: Session,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Api {
	/// Common prefix of every endpoint, e.g. "http://localhost:3001/api".
	pub base_url: String,
	pub timeout_ms: u64,
	/// Rows requested per results page.
	#[serde(default = "default_page_limit")]
	pub page_limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Query {
	/// Quiescence window applied to filter edits before a results fetch is issued.
	pub debounce_ms: u64,
}
impl Default for Query {
	fn default() -> Self {
		Self { debounce_ms: 300 }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Session {
	/// JSON file holding the bearer token and signed-in user between runs.
	pub credentials_path: PathBuf,
}

fn default_page_limit() -> u32 {
	10
}
