mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Api, Config, Query, Service, Session};

use std::{fs, path::Path};

pub const MAX_PAGE_LIMIT: u32 = 100;
pub const MAX_DEBOUNCE_MS: u64 = 5_000;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::validation("service.log_level must be non-empty."));
	}

	let base_url = cfg.api.base_url.trim();

	if base_url.is_empty() {
		return Err(Error::validation("api.base_url must be non-empty."));
	}
	if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
		return Err(Error::validation("api.base_url must start with http:// or https://."));
	}
	if cfg.api.timeout_ms == 0 {
		return Err(Error::validation("api.timeout_ms must be greater than zero."));
	}
	if !(1..=MAX_PAGE_LIMIT).contains(&cfg.api.page_limit) {
		return Err(Error::validation(format!(
			"api.page_limit must be between 1 and {MAX_PAGE_LIMIT}."
		)));
	}
	if cfg.query.debounce_ms == 0 {
		return Err(Error::validation("query.debounce_ms must be greater than zero."));
	}
	if cfg.query.debounce_ms > MAX_DEBOUNCE_MS {
		return Err(Error::validation(format!(
			"query.debounce_ms must be {MAX_DEBOUNCE_MS} or less."
		)));
	}
	if cfg.session.credentials_path.as_os_str().is_empty() {
		return Err(Error::validation("session.credentials_path must be non-empty."));
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let trimmed = cfg.api.base_url.trim().trim_end_matches('/');

	if trimmed.len() != cfg.api.base_url.len() {
		cfg.api.base_url = trimmed.to_string();
	}

	cfg.service.log_level = cfg.service.log_level.trim().to_string();
}
