use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Not signed in. Run `recon-dash login` first.")]
	NotAuthenticated,
	#[error("Session is no longer valid. Sign in again.")]
	Unauthorized,
	#[error("Invalid API base URL {url:?}: {reason}.")]
	InvalidBaseUrl { url: String, reason: String },
	#[error("HTTP {status}: {message}")]
	Http { status: u16, message: String },
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	Decode(#[from] recon_domain::DecodeError),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error("Failed to {action} credentials at {path:?}.")]
	Credentials { action: &'static str, path: PathBuf, source: std::io::Error },
	#[error("Failed to read upload file at {path:?}.")]
	ReadUpload { path: PathBuf, source: std::io::Error },
}
impl Error {
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Unauthorized | Self::NotAuthenticated)
	}
}
