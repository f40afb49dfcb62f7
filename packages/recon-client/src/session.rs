//! Signed-in session for the dashboard.
//!
//! The bearer token and user profile live in one `SessionContext` that is created at start-up from
//! the persisted credentials file and handed to the HTTP client by `Arc`. Logging out and any
//! `401` from the service both go through [`SessionContext::teardown`], which clears memory and
//! disk and publishes [`SessionStatus::SignedOut`] so the front end can return to its sign-in
//! surface.

use std::{
	fs,
	path::{Path, PathBuf},
	sync::Mutex,
};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
	Admin,
	User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	pub id: String,
	pub username: String,
	pub email: String,
	pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutReason {
	NoCredentials,
	Logout,
	Unauthorized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
	SignedIn(User),
	SignedOut { reason: SignOutReason },
}

#[derive(Clone, Serialize, Deserialize)]
struct StoredCredentials {
	token: String,
	user: User,
}

pub struct SessionContext {
	credentials_path: PathBuf,
	credentials: Mutex<Option<StoredCredentials>>,
	status: watch::Sender<SessionStatus>,
}
impl SessionContext {
	/// Restores a previous session from `credentials_path`.
	///
	/// A missing file means signed out. An unreadable or corrupt file is logged and treated the
	/// same way; it will be overwritten by the next successful sign-in.
	pub fn init(credentials_path: impl Into<PathBuf>) -> Self {
		let credentials_path = credentials_path.into();
		let credentials = match read_credentials(&credentials_path) {
			Ok(credentials) => credentials,
			Err(err) => {
				tracing::warn!(error = %err, "Ignoring unusable stored credentials.");

				None
			},
		};
		let status = match credentials.as_ref() {
			Some(stored) => SessionStatus::SignedIn(stored.user.clone()),
			None => SessionStatus::SignedOut { reason: SignOutReason::NoCredentials },
		};

		Self {
			credentials_path,
			credentials: Mutex::new(credentials),
			status: watch::Sender::new(status),
		}
	}

	pub fn credentials_path(&self) -> &Path {
		&self.credentials_path
	}

	pub fn token(&self) -> Option<String> {
		self.lock().as_ref().map(|stored| stored.token.clone())
	}

	pub fn current_user(&self) -> Option<User> {
		self.lock().as_ref().map(|stored| stored.user.clone())
	}

	pub fn is_signed_in(&self) -> bool {
		self.lock().is_some()
	}

	pub fn status(&self) -> watch::Receiver<SessionStatus> {
		self.status.subscribe()
	}

	/// Persists a freshly issued token and makes it the active session.
	pub fn establish(&self, token: String, user: User) -> Result<()> {
		let stored = StoredCredentials { token, user: user.clone() };

		write_credentials(&self.credentials_path, &stored)?;

		*self.lock() = Some(stored);

		self.status.send_replace(SessionStatus::SignedIn(user));

		Ok(())
	}

	pub fn teardown(&self, reason: SignOutReason) {
		let had_session = self.lock().take().is_some();

		if let Err(err) = delete_credentials(&self.credentials_path) {
			tracing::warn!(error = %err, "Failed to remove stored credentials.");
		}
		if had_session {
			tracing::info!(?reason, "Session ended.");
		}

		self.status.send_replace(SessionStatus::SignedOut { reason });
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, Option<StoredCredentials>> {
		self.credentials.lock().unwrap_or_else(|err| err.into_inner())
	}
}

fn read_credentials(path: &Path) -> Result<Option<StoredCredentials>> {
	if !path.exists() {
		return Ok(None);
	}

	let raw = fs::read_to_string(path).map_err(|err| Error::Credentials {
		action: "read",
		path: path.to_path_buf(),
		source: err,
	})?;
	let stored: StoredCredentials = serde_json::from_str(&raw)?;

	if stored.token.trim().is_empty() {
		return Ok(None);
	}

	Ok(Some(stored))
}

fn write_credentials(path: &Path, stored: &StoredCredentials) -> Result<()> {
	let io_err = |err: std::io::Error| Error::Credentials {
		action: "write",
		path: path.to_path_buf(),
		source: err,
	};

	if let Some(parent) = path.parent()
		&& !parent.as_os_str().is_empty()
	{
		fs::create_dir_all(parent).map_err(io_err)?;
	}

	let contents = serde_json::to_string_pretty(stored)?;

	fs::write(path, contents).map_err(io_err)?;

	#[cfg(unix)]
	{
		use std::os::unix::fs::PermissionsExt;

		fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(io_err)?;
	}

	Ok(())
}

fn delete_credentials(path: &Path) -> Result<()> {
	match fs::remove_file(path) {
		Ok(()) => Ok(()),
		Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
		Err(err) =>
			Err(Error::Credentials { action: "delete", path: path.to_path_buf(), source: err }),
	}
}
