use std::{path::Path, sync::Arc, time::Duration};

use reqwest::{
	Client, RequestBuilder, StatusCode, Url,
	multipart::{Form, Part},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
	Error, Result,
	session::{Role, SessionContext, SignOutReason, User},
};
use recon_domain::{
	AuditLogEntry, OverrideRequest, ResultsPage, ResultsQuery, StatsSummary, decode_audit_trail,
};

const MAX_ERROR_MESSAGE_CHARS: usize = 300;

#[derive(Debug, Deserialize)]
struct LoginResponse {
	token: String,
	id: String,
	username: String,
	email: String,
	role: Role,
}

#[derive(Serialize)]
struct LoginBody<'a> {
	email: &'a str,
	password: &'a str,
}

#[derive(Serialize)]
struct RegisterBody<'a> {
	username: &'a str,
	email: &'a str,
	password: &'a str,
	role: Role,
}

/// What the service says about an accepted upload. Only `jobId` is interpreted.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
	#[serde(default)]
	pub job_id: Option<String>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// Bearer-authenticated client for the reconciliation REST API.
#[derive(Clone)]
pub struct HttpReconApi {
	http: Client,
	base_url: Url,
	page_limit: u32,
	session: Arc<SessionContext>,
}
impl HttpReconApi {
	pub fn new(cfg: &recon_config::Api, session: Arc<SessionContext>) -> Result<Self> {
		let base_url = Url::parse(&cfg.base_url).map_err(|err| Error::InvalidBaseUrl {
			url: cfg.base_url.clone(),
			reason: err.to_string(),
		})?;

		if base_url.cannot_be_a_base() {
			return Err(Error::InvalidBaseUrl {
				url: cfg.base_url.clone(),
				reason: "URL cannot carry a path".to_string(),
			});
		}

		let http = Client::builder()
			.user_agent(concat!("recon-dash/", env!("CARGO_PKG_VERSION")))
			.timeout(Duration::from_millis(cfg.timeout_ms))
			.build()?;

		Ok(Self {
			http,
			base_url,
			page_limit: cfg.page_limit,
			session,
		})
	}

	pub fn session(&self) -> &Arc<SessionContext> {
		&self.session
	}

	pub fn page_limit(&self) -> u32 {
		self.page_limit
	}

	pub async fn login(&self, email: &str, password: &str) -> Result<User> {
		let response = self
			.http
			.post(self.url(&["auth", "login"]))
			.json(&LoginBody { email: email.trim(), password })
			.send()
			.await?;
		let body = read_success(response).await?;
		let login: LoginResponse = serde_json::from_slice(&body)?;
		let user = User {
			id: login.id,
			username: login.username,
			email: login.email,
			role: login.role,
		};

		self.session.establish(login.token, user.clone())?;

		tracing::info!(user = %user.username, "Signed in.");

		Ok(user)
	}

	/// Creates an analyst account and signs it in.
	pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<User> {
		let response = self
			.http
			.post(self.url(&["auth", "register"]))
			.json(&RegisterBody {
				username: username.trim(),
				email: email.trim(),
				password,
				role: Role::User,
			})
			.send()
			.await?;

		read_success(response).await?;

		self.login(email, password).await
	}

	pub fn logout(&self) {
		self.session.teardown(SignOutReason::Logout);
	}

	pub async fn fetch_results(&self, query: &ResultsQuery) -> Result<ResultsPage> {
		let request =
			self.http.get(self.url(&["reconciliation", "results"])).query(&query.to_pairs());
		let body = self.send_authorized(request).await?;

		Ok(ResultsPage::from_slice(&body)?)
	}

	pub async fn fetch_stats(&self, job_id: Option<&str>) -> Result<StatsSummary> {
		let mut request = self.http.get(self.url(&["reconciliation", "stats"]));

		if let Some(job_id) = job_id.map(str::trim).filter(|id| !id.is_empty()) {
			request = request.query(&[("jobId", job_id)]);
		}

		let body = self.send_authorized(request).await?;

		Ok(StatsSummary::from_slice(&body)?)
	}

	pub async fn fetch_audit_trail(&self, record_id: &str) -> Result<Vec<AuditLogEntry>> {
		let url = self.url(&["reconciliation", "audit", record_id]);
		let body = self.send_authorized(self.http.get(url)).await?;

		Ok(decode_audit_trail(&body)?)
	}

	pub async fn submit_override(&self, request: &OverrideRequest) -> Result<()> {
		let url = self.url(&["reconciliation", &request.record_id, "status"]);
		let builder = self.http.patch(url).json(&request.body());

		self.send_authorized(builder).await?;

		Ok(())
	}

	pub async fn upload(&self, file: &Path) -> Result<UploadReceipt> {
		let data = tokio::fs::read(file)
			.await
			.map_err(|err| Error::ReadUpload { path: file.to_path_buf(), source: err })?;
		let file_name = file
			.file_name()
			.map(|name| name.to_string_lossy().into_owned())
			.unwrap_or_else(|| "upload.csv".to_string());
		let part = Part::bytes(data).file_name(file_name).mime_str("text/csv")?;
		let form = Form::new().part("file", part);
		let request = self.http.post(self.url(&["upload"])).multipart(form);
		let body = self.send_authorized(request).await?;

		if body.is_empty() {
			return Ok(UploadReceipt { job_id: None, extra: Map::new() });
		}

		Ok(serde_json::from_slice(&body)?)
	}

	fn url(&self, segments: &[&str]) -> Url {
		join_segments(&self.base_url, segments)
	}

	async fn send_authorized(&self, builder: RequestBuilder) -> Result<Vec<u8>> {
		let token = self.session.token().ok_or(Error::NotAuthenticated)?;
		let response = builder.bearer_auth(token).send().await?;

		if response.status() == StatusCode::UNAUTHORIZED {
			tracing::warn!(url = %response.url(), "Service rejected the session token.");

			self.session.teardown(SignOutReason::Unauthorized);

			return Err(Error::Unauthorized);
		}

		read_success(response).await
	}
}

async fn read_success(response: reqwest::Response) -> Result<Vec<u8>> {
	let status = response.status();

	if !status.is_success() {
		let body = response.text().await.unwrap_or_default();

		return Err(Error::Http { status: status.as_u16(), message: error_message(status, &body) });
	}

	Ok(response.bytes().await?.to_vec())
}

/// Pulls a readable message out of an error body, preferring the service's `message` field.
fn error_message(status: StatusCode, body: &str) -> String {
	let parsed = serde_json::from_str::<Value>(body).ok();
	let field = parsed.as_ref().and_then(|json| {
		["message", "error"].into_iter().find_map(|key| json.get(key).and_then(Value::as_str))
	});
	let message = match field {
		Some(message) => message.trim(),
		None => body.trim(),
	};

	if message.is_empty() {
		return status.canonical_reason().unwrap_or("Request failed").to_string();
	}

	message.chars().take(MAX_ERROR_MESSAGE_CHARS).collect()
}

/// Appends `segments` to the base path, percent-encoding each one so ids cannot add path levels.
fn join_segments(base: &Url, segments: &[&str]) -> Url {
	let mut url = base.clone();

	// `new` rejects cannot-be-a-base URLs, so the path is always editable here.
	if let Ok(mut path) = url.path_segments_mut() {
		path.pop_if_empty().extend(segments);
	}

	url
}
