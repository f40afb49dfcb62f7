//! Interactive results view.
//!
//! Commands arrive one per line on stdin and the views are re-rendered whenever their read models
//! change, so debounced loads and late responses show up without any explicit polling.

use std::sync::Arc;

use tokio::io::{self, AsyncBufReadExt, BufReader};

use crate::render;
use recon_client::{HttpReconApi, SessionStatus, SignOutReason};
use recon_domain::ReconStatus;
use recon_query::{
	AuditTrailLoader, OverrideRejection, QuerySettings, ResultQueryController,
	StatusOverrideWorkflow,
};

const HELP: &str = "\
Commands:
  search <text>                  filter by transaction id (empty clears)
  status <STATUS|all>            filter by status
  page <n> | next | prev         move between pages
  refresh                        reload the current page now
  audit <id> | close             show or hide a record's history
  override <id> <STATUS> <note>  set a record's status by hand
  retry | discard                resubmit or drop an override the service failed
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
	Search(String),
	Status(Option<ReconStatus>),
	Page(u32),
	Next,
	Prev,
	Refresh,
	Audit(String),
	CloseAudit,
	Override { id: String, status: ReconStatus, note: String },
	Retry,
	Discard,
	Help,
	Quit,
}
impl BrowseCommand {
	pub fn parse(line: &str) -> Result<Option<Self>, String> {
		let line = line.trim();

		if line.is_empty() {
			return Ok(None);
		}

		let (verb, rest) = match line.split_once(char::is_whitespace) {
			Some((verb, rest)) => (verb, rest.trim()),
			None => (line, ""),
		};
		let command = match verb.to_ascii_lowercase().as_str() {
			"search" => Self::Search(rest.to_string()),
			"status" => match rest.to_ascii_lowercase().as_str() {
				"" | "all" => Self::Status(None),
				_ => Self::Status(Some(rest.parse().map_err(|err| format!("{err}"))?)),
			},
			"page" => Self::Page(
				rest.parse().map_err(|_| format!("Expected a page number, got {rest:?}."))?,
			),
			"next" => Self::Next,
			"prev" => Self::Prev,
			"refresh" => Self::Refresh,
			"audit" if !rest.is_empty() => Self::Audit(rest.to_string()),
			"close" => Self::CloseAudit,
			"override" => {
				let mut parts = rest.splitn(3, char::is_whitespace);
				let (Some(id), Some(status)) = (parts.next(), parts.next()) else {
					return Err("Usage: override <id> <STATUS> <note>".to_string());
				};
				let status = status.parse().map_err(|err| format!("{err}"))?;
				let note = parts.next().unwrap_or_default().trim().to_string();

				Self::Override { id: id.to_string(), status, note }
			},
			"retry" => Self::Retry,
			"discard" => Self::Discard,
			"help" | "?" => Self::Help,
			"quit" | "exit" | "q" => Self::Quit,
			_ => return Err(format!("Unknown command {line:?}. Type `help` for the list.")),
		};

		Ok(Some(command))
	}
}

pub async fn run(api: HttpReconApi, settings: QuerySettings) -> color_eyre::Result<()> {
	let api = Arc::new(api);
	let controller = ResultQueryController::spawn(api.clone(), settings);
	let audit = AuditTrailLoader::new(api.clone());
	let mut overrides = StatusOverrideWorkflow::new(api.clone(), Arc::new(controller.refresher()));
	let mut results_rx = controller.subscribe();
	let mut audit_rx = audit.subscribe();
	let mut session_rx = api.session().status();
	let mut lines = BufReader::new(io::stdin()).lines();

	tracing::info!(
		page_limit = settings.page_limit,
		debounce_ms = settings.debounce.as_millis() as u64,
		"Interactive results view started."
	);

	println!("{HELP}");

	loop {
		tokio::select! {
			line = lines.next_line() => {
				let Some(line) = line? else {
					break;
				};
				let command = match BrowseCommand::parse(&line) {
					Ok(Some(command)) => command,
					Ok(None) => continue,
					Err(message) => {
						println!("{message}");

						continue;
					},
				};

				match command {
					BrowseCommand::Quit => break,
					BrowseCommand::Help => println!("{HELP}"),
					BrowseCommand::Search(text) => {
						controller.set_search(text);
					},
					BrowseCommand::Status(status) => {
						controller.set_status(status);
					},
					BrowseCommand::Page(page) =>
						if !controller.set_page(page) {
							println!("Page {page} is outside 1..={}.", controller.total_pages());
						},
					BrowseCommand::Next => {
						controller.next_page();
					},
					BrowseCommand::Prev => {
						controller.prev_page();
					},
					BrowseCommand::Refresh => controller.refresh().await,
					BrowseCommand::Audit(id) => audit.open(id),
					BrowseCommand::CloseAudit => audit.close(),
					BrowseCommand::Override { id, status, note } => {
						let current = controller
							.snapshot()
							.data
							.iter()
							.find(|record| record.id == id)
							.map_or(status, |record| record.status);

						overrides.open(id.as_str(), current);
						overrides.select_status(status);
						overrides.set_note(note);

						println!("{}", submit_override(&mut overrides).await);
					},
					BrowseCommand::Retry => println!("{}", submit_override(&mut overrides).await),
					BrowseCommand::Discard =>
						if overrides.is_open() {
							overrides.close();

							println!("Override discarded.");
						},
				}
			},
			changed = results_rx.changed() => {
				if changed.is_err() {
					break;
				}

				let view = results_rx.borrow_and_update().clone();

				print!("{}", render::results_view(&view));
			},
			changed = audit_rx.changed() => {
				if changed.is_err() {
					break;
				}

				let state = audit_rx.borrow_and_update().clone();

				print!("{}", render::audit_state(&state));
			},
			changed = session_rx.changed() => {
				if changed.is_err() {
					break;
				}
				if session_expired(&session_rx.borrow_and_update()) {
					tracing::warn!("Service rejected the session. Leaving the interactive view.");

					println!("Session expired. Run `recon-dash login` again.");

					break;
				}
			},
		}
	}

	tracing::info!("Interactive results view stopped.");

	Ok(())
}

fn session_expired(status: &SessionStatus) -> bool {
	matches!(status, SessionStatus::SignedOut { reason: SignOutReason::Unauthorized })
}

/// Submits the open override and describes the outcome.
///
/// A service failure keeps the draft so `retry` can resubmit it unchanged. Any other rejection
/// discards it.
async fn submit_override(overrides: &mut StatusOverrideWorkflow) -> String {
	let target = overrides.draft().map(|draft| (draft.record_id.clone(), draft.new_status));

	match overrides.submit().await {
		Ok(()) => match target {
			Some((id, status)) => format!("Status of {id} set to {status}."),
			None => "Status updated.".to_string(),
		},
		Err(rejection @ OverrideRejection::Server(_)) =>
			format!("{rejection} Type `retry` to resubmit or `discard` to drop it."),
		Err(rejection) => {
			overrides.close();

			rejection.to_string()
		},
	}
}
