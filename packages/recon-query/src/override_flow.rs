use std::sync::Arc;

use crate::{ReconApi, Refresh};
use recon_domain::{OverrideRequest, ReconStatus};

const NOTE_REQUIRED_MESSAGE: &str = "A justification note is required for the audit trail.";
const SUBMIT_FAILED_MESSAGE: &str = "Failed to update status. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OverrideRejection {
	#[error("No status override is open.")]
	NotOpen,
	#[error("{0}")]
	Validation(String),
	#[error("{0}")]
	Server(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverridePhase {
	Idle,
	Submitting,
	Success,
	Rejected(OverrideRejection),
}

/// The edit modal's working copy for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideDraft {
	pub record_id: String,
	pub current_status: ReconStatus,
	pub new_status: ReconStatus,
	pub note: String,
	pub phase: OverridePhase,
}

/// Drives a manual status change from modal open to confirmed update.
///
/// A successful submit closes the modal and then refreshes the results table exactly once. Any
/// rejection leaves the modal open with the analyst's input intact.
pub struct StatusOverrideWorkflow {
	api: Arc<dyn ReconApi>,
	refresher: Arc<dyn Refresh>,
	draft: Option<OverrideDraft>,
}
impl StatusOverrideWorkflow {
	pub fn new(api: Arc<dyn ReconApi>, refresher: Arc<dyn Refresh>) -> Self {
		Self { api, refresher, draft: None }
	}

	/// Opens the modal with the record's current status preselected and an empty note.
	pub fn open(&mut self, record_id: impl Into<String>, current_status: ReconStatus) {
		let record_id = record_id.into();

		tracing::debug!(record_id = %record_id, %current_status, "Opening status override.");

		self.draft = Some(OverrideDraft {
			record_id,
			current_status,
			new_status: current_status,
			note: String::new(),
			phase: OverridePhase::Idle,
		});
	}

	pub fn close(&mut self) {
		self.draft = None;
	}

	pub fn is_open(&self) -> bool {
		self.draft.is_some()
	}

	pub fn draft(&self) -> Option<&OverrideDraft> {
		self.draft.as_ref()
	}

	pub fn phase(&self) -> Option<&OverridePhase> {
		self.draft.as_ref().map(|draft| &draft.phase)
	}

	pub fn select_status(&mut self, status: ReconStatus) {
		if let Some(draft) = self.draft.as_mut() {
			draft.new_status = status;
		}
	}

	pub fn set_note(&mut self, note: impl Into<String>) {
		if let Some(draft) = self.draft.as_mut() {
			draft.note = note.into();
		}
	}

	pub async fn submit(&mut self) -> Result<(), OverrideRejection> {
		let Some(draft) = self.draft.as_mut() else {
			return Err(OverrideRejection::NotOpen);
		};

		if let Err(rejection) = validate(draft) {
			tracing::debug!(record_id = %draft.record_id, %rejection, "Override rejected locally.");

			draft.phase = OverridePhase::Rejected(rejection.clone());

			return Err(rejection);
		}

		draft.phase = OverridePhase::Submitting;

		let request = OverrideRequest {
			record_id: draft.record_id.clone(),
			new_status: draft.new_status,
			note: draft.note.clone(),
		};

		if let Err(err) = self.api.override_status(&request).await {
			tracing::warn!(record_id = %request.record_id, error = %err, "Status override failed.");

			let rejection = OverrideRejection::Server(SUBMIT_FAILED_MESSAGE.to_string());

			if let Some(draft) = self.draft.as_mut() {
				draft.phase = OverridePhase::Rejected(rejection.clone());
			}

			return Err(rejection);
		}

		tracing::info!(
			record_id = %request.record_id,
			status = %request.new_status,
			"Status override applied."
		);

		if let Some(draft) = self.draft.as_mut() {
			draft.phase = OverridePhase::Success;
		}

		self.close();
		self.refresher.refresh().await;

		Ok(())
	}
}

fn validate(draft: &OverrideDraft) -> Result<(), OverrideRejection> {
	if draft.note.trim().is_empty() {
		return Err(OverrideRejection::Validation(NOTE_REQUIRED_MESSAGE.to_string()));
	}
	if !draft.new_status.is_override_target() {
		return Err(OverrideRejection::Validation(format!(
			"{} cannot be set manually.",
			draft.new_status.label()
		)));
	}

	Ok(())
}
