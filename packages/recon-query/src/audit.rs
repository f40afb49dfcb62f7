use std::sync::{Arc, Mutex, MutexGuard};

use tokio::{sync::watch, task::JoinHandle};

use crate::ReconApi;
use recon_domain::AuditLogEntry;

const LOAD_FAILED_MESSAGE: &str = "Failed to load history.";

#[derive(Debug, Clone, PartialEq)]
pub enum AuditTrailState {
	Closed,
	Loading { record_id: String },
	Loaded { record_id: String, entries: Vec<AuditLogEntry> },
	Failed { record_id: String, message: String },
}
impl AuditTrailState {
	pub fn record_id(&self) -> Option<&str> {
		match self {
			Self::Closed => None,
			Self::Loading { record_id }
			| Self::Loaded { record_id, .. }
			| Self::Failed { record_id, .. } => Some(record_id),
		}
	}

	pub fn is_open(&self) -> bool {
		!matches!(self, Self::Closed)
	}
}

struct LoadSlot {
	generation: u64,
	task: Option<JoinHandle<()>>,
}

struct Shared {
	slot: Mutex<LoadSlot>,
	state: watch::Sender<AuditTrailState>,
}
impl Shared {
	fn lock_slot(&self) -> MutexGuard<'_, LoadSlot> {
		self.slot.lock().unwrap_or_else(|err| err.into_inner())
	}

	fn finish(
		&self,
		generation: u64,
		record_id: String,
		outcome: recon_client::Result<Vec<AuditLogEntry>>,
	) {
		let mut slot = self.lock_slot();

		if slot.generation != generation {
			tracing::debug!(record_id = %record_id, "Discarding audit trail for a closed drawer.");

			return;
		}

		slot.task = None;

		let next = match outcome {
			Ok(entries) => {
				tracing::debug!(record_id = %record_id, entries = entries.len(), "Audit trail loaded.");

				AuditTrailState::Loaded { record_id, entries }
			},
			Err(err) => {
				tracing::warn!(record_id = %record_id, error = %err, "Failed to load audit trail.");

				AuditTrailState::Failed { record_id, message: LOAD_FAILED_MESSAGE.to_string() }
			},
		};

		self.state.send_replace(next);
	}
}

/// Loads the change history for the record shown in the audit drawer.
///
/// Opening a drawer for another record, or closing it, cancels the load in flight. A response that
/// still arrives for an earlier opening is dropped, so the drawer only ever shows the history of
/// the record it is open for.
pub struct AuditTrailLoader {
	api: Arc<dyn ReconApi>,
	shared: Arc<Shared>,
}
impl AuditTrailLoader {
	pub fn new(api: Arc<dyn ReconApi>) -> Self {
		Self {
			api,
			shared: Arc::new(Shared {
				slot: Mutex::new(LoadSlot { generation: 0, task: None }),
				state: watch::Sender::new(AuditTrailState::Closed),
			}),
		}
	}

	pub fn state(&self) -> AuditTrailState {
		self.shared.state.borrow().clone()
	}

	pub fn subscribe(&self) -> watch::Receiver<AuditTrailState> {
		self.shared.state.subscribe()
	}

	/// Opens the drawer for `record_id` and starts loading its history.
	///
	/// Opening the record the drawer is already showing does nothing; use [`Self::reload`].
	pub fn open(&self, record_id: impl Into<String>) {
		let record_id = record_id.into();

		if self.shared.state.borrow().record_id() == Some(record_id.as_str()) {
			return;
		}

		self.start(record_id);
	}

	pub fn reload(&self) {
		let record_id = self.shared.state.borrow().record_id().map(str::to_string);

		if let Some(record_id) = record_id {
			self.start(record_id);
		}
	}

	pub fn close(&self) {
		let mut slot = self.shared.lock_slot();

		slot.generation += 1;

		if let Some(task) = slot.task.take() {
			task.abort();
		}

		self.shared.state.send_replace(AuditTrailState::Closed);
	}

	fn start(&self, record_id: String) {
		let mut slot = self.shared.lock_slot();

		slot.generation += 1;

		if let Some(task) = slot.task.take() {
			task.abort();
		}

		let generation = slot.generation;

		self.shared.state.send_replace(AuditTrailState::Loading { record_id: record_id.clone() });

		tracing::debug!(record_id = %record_id, generation, "Loading audit trail.");

		let api = Arc::clone(&self.api);
		let shared = Arc::clone(&self.shared);

		slot.task = Some(tokio::spawn(async move {
			let outcome = api.audit_trail(&record_id).await;

			shared.finish(generation, record_id, outcome);
		}));
	}
}
impl Drop for AuditTrailLoader {
	fn drop(&mut self) {
		if let Some(task) = self.shared.lock_slot().task.take() {
			task.abort();
		}
	}
}
