use time::macros::datetime;

use recon_domain::{AuditKind, AuditLogEntry, ReconResult, ReconStatus, ResultsPage, SystemRecord};

pub fn result(id: &str, status: ReconStatus) -> ReconResult {
	let system_record = status.expects_system_record().then(|| SystemRecord {
		id: format!("sys-{id}"),
		transaction_id: format!("TX-{id}"),
		amount: 100.0,
		date: "2025-02-01".to_string(),
	});
	let uploaded_amount = if status == ReconStatus::PartialMatch { 100.5 } else { 100.0 };
	let variance = if status == ReconStatus::PartialMatch { 0.5 } else { 0.0 };

	ReconResult {
		id: id.to_string(),
		uploaded_tx_id: format!("TX-{id}"),
		uploaded_amount,
		status,
		variance,
		system_record,
	}
}

pub fn results_page(results: Vec<ReconResult>, total: u64, pages: u32, page: u32) -> ResultsPage {
	ResultsPage { results, total, pages, page }
}

pub fn audit_entry(id: &str, action: &str) -> AuditLogEntry {
	AuditLogEntry {
		id: id.to_string(),
		kind: AuditKind::System,
		action: action.to_string(),
		time: datetime!(2025-02-01 9:00 UTC),
		user: "system".to_string(),
		old_value: None,
		new_value: None,
	}
}

pub fn server_error(message: &str) -> recon_client::Error {
	recon_client::Error::Http { status: 500, message: message.to_string() }
}
