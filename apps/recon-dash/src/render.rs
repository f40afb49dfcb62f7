//! Plain-text rendering of the dashboard read models.

use std::fmt::Write;

use recon_domain::{AuditKind, AuditLogEntry, AuditValue, ReconResult, ResultsPage, StatsSummary};
use recon_query::{AuditTrailState, ResultsView};

const TIME_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
	time::macros::format_description!("[year]-[month]-[day] [hour]:[minute]");

pub fn results_view(view: &ResultsView) -> String {
	let mut out = String::new();
	let filters = &view.filters;
	let status = filters.status.map(|status| status.label()).unwrap_or_else(|| "ALL".to_string());

	let _ = writeln!(
		out,
		"Page {}/{} | {} records | status {} | search {:?}{}",
		filters.page,
		view.total_pages,
		view.total,
		status,
		filters.search,
		if view.loading { " | loading" } else { "" },
	);

	if let Some(error) = &view.error {
		let _ = writeln!(out, "! {error}");
	}

	out.push_str(&table(&view.data));

	out
}

pub fn results_page(page: &ResultsPage) -> String {
	let mut out = String::new();

	let _ = writeln!(out, "Page {}/{} | {} records", page.page, page.pages, page.total);

	out.push_str(&table(&page.results));

	out
}

fn table(rows: &[ReconResult]) -> String {
	let mut out = String::new();

	if rows.is_empty() {
		out.push_str("No reconciliation results.\n");

		return out;
	}

	let _ = writeln!(
		out,
		"{:<12} {:<16} {:>12} {:<14} {:<16} {:>10}",
		"ID", "UPLOADED TX", "AMOUNT", "STATUS", "SYSTEM TX", "VARIANCE"
	);

	for row in rows {
		let system_tx = row.system_record.as_ref().map_or("-", |record| record.transaction_id.as_str());

		let _ = writeln!(
			out,
			"{:<12} {:<16} {:>12.2} {:<14} {:<16} {:>10}",
			row.id,
			row.uploaded_tx_id,
			row.uploaded_amount,
			row.status.label(),
			system_tx,
			row.variance_view().display(),
		);
	}

	out
}

pub fn stats(stats: &StatsSummary) -> String {
	format!(
		"Total {}\n  matched   {}\n  partial   {}\n  unmatched {}\n  duplicate {}\nAccuracy {:.2}%\n",
		stats.total, stats.matched, stats.partial, stats.unmatched, stats.duplicate, stats.accuracy
	)
}

pub fn audit_state(state: &AuditTrailState) -> String {
	match state {
		AuditTrailState::Closed => String::new(),
		AuditTrailState::Loading { record_id } => format!("History of {record_id}: loading...\n"),
		AuditTrailState::Loaded { record_id, entries } => audit_entries(record_id, entries),
		AuditTrailState::Failed { record_id, message } =>
			format!("History of {record_id}: {message}\n"),
	}
}

pub fn audit_entries(record_id: &str, entries: &[AuditLogEntry]) -> String {
	let mut out = format!("History of {record_id}:\n");

	if entries.is_empty() {
		out.push_str("  No history recorded.\n");

		return out;
	}

	for entry in entries {
		let kind = match entry.kind {
			AuditKind::System => "system",
			AuditKind::User => "user",
		};
		let when = entry.time.format(TIME_FORMAT).unwrap_or_else(|_| entry.time.to_string());

		let _ = writeln!(out, "  {when} [{kind}] {} by {}", entry.action, entry.user);

		if entry.has_diff() {
			let _ = writeln!(
				out,
				"      {} -> {}",
				describe(entry.old_value.as_ref()),
				describe(entry.new_value.as_ref())
			);
		}
	}

	out
}

fn describe(value: Option<&AuditValue>) -> String {
	let Some(value) = value else {
		return "-".to_string();
	};
	let mut parts = Vec::new();

	if let Some(status) = value.status {
		parts.push(status.label());
	}
	for (key, field) in &value.extra {
		match field.as_str() {
			Some(text) => parts.push(format!("{key}: {text}")),
			None => parts.push(format!("{key}: {field}")),
		}
	}

	if parts.is_empty() { "-".to_string() } else { parts.join(", ") }
}
