use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::{ReconStatus, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditKind {
	/// Written by the reconciliation run.
	System,
	/// Written by an analyst, e.g. a manual override.
	User,
}

/// Snapshot of the fields a change touched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditValue {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status: Option<ReconStatus>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
	pub id: String,
	#[serde(rename = "type")]
	pub kind: AuditKind,
	pub action: String,
	#[serde(with = "crate::time_serde")]
	pub time: OffsetDateTime,
	#[serde(default)]
	pub user: String,
	#[serde(default)]
	pub old_value: Option<AuditValue>,
	#[serde(default)]
	pub new_value: Option<AuditValue>,
}
impl AuditLogEntry {
	pub fn has_diff(&self) -> bool {
		self.old_value.is_some() || self.new_value.is_some()
	}
}

/// Decodes `GET /reconciliation/audit/:id`, keeping server order.
pub fn decode_audit_trail(body: &[u8]) -> Result<Vec<AuditLogEntry>> {
	Ok(serde_json::from_slice(body)?)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn keeps_server_order_and_diffs() {
		let body = br#"[
			{"id":"a2","type":"USER","action":"Manual override","time":"2025-03-01T10:15:00Z","user":"alice","oldValue":{"status":"UNMATCHED"},"newValue":{"status":"MATCHED","notes":"bank statement"}},
			{"id":"a1","type":"SYSTEM","action":"Reconciled","time":"2025-02-28T08:00:00Z","user":"system"}
		]"#;
		let entries = decode_audit_trail(body).expect("audit trail decodes");

		assert_eq!(entries.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(), ["a2", "a1"]);
		assert_eq!(entries[0].kind, AuditKind::User);
		assert_eq!(
			entries[0].new_value.as_ref().and_then(|v| v.status),
			Some(ReconStatus::Matched)
		);
		assert_eq!(
			entries[0].new_value.as_ref().and_then(|v| v.extra.get("notes")).and_then(Value::as_str),
			Some("bank statement")
		);
		assert!(!entries[1].has_diff());
	}

	#[test]
	fn rejects_unknown_entry_kind() {
		let body = br#"[{"id":"a1","type":"ROBOT","action":"x","time":"2025-02-28T08:00:00Z"}]"#;

		assert!(decode_audit_trail(body).is_err());
	}
}
