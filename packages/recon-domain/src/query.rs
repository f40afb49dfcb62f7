use serde::Serialize;

use crate::ReconStatus;

/// Parameters of one results request. Empty search and absent status are omitted on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsQuery {
	pub page: u32,
	pub limit: u32,
	pub search: String,
	pub status: Option<ReconStatus>,
}
impl ResultsQuery {
	pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
		let mut pairs = vec![("page", self.page.to_string()), ("limit", self.limit.to_string())];
		let search = self.search.trim();

		if !search.is_empty() {
			pairs.push(("search", search.to_string()));
		}
		if let Some(status) = self.status {
			pairs.push(("status", status.as_str().to_string()));
		}

		pairs
	}
}

/// A manual status correction. Lives only for the duration of one submit call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideRequest {
	pub record_id: String,
	pub new_status: ReconStatus,
	pub note: String,
}
impl OverrideRequest {
	pub fn body(&self) -> OverrideBody<'_> {
		OverrideBody { status: self.new_status, notes: self.note.trim() }
	}
}

#[derive(Debug, Serialize)]
pub struct OverrideBody<'a> {
	pub status: ReconStatus,
	pub notes: &'a str,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn omits_empty_filters() {
		let query = ResultsQuery { page: 2, limit: 10, search: "  ".to_string(), status: None };

		assert_eq!(query.to_pairs(), vec![("page", "2".to_string()), ("limit", "10".to_string())]);
	}

	#[test]
	fn includes_search_and_status() {
		let query = ResultsQuery {
			page: 1,
			limit: 25,
			search: " TX-9 ".to_string(),
			status: Some(ReconStatus::Unmatched),
		};
		let pairs = query.to_pairs();

		assert!(pairs.contains(&("search", "TX-9".to_string())));
		assert!(pairs.contains(&("status", "UNMATCHED".to_string())));
	}

	#[test]
	fn override_body_trims_note() {
		let request = OverrideRequest {
			record_id: "r1".to_string(),
			new_status: ReconStatus::Matched,
			note: "  verified via bank statement \n".to_string(),
		};
		let body = serde_json::to_value(request.body()).expect("body serializes");

		assert_eq!(body, serde_json::json!({ "status": "MATCHED", "notes": "verified via bank statement" }));
	}
}
