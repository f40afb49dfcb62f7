use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconStatus {
	Matched,
	PartialMatch,
	Unmatched,
	Duplicate,
}
impl ReconStatus {
	pub const ALL: [Self; 4] = [Self::Matched, Self::PartialMatch, Self::Unmatched, Self::Duplicate];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Matched => "MATCHED",
			Self::PartialMatch => "PARTIAL_MATCH",
			Self::Unmatched => "UNMATCHED",
			Self::Duplicate => "DUPLICATE",
		}
	}

	/// Human label, e.g. "PARTIAL MATCH".
	pub fn label(self) -> String {
		self.as_str().replace('_', " ")
	}

	/// Duplicates are flagged by the reconciliation run and cannot be set by hand.
	pub fn is_override_target(self) -> bool {
		!matches!(self, Self::Duplicate)
	}

	/// Whether a record with this status is expected to carry a system-side counterpart.
	pub fn expects_system_record(self) -> bool {
		!matches!(self, Self::Unmatched)
	}
}
impl fmt::Display for ReconStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for ReconStatus {
	type Err = UnknownStatus;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		let normalized = raw.trim().to_ascii_uppercase().replace([' ', '-'], "_");

		Self::ALL
			.into_iter()
			.find(|status| status.as_str() == normalized)
			.ok_or_else(|| UnknownStatus(raw.to_string()))
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown reconciliation status {0:?}; expected one of MATCHED, PARTIAL_MATCH, UNMATCHED, DUPLICATE.")]
pub struct UnknownStatus(pub String);

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_wire_and_human_spellings() {
		assert_eq!("PARTIAL_MATCH".parse::<ReconStatus>(), Ok(ReconStatus::PartialMatch));
		assert_eq!("partial match".parse::<ReconStatus>(), Ok(ReconStatus::PartialMatch));
		assert_eq!(" unmatched ".parse::<ReconStatus>(), Ok(ReconStatus::Unmatched));
		assert!("SETTLED".parse::<ReconStatus>().is_err());
	}

	#[test]
	fn rejects_unknown_wire_values() {
		let err = serde_json::from_str::<ReconStatus>("\"PENDING\"");

		assert!(err.is_err());
	}

	#[test]
	fn duplicate_is_not_an_override_target() {
		assert!(!ReconStatus::Duplicate.is_override_target());
		assert!(ReconStatus::Unmatched.is_override_target());
	}
}
