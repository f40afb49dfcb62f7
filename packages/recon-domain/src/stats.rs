use serde::{Deserialize, Serialize};

use crate::{Result, WireNumber};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
	pub total: u64,
	pub matched: u64,
	pub partial: u64,
	pub unmatched: u64,
	pub duplicate: u64,
	/// Share of matched records as reported by the service, in percent.
	pub accuracy: f64,
}
impl StatsSummary {
	pub fn from_slice(body: &[u8]) -> Result<Self> {
		let wire: WireStats = serde_json::from_slice(body)?;

		wire.normalize()
	}
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WireBreakdown {
	pub matched: WireNumber,
	pub partial: WireNumber,
	pub unmatched: WireNumber,
	pub duplicate: WireNumber,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WireStats {
	pub total: WireNumber,
	pub breakdown: WireBreakdown,
	pub accuracy: WireNumber,
}
impl WireStats {
	pub fn normalize(self) -> Result<StatsSummary> {
		Ok(StatsSummary {
			total: self.total.to_count("total")?,
			matched: self.breakdown.matched.to_count("breakdown.matched")?,
			partial: self.breakdown.partial.to_count("breakdown.partial")?,
			unmatched: self.breakdown.unmatched.to_count("breakdown.unmatched")?,
			duplicate: self.breakdown.duplicate.to_count("breakdown.duplicate")?,
			accuracy: self.accuracy.to_f64("accuracy")?,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn mixed_text_and_numeric_counters_decode() {
		let body = br#"{"total":"120","breakdown":{"matched":100,"partial":"8","unmatched":10,"duplicate":"2"},"accuracy":"83.33"}"#;
		let stats = StatsSummary::from_slice(body).expect("stats decode");

		assert_eq!(stats.total, 120);
		assert_eq!(stats.partial, 8);
		assert_eq!(stats.duplicate, 2);
		assert_eq!(stats.accuracy, 83.33);
	}
}
