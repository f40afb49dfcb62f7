use serde::{Deserialize, Serialize};

use crate::{DecodeError, ReconStatus, Result, WireNumber, wire};

/// The system-of-record side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemRecord {
	pub id: String,
	pub transaction_id: String,
	pub amount: f64,
	pub date: String,
}

/// One comparison outcome with every numeric field in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconResult {
	pub id: String,
	pub uploaded_tx_id: String,
	pub uploaded_amount: f64,
	pub status: ReconStatus,
	/// Uploaded amount minus system amount. Only meaningful when `system_record` is present.
	pub variance: f64,
	pub system_record: Option<SystemRecord>,
}
impl ReconResult {
	pub fn variance_view(&self) -> VarianceView {
		if self.system_record.is_none() {
			return VarianceView::NotComparable;
		}

		if self.variance == 0.0 {
			VarianceView::Exact
		} else if self.variance > 0.0 {
			VarianceView::Over(self.variance)
		} else {
			VarianceView::Under(self.variance)
		}
	}
}

/// How a record's variance should be presented.
///
/// `Exact` and `NotComparable` differ: a zero variance against a system record
/// is a clean match, while a missing system record means there was nothing to compare against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VarianceView {
	NotComparable,
	Exact,
	/// Uploaded amount exceeds the system record.
	Over(f64),
	Under(f64),
}
impl VarianceView {
	pub fn display(&self) -> String {
		match self {
			Self::NotComparable => "n/a".to_string(),
			Self::Exact => "0.00".to_string(),
			Self::Over(value) => format!("+{value:.2}"),
			Self::Under(value) => format!("{value:.2}"),
		}
	}
}

/// One page of results as served by `GET /reconciliation/results`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsPage {
	pub results: Vec<ReconResult>,
	pub total: u64,
	/// Always at least one, even for an empty result set.
	pub pages: u32,
	/// The page the server says it served, at least one.
	pub page: u32,
}
impl ResultsPage {
	pub fn from_slice(body: &[u8]) -> Result<Self> {
		let wire: WireResultsPage = serde_json::from_slice(body)?;

		wire.normalize()
	}
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSystemRecord {
	pub id: String,
	pub transaction_id: String,
	pub amount: WireNumber,
	#[serde(default)]
	pub date: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireReconResult {
	pub id: String,
	pub uploaded_tx_id: String,
	pub uploaded_amount: WireNumber,
	pub status: ReconStatus,
	#[serde(default)]
	pub variance: Option<WireNumber>,
	#[serde(default)]
	pub system_record: Option<WireSystemRecord>,
}
impl WireReconResult {
	pub fn normalize(self) -> Result<ReconResult> {
		let uploaded_amount = self.uploaded_amount.to_f64("uploadedAmount")?;
		let system_record = self
			.system_record
			.map(|record| -> Result<SystemRecord> {
				Ok(SystemRecord {
					amount: record.amount.to_f64("systemRecord.amount")?,
					id: record.id,
					transaction_id: record.transaction_id,
					date: record.date,
				})
			})
			.transpose()?;
		let variance = match (self.variance, system_record.is_some()) {
			(Some(raw), _) => raw.to_f64("variance")?,
			(None, false) => 0.0,
			(None, true) => return Err(DecodeError::MissingVariance { id: self.id }),
		};

		if self.status.expects_system_record() != system_record.is_some() {
			tracing::warn!(
				record_id = %self.id,
				status = %self.status,
				has_system_record = system_record.is_some(),
				"Reconciliation record status disagrees with system record presence."
			);
		}

		Ok(ReconResult {
			id: self.id,
			uploaded_tx_id: self.uploaded_tx_id,
			uploaded_amount,
			status: self.status,
			variance,
			system_record,
		})
	}
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WireResultsPage {
	#[serde(default)]
	pub results: Vec<WireReconResult>,
	pub total: WireNumber,
	pub pages: WireNumber,
	pub page: WireNumber,
}
impl WireResultsPage {
	pub fn normalize(self) -> Result<ResultsPage> {
		let results =
			self.results.into_iter().map(WireReconResult::normalize).collect::<Result<Vec<_>>>()?;

		Ok(ResultsPage {
			results,
			total: self.total.to_count("total")?,
			pages: wire::count_u32(&self.pages, "pages")?.max(1),
			page: wire::count_u32(&self.page, "page")?.max(1),
		})
	}
}
