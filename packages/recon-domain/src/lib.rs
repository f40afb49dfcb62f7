pub mod audit;
pub mod query;
pub mod result;
pub mod stats;
pub mod status;
pub mod time_serde;
pub mod wire;

mod error;

pub use audit::{AuditKind, AuditLogEntry, AuditValue, decode_audit_trail};
pub use error::{DecodeError, Result};
pub use query::{OverrideBody, OverrideRequest, ResultsQuery};
pub use result::{
	ReconResult, ResultsPage, SystemRecord, VarianceView, WireReconResult, WireResultsPage,
	WireSystemRecord,
};
pub use stats::{StatsSummary, WireStats};
pub use status::{ReconStatus, UnknownStatus};
pub use wire::WireNumber;
