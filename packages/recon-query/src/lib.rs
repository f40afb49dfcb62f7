pub mod audit;
pub mod controller;
pub mod filter;
pub mod override_flow;
pub mod scheduler;

use std::{future::Future, pin::Pin};

pub use audit::{AuditTrailLoader, AuditTrailState};
pub use controller::{QuerySettings, Refresher, ResultQueryController, ResultsView};
pub use filter::{FilterState, FilterStore};
pub use override_flow::{OverrideDraft, OverridePhase, OverrideRejection, StatusOverrideWorkflow};
pub use scheduler::{Debouncer, RequestSequence, Ticket};

use recon_client::HttpReconApi;
use recon_domain::{AuditLogEntry, OverrideRequest, ResultsPage, ResultsQuery};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The slice of the reconciliation service the dashboard core talks to.
pub trait ReconApi
where
	Self: Send + Sync,
{
	fn results<'a>(
		&'a self,
		query: &'a ResultsQuery,
	) -> BoxFuture<'a, recon_client::Result<ResultsPage>>;

	fn audit_trail<'a>(
		&'a self,
		record_id: &'a str,
	) -> BoxFuture<'a, recon_client::Result<Vec<AuditLogEntry>>>;

	fn override_status<'a>(
		&'a self,
		request: &'a OverrideRequest,
	) -> BoxFuture<'a, recon_client::Result<()>>;
}
impl ReconApi for HttpReconApi {
	fn results<'a>(
		&'a self,
		query: &'a ResultsQuery,
	) -> BoxFuture<'a, recon_client::Result<ResultsPage>> {
		Box::pin(self.fetch_results(query))
	}

	fn audit_trail<'a>(
		&'a self,
		record_id: &'a str,
	) -> BoxFuture<'a, recon_client::Result<Vec<AuditLogEntry>>> {
		Box::pin(self.fetch_audit_trail(record_id))
	}

	fn override_status<'a>(
		&'a self,
		request: &'a OverrideRequest,
	) -> BoxFuture<'a, recon_client::Result<()>> {
		Box::pin(self.submit_override(request))
	}
}

/// Something that can re-run the current results query on demand.
pub trait Refresh
where
	Self: Send + Sync,
{
	fn refresh(&self) -> BoxFuture<'_, ()>;
}
