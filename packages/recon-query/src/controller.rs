//! Debounced, race-free loading of the reconciliation results table.
//!
//! Filter edits go through one [`FilterStore`]. A scheduler task waits until the filters have been
//! quiet for the debounce window and then issues a fetch for whatever they are at that moment.
//! Fetches may overlap; every one carries a [`Ticket`] and only the most recently issued ticket is
//! allowed to touch the read model, so a slow older response can never overwrite a newer one.

use std::{
	sync::{Arc, Mutex, MutexGuard},
	time::Duration,
};

use tokio::{sync::watch, task::JoinHandle};

use crate::{
	BoxFuture, ReconApi, Refresh,
	filter::{FilterState, FilterStore},
	scheduler::{Debouncer, RequestSequence, Ticket},
};
use recon_domain::{ReconResult, ReconStatus, ResultsQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuerySettings {
	pub page_limit: u32,
	pub debounce: Duration,
}
impl QuerySettings {
	pub fn from_config(cfg: &recon_config::Config) -> Self {
		Self {
			page_limit: cfg.api.page_limit,
			debounce: Duration::from_millis(cfg.query.debounce_ms),
		}
	}
}
impl Default for QuerySettings {
	fn default() -> Self {
		Self { page_limit: 10, debounce: Duration::from_millis(300) }
	}
}

/// What the results table renders.
///
/// `data` always holds the last successfully loaded page. A failed load sets `error` and leaves
/// `data` alone. `filters` is what the analyst asked for most recently, which may be ahead of
/// `data` while a debounced fetch is pending.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsView {
	pub data: Vec<ReconResult>,
	pub loading: bool,
	pub error: Option<String>,
	pub total: u64,
	pub total_pages: u32,
	pub filters: FilterState,
}
impl Default for ResultsView {
	fn default() -> Self {
		Self {
			data: Vec::new(),
			loading: false,
			error: None,
			total: 0,
			total_pages: 1,
			filters: FilterState::default(),
		}
	}
}

struct Shared {
	api: Arc<dyn ReconApi>,
	page_limit: u32,
	filters: FilterStore,
	sequence: Mutex<RequestSequence>,
	view: watch::Sender<ResultsView>,
}
impl Shared {
	async fn fetch_current(&self) {
		let (ticket, query) = self.begin();

		tracing::debug!(
			ticket = ticket.get(),
			page = query.page,
			search = %query.search,
			status = ?query.status,
			"Fetching reconciliation results."
		);

		let outcome = self.api.results(&query).await;
		let sequence = self.lock_sequence();

		if !sequence.is_current(ticket) {
			tracing::debug!(ticket = ticket.get(), "Discarding superseded results response.");

			return;
		}

		match outcome {
			Ok(page) => {
				self.filters.apply_page_count(page.pages, page.page);

				let filters = self.filters.current();

				self.view.send_modify(|view| {
					view.filters = filters;
					view.data = page.results;
					view.total = page.total;
					view.total_pages = page.pages.max(1);
					view.error = None;
					view.loading = false;
				});
			},
			Err(err) => {
				tracing::warn!(ticket = ticket.get(), error = %err, "Failed to load reconciliation results.");

				self.view.send_modify(|view| {
					view.error = Some(format!("Failed to load reconciliation results: {err}"));
					view.loading = false;
				});
			},
		}
	}

	fn begin(&self) -> (Ticket, ResultsQuery) {
		let mut sequence = self.lock_sequence();
		let ticket = sequence.issue();
		let filters = self.filters.current();

		self.view.send_if_modified(|view| !std::mem::replace(&mut view.loading, true));

		let query = ResultsQuery {
			page: filters.page,
			limit: self.page_limit,
			search: filters.search,
			status: filters.status,
		};

		(ticket, query)
	}

	fn publish_filters(&self) {
		let filters = self.filters.current();

		self.view.send_if_modified(|view| {
			if view.filters == filters {
				return false;
			}

			view.filters = filters;

			true
		});
	}

	fn lock_sequence(&self) -> MutexGuard<'_, RequestSequence> {
		self.sequence.lock().unwrap_or_else(|err| err.into_inner())
	}
}

async fn run_scheduler(
	shared: Arc<Shared>,
	mut filters: watch::Receiver<FilterState>,
	debouncer: Debouncer,
) {
	loop {
		if !debouncer.settle(&mut filters).await {
			break;
		}

		filters.borrow_and_update();

		let fetch = Arc::clone(&shared);

		tokio::spawn(async move { fetch.fetch_current().await });

		if filters.changed().await.is_err() {
			break;
		}
	}
}

/// Owns the filters and the results read model for one results table.
///
/// Dropping the controller stops the scheduler; fetches already in flight finish on their own.
pub struct ResultQueryController {
	shared: Arc<Shared>,
	scheduler: JoinHandle<()>,
}
impl ResultQueryController {
	/// Starts the scheduler on the current Tokio runtime.
	///
	/// The first load is issued once the initial debounce window has passed.
	pub fn spawn(api: Arc<dyn ReconApi>, settings: QuerySettings) -> Self {
		let shared = Arc::new(Shared {
			api,
			page_limit: settings.page_limit,
			filters: FilterStore::new(),
			sequence: Mutex::new(RequestSequence::new()),
			view: watch::Sender::new(ResultsView::default()),
		});
		let filters = shared.filters.subscribe();
		let scheduler =
			tokio::spawn(run_scheduler(Arc::clone(&shared), filters, Debouncer::new(settings.debounce)));

		Self { shared, scheduler }
	}

	pub fn snapshot(&self) -> ResultsView {
		self.shared.view.borrow().clone()
	}

	pub fn subscribe(&self) -> watch::Receiver<ResultsView> {
		self.shared.view.subscribe()
	}

	pub fn filters(&self) -> FilterState {
		self.shared.filters.current()
	}

	pub fn subscribe_filters(&self) -> watch::Receiver<FilterState> {
		self.shared.filters.subscribe()
	}

	pub fn total_pages(&self) -> u32 {
		self.shared.filters.total_pages()
	}

	/// Edits the filters. Returns whether anything changed; a change schedules a debounced fetch.
	pub fn set_filters(&self, edit: impl FnOnce(&mut FilterState)) -> bool {
		let changed = self.shared.filters.update(edit);

		if changed {
			self.shared.publish_filters();
		}

		changed
	}

	pub fn set_search(&self, search: impl Into<String>) -> bool {
		let search = search.into();

		self.set_filters(|filters| filters.search = search)
	}

	pub fn set_status(&self, status: Option<ReconStatus>) -> bool {
		self.set_filters(|filters| filters.status = status)
	}

	pub fn set_page(&self, page: u32) -> bool {
		self.set_filters(|filters| filters.page = page)
	}

	pub fn next_page(&self) -> bool {
		self.set_page(self.filters().page.saturating_add(1))
	}

	pub fn prev_page(&self) -> bool {
		self.set_page(self.filters().page.saturating_sub(1))
	}

	/// Re-runs the current query right away, outside the debounce window.
	pub async fn refresh(&self) {
		self.shared.fetch_current().await;
	}

	pub fn refresher(&self) -> Refresher {
		Refresher { shared: Arc::clone(&self.shared) }
	}
}
impl Drop for ResultQueryController {
	fn drop(&mut self) {
		self.scheduler.abort();
	}
}

/// Cloneable handle that lets other components ask for a results refresh.
#[derive(Clone)]
pub struct Refresher {
	shared: Arc<Shared>,
}
impl Refresh for Refresher {
	fn refresh(&self) -> BoxFuture<'_, ()> {
		Box::pin(self.shared.fetch_current())
	}
}
