use std::sync::atomic::{AtomicU32, Ordering};

use tokio::sync::watch;

use recon_domain::ReconStatus;

/// What the analyst is currently asking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
	pub page: u32,
	pub search: String,
	pub status: Option<ReconStatus>,
}
impl Default for FilterState {
	fn default() -> Self {
		Self { page: 1, search: String::new(), status: None }
	}
}

/// Single-writer store for [`FilterState`].
///
/// Every edit is an atomic read-modify-write on the current value, and subscribers are only woken
/// when the value actually changed. Changing `search` or `status` sends the analyst back to the
/// first page. Page moves outside `1..=total_pages` are ignored.
pub struct FilterStore {
	state: watch::Sender<FilterState>,
	total_pages: AtomicU32,
}
impl FilterStore {
	pub fn new() -> Self {
		Self { state: watch::Sender::new(FilterState::default()), total_pages: AtomicU32::new(1) }
	}

	pub fn current(&self) -> FilterState {
		self.state.borrow().clone()
	}

	pub fn subscribe(&self) -> watch::Receiver<FilterState> {
		self.state.subscribe()
	}

	pub fn total_pages(&self) -> u32 {
		self.total_pages.load(Ordering::Acquire)
	}

	/// Applies `edit` to a copy of the current filters and publishes the result.
	///
	/// Returns whether anything changed. `edit` runs while the store is locked and must not call
	/// back into it.
	pub fn update(&self, edit: impl FnOnce(&mut FilterState)) -> bool {
		let total_pages = self.total_pages();

		self.state.send_if_modified(|current| {
			let mut next = current.clone();

			edit(&mut next);

			if next.search != current.search || next.status != current.status {
				next.page = 1;
			} else if next.page != current.page && !(1..=total_pages).contains(&next.page) {
				tracing::debug!(
					requested = next.page,
					total_pages,
					"Ignoring page outside the known range."
				);

				next.page = current.page;
			}

			if next == *current {
				return false;
			}

			*current = next;

			true
		})
	}

	pub fn set_page(&self, page: u32) -> bool {
		self.update(|filters| filters.page = page)
	}

	/// Records the page count reported by the latest response and pulls the current page back
	/// into range.
	///
	/// The clamp only wakes subscribers when the server did not already answer for the clamped
	/// page, so a response for the last valid page does not trigger a second identical fetch.
	pub(crate) fn apply_page_count(&self, total_pages: u32, served_page: u32) -> bool {
		let total_pages = total_pages.max(1);

		self.total_pages.store(total_pages, Ordering::Release);
		self.state.send_if_modified(|current| {
			if current.page <= total_pages {
				return false;
			}

			tracing::debug!(from = current.page, to = total_pages, "Clamping page to the last page.");

			current.page = total_pages;

			current.page != served_page
		})
	}
}
impl Default for FilterStore {
	fn default() -> Self {
		Self::new()
	}
}
