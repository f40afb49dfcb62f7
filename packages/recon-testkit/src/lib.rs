mod fixtures;

pub use fixtures::{audit_entry, result, results_page, server_error};

use std::{
	collections::{HashMap, VecDeque},
	sync::{
		Arc, Mutex, MutexGuard,
		atomic::{AtomicUsize, Ordering},
	},
};

use tokio::sync::oneshot;

use recon_domain::{AuditLogEntry, OverrideRequest, ResultsPage, ResultsQuery};
use recon_query::{BoxFuture, ReconApi, Refresh};

type Responder<Req, Resp> = Box<dyn Fn(&Req) -> Resp + Send + Sync>;

/// One scripted endpoint of [`FakeReconApi`].
///
/// Each call is recorded. Its reply comes from, in order: a test that holds calls and releases
/// them one by one, the queue of scripted replies, or the default responder.
pub struct Endpoint<Req, Resp> {
	state: Mutex<EndpointState<Req, Resp>>,
}
impl<Req, Resp> Endpoint<Req, Resp>
where
	Req: Clone,
{
	fn new(responder: impl Fn(&Req) -> Resp + Send + Sync + 'static) -> Self {
		Self {
			state: Mutex::new(EndpointState {
				calls: Vec::new(),
				queued: VecDeque::new(),
				held: false,
				waiting: HashMap::new(),
				responder: Box::new(responder),
			}),
		}
	}

	/// Replaces the default responder.
	pub fn respond_with(&self, responder: impl Fn(&Req) -> Resp + Send + Sync + 'static) {
		self.lock().responder = Box::new(responder);
	}

	/// Queues a reply for the next unheld call.
	pub fn push_reply(&self, reply: Resp) {
		self.lock().queued.push_back(reply);
	}

	/// While held, calls wait until [`Self::release`] answers them.
	pub fn hold(&self, held: bool) {
		self.lock().held = held;
	}

	/// Answers the held call with index `call`. Returns `false` if nobody is waiting for it anymore.
	pub fn release(&self, call: usize, reply: Resp) -> bool {
		match self.lock().waiting.remove(&call) {
			Some(waiter) => waiter.send(reply).is_ok(),
			None => false,
		}
	}

	pub fn calls(&self) -> Vec<Req> {
		self.lock().calls.clone()
	}

	pub fn call_count(&self) -> usize {
		self.lock().calls.len()
	}

	async fn call(&self, request: Req) -> Resp {
		let waiter = {
			let mut state = self.lock();
			let index = state.calls.len();

			state.calls.push(request.clone());

			if state.held {
				let (tx, rx) = oneshot::channel();

				state.waiting.insert(index, tx);

				Err(rx)
			} else if let Some(reply) = state.queued.pop_front() {
				Ok(reply)
			} else {
				Ok((state.responder)(&request))
			}
		};

		match waiter {
			Ok(reply) => reply,
			Err(rx) => match rx.await {
				Ok(reply) => reply,
				Err(_) => std::future::pending().await,
			},
		}
	}

	fn lock(&self) -> MutexGuard<'_, EndpointState<Req, Resp>> {
		self.state.lock().unwrap_or_else(|err| err.into_inner())
	}
}

struct EndpointState<Req, Resp> {
	calls: Vec<Req>,
	queued: VecDeque<Resp>,
	held: bool,
	waiting: HashMap<usize, oneshot::Sender<Resp>>,
	responder: Responder<Req, Resp>,
}

/// In-memory stand-in for the reconciliation service.
///
/// By default every results query returns an empty single page, every audit trail is empty and
/// every override succeeds.
pub struct FakeReconApi {
	pub results: Endpoint<ResultsQuery, recon_client::Result<ResultsPage>>,
	pub audit: Endpoint<String, recon_client::Result<Vec<AuditLogEntry>>>,
	pub overrides: Endpoint<OverrideRequest, recon_client::Result<()>>,
}
impl FakeReconApi {
	pub fn new() -> Self {
		Self {
			results: Endpoint::new(|query: &ResultsQuery| Ok(results_page(Vec::new(), 0, 1, query.page))),
			audit: Endpoint::new(|_: &String| Ok(Vec::new())),
			overrides: Endpoint::new(|_: &OverrideRequest| Ok(())),
		}
	}

	pub fn shared() -> Arc<Self> {
		Arc::new(Self::new())
	}
}
impl Default for FakeReconApi {
	fn default() -> Self {
		Self::new()
	}
}
impl ReconApi for FakeReconApi {
	fn results<'a>(
		&'a self,
		query: &'a ResultsQuery,
	) -> BoxFuture<'a, recon_client::Result<ResultsPage>> {
		Box::pin(self.results.call(query.clone()))
	}

	fn audit_trail<'a>(
		&'a self,
		record_id: &'a str,
	) -> BoxFuture<'a, recon_client::Result<Vec<AuditLogEntry>>> {
		Box::pin(self.audit.call(record_id.to_string()))
	}

	fn override_status<'a>(
		&'a self,
		request: &'a OverrideRequest,
	) -> BoxFuture<'a, recon_client::Result<()>> {
		Box::pin(self.overrides.call(request.clone()))
	}
}

#[derive(Default)]
pub struct SpyRefresh {
	pub calls: Arc<AtomicUsize>,
}
impl SpyRefresh {
	pub fn count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl Refresh for SpyRefresh {
	fn refresh(&self) -> BoxFuture<'_, ()> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		Box::pin(async {})
	}
}

/// Lets every ready task run without moving the clock.
pub async fn settle() {
	for _ in 0..16 {
		tokio::task::yield_now().await;
	}
}
