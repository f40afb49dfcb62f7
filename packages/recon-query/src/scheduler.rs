use std::time::Duration;

use tokio::{sync::watch, time};

/// Waits for a watched value to stop changing for a full quiet window.
#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
	delay: Duration,
}
impl Debouncer {
	pub fn new(delay: Duration) -> Self {
		Self { delay }
	}

	pub fn delay(&self) -> Duration {
		self.delay
	}

	/// Resolves once `rx` has seen no change for `delay`.
	///
	/// Every change restarts the window. Returns `false` when the sender is gone.
	pub async fn settle<T>(&self, rx: &mut watch::Receiver<T>) -> bool {
		loop {
			tokio::select! {
				_ = time::sleep(self.delay) => return true,
				changed = rx.changed() => {
					if changed.is_err() {
						return false;
					}
				},
			}
		}
	}
}

/// Identifies one issued request. Only the most recently issued ticket is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);
impl Ticket {
	pub fn get(self) -> u64 {
		self.0
	}
}

/// Monotonic request counter used to drop responses that were overtaken by a newer request.
#[derive(Debug, Default)]
pub struct RequestSequence {
	latest: u64,
}
impl RequestSequence {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn issue(&mut self) -> Ticket {
		self.latest += 1;

		Ticket(self.latest)
	}

	pub fn is_current(&self, ticket: Ticket) -> bool {
		ticket.0 == self.latest
	}

	pub fn latest(&self) -> Option<Ticket> {
		(self.latest > 0).then_some(Ticket(self.latest))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn only_the_latest_ticket_is_current() {
		let mut sequence = RequestSequence::new();

		assert_eq!(sequence.latest(), None);

		let first = sequence.issue();
		let second = sequence.issue();

		assert!(first < second);
		assert!(!sequence.is_current(first));
		assert!(sequence.is_current(second));
		assert_eq!(sequence.latest(), Some(second));
	}

	#[tokio::test(start_paused = true)]
	async fn settle_waits_for_a_quiet_window() {
		let (tx, mut rx) = watch::channel(0_u32);
		let debouncer = Debouncer::new(Duration::from_millis(300));
		let started = time::Instant::now();
		let writer = tokio::spawn(async move {
			for value in 1..=3 {
				time::sleep(Duration::from_millis(100)).await;
				tx.send_replace(value);
			}

			tx
		});

		assert!(debouncer.settle(&mut rx).await);
		assert!(started.elapsed() >= Duration::from_millis(600));
		assert!(started.elapsed() < Duration::from_millis(700));
		assert_eq!(*rx.borrow(), 3);

		drop(writer.await.expect("writer task"));
	}

	#[tokio::test(start_paused = true)]
	async fn settle_reports_closed_sender() {
		let (tx, mut rx) = watch::channel(());
		let debouncer = Debouncer::new(Duration::from_millis(300));

		drop(tx);

		assert!(!debouncer.settle(&mut rx).await);
	}
}
