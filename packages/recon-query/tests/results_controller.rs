use std::{sync::Arc, time::Duration};

use tokio::time;

use recon_domain::{ReconStatus, ResultsQuery};
use recon_query::{FilterState, QuerySettings, Refresh, ResultQueryController, ResultsView};
use recon_testkit::{FakeReconApi, result, results_page, server_error, settle};

const DEBOUNCE: Duration = Duration::from_millis(300);

fn settings() -> QuerySettings {
	QuerySettings { page_limit: 10, debounce: DEBOUNCE }
}

async fn past_debounce() {
	time::sleep(DEBOUNCE + Duration::from_millis(50)).await;
	settle().await;
}

fn ids(view: &ResultsView) -> Vec<String> {
	view.data.iter().map(|record| record.id.clone()).collect()
}

fn last_query(api: &FakeReconApi) -> ResultsQuery {
	api.results.calls().pop().expect("at least one results query")
}

#[tokio::test(start_paused = true)]
async fn first_load_waits_for_the_debounce_window() {
	let api = FakeReconApi::shared();
	let _controller = ResultQueryController::spawn(api.clone(), settings());

	settle().await;

	assert_eq!(api.results.call_count(), 0);

	past_debounce().await;

	assert_eq!(
		api.results.calls(),
		vec![ResultsQuery { page: 1, limit: 10, search: String::new(), status: None }]
	);
}

#[tokio::test(start_paused = true)]
async fn burst_of_edits_issues_one_fetch_with_the_final_values() {
	let api = FakeReconApi::shared();
	let controller = ResultQueryController::spawn(api.clone(), settings());

	past_debounce().await;

	controller.set_search("a");
	time::sleep(Duration::from_millis(100)).await;
	controller.set_search("ab");
	time::sleep(Duration::from_millis(100)).await;
	controller.set_status(Some(ReconStatus::Unmatched));
	time::sleep(Duration::from_millis(100)).await;

	assert_eq!(api.results.call_count(), 1);

	past_debounce().await;

	assert_eq!(api.results.call_count(), 2);
	assert_eq!(
		last_query(&api),
		ResultsQuery {
			page: 1,
			limit: 10,
			search: "ab".to_string(),
			status: Some(ReconStatus::Unmatched),
		}
	);
}

#[tokio::test(start_paused = true)]
async fn newer_response_wins_when_the_older_one_arrives_last() {
	let api = FakeReconApi::shared();
	let controller = ResultQueryController::spawn(api.clone(), settings());

	api.results.hold(true);
	past_debounce().await;

	assert!(controller.snapshot().loading);

	controller.set_search("INV");
	past_debounce().await;

	assert_eq!(api.results.call_count(), 2);

	api.results.release(1, Ok(results_page(vec![result("b1", ReconStatus::Matched)], 1, 1, 1)));
	settle().await;

	let view = controller.snapshot();

	assert_eq!(ids(&view), ["b1"]);
	assert!(!view.loading);

	api.results.release(0, Ok(results_page(vec![result("a1", ReconStatus::Unmatched)], 1, 1, 1)));
	settle().await;

	assert_eq!(ids(&controller.snapshot()), ["b1"]);
}

#[tokio::test(start_paused = true)]
async fn older_response_arriving_first_is_discarded() {
	let api = FakeReconApi::shared();
	let controller = ResultQueryController::spawn(api.clone(), settings());

	api.results.hold(true);
	past_debounce().await;
	controller.set_search("INV");
	past_debounce().await;

	api.results.release(0, Ok(results_page(vec![result("a1", ReconStatus::Unmatched)], 1, 1, 1)));
	settle().await;

	let view = controller.snapshot();

	assert!(view.data.is_empty());
	assert!(view.loading);

	api.results.release(1, Ok(results_page(vec![result("b1", ReconStatus::Matched)], 1, 1, 1)));
	settle().await;

	let view = controller.snapshot();

	assert_eq!(ids(&view), ["b1"]);
	assert!(!view.loading);
}

#[tokio::test(start_paused = true)]
async fn refresh_runs_outside_the_debounce_window() {
	let api = FakeReconApi::shared();
	let controller = ResultQueryController::spawn(api.clone(), settings());

	past_debounce().await;

	let before = time::Instant::now();

	controller.refresh().await;
	controller.refresher().refresh().await;

	assert_eq!(api.results.call_count(), 3);
	assert_eq!(time::Instant::now(), before);
}

#[tokio::test(start_paused = true)]
async fn failed_load_keeps_the_last_good_page() {
	let api = FakeReconApi::shared();

	api.results.respond_with(|query| {
		Ok(results_page(vec![result("r1", ReconStatus::Matched)], 1, 1, query.page))
	});

	let controller = ResultQueryController::spawn(api.clone(), settings());

	past_debounce().await;

	assert_eq!(ids(&controller.snapshot()), ["r1"]);

	api.results.push_reply(Err(server_error("database unavailable")));
	controller.refresh().await;

	let view = controller.snapshot();

	assert_eq!(ids(&view), ["r1"]);
	assert!(!view.loading);
	assert!(
		view.error.as_deref().is_some_and(|message| message.contains("database unavailable")),
		"unexpected error: {:?}",
		view.error
	);

	controller.refresh().await;

	assert_eq!(controller.snapshot().error, None);
}

#[tokio::test(start_paused = true)]
async fn page_moves_are_bounded_by_the_last_page_count() {
	let api = FakeReconApi::shared();

	api.results.respond_with(|query| {
		Ok(results_page(vec![result("r1", ReconStatus::Matched)], 30, 3, query.page))
	});

	let controller = ResultQueryController::spawn(api.clone(), settings());

	past_debounce().await;

	assert_eq!(controller.total_pages(), 3);
	assert!(!controller.set_page(4));
	assert!(!controller.set_page(0));
	assert!(!controller.prev_page());
	assert!(controller.set_page(3));
	assert!(!controller.next_page());

	past_debounce().await;

	assert_eq!(api.results.call_count(), 2);
	assert_eq!(last_query(&api).page, 3);
}

#[tokio::test(start_paused = true)]
async fn page_change_keeps_search_and_status() {
	let api = FakeReconApi::shared();

	api.results.respond_with(|query| {
		Ok(results_page(vec![result("r1", ReconStatus::Unmatched)], 30, 3, query.page))
	});

	let controller = ResultQueryController::spawn(api.clone(), settings());

	controller.set_search("INV");
	controller.set_status(Some(ReconStatus::Unmatched));
	past_debounce().await;

	assert!(controller.set_page(2));
	assert_eq!(
		controller.filters(),
		FilterState {
			page: 2,
			search: "INV".to_string(),
			status: Some(ReconStatus::Unmatched),
		}
	);

	past_debounce().await;

	assert_eq!(
		last_query(&api),
		ResultsQuery {
			page: 2,
			limit: 10,
			search: "INV".to_string(),
			status: Some(ReconStatus::Unmatched),
		}
	);
	assert_eq!(controller.snapshot().filters.page, 2);
}

#[tokio::test(start_paused = true)]
async fn shrinking_result_set_clamps_to_the_served_page() {
	let api = FakeReconApi::shared();

	api.results.respond_with(|query| {
		if query.status == Some(ReconStatus::Unmatched) {
			Ok(results_page(Vec::new(), 0, 1, 1))
		} else {
			Ok(results_page(vec![result("r1", ReconStatus::Matched)], 25, 3, query.page))
		}
	});

	let controller = ResultQueryController::spawn(api.clone(), settings());

	past_debounce().await;

	assert_eq!(controller.snapshot().total_pages, 3);

	controller.set_status(Some(ReconStatus::Unmatched));

	assert!(controller.set_page(2));

	past_debounce().await;

	let query = last_query(&api);

	assert_eq!((query.page, query.status), (2, Some(ReconStatus::Unmatched)));

	let view = controller.snapshot();

	assert!(view.data.is_empty());
	assert_eq!((view.total, view.total_pages), (0, 1));
	assert_eq!(controller.filters().page, 1);

	past_debounce().await;

	assert_eq!(api.results.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn clamp_refetches_when_the_server_answered_another_page() {
	let api = FakeReconApi::shared();

	api.results.push_reply(Ok(results_page(vec![result("r1", ReconStatus::Matched)], 50, 5, 1)));
	api.results.respond_with(|query| {
		let data =
			if query.page <= 2 { vec![result("r2", ReconStatus::PartialMatch)] } else { Vec::new() };

		Ok(results_page(data, 20, 2, query.page))
	});

	let controller = ResultQueryController::spawn(api.clone(), settings());

	past_debounce().await;

	assert!(controller.set_page(5));

	past_debounce().await;

	assert_eq!(controller.filters().page, 2);

	past_debounce().await;

	let pages = api.results.calls().iter().map(|query| query.page).collect::<Vec<_>>();

	assert_eq!(pages, [1, 5, 2]);
	assert_eq!(ids(&controller.snapshot()), ["r2"]);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_controller_stops_scheduling() {
	let api = FakeReconApi::shared();
	let controller = ResultQueryController::spawn(api.clone(), settings());

	drop(controller);
	past_debounce().await;

	assert_eq!(api.results.call_count(), 0);
	assert_eq!(Arc::strong_count(&api), 1);
}
