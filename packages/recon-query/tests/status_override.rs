use std::{sync::Arc, time::Duration};

use tokio::time;

use recon_domain::{OverrideRequest, ReconStatus};
use recon_query::{
	OverridePhase, OverrideRejection, QuerySettings, ResultQueryController, StatusOverrideWorkflow,
};
use recon_testkit::{FakeReconApi, SpyRefresh, result, results_page, server_error, settle};

fn workflow(api: &Arc<FakeReconApi>, spy: &Arc<SpyRefresh>) -> StatusOverrideWorkflow {
	StatusOverrideWorkflow::new(api.clone(), spy.clone())
}

#[tokio::test]
async fn blank_note_is_rejected_without_a_request() {
	let api = FakeReconApi::shared();
	let spy = Arc::new(SpyRefresh::default());
	let mut flow = workflow(&api, &spy);

	flow.open("r1", ReconStatus::Unmatched);
	flow.select_status(ReconStatus::Matched);
	flow.set_note("   ");

	let rejection = flow.submit().await.expect_err("blank note must be rejected");
	let expected =
		OverrideRejection::Validation("A justification note is required for the audit trail.".to_string());

	assert_eq!(rejection, expected);
	assert_eq!(flow.phase(), Some(&OverridePhase::Rejected(expected)));
	assert!(flow.is_open());
	assert_eq!(api.overrides.call_count(), 0);
	assert_eq!(spy.count(), 0);
}

#[tokio::test]
async fn duplicate_cannot_be_set_manually() {
	let api = FakeReconApi::shared();
	let spy = Arc::new(SpyRefresh::default());
	let mut flow = workflow(&api, &spy);

	flow.open("r1", ReconStatus::Unmatched);
	flow.select_status(ReconStatus::Duplicate);
	flow.set_note("same as r0");

	assert!(matches!(flow.submit().await, Err(OverrideRejection::Validation(_))));
	assert_eq!(api.overrides.call_count(), 0);
}

#[tokio::test]
async fn server_failure_keeps_the_modal_and_input() {
	let api = FakeReconApi::shared();
	let spy = Arc::new(SpyRefresh::default());
	let mut flow = workflow(&api, &spy);

	api.overrides.push_reply(Err(server_error("boom")));
	flow.open("r1", ReconStatus::Unmatched);
	flow.select_status(ReconStatus::Matched);
	flow.set_note("bank statement");

	let rejection = flow.submit().await.expect_err("server failure must surface");

	assert_eq!(
		rejection,
		OverrideRejection::Server("Failed to update status. Please try again.".to_string())
	);

	let draft = flow.draft().expect("modal stays open");

	assert_eq!(draft.note, "bank statement");
	assert_eq!(draft.new_status, ReconStatus::Matched);
	assert_eq!(spy.count(), 0);

	flow.submit().await.expect("retry succeeds");

	assert!(!flow.is_open());
	assert_eq!(api.overrides.call_count(), 2);
	assert_eq!(spy.count(), 1);
}

#[tokio::test]
async fn success_closes_and_refreshes_exactly_once() {
	let api = FakeReconApi::shared();
	let spy = Arc::new(SpyRefresh::default());
	let mut flow = workflow(&api, &spy);

	flow.open("r1", ReconStatus::PartialMatch);
	flow.select_status(ReconStatus::Matched);
	flow.set_note("rounding difference accepted");
	flow.submit().await.expect("override succeeds");

	assert!(!flow.is_open());
	assert_eq!(flow.phase(), None);
	assert_eq!(
		api.overrides.calls(),
		vec![OverrideRequest {
			record_id: "r1".to_string(),
			new_status: ReconStatus::Matched,
			note: "rounding difference accepted".to_string(),
		}]
	);
	assert_eq!(spy.count(), 1);
}

#[tokio::test]
async fn submit_without_an_open_modal_is_rejected() {
	let api = FakeReconApi::shared();
	let spy = Arc::new(SpyRefresh::default());
	let mut flow = workflow(&api, &spy);

	assert_eq!(flow.submit().await, Err(OverrideRejection::NotOpen));
	assert_eq!(spy.count(), 0);
}

#[tokio::test]
async fn reopening_starts_from_a_clean_draft() {
	let api = FakeReconApi::shared();
	let spy = Arc::new(SpyRefresh::default());
	let mut flow = workflow(&api, &spy);

	flow.open("r1", ReconStatus::Unmatched);
	flow.set_note("draft");
	flow.close();
	flow.open("r2", ReconStatus::PartialMatch);

	let draft = flow.draft().expect("open");

	assert_eq!(draft.record_id, "r2");
	assert_eq!(draft.new_status, ReconStatus::PartialMatch);
	assert!(draft.note.is_empty());
	assert_eq!(draft.phase, OverridePhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn applied_override_reloads_the_results_table() {
	let api = FakeReconApi::shared();

	api.results.respond_with(|query| {
		Ok(results_page(vec![result("r1", ReconStatus::Matched)], 1, 1, query.page))
	});

	let controller = ResultQueryController::spawn(
		api.clone(),
		QuerySettings { page_limit: 10, debounce: Duration::from_millis(300) },
	);

	time::sleep(Duration::from_millis(350)).await;
	settle().await;

	assert_eq!(api.results.call_count(), 1);

	let mut flow = StatusOverrideWorkflow::new(api.clone(), Arc::new(controller.refresher()));

	flow.open("r1", ReconStatus::Unmatched);
	flow.select_status(ReconStatus::Matched);
	flow.set_note("matched by hand");
	flow.submit().await.expect("override succeeds");

	assert_eq!(api.results.call_count(), 2);
	assert_eq!(controller.snapshot().data[0].status, ReconStatus::Matched);

	time::sleep(Duration::from_millis(350)).await;
	settle().await;

	assert_eq!(api.results.call_count(), 2);
}
