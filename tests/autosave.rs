mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio::time::{sleep, Instant};

use common::FakeApi;
use wasfeines::draft::{AutosaveCoordinator, FieldEdit};
use wasfeines::models::{DraftRecipe, UserRating};

const QUIET: Duration = Duration::from_millis(800);

fn coordinator(api: &std::sync::Arc<FakeApi>) -> AutosaveCoordinator {
    AutosaveCoordinator::new(api.clone(), QUIET)
}

#[tokio::test(start_paused = true)]
async fn rapid_edits_collapse_into_one_save() {
    let api = FakeApi::new();
    let autosave = coordinator(&api);

    for name in ["S", "So", "Sou", "Soup"] {
        autosave.update(FieldEdit::Name(name.to_string())).await;
        sleep(Duration::from_millis(100)).await;
    }
    autosave.settle().await;

    let saves = api.saves();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].update.name, "Soup");
}

#[tokio::test(start_paused = true)]
async fn save_fires_after_quiet_window_with_other_fields() {
    let api = FakeApi::new();
    let autosave = coordinator(&api);
    autosave
        .seed(&DraftRecipe {
            name: String::new(),
            user_content: Some("Grandma's".into()),
            user_tags: vec!["soup".into()],
            ..Default::default()
        })
        .await;

    autosave.update(FieldEdit::Name("Borscht".into())).await;
    sleep(Duration::from_millis(700)).await;
    assert!(api.saves().is_empty());
    assert!(autosave.status().await.scheduled);

    sleep(Duration::from_millis(200)).await;
    autosave.settle().await;

    let saves = api.saves();
    assert_eq!(saves.len(), 1);
    let update = &saves[0].update;
    assert_eq!(update.name, "Borscht");
    assert_eq!(update.user_content.as_deref(), Some("Grandma's"));
    assert_eq!(update.user_tags, vec!["soup"]);
}

#[tokio::test(start_paused = true)]
async fn typing_again_sends_only_the_final_value_800ms_after_last_key() {
    let api = FakeApi::new();
    let autosave = coordinator(&api);

    autosave.update(FieldEdit::Name("Pasta".into())).await;
    sleep(Duration::from_millis(900)).await;
    autosave.settle().await;
    assert_eq!(api.saves().len(), 1);

    autosave.update(FieldEdit::Name("Pasta a".into())).await;
    sleep(Duration::from_millis(200)).await;
    autosave.update(FieldEdit::Name("Pasta al".into())).await;
    let last_key = Instant::now();
    autosave.settle().await;

    let saves = api.saves();
    assert_eq!(saves.len(), 2);
    assert_eq!(saves[1].update.name, "Pasta al");
    let waited = saves[1].at.duration_since(last_key);
    assert!(waited >= QUIET && waited < QUIET + Duration::from_millis(5));
}

#[tokio::test(start_paused = true)]
async fn every_save_carries_the_full_buffer() {
    let api = FakeApi::new();
    let autosave = coordinator(&api);

    autosave.update(FieldEdit::Name("Curry".into())).await;
    autosave.update(FieldEdit::AddTag("spicy".into())).await;
    autosave
        .update(FieldEdit::Rating(Some(UserRating::new(4.5, Some("hot".into())).unwrap())))
        .await;
    autosave.update(FieldEdit::Content(Some("Rice on the side".into()))).await;
    autosave.settle().await;

    let saves = api.saves();
    assert_eq!(saves.len(), 1);
    let update = &saves[0].update;
    assert_eq!(update.name, "Curry");
    assert_eq!(update.user_tags, vec!["spicy"]);
    assert_eq!(update.user_rating.as_ref().map(|r| r.rating), Some(4.5));
    assert_eq!(update.user_content.as_deref(), Some("Rice on the side"));
}

#[tokio::test(start_paused = true)]
async fn blank_tag_does_not_schedule() {
    let api = FakeApi::new();
    let autosave = coordinator(&api);

    autosave.update(FieldEdit::AddTag("   ".into())).await;
    assert!(!autosave.status().await.scheduled);
    sleep(Duration::from_secs(2)).await;
    autosave.settle().await;
    assert!(api.saves().is_empty());
}

#[tokio::test(start_paused = true)]
async fn failed_save_keeps_edit_and_next_change_retries() {
    let api = FakeApi::new();
    let autosave = coordinator(&api);
    api.fail_saves.store(true, Ordering::SeqCst);

    autosave.update(FieldEdit::Name("Tarte".into())).await;
    autosave.settle().await;

    let status = autosave.status().await;
    assert!(status.last_error.is_some());
    assert!(status.dirty);
    assert_eq!(autosave.buffer().await.name, "Tarte");

    // no automatic retry
    sleep(Duration::from_secs(5)).await;
    assert_eq!(api.saves().len(), 1);

    api.fail_saves.store(false, Ordering::SeqCst);
    autosave.blur().await;
    autosave.settle().await;

    let saves = api.saves();
    assert_eq!(saves.len(), 2);
    assert_eq!(saves[1].update.name, "Tarte");
    let status = autosave.status().await;
    assert!(status.last_error.is_none());
    assert!(!status.dirty);
}

#[tokio::test(start_paused = true)]
async fn stale_response_never_overwrites_newer_state() {
    let api = FakeApi::new();
    let autosave = coordinator(&api);
    // the first save is slow, the second comes back first
    api.save_delays
        .lock()
        .unwrap()
        .extend([Duration::from_secs(3), Duration::from_millis(10)]);

    autosave.update(FieldEdit::Name("Old".into())).await;
    sleep(Duration::from_millis(900)).await;
    autosave.update(FieldEdit::Name("New".into())).await;
    autosave.settle().await;

    assert_eq!(api.saves().len(), 2);
    let status = autosave.status().await;
    assert_eq!(
        status.last_saved.map(|d| d.name).as_deref(),
        Some("New")
    );
    assert_eq!(autosave.buffer().await.name, "New");
    assert!(!status.dirty);
}

#[tokio::test(start_paused = true)]
async fn seed_does_not_clobber_unsaved_edits() {
    let api = FakeApi::new();
    let autosave = coordinator(&api);

    autosave.update(FieldEdit::Name("Mine".into())).await;
    let seeded = autosave
        .seed(&DraftRecipe {
            name: "Server".into(),
            ..Default::default()
        })
        .await;
    assert!(!seeded);
    assert_eq!(autosave.buffer().await.name, "Mine");

    autosave.settle().await;
    let seeded = autosave
        .seed(&DraftRecipe {
            name: "Server".into(),
            ..Default::default()
        })
        .await;
    assert!(seeded);
    assert_eq!(autosave.buffer().await.name, "Server");
}

#[tokio::test(start_paused = true)]
async fn flush_sends_immediately() {
    let api = FakeApi::new();
    let autosave = coordinator(&api);

    let start = Instant::now();
    autosave.update(FieldEdit::Name("Now".into())).await;
    autosave.flush().await;

    let saves = api.saves();
    assert_eq!(saves.len(), 1);
    assert!(saves[0].at.duration_since(start) < QUIET);

    // nothing left to send
    autosave.flush().await;
    assert_eq!(api.saves().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn teardown_cancels_timer_and_ignores_late_saves() {
    let api = FakeApi::new();
    let autosave = coordinator(&api);

    autosave.update(FieldEdit::Name("Gone".into())).await;
    autosave.teardown().await;
    sleep(Duration::from_secs(2)).await;
    assert!(api.saves().is_empty());

    api.save_delays
        .lock()
        .unwrap()
        .push_back(Duration::from_secs(1));
    autosave.update(FieldEdit::Name("Late".into())).await;
    sleep(Duration::from_millis(900)).await;
    autosave.teardown().await;
    autosave.settle().await;

    assert_eq!(api.saves().len(), 1);
    assert!(autosave.status().await.last_saved.is_none());
}

#[tokio::test(start_paused = true)]
async fn flush_does_not_resend_a_save_already_on_the_wire() {
    let api = FakeApi::new();
    let autosave = coordinator(&api);
    api.save_delays
        .lock()
        .unwrap()
        .push_back(Duration::from_secs(2));

    autosave.update(FieldEdit::Name("Once".into())).await;
    sleep(Duration::from_millis(900)).await;
    assert_eq!(autosave.status().await.in_flight, 1);

    autosave.flush().await;

    let saves = api.saves();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].update.name, "Once");
    assert!(!autosave.status().await.dirty);
}

#[tokio::test(start_paused = true)]
async fn flush_resends_after_a_failed_save() {
    let api = FakeApi::new();
    let autosave = coordinator(&api);
    api.fail_saves.store(true, Ordering::SeqCst);

    autosave.update(FieldEdit::Name("Again".into())).await;
    autosave.settle().await;
    assert_eq!(api.saves().len(), 1);

    api.fail_saves.store(false, Ordering::SeqCst);
    autosave.flush().await;

    let saves = api.saves();
    assert_eq!(saves.len(), 2);
    assert_eq!(saves[1].update.name, "Again");
    assert!(autosave.status().await.last_error.is_none());
}

#[tokio::test(start_paused = true)]
async fn edit_during_settle_still_debounces() {
    let api = FakeApi::new();
    let autosave = coordinator(&api);

    autosave.update(FieldEdit::Name("Ra".into())).await;
    tokio::join!(autosave.settle(), async {
        sleep(Duration::from_millis(500)).await;
        autosave.update(FieldEdit::Name("Ramen".into())).await;
    });

    let saves = api.saves();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].update.name, "Ramen");
}

#[tokio::test(start_paused = true)]
async fn off_scale_rating_is_never_posted() {
    let api = FakeApi::new();
    let autosave = coordinator(&api);

    autosave
        .update(FieldEdit::Rating(Some(UserRating {
            rating: 7.3,
            comment: None,
        })))
        .await;
    autosave.update(FieldEdit::Name("Gulasch".into())).await;
    autosave.settle().await;

    assert!(autosave.buffer().await.user_rating.is_none());
    let saves = api.saves();
    assert_eq!(saves.len(), 1);
    assert!(saves[0].update.user_rating.is_none());
}
