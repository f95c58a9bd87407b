mod common;

use common::*;
use serde_json::{json, Value};
use std::time::Duration;
use studysync_core::*;

fn queue() -> Vec<Flashcard> {
    vec![
        card(1, "Q1", Difficulty::Easy),
        card(2, "Q2", Difficulty::Medium),
        card(3, "Q3", Difficulty::Hard),
    ]
}

#[tokio::test]
async fn each_answer_submits_exactly_once() {
    let api = FakeApi::new();
    *api.queue.lock() = queue();
    let c = signed_in(&api).await;

    c.start_review().await;
    for correct in [true, false, true] {
        c.reveal_answer();
        c.answer(correct).await;
    }
    c.flush_reviews().await;

    let mut sent = api.calls_to("review_flashcard");
    sent.sort_by_key(|v| v["id"].as_i64());
    assert_eq!(
        sent,
        vec![
            json!({ "id": 1, "correct": true, "difficulty": 0 }),
            json!({ "id": 2, "correct": false, "difficulty": 1 }),
            json!({ "id": 3, "correct": true, "difficulty": 2 }),
        ]
    );
    let s = c.snapshot();
    assert!(s.review.is_none());
    assert_eq!(s.banner, Some(Banner::success("Review session complete!")));
}

#[tokio::test]
async fn answer_before_reveal_is_ignored() {
    let api = FakeApi::new();
    *api.queue.lock() = queue();
    let c = signed_in(&api).await;
    c.start_review().await;

    c.answer(true).await;
    c.flush_reviews().await;

    assert_eq!(api.count("review_flashcard"), 0);
    assert_eq!(c.with_state(|s| s.review.as_ref().map(|r| r.index)), Some(0));
}

#[tokio::test]
async fn empty_queue_reports_nothing_due() {
    let api = FakeApi::new();
    let c = signed_in(&api).await;

    c.start_review().await;

    assert!(c.with_state(|s| s.review.is_none()));
    assert_eq!(c.banner(), Some(Banner::info("No flashcards due for review!")));
}

#[tokio::test]
async fn failed_submission_does_not_stall_the_session() {
    let api = FakeApi::new();
    *api.queue.lock() = queue();
    api.fail("review_flashcard", 500, json!({ "error": "db down" }));
    let c = signed_in(&api).await;
    c.start_review().await;

    c.reveal_answer();
    c.answer(true).await;
    c.flush_reviews().await;

    let s = c.snapshot();
    assert_eq!(s.review.as_ref().map(|r| r.index), Some(1));
    assert_eq!(s.review.unwrap().current().map(|f| f.id), Some(2));
    assert_eq!(s.banner, Some(Banner::error("db down")));
}

#[tokio::test]
async fn failed_submission_without_message_uses_fallback() {
    let api = FakeApi::new();
    *api.queue.lock() = vec![card(1, "Q1", Difficulty::Easy)];
    api.fail("review_flashcard", 500, json!({}));
    let c = signed_in(&api).await;
    c.start_review().await;

    c.reveal_answer();
    c.answer(false).await;
    c.flush_reviews().await;

    assert!(c.with_state(|s| s.review.is_none()));
    assert_eq!(c.banner(), Some(Banner::error("Failed to record review")));
}

#[tokio::test]
async fn settled_submissions_are_not_kept_around() {
    let api = FakeApi::new();
    *api.queue.lock() = queue();
    let c = signed_in(&api).await;
    c.start_review().await;

    c.reveal_answer();
    c.answer(true).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(api.count("review_flashcard"), 1);

    c.reveal_answer();
    c.answer(true).await;
    assert_eq!(c.pending_reviews(), 1);

    c.flush_reviews().await;
    assert_eq!(c.pending_reviews(), 0);
    assert_eq!(api.count("review_flashcard"), 2);
}

#[tokio::test]
async fn navigating_away_abandons_the_session() {
    let api = FakeApi::new();
    *api.queue.lock() = queue();
    let c = signed_in(&api).await;
    c.start_review().await;
    c.reveal_answer();
    c.answer(true).await;

    c.navigate(Page::Notes).await;
    c.flush_reviews().await;

    assert!(c.with_state(|s| s.review.is_none()));
    let ids: Vec<Value> = api.calls_to("review_flashcard").iter().map(|v| v["id"].clone()).collect();
    assert_eq!(ids, vec![json!(1)]);
}
