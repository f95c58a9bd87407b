mod common;

use common::*;
use serde_json::json;
use studysync_core::*;

fn fill_note(c: &Controller, code: &str, title: &str, content: &str) {
    c.update(|s| {
        s.forms.note.course_code = code.into();
        s.forms.note.title = title.into();
        s.forms.note.content = content.into();
    });
}

#[tokio::test]
async fn saving_a_note_posts_resolved_course_id() {
    let api = FakeApi::new();
    *api.courses.lock() = vec![course(1, "CS101", "Intro"), course(2, "BIO200", "Cells")];
    let c = signed_in(&api).await;
    c.navigate(Page::Notes).await;
    c.open_note_modal().await;
    fill_note(&c, "CS101", "T", "C");
    api.clear_calls();

    c.save_note().await;

    assert_eq!(api.calls_to("create_note"), vec![json!({ "course_id": 1, "title": "T", "content": "C" })]);
    assert_eq!(api.count("list_notes"), 1);
    let s = c.snapshot();
    assert!(s.modal.is_none());
    assert!(s.forms.note.title.is_empty());
    assert!(s.forms.note.content.is_empty());
    assert_eq!(s.banner, Some(Banner::success("Note created successfully")));
}

#[tokio::test]
async fn unknown_course_code_stops_before_create() {
    let api = FakeApi::new();
    *api.courses.lock() = vec![course(1, "CS101", "Intro")];
    let c = signed_in(&api).await;
    c.open_note_modal().await;
    fill_note(&c, "XX999", "T", "C");
    api.clear_calls();

    c.save_note().await;

    assert_eq!(api.ops(), vec!["list_courses"]);
    assert_eq!(c.banner(), Some(Banner::error("Selected course not found")));
    assert_eq!(c.with_state(|s| s.modal), Some(Modal::CreateNote));
}

#[tokio::test]
async fn missing_fields_make_no_request() {
    let api = FakeApi::new();
    let c = signed_in(&api).await;

    fill_note(&c, "", "T", "C");
    c.save_note().await;
    assert_eq!(c.banner(), Some(Banner::error("Please select a course")));

    fill_note(&c, "CS101", "  ", "C");
    c.save_note().await;
    assert_eq!(c.banner(), Some(Banner::error("Title and content are required")));

    c.save_course().await;
    assert_eq!(c.banner(), Some(Banner::error("Course name and code are required")));

    c.save_flashcard().await;
    assert_eq!(c.banner(), Some(Banner::error("Please select a note")));

    assert!(api.ops().is_empty());
}

#[tokio::test]
async fn rejected_note_keeps_modal_and_input() {
    let api = FakeApi::new();
    *api.courses.lock() = vec![course(1, "CS101", "Intro")];
    api.fail("create_note", 400, json!({ "error": "Course not found" }));
    let c = signed_in(&api).await;
    c.open_note_modal().await;
    fill_note(&c, "CS101", "T", "C");

    c.save_note().await;

    let s = c.snapshot();
    assert_eq!(s.modal, Some(Modal::CreateNote));
    assert_eq!(s.forms.note.title, "T");
    assert_eq!(s.banner, Some(Banner::error("Course not found")));
    assert_eq!(api.count("list_notes"), 0);
}

#[tokio::test]
async fn editing_a_note_prefills_and_updates() {
    let api = FakeApi::new();
    *api.notes.lock() = vec![note(7, 1, "Mitosis")];
    let c = signed_in(&api).await;
    c.navigate(Page::Notes).await;

    c.edit_note(7);
    assert_eq!(c.with_state(|s| s.forms.note.title.clone()), "Mitosis");
    c.update(|s| s.forms.note.content = "Updated".into());
    api.clear_calls();
    c.update_note().await;

    assert_eq!(
        api.calls_to("update_note"),
        vec![json!({ "id": 7, "title": "Mitosis", "content": "Updated" })]
    );
    assert_eq!(api.count("list_notes"), 1);
    assert!(c.with_state(|s| s.modal).is_none());
}

#[tokio::test]
async fn deleting_a_note_reloads_the_list_once() {
    let api = FakeApi::new();
    *api.notes.lock() = vec![note(1, 1, "A"), note(2, 1, "B")];
    let c = signed_in(&api).await;
    c.navigate(Page::Notes).await;
    c.view_note(2);
    api.clear_calls();

    c.delete_note(2).await;

    assert_eq!(api.ops(), vec!["delete_note", "list_notes"]);
    let s = c.snapshot();
    assert!(s.modal.is_none());
    assert_eq!(s.notes.iter().map(|n| n.id).collect::<Vec<_>>(), vec![1]);
}

#[tokio::test]
async fn notes_filter_sends_course_id() {
    let api = FakeApi::new();
    *api.courses.lock() = vec![course(1, "CS101", "Intro"), course(2, "BIO200", "Cells")];
    *api.notes.lock() = vec![note(1, 1, "A"), note(2, 2, "B")];
    let c = signed_in(&api).await;

    c.filter_notes_by_course("BIO200").await;

    assert_eq!(c.view(), ViewState::Authenticated(Page::Notes));
    assert_eq!(api.calls_to("list_notes"), vec![json!({ "course_id": 2 })]);
    assert_eq!(c.with_state(|s| s.notes.iter().map(|n| n.id).collect::<Vec<_>>()), vec![2]);
}

#[tokio::test]
async fn summary_opens_in_modal() {
    let api = FakeApi::new();
    let c = signed_in(&api).await;
    c.summarize_note(3).await;

    let s = c.snapshot();
    assert_eq!(s.modal, Some(Modal::NoteSummary));
    assert_eq!(s.summary.unwrap().text, "First sentence");
    assert_eq!(api.calls_to("summarize_note"), vec![json!({ "note_id": 3 })]);
}

#[tokio::test]
async fn course_creation_uses_fallback_for_empty_error_body() {
    let api = FakeApi::new();
    api.fail("create_course", 500, json!({}));
    let c = signed_in(&api).await;
    c.open_course_modal();
    c.update(|s| {
        s.forms.course.name = "Intro".into();
        s.forms.course.code = "CS101".into();
    });

    c.save_course().await;

    assert_eq!(c.banner(), Some(Banner::error("Failed to create course")));
    assert_eq!(c.with_state(|s| s.modal), Some(Modal::CreateCourse));
}

#[tokio::test]
async fn course_creation_reloads_courses_once() {
    let api = FakeApi::new();
    let c = signed_in(&api).await;
    c.navigate(Page::Courses).await;
    c.update(|s| {
        s.forms.course.name = "Intro".into();
        s.forms.course.code = "CS101".into();
        s.forms.course.description = "basics".into();
    });
    api.clear_calls();

    c.save_course().await;

    assert_eq!(api.ops(), vec!["create_course", "list_courses"]);
    assert_eq!(
        api.calls_to("create_course")[0],
        json!({ "name": "Intro", "code": "CS101", "description": "basics" })
    );
    assert_eq!(c.with_state(|s| s.forms.course.clone()), CourseForm::default());
}

#[tokio::test]
async fn flashcard_form_defaults_to_first_note() {
    let api = FakeApi::new();
    *api.notes.lock() = vec![note(4, 1, "A"), note(5, 1, "B")];
    let c = signed_in(&api).await;
    c.navigate(Page::Flashcards).await;
    c.open_flashcard_modal().await;
    assert_eq!(c.with_state(|s| s.forms.flashcard.note_id), Some(4));

    c.update(|s| {
        s.forms.flashcard.front = "Q".into();
        s.forms.flashcard.back = "A".into();
        s.forms.flashcard.difficulty = Difficulty::Hard;
    });
    api.clear_calls();
    c.save_flashcard().await;

    assert_eq!(
        api.calls_to("create_flashcard"),
        vec![json!({ "note_id": 4, "front": "Q", "back": "A", "difficulty": 2 })]
    );
    assert_eq!(api.count("list_flashcards"), 1);
}

#[tokio::test]
async fn study_log_splits_topics() {
    let api = FakeApi::new();
    let c = signed_in(&api).await;
    c.open_study_log_modal();
    c.update(|s| {
        s.forms.study_log.minutes = "45".into();
        s.forms.study_log.topics = "cells, , mitosis ".into();
    });

    c.submit_study_log().await;

    assert_eq!(
        api.calls_to("record_study"),
        vec![json!({ "study_time": 45, "topics_covered": ["cells", "mitosis"] })]
    );
    assert!(c.with_state(|s| s.modal).is_none());
}

#[tokio::test]
async fn study_log_rejects_non_numeric_minutes() {
    let api = FakeApi::new();
    let c = signed_in(&api).await;
    c.update(|s| s.forms.study_log.minutes = "an hour".into());

    c.submit_study_log().await;

    assert!(api.ops().is_empty());
    assert!(c.banner().unwrap().is_error());
}
