#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use studysync_core::*;

#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub op: &'static str,
    pub args: Value,
}

#[derive(Clone)]
enum Failure {
    Status(u16, Value),
    Transport,
}

/// Scripted `StudyApi`: records every call and answers from canned data.
#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<&'static str, Failure>>,
    delays: Mutex<HashMap<&'static str, Duration>>,

    pub session: Mutex<Option<User>>,
    pub login_user: Mutex<Option<User>>,
    pub courses: Mutex<Vec<Course>>,
    pub notes: Mutex<Vec<Note>>,
    pub flashcards: Mutex<Vec<Flashcard>>,
    pub queue: Mutex<Vec<Flashcard>>,
    pub stats: Mutex<DashboardStats>,
    pub days: Mutex<Vec<StudyDay>>,
    pub partners: Mutex<Vec<Partnership>>,
    pub candidates: Mutex<Vec<PartnerCandidate>>,
    pub achievements: Mutex<Vec<Achievement>>,
    pub predictions: Mutex<Vec<Prediction>>,
    pub answer: Mutex<String>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        let api = Self::default();
        *api.login_user.lock() = Some(user(5, "a@b.com"));
        Arc::new(api)
    }

    pub fn fail(&self, op: &'static str, status: u16, body: Value) {
        self.failures.lock().insert(op, Failure::Status(status, body));
    }

    pub fn fail_transport(&self, op: &'static str) {
        self.failures.lock().insert(op, Failure::Transport);
    }

    pub fn delay(&self, op: &'static str, d: Duration) {
        self.delays.lock().insert(op, d);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn ops(&self) -> Vec<&'static str> {
        self.calls.lock().iter().map(|c| c.op).collect()
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.op == op).count()
    }

    pub fn calls_to(&self, op: &str) -> Vec<Value> {
        self.calls.lock().iter().filter(|c| c.op == op).map(|c| c.args.clone()).collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    async fn hit(&self, op: &'static str, args: Value) -> Result<(), ApiError> {
        self.calls.lock().push(Call { op, args });
        let delay = self.delays.lock().get(op).copied();
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }
        let failure = self.failures.lock().get(op).cloned();
        match failure {
            None => Ok(()),
            Some(Failure::Status(status, body)) => Err(ApiError::status(status, body)),
            Some(Failure::Transport) => Err(ApiError::Transport("connection refused".into())),
        }
    }
}

fn ok(msg: &str) -> Message {
    Message { message: Some(msg.to_string()) }
}

#[async_trait]
impl StudyApi for FakeApi {
    async fn register(&self, email: &str, password: &str) -> Result<Message, ApiError> {
        self.hit("register", json!({ "email": email, "password": password })).await?;
        Ok(ok("User registered successfully"))
    }

    async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        self.hit("login", json!({ "email": email, "password": password })).await?;
        let user = self.login_user.lock().clone().unwrap_or_else(|| user(1, email));
        *self.session.lock() = Some(user.clone());
        Ok(user)
    }

    async fn logout(&self) -> Result<Message, ApiError> {
        self.hit("logout", json!({})).await?;
        *self.session.lock() = None;
        Ok(ok("Logout successful"))
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.hit("current_user", json!({})).await?;
        let session = self.session.lock().clone();
        session.ok_or_else(|| ApiError::status(401, json!({ "error": "Authentication required" })))
    }

    async fn list_courses(&self) -> Result<Vec<Course>, ApiError> {
        self.hit("list_courses", json!({})).await?;
        Ok(self.courses.lock().clone())
    }

    async fn create_course(&self, name: &str, code: &str, description: &str) -> Result<Message, ApiError> {
        self.hit("create_course", json!({ "name": name, "code": code, "description": description }))
            .await?;
        Ok(ok("Course created successfully"))
    }

    async fn get_course(&self, id: CourseId) -> Result<Course, ApiError> {
        self.hit("get_course", json!({ "id": id })).await?;
        let found = self.courses.lock().iter().find(|c| c.id == id).cloned();
        found.ok_or_else(|| ApiError::status(404, json!({ "error": "Course not found" })))
    }

    async fn list_notes(&self, course_id: Option<CourseId>) -> Result<Vec<Note>, ApiError> {
        self.hit("list_notes", json!({ "course_id": course_id })).await?;
        let notes = self.notes.lock().clone();
        Ok(match course_id {
            Some(id) => notes.into_iter().filter(|n| n.course_id == Some(id)).collect(),
            None => notes,
        })
    }

    async fn create_note(&self, course_id: CourseId, title: &str, content: &str) -> Result<Message, ApiError> {
        self.hit("create_note", json!({ "course_id": course_id, "title": title, "content": content }))
            .await?;
        Ok(ok("Note created successfully"))
    }

    async fn update_note(&self, id: NoteId, title: &str, content: &str) -> Result<Message, ApiError> {
        self.hit("update_note", json!({ "id": id, "title": title, "content": content })).await?;
        Ok(ok("Note updated successfully"))
    }

    async fn delete_note(&self, id: NoteId) -> Result<Message, ApiError> {
        self.hit("delete_note", json!({ "id": id })).await?;
        self.notes.lock().retain(|n| n.id != id);
        Ok(ok("Note deleted successfully"))
    }

    async fn list_flashcards(&self, note_id: Option<NoteId>, due_only: bool) -> Result<Vec<Flashcard>, ApiError> {
        self.hit("list_flashcards", json!({ "note_id": note_id, "due_only": due_only })).await?;
        Ok(self.flashcards.lock().clone())
    }

    async fn create_flashcard(
        &self,
        note_id: NoteId,
        front: &str,
        back: &str,
        difficulty: Difficulty,
    ) -> Result<Message, ApiError> {
        self.hit(
            "create_flashcard",
            json!({ "note_id": note_id, "front": front, "back": back, "difficulty": difficulty }),
        )
        .await?;
        Ok(ok("Flashcard created successfully"))
    }

    async fn review_flashcard(
        &self,
        id: FlashcardId,
        correct: bool,
        difficulty: Difficulty,
    ) -> Result<Message, ApiError> {
        self.hit("review_flashcard", json!({ "id": id, "correct": correct, "difficulty": difficulty }))
            .await?;
        Ok(ok("Review recorded"))
    }

    async fn review_queue(&self) -> Result<Vec<Flashcard>, ApiError> {
        self.hit("review_queue", json!({})).await?;
        Ok(self.queue.lock().clone())
    }

    async fn analytics(&self, days: u32) -> Result<Vec<StudyDay>, ApiError> {
        self.hit("analytics", json!({ "days": days })).await?;
        Ok(self.days.lock().clone())
    }

    async fn stats(&self) -> Result<DashboardStats, ApiError> {
        self.hit("stats", json!({})).await?;
        Ok(self.stats.lock().clone())
    }

    async fn record_study(&self, study_time: u32, topics: &[String]) -> Result<Message, ApiError> {
        self.hit("record_study", json!({ "study_time": study_time, "topics_covered": topics }))
            .await?;
        Ok(ok("Analytics created"))
    }

    async fn search_notes(&self, query: &str) -> Result<Vec<SearchHit>, ApiError> {
        self.hit("search_notes", json!({ "query": query })).await?;
        let q = query.to_lowercase();
        Ok(self
            .notes
            .lock()
            .iter()
            .filter(|n| n.title.to_lowercase().contains(&q))
            .map(|n| SearchHit { note_id: n.id, title: n.title.clone(), content: n.content.clone(), course_name: None })
            .collect())
    }

    async fn ask(&self, question: &str) -> Result<Answer, ApiError> {
        self.hit("ask", json!({ "question": question })).await?;
        Ok(Answer { answer: self.answer.lock().clone() })
    }

    async fn summarize_note(&self, note_id: NoteId) -> Result<NoteSummary, ApiError> {
        self.hit("summarize_note", json!({ "note_id": note_id })).await?;
        Ok(NoteSummary { title: "Summary".into(), text: "First sentence".into(), ..NoteSummary::default() })
    }

    async fn find_partners(&self) -> Result<Vec<PartnerCandidate>, ApiError> {
        self.hit("find_partners", json!({})).await?;
        Ok(self.candidates.lock().clone())
    }

    async fn request_partnership(&self, partner_id: UserId) -> Result<Message, ApiError> {
        self.hit("request_partnership", json!({ "partner_id": partner_id })).await?;
        Ok(ok("Partnership request sent"))
    }

    async fn list_partners(&self) -> Result<Vec<Partnership>, ApiError> {
        self.hit("list_partners", json!({})).await?;
        Ok(self.partners.lock().clone())
    }

    async fn achievements(&self) -> Result<Vec<Achievement>, ApiError> {
        self.hit("achievements", json!({})).await?;
        Ok(self.achievements.lock().clone())
    }

    async fn achievement_stats(&self) -> Result<AchievementStats, ApiError> {
        self.hit("achievement_stats", json!({})).await?;
        Ok(AchievementStats::default())
    }

    async fn analyze_course(&self, course_id: CourseId) -> Result<Message, ApiError> {
        self.hit("analyze_course", json!({ "course_id": course_id })).await?;
        Ok(ok("Analysis complete"))
    }

    async fn predictions(&self, course_id: CourseId) -> Result<Vec<Prediction>, ApiError> {
        self.hit("predictions", json!({ "course_id": course_id })).await?;
        Ok(self.predictions.lock().clone())
    }
}

pub fn user(id: UserId, email: &str) -> User {
    User { user_id: id, email: email.to_string(), profile_data: None }
}

pub fn course(id: CourseId, code: &str, name: &str) -> Course {
    Course { id, code: code.to_string(), name: name.to_string(), description: Some(String::new()) }
}

pub fn note(id: NoteId, course_id: CourseId, title: &str) -> Note {
    Note { id, course_id: Some(course_id), title: title.to_string(), content: Some(format!("{title} body")) }
}

pub fn card(id: FlashcardId, front: &str, difficulty: Difficulty) -> Flashcard {
    Flashcard {
        id,
        note_id: Some(1),
        front: front.to_string(),
        back: format!("{front} answer"),
        difficulty,
        next_review: None,
        review_count: 0,
    }
}

pub fn controller(api: &Arc<FakeApi>) -> Controller {
    Controller::new(api.clone(), Arc::new(MemoryPrefs::new()))
}

/// A controller that has already restored a session and loaded the dashboard. Call log is empty.
pub async fn signed_in(api: &Arc<FakeApi>) -> Controller {
    *api.session.lock() = Some(user(5, "a@b.com"));
    let c = controller(api);
    c.start().await;
    assert_eq!(c.view(), ViewState::Authenticated(Page::Dashboard));
    api.clear_calls();
    c
}
