use crate::api::StudyApi;
use crate::{
    Achievement, AchievementStats, Answer, ApiError, Course, CourseId, DashboardStats, Difficulty,
    Flashcard, FlashcardId, Message, Note, NoteId, NoteSummary, PartnerCandidate, Partnership,
    Prediction, SearchHit, StudyDay, User, UserId,
};
use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// reqwest-backed client for the StudySync REST API.
///
/// The cookie jar is shared by every request, so a successful login authenticates all later
/// calls made through the same instance.
pub struct HttpApi {
    client: Client,
    origin: Url,
    base: String,
    jar: Arc<Jar>,
}

impl HttpApi {
    pub fn new(origin: &str) -> Result<Self, ApiError> {
        let origin = Url::parse(origin.trim()).map_err(|e| ApiError::BaseUrl(format!("{origin}: {e}")))?;
        let base = origin.as_str().trim_end_matches('/').to_string();
        let jar = Arc::new(Jar::default());
        let client = Client::builder().cookie_provider(jar.clone()).build()?;
        Ok(Self { client, origin, base, jar })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// Cookie header currently held for the API origin, if any.
    pub fn session_cookie(&self) -> Option<String> {
        self.jar
            .cookies(&self.origin)
            .and_then(|h| h.to_str().ok().map(str::to_string))
            .filter(|s| !s.is_empty())
    }

    /// Re-seed the jar from a header produced by [`HttpApi::session_cookie`].
    pub fn restore_session(&self, cookie_header: &str) {
        for pair in cookie_header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            self.jar.add_cookie_str(pair, &self.origin);
        }
    }

    /// Issue one request and return the parsed body.
    ///
    /// The body is parsed as JSON whatever the status, falling back to `{}`. A non-2xx status
    /// fails with that parsed body; a missing response fails with [`ApiError::Transport`].
    pub async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base, path);
        debug!(%method, %url, "api request");

        let mut req = self
            .client
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            req = req.json(&body);
        }

        let res = req.send().await.map_err(|e| {
            warn!(%method, %url, error = %e, "request failed without a response");
            ApiError::from(e)
        })?;
        let status = res.status();
        let bytes = res.bytes().await?;
        let data = serde_json::from_slice::<Value>(&bytes).unwrap_or_else(|_| Value::Object(Map::new()));

        if !status.is_success() {
            debug!(%method, %url, status = status.as_u16(), "api error response");
            return Err(ApiError::status(status.as_u16(), data));
        }
        Ok(data)
    }

    async fn call<T: DeserializeOwned>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T, ApiError> {
        let data = self.request(method, path, body).await?;
        serde_json::from_value(data).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Fetch and unwrap `{ key: ... }`; an absent or null key yields `T::default()`.
    async fn envelope<T>(&self, method: Method, path: &str, body: Option<Value>, key: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Default,
    {
        let mut data = self.request(method, path, body).await?;
        let inner = data.get_mut(key).map(Value::take).unwrap_or(Value::Null);
        serde_json::from_value::<Option<T>>(inner)
            .map(Option::unwrap_or_default)
            .map_err(|e| ApiError::Decode(format!("{key}: {e}")))
    }
}

fn flashcards_path(note_id: Option<NoteId>, due_only: bool) -> String {
    let mut params = Vec::new();
    if let Some(id) = note_id {
        params.push(format!("note_id={id}"));
    }
    if due_only {
        params.push("due_only=true".to_string());
    }
    if params.is_empty() {
        "/api/flashcards".to_string()
    } else {
        format!("/api/flashcards?{}", params.join("&"))
    }
}

#[async_trait]
impl StudyApi for HttpApi {
    async fn register(&self, email: &str, password: &str) -> Result<Message, ApiError> {
        let body = json!({ "email": email, "password": password });
        self.call(Method::POST, "/api/auth/register", Some(body)).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let body = json!({ "email": email, "password": password });
        self.call(Method::POST, "/api/auth/login", Some(body)).await
    }

    async fn logout(&self) -> Result<Message, ApiError> {
        self.call(Method::POST, "/api/auth/logout", None).await
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.call(Method::GET, "/api/auth/me", None).await
    }

    async fn list_courses(&self) -> Result<Vec<Course>, ApiError> {
        self.envelope(Method::GET, "/api/courses", None, "courses").await
    }

    async fn create_course(&self, name: &str, code: &str, description: &str) -> Result<Message, ApiError> {
        let body = json!({ "name": name, "code": code, "description": description });
        self.call(Method::POST, "/api/courses", Some(body)).await
    }

    async fn get_course(&self, id: CourseId) -> Result<Course, ApiError> {
        self.call(Method::GET, &format!("/api/courses/{id}"), None).await
    }

    async fn list_notes(&self, course_id: Option<CourseId>) -> Result<Vec<Note>, ApiError> {
        let path = match course_id {
            Some(id) => format!("/api/notes?course_id={id}"),
            None => "/api/notes".to_string(),
        };
        self.envelope(Method::GET, &path, None, "notes").await
    }

    async fn create_note(&self, course_id: CourseId, title: &str, content: &str) -> Result<Message, ApiError> {
        let body = json!({ "course_id": course_id, "title": title, "content": content });
        self.call(Method::POST, "/api/notes", Some(body)).await
    }

    async fn update_note(&self, id: NoteId, title: &str, content: &str) -> Result<Message, ApiError> {
        let body = json!({ "title": title, "content": content });
        self.call(Method::PUT, &format!("/api/notes/{id}"), Some(body)).await
    }

    async fn delete_note(&self, id: NoteId) -> Result<Message, ApiError> {
        self.call(Method::DELETE, &format!("/api/notes/{id}"), None).await
    }

    async fn list_flashcards(&self, note_id: Option<NoteId>, due_only: bool) -> Result<Vec<Flashcard>, ApiError> {
        self.envelope(Method::GET, &flashcards_path(note_id, due_only), None, "flashcards")
            .await
    }

    async fn create_flashcard(
        &self,
        note_id: NoteId,
        front: &str,
        back: &str,
        difficulty: Difficulty,
    ) -> Result<Message, ApiError> {
        let body = json!({ "note_id": note_id, "front": front, "back": back, "difficulty": difficulty });
        self.call(Method::POST, "/api/flashcards", Some(body)).await
    }

    async fn review_flashcard(
        &self,
        id: FlashcardId,
        correct: bool,
        difficulty: Difficulty,
    ) -> Result<Message, ApiError> {
        let body = json!({ "correct": correct, "difficulty": difficulty });
        self.call(Method::POST, &format!("/api/flashcards/{id}/review"), Some(body))
            .await
    }

    async fn review_queue(&self) -> Result<Vec<Flashcard>, ApiError> {
        self.envelope(Method::GET, "/api/flashcards/review-queue", None, "review_queue")
            .await
    }

    async fn analytics(&self, days: u32) -> Result<Vec<StudyDay>, ApiError> {
        self.envelope(Method::GET, &format!("/api/analytics?days={days}"), None, "analytics")
            .await
    }

    async fn stats(&self) -> Result<DashboardStats, ApiError> {
        self.envelope(Method::GET, "/api/analytics/stats", None, "stats").await
    }

    async fn record_study(&self, study_time: u32, topics: &[String]) -> Result<Message, ApiError> {
        let body = json!({ "study_time": study_time, "topics_covered": topics });
        self.call(Method::POST, "/api/analytics", Some(body)).await
    }

    async fn search_notes(&self, query: &str) -> Result<Vec<SearchHit>, ApiError> {
        let body = json!({ "query": query });
        self.envelope(Method::POST, "/api/ai/search", Some(body), "results").await
    }

    async fn ask(&self, question: &str) -> Result<Answer, ApiError> {
        let body = json!({ "question": question });
        self.call(Method::POST, "/api/ai/ask", Some(body)).await
    }

    async fn summarize_note(&self, note_id: NoteId) -> Result<NoteSummary, ApiError> {
        let body = json!({ "note_id": note_id });
        self.envelope(Method::POST, "/api/ai/summarize", Some(body), "summary").await
    }

    async fn find_partners(&self) -> Result<Vec<PartnerCandidate>, ApiError> {
        self.envelope(Method::GET, "/api/partners/find", None, "partners").await
    }

    async fn request_partnership(&self, partner_id: UserId) -> Result<Message, ApiError> {
        let body = json!({ "partner_id": partner_id });
        self.call(Method::POST, "/api/partners/request", Some(body)).await
    }

    async fn list_partners(&self) -> Result<Vec<Partnership>, ApiError> {
        self.envelope(Method::GET, "/api/partners", None, "partners").await
    }

    async fn achievements(&self) -> Result<Vec<Achievement>, ApiError> {
        self.envelope(Method::GET, "/api/achievements", None, "achievements").await
    }

    async fn achievement_stats(&self) -> Result<AchievementStats, ApiError> {
        self.envelope(Method::GET, "/api/achievements/stats", None, "stats").await
    }

    async fn analyze_course(&self, course_id: CourseId) -> Result<Message, ApiError> {
        self.call(Method::POST, &format!("/api/exam-predictor/{course_id}/analyze"), None)
            .await
    }

    async fn predictions(&self, course_id: CourseId) -> Result<Vec<Prediction>, ApiError> {
        self.envelope(Method::GET, &format!("/api/exam-predictor/{course_id}"), None, "predictions")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flashcard_query_string() {
        assert_eq!(flashcards_path(None, false), "/api/flashcards");
        assert_eq!(flashcards_path(Some(4), false), "/api/flashcards?note_id=4");
        assert_eq!(flashcards_path(None, true), "/api/flashcards?due_only=true");
        assert_eq!(flashcards_path(Some(4), true), "/api/flashcards?note_id=4&due_only=true");
    }

    #[test]
    fn base_url_is_normalized() {
        let api = HttpApi::new("http://127.0.0.1:5000/").unwrap();
        assert_eq!(api.base_url(), "http://127.0.0.1:5000");
        assert!(HttpApi::new("not a url").is_err());
    }
}
