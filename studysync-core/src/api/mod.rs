use crate::{
    Achievement, AchievementStats, Answer, ApiError, Course, CourseId, DashboardStats, Difficulty,
    Flashcard, FlashcardId, Message, Note, NoteId, NoteSummary, PartnerCandidate, Partnership,
    Prediction, SearchHit, StudyDay, User, UserId,
};
use async_trait::async_trait;

pub mod http;

pub use http::HttpApi;

/// One method per backend operation. Every call is exactly one request; nothing is cached.
#[async_trait]
pub trait StudyApi: Send + Sync {
    // Auth
    async fn register(&self, email: &str, password: &str) -> Result<Message, ApiError>;
    async fn login(&self, email: &str, password: &str) -> Result<User, ApiError>;
    async fn logout(&self) -> Result<Message, ApiError>;
    async fn current_user(&self) -> Result<User, ApiError>;

    // Courses
    async fn list_courses(&self) -> Result<Vec<Course>, ApiError>;
    async fn create_course(&self, name: &str, code: &str, description: &str) -> Result<Message, ApiError>;
    async fn get_course(&self, id: CourseId) -> Result<Course, ApiError>;

    // Notes
    async fn list_notes(&self, course_id: Option<CourseId>) -> Result<Vec<Note>, ApiError>;
    async fn create_note(&self, course_id: CourseId, title: &str, content: &str) -> Result<Message, ApiError>;
    async fn update_note(&self, id: NoteId, title: &str, content: &str) -> Result<Message, ApiError>;
    async fn delete_note(&self, id: NoteId) -> Result<Message, ApiError>;

    // Flashcards
    async fn list_flashcards(&self, note_id: Option<NoteId>, due_only: bool) -> Result<Vec<Flashcard>, ApiError>;
    async fn create_flashcard(
        &self,
        note_id: NoteId,
        front: &str,
        back: &str,
        difficulty: Difficulty,
    ) -> Result<Message, ApiError>;
    async fn review_flashcard(
        &self,
        id: FlashcardId,
        correct: bool,
        difficulty: Difficulty,
    ) -> Result<Message, ApiError>;
    async fn review_queue(&self) -> Result<Vec<Flashcard>, ApiError>;

    // Analytics
    async fn analytics(&self, days: u32) -> Result<Vec<StudyDay>, ApiError>;
    async fn stats(&self) -> Result<DashboardStats, ApiError>;
    async fn record_study(&self, study_time: u32, topics: &[String]) -> Result<Message, ApiError>;

    // AI assistant
    async fn search_notes(&self, query: &str) -> Result<Vec<SearchHit>, ApiError>;
    async fn ask(&self, question: &str) -> Result<Answer, ApiError>;
    async fn summarize_note(&self, note_id: NoteId) -> Result<NoteSummary, ApiError>;

    // Partners
    async fn find_partners(&self) -> Result<Vec<PartnerCandidate>, ApiError>;
    async fn request_partnership(&self, partner_id: UserId) -> Result<Message, ApiError>;
    async fn list_partners(&self) -> Result<Vec<Partnership>, ApiError>;

    // Achievements
    async fn achievements(&self) -> Result<Vec<Achievement>, ApiError>;
    async fn achievement_stats(&self) -> Result<AchievementStats, ApiError>;

    // Exam predictor
    async fn analyze_course(&self, course_id: CourseId) -> Result<Message, ApiError>;
    async fn predictions(&self, course_id: CourseId) -> Result<Vec<Prediction>, ApiError>;
}
