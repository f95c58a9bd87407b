//! Client-side application state.
//!
//! Everything here is a transient snapshot of server data plus what the user has typed. The
//! [`Controller`](crate::Controller) is the only writer.

use crate::{
    Achievement, AchievementStats, Course, DashboardStats, Difficulty, Flashcard, Note, NoteId,
    NoteSummary, PartnerCandidate, Partnership, Prediction, SearchHit, StudyDay, Theme, User,
};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Page {
    #[default]
    Dashboard,
    Notes,
    Courses,
    Flashcards,
    Assistant,
    ExamPredictor,
    Partners,
    Achievements,
}

impl Page {
    pub const ALL: [Page; 8] = [
        Page::Dashboard,
        Page::Notes,
        Page::Courses,
        Page::Flashcards,
        Page::Assistant,
        Page::ExamPredictor,
        Page::Partners,
        Page::Achievements,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Page::Dashboard => "dashboard",
            Page::Notes => "notes",
            Page::Courses => "courses",
            Page::Flashcards => "flashcards",
            Page::Assistant => "ai-assistant",
            Page::ExamPredictor => "exam-predictor",
            Page::Partners => "partners",
            Page::Achievements => "achievements",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Notes => "Notes",
            Page::Courses => "Courses",
            Page::Flashcards => "Flashcards",
            Page::Assistant => "AI Assistant",
            Page::ExamPredictor => "Exam Predictor",
            Page::Partners => "Study Partners",
            Page::Achievements => "Achievements",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Page {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        Page::ALL
            .into_iter()
            .find(|p| p.slug() == s || p.title().eq_ignore_ascii_case(&s))
            .ok_or_else(|| format!("unknown page: {s}"))
    }
}

/// Top-level view: either the auth screen or the app shell on some page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewState {
    Unauthenticated,
    Authenticated(Page),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthTab {
    #[default]
    Login,
    Register,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
    Info,
}

/// Inline, non-blocking message shown above the current view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub text: String,
}

impl Banner {
    pub fn success(text: impl Into<String>) -> Self {
        Self { kind: BannerKind::Success, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { kind: BannerKind::Error, text: text.into() }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self { kind: BannerKind::Info, text: text.into() }
    }

    pub fn is_error(&self) -> bool {
        self.kind == BannerKind::Error
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Modal {
    CreateNote,
    EditNote(NoteId),
    ViewNote(NoteId),
    NoteSummary,
    CreateCourse,
    CreateFlashcard,
    StudyLog,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// `course_code` holds the course code, never its id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NoteForm {
    pub course_code: String,
    pub title: String,
    pub content: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CourseForm {
    pub name: String,
    pub code: String,
    pub description: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlashcardForm {
    pub note_id: Option<NoteId>,
    pub front: String,
    pub back: String,
    pub difficulty: Difficulty,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StudyLogForm {
    pub minutes: String,
    /// Comma separated.
    pub topics: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Forms {
    pub login: Credentials,
    pub register: Credentials,
    pub note: NoteForm,
    pub course: CourseForm,
    pub flashcard: FlashcardForm,
    pub study_log: StudyLogForm,
    pub chat_input: String,
    pub search_query: String,
    /// Course code the notes list is filtered by; empty means all courses.
    pub notes_filter: String,
    /// Course code selected on the exam predictor page.
    pub exam_course: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PartnerView {
    Existing(Vec<Partnership>),
    Candidates(Vec<PartnerCandidate>),
}

impl Default for PartnerView {
    fn default() -> Self {
        PartnerView::Existing(Vec::new())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dashboard {
    pub stats: DashboardStats,
    /// Oldest day first.
    pub series: Vec<StudyDay>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatRole {
    You,
    Ai,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatEntry {
    pub role: ChatRole,
    pub text: String,
}

/// An interactive pass over the server's due queue. Never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct ReviewSession {
    pub queue: Vec<Flashcard>,
    pub index: usize,
    pub revealed: bool,
}

impl ReviewSession {
    pub fn new(queue: Vec<Flashcard>) -> Self {
        Self { queue, index: 0, revealed: false }
    }

    pub fn current(&self) -> Option<&Flashcard> {
        self.queue.get(self.index)
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.queue.len()
    }

    /// 1-based position and total, for "[2/5]" style headers.
    pub fn progress(&self) -> (usize, usize) {
        ((self.index + 1).min(self.queue.len()), self.queue.len())
    }
}

#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub user: Option<User>,
    pub page: Page,
    pub auth_tab: AuthTab,
    pub banner: Option<Banner>,
    pub modal: Option<Modal>,
    pub forms: Forms,

    pub courses: Vec<Course>,
    pub notes: Vec<Note>,
    pub flashcards: Vec<Flashcard>,

    pub dashboard: Option<Dashboard>,
    pub partners: PartnerView,
    pub achievements: Vec<Achievement>,
    pub achievement_stats: Option<AchievementStats>,
    pub predictions: Vec<Prediction>,
    pub search_hits: Vec<SearchHit>,
    pub summary: Option<NoteSummary>,
    pub chat: Vec<ChatEntry>,
    pub review: Option<ReviewSession>,

    pub theme: Theme,
    generation: u64,
}

impl AppState {
    pub fn new(theme: Theme) -> Self {
        Self { theme, ..Self::default() }
    }

    pub fn view(&self) -> ViewState {
        match self.user {
            Some(_) => ViewState::Authenticated(self.page),
            None => ViewState::Unauthenticated,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Invalidate every in-flight load and return the new token.
    pub fn advance(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub fn is_current(&self, token: u64) -> bool {
        self.generation == token
    }

    /// Drop everything tied to the signed-in user. Theme survives.
    pub fn reset(&mut self) {
        let theme = self.theme;
        let generation = self.generation + 1;
        *self = AppState { theme, generation, ..AppState::default() };
    }

    pub fn note(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn course_by_code(&self, code: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_slugs_parse_back() {
        for p in Page::ALL {
            assert_eq!(p.slug().parse::<Page>().unwrap(), p);
        }
        assert_eq!("AI Assistant".parse::<Page>().unwrap(), Page::Assistant);
        assert!("settings".parse::<Page>().is_err());
    }

    #[test]
    fn reset_keeps_theme_and_invalidates_loads() {
        let mut s = AppState::new(Theme::Dark);
        let token = s.advance();
        s.forms.login.email = "a@b.com".into();
        s.banner = Some(Banner::info("hi"));
        s.reset();
        assert_eq!(s.theme, Theme::Dark);
        assert!(!s.is_current(token));
        assert_eq!(s.forms, Forms::default());
        assert_eq!(s.banner, None);
        assert_eq!(s.view(), ViewState::Unauthenticated);
    }

    #[test]
    fn review_progress_is_one_based() {
        let r = ReviewSession::new(Vec::new());
        assert!(r.is_finished());
        assert_eq!(r.progress(), (0, 0));
    }
}
