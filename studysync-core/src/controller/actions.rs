use super::{ActionError, Controller};
use crate::{
    Banner, ChatEntry, ChatRole, CourseForm, CourseId, FlashcardForm, Modal, NoteForm, NoteId, Page,
    PartnerView, StudyLogForm, UserId,
};
use tracing::{info, warn};

impl Controller {
    // ===== Modals =====

    /// Opens the note form after refreshing the course picker.
    pub async fn open_note_modal(&self) {
        match self.api.list_courses().await {
            Ok(courses) => self.update(|s| s.courses = courses),
            Err(err) => self.fail(err.into(), "Failed to load courses"),
        }
        self.update(|s| s.modal = Some(Modal::CreateNote));
    }

    pub fn open_course_modal(&self) {
        self.update(|s| s.modal = Some(Modal::CreateCourse));
    }

    /// Opens the flashcard form after refreshing the note picker.
    pub async fn open_flashcard_modal(&self) {
        match self.api.list_notes(None).await {
            Ok(notes) => self.update(|s| {
                if s.forms.flashcard.note_id.is_none() {
                    s.forms.flashcard.note_id = notes.first().map(|n| n.id);
                }
                s.notes = notes;
            }),
            Err(err) => self.fail(err.into(), "Failed to load notes"),
        }
        self.update(|s| s.modal = Some(Modal::CreateFlashcard));
    }

    pub fn open_study_log_modal(&self) {
        self.update(|s| s.modal = Some(Modal::StudyLog));
    }

    pub fn close_modal(&self) {
        self.update(|s| s.modal = None);
    }

    pub fn view_note(&self, id: NoteId) {
        self.update(|s| {
            if s.note(id).is_some() {
                s.modal = Some(Modal::ViewNote(id));
            } else {
                s.banner = Some(Banner::error("Note not found"));
            }
        });
    }

    /// Prefill the note form from the cached note and open it for editing.
    pub fn edit_note(&self, id: NoteId) {
        self.update(|s| {
            let Some(note) = s.note(id).cloned() else {
                s.banner = Some(Banner::error("Note not found"));
                return;
            };
            s.forms.note.title = note.title;
            s.forms.note.content = note.content.unwrap_or_default();
            s.modal = Some(Modal::EditNote(id));
        });
    }

    // ===== Notes =====

    pub async fn save_note(&self) {
        match self.try_save_note().await {
            Ok(msg) => {
                self.update(|s| {
                    s.modal = None;
                    s.forms.note.title.clear();
                    s.forms.note.content.clear();
                    s.banner = Some(Banner::success(msg));
                });
                self.refresh(Page::Notes).await;
            }
            Err(err) => self.fail(err, "Failed to save note"),
        }
    }

    async fn try_save_note(&self) -> Result<String, ActionError> {
        let form: NoteForm = self.with_state(|s| s.forms.note.clone());
        let code = form.course_code.trim();
        if code.is_empty() {
            return Err(ActionError::Validation("Please select a course"));
        }
        let (title, content) = (form.title.trim(), form.content.trim());
        if title.is_empty() || content.is_empty() {
            return Err(ActionError::Validation("Title and content are required"));
        }
        let course = self.resolve_course(code).await?;
        let msg = self.api.create_note(course.id, title, content).await?;
        info!(course_id = course.id, "note created");
        Ok(msg.or("Note saved"))
    }

    pub async fn update_note(&self) {
        match self.try_update_note().await {
            Ok(msg) => {
                self.update(|s| {
                    s.modal = None;
                    s.forms.note = NoteForm { course_code: s.forms.note.course_code.clone(), ..NoteForm::default() };
                    s.banner = Some(Banner::success(msg));
                });
                self.refresh(Page::Notes).await;
            }
            Err(err) => self.fail(err, "Failed to update note"),
        }
    }

    async fn try_update_note(&self) -> Result<String, ActionError> {
        let (modal, form) = self.with_state(|s| (s.modal, s.forms.note.clone()));
        let Some(Modal::EditNote(id)) = modal else {
            return Err(ActionError::Validation("No note is being edited"));
        };
        let (title, content) = (form.title.trim(), form.content.trim());
        if title.is_empty() || content.is_empty() {
            return Err(ActionError::Validation("Title and content are required"));
        }
        let msg = self.api.update_note(id, title, content).await?;
        info!(note_id = id, "note updated");
        Ok(msg.or("Note updated"))
    }

    /// Confirmation is the caller's job.
    pub async fn delete_note(&self, id: NoteId) {
        match self.api.delete_note(id).await {
            Ok(msg) => {
                info!(note_id = id, "note deleted");
                self.update(|s| {
                    if s.modal == Some(Modal::ViewNote(id)) {
                        s.modal = None;
                    }
                    s.banner = Some(Banner::success(msg.or("Note deleted")));
                });
                self.refresh(Page::Notes).await;
            }
            Err(err) => self.fail(err.into(), "Failed to delete note"),
        }
    }

    pub async fn summarize_note(&self, id: NoteId) {
        match self.api.summarize_note(id).await {
            Ok(summary) => self.update(|s| {
                s.summary = Some(summary);
                s.modal = Some(Modal::NoteSummary);
            }),
            Err(err) => self.fail(err.into(), "Failed to summarize note"),
        }
    }

    /// Jump from the courses page to that course's notes.
    pub async fn filter_notes_by_course(&self, code: &str) {
        self.update(|s| s.forms.notes_filter = code.to_string());
        self.navigate(Page::Notes).await;
    }

    // ===== Courses =====

    pub async fn save_course(&self) {
        match self.try_save_course().await {
            Ok(msg) => {
                self.update(|s| {
                    s.modal = None;
                    s.forms.course = CourseForm::default();
                    s.banner = Some(Banner::success(msg));
                });
                self.refresh(Page::Courses).await;
            }
            Err(err) => self.fail(err, "Failed to create course"),
        }
    }

    async fn try_save_course(&self) -> Result<String, ActionError> {
        let form = self.with_state(|s| s.forms.course.clone());
        let (name, code) = (form.name.trim(), form.code.trim());
        if name.is_empty() || code.is_empty() {
            return Err(ActionError::Validation("Course name and code are required"));
        }
        let msg = self.api.create_course(name, code, form.description.trim()).await?;
        info!(code, "course created");
        Ok(msg.or("Course created"))
    }

    // ===== Flashcards =====

    pub async fn save_flashcard(&self) {
        match self.try_save_flashcard().await {
            Ok(msg) => {
                self.update(|s| {
                    s.modal = None;
                    s.forms.flashcard = FlashcardForm { note_id: s.forms.flashcard.note_id, ..FlashcardForm::default() };
                    s.banner = Some(Banner::success(msg));
                });
                self.refresh(Page::Flashcards).await;
            }
            Err(err) => self.fail(err, "Failed to save flashcard"),
        }
    }

    async fn try_save_flashcard(&self) -> Result<String, ActionError> {
        let form = self.with_state(|s| s.forms.flashcard.clone());
        let Some(note_id) = form.note_id else {
            return Err(ActionError::Validation("Please select a note"));
        };
        let (front, back) = (form.front.trim(), form.back.trim());
        if front.is_empty() || back.is_empty() {
            return Err(ActionError::Validation("Front and back are required"));
        }
        let msg = self.api.create_flashcard(note_id, front, back, form.difficulty).await?;
        info!(note_id, "flashcard created");
        Ok(msg.or("Flashcard created"))
    }

    // ===== Analytics =====

    pub async fn submit_study_log(&self) {
        match self.try_submit_study_log().await {
            Ok(msg) => {
                self.update(|s| {
                    s.modal = None;
                    s.forms.study_log = StudyLogForm::default();
                    s.banner = Some(Banner::success(msg));
                });
                self.refresh(Page::Dashboard).await;
            }
            Err(err) => self.fail(err, "Failed to log study time"),
        }
    }

    async fn try_submit_study_log(&self) -> Result<String, ActionError> {
        let form = self.with_state(|s| s.forms.study_log.clone());
        let minutes = form.minutes.trim();
        if minutes.is_empty() {
            return Err(ActionError::Validation("Please enter study time"));
        }
        let minutes: u32 = minutes
            .parse()
            .map_err(|_| ActionError::Validation("Study time must be a whole number of minutes"))?;
        let topics: Vec<String> = form
            .topics
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        let msg = self.api.record_study(minutes, &topics).await?;
        info!(minutes, topics = topics.len(), "study time logged");
        Ok(msg.or("Study time logged"))
    }

    // ===== AI assistant =====

    pub async fn send_message(&self) {
        let question = self.update(|s| {
            let q = s.forms.chat_input.trim().to_string();
            if !q.is_empty() {
                s.forms.chat_input.clear();
                s.chat.push(ChatEntry { role: ChatRole::You, text: q.clone() });
            }
            q
        });
        if question.is_empty() {
            return;
        }
        let entry = match self.api.ask(&question).await {
            Ok(answer) => ChatEntry { role: ChatRole::Ai, text: answer.answer },
            Err(err) => {
                warn!(error = %err, "ask failed");
                ChatEntry { role: ChatRole::Error, text: err.user_message("Failed to get an answer") }
            }
        };
        self.update(|s| s.chat.push(entry));
    }

    pub async fn search_notes(&self) {
        let query = self.with_state(|s| s.forms.search_query.trim().to_string());
        if query.is_empty() {
            self.fail(ActionError::Validation("Please enter a search term"), "");
            return;
        }
        match self.api.search_notes(&query).await {
            Ok(hits) => self.update(|s| {
                if hits.is_empty() {
                    s.banner = Some(Banner::info("No matching notes"));
                }
                s.search_hits = hits;
            }),
            Err(err) => self.fail(err.into(), "Search failed"),
        }
    }

    // ===== Partners =====

    /// Replace the partner list with fresh match candidates.
    pub async fn find_partners(&self) {
        let token = self.token();
        match self.api.find_partners().await {
            Ok(candidates) => {
                self.commit(token, |s| s.partners = PartnerView::Candidates(candidates));
            }
            Err(err) => self.fail(err.into(), "Failed to find partners"),
        }
    }

    pub async fn request_partnership(&self, partner_id: UserId) {
        match self.api.request_partnership(partner_id).await {
            Ok(msg) => {
                info!(partner_id, "partnership requested");
                self.set_banner(Banner::success(msg.or("Partnership request sent!")));
                self.refresh(Page::Partners).await;
            }
            Err(err) => self.fail(err.into(), "Failed to request partnership"),
        }
    }

    // ===== Achievements =====

    pub async fn load_achievement_progress(&self) {
        match self.api.achievement_stats().await {
            Ok(stats) => self.update(|s| s.achievement_stats = Some(stats)),
            Err(err) => self.fail(err.into(), "Failed to load achievement progress"),
        }
    }

    // ===== Exam predictor =====

    pub async fn analyze_exam(&self) {
        if let Err(err) = self.try_analyze_exam().await {
            self.fail(err, "Failed to analyze course");
        }
    }

    async fn try_analyze_exam(&self) -> Result<(), ActionError> {
        let code = self.exam_course()?;
        let course = self.resolve_course(&code).await?;
        let msg = self.api.analyze_course(course.id).await?;
        info!(course_id = course.id, "exam analysis finished");
        self.set_banner(Banner::success(msg.or("Analysis complete")));
        self.show_predictions(course.id).await?;
        Ok(())
    }

    /// Fetch predictions from an earlier analysis.
    pub async fn load_predictions(&self) {
        if let Err(err) = self.try_load_predictions().await {
            self.fail(err, "Failed to load predictions");
        }
    }

    async fn try_load_predictions(&self) -> Result<(), ActionError> {
        let code = self.exam_course()?;
        let course = self.resolve_course(&code).await?;
        self.show_predictions(course.id).await
    }

    fn exam_course(&self) -> Result<String, ActionError> {
        let code = self.with_state(|s| s.forms.exam_course.trim().to_string());
        if code.is_empty() {
            return Err(ActionError::Validation("Please select a course"));
        }
        Ok(code)
    }

    async fn show_predictions(&self, course_id: CourseId) -> Result<(), ActionError> {
        let predictions = self.api.predictions(course_id).await?;
        self.update(|s| {
            if predictions.is_empty() {
                s.banner = Some(Banner::info("No predictions available yet."));
            }
            s.predictions = predictions;
        });
        Ok(())
    }

    // ===== Theme =====

    pub fn toggle_theme(&self) {
        let theme = self.update(|s| {
            s.theme = s.theme.toggled();
            s.theme
        });
        if let Err(err) = self.prefs.set_theme(theme) {
            warn!(error = %err, "could not persist theme");
            self.set_banner(Banner::error("Could not save theme preference"));
        }
    }
}
