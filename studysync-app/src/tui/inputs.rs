use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use studysync_core::{AppState, AuthTab, Modal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Back,
    Up,
    Down,
    Left,
    Right,
    NextField,
    PrevField,
    Submit,
    Backspace,
    Char(char),
    Ctrl(char),
    None,
}

pub fn map_event(ev: Event) -> Action {
    if let Event::Key(KeyEvent { code, modifiers, kind, .. }) = ev {
        if kind == KeyEventKind::Release {
            return Action::None;
        }
        match (code, modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,
            (KeyCode::Char(c), KeyModifiers::CONTROL) => Action::Ctrl(c),
            (KeyCode::Char(c), _) => Action::Char(c),
            (KeyCode::Esc, _) => Action::Back,
            (KeyCode::Up, _) => Action::Up,
            (KeyCode::Down, _) => Action::Down,
            (KeyCode::Left, _) => Action::Left,
            (KeyCode::Right, _) => Action::Right,
            (KeyCode::Tab, _) => Action::NextField,
            (KeyCode::BackTab, _) => Action::PrevField,
            (KeyCode::Enter, _) => Action::Submit,
            (KeyCode::Backspace, _) => Action::Backspace,
            _ => Action::None,
        }
    } else {
        Action::None
    }
}

/// One editable slot of the auth screen or a modal form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Email,
    Password,
    NoteCourse,
    NoteTitle,
    NoteContent,
    CourseName,
    CourseCode,
    CourseDescription,
    CardNote,
    CardFront,
    CardBack,
    CardDifficulty,
    StudyMinutes,
    StudyTopics,
}

pub const AUTH_FIELDS: &[Field] = &[Field::Email, Field::Password];

pub fn modal_fields(modal: Modal) -> &'static [Field] {
    match modal {
        Modal::CreateNote => &[Field::NoteCourse, Field::NoteTitle, Field::NoteContent],
        Modal::EditNote(_) => &[Field::NoteTitle, Field::NoteContent],
        Modal::CreateCourse => &[Field::CourseName, Field::CourseCode, Field::CourseDescription],
        Modal::CreateFlashcard => &[Field::CardNote, Field::CardFront, Field::CardBack, Field::CardDifficulty],
        Modal::StudyLog => &[Field::StudyMinutes, Field::StudyTopics],
        Modal::ViewNote(_) | Modal::NoteSummary => &[],
    }
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::Email => "Email",
            Field::Password => "Password",
            Field::NoteCourse => "Course",
            Field::NoteTitle => "Title",
            Field::NoteContent => "Content",
            Field::CourseName => "Name",
            Field::CourseCode => "Code",
            Field::CourseDescription => "Description",
            Field::CardNote => "Note",
            Field::CardFront => "Front",
            Field::CardBack => "Back",
            Field::CardDifficulty => "Difficulty",
            Field::StudyMinutes => "Minutes",
            Field::StudyTopics => "Topics (comma separated)",
        }
    }

    /// Pickers cycle through choices with Left/Right instead of taking text.
    pub fn is_picker(self) -> bool {
        matches!(self, Field::NoteCourse | Field::CardNote | Field::CardDifficulty)
    }

    pub fn text_mut(self, s: &mut AppState) -> Option<&mut String> {
        let creds = match s.auth_tab {
            AuthTab::Login => &mut s.forms.login,
            AuthTab::Register => &mut s.forms.register,
        };
        let text = match self {
            Field::Email => &mut creds.email,
            Field::Password => &mut creds.password,
            Field::NoteTitle => &mut s.forms.note.title,
            Field::NoteContent => &mut s.forms.note.content,
            Field::CourseName => &mut s.forms.course.name,
            Field::CourseCode => &mut s.forms.course.code,
            Field::CourseDescription => &mut s.forms.course.description,
            Field::CardFront => &mut s.forms.flashcard.front,
            Field::CardBack => &mut s.forms.flashcard.back,
            Field::StudyMinutes => &mut s.forms.study_log.minutes,
            Field::StudyTopics => &mut s.forms.study_log.topics,
            Field::NoteCourse | Field::CardNote | Field::CardDifficulty => return None,
        };
        Some(text)
    }

    pub fn display(self, s: &AppState) -> String {
        let creds = match s.auth_tab {
            AuthTab::Login => &s.forms.login,
            AuthTab::Register => &s.forms.register,
        };
        match self {
            Field::Email => creds.email.clone(),
            Field::Password => "*".repeat(creds.password.chars().count()),
            Field::NoteCourse => match s.course_by_code(&s.forms.note.course_code) {
                Some(c) => c.label(),
                None if s.forms.note.course_code.is_empty() => "< select >".to_string(),
                None => s.forms.note.course_code.clone(),
            },
            Field::CardNote => s
                .forms
                .flashcard
                .note_id
                .and_then(|id| s.note(id))
                .map(|n| n.display_title().to_string())
                .unwrap_or_else(|| "< select >".to_string()),
            Field::CardDifficulty => s.forms.flashcard.difficulty.label().to_string(),
            Field::NoteTitle => s.forms.note.title.clone(),
            Field::NoteContent => s.forms.note.content.clone(),
            Field::CourseName => s.forms.course.name.clone(),
            Field::CourseCode => s.forms.course.code.clone(),
            Field::CourseDescription => s.forms.course.description.clone(),
            Field::CardFront => s.forms.flashcard.front.clone(),
            Field::CardBack => s.forms.flashcard.back.clone(),
            Field::StudyMinutes => s.forms.study_log.minutes.clone(),
            Field::StudyTopics => s.forms.study_log.topics.clone(),
        }
    }

    pub fn cycle(self, s: &mut AppState, forward: bool) {
        match self {
            Field::NoteCourse => {
                let codes: Vec<String> = s.courses.iter().map(|c| c.code.clone()).collect();
                if let Some(code) = step(&codes, &s.forms.note.course_code, forward) {
                    s.forms.note.course_code = code;
                }
            }
            Field::CardNote => {
                let ids: Vec<i64> = s.notes.iter().map(|n| n.id).collect();
                let current = s.forms.flashcard.note_id.unwrap_or(i64::MIN);
                if let Some(id) = step(&ids, &current, forward) {
                    s.forms.flashcard.note_id = Some(id);
                }
            }
            Field::CardDifficulty => {
                let d = s.forms.flashcard.difficulty;
                s.forms.flashcard.difficulty = if forward { d.next() } else { d.next().next() };
            }
            _ => {}
        }
    }
}

fn step<T: Clone + PartialEq>(items: &[T], current: &T, forward: bool) -> Option<T> {
    if items.is_empty() {
        return None;
    }
    let n = items.len();
    let idx = match items.iter().position(|x| x == current) {
        Some(i) if forward => (i + 1) % n,
        Some(i) => (i + n - 1) % n,
        None => 0,
    };
    items.get(idx).cloned()
}
