use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub type UserId = i64;
pub type CourseId = i64;
pub type NoteId = i64;
pub type FlashcardId = i64;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "i64", into = "i64")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}

impl TryFrom<i64> for Difficulty {
    type Error = String;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Difficulty::Easy),
            1 => Ok(Difficulty::Medium),
            2 => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty {other}")),
        }
    }
}

impl From<Difficulty> for i64 {
    fn from(d: Difficulty) -> i64 {
        match d {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "0" | "e" | "easy" => Ok(Difficulty::Easy),
            "1" | "m" | "med" | "medium" => Ok(Difficulty::Medium),
            "2" | "h" | "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub user_id: UserId,
    pub email: String,
    #[serde(default)]
    pub profile_data: Option<Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Course {
    pub id: CourseId,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Course {
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.code)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Note {
    pub id: NoteId,
    #[serde(default)]
    pub course_id: Option<CourseId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
}

impl Note {
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Untitled"
        } else {
            &self.title
        }
    }

    /// First 160 characters of the body, for list views.
    pub fn preview(&self) -> String {
        let body = self.content.as_deref().unwrap_or("");
        let mut out: String = body.chars().take(160).collect();
        if body.chars().count() > 160 {
            out.push_str("...");
        }
        out
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flashcard {
    pub id: FlashcardId,
    #[serde(default)]
    pub note_id: Option<NoteId>,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub next_review: Option<String>,
    #[serde(default)]
    pub review_count: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudyDay {
    pub date: NaiveDate,
    #[serde(default)]
    pub study_time: u32,
    #[serde(default)]
    pub topics_covered: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DashboardStats {
    pub notes_count: u64,
    pub flashcards_count: u64,
    pub total_study_time_week: u64,
    pub due_flashcards: u64,
    pub days_active_week: u64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AchievementStats {
    pub notes_count: u64,
    pub flashcards_count: u64,
    pub active_days_week: u64,
    pub total_achievements: u64,
    pub progress: BTreeMap<String, i64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PartnerCandidate {
    pub user_id: UserId,
    pub email: String,
    #[serde(default)]
    pub match_score: f64,
    #[serde(default)]
    pub shared_courses: u32,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Partnership {
    #[serde(default)]
    pub partnership_id: Option<i64>,
    #[serde(default)]
    pub partner_id: Option<UserId>,
    pub partner_email: String,
    #[serde(default)]
    pub match_score: f64,
    #[serde(default)]
    pub status: String,
}

impl Partnership {
    pub fn is_accepted(&self) -> bool {
        self.status.eq_ignore_ascii_case("accepted")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Achievement {
    #[serde(default)]
    pub badge_type: Option<String>,
    pub description: String,
    pub earned_date: String,
}

impl Achievement {
    /// Calendar date the badge was earned, or the raw string if it does not parse.
    pub fn earned_on(&self) -> String {
        if let Ok(dt) = NaiveDateTime::from_str(&self.earned_date) {
            return dt.date().to_string();
        }
        if let Ok(d) = NaiveDate::from_str(&self.earned_date) {
            return d.to_string();
        }
        self.earned_date.clone()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    #[serde(default, alias = "question_text")]
    pub topic: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Value>,
    #[serde(default, alias = "confidence_score")]
    pub confidence: Option<f64>,
}

impl Prediction {
    /// Values at or below 1.0 are fractions; larger ones are already percentages.
    pub fn confidence_percent(&self) -> Option<u32> {
        let c = self.confidence?;
        if c <= 0.0 {
            return None;
        }
        let pct = if c <= 1.0 { c * 100.0 } else { c };
        Some(pct.round().clamp(0.0, 100.0) as u32)
    }

    pub fn difficulty_label(&self) -> String {
        match &self.difficulty {
            None | Some(Value::Null) => "Unknown".to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchHit {
    pub note_id: NoteId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub course_name: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NoteSummary {
    pub title: String,
    #[serde(alias = "first_sentence")]
    pub text: String,
    pub key_points: Vec<String>,
    pub word_count: u64,
    pub estimated_read_time: u64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    #[serde(default)]
    pub answer: String,
}

/// Acknowledgement body of a mutating call. Most callers only use `message`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Message {
    #[serde(default)]
    pub message: Option<String>,
}

impl Message {
    pub fn or(&self, fallback: &str) -> String {
        self.message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}
