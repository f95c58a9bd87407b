use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[command(name = "studysync", version, about = "StudySync CLI/TUI client")]
pub struct Cli {
    /// Backend origin
    #[arg(long, env = "STUDYSYNC_URL", default_value = "http://127.0.0.1:5000", global = true)]
    pub base_url: String,

    /// Preferences file (defaults to app data dir)
    #[arg(long, env = "STUDYSYNC_PREFS", global = true)]
    pub prefs: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Sign in and remember the session
    Login(Credentials),
    /// Create an account
    Register(Credentials),
    /// End the session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Dashboard numbers and the last 7 days
    Stats,
    /// Course operations
    #[command(subcommand)]
    Course(CourseCmd),
    /// Note operations
    #[command(subcommand)]
    Note(NoteCmd),
    /// Flashcard operations
    #[command(subcommand)]
    Card(CardCmd),
    /// Review loop over the due queue
    Review,
    /// Ask the AI assistant
    Ask {
        #[arg(required = true)]
        question: Vec<String>,
    },
    /// Search notes
    Search {
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Study time logging
    #[command(subcommand)]
    Study(StudyCmd),
    /// Study partners
    #[command(subcommand)]
    Partners(PartnersCmd),
    /// Earned badges
    Achievements {
        /// Also show progress counters
        #[arg(long)]
        progress: bool,
    },
    /// Exam predictor
    #[command(subcommand)]
    Exam(ExamCmd),
    /// Display theme
    #[command(subcommand)]
    Theme(ThemeCmd),
    /// Launch Terminal UI
    Tui,
}

#[derive(Debug, Args, Clone)]
pub struct Credentials {
    #[arg(long, env = "STUDYSYNC_EMAIL")]
    pub email: String,
    /// Prompted for when omitted
    #[arg(long, env = "STUDYSYNC_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum CourseCmd {
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        code: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    Show { course_id: i64 },
}

#[derive(Debug, Subcommand, Clone)]
pub enum NoteCmd {
    List {
        /// Course code
        #[arg(long)]
        course: Option<String>,
    },
    Add(NoteAdd),
    Show { note_id: i64 },
    Edit(NoteEdit),
    Rm { note_id: i64 },
    Summarize { note_id: i64 },
}

#[derive(Debug, Args, Clone)]
pub struct NoteAdd {
    /// Course code
    #[arg(long)]
    pub course: String,
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub content: String,
}

#[derive(Debug, Args, Clone)]
pub struct NoteEdit {
    pub note_id: i64,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub content: Option<String>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum CardCmd {
    List,
    Add(CardAdd),
}

#[derive(Debug, Args, Clone)]
pub struct CardAdd {
    #[arg(long)]
    pub note: i64,
    #[arg(long)]
    pub front: String,
    #[arg(long)]
    pub back: String,
    /// easy, medium or hard (or 0/1/2)
    #[arg(long, default_value = "easy")]
    pub difficulty: String,
}

#[derive(Debug, Subcommand, Clone)]
pub enum StudyCmd {
    Log {
        #[arg(long)]
        minutes: u32,
        /// Comma separated
        #[arg(long, default_value = "")]
        topics: String,
    },
}

#[derive(Debug, Subcommand, Clone)]
pub enum PartnersCmd {
    List,
    Find,
    Request { user_id: i64 },
}

#[derive(Debug, Subcommand, Clone)]
pub enum ExamCmd {
    Analyze { course: String },
    Show { course: String },
}

#[derive(Debug, Subcommand, Clone)]
pub enum ThemeCmd {
    Show,
    Toggle,
}
