//! Page routing and user-action handlers.
//!
//! Every public handler is the terminal catcher for its own action: failures end up in
//! [`AppState::banner`] and nothing is returned to the caller. Loaders carry the navigation
//! generation they started under and drop their results if the user has moved on.

use crate::{ApiError, AppState, Banner, Course, PreferenceStore, StudyApi, ViewState};
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

mod actions;
mod auth;
mod pages;
mod review;

#[derive(Debug, Error)]
pub enum ActionError {
    /// A required field was empty; no request was made.
    #[error("{0}")]
    Validation(&'static str),
    #[error("Selected course not found")]
    CourseNotFound(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ActionError {
    pub fn banner(&self, fallback: &str) -> Banner {
        match self {
            ActionError::Validation(msg) => Banner::error(*msg),
            ActionError::CourseNotFound(_) => Banner::error(self.to_string()),
            ActionError::Api(err) => Banner::error(err.user_message(fallback)),
        }
    }
}

#[derive(Clone)]
pub struct Controller {
    api: Arc<dyn StudyApi>,
    prefs: Arc<dyn PreferenceStore>,
    state: Arc<Mutex<AppState>>,
    pending: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl Controller {
    pub fn new(api: Arc<dyn StudyApi>, prefs: Arc<dyn PreferenceStore>) -> Self {
        let theme = prefs.theme().unwrap_or_default();
        Self {
            api,
            prefs,
            state: Arc::new(Mutex::new(AppState::new(theme))),
            pending: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn api(&self) -> &Arc<dyn StudyApi> {
        &self.api
    }

    pub fn snapshot(&self) -> AppState {
        self.state.lock().clone()
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.state.lock())
    }

    /// Mutate state directly, the way an input widget writes into its form field.
    pub fn update<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> R {
        f(&mut self.state.lock())
    }

    pub fn view(&self) -> ViewState {
        self.state.lock().view()
    }

    pub fn banner(&self) -> Option<Banner> {
        self.state.lock().banner.clone()
    }

    pub fn dismiss_banner(&self) {
        self.state.lock().banner = None;
    }

    /// Review submissions still tracked for [`Controller::flush_reviews`].
    pub fn pending_reviews(&self) -> usize {
        self.pending.lock().len()
    }

    fn set_banner(&self, banner: Banner) {
        self.state.lock().banner = Some(banner);
    }

    fn fail(&self, err: ActionError, fallback: &str) {
        match &err {
            ActionError::Api(e) => warn!(error = %e, "{}", fallback),
            other => debug!(reason = %other, "action rejected"),
        }
        self.set_banner(err.banner(fallback));
    }

    fn token(&self) -> u64 {
        self.state.lock().generation()
    }

    /// Apply `f` only if no navigation happened since `token` was taken.
    fn commit(&self, token: u64, f: impl FnOnce(&mut AppState)) -> bool {
        let mut s = self.state.lock();
        if !s.is_current(token) {
            debug!(token, current = s.generation(), "discarding stale response");
            return false;
        }
        f(&mut s);
        true
    }

    /// Look a course code up in a freshly fetched course list.
    async fn resolve_course(&self, code: &str) -> Result<Course, ActionError> {
        let courses = self.api.list_courses().await?;
        let found = courses.iter().find(|c| c.code == code).cloned();
        self.state.lock().courses = courses;
        found.ok_or_else(|| ActionError::CourseNotFound(code.to_string()))
    }
}
