use super::{ActionError, Controller};
use crate::{Banner, Dashboard, Note, Page, PartnerView};
use tracing::{debug, warn};

impl Controller {
    /// Show `page` and run its loader. Any review in progress is dropped.
    pub async fn navigate(&self, page: Page) {
        let token = {
            let mut s = self.state.lock();
            if !s.is_authenticated() {
                debug!(%page, "navigation ignored while signed out");
                return;
            }
            if s.review.take().is_some() {
                debug!("review session abandoned by navigation");
            }
            s.page = page;
            s.modal = None;
            s.banner = None;
            s.advance()
        };
        self.load_page(page, token).await;
    }

    pub async fn reload_current_page(&self) {
        let (page, token) = self.with_state(|s| (s.page, s.generation()));
        self.load_page(page, token).await;
    }

    /// Re-run a loader after a mutation, without starting a new navigation.
    pub(crate) async fn refresh(&self, page: Page) {
        let token = self.token();
        self.load_page(page, token).await;
    }

    pub(crate) async fn load_page(&self, page: Page, token: u64) {
        match page {
            Page::Dashboard => self.load_dashboard(token).await,
            Page::Notes => self.load_notes(token).await,
            Page::Courses => self.load_courses(token).await,
            Page::Flashcards => self.load_flashcards(token).await,
            Page::Assistant => {}
            Page::ExamPredictor => self.load_exam_predictor(token).await,
            Page::Partners => self.load_partners(token).await,
            Page::Achievements => self.load_achievements(token).await,
        }
    }

    async fn load_dashboard(&self, token: u64) {
        let stats = match self.api.stats().await {
            Ok(stats) => stats,
            Err(err) => {
                warn!(error = %err, "dashboard stats failed");
                let banner = Banner::error(err.user_message("Error loading dashboard. Please refresh."));
                self.commit(token, |s| s.banner = Some(banner));
                return;
            }
        };
        if !self.commit(token, |s| s.dashboard = Some(Dashboard { stats, series: Vec::new() })) {
            return;
        }

        // The chart is decorative; the stats stay up if it fails.
        match self.api.analytics(7).await {
            Ok(mut days) => {
                days.sort_by_key(|d| d.date);
                self.commit(token, |s| {
                    if let Some(d) = s.dashboard.as_mut() {
                        d.series = days;
                    }
                });
            }
            Err(err) => warn!(error = %err, "study chart unavailable"),
        }
    }

    async fn load_notes(&self, token: u64) {
        let code = self.with_state(|s| s.forms.notes_filter.trim().to_string());
        match self.fetch_notes(&code).await {
            Ok(notes) => {
                self.commit(token, |s| s.notes = notes);
            }
            Err(err) => {
                let banner = err.banner("Failed to load notes");
                warn!(reason = %err, "notes load failed");
                self.commit(token, |s| s.banner = Some(banner));
            }
        }
    }

    async fn fetch_notes(&self, course_code: &str) -> Result<Vec<Note>, ActionError> {
        let course_id = if course_code.is_empty() {
            None
        } else {
            Some(self.resolve_course(course_code).await?.id)
        };
        Ok(self.api.list_notes(course_id).await?)
    }

    async fn load_courses(&self, token: u64) {
        match self.api.list_courses().await {
            Ok(courses) => {
                self.commit(token, |s| s.courses = courses);
            }
            Err(err) => {
                let banner = Banner::error(err.user_message("Failed to load courses"));
                self.commit(token, |s| s.banner = Some(banner));
            }
        }
    }

    async fn load_flashcards(&self, token: u64) {
        match self.api.list_flashcards(None, false).await {
            Ok(cards) => {
                self.commit(token, |s| s.flashcards = cards);
            }
            Err(err) => {
                let banner = Banner::error(err.user_message("Failed to load flashcards"));
                self.commit(token, |s| s.banner = Some(banner));
            }
        }
    }

    /// Only the course picker is loaded; predictions wait for an explicit analyze.
    async fn load_exam_predictor(&self, token: u64) {
        match self.api.list_courses().await {
            Ok(courses) => {
                self.commit(token, |s| {
                    s.courses = courses;
                    s.predictions.clear();
                });
            }
            Err(err) => {
                let banner = Banner::error(err.user_message("Failed to load courses"));
                self.commit(token, |s| s.banner = Some(banner));
            }
        }
    }

    async fn load_partners(&self, token: u64) {
        match self.api.list_partners().await {
            Ok(partners) => {
                self.commit(token, |s| s.partners = PartnerView::Existing(partners));
            }
            Err(err) => {
                let banner = Banner::error(err.user_message("Failed to load partners"));
                self.commit(token, |s| s.banner = Some(banner));
            }
        }
    }

    async fn load_achievements(&self, token: u64) {
        match self.api.achievements().await {
            Ok(list) => {
                self.commit(token, |s| s.achievements = list);
            }
            Err(err) => {
                let banner = Banner::error(err.user_message("Failed to load achievements"));
                self.commit(token, |s| s.banner = Some(banner));
            }
        }
    }
}
