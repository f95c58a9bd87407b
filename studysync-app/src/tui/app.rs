use crate::tui::{
    inputs::{map_event, modal_fields, Action, AUTH_FIELDS},
    views::{self, row_count, Cursor},
};
use crossterm::{
    event::{self},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::future::Future;
use std::io::{stdout, Stdout};
use std::sync::Arc;
use studysync_core::{AppState, AuthTab, Controller, Modal, Page, PartnerView, ViewState};
use tokio::runtime::Runtime;
use tracing::info;

pub struct TuiApp {
    controller: Controller,
    rt: Arc<Runtime>,
    cursor: Cursor,
    seen: Option<(ViewState, Option<Modal>)>,
}

impl TuiApp {
    pub fn new(controller: Controller, rt: Arc<Runtime>) -> Self {
        Self { controller, rt, cursor: Cursor::default(), seen: None }
    }

    /// Run a controller handler on the runtime; the next frame shows its effect.
    fn spawn<F, Fut>(&self, f: F)
    where
        F: FnOnce(Controller) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.rt.spawn(f(self.controller.clone()));
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        self.rt.block_on(self.controller.start());

        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let res = self.mainloop(&mut terminal);

        disable_raw_mode().ok();
        let mut out: Stdout = std::io::stdout();
        execute!(out, LeaveAlternateScreen).ok();
        terminal.show_cursor().ok();

        self.rt.block_on(self.controller.flush_reviews());
        info!("tui closed");
        res
    }

    fn mainloop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
        loop {
            let state = self.controller.snapshot();
            self.sync_cursor(&state);
            terminal.draw(|f| views::draw_ui(f, &state, &self.cursor))?;

            if event::poll(std::time::Duration::from_millis(100))? {
                let action = map_event(event::read()?);
                if action == Action::Quit || !self.handle(&state, action) {
                    break;
                }
            }
        }
        Ok(())
    }

    /// Reset selection whenever the page or modal changes underneath us.
    fn sync_cursor(&mut self, s: &AppState) {
        let now = (s.view(), s.modal);
        if self.seen != Some(now) {
            self.seen = Some(now);
            self.cursor = Cursor::default();
        }
        let rows = row_count(s, s.page);
        self.cursor.sel = self.cursor.sel.min(rows.saturating_sub(1));
    }

    /// Returns false when the user asked to leave.
    fn handle(&mut self, s: &AppState, action: Action) -> bool {
        if let Some(id) = self.cursor.confirm_delete.take() {
            if action == Action::Char('y') {
                self.spawn(move |c| async move { c.delete_note(id).await });
            }
            return true;
        }
        if s.review.is_some() {
            self.on_review(s, action);
            return true;
        }
        if !s.is_authenticated() {
            return self.on_auth(s, action);
        }
        if let Some(modal) = s.modal {
            self.on_modal(modal, action);
            return true;
        }
        self.on_page(s, action)
    }

    fn on_review(&mut self, s: &AppState, action: Action) {
        let revealed = s.review.as_ref().is_some_and(|r| r.revealed);
        match action {
            Action::Char(' ') | Action::Submit if !revealed => self.controller.reveal_answer(),
            Action::Char('y') | Action::Char('1') if revealed => {
                self.spawn(|c| async move { c.answer(true).await });
            }
            Action::Char('n') | Action::Char('0') if revealed => {
                self.spawn(|c| async move { c.answer(false).await });
            }
            Action::Back => self.controller.abandon_review(),
            _ => {}
        }
    }

    fn on_auth(&mut self, s: &AppState, action: Action) -> bool {
        let field = AUTH_FIELDS[self.cursor.field.min(AUTH_FIELDS.len() - 1)];
        match action {
            Action::Back => return false,
            Action::Left | Action::Right => {
                let tab = match s.auth_tab {
                    AuthTab::Login => AuthTab::Register,
                    AuthTab::Register => AuthTab::Login,
                };
                self.controller.show_auth_tab(tab);
            }
            Action::NextField | Action::Down => self.cursor.field = (self.cursor.field + 1) % AUTH_FIELDS.len(),
            Action::PrevField | Action::Up => {
                self.cursor.field = (self.cursor.field + AUTH_FIELDS.len() - 1) % AUTH_FIELDS.len()
            }
            Action::Char(ch) => self.controller.update(|st| {
                if let Some(t) = field.text_mut(st) {
                    t.push(ch);
                }
            }),
            Action::Backspace => self.controller.update(|st| {
                if let Some(t) = field.text_mut(st) {
                    t.pop();
                }
            }),
            Action::Submit => match s.auth_tab {
                AuthTab::Login => self.spawn(|c| async move { c.login().await }),
                AuthTab::Register => self.spawn(|c| async move { c.register().await }),
            },
            _ => {}
        }
        true
    }

    fn on_modal(&mut self, modal: Modal, action: Action) {
        match modal {
            Modal::ViewNote(id) => match action {
                Action::Char('e') => self.controller.edit_note(id),
                Action::Char('d') => self.cursor.confirm_delete = Some(id),
                Action::Char('s') => self.spawn(move |c| async move { c.summarize_note(id).await }),
                Action::Back => self.controller.close_modal(),
                _ => {}
            },
            Modal::NoteSummary => {
                if matches!(action, Action::Back | Action::Submit) {
                    self.controller.close_modal();
                }
            }
            form => {
                let fields = modal_fields(form);
                if fields.is_empty() {
                    return;
                }
                let n = fields.len();
                let field = fields[self.cursor.field.min(n - 1)];
                match action {
                    Action::Back => self.controller.close_modal(),
                    Action::NextField | Action::Down => self.cursor.field = (self.cursor.field + 1) % n,
                    Action::PrevField | Action::Up => self.cursor.field = (self.cursor.field + n - 1) % n,
                    Action::Left | Action::Right => {
                        let forward = action == Action::Right;
                        self.controller.update(|st| field.cycle(st, forward));
                    }
                    Action::Char(ch) => self.controller.update(|st| {
                        if let Some(t) = field.text_mut(st) {
                            t.push(ch);
                        }
                    }),
                    Action::Backspace => self.controller.update(|st| {
                        if let Some(t) = field.text_mut(st) {
                            t.pop();
                        }
                    }),
                    Action::Submit => match form {
                        Modal::CreateNote => self.spawn(|c| async move { c.save_note().await }),
                        Modal::EditNote(_) => self.spawn(|c| async move { c.update_note().await }),
                        Modal::CreateCourse => self.spawn(|c| async move { c.save_course().await }),
                        Modal::CreateFlashcard => self.spawn(|c| async move { c.save_flashcard().await }),
                        Modal::StudyLog => self.spawn(|c| async move { c.submit_study_log().await }),
                        Modal::ViewNote(_) | Modal::NoteSummary => {}
                    },
                    _ => {}
                }
            }
        }
    }

    fn on_page(&mut self, s: &AppState, action: Action) -> bool {
        let page = s.page;
        match action {
            Action::Back => self.controller.dismiss_banner(),
            Action::NextField => self.go(step_page(page, true)),
            Action::PrevField => self.go(step_page(page, false)),
            Action::Up => self.cursor.sel = self.cursor.sel.saturating_sub(1),
            Action::Down => {
                if self.cursor.sel + 1 < row_count(s, page) {
                    self.cursor.sel += 1;
                }
            }
            Action::Ctrl('t') => self.controller.toggle_theme(),
            _ if page == Page::Assistant => self.on_assistant(action),
            Action::Char('q') => return false,
            Action::Char('t') => self.controller.toggle_theme(),
            Action::Char('g') => self.spawn(|c| async move { c.reload_current_page().await }),
            Action::Char('L') => self.spawn(|c| async move { c.logout().await }),
            Action::Char(d @ '1'..='8') => {
                let idx = d as usize - '1' as usize;
                self.go(Page::ALL[idx]);
            }
            other => self.on_page_key(s, page, other),
        }
        true
    }

    fn on_assistant(&mut self, action: Action) {
        match action {
            Action::Char(ch) => self.controller.update(|s| s.forms.chat_input.push(ch)),
            Action::Backspace => self.controller.update(|s| {
                s.forms.chat_input.pop();
            }),
            Action::Submit => self.spawn(|c| async move { c.send_message().await }),
            Action::Ctrl('s') => {
                self.controller.update(|s| s.forms.search_query = std::mem::take(&mut s.forms.chat_input));
                self.spawn(|c| async move { c.search_notes().await });
            }
            _ => {}
        }
    }

    fn on_page_key(&mut self, s: &AppState, page: Page, action: Action) {
        let sel = self.cursor.sel;
        let note_id = s.notes.get(sel).map(|n| n.id);
        let course_code = s.courses.get(sel).map(|c| c.code.clone());
        match (page, action) {
            (Page::Dashboard, Action::Char('l')) => self.controller.open_study_log_modal(),
            (Page::Dashboard | Page::Flashcards, Action::Char('r')) => {
                self.spawn(|c| async move { c.start_review().await })
            }
            (Page::Notes, Action::Char('n')) => self.spawn(|c| async move { c.open_note_modal().await }),
            (Page::Notes, Action::Submit) => {
                if let Some(id) = note_id {
                    self.controller.view_note(id);
                }
            }
            (Page::Notes, Action::Char('e')) => {
                if let Some(id) = note_id {
                    self.controller.edit_note(id);
                }
            }
            (Page::Notes, Action::Char('d')) => self.cursor.confirm_delete = note_id,
            (Page::Notes, Action::Char('s')) => {
                if let Some(id) = note_id {
                    self.spawn(move |c| async move { c.summarize_note(id).await });
                }
            }
            (Page::Notes, Action::Char('a')) => {
                self.spawn(|c| async move { c.filter_notes_by_course("").await });
            }
            (Page::Courses, Action::Char('n')) => self.controller.open_course_modal(),
            (Page::Courses, Action::Submit) => {
                if let Some(code) = course_code {
                    self.spawn(move |c| async move { c.filter_notes_by_course(&code).await });
                }
            }
            (Page::Flashcards, Action::Char('n')) => {
                self.spawn(|c| async move { c.open_flashcard_modal().await })
            }
            (Page::ExamPredictor, Action::Submit | Action::Char('v')) => {
                if let Some(code) = course_code {
                    self.controller.update(|st| st.forms.exam_course = code);
                    if action == Action::Submit {
                        self.spawn(|c| async move { c.analyze_exam().await });
                    } else {
                        self.spawn(|c| async move { c.load_predictions().await });
                    }
                }
            }
            (Page::Partners, Action::Char('f')) => self.spawn(|c| async move { c.find_partners().await }),
            (Page::Partners, Action::Char('m')) => self.go(Page::Partners),
            (Page::Partners, Action::Submit) => {
                if let PartnerView::Candidates(list) = &s.partners {
                    if let Some(id) = list.get(sel).map(|p| p.user_id) {
                        self.spawn(move |c| async move { c.request_partnership(id).await });
                    }
                }
            }
            (Page::Achievements, Action::Char('p')) => {
                self.spawn(|c| async move { c.load_achievement_progress().await })
            }
            _ => {}
        }
    }

    fn go(&self, page: Page) {
        self.spawn(move |c| async move { c.navigate(page).await });
    }
}

fn step_page(page: Page, forward: bool) -> Page {
    let n = Page::ALL.len();
    let i = Page::ALL.iter().position(|p| *p == page).unwrap_or(0);
    let next = if forward { (i + 1) % n } else { (i + n - 1) % n };
    Page::ALL[next]
}

#[cfg(test)]
mod tests {
    use super::*;
    use studysync_core::{HttpApi, MemoryPrefs, User};

    fn offline_app() -> TuiApp {
        let api = Arc::new(HttpApi::new("http://127.0.0.1:9").unwrap());
        let controller = Controller::new(api, Arc::new(MemoryPrefs::new()));
        controller.update(|s| s.user = Some(User { user_id: 5, email: "a@b.com".into(), profile_data: None }));
        TuiApp::new(controller, Arc::new(Runtime::new().unwrap()))
    }

    fn press(app: &mut TuiApp, action: Action) {
        let state = app.controller.snapshot();
        assert!(app.handle(&state, action));
    }

    #[test]
    fn modal_keys_edit_the_focused_field() {
        let mut app = offline_app();
        app.controller.open_course_modal();

        press(&mut app, Action::Char('C'));
        press(&mut app, Action::Char('S'));
        press(&mut app, Action::Backspace);
        press(&mut app, Action::NextField);
        press(&mut app, Action::Char('1'));

        let s = app.controller.snapshot();
        assert_eq!(s.forms.course.name, "C");
        assert_eq!(s.forms.course.code, "1");

        press(&mut app, Action::Back);
        assert_eq!(app.controller.snapshot().modal, None);
    }

    #[test]
    fn page_cycle_wraps() {
        assert_eq!(step_page(Page::Achievements, true), Page::Dashboard);
        assert_eq!(step_page(Page::Dashboard, false), Page::Achievements);
        assert_eq!(step_page(Page::Dashboard, true), Page::ALL[1]);
    }
}
