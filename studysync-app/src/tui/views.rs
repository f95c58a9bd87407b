use crate::tui::inputs::{modal_fields, Field, AUTH_FIELDS};
use crate::tui::theme::{palette, Palette};
use studysync_core::{AppState, AuthTab, ChatRole, Modal, NoteId, Page, PartnerView, ReviewSession};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};

/// Terminal-only selection state that the controller does not track.
#[derive(Debug, Default, Clone)]
pub struct Cursor {
    pub sel: usize,
    pub field: usize,
    pub confirm_delete: Option<NoteId>,
}

/// Number of selectable rows on `page`.
pub fn row_count(s: &AppState, page: Page) -> usize {
    match page {
        Page::Notes => s.notes.len(),
        Page::Courses | Page::ExamPredictor => s.courses.len(),
        Page::Flashcards => s.flashcards.len(),
        Page::Partners => match &s.partners {
            PartnerView::Existing(v) => v.len(),
            PartnerView::Candidates(v) => v.len(),
        },
        Page::Achievements => s.achievements.len(),
        Page::Dashboard | Page::Assistant => 0,
    }
}

pub fn draw_ui(f: &mut Frame, s: &AppState, cur: &Cursor) {
    let pal = palette(s.theme);
    let area = f.size();
    f.render_widget(Block::default().style(pal.base()), area);

    if !s.is_authenticated() {
        draw_auth(f, area, s, cur, &pal);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3), Constraint::Length(1), Constraint::Length(1)])
        .split(area);
    draw_header(f, rows[0], s, &pal);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(22), Constraint::Min(20)])
        .split(rows[1]);
    draw_sidebar(f, cols[0], s, &pal);
    draw_page(f, cols[1], s, cur, &pal);

    draw_banner(f, rows[2], s, &pal);
    draw_footer(f, rows[3], s, cur, &pal);

    if let Some(review) = &s.review {
        draw_review(f, area, review, &pal);
    } else if let Some(modal) = s.modal {
        draw_modal(f, area, s, modal, cur, &pal);
    }
}

fn draw_header(f: &mut Frame, area: Rect, s: &AppState, pal: &Palette) {
    let email = s.user.as_ref().map(|u| u.email.as_str()).unwrap_or("");
    let line = Line::from(vec![
        Span::raw(" StudySync ").style(pal.title()),
        Span::raw(format!(" {} ", s.page.title())),
        Span::raw(format!("  {email}")).style(pal.hint()),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn draw_sidebar(f: &mut Frame, area: Rect, s: &AppState, pal: &Palette) {
    let items: Vec<_> = Page::ALL
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let text = format!("{} {}", i + 1, p.title());
            if *p == s.page {
                ListItem::new(Line::from(text).style(pal.selected()))
            } else {
                ListItem::new(Line::from(text))
            }
        })
        .collect();
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Pages"));
    f.render_widget(list, area);
}

fn draw_page(f: &mut Frame, area: Rect, s: &AppState, cur: &Cursor, pal: &Palette) {
    let titled = |title: String| Block::default().borders(Borders::ALL).title(Span::styled(title, pal.title()));
    let block = titled(s.page.title().to_string());
    match s.page {
        Page::Dashboard => draw_dashboard(f, area, s, block, pal),
        Page::Notes => {
            let title = if s.forms.notes_filter.is_empty() {
                "Notes".to_string()
            } else {
                format!("Notes ({})", s.forms.notes_filter)
            };
            let rows = s.notes.iter().map(|n| format!("{}  {}", n.display_title(), n.preview())).collect();
            draw_list(f, area, rows, cur.sel, titled(title), "No notes yet. Press n to add one.", pal);
        }
        Page::Courses => {
            let rows = s
                .courses
                .iter()
                .map(|c| format!("{:<10} {}  {}", c.code, c.name, c.description.as_deref().unwrap_or("")))
                .collect();
            draw_list(f, area, rows, cur.sel, block, "No courses yet. Press n to add one.", pal);
        }
        Page::Flashcards => {
            let rows = s
                .flashcards
                .iter()
                .map(|c| {
                    let due = c.next_review.as_deref().unwrap_or("-");
                    format!("[{}] {}  (reviews {}, due {})", c.difficulty.label(), c.front, c.review_count, due)
                })
                .collect();
            draw_list(f, area, rows, cur.sel, block, "No flashcards yet. Press n to add one.", pal);
        }
        Page::Assistant => draw_assistant(f, area, s, block, pal),
        Page::ExamPredictor => draw_exam(f, area, s, cur, titled("Course".to_string()), pal),
        Page::Partners => {
            let (title, rows): (&str, Vec<String>) = match &s.partners {
                PartnerView::Existing(v) => (
                    "My partners",
                    v.iter()
                        .map(|p| format!("{}  {:.0}%  {}", p.partner_email, p.match_score, p.status))
                        .collect(),
                ),
                PartnerView::Candidates(v) => (
                    "Suggested partners",
                    v.iter()
                        .map(|p| {
                            format!("{}  {:.0}% match  {} shared courses", p.email, p.match_score, p.shared_courses)
                        })
                        .collect(),
                ),
            };
            draw_list(f, area, rows, cur.sel, titled(title.to_string()), "Nobody here yet. Press f to find partners.", pal);
        }
        Page::Achievements => {
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(3), Constraint::Length(if s.achievement_stats.is_some() { 6 } else { 0 })])
                .split(area);
            let rows = s.achievements.iter().map(|a| format!("{}  {}", a.earned_on(), a.description)).collect();
            draw_list(f, parts[0], rows, cur.sel, block, "No achievements yet. Keep studying!", pal);
            if let Some(st) = &s.achievement_stats {
                let mut lines = vec![Line::from(format!(
                    "notes {}  flashcards {}  active days {}  badges {}",
                    st.notes_count, st.flashcards_count, st.active_days_week, st.total_achievements
                ))];
                lines.extend(st.progress.iter().map(|(k, v)| Line::from(format!("{k}: {v}"))));
                let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Progress"));
                f.render_widget(p, parts[1]);
            }
        }
    }
}

fn draw_list(f: &mut Frame, area: Rect, rows: Vec<String>, sel: usize, block: Block, empty: &str, pal: &Palette) {
    if rows.is_empty() {
        let p = Paragraph::new(empty).style(pal.hint()).wrap(Wrap { trim: true }).block(block);
        f.render_widget(p, area);
        return;
    }
    let items: Vec<_> = rows.into_iter().map(ListItem::new).collect();
    let list = List::new(items).block(block).highlight_style(pal.selected()).highlight_symbol("> ");
    let mut st = ListState::default();
    st.select(Some(sel));
    f.render_stateful_widget(list, area, &mut st);
}

fn draw_dashboard(f: &mut Frame, area: Rect, s: &AppState, block: Block, pal: &Palette) {
    let Some(dash) = &s.dashboard else {
        f.render_widget(Paragraph::new("Loading...").style(pal.hint()).block(block), area);
        return;
    };
    let inner = block.inner(area);
    f.render_widget(block, area);
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(3)])
        .split(inner);

    let st = &dash.stats;
    let lines = vec![
        Line::from(format!("Notes            {}", st.notes_count)),
        Line::from(format!("Flashcards       {}", st.flashcards_count)),
        Line::from(format!("Due for review   {}", st.due_flashcards)),
        Line::from(format!("Study this week  {} min", st.total_study_time_week)),
        Line::from(format!("Active days      {}", st.days_active_week)),
    ];
    f.render_widget(Paragraph::new(lines), parts[0]);

    let labels: Vec<String> = dash.series.iter().map(|d| d.date.format("%m-%d").to_string()).collect();
    let data: Vec<(&str, u64)> =
        labels.iter().zip(&dash.series).map(|(l, d)| (l.as_str(), u64::from(d.study_time))).collect();
    let chart = BarChart::default()
        .block(Block::default().title("Minutes studied, last 7 days"))
        .data(data.as_slice())
        .bar_width(6)
        .bar_gap(1)
        .bar_style(pal.title());
    f.render_widget(chart, parts[1]);
}

fn draw_assistant(f: &mut Frame, area: Rect, s: &AppState, block: Block, pal: &Palette) {
    let inner = block.inner(area);
    f.render_widget(block, area);
    let hits_height = if s.search_hits.is_empty() { 0 } else { (s.search_hits.len() as u16 + 2).min(8) };
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(hits_height), Constraint::Length(3)])
        .split(inner);

    let lines: Vec<Line> = s
        .chat
        .iter()
        .map(|e| {
            let (who, style) = match e.role {
                ChatRole::You => ("You: ", pal.title()),
                ChatRole::Ai => ("AI: ", pal.selected()),
                ChatRole::Error => ("Error: ", pal.banner(studysync_core::BannerKind::Error)),
            };
            Line::from(vec![Span::styled(who, style), Span::raw(e.text.clone())])
        })
        .collect();
    let scroll = (lines.len() as u16).saturating_sub(parts[0].height);
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }).scroll((scroll, 0)), parts[0]);

    if !s.search_hits.is_empty() {
        let items: Vec<_> = s
            .search_hits
            .iter()
            .map(|h| ListItem::new(format!("#{} {}  {}", h.note_id, h.title, h.course_name.as_deref().unwrap_or(""))))
            .collect();
        f.render_widget(List::new(items).block(Block::default().borders(Borders::TOP).title("Search results")), parts[1]);
    }

    let input = Paragraph::new(s.forms.chat_input.as_str())
        .block(Block::default().borders(Borders::ALL).title("Ask a question (Enter) or search notes (Ctrl+S)"));
    f.render_widget(input, parts[2]);
}

fn draw_exam(f: &mut Frame, area: Rect, s: &AppState, cur: &Cursor, block: Block, pal: &Palette) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);
    let rows = s.courses.iter().map(|c| c.label()).collect();
    draw_list(f, cols[0], rows, cur.sel, block, "Add a course first.", pal);

    let title = if s.forms.exam_course.is_empty() {
        "Predictions".to_string()
    } else {
        format!("Predictions for {}", s.forms.exam_course)
    };
    let lines: Vec<Line> = if s.predictions.is_empty() {
        vec![Line::from("Select a course and press Enter to analyze.").style(pal.hint())]
    } else {
        s.predictions
            .iter()
            .map(|p| {
                let conf = p.confidence_percent().map(|v| format!("{v}%")).unwrap_or_else(|| "-".into());
                Line::from(format!(
                    "{}  [{}]  {}",
                    p.topic.as_deref().unwrap_or("(untitled)"),
                    p.difficulty_label(),
                    conf
                ))
            })
            .collect()
    };
    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(p, cols[1]);
}

fn draw_banner(f: &mut Frame, area: Rect, s: &AppState, pal: &Palette) {
    if let Some(b) = &s.banner {
        f.render_widget(Paragraph::new(format!(" {}", b.text)).style(pal.banner(b.kind)), area);
    }
}

fn draw_footer(f: &mut Frame, area: Rect, s: &AppState, cur: &Cursor, pal: &Palette) {
    let hint = if cur.confirm_delete.is_some() {
        " Delete this note? y=yes, any other key=cancel "
    } else if s.review.is_some() {
        " space reveal  y correct  n incorrect  Esc stop "
    } else if s.modal.is_some() {
        " Tab/↑↓ field  ←/→ choose  Enter save  Esc close "
    } else {
        match s.page {
            Page::Dashboard => " Tab page  l log study  r review  t theme  g reload  L logout  q quit ",
            Page::Notes => " ↑↓ select  Enter view  n new  e edit  d delete  s summarize  a all courses ",
            Page::Courses => " ↑↓ select  Enter show notes  n new course ",
            Page::Flashcards => " n new card  r start review ",
            Page::Assistant => " type to ask  Enter send  Ctrl+S search  Tab page  Esc clear banner ",
            Page::ExamPredictor => " ↑↓ course  Enter analyze  v view saved predictions ",
            Page::Partners => " f find partners  m my partners  Enter request selected ",
            Page::Achievements => " p progress ",
        }
    };
    f.render_widget(Paragraph::new(hint).style(pal.footer()), area);
}

fn draw_auth(f: &mut Frame, area: Rect, s: &AppState, cur: &Cursor, pal: &Palette) {
    let rect = centered(area, 50, 14);
    f.render_widget(Clear, rect);
    let block = Block::default().borders(Borders::ALL).title(Span::styled(" StudySync ", pal.title()));
    let inner = block.inner(rect);
    f.render_widget(block, rect);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(6), Constraint::Length(2), Constraint::Min(1)])
        .split(inner);

    let tab = match s.auth_tab {
        AuthTab::Login => 0,
        AuthTab::Register => 1,
    };
    let tabs = Tabs::new(vec!["Login", "Register"]).select(tab).highlight_style(pal.selected());
    f.render_widget(tabs, rows[0]);

    draw_fields(f, rows[1], s, AUTH_FIELDS, cur.field, pal);

    if let Some(b) = &s.banner {
        let p = Paragraph::new(b.text.as_str()).style(pal.banner(b.kind)).wrap(Wrap { trim: true });
        f.render_widget(p, rows[2]);
    }
    let hint = Paragraph::new("←/→ switch tab  Tab next field  Enter submit  Esc quit")
        .style(pal.hint())
        .alignment(Alignment::Center);
    f.render_widget(hint, rows[3]);
}

fn draw_fields(f: &mut Frame, area: Rect, s: &AppState, fields: &[Field], focus: usize, pal: &Palette) {
    let lines: Vec<Line> = fields
        .iter()
        .enumerate()
        .flat_map(|(i, field)| {
            let label_style = if i == focus { pal.selected() } else { pal.hint() };
            let value = field.display(s);
            let value = if field.is_picker() { format!("◀ {value} ▶") } else { value };
            let caret = if i == focus && !field.is_picker() { "_" } else { "" };
            [
                Line::from(Span::styled(field.label(), label_style)),
                Line::from(format!("  {value}{caret}")),
            ]
        })
        .collect();
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn draw_modal(f: &mut Frame, area: Rect, s: &AppState, modal: Modal, cur: &Cursor, pal: &Palette) {
    let rect = centered(area, 70, 20);
    f.render_widget(Clear, rect);
    let title = match modal {
        Modal::CreateNote => "New note",
        Modal::EditNote(_) => "Edit note",
        Modal::ViewNote(_) => "Note",
        Modal::NoteSummary => "Summary",
        Modal::CreateCourse => "New course",
        Modal::CreateFlashcard => "New flashcard",
        Modal::StudyLog => "Log study time",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(format!(" {title} "), pal.title()))
        .style(pal.base());
    let inner = block.inner(rect);
    f.render_widget(block, rect);

    match modal {
        Modal::ViewNote(id) => {
            let lines = match s.note(id) {
                Some(n) => vec![
                    Line::from(Span::styled(n.display_title().to_string(), pal.title())),
                    Line::from(""),
                    Line::from(n.content.clone().unwrap_or_default()),
                    Line::from(""),
                    Line::from("e edit  d delete  s summarize  Esc close").style(pal.hint()),
                ],
                None => vec![Line::from("Note not found")],
            };
            f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
        }
        Modal::NoteSummary => {
            let mut lines = Vec::new();
            if let Some(sum) = &s.summary {
                lines.push(Line::from(Span::styled(sum.title.clone(), pal.title())));
                lines.push(Line::from(sum.text.clone()));
                lines.push(Line::from(""));
                lines.extend(sum.key_points.iter().map(|p| Line::from(format!("• {p}"))));
                lines.push(Line::from(""));
                lines.push(
                    Line::from(format!("{} words, ~{} min read", sum.word_count, sum.estimated_read_time))
                        .style(pal.hint()),
                );
            }
            f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
        }
        form => draw_fields(f, inner, s, modal_fields(form), cur.field, pal),
    }
}

fn draw_review(f: &mut Frame, area: Rect, review: &ReviewSession, pal: &Palette) {
    let rect = centered(area, 70, 14);
    f.render_widget(Clear, rect);
    let (pos, total) = review.progress();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(format!(" Review [{pos}/{total}] "), pal.title()))
        .style(pal.base());
    let inner = block.inner(rect);
    f.render_widget(block, rect);

    let Some(card) = review.current() else { return };
    let mut lines = vec![Line::from(vec![Span::styled("Q: ", pal.title()), Span::raw(card.front.clone())])];
    if review.revealed {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![Span::styled("A: ", pal.title()), Span::raw(card.back.clone())]));
        lines.push(Line::from(""));
        lines.push(Line::from("Did you get it right? y / n").style(pal.hint()));
    } else {
        lines.push(Line::from(""));
        lines.push(Line::from("space to show the answer").style(pal.hint()));
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect { x: area.x + (area.width - w) / 2, y: area.y + (area.height - h) / 2, width: w, height: h }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use studysync_core::{Banner, Course, PartnerCandidate, Theme, User};

    fn signed_in() -> AppState {
        let mut s = AppState::new(Theme::Dark);
        s.user = Some(User { user_id: 5, email: "a@b.com".into(), profile_data: None });
        s
    }

    fn render(s: &AppState, cur: &Cursor) -> String {
        let mut term = Terminal::new(TestBackend::new(100, 30)).unwrap();
        term.draw(|f| draw_ui(f, s, cur)).unwrap();
        let buf = term.backend().buffer().clone();
        buf.content.iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn auth_screen_shows_tabs_and_banner() {
        let mut s = AppState::new(Theme::Light);
        s.banner = Some(Banner::error("Invalid email or password"));
        let out = render(&s, &Cursor::default());
        assert!(out.contains("Register"));
        assert!(out.contains("Invalid email or password"));
    }

    #[test]
    fn sidebar_lists_every_page() {
        let s = signed_in();
        let out = render(&s, &Cursor::default());
        for p in Page::ALL {
            assert!(out.contains(p.title()), "{p}");
        }
    }

    #[test]
    fn courses_page_lists_codes() {
        let mut s = signed_in();
        s.page = Page::Courses;
        s.courses = vec![Course { id: 1, code: "CS101".into(), name: "Intro".into(), description: None }];
        let out = render(&s, &Cursor::default());
        assert!(out.contains("CS101"));
    }

    #[test]
    fn partner_scores_render_as_sent() {
        let mut s = signed_in();
        s.page = Page::Partners;
        s.partners = PartnerView::Candidates(vec![PartnerCandidate {
            user_id: 9,
            email: "c@d.com".into(),
            match_score: 50.0,
            shared_courses: 2,
            status: None,
        }]);
        let out = render(&s, &Cursor::default());
        assert!(out.contains("50% match"));
        assert!(!out.contains("5000%"));
    }

    #[test]
    fn row_count_tracks_partner_view() {
        let mut s = signed_in();
        s.partners = PartnerView::Candidates(vec![]);
        assert_eq!(row_count(&s, Page::Partners), 0);
        assert_eq!(row_count(&s, Page::Dashboard), 0);
    }

    #[test]
    fn centered_fits_small_terminals() {
        let r = centered(Rect::new(0, 0, 30, 10), 50, 14);
        assert_eq!((r.width, r.height), (30, 10));
    }
}
