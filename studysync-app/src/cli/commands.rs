use crate::cli::opts::*;

use anyhow::{anyhow, bail, Result};
use std::io::{stdin, stdout, BufRead, Write};
use std::sync::Arc;
use studysync_core::{
    ChatRole, Controller, Difficulty, HttpApi, Modal, Page, PartnerView, ViewState,
};
use studysync_prefs::JsonPrefs;
use tracing::debug;

/// Client, preferences and controller wired together for one process.
pub struct Session {
    pub api: Arc<HttpApi>,
    pub prefs: Arc<JsonPrefs>,
    pub controller: Controller,
}

impl Session {
    pub fn open(args: &Cli) -> Result<Self> {
        let prefs = match &args.prefs {
            Some(p) => JsonPrefs::open_at(p.clone())?,
            None => JsonPrefs::open_default()?,
        };
        let prefs = Arc::new(prefs);
        let api = Arc::new(HttpApi::new(&args.base_url)?);
        if let Some(cookie) = prefs.session_cookie() {
            debug!(base_url = api.base_url(), "restoring saved session cookie");
            api.restore_session(&cookie);
        }
        let controller = Controller::new(api.clone(), prefs.clone());
        Ok(Self { api, prefs, controller })
    }

    /// Save the jar's cookie for the next invocation, or forget it.
    pub fn persist(&self, forget: bool) -> Result<()> {
        let cookie = if forget { None } else { self.api.session_cookie() };
        self.prefs.set_session_cookie(cookie)?;
        Ok(())
    }
}

pub async fn run_cli(args: Cli) -> Result<()> {
    let session = Session::open(&args)?;
    let forget = matches!(args.cmd, Command::Logout);
    let res = dispatch(&session.controller, args.cmd).await;
    session.controller.flush_reviews().await;
    session.persist(forget)?;
    res
}

async fn dispatch(c: &Controller, cmd: Command) -> Result<()> {
    match cmd {
        Command::Login(creds) => login_cmd(c, creds).await,
        Command::Register(creds) => register_cmd(c, creds).await,
        Command::Logout => {
            c.start().await;
            c.logout().await;
            println!("logged out");
            Ok(())
        }
        Command::Whoami => {
            require_session(c).await?;
            if let Some(u) = c.with_state(|s| s.user.clone()) {
                println!("{}\t{}", u.user_id, u.email);
            }
            Ok(())
        }
        Command::Stats => stats_cmd(c).await,
        Command::Course(cmd) => course_cmd(c, cmd).await,
        Command::Note(cmd) => note_cmd(c, cmd).await,
        Command::Card(cmd) => card_cmd(c, cmd).await,
        Command::Review => review_cmd(c).await,
        Command::Ask { question } => ask_cmd(c, question.join(" ")).await,
        Command::Search { query } => search_cmd(c, query.join(" ")).await,
        Command::Study(StudyCmd::Log { minutes, topics }) => {
            require_session(c).await?;
            c.update(|s| {
                s.forms.study_log.minutes = minutes.to_string();
                s.forms.study_log.topics = topics;
            });
            c.submit_study_log().await;
            report(c)
        }
        Command::Partners(cmd) => partners_cmd(c, cmd).await,
        Command::Achievements { progress } => achievements_cmd(c, progress).await,
        Command::Exam(cmd) => exam_cmd(c, cmd).await,
        Command::Theme(cmd) => {
            if let ThemeCmd::Toggle = cmd {
                c.toggle_theme();
                report(c)?;
            }
            println!("{}", c.with_state(|s| s.theme));
            Ok(())
        }
        Command::Tui => bail!("the TUI is launched from main"),
    }
}

async fn login_cmd(c: &Controller, creds: Credentials) -> Result<()> {
    let password = match creds.password {
        Some(p) => p,
        None => read_line("password: ")?.trim_end_matches(['\r', '\n']).to_string(),
    };
    c.update(|s| {
        s.forms.login.email = creds.email;
        s.forms.login.password = password;
    });
    c.login().await;
    report(c)?;
    if let Some(u) = c.with_state(|s| s.user.clone()) {
        println!("signed in as {} (id {})", u.email, u.user_id);
    }
    Ok(())
}

async fn register_cmd(c: &Controller, creds: Credentials) -> Result<()> {
    let password = match creds.password {
        Some(p) => p,
        None => read_line("choose a password: ")?.trim_end_matches(['\r', '\n']).to_string(),
    };
    c.update(|s| {
        s.forms.register.email = creds.email;
        s.forms.register.password = password;
    });
    c.register().await;
    report(c)
}

async fn stats_cmd(c: &Controller) -> Result<()> {
    require_session(c).await?;
    let Some(dash) = c.with_state(|s| s.dashboard.clone()) else {
        return report(c);
    };
    let st = &dash.stats;
    println!("notes\t{}", st.notes_count);
    println!("flashcards\t{}", st.flashcards_count);
    println!("due\t{}", st.due_flashcards);
    println!("minutes this week\t{}", st.total_study_time_week);
    println!("active days\t{}", st.days_active_week);
    if !dash.series.is_empty() {
        println!();
        for d in &dash.series {
            let bar = "#".repeat((d.study_time / 10) as usize);
            println!("{}\t{:>4} min\t{}", d.date.format("%a %m-%d"), d.study_time, bar);
        }
    }
    Ok(())
}

async fn course_cmd(c: &Controller, cmd: CourseCmd) -> Result<()> {
    require_session(c).await?;
    match cmd {
        CourseCmd::List => {
            c.navigate(Page::Courses).await;
            report(c)?;
            for co in c.with_state(|s| s.courses.clone()) {
                println!("{}\t{}\t{}\t{}", co.id, co.code, co.name, co.description.unwrap_or_default());
            }
        }
        CourseCmd::Add { name, code, description } => {
            c.update(|s| {
                s.forms.course.name = name;
                s.forms.course.code = code;
                s.forms.course.description = description;
            });
            c.save_course().await;
            report(c)?;
        }
        CourseCmd::Show { course_id } => {
            let co = c
                .api()
                .get_course(course_id)
                .await
                .map_err(|e| anyhow!(e.user_message("Course not found")))?;
            println!("{}\t{}", co.code, co.name);
            if let Some(desc) = co.description.filter(|d| !d.is_empty()) {
                println!("{desc}");
            }
        }
    }
    Ok(())
}

async fn note_cmd(c: &Controller, cmd: NoteCmd) -> Result<()> {
    require_session(c).await?;
    match cmd {
        NoteCmd::List { course } => {
            match course {
                Some(code) => c.filter_notes_by_course(&code).await,
                None => c.navigate(Page::Notes).await,
            }
            report(c)?;
            for n in c.with_state(|s| s.notes.clone()) {
                let course = n.course_id.map(|id| id.to_string()).unwrap_or_else(|| "-".into());
                println!("{}\tcourse={}\t{}", n.id, course, n.display_title());
            }
        }
        NoteCmd::Add(a) => {
            c.update(|s| {
                s.forms.note.course_code = a.course;
                s.forms.note.title = a.title;
                s.forms.note.content = a.content;
                s.modal = Some(Modal::CreateNote);
            });
            c.save_note().await;
            report(c)?;
        }
        NoteCmd::Show { note_id } => {
            c.navigate(Page::Notes).await;
            c.view_note(note_id);
            report(c)?;
            if let Some(n) = c.with_state(|s| s.note(note_id).cloned()) {
                println!("{}\n", n.display_title());
                println!("{}", n.content.unwrap_or_default());
            }
        }
        NoteCmd::Edit(e) => {
            c.navigate(Page::Notes).await;
            c.edit_note(e.note_id);
            report(c)?;
            c.update(|s| {
                if let Some(t) = e.title {
                    s.forms.note.title = t;
                }
                if let Some(body) = e.content {
                    s.forms.note.content = body;
                }
            });
            c.update_note().await;
            report(c)?;
        }
        NoteCmd::Rm { note_id } => {
            c.delete_note(note_id).await;
            report(c)?;
        }
        NoteCmd::Summarize { note_id } => {
            c.summarize_note(note_id).await;
            report(c)?;
            if let Some(sum) = c.with_state(|s| s.summary.clone()) {
                println!("{}", sum.title);
                println!("{}", sum.text);
                for p in &sum.key_points {
                    println!("  - {p}");
                }
                println!("{} words, ~{} min read", sum.word_count, sum.estimated_read_time);
            }
        }
    }
    Ok(())
}

async fn card_cmd(c: &Controller, cmd: CardCmd) -> Result<()> {
    require_session(c).await?;
    match cmd {
        CardCmd::List => {
            c.navigate(Page::Flashcards).await;
            report(c)?;
            for f in c.with_state(|s| s.flashcards.clone()) {
                let due = f.next_review.as_deref().unwrap_or("-");
                println!("{}\t{}\t{}\t{}\tdue={}", f.id, f.difficulty.label(), f.front, f.back, due);
            }
        }
        CardCmd::Add(a) => {
            let difficulty: Difficulty = a.difficulty.parse().map_err(|e: String| anyhow!(e))?;
            c.update(|s| {
                s.forms.flashcard.note_id = Some(a.note);
                s.forms.flashcard.front = a.front;
                s.forms.flashcard.back = a.back;
                s.forms.flashcard.difficulty = difficulty;
            });
            c.save_flashcard().await;
            report(c)?;
        }
    }
    Ok(())
}

async fn review_cmd(c: &Controller) -> Result<()> {
    require_session(c).await?;
    c.start_review().await;
    if c.with_state(|s| s.review.is_none()) {
        return report(c);
    }

    let mut count = 0usize;
    loop {
        let Some((card, (pos, total))) =
            c.with_state(|s| s.review.as_ref().and_then(|r| Some((r.current()?.clone(), r.progress()))))
        else {
            break;
        };
        println!("\n[{pos}/{total}] {}", card.difficulty.label());
        println!("Q: {}", card.front);
        prompt_enter("[enter=show]")?;
        c.reveal_answer();
        println!("A: {}", card.back);
        println!("[y=correct, n=incorrect, q=quit]");
        let correct = loop {
            let line = read_line("result> ")?;
            match line.trim().to_lowercase().as_str() {
                "y" | "yes" | "1" => break true,
                "n" | "no" | "0" => break false,
                "q" | "quit" => {
                    c.abandon_review();
                    println!("\nreviewed {count}");
                    return Ok(());
                }
                _ => println!("enter y, n, or q"),
            }
        };
        c.answer(correct).await;
        count += 1;
    }

    report(c)?;
    println!("reviewed {count}");
    Ok(())
}

async fn ask_cmd(c: &Controller, question: String) -> Result<()> {
    require_session(c).await?;
    c.update(|s| s.forms.chat_input = question);
    c.send_message().await;
    match c.with_state(|s| s.chat.last().cloned()) {
        Some(e) if e.role == ChatRole::Error => bail!(e.text),
        Some(e) => println!("{}", e.text),
        None => {}
    }
    Ok(())
}

async fn search_cmd(c: &Controller, query: String) -> Result<()> {
    require_session(c).await?;
    c.update(|s| s.forms.search_query = query);
    c.search_notes().await;
    report(c)?;
    for h in c.with_state(|s| s.search_hits.clone()) {
        let course = h.course_name.unwrap_or_default();
        println!("{}\t{}\t{}", h.note_id, h.title, course);
    }
    Ok(())
}

async fn partners_cmd(c: &Controller, cmd: PartnersCmd) -> Result<()> {
    require_session(c).await?;
    match cmd {
        PartnersCmd::List => {
            c.navigate(Page::Partners).await;
        }
        PartnersCmd::Find => {
            c.navigate(Page::Partners).await;
            c.find_partners().await;
        }
        PartnersCmd::Request { user_id } => {
            c.request_partnership(user_id).await;
        }
    }
    report(c)?;
    match c.with_state(|s| s.partners.clone()) {
        PartnerView::Existing(list) => {
            for p in list {
                println!("{}\t{:.0}%\t{}", p.partner_email, p.match_score, p.status);
            }
        }
        PartnerView::Candidates(list) => {
            for p in list {
                println!(
                    "{}\t{}\t{:.0}%\tshared courses={}",
                    p.user_id,
                    p.email,
                    p.match_score,
                    p.shared_courses
                );
            }
        }
    }
    Ok(())
}

async fn achievements_cmd(c: &Controller, progress: bool) -> Result<()> {
    require_session(c).await?;
    c.navigate(Page::Achievements).await;
    report(c)?;
    let list = c.with_state(|s| s.achievements.clone());
    if list.is_empty() {
        println!("no achievements yet");
    }
    for a in list {
        println!("{}\t{}", a.earned_on(), a.description);
    }
    if progress {
        c.load_achievement_progress().await;
        report(c)?;
        if let Some(st) = c.with_state(|s| s.achievement_stats.clone()) {
            println!();
            println!("notes\t{}", st.notes_count);
            println!("flashcards\t{}", st.flashcards_count);
            println!("active days\t{}", st.active_days_week);
            for (k, v) in &st.progress {
                println!("{k}\t{v}");
            }
        }
    }
    Ok(())
}

async fn exam_cmd(c: &Controller, cmd: ExamCmd) -> Result<()> {
    require_session(c).await?;
    c.navigate(Page::ExamPredictor).await;
    match cmd {
        ExamCmd::Analyze { course } => {
            c.update(|s| s.forms.exam_course = course);
            c.analyze_exam().await;
        }
        ExamCmd::Show { course } => {
            c.update(|s| s.forms.exam_course = course);
            c.load_predictions().await;
        }
    }
    report(c)?;
    for p in c.with_state(|s| s.predictions.clone()) {
        let conf = p.confidence_percent().map(|v| format!("{v}%")).unwrap_or_else(|| "-".into());
        println!("{}\t{}\t{}", p.topic.as_deref().unwrap_or_default(), p.difficulty_label(), conf);
    }
    Ok(())
}

// ===== Helpers =====

/// Restore the saved session or fail with a hint to log in.
async fn require_session(c: &Controller) -> Result<()> {
    c.start().await;
    if let ViewState::Unauthenticated = c.view() {
        if let Some(b) = c.banner() {
            bail!(b.text);
        }
        bail!("not signed in; run `studysync login` first");
    }
    c.dismiss_banner();
    Ok(())
}

/// Print the controller's banner; an error banner becomes the command's error.
fn report(c: &Controller) -> Result<()> {
    let banner = c.banner();
    c.dismiss_banner();
    match banner {
        Some(b) if b.is_error() => bail!(b.text),
        Some(b) => println!("{}", b.text),
        None => {}
    }
    Ok(())
}

fn prompt_enter(label: &str) -> Result<()> {
    read_line(label).map(|_| ())
}

fn read_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    stdout().flush().ok();
    read_line_from(&mut stdin().lock())
}

/// One line of input; a closed stream is an error so prompt loops cannot spin.
fn read_line_from(input: &mut impl BufRead) -> Result<String> {
    let mut s = String::new();
    if input.read_line(&mut s)? == 0 {
        bail!("stdin closed");
    }
    Ok(s)
}
