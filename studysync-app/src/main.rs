mod cli;
pub mod tui;

use anyhow::Result;
use clap::Parser; // needed for Cli::parse()
use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use std::env;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::commands::{run_cli, Session};
use cli::opts::{Cli, Command};
use studysync_prefs::paths::default_log_file;
use tui::app::TuiApp;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Cli::parse();

    match &args.cmd {
        // Run TUI on its own runtime; logs go to a file so they don't tear the screen
        Command::Tui => {
            init_tracing(true)?;
            let rt = Arc::new(Runtime::new()?);
            let session = Session::open(&args)?;
            let mut app = TuiApp::new(session.controller.clone(), rt);
            let res = app.run();
            session.persist(false)?;
            res
        }
        // Everything else uses a single runtime here
        _ => {
            init_tracing(false)?;
            let rt = Runtime::new()?;
            rt.block_on(run_cli(args))
        }
    }
}

fn init_tracing(to_file: bool) -> Result<()> {
    let filter = EnvFilter::new(env::var("RUST_LOG").unwrap_or_else(|_| "studysync=info".into()));
    let registry = tracing_subscriber::registry().with(filter);
    if to_file {
        let path = default_log_file();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        registry
            .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}
