mod app;
mod audio;
mod command;
mod config;
mod error;
mod library;
mod pad;
mod session;
mod status;
mod transport;
mod ui;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Env, Target};

use app::App;
use config::{Overrides, Settings};
use ui::Theme;

/// Taptrap - terminal sample pad with mic recording
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file (defaults to ~/.taptrap/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tempo used for the count-in and auto-stop
    #[arg(long)]
    bpm: Option<f32>,

    /// Beats to record before stopping automatically (0 = manual stop)
    #[arg(long)]
    record_beats: Option<u32>,

    /// Number of pad columns
    #[arg(long)]
    width: Option<usize>,

    /// Number of pad rows
    #[arg(long)]
    height: Option<usize>,

    /// Theme to use for the interface
    #[arg(long)]
    theme: Option<String>,

    /// List available themes and exit
    #[arg(long)]
    list_themes: bool,

    /// Log file (defaults to ~/.taptrap/taptrap.log)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            grid_width: self.width,
            grid_height: self.height,
            bpm: self.bpm,
            record_beats: self.record_beats,
            theme: self.theme.clone(),
            log_file: self.log_file.clone(),
        }
    }
}

/// Route `log` output to a file; the terminal belongs to the TUI
fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.list_themes {
        println!("Available themes:");
        for theme in Theme::available_themes() {
            println!("  {}", theme);
        }
        return Ok(());
    }

    let mut settings = Settings::load_or_default(args.config.as_deref())?;
    settings.apply_overrides(args.overrides());
    settings.validate()?;

    let log_path = settings
        .log_file
        .clone()
        .unwrap_or_else(|| library::taptrap_home().join("taptrap.log"));
    init_logging(&log_path)?;
    log::info!(
        "starting taptrap {} ({}x{} pads, {} bpm)",
        env!("CARGO_PKG_VERSION"),
        settings.grid_width,
        settings.grid_height,
        settings.bpm
    );

    if let Err(e) = library::ensure_library_dir() {
        log::warn!("could not create sound library: {}", e);
    }

    let theme = Theme::from_name(&settings.theme).unwrap_or_else(|| {
        eprintln!(
            "Warning: Unknown theme '{}', using default. Use --list-themes to see available themes.",
            settings.theme
        );
        Theme::default()
    });

    let mut app = App::new(&settings, theme)?;
    app.run()
}
