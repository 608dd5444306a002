//! Anamnese CLI
//!
//! # Commands
//! - `anamnese submit --input <file>` - Generate the PDF anamnese and hand off to WhatsApp
//! - `anamnese preview [--input <file>]` - Print the intake page as text
//! - `anamnese format-phone <raw>` - Print a WhatsApp number with the mask applied

mod config;
mod intake;
mod navigator;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anamnese_core::form::page_outline;
use anamnese_core::{
    format_phone, DirectoryTarget, FormStore, IssuedAt, Navigator, PdfSink, Scheduler,
    SubmitController, SubmitState, ThreadScheduler, TimerOutcome,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use config::{Config, DEFAULT_CONFIG_FILE};
use navigator::BrowserNavigator;

/// Yeda Lash anamnese intake
#[derive(Parser)]
#[command(name = "anamnese")]
#[command(author, version, about = "Generate the lash procedure anamnese PDF")]
struct Cli {
    /// Log filter, e.g. `debug` (overrides the config file)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the anamnese PDF and open WhatsApp
    Submit {
        /// Filled-in intake (.json or .toml)
        #[arg(short, long)]
        input: PathBuf,

        /// Config file
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Directory for the PDF (overrides the config file)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Print the WhatsApp link instead of opening it
        #[arg(long)]
        no_open: bool,
    },

    /// Print the intake page, optionally filled from a file
    Preview {
        /// Filled-in intake (.json or .toml)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Apply the WhatsApp number mask
    FormatPhone {
        /// Raw number, any punctuation
        raw: String,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Submit {
            input,
            config,
            output_dir,
            no_open,
        } => {
            let config = Config::load(&config)?;
            init_logging(cli.log_level.as_deref().unwrap_or(&config.logging.level));

            let output_dir = output_dir.unwrap_or_else(|| config.output.directory.clone());
            let navigator = BrowserNavigator::new(config.handoff.open_browser && !no_open);
            let written = run_submit(&input, &output_dir, &ThreadScheduler, Arc::new(navigator))?;
            println!("Anamnese salva em {}", written.display());
        }
        Commands::Preview { input } => {
            init_logging(cli.log_level.as_deref().unwrap_or("warn"));
            println!("{}", render_preview(input.as_deref())?);
        }
        Commands::FormatPhone { raw } => {
            init_logging(cli.log_level.as_deref().unwrap_or("warn"));
            println!("{}", format_phone(&raw));
        }
    }

    Ok(())
}

/// The page as text, blank or filled from `input`.
fn render_preview(input: Option<&Path>) -> Result<String> {
    let store = match input {
        Some(path) => intake::load(path)?,
        None => FormStore::new(),
    };
    Ok(page_outline(&store.get(), SubmitState::Idle, &IssuedAt::now()))
}

/// Load the intake, write the PDF into `output_dir` and wait for the handoff.
/// Returns the path of the written PDF.
fn run_submit(
    input: &Path,
    output_dir: &Path,
    scheduler: &dyn Scheduler,
    navigator: Arc<dyn Navigator>,
) -> Result<PathBuf> {
    let store = intake::load(input)?;
    let record = store.get();

    let controller = SubmitController::new();
    let mut sink = PdfSink::new(DirectoryTarget::new(output_dir));
    let (submission, timer) = controller
        .submit_and_dispatch(&record, &IssuedAt::now(), &mut sink, scheduler, navigator)
        .context("Failed to generate anamnese")?;

    let written = sink
        .target()
        .written()
        .last()
        .cloned()
        .with_context(|| format!("{} was not written", submission.file_name))?;

    match timer.wait() {
        TimerOutcome::Fired => tracing::debug!("handoff done"),
        outcome => tracing::warn!(?outcome, "handoff did not run"),
    }

    Ok(written)
}
