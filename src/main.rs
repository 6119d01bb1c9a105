use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{EnvFilter, fmt};

use podpick::{
    NoopReporter, ProgressEvent, ProgressReporter, ReqwestClient, SessionOptions, SessionOutcome,
    SharedProgressReporter, TermConsole, run_session,
};

// Emoji with fallback for terminals without Unicode support
static MICROPHONE: Emoji<'_, '_> = Emoji("🎙️  ", "");
static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[~] ");
static HEADPHONES: Emoji<'_, '_> = Emoji("🎧 ", "[i] ");
static DOWNLOAD: Emoji<'_, '_> = Emoji("📥 ", "[v] ");
static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "");

/// Pick episodes from a podcast feed and download them
#[derive(Parser, Debug)]
#[command(name = "podpick")]
#[command(about = "Pick episodes from a podcast RSS feed and download them")]
#[command(version)]
struct Args {
    /// RSS feed URL or path to local RSS file (asked for when omitted)
    feed: Option<String>,

    /// Directory episodes are downloaded into
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Quiet mode - suppress download progress output
    #[arg(short, long)]
    quiet: bool,

    /// Verbose mode - log debug information to stderr
    #[arg(short, long)]
    verbose: bool,
}

/// Progress reporter drawing one indicatif bar per running download
struct IndicatifReporter {
    feed_spinner: Mutex<Option<ProgressBar>>,
    download_bar: Mutex<Option<ProgressBar>>,
}

impl IndicatifReporter {
    fn new() -> Self {
        Self {
            feed_spinner: Mutex::new(None),
            download_bar: Mutex::new(None),
        }
    }

    fn start_download_bar(&self, content_length: Option<u64>, message: String) {
        let bar = match content_length {
            Some(length) => {
                let style = ProgressStyle::default_bar()
                    .template(&format!(
                        "  {DOWNLOAD}{{wide_msg}} [{{bar:30.cyan/blue}}] {{percent:>3}}%"
                    ))
                    .unwrap()
                    .progress_chars("█▓░");
                let bar = ProgressBar::new(length);
                bar.set_style(style);
                bar
            }
            None => {
                let style = ProgressStyle::default_spinner()
                    .template(&format!("  {DOWNLOAD}{{spinner:.green}} {{wide_msg}} {{bytes}}"))
                    .unwrap();
                let bar = ProgressBar::new_spinner();
                bar.set_style(style);
                bar
            }
        };
        bar.set_message(message);

        *self.download_bar.lock().unwrap() = Some(bar);
    }

    fn clear_download_bar(&self) {
        if let Some(bar) = self.download_bar.lock().unwrap().take() {
            bar.finish_and_clear();
        }
    }
}

impl ProgressReporter for IndicatifReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::FetchingFeed { source } => {
                let spinner = ProgressBar::new_spinner();
                spinner.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.green} {wide_msg}")
                        .unwrap(),
                );
                spinner.enable_steady_tick(std::time::Duration::from_millis(100));
                spinner.set_message(format!("{SEARCH}Fetching feed: {}", source.cyan()));
                *self.feed_spinner.lock().unwrap() = Some(spinner);
            }

            ProgressEvent::FeedLoaded {
                podcast_title,
                total_episodes,
            } => {
                if let Some(spinner) = self.feed_spinner.lock().unwrap().take() {
                    spinner.finish_and_clear();
                }
                println!(
                    "{HEADPHONES}{} • {} episodes\n",
                    podcast_title.bold().green(),
                    total_episodes.to_string().cyan()
                );
            }

            ProgressEvent::FeedFailed { .. } => {
                if let Some(spinner) = self.feed_spinner.lock().unwrap().take() {
                    spinner.finish_and_clear();
                }
            }

            ProgressEvent::DownloadStarting {
                filename,
                position,
                total_selected,
                content_length,
            } => {
                self.start_download_bar(
                    content_length,
                    format!(
                        "[{} of {}] {}",
                        position.to_string().cyan(),
                        total_selected.to_string().cyan(),
                        filename
                    ),
                );
            }

            ProgressEvent::DownloadProgress {
                bytes_downloaded, ..
            } => {
                if let Some(bar) = self.download_bar.lock().unwrap().as_ref() {
                    bar.set_position(bytes_downloaded);
                }
            }

            // The session prints the completion line itself
            ProgressEvent::DownloadCompleted { .. } => self.clear_download_bar(),

            ProgressEvent::DownloadFailed { filename, .. } => {
                if let Some(bar) = self.download_bar.lock().unwrap().take() {
                    bar.abandon_with_message(format!("{} {}", filename, "failed".red()));
                }
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    println!(
        "\n{}{} {}\n",
        MICROPHONE,
        "podpick".bold().magenta(),
        "- Podcast Episode Picker".dimmed()
    );

    let client = ReqwestClient::new().context("Failed to create HTTP client")?;
    let mut console = TermConsole::stdout();

    let options = SessionOptions {
        output_dir: args.output_dir.clone(),
    };

    let reporter: SharedProgressReporter = if args.quiet {
        NoopReporter::shared()
    } else {
        Arc::new(IndicatifReporter::new())
    };

    let outcome = run_session(
        &client,
        &mut console,
        args.feed.as_deref(),
        &options,
        reporter,
    )
    .await
    .context("Failed to download podcast episodes")?;

    if !args.quiet && matches!(outcome, SessionOutcome::Completed(_)) {
        println!(
            "\n{FOLDER}Output: {}\n",
            args.output_dir.display().to_string().cyan()
        );
    }

    Ok(())
}
