// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use tracing::debug;

use crate::catalog::{Catalog, OrderingMode};
use crate::console::Console;
use crate::episode::{
    DownloadContext, DownloadSummary, EpisodeOutcome, download_or_skip, prepare_output_dir,
};
use crate::error::SessionError;
use crate::feed::load_feed;
use crate::http::HttpClient;
use crate::progress::{ProgressEvent, SharedProgressReporter};
use crate::selection::{FilterCommand, SelectionCommand, parse_selection};

pub const FEED_PROMPT: &str = "Please enter podcast URL:";
pub const FILTER_PROMPT: &str =
    "Enter a word or phrase to filter episodes (or Enter to skip) (or \\ to reverse ordering):";
pub const SELECTION_PROMPT: &str = "Enter the episode number(s) you want to download (e.g., 1,3-5, or * for all) (or 'q' to quit):";

/// Options for an interactive session
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Directory episodes are written to and checked against
    pub output_dir: PathBuf,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
        }
    }
}

/// How a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The user quit at the selection prompt
    Quit,
    /// All selected episodes were downloaded or skipped
    Completed(DownloadSummary),
}

/// Run one interactive pick-and-download session
///
/// 1. Asks for the feed source unless one is given
/// 2. Loads the feed and lists it oldest first
/// 3. Applies the optional filter or reverse toggle
/// 4. Parses the selection and downloads it in order
pub async fn run_session<C: HttpClient, T: Console>(
    client: &C,
    console: &mut T,
    feed_source: Option<&str>,
    options: &SessionOptions,
    reporter: SharedProgressReporter,
) -> Result<SessionOutcome, SessionError> {
    let feed_source = match feed_source {
        Some(source) => source.to_string(),
        None => console.prompt(FEED_PROMPT)?.trim().to_string(),
    };

    reporter.report(ProgressEvent::FetchingFeed {
        source: feed_source.clone(),
    });
    let feed = match load_feed(client, &feed_source).await {
        Ok(feed) => feed,
        Err(e) => {
            reporter.report(ProgressEvent::FeedFailed {
                error: e.to_string(),
            });
            return Err(e.into());
        }
    };
    reporter.report(ProgressEvent::FeedLoaded {
        podcast_title: feed.title.clone(),
        total_episodes: feed.entries.len(),
    });

    console.print_line(&format!("Downloading episodes from {}...", feed.title))?;
    console.print_line("")?;

    let mut catalog = Catalog::build(&feed, OrderingMode::Chronological);
    print_catalog(console, &catalog)?;

    match FilterCommand::parse(&console.prompt(FILTER_PROMPT)?) {
        FilterCommand::Keep => {}
        FilterCommand::Reverse => {
            catalog = Catalog::build(&feed, OrderingMode::ReverseNative);
            print_catalog(console, &catalog)?;
        }
        FilterCommand::Phrase(phrase) => {
            catalog = catalog.filter(&phrase);
            debug!(phrase = %phrase, matches = catalog.len(), "filtered catalog");

            console.print_line("")?;
            console.print_line(&format!("Filtered episodes with '{phrase}':"))?;
            console.print_line("")?;
            print_listing(console, &catalog)?;
        }
    }

    let selection = match parse_selection(&console.prompt(SELECTION_PROMPT)?, catalog.len()) {
        SelectionCommand::Quit => {
            console.print_line("Quitting...")?;
            return Ok(SessionOutcome::Quit);
        }
        SelectionCommand::Download(selection) => selection,
    };

    for rejected in &selection.rejected {
        console.print_line(&rejected.to_string())?;
    }
    debug!(indices = ?selection.indices, "selection parsed");

    let summary = download_all(
        client,
        console,
        &catalog,
        &selection.indices,
        options,
        &reporter,
    )
    .await?;

    console.print_line("")?;
    console.print_line(&format!(
        "Downloaded {} episode(s), skipped {}.",
        summary.downloaded, summary.skipped
    ))?;
    console.print_line("Download complete!")?;

    Ok(SessionOutcome::Completed(summary))
}

/// Process the selected catalog entries strictly in order
///
/// The first failing download ends the run; episodes after it are not
/// attempted.
async fn download_all<C: HttpClient, T: Console>(
    client: &C,
    console: &mut T,
    catalog: &Catalog,
    indices: &[usize],
    options: &SessionOptions,
    reporter: &SharedProgressReporter,
) -> Result<DownloadSummary, SessionError> {
    let mut summary = DownloadSummary::default();
    if indices.is_empty() {
        return Ok(summary);
    }

    prepare_output_dir(&options.output_dir).await?;

    for (position, &index) in indices.iter().enumerate() {
        let Some(episode) = catalog.get(index) else {
            continue;
        };
        let context = DownloadContext {
            position: position + 1,
            total_selected: indices.len(),
        };

        let outcome =
            download_or_skip(client, episode, &options.output_dir, context, reporter).await?;
        match outcome {
            EpisodeOutcome::Skipped => console.print_line(&format!(
                "File already exists for episode {index}. Skipping download."
            ))?,
            EpisodeOutcome::Downloaded { .. } => {
                console.print_line(&format!("{} - Done -", episode.filename))?
            }
        }
        summary.record(outcome);
    }

    debug!(?summary, "selection processed");
    Ok(summary)
}

fn print_catalog<T: Console>(console: &mut T, catalog: &Catalog) -> std::io::Result<()> {
    console.print_line(&format!("Total episodes: {}", catalog.len()))?;
    console.print_line("")?;
    print_listing(console, catalog)
}

fn print_listing<T: Console>(console: &mut T, catalog: &Catalog) -> std::io::Result<()> {
    for line in catalog.listing() {
        console.print_line(&line)?;
    }
    console.print_line("")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::console::tests::ScriptedConsole;
    use crate::error::DownloadError;
    use crate::http::mock::{MockHttpClient, MockResponse};
    use crate::progress::NoopReporter;
    use crate::progress::tests::RecordingReporter;
    use tempfile::tempdir;

    const FEED_URL: &str = "https://example.com/feed.xml";

    const FEED: &str = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Test Cast</title>
    <description>Test</description>
    <item>
      <title>Ep C</title>
      <enclosure url="https://example.com/c.mp3" type="audio/mpeg"/>
    </item>
    <item>
      <title>Ep B</title>
      <enclosure url="https://example.com/b.mp3" type="audio/mpeg"/>
    </item>
    <item>
      <title>Ep A</title>
      <enclosure url="https://example.com/a.mp3" type="audio/mpeg"/>
    </item>
  </channel>
</rss>"#;

    fn client() -> MockHttpClient {
        MockHttpClient::new()
            .with(FEED_URL, MockResponse::ok(FEED.as_bytes()))
            .with("https://example.com/a.mp3", MockResponse::ok(b"aaaa"))
            .with("https://example.com/b.mp3", MockResponse::ok(b"bbbb"))
            .with("https://example.com/c.mp3", MockResponse::ok(b"cccc"))
    }

    fn files_in(dir: &std::path::Path) -> Vec<String> {
        let mut names: Vec<_> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn filter_then_select_all_downloads_only_matches() {
        let dir = tempdir().unwrap();
        let options = SessionOptions {
            output_dir: dir.path().to_path_buf(),
        };
        let client = client();
        let mut console = ScriptedConsole::new(&[FEED_URL, "b", "*"]);

        let outcome = run_session(&client, &mut console, None, &options, NoopReporter::shared())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            SessionOutcome::Completed(DownloadSummary {
                downloaded: 1,
                skipped: 0,
                bytes: 4,
            })
        );
        assert_eq!(files_in(dir.path()), ["Test Cast [2] - Ep B.mp3"]);
        assert_eq!(
            client.requests(),
            [FEED_URL, "https://example.com/b.mp3"]
        );
        assert_eq!(console.prompts, [FEED_PROMPT, FILTER_PROMPT, SELECTION_PROMPT]);
        assert!(console.output.contains(&"1. [1] Ep B".to_string()));
        assert_eq!(console.output.last().unwrap(), "Download complete!");
    }

    #[tokio::test]
    async fn initial_listing_is_oldest_first() {
        let dir = tempdir().unwrap();
        let options = SessionOptions {
            output_dir: dir.path().to_path_buf(),
        };
        let client = client();
        let mut console = ScriptedConsole::new(&["", "q"]);

        run_session(
            &client,
            &mut console,
            Some(FEED_URL),
            &options,
            NoopReporter::shared(),
        )
        .await
        .unwrap();

        let listing: Vec<_> = console
            .output
            .iter()
            .filter(|line| line.contains(". ["))
            .cloned()
            .collect();
        assert_eq!(listing, ["1. [1] Ep A", "2. [2] Ep B", "3. [3] Ep C"]);
        assert_eq!(console.output[0], "Downloading episodes from Test Cast...");
        assert!(console.output.contains(&"Total episodes: 3".to_string()));
    }

    #[tokio::test]
    async fn quit_writes_nothing() {
        let dir = tempdir().unwrap();
        let options = SessionOptions {
            output_dir: dir.path().to_path_buf(),
        };
        let client = client();
        let mut console = ScriptedConsole::new(&["", "Q"]);

        let outcome = run_session(
            &client,
            &mut console,
            Some(FEED_URL),
            &options,
            NoopReporter::shared(),
        )
        .await
        .unwrap();

        assert_eq!(outcome, SessionOutcome::Quit);
        assert!(files_in(dir.path()).is_empty());
        assert_eq!(client.requests(), [FEED_URL]);
        assert_eq!(console.output.last().unwrap(), "Quitting...");
        assert_eq!(console.prompts, [FILTER_PROMPT, SELECTION_PROMPT]);
    }

    #[tokio::test]
    async fn reverse_toggle_uses_feed_order_and_plain_filenames() {
        let dir = tempdir().unwrap();
        let options = SessionOptions {
            output_dir: dir.path().to_path_buf(),
        };
        let client = client();
        let mut console = ScriptedConsole::new(&["\\", "1"]);

        run_session(
            &client,
            &mut console,
            Some(FEED_URL),
            &options,
            NoopReporter::shared(),
        )
        .await
        .unwrap();

        assert_eq!(files_in(dir.path()), ["Test Cast - Ep C.mp3"]);
        assert_eq!(
            client.requests(),
            [FEED_URL, "https://example.com/c.mp3"]
        );
    }

    #[tokio::test]
    async fn invalid_tokens_are_reported_and_skipped() {
        let dir = tempdir().unwrap();
        let options = SessionOptions {
            output_dir: dir.path().to_path_buf(),
        };
        let client = client();
        let mut console = ScriptedConsole::new(&["", "2-9, 3, x"]);

        let outcome = run_session(
            &client,
            &mut console,
            Some(FEED_URL),
            &options,
            NoopReporter::shared(),
        )
        .await
        .unwrap();

        assert!(console.output.contains(&"Invalid episode range: 2-9".to_string()));
        assert!(console.output.contains(&"Invalid input: x".to_string()));
        assert_eq!(files_in(dir.path()), ["Test Cast [3] - Ep C.mp3"]);
        assert!(matches!(
            outcome,
            SessionOutcome::Completed(DownloadSummary { downloaded: 1, .. })
        ));
    }

    #[tokio::test]
    async fn existing_files_are_reported_as_skipped() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("Test Cast [1] - Ep A.mp3"), b"old").unwrap();
        let options = SessionOptions {
            output_dir: dir.path().to_path_buf(),
        };
        let client = client();
        let mut console = ScriptedConsole::new(&["", "1"]);
        let recorder = Arc::new(RecordingReporter::default());

        let outcome = run_session(&client, &mut console, Some(FEED_URL), &options, recorder.clone())
            .await
            .unwrap();

        assert_eq!(client.requests(), [FEED_URL]);
        assert!(
            console
                .output
                .contains(&"File already exists for episode 1. Skipping download.".to_string())
        );
        assert!(recorder.events().iter().all(|event| !matches!(
            event,
            ProgressEvent::DownloadStarting { .. }
        )));
        assert!(matches!(
            outcome,
            SessionOutcome::Completed(DownloadSummary { skipped: 1, .. })
        ));
    }

    #[tokio::test]
    async fn quiet_mode_still_prints_skip_and_completion_lines() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("Test Cast [1] - Ep A.mp3"), b"old").unwrap();
        let options = SessionOptions {
            output_dir: dir.path().to_path_buf(),
        };
        let client = client();
        let mut console = ScriptedConsole::new(&["", "1-2"]);

        run_session(
            &client,
            &mut console,
            Some(FEED_URL),
            &options,
            NoopReporter::shared(),
        )
        .await
        .unwrap();

        let tail: Vec<_> = console.output.iter().rev().take(5).rev().cloned().collect();
        assert_eq!(
            tail,
            [
                "File already exists for episode 1. Skipping download.",
                "Test Cast [2] - Ep B.mp3 - Done -",
                "",
                "Downloaded 1 episode(s), skipped 1.",
                "Download complete!",
            ]
        );
    }

    #[tokio::test]
    async fn broken_download_stops_the_remaining_selection() {
        let dir = tempdir().unwrap();
        let options = SessionOptions {
            output_dir: dir.path().to_path_buf(),
        };
        let client = client().with(
            "https://example.com/a.mp3",
            MockResponse {
                interrupted: true,
                ..MockResponse::ok(b"aa")
            },
        );
        let mut console = ScriptedConsole::new(&["", "*"]);
        let recorder = Arc::new(RecordingReporter::default());

        let result = run_session(&client, &mut console, Some(FEED_URL), &options, recorder.clone())
            .await;

        assert!(matches!(
            result,
            Err(SessionError::Download(DownloadError::StreamFailed { .. }))
        ));
        assert_eq!(client.requests(), [FEED_URL, "https://example.com/a.mp3"]);
        assert_eq!(files_in(dir.path()), ["Test Cast [1] - Ep A.mp3"]);
        assert_eq!(
            std::fs::read(dir.path().join("Test Cast [1] - Ep A.mp3")).unwrap(),
            b"aa"
        );
        assert!(!console.output.contains(&"Download complete!".to_string()));
        assert!(matches!(
            recorder.events().last(),
            Some(ProgressEvent::DownloadFailed { .. })
        ));
    }

    #[tokio::test]
    async fn feed_failure_is_reported_to_clear_the_spinner() {
        let dir = tempdir().unwrap();
        let options = SessionOptions {
            output_dir: dir.path().to_path_buf(),
        };
        let client = MockHttpClient::new();
        let mut console = ScriptedConsole::new(&[]);
        let recorder = Arc::new(RecordingReporter::default());

        let result = run_session(
            &client,
            &mut console,
            Some("https://example.com/gone.xml"),
            &options,
            recorder.clone(),
        )
        .await;

        assert!(result.is_err());
        let events = recorder.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ProgressEvent::FetchingFeed { .. }));
        assert!(matches!(events[1], ProgressEvent::FeedFailed { .. }));
    }

    #[tokio::test]
    async fn feed_failure_is_fatal_before_any_listing() {
        let dir = tempdir().unwrap();
        let options = SessionOptions {
            output_dir: dir.path().to_path_buf(),
        };
        let client = MockHttpClient::new();
        let mut console = ScriptedConsole::new(&[]);

        let result = run_session(
            &client,
            &mut console,
            Some("https://example.com/gone.xml"),
            &options,
            NoopReporter::shared(),
        )
        .await;

        assert!(matches!(result, Err(SessionError::Feed(_))));
        assert!(console.output.is_empty());
        assert!(console.prompts.is_empty());
    }

    #[tokio::test]
    async fn closed_input_surfaces_as_prompt_error() {
        let dir = tempdir().unwrap();
        let options = SessionOptions {
            output_dir: dir.path().to_path_buf(),
        };
        let client = client();
        let mut console = ScriptedConsole::new(&[""]);

        let result = run_session(
            &client,
            &mut console,
            Some(FEED_URL),
            &options,
            NoopReporter::shared(),
        )
        .await;

        assert!(matches!(result, Err(SessionError::Prompt(_))));
    }
}
