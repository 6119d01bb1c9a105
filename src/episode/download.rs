// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;

use futures::StreamExt;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::catalog::Episode;
use crate::error::DownloadError;
use crate::http::{ByteStream, HttpClient};
use crate::progress::{ProgressEvent, SharedProgressReporter, percent_complete};

/// Where an episode sits within the current selection
#[derive(Debug, Clone, Copy)]
pub struct DownloadContext {
    /// 1-based position within the selection
    pub position: usize,
    /// Total number of selected episodes
    pub total_selected: usize,
}

/// What happened to a single selected episode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeOutcome {
    /// Destination file existed already, nothing was requested
    Skipped,
    Downloaded { bytes: u64 },
}

/// Outcome of processing a whole selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub downloaded: usize,
    pub skipped: usize,
    pub bytes: u64,
}

impl DownloadSummary {
    pub fn record(&mut self, outcome: EpisodeOutcome) {
        match outcome {
            EpisodeOutcome::Skipped => self.skipped += 1,
            EpisodeOutcome::Downloaded { bytes } => {
                self.downloaded += 1;
                self.bytes += bytes;
            }
        }
    }
}

/// Create the output directory if it does not exist yet
pub async fn prepare_output_dir(output_dir: &Path) -> Result<(), DownloadError> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| DownloadError::CreateDirectoryFailed {
            path: output_dir.to_path_buf(),
            source: e,
        })
}

/// Download an episode into `output_dir` unless its file is already there
///
/// An existing destination file means no request is made at all.
pub async fn download_or_skip<C: HttpClient>(
    client: &C,
    episode: &Episode,
    output_dir: &Path,
    context: DownloadContext,
    reporter: &SharedProgressReporter,
) -> Result<EpisodeOutcome, DownloadError> {
    let output_path = output_dir.join(&episode.filename);

    if matches!(tokio::fs::try_exists(&output_path).await, Ok(true)) {
        debug!(path = %output_path.display(), "file exists, skipping");
        return Ok(EpisodeOutcome::Skipped);
    }

    let bytes = download_episode(client, episode, &output_path, context, reporter).await?;
    Ok(EpisodeOutcome::Downloaded { bytes })
}

/// Download an episode to the specified output path
///
/// Streams the response body to disk chunk by chunk, reporting progress after
/// every chunk. The file is created exclusively, so an existing file is never
/// overwritten. Nothing is cleaned up on failure.
pub async fn download_episode<C: HttpClient>(
    client: &C,
    episode: &Episode,
    output_path: &Path,
    context: DownloadContext,
    reporter: &SharedProgressReporter,
) -> Result<u64, DownloadError> {
    let url = episode.audio_url.as_str();
    debug!(url, path = %output_path.display(), "downloading episode");

    let response = client
        .get_stream(url)
        .await
        .map_err(|e| DownloadError::HttpFailed {
            url: url.to_string(),
            source: e,
        })?;

    if response.status >= 400 {
        return Err(DownloadError::HttpStatus {
            url: url.to_string(),
            status: response.status,
        });
    }

    reporter.report(ProgressEvent::DownloadStarting {
        filename: episode.filename.clone(),
        position: context.position,
        total_selected: context.total_selected,
        content_length: response.content_length,
    });

    let written = match create_file(output_path).await {
        Ok(file) => {
            write_body(
                file,
                response.body,
                response.content_length,
                url,
                output_path,
                context,
                reporter,
            )
            .await
        }
        Err(e) => Err(e),
    };

    match written {
        Ok(bytes_downloaded) => {
            reporter.report(ProgressEvent::DownloadCompleted {
                filename: episode.filename.clone(),
                bytes_downloaded,
            });
            Ok(bytes_downloaded)
        }
        Err(e) => {
            reporter.report(ProgressEvent::DownloadFailed {
                filename: episode.filename.clone(),
                error: e.to_string(),
            });
            Err(e)
        }
    }
}

async fn create_file(output_path: &Path) -> Result<File, DownloadError> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(output_path)
        .await
        .map_err(|e| DownloadError::FileCreateFailed {
            path: output_path.to_path_buf(),
            source: e,
        })
}

async fn write_body(
    mut file: File,
    mut stream: ByteStream,
    content_length: Option<u64>,
    url: &str,
    output_path: &Path,
    context: DownloadContext,
    reporter: &SharedProgressReporter,
) -> Result<u64, DownloadError> {
    let mut bytes_downloaded: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::StreamFailed {
            url: url.to_string(),
            source: e,
        })?;

        file.write_all(&chunk)
            .await
            .map_err(|e| DownloadError::FileWriteFailed {
                path: output_path.to_path_buf(),
                source: e,
            })?;

        bytes_downloaded += chunk.len() as u64;

        reporter.report(ProgressEvent::DownloadProgress {
            position: context.position,
            total_selected: context.total_selected,
            bytes_downloaded,
            total_bytes: content_length,
            percent: percent_complete(bytes_downloaded, content_length),
        });
    }

    file.flush()
        .await
        .map_err(|e| DownloadError::FileWriteFailed {
            path: output_path.to_path_buf(),
            source: e,
        })?;

    Ok(bytes_downloaded)
}
