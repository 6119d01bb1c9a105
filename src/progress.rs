// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

/// Events emitted while loading the feed and downloading episodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Feed is being fetched or read
    FetchingFeed { source: String },

    /// Feed has been parsed
    FeedLoaded {
        podcast_title: String,
        total_episodes: usize,
    },

    /// Feed could not be loaded; the session ends
    FeedFailed { error: String },

    /// A download is starting
    DownloadStarting {
        filename: String,
        /// 1-based position of this episode within the selection
        position: usize,
        /// Number of selected episodes
        total_selected: usize,
        /// Expected content length in bytes, if known
        content_length: Option<u64>,
    },

    /// A chunk has been written
    DownloadProgress {
        position: usize,
        total_selected: usize,
        bytes_downloaded: u64,
        total_bytes: Option<u64>,
        /// Integer percentage, only when the total is known
        percent: Option<u8>,
    },

    /// A download completed
    DownloadCompleted {
        filename: String,
        bytes_downloaded: u64,
    },

    /// A started download broke off; the partial file is left in place
    DownloadFailed { filename: String, error: String },
}

/// Trait for reporting progress events.
///
/// Implementations can use this to draw progress bars, log messages,
/// or collect events in tests.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// A shared reference to a progress reporter
pub type SharedProgressReporter = Arc<dyn ProgressReporter>;

/// A reporter that ignores all events, used in quiet mode
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: ProgressEvent) {}
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedProgressReporter {
        Arc::new(Self)
    }
}

/// Integer percentage of `downloaded` out of `total`, capped at 100
///
/// `None` when the total is unknown or zero.
pub fn percent_complete(downloaded: u64, total: Option<u64>) -> Option<u8> {
    match total {
        Some(total) if total > 0 => {
            let percent = (u128::from(downloaded) * 100 / u128::from(total)).min(100);
            Some(percent as u8)
        }
        _ => None,
    }
}
