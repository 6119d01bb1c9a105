// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when fetching or parsing the feed.
///
/// All of them are fatal for a session.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to fetch feed from {url}: {source}")]
    FetchFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for feed {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to read feed file {path}: {source}")]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse feed as RSS ({rss}) or Atom ({atom})")]
    ParseFailed {
        rss: rss::Error,
        atom: atom_syndication::Error,
    },
}

/// A single rejected token of an episode selection expression.
///
/// These are reported to the user and skipped, never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Invalid episode range: {token}")]
    InvalidRange { token: String },

    #[error("Invalid episode number: {token}")]
    OutOfRange { token: String },

    #[error("Invalid input: {token}")]
    InvalidInput { token: String },
}

/// Errors that can occur while downloading an episode
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP request failed for {url}: {source}")]
    HttpFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to create directory {path}: {source}")]
    CreateDirectoryFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create file {path}: {source}")]
    FileCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write to file {path}: {source}")]
    FileWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Stream error while downloading {url}: {source}")]
    StreamFailed {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level errors for an interactive session
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    #[error("Failed to read user input: {0}")]
    Prompt(#[from] std::io::Error),
}
