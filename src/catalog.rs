// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashSet;

use tracing::warn;
use url::Url;

use crate::episode::generate_filename;
use crate::feed::{Feed, FeedEntry};

/// How feed entries are arranged into a catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderingMode {
    /// Oldest first (the feed reversed); filenames carry the ordinal
    #[default]
    Chronological,
    /// The feed's own order, usually newest first; filenames omit the ordinal
    ReverseNative,
}

impl OrderingMode {
    fn filename_ordinal(self, ordinal: usize) -> Option<usize> {
        match self {
            OrderingMode::Chronological => Some(ordinal),
            OrderingMode::ReverseNative => None,
        }
    }
}

/// An episode resolved from a feed entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    /// 1-based position in the catalog it was first listed in
    pub ordinal: usize,
    pub title: String,
    pub audio_url: Url,
    /// Destination filename, relative to the output directory
    pub filename: String,
}

/// Ordered, 1-indexed list of episodes
#[derive(Debug, Clone)]
pub struct Catalog {
    mode: OrderingMode,
    filtered: bool,
    episodes: Vec<Episode>,
}

impl Catalog {
    /// Build a catalog from the feed under the given ordering
    pub fn build(feed: &Feed, mode: OrderingMode) -> Self {
        let mut entries: Vec<&FeedEntry> = feed.entries.iter().collect();
        if mode == OrderingMode::Chronological {
            entries.reverse();
        }

        let episodes: Vec<Episode> = entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| {
                let ordinal = i + 1;
                Episode {
                    ordinal,
                    title: entry.title.clone(),
                    audio_url: entry.enclosure_url.clone(),
                    filename: generate_filename(
                        &feed.title,
                        mode.filename_ordinal(ordinal),
                        &entry.title,
                    ),
                }
            })
            .collect();

        let catalog = Self {
            mode,
            filtered: false,
            episodes,
        };

        for filename in catalog.duplicate_filenames() {
            warn!(filename, "several episodes share a destination filename");
        }

        catalog
    }

    /// Keep only episodes whose title contains `phrase`, ignoring case
    ///
    /// Relative order is kept and the result is re-indexed from 1; ordinals
    /// and filenames are untouched.
    pub fn filter(&self, phrase: &str) -> Self {
        let needle = phrase.to_lowercase();

        Self {
            mode: self.mode,
            filtered: true,
            episodes: self
                .episodes
                .iter()
                .filter(|episode| episode.title.to_lowercase().contains(&needle))
                .cloned()
                .collect(),
        }
    }

    pub fn is_filtered(&self) -> bool {
        self.filtered
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    /// Look up an episode by its 1-based catalog index
    pub fn get(&self, index: usize) -> Option<&Episode> {
        index.checked_sub(1).and_then(|i| self.episodes.get(i))
    }

    /// Bracketed number shown next to catalog index `index` in listings
    ///
    /// Purely cosmetic; selection always goes by catalog index.
    pub fn display_label(&self, index: usize) -> usize {
        match self.mode {
            OrderingMode::ReverseNative => index,
            OrderingMode::Chronological if self.filtered => (self.len() + 1).saturating_sub(index),
            OrderingMode::Chronological => self
                .get(index)
                .map_or(index, |episode| episode.ordinal),
        }
    }

    /// One `"{index}. [{label}] {title}"` line per episode
    pub fn listing(&self) -> Vec<String> {
        self.episodes
            .iter()
            .enumerate()
            .map(|(i, episode)| {
                let index = i + 1;
                format!("{index}. [{}] {}", self.display_label(index), episode.title)
            })
            .collect()
    }

    /// Filenames claimed by more than one episode, in catalog order
    pub fn duplicate_filenames(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();

        self.episodes
            .iter()
            .map(|episode| episode.filename.as_str())
            .filter(|filename| !seen.insert(*filename) && reported.insert(*filename))
            .collect()
    }
}
