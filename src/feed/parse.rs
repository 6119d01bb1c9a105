// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use tracing::{debug, warn};
use url::Url;

use crate::error::FeedError;

/// Title used for items that carry none
const UNTITLED_EPISODE: &str = "Untitled Episode";

/// A parsed podcast feed, entries in the order the feed lists them
/// (usually newest first)
#[derive(Debug, Clone)]
pub struct Feed {
    pub title: String,
    pub entries: Vec<FeedEntry>,
    /// Items dropped because they had no usable enclosure
    pub skipped_entries: usize,
}

/// A single raw feed item with its audio enclosure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub enclosure_url: Url,
}

/// Parse RSS or Atom feed XML bytes into a [`Feed`]
///
/// RSS is tried first, Atom second. Items without an enclosure, or whose
/// enclosure URL does not parse, are logged and left out.
pub fn parse_feed(xml_bytes: &[u8]) -> Result<Feed, FeedError> {
    let feed = match rss::Channel::read_from(xml_bytes) {
        Ok(channel) => from_rss(&channel),
        Err(rss) => match atom_syndication::Feed::read_from(xml_bytes) {
            Ok(atom) => from_atom(&atom),
            Err(atom) => return Err(FeedError::ParseFailed { rss, atom }),
        },
    };

    debug!(
        title = %feed.title,
        entries = feed.entries.len(),
        skipped = feed.skipped_entries,
        "parsed feed"
    );

    Ok(feed)
}

fn from_rss(channel: &rss::Channel) -> Feed {
    collect_entries(
        channel.title(),
        channel
            .items()
            .iter()
            .map(|item| (item.title(), item.enclosure().map(|e| e.url()))),
    )
}

fn from_atom(feed: &atom_syndication::Feed) -> Feed {
    collect_entries(
        feed.title().as_str(),
        feed.entries().iter().map(|entry| {
            let enclosure = entry
                .links()
                .iter()
                .find(|link| link.rel() == "enclosure")
                .map(|link| link.href());
            (Some(entry.title().as_str()), enclosure)
        }),
    )
}

/// Build a feed from `(title, enclosure URL)` pairs in document order
fn collect_entries<'a>(
    title: &str,
    items: impl Iterator<Item = (Option<&'a str>, Option<&'a str>)>,
) -> Feed {
    let mut entries = Vec::new();
    let mut skipped_entries = 0;

    for (item_title, enclosure) in items {
        match parse_entry(item_title, enclosure) {
            Some(entry) => entries.push(entry),
            None => skipped_entries += 1,
        }
    }

    Feed {
        title: title.to_string(),
        entries,
        skipped_entries,
    }
}

fn parse_entry(title: Option<&str>, enclosure: Option<&str>) -> Option<FeedEntry> {
    let title = title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(UNTITLED_EPISODE)
        .to_string();

    let Some(enclosure) = enclosure else {
        warn!(episode = %title, "skipping feed entry without enclosure");
        return None;
    };

    match Url::parse(enclosure) {
        Ok(enclosure_url) => Some(FeedEntry {
            title,
            enclosure_url,
        }),
        Err(err) => {
            warn!(
                episode = %title,
                url = enclosure,
                error = %err,
                "skipping feed entry with invalid enclosure URL"
            );
            None
        }
    }
}
