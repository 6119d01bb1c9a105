// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interpretation of the two selection prompts: the optional filter and the
//! episode selection expression.

use crate::error::SelectionError;

/// What the user asked for at the filter prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterCommand {
    /// Keep the catalog as it is
    Keep,
    /// Rebuild the catalog in the feed's native order
    Reverse,
    /// Keep only episodes whose title contains the phrase
    Phrase(String),
}

impl FilterCommand {
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            "" => FilterCommand::Keep,
            "\\" => FilterCommand::Reverse,
            phrase => FilterCommand::Phrase(phrase.to_string()),
        }
    }
}

/// What the user asked for at the selection prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionCommand {
    Quit,
    Download(Selection),
}

/// Catalog indices to download, in the order the user gave them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// 1-based catalog indices; duplicates are kept
    pub indices: Vec<usize>,
    /// Tokens that were skipped, one error each
    pub rejected: Vec<SelectionError>,
}

/// Parse a selection expression against a catalog of `catalog_len` episodes
///
/// Accepts `q` to quit, `*`/`a`/`all` for everything, or a comma-separated
/// list of numbers and inclusive `start-end` ranges. Invalid tokens are
/// collected in [`Selection::rejected`] and do not affect the valid ones.
pub fn parse_selection(input: &str, catalog_len: usize) -> SelectionCommand {
    let input = input.trim();

    if input.eq_ignore_ascii_case("q") {
        return SelectionCommand::Quit;
    }

    if matches!(input.to_lowercase().as_str(), "*" | "a" | "all") {
        return SelectionCommand::Download(Selection {
            indices: (1..=catalog_len).collect(),
            rejected: Vec::new(),
        });
    }

    let mut selection = Selection::default();
    if input.is_empty() {
        return SelectionCommand::Download(selection);
    }

    for token in input.split(',').map(str::trim) {
        match parse_token(token, catalog_len) {
            Ok(indices) => selection.indices.extend(indices),
            Err(err) => selection.rejected.push(err),
        }
    }

    SelectionCommand::Download(selection)
}

fn parse_token(
    token: &str,
    catalog_len: usize,
) -> Result<std::ops::RangeInclusive<usize>, SelectionError> {
    if let Some((start, end)) = token.split_once('-') {
        let invalid = || SelectionError::InvalidRange {
            token: token.to_string(),
        };

        let start: usize = start.trim().parse().map_err(|_| invalid())?;
        let end: usize = end.trim().parse().map_err(|_| invalid())?;

        if 1 <= start && start <= end && end <= catalog_len {
            Ok(start..=end)
        } else {
            Err(invalid())
        }
    } else if !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()) {
        match token.parse::<usize>() {
            Ok(n) if (1..=catalog_len).contains(&n) => Ok(n..=n),
            _ => Err(SelectionError::OutOfRange {
                token: token.to_string(),
            }),
        }
    } else {
        Err(SelectionError::InvalidInput {
            token: token.to_string(),
        })
    }
}
