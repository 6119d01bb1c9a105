// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// Extension appended to every episode file
const AUDIO_EXTENSION: &str = "mp3";

/// Longest filename most filesystems accept, in bytes
const MAX_FILENAME_BYTES: usize = 255;

/// Generate the destination filename for an episode
///
/// With an ordinal: `"{podcast} [{ordinal}] - {episode}.mp3"`,
/// without: `"{podcast} - {episode}.mp3"`.
///
/// The stem is passed through `sanitize_filename`, so path separators and
/// characters that are reserved on common filesystems are removed, and is
/// then shortened so the name including its extension fits in 255 bytes.
/// Titles made only of permitted characters come out unchanged.
pub fn generate_filename(podcast_title: &str, ordinal: Option<usize>, episode_title: &str) -> String {
    let raw_stem = match ordinal {
        Some(ordinal) => format!("{podcast_title} [{ordinal}] - {episode_title}"),
        None => format!("{podcast_title} - {episode_title}"),
    };

    let stem = sanitize_filename::sanitize_with_options(
        raw_stem,
        sanitize_filename::Options {
            truncate: false,
            ..Default::default()
        },
    );
    let max_stem = MAX_FILENAME_BYTES - AUDIO_EXTENSION.len() - 1;

    format!("{}.{AUDIO_EXTENSION}", truncate_to_bytes(&stem, max_stem))
}

/// Cut `s` to at most `max_bytes` without splitting a character
fn truncate_to_bytes(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }

    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].trim_end()
}
