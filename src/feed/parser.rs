//! Feed text parsing

use crate::types::Entry;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Segment delimiter used by the lobby chat feed
pub const DEFAULT_DELIMITER: char = '~';

#[allow(clippy::expect_used)]
fn segment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // [<digits>] <ws> [<author>] <ws> <text to end of segment>
        Regex::new(r"(?s)^\[\d+\]\s+\[([^\]]+)\]\s+(.+)$").expect("segment pattern is valid")
    })
}

/// Parse raw feed text into entries using the default `~` delimiter
pub fn parse_feed(raw: &str) -> Vec<Entry> {
    parse(raw, DEFAULT_DELIMITER)
}

/// Parse raw feed text into entries
///
/// The text is split on `delimiter`, each piece is trimmed and empty pieces
/// are ignored. Pieces that do not look like `[<digits>] [<author>] <text>`
/// are dropped without error. Output order follows input order.
pub fn parse(raw: &str, delimiter: char) -> Vec<Entry> {
    raw.split(delimiter)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .filter_map(|segment| {
            let entry = parse_segment(segment);
            if entry.is_none() {
                debug!(segment, "dropping malformed feed segment");
            }
            entry
        })
        .collect()
}

fn parse_segment(segment: &str) -> Option<Entry> {
    let captures = segment_pattern().captures(segment)?;
    Some(Entry::new(&captures[1], &captures[2]))
}
