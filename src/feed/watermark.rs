//! Delivery watermark over a re-parsed feed

use crate::types::Entry;

/// Index of the last feed entry already handed to delivery
///
/// Starts before the first entry. Advancing never moves it backwards: if the
/// feed shrinks, nothing is reported as new until it grows past the old
/// position again. A feed that is rewritten in place with the same or a
/// smaller length is therefore not detected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Watermark {
    last: Option<usize>,
}

impl Watermark {
    /// A watermark positioned before the first entry
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the last delivered entry, if any
    pub fn position(&self) -> Option<usize> {
        self.last
    }

    /// Split off the entries past the watermark and move it to the end of `feed`
    ///
    /// Returns an empty vec, leaving the watermark untouched, when there is
    /// nothing new.
    pub fn advance(&mut self, mut feed: Vec<Entry>) -> Vec<Entry> {
        let start = self.last.map_or(0, |last| last + 1);
        if feed.len() <= start {
            return Vec::new();
        }

        self.last = Some(feed.len() - 1);
        feed.split_off(start)
    }
}
