//! Lobby chat feed handling
//!
//! The feed is a plain-text blob of `[<seq>] [<author>] <text>` segments
//! separated by a delimiter character. It is re-fetched and fully re-parsed on
//! every poll; the [`Watermark`] decides which parsed entries are new.

pub mod fetcher;
pub mod parser;
pub mod watermark;

pub use fetcher::FeedFetcher;
pub use parser::{DEFAULT_DELIMITER, parse, parse_feed};
pub use watermark::Watermark;
