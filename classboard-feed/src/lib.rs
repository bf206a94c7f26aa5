//! classboard-feed: locating, fetching and parsing the timetable data feed.

pub mod loader;
pub mod source;

pub use loader::{cache_busted_url, load_feed, load_feed_or_default, parse_feed};
pub use source::FeedSource;
