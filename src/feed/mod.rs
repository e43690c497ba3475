//! Alert feed retrieval and decoding.
//!
//! - [`fetcher`] - HTTP fetching with a bounded, fixed-delay retry policy
//! - [`parser`] - Atom decoding with CAP/GeoRSS geometry resolution
//! - [`types`] - Alert records and geometry shared with the renderer
//!
//! # Example
//!
//! ```ignore
//! use alert_placefile::feed::{parse, FeedFetcher};
//!
//! let fetcher = FeedFetcher::from_config(client, &config)?;
//! let entries = parse(fetcher.fetch().await?)?;
//! ```

mod fetcher;
mod parser;
mod types;

pub use fetcher::{FeedFetcher, FetchError, FetchPolicy, Sleeper, TokioSleeper, ACCEPT_ATOM};
pub use parser::{parse, parse_feed, sanitize_title, ParseError, ParseResult, PLACEHOLDER_TITLE};
pub use types::{AlertEntry, Coordinate, Geometry, RawFeedDocument, Ring};
