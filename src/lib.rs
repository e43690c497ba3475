//! Active weather alerts as a radar-viewer placefile.
//!
//! The pipeline fetches the upstream Atom alert feed ([`feed::FeedFetcher`]),
//! resolves each entry's CAP/GeoRSS geometry ([`feed::parse`]) and renders
//! the result as placefile directives ([`placefile::render`]). [`server`]
//! exposes it over HTTP.

pub mod config;
pub mod feed;
pub mod pipeline;
pub mod placefile;
pub mod server;
