//! Listing page scraping.
//!
//! - [`fetcher`] - HTTP retrieval of the listing page and the save pass
//! - [`parser`] - HTML extraction of article entries using the `scraper` crate
//!
//! A fetch pass downloads the page, turns each `.article-list li` into a
//! [`NewArticle`](crate::storage::NewArticle), and inserts the ones the store
//! has not seen yet.

pub mod fetcher;
pub mod parser;

pub use fetcher::{fetch_listing, refresh_listing, FetchError, FetchSummary};
pub use parser::{parse_listing, parse_listing_date, ParseError};
