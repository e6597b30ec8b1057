//! Utility functions shared by configuration and scraping.
//!
//! - **Endpoint validation**: configured URLs must be http(s) with a host
//! - **Article URLs**: turn a listing href into an absolute article URL

mod url_validator;

pub use url_validator::{article_url, validate_endpoint, UrlValidationError};
