use crate::listing::parser::{parse_listing, ParseError};
use crate::storage::Database;
use futures::StreamExt;
use thiserror::Error;
use url::Url;

const MAX_LISTING_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur during a fetch pass.
///
/// Covers the whole pass: network issues, HTTP status, HTML parsing, and
/// the save transaction.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, timeout, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Listing responded with anything other than 200
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Listing HTML contained an entry that could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    /// Saving the scraped articles failed
    #[error("Database error: {0}")]
    Database(String),
}

/// Outcome of a completed fetch pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSummary {
    /// Entries found on the listing page
    pub found: usize,
    /// Entries that were new to the store
    pub inserted: usize,
}

/// Downloads the listing page, parses it, and stores any new articles.
///
/// # Errors
///
/// - [`FetchError::Network`] - Connection, TLS or timeout errors
/// - [`FetchError::HttpStatus`] - Any status other than 200
/// - [`FetchError::ResponseTooLarge`] - Body exceeded 10MB
/// - [`FetchError::Parse`] - Malformed date or unusable href
/// - [`FetchError::Database`] - The save transaction failed
pub async fn refresh_listing(
    db: &Database,
    client: &reqwest::Client,
    listing_url: &Url,
    article_prefix: &str,
) -> Result<FetchSummary, FetchError> {
    let html = fetch_listing(client, listing_url).await?;
    let articles = parse_listing(&html, listing_url, article_prefix)?;

    let inserted = db
        .save_articles(&articles)
        .await
        .map_err(|e| FetchError::Database(e.to_string()))?;

    tracing::info!(
        listing = %listing_url,
        found = articles.len(),
        inserted = inserted,
        "Listing fetched"
    );

    Ok(FetchSummary {
        found: articles.len(),
        inserted,
    })
}

/// GET the listing page and return its body as text.
pub async fn fetch_listing(client: &reqwest::Client, listing_url: &Url) -> Result<String, FetchError> {
    let response = client.get(listing_url.as_str()).send().await?;

    if response.status() != reqwest::StatusCode::OK {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }

    let bytes = read_limited_bytes(response, MAX_LISTING_SIZE).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
