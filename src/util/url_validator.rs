use thiserror::Error;
use url::Url;

/// Errors that can occur during URL validation.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// The URL has no host component.
    #[error("URL has no host")]
    MissingHost,
    /// The URL cannot carry path segments (e.g. `mailto:`-style URLs).
    #[error("URL cannot be used as a base for article paths")]
    CannotBeABase,
}

/// Validates a configured endpoint (listing page or webhook).
///
/// Surrounding whitespace is trimmed first, since values are often pasted
/// from files that end in a newline.
///
/// # Errors
///
/// Returns [`UrlValidationError`] if:
/// - The URL cannot be parsed ([`UrlValidationError::InvalidUrl`])
/// - The scheme is not `http` or `https` ([`UrlValidationError::UnsupportedScheme`])
/// - There is no host ([`UrlValidationError::MissingHost`])
///
/// # Examples
///
/// ```
/// use blog_notifier::util::validate_endpoint;
///
/// let url = validate_endpoint("  https://blog.example.com/articles\n").unwrap();
/// assert_eq!(url.host_str(), Some("blog.example.com"));
///
/// assert!(validate_endpoint("file:///etc/passwd").is_err());
/// ```
pub fn validate_endpoint(raw: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(raw.trim())?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(url)
}

/// Builds the absolute URL of an article from a listing href.
///
/// The first occurrence of `prefix` is removed from `href` and what remains is
/// appended to the path of `base`, so `https://blog.example.com/` +
/// `/articles/foo` gives `https://blog.example.com/foo`. The href is treated as
/// already escaped: existing `%XX` sequences and a trailing `/` are kept.
pub fn article_url(base: &Url, href: &str, prefix: &str) -> Result<Url, UrlValidationError> {
    if base.cannot_be_a_base() {
        return Err(UrlValidationError::CannotBeABase);
    }

    let path = if prefix.is_empty() {
        href.to_string()
    } else {
        href.replacen(prefix, "", 1)
    };

    let joined = format!(
        "{}/{}",
        base.path().trim_end_matches('/'),
        path.trim_start_matches('/')
    );

    let mut url = base.clone();
    url.set_path(&joined);

    Ok(url)
}
