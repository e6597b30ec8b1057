use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

use crate::storage::NewArticle;
use crate::util::{article_url, UrlValidationError};

/// Container that holds the article entries on the listing page.
const LIST_SELECTOR: &str = ".article-list";
const ITEM_SELECTOR: &str = "li";
const LINK_SELECTOR: &str = "a[href]";
const DATE_SELECTOR: &str = ".date";

/// Errors raised while turning listing HTML into articles.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The `.date` text was not a `YYYY.MM.DD` calendar date
    #[error("Invalid article date {raw:?} (expected YYYY.MM.DD)")]
    InvalidDate { raw: String },
    /// An href could not be resolved against the base URL
    #[error("Invalid article URL {href:?}: {source}")]
    InvalidUrl {
        href: String,
        #[source]
        source: UrlValidationError,
    },
    /// A built-in CSS selector failed to compile
    #[error("Invalid selector {0:?}")]
    Selector(&'static str),
}

/// Parses a listing date such as `2023.06.20`.
///
/// The shape is checked strictly (four digit year, two digit month and day,
/// dot separated) before chrono validates the calendar date itself.
pub fn parse_listing_date(raw: &str) -> Result<NaiveDate, ParseError> {
    let trimmed = raw.trim();
    let invalid = || ParseError::InvalidDate {
        raw: raw.to_string(),
    };

    let bytes = trimmed.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes[4] == b'.'
        && bytes[7] == b'.'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !well_formed {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(trimmed, "%Y.%m.%d").map_err(|_| invalid())
}

fn selector(css: &'static str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|_| ParseError::Selector(css))
}

/// Extracts articles from the listing page HTML.
///
/// Every `li` under `.article-list` is expected to hold an `a[href]` and a
/// `.date` element. Items without a link are skipped; a missing or malformed
/// date fails the whole parse.
pub fn parse_listing(html: &str, base: &Url, prefix: &str) -> Result<Vec<NewArticle>, ParseError> {
    let document = Html::parse_document(html);
    let list_selector = selector(LIST_SELECTOR)?;
    let item_selector = selector(ITEM_SELECTOR)?;
    let link_selector = selector(LINK_SELECTOR)?;
    let date_selector = selector(DATE_SELECTOR)?;

    let mut articles = Vec::new();

    for list in document.select(&list_selector) {
        for item in list.select(&item_selector) {
            let Some(link) = item.select(&link_selector).next() else {
                tracing::warn!("List item without a link, skipping");
                continue;
            };
            let href = link.value().attr("href").unwrap_or_default();
            let title = link_title(&link);

            let date_text: String = item
                .select(&date_selector)
                .next()
                .map(|d| d.text().collect())
                .unwrap_or_default();
            let date = parse_listing_date(&date_text)?;

            let url = article_url(base, href, prefix).map_err(|source| ParseError::InvalidUrl {
                href: href.to_string(),
                source,
            })?;

            tracing::debug!(url = %url, title = %title, date = %date, "Parsed listing entry");
            articles.push(NewArticle {
                title,
                url: url.into(),
                date,
            });
        }
    }

    Ok(articles)
}

/// The `title` attribute, or the link text when the attribute is missing or blank.
fn link_title(link: &ElementRef<'_>) -> String {
    match link.value().attr("title").map(str::trim) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => link
            .text()
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn base() -> Url {
        Url::parse("https://blog.example.com").unwrap()
    }

    const LISTING: &str = r#"<html><body>
<ul class="article-list">
  <li><a href="/articles/foo" title="Foo">Foo</a><span class="date">2023.06.20</span></li>
  <li><a href="/articles/bar" title="Bar">Bar</a><span class="date"> 2023.06.21 </span></li>
</ul>
</body></html>"#;

    #[test]
    fn test_parse_listing_date() {
        assert_eq!(
            parse_listing_date("2023.06.20").unwrap(),
            NaiveDate::from_ymd_opt(2023, 6, 20).unwrap()
        );
        assert_eq!(
            parse_listing_date("  2024.02.29\n").unwrap().to_string(),
            "2024-02-29"
        );
    }

    #[test]
    fn test_malformed_dates_rejected() {
        for raw in [
            "",
            "2023-06-20",
            "2023/06/20",
            "2023.6.20",
            "23.06.20",
            "2023.13.01",
            "2023.02.30",
            "2023.06.2a",
            "yesterday",
        ] {
            assert!(
                matches!(parse_listing_date(raw), Err(ParseError::InvalidDate { .. })),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_listing_single_item() {
        let html = r#"<div class="article-list"><ul>
            <li><a href="/articles/foo" title="Foo">Foo</a><p class="date">2023.06.20</p></li>
        </ul></div>"#;

        let articles = parse_listing(html, &base(), "/articles/").unwrap();
        assert_eq!(
            articles,
            vec![NewArticle {
                title: "Foo".to_string(),
                url: "https://blog.example.com/foo".to_string(),
                date: NaiveDate::from_ymd_opt(2023, 6, 20).unwrap(),
            }]
        );
    }

    #[test]
    fn test_parse_listing_preserves_page_order() {
        let articles = parse_listing(LISTING, &base(), "/articles/").unwrap();
        let titles: Vec<&str> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Foo", "Bar"]);
        assert_eq!(articles[1].date.to_string(), "2023-06-21");
    }

    #[test]
    fn test_items_outside_container_ignored() {
        let html = r#"<ul class="nav"><li><a href="/about" title="About">About</a></li></ul>
            <ul class="article-list">
              <li><a href="/articles/foo" title="Foo"></a><span class="date">2023.06.20</span></li>
            </ul>"#;

        let articles = parse_listing(html, &base(), "/articles/").unwrap();
        assert_eq!(articles.len(), 1);
    }

    #[test]
    fn test_item_without_link_skipped() {
        let html = r#"<ul class="article-list">
            <li><span class="date">2023.06.20</span></li>
            <li><a href="/articles/foo" title="Foo"></a><span class="date">2023.06.20</span></li>
        </ul>"#;

        let articles = parse_listing(html, &base(), "/articles/").unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].url, "https://blog.example.com/foo");
    }

    #[test]
    fn test_missing_title_falls_back_to_link_text() {
        let html = r#"<ul class="article-list">
            <li><a href="/articles/foo">  Foo   bar </a><span class="date">2023.06.20</span></li>
        </ul>"#;

        let articles = parse_listing(html, &base(), "/articles/").unwrap();
        assert_eq!(articles[0].title, "Foo bar");
    }

    #[test]
    fn test_malformed_date_fails_parse() {
        let html = r#"<ul class="article-list">
            <li><a href="/articles/foo" title="Foo"></a><span class="date">June 20</span></li>
        </ul>"#;

        let result = parse_listing(html, &base(), "/articles/");
        assert!(matches!(result, Err(ParseError::InvalidDate { .. })));
    }

    #[test]
    fn test_missing_date_fails_parse() {
        let html = r#"<ul class="article-list">
            <li><a href="/articles/foo" title="Foo"></a></li>
        </ul>"#;

        assert!(parse_listing(html, &base(), "/articles/").is_err());
    }

    #[test]
    fn test_no_container_yields_nothing() {
        let articles = parse_listing("<html><body><p>nothing</p></body></html>", &base(), "/articles/").unwrap();
        assert!(articles.is_empty());
    }

    proptest! {
        #[test]
        fn prop_dotted_dates_convert_to_iso(
            date in (1000i32..=9999, 1u32..=12, 1u32..=28)
                .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
        ) {
            let raw = date.format("%Y.%m.%d").to_string();
            let parsed = parse_listing_date(&raw).unwrap();
            prop_assert_eq!(parsed.format("%Y-%m-%d").to_string(), date.format("%Y-%m-%d").to_string());
        }

        #[test]
        fn prop_non_dotted_dates_rejected(raw in "[0-9]{4}[-/ ][0-9]{2}[-/ ][0-9]{2}") {
            prop_assert!(parse_listing_date(&raw).is_err());
        }
    }
}
