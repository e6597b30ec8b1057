//! One-shot run: optional fetch pass, then the notify pass.

use chrono::Weekday;
use thiserror::Error;

use crate::config::Settings;
use crate::listing::{refresh_listing, FetchError};
use crate::notify::{notify_unread, NotifyError, NotifySummary};
use crate::storage::Database;

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Fetch pass failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("Notify pass failed: {0}")]
    Notify(#[from] NotifyError),
}

/// What happened to the fetch pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Today is a quiet day; the listing was not requested.
    Skipped(Weekday),
    /// Listing fetched and saved.
    Completed { found: usize, inserted: usize },
    /// Listing answered with a non-200 status; nothing was saved.
    Aborted(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub fetch: FetchOutcome,
    pub notify: NotifySummary,
}

/// Run the fetch pass (unless `today` is a quiet day) and then the notify pass.
///
/// A non-200 listing response only aborts the fetch pass; the notify pass
/// still runs. Every other fetch error ends the run before anything is sent.
pub async fn run_once(
    db: &Database,
    client: &reqwest::Client,
    settings: &Settings,
    today: Weekday,
) -> Result<RunReport, RunError> {
    let fetch = if settings.is_quiet_day(today) {
        tracing::info!(weekday = %today, "Quiet day, skipping listing fetch");
        FetchOutcome::Skipped(today)
    } else {
        match refresh_listing(
            db,
            client,
            &settings.listing_url,
            &settings.article_path_prefix,
        )
        .await
        {
            Ok(summary) => FetchOutcome::Completed {
                found: summary.found,
                inserted: summary.inserted,
            },
            Err(FetchError::HttpStatus(status)) => {
                tracing::warn!(status = status, "Listing fetch aborted");
                FetchOutcome::Aborted(status)
            }
            Err(e) => return Err(e.into()),
        }
    };

    let notify = notify_unread(
        db,
        client,
        &settings.webhook_url,
        settings.max_notifications_per_run,
        settings.continue_on_failure,
    )
    .await?;

    Ok(RunReport { fetch, notify })
}
