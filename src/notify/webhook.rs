use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use thiserror::Error;

use crate::storage::Database;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Webhook request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Webhook error: status {0}")]
    HttpStatus(u16),
    #[error("Failed to encode webhook payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("Database error: {0}")]
    Database(String),
}

/// Body posted to the chat webhook.
#[derive(Debug, Serialize)]
pub struct WebhookPayload<'a> {
    pub text: &'a str,
}

/// What a notify pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifySummary {
    /// Unread articles picked for this run
    pub selected: usize,
    /// Articles posted and marked read
    pub delivered: usize,
    /// Articles that failed to post or to be marked read
    pub failed: usize,
    /// Unread articles left in the database after the pass
    pub remaining: i64,
}

/// POST `{"text": <text>}` to the webhook.
///
/// Only HTTP 200 counts as delivered.
pub async fn send_text(
    client: &reqwest::Client,
    webhook_url: &SecretString,
    text: &str,
) -> Result<(), NotifyError> {
    let body = serde_json::to_vec(&WebhookPayload { text })?;

    let response = client
        .post(webhook_url.expose_secret())
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await
        // reqwest errors print the request URL, which is the secret here
        .map_err(|e| NotifyError::Network(e.without_url()))?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        tracing::warn!(status = status.as_u16(), "Webhook rejected notification");
        return Err(NotifyError::HttpStatus(status.as_u16()));
    }

    Ok(())
}

/// Post one article and mark it read once the webhook accepted it.
pub async fn deliver(
    db: &Database,
    client: &reqwest::Client,
    webhook_url: &SecretString,
    url: &str,
) -> Result<(), NotifyError> {
    send_text(client, webhook_url, url).await?;

    db.mark_read(url)
        .await
        .map_err(|e| NotifyError::Database(e.to_string()))?;

    tracing::info!(url = %url, "Article sent");
    Ok(())
}

/// Send up to `limit` of the oldest unread articles.
///
/// With `continue_on_failure` unset the first failure ends the pass and is
/// returned; otherwise it is logged and counted and the next article is tried.
pub async fn notify_unread(
    db: &Database,
    client: &reqwest::Client,
    webhook_url: &SecretString,
    limit: usize,
    continue_on_failure: bool,
) -> Result<NotifySummary, NotifyError> {
    let unread = db
        .unread_articles(limit)
        .await
        .map_err(|e| NotifyError::Database(e.to_string()))?;

    let mut summary = NotifySummary {
        selected: unread.len(),
        ..NotifySummary::default()
    };

    for article in &unread {
        match deliver(db, client, webhook_url, &article.url).await {
            Ok(()) => summary.delivered += 1,
            Err(e) if continue_on_failure => {
                tracing::warn!(url = %article.url, error = %e, "Notification failed, continuing");
                summary.failed += 1;
            }
            Err(e) => return Err(e),
        }
    }

    summary.remaining = db
        .unread_count()
        .await
        .map_err(|e| NotifyError::Database(e.to_string()))?;

    tracing::info!(
        selected = summary.selected,
        delivered = summary.delivered,
        failed = summary.failed,
        remaining = summary.remaining,
        "Notify pass finished"
    );
    Ok(summary)
}
