//! Chat webhook notifications.
//!
//! Each unread article is posted as `{"text": "<url>"}` and flagged read only
//! after the webhook answers 200.

mod webhook;

pub use webhook::{deliver, notify_unread, send_text, NotifyError, NotifySummary, WebhookPayload};
