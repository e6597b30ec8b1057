//! Scrape a blog's article listing into SQLite and post unread articles to a
//! chat webhook, a few per run.

pub mod config;
pub mod listing;
pub mod notify;
pub mod run;
pub mod storage;
pub mod util;
