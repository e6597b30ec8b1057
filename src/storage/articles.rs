use anyhow::Result;

use super::schema::Database;
use super::types::{Article, NewArticle};

impl Database {
    // ========================================================================
    // Article Mutations
    // ========================================================================

    /// Insert scraped articles in a single transaction, returns the number of new rows
    ///
    /// Rows whose `(url, title)` pair already exists hit the UNIQUE constraint
    /// and are skipped; any other error aborts the whole batch. The transaction
    /// rolls back when dropped, so every early return leaves the table untouched.
    pub async fn save_articles(&self, articles: &[NewArticle]) -> Result<usize> {
        if articles.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for article in articles {
            let result = sqlx::query("INSERT INTO articles (title, url, date) VALUES (?, ?, ?)")
                .bind(&article.title)
                .bind(&article.url)
                .bind(article.date)
                .execute(&mut *tx)
                .await;

            match result {
                Ok(_) => inserted += 1,
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    tracing::debug!(url = %article.url, title = %article.title, "Article already stored, skipping");
                }
                Err(e) => return Err(e.into()),
            }
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Mark every row with this URL as read, returns the number of rows changed
    ///
    /// Runs in its own transaction, same discipline as [`Database::save_articles`].
    pub async fn mark_read(&self, url: &str) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE articles SET read = 1 WHERE url = ?")
            .bind(url)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }

    // ========================================================================
    // Article Queries
    // ========================================================================

    /// Oldest unread articles first, at most `limit` of them
    ///
    /// Ties on `date` fall back to insertion order (`rowid`).
    pub async fn unread_articles(&self, limit: usize) -> Result<Vec<Article>> {
        let limit: i64 = limit.try_into().unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, Article>(
            r#"
            SELECT title, url, date, read
            FROM articles
            WHERE read = 0
            ORDER BY date ASC, rowid ASC
            LIMIT ?
        "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// All articles, oldest first
    pub async fn all_articles(&self) -> Result<Vec<Article>> {
        let rows = sqlx::query_as::<_, Article>(
            "SELECT title, url, date, read FROM articles ORDER BY date ASC, rowid ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Number of unread articles waiting to be sent
    pub async fn unread_count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM articles WHERE read = 0")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
