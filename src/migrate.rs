use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Applies the schema to an open pool. Idempotent.
pub async fn apply(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS comments (
            id TEXT PRIMARY KEY,
            book TEXT NOT NULL,
            chapter INTEGER NOT NULL,
            verse_from INTEGER NOT NULL,
            verse_to INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            author TEXT,
            source TEXT NOT NULL,
            title TEXT NOT NULL,
            comment TEXT NOT NULL,
            url TEXT NOT NULL,
            language TEXT NOT NULL DEFAULT 'sk',
            content_hash TEXT NOT NULL,
            UNIQUE(content_hash)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // FTS5 virtual table over title + comment.
    // FTS5 CREATE is not idempotent natively, so we check first
    let fts_exists: bool = sqlx::query_scalar(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='comments_fts'",
    )
    .fetch_one(pool)
    .await?;

    if !fts_exists {
        sqlx::query(
            r#"
            CREATE VIRTUAL TABLE comments_fts USING fts5(
                record_id UNINDEXED,
                title,
                comment
            )
            "#,
        )
        .execute(pool)
        .await?;
    }

    // Range queries hit (book, chapter) and filter verses in SQL.
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_comments_book_chapter ON comments(book, chapter)",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_comments_language ON comments(language)")
        .execute(pool)
        .await?;

    Ok(())
}
