//! SQLite-backed record store: writes, hash lookups, range and text queries.
//!
//! The dedup contract lives here: `hash_exists` backs the read-then-write
//! gate the batch pipeline uses, and `put_if_absent` is the atomic
//! conditional-write hook for callers that cannot tolerate the
//! check-then-write race between concurrent runs.

use anyhow::Result;
use sqlx::{Row, SqlitePool};

use crate::models::{CommentRecord, RangeQuery};

/// Inserts a record and its full-text index entry.
///
/// The caller is expected to have deduplicated already; inserting a second
/// record with the same content hash violates the unique index and fails.
pub async fn put_record(pool: &SqlitePool, rec: &CommentRecord) -> Result<()> {
    let mut tx = pool.begin().await?;
    insert_comment(&mut tx, rec).await?;
    insert_fts(&mut tx, rec).await?;
    tx.commit().await?;
    Ok(())
}

/// Atomic conditional write: inserts only when the content hash is unseen.
/// Returns `true` when a row was written.
pub async fn put_if_absent(pool: &SqlitePool, rec: &CommentRecord) -> Result<bool> {
    let mut tx = pool.begin().await?;
    let res = sqlx::query(
        r#"
        INSERT INTO comments (id, book, chapter, verse_from, verse_to, created_at, author, source, title, comment, url, language, content_hash)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(content_hash) DO NOTHING
        "#,
    )
    .bind(&rec.id)
    .bind(&rec.book)
    .bind(rec.chapter as i64)
    .bind(rec.verse_from as i64)
    .bind(rec.verse_to as i64)
    .bind(&rec.created_at)
    .bind(&rec.author)
    .bind(&rec.source)
    .bind(&rec.title)
    .bind(&rec.comment)
    .bind(&rec.url)
    .bind(&rec.language)
    .bind(&rec.content_hash)
    .execute(&mut *tx)
    .await?;

    if res.rows_affected() == 0 {
        tx.commit().await?;
        return Ok(false);
    }
    insert_fts(&mut tx, rec).await?;
    tx.commit().await?;
    Ok(true)
}

async fn insert_comment(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    rec: &CommentRecord,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO comments (id, book, chapter, verse_from, verse_to, created_at, author, source, title, comment, url, language, content_hash)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&rec.id)
    .bind(&rec.book)
    .bind(rec.chapter as i64)
    .bind(rec.verse_from as i64)
    .bind(rec.verse_to as i64)
    .bind(&rec.created_at)
    .bind(&rec.author)
    .bind(&rec.source)
    .bind(&rec.title)
    .bind(&rec.comment)
    .bind(&rec.url)
    .bind(&rec.language)
    .bind(&rec.content_hash)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_fts(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    rec: &CommentRecord,
) -> Result<()> {
    sqlx::query("INSERT INTO comments_fts (record_id, title, comment) VALUES (?, ?, ?)")
        .bind(&rec.id)
        .bind(&rec.title)
        .bind(&rec.comment)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub async fn hash_exists(pool: &SqlitePool, hash: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE content_hash = ?")
        .bind(hash)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

/// Records for the same book and chapter whose verse interval overlaps the
/// query interval: `verse_from <= q.to AND verse_to >= q.from`. Without
/// verse bounds the whole chapter is returned.
pub async fn query_range(pool: &SqlitePool, query: &RangeQuery) -> Result<Vec<CommentRecord>> {
    let rows = match query.verses {
        Some((from, to)) => {
            sqlx::query(
                r#"
                SELECT * FROM comments
                WHERE book = ? AND chapter = ? AND verse_from <= ? AND verse_to >= ?
                ORDER BY verse_from ASC, created_at ASC, id ASC
                "#,
            )
            .bind(&query.book)
            .bind(query.chapter as i64)
            .bind(to as i64)
            .bind(from as i64)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(
                r#"
                SELECT * FROM comments
                WHERE book = ? AND chapter = ?
                ORDER BY verse_from ASC, created_at ASC, id ASC
                "#,
            )
            .bind(&query.book)
            .bind(query.chapter as i64)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows.iter().map(row_to_record).collect())
}

/// Full-text search over title + comment with optional author and language
/// filters. Languages arrive as a comma-separated list; filtering happens in
/// Rust after the FTS pass.
pub async fn search_comments(
    pool: &SqlitePool,
    query: &str,
    author: Option<&str>,
    languages: &[String],
    limit: i64,
) -> Result<Vec<CommentRecord>> {
    let expression = fts_match_expression(query);
    if expression.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query(
        r#"
        SELECT c.*
        FROM comments_fts
        JOIN comments c ON c.id = comments_fts.record_id
        WHERE comments_fts MATCH ?
        ORDER BY comments_fts.rank
        LIMIT ?
        "#,
    )
    .bind(expression)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let mut results: Vec<CommentRecord> = rows.iter().map(row_to_record).collect();

    if let Some(author_filter) = author {
        let needle = author_filter.to_lowercase();
        results.retain(|r| {
            r.author
                .as_deref()
                .map(|a| a.to_lowercase().contains(&needle))
                .unwrap_or(false)
        });
    }

    if !languages.is_empty() {
        results.retain(|r| languages.iter().any(|l| l == &r.language));
    }

    Ok(results)
}

/// The user query is plain text, not FTS5 syntax: every whitespace-separated
/// term becomes a quoted phrase, so reserved characters (an unbalanced `"`,
/// `NOT`, parentheses) cannot raise an FTS5 syntax error.
fn fts_match_expression(query: &str) -> String {
    query
        .split_whitespace()
        .map(|term| format!("\"{}\"", term.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(" ")
}

fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> CommentRecord {
    CommentRecord {
        id: row.get("id"),
        book: row.get("book"),
        chapter: row.get::<i64, _>("chapter") as u32,
        verse_from: row.get::<i64, _>("verse_from") as u32,
        verse_to: row.get::<i64, _>("verse_to") as u32,
        created_at: row.get("created_at"),
        author: row.get("author"),
        source: row.get("source"),
        title: row.get("title"),
        comment: row.get("comment"),
        url: row.get("url"),
        language: row.get("language"),
        content_hash: row.get("content_hash"),
    }
}
