//! CLI query commands: free-text search and verse-range lookup.

use anyhow::Result;

use crate::config::Config;
use crate::db;
use crate::models::CommentRecord;
use crate::reference::parse_range_query;
use crate::store;

pub async fn run_search(
    config: &Config,
    query: &str,
    author: Option<String>,
    lang: Option<String>,
    limit: Option<i64>,
) -> Result<()> {
    if query.trim().is_empty() {
        println!("No results.");
        return Ok(());
    }

    let languages = split_languages(lang.as_deref());
    let pool = db::connect(config).await?;
    let results = store::search_comments(
        &pool,
        query,
        author.as_deref(),
        &languages,
        limit.unwrap_or(20),
    )
    .await?;
    pool.close().await;

    print_results(&results);
    Ok(())
}

pub async fn run_range(config: &Config, reference: &str) -> Result<()> {
    let target = parse_range_query(reference)?;

    let pool = db::connect(config).await?;
    let results = store::query_range(&pool, &target).await?;
    pool.close().await;

    print_results(&results);
    Ok(())
}

/// Comma-separated language list → trimmed, non-empty codes.
pub fn split_languages(lang: Option<&str>) -> Vec<String> {
    lang.map(|l| {
        l.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn print_results(results: &[CommentRecord]) {
    if results.is_empty() {
        println!("No results.");
        return;
    }

    for (i, rec) in results.iter().enumerate() {
        println!(
            "{}. {} {}:{}-{} / {}",
            i + 1,
            rec.book,
            rec.chapter,
            rec.verse_from,
            rec.verse_to,
            if rec.title.is_empty() {
                "(untitled)"
            } else {
                &rec.title
            }
        );
        println!("    created: {}", rec.created_at);
        if let Some(ref author) = rec.author {
            println!("    author: {}", author);
        }
        println!("    url: {}", rec.url);
        println!(
            "    excerpt: \"{}\"",
            truncate(&rec.comment.replace('\n', " "), 120)
        );
        println!("    id: {}", rec.id);
        println!();
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let cut: String = s.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}
