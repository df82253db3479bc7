//! Canonical record construction: content fingerprint and viewer URL.

use chrono::Utc;
use md5::{Digest, Md5};
use uuid::Uuid;

use crate::models::{CommentRecord, RawExtraction, Reference};
use crate::normalize::{normalize, normalize_citation};

/// MD5 hex fingerprint of `subject + body`, both verbatim.
///
/// The digest runs over the raw inputs, never over normalized output, so
/// fingerprints already in the store stay valid no matter what the
/// normalizer does. The concatenation order is part of the format.
pub fn content_hash(subject: &str, body: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(subject.as_bytes());
    hasher.update(body.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// External viewer link for a parsed reference (obohu.cz, KLP translation).
pub fn viewer_url(r: &Reference) -> String {
    format!(
        "https://www.obohu.cz/bible/index.php?styl=KLP&v={vf}-{vt}&kv={vf}-{vt}&k={book}&kap={ch}#v{vf}-{vt}",
        vf = r.verse_from,
        vt = r.verse_to,
        book = r.book,
        ch = r.chapter,
    )
}

/// Builds the canonical record for an extraction whose reference already
/// parsed. Infallible: validation and parsing happen upstream.
///
/// `created_at` passes the source-provided date through verbatim (including
/// synthetic placeholders like `import-7`) and only falls back to the current
/// UTC time when the source carries none.
pub fn build(raw: &RawExtraction, reference: &Reference, language: &str) -> CommentRecord {
    let created_at = raw
        .date
        .clone()
        .unwrap_or_else(|| Utc::now().to_rfc3339());

    CommentRecord {
        id: Uuid::new_v4().to_string(),
        book: reference.book.clone(),
        chapter: reference.chapter,
        verse_from: reference.verse_from,
        verse_to: reference.verse_to,
        created_at,
        author: raw.author.clone(),
        source: normalize_citation(&normalize(&raw.subject)),
        title: normalize(&raw.title),
        comment: raw.comment.clone(),
        url: viewer_url(reference),
        language: language.to_string(),
        content_hash: content_hash(&raw.subject, &raw.body),
    }
}
