//! Core data models for the ingestion pipeline and the store.

use serde::Serialize;

use crate::error::IngestError;

/// Raw item produced by an ingestion driver before record construction.
///
/// `subject` and `body` are kept verbatim. They are the fingerprint input
/// and must never be normalized. `comment` is the display text the driver
/// extracted for storage (the two differ: the email drivers fingerprint the
/// whole stripped message but store only the lines after the reference).
#[derive(Debug, Clone)]
pub struct RawExtraction {
    pub subject: String,
    pub title: String,
    pub comment: String,
    pub body: String,
    pub author: Option<String>,
    pub date: Option<String>,
}

/// A parsed verse reference: book code, chapter, and verse range.
///
/// Produced only by [`crate::reference::parse_reference`]; `verse_to` is
/// always `>= verse_from` on the way out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub book: String,
    pub chapter: u32,
    pub verse_from: u32,
    pub verse_to: u32,
}

/// Target of a verse-range lookup: a whole chapter, or a verse interval
/// within one. Query-side only; stored records always carry both bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeQuery {
    pub book: String,
    pub chapter: u32,
    pub verses: Option<(u32, u32)>,
}

/// Canonical commentary record as persisted. Immutable after insert.
#[derive(Debug, Clone, Serialize)]
pub struct CommentRecord {
    pub id: String,
    pub book: String,
    pub chapter: u32,
    pub verse_from: u32,
    pub verse_to: u32,
    pub created_at: String,
    pub author: Option<String>,
    pub source: String,
    pub title: String,
    pub comment: String,
    pub url: String,
    pub language: String,
    pub content_hash: String,
}

/// One position in a scanned source: either a candidate for the pipeline or
/// a driver-level skip (body too short, no citation substring found).
#[derive(Debug)]
pub enum ScanOutcome {
    Candidate(Candidate),
    Skipped { subject: String, reason: IngestError },
}

/// A raw extraction together with the citation string the driver selected
/// for the reference parser.
#[derive(Debug)]
pub struct Candidate {
    pub raw: RawExtraction,
    pub citation: String,
}

/// Diagnostic entry for an item that did not make it into the store.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedItem {
    pub index: usize,
    pub subject: String,
    pub reason: String,
}

/// Outcome of one batch ingestion run.
#[derive(Debug, Serialize)]
pub struct IngestReport {
    pub imported: u64,
    pub skipped: Vec<SkippedItem>,
}
