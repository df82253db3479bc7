//! Free-form citation parsing.
//!
//! Source citations are hand-typed across years, in Czech and Slovak, with
//! inconsistent spacing, dash variants, and the occasional composite verse
//! list ("1-3.5,7"). Parsing is two-tier: a strict `Book ch,vf-vt` pattern is
//! tried first, and only when it misses does the loose fallback extract a
//! defensible from/to range from the messy tail. The strict tier always wins
//! when both would match, so ordinary reference punctuation is never misread
//! as a composite list.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::IngestError;
use crate::models::{RangeQuery, Reference};
use crate::normalize::normalize_citation;

/// Letters that may appear in a Czech/Slovak book abbreviation.
pub(crate) const BOOK_LETTERS: &str = "A-Za-zČčĎďĹĺŇňŠšŽžÝýÁáÉéÍíÓóÚúŮů";

static STRICT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"([{BOOK_LETTERS}]+)\s+(\d+)\s*,\s*(\d+)\s*-\s*(\d+)"
    ))
    .unwrap()
});

static LOOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"([{BOOK_LETTERS}]+)\s+(\d+)\s*,\s*([0-9A-Za-z.,\s-]+)"
    ))
    .unwrap()
});

static INTEGER_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

static CHAPTER_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"([{BOOK_LETTERS}]+)\s+(\d+)")).unwrap());

/// Parses a free-form citation string into a [`Reference`].
///
/// Dash and spacing variants are folded up front, so "Lk 3, 10 – 18" and
/// "Lk 3,10-18" parse identically. Fails with
/// [`IngestError::UnparsableReference`] carrying the original text when no
/// tier matches.
pub fn parse_reference(text: &str) -> Result<Reference, IngestError> {
    let t = normalize_citation(text);
    let unparsable = || IngestError::UnparsableReference(text.to_string());

    if let Some(caps) = STRICT.captures(&t) {
        return Ok(Reference {
            book: caps[1].to_string(),
            chapter: caps[2].parse().map_err(|_| unparsable())?,
            verse_from: caps[3].parse().map_err(|_| unparsable())?,
            verse_to: caps[4].parse().map_err(|_| unparsable())?,
        });
    }

    let caps = LOOSE.captures(&t).ok_or_else(unparsable)?;
    let chapter: u32 = caps[2].parse().map_err(|_| unparsable())?;

    // First and last integer run in the verse section bound the range.
    let nums: Vec<u32> = INTEGER_RUN
        .find_iter(&caps[3])
        .filter_map(|m| m.as_str().parse().ok())
        .collect();
    let (&first, &last) = match (nums.first(), nums.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return Err(unparsable()),
    };
    // Reversed ranges are swapped rather than rejected.
    let (verse_from, verse_to) = if last < first { (last, first) } else { (first, last) };

    Ok(Reference {
        book: caps[1].to_string(),
        chapter,
        verse_from,
        verse_to,
    })
}

/// Parses a range-lookup target. A full citation selects a verse interval;
/// a bare `Book chapter` ("Jn 1") selects the whole chapter.
pub fn parse_range_query(text: &str) -> Result<RangeQuery, IngestError> {
    if let Ok(r) = parse_reference(text) {
        return Ok(RangeQuery {
            book: r.book,
            chapter: r.chapter,
            verses: Some((r.verse_from, r.verse_to)),
        });
    }

    let t = normalize_citation(text);
    let unparsable = || IngestError::UnparsableReference(text.to_string());
    let caps = CHAPTER_ONLY.captures(&t).ok_or_else(unparsable)?;
    Ok(RangeQuery {
        book: caps[1].to_string(),
        chapter: caps[2].parse().map_err(|_| unparsable())?,
        verses: None,
    })
}
