//! Static HTML page driver.
//!
//! The source pages carry one commentary per block: an `<h3 class="block_7">`
//! heading (optionally followed by an `<h4>` subtitle), then a
//! `<p class="block_">` citation paragraph with the book code in `<i>`, then
//! the commentary paragraphs, all inside one parent `<div>`. This driver
//! walks those blocks and rebuilds the citation subject string; the reference
//! grammar itself lives in [`crate::reference`].

use anyhow::{bail, Context, Result};
use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};

use crate::config::Config;
use crate::error::IngestError;
use crate::models::{Candidate, RawExtraction, ScanOutcome};
use crate::normalize::{normalize, normalize_citation};

pub fn scan_html(config: &Config) -> Result<Vec<ScanOutcome>> {
    let html_config = config
        .connectors
        .html
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("HTML connector not configured"))?;

    if !html_config.path.exists() {
        bail!("HTML page does not exist: {}", html_config.path.display());
    }

    let content = std::fs::read_to_string(&html_config.path)
        .with_context(|| format!("Failed to read {}", html_config.path.display()))?;

    Ok(extract_blocks(&content))
}

/// Extracts one [`ScanOutcome`] per `<h3 class="block_7">` block.
pub fn extract_blocks(html: &str) -> Vec<ScanOutcome> {
    let document = Html::parse_document(html);

    let heading_sel = Selector::parse("h3.block_7").unwrap();
    let ref_p_sel = Selector::parse("p.block_").unwrap();
    let p_sel = Selector::parse("p").unwrap();
    let h4_sel = Selector::parse("h4").unwrap();
    let i_sel = Selector::parse("i").unwrap();

    let mut outcomes = Vec::new();

    for heading in document.select(&heading_sel) {
        let title_main = normalize(&text_of(&heading));

        let Some(parent_div) = enclosing_div(&heading) else {
            continue;
        };

        // The citation paragraph is the first p.block_ following the heading;
        // fall back to the first one anywhere in the block.
        let ref_p = heading
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|el| ref_p_sel.matches(el))
            .or_else(|| parent_div.select(&ref_p_sel).next());

        let Some(ref_p) = ref_p else {
            outcomes.push(ScanOutcome::Skipped {
                subject: title_main.clone(),
                reason: IngestError::MissingReference(title_main),
            });
            continue;
        };

        let subject = citation_subject(&ref_p, &i_sel);

        // Subtitle: first h4 among the heading's following siblings.
        let subtitle = heading
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|el| h4_sel.matches(el))
            .map(|el| normalize(&text_of(&el)))
            .unwrap_or_default();
        let title = [title_main.as_str(), subtitle.as_str()]
            .iter()
            .filter(|t| !t.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" - ");

        // Commentary: every paragraph after the citation paragraph.
        let paragraphs: Vec<String> = after(parent_div.select(&p_sel), ref_p.id())
            .map(|el| normalize(&text_of(&el)))
            .filter(|t| !t.is_empty())
            .collect();

        if paragraphs.is_empty() {
            outcomes.push(ScanOutcome::Skipped {
                subject: subject.clone(),
                reason: IngestError::Validation("no commentary paragraphs".to_string()),
            });
            continue;
        }

        let comment = paragraphs.join("\n\n");

        outcomes.push(ScanOutcome::Candidate(Candidate {
            citation: normalize_citation(&subject),
            raw: RawExtraction {
                subject,
                title,
                // This driver fingerprints subject + joined commentary.
                body: comment.clone(),
                comment,
                author: None,
                date: None,
            },
        }));
    }

    outcomes
}

/// Rebuilds the citation subject from the paragraph: book code from `<i>`
/// plus the remaining chapter/verse text.
fn citation_subject(ref_p: &ElementRef, i_sel: &Selector) -> String {
    let full = normalize(&text_of(ref_p));
    match ref_p.select(i_sel).next() {
        Some(i_tag) => {
            let book = normalize(&text_of(&i_tag));
            let rest = full.strip_prefix(&book).unwrap_or(&full).trim();
            format!("{} {}", book, rest)
        }
        None => full,
    }
}

fn text_of(el: &ElementRef) -> String {
    el.text().collect::<String>()
}

fn enclosing_div<'a>(el: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == "div")
}

/// Elements from `iter` that appear strictly after the node with `id` in
/// document order.
fn after<'a>(
    iter: impl Iterator<Item = ElementRef<'a>>,
    id: NodeId,
) -> impl Iterator<Item = ElementRef<'a>> {
    let mut seen = false;
    iter.filter(move |el| {
        if el.id() == id {
            seen = true;
            return false;
        }
        seen
    })
}
