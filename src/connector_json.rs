//! Forwarded-email JSON export driver.
//!
//! Reads a mailbox export, a JSON array of `{subject, from, body, date}`
//! objects, and turns each message into a pipeline candidate. The messages
//! are forwarded emails: everything before the last forwarding marker is
//! dropped, the first body line is the title, the second restates the
//! reference, and the rest is the commentary. The citation itself is located
//! in the subject line; that substring search is the only parsing this
//! driver does; the reference grammar lives in [`crate::reference`].

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

use crate::config::Config;
use crate::error::IngestError;
use crate::models::{Candidate, RawExtraction, ScanOutcome};
use crate::normalize::{normalize, normalize_citation};
use crate::reference::BOOK_LETTERS;

#[derive(Debug, Deserialize)]
struct ExportedMail {
    #[serde(default)]
    subject: String,
    #[serde(default, rename = "from")]
    from: Option<String>,
    #[serde(default)]
    body: String,
    #[serde(default)]
    date: Option<String>,
}

/// Markers the mail client prepends when forwarding; checked in order.
const FORWARD_MARKERS: [&str; 2] = ["Kopie:", "---------- Přeposlaná zpráva ----------"];

static SUBJECT_CITATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"[{BOOK_LETTERS}]+ \d+,\d+-\d+")).unwrap()
});

pub fn scan_json(config: &Config) -> Result<Vec<ScanOutcome>> {
    let json_config = config
        .connectors
        .json
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("JSON connector not configured"))?;

    if !json_config.path.exists() {
        bail!(
            "JSON export file does not exist: {}",
            json_config.path.display()
        );
    }

    let content = std::fs::read_to_string(&json_config.path)
        .with_context(|| format!("Failed to read {}", json_config.path.display()))?;
    let mails: Vec<ExportedMail> =
        serde_json::from_str(&content).with_context(|| "Failed to parse JSON export")?;

    let outcomes = mails
        .iter()
        .enumerate()
        .map(|(i, mail)| mail_to_outcome(mail, i + 1, config.ingest.min_body_lines))
        .collect();

    Ok(outcomes)
}

fn mail_to_outcome(mail: &ExportedMail, index: usize, min_body_lines: usize) -> ScanOutcome {
    let body = strip_forward_headers(&mail.body);
    let lines = body_lines(body);

    if lines.len() < min_body_lines {
        return ScanOutcome::Skipped {
            subject: mail.subject.clone(),
            reason: IngestError::Validation("message body too short".to_string()),
        };
    }

    let citation = match SUBJECT_CITATION.find(&normalize_citation(&mail.subject)) {
        Some(m) => m.as_str().to_string(),
        None => {
            return ScanOutcome::Skipped {
                subject: mail.subject.clone(),
                reason: IngestError::MissingReference(mail.subject.clone()),
            }
        }
    };

    // Line 1 is the title, line 2 restates the reference; the commentary
    // starts on line 3 and keeps its line breaks.
    let title = normalize(lines[0]);
    let comment = lines.iter().skip(2).copied().collect::<Vec<_>>().join("\n");

    ScanOutcome::Candidate(Candidate {
        raw: RawExtraction {
            subject: mail.subject.clone(),
            title,
            comment,
            body: body.to_string(),
            author: mail.from.clone(),
            date: mail
                .date
                .clone()
                .or_else(|| Some(format!("import-{}", index))),
        },
        citation,
    })
}

/// Drops everything up to the last forwarded-message marker, if any.
fn strip_forward_headers(body: &str) -> &str {
    for marker in FORWARD_MARKERS {
        if let Some(idx) = body.rfind(marker) {
            return &body[idx + marker.len()..];
        }
    }
    body
}

fn body_lines(body: &str) -> Vec<&str> {
    body.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}
