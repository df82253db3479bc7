//! Per-item ingestion failure taxonomy.
//!
//! Every variant here is recovered locally: the item lands in the batch
//! report's skip list and the run continues. Store and I/O failures are not
//! represented here; those propagate as `anyhow::Error` and abort the run.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// The citation string matched neither the strict nor the loose pattern.
    #[error("unparsable reference: {0}")]
    UnparsableReference(String),

    /// No citation substring was found in the field the driver searched.
    #[error("no reference found in: {0}")]
    MissingReference(String),

    /// A record with the same content hash is already stored. Not a true
    /// error, just a skip with a logged reason.
    #[error("duplicate content hash: {0}")]
    Duplicate(String),

    /// The item failed a structural check before parsing.
    #[error("{0}")]
    Validation(String),
}
