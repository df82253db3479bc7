//! # Glosa
//!
//! Ingestion and search for Czech/Slovak biblical commentary collected from
//! static HTML pages and forwarded-email JSON exports.
//!
//! Glosa takes free-form, hand-typed citation strings ("Lk 3,10-18",
//! "Jn 1, 10 – 18"), parses them into structured references, builds
//! canonical records with a stable content fingerprint, suppresses
//! duplicates, and serves full-text and verse-range queries over SQLite.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌───────────────────────────┐   ┌──────────┐
//! │  Drivers    │──▶│  Pipeline                 │──▶│  SQLite  │
//! │  JSON/HTML  │   │ normalize→parse→build→dedup│   │ FTS5     │
//! └─────────────┘   └───────────────────────────┘   └────┬─────┘
//!                                                        │
//!                                      ┌─────────────────┤
//!                                      ▼                 ▼
//!                                 ┌──────────┐     ┌──────────┐
//!                                 │   CLI    │     │   HTTP   │
//!                                 │ (glosa)  │     │  (JSON)  │
//!                                 └──────────┘     └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`normalize`] | Whitespace and citation normalization |
//! | [`reference`] | Two-tier citation parsing |
//! | [`record`] | Canonical record construction, fingerprint, viewer URL |
//! | [`connector_json`] | Forwarded-email JSON export driver |
//! | [`connector_html`] | Static HTML page driver |
//! | [`ingest`] | Pipeline orchestration and batch reports |
//! | [`store`] | SQLite writes, hash lookups, range and text queries |
//! | [`query`] | CLI search/range commands |
//! | [`server`] | JSON HTTP API |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod config;
pub mod connector_html;
pub mod connector_json;
pub mod db;
pub mod error;
pub mod ingest;
pub mod migrate;
pub mod models;
pub mod normalize;
pub mod query;
pub mod record;
pub mod reference;
pub mod server;
pub mod sources;
pub mod store;
