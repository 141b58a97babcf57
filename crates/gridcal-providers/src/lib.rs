//! Grid-operator calendar retrieval.
//!
//! This crate fetches event data from seven grid operators and hands it to
//! the `gridcal-core` merge engine:
//!
//! - [`Source`] - The closed set of operators and their output metadata
//! - [`Fetcher`] - The HTTP seam, with [`HttpFetcher`] for production use
//! - [`SchemaAdapter`] - Per-family conversion of operator payloads
//! - [`sync::run`] - Retrieve, deduplicate and build one operator's document
//! - [`ProviderError`] - Error types for retrieval
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐ ┌──────────────┐ ┌──────────────┐ ┌──────────────┐
//! │ JSON listing │ │  HTML page   │ │ JSON events  │ │ category ICS │
//! │ CAISO, MISO  │ │    ERCOT     │ │ ISO-NE, SPP  │ │  NYISO, PJM  │
//! └──────┬───────┘ └──────┬───────┘ └──────┬───────┘ └──────┬───────┘
//!        │ per-event ICS  │ batch ICS      │ EventRecord    │
//!        └────────────────┴───────┬────────┴────────────────┘
//!                                 ▼ collect()
//!                          ┌─────────────┐
//!                          │   Harvest   │  raw event blocks
//!                          └──────┬──────┘
//!                                 ▼ Deduplicator
//!                          ┌─────────────┐
//!                          │  Document   │
//!                          └─────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use gridcal_providers::{HttpConfig, HttpFetcher, Source, SyncOptions, SyncOutcome, sync};
//!
//! let fetcher = HttpFetcher::new(&HttpConfig::default())?;
//! match sync::run(Source::Pjm, &fetcher, &SyncOptions::default(), chrono::Utc::now()).await? {
//!     SyncOutcome::Built { document, .. } => println!("{}", document.render()),
//!     SyncOutcome::Empty { .. } => println!("No events found."),
//! }
//! ```

pub mod adapter;
pub mod collect;
pub mod error;
pub mod fetch;
pub mod source;
pub mod sync;

#[cfg(test)]
mod testing;

// Re-export main types at crate root
pub use adapter::{EventRef, SchemaAdapter};
pub use collect::Harvest;
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use fetch::{BoxFuture, FetchRequest, Fetcher, HttpConfig, HttpFetcher};
pub use source::Source;
pub use sync::{SyncOptions, SyncOutcome, SyncStats};
