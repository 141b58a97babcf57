//! Core types: event records, block parsing, dedup, document building, validation
//!
//! Data flows through the crate in one direction:
//!
//! ```text
//! operator ICS text ──► block::all_events / first_event ──► RawBlock ─┐
//! operator JSON ─────► (adapters) ──► EventRecord::to_block ──────────┤
//!                                                                     ▼
//!                                                  dedup::Deduplicator
//!                                                                     ▼
//!                                       document::DocumentBuilder ──► Document
//!                                                                     ▼
//!                                         validate::validate_document (later)
//! ```

pub mod block;
pub mod dedup;
pub mod document;
pub mod event;
pub mod text;
pub mod time;
pub mod tracing;
pub mod validate;

pub use block::{BlockKind, BlockScan, CRLF, RawBlock, all_events, first_event, first_timezone};
pub use dedup::{BatchStats, Deduplicator, MissingIdentity, Rejection};
pub use document::{CalendarHeader, Document, DocumentBuilder, fixed_timezone};
pub use event::EventRecord;
pub use text::{escape_text, html_to_text, unescape_text};
pub use time::{DateWindow, EventTime, month_sequence};
pub use crate::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
pub use validate::{Issue, ValidationReport, Verdict, validate_document};
