//! Service Layer

mod ingest;

pub use ingest::{IngestService, RewatermarkReport};
