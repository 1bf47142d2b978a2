pub mod aggregator;
pub mod failure_writer;
pub mod locator;
pub mod renderer;
pub mod store;

pub use aggregator::{aggregate, ConfidenceReport, DocumentStats, PageStats};
pub use failure_writer::FailureWriter;
pub use locator::{locate, Library};
pub use store::{CachedFetch, OutputLayout};
