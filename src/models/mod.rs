pub mod alto;
pub mod record;

pub use alto::{AltoPage, BBox, TextLine, Word};
pub use record::{DocumentMetadata, PageOutcome, PageRef, PageResult, Record};
