//! Field extraction
//!
//! Declarative rule tables, the hotel record they populate, and the
//! extractor that applies one to a page.

pub mod extractor;
pub mod record;
pub mod rule;

pub use extractor::FieldExtractor;
pub use record::{ExtractionResult, FailureCause, FieldError, HotelRecord, RunStatus};
pub use rule::{
    ActionKind, ActionRule, ExtractionRule, FieldValue, HotelField, RuleSet, Transform,
    TransformFn, QUERY_PLACEHOLDER,
};
