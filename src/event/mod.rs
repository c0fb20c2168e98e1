//! Event data types shared by the extractors, the normalizer and the writers.
//!
//! # Module Organization
//!
//! - [`record`]: The six-column [`EventRecord`] and its [`FieldValue`] cells
//! - [`constants`]: Output header, defaults and the compiled line patterns

pub mod constants;
pub mod record;

// Re-export commonly used types
pub use constants::*;
pub use record::*;
