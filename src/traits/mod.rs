//! Core trait abstractions for the extraction library.
//!
//! These traits define the interfaces that applications implement to
//! supply extractor definitions and the text-generation capability.

pub mod extractor;
pub mod generator;

pub use extractor::Extractor;
pub use generator::Generator;
