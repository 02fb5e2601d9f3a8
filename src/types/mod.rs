//! Data types for the extraction orchestration library.

pub mod chunk;
pub mod config;
pub mod outcome;
