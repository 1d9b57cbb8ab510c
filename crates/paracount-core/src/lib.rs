//! Core types and operations for the Paracount paragraph word index.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::ParagraphStore`]; the ingest pipeline,
//! search service and maintenance jobs are written against that trait.

pub mod error;
pub mod ingest;
pub mod maintenance;
pub mod paragraph;
pub mod search;
pub mod store;
pub mod tokenizer;

pub use error::{Error, Result};
