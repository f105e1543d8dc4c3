//! QuillDB - typed tuples, bound-parameter encoding, and a statement
//! pipeline for a relational engine
//!
//! This library provides:
//! - A schema/column model and schema-driven tuple construction with
//!   pooled allocation for variable-length values
//! - A three-buffer bound-parameter encoding shared with out-of-band
//!   consumers such as statistics recorders
//! - A parse -> plan -> execute statement pipeline with transaction
//!   scoping and a direct table-creation path
//! - The compact engine collaborators (SQL front end, plan builder,
//!   in-memory executor, catalog, transaction manager) the pipeline
//!   drives
//! - Test fixtures built entirely on the public surface

pub mod catalog;
pub mod error;
pub mod executor;
pub mod metrics;
pub mod pipeline;
pub mod sql;
pub mod storage;
pub mod testing;
pub mod transaction;

pub use error::{Error, Result};
