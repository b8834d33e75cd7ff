//! Adapters layer: Concrete implementations of ports.
//!
//! These modules contain the actual integration with external libraries:
//! - `classifiers`: the three trainable risk model families
//! - `csv_dataset`: the csv crate for survey exports
//! - `sqlite`: SQLite for artifact storage
//! - `sanitize`: sensitive-data filtering for logs

pub mod classifiers;
pub mod csv_dataset;
pub mod sanitize;
pub mod sqlite;

// Re-export storage error for lib.rs
pub use sqlite::StorageError;
