//! Loader and reporting pipeline for a small school-roster dataset: ingest
//! rooms and students from JSON into SQLite with idempotent upserts, then
//! run four fixed aggregate reports.

pub mod db;
pub mod error;
pub mod load;
pub mod model;
pub mod reader;
pub mod report;

pub use error::LoadError;
