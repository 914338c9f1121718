pub mod api;
pub mod error;
pub mod ingest;
pub mod settings;
pub mod types;
pub mod validation;

#[cfg(test)]
mod serde_tests;
