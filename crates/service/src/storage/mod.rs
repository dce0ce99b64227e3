//! Collection storage for the game frontend.
//!
//! `data_type` is the closed registry, `document_store` the trait the HTTP
//! layer talks to, and `json_file_store` the file-per-collection backend.

pub mod data_type;
pub mod document_store;
pub mod json_file_store;

pub use data_type::{DataType, Shape};
pub use document_store::{DocumentStore, LoadOutcome};
pub use json_file_store::JsonFileStore;
