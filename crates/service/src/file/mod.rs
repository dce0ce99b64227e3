//! File-backed services other than the collection store.

pub mod upload_store;
