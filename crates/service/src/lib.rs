//! Service layer: the data-type keyed document store and the upload sink.
//! - `storage` owns the closed data-type registry and the JSON-file backend.
//! - `file` holds other file-backed services (screenshot uploads).
//! - `observability` exposes Prometheus counters for degraded loads and saves.

pub mod errors;
pub mod runtime;
pub mod storage;
pub mod file;
pub mod observability;
