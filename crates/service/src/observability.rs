use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static STORE_LOADS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "game_data_store_loads_total",
        "Collection loads by data type",
        &["data_type"]
    )
    .expect("register store_loads_total")
});

pub static STORE_LOAD_FALLBACKS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "game_data_store_load_fallbacks_total",
        "Loads that fell back to the default because the backing file was unreadable or corrupt",
        &["data_type"]
    )
    .expect("register store_load_fallbacks_total")
});

pub static STORE_SAVES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "game_data_store_saves_total",
        "Successful collection saves by data type",
        &["data_type"]
    )
    .expect("register store_saves_total")
});

pub static STORE_SAVE_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "game_data_store_save_failures_total",
        "Failed collection saves by data type",
        &["data_type"]
    )
    .expect("register store_save_failures_total")
});

pub static UPLOADED_FILES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "game_data_uploaded_files_total",
        "Total submission files stored"
    )
    .expect("register uploaded_files_total")
});

/// Render the default registry in the Prometheus text format.
pub fn encode_metrics() -> Result<String, String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| format!("metrics encode error: {e}"))?;
    String::from_utf8(buffer).map_err(|e| format!("metrics encode error: {e}"))
}
