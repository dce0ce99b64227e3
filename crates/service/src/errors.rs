use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unknown data type: {0}")]
    UnknownDataType(String),
    #[error("failed to load {data_type}: {reason}")]
    LoadFailure { data_type: String, reason: String },
    #[error("failed to save {data_type}: {reason}")]
    SaveFailure { data_type: String, reason: String },
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    #[error("upload error: {0}")]
    Upload(String),
}

impl ServiceError {
    pub fn load(data_type: &str, reason: impl ToString) -> Self {
        Self::LoadFailure { data_type: data_type.to_string(), reason: reason.to_string() }
    }

    pub fn save(data_type: &str, reason: impl ToString) -> Self {
        Self::SaveFailure { data_type: data_type.to_string(), reason: reason.to_string() }
    }

    /// Whether the caller sent something the service cannot act on.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::UnknownDataType(_) | Self::MalformedRequest(_))
    }
}
