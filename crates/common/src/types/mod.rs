use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire envelope shared by every JSON endpoint:
/// `{success, data?, message?, error?}` with absent fields omitted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Envelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    pub fn data(data: Value) -> Self {
        Self { success: true, data: Some(data), message: None, error: None }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self { success: true, data: None, message: Some(message.into()), error: None }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self { success: false, data: None, message: None, error: Some(error.into()) }
    }
}

/// One stored upload as returned to the client.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub url: String,
    #[serde(rename = "fileName")]
    pub file_name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UploadResponse {
    pub success: bool,
    pub files: Vec<UploadedFile>,
}
