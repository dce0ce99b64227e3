use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use common::types::UploadedFile;
use tokio::fs;
use tracing::info;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::observability::UPLOADED_FILES_TOTAL;

/// Sub-directory of the uploads root holding task-submission screenshots.
pub const SUBMISSIONS_DIR: &str = "task_submissions";

/// Upload sink for task-submission screenshots.
///
/// Layout: `<root>/task_submissions/<submission_id>/<token>_<file_name>`,
/// served back under `<public_prefix>/task_submissions/...`.
#[derive(Clone, Debug)]
pub struct UploadStore {
    root: PathBuf,
    public_prefix: String,
}

impl UploadStore {
    /// Initialize the sink, creating the submissions directory if missing.
    pub async fn new<P: Into<PathBuf>>(root: P) -> Result<Arc<Self>, ServiceError> {
        let root = root.into();
        fs::create_dir_all(root.join(SUBMISSIONS_DIR))
            .await
            .map_err(|e| ServiceError::Upload(format!("cannot create {}: {e}", root.display())))?;
        Ok(Arc::new(Self { root, public_prefix: "/uploads".to_string() }))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Use the caller's submission id when it survives sanitizing, otherwise mint one.
    pub fn resolve_submission_id(&self, requested: Option<&str>) -> String {
        requested
            .map(sanitize_component)
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string())
    }

    /// Store one file under a submission and return its public URL.
    ///
    /// `submission_id` must come from [`UploadStore::resolve_submission_id`];
    /// it is used as-is so every file of one request shares a directory.
    pub async fn save(
        &self,
        submission_id: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<UploadedFile, ServiceError> {
        if submission_id.is_empty() || sanitize_component(submission_id) != submission_id {
            return Err(ServiceError::Upload(format!("invalid submission id {submission_id:?}")));
        }
        let file_name = sanitize_file_name(original_name);
        let token = Uuid::new_v4().simple().to_string();
        let unique_name = format!("{}_{}", &token[..8], file_name);

        let dir = self.root.join(SUBMISSIONS_DIR).join(&submission_id);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| ServiceError::Upload(format!("cannot create {}: {e}", dir.display())))?;
        let path = dir.join(&unique_name);
        fs::write(&path, bytes)
            .await
            .map_err(|e| ServiceError::Upload(format!("cannot write {}: {e}", path.display())))?;

        UPLOADED_FILES_TOTAL.inc();
        info!(%submission_id, file = %unique_name, bytes = bytes.len(), "submission file stored");

        Ok(UploadedFile {
            url: format!("{}/{}/{}/{}", self.public_prefix, SUBMISSIONS_DIR, submission_id, unique_name),
            file_name,
        })
    }
}

/// Reduce a client-supplied name to a safe single path component.
/// Keeps ASCII alphanumerics, `.`, `-`, `_`; any other character becomes `_`,
/// with consecutive replacements collapsed; leading/trailing dots and
/// underscores are trimmed.
fn sanitize_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches(|c| c == '.' || c == '_').to_string()
}

pub fn sanitize_file_name(raw: &str) -> String {
    let cleaned = sanitize_component(raw);
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}
