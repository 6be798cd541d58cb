/// Why a job ended in `Errored`. The display form is the status line shown to
/// the user, prefixed by the stage that failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrchestratorError {
    #[error("{0}")]
    Validation(String),

    #[error("Failed to get upload URL: {0}")]
    Issuance(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Resize failed: {0}")]
    Transform(String),

    #[error("Failed to fetch resized image: {0}")]
    Fetch(String),
}
