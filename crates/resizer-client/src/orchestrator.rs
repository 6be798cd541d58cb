//! Upload/resize orchestration.
//!
//! One job runs the stages strictly in order:
//!
//! ```text
//! Idle → Validating → RequestingUrl → Uploading → Transforming → FetchingResult → Ready
//! ```
//!
//! Any stage may end the job in `Errored`. There is no retry and no rollback:
//! an object uploaded before a failed transform stays in the source bucket.

use crate::api::ApiClient;
use crate::error::OrchestratorError;
use bytes::Bytes;
use resizer_core::constants::{DEFAULT_UPLOAD_CONTENT_TYPE, OUTPUT_CONTENT_TYPE};
use resizer_core::{Dimensions, ObjectKey};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Validating,
    RequestingUrl,
    Uploading,
    Transforming,
    FetchingResult,
    Ready,
    Errored,
}

impl JobState {
    /// Progress checkpoint reached on entering this state, in percent.
    /// `Errored` keeps whatever the failed stage had reached.
    pub fn progress(self) -> Option<u8> {
        match self {
            JobState::Idle | JobState::Validating => Some(0),
            JobState::RequestingUrl => Some(10),
            JobState::Uploading => Some(30),
            JobState::Transforming => Some(60),
            JobState::FetchingResult => Some(90),
            JobState::Ready => Some(100),
            JobState::Errored => None,
        }
    }

    fn status(self) -> &'static str {
        match self {
            JobState::Idle => "",
            JobState::Validating => "Starting upload process...",
            JobState::RequestingUrl => "Requesting upload URL...",
            JobState::Uploading => "Uploading your image...",
            JobState::Transforming => "Resizing your image...",
            JobState::FetchingResult => "Preparing your download...",
            JobState::Ready => "Your image is ready!",
            JobState::Errored => "",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Ready | JobState::Errored)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Receives every state change of a job. This is the only way the
/// orchestrator talks to a front end.
pub trait JobObserver {
    fn on_transition(&mut self, state: JobState, progress: u8, status: &str);
}

/// A file chosen by the user.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    /// Original filename, used to derive the object key
    pub name: String,
    /// Declared type; `application/octet-stream` when absent
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Raw user input for one job. Nothing here is validated yet.
#[derive(Debug, Clone, Default)]
pub struct ResizeRequest {
    pub file: Option<SelectedFile>,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

/// Final result of a successful job.
#[derive(Debug, Clone)]
pub struct ResizedImage {
    pub bytes: Bytes,
    pub content_type: String,
    /// `resized-<w>x<h>-<original filename>`
    pub download_name: String,
    /// Public address the bytes were fetched from
    pub source_url: String,
}

pub struct Orchestrator {
    api: ApiClient,
    max_dimension: u32,
}

struct Job<'a> {
    observer: &'a mut dyn JobObserver,
    progress: u8,
}

impl Job<'_> {
    fn enter(&mut self, state: JobState) {
        if let Some(progress) = state.progress() {
            self.progress = progress;
        }
        tracing::debug!(state = %state, progress = self.progress, "Job state changed");
        self.observer
            .on_transition(state, self.progress, state.status());
    }

    fn fail(&mut self, err: &OrchestratorError) {
        tracing::warn!(error = %err, progress = self.progress, "Job failed");
        self.observer
            .on_transition(JobState::Errored, self.progress, &err.to_string());
    }
}

impl Orchestrator {
    pub fn new(api: ApiClient, max_dimension: u32) -> Self {
        Self { api, max_dimension }
    }

    /// Run one job to completion. The observer sees `Ready` or `Errored` last.
    pub async fn run(
        &self,
        request: &ResizeRequest,
        observer: &mut dyn JobObserver,
    ) -> Result<ResizedImage, OrchestratorError> {
        let mut job = Job {
            observer,
            progress: 0,
        };

        let result = self.drive(request, &mut job).await;
        if let Err(ref err) = result {
            job.fail(err);
        }
        result
    }

    async fn drive(
        &self,
        request: &ResizeRequest,
        job: &mut Job<'_>,
    ) -> Result<ResizedImage, OrchestratorError> {
        job.enter(JobState::Validating);
        let (file, dimensions) = self.validate(request)?;
        let key = ObjectKey::from_filename(&file.name);

        job.enter(JobState::RequestingUrl);
        let upload_url = self
            .api
            .request_upload_url(&key)
            .await
            .map_err(|e| OrchestratorError::Issuance(e.to_string()))?;

        job.enter(JobState::Uploading);
        let content_type = file
            .content_type
            .as_deref()
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_UPLOAD_CONTENT_TYPE);
        self.api
            .upload(&upload_url, content_type, file.bytes.clone())
            .await
            .map_err(|e| OrchestratorError::Upload(e.to_string()))?;

        job.enter(JobState::Transforming);
        let result_url = self
            .api
            .resize(&key, dimensions)
            .await
            .map_err(|e| OrchestratorError::Transform(e.to_string()))?;

        job.enter(JobState::FetchingResult);
        let (bytes, content_type) = self
            .api
            .fetch(&result_url)
            .await
            .map_err(|e| OrchestratorError::Fetch(e.to_string()))?;

        let image = ResizedImage {
            bytes,
            content_type: content_type.unwrap_or_else(|| OUTPUT_CONTENT_TYPE.to_string()),
            download_name: format!(
                "resized-{}x{}-{}",
                dimensions.width, dimensions.height, file.name
            ),
            source_url: result_url,
        };

        job.enter(JobState::Ready);
        Ok(image)
    }

    fn validate<'r>(
        &self,
        request: &'r ResizeRequest,
    ) -> Result<(&'r SelectedFile, Dimensions), OrchestratorError> {
        let file = request
            .file
            .as_ref()
            .filter(|f| !f.name.trim().is_empty())
            .ok_or_else(|| OrchestratorError::Validation("Please select a file".to_string()))?;
        if file.bytes.is_empty() {
            return Err(OrchestratorError::Validation(
                "The selected file is empty".to_string(),
            ));
        }

        let dimensions = Dimensions::from_input(request.width, request.height, self.max_dimension)
            .map_err(|e| OrchestratorError::Validation(e.to_string()))?;

        Ok((file, dimensions))
    }
}
