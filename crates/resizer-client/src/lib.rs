//! Client side of the resizer.
//!
//! `ApiClient` speaks the HTTP protocol; `Orchestrator` drives one
//! upload → resize → fetch job through it and reports each state change to a
//! `JobObserver`. Front ends own the observer and never touch HTTP.

pub mod api;
pub mod config;
pub mod error;
pub mod orchestrator;

pub use api::{ApiClient, HttpFailure};
pub use bytes::Bytes;
pub use config::ClientConfig;
pub use error::OrchestratorError;
pub use orchestrator::{
    JobObserver, JobState, Orchestrator, ResizeRequest, ResizedImage, SelectedFile,
};
