//! Resizer API Library
//!
//! HTTP handlers for upload URL issuance and image transforms, plus the
//! object routes that front the local storage backend.

mod api_doc;
mod handlers;
mod telemetry;

pub mod error;
pub mod setup;
pub mod state;

pub use error::HttpAppError;
pub use state::AppState;
