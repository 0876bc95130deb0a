//! Storage and messaging collaborators used by the pipeline handlers.
//!
//! Like the log backends these are traits, injected by the caller.

use thiserror::Error;

mod notifier;
mod store;

pub use notifier::{LogNotifier, Notifier, RecordingNotifier};
pub use store::{InMemoryObjectStore, LocalObjectStore, ObjectStore};

#[cfg(feature = "http")]
pub use notifier::WebhookNotifier;

/// Errors from storage and messaging collaborators.
#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Not configured: {0}")]
    NotConfigured(String),
}
