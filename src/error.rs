//! Error handling and custom error types
//!
//! Provides unified error handling across the crate using thiserror.

use crate::models::MAX_SCENES;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(String),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response from image service: {0}")]
    UnexpectedResponse(String),

    #[error("Image service error (status {status}): {body}")]
    Server { status: u16, body: String },

    #[error("Invalid image data: {0}")]
    InvalidImageData(String),

    #[error("No valid scenes provided")]
    EmptyInput,

    #[error("Too many scenes: {0} (maximum is {max})", max = MAX_SCENES)]
    TooManyScenes(usize),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invariant violation: {0}")]
    Invariant(String),
}

impl Error {
    /// Whether another attempt against the image service could succeed.
    ///
    /// Transport failures, unreadable responses and non-200 statuses are
    /// transient; everything else is decided before or independently of the
    /// network and fails fast.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Transport(_) | Error::UnexpectedResponse(_) | Error::Server { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
