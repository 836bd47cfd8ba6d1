pub mod config;
pub mod schema;
pub mod validator;
pub mod transformation;
pub mod client;
pub mod index;
pub mod insert;
pub mod query;
pub mod metadata;

pub use client::VectorizeClient;
pub use config::ConnectionConfig;
pub use schema::*;
pub use transformation::{batch_vectors, format_vectors, DEFAULT_BATCH_SIZE};
pub use validator::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VectorizeError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Vector '{id}' has {actual} dimensions, index expects {expected}")]
    DimensionMismatch {
        id: String,
        expected: usize,
        actual: usize,
    },
    #[error("Vectorize API error on {endpoint}: {message}")]
    RemoteApi {
        endpoint: String,
        status: Option<u16>,
        message: String,
        errors: Vec<ApiError>,
    },
    #[error("Transport error on {endpoint}: {message}")]
    Transport {
        endpoint: String,
        status: Option<u16>,
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },
}

impl VectorizeError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        VectorizeError::InvalidArgument(message.into())
    }

    /// HTTP status of the failed exchange, when the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            VectorizeError::RemoteApi { status, .. } | VectorizeError::Transport { status, .. } => {
                *status
            }
            _ => None,
        }
    }

    /// True for errors raised before any request left the process.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            VectorizeError::InvalidArgument(_) | VectorizeError::DimensionMismatch { .. }
        )
    }
}

pub type VectorizeResult<T> = Result<T, VectorizeError>;

#[cfg(test)]
mod tests;
