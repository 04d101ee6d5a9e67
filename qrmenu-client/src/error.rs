//! Client error types

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never got a response (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server rejected the request with an error body
    #[error("API error {status} ({code:?}): {message}")]
    Api {
        status: u16,
        code: Option<ErrorCode>,
        message: String,
    },

    /// 401; the stored session has been cleared
    #[error("Authentication required")]
    Unauthorized,

    /// Rule violation detected before reaching the server
    #[error("{0}")]
    Rejected(#[from] AppError),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Local storage failure
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Whether the server was unreachable
    ///
    /// Transport failures and 5xx answers move the stores offline; 4xx
    /// rejections are surfaced and leave the online flag alone.
    pub fn is_transport(&self) -> bool {
        match self {
            ClientError::Http(e) => e.status().is_none_or(|s| s.is_server_error()),
            ClientError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Whether the server answered but failed on this particular request
    ///
    /// 500 and other 5xx answers except the gateway and availability ones
    /// (502, 503, 504), which mean the backend itself is unreachable.
    pub fn is_server_fault(&self) -> bool {
        let status = match self {
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        };
        status.is_some_and(|s| s >= 500 && !matches!(s, 502..=504))
    }

    /// Error code of a server or local rejection
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ClientError::Api { code, .. } => *code,
            ClientError::Rejected(e) => Some(e.code),
            ClientError::Unauthorized => Some(ErrorCode::NotAuthenticated),
            _ => None,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
