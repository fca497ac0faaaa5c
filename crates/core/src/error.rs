//! Error types for the MedTriage domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all MedTriage operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Gateway errors ---
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    // --- Attachment errors ---
    #[error("Attachment error: {0}")]
    Attachment(#[from] AttachmentError),

    // --- Turn input validation ---
    #[error("Message is empty")]
    EmptyMessage,

    #[error("Message exceeds {0} characters")]
    MessageTooLong(usize),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// How many characters of a gateway failure are surfaced to the user.
const DIAGNOSTIC_LIMIT: usize = 50;

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by backend, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend returned no usable text")]
    EmptyResponse,
}

impl GatewayError {
    /// A short, user-facing diagnostic: the full message truncated to
    /// [`DIAGNOSTIC_LIMIT`] characters.
    pub fn diagnostic(&self) -> String {
        let full = self.to_string();
        if full.chars().count() <= DIAGNOSTIC_LIMIT {
            return full;
        }
        let truncated: String = full.chars().take(DIAGNOSTIC_LIMIT).collect();
        format!("{truncated}...")
    }
}

#[derive(Debug, Clone, Error)]
pub enum AttachmentError {
    #[error("Unsupported attachment format: {0}")]
    UnsupportedFormat(String),

    #[error("Attachment could not be read: {0}")]
    Unreadable(String),
}
