//! Error types for IKEv2 MOBIKE operations
//!
//! This module defines a unified error type for the MOBIKE task, its
//! notify payload codec and the collaborators it drives.

use std::fmt;

/// Result type for IPSec operations
pub type Result<T> = std::result::Result<T, Error>;

/// IPSec protocol errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid IKEv2 payload
    InvalidPayload(String),

    /// Invalid payload or field length
    InvalidLength {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Buffer too short for operation
    BufferTooShort {
        /// Required length
        required: usize,
        /// Available length
        available: usize,
    },

    /// Invalid configuration or call parameter
    InvalidParameter(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidPayload(msg) => write!(f, "Invalid IKE payload: {}", msg),
            Error::InvalidLength { expected, actual } => {
                write!(f, "Invalid length: expected {}, got {}", expected, actual)
            }
            Error::BufferTooShort {
                required,
                available,
            } => {
                write!(
                    f,
                    "Buffer too short: need {} bytes, have {}",
                    required, available
                )
            }
            Error::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
