// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for nanobridge.

use thiserror::Error;

/// Top-level error type for all bridge operations.
///
/// The `Display` output of each variant is what the application shell sees
/// as the rejection message, so every variant carries its cause.
#[derive(Debug, Error)]
pub enum BridgeError {
    // -- Input errors --
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("method not implemented: {0}")]
    UnknownMethod(String),

    // -- Generative-text capability --
    #[error("could not start the on-device model: {0}")]
    CapabilityUnavailable(String),

    #[error("on-device inference failed: {0}")]
    Inference(String),

    // -- Document resolution --
    #[error("could not translate document reference: {0}")]
    Decoding(String),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,

    // -- Plumbing --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse failure taxonomy used for logging and by callers that need more
/// than the message string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// A required field was absent or unusable. No capability was invoked.
    Input,
    /// A native capability could not be acquired or initialised.
    CapabilityUnavailable,
    /// The capability was invoked and failed.
    Inference,
    /// Parsing or decoding a document reference raised an error.
    Decoding,
    /// Local plumbing (config files, JSON).
    Internal,
}

impl BridgeError {
    /// Classify this error for logging and reject handling.
    pub fn class(&self) -> ErrorClass {
        match self {
            BridgeError::MissingArgument(_)
            | BridgeError::InvalidArgument { .. }
            | BridgeError::UnknownMethod(_) => ErrorClass::Input,
            BridgeError::CapabilityUnavailable(_)
            | BridgeError::Bridge(_)
            | BridgeError::PlatformUnavailable => ErrorClass::CapabilityUnavailable,
            BridgeError::Inference(_) => ErrorClass::Inference,
            BridgeError::Decoding(_) => ErrorClass::Decoding,
            BridgeError::Io(_) | BridgeError::Serialization(_) => ErrorClass::Internal,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_their_cause() {
        let err = BridgeError::Inference("model busy".into());
        assert_eq!(err.to_string(), "on-device inference failed: model busy");

        let err = BridgeError::MissingArgument("uri");
        assert_eq!(err.to_string(), "missing required argument: uri");
    }

    #[test]
    fn platform_failures_count_as_unavailable_capability() {
        assert_eq!(
            BridgeError::PlatformUnavailable.class(),
            ErrorClass::CapabilityUnavailable
        );
        assert_eq!(
            BridgeError::Bridge("JavaVM missing".into()).class(),
            ErrorClass::CapabilityUnavailable
        );
        assert_eq!(
            BridgeError::UnknownMethod("echo".into()).class(),
            ErrorClass::Input
        );
    }
}
