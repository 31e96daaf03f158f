//! Error types for the agent and its payload decoders.
//!
//! All errors implement `std::error::Error` and carry enough structured context
//! to log a dropped message without re-parsing it.
//!
//! ## Error Categories
//!
//! - **Decode Errors**: wrong port, truncated frames, unknown sensor types
//! - **Uplink Errors**: malformed uplink documents from the transport
//! - **Device Errors**: device identity lookups that failed
//! - **Connection Errors**: transport failures, retried under a backoff policy
//! - **Config Errors**: unreadable or invalid configuration
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use iot_agent::AgentError;
//!
//! let error = AgentError::connection_failed("broker unreachable");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//!
//! let error = AgentError::InvalidPort { expected: 2, found: 5 };
//! assert!(!error.is_retryable());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for agent operations.
pub type Result<T, E = AgentError> = std::result::Result<T, E>;

/// Main error type for agent operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AgentError {
    #[error("Invalid port: expected {expected}, found {found}")]
    InvalidPort { expected: u16, found: u16 },

    #[error(
        "Frame truncated at offset {offset}: tag {tag:#04x} needs {needed} bytes, {available} available"
    )]
    FrameTruncated { offset: usize, tag: u8, needed: usize, available: usize },

    #[error("Malformed uplink: {details}")]
    Uplink { details: String },

    #[error("No decoder registered for sensor type '{sensor_type}'")]
    UnknownSensorType { sensor_type: String },

    #[error("Device lookup failed for {dev_eui}: {reason}")]
    DeviceLookup {
        dev_eui: String,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Transport connection failed: {reason}")]
    Connection {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Configuration error in {context}: {details}")]
    Config { context: String, details: String },

    #[error("Config file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AgentError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            AgentError::Connection { .. } => true,
            AgentError::DeviceLookup { .. } => true,
            AgentError::InvalidPort { .. } => false,
            AgentError::FrameTruncated { .. } => false,
            AgentError::Uplink { .. } => false,
            AgentError::UnknownSensorType { .. } => false,
            AgentError::Config { .. } => false,
            AgentError::File { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            AgentError::InvalidPort { .. } => vec![
                "Check the device is configured to uplink on the application port",
                "Verify the decoder selected for this device type",
            ],
            AgentError::FrameTruncated { .. } => vec![
                "Check the device firmware emits complete frames",
                "Verify the uplink payload was not cut by the network server",
            ],
            AgentError::Uplink { .. } => vec![
                "Check the network server integration format",
                "Verify the payload data field is base64 encoded",
            ],
            AgentError::UnknownSensorType { .. } => vec![
                "Register a decoder for the sensor type",
                "Check the sensor type recorded in device management",
            ],
            AgentError::DeviceLookup { .. } => vec![
                "Ensure the device management service is reachable",
                "Check the device is registered with this devEUI",
            ],
            AgentError::Connection { .. } => vec![
                "Ensure the message broker is reachable",
                "Check broker credentials",
                "Increase the reconnect attempt limit",
            ],
            AgentError::Config { .. } => vec![
                "Check the configuration file syntax",
                "Verify required environment variables are set",
            ],
            AgentError::File { .. } => vec![
                "Check the configuration file exists and is readable",
                "Check file permissions",
            ],
        }
    }

    /// Helper constructor for connection errors.
    pub fn connection_failed(reason: impl Into<String>) -> Self {
        AgentError::Connection { reason: reason.into(), source: None }
    }

    /// Helper constructor for connection errors with source.
    pub fn connection_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        AgentError::Connection { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for device lookup errors.
    pub fn device_lookup_failed(dev_eui: impl Into<String>, reason: impl Into<String>) -> Self {
        AgentError::DeviceLookup { dev_eui: dev_eui.into(), reason: reason.into(), source: None }
    }

    /// Helper constructor for malformed uplinks.
    pub fn uplink(details: impl Into<String>) -> Self {
        AgentError::Uplink { details: details.into() }
    }

    /// Helper constructor for configuration errors.
    pub fn config(context: impl Into<String>, details: impl Into<String>) -> Self {
        AgentError::Config { context: context.into(), details: details.into() }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        AgentError::File { path, source }
    }
}

impl From<std::io::Error> for AgentError {
    fn from(err: std::io::Error) -> Self {
        AgentError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}
