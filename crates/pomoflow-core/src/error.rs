//! Core error types for pomoflow-core.
//!
//! This module defines the error hierarchy using thiserror. Worker faults
//! are deliberately absent: the worker reports protocol problems as
//! [`crate::protocol::WorkerEvent::Error`] events and never propagates them
//! as hard failures.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomoflow-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The worker task is gone and can no longer accept commands
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerGone),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to prepare the data directory
    #[error("Failed to prepare data directory {path}: {message}")]
    DataDirFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse a configuration value
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Unknown dot-path configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// The countdown worker's command channel is closed (task terminated).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("countdown worker is no longer running")]
pub struct WorkerGone;

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
