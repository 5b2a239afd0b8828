//! Unified error handling for pcibdf
//!
//! This crate provides the single error type used by the address core, the
//! topology boundary and the command line front end.

use std::io;
use std::path::PathBuf;

/// Result type alias using BdfError
pub type Result<T> = std::result::Result<T, BdfError>;

/// Unified error type for all pcibdf operations
#[derive(thiserror::Error, Debug)]
pub enum BdfError {
    // ============================================================================
    // Address Parsing Errors
    // ============================================================================
    #[error("unexpected pci address bdf format: {input:?}: {reason}")]
    Format {
        input: String,
        reason: String,
    },

    #[error("PciAddressSet is nil")]
    NilSet,

    // ============================================================================
    // I/O and File System Errors
    // ============================================================================
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("File too large: {path} ({size} bytes, max {max_size} bytes)")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Topology Provider Errors
    // ============================================================================
    #[error("Topology provider error: {0}")]
    Provider(String),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Generic(String),
}

impl BdfError {
    /// Create a format error for the given input string
    pub fn format(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Format {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a config error from a string
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a topology provider error from a string
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Whether this error came from parsing a BDF string
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }
}

impl From<String> for BdfError {
    fn from(s: String) -> Self {
        Self::Generic(s)
    }
}

impl From<&str> for BdfError {
    fn from(s: &str) -> Self {
        Self::Generic(s.to_string())
    }
}
