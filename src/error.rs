//! Crate-level error types
//!
//! Only process-level failures live here. Everything that can go wrong inside
//! a capture cycle is a [`CaptureError`](crate::capture::CaptureError) and is
//! absorbed by the orchestrator.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Result alias for server and lifecycle operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for server startup and lifecycle operations
#[derive(Debug)]
pub enum Error {
    /// Generic I/O failure
    Io(std::io::Error),
    /// Listening socket could not be bound
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    /// Scratch directory could not be created or cleared
    Scratch {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Invalid configuration value
    Config(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Bind { addr, source } => write!(f, "Failed to bind {}: {}", addr, source),
            Error::Scratch { path, source } => {
                write!(f, "Scratch directory {} unusable: {}", path.display(), source)
            }
            Error::Config(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Bind { source, .. } | Error::Scratch { source, .. } => Some(source),
            Error::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
