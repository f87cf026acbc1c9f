//! Error types for the Lumen engine
//!
//! This module defines the error types used throughout the engine,
//! including backend failures, buffer access violations and GPU
//! synchronization failures.

use std::fmt;
use std::time::Duration;

use crate::renderer::BufferKind;

/// Result type for Lumen engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// CPU access attempted on a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// CPU read from mapped memory
    Read,
    /// CPU write into mapped memory
    Write,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Read => write!(f, "read"),
            Access::Write => write!(f, "write"),
        }
    }
}

/// Lumen engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (OpenGL, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (texture, buffer, framebuffer, etc.)
    InvalidResource(String),

    /// Initialization failed (engine, renderer, subsystems)
    InitializationFailed(String),

    /// A STATIC buffer was created without initial data
    MissingInitialData {
        buffer: String,
    },

    /// The buffer kind forbids the attempted CPU access
    CapabilityViolation {
        buffer: String,
        kind: BufferKind,
        access: Access,
    },

    /// The access would overrun the fixed buffer capacity
    CapacityExceeded {
        buffer: String,
        requested: u64,
        capacity: u64,
    },

    /// Waiting on a slot fence failed; the slot is NOT known to be safe
    SyncFailed {
        slot: usize,
        reason: String,
    },

    /// A slot fence did not signal before the configured deadline
    SyncTimeout {
        slot: usize,
        waited: Duration,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::MissingInitialData { buffer } => {
                write!(f, "Static buffer '{}' requires initial data", buffer)
            }
            Error::CapabilityViolation { buffer, kind, access } => {
                write!(f, "Buffer '{}' of kind {:?} does not allow CPU {}", buffer, kind, access)
            }
            Error::CapacityExceeded { buffer, requested, capacity } => write!(
                f,
                "Buffer '{}' capacity exceeded: {} bytes requested, capacity is {} bytes",
                buffer, requested, capacity
            ),
            Error::SyncFailed { slot, reason } => {
                write!(f, "Fence wait failed on slot {}: {}", slot, reason)
            }
            Error::SyncTimeout { slot, waited } => {
                write!(f, "Fence on slot {} still pending after {:?}", slot, waited)
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
