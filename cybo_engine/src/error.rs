//! Error taxonomy for the kernel.
//!
//! Absence of a resource on lookup is not an error (`Option::None`); the
//! `ResourceNotFound` variant is only raised by operations that require the
//! resource to exist, such as dropping a texture.

use thiserror::Error;

use crate::config::ConfigError;
use crate::ids::ResourceKind;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Null, destroyed or foreign engine handle.
    #[error("invalid engine handle")]
    InvalidHandle,

    #[error("{kind} resource {id} not found")]
    ResourceNotFound { kind: ResourceKind, id: u64 },

    #[error("allocation failure: {0}")]
    AllocationFailure(String),

    /// Bytes offered as a string payload are not UTF-8.
    #[error("payload is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("tick counter overflow at tick {0}")]
    TickOverflow(u64),

    #[error("invalid texture dimensions {width}x{height} (limit {limit})")]
    InvalidTexture { width: u32, height: u32, limit: u32 },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("invariant violation: [{rule}] {detail}")]
    Invariant { rule: &'static str, detail: String },
}

pub type Result<T> = std::result::Result<T, EngineError>;
