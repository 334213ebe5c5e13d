#![forbid(unsafe_code)]

//! Cybo engine kernel.
//!
//! Owns all mutable engine state: the tick counter, the resource table and
//! the per-tick view. Nothing in this crate knows about raw pointers or the
//! C ABI; `cybo_ffi` wraps it for foreign callers.

/// Engine format version. Bound into every fingerprint and snapshot.
pub const ENGINE_VERSION: u32 = 1;

pub mod config;
pub mod engine;
pub mod error;
pub mod hashing;
pub mod ids;
pub mod invariants;
pub mod resources;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod view;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use ids::{well_known_string_kind_id, ResourceKind, StringId, TextureId};
pub use resources::{ResourceTable, TextureDesc};
pub use tick::TickCounter;
pub use view::EngineView;
