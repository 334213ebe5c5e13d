//! C ABI boundary for `cybo_engine`.
//!
//! Wraps the kernel with an opaque-handle export surface for foreign
//! callers. No engine logic lives here: this crate owns the handle
//! registry, the string ownership convention and the status codes, and
//! delegates everything else to the kernel.
//!
//! Ownership rules:
//!   - handles are generation-tagged tokens; destroyed handles are detected
//!   - strings are transferred to the caller and freed with
//!     `cg_string_release`
//!   - absent or invalid results are the null handle / null string sentinel

pub mod api;
pub mod boundary_string;
pub mod handle;
pub mod logging;
pub mod registry;
pub mod status;

pub use boundary_string::BoundaryString;
pub use handle::EngineHandle;
pub use status::CgStatus;
