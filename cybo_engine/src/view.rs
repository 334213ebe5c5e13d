//! Read-only view copied out to callers.

/// Summary of engine state as of the last completed tick.
///
/// Refreshed only when the engine ticks (and once at creation), so a caller
/// reading it between ticks sees a consistent frame even if resources were
/// registered in the meantime.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineView {
    pub tick: u64,
    pub string_count: u64,
    pub texture_count: u64,
}
