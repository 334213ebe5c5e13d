//! Tick counter.
//!
//! Checked arithmetic only. An overflowing advance is reported and leaves
//! the counter where it was.

use crate::error::{EngineError, Result};

/// Monotonic count of completed ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TickCounter(u64);

impl TickCounter {
    pub const fn new() -> Self {
        Self(0)
    }

    /// Counter resumed at a known value (snapshot restore).
    pub const fn at(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Advance by exactly one. Returns the new value.
    pub fn advance(&mut self) -> Result<u64> {
        let next = self
            .0
            .checked_add(1)
            .ok_or(EngineError::TickOverflow(self.0))?;
        self.0 = next;
        Ok(next)
    }
}
