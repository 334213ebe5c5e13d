//! Opaque engine handle.
//!
//! A handle is a slot index plus a generation tag packed into 64 bits. It is
//! never a memory address, so a destroyed or forged handle is detected by
//! the registry instead of being dereferenced.
//!
//! Layout of `raw`: high 32 bits generation, low 32 bits slot index.
//! Generations start at 1, so no live handle is ever `raw == 0`.

/// Token the foreign caller holds for one live engine. Treat as opaque bits.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EngineHandle {
    pub raw: u64,
}

impl EngineHandle {
    /// Returned when creation fails; rejected by every operation.
    pub const NULL: EngineHandle = EngineHandle { raw: 0 };

    pub(crate) const fn pack(index: u32, generation: u32) -> Self {
        Self {
            raw: ((generation as u64) << 32) | index as u64,
        }
    }

    /// `(index, generation)`.
    pub(crate) const fn unpack(self) -> (u32, u32) {
        (self.raw as u32, (self.raw >> 32) as u32)
    }

    pub const fn is_null(self) -> bool {
        self.raw == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack() {
        let handle = EngineHandle::pack(7, 3);
        assert_eq!(handle.unpack(), (7, 3));
        assert!(!handle.is_null());
    }

    #[test]
    fn first_slot_is_not_null() {
        assert!(!EngineHandle::pack(0, 1).is_null());
        assert!(EngineHandle::NULL.is_null());
        assert_eq!(EngineHandle::default(), EngineHandle::NULL);
    }
}
