//! Status codes returned across the C ABI.

use cybo_engine::EngineError;

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CgStatus {
    Ok = 0,
    InvalidHandle = 1,
    ResourceNotFound = 2,
    AllocationFailure = 3,
    EncodingFailure = 4,
    TickOverflow = 5,
    InvalidArgument = 6,
    /// A panic was caught at the boundary; the call had no effect that can
    /// be relied on.
    Panicked = 7,
}

impl CgStatus {
    pub fn is_ok(self) -> bool {
        self == CgStatus::Ok
    }
}

impl From<&EngineError> for CgStatus {
    fn from(err: &EngineError) -> Self {
        match err {
            EngineError::InvalidHandle => CgStatus::InvalidHandle,
            EngineError::ResourceNotFound { .. } => CgStatus::ResourceNotFound,
            EngineError::AllocationFailure(_) => CgStatus::AllocationFailure,
            EngineError::Encoding(_) => CgStatus::EncodingFailure,
            EngineError::TickOverflow(_) => CgStatus::TickOverflow,
            EngineError::InvalidTexture { .. }
            | EngineError::Config(_)
            | EngineError::Snapshot(_)
            | EngineError::Invariant { .. } => CgStatus::InvalidArgument,
        }
    }
}
