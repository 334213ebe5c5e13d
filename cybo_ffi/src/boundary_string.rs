//! Owned UTF-8 buffers handed to the foreign caller.
//!
//! Convention, used by every string-returning export:
//!
//! - bytes are UTF-8, length explicit, no terminator (U+0000 is payload);
//! - the buffer is a fresh copy that never aliases engine memory;
//! - ownership transfers to the caller, who releases it exactly once with
//!   `cg_string_release`;
//! - `ptr == null` is the absent/invalid sentinel. An empty string has a
//!   non-null `ptr` and `len == 0`.

use std::ptr;

use cybo_engine::{EngineError, Result};

#[repr(C)]
#[derive(Debug)]
pub struct BoundaryString {
    pub ptr: *const u8,
    pub len: usize,
}

impl BoundaryString {
    pub const NULL: BoundaryString = BoundaryString {
        ptr: ptr::null(),
        len: 0,
    };

    /// Copy `text` into a caller-owned buffer.
    pub fn copy_from(text: &str) -> Result<Self> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(text.len())
            .map_err(|e| EngineError::AllocationFailure(e.to_string()))?;
        buf.extend_from_slice(text.as_bytes());
        let bytes: Box<[u8]> = buf.into_boxed_slice();
        let len = bytes.len();
        let ptr = Box::into_raw(bytes) as *mut u8 as *const u8;
        Ok(Self { ptr, len })
    }

    pub fn is_null(&self) -> bool {
        self.ptr.is_null()
    }

    /// Borrow the bytes, or `None` for the sentinel.
    ///
    /// # Safety
    /// `self` must come from [`BoundaryString::copy_from`] and not have been
    /// released.
    pub unsafe fn as_bytes(&self) -> Option<&[u8]> {
        if self.is_null() {
            return None;
        }
        Some(std::slice::from_raw_parts(self.ptr, self.len))
    }

    /// Free the buffer. The sentinel is a no-op.
    ///
    /// # Safety
    /// `self` must come from [`BoundaryString::copy_from`] with `ptr` and
    /// `len` unmodified, and must not have been released before.
    pub unsafe fn release(self) {
        if self.is_null() {
            return;
        }
        let slice = ptr::slice_from_raw_parts_mut(self.ptr as *mut u8, self.len);
        drop(Box::from_raw(slice));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_bytes() {
        let s = BoundaryString::copy_from("hello").unwrap();
        assert!(!s.is_null());
        assert_eq!(s.len, 5);
        unsafe {
            assert_eq!(s.as_bytes(), Some(&b"hello"[..]));
            s.release();
        }
    }

    #[test]
    fn empty_string_is_not_the_sentinel() {
        let s = BoundaryString::copy_from("").unwrap();
        assert!(!s.is_null());
        assert_eq!(s.len, 0);
        unsafe {
            assert_eq!(s.as_bytes(), Some(&b""[..]));
            s.release();
        }
    }

    #[test]
    fn nul_code_point_survives() {
        let s = BoundaryString::copy_from("a\0b").unwrap();
        unsafe {
            assert_eq!(s.as_bytes(), Some(&b"a\0b"[..]));
            s.release();
        }
    }

    #[test]
    fn sentinel_release_is_noop() {
        let s = BoundaryString::NULL;
        unsafe {
            assert_eq!(s.as_bytes(), None);
            s.release();
        }
    }
}
