//! Resource identifiers.
//!
//! Both identifier kinds are `#[repr(C)]` so they cross the C ABI by value.
//! Their numeric encoding is private to the engine: callers obtain the
//! well-known string identifier through [`well_known_string_kind_id`]
//! instead of hard-coding a value.

use std::fmt;

/// A handle for a string resource.
#[derive(Clone, Copy, Eq, Hash, PartialEq, Ord, PartialOrd, Debug)]
#[repr(C)]
pub struct StringId {
    pub id: u64,
}

impl StringId {
    /// The engine-defined string every engine carries from creation.
    pub const WELL_KNOWN: StringId = StringId { id: 0 };

    pub const fn new(id: u64) -> Self {
        Self { id }
    }
}

/// A handle for a texture resource. Zero never names a live texture.
#[derive(Clone, Copy, Eq, Hash, PartialEq, Ord, PartialOrd, Debug)]
#[repr(C)]
pub struct TextureId {
    pub id: u64,
}

impl TextureId {
    pub const INVALID: TextureId = TextureId { id: 0 };

    pub const fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn is_valid(self) -> bool {
        self.id != 0
    }
}

/// Resource categories held by a [`crate::ResourceTable`].
///
/// Only `String` resolves to a payload across the boundary today; the enum
/// is the extension point for further kinds.
#[derive(Clone, Copy, Eq, Hash, PartialEq, Debug)]
pub enum ResourceKind {
    String,
    Texture,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::String => f.write_str("string"),
            ResourceKind::Texture => f.write_str("texture"),
        }
    }
}

/// Identifier of the well-known string resource.
///
/// Pure query with no side effects. Returns the same value for the life of
/// the process.
pub const fn well_known_string_kind_id() -> StringId {
    StringId::WELL_KNOWN
}
