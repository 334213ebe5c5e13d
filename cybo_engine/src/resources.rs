//! Resource table.
//!
//! Strings and texture descriptors keyed by stable identifiers. BTreeMap
//! keeps iteration in id order so fingerprints and snapshots are
//! deterministic. Identifiers are allocated sequentially and never reused.
//!
//! String records are permanent for the life of the engine. Texture
//! descriptors can be dropped explicitly.

use std::collections::BTreeMap;

use crate::error::{EngineError, Result};
use crate::ids::{ResourceKind, StringId, TextureId};

/// Dimensions of a registered texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTable {
    strings: BTreeMap<StringId, String>,
    textures: BTreeMap<TextureId, TextureDesc>,
    next_string_id: u64,
    next_texture_id: u64,
}

impl ResourceTable {
    /// Table holding the well-known string followed by `seeds` (ids 1..=n).
    pub fn seeded(well_known_text: &str, seeds: &[String]) -> Self {
        let mut strings = BTreeMap::new();
        strings.insert(StringId::WELL_KNOWN, well_known_text.to_string());
        let mut next_string_id = StringId::WELL_KNOWN.id + 1;
        for text in seeds {
            strings.insert(StringId::new(next_string_id), text.clone());
            next_string_id += 1;
        }
        Self {
            strings,
            textures: BTreeMap::new(),
            next_string_id,
            next_texture_id: 1,
        }
    }

    /// Reassemble a table from stored records. Callers validate the result
    /// with [`crate::invariants::try_validate_invariants`].
    pub(crate) fn from_records(
        strings: BTreeMap<StringId, String>,
        textures: BTreeMap<TextureId, TextureDesc>,
        next_string_id: u64,
        next_texture_id: u64,
    ) -> Self {
        Self {
            strings,
            textures,
            next_string_id,
            next_texture_id,
        }
    }

    /// Look up a string. Unknown ids are absent, not an error.
    pub fn get_string(&self, id: StringId) -> Option<&str> {
        self.strings.get(&id).map(String::as_str)
    }

    pub fn register_string(&mut self, text: &str) -> Result<StringId> {
        let id = StringId::new(self.next_string_id);
        self.next_string_id = self.next_string_id.checked_add(1).ok_or_else(|| {
            EngineError::AllocationFailure("string id space exhausted".to_string())
        })?;
        self.strings.insert(id, text.to_string());
        Ok(id)
    }

    /// Register raw bytes as a string. Non-UTF-8 input is rejected.
    pub fn register_string_utf8(&mut self, bytes: &[u8]) -> Result<StringId> {
        let text = std::str::from_utf8(bytes)?;
        self.register_string(text)
    }

    /// Register a texture no larger than `limit` on either edge.
    pub fn register_texture(&mut self, width: u32, height: u32, limit: u32) -> Result<TextureId> {
        if width == 0 || height == 0 || width > limit || height > limit {
            return Err(EngineError::InvalidTexture {
                width,
                height,
                limit,
            });
        }
        let id = TextureId::new(self.next_texture_id);
        self.next_texture_id = self.next_texture_id.checked_add(1).ok_or_else(|| {
            EngineError::AllocationFailure("texture id space exhausted".to_string())
        })?;
        self.textures.insert(id, TextureDesc { width, height });
        Ok(id)
    }

    pub fn texture(&self, id: TextureId) -> Option<TextureDesc> {
        self.textures.get(&id).copied()
    }

    pub fn drop_texture(&mut self, id: TextureId) -> Result<TextureDesc> {
        self.textures
            .remove(&id)
            .ok_or(EngineError::ResourceNotFound {
                kind: ResourceKind::Texture,
                id: id.id,
            })
    }

    pub fn strings(&self) -> impl Iterator<Item = (StringId, &str)> + '_ {
        self.strings.iter().map(|(id, text)| (*id, text.as_str()))
    }

    pub fn textures(&self) -> impl Iterator<Item = (TextureId, TextureDesc)> + '_ {
        self.textures.iter().map(|(id, desc)| (*id, *desc))
    }

    pub fn string_count(&self) -> usize {
        self.strings.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Id the next registered string will receive.
    pub fn next_string_id(&self) -> u64 {
        self.next_string_id
    }

    /// Id the next registered texture will receive.
    pub fn next_texture_id(&self) -> u64 {
        self.next_texture_id
    }
}
