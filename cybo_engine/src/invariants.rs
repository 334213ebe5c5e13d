//! Resource table invariants.
//!
//! Checked whenever state comes from outside the engine (snapshot restore).
//! Returns the first violation found.

use crate::error::{EngineError, Result};
use crate::ids::StringId;
use crate::resources::ResourceTable;

/// `max_texture_dimension` is the limit the owning engine's configuration
/// applies to new textures; restored textures are held to the same limit.
pub fn try_validate_invariants(
    resources: &ResourceTable,
    max_texture_dimension: u32,
) -> Result<()> {
    check_well_known_present(resources)?;
    check_string_ids_allocated(resources)?;
    check_texture_ids_allocated(resources)?;
    check_texture_dimensions(resources)?;
    check_texture_within_limit(resources, max_texture_dimension)?;
    Ok(())
}

fn violation(rule: &'static str, detail: String) -> EngineError {
    EngineError::Invariant { rule, detail }
}

fn check_well_known_present(resources: &ResourceTable) -> Result<()> {
    if resources.get_string(StringId::WELL_KNOWN).is_none() {
        return Err(violation(
            "well_known_present",
            "well-known string id 0 has no record".to_string(),
        ));
    }
    Ok(())
}

/// Every string id is below the allocator, so future ids cannot collide.
fn check_string_ids_allocated(resources: &ResourceTable) -> Result<()> {
    let next = resources.next_string_id();
    if let Some((id, _)) = resources.strings().find(|(id, _)| id.id >= next) {
        return Err(violation(
            "string_id_allocated",
            format!("string id {} is not below next_string_id {}", id.id, next),
        ));
    }
    Ok(())
}

fn check_texture_ids_allocated(resources: &ResourceTable) -> Result<()> {
    let next = resources.next_texture_id();
    if next == 0 {
        return Err(violation(
            "texture_id_allocated",
            "next_texture_id must not be 0".to_string(),
        ));
    }
    if let Some((id, _)) = resources
        .textures()
        .find(|(id, _)| !id.is_valid() || id.id >= next)
    {
        return Err(violation(
            "texture_id_allocated",
            format!("texture id {} outside 1..{}", id.id, next),
        ));
    }
    Ok(())
}

fn check_texture_dimensions(resources: &ResourceTable) -> Result<()> {
    if let Some((id, desc)) = resources
        .textures()
        .find(|(_, desc)| desc.width == 0 || desc.height == 0)
    {
        return Err(violation(
            "texture_dimensions",
            format!("texture {} has empty extent {}x{}", id.id, desc.width, desc.height),
        ));
    }
    Ok(())
}

fn check_texture_within_limit(resources: &ResourceTable, limit: u32) -> Result<()> {
    if let Some((id, desc)) = resources
        .textures()
        .find(|(_, desc)| desc.width > limit || desc.height > limit)
    {
        return Err(violation(
            "texture_within_limit",
            format!(
                "texture {} is {}x{}, limit is {}",
                id.id, desc.width, desc.height, limit
            ),
        ));
    }
    Ok(())
}
