//! Snapshot codec.
//!
//! A snapshot is JSON carrying the engine configuration, the full state and
//! the canonical fingerprint of that state. No timestamps, so identical
//! engines produce identical snapshots.
//!
//! Restore is strict: unknown fields, duplicate ids, version mismatches,
//! invariant violations and fingerprint mismatches are all rejected.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::{EngineError, Result};
use crate::hashing::canonical_hash;
use crate::ids::{StringId, TextureId};
use crate::resources::{ResourceTable, TextureDesc};
use crate::tick::TickCounter;
use crate::ENGINE_VERSION;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    pub engine_version: u32,
    /// Canonical fingerprint of `state`.
    pub hash: String,
    pub config: EngineConfig,
    pub state: EngineState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineState {
    pub tick: u64,
    pub strings: Vec<StringRecord>,
    pub textures: Vec<TextureRecord>,
    pub next_string_id: u64,
    pub next_texture_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StringRecord {
    pub id: u64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextureRecord {
    pub id: u64,
    pub width: u32,
    pub height: u32,
}

/// Capture the engine's current state.
pub fn take_snapshot(engine: &Engine) -> Snapshot {
    let resources = engine.resources();
    Snapshot {
        engine_version: ENGINE_VERSION,
        hash: canonical_hash(engine),
        config: engine.config().clone(),
        state: EngineState {
            tick: engine.tick_count(),
            strings: resources
                .strings()
                .map(|(id, text)| StringRecord {
                    id: id.id,
                    text: text.to_string(),
                })
                .collect(),
            textures: resources
                .textures()
                .map(|(id, desc)| TextureRecord {
                    id: id.id,
                    width: desc.width,
                    height: desc.height,
                })
                .collect(),
            next_string_id: resources.next_string_id(),
            next_texture_id: resources.next_texture_id(),
        },
    }
}

pub fn encode_snapshot(engine: &Engine) -> Result<String> {
    serde_json::to_string(&take_snapshot(engine)).map_err(|e| EngineError::Snapshot(e.to_string()))
}

/// Strict decode without validation. Use [`restore_snapshot`] to obtain an
/// engine.
pub fn decode_snapshot(json: &str) -> Result<Snapshot> {
    serde_json::from_str(json).map_err(|e| EngineError::Snapshot(e.to_string()))
}

/// Decode, rebuild and validate an engine from snapshot JSON.
pub fn restore_snapshot(json: &str) -> Result<Engine> {
    let snap = decode_snapshot(json)?;
    restore_from(snap)
}

/// Same as [`restore_snapshot`] for raw bytes, which must be UTF-8.
pub fn restore_snapshot_bytes(bytes: &[u8]) -> Result<Engine> {
    let json = std::str::from_utf8(bytes)?;
    restore_snapshot(json)
}

pub fn restore_from(snap: Snapshot) -> Result<Engine> {
    if snap.engine_version != ENGINE_VERSION {
        return Err(EngineError::Snapshot(format!(
            "engine version mismatch: expected {}, got {}",
            ENGINE_VERSION, snap.engine_version
        )));
    }

    let state = snap.state;
    let mut strings = BTreeMap::new();
    for record in state.strings {
        if strings.insert(StringId::new(record.id), record.text).is_some() {
            return Err(EngineError::Snapshot(format!(
                "duplicate string id {}",
                record.id
            )));
        }
    }
    let mut textures = BTreeMap::new();
    for record in state.textures {
        let desc = TextureDesc {
            width: record.width,
            height: record.height,
        };
        if textures.insert(TextureId::new(record.id), desc).is_some() {
            return Err(EngineError::Snapshot(format!(
                "duplicate texture id {}",
                record.id
            )));
        }
    }

    let resources = ResourceTable::from_records(
        strings,
        textures,
        state.next_string_id,
        state.next_texture_id,
    );
    let engine = Engine::from_parts(snap.config, TickCounter::at(state.tick), resources)?;

    let actual = canonical_hash(&engine);
    if actual != snap.hash {
        warn!(expected = %snap.hash, actual = %actual, "snapshot fingerprint mismatch");
        return Err(EngineError::Snapshot(format!(
            "fingerprint mismatch: snapshot says {}, state hashes to {}",
            snap.hash, actual
        )));
    }

    debug!(tick = engine.tick_count(), "engine restored from snapshot");
    Ok(engine)
}
