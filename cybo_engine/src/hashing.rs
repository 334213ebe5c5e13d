//! Canonical serialization and fingerprinting.
//!
//! Produces byte-identical output for identical engine states on every
//! platform. Fields are emitted in a fixed order, resources in id order,
//! compact JSON, integers only.
//!
//! Field order: engine_version, tick, strings, textures, next_string_id,
//! next_texture_id. Configuration is not part of the fingerprint.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::engine::Engine;
use crate::ENGINE_VERSION;

/// Canonical serialization of engine state to UTF-8 JSON bytes.
pub fn canonical_serialize(engine: &Engine) -> Vec<u8> {
    build_canonical_value(engine).to_string().into_bytes()
}

/// SHA-256 of the canonical serialization, lowercase hex.
pub fn canonical_hash(engine: &Engine) -> String {
    hex_digest(&canonical_serialize(engine))
}

pub(crate) fn hex_digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn build_canonical_value(engine: &Engine) -> Value {
    let resources = engine.resources();

    let strings: Vec<Value> = resources
        .strings()
        .map(|(id, text)| {
            let mut record = Map::new();
            record.insert("id".to_string(), Value::Number(id.id.into()));
            record.insert("text".to_string(), Value::String(text.to_string()));
            Value::Object(record)
        })
        .collect();

    let textures: Vec<Value> = resources
        .textures()
        .map(|(id, desc)| {
            let mut record = Map::new();
            record.insert("id".to_string(), Value::Number(id.id.into()));
            record.insert("width".to_string(), Value::Number(desc.width.into()));
            record.insert("height".to_string(), Value::Number(desc.height.into()));
            Value::Object(record)
        })
        .collect();

    // engine_version first: it is part of the state identity.
    let mut root = Map::new();
    root.insert(
        "engine_version".to_string(),
        Value::Number(ENGINE_VERSION.into()),
    );
    root.insert(
        "tick".to_string(),
        Value::Number(engine.tick_count().into()),
    );
    root.insert("strings".to_string(), Value::Array(strings));
    root.insert("textures".to_string(), Value::Array(textures));
    root.insert(
        "next_string_id".to_string(),
        Value::Number(resources.next_string_id().into()),
    );
    root.insert(
        "next_texture_id".to_string(),
        Value::Number(resources.next_texture_id().into()),
    );

    Value::Object(root)
}
