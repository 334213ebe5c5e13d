//! Flat C export set.
//!
//! Every export
//!
//! - reads handle slots and caller buffers first, treating a null slot
//!   pointer as the null handle,
//! - resolves the handle through the registry, so null, destroyed and
//!   forged handles all report `InvalidHandle` without touching state,
//! - catches panics and reports `Panicked` (or the export's sentinel).
//!
//! Strings leave through [`BoundaryString`] only; see that module for the
//! ownership rules.

use std::panic::{self, AssertUnwindSafe};
use std::slice;

use cybo_engine::hashing::canonical_hash;
use cybo_engine::snapshot::{encode_snapshot, restore_snapshot_bytes};
use cybo_engine::{
    well_known_string_kind_id, Engine, EngineConfig, EngineError, EngineView, Result, StringId,
    TextureDesc, TextureId,
};
use tracing::{debug, error, trace, warn};

use crate::boundary_string::BoundaryString;
use crate::handle::EngineHandle;
use crate::logging::init_logging;
use crate::registry::with_engines;
use crate::status::CgStatus;

fn guard<R>(export: &'static str, on_panic: R, body: impl FnOnce() -> R) -> R {
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(value) => value,
        Err(_) => {
            error!(export, "panic caught at the C boundary");
            on_panic
        }
    }
}

unsafe fn read_slot(slot: *const EngineHandle) -> EngineHandle {
    if slot.is_null() {
        EngineHandle::NULL
    } else {
        *slot
    }
}

/// Borrow a caller buffer. An empty buffer may have a null pointer.
unsafe fn input_bytes<'a>(ptr: *const u8, len: usize) -> Option<&'a [u8]> {
    if len == 0 {
        Some(&[])
    } else if ptr.is_null() {
        None
    } else {
        Some(slice::from_raw_parts(ptr, len))
    }
}

/// Handle errors in `result` take priority over a null `out`.
unsafe fn write_out<T>(out: *mut T, result: std::result::Result<T, CgStatus>) -> CgStatus {
    match result {
        Ok(_) if out.is_null() => CgStatus::InvalidArgument,
        Ok(value) => {
            out.write(value);
            CgStatus::Ok
        }
        Err(status) => status,
    }
}

fn failed(export: &'static str, err: EngineError) -> CgStatus {
    warn!(export, %err, "call failed");
    CgStatus::from(&err)
}

fn status_of<T>(export: &'static str, result: Result<T>) -> CgStatus {
    match result {
        Ok(_) => CgStatus::Ok,
        Err(err) => failed(export, err),
    }
}

fn string_out(export: &'static str, result: Result<Option<BoundaryString>>) -> BoundaryString {
    match result {
        Ok(Some(text)) => text,
        Ok(None) => {
            trace!(export, "resource absent");
            BoundaryString::NULL
        }
        Err(err) => {
            failed(export, err);
            BoundaryString::NULL
        }
    }
}

fn install(export: &'static str, engine: Result<Engine>) -> EngineHandle {
    match engine.and_then(|engine| with_engines(|engines| engines.insert(engine))) {
        Ok(handle) => {
            debug!(export, handle = handle.raw, "engine created");
            handle
        }
        Err(err) => {
            failed(export, err);
            EngineHandle::NULL
        }
    }
}

/// Creates a new engine with the default configuration.
/// Returns the null handle on failure.
#[no_mangle]
pub extern "C" fn cg_new() -> EngineHandle {
    guard("cg_new", EngineHandle::NULL, || {
        install("cg_new", Ok(Engine::new()))
    })
}

/// Creates a new engine from a TOML configuration buffer.
/// Returns the null handle if the buffer is null, not UTF-8, or invalid.
///
/// # Safety
/// `config` must point to `len` readable bytes (or `len` must be 0).
#[no_mangle]
pub unsafe extern "C" fn cg_new_with_config(config: *const u8, len: usize) -> EngineHandle {
    let Some(bytes) = input_bytes(config, len) else {
        warn!(export = "cg_new_with_config", "null config buffer");
        return EngineHandle::NULL;
    };
    guard("cg_new_with_config", EngineHandle::NULL, || {
        let engine = EngineConfig::from_toml_bytes(bytes)
            .map_err(EngineError::from)
            .and_then(Engine::with_config);
        install("cg_new_with_config", engine)
    })
}

/// Ticks the engine once.
///
/// # Safety
/// `slot` must be null or point to a readable `EngineHandle`.
#[no_mangle]
pub unsafe extern "C" fn cg_tick(slot: *mut EngineHandle) -> CgStatus {
    let handle = read_slot(slot);
    guard("cg_tick", CgStatus::Panicked, || {
        let ticked = with_engines(|engines| -> Result<u64> { engines.get_mut(handle)?.tick() });
        status_of("cg_tick", ticked)
    })
}

/// Writes the number of completed ticks to `out`.
///
/// # Safety
/// `slot` must be null or readable; `out` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn cg_tick_count(slot: *const EngineHandle, out: *mut u64) -> CgStatus {
    let handle = read_slot(slot);
    let count = guard("cg_tick_count", Err(CgStatus::Panicked), || {
        with_engines(|engines| engines.get(handle).map(Engine::tick_count))
            .map_err(|err| failed("cg_tick_count", err))
    });
    write_out(out, count)
}

/// Attempts to fetch a string with the given id.
/// Returns the null sentinel if the handle is invalid or no string is
/// present. A non-null result must be released with `cg_string_release`.
///
/// # Safety
/// `slot` must be null or point to a readable `EngineHandle`.
#[no_mangle]
pub unsafe extern "C" fn cg_resource_fetch_string_utf8(
    slot: *const EngineHandle,
    resource: StringId,
) -> BoundaryString {
    let handle = read_slot(slot);
    guard("cg_resource_fetch_string_utf8", BoundaryString::NULL, || {
        let copied = with_engines(|engines| -> Result<Option<BoundaryString>> {
            let engine = engines.get(handle)?;
            engine
                .resolve_string(resource)
                .map(BoundaryString::copy_from)
                .transpose()
        });
        string_out("cg_resource_fetch_string_utf8", copied)
    })
}

/// Identifier of the well-known string. Constant for the life of the
/// process.
#[no_mangle]
pub extern "C" fn cg_get_string_id() -> StringId {
    well_known_string_kind_id()
}

/// Registers `len` UTF-8 bytes as a new string and writes its id to `out`.
/// Non-UTF-8 input reports `EncodingFailure` and registers nothing.
///
/// # Safety
/// `slot` must be null or readable, `bytes` must point to `len` readable
/// bytes (or `len` must be 0), `out` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn cg_resource_register_string(
    slot: *mut EngineHandle,
    bytes: *const u8,
    len: usize,
    out: *mut StringId,
) -> CgStatus {
    let handle = read_slot(slot);
    let text = input_bytes(bytes, len);
    let id = guard("cg_resource_register_string", Err(CgStatus::Panicked), || {
        with_engines(|engines| -> std::result::Result<StringId, CgStatus> {
            let engine = engines
                .get_mut(handle)
                .map_err(|err| failed("cg_resource_register_string", err))?;
            let text = match text {
                Some(text) if !out.is_null() => text,
                _ => return Err(CgStatus::InvalidArgument),
            };
            engine
                .register_string_utf8(text)
                .map_err(|err| failed("cg_resource_register_string", err))
        })
    });
    write_out(out, id)
}

/// Registers a texture with the engine.
/// Returns the invalid texture id (0) on failure.
///
/// # Safety
/// `slot` must be null or point to a readable `EngineHandle`.
#[no_mangle]
pub unsafe extern "C" fn cg_resource_register_texture(
    slot: *mut EngineHandle,
    img_width: u32,
    img_height: u32,
) -> TextureId {
    let handle = read_slot(slot);
    guard("cg_resource_register_texture", TextureId::INVALID, || {
        let registered = with_engines(|engines| -> Result<TextureId> {
            engines.get_mut(handle)?.register_texture(img_width, img_height)
        });
        registered.unwrap_or_else(|err| {
            failed("cg_resource_register_texture", err);
            TextureId::INVALID
        })
    })
}

/// Drops the given texture from the engine.
///
/// # Safety
/// `slot` must be null or point to a readable `EngineHandle`.
#[no_mangle]
pub unsafe extern "C" fn cg_resource_drop_texture(
    slot: *mut EngineHandle,
    texture: TextureId,
) -> CgStatus {
    let handle = read_slot(slot);
    guard("cg_resource_drop_texture", CgStatus::Panicked, || {
        let dropped = with_engines(|engines| -> Result<TextureDesc> {
            engines.get_mut(handle)?.drop_texture(texture)
        });
        status_of("cg_resource_drop_texture", dropped)
    })
}

/// Copies the view as of the last tick into `out`.
///
/// # Safety
/// `slot` must be null or readable; `out` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn cg_render_view_state(
    slot: *const EngineHandle,
    out: *mut EngineView,
) -> CgStatus {
    let handle = read_slot(slot);
    let view = guard("cg_render_view_state", Err(CgStatus::Panicked), || {
        with_engines(|engines| engines.get(handle).map(Engine::view))
            .map_err(|err| failed("cg_render_view_state", err))
    });
    write_out(out, view)
}

/// Canonical fingerprint of the engine state as lowercase hex.
/// Released with `cg_string_release`; null sentinel on invalid handle.
///
/// # Safety
/// `slot` must be null or point to a readable `EngineHandle`.
#[no_mangle]
pub unsafe extern "C" fn cg_state_hash(slot: *const EngineHandle) -> BoundaryString {
    let handle = read_slot(slot);
    guard("cg_state_hash", BoundaryString::NULL, || {
        let hash = with_engines(|engines| -> Result<Option<BoundaryString>> {
            let hash = canonical_hash(engines.get(handle)?);
            BoundaryString::copy_from(&hash).map(Some)
        });
        string_out("cg_state_hash", hash)
    })
}

/// JSON snapshot of the engine. Released with `cg_string_release`; null
/// sentinel on invalid handle.
///
/// # Safety
/// `slot` must be null or point to a readable `EngineHandle`.
#[no_mangle]
pub unsafe extern "C" fn cg_snapshot(slot: *const EngineHandle) -> BoundaryString {
    let handle = read_slot(slot);
    guard("cg_snapshot", BoundaryString::NULL, || {
        let json = with_engines(|engines| -> Result<Option<BoundaryString>> {
            let json = encode_snapshot(engines.get(handle)?)?;
            BoundaryString::copy_from(&json).map(Some)
        });
        string_out("cg_snapshot", json)
    })
}

/// Creates a new engine from snapshot JSON produced by `cg_snapshot`.
/// Returns the null handle if the snapshot is rejected.
///
/// # Safety
/// `bytes` must point to `len` readable bytes (or `len` must be 0).
#[no_mangle]
pub unsafe extern "C" fn cg_restore(bytes: *const u8, len: usize) -> EngineHandle {
    let Some(json) = input_bytes(bytes, len) else {
        warn!(export = "cg_restore", "null snapshot buffer");
        return EngineHandle::NULL;
    };
    guard("cg_restore", EngineHandle::NULL, || {
        install("cg_restore", restore_snapshot_bytes(json))
    })
}

/// Destroys the engine and releases all of its resources. On success the
/// caller's slot is overwritten with the null handle; any other copy of the
/// old handle is rejected from then on.
///
/// # Safety
/// `slot` must be null or point to a readable and writable `EngineHandle`.
#[no_mangle]
pub unsafe extern "C" fn cg_destroy(slot: *mut EngineHandle) -> CgStatus {
    let handle = read_slot(slot);
    let status = guard("cg_destroy", CgStatus::Panicked, || {
        match with_engines(|engines| engines.remove(handle)) {
            Ok(engine) => {
                debug!(handle = handle.raw, tick = engine.tick_count(), "engine destroyed");
                CgStatus::Ok
            }
            Err(err) => failed("cg_destroy", err),
        }
    });
    if status.is_ok() {
        *slot = EngineHandle::NULL;
    }
    status
}

/// Releases a string returned by this library. The null sentinel is a
/// no-op.
///
/// # Safety
/// `string` must have been returned by this library, unmodified, and not
/// released before.
#[no_mangle]
pub unsafe extern "C" fn cg_string_release(string: BoundaryString) {
    string.release();
}

/// Installs a stderr tracing subscriber filtered by `CYBO_LOG`. Safe to
/// call more than once.
#[no_mangle]
pub extern "C" fn cg_init_logging() -> CgStatus {
    guard("cg_init_logging", CgStatus::Panicked, || {
        if init_logging() {
            debug!("logging installed");
        }
        CgStatus::Ok
    })
}
