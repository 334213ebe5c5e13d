//! Integration tests for the C export set, driven the way a foreign caller
//! drives it: raw handle slots, raw buffers, explicit releases.
//!
//! The registry is process-wide and tests run in parallel, so every test
//! only touches handles it created itself.

use std::ptr;

use cybo_engine::snapshot::decode_snapshot;
use cybo_engine::{EngineView, StringId, TextureId};
use cybo_ffi::api::*;
use cybo_ffi::{BoundaryString, CgStatus, EngineHandle};
use proptest::prelude::*;
use sha2::{Digest, Sha256};

/// Copy a returned string out and release it.
fn take(string: BoundaryString) -> Option<Vec<u8>> {
    unsafe {
        let bytes = string.as_bytes().map(<[u8]>::to_vec);
        cg_string_release(string);
        bytes
    }
}

fn tick_count(handle: &EngineHandle) -> Result<u64, CgStatus> {
    let mut count = 0u64;
    match unsafe { cg_tick_count(handle, &mut count) } {
        CgStatus::Ok => Ok(count),
        status => Err(status),
    }
}

fn register(handle: &mut EngineHandle, bytes: &[u8]) -> Result<StringId, CgStatus> {
    let mut id = StringId::new(u64::MAX);
    match unsafe { cg_resource_register_string(handle, bytes.as_ptr(), bytes.len(), &mut id) } {
        CgStatus::Ok => Ok(id),
        status => Err(status),
    }
}

/// Restore a default engine whose counter sits at `tick`, re-sealing the
/// snapshot with the matching fingerprint.
fn restore_at_tick(tick: u64) -> EngineHandle {
    let mut source = cg_new();
    let json = take(unsafe { cg_snapshot(&source) }).unwrap();
    unsafe { cg_destroy(&mut source) };

    let mut snap = decode_snapshot(std::str::from_utf8(&json).unwrap()).unwrap();
    snap.state.tick = tick;
    let canonical = serde_json::json!({
        "engine_version": snap.engine_version,
        "tick": tick,
        "strings": [{"id": 0, "text": "hello"}],
        "textures": [],
        "next_string_id": 1,
        "next_texture_id": 1,
    });
    snap.hash = Sha256::digest(canonical.to_string().as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect();

    let json = serde_json::to_vec(&snap).unwrap();
    unsafe { cg_restore(json.as_ptr(), json.len()) }
}

// ─────────────────────────────────────────────────────────────
// Caller scenario: new, tick x10, fetch the well-known string
// ─────────────────────────────────────────────────────────────

#[test]
fn ten_ticks_then_fetch_well_known_string() {
    let mut handle = cg_new();
    assert!(!handle.is_null());

    for _ in 0..10 {
        assert_eq!(unsafe { cg_tick(&mut handle) }, CgStatus::Ok);
    }
    assert_eq!(tick_count(&handle), Ok(10));

    let text = unsafe { cg_resource_fetch_string_utf8(&handle, cg_get_string_id()) };
    assert!(!text.is_null());
    assert_eq!(take(text).as_deref(), Some(&b"hello"[..]));

    assert_eq!(unsafe { cg_destroy(&mut handle) }, CgStatus::Ok);
}

#[test]
fn unregistered_id_returns_null_sentinel() {
    let mut handle = cg_new();
    let text = unsafe { cg_resource_fetch_string_utf8(&handle, StringId::new(9_999)) };
    assert!(text.is_null());
    assert_eq!(text.len, 0);
    assert_eq!(take(text), None);
    unsafe { cg_destroy(&mut handle) };
}

#[test]
fn well_known_id_is_stable() {
    let first = cg_get_string_id();
    let mut handle = cg_new();
    for _ in 0..5 {
        unsafe { cg_tick(&mut handle) };
        assert_eq!(cg_get_string_id(), first);
    }
    unsafe { cg_destroy(&mut handle) };
}

// ─────────────────────────────────────────────────────────────
// Lifecycle and handle validation
// ─────────────────────────────────────────────────────────────

#[test]
fn destroy_nulls_slot_and_rejects_further_use() {
    let mut handle = cg_new();
    let stale = handle;

    assert_eq!(unsafe { cg_destroy(&mut handle) }, CgStatus::Ok);
    assert!(handle.is_null());

    // Through the nulled slot.
    assert_eq!(unsafe { cg_tick(&mut handle) }, CgStatus::InvalidHandle);
    // Through a copy kept from before destruction.
    let mut stale_slot = stale;
    assert_eq!(unsafe { cg_tick(&mut stale_slot) }, CgStatus::InvalidHandle);
    assert_eq!(tick_count(&stale), Err(CgStatus::InvalidHandle));
    assert!(unsafe { cg_resource_fetch_string_utf8(&stale, cg_get_string_id()) }.is_null());
    assert_eq!(unsafe { cg_destroy(&mut stale_slot) }, CgStatus::InvalidHandle);
    assert_eq!(stale_slot, stale, "failed destroy leaves the slot untouched");
}

#[test]
fn stale_handle_does_not_reach_a_reused_slot() {
    let mut first = cg_new();
    let stale = first;
    unsafe { cg_destroy(&mut first) };

    let mut second = cg_new();
    assert_ne!(second, stale);
    assert_eq!(tick_count(&stale), Err(CgStatus::InvalidHandle));
    assert_eq!(tick_count(&second), Ok(0));
    unsafe { cg_destroy(&mut second) };
}

#[test]
fn null_pointers_are_rejected_not_dereferenced() {
    unsafe {
        assert_eq!(cg_tick(ptr::null_mut()), CgStatus::InvalidHandle);
        assert_eq!(cg_destroy(ptr::null_mut()), CgStatus::InvalidHandle);
        assert!(cg_resource_fetch_string_utf8(ptr::null(), cg_get_string_id()).is_null());
        assert!(cg_state_hash(ptr::null()).is_null());

        let mut null_handle = EngineHandle::NULL;
        assert_eq!(cg_tick(&mut null_handle), CgStatus::InvalidHandle);
        assert_eq!(
            cg_resource_register_texture(&mut null_handle, 4, 4),
            TextureId::INVALID
        );

        let mut handle = cg_new();
        assert_eq!(cg_tick_count(&handle, ptr::null_mut()), CgStatus::InvalidArgument);
        assert_eq!(
            cg_render_view_state(&handle, ptr::null_mut()),
            CgStatus::InvalidArgument
        );
        let mut id = StringId::new(0);
        assert_eq!(
            cg_resource_register_string(&mut handle, ptr::null(), 3, &mut id),
            CgStatus::InvalidArgument
        );
        cg_destroy(&mut handle);
    }
}

#[test]
fn handle_errors_take_priority_over_null_out_pointers() {
    let mut handle = cg_new();
    let mut stale = handle;
    unsafe {
        cg_destroy(&mut handle);
        assert_eq!(cg_tick_count(&stale, ptr::null_mut()), CgStatus::InvalidHandle);
        assert_eq!(
            cg_render_view_state(&stale, ptr::null_mut()),
            CgStatus::InvalidHandle
        );
        assert_eq!(
            cg_resource_register_string(&mut stale, b"x".as_ptr(), 1, ptr::null_mut()),
            CgStatus::InvalidHandle
        );
    }
}

#[test]
fn null_out_pointer_registers_nothing() {
    let mut handle = cg_new();
    unsafe {
        assert_eq!(
            cg_resource_register_string(&mut handle, b"x".as_ptr(), 1, ptr::null_mut()),
            CgStatus::InvalidArgument
        );
    }
    assert!(unsafe { cg_resource_fetch_string_utf8(&handle, StringId::new(1)) }.is_null());
    unsafe { cg_destroy(&mut handle) };
}

#[test]
fn forged_handle_is_rejected() {
    let mut handle = cg_new();
    let mut forged = EngineHandle {
        raw: handle.raw ^ (1 << 40),
    };
    assert_eq!(unsafe { cg_tick(&mut forged) }, CgStatus::InvalidHandle);
    assert_eq!(tick_count(&handle), Ok(0));
    unsafe { cg_destroy(&mut handle) };
}

// ─────────────────────────────────────────────────────────────
// Resources across the boundary
// ─────────────────────────────────────────────────────────────

#[test]
fn registered_string_round_trips_with_nul_and_multibyte() {
    let mut handle = cg_new();
    let payload = "a\0b ünï ✓".as_bytes();
    let id = register(&mut handle, payload).unwrap();
    assert_ne!(id, cg_get_string_id());

    let first = take(unsafe { cg_resource_fetch_string_utf8(&handle, id) });
    unsafe { cg_tick(&mut handle) };
    let second = take(unsafe { cg_resource_fetch_string_utf8(&handle, id) });
    assert_eq!(first.as_deref(), Some(payload));
    assert_eq!(first, second);
    unsafe { cg_destroy(&mut handle) };
}

#[test]
fn empty_string_is_distinguishable_from_absent() {
    let mut handle = cg_new();
    let id = register(&mut handle, b"").unwrap();
    let text = unsafe { cg_resource_fetch_string_utf8(&handle, id) };
    assert!(!text.is_null());
    assert_eq!(take(text), Some(Vec::new()));
    unsafe { cg_destroy(&mut handle) };
}

#[test]
fn invalid_utf8_reports_encoding_failure() {
    let mut handle = cg_new();
    assert_eq!(register(&mut handle, &[0xc3, 0x28]), Err(CgStatus::EncodingFailure));
    unsafe { cg_destroy(&mut handle) };
}

#[test]
fn textures_register_and_drop() {
    let mut handle = cg_new();
    let texture = unsafe { cg_resource_register_texture(&mut handle, 128, 64) };
    assert!(texture.is_valid());
    assert_eq!(
        unsafe { cg_resource_register_texture(&mut handle, 0, 64) },
        TextureId::INVALID
    );

    assert_eq!(unsafe { cg_resource_drop_texture(&mut handle, texture) }, CgStatus::Ok);
    assert_eq!(
        unsafe { cg_resource_drop_texture(&mut handle, texture) },
        CgStatus::ResourceNotFound
    );
    unsafe { cg_destroy(&mut handle) };
}

#[test]
fn view_state_tracks_ticks() {
    let mut handle = cg_new();
    unsafe {
        cg_resource_register_texture(&mut handle, 2, 2);
        cg_tick(&mut handle);
        cg_tick(&mut handle);
    }
    let mut view = EngineView::default();
    assert_eq!(unsafe { cg_render_view_state(&handle, &mut view) }, CgStatus::Ok);
    assert_eq!(
        view,
        EngineView {
            tick: 2,
            string_count: 1,
            texture_count: 1,
        }
    );
    unsafe { cg_destroy(&mut handle) };
}

// ─────────────────────────────────────────────────────────────
// Configuration, fingerprints and snapshots
// ─────────────────────────────────────────────────────────────

#[test]
fn config_sets_well_known_text() {
    let config = b"well_known_text = \"hej\"\nseed_strings = [\"one\"]\n";
    let mut handle = unsafe { cg_new_with_config(config.as_ptr(), config.len()) };
    assert!(!handle.is_null());
    let text = take(unsafe { cg_resource_fetch_string_utf8(&handle, cg_get_string_id()) });
    assert_eq!(text.as_deref(), Some(&b"hej"[..]));
    let seed = take(unsafe { cg_resource_fetch_string_utf8(&handle, StringId::new(1)) });
    assert_eq!(seed.as_deref(), Some(&b"one"[..]));
    unsafe { cg_destroy(&mut handle) };
}

#[test]
fn bad_config_yields_null_handle() {
    let config = b"max_texture_dimension = 0";
    assert!(unsafe { cg_new_with_config(config.as_ptr(), config.len()) }.is_null());
    let config = b"not toml at all [";
    assert!(unsafe { cg_new_with_config(config.as_ptr(), config.len()) }.is_null());
    assert!(unsafe { cg_new_with_config(ptr::null(), 4) }.is_null());
}

#[test]
fn identical_histories_share_a_fingerprint() {
    let mut a = cg_new();
    let mut b = cg_new();
    for _ in 0..10 {
        unsafe {
            cg_tick(&mut a);
            cg_tick(&mut b);
        }
    }
    let hash_a = take(unsafe { cg_state_hash(&a) }).unwrap();
    let hash_b = take(unsafe { cg_state_hash(&b) }).unwrap();
    assert_eq!(hash_a, hash_b);
    assert_eq!(
        hash_a,
        b"76aaba91089fb98cb0b1dc0afce297bea6fd1b9e3e19dbe5c119741e58cd2f87".to_vec()
    );
    unsafe {
        cg_destroy(&mut a);
        cg_destroy(&mut b);
    }
}

#[test]
fn snapshot_restores_into_a_new_handle() {
    let mut original = cg_new();
    let id = register(&mut original, b"kept").unwrap();
    for _ in 0..4 {
        unsafe { cg_tick(&mut original) };
    }
    let json = take(unsafe { cg_snapshot(&original) }).unwrap();
    let hash = take(unsafe { cg_state_hash(&original) });
    unsafe { cg_destroy(&mut original) };

    let mut restored = unsafe { cg_restore(json.as_ptr(), json.len()) };
    assert!(!restored.is_null());
    assert_eq!(tick_count(&restored), Ok(4));
    assert_eq!(take(unsafe { cg_state_hash(&restored) }), hash);
    let text = take(unsafe { cg_resource_fetch_string_utf8(&restored, id) });
    assert_eq!(text.as_deref(), Some(&b"kept"[..]));
    unsafe { cg_destroy(&mut restored) };
}

#[test]
fn tick_overflow_is_reported_and_leaves_count_unchanged() {
    let mut handle = restore_at_tick(u64::MAX);
    assert!(!handle.is_null());

    assert_eq!(unsafe { cg_tick(&mut handle) }, CgStatus::TickOverflow);
    assert_eq!(tick_count(&handle), Ok(u64::MAX));
    let mut view = EngineView::default();
    assert_eq!(unsafe { cg_render_view_state(&handle, &mut view) }, CgStatus::Ok);
    assert_eq!(view.tick, u64::MAX);
    unsafe { cg_destroy(&mut handle) };
}

#[test]
fn corrupt_snapshot_yields_null_handle() {
    let json = b"{\"engine_version\":1}";
    assert!(unsafe { cg_restore(json.as_ptr(), json.len()) }.is_null());
}

#[test]
fn logging_init_is_idempotent() {
    assert_eq!(cg_init_logging(), CgStatus::Ok);
    assert_eq!(cg_init_logging(), CgStatus::Ok);
}

proptest! {
    #[test]
    fn n_ticks_through_the_boundary_advance_by_n(n in 0u64..200) {
        let mut handle = cg_new();
        for _ in 0..n {
            prop_assert_eq!(unsafe { cg_tick(&mut handle) }, CgStatus::Ok);
        }
        prop_assert_eq!(tick_count(&handle), Ok(n));
        prop_assert_eq!(unsafe { cg_destroy(&mut handle) }, CgStatus::Ok);
    }
}
