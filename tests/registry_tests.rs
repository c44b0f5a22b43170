//! Shared Pool Registry Tests
//!
//! Tests for:
//! - Cached pair inside the main context
//! - Fresh pairs outside the main context
//! - Reset of the cached pair
//!
//! The main-context flag and the cache are process-wide, so every test holds
//! `SERIAL` for its whole body.

use parking_lot::Mutex;

use npr_shadows::{
    HeadlessGraphics, LightKind, ShadowMapStorage, get_shadow_pools, is_main_context,
    reset_shadow_pools, set_main_context,
};

static SERIAL: Mutex<()> = parking_lot::const_mutex(());

#[test]
fn main_context_returns_same_pair() {
    let _guard = SERIAL.lock();
    set_main_context(true);

    let first = get_shadow_pools();
    let second = get_shadow_pools();

    assert!(first.same_storage(&second));
    set_main_context(false);
}

#[test]
fn other_contexts_get_fresh_pairs() {
    let _guard = SERIAL.lock();
    set_main_context(false);
    assert!(!is_main_context());

    let first = get_shadow_pools();
    let second = get_shadow_pools();

    assert!(!first.same_storage(&second));
}

#[test]
fn cached_pools_start_unconfigured_and_share_setup() {
    let _guard = SERIAL.lock();
    set_main_context(true);
    reset_shadow_pools();

    let pools = get_shadow_pools();
    assert!(!pools.opaque.lock().is_configured());
    assert!(!pools.transparent.lock().is_configured());

    let mut gfx = HeadlessGraphics::new();
    pools.opaque.lock().setup(&mut gfx, true).unwrap();

    let again = get_shadow_pools();
    assert!(again.opaque.lock().is_configured());
    assert_eq!(again.opaque.lock().render_targets(LightKind::Point).len(), 6);
    set_main_context(false);
}

#[test]
fn reset_drops_cached_pair() {
    let _guard = SERIAL.lock();
    set_main_context(true);

    let before = get_shadow_pools();
    assert!(reset_shadow_pools());
    let after = get_shadow_pools();

    assert!(!before.same_storage(&after));
    assert!(after.same_storage(&get_shadow_pools()));
    set_main_context(false);
}
