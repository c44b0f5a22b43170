//! Process-wide shadow pools.
//!
//! Inside the main rendering context every caller shares one lazily created
//! pair of pools. Any other context (a render worker with its own graphics
//! context, an offscreen bake) gets a fresh pair per call, since pools hold
//! handles that are only meaningful to the context that created them.
//!
//! Nothing invalidates the cached pair on its own. After a context loss call
//! [`reset_shadow_pools`] so the next access builds a new pair.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::{ShadowMapPool, TransparentShadowMapPool};

static MAIN_CONTEXT: AtomicBool = AtomicBool::new(false);

static SHARED_POOLS: Mutex<Option<ShadowPools>> = parking_lot::const_mutex(None);

/// Marks whether the running code executes in the main rendering context.
pub fn set_main_context(is_main: bool) {
    MAIN_CONTEXT.store(is_main, Ordering::Release);
}

#[must_use]
pub fn is_main_context() -> bool {
    MAIN_CONTEXT.load(Ordering::Acquire)
}

/// Opaque and transparent pool, constructed but not yet set up.
#[derive(Clone)]
pub struct ShadowPools {
    pub opaque: Arc<Mutex<ShadowMapPool>>,
    pub transparent: Arc<Mutex<TransparentShadowMapPool>>,
}

impl ShadowPools {
    fn new() -> Self {
        Self {
            opaque: Arc::new(Mutex::new(ShadowMapPool::default())),
            transparent: Arc::new(Mutex::new(TransparentShadowMapPool::default())),
        }
    }

    /// `true` when both pools are the very same instances as `other`'s.
    #[must_use]
    pub fn same_storage(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.opaque, &other.opaque) && Arc::ptr_eq(&self.transparent, &other.transparent)
    }
}

/// Returns the shared pair in the main context, a fresh pair elsewhere.
#[must_use]
pub fn get_shadow_pools() -> ShadowPools {
    if !is_main_context() {
        return ShadowPools::new();
    }

    let mut shared = SHARED_POOLS.lock();
    shared
        .get_or_insert_with(|| {
            log::debug!("Creating shared shadow pools");
            ShadowPools::new()
        })
        .clone()
}

/// Drops the cached pair. Returns `true` if one existed.
///
/// GPU resources held by the dropped pools are not released here; the caller
/// tears down (or has lost) the context that owns them.
pub fn reset_shadow_pools() -> bool {
    let dropped = SHARED_POOLS.lock().take().is_some();
    if dropped {
        log::warn!("Shared shadow pools reset; next access creates a new pair");
    }
    dropped
}
