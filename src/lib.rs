#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! Shadow-map storage for a non-photorealistic render pipeline.
//!
//! Layered depth, identity and colour arrays for spot, sun and point lights,
//! the per-layer render targets that draw into them, per-frame clearing of the
//! slots in use and publication of the arrays to shaders.
//!
//! ```rust,ignore
//! use npr_shadows::{ShadowMapPool, ShadowMapStorage, ShaderBindings, WgpuGraphics};
//!
//! let mut gfx = WgpuGraphics::new(device, queue);
//! let mut pool = ShadowMapPool::default();
//! pool.setup(&mut gfx, true)?;
//!
//! // every frame
//! pool.clear(&mut gfx, spots, suns, points)?;
//! gfx.flush();
//! // ... shadow passes render into pool.render_targets(kind) ...
//! let mut bindings = ShaderBindings::new();
//! pool.shader_callback(&mut bindings)?;
//! ```

pub mod errors;
pub mod gpu;
pub mod settings;
pub mod shadows;

pub use errors::{Result, ShadowError};
pub use gpu::{
    ClearValue, GraphicsContext, HeadlessGraphics, LayerAttachment, LayeredKind,
    LayeredTextureDesc, RenderTargetId, ShadowFormat, TextureId, WgpuGraphics,
};
pub use settings::ShadowSettings;
pub use shadows::{
    LightCounts, LightKind, PerKind, ShaderBindings, ShadowMapPool, ShadowMapStorage, ShadowMaps,
    ShadowPools, TransparentShadowMapPool, get_shadow_pools, is_main_context,
    reset_shadow_pools, set_main_context,
};
