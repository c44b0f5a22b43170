//! Shadow-Map Storage
//!
//! Layered shadow storage for spot, sun and point lights, in three tiers that
//! extend each other:
//!
//! ```text
//! ShadowMaps                  depth arrays + depth-only targets
//!   └─ ShadowMapPool          + identity arrays     targets: [id]        + depth
//!        └─ Transparent...    + color arrays        targets: [id, color] + depth
//! ```
//!
//! Every tier owns one render target per array layer and light kind:
//! `max_spots` spot targets, `max_suns * sun_cascades` sun targets and
//! `max_points * 6` point targets. Re-running `setup` replaces all of them.
//!
//! # Frame Flow
//!
//! ```text
//! load / setup ──► clear(spots, suns, points) ──► shadow passes ──► shader_callback
//! ```
//!
//! `clear` only touches the slots in use this frame; layers of inactive lights
//! keep stale data that nothing samples.

mod binding;
mod depth;
mod kind;
mod pool;
mod registry;
mod transparent;

pub use binding::{
    SHADOWMAPS_DEPTH, SHADOWMAPS_ID, ShaderBindings, TRANSPARENT_SHADOWMAPS_COLOR,
    TRANSPARENT_SHADOWMAPS_DEPTH, TRANSPARENT_SHADOWMAPS_ID,
};
pub use depth::ShadowMaps;
pub use kind::{LightCounts, LightKind, PerKind};
pub use pool::ShadowMapPool;
pub use registry::{
    ShadowPools, get_shadow_pools, is_main_context, reset_shadow_pools, set_main_context,
};
pub use transparent::TransparentShadowMapPool;

use smallvec::SmallVec;

use crate::errors::{Result, ShadowError};
use crate::gpu::{
    GraphicsContext, LayerAttachment, LayeredKind, LayeredTextureDesc, RenderTargetId,
    ShadowFormat, TextureId,
};
use crate::settings::ShadowSettings;

/// Capabilities shared by every shadow storage tier.
///
/// `setup`, `clear` and `shader_callback` are specific to each tier;
/// [`load`](Self::load) drives them the same way for all of them.
pub trait ShadowMapStorage {
    /// Base depth storage, with configuration and render-target lists.
    fn shadow_maps(&self) -> &ShadowMaps;

    fn shadow_maps_mut(&mut self) -> &mut ShadowMaps;

    /// Allocates every texture array of this tier and, when
    /// `create_render_targets` is set, rebuilds its render targets.
    ///
    /// Previously held textures and targets are released first. On failure
    /// everything is released and the storage is left unconfigured.
    fn setup(&mut self, gfx: &mut dyn GraphicsContext, create_render_targets: bool) -> Result<()>;

    /// Clears the first `spot_count` spot targets, `sun_count * sun_cascades`
    /// sun targets and `point_count * 6` point targets.
    fn clear(
        &self,
        gfx: &mut dyn GraphicsContext,
        spot_count: u32,
        sun_count: u32,
        point_count: u32,
    ) -> Result<()>;

    /// Publishes this tier's textures to a shader's input table.
    fn shader_callback(&self, bindings: &mut ShaderBindings) -> Result<()>;

    /// Releases every GPU resource, returning to the unconfigured state.
    fn release(&mut self, gfx: &mut dyn GraphicsContext);

    #[inline]
    fn settings(&self) -> &ShadowSettings {
        self.shadow_maps().settings()
    }

    #[inline]
    fn is_configured(&self) -> bool {
        self.shadow_maps().is_configured()
    }

    #[inline]
    fn render_targets(&self, kind: LightKind) -> &[RenderTargetId] {
        self.shadow_maps().render_targets(kind)
    }

    /// Per-frame entry point.
    ///
    /// Adopts resolutions and cascade count from `settings`, grows capacities
    /// to fit `counts` (they never shrink), rebuilds everything if any of that
    /// changed or nothing was built yet, then clears the slots in use.
    fn load(
        &mut self,
        gfx: &mut dyn GraphicsContext,
        settings: &ShadowSettings,
        counts: LightCounts,
    ) -> Result<()> {
        settings.validate()?;

        let maps = self.shadow_maps();
        let mut needs_setup = !maps.initialized || !maps.is_configured();
        let mut next = *maps.settings();

        if settings.resolutions_differ(&next) {
            next.spot_resolution = settings.spot_resolution;
            next.sun_resolution = settings.sun_resolution;
            next.point_resolution = settings.point_resolution;
            needs_setup = true;
        }
        if settings.sun_cascades != next.sun_cascades {
            next.sun_cascades = settings.sun_cascades;
            needs_setup = true;
        }
        for (capacity, count) in [
            (&mut next.max_spots, counts.spots),
            (&mut next.max_suns, counts.suns),
            (&mut next.max_points, counts.points),
        ] {
            if count > *capacity {
                *capacity = count;
                needs_setup = true;
            }
        }
        // Grown capacities can overflow a layer count that `settings` alone
        // does not.
        next.validate()?;

        let maps = self.shadow_maps_mut();
        maps.initialized = true;
        maps.settings = next;

        if needs_setup {
            log::debug!("Shadow storage changed, rebuilding: {:?}", self.settings());
            self.setup(gfx, true)?;
        }
        self.clear(gfx, counts.spots, counts.suns, counts.points)
    }
}

// ─── Shared Allocation Helpers ────────────────────────────────────────────────

/// Creates one texture per light kind, releasing the ones already created if
/// a later allocation fails.
fn create_per_kind(
    gfx: &mut dyn GraphicsContext,
    descs: PerKind<LayeredTextureDesc>,
) -> Result<PerKind<TextureId>> {
    let spot = gfx.create_texture_array(&descs.spot)?;
    let sun = match gfx.create_texture_array(&descs.sun) {
        Ok(sun) => sun,
        Err(err) => {
            gfx.release_texture(spot);
            return Err(err);
        }
    };
    let point = match gfx.create_texture_array(&descs.point) {
        Ok(point) => point,
        Err(err) => {
            gfx.release_texture(spot);
            gfx.release_texture(sun);
            return Err(err);
        }
    };
    Ok(PerKind::new(spot, sun, point))
}

/// Depth arrays sized from the settings.
pub(crate) fn allocate_depth_arrays(
    gfx: &mut dyn GraphicsContext,
    settings: &ShadowSettings,
    label: &str,
) -> Result<PerKind<TextureId>> {
    let describe = |kind: LightKind| {
        let (count, layout) = match kind {
            LightKind::Spot => (settings.spot_layers(), LayeredKind::Array2d),
            LightKind::Sun => (settings.sun_layers(), LayeredKind::Array2d),
            LightKind::Point => (settings.max_points, LayeredKind::CubeArray),
        };
        LayeredTextureDesc::square(
            format!("{label} {}", capitalized(kind)),
            kind.resolution(settings),
            count,
            layout,
            ShadowFormat::Depth32Float,
        )
    };
    create_per_kind(
        gfx,
        PerKind::new(
            describe(LightKind::Spot),
            describe(LightKind::Sun),
            describe(LightKind::Point),
        ),
    )
}

/// Arrays with the same size, layer count and layout as `like`, in `format`.
pub(crate) fn allocate_matching_arrays(
    gfx: &mut dyn GraphicsContext,
    like: &PerKind<TextureId>,
    label: &str,
    format: ShadowFormat,
) -> Result<PerKind<TextureId>> {
    let describe = |kind: LightKind| -> Result<LayeredTextureDesc> {
        let source = gfx
            .texture_desc(*like.get(kind))
            .ok_or(ShadowError::UnknownTexture)?;
        Ok(LayeredTextureDesc {
            label: format!("{label} {}", capitalized(kind)),
            format,
            ..source.clone()
        })
    };
    let descs = PerKind::new(
        describe(LightKind::Spot)?,
        describe(LightKind::Sun)?,
        describe(LightKind::Point)?,
    );
    create_per_kind(gfx, descs)
}

/// Builds one render target per layer of each depth array, attaching the
/// same layer of every texture set in `colors`, in order.
pub(crate) fn build_render_targets(
    gfx: &mut dyn GraphicsContext,
    depth: &PerKind<TextureId>,
    colors: &[&PerKind<TextureId>],
) -> Result<PerKind<Vec<RenderTargetId>>> {
    let mut built: PerKind<Vec<RenderTargetId>> = PerKind::default();

    if let Err(err) = push_render_targets(gfx, depth, colors, &mut built) {
        release_render_targets(gfx, &mut built);
        return Err(err);
    }
    Ok(built)
}

fn push_render_targets(
    gfx: &mut dyn GraphicsContext,
    depth: &PerKind<TextureId>,
    colors: &[&PerKind<TextureId>],
    built: &mut PerKind<Vec<RenderTargetId>>,
) -> Result<()> {
    for kind in LightKind::ALL {
        let depth_texture = *depth.get(kind);
        let layers = gfx
            .texture_desc(depth_texture)
            .ok_or(ShadowError::UnknownTexture)?
            .layer_count();

        let targets = built.get_mut(kind);
        targets.reserve_exact(layers as usize);
        for layer in 0..layers {
            let attachments: SmallVec<[LayerAttachment; 2]> = colors
                .iter()
                .map(|set| LayerAttachment::new(*set.get(kind), layer))
                .collect();
            targets.push(gfx.create_render_target(
                &attachments,
                LayerAttachment::new(depth_texture, layer),
            )?);
        }
    }
    Ok(())
}

/// Releases and empties every render-target list.
pub(crate) fn release_render_targets(
    gfx: &mut dyn GraphicsContext,
    targets: &mut PerKind<Vec<RenderTargetId>>,
) {
    for kind in LightKind::ALL {
        for target in targets.get_mut(kind).drain(..) {
            gfx.release_render_target(target);
        }
    }
}

pub(crate) fn release_per_kind(gfx: &mut dyn GraphicsContext, textures: Option<PerKind<TextureId>>) {
    if let Some(textures) = textures {
        for (_, texture) in textures.iter() {
            gfx.release_texture(*texture);
        }
    }
}

fn capitalized(kind: LightKind) -> &'static str {
    match kind {
        LightKind::Spot => "Spot",
        LightKind::Sun => "Sun",
        LightKind::Point => "Point",
    }
}
