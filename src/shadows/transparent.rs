//! Transparent shadow pool.
//!
//! Second shadow tier capturing what translucent casters let through: on top
//! of the depth and identity arrays it owns an RGBA float colour array per
//! light kind. Render targets attach `[identity, colour]` over the shared
//! depth layer.
//!
//! `shader_callback` is a full override. It publishes its nine textures under
//! the `TRANSPARENT_SHADOWMAPS_*` names only and runs neither the opaque
//! pool's identity binding nor the depth binding underneath it. Shaders that
//! need both opaque and transparent shadows must run both pools' callbacks.

use super::{
    LightCounts, PerKind, ShaderBindings, ShadowMapPool, ShadowMapStorage, ShadowMaps,
    TRANSPARENT_SHADOWMAPS_COLOR, TRANSPARENT_SHADOWMAPS_DEPTH, TRANSPARENT_SHADOWMAPS_ID,
    allocate_matching_arrays, build_render_targets, release_per_kind,
};
use crate::errors::{Result, ShadowError};
use crate::gpu::{ClearValue, GraphicsContext, ShadowFormat, TextureId};
use crate::settings::ShadowSettings;

#[derive(Default)]
pub struct TransparentShadowMapPool {
    pool: ShadowMapPool,
    color: Option<PerKind<TextureId>>,
}

impl TransparentShadowMapPool {
    pub fn new(settings: ShadowSettings) -> Result<Self> {
        Ok(Self {
            pool: ShadowMapPool::new(settings)?,
            color: None,
        })
    }

    #[inline]
    #[must_use]
    pub fn depth_textures(&self) -> Option<&PerKind<TextureId>> {
        self.pool.depth_textures()
    }

    #[inline]
    #[must_use]
    pub fn id_textures(&self) -> Option<&PerKind<TextureId>> {
        self.pool.id_textures()
    }

    /// Colour arrays, `None` before `setup`.
    #[inline]
    #[must_use]
    pub fn color_textures(&self) -> Option<&PerKind<TextureId>> {
        self.color.as_ref()
    }

    fn require_color(&self, operation: &'static str) -> Result<&PerKind<TextureId>> {
        self.color
            .as_ref()
            .ok_or(ShadowError::NotConfigured { operation })
    }

    fn allocate(&mut self, gfx: &mut dyn GraphicsContext, create_render_targets: bool) -> Result<()> {
        self.pool.setup(gfx, false)?;

        let depth = *self.shadow_maps().require_depth("setup")?;
        let color = allocate_matching_arrays(gfx, &depth, "Shadow Color", ShadowFormat::Rgba32Float)?;
        self.color = Some(color);

        if create_render_targets {
            let id = *self.pool.require_id("setup")?;
            let targets = build_render_targets(gfx, &depth, &[&id, &color])?;
            log::debug!(
                "Transparent shadow targets rebuilt: {} spot, {} sun, {} point",
                targets.spot.len(),
                targets.sun.len(),
                targets.point.len()
            );
            self.shadow_maps_mut().replace_render_targets(gfx, targets);
        }
        Ok(())
    }
}

impl ShadowMapStorage for TransparentShadowMapPool {
    fn shadow_maps(&self) -> &ShadowMaps {
        self.pool.shadow_maps()
    }

    fn shadow_maps_mut(&mut self) -> &mut ShadowMaps {
        self.pool.shadow_maps_mut()
    }

    fn setup(&mut self, gfx: &mut dyn GraphicsContext, create_render_targets: bool) -> Result<()> {
        self.release(gfx);
        if let Err(err) = self.allocate(gfx, create_render_targets) {
            log::error!("Failed to set up transparent shadow maps: {err}");
            self.release(gfx);
            return Err(err);
        }
        Ok(())
    }

    fn clear(
        &self,
        gfx: &mut dyn GraphicsContext,
        spot_count: u32,
        sun_count: u32,
        point_count: u32,
    ) -> Result<()> {
        self.require_color("clear")?;
        self.shadow_maps().clear_in_use(
            gfx,
            LightCounts::new(spot_count, sun_count, point_count),
            &[ClearValue::ID, ClearValue::TRANSPARENT_BLACK],
        )
    }

    fn shader_callback(&self, bindings: &mut ShaderBindings) -> Result<()> {
        let color = self.require_color("shader_callback")?;
        let id = self.pool.require_id("shader_callback")?;
        let depth = self.shadow_maps().require_depth("shader_callback")?;

        bindings.set_per_kind(&TRANSPARENT_SHADOWMAPS_DEPTH, depth);
        bindings.set_per_kind(&TRANSPARENT_SHADOWMAPS_ID, id);
        bindings.set_per_kind(&TRANSPARENT_SHADOWMAPS_COLOR, color);
        Ok(())
    }

    fn release(&mut self, gfx: &mut dyn GraphicsContext) {
        release_per_kind(gfx, self.color.take());
        self.pool.release(gfx);
    }
}
