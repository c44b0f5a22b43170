//! Opaque shadow pool.
//!
//! Adds a single-channel identity array per light kind on top of the depth
//! storage. Each render target writes the caster identifier into the identity
//! layer while depth-testing against the matching depth layer.

use super::{
    LightCounts, PerKind, SHADOWMAPS_ID, ShaderBindings, ShadowMapStorage, ShadowMaps,
    allocate_matching_arrays, build_render_targets, release_per_kind,
};
use crate::errors::{Result, ShadowError};
use crate::gpu::{ClearValue, GraphicsContext, ShadowFormat, TextureId};
use crate::settings::ShadowSettings;

#[derive(Default)]
pub struct ShadowMapPool {
    base: ShadowMaps,
    id: Option<PerKind<TextureId>>,
}

impl ShadowMapPool {
    pub fn new(settings: ShadowSettings) -> Result<Self> {
        Ok(Self {
            base: ShadowMaps::new(settings)?,
            id: None,
        })
    }

    /// Identity arrays, `None` before `setup`.
    #[inline]
    #[must_use]
    pub fn id_textures(&self) -> Option<&PerKind<TextureId>> {
        self.id.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn depth_textures(&self) -> Option<&PerKind<TextureId>> {
        self.base.depth_textures()
    }

    pub(crate) fn require_id(&self, operation: &'static str) -> Result<&PerKind<TextureId>> {
        self.id.as_ref().ok_or(ShadowError::NotConfigured { operation })
    }

    fn allocate(&mut self, gfx: &mut dyn GraphicsContext, create_render_targets: bool) -> Result<()> {
        self.base.setup(gfx, false)?;

        let depth = *self.base.require_depth("setup")?;
        let id = allocate_matching_arrays(gfx, &depth, "Shadow ID", ShadowFormat::R32Float)?;
        self.id = Some(id);

        if create_render_targets {
            let targets = build_render_targets(gfx, &depth, &[&id])?;
            log::debug!(
                "Shadow ID targets rebuilt: {} spot, {} sun, {} point",
                targets.spot.len(),
                targets.sun.len(),
                targets.point.len()
            );
            self.base.replace_render_targets(gfx, targets);
        }
        Ok(())
    }
}

impl ShadowMapStorage for ShadowMapPool {
    fn shadow_maps(&self) -> &ShadowMaps {
        &self.base
    }

    fn shadow_maps_mut(&mut self) -> &mut ShadowMaps {
        &mut self.base
    }

    fn setup(&mut self, gfx: &mut dyn GraphicsContext, create_render_targets: bool) -> Result<()> {
        self.release(gfx);
        if let Err(err) = self.allocate(gfx, create_render_targets) {
            log::error!("Failed to set up shadow maps: {err}");
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
        self.require_id("clear")?;
        self.base.clear_in_use(
            gfx,
            LightCounts::new(spot_count, sun_count, point_count),
            &[ClearValue::ID],
        )
    }

    fn shader_callback(&self, bindings: &mut ShaderBindings) -> Result<()> {
        let id = self.require_id("shader_callback")?;
        self.base.shader_callback(bindings)?;
        bindings.set_per_kind(&SHADOWMAPS_ID, id);
        Ok(())
    }

    fn release(&mut self, gfx: &mut dyn GraphicsContext) {
        release_per_kind(gfx, self.id.take());
        self.base.release(gfx);
    }
}
