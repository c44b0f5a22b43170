//! Base depth storage.
//!
//! Depth arrays for every light kind plus depth-only render targets. The
//! identity and transparent pools build on top of this: they reuse its
//! configuration, depth arrays and render-target lists, and replace the
//! targets with their own attachment sets.

use super::{
    LightCounts, LightKind, PerKind, SHADOWMAPS_DEPTH, ShaderBindings, ShadowMapStorage,
    allocate_depth_arrays, build_render_targets, release_per_kind, release_render_targets,
};
use crate::errors::{Result, ShadowError};
use crate::gpu::{ClearValue, DEPTH_FAR, GraphicsContext, RenderTargetId, TextureId};
use crate::settings::ShadowSettings;

pub struct ShadowMaps {
    pub(crate) settings: ShadowSettings,
    depth: Option<PerKind<TextureId>>,
    targets: PerKind<Vec<RenderTargetId>>,
    /// Set by the first `load`.
    pub(crate) initialized: bool,
}

impl Default for ShadowMaps {
    fn default() -> Self {
        Self::from_settings(ShadowSettings::default())
    }
}

impl ShadowMaps {
    pub fn new(settings: ShadowSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self::from_settings(settings))
    }

    pub(crate) fn from_settings(settings: ShadowSettings) -> Self {
        Self {
            settings,
            depth: None,
            targets: PerKind::default(),
            initialized: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &ShadowSettings {
        &self.settings
    }

    /// `true` once `setup` has allocated the depth arrays.
    #[inline]
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.depth.is_some()
    }

    #[inline]
    #[must_use]
    pub fn depth_textures(&self) -> Option<&PerKind<TextureId>> {
        self.depth.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn render_targets(&self, kind: LightKind) -> &[RenderTargetId] {
        self.targets.get(kind)
    }

    /// Depth arrays, or `NotConfigured` naming `operation`.
    pub(crate) fn require_depth(&self, operation: &'static str) -> Result<&PerKind<TextureId>> {
        self.depth
            .as_ref()
            .ok_or(ShadowError::NotConfigured { operation })
    }

    /// Installs freshly built targets, releasing whatever was held before.
    pub(crate) fn replace_render_targets(
        &mut self,
        gfx: &mut dyn GraphicsContext,
        targets: PerKind<Vec<RenderTargetId>>,
    ) {
        release_render_targets(gfx, &mut self.targets);
        self.targets = targets;
    }

    /// Clears the render targets of the lights in use, after checking every
    /// count against its capacity and against the targets actually built.
    ///
    /// Nothing is cleared when any check fails.
    pub(crate) fn clear_in_use(
        &self,
        gfx: &mut dyn GraphicsContext,
        counts: LightCounts,
        colors: &[ClearValue],
    ) -> Result<()> {
        self.require_depth("clear")?;

        let mut in_use = PerKind::<usize>::default();
        for kind in LightKind::ALL {
            let requested = counts.get(kind);
            let capacity = kind.capacity(&self.settings);
            if requested > capacity {
                return Err(ShadowError::CapacityExceeded {
                    kind,
                    requested,
                    capacity,
                });
            }

            let layers =
                requested.saturating_mul(kind.layers_per_light(&self.settings)) as usize;
            if layers > self.targets.get(kind).len() {
                return Err(ShadowError::NoRenderTargets { kind });
            }
            *in_use.get_mut(kind) = layers;
        }

        for (kind, targets) in self.targets.iter() {
            for target in &targets[..*in_use.get(kind)] {
                gfx.clear_render_target(*target, colors, DEPTH_FAR)?;
            }
        }

        log::trace!(
            "Cleared shadow targets: {} spot, {} sun, {} point",
            in_use.spot,
            in_use.sun,
            in_use.point
        );
        Ok(())
    }
}

impl ShadowMapStorage for ShadowMaps {
    fn shadow_maps(&self) -> &ShadowMaps {
        self
    }

    fn shadow_maps_mut(&mut self) -> &mut ShadowMaps {
        self
    }

    fn setup(&mut self, gfx: &mut dyn GraphicsContext, create_render_targets: bool) -> Result<()> {
        self.release(gfx);

        let depth = allocate_depth_arrays(gfx, &self.settings, "Shadow Depth")?;
        self.depth = Some(depth);

        if create_render_targets {
            match build_render_targets(gfx, &depth, &[]) {
                Ok(targets) => self.targets = targets,
                Err(err) => {
                    self.release(gfx);
                    return Err(err);
                }
            }
        }

        log::info!(
            "Shadow depth arrays ready: spot {}px x{}, sun {}px x{}, point {}px x{}",
            self.settings.spot_resolution,
            self.settings.spot_layers(),
            self.settings.sun_resolution,
            self.settings.sun_layers(),
            self.settings.point_resolution,
            self.settings.point_layers(),
        );
        Ok(())
    }

    fn clear(
        &self,
        gfx: &mut dyn GraphicsContext,
        spot_count: u32,
        sun_count: u32,
        point_count: u32,
    ) -> Result<()> {
        self.clear_in_use(gfx, LightCounts::new(spot_count, sun_count, point_count), &[])
    }

    fn shader_callback(&self, bindings: &mut ShaderBindings) -> Result<()> {
        let depth = self.require_depth("shader_callback")?;
        bindings.set_per_kind(&SHADOWMAPS_DEPTH, depth);
        Ok(())
    }

    fn release(&mut self, gfx: &mut dyn GraphicsContext) {
        release_render_targets(gfx, &mut self.targets);
        release_per_kind(gfx, self.depth.take());
    }
}
