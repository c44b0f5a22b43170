//! CPU-side graphics context.
//!
//! Keeps descriptors and attachment lists instead of GPU objects and records
//! every clear per render target, so pool behaviour can be checked without a
//! device.

use slotmap::SlotMap;
use smallvec::SmallVec;

use super::{
    ClearValue, GraphicsContext, LayerAttachment, LayeredTextureDesc, RenderTargetId,
    ShadowFormat, TextureId, check_clear_values,
};
use crate::errors::{Result, ShadowError};

/// One recorded clear of a render target.
#[derive(Debug, Clone, PartialEq)]
pub struct ClearRecord {
    pub colors: SmallVec<[ClearValue; 2]>,
    pub depth: f32,
}

struct HeadlessTarget {
    colors: SmallVec<[LayerAttachment; 2]>,
    color_formats: SmallVec<[ShadowFormat; 2]>,
    depth: LayerAttachment,
    clears: Vec<ClearRecord>,
}

#[derive(Default)]
pub struct HeadlessGraphics {
    textures: SlotMap<TextureId, LayeredTextureDesc>,
    targets: SlotMap<RenderTargetId, HeadlessTarget>,
    released_textures: usize,
    released_targets: usize,
}

impl HeadlessGraphics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Live textures.
    #[must_use]
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Live render targets.
    #[must_use]
    pub fn render_target_count(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn released_texture_count(&self) -> usize {
        self.released_textures
    }

    #[must_use]
    pub fn released_render_target_count(&self) -> usize {
        self.released_targets
    }

    #[must_use]
    pub fn contains_render_target(&self, target: RenderTargetId) -> bool {
        self.targets.contains_key(target)
    }

    /// Colour attachments and depth attachment of a live target.
    #[must_use]
    pub fn attachments(&self, target: RenderTargetId) -> Option<(&[LayerAttachment], LayerAttachment)> {
        self.targets
            .get(target)
            .map(|t| (t.colors.as_slice(), t.depth))
    }

    /// Clears recorded for `target`, oldest first. Empty for unknown handles.
    #[must_use]
    pub fn clears(&self, target: RenderTargetId) -> &[ClearRecord] {
        self.targets
            .get(target)
            .map(|t| t.clears.as_slice())
            .unwrap_or_default()
    }

    /// Total clears recorded across all live targets.
    #[must_use]
    pub fn total_clears(&self) -> usize {
        self.targets.values().map(|t| t.clears.len()).sum()
    }

    /// Forgets the clear history, typically between simulated frames.
    pub fn reset_clear_history(&mut self) {
        for target in self.targets.values_mut() {
            target.clears.clear();
        }
    }

    fn attachment_desc(&self, attachment: LayerAttachment) -> Result<&LayeredTextureDesc> {
        let desc = self
            .textures
            .get(attachment.texture)
            .ok_or(ShadowError::UnknownTexture)?;
        desc.check_layer(attachment.layer)?;
        Ok(desc)
    }
}

impl GraphicsContext for HeadlessGraphics {
    fn create_texture_array(&mut self, desc: &LayeredTextureDesc) -> Result<TextureId> {
        if desc.width == 0 || desc.height == 0 || desc.count == 0 {
            return Err(ShadowError::Gpu(format!(
                "zero-sized texture '{}' ({}x{}x{})",
                desc.label, desc.width, desc.height, desc.count
            )));
        }
        Ok(self.textures.insert(desc.clone()))
    }

    fn create_render_target(
        &mut self,
        colors: &[LayerAttachment],
        depth: LayerAttachment,
    ) -> Result<RenderTargetId> {
        let depth_desc = self.attachment_desc(depth)?;
        if !depth_desc.format.is_depth() {
            return Err(ShadowError::Gpu(format!(
                "depth attachment '{}' is not a depth format",
                depth_desc.label
            )));
        }
        let extent = (depth_desc.width, depth_desc.height);

        let mut color_formats = SmallVec::new();
        for attachment in colors {
            let desc = self.attachment_desc(*attachment)?;
            if desc.format.is_depth() || (desc.width, desc.height) != extent {
                return Err(ShadowError::Gpu(format!(
                    "colour attachment '{}' is incompatible with its depth attachment",
                    desc.label
                )));
            }
            color_formats.push(desc.format);
        }

        Ok(self.targets.insert(HeadlessTarget {
            colors: colors.iter().copied().collect(),
            color_formats,
            depth,
            clears: Vec::new(),
        }))
    }

    fn clear_render_target(
        &mut self,
        target: RenderTargetId,
        colors: &[ClearValue],
        depth: f32,
    ) -> Result<()> {
        let target = self
            .targets
            .get_mut(target)
            .ok_or(ShadowError::UnknownRenderTarget)?;
        check_clear_values(&target.color_formats, colors)?;
        target.clears.push(ClearRecord {
            colors: colors.iter().copied().collect(),
            depth,
        });
        Ok(())
    }

    fn release_texture(&mut self, texture: TextureId) {
        if self.textures.remove(texture).is_some() {
            self.released_textures += 1;
        }
    }

    fn release_render_target(&mut self, target: RenderTargetId) {
        if self.targets.remove(target).is_some() {
            self.released_targets += 1;
        }
    }

    fn texture_desc(&self, texture: TextureId) -> Option<&LayeredTextureDesc> {
        self.textures.get(texture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::{DEPTH_FAR, LayeredKind};

    fn depth_and_id(gfx: &mut HeadlessGraphics) -> (TextureId, TextureId) {
        let depth = gfx
            .create_texture_array(&LayeredTextureDesc::square(
                "depth",
                64,
                2,
                LayeredKind::Array2d,
                ShadowFormat::Depth32Float,
            ))
            .unwrap();
        let id = gfx
            .create_texture_array(&LayeredTextureDesc::square(
                "id",
                64,
                2,
                LayeredKind::Array2d,
                ShadowFormat::R32Float,
            ))
            .unwrap();
        (depth, id)
    }

    #[test]
    fn records_clears_per_target() {
        let mut gfx = HeadlessGraphics::new();
        let (depth, id) = depth_and_id(&mut gfx);
        let a = gfx
            .create_render_target(&[LayerAttachment::new(id, 0)], LayerAttachment::new(depth, 0))
            .unwrap();
        let b = gfx
            .create_render_target(&[LayerAttachment::new(id, 1)], LayerAttachment::new(depth, 1))
            .unwrap();

        gfx.clear_render_target(a, &[ClearValue::ID], DEPTH_FAR).unwrap();

        assert_eq!(gfx.clears(a).len(), 1);
        assert!(gfx.clears(b).is_empty());
        assert_eq!(gfx.total_clears(), 1);
    }

    #[test]
    fn rejects_color_texture_as_depth() {
        let mut gfx = HeadlessGraphics::new();
        let (_, id) = depth_and_id(&mut gfx);
        let result = gfx.create_render_target(&[], LayerAttachment::new(id, 0));
        assert!(matches!(result, Err(ShadowError::Gpu(_))));
    }

    #[test]
    fn released_target_is_unknown() {
        let mut gfx = HeadlessGraphics::new();
        let (depth, _) = depth_and_id(&mut gfx);
        let target = gfx
            .create_render_target(&[], LayerAttachment::new(depth, 1))
            .unwrap();
        gfx.release_render_target(target);

        assert_eq!(
            gfx.clear_render_target(target, &[], DEPTH_FAR),
            Err(ShadowError::UnknownRenderTarget)
        );
        assert_eq!(gfx.released_render_target_count(), 1);
    }
}
