//! Graphics Context Seam
//!
//! The shadow pools never talk to a GPU API directly. They allocate layered
//! textures, build per-layer render targets and issue clears through the
//! object-safe [`GraphicsContext`] trait, addressing everything by handle.
//!
//! ```text
//! ┌──────────────────────┐   LayeredTextureDesc    ┌──────────────────┐
//! │ ShadowMapPool        │ ──────────────────────► │ GraphicsContext  │
//! │ TransparentShadow... │ ◄────── TextureId ───── │  ├ WgpuGraphics  │
//! │                      │  [LayerAttachment] + d  │  └ HeadlessGraph.│
//! │                      │ ◄──── RenderTargetId ── │                  │
//! └──────────────────────┘                         └──────────────────┘
//! ```
//!
//! Two implementations ship with the crate:
//! - [`WgpuGraphics`]: real GPU resources on a `wgpu::Device`.
//! - [`HeadlessGraphics`]: CPU-side bookkeeping with a per-target clear
//!   history, for tests and contexts that have no device.

mod headless;
mod wgpu_backend;

pub use headless::{ClearRecord, HeadlessGraphics};
pub use wgpu_backend::WgpuGraphics;

use glam::Vec4;
use slotmap::new_key_type;

use crate::errors::{Result, ShadowError};
use crate::settings::CUBE_FACES;

new_key_type! {
    /// Handle to a layered texture owned by a [`GraphicsContext`].
    pub struct TextureId;
    /// Handle to a render target owned by a [`GraphicsContext`].
    pub struct RenderTargetId;
}

// ─── Descriptors ──────────────────────────────────────────────────────────────

/// Layout of a layered texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayeredKind {
    /// Array of 2D layers, one layer per element.
    Array2d,
    /// Array of cube maps; every element spans six layers.
    CubeArray,
}

/// Pixel formats used by shadow storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadowFormat {
    /// 32-bit float depth.
    Depth32Float,
    /// Single channel float, used for caster identifiers.
    R32Float,
    /// Four channel float, used for transparent shadow colour.
    Rgba32Float,
}

impl ShadowFormat {
    #[inline]
    #[must_use]
    pub fn is_depth(self) -> bool {
        matches!(self, Self::Depth32Float)
    }

    #[must_use]
    pub fn to_wgpu(self) -> wgpu::TextureFormat {
        match self {
            Self::Depth32Float => wgpu::TextureFormat::Depth32Float,
            Self::R32Float => wgpu::TextureFormat::R32Float,
            Self::Rgba32Float => wgpu::TextureFormat::Rgba32Float,
        }
    }
}

/// Request for a layered texture.
///
/// `count` is in array elements: 2D layers for [`LayeredKind::Array2d`],
/// whole cube maps for [`LayeredKind::CubeArray`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayeredTextureDesc {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub count: u32,
    pub kind: LayeredKind,
    pub format: ShadowFormat,
}

impl LayeredTextureDesc {
    #[must_use]
    pub fn square(
        label: impl Into<String>,
        resolution: u32,
        count: u32,
        kind: LayeredKind,
        format: ShadowFormat,
    ) -> Self {
        Self {
            label: label.into(),
            width: resolution,
            height: resolution,
            count,
            kind,
            format,
        }
    }

    /// Number of addressable 2D layers, saturating at `u32::MAX`.
    #[inline]
    #[must_use]
    pub fn layer_count(&self) -> u32 {
        match self.kind {
            LayeredKind::Array2d => self.count,
            LayeredKind::CubeArray => self.count.saturating_mul(CUBE_FACES),
        }
    }

    /// Width, height and layer count; equal dimensions mean layers line up
    /// one to one between textures.
    #[inline]
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32, u32) {
        (self.width, self.height, self.layer_count())
    }

    pub(crate) fn check_layer(&self, layer: u32) -> Result<()> {
        if layer < self.layer_count() {
            Ok(())
        } else {
            Err(ShadowError::LayerOutOfRange {
                label: self.label.clone(),
                layer,
                layer_count: self.layer_count(),
            })
        }
    }
}

/// One layer of a layered texture bound as an attachment.
///
/// For cube arrays the layer index runs over faces: `cube * 6 + face`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerAttachment {
    pub texture: TextureId,
    pub layer: u32,
}

impl LayerAttachment {
    #[inline]
    #[must_use]
    pub fn new(texture: TextureId, layer: u32) -> Self {
        Self { texture, layer }
    }
}

/// Clear value for one colour attachment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearValue {
    /// For single channel attachments.
    Scalar(f32),
    /// For four channel attachments.
    Color(Vec4),
}

impl ClearValue {
    /// Identifier attachments clear to zero ("no caster").
    pub const ID: Self = Self::Scalar(0.0);
    /// Colour attachments clear to transparent black.
    pub const TRANSPARENT_BLACK: Self = Self::Color(Vec4::ZERO);

    #[must_use]
    pub fn to_wgpu(self) -> wgpu::Color {
        match self {
            Self::Scalar(v) => wgpu::Color {
                r: f64::from(v),
                g: 0.0,
                b: 0.0,
                a: 0.0,
            },
            Self::Color(c) => wgpu::Color {
                r: f64::from(c.x),
                g: f64::from(c.y),
                b: f64::from(c.z),
                a: f64::from(c.w),
            },
        }
    }

    fn fits(self, format: ShadowFormat) -> bool {
        matches!(
            (self, format),
            (Self::Scalar(_), ShadowFormat::R32Float) | (Self::Color(_), ShadowFormat::Rgba32Float)
        )
    }
}

/// Depth value for "nothing rendered yet".
pub const DEPTH_FAR: f32 = 1.0;

/// Checks clear values against the colour attachment formats of a target.
pub(crate) fn check_clear_values(formats: &[ShadowFormat], values: &[ClearValue]) -> Result<()> {
    if formats.len() != values.len() {
        return Err(ShadowError::ClearValueMismatch {
            attachments: formats.len(),
            values: values.len(),
        });
    }
    for (index, (format, value)) in formats.iter().zip(values).enumerate() {
        if !value.fits(*format) {
            return Err(ShadowError::ClearFormatMismatch { index });
        }
    }
    Ok(())
}

// ─── Trait ────────────────────────────────────────────────────────────────────

/// The host graphics context as seen by the shadow pools.
///
/// Implementations own every texture and render target they hand out; a pool
/// only stores handles. Releasing an unknown handle is a no-op.
pub trait GraphicsContext {
    /// Allocates a layered texture. Layers start undefined.
    fn create_texture_array(&mut self, desc: &LayeredTextureDesc) -> Result<TextureId>;

    /// Builds a render target from colour layers plus one depth layer.
    fn create_render_target(
        &mut self,
        colors: &[LayerAttachment],
        depth: LayerAttachment,
    ) -> Result<RenderTargetId>;

    /// Clears every attachment of `target`: colour attachments to `colors`
    /// (one value per attachment, in attachment order), depth to `depth`.
    fn clear_render_target(
        &mut self,
        target: RenderTargetId,
        colors: &[ClearValue],
        depth: f32,
    ) -> Result<()>;

    fn release_texture(&mut self, texture: TextureId);

    fn release_render_target(&mut self, target: RenderTargetId);

    fn texture_desc(&self, texture: TextureId) -> Option<&LayeredTextureDesc>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_arrays_expose_six_layers_per_element() {
        let desc = LayeredTextureDesc::square(
            "point",
            256,
            3,
            LayeredKind::CubeArray,
            ShadowFormat::Depth32Float,
        );
        assert_eq!(desc.layer_count(), 18);
        assert!(desc.check_layer(17).is_ok());
        assert!(matches!(
            desc.check_layer(18),
            Err(ShadowError::LayerOutOfRange { layer: 18, layer_count: 18, .. })
        ));
    }

    #[test]
    fn oversized_cube_count_saturates() {
        let desc = LayeredTextureDesc::square(
            "point",
            16,
            u32::MAX / 2,
            LayeredKind::CubeArray,
            ShadowFormat::Depth32Float,
        );
        assert_eq!(desc.layer_count(), u32::MAX);
    }

    #[test]
    fn clear_values_must_match_attachment_formats() {
        let formats = [ShadowFormat::R32Float, ShadowFormat::Rgba32Float];
        assert!(check_clear_values(&formats, &[ClearValue::ID, ClearValue::TRANSPARENT_BLACK]).is_ok());
        assert_eq!(
            check_clear_values(&formats, &[ClearValue::ID]),
            Err(ShadowError::ClearValueMismatch {
                attachments: 2,
                values: 1
            })
        );
        assert_eq!(
            check_clear_values(&formats, &[ClearValue::TRANSPARENT_BLACK, ClearValue::ID]),
            Err(ShadowError::ClearFormatMismatch { index: 0 })
        );
    }
}
