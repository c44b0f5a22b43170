//! wgpu Graphics Context
//!
//! [`WgpuGraphics`] backs the shadow pools with real GPU resources:
//!
//! - Every layered texture is a single `D2` texture whose
//!   `depth_or_array_layers` equals the descriptor's layer count (six per cube
//!   for cube arrays), plus one sampling view (`D2Array` or `CubeArray`).
//! - Every render target holds single-layer `D2` views of its attachments.
//! - Clears are encoded as load-op-clear render passes into a pending command
//!   encoder; [`WgpuGraphics::flush`] submits them.

use slotmap::SlotMap;
use smallvec::SmallVec;

use super::{
    ClearValue, GraphicsContext, LayerAttachment, LayeredKind, LayeredTextureDesc, RenderTargetId,
    ShadowFormat, TextureId, check_clear_values,
};
use crate::errors::{Result, ShadowError};

struct GpuLayeredTexture {
    desc: LayeredTextureDesc,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

struct GpuRenderTarget {
    colors: SmallVec<[wgpu::TextureView; 2]>,
    color_formats: SmallVec<[ShadowFormat; 2]>,
    depth: wgpu::TextureView,
}

pub struct WgpuGraphics {
    device: wgpu::Device,
    queue: wgpu::Queue,
    textures: SlotMap<TextureId, GpuLayeredTexture>,
    targets: SlotMap<RenderTargetId, GpuRenderTarget>,
    /// Clears recorded since the last [`flush`](Self::flush).
    encoder: Option<wgpu::CommandEncoder>,
}

impl WgpuGraphics {
    #[must_use]
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            textures: SlotMap::with_key(),
            targets: SlotMap::with_key(),
            encoder: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[inline]
    #[must_use]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Sampling view of a layered texture (`D2Array` or `CubeArray`), for
    /// building bind groups from [`ShaderBindings`](crate::ShaderBindings).
    #[must_use]
    pub fn texture_view(&self, texture: TextureId) -> Option<&wgpu::TextureView> {
        self.textures.get(texture).map(|t| &t.view)
    }

    #[must_use]
    pub fn texture(&self, texture: TextureId) -> Option<&wgpu::Texture> {
        self.textures.get(texture).map(|t| &t.texture)
    }

    /// Submits every clear recorded since the previous flush.
    pub fn flush(&mut self) {
        if let Some(encoder) = self.encoder.take() {
            self.queue.submit(std::iter::once(encoder.finish()));
        }
    }

    fn check_limits(&self, desc: &LayeredTextureDesc) -> Result<()> {
        let limits = self.device.limits();
        if desc.width == 0 || desc.height == 0 || desc.count == 0 {
            return Err(ShadowError::Gpu(format!(
                "zero-sized texture '{}' ({}x{}x{})",
                desc.label, desc.width, desc.height, desc.count
            )));
        }
        if desc.width.max(desc.height) > limits.max_texture_dimension_2d {
            return Err(ShadowError::Gpu(format!(
                "'{}' resolution {} exceeds device limit {}",
                desc.label,
                desc.width.max(desc.height),
                limits.max_texture_dimension_2d
            )));
        }
        if desc.layer_count() > limits.max_texture_array_layers {
            return Err(ShadowError::Gpu(format!(
                "'{}' needs {} layers, device limit is {}",
                desc.label,
                desc.layer_count(),
                limits.max_texture_array_layers
            )));
        }
        Ok(())
    }

    fn layer_view(&self, attachment: LayerAttachment) -> Result<(wgpu::TextureView, &LayeredTextureDesc)> {
        let gpu = self
            .textures
            .get(attachment.texture)
            .ok_or(ShadowError::UnknownTexture)?;
        gpu.desc.check_layer(attachment.layer)?;

        let view = gpu.texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&format!("{} Layer {}", gpu.desc.label, attachment.layer)),
            dimension: Some(wgpu::TextureViewDimension::D2),
            base_array_layer: attachment.layer,
            array_layer_count: Some(1),
            ..Default::default()
        });
        Ok((view, &gpu.desc))
    }
}

impl GraphicsContext for WgpuGraphics {
    fn create_texture_array(&mut self, desc: &LayeredTextureDesc) -> Result<TextureId> {
        self.check_limits(desc)?;

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&desc.label),
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: desc.layer_count(),
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: desc.format.to_wgpu(),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&desc.label),
            dimension: Some(match desc.kind {
                LayeredKind::Array2d => wgpu::TextureViewDimension::D2Array,
                LayeredKind::CubeArray => wgpu::TextureViewDimension::CubeArray,
            }),
            ..Default::default()
        });

        log::debug!(
            "Allocated '{}': {}x{} x {} layers ({:?})",
            desc.label,
            desc.width,
            desc.height,
            desc.layer_count(),
            desc.format
        );

        Ok(self.textures.insert(GpuLayeredTexture {
            desc: desc.clone(),
            texture,
            view,
        }))
    }

    fn create_render_target(
        &mut self,
        colors: &[LayerAttachment],
        depth: LayerAttachment,
    ) -> Result<RenderTargetId> {
        let (depth_view, depth_desc) = self.layer_view(depth)?;
        if !depth_desc.format.is_depth() {
            return Err(ShadowError::Gpu(format!(
                "depth attachment '{}' is not a depth format",
                depth_desc.label
            )));
        }
        let extent = (depth_desc.width, depth_desc.height);

        let mut color_views = SmallVec::new();
        let mut color_formats = SmallVec::new();
        for attachment in colors {
            let (view, desc) = self.layer_view(*attachment)?;
            if desc.format.is_depth() || (desc.width, desc.height) != extent {
                return Err(ShadowError::Gpu(format!(
                    "colour attachment '{}' is incompatible with its depth attachment",
                    desc.label
                )));
            }
            color_formats.push(desc.format);
            color_views.push(view);
        }

        Ok(self.targets.insert(GpuRenderTarget {
            colors: color_views,
            color_formats,
            depth: depth_view,
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
            .get(target)
            .ok_or(ShadowError::UnknownRenderTarget)?;
        check_clear_values(&target.color_formats, colors)?;

        let color_attachments: SmallVec<[Option<wgpu::RenderPassColorAttachment>; 2]> = target
            .colors
            .iter()
            .zip(colors)
            .map(|(view, value)| {
                Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(value.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })
            })
            .collect();

        let device = &self.device;
        let encoder = self.encoder.get_or_insert_with(|| {
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Shadow Map Clear Encoder"),
            })
        });

        // Dropping the pass right away leaves only its load/store ops.
        let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Map Clear"),
            color_attachments: color_attachments.as_slice(),
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &target.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(depth),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        Ok(())
    }

    fn release_texture(&mut self, texture: TextureId) {
        self.textures.remove(texture);
    }

    fn release_render_target(&mut self, target: RenderTargetId) {
        self.targets.remove(target);
    }

    fn texture_desc(&self, texture: TextureId) -> Option<&LayeredTextureDesc> {
        self.textures.get(texture).map(|t| &t.desc)
    }
}
