//! Shader texture-input table.
//!
//! Shader sources reference shadow storage by the exact names below; renaming
//! any of them breaks every shader that samples it.

use std::borrow::Cow;

use rustc_hash::FxHashMap;

use super::PerKind;
use crate::gpu::TextureId;

/// Depth arrays bound by the base depth storage.
pub const SHADOWMAPS_DEPTH: PerKind<&str> = PerKind::new(
    "SHADOWMAPS_DEPTH_SPOT",
    "SHADOWMAPS_DEPTH_SUN",
    "SHADOWMAPS_DEPTH_POINT",
);

/// Identity arrays bound by the opaque pool.
pub const SHADOWMAPS_ID: PerKind<&str> = PerKind::new(
    "SHADOWMAPS_ID_SPOT",
    "SHADOWMAPS_ID_SUN",
    "SHADOWMAPS_ID_POINT",
);

pub const TRANSPARENT_SHADOWMAPS_DEPTH: PerKind<&str> = PerKind::new(
    "TRANSPARENT_SHADOWMAPS_DEPTH_SPOT",
    "TRANSPARENT_SHADOWMAPS_DEPTH_SUN",
    "TRANSPARENT_SHADOWMAPS_DEPTH_POINT",
);

pub const TRANSPARENT_SHADOWMAPS_ID: PerKind<&str> = PerKind::new(
    "TRANSPARENT_SHADOWMAPS_ID_SPOT",
    "TRANSPARENT_SHADOWMAPS_ID_SUN",
    "TRANSPARENT_SHADOWMAPS_ID_POINT",
);

pub const TRANSPARENT_SHADOWMAPS_COLOR: PerKind<&str> = PerKind::new(
    "TRANSPARENT_SHADOWMAPS_COLOR_SPOT",
    "TRANSPARENT_SHADOWMAPS_COLOR_SUN",
    "TRANSPARENT_SHADOWMAPS_COLOR_POINT",
);

/// Named texture inputs of one shader, filled by `shader_callback`s.
///
/// Setting a name twice keeps the latest texture.
#[derive(Debug, Clone, Default)]
pub struct ShaderBindings {
    textures: FxHashMap<Cow<'static, str>, TextureId>,
}

impl ShaderBindings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_texture(&mut self, name: impl Into<Cow<'static, str>>, texture: TextureId) {
        self.textures.insert(name.into(), texture);
    }

    /// Binds one texture per light kind under the matching name.
    pub fn set_per_kind(&mut self, names: &PerKind<&'static str>, textures: &PerKind<TextureId>) {
        for (kind, name) in names.iter() {
            self.set_texture(*name, *textures.get(kind));
        }
    }

    #[must_use]
    pub fn texture(&self, name: &str) -> Option<TextureId> {
        self.textures.get(name).copied()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.textures.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, TextureId)> {
        self.textures.iter().map(|(name, id)| (name.as_ref(), *id))
    }
}
