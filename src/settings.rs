//! Shadow Storage Settings
//!
//! [`ShadowSettings`] carries the per-light-kind resolution and capacity that
//! size every layered texture in a pool, plus the number of cascades each sun
//! light renders into.
//!
//! ```rust,ignore
//! use npr_shadows::{ShadowSettings, ShadowMapPool};
//!
//! let settings = ShadowSettings {
//!     spot_resolution: 1024,
//!     max_spots: 4,
//!     ..Default::default()
//! };
//! let pool = ShadowMapPool::new(settings)?;
//! ```
//!
//! Settings are serde-friendly so a host pipeline can keep them alongside the
//! rest of its render configuration.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ShadowError};

/// Number of faces in a cube map; every point light slot owns this many layers.
pub const CUBE_FACES: u32 = 6;

/// Sizing of the shadow-map arrays.
///
/// Resolutions are edge lengths of the square layers. Capacities count lights,
/// not layers: a sun light occupies `sun_cascades` layers and a point light
/// occupies [`CUBE_FACES`] layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowSettings {
    pub spot_resolution: u32,
    pub sun_resolution: u32,
    pub point_resolution: u32,
    /// Cascade layers rendered per sun light.
    pub sun_cascades: u32,
    pub max_spots: u32,
    pub max_suns: u32,
    pub max_points: u32,
}

impl Default for ShadowSettings {
    #[inline]
    fn default() -> Self {
        Self {
            spot_resolution: 2048,
            sun_resolution: 2048,
            point_resolution: 512,
            sun_cascades: 4,
            max_spots: 1,
            max_suns: 1,
            max_points: 1,
        }
    }
}

impl ShadowSettings {
    /// Rejects zero-sized textures, empty arrays and layer counts that do not
    /// fit in a `u32`.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("spot_resolution", self.spot_resolution),
            ("sun_resolution", self.sun_resolution),
            ("point_resolution", self.point_resolution),
            ("sun_cascades", self.sun_cascades),
            ("max_spots", self.max_spots),
            ("max_suns", self.max_suns),
            ("max_points", self.max_points),
        ];

        for (name, value) in fields {
            if value == 0 {
                return Err(ShadowError::InvalidSettings(format!("{name} must be positive")));
            }
        }

        if self.max_suns.checked_mul(self.sun_cascades).is_none() {
            return Err(ShadowError::InvalidSettings(format!(
                "sun layers overflow: {} suns x {} cascades",
                self.max_suns, self.sun_cascades
            )));
        }
        if self.max_points.checked_mul(CUBE_FACES).is_none() {
            return Err(ShadowError::InvalidSettings(format!(
                "point layers overflow: {} points x {CUBE_FACES} faces",
                self.max_points
            )));
        }
        Ok(())
    }

    /// Layers in the spot arrays (one per spot light).
    #[inline]
    #[must_use]
    pub fn spot_layers(&self) -> u32 {
        self.max_spots
    }

    /// Layers in the sun arrays (one per cascade of every sun light).
    ///
    /// Saturates for settings that fail [`validate`](Self::validate).
    #[inline]
    #[must_use]
    pub fn sun_layers(&self) -> u32 {
        self.max_suns.saturating_mul(self.sun_cascades)
    }

    /// Layers in the point cube arrays (six faces per point light).
    #[inline]
    #[must_use]
    pub fn point_layers(&self) -> u32 {
        self.max_points.saturating_mul(CUBE_FACES)
    }

    /// Returns `true` when any resolution differs from `other`.
    #[inline]
    #[must_use]
    pub fn resolutions_differ(&self, other: &Self) -> bool {
        (self.spot_resolution, self.sun_resolution, self.point_resolution)
            != (other.spot_resolution, other.sun_resolution, other.point_resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        assert!(ShadowSettings::default().validate().is_ok());
    }

    #[test]
    fn zero_cascades_rejected() {
        let settings = ShadowSettings {
            sun_cascades: 0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ShadowError::InvalidSettings(msg)) if msg.contains("sun_cascades")
        ));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: ShadowSettings =
            serde_json::from_str(r#"{ "max_spots": 4, "point_resolution": 256 }"#).unwrap();
        assert_eq!(settings.max_spots, 4);
        assert_eq!(settings.point_resolution, 256);
        assert_eq!(settings.sun_cascades, ShadowSettings::default().sun_cascades);
    }

    #[test]
    fn overflowing_layer_counts_rejected() {
        let points = ShadowSettings {
            max_points: 0x2AAA_AAAB,
            ..Default::default()
        };
        assert!(matches!(
            points.validate(),
            Err(ShadowError::InvalidSettings(msg)) if msg.contains("point layers")
        ));
        assert_eq!(points.point_layers(), u32::MAX);

        let suns = ShadowSettings {
            max_suns: 0x4000_0000,
            ..Default::default()
        };
        assert!(matches!(
            suns.validate(),
            Err(ShadowError::InvalidSettings(msg)) if msg.contains("sun layers")
        ));

        let largest = ShadowSettings {
            max_points: u32::MAX / CUBE_FACES,
            ..Default::default()
        };
        assert!(largest.validate().is_ok());
    }

    #[test]
    fn layer_counts_follow_capacity() {
        let settings = ShadowSettings {
            max_spots: 2,
            max_suns: 3,
            sun_cascades: 4,
            max_points: 2,
            ..Default::default()
        };
        assert_eq!(settings.spot_layers(), 2);
        assert_eq!(settings.sun_layers(), 12);
        assert_eq!(settings.point_layers(), 12);
    }
}
