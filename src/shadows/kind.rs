use std::fmt;

use crate::settings::{CUBE_FACES, ShadowSettings};

/// The three light kinds that own shadow storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightKind {
    Spot,
    /// Directional light, rendered in cascades.
    Sun,
    /// Omnidirectional light, rendered into a cube map.
    Point,
}

impl LightKind {
    pub const ALL: [Self; 3] = [Self::Spot, Self::Sun, Self::Point];

    /// Array layers one light of this kind occupies.
    #[inline]
    #[must_use]
    pub fn layers_per_light(self, settings: &ShadowSettings) -> u32 {
        match self {
            Self::Spot => 1,
            Self::Sun => settings.sun_cascades,
            Self::Point => CUBE_FACES,
        }
    }

    /// Configured light capacity for this kind.
    #[inline]
    #[must_use]
    pub fn capacity(self, settings: &ShadowSettings) -> u32 {
        match self {
            Self::Spot => settings.max_spots,
            Self::Sun => settings.max_suns,
            Self::Point => settings.max_points,
        }
    }

    #[inline]
    #[must_use]
    pub fn resolution(self, settings: &ShadowSettings) -> u32 {
        match self {
            Self::Spot => settings.spot_resolution,
            Self::Sun => settings.sun_resolution,
            Self::Point => settings.point_resolution,
        }
    }
}

impl fmt::Display for LightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Spot => "spot",
            Self::Sun => "sun",
            Self::Point => "point",
        })
    }
}

/// One value per light kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PerKind<T> {
    pub spot: T,
    pub sun: T,
    pub point: T,
}

impl<T> PerKind<T> {
    #[inline]
    pub const fn new(spot: T, sun: T, point: T) -> Self {
        Self { spot, sun, point }
    }

    #[inline]
    pub fn get(&self, kind: LightKind) -> &T {
        match kind {
            LightKind::Spot => &self.spot,
            LightKind::Sun => &self.sun,
            LightKind::Point => &self.point,
        }
    }

    #[inline]
    pub fn get_mut(&mut self, kind: LightKind) -> &mut T {
        match kind {
            LightKind::Spot => &mut self.spot,
            LightKind::Sun => &mut self.sun,
            LightKind::Point => &mut self.point,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (LightKind, &T)> {
        LightKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }
}

/// Lights of each kind that cast shadows this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LightCounts {
    pub spots: u32,
    pub suns: u32,
    pub points: u32,
}

impl LightCounts {
    #[inline]
    #[must_use]
    pub const fn new(spots: u32, suns: u32, points: u32) -> Self {
        Self { spots, suns, points }
    }

    #[inline]
    #[must_use]
    pub fn get(&self, kind: LightKind) -> u32 {
        match kind {
            LightKind::Spot => self.spots,
            LightKind::Sun => self.suns,
            LightKind::Point => self.points,
        }
    }
}
