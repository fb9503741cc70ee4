use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Lights beyond this count are ignored when a frame is extracted.
pub const MAX_LIGHTS: usize = 16;

/// Smallest gap, in radians, between a spot light's inner and outer cone.
pub const MIN_SPOT_CONE_GAP: f32 = 1e-3;

/// Light type. The discriminants are what the shaders switch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum LightKind {
    Directional = 0,
    Point = 1,
    Spot = 2,
}

impl LightKind {
    pub fn label(self) -> &'static str {
        match self {
            LightKind::Directional => "Directional",
            LightKind::Point => "Point",
            LightKind::Spot => "Spot",
        }
    }

    /// Whether the light's `direction` affects shading.
    pub fn uses_direction(self) -> bool {
        matches!(self, LightKind::Directional | LightKind::Spot)
    }

    /// Whether the light's `position` and `range` affect shading.
    pub fn uses_position(self) -> bool {
        matches!(self, LightKind::Point | LightKind::Spot)
    }
}

/// A light source. Fields that the kind does not use are kept so that
/// switching kinds in the editor does not lose them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    /// Direction the light travels. Not required to be normalised.
    pub direction: Vec3,
    pub range: f32,
    pub position: Vec3,
    pub intensity: f32,
    pub color: Vec3,
    /// Spot cone angles in radians, measured from the axis.
    pub spot_inner_angle: f32,
    pub spot_outer_angle: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            kind: LightKind::Directional,
            direction: Vec3::NEG_Y,
            range: 10.0,
            position: Vec3::ZERO,
            intensity: 1.0,
            color: Vec3::ONE,
            spot_inner_angle: 10f32.to_radians(),
            spot_outer_angle: 20f32.to_radians(),
        }
    }
}

impl Light {
    pub fn directional(intensity: f32, color: Vec3, direction: Vec3) -> Self {
        Self {
            kind: LightKind::Directional,
            intensity,
            color,
            direction,
            ..Default::default()
        }
    }

    pub fn point(intensity: f32, color: Vec3, range: f32, position: Vec3) -> Self {
        Self {
            kind: LightKind::Point,
            intensity,
            color,
            range,
            position,
            ..Default::default()
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn spot(
        intensity: f32,
        color: Vec3,
        direction: Vec3,
        range: f32,
        position: Vec3,
        inner_angle: f32,
        outer_angle: f32,
    ) -> Self {
        Self {
            kind: LightKind::Spot,
            intensity,
            color,
            direction,
            range,
            position,
            spot_inner_angle: inner_angle,
            spot_outer_angle: outer_angle,
        }
    }

    /// Normalised travel direction, or straight down for a zero vector.
    pub fn direction_normalized(&self) -> Vec3 {
        self.direction.try_normalize().unwrap_or(Vec3::NEG_Y)
    }

    /// Cone angles with outer at least [`MIN_SPOT_CONE_GAP`] wider than
    /// inner, so the shader's falloff edges never coincide.
    pub fn spot_cone(&self) -> (f32, f32) {
        let inner = self.spot_inner_angle.max(0.0);
        (inner, self.spot_outer_angle.max(inner + MIN_SPOT_CONE_GAP))
    }
}
