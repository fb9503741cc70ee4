use glam::{Vec2, Vec3};

/// Per-frame camera intent, produced by the input layer and consumed by
/// cameras. Keeps cameras independent of any windowing library.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraControls {
    /// Movement along the camera's local axes, each component in -1..=1.
    /// x = right, y = up, z = backward (so -z moves forward).
    pub local: Vec3,
    /// Movement along world +Y, in -1..=1.
    pub vertical: f32,
    /// Mouse movement since the last frame, in pixels.
    pub look_delta: Vec2,
    /// Whether mouse look is engaged this frame.
    pub looking: bool,
    /// Whether the speed boost is held.
    pub boost: bool,
}

impl CameraControls {
    /// True when applying these controls would change nothing.
    pub fn is_idle(&self) -> bool {
        self.local == Vec3::ZERO
            && self.vertical == 0.0
            && (!self.looking || self.look_delta == Vec2::ZERO)
    }
}
