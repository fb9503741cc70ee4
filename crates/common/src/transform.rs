use glam::{EulerRot, Mat4, Quat, Vec3};
use std::cell::Cell;

/// Matrices derived from a transform, computed together.
#[derive(Debug, Clone, Copy, PartialEq)]
struct WorldMatrices {
    world: Mat4,
    world_inverse_transpose: Mat4,
}

/// Spatial transform: position, Euler rotation (pitch, yaw, roll) and scale.
///
/// The world matrix and its inverse-transpose are cached and rebuilt lazily
/// the first time they are read after any mutation. The cache lives in a
/// `Cell`, so readers only need a shared borrow.
///
/// Coordinates are right-handed with +Y up; the local forward axis is -Z.
#[derive(Debug, Clone)]
pub struct Transform {
    position: Vec3,
    /// x = pitch (about X), y = yaw (about Y), z = roll (about Z), radians.
    pitch_yaw_roll: Vec3,
    scale: Vec3,
    cache: Cell<Option<WorldMatrices>>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            pitch_yaw_roll: Vec3::ZERO,
            scale: Vec3::ONE,
            cache: Cell::new(Some(WorldMatrices {
                world: Mat4::IDENTITY,
                world_inverse_transpose: Mat4::IDENTITY,
            })),
        }
    }
}

impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
            && self.pitch_yaw_roll == other.pitch_yaw_roll
            && self.scale == other.scale
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_position(position: Vec3) -> Self {
        let mut t = Self::default();
        t.set_position(position);
        t
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Euler angles as (pitch, yaw, roll) in radians.
    pub fn rotation(&self) -> Vec3 {
        self.pitch_yaw_roll
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.invalidate();
    }

    pub fn set_rotation(&mut self, pitch_yaw_roll: Vec3) {
        self.pitch_yaw_roll = pitch_yaw_roll;
        self.invalidate();
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.invalidate();
    }

    /// Translate in world space, ignoring orientation.
    pub fn move_absolute(&mut self, delta: Vec3) {
        self.position += delta;
        self.invalidate();
    }

    /// Translate along the transform's own axes.
    pub fn move_relative(&mut self, delta: Vec3) {
        self.position += self.orientation() * delta;
        self.invalidate();
    }

    /// Add to the current (pitch, yaw, roll).
    pub fn rotate(&mut self, delta_pitch_yaw_roll: Vec3) {
        self.pitch_yaw_roll += delta_pitch_yaw_roll;
        self.invalidate();
    }

    /// Multiply the current scale component-wise.
    pub fn scale_by(&mut self, factors: Vec3) {
        self.scale *= factors;
        self.invalidate();
    }

    /// Orientation quaternion. Roll is applied first, then pitch, then yaw.
    pub fn orientation(&self) -> Quat {
        let r = self.pitch_yaw_roll;
        Quat::from_euler(EulerRot::YXZ, r.y, r.x, r.z)
    }

    pub fn right(&self) -> Vec3 {
        self.orientation() * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.orientation() * Vec3::Y
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::NEG_Z
    }

    /// World matrix `T * R * S`.
    pub fn world_matrix(&self) -> Mat4 {
        self.matrices().world
    }

    /// Inverse-transpose of the world matrix, used to transform normals.
    ///
    /// A singular (zero-scale) transform yields the identity.
    pub fn world_inverse_transpose(&self) -> Mat4 {
        self.matrices().world_inverse_transpose
    }

    /// Whether the cached matrices are current.
    pub fn is_cached(&self) -> bool {
        self.cache.get().is_some()
    }

    fn invalidate(&mut self) {
        self.cache.set(None);
    }

    fn matrices(&self) -> WorldMatrices {
        if let Some(cached) = self.cache.get() {
            return cached;
        }
        let world =
            Mat4::from_scale_rotation_translation(self.scale, self.orientation(), self.position);
        let det = world.determinant();
        let world_inverse_transpose = if det != 0.0 && det.is_finite() {
            world.inverse().transpose()
        } else {
            Mat4::IDENTITY
        };
        let computed = WorldMatrices {
            world,
            world_inverse_transpose,
        };
        self.cache.set(Some(computed));
        computed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position(), Vec3::ZERO);
        assert_eq!(t.rotation(), Vec3::ZERO);
        assert_eq!(t.scale(), Vec3::ONE);
        assert_eq!(t.world_matrix(), Mat4::IDENTITY);
        assert!(t.is_cached());
    }

    #[test]
    fn every_mutator_invalidates_cache() {
        let mut t = Transform::new();
        let mutators: Vec<Box<dyn Fn(&mut Transform)>> = vec![
            Box::new(|t: &mut Transform| t.set_position(Vec3::X)),
            Box::new(|t: &mut Transform| t.set_rotation(Vec3::Y)),
            Box::new(|t: &mut Transform| t.set_scale(Vec3::splat(2.0))),
            Box::new(|t: &mut Transform| t.move_absolute(Vec3::Y)),
            Box::new(|t: &mut Transform| t.move_relative(Vec3::Z)),
            Box::new(|t: &mut Transform| t.rotate(Vec3::X)),
            Box::new(|t: &mut Transform| t.scale_by(Vec3::splat(0.5))),
        ];
        for mutate in mutators {
            t.world_matrix();
            assert!(t.is_cached());
            mutate(&mut t);
            assert!(!t.is_cached());
        }
    }

    #[test]
    fn world_matrix_tracks_move_absolute() {
        let mut t = Transform::new();
        t.world_matrix();
        t.move_absolute(Vec3::new(1.0, 2.0, 3.0));
        let p = t.world_matrix().transform_point3(Vec3::ZERO);
        assert!(approx(p, Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn world_matrix_is_scale_then_rotate_then_translate() {
        let mut t = Transform::from_position(Vec3::new(10.0, 0.0, 0.0));
        t.set_scale(Vec3::new(2.0, 1.0, 1.0));
        t.set_rotation(Vec3::new(0.0, FRAC_PI_2, 0.0));
        // +X scaled to 2, yawed 90 degrees onto -Z, then translated.
        let p = t.world_matrix().transform_point3(Vec3::X);
        assert!(approx(p, Vec3::new(10.0, 0.0, -2.0)));
    }

    #[test]
    fn set_scale_honours_all_components() {
        let mut t = Transform::new();
        t.set_scale(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.scale(), Vec3::new(1.0, 2.0, 3.0));
        let p = t.world_matrix().transform_point3(Vec3::ONE);
        assert!(approx(p, Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn scale_by_multiplies() {
        let mut t = Transform::new();
        t.set_scale(Vec3::new(2.0, 2.0, 2.0));
        t.scale_by(Vec3::new(0.5, 2.0, 1.0));
        assert_eq!(t.scale(), Vec3::new(1.0, 4.0, 2.0));
    }

    #[test]
    fn rotate_accumulates() {
        let mut t = Transform::new();
        t.rotate(Vec3::new(0.1, 0.2, 0.3));
        t.rotate(Vec3::new(0.1, 0.2, 0.3));
        assert!(approx(t.rotation(), Vec3::new(0.2, 0.4, 0.6)));
    }

    #[test]
    fn axes_follow_yaw() {
        let mut t = Transform::new();
        assert!(approx(t.forward(), Vec3::NEG_Z));
        t.set_rotation(Vec3::new(0.0, FRAC_PI_2, 0.0));
        assert!(approx(t.forward(), Vec3::NEG_X));
        assert!(approx(t.right(), Vec3::NEG_Z));
        assert!(approx(t.up(), Vec3::Y));
    }

    #[test]
    fn up_follows_pitch() {
        let mut t = Transform::new();
        t.set_rotation(Vec3::new(FRAC_PI_2, 0.0, 0.0));
        assert!(approx(t.up(), Vec3::Z));
        assert!(approx(t.forward(), Vec3::Y));
    }

    #[test]
    fn move_relative_uses_local_axes() {
        let mut t = Transform::new();
        t.set_rotation(Vec3::new(0.0, FRAC_PI_2, 0.0));
        t.move_relative(Vec3::new(0.0, 0.0, -1.0));
        assert!(approx(t.position(), Vec3::NEG_X));
    }

    #[test]
    fn inverse_transpose_handles_non_uniform_scale() {
        let mut t = Transform::new();
        t.set_scale(Vec3::new(2.0, 1.0, 1.0));
        let n = t
            .world_inverse_transpose()
            .transform_vector3(Vec3::new(1.0, 1.0, 0.0).normalize())
            .normalize();
        // Normals shrink along the stretched axis.
        assert!(n.x < n.y);
    }

    #[test]
    fn tiny_uniform_scale_keeps_rotated_normals() {
        let mut t = Transform::new();
        t.set_rotation(Vec3::new(0.0, FRAC_PI_2, 0.0));
        t.set_scale(Vec3::splat(0.004));
        let n = t
            .world_inverse_transpose()
            .transform_vector3(Vec3::X)
            .normalize();
        assert!(approx(n, Vec3::NEG_Z), "{n:?}");
    }

    #[test]
    fn degenerate_scale_gives_identity_inverse_transpose() {
        let mut t = Transform::new();
        t.set_scale(Vec3::ZERO);
        assert_eq!(t.world_inverse_transpose(), Mat4::IDENTITY);
    }

    #[test]
    fn equality_ignores_cache_state() {
        let a = Transform::from_position(Vec3::X);
        let b = Transform::from_position(Vec3::X);
        a.world_matrix();
        assert_eq!(a, b);
    }
}
