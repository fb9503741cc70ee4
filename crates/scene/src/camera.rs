use glam::{Mat4, Vec3};
use lumen_common::{CameraControls, Transform};
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

/// Pitch stays just short of straight up/down so the view basis never
/// degenerates.
pub const PITCH_LIMIT: f32 = FRAC_PI_2 - 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Projection {
    #[default]
    Perspective,
    /// Parallel projection showing `height` world units vertically.
    Orthographic { height: f32 },
}

/// Free-flying camera driven by [`CameraControls`].
///
/// Camera motion happens outside the scene's entity set; it only changes
/// what is seen.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    transform: Transform,
    pub move_speed: f32,
    /// Radians per pixel of mouse movement.
    pub look_speed: f32,
    /// Speed multiplier while boost is held.
    pub boost: f32,
    fov: f32,
    aspect: f32,
    near: f32,
    far: f32,
    projection: Projection,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 15.0), 4.0, 0.005, FRAC_PI_4, 16.0 / 9.0)
    }
}

impl Camera {
    pub fn new(position: Vec3, move_speed: f32, look_speed: f32, fov: f32, aspect: f32) -> Self {
        Self {
            transform: Transform::from_position(position),
            move_speed,
            look_speed,
            boost: 3.0,
            fov,
            aspect,
            near: 0.1,
            far: 1000.0,
            projection: Projection::Perspective,
        }
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position()
    }

    /// Vertical field of view in radians.
    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Update the aspect ratio after a resize. Non-finite or non-positive
    /// values (a minimised window) are ignored.
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn set_clip_planes(&mut self, near: f32, far: f32) {
        self.near = near;
        self.far = far;
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
    }

    /// Apply one frame of movement and mouse look.
    pub fn update(&mut self, dt: f32, controls: &CameraControls) {
        let mut speed = dt * self.move_speed;
        if controls.boost {
            speed *= self.boost;
        }

        if controls.local != Vec3::ZERO {
            self.transform.move_relative(controls.local * speed);
        }
        if controls.vertical != 0.0 {
            self.transform
                .move_absolute(Vec3::new(0.0, controls.vertical * speed, 0.0));
        }

        if controls.looking && controls.look_delta != glam::Vec2::ZERO {
            let yaw = -controls.look_delta.x * self.look_speed;
            let pitch = -controls.look_delta.y * self.look_speed;
            self.transform.rotate(Vec3::new(pitch, yaw, 0.0));

            let mut rotation = self.transform.rotation();
            rotation.x = rotation.x.clamp(-PITCH_LIMIT, PITCH_LIMIT);
            self.transform.set_rotation(rotation);
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.transform.position(), self.transform.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection {
            Projection::Perspective => {
                Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
            }
            Projection::Orthographic { height } => {
                let half_h = height * 0.5;
                let half_w = half_h * self.aspect;
                Mat4::orthographic_rh(-half_w, half_w, -half_h, half_h, self.near, self.far)
            }
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec4Swizzles};

    fn forward_pressed() -> CameraControls {
        CameraControls {
            local: Vec3::NEG_Z,
            ..Default::default()
        }
    }

    #[test]
    fn default_camera_sees_origin() {
        let cam = Camera::default();
        let clip = cam.view_projection() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.xyz() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn forward_moves_toward_origin() {
        let mut cam = Camera::default();
        cam.update(1.0, &forward_pressed());
        assert!((cam.position().z - 11.0).abs() < 1e-5);
    }

    #[test]
    fn boost_multiplies_speed() {
        let mut cam = Camera::default();
        let controls = CameraControls {
            boost: true,
            ..forward_pressed()
        };
        cam.update(0.5, &controls);
        assert!((cam.position().z - (15.0 - 4.0 * 0.5 * 3.0)).abs() < 1e-4);
    }

    #[test]
    fn vertical_is_world_space() {
        let mut cam = Camera::default();
        cam.transform_mut().set_rotation(Vec3::new(0.7, 0.3, 0.0));
        cam.update(
            1.0,
            &CameraControls {
                vertical: 1.0,
                ..Default::default()
            },
        );
        let p = cam.position();
        assert!((p.y - 4.0).abs() < 1e-5);
        assert!((p.x).abs() < 1e-5);
    }

    #[test]
    fn look_right_turns_right() {
        let mut cam = Camera::default();
        cam.update(
            0.016,
            &CameraControls {
                looking: true,
                look_delta: Vec2::new(100.0, 0.0),
                ..Default::default()
            },
        );
        assert!(cam.transform().forward().x > 0.0);
    }

    #[test]
    fn look_without_button_does_nothing() {
        let mut cam = Camera::default();
        cam.update(
            0.016,
            &CameraControls {
                looking: false,
                look_delta: Vec2::new(100.0, 50.0),
                ..Default::default()
            },
        );
        assert_eq!(cam.transform().rotation(), Vec3::ZERO);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = Camera::default();
        cam.update(
            0.016,
            &CameraControls {
                looking: true,
                look_delta: Vec2::new(0.0, -100_000.0),
                ..Default::default()
            },
        );
        assert!((cam.transform().rotation().x - PITCH_LIMIT).abs() < 1e-6);
        assert!(!cam.view_matrix().is_nan());
    }

    #[test]
    fn aspect_ignores_degenerate_values() {
        let mut cam = Camera::default();
        cam.set_aspect(0.0);
        cam.set_aspect(f32::NAN);
        assert!((cam.aspect() - 16.0 / 9.0).abs() < 1e-6);
        cam.set_aspect(2.0);
        assert_eq!(cam.aspect(), 2.0);
    }

    #[test]
    fn orthographic_projection_is_finite() {
        let mut cam = Camera::default();
        cam.set_projection(Projection::Orthographic { height: 10.0 });
        let m = cam.projection_matrix();
        assert!(!m.is_nan());
        // Orthographic projections keep w = 1.
        assert_eq!(m.w_axis.w, 1.0);
    }
}
