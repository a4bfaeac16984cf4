//! First-person flyout camera with smoothed rotation

use crate::core::types::{Mat4, Vec3};

/// Movement axes understood by [`FlyoutCamera::move_keyboard`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Free-flying first-person camera.
///
/// Mouse input moves a *target* yaw/pitch; the actual orientation lerps
/// toward it at a rate set by `interpolation_time` (zero snaps). Keyboard
/// movement ramps toward `max_speed` on an exponential acceleration curve.
pub struct FlyoutCamera {
    /// World position
    pub position: Vec3,
    /// World up reference for basis reconstruction
    pub world_up: Vec3,
    /// Current yaw in radians (rotation around Y)
    pub yaw: f32,
    /// Current pitch in radians
    pub pitch: f32,
    /// Vertical field of view in degrees (scroll-zoomable)
    pub fov: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
    /// Mouse sensitivity
    pub sensitivity: f32,
    /// Top movement speed in units per second
    pub max_speed: f32,
    /// Seconds for yaw/pitch to reach the target; 0 disables smoothing
    pub interpolation_time: f32,

    target_yaw: f32,
    target_pitch: f32,
    move_speed: f32,
    acceleration: f32,
    front: Vec3,
    right: Vec3,
    up: Vec3,
}

const PITCH_LIMIT: f32 = 89.0 * std::f32::consts::PI / 180.0;

impl FlyoutCamera {
    /// Create a new camera at `position`, looking down -Z
    pub fn new(position: Vec3) -> Self {
        // yaw starts at -90 degrees so the initial front vector is (0,0,-1)
        let yaw = -std::f32::consts::FRAC_PI_2;
        let mut camera = Self {
            position,
            world_up: Vec3::Y,
            yaw,
            pitch: 0.0,
            fov: 70.0,
            near: 0.1,
            far: 512.0,
            sensitivity: 0.2,
            max_speed: 90.0,
            interpolation_time: 0.0,
            target_yaw: yaw,
            target_pitch: 0.0,
            move_speed: 0.0,
            acceleration: 4.0,
            front: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
        };
        camera.update_vectors();
        camera
    }

    /// Get view matrix (world to camera space)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Get projection matrix for a viewport in pixels
    pub fn projection_matrix(&self, width: u32, height: u32) -> Mat4 {
        let aspect = width as f32 / height.max(1) as f32;
        Mat4::perspective_rh(self.fov.to_radians(), aspect, self.near, self.far)
    }

    /// Forward direction
    pub fn front(&self) -> Vec3 {
        self.front
    }

    /// Right direction
    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Up direction
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Rotate from a mouse drag between two window positions.
    ///
    /// Updates the target orientation and interpolates the actual one.
    pub fn rotate(&mut self, old: (f32, f32), new: (f32, f32), delta_time: f32) {
        let x_offset = self.sensitivity / 15.0 * (new.0 - old.0);
        let y_offset = self.sensitivity / 15.0 * (new.1 - old.1);

        // wrap yaw so long sessions cannot accumulate float error
        self.target_yaw = (self.target_yaw + x_offset).rem_euclid(std::f32::consts::TAU);
        self.target_pitch = (self.target_pitch + y_offset).clamp(-PITCH_LIMIT, PITCH_LIMIT);

        let t = if self.interpolation_time == 0.0 {
            1.0
        } else {
            (delta_time / self.interpolation_time).min(1.0)
        };
        self.yaw += (self.target_yaw - self.yaw) * t;
        self.pitch += (self.target_pitch - self.pitch) * t;

        self.update_vectors();
    }

    /// Pan in the camera plane by a mouse drag
    pub fn pan(&mut self, old: (f32, f32), new: (f32, f32)) {
        let x_offset = self.sensitivity * (new.0 - old.0);
        let y_offset = self.sensitivity * (new.1 - old.1);
        self.position += self.right * x_offset + self.up * y_offset;
    }

    /// Scroll-wheel zoom, clamped to a sane FOV range
    pub fn zoom(&mut self, delta: f32) {
        self.fov = (self.fov - delta * self.sensitivity).clamp(30.0, 120.0);
    }

    /// Move along a camera axis with an exponential acceleration ramp
    pub fn move_keyboard(&mut self, direction: MoveDirection, delta_time: f32) {
        self.move_speed = (self.move_speed + delta_time * self.max_speed).min(self.max_speed);

        // acceleration curve 1 - e^(-k t), normalized against its value at t=1
        let ratio = (1.0 - (-self.acceleration * delta_time).exp())
            / (1.0 - (-self.acceleration).exp());
        let step = ratio * self.move_speed;

        match direction {
            MoveDirection::Forward => self.position += step * self.front,
            MoveDirection::Backward => self.position -= step * self.front,
            MoveDirection::Left => self.position -= step * self.right,
            MoveDirection::Right => self.position += step * self.right,
            MoveDirection::Up => self.position += step * self.up,
            MoveDirection::Down => self.position -= step * self.up,
        }
    }

    /// Reset the acceleration ramp once no movement key is held
    pub fn stop_keyboard(&mut self) {
        self.move_speed = 0.0;
    }

    /// Mirror the camera across the water plane with a flipped pitch.
    ///
    /// Involutive: call once before the reflection pass, once after to
    /// restore the camera.
    pub fn underwater_cam(&mut self, water_height: f32) {
        self.position.y -= 2.0 * (self.position.y - water_height);
        self.pitch = -self.pitch;
        self.update_vectors();
    }

    fn update_vectors(&mut self) {
        self.front = Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

impl Default for FlyoutCamera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_front() {
        let camera = FlyoutCamera::default();
        assert!((camera.front() - Vec3::NEG_Z).length() < 1e-5);
        assert!((camera.right() - Vec3::X).length() < 1e-5);
        assert!((camera.up() - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_rotation_snaps_without_smoothing() {
        let mut camera = FlyoutCamera::default();
        camera.interpolation_time = 0.0;
        camera.rotate((0.0, 0.0), (30.0, 0.0), 0.016);
        assert!((camera.yaw - camera.target_yaw).abs() < 1e-6);
    }

    #[test]
    fn test_rotation_interpolates() {
        let mut camera = FlyoutCamera::default();
        camera.interpolation_time = 0.5;
        let before = camera.yaw;
        camera.rotate((0.0, 0.0), (100.0, 0.0), 0.016);
        // actual yaw moved, but not all the way to the target
        assert!(camera.yaw != before);
        assert!((camera.yaw - camera.target_yaw).abs() > 1e-4);
    }

    #[test]
    fn test_pitch_clamped() {
        let mut camera = FlyoutCamera::default();
        for _ in 0..100 {
            camera.rotate((0.0, 0.0), (0.0, 500.0), 0.016);
        }
        assert!(camera.pitch <= PITCH_LIMIT + 1e-5);
        for _ in 0..200 {
            camera.rotate((0.0, 0.0), (0.0, -500.0), 0.016);
        }
        assert!(camera.pitch >= -PITCH_LIMIT - 1e-5);
    }

    #[test]
    fn test_movement_ramps_to_max_speed() {
        let mut camera = FlyoutCamera::default();
        let start = camera.position;
        camera.move_keyboard(MoveDirection::Forward, 0.016);
        let first_step = (camera.position - start).length();
        for _ in 0..200 {
            camera.move_keyboard(MoveDirection::Forward, 0.016);
        }
        assert!(camera.move_speed <= camera.max_speed);
        assert!((camera.move_speed - camera.max_speed).abs() < 1e-3);
        let pos = camera.position;
        camera.move_keyboard(MoveDirection::Forward, 0.016);
        let late_step = (camera.position - pos).length();
        assert!(late_step > first_step);

        camera.stop_keyboard();
        assert_eq!(camera.move_speed, 0.0);
    }

    #[test]
    fn test_underwater_cam_is_involutive() {
        let mut camera = FlyoutCamera::new(Vec3::new(5.0, 10.0, 3.0));
        camera.rotate((0.0, 0.0), (10.0, 25.0), 0.016);
        let pos = camera.position;
        let pitch = camera.pitch;

        camera.underwater_cam(-40.0);
        assert!((camera.position.y - (-90.0)).abs() < 1e-4); // mirrored across y=-40
        assert!((camera.pitch + pitch).abs() < 1e-6);

        camera.underwater_cam(-40.0);
        assert!((camera.position - pos).length() < 1e-4);
        assert!((camera.pitch - pitch).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut camera = FlyoutCamera::default();
        camera.zoom(-1000.0);
        assert_eq!(camera.fov, 120.0);
        camera.zoom(1000.0);
        assert_eq!(camera.fov, 30.0);
    }
}
