//! Camera view-frustum corner extraction

use crate::core::types::Vec3;

/// The 8 world-space corners of a perspective view frustum.
///
/// Computed from the camera basis rather than by inverting the projection
/// matrix, so the far distance can differ from the render far plane (the
/// shadow fitter uses a shorter shadow draw distance).
#[derive(Clone, Copy, Debug)]
pub struct FrustumCorners {
    pub corners: [Vec3; 8],
}

impl FrustumCorners {
    /// Compute frustum corners from a camera pose.
    ///
    /// `fov_y` is the vertical field of view in radians; `near` and `far`
    /// are distances along `front`.
    pub fn from_camera(
        position: Vec3,
        front: Vec3,
        up: Vec3,
        right: Vec3,
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let h_near = 2.0 * (fov_y / 2.0).tan() * near;
        let w_near = h_near * aspect;
        let h_far = 2.0 * (fov_y / 2.0).tan() * far;
        let w_far = h_far * aspect;

        let center_near = position + front * near;
        let center_far = position + front * far;

        let make = |center: Vec3, w: f32, h: f32| {
            [
                center - up * h / 2.0 + right * w / 2.0, // bottom right
                center + up * h / 2.0 + right * w / 2.0, // top right
                center - up * h / 2.0 - right * w / 2.0, // bottom left
                center + up * h / 2.0 - right * w / 2.0, // top left
            ]
        };

        let n = make(center_near, w_near, h_near);
        let f = make(center_far, w_far, h_far);

        Self {
            corners: [n[0], n[1], n[2], n[3], f[0], f[1], f[2], f[3]],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners_straddle_the_view_axis() {
        let corners = FrustumCorners::from_camera(
            Vec3::ZERO,
            Vec3::NEG_Z,
            Vec3::Y,
            Vec3::X,
            60.0_f32.to_radians(),
            16.0 / 9.0,
            0.1,
            100.0,
        );

        // near plane corners sit at z = -0.1, far at z = -100
        for c in &corners.corners[..4] {
            assert!((c.z - (-0.1)).abs() < 1e-5);
        }
        for c in &corners.corners[4..] {
            assert!((c.z - (-100.0)).abs() < 1e-3);
        }

        // symmetric about the axis
        let sum: Vec3 = corners.corners.iter().copied().sum();
        assert!(sum.x.abs() < 1e-3);
        assert!(sum.y.abs() < 1e-3);
    }

    #[test]
    fn test_far_plane_wider_than_near() {
        let corners = FrustumCorners::from_camera(
            Vec3::ZERO,
            Vec3::NEG_Z,
            Vec3::Y,
            Vec3::X,
            70.0_f32.to_radians(),
            1.0,
            0.1,
            50.0,
        );
        let near_width = (corners.corners[0].x - corners.corners[2].x).abs();
        let far_width = (corners.corners[4].x - corners.corners[6].x).abs();
        assert!(far_width > near_width * 100.0);
    }
}
