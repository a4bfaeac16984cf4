//! Shadow frustum fitting: a light-space orthographic box around the
//! camera's visible region

use crate::core::types::{Mat4, Vec3};
use crate::math::{Aabb, FrustumCorners};

/// Inflated light-space bounds the ortho projection was built from
#[derive(Clone, Copy, Debug)]
pub struct OrthoBounds {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

/// Optional recompute-skip thresholds; when set, `compute` reuses the last
/// result until the camera moves or turns past them.
#[derive(Clone, Copy, Debug)]
pub struct MotionThresholds {
    pub translation: f32,
    pub rotation: f32,
}

/// Fits an orthographic shadow projection to the camera frustum each frame.
pub struct ShadowFitter {
    /// Margin added on every side of the fitted box
    pub offset: f32,
    /// Far distance of the frustum used for fitting; may be shorter than
    /// the main render far plane
    pub far_distance: f32,
    pub near_distance: f32,
    thresholds: Option<MotionThresholds>,
    cached: Option<(Vec3, Vec3, Mat4, Mat4, OrthoBounds)>,
}

impl ShadowFitter {
    pub fn new(offset: f32, far_distance: f32) -> Self {
        Self {
            offset,
            far_distance,
            near_distance: 0.1,
            thresholds: None,
            cached: None,
        }
    }

    /// Opt in to threshold-based caching. Off by default: the cached path
    /// makes shadows visibly swim as the fitted box jumps between updates.
    pub fn with_thresholds(mut self, thresholds: MotionThresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    /// Far plane distance the camera should use when building the frustum
    /// corners for fitting
    pub fn fit_distance(&self) -> f32 {
        self.far_distance + self.offset
    }

    /// Build the light view and orthographic projection enclosing the
    /// given frustum corners.
    ///
    /// The view looks from the light position toward the world origin. The
    /// corners are transformed into that space, bounded by an AABB, and the
    /// box is inflated by `offset` on every side. Light view space looks
    /// down -Z, so the box's max/min Z map to ortho near/far sign-flipped.
    pub fn compute(
        &mut self,
        light_position: Vec3,
        camera_position: Vec3,
        camera_front: Vec3,
        corners: &FrustumCorners,
    ) -> (Mat4, Mat4, OrthoBounds) {
        if let (Some(t), Some((pos, front, view, proj, bounds))) = (self.thresholds, self.cached)
            && (camera_position - pos).length() < t.translation
            && camera_front.angle_between(front) < t.rotation
        {
            return (view, proj, bounds);
        }

        let light_view = Mat4::look_at_rh(light_position, Vec3::ZERO, Vec3::Y);

        let fitted = Aabb::from_points(
            corners
                .corners
                .iter()
                .map(|&c| light_view.transform_point3(c)),
        )
        .inflated(self.offset);

        let bounds = OrthoBounds {
            left: fitted.min.x,
            right: fitted.max.x,
            bottom: fitted.min.y,
            top: fitted.max.y,
            near: -fitted.max.z,
            far: -fitted.min.z,
        };
        let light_proj = Mat4::orthographic_rh(
            bounds.left,
            bounds.right,
            bounds.bottom,
            bounds.top,
            bounds.near,
            bounds.far,
        );

        self.cached = Some((
            camera_position,
            camera_front,
            light_view,
            light_proj,
            bounds,
        ));
        (light_view, light_proj, bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_corners() -> (Vec3, Vec3, FrustumCorners) {
        let position = Vec3::new(30.0, 25.0, -10.0);
        let front = Vec3::new(0.6, -0.3, 0.74).normalize();
        let right = front.cross(Vec3::Y).normalize();
        let up = right.cross(front);
        let corners = FrustumCorners::from_camera(
            position,
            front,
            up,
            right,
            70f32.to_radians(),
            16.0 / 9.0,
            0.1,
            210.0,
        );
        (position, front, corners)
    }

    #[test]
    fn test_bounds_contain_all_corners() {
        let (position, front, corners) = sample_corners();
        let mut fitter = ShadowFitter::new(10.0, 200.0);
        let light_pos = Vec3::new(256.0, 180.0, 180.0);
        let (view, _, b) = fitter.compute(light_pos, position, front, &corners);
        // strict containment by the full inflation margin
        let eps = 10.0 - 1e-3;
        for &corner in &corners.corners {
            let p = view.transform_point3(corner);
            assert!(p.x > b.left + eps && p.x < b.right - eps);
            assert!(p.y > b.bottom + eps && p.y < b.top - eps);
            let depth = -p.z;
            assert!(depth > b.near + eps && depth < b.far - eps);
        }
    }

    #[test]
    fn test_fit_distance_includes_margin() {
        let fitter = ShadowFitter::new(10.0, 200.0);
        assert_eq!(fitter.fit_distance(), 210.0);
    }

    #[test]
    fn test_recomputed_every_frame_without_thresholds() {
        let (position, front, corners) = sample_corners();
        let mut fitter = ShadowFitter::new(10.0, 200.0);
        let light_a = Vec3::new(256.0, 100.0, 100.0);
        let light_b = Vec3::new(-256.0, 100.0, 100.0);
        let (view_a, ..) = fitter.compute(light_a, position, front, &corners);
        let (view_b, ..) = fitter.compute(light_b, position, front, &corners);
        assert_ne!(view_a, view_b);
    }

    #[test]
    fn test_threshold_cache_skips_small_motion() {
        let (position, front, corners) = sample_corners();
        let mut fitter = ShadowFitter::new(10.0, 200.0).with_thresholds(MotionThresholds {
            translation: 1.0,
            rotation: 0.1,
        });
        let light = Vec3::new(256.0, 100.0, 100.0);
        let (view_a, proj_a, _) = fitter.compute(light, position, front, &corners);
        let nudged = position + Vec3::splat(0.01);
        let (view_b, proj_b, _) = fitter.compute(light, nudged, front, &corners);
        assert_eq!(view_a, view_b);
        assert_eq!(proj_a, proj_b);
        let moved = position + Vec3::new(5.0, 0.0, 0.0);
        let corners_moved = FrustumCorners::from_camera(
            moved,
            front,
            front.cross(Vec3::Y).normalize().cross(front),
            front.cross(Vec3::Y).normalize(),
            70f32.to_radians(),
            16.0 / 9.0,
            0.1,
            210.0,
        );
        let (_, _, b) = fitter.compute(light, moved, front, &corners_moved);
        for &corner in &corners_moved.corners {
            let p = Mat4::look_at_rh(light, Vec3::ZERO, Vec3::Y).transform_point3(corner);
            assert!(p.x >= b.left && p.x <= b.right);
        }
    }

    #[test]
    fn test_degenerate_frustum_still_valid() {
        // all corners collapsed to a point: box is pure margin
        let corners = FrustumCorners {
            corners: [Vec3::new(5.0, 5.0, 5.0); 8],
        };
        let mut fitter = ShadowFitter::new(10.0, 200.0);
        let (_, _, b) = fitter.compute(Vec3::new(30.0, 100.0, 30.0), Vec3::ZERO, Vec3::Z, &corners);
        assert!((b.right - b.left - 20.0).abs() < 1e-3);
        assert!((b.top - b.bottom - 20.0).abs() < 1e-3);
        assert!((b.far - b.near - 20.0).abs() < 1e-3);
    }
}
