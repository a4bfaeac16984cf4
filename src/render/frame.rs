//! Per-frame state, built fresh each loop iteration

use bytemuck::{Pod, Zeroable};

use crate::core::time::DayCycle;
use crate::core::types::{Mat4, Vec3, Vec4};

/// Everything that varies per frame, derived from accumulated timers and
/// input before rendering starts. Threaded explicitly through the render
/// call instead of living as mutable globals.
#[derive(Clone, Copy, Debug)]
pub struct FrameContext {
    pub elapsed: f32,
    pub delta: f32,
    /// Sun position on its arc
    pub light_position: Vec3,
    /// 1 at noon, 0 at midnight
    pub time_of_day: f32,
    /// Water scroll phase in [0, 1)
    pub wave_phase: f32,
    /// Eruption progress in [0, 1]; 0 before the eruption is triggered
    pub lava_phase: f32,
    /// Whether the eruption is spewing particles this frame
    pub erupting: bool,
}

impl FrameContext {
    /// Derive the frame state from the clock and the eruption trigger time
    pub fn build(
        cycle: &DayCycle,
        elapsed: f32,
        delta: f32,
        eruption_start: Option<f32>,
    ) -> Self {
        let lava_phase = match eruption_start {
            Some(start) => ((elapsed - start) / 30.0).min(1.0),
            None => 0.0,
        };
        Self {
            elapsed,
            delta,
            light_position: cycle.light_position(elapsed),
            time_of_day: cycle.time_of_day(elapsed),
            wave_phase: (elapsed * 0.02).fract(),
            lava_phase,
            erupting: eruption_start.is_some(),
        }
    }
}

/// Per-pass shader globals; one uniform buffer per pass
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Globals {
    pub view_proj: [[f32; 4]; 4],
    pub light_space: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub time_of_day: f32,
    pub light_pos: [f32; 3],
    pub wave_phase: f32,
    pub fog_color: [f32; 3],
    pub lava_phase: f32,
    /// Plane equation; fragments with `dot(p, xyz) + w < 0` are discarded
    pub clip_plane: [f32; 4],
    pub shadow_distance: f32,
    pub _pad: [f32; 3],
}

/// Sky and distance fog tint
pub const FOG_COLOR: Vec3 = Vec3::new(0.75, 0.4, 0.25);

/// A disabled clip plane: every point satisfies `dot(p, 0) + 1 > 0`
pub const CLIP_NONE: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);

impl Globals {
    pub fn new(
        view_proj: Mat4,
        light_space: Mat4,
        camera_pos: Vec3,
        frame: &FrameContext,
        clip_plane: Vec4,
        shadow_distance: f32,
    ) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            light_space: light_space.to_cols_array_2d(),
            camera_pos: camera_pos.to_array(),
            time_of_day: frame.time_of_day,
            light_pos: frame.light_position.to_array(),
            wave_phase: frame.wave_phase,
            fog_color: FOG_COLOR.to_array(),
            lava_phase: frame.lava_phase,
            clip_plane: clip_plane.to_array(),
            shadow_distance,
            _pad: [0.0; 3],
        }
    }
}

/// Per-object shader constants
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
    pub tint: [f32; 4],
    pub receives_shadow: f32,
    pub emissive: f32,
    pub uv_scroll: f32,
    pub _pad: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lava_phase_ramps_from_trigger() {
        let cycle = DayCycle::new(30.0);
        let before = FrameContext::build(&cycle, 10.0, 0.016, None);
        assert_eq!(before.lava_phase, 0.0);
        assert!(!before.erupting);

        let mid = FrameContext::build(&cycle, 25.0, 0.016, Some(10.0));
        assert!((mid.lava_phase - 0.5).abs() < 1e-4);
        let done = FrameContext::build(&cycle, 100.0, 0.016, Some(10.0));
        assert_eq!(done.lava_phase, 1.0);
        assert!(done.erupting);
    }

    #[test]
    fn test_wave_phase_wraps() {
        let cycle = DayCycle::new(30.0);
        let frame = FrameContext::build(&cycle, 75.0, 0.016, None);
        assert!((0.0..1.0).contains(&frame.wave_phase));
        // 75 * 0.02 = 1.5 -> 0.5
        assert!((frame.wave_phase - 0.5).abs() < 1e-4);
    }
}
