//! Scene description: drawable objects tagged with a render category

use crate::core::types::{Mat4, Vec4};

/// The four per-frame render passes, in execution order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassKind {
    Shadow,
    Reflection,
    Refraction,
    Composite,
}

/// What kind of surface an object is, driving per-pass inclusion and
/// pipeline state instead of type-sniffing in the draw loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderCategory {
    Terrain,
    Vegetation,
    Water,
    Lava,
    Cloud,
    Particles,
}

impl RenderCategory {
    /// Water and clouds do not cast shadows
    pub fn casts_shadow(self) -> bool {
        !matches!(self, RenderCategory::Water | RenderCategory::Cloud)
    }

    /// Thin double-sided layers are drawn without face culling
    pub fn wants_culling_disabled(self) -> bool {
        matches!(self, RenderCategory::Cloud | RenderCategory::Particles)
    }

    /// Whether this category is drawn in the given pass.
    ///
    /// Water only appears in the composite pass (it would otherwise occlude
    /// its own reflection/refraction sources). Particles are gated on the
    /// emitter's liveness in every pass.
    pub fn drawn_in(self, pass: PassKind, particles_active: bool) -> bool {
        match self {
            RenderCategory::Water => pass == PassKind::Composite,
            RenderCategory::Cloud => pass != PassKind::Shadow,
            RenderCategory::Particles => particles_active && pass != PassKind::Shadow,
            _ => pass != PassKind::Shadow || self.casts_shadow(),
        }
    }
}

/// Per-object shading constants, uploaded alongside the model matrix
#[derive(Clone, Copy, Debug)]
pub struct Material {
    /// Multiplied with the diffuse texture sample
    pub tint: Vec4,
    /// 0 disables the shadow-map lookup for this surface
    pub receives_shadow: f32,
    /// 1 skips lighting entirely; brightness then follows the lava phase
    pub emissive: f32,
    /// Texture scroll speed along U, driven by the wave phase
    pub uv_scroll: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            tint: Vec4::ONE,
            receives_shadow: 1.0,
            emissive: 0.0,
            uv_scroll: 0.0,
        }
    }
}

/// One drawable entry in the scene list
pub struct SceneObject {
    pub name: &'static str,
    pub category: RenderCategory,
    pub model: Mat4,
    pub material: Material,
    /// Index into the renderer's uploaded mesh table
    pub mesh: usize,
    /// Index into the renderer's texture table, if textured
    pub texture: Option<usize>,
}

/// Flat draw list; traversal order is insertion order
#[derive(Default)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
}

impl Scene {
    pub fn push(&mut self, object: SceneObject) {
        self.objects.push(object)
    }

    /// Objects participating in `pass` with their scene indices, in
    /// insertion order
    pub fn visible_in(
        &self,
        pass: PassKind,
        particles_active: bool,
    ) -> impl Iterator<Item = (usize, &SceneObject)> {
        self.objects
            .iter()
            .enumerate()
            .filter(move |(_, o)| o.category.drawn_in(pass, particles_active))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_water_only_in_composite() {
        for pass in [PassKind::Shadow, PassKind::Reflection, PassKind::Refraction] {
            assert!(!RenderCategory::Water.drawn_in(pass, true));
        }
        assert!(RenderCategory::Water.drawn_in(PassKind::Composite, true));
    }

    #[test]
    fn test_cloud_skips_shadow_only() {
        assert!(!RenderCategory::Cloud.drawn_in(PassKind::Shadow, false));
        assert!(RenderCategory::Cloud.drawn_in(PassKind::Reflection, false));
        assert!(RenderCategory::Cloud.drawn_in(PassKind::Composite, false));
        assert!(!RenderCategory::Cloud.casts_shadow());
    }

    #[test]
    fn test_particles_gated_on_liveness() {
        assert!(!RenderCategory::Particles.drawn_in(PassKind::Composite, false));
        assert!(RenderCategory::Particles.drawn_in(PassKind::Composite, true));
        assert!(!RenderCategory::Particles.drawn_in(PassKind::Shadow, true));
    }

    #[test]
    fn test_terrain_everywhere() {
        for pass in [
            PassKind::Shadow,
            PassKind::Reflection,
            PassKind::Refraction,
            PassKind::Composite,
        ] {
            assert!(RenderCategory::Terrain.drawn_in(pass, false));
            assert!(RenderCategory::Vegetation.drawn_in(pass, false));
        }
    }

    #[test]
    fn test_scene_filters_by_pass() {
        let mut scene = Scene::default();
        for (name, category) in [
            ("terrain", RenderCategory::Terrain),
            ("water", RenderCategory::Water),
            ("cloud", RenderCategory::Cloud),
        ] {
            scene.push(SceneObject {
                name,
                category,
                model: Mat4::IDENTITY,
                material: Material::default(),
                mesh: 0,
                texture: None,
            });
        }
        let shadow: Vec<_> = scene.visible_in(PassKind::Shadow, false).collect();
        assert_eq!(shadow.len(), 1);
        assert_eq!(shadow[0].0, 0);
        assert_eq!(shadow[0].1.name, "terrain");
        let composite: Vec<_> = scene.visible_in(PassKind::Composite, false).collect();
        assert_eq!(composite.len(), 3);
    }
}
