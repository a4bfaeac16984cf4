//! Flat surface meshes for the water table, lava pool, and cloud layer

use std::f32::consts::TAU;

use crate::core::types::{Vec2, Vec3};
use crate::terrain::MeshData;

/// Horizontal quad spanning `half_width x half_depth`, facing +Y
fn horizontal_quad(half_width: f32, half_depth: f32, height: f32) -> MeshData {
    let positions = vec![
        Vec3::new(-half_width, height, -half_depth),
        Vec3::new(half_width, height, -half_depth),
        Vec3::new(half_width, height, half_depth),
        Vec3::new(-half_width, height, half_depth),
    ];
    let uvs = vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
    ];
    let indices = vec![1, 0, 3, 1, 3, 2];
    let mut mesh = MeshData {
        positions,
        uvs,
        indices,
        ..Default::default()
    };
    mesh.compute_shading_attributes();
    mesh
}

/// Water plane covering the whole map at the water table height
pub fn water_mesh(map_width: f32, map_depth: f32, height: f32) -> MeshData {
    horizontal_quad(map_width / 2.0, map_depth / 2.0, height)
}

/// Cloud plane above the island; the cloud noise map scrolls across it
pub fn cloud_mesh(map_width: f32, map_depth: f32, height: f32) -> MeshData {
    horizontal_quad(map_width / 2.0, map_depth / 2.0, height)
}

/// Lava pool: a regular polygon fan filling the crater mouth.
///
/// UVs are radial so the lava texture swirls around the disc center.
pub fn lava_mesh(sides: usize, radius: f32, height: f32) -> MeshData {
    let mut positions = Vec::with_capacity(sides);
    let mut uvs = Vec::with_capacity(sides);
    for k in 0..sides {
        let a = k as f32 / sides as f32 * TAU;
        positions.push(Vec3::new(radius * a.cos(), height, radius * a.sin()));
        uvs.push(Vec2::new(0.5 * (1.0 + a.cos()), 0.5 * (1.0 + a.sin())));
    }
    let mut indices = Vec::with_capacity(3 * (sides - 2));
    for k in 1..sides - 1 {
        indices.extend_from_slice(&[0, (k + 1) as u32, k as u32]);
    }
    let mut mesh = MeshData {
        positions,
        uvs,
        indices,
        ..Default::default()
    };
    mesh.compute_shading_attributes();
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_water_quad_faces_up() {
        let mesh = water_mesh(512.0, 512.0, -40.0);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices.len(), 6);
        for p in &mesh.positions {
            assert_eq!(p.y, -40.0);
        }
        for n in &mesh.normals {
            assert!((*n - Vec3::Y).length() < 1e-4);
        }
    }

    #[test]
    fn test_lava_disc_topology() {
        let mesh = lava_mesh(10, 12.0, 16.0);
        assert_eq!(mesh.vertex_count(), 10);
        assert_eq!(mesh.indices.len(), 3 * 8);
        for p in &mesh.positions {
            assert_eq!(p.y, 16.0);
            assert!((Vec2::new(p.x, p.z).length() - 12.0).abs() < 1e-3);
        }
        // fan triangles wind upward like the quads
        for n in &mesh.normals {
            assert!((*n - Vec3::Y).length() < 1e-4);
        }
    }

    #[test]
    fn test_lava_uvs_in_unit_square() {
        let mesh = lava_mesh(10, 12.0, 16.0);
        for uv in &mesh.uvs {
            assert!((0.0..=1.0).contains(&uv.x));
            assert!((0.0..=1.0).contains(&uv.y));
        }
    }
}
