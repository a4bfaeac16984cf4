//! Grid triangulation of a height field

use crate::core::types::{Result, Vec2, Vec3};
use crate::core::Error;
use crate::terrain::HeightField;

/// CPU-side mesh: named attribute arrays plus a triangle index list.
///
/// All mesh producers in the crate (terrain, vegetation, environment
/// planes) emit this shape and share the same winding convention; the
/// render layer uploads it as-is.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tangents: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Fill `normals` and `tangents` from positions/uvs/indices
    pub fn compute_shading_attributes(&mut self) {
        self.normals = accumulate_normals(&self.positions, &self.indices);
        self.tangents = accumulate_tangents(&self.positions, &self.uvs, &self.indices);
    }
}

/// Triangulate a height field into a renderable grid mesh.
///
/// Vertex `x + z*width` lands at world `(x - height/2, h[x,z], z - width/2)`
/// so the grid is centered on the origin. Each interior cell becomes two
/// counter-clockwise triangles; the last row and column emit no indices.
pub fn build_terrain(field: &HeightField) -> Result<MeshData> {
    let width = field.width();
    let height = field.height();
    if width < 2 || height < 2 {
        return Err(Error::InvalidDimension { width, height });
    }

    let mut positions = Vec::with_capacity(width * height);
    let mut uvs = Vec::with_capacity(width * height);
    let center_x = height as f32 / 2.0;
    let center_z = width as f32 / 2.0;

    // texture coordinates alternate 0/1, tiling one texel pair per cell
    let mut u = 0.0;
    let mut v = 0.0;
    for z in 0..height {
        for x in 0..width {
            positions.push(Vec3::new(
                x as f32 - center_x,
                field.get(x, z),
                z as f32 - center_z,
            ));
            uvs.push(Vec2::new(u, v));
            v = if v == 0.0 { 1.0 } else { 0.0 };
        }
        u = if u == 0.0 { 1.0 } else { 0.0 };
    }

    let mut indices = Vec::with_capacity(6 * (width - 1) * (height - 1));
    for z in 0..height - 1 {
        for x in 0..width - 1 {
            let pos = (x + z * width) as u32;
            let w = width as u32;
            // top-left triangle of the cell
            indices.extend_from_slice(&[pos, pos + w, pos + w + 1]);
            // bottom-right triangle
            indices.extend_from_slice(&[pos + 1 + w, pos + 1, pos]);
        }
    }

    let mut mesh = MeshData {
        positions,
        uvs,
        indices,
        ..Default::default()
    };
    mesh.compute_shading_attributes();
    Ok(mesh)
}

/// Per-vertex normals by face-normal accumulation.
///
/// Each triangle's edge cross product is normalized and summed into its
/// three vertices, then every vertex normal is renormalized. A vertex whose
/// accumulated normal has zero length (degenerate geometry) is left at zero
/// rather than producing NaN.
pub fn accumulate_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let a = positions[tri[0] as usize];
        let b = positions[tri[1] as usize];
        let c = positions[tri[2] as usize];
        let face = (b - a).cross(c - a).normalize_or_zero();
        for &i in tri {
            normals[i as usize] += face;
        }
    }
    for n in &mut normals {
        *n = n.normalize_or_zero();
    }
    normals
}

/// Per-vertex tangents from UV-space edge gradients, accumulated and
/// renormalized the same way as normals. Triangles with degenerate UVs are
/// skipped; vertices that end up with no contribution fall back to +X.
pub fn accumulate_tangents(positions: &[Vec3], uvs: &[Vec2], indices: &[u32]) -> Vec<Vec3> {
    let mut tangents = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let e1 = positions[i1] - positions[i0];
        let e2 = positions[i2] - positions[i0];
        let duv1 = uvs[i1] - uvs[i0];
        let duv2 = uvs[i2] - uvs[i0];
        let det = duv1.x * duv2.y - duv2.x * duv1.y;
        if det.abs() < 1e-8 {
            continue;
        }
        let tangent = ((e1 * duv2.y - e2 * duv1.y) / det).normalize_or_zero();
        for &i in tri {
            tangents[i as usize] += tangent;
        }
    }
    for t in &mut tangents {
        *t = t.normalize_or_zero();
        if *t == Vec3::ZERO {
            *t = Vec3::X;
        }
    }
    tangents
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_invariant() {
        for (w, h) in [(2, 2), (4, 4), (5, 9), (17, 3)] {
            let field = HeightField::flat(w, h, 0.0);
            let mesh = build_terrain(&field).unwrap();
            assert_eq!(mesh.vertex_count(), w * h);
            assert_eq!(mesh.indices.len(), 6 * (w - 1) * (h - 1));
            for &i in &mesh.indices {
                assert!((i as usize) < w * h);
            }
        }
    }

    #[test]
    fn test_rejects_degenerate_dimensions() {
        let field = HeightField::flat(1, 8, 0.0);
        assert!(matches!(
            build_terrain(&field),
            Err(Error::InvalidDimension { width: 1, height: 8 })
        ));
    }

    #[test]
    fn test_flat_4x4_scenario() {
        // 4x4 flat grid: 9 cells, 54 indices, 16 vertices, all normals +Y
        let field = HeightField::flat(4, 4, 0.0);
        let mesh = build_terrain(&field).unwrap();
        assert_eq!(mesh.vertex_count(), 16);
        assert_eq!(mesh.indices.len(), 54);
        for n in &mesh.normals {
            assert!((*n - Vec3::Y).length() < 1e-4);
        }
    }

    #[test]
    fn test_cell_winding() {
        let field = HeightField::flat(3, 3, 0.0);
        let mesh = build_terrain(&field).unwrap();
        assert_eq!(&mesh.indices[..6], &[0, 3, 4, 4, 1, 0]);
    }

    #[test]
    fn test_grid_centered_on_origin() {
        let field = HeightField::flat(5, 5, 0.0);
        let mesh = build_terrain(&field).unwrap();
        let sum: Vec3 = mesh.positions.iter().copied().sum();
        assert!(sum.x.abs() < 1e-4);
        assert!(sum.z.abs() < 1e-4);
    }

    #[test]
    fn test_normals_unit_length_on_rough_terrain() {
        let field = HeightField::from_fbm(16, 16, 3, 4.0, 0.0, 20.0);
        let mesh = build_terrain(&field).unwrap();
        for n in &mesh.normals {
            assert!((n.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_degenerate_normal_left_untouched() {
        // two triangles with opposite winding cancel exactly
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Z];
        let indices = vec![0, 1, 2, 0, 2, 1];
        let normals = accumulate_normals(&positions, &indices);
        for n in &normals {
            assert_eq!(*n, Vec3::ZERO);
        }
    }
}
