//! Batched tree geometry: tapered trunk cylinders, stacked pine cones,
//! and oak crown spheres, concatenated into one mesh per group.

use std::f32::consts::TAU;

use rand::Rng;

use crate::core::types::{Vec2, Vec3};
use crate::terrain::MeshData;
use crate::vegetation::placement::{PlacementSet, PlacementSite};

/// Which silhouette a tree instance uses
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeKind {
    Pine,
    Oak,
}

/// Shared shape constants for all generated trees
#[derive(Clone, Copy, Debug)]
pub struct TreeParams {
    pub trunk_height: f32,
    pub trunk_divisions: usize,
    pub pine_trunk_radius: f32,
    pub oak_trunk_radius: f32,
    /// Top-ring radius as a fraction of the base radius
    pub trunk_taper: f32,
    pub crown_radius: f32,
    pub crown_height: f32,
    pub crown_divisions: usize,
    pub sphere_stacks: usize,
    pub sphere_sectors: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            trunk_height: 5.0,
            trunk_divisions: 10,
            pine_trunk_radius: 0.4,
            oak_trunk_radius: 0.6,
            trunk_taper: 0.8,
            crown_radius: 2.5,
            crown_height: 5.0,
            crown_divisions: 10,
            sphere_stacks: 10,
            sphere_sectors: 10,
        }
    }
}

/// Per-instance shape randomization, sampled once so trunk and crown agree
#[derive(Clone, Copy, Debug)]
pub struct TreeInstance {
    pub position: Vec3,
    pub kind: TreeKind,
    /// Uniform scale on the whole trunk, in `[0.75, 1.25]`
    pub trunk_scale: f32,
    /// Pine cone layers; always 1 for oak
    pub layer_count: usize,
    pub width_jitter: f32,
    pub height_jitter: f32,
    pub depth_jitter: f32,
    /// Vertical spacing between pine layers; unused for oak
    pub layer_height: f32,
}

impl TreeInstance {
    fn sample_pine<R: Rng>(rng: &mut R, site: &PlacementSite) -> Self {
        Self {
            position: site.position,
            kind: TreeKind::Pine,
            trunk_scale: rng.gen_range(0.75..=1.25),
            layer_count: rng.gen_range(3..=6),
            width_jitter: rng.gen_range(0.7..=1.3),
            height_jitter: rng.gen_range(0.5..=1.5),
            depth_jitter: rng.gen_range(0.7..=1.3),
            layer_height: rng.gen_range(1.5..=2.2),
        }
    }

    fn sample_oak<R: Rng>(rng: &mut R, site: &PlacementSite) -> Self {
        Self {
            position: site.position,
            kind: TreeKind::Oak,
            trunk_scale: rng.gen_range(0.75..=1.25),
            layer_count: 1,
            width_jitter: rng.gen_range(0.8..=1.4),
            height_jitter: rng.gen_range(0.8..=1.6),
            depth_jitter: rng.gen_range(0.8..=1.4),
            layer_height: 0.0,
        }
    }

    /// World-space trunk height after the instance scale
    pub fn trunk_height(&self, params: &TreeParams) -> f32 {
        params.trunk_height * self.trunk_scale
    }
}

/// One batched mesh per tree group; a group with no sites yields empty meshes
#[derive(Clone, Debug, Default)]
pub struct ForestMeshes {
    pub pine_trunks: MeshData,
    pub pine_crowns: MeshData,
    pub oak_trunks: MeshData,
    pub oak_crowns: MeshData,
    pub instances: Vec<TreeInstance>,
}

/// Build batched trunk and crown meshes for every placed site.
///
/// Each instance's geometry is appended with its indices shifted by the
/// cumulative vertex count, then normals and tangents are accumulated over
/// the concatenated buffers so lighting is seamless across the batch.
pub fn build_forest<R: Rng>(rng: &mut R, set: &PlacementSet, params: &TreeParams) -> ForestMeshes {
    let trunk_pine = trunk_mesh(params, params.pine_trunk_radius);
    let trunk_oak = trunk_mesh(params, params.oak_trunk_radius);
    let cone = cone_mesh(params.crown_divisions, params.crown_height, params.crown_radius);
    let sphere = sphere_mesh(params.sphere_stacks, params.sphere_sectors, params.crown_radius);

    let mut out = ForestMeshes::default();

    for site in &set.pine {
        let inst = TreeInstance::sample_pine(rng, site);
        append_trunk(&mut out.pine_trunks, &trunk_pine, &inst);
        append_pine_crown(&mut out.pine_crowns, &cone, &inst, params);
        out.instances.push(inst);
    }
    for site in &set.oak {
        let inst = TreeInstance::sample_oak(rng, site);
        append_trunk(&mut out.oak_trunks, &trunk_oak, &inst);
        append_oak_crown(&mut out.oak_crowns, &sphere, &inst, params);
        out.instances.push(inst);
    }

    for mesh in [
        &mut out.pine_trunks,
        &mut out.pine_crowns,
        &mut out.oak_trunks,
        &mut out.oak_crowns,
    ] {
        mesh.compute_shading_attributes();
    }
    out
}

fn append_instance(batch: &mut MeshData, base: &MeshData, transform: impl Fn(Vec3) -> Vec3) {
    let offset = batch.vertex_count() as u32;
    batch
        .positions
        .extend(base.positions.iter().map(|&p| transform(p)));
    batch.uvs.extend_from_slice(&base.uvs);
    batch.indices.extend(base.indices.iter().map(|&i| i + offset));
}

fn append_trunk(batch: &mut MeshData, base: &MeshData, inst: &TreeInstance) {
    let scale = inst.trunk_scale;
    let pos = inst.position;
    append_instance(batch, base, |p| p * scale + pos);
}

fn append_pine_crown(batch: &mut MeshData, cone: &MeshData, inst: &TreeInstance, params: &TreeParams) {
    let jitter = Vec3::new(inst.width_jitter, inst.height_jitter, inst.depth_jitter);
    let trunk_top = inst.trunk_height(params);
    for layer in 0..inst.layer_count {
        let shrink = 0.9f32.powi(layer as i32 + 1);
        let lift = layer as f32 * inst.layer_height * inst.height_jitter + trunk_top;
        let pos = inst.position + Vec3::new(0.0, lift, 0.0);
        append_instance(batch, cone, |p| p * jitter * shrink + pos);
    }
}

fn append_oak_crown(batch: &mut MeshData, sphere: &MeshData, inst: &TreeInstance, params: &TreeParams) {
    let jitter = Vec3::new(inst.width_jitter, inst.height_jitter, inst.depth_jitter);
    let pos = inst.position + Vec3::new(0.0, inst.trunk_height(params) * 0.9, 0.0);
    append_instance(batch, sphere, |p| p * jitter + pos);
}

/// Capped cylinder with a tapered top ring, plus a duplicated seam column
/// so the side texture wraps without a UV discontinuity.
fn trunk_mesh(params: &TreeParams, radius: f32) -> MeshData {
    let d = params.trunk_divisions;
    let h = params.trunk_height;
    let top_r = radius * params.trunk_taper;

    // apex, top ring, base center, base ring, then the two seam vertices
    let mut positions = Vec::with_capacity(2 * d + 4);
    let mut uvs = Vec::with_capacity(2 * d + 4);

    positions.push(Vec3::new(0.0, h, 0.0));
    uvs.push(Vec2::new(1.0, 1.0));
    for k in 0..d {
        let a = k as f32 / d as f32 * TAU;
        positions.push(Vec3::new(top_r * a.cos(), h, top_r * a.sin()));
        uvs.push(Vec2::new(k as f32 / d as f32, 0.0));
    }
    positions.push(Vec3::ZERO);
    uvs.push(Vec2::new(0.0, 0.0));
    for k in 0..d {
        let a = k as f32 / d as f32 * TAU;
        positions.push(Vec3::new(radius * a.cos(), 0.0, radius * a.sin()));
        uvs.push(Vec2::new(k as f32 / d as f32, 1.0));
    }
    let seam_top = (2 * d + 2) as u32;
    let seam_bot = (2 * d + 3) as u32;
    positions.push(Vec3::new(top_r, h, 0.0));
    uvs.push(Vec2::new(1.0, 0.0));
    positions.push(Vec3::new(radius, 0.0, 0.0));
    uvs.push(Vec2::new(1.0, 1.0));

    let mut indices = Vec::new();
    let top = |k: usize| (1 + k) as u32;
    let bot = |k: usize| (d + 2 + k) as u32;
    // top cap fan
    for k in 0..d - 1 {
        indices.extend_from_slice(&[0, top(k + 1), top(k)]);
    }
    indices.extend_from_slice(&[0, seam_top, top(d - 1)]);
    // base cap fan
    for k in 0..d - 1 {
        indices.extend_from_slice(&[(d + 1) as u32, bot(k), bot(k + 1)]);
    }
    indices.extend_from_slice(&[(d + 1) as u32, bot(d - 1), seam_bot]);
    // side quads
    for k in 0..d - 1 {
        indices.extend_from_slice(&[top(k), top(k + 1), bot(k)]);
        indices.extend_from_slice(&[top(k + 1), bot(k + 1), bot(k)]);
    }
    indices.extend_from_slice(&[top(d - 1), seam_top, bot(d - 1)]);
    indices.extend_from_slice(&[seam_top, seam_bot, bot(d - 1)]);

    MeshData {
        positions,
        uvs,
        indices,
        ..Default::default()
    }
}

/// Closed cone sitting on the XZ plane with its apex on +Y
fn cone_mesh(divisions: usize, height: f32, radius: f32) -> MeshData {
    let mut positions = Vec::with_capacity(divisions + 2);
    let mut uvs = Vec::with_capacity(divisions + 2);

    positions.push(Vec3::new(0.0, height, 0.0));
    uvs.push(Vec2::new(0.0, 0.0));
    positions.push(Vec3::ZERO);
    uvs.push(Vec2::new(1.0, 1.0));
    for k in 0..divisions {
        let a = k as f32 / divisions as f32 * TAU;
        positions.push(Vec3::new(radius * a.cos(), 0.0, radius * a.sin()));
        uvs.push(Vec2::new(k as f32 / divisions as f32, 1.0));
    }

    let ring = |k: usize| (2 + k % divisions) as u32;
    let mut indices = Vec::with_capacity(6 * divisions);
    for k in 0..divisions {
        indices.extend_from_slice(&[0, ring(k + 1), ring(k)]);
        indices.extend_from_slice(&[1, ring(k), ring(k + 1)]);
    }

    MeshData {
        positions,
        uvs,
        indices,
        ..Default::default()
    }
}

/// UV sphere resting on the XZ plane (center lifted by the radius)
fn sphere_mesh(stacks: usize, sectors: usize, radius: f32) -> MeshData {
    let mut positions = Vec::with_capacity((stacks + 1) * (sectors + 1));
    let mut uvs = Vec::with_capacity((stacks + 1) * (sectors + 1));

    for i in 0..=stacks {
        let stack_angle = std::f32::consts::FRAC_PI_2 - i as f32 / stacks as f32 * std::f32::consts::PI;
        let ring_radius = radius * stack_angle.cos();
        let y = radius * stack_angle.sin() + radius;
        for j in 0..=sectors {
            let sector_angle = j as f32 / sectors as f32 * TAU;
            positions.push(Vec3::new(
                ring_radius * sector_angle.cos(),
                y,
                ring_radius * sector_angle.sin(),
            ));
            uvs.push(Vec2::new(
                j as f32 / sectors as f32,
                i as f32 / stacks as f32,
            ));
        }
    }

    let mut indices = Vec::new();
    for i in 0..stacks {
        let mut k1 = (i * (sectors + 1)) as u32;
        let mut k2 = k1 + sectors as u32 + 1;
        for _ in 0..sectors {
            if i != 0 {
                indices.extend_from_slice(&[k1, k1 + 1, k2]);
            }
            if i != stacks - 1 {
                indices.extend_from_slice(&[k1 + 1, k2 + 1, k2]);
            }
            k1 += 1;
            k2 += 1;
        }
    }

    MeshData {
        positions,
        uvs,
        indices,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vegetation::placement::PlacementSite;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn sites(n: usize) -> Vec<PlacementSite> {
        (0..n)
            .map(|i| PlacementSite {
                vertex_index: i,
                position: Vec3::new(i as f32 * 10.0, 5.0, 0.0),
            })
            .collect()
    }

    fn assert_valid(mesh: &MeshData) {
        assert_eq!(mesh.positions.len(), mesh.uvs.len());
        assert_eq!(mesh.positions.len(), mesh.normals.len());
        assert_eq!(mesh.indices.len() % 3, 0);
        for &i in &mesh.indices {
            assert!((i as usize) < mesh.vertex_count());
        }
    }

    #[test]
    fn test_trunk_primitive_shape() {
        let params = TreeParams::default();
        let mesh = trunk_mesh(&params, 0.4);
        let d = params.trunk_divisions;
        assert_eq!(mesh.vertex_count(), 2 * d + 4);
        // caps: d fans each; sides: 2d triangles
        assert_eq!(mesh.indices.len(), 3 * 4 * d);
        // tapered: top ring narrower than base ring
        assert!(mesh.positions[1].x < mesh.positions[d + 2].x);
    }

    #[test]
    fn test_cone_and_sphere_indices_in_bounds() {
        let cone = cone_mesh(10, 5.0, 2.5);
        let sphere = sphere_mesh(10, 10, 2.5);
        for mesh in [&cone, &sphere] {
            for &i in &mesh.indices {
                assert!((i as usize) < mesh.vertex_count());
            }
        }
        // sphere rests on the ground plane
        let min_y = sphere
            .positions
            .iter()
            .map(|p| p.y)
            .fold(f32::INFINITY, f32::min);
        assert!(min_y.abs() < 1e-4);
    }

    #[test]
    fn test_batch_offsets_applied() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let set = PlacementSet {
            pine: sites(3),
            oak: Vec::new(),
        };
        let forest = build_forest(&mut rng, &set, &TreeParams::default());
        let single = trunk_mesh(&TreeParams::default(), 0.4);
        assert_eq!(forest.pine_trunks.vertex_count(), 3 * single.vertex_count());
        assert_eq!(forest.pine_trunks.indices.len(), 3 * single.indices.len());
        assert_valid(&forest.pine_trunks);
        assert_valid(&forest.pine_crowns);
        assert!(forest.oak_trunks.positions.is_empty());
    }

    #[test]
    fn test_pine_layer_counts_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let set = PlacementSet {
            pine: sites(20),
            oak: sites(20),
        };
        let forest = build_forest(&mut rng, &set, &TreeParams::default());
        let cone_verts = cone_mesh(10, 5.0, 2.5).vertex_count();
        let mut total_layers = 0;
        for inst in forest.instances.iter().filter(|i| i.kind == TreeKind::Pine) {
            assert!((3..=6).contains(&inst.layer_count));
            assert!((0.75..=1.25).contains(&inst.trunk_scale));
            total_layers += inst.layer_count;
        }
        assert_eq!(forest.pine_crowns.vertex_count(), total_layers * cone_verts);
    }

    #[test]
    fn test_crowns_sit_above_sites() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let set = PlacementSet {
            pine: Vec::new(),
            oak: sites(4),
        };
        let forest = build_forest(&mut rng, &set, &TreeParams::default());
        let min_y = forest
            .oak_crowns
            .positions
            .iter()
            .map(|p| p.y)
            .fold(f32::INFINITY, f32::min);
        // lowest crown vertex is at 0.9 * trunk height of the shortest oak
        assert!(min_y > 5.0 * 0.9 * 0.75 + 5.0 - 1e-3);
    }

    #[test]
    fn test_batched_normals_are_unit() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let set = PlacementSet {
            pine: sites(2),
            oak: sites(2),
        };
        let forest = build_forest(&mut rng, &set, &TreeParams::default());
        for n in &forest.pine_trunks.normals {
            assert!((n.length() - 1.0).abs() < 1e-3);
        }
    }
}
