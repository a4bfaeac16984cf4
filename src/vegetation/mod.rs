//! Procedural tree placement and batched tree geometry

pub mod placement;
pub mod shapes;

pub use placement::{ExclusionRect, PlacementSet, PlacementSite, place_sites, split_kinds};
pub use shapes::{ForestMeshes, TreeInstance, TreeKind, TreeParams, build_forest};

use rand::Rng;

use crate::core::types::Vec3;

/// Sample tree sites over the terrain vertices and build the batched
/// forest meshes in one go.
pub fn plant_forest<R: Rng>(
    rng: &mut R,
    terrain_vertices: &[Vec3],
    requested_count: usize,
    water_level: f32,
    exclusion: &ExclusionRect,
    params: &TreeParams,
) -> (PlacementSet, ForestMeshes) {
    let sites = place_sites(rng, terrain_vertices, requested_count, water_level, exclusion);
    let placed = sites.len();
    let set = split_kinds(rng, sites);
    log::info!(
        "vegetation: {} sites placed ({} requested), {} pine / {} oak",
        placed,
        requested_count,
        set.pine.len(),
        set.oak.len(),
    );
    let meshes = build_forest(rng, &set, params);
    (set, meshes)
}
