//! Bounded-retry site sampling over terrain vertices

use std::collections::HashSet;

use rand::Rng;

use crate::core::types::Vec3;

/// Consecutive rejected draws allowed before sampling gives up
pub const RETRY_BUDGET: u32 = 100;

/// Axis-aligned keep-out rectangle around the origin, in world units.
///
/// Sites are rejected only when they fall inside BOTH half-extents, so the
/// excluded region is the rectangle itself, not a cross.
#[derive(Clone, Copy, Debug)]
pub struct ExclusionRect {
    pub half_width: f32,
    pub half_depth: f32,
}

impl ExclusionRect {
    pub fn contains(&self, p: Vec3) -> bool {
        p.x.abs() < self.half_width && p.z.abs() < self.half_depth
    }
}

/// A terrain vertex selected to host a tree
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementSite {
    /// Index into the terrain vertex buffer the site was drawn from
    pub vertex_index: usize,
    pub position: Vec3,
}

/// Placement sites partitioned by tree kind
#[derive(Clone, Debug, Default)]
pub struct PlacementSet {
    pub pine: Vec<PlacementSite>,
    pub oak: Vec<PlacementSite>,
}

impl PlacementSet {
    pub fn len(&self) -> usize {
        self.pine.len() + self.oak.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pine.is_empty() && self.oak.is_empty()
    }
}

/// Draw up to `requested` distinct terrain vertices suitable for a tree.
///
/// A draw is accepted when the vertex sits above `water_level`, outside the
/// exclusion rectangle, and has not been chosen before. Each rejection burns
/// one unit of the retry budget; an acceptance refills it. Sampling stops
/// when the budget runs out, so sparse terrain yields fewer sites rather
/// than looping forever.
pub fn place_sites<R: Rng>(
    rng: &mut R,
    terrain_vertices: &[Vec3],
    requested: usize,
    water_level: f32,
    exclusion: &ExclusionRect,
) -> Vec<PlacementSite> {
    if terrain_vertices.is_empty() || requested == 0 {
        return Vec::new();
    }

    let mut sites = Vec::with_capacity(requested);
    let mut used = HashSet::new();
    let mut budget = RETRY_BUDGET;

    while sites.len() < requested && budget > 0 {
        let vertex_index = rng.gen_range(0..terrain_vertices.len());
        let position = terrain_vertices[vertex_index];

        let valid = position.y > water_level
            && !exclusion.contains(position)
            && !used.contains(&vertex_index);
        if valid {
            used.insert(vertex_index);
            sites.push(PlacementSite {
                vertex_index,
                position,
            });
            budget = RETRY_BUDGET;
        } else {
            budget -= 1;
        }
    }

    if sites.len() < requested {
        log::warn!(
            "placement budget exhausted: {} of {} sites placed",
            sites.len(),
            requested,
        );
    }
    sites
}

/// Partition sites into pine and oak groups.
///
/// The split point is one uniform draw in `[1, len - 1]`, so with two or
/// more sites both groups are non-empty. Fewer than two sites yields an
/// empty set.
pub fn split_kinds<R: Rng>(rng: &mut R, mut sites: Vec<PlacementSite>) -> PlacementSet {
    if sites.len() < 2 {
        return PlacementSet::default();
    }
    let pine_count = rng.gen_range(1..sites.len());
    let oak = sites.split_off(pine_count);
    PlacementSet { pine: sites, oak }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn grid_vertices(n: usize, y: f32) -> Vec<Vec3> {
        let mut out = Vec::new();
        let half = n as f32 / 2.0;
        for z in 0..n {
            for x in 0..n {
                out.push(Vec3::new(x as f32 - half, y, z as f32 - half));
            }
        }
        out
    }

    #[test]
    fn test_sites_respect_constraints() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut vertices = grid_vertices(64, 10.0);
        // sink a band below water
        for v in vertices.iter_mut().filter(|v| v.x < -20.0) {
            v.y = -50.0;
        }
        let exclusion = ExclusionRect {
            half_width: 8.0,
            half_depth: 6.0,
        };
        let sites = place_sites(&mut rng, &vertices, 200, -40.0, &exclusion);
        assert!(!sites.is_empty());
        let mut seen = HashSet::new();
        for site in &sites {
            assert!(site.position.y > -40.0);
            assert!(!exclusion.contains(site.position));
            assert!(seen.insert(site.vertex_index), "duplicate vertex");
        }
    }

    #[test]
    fn test_exclusion_is_rectangle_not_cross() {
        let rect = ExclusionRect {
            half_width: 50.0,
            half_depth: 40.0,
        };
        // inside one half-extent but outside the other is allowed
        assert!(!rect.contains(Vec3::new(10.0, 0.0, 100.0)));
        assert!(!rect.contains(Vec3::new(100.0, 0.0, 10.0)));
        assert!(rect.contains(Vec3::new(10.0, 0.0, 10.0)));
    }

    #[test]
    fn test_terminates_with_too_few_valid_sites() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        // only 9 vertices, all valid; asking for 500 must still terminate
        let vertices = grid_vertices(3, 5.0);
        let exclusion = ExclusionRect {
            half_width: 0.0,
            half_depth: 0.0,
        };
        let sites = place_sites(&mut rng, &vertices, 500, 0.0, &exclusion);
        assert!(sites.len() <= vertices.len());
    }

    #[test]
    fn test_all_underwater_yields_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let vertices = grid_vertices(8, -60.0);
        let exclusion = ExclusionRect {
            half_width: 1.0,
            half_depth: 1.0,
        };
        let sites = place_sites(&mut rng, &vertices, 50, -40.0, &exclusion);
        assert!(sites.is_empty());
    }

    #[test]
    fn test_split_needs_two_sites() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let one = vec![PlacementSite {
            vertex_index: 0,
            position: Vec3::ZERO,
        }];
        assert!(split_kinds(&mut rng, Vec::new()).is_empty());
        assert!(split_kinds(&mut rng, one).is_empty());
    }

    #[test]
    fn test_split_partitions_without_loss() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let sites: Vec<_> = (0..25)
            .map(|i| PlacementSite {
                vertex_index: i,
                position: Vec3::new(i as f32, 0.0, 0.0),
            })
            .collect();
        let set = split_kinds(&mut rng, sites);
        assert_eq!(set.len(), 25);
        assert!(!set.pine.is_empty());
        assert!(!set.oak.is_empty());
    }

    #[test]
    fn test_seeded_placement_is_reproducible() {
        let vertices = grid_vertices(32, 5.0);
        let exclusion = ExclusionRect {
            half_width: 4.0,
            half_depth: 4.0,
        };
        let mut rng_a = ChaCha8Rng::seed_from_u64(1234);
        let mut rng_b = ChaCha8Rng::seed_from_u64(1234);
        let a = place_sites(&mut rng_a, &vertices, 40, 0.0, &exclusion);
        let b = place_sites(&mut rng_b, &vertices, 40, 0.0, &exclusion);
        assert_eq!(a, b);
    }
}
