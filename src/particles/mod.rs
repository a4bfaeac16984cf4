//! Eruption particle emitter with a fixed-capacity pool

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::core::types::{Vec2, Vec3, Vec4};

/// Gravity is halved so embers hang in the air longer than a ballistic arc
const GRAVITY: f32 = 9.81 * 0.5;
/// Alpha fade rate per second
const FADE_RATE: f32 = 2.5;
/// Particles spawned per emission burst
const BURST_SIZE: usize = 100;
/// Pool capacity; the renderer sizes its particle buffers from this
pub const MAX_PARTICLES: usize = 1000;

/// One ember. Dead particles keep their slot with `life < 0`.
#[derive(Clone, Copy, Debug)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub color: Vec4,
    pub life: f32,
}

/// CPU-built camera-facing quad batch, rebuilt every update
#[derive(Clone, Debug, Default)]
pub struct ParticleBatch {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec4>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

/// Pool-based emitter for the eruption plume.
///
/// The pool grows up to `max_count` live slots; past capacity, new spawns
/// reuse dead slots found by a circular scan, falling back to overwriting
/// slot 0 when everything is still alive.
pub struct ParticleEmitter {
    particles: Vec<Particle>,
    max_count: usize,
    last_used: usize,
    active: bool,
    rng: ChaCha8Rng,
    pub scale: f32,
    pub base_color: Vec4,
    pub base_life: f32,
    pub origin: Vec3,
    pub base_velocity: Vec3,
}

impl ParticleEmitter {
    pub fn new(rng: ChaCha8Rng) -> Self {
        Self {
            particles: Vec::new(),
            max_count: MAX_PARTICLES,
            last_used: 0,
            active: false,
            rng,
            scale: 0.25,
            base_color: Vec4::new(0.7, 0.2, 0.0, 1.0),
            base_life: 2.0,
            origin: Vec3::new(0.0, 23.0, 0.0),
            base_velocity: Vec3::new(0.0, 10.0, 0.0),
        }
    }

    /// Whether any particle was alive after the last update
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn live_count(&self) -> usize {
        self.particles.iter().filter(|p| p.life > 0.0).count()
    }

    /// Advance the simulation by `dt` seconds and rebuild the quad batch.
    ///
    /// When `should_spawn` is set, one burst is emitted before integration.
    /// The returned batch holds one quad per live particle, oriented toward
    /// `viewer_position`.
    pub fn update(&mut self, dt: f32, viewer_position: Vec3, should_spawn: bool) -> ParticleBatch {
        if should_spawn {
            self.spawn_burst();
        }

        self.active = false;
        for p in &mut self.particles {
            p.life -= dt;
            if p.life > 0.0 {
                p.velocity.y -= GRAVITY * dt;
                p.position += p.velocity * dt;
                p.color.w -= dt * FADE_RATE;
                self.active = true;
            } else {
                p.life = -1.0;
            }
        }

        self.build_batch(viewer_position)
    }

    fn spawn_burst(&mut self) {
        for _ in 0..BURST_SIZE {
            let particle = self.make_particle();
            if self.particles.len() < self.max_count {
                self.particles.push(particle);
                self.last_used = self.particles.len() - 1;
            } else {
                let slot = self.find_dead_slot();
                self.particles[slot] = particle;
                self.last_used = slot;
            }
        }
    }

    /// Spawn spread across the crater mouth, all rising at the base speed
    fn make_particle(&mut self) -> Particle {
        let jitter = Vec3::new(
            self.rng.gen_range(-65.0..20.0),
            self.rng.gen_range(0..=5) as f32,
            self.rng.gen_range(-60.0..20.0),
        );
        Particle {
            position: self.origin + jitter,
            velocity: self.base_velocity,
            color: self.base_color,
            life: self.base_life + self.rng.gen_range(-2.0..2.0),
        }
    }

    /// Scan from just past the last reused slot, wrapping once; if the pool
    /// is saturated with live particles, overwrite slot 0.
    fn find_dead_slot(&self) -> usize {
        let n = self.particles.len();
        for i in self.last_used..n {
            if self.particles[i].life < 0.0 {
                return i;
            }
        }
        for i in 0..self.last_used {
            if self.particles[i].life < 0.0 {
                return i;
            }
        }
        0
    }

    fn build_batch(&self, viewer_position: Vec3) -> ParticleBatch {
        let mut batch = ParticleBatch::default();
        for p in self.particles.iter().filter(|p| p.life > 0.0) {
            let base = batch.positions.len() as u32;
            let s = self.scale;
            let to_viewer = (viewer_position - p.position).normalize_or_zero();
            let right = Vec3::Y.cross(to_viewer).normalize_or_zero();
            // viewer directly above: any horizontal right works
            let right = if right == Vec3::ZERO { Vec3::X } else { right };
            let up = to_viewer.cross(right);
            for (dx, dy, u, v) in [
                (-s, -s, 0.0, 1.0),
                (s, -s, 1.0, 1.0),
                (s, s, 1.0, 0.0),
                (-s, s, 0.0, 0.0),
            ] {
                batch.positions.push(p.position + right * dx + up * dy);
                batch.colors.push(p.color);
                batch.uvs.push(Vec2::new(u, v));
            }
            batch
                .indices
                .extend_from_slice(&[base + 1, base, base + 3, base + 1, base + 3, base + 2]);
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn emitter(seed: u64) -> ParticleEmitter {
        ParticleEmitter::new(ChaCha8Rng::seed_from_u64(seed))
    }

    #[test]
    fn test_inactive_until_spawn() {
        let mut e = emitter(1);
        let batch = e.update(0.016, Vec3::ZERO, false);
        assert!(!e.is_active());
        assert!(batch.indices.is_empty());
    }

    #[test]
    fn test_burst_spawns_and_integrates() {
        let mut e = emitter(2);
        e.update(0.016, Vec3::ZERO, true);
        assert!(e.is_active());
        let live = e.live_count();
        assert!(live > 0 && live <= 100);
        // particles rise initially
        let batch = e.update(0.1, Vec3::ZERO, false);
        assert_eq!(batch.positions.len() % 4, 0);
        assert_eq!(batch.indices.len(), batch.positions.len() / 4 * 6);
    }

    #[test]
    fn test_pool_capped_at_max() {
        let mut e = emitter(3);
        // long-lived particles so the pool saturates
        e.base_life = 1000.0;
        for _ in 0..20 {
            e.update(0.001, Vec3::ZERO, true);
        }
        assert!(e.live_count() <= MAX_PARTICLES);
        assert!(e.particles.len() <= MAX_PARTICLES);
    }

    #[test]
    fn test_burst_spreads_over_vent_rising_uniformly() {
        let mut e = emitter(11);
        e.update(0.0, Vec3::ZERO, true);
        let mut off_origin = 0;
        for p in e.particles.iter().filter(|p| p.life > 0.0) {
            let offset = p.position - e.origin;
            assert!((-65.0..20.0).contains(&offset.x));
            assert!((0.0..=5.0).contains(&offset.y));
            assert!((-60.0..20.0).contains(&offset.z));
            if offset != Vec3::ZERO {
                off_origin += 1;
            }
            // spread lives in the spawn position; everything rises together
            assert_eq!(p.velocity, e.base_velocity);
        }
        assert!(off_origin > 0);
    }

    #[test]
    fn test_dead_slots_are_reused_at_capacity() {
        let mut e = emitter(4);
        e.max_count = 100;
        e.update(0.0, Vec3::ZERO, true);
        // age everything out
        e.update(100.0, Vec3::ZERO, false);
        assert!(!e.is_active());
        let pool_size = e.particles.len();
        e.update(0.0, Vec3::ZERO, true);
        // at capacity, respawns overwrite dead slots instead of growing
        assert_eq!(e.particles.len(), pool_size);
        assert!(e.is_active());
    }

    #[test]
    fn test_life_decreases_by_exactly_dt() {
        let mut e = emitter(9);
        e.base_life = 50.0;
        e.update(0.0, Vec3::ZERO, true);
        let lives: Vec<f32> = e.particles.iter().map(|p| p.life).collect();
        e.update(0.25, Vec3::ZERO, false);
        e.update(0.5, Vec3::ZERO, false);
        for (p, &before) in e.particles.iter().zip(&lives) {
            assert!((p.life - (before - 0.75)).abs() < 1e-5);
        }
    }

    #[test]
    fn test_alpha_fades_and_particle_expires() {
        let mut e = emitter(5);
        e.base_life = 0.5;
        e.update(0.0, Vec3::ZERO, true);
        e.update(0.3, Vec3::ZERO, false);
        for p in e.particles.iter().filter(|p| p.life > 0.0) {
            assert!(p.color.w < 1.0);
        }
        e.update(3.0, Vec3::ZERO, false);
        assert!(!e.is_active());
        for p in &e.particles {
            assert_eq!(p.life, -1.0);
        }
    }
}
