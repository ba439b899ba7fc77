//! Spawn selection over the fixed respawn point set

use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::ws::protocol::Vec3;

/// Minimum planar (x/z) distance between a candidate spawn and any other
/// occupied player position
pub const MIN_SPAWN_CLEARANCE: f32 = 5.0;

/// Draws attempted before giving up on clearance
const MAX_SAFE_SPAWN_ATTEMPTS: usize = 10;

/// The fixed respawn point catalog of the deployment
pub fn default_respawn_points() -> Vec<Vec3> {
    vec![
        Vec3::new(-40.0, 5.0, -40.0),
        Vec3::new(40.0, 5.0, -40.0),
        Vec3::new(-40.0, 5.0, 40.0),
        Vec3::new(40.0, 5.0, 40.0),
        Vec3::new(0.0, 5.0, 0.0),
        Vec3::new(20.0, 5.0, -20.0),
        Vec3::new(-20.0, 5.0, 20.0),
        Vec3::new(-20.0, 5.0, -20.0),
        Vec3::new(20.0, 5.0, 20.0),
    ]
}

/// Picks spawn coordinates from the fixed point set, biased toward points
/// clear of currently occupied positions. Never fails and never blocks.
pub struct SpawnSelector {
    points: Vec<Vec3>,
    rng: Mutex<ChaCha8Rng>,
}

impl SpawnSelector {
    pub fn new() -> Self {
        Self::with_points(default_respawn_points())
    }

    pub fn with_points(points: Vec<Vec3>) -> Self {
        debug_assert!(!points.is_empty());
        Self {
            points,
            rng: Mutex::new(ChaCha8Rng::from_entropy()),
        }
    }

    /// Deterministic selector for reproducible tests
    pub fn seeded(points: Vec<Vec3>, seed: u64) -> Self {
        debug_assert!(!points.is_empty());
        Self {
            points,
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Uniform-random choice, no clearance check (used at join)
    pub fn pick_initial_spawn(&self) -> Vec3 {
        let mut rng = self.rng.lock();
        self.points[rng.gen_range(0..self.points.len())]
    }

    /// Up to 10 random draws, accepting the first with planar clearance from
    /// every occupied position; falls back to one unconstrained draw
    pub fn pick_safe_spawn(&self, occupied: &[Vec3]) -> Vec3 {
        let mut rng = self.rng.lock();

        for _ in 0..MAX_SAFE_SPAWN_ATTEMPTS {
            let candidate = self.points[rng.gen_range(0..self.points.len())];
            let clear = occupied
                .iter()
                .all(|pos| candidate.planar_distance(pos) > MIN_SPAWN_CLEARANCE);
            if clear {
                return candidate;
            }
        }

        // Best effort: no compliant point found in time
        self.points[rng.gen_range(0..self.points.len())]
    }
}

impl Default for SpawnSelector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_spawn_comes_from_the_fixed_set() {
        let selector = SpawnSelector::seeded(default_respawn_points(), 1);
        for _ in 0..50 {
            let spawn = selector.pick_initial_spawn();
            assert!(selector.points().contains(&spawn));
        }
    }

    #[test]
    fn safe_spawn_respects_clearance_when_a_clear_point_exists() {
        let near = Vec3::new(0.0, 5.0, 0.0);
        let far = Vec3::new(100.0, 5.0, 100.0);
        let selector = SpawnSelector::seeded(vec![near, far], 7);

        // One player camped 1.5 planar units from the near point
        let occupied = vec![Vec3::new(1.0, 0.0, 1.0)];

        for _ in 0..50 {
            assert_eq!(selector.pick_safe_spawn(&occupied), far);
        }
    }

    #[test]
    fn safe_spawn_falls_back_when_every_point_is_crowded() {
        let points = default_respawn_points();
        // Occupy every respawn point exactly
        let occupied = points.clone();
        let selector = SpawnSelector::seeded(points, 11);

        for _ in 0..20 {
            let spawn = selector.pick_safe_spawn(&occupied);
            assert!(selector.points().contains(&spawn));
        }
    }

    #[test]
    fn safe_spawn_with_no_occupants_accepts_any_point() {
        let selector = SpawnSelector::seeded(default_respawn_points(), 3);
        let spawn = selector.pick_safe_spawn(&[]);
        assert!(selector.points().contains(&spawn));
    }

    #[test]
    fn clearance_is_planar_so_vertical_separation_does_not_help() {
        let near = Vec3::new(0.0, 5.0, 0.0);
        let far = Vec3::new(100.0, 5.0, 100.0);
        let selector = SpawnSelector::seeded(vec![near, far], 5);

        // Occupant 300 units overhead but only 4 planar units away still
        // blocks the near point
        let occupied = vec![Vec3::new(4.0, 300.0, 0.0)];
        for _ in 0..50 {
            assert_eq!(selector.pick_safe_spawn(&occupied), far);
        }
    }
}
