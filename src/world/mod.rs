//! Static world catalog
//!
//! The immutable terrain description built once at process start: boundary
//! walls, buildings, ground, lighting, and randomized obstacles. Served as
//! JSON over HTTP and embedded in the join handshake. Field spelling
//! matches the client contract.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::ws::protocol::Vec3;

/// Obstacle candidates rolled at generation time; candidates overlapping a
/// building clearance zone are discarded, not re-rolled
const OBSTACLE_CANDIDATES: usize = 30;

/// Planar keep-out radius around each building: (x, z, radius)
const BUILDING_CLEARANCES: [(f32, f32, f32); 2] = [(-20.0, -15.0, 15.0), (15.0, 20.0, 10.0)];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub position: Vec3,
    pub size: Vec3,
    pub color: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub position: Vec3,
    pub size: Vec3,
    pub color: u32,
    pub texture: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ground {
    pub size: f32,
    pub texture: String,
    #[serde(rename = "textureRepeat")]
    pub texture_repeat: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbientLight {
    pub color: u32,
    pub intensity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunLight {
    pub color: u32,
    pub intensity: f32,
    pub position: Vec3,
    #[serde(rename = "shadowSize")]
    pub shadow_size: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lighting {
    pub ambient: AmbientLight,
    pub sun: SunLight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub position: Vec3,
    pub size: Vec3,
    pub color: u32,
}

/// The immutable terrain description shared read-only for the process
/// lifetime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub boundary_walls: Vec<Wall>,
    pub buildings: Vec<Building>,
    pub ground: Ground,
    pub lights: Lighting,
    pub obstacles: Vec<Obstacle>,
}

impl WorldSnapshot {
    /// Build the world. Deterministic aside from obstacle placement, which
    /// follows the given seed (entropy-seeded when `None`).
    pub fn generate(seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Self {
            boundary_walls: vec![
                Wall {
                    position: Vec3::new(0.0, 5.0, -50.0),
                    size: Vec3::new(100.0, 10.0, 2.0),
                    color: 0x555555,
                },
                Wall {
                    position: Vec3::new(0.0, 5.0, 50.0),
                    size: Vec3::new(100.0, 10.0, 2.0),
                    color: 0x555555,
                },
                Wall {
                    position: Vec3::new(-50.0, 5.0, 0.0),
                    size: Vec3::new(2.0, 10.0, 100.0),
                    color: 0x555555,
                },
                Wall {
                    position: Vec3::new(50.0, 5.0, 0.0),
                    size: Vec3::new(2.0, 10.0, 100.0),
                    color: 0x555555,
                },
            ],
            buildings: vec![
                Building {
                    position: Vec3::new(-20.0, 0.0, -15.0),
                    size: Vec3::new(10.0, 8.0, 12.0),
                    color: 0x888888,
                    texture: "concrete.jpg".to_string(),
                },
                Building {
                    position: Vec3::new(15.0, 0.0, 20.0),
                    size: Vec3::new(8.0, 5.0, 8.0),
                    color: 0x999999,
                    texture: "concrete.jpg".to_string(),
                },
            ],
            ground: Ground {
                size: 500.0,
                texture: "ground.jpg".to_string(),
                texture_repeat: 100,
            },
            lights: Lighting {
                ambient: AmbientLight {
                    color: 0xffffff,
                    intensity: 0.6,
                },
                sun: SunLight {
                    color: 0xffffff,
                    intensity: 0.8,
                    position: Vec3::new(50.0, 100.0, 50.0),
                    shadow_size: 100.0,
                },
            },
            obstacles: Self::generate_obstacles(&mut rng),
        }
    }

    fn generate_obstacles(rng: &mut impl Rng) -> Vec<Obstacle> {
        let mut obstacles = Vec::with_capacity(OBSTACLE_CANDIDATES);

        for _ in 0..OBSTACLE_CANDIDATES {
            let footprint = 1.0 + rng.gen::<f32>() * 2.0;
            let height = 1.0 + rng.gen::<f32>() * 3.0;

            let position = Vec3::new(
                (rng.gen::<f32>() - 0.5) * 80.0,
                height / 2.0,
                (rng.gen::<f32>() - 0.5) * 80.0,
            );

            let blocked = BUILDING_CLEARANCES.iter().any(|&(x, z, radius)| {
                let dx = position.x - x;
                let dz = position.z - z;
                (dx * dx + dz * dz).sqrt() < radius
            });

            if !blocked {
                obstacles.push(Obstacle {
                    position,
                    size: Vec3::new(footprint, height, footprint),
                    color: 0x808080,
                });
            }
        }

        obstacles
    }
}
