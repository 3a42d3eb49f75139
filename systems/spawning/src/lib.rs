#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system that populates maps and places their exits.
//!
//! The system reacts to [`Event::MapEntered`] by emitting one
//! [`Command::SpawnEnemy`] per enemy drawn from the map's weight table, and to
//! [`Event::MapCleared`] by opening the portal (or, on the final map, the
//! exit). Every map gets its own random stream derived from the session seed,
//! so a session replays identically for a given seed.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use survival_core::{Bounds, Catalog, Command, Event, Rect, SpawnTable, EXIT_SIZE, PORTAL_SIZE};

const RNG_STREAM_MAP: &str = "map";
const BASE_ENEMY_COUNT: usize = 3;
const SPAWN_EDGE_MARGIN: f32 = 60.0;
const PATROL_RADII: [f32; 3] = [0.0, 40.0, 80.0];
const REGION_MIN_MARGIN: f32 = 80.0;
const REGION_MAX_MARGIN: f32 = 120.0;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    bounds: Bounds,
    session_seed: u64,
}

impl Config {
    /// Creates a new configuration for the given playfield and session seed.
    #[must_use]
    pub const fn new(bounds: Bounds, session_seed: u64) -> Self {
        Self {
            bounds,
            session_seed,
        }
    }
}

/// Pure system that emits spawn and region commands as maps come and go.
#[derive(Debug)]
pub struct Spawning {
    bounds: Bounds,
    session_seed: u64,
    rng: Option<ChaCha8Rng>,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            bounds: config.bounds,
            session_seed: config.session_seed,
            rng: None,
        }
    }

    /// Consumes world events and emits the commands they call for.
    pub fn handle(&mut self, events: &[Event], catalog: &Catalog, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::MapEntered { map, is_final } => {
                    let mut rng = ChaCha8Rng::seed_from_u64(derive_map_seed(self.session_seed, *map));
                    self.populate(*map, *is_final, catalog, &mut rng, out);
                    self.rng = Some(rng);
                }
                Event::MapCleared { map, is_final } => {
                    let bounds = self.bounds;
                    let session_seed = self.session_seed;
                    let rng = self.rng.get_or_insert_with(|| {
                        ChaCha8Rng::seed_from_u64(derive_map_seed(session_seed, *map))
                    });
                    out.push(place_region(bounds, *is_final, rng));
                }
                _ => {}
            }
        }
    }

    fn populate(
        &self,
        map: usize,
        is_final: bool,
        catalog: &Catalog,
        rng: &mut ChaCha8Rng,
        out: &mut Vec<Command>,
    ) {
        let Some(table) = catalog.spawn_table(map) else {
            return;
        };

        if is_final && table.is_boss_only() {
            if let Some(entry) = table.entries.first() {
                out.push(Command::SpawnEnemy {
                    archetype: entry.archetype.clone(),
                    position: self.bounds.center(),
                    patrol_radius: 0.0,
                    patrol_phase: 0.0,
                });
            }
            return;
        }

        for _ in 0..BASE_ENEMY_COUNT + map {
            let Some(archetype) = pick_archetype(table, rng) else {
                return;
            };
            let position = Vec2::new(
                sample_between(rng, SPAWN_EDGE_MARGIN, self.bounds.width() - SPAWN_EDGE_MARGIN),
                sample_between(rng, SPAWN_EDGE_MARGIN, self.bounds.height() - SPAWN_EDGE_MARGIN),
            );
            let patrol_radius = PATROL_RADII[rng.gen_range(0..PATROL_RADII.len())];
            let patrol_phase = rng.gen_range(0.0..TAU);
            out.push(Command::SpawnEnemy {
                archetype,
                position,
                patrol_radius,
                patrol_phase,
            });
        }
    }
}

/// Draws an archetype from `table` proportionally to its weights.
///
/// Weights are accumulated in table order and the first entry whose running
/// total reaches the draw wins; the first entry is the fallback when the
/// weights sum to zero. Returns `None` for an empty table.
pub fn pick_archetype<R: Rng + ?Sized>(table: &SpawnTable, rng: &mut R) -> Option<String> {
    let first = table.entries.first()?;
    let total = table.total_weight();
    if total <= 0.0 {
        return Some(first.archetype.clone());
    }

    let draw = rng.gen::<f32>() * total;
    let mut cumulative = 0.0;
    for entry in &table.entries {
        cumulative += entry.weight;
        if cumulative >= draw {
            return Some(entry.archetype.clone());
        }
    }
    Some(first.archetype.clone())
}

fn place_region(bounds: Bounds, is_final: bool, rng: &mut ChaCha8Rng) -> Command {
    let min = Vec2::new(
        sample_between(rng, REGION_MIN_MARGIN, bounds.width() - REGION_MAX_MARGIN),
        sample_between(rng, REGION_MIN_MARGIN, bounds.height() - REGION_MAX_MARGIN),
    );
    if is_final {
        Command::OpenExit {
            region: Rect::from_min_size(min, Vec2::splat(EXIT_SIZE)),
        }
    } else {
        Command::OpenPortal {
            region: Rect::from_min_size(min, Vec2::splat(PORTAL_SIZE)),
        }
    }
}

fn sample_between(rng: &mut ChaCha8Rng, low: f32, high: f32) -> f32 {
    if high <= low {
        return (low + high) * 0.5;
    }
    rng.gen_range(low..=high)
}

fn derive_map_seed(session_seed: u64, map: usize) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(session_seed.to_le_bytes());
    hasher.update(RNG_STREAM_MAP.as_bytes());
    hasher.update((map as u64).to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
