//! Arena state and core simulation types
//!
//! Everything the tick driver mutates lives here. Particles are owned
//! exclusively by the [`ArenaState`] roster; nothing outside the tick
//! boundary mutates them.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::settings::Settings;

/// RNG state wrapper for reproducible runs
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// A circular combatant
///
/// `radius` is conceptually simulation-level state: the radius policy fans the
/// same value out to every alive particle each tick, so at any instant exactly
/// one shared radius is in effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    /// Stable externally-meaningful identifier, never reused
    pub id: String,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub mass: f32,
    /// Monotonic: flips to false exactly once, on elimination
    pub alive: bool,
}

impl Particle {
    /// Create a particle at `pos` with a random launch velocity
    /// (uniform heading, speed in `[SPAWN_SPEED_MIN, SPAWN_SPEED_MAX)`)
    pub fn new(id: String, pos: Vec2, radius: f32, max_hp: f32, rng: &mut Pcg32) -> Self {
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let speed = rng.random_range(SPAWN_SPEED_MIN..SPAWN_SPEED_MAX);
        Self {
            id,
            pos,
            vel: Vec2::new(angle.cos(), angle.sin()) * speed,
            radius,
            hp: max_hp,
            max_hp,
            mass: MASS,
            alive: true,
        }
    }

    /// Apply damage; crossing zero HP eliminates the particle permanently
    /// (velocity zeroed, `alive` flipped, never integrated or collided again)
    pub fn damage(&mut self, force: f32) {
        self.hp -= force;
        if self.hp <= 0.0 {
            self.alive = false;
            self.vel = Vec2::ZERO;
        }
    }

    /// Remaining HP as a fraction of max, clamped to `[0, 1]`
    pub fn hp_ratio(&self) -> f32 {
        (self.hp / self.max_hp).clamp(0.0, 1.0)
    }
}

/// Read-only view of one particle for telemetry consumers
#[derive(Debug, Clone, Serialize)]
pub struct ParticleView {
    pub id: String,
    pub pos: Vec2,
    pub radius: f32,
    pub hp_ratio: f32,
}

/// Per-tick telemetry snapshot: no mutation path back into the core
#[derive(Debug, Clone, Serialize)]
pub struct ArenaSnapshot {
    pub frame: u64,
    pub radius: f32,
    pub alive_count: usize,
    pub particles: Vec<ParticleView>,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct ArenaState {
    pub settings: Settings,
    /// Tick counter; events emitted during tick N carry frame number N
    pub frame: u64,
    /// Shared radius currently in effect (recomputed each tick)
    pub radius: f32,
    /// Roster in creation order; the driver compacts out dead particles
    pub particles: Vec<Particle>,
}

impl ArenaState {
    pub fn new(settings: Settings, particles: Vec<Particle>) -> Self {
        let radius = particles
            .first()
            .map(|p| p.radius)
            .unwrap_or(settings.min_radius as f32);
        Self {
            settings,
            frame: 0,
            radius,
            particles,
        }
    }

    pub fn alive_count(&self) -> usize {
        self.particles.iter().filter(|p| p.alive).count()
    }

    /// The sole survivor, once the population is down to one
    pub fn winner(&self) -> Option<&Particle> {
        let mut alive = self.particles.iter().filter(|p| p.alive);
        match (alive.next(), alive.next()) {
            (Some(p), None) => Some(p),
            _ => None,
        }
    }

    /// Drop dead particles from the roster. Safe to call any time between
    /// ticks; eliminated particles are inert either way.
    pub fn compact(&mut self) {
        self.particles.retain(|p| p.alive);
    }

    /// Read-only snapshot of alive particles for rendering/UI collaborators
    pub fn snapshot(&self) -> ArenaSnapshot {
        let particles = self
            .particles
            .iter()
            .filter(|p| p.alive)
            .map(|p| ParticleView {
                id: p.id.clone(),
                pos: p.pos,
                radius: p.radius,
                hp_ratio: p.hp_ratio(),
            })
            .collect::<Vec<_>>();
        ArenaSnapshot {
            frame: self.frame,
            radius: self.radius,
            alive_count: particles.len(),
            particles,
        }
    }
}
