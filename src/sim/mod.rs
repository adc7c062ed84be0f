//! Deterministic simulation module
//!
//! All arena logic lives here. This module must be pure and deterministic:
//! - Tick-synchronous only (a tick runs to completion once started)
//! - Seeded RNG only
//! - Stable iteration order (roster insertion order)
//! - No rendering or platform dependencies
//!
//! Control flow per tick: radius policy -> integrate alive particles ->
//! spatial grid rebuild -> collision scan (events out through an
//! [`EventSink`]) -> caller compacts dead particles.

pub mod collision;
pub mod events;
pub mod grid;
pub mod radius;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::resolve_collisions;
pub use events::{CollisionEvent, CsvEventLog, EventSink, MemorySink, NullSink};
pub use grid::SpatialGrid;
pub use radius::{apply_radius, best_radius};
pub use spawn::{assign_positions, resolve_roster_ids, roster_from_count, spawn_roster, SpawnError};
pub use state::{ArenaSnapshot, ArenaState, Particle, ParticleView, RngState};
pub use tick::{run_until_winner, tick};
