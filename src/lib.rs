//! Particle Royale - a last-one-standing particle arena simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, spatial grid, collisions,
//!   eliminations, event log)
//! - `settings`: Runtime configuration with validation
//!
//! The simulation neither renders nor persists anything itself; it mutates
//! particle state and hands frame-stamped elimination events to an
//! [`sim::EventSink`] supplied by the caller.

pub mod settings;
pub mod sim;

pub use settings::{Settings, SettingsError};

/// Simulation configuration constants (defaults, overridable via [`Settings`])
pub mod consts {
    /// Arena dimensions in arena units
    pub const ARENA_WIDTH: f32 = 1280.0;
    pub const ARENA_HEIGHT: f32 = 720.0;

    /// Shared-radius search range (whole arena units, scanned descending)
    pub const MIN_RADIUS: u32 = 10;
    pub const MAX_RADIUS: u32 = 50;

    /// Particle defaults
    pub const MAX_HP: f32 = 100.0;
    pub const MAX_SPEED: f32 = 5.0;
    /// Self-thrust applied along the velocity direction each tick
    pub const THRUST: f32 = 0.01;
    /// Uniform particle mass (collision math generalizes, but this is never varied)
    pub const MASS: f32 = 1.0;

    /// Margin keeping particles off the walls so reflection can't oscillate
    pub const EDGE_MARGIN: f32 = 0.1;

    /// Fraction of the shared radius used to push overlapping pairs apart
    pub const REPEL_FACTOR: f32 = 0.1;

    /// Initial speed range for freshly spawned particles
    pub const SPAWN_SPEED_MIN: f32 = 0.5;
    pub const SPAWN_SPEED_MAX: f32 = 1.0;
}
