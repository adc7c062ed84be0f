//! Per-tick simulation driver
//!
//! One tick runs to completion before the next begins: radius policy, then
//! integration of every alive particle, then a fresh grid build, then the
//! collision scan. The loop may stop between ticks (one survivor left) but
//! never mid-resolution.

use super::collision::resolve_collisions;
use super::events::EventSink;
use super::grid::SpatialGrid;
use super::radius::{apply_radius, best_radius};
use super::state::{ArenaState, Particle};
use crate::consts::EDGE_MARGIN;
use crate::settings::Settings;

/// Advance one particle by one tick: self-thrust along the current heading,
/// speed clamp, one Euler position step, then independent per-axis wall
/// reflection (clamp to the margin and negate that velocity component).
/// No-op for dead particles.
pub fn integrate(p: &mut Particle, settings: &Settings) {
    if !p.alive {
        return;
    }

    // Self-propulsion, not drag: constant-magnitude thrust along the heading
    let speed = p.vel.length();
    if speed > 0.0 {
        p.vel += p.vel / speed * settings.thrust;
    }

    let speed = p.vel.length();
    if speed > settings.max_speed {
        p.vel = p.vel / speed * settings.max_speed;
    }

    p.pos += p.vel;

    let min_x = p.radius + EDGE_MARGIN;
    let max_x = settings.width - p.radius - EDGE_MARGIN;
    if p.pos.x < min_x {
        p.pos.x = min_x;
        p.vel.x = -p.vel.x;
    } else if p.pos.x > max_x {
        p.pos.x = max_x;
        p.vel.x = -p.vel.x;
    }

    let min_y = p.radius + EDGE_MARGIN;
    let max_y = settings.height - p.radius - EDGE_MARGIN;
    if p.pos.y < min_y {
        p.pos.y = min_y;
        p.vel.y = -p.vel.y;
    } else if p.pos.y > max_y {
        p.pos.y = max_y;
        p.vel.y = -p.vel.y;
    }
}

/// Advance the whole arena by one tick, emitting elimination events to `sink`
pub fn tick(state: &mut ArenaState, sink: &mut dyn EventSink) {
    let settings = state.settings.clone();

    // One shared radius per tick, fanned out to every particle
    let radius = best_radius(
        state.particles.len(),
        settings.width,
        settings.height,
        settings.min_radius,
        settings.max_radius,
    );
    state.radius = radius;
    apply_radius(&mut state.particles, radius);

    for p in state.particles.iter_mut() {
        integrate(p, &settings);
    }

    let mut grid = SpatialGrid::new(settings.width, settings.height, radius);
    grid.rebuild(&state.particles);
    resolve_collisions(&mut state.particles, &grid, radius, state.frame, sink);

    state.frame += 1;
}

/// Run ticks until at most one particle remains (or `max_frames` is hit),
/// compacting dead particles out of the roster after each tick.
/// Returns the winner's id, if there is one.
pub fn run_until_winner(
    state: &mut ArenaState,
    sink: &mut dyn EventSink,
    max_frames: Option<u64>,
) -> Option<String> {
    log::info!(
        "starting run: {} particles in {}x{} arena",
        state.particles.len(),
        state.settings.width,
        state.settings.height
    );

    while state.alive_count() > 1 {
        if let Some(limit) = max_frames
            && state.frame >= limit
        {
            log::warn!(
                "frame limit {limit} reached with {} still alive",
                state.alive_count()
            );
            break;
        }
        tick(state, sink);
        state.compact();
        if state.frame % 600 == 0 {
            log::debug!("frame {}: {} alive", state.frame, state.particles.len());
        }
    }

    let winner = state.winner().map(|p| p.id.clone());
    match &winner {
        Some(id) => log::info!("winner after {} frames: {id}", state.frame),
        None => log::info!("no winner after {} frames", state.frame),
    }
    winner
}
