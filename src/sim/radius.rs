//! Shared-radius policy
//!
//! All alive particles share one radius, recomputed every tick from the
//! population count: the largest radius in `[min_radius, max_radius]` whose
//! `4r x 4r` cell packing still offers at least one cell per particle. The
//! population shrinking therefore lets the radius grow back.

use super::state::Particle;

/// Largest radius in `[min_radius, max_radius]` such that
/// `floor(width / 4r) * floor(height / 4r) >= count`.
///
/// Scans descending, so ties favor the larger radius. Falls back to
/// `min_radius` when nothing in range satisfies the packing inequality;
/// overcrowding is accepted rather than treated as an error. Evaluate-only:
/// mutates nothing (used during placement before any particle exists).
pub fn best_radius(count: usize, width: f32, height: f32, min_radius: u32, max_radius: u32) -> f32 {
    for r in (min_radius..=max_radius).rev() {
        let cell_size = (4 * r) as f32;
        let cols = (width / cell_size).floor() as usize;
        let rows = (height / cell_size).floor() as usize;
        if cols * rows >= count {
            return r as f32;
        }
    }
    min_radius as f32
}

/// Fan a freshly computed radius out onto every particle
pub fn apply_radius(particles: &mut [Particle], radius: f32) {
    for p in particles.iter_mut() {
        p.radius = radius;
    }
}
