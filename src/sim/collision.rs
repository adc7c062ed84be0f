//! Collision detection and response
//!
//! The heart of the arena: overlapping pairs found through the spatial grid
//! get pushed apart, damaged, and exchange momentum; a side whose HP crosses
//! zero is eliminated and both sides of the collision are reported to the
//! event sink.

use glam::Vec2;

use super::events::{CollisionEvent, EventSink};
use super::grid::SpatialGrid;
use super::state::Particle;
use crate::consts::REPEL_FACTOR;

/// Two disjoint mutable borrows out of the roster
fn pair_mut(particles: &mut [Particle], i: usize, j: usize) -> (&mut Particle, &mut Particle) {
    debug_assert_ne!(i, j);
    if i < j {
        let (left, right) = particles.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = particles.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}

/// Resolve one candidate pair.
///
/// Returns `None` when the two particles don't overlap at the shared radius,
/// otherwise `Some(any_eliminated)` after applying, in order:
///
/// 1. repulsion by `REPEL_FACTOR * radius` each along the collision normal
///    (unit vector from `b` to `a`; `(1, 0)` when the centers coincide),
/// 2. damage `min(2 * |v_other|, min_hp)` per side, with
///    `min_hp = min(hp_a, hp_b)` taken before the hit - the cap means the
///    common case eliminates at most one side, but two equal-HP particles
///    hit hard enough die together,
/// 3. a 1D elastic momentum exchange along the normal, applied whether or
///    not anyone died. The normal components are read after the damage step,
///    so a side eliminated just above contributes its zeroed velocity and
///    still receives the exchange delta; the value is inert, dead particles
///    are never integrated again.
pub fn resolve_pair(a: &mut Particle, b: &mut Particle, radius: f32) -> Option<bool> {
    let delta = a.pos - b.pos;
    let dist_sq = delta.length_squared();
    if dist_sq >= (radius * 2.0) * (radius * 2.0) {
        return None;
    }
    let dist = dist_sq.sqrt();
    let normal = if dist != 0.0 { delta / dist } else { Vec2::X };

    // Soft correction: counteracts overlap without fully resolving it
    let repel = REPEL_FACTOR * radius;
    a.pos += normal * repel;
    b.pos -= normal * repel;

    let force_a = a.vel.length() * 2.0;
    let force_b = b.vel.length() * 2.0;
    let min_hp = a.hp.min(b.hp);
    a.damage(force_b.min(min_hp));
    b.damage(force_a.min(min_hp));

    let v1 = a.vel.dot(normal);
    let v2 = b.vel.dot(normal);
    let (m1, m2) = (a.mass, b.mass);
    let new_v1 = (v1 * (m1 - m2) + 2.0 * m2 * v2) / (m1 + m2);
    let new_v2 = (v2 * (m2 - m1) + 2.0 * m1 * v1) / (m1 + m2);
    a.vel += (new_v1 - v1) * normal;
    b.vel += (new_v2 - v2) * normal;

    Some(!a.alive || !b.alive)
}

/// Scan the grid and resolve every overlapping pair found in a 3x3 window.
///
/// The enumeration visits `(cell -> neighbor)` in both directions, so a pair
/// that still overlaps when reached from the other side is collided a second
/// time in the same tick. The aliveness re-checks below are the only dedup in
/// effect: an eliminated particle takes and deals no further damage this tick.
pub fn resolve_collisions(
    particles: &mut [Particle],
    grid: &SpatialGrid,
    radius: f32,
    frame: u64,
    sink: &mut dyn EventSink,
) {
    for col in 0..grid.cols() {
        for row in 0..grid.rows() {
            for &ai in grid.cell(col, row) {
                'window: for (nc, nr) in grid.neighbor_cells(col, row) {
                    for &bi in grid.cell(nc, nr) {
                        if bi == ai || !particles[bi].alive {
                            continue;
                        }
                        if !particles[ai].alive {
                            // Eliminated earlier in this pass
                            continue 'window;
                        }

                        let (a, b) = pair_mut(particles, ai, bi);
                        match resolve_pair(a, b, radius) {
                            Some(true) => {
                                let (a, b) = (&particles[ai], &particles[bi]);
                                if !a.alive {
                                    log::debug!("frame {frame}: {} eliminated by {}", a.id, b.id);
                                }
                                if !b.alive {
                                    log::debug!("frame {frame}: {} eliminated by {}", b.id, a.id);
                                }
                                sink.record(CollisionEvent {
                                    particle: a.id.clone(),
                                    opponent: b.id.clone(),
                                    frame,
                                    killed: !a.alive,
                                });
                                sink.record(CollisionEvent {
                                    particle: b.id.clone(),
                                    opponent: a.id.clone(),
                                    frame,
                                    killed: !b.alive,
                                });
                            }
                            Some(false) | None => {}
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MASS;
    use crate::sim::events::MemorySink;

    fn particle(id: &str, pos: Vec2, vel: Vec2, hp: f32) -> Particle {
        Particle {
            id: id.to_string(),
            pos,
            vel,
            radius: 10.0,
            hp,
            max_hp: hp,
            mass: MASS,
            alive: true,
        }
    }

    #[test]
    fn head_on_collision_scenario() {
        // Radius 10, centers 5 apart (< 20): detected
        let mut a = particle("a", Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), 10.0);
        let mut b = particle("b", Vec2::new(5.0, 0.0), Vec2::new(-1.0, 0.0), 10.0);

        let any_dead = resolve_pair(&mut a, &mut b, 10.0).expect("overlap must be detected");
        assert!(!any_dead);

        // Symmetric repulsion along the normal from b to a, i.e. (-1, 0)
        assert_eq!(a.pos, Vec2::new(-1.0, 0.0));
        assert_eq!(b.pos, Vec2::new(6.0, 0.0));

        // Equal speeds: force 2 each, min_hp 10, so 2 damage per side
        assert_eq!(a.hp, 8.0);
        assert_eq!(b.hp, 8.0);

        // Equal masses: normal velocity components swap
        assert!((a.vel.x - (-1.0)).abs() < 1e-6);
        assert!((b.vel.x - 1.0).abs() < 1e-6);
        assert_eq!(a.vel.y, 0.0);
        assert_eq!(b.vel.y, 0.0);
    }

    #[test]
    fn separated_pair_is_untouched() {
        let mut a = particle("a", Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), 10.0);
        let mut b = particle("b", Vec2::new(25.0, 0.0), Vec2::new(-1.0, 0.0), 10.0);

        assert!(resolve_pair(&mut a, &mut b, 10.0).is_none());
        assert_eq!(a.pos, Vec2::new(0.0, 0.0));
        assert_eq!(a.hp, 10.0);
        assert_eq!(b.vel, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn coincident_centers_default_normal_to_plus_x() {
        let mut a = particle("a", Vec2::new(3.0, 3.0), Vec2::ZERO, 10.0);
        let mut b = particle("b", Vec2::new(3.0, 3.0), Vec2::ZERO, 10.0);

        resolve_pair(&mut a, &mut b, 10.0).unwrap();
        assert_eq!(a.pos, Vec2::new(4.0, 3.0));
        assert_eq!(b.pos, Vec2::new(2.0, 3.0));
    }

    #[test]
    fn damage_is_capped_at_lower_hp() {
        let mut a = particle("a", Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0), 3.0);
        let mut b = particle("b", Vec2::new(5.0, 0.0), Vec2::new(-4.0, 0.0), 100.0);

        // Both forces are 8, but min_hp = 3 caps each side's damage
        let any_dead = resolve_pair(&mut a, &mut b, 10.0).unwrap();
        assert!(any_dead);
        assert!(!a.alive);
        assert_eq!(b.hp, 97.0);
    }

    #[test]
    fn equal_hp_hard_hit_kills_both() {
        // Both start at min_hp with forces above it: simultaneous elimination
        // is the expected arithmetic, not a bug
        let mut a = particle("a", Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0), 3.0);
        let mut b = particle("b", Vec2::new(5.0, 0.0), Vec2::new(-4.0, 0.0), 3.0);

        resolve_pair(&mut a, &mut b, 10.0).unwrap();
        assert!(!a.alive);
        assert!(!b.alive);
    }

    #[test]
    fn momentum_exchange_reads_velocities_after_damage() {
        // a dies from the hit; its velocity is zeroed before the exchange, so
        // the surviving side ends up absorbed rather than reflected, and the
        // dead side carries an inert exchange delta
        let mut a = particle("a", Vec2::new(0.0, 0.0), Vec2::ZERO, 2.0);
        let mut b = particle("b", Vec2::new(5.0, 0.0), Vec2::new(3.0, 0.0), 10.0);

        let any_dead = resolve_pair(&mut a, &mut b, 10.0).unwrap();
        assert!(any_dead);
        assert!(!a.alive);
        assert_eq!(b.hp, 10.0); // a was stationary: zero force on b
        assert!((b.vel.x - 0.0).abs() < 1e-6);
        assert!((a.vel.x - 3.0).abs() < 1e-6);
    }

    #[test]
    fn normal_momentum_is_conserved_without_elimination() {
        let mut a = particle("a", Vec2::new(0.0, 0.0), Vec2::new(2.0, 1.0), 100.0);
        let mut b = particle("b", Vec2::new(8.0, 4.0), Vec2::new(-1.5, 0.5), 100.0);
        let normal = (a.pos - b.pos).normalize();

        let before = a.mass * a.vel.dot(normal) + b.mass * b.vel.dot(normal);
        let any_dead = resolve_pair(&mut a, &mut b, 10.0).unwrap();
        assert!(!any_dead);
        let after = a.mass * a.vel.dot(normal) + b.mass * b.vel.dot(normal);
        assert!((before - after).abs() < 1e-4);
    }

    #[test]
    fn elimination_emits_one_event_per_side() {
        let mut particles = vec![
            particle("a", Vec2::new(10.0, 10.0), Vec2::ZERO, 2.0),
            particle("b", Vec2::new(15.0, 10.0), Vec2::new(3.0, 0.0), 10.0),
        ];
        let mut grid = SpatialGrid::new(200.0, 200.0, 10.0);
        grid.rebuild(&particles);
        let mut sink = MemorySink::new();

        resolve_collisions(&mut particles, &grid, 10.0, 42, &mut sink);

        assert_eq!(sink.events.len(), 2);
        let a_side = sink.events.iter().find(|e| e.particle == "a").unwrap();
        let b_side = sink.events.iter().find(|e| e.particle == "b").unwrap();
        assert!(a_side.killed);
        assert_eq!(a_side.opponent, "b");
        assert_eq!(a_side.frame, 42);
        assert!(!b_side.killed);
        assert_eq!(b_side.opponent, "a");
    }

    #[test]
    fn no_events_without_elimination() {
        let mut particles = vec![
            particle("a", Vec2::new(10.0, 10.0), Vec2::new(1.0, 0.0), 100.0),
            particle("b", Vec2::new(15.0, 10.0), Vec2::new(-1.0, 0.0), 100.0),
        ];
        let mut grid = SpatialGrid::new(200.0, 200.0, 10.0);
        grid.rebuild(&particles);
        let mut sink = MemorySink::new();

        resolve_collisions(&mut particles, &grid, 10.0, 0, &mut sink);
        // radius arg 10.0 above; pair overlaps and takes damage but nobody dies
        assert!(sink.events.is_empty());
        assert!(particles.iter().all(|p| p.alive && p.hp < 100.0));
    }

    #[test]
    fn pair_in_same_cell_is_resolved_twice() {
        // The scan enumerates (cell -> neighbor) in both directions. A pair
        // that still overlaps on the second visit is collided again; pin the
        // resulting arithmetic so nobody "fixes" the enumeration.
        let mut particles = vec![
            particle("a", Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), 10.0),
            particle("b", Vec2::new(0.0, 0.0), Vec2::ZERO, 10.0),
        ];
        let mut grid = SpatialGrid::new(200.0, 200.0, 10.0);
        grid.rebuild(&particles);
        let mut sink = MemorySink::new();

        resolve_collisions(&mut particles, &grid, 10.0, 0, &mut sink);

        // First visit damages b (the mover's force), second visit damages a
        // back after the velocity swap. One application would leave 10/8.
        assert_eq!(particles[0].hp, 8.0);
        assert_eq!(particles[1].hp, 8.0);
        assert_eq!(particles[0].pos, Vec2::new(2.0, 0.0));
        assert_eq!(particles[1].pos, Vec2::new(-2.0, 0.0));
    }

    #[test]
    fn dead_particles_are_skipped_mid_pass() {
        // Three stacked particles: the middle one dies against the first and
        // must not fight the third afterwards
        let mut particles = vec![
            particle("a", Vec2::new(10.0, 10.0), Vec2::new(4.0, 0.0), 100.0),
            particle("victim", Vec2::new(14.0, 10.0), Vec2::ZERO, 2.0),
            particle("c", Vec2::new(18.0, 10.0), Vec2::ZERO, 100.0),
        ];
        let mut grid = SpatialGrid::new(200.0, 200.0, 10.0);
        grid.rebuild(&particles);
        let mut sink = MemorySink::new();

        resolve_collisions(&mut particles, &grid, 10.0, 0, &mut sink);

        assert!(!particles[1].alive);
        // Every event involving the victim names "a" as the opponent; it
        // never traded damage with "c" after dying
        for e in sink.events.iter().filter(|e| e.particle == "victim") {
            assert_eq!(e.opponent, "a");
        }
    }
}
