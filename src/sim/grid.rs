//! Uniform spatial grid for collision broad-phase
//!
//! Buckets alive-particle indices into cells sized `2 * radius` so the
//! resolver only compares a particle against its own cell and the 8
//! surrounding ones. Rebuilt from scratch every tick; population and churn
//! are small enough that incremental updates aren't worth the complexity.
//!
//! The 3x3 window is sound only while per-tick displacement stays under one
//! cell width. `Settings::validate` enforces `max_speed < 2 * min_radius`
//! up front so this holds for every radius the policy can pick.

use glam::Vec2;

use super::state::Particle;

pub struct SpatialGrid {
    cell_size: f32,
    cols: usize,
    rows: usize,
    /// Row-major buckets of roster indices
    cells: Vec<Vec<usize>>,
}

impl SpatialGrid {
    /// Grid sized for the current shared radius:
    /// `cols = floor(width / 2r) + 1`, `rows = floor(height / 2r) + 1`
    pub fn new(width: f32, height: f32, radius: f32) -> Self {
        let cell_size = radius * 2.0;
        let cols = (width / cell_size).floor() as usize + 1;
        let rows = (height / cell_size).floor() as usize + 1;
        Self {
            cell_size,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Cell coordinates for a position, clamped into the grid
    #[inline]
    pub fn cell_coords(&self, pos: Vec2) -> (usize, usize) {
        let col = ((pos.x / self.cell_size).floor() as isize).clamp(0, self.cols as isize - 1);
        let row = ((pos.y / self.cell_size).floor() as isize).clamp(0, self.rows as isize - 1);
        (col as usize, row as usize)
    }

    /// Roster indices bucketed in cell `(col, row)`
    pub fn cell(&self, col: usize, row: usize) -> &[usize] {
        &self.cells[row * self.cols + col]
    }

    /// Repopulate the grid from the roster; dead particles are never inserted
    pub fn rebuild(&mut self, particles: &[Particle]) {
        for cell in &mut self.cells {
            cell.clear();
        }
        for (idx, p) in particles.iter().enumerate() {
            if !p.alive {
                continue;
            }
            let (col, row) = self.cell_coords(p.pos);
            self.cells[row * self.cols + col].push(idx);
        }
    }

    /// The in-bounds cells of the 3x3 window centered on `(col, row)`,
    /// the center cell included
    pub fn neighbor_cells(&self, col: usize, row: usize) -> Vec<(usize, usize)> {
        let mut out = Vec::with_capacity(9);
        for dx in -1isize..=1 {
            for dy in -1isize..=1 {
                let nc = col as isize + dx;
                let nr = row as isize + dy;
                if nc >= 0 && (nc as usize) < self.cols && nr >= 0 && (nr as usize) < self.rows {
                    out.push((nc as usize, nr as usize));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::RngState;

    fn particle_at(id: usize, x: f32, y: f32) -> Particle {
        let mut rng = RngState::new(id as u64).to_rng();
        Particle::new(format!("p{id}"), Vec2::new(x, y), 10.0, 100.0, &mut rng)
    }

    #[test]
    fn dimensions_match_arena() {
        let grid = SpatialGrid::new(1280.0, 720.0, 10.0);
        assert_eq!(grid.cell_size(), 20.0);
        assert_eq!(grid.cols(), 65);
        assert_eq!(grid.rows(), 37);
    }

    #[test]
    fn particles_land_in_their_cell() {
        let mut grid = SpatialGrid::new(200.0, 200.0, 10.0);
        let particles = vec![
            particle_at(0, 5.0, 5.0),    // cell (0, 0)
            particle_at(1, 25.0, 5.0),   // cell (1, 0)
            particle_at(2, 45.0, 65.0),  // cell (2, 3)
        ];
        grid.rebuild(&particles);
        assert_eq!(grid.cell(0, 0), [0]);
        assert_eq!(grid.cell(1, 0), [1]);
        assert_eq!(grid.cell(2, 3), [2]);
        assert!(grid.cell(3, 3).is_empty());
    }

    #[test]
    fn dead_particles_are_never_inserted() {
        let mut grid = SpatialGrid::new(200.0, 200.0, 10.0);
        let mut particles = vec![particle_at(0, 5.0, 5.0), particle_at(1, 6.0, 5.0)];
        particles[1].damage(1000.0);
        grid.rebuild(&particles);
        assert_eq!(grid.cell(0, 0), [0]);
    }

    #[test]
    fn rebuild_clears_previous_contents() {
        let mut grid = SpatialGrid::new(200.0, 200.0, 10.0);
        let mut particles = vec![particle_at(0, 5.0, 5.0)];
        grid.rebuild(&particles);
        particles[0].pos = Vec2::new(45.0, 45.0);
        grid.rebuild(&particles);
        assert!(grid.cell(0, 0).is_empty());
        assert_eq!(grid.cell(2, 2), [0]);
    }

    #[test]
    fn neighbor_window_is_clipped_at_edges() {
        let grid = SpatialGrid::new(200.0, 200.0, 10.0);
        assert_eq!(grid.neighbor_cells(0, 0).len(), 4);
        assert_eq!(grid.neighbor_cells(5, 0).len(), 6);
        assert_eq!(grid.neighbor_cells(5, 5).len(), 9);
    }

    #[test]
    fn out_of_bounds_position_is_clamped_into_grid() {
        let grid = SpatialGrid::new(200.0, 200.0, 10.0);
        assert_eq!(grid.cell_coords(Vec2::new(-5.0, 1000.0)), (0, grid.rows() - 1));
    }
}
