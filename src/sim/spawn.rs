//! Roster construction and initial placement
//!
//! Particles start on a non-overlapping random permutation of grid cells
//! sized `(2 * radius + 1)` square. Requesting more particles than the arena
//! has cells is a fatal configuration error, never a silent truncation.
//!
//! Roster ids come either from a bare count or from a tabular source (a
//! header row plus data rows); the id and avatar columns are resolved
//! case/format-insensitively against fixed alias lists. Avatar values are
//! opaque here - image acquisition belongs to an external collaborator - but
//! the column must exist.

use std::fmt;

use glam::Vec2;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;

use super::radius::best_radius;
use super::state::Particle;
use crate::settings::Settings;

/// Errors raised while building the starting roster
#[derive(Debug)]
pub enum SpawnError {
    /// More particles requested than the placement grid has cells.
    /// Indicates a mis-sized arena relative to the population.
    ArenaFull {
        requested: usize,
        capacity: usize,
    },
    /// The roster source produced no usable ids
    EmptyRoster,
    /// The tabular source is missing the id and/or avatar column
    MissingColumn {
        /// Headers that were actually present, for the error message
        found: Vec<String>,
    },
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpawnError::ArenaFull {
                requested,
                capacity,
            } => write!(
                f,
                "not enough space to place {requested} particles without overlap (room for {capacity})"
            ),
            SpawnError::EmptyRoster => write!(f, "roster source produced no particles"),
            SpawnError::MissingColumn { found } => write!(
                f,
                "tabular roster needs a username column and an avatar column; found: {found:?}"
            ),
        }
    }
}

impl std::error::Error for SpawnError {}

/// Accepted header spellings for the id column
const USERNAME_ALIASES: &[&str] = &["username", "user", "login", "handle", "profile", "name"];

/// Accepted header spellings for the avatar column
const AVATAR_ALIASES: &[&str] = &[
    "avatar url",
    "avatarurl",
    "avatar_url",
    "avatar",
    "image_url",
    "image",
    "url",
    "profile_pic_url",
    "profile_image_url",
];

/// Case/format-insensitive header key: trimmed, lowercased, spaces and
/// underscores stripped
fn normalize(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .replace([' ', '_'], "")
}

fn resolve_column(headers: &[String], aliases: &[&str]) -> Option<usize> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize(h)).collect();
    aliases
        .iter()
        .find_map(|alias| normalized.iter().position(|h| h == &normalize(alias)))
}

/// Extract roster ids from a tabular source. Rows with a blank id are
/// skipped; the avatar column must exist but its values are not inspected.
pub fn resolve_roster_ids(
    headers: &[String],
    rows: &[Vec<String>],
) -> Result<Vec<String>, SpawnError> {
    let username_col = resolve_column(headers, USERNAME_ALIASES);
    let avatar_col = resolve_column(headers, AVATAR_ALIASES);
    let (username_col, _avatar_col) = match (username_col, avatar_col) {
        (Some(u), Some(a)) => (u, a),
        _ => {
            return Err(SpawnError::MissingColumn {
                found: headers.to_vec(),
            });
        }
    };

    let ids: Vec<String> = rows
        .iter()
        .filter_map(|row| row.get(username_col))
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();

    if ids.is_empty() {
        return Err(SpawnError::EmptyRoster);
    }
    Ok(ids)
}

/// Synthesized ids for a count-based roster
pub fn roster_from_count(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("particle_{i}")).collect()
}

/// Non-overlapping starting positions: a random permutation of the cells of
/// a `(2 * radius + 1)`-sized grid, each particle centered in its cell
pub fn assign_positions(
    radius: f32,
    width: f32,
    height: f32,
    count: usize,
    rng: &mut Pcg32,
) -> Result<Vec<Vec2>, SpawnError> {
    let cell_size = 2.0 * radius + 1.0;
    let cols = (width / cell_size).floor() as usize;
    let rows = (height / cell_size).floor() as usize;
    let capacity = cols * rows;
    if count > capacity {
        return Err(SpawnError::ArenaFull {
            requested: count,
            capacity,
        });
    }

    let mut cells: Vec<(usize, usize)> = (0..cols)
        .flat_map(|col| (0..rows).map(move |row| (col, row)))
        .collect();
    cells.shuffle(rng);

    Ok(cells
        .into_iter()
        .take(count)
        .map(|(col, row)| {
            Vec2::new(
                col as f32 * cell_size + radius,
                row as f32 * cell_size + radius,
            )
        })
        .collect())
}

/// Build the starting roster: evaluate the shared radius for this population
/// (without mutating anything), place every particle without overlap, and
/// give each a random launch velocity.
pub fn spawn_roster(
    ids: &[String],
    settings: &Settings,
    rng: &mut Pcg32,
) -> Result<Vec<Particle>, SpawnError> {
    if ids.is_empty() {
        return Err(SpawnError::EmptyRoster);
    }

    let radius = best_radius(
        ids.len(),
        settings.width,
        settings.height,
        settings.min_radius,
        settings.max_radius,
    );
    let positions = assign_positions(radius, settings.width, settings.height, ids.len(), rng)?;

    log::info!(
        "spawning {} particles at radius {radius}",
        ids.len()
    );

    Ok(ids
        .iter()
        .zip(positions)
        .map(|(id, pos)| Particle::new(id.clone(), pos, radius, settings.max_hp, rng))
        .collect())
}
