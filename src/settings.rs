//! Runtime simulation configuration
//!
//! A JSON file can override any subset of the defaults from
//! [`crate::consts`]; missing keys fall back to the compile-time values.
//! Validation happens once, up front - the tick loop assumes a valid
//! configuration and never re-checks.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Simulation settings, validated before the first tick
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Arena width in arena units
    pub width: f32,
    /// Arena height in arena units
    pub height: f32,
    /// Shared-radius search range (whole units, scanned descending)
    pub min_radius: u32,
    pub max_radius: u32,
    /// Starting (and maximum) HP per particle
    pub max_hp: f32,
    /// Speed cap applied after thrust each tick
    pub max_speed: f32,
    /// Self-thrust magnitude applied along the heading each tick
    pub thrust: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
            min_radius: MIN_RADIUS,
            max_radius: MAX_RADIUS,
            max_hp: MAX_HP,
            max_speed: MAX_SPEED,
            thrust: THRUST,
        }
    }
}

/// Configuration failures, all fatal
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    /// A value is outside its safe operating range
    Invalid {
        name: &'static str,
        value: f32,
        requirement: &'static str,
    },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "failed to read settings file: {e}"),
            SettingsError::Parse(e) => write!(f, "failed to parse settings JSON: {e}"),
            SettingsError::Invalid {
                name,
                value,
                requirement,
            } => write!(f, "invalid setting {name} = {value}: {requirement}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(e) => Some(e),
            SettingsError::Parse(e) => Some(e),
            SettingsError::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Parse(e)
    }
}

impl Settings {
    /// Load settings from a JSON file and validate them
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings: Settings = serde_json::from_str(&json)?;
        settings.validate()?;
        log::info!("loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Reject configurations the simulation cannot run safely under.
    ///
    /// The `max_speed < 2 * min_radius` check makes the spatial grid's
    /// implicit assumption explicit: the 3x3 collision window only catches
    /// every pair if no particle crosses more than one cell per tick, and
    /// cells are never smaller than `2 * min_radius`.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.width <= 0.0 {
            return Err(SettingsError::Invalid {
                name: "width",
                value: self.width,
                requirement: "must be positive",
            });
        }
        if self.height <= 0.0 {
            return Err(SettingsError::Invalid {
                name: "height",
                value: self.height,
                requirement: "must be positive",
            });
        }
        if self.min_radius == 0 {
            return Err(SettingsError::Invalid {
                name: "min_radius",
                value: 0.0,
                requirement: "must be at least 1",
            });
        }
        if self.min_radius > self.max_radius {
            return Err(SettingsError::Invalid {
                name: "min_radius",
                value: self.min_radius as f32,
                requirement: "must not exceed max_radius",
            });
        }
        if self.max_hp <= 0.0 {
            return Err(SettingsError::Invalid {
                name: "max_hp",
                value: self.max_hp,
                requirement: "must be positive",
            });
        }
        if self.thrust < 0.0 {
            return Err(SettingsError::Invalid {
                name: "thrust",
                value: self.thrust,
                requirement: "must not be negative",
            });
        }
        if self.max_speed >= 2.0 * self.min_radius as f32 {
            return Err(SettingsError::Invalid {
                name: "max_speed",
                value: self.max_speed,
                requirement: "must stay below one collision cell (2 * min_radius) per tick",
            });
        }
        Ok(())
    }
}
