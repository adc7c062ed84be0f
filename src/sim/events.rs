//! Elimination event log
//!
//! The collision resolver reports frame-stamped outcomes through the narrow
//! [`EventSink`] trait, so the physics core knows nothing about storage
//! format. The offline ranking pipeline reconstructs finishing order from
//! these records: per player, the earliest frame with `Killed = true` is the
//! elimination frame, and a player with no such row is the winner.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

/// One side of a resolved collision that eliminated at least one participant.
///
/// Two records are emitted per such collision, one per side; `killed` is true
/// only on the side that transitioned to eliminated this tick. Field names
/// serialize in the log's column casing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CollisionEvent {
    /// Subject id
    pub particle: String,
    /// Other party id
    pub opponent: String,
    /// Tick index the collision was resolved in
    pub frame: u64,
    pub killed: bool,
}

/// Consumer of elimination events. Implemented externally; the core only
/// ever calls `record`.
pub trait EventSink {
    fn record(&mut self, event: CollisionEvent);
}

/// In-memory collector, used in tests and by library consumers that want to
/// post-process events without touching disk
#[derive(Debug, Default)]
pub struct MemorySink {
    pub events: Vec<CollisionEvent>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for MemorySink {
    fn record(&mut self, event: CollisionEvent) {
        self.events.push(event);
    }
}

/// Discards every event
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&mut self, _event: CollisionEvent) {}
}

/// Append-only CSV log, the format the offline pipeline ingests:
/// a `Particle,Opponent,Frame,Killed` header followed by one row per record.
pub struct CsvEventLog {
    writer: BufWriter<File>,
}

impl CsvEventLog {
    /// Create (or truncate) the log file and write the header row
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "Particle,Opponent,Frame,Killed")?;
        Ok(Self { writer })
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Quote a field if it contains CSV-significant characters
    fn escape(field: &str) -> String {
        if field.contains([',', '"', '\n']) {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }
}

impl EventSink for CsvEventLog {
    fn record(&mut self, event: CollisionEvent) {
        let row = format!(
            "{},{},{},{}",
            Self::escape(&event.particle),
            Self::escape(&event.opponent),
            event.frame,
            if event.killed { "True" } else { "False" },
        );
        if let Err(e) = writeln!(self.writer, "{row}") {
            // Losing a log row must not abort a tick mid-resolution
            log::error!("failed to write collision event: {e}");
        }
    }
}

impl Drop for CsvEventLog {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
