//! Particle Royale entry point
//!
//! Builds a roster (from a count or a tabular CSV), runs the simulation to a
//! single survivor, and appends every elimination to a CSV event log the
//! offline ranking pipeline can ingest.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use particle_royale::Settings;
use particle_royale::sim::{
    ArenaState, CsvEventLog, EventSink, NullSink, RngState, resolve_roster_ids, roster_from_count,
    run_until_winner, spawn_roster,
};

struct Args {
    count: usize,
    seed: Option<u64>,
    roster: Option<PathBuf>,
    log: Option<PathBuf>,
    settings: Option<PathBuf>,
    max_frames: Option<u64>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            count: 32,
            seed: None,
            roster: None,
            log: None,
            settings: None,
            max_frames: None,
        }
    }
}

const USAGE: &str = "usage: particle-royale [--count N] [--seed N] [--roster <csv>] \
                     [--log <csv>] [--settings <json>] [--max-frames N]";

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(flag) = it.next() {
        let mut value = |name: &str| {
            it.next()
                .ok_or_else(|| format!("{name} needs a value\n{USAGE}"))
        };
        match flag.as_str() {
            "--count" => {
                args.count = value("--count")?
                    .parse()
                    .map_err(|e| format!("--count: {e}"))?;
            }
            "--seed" => {
                args.seed = Some(
                    value("--seed")?
                        .parse()
                        .map_err(|e| format!("--seed: {e}"))?,
                );
            }
            "--roster" => args.roster = Some(PathBuf::from(value("--roster")?)),
            "--log" => args.log = Some(PathBuf::from(value("--log")?)),
            "--settings" => args.settings = Some(PathBuf::from(value("--settings")?)),
            "--max-frames" => {
                args.max_frames = Some(
                    value("--max-frames")?
                        .parse()
                        .map_err(|e| format!("--max-frames: {e}"))?,
                );
            }
            "--help" | "-h" => return Err(USAGE.to_string()),
            other => return Err(format!("unknown flag {other}\n{USAGE}")),
        }
    }
    Ok(args)
}

/// Minimal CSV split for the roster file. Ids and avatar URLs don't contain
/// embedded commas in practice; a quoted field would need a real parser.
fn split_csv_line(line: &str) -> Vec<String> {
    line.split(',').map(|f| f.trim().to_string()).collect()
}

fn load_roster_ids(path: &PathBuf) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    let mut lines = contents.lines().filter(|l| !l.trim().is_empty());
    let headers = lines
        .next()
        .map(split_csv_line)
        .ok_or("roster file is empty")?;
    let rows: Vec<Vec<String>> = lines.map(split_csv_line).collect();
    Ok(resolve_roster_ids(&headers, &rows)?)
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = parse_args()?;

    let settings = match &args.settings {
        Some(path) => Settings::load_from(path)?,
        None => Settings::default(),
    };
    settings.validate()?;

    let ids = match &args.roster {
        Some(path) => load_roster_ids(path)?,
        None => roster_from_count(args.count),
    };

    let seed = match args.seed {
        Some(seed) => seed,
        None => SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis() as u64,
    };
    log::info!("seed: {seed}");

    let mut rng = RngState::new(seed).to_rng();
    let particles = spawn_roster(&ids, &settings, &mut rng)?;
    let mut state = ArenaState::new(settings, particles);

    let mut sink: Box<dyn EventSink> = match &args.log {
        Some(path) => Box::new(CsvEventLog::create(path)?),
        None => Box::new(NullSink),
    };

    let winner = run_until_winner(&mut state, sink.as_mut(), args.max_frames);
    match winner {
        Some(id) => println!("winner: {id} (after {} frames)", state.frame),
        None => println!(
            "no winner after {} frames ({} still alive)",
            state.frame,
            state.alive_count()
        ),
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
