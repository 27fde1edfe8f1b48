//! Reference CLI
//!
//! `sim new <seed>` prints a genesis snapshot, `sim run <snapshot> <hours>`
//! advances it and prints the updated snapshot plus the narrative log, and
//! `sim verify <a> <b>` compares two snapshots byte for byte.
//!
//! Exit codes: 0 success, 1 verification failure, 2 malformed snapshot,
//! 3 content table error.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use chronicle_core::{ContentTables, SimError, Simulation, WorldArchetype};

#[derive(Parser, Debug)]
#[command(name = "sim")]
#[command(about = "Deterministic fantasy-world simulator")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new world and print its snapshot to stdout.
    New {
        /// Textual seed; identical seeds grow identical worlds.
        seed: String,
        /// World archetype: standard, maritime, or frontier.
        #[arg(long, default_value = "standard")]
        archetype: String,
        /// Optional TOML content-table override.
        #[arg(long)]
        content: Option<PathBuf>,
    },
    /// Load a snapshot, advance it, print the new snapshot and the log.
    Run {
        /// Path to a snapshot file.
        snapshot: PathBuf,
        /// Hours to simulate.
        hours: u64,
        /// Optional TOML content-table override.
        #[arg(long)]
        content: Option<PathBuf>,
    },
    /// Compare two snapshots byte for byte.
    Verify {
        first: PathBuf,
        second: PathBuf,
    },
}

const EXIT_VERIFY_FAILED: u8 = 1;
const EXIT_BAD_SNAPSHOT: u8 = 2;
const EXIT_BAD_CONTENT: u8 = 3;

fn parse_archetype(s: &str) -> Result<WorldArchetype, String> {
    match s {
        "standard" => Ok(WorldArchetype::Standard),
        "maritime" => Ok(WorldArchetype::Maritime),
        "frontier" => Ok(WorldArchetype::Frontier),
        other => Err(format!(
            "unknown archetype '{}', expected standard|maritime|frontier",
            other
        )),
    }
}

fn load_content(path: Option<&PathBuf>) -> Result<ContentTables, ExitCode> {
    match path {
        None => Ok(ContentTables::default()),
        Some(path) => {
            let source = fs::read_to_string(path).map_err(|e| {
                eprintln!("error: cannot read content tables: {}", e);
                ExitCode::from(EXIT_BAD_CONTENT)
            })?;
            ContentTables::from_toml_str(&source).map_err(|e| {
                eprintln!("error: {}", e);
                ExitCode::from(EXIT_BAD_CONTENT)
            })
        }
    }
}

fn exit_for(err: &SimError) -> ExitCode {
    match err {
        SimError::ContentTable(_) => ExitCode::from(EXIT_BAD_CONTENT),
        _ => ExitCode::from(EXIT_BAD_SNAPSHOT),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match args.command {
        Command::New {
            seed,
            archetype,
            content,
        } => {
            let archetype = match parse_archetype(&archetype) {
                Ok(a) => a,
                Err(message) => {
                    eprintln!("error: {}", message);
                    return ExitCode::from(EXIT_BAD_CONTENT);
                }
            };
            let tables = match load_content(content.as_ref()) {
                Ok(t) => t,
                Err(code) => return code,
            };
            let sim = match Simulation::with_content(&seed, archetype, tables) {
                Ok(sim) => sim,
                Err(e) => {
                    eprintln!("error: {}", e);
                    return exit_for(&e);
                }
            };
            match sim.snapshot() {
                Ok(bytes) => {
                    println!("{}", String::from_utf8_lossy(&bytes));
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("error: {}", e);
                    exit_for(&e)
                }
            }
        }
        Command::Run {
            snapshot,
            hours,
            content,
        } => {
            let tables = match load_content(content.as_ref()) {
                Ok(t) => t,
                Err(code) => return code,
            };
            let bytes = match fs::read(&snapshot) {
                Ok(bytes) => bytes,
                Err(e) => {
                    eprintln!("error: cannot read snapshot: {}", e);
                    return ExitCode::from(EXIT_BAD_SNAPSHOT);
                }
            };
            let mut sim = match Simulation::restore_with_content(&bytes, tables) {
                Ok(sim) => sim,
                Err(e) => {
                    eprintln!("error: {}", e);
                    return exit_for(&e);
                }
            };
            let logs = sim.advance(hours);
            match sim.snapshot() {
                Ok(bytes) => {
                    println!("{}", String::from_utf8_lossy(&bytes));
                    for entry in &logs {
                        match entry.to_jsonl() {
                            Ok(line) => println!("{}", line),
                            Err(e) => {
                                eprintln!("error: {}", e);
                                return ExitCode::from(EXIT_BAD_SNAPSHOT);
                            }
                        }
                    }
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("error: {}", e);
                    exit_for(&e)
                }
            }
        }
        Command::Verify { first, second } => {
            let a = match fs::read(&first) {
                Ok(bytes) => bytes,
                Err(e) => {
                    eprintln!("error: cannot read {}: {}", first.display(), e);
                    return ExitCode::from(EXIT_BAD_SNAPSHOT);
                }
            };
            let b = match fs::read(&second) {
                Ok(bytes) => bytes,
                Err(e) => {
                    eprintln!("error: cannot read {}: {}", second.display(), e);
                    return ExitCode::from(EXIT_BAD_SNAPSHOT);
                }
            };
            if a == b {
                println!("snapshots match");
                ExitCode::SUCCESS
            } else {
                println!("snapshots differ");
                ExitCode::from(EXIT_VERIFY_FAILED)
            }
        }
    }
}
