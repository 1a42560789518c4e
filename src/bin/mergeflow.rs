//! mergeflow command-line driver
//!
//! Loads the merge point parameters and arrival schedule, runs the
//! simulation and prints the collected statistics.

use std::path::PathBuf;
use std::process::ExitCode;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use mergeflow::{ArrivalGenerator, ArrivalSchedule, SimError, SystemConfig, TrafficSystem, DEFAULT_SEED};

/// Failures that end the driver with a non-zero exit status.
#[derive(Debug, Error)]
enum DriverError {
    #[error(transparent)]
    Sim(#[from] SimError),

    #[error("Failed to encode statistics as JSON: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Driver configuration
struct Args {
    /// Properties or JSON file with the lane and light parameters
    properties: PathBuf,
    /// Arrival schedule file
    probabilities: PathBuf,
    /// Number of ticks to simulate
    ticks: u64,
    /// Seed for the arrival generator
    seed: u64,
    /// Render the system after every tick
    print: bool,
    /// Emit statistics as JSON
    json: bool,
    /// Log at DEBUG instead of INFO
    verbose: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            properties: PathBuf::from("data/properties.txt"),
            probabilities: PathBuf::from("data/probabilities.txt"),
            ticks: 100,
            seed: DEFAULT_SEED,
            print: false,
            json: false,
            verbose: false,
        }
    }
}

fn value_of<'a>(args: &'a [String], i: usize, flag: &str) -> &'a str {
    args.get(i + 1).map(String::as_str).unwrap_or_else(|| {
        eprintln!("error: {flag} requires a value");
        std::process::exit(1);
    })
}

fn number_of(args: &[String], i: usize, flag: &str) -> u64 {
    let raw = value_of(args, i, flag);
    raw.parse().unwrap_or_else(|_| {
        eprintln!("error: invalid number for {flag}: {raw}");
        std::process::exit(1);
    })
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut config = Args::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--properties" | "-c" => {
                config.properties = PathBuf::from(value_of(&args, i, "--properties"));
                i += 2;
            }
            "--probabilities" | "-a" => {
                config.probabilities = PathBuf::from(value_of(&args, i, "--probabilities"));
                i += 2;
            }
            "--ticks" | "-t" => {
                config.ticks = number_of(&args, i, "--ticks");
                i += 2;
            }
            "--seed" | "-s" => {
                config.seed = number_of(&args, i, "--seed");
                i += 2;
            }
            "--print" | "-p" => {
                config.print = true;
                i += 1;
            }
            "--json" => {
                config.json = true;
                i += 1;
            }
            "--verbose" | "-v" => {
                config.verbose = true;
                i += 1;
            }
            "--help" | "-h" => {
                println!("mergeflow - merge point traffic simulation");
                println!();
                println!("USAGE:");
                println!("    mergeflow [OPTIONS]");
                println!();
                println!("OPTIONS:");
                println!("    -c, --properties <FILE>      Lane and light parameters [default: data/properties.txt]");
                println!("    -a, --probabilities <FILE>   Arrival schedule [default: data/probabilities.txt]");
                println!("    -t, --ticks <N>              Ticks to simulate [default: 100]");
                println!("    -s, --seed <N>               Arrival generator seed [default: 42]");
                println!("    -p, --print                  Print the system after every tick");
                println!("        --json                   Print statistics as JSON");
                println!("    -v, --verbose                Debug logging");
                println!("    -h, --help                   Print help information");
                std::process::exit(0);
            }
            arg => {
                eprintln!("error: unknown argument: {arg}");
                std::process::exit(1);
            }
        }
    }

    config
}

fn to_json<T: Serialize>(value: &T) -> Result<String, DriverError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn run(args: &Args) -> Result<(), DriverError> {
    let config = SystemConfig::load(&args.properties).map_err(SimError::from)?;
    let schedule = ArrivalSchedule::load(&args.probabilities).map_err(SimError::from)?;

    if !args.json {
        println!("{config}");
        println!();
        println!("{schedule}");
        println!();
    }

    let generator = ArrivalGenerator::new(schedule, args.seed);
    let mut system = TrafficSystem::new(config, generator)?;

    info!(ticks = args.ticks, seed = args.seed, "starting simulation");
    for _ in 0..args.ticks {
        system.step()?;
        if args.print {
            println!("{system}");
        }
    }

    let stats = system.statistics();
    info!(
        departed = stats.departed,
        in_system = stats.in_system,
        "simulation finished"
    );

    if args.json {
        println!("{}", to_json(&stats)?);
    } else {
        println!("{stats}");
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = parse_args();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: failed to install logger: {e}");
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn json_encode_failure_is_an_error() {
        // Map keys must serialize as strings.
        let mut unencodable = BTreeMap::new();
        unencodable.insert((1u8, 2u8), 3u8);
        let err = to_json(&unencodable).unwrap_err();
        assert!(matches!(err, DriverError::Encode(_)));
        assert!(err.to_string().contains("encode statistics"));
    }

    #[test]
    fn simulation_errors_pass_through_unchanged() {
        let err: DriverError = SimError::from(mergeflow::ConfigError::ZeroLightPeriod).into();
        assert_eq!(err.to_string(), "Configuration error: Light period must be at least 1");
    }

    #[test]
    fn statistics_encode_to_json() {
        let system = TrafficSystem::new(SystemConfig::default(), mergeflow::ScriptedSource::empty()).unwrap();
        let json = to_json(&system.statistics()).unwrap();
        assert!(json.contains("\"blocked_ticks\": 0"));
    }
}
