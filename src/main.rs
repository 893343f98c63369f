mod config;
mod predict;
mod time;
mod tracker;

use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::predict::{
    GroundStation, PassGeometry, PredictError, Sgp4Engine, StateField, TleLoader,
};
use crate::tracker::{Satellite, Settings};

#[derive(Parser)]
#[command(name = "sat-passes")]
#[command(about = "Satellite pass prediction and ground tracks")]
struct Cli {
    /// Station and TLE configuration
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the next pass of a satellite
    NextPass {
        satellite: String,
        /// Search from this time (RFC3339) instead of now
        #[arg(long)]
        at: Option<String>,
    },
    /// List today's passes
    Passes { satellite: String },
    /// Sample the ground track of the current revolution
    Orbit { satellite: String },
    /// Show the next AOS or LOS
    Event { satellite: String },
    /// Read one field of the live state, e.g. elevation or next_aos
    Get { satellite: String, field: String },
    /// Tick the tracker repeatedly
    Track {
        satellite: String,
        #[arg(long, default_value_t = 10)]
        ticks: u32,
        #[arg(long, default_value = "1s")]
        interval: String,
        /// Advance a simulated clock instead of sleeping
        #[arg(long)]
        simulate: bool,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Predict(#[from] PredictError),
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("invalid time: {0}")]
    Time(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

struct Session {
    station: GroundStation,
    settings: Settings,
    satellite: Satellite<Sgp4Engine>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::NextPass { satellite, at } => next_pass(&cli, satellite, at.as_deref()),
        Commands::Passes { satellite } => passes(&cli, satellite),
        Commands::Orbit { satellite } => orbit(&cli, satellite),
        Commands::Event { satellite } => event(&cli, satellite),
        Commands::Get { satellite, field } => get(&cli, satellite, field),
        Commands::Track {
            satellite,
            ticks,
            interval,
            simulate,
        } => track(&cli, satellite, *ticks, interval, *simulate),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn open(cli: &Cli, query: &str) -> Result<Session, CliError> {
    let config = Config::from_file(&cli.config)?;
    let station = config.station.ground_station()?;

    let mut loader = TleLoader::new(config.tle.path.clone());
    loader.load_all()?;
    let entry = loader.find(query)?;

    let satellite = Satellite::new(
        entry.engine(config.engine)?,
        entry.engine(config.engine)?,
        entry.engine(config.engine)?,
        &station,
    );
    log::info!(
        "Tracking {} ({}) from {}",
        satellite.name(),
        satellite.catalog_number(),
        config.station.name.as_deref().unwrap_or(&config.station.coordinates)
    );

    Ok(Session {
        station,
        settings: config.settings,
        satellite,
    })
}

fn next_pass(cli: &Cli, query: &str, at: Option<&str>) -> Result<(), CliError> {
    let mut session = open(cli, query)?;
    let pass = match at {
        Some(at) => {
            let time = parse_time(at)?;
            session.satellite.pass_for_time(&session.station, time)?
        }
        None => session
            .satellite
            .get_next_pass(&session.station, Utc::now())?,
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(pass.as_ref())?);
    } else if pass.is_empty() {
        println!("{}: no pass found", session.satellite.name());
    } else {
        println!("{}", pass_summary(&pass));
        for sample in &pass.samples {
            println!(
                "  {}  el {:6.2}  az {:6.2}  range {:8.1} km  doppler {:+8.0} Hz",
                sample.timestamp.format("%H:%M:%S"),
                sample.elevation_deg,
                sample.azimuth_deg,
                sample.range_km,
                sample.doppler_shift_hz
            );
        }
    }
    Ok(())
}

fn passes(cli: &Cli, query: &str) -> Result<(), CliError> {
    let mut session = open(cli, query)?;
    let passes = session
        .satellite
        .calculate_todays_passes(&session.station, Utc::now())?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(passes)?);
    } else if passes.is_empty() {
        println!("No passes today");
    } else {
        for pass in passes {
            println!("{}", pass_summary(pass));
        }
    }
    Ok(())
}

fn orbit(cli: &Cli, query: &str) -> Result<(), CliError> {
    let mut session = open(cli, query)?;
    if let Err(e) = session.satellite.calculate_orbit(&session.station, Utc::now()) {
        log::warn!("Orbit sampling failed: {}", e);
    }
    let track = session.satellite.orbit_track();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(track)?);
    } else {
        for point in track {
            println!(
                "{}  lat {:7.2}  lon {:8.2}  el {:6.2}  orbit {}",
                point.timestamp.format("%H:%M:%S"),
                point.latitude_deg,
                point.longitude_deg,
                point.elevation_deg,
                point.orbit_number
            );
        }
    }
    Ok(())
}

fn event(cli: &Cli, query: &str) -> Result<(), CliError> {
    let mut session = open(cli, query)?;
    // Events are refreshed regardless of the configured setting.
    let settings = Settings {
        calculate_events: true,
        ..session.settings
    };
    session
        .satellite
        .tick(&session.station, Utc::now(), &settings);
    let next = session.satellite.next_event(&settings);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&next)?);
    } else {
        println!("{}", next);
    }
    Ok(())
}

fn get(cli: &Cli, query: &str, field: &str) -> Result<(), CliError> {
    let field = StateField::from_str(field).map_err(|_| CliError::UnknownField(field.into()))?;
    let mut session = open(cli, query)?;
    session
        .satellite
        .tick(&session.station, Utc::now(), &session.settings);

    match session.satellite.get(field) {
        Some(value) if cli.json => println!("{}", serde_json::to_string(&value)?),
        Some(value) => println!("{}", value),
        None => println!("N/A"),
    }
    Ok(())
}

fn track(
    cli: &Cli,
    query: &str,
    ticks: u32,
    interval: &str,
    simulate: bool,
) -> Result<(), CliError> {
    let interval = humantime::parse_duration(interval).map_err(|e| CliError::Time(e.to_string()))?;
    let step = Duration::from_std(interval).map_err(|e| CliError::Time(e.to_string()))?;

    let mut session = open(cli, query)?;
    session.satellite.set_selected(true);
    session.satellite.request_orbit();

    let mut now = Utc::now();
    for _ in 0..ticks {
        session
            .satellite
            .tick(&session.station, now, &session.settings);

        let sat = &session.satellite;
        if cli.json {
            println!("{}", serde_json::to_string(&sat.current())?);
        } else if let Some(state) = sat.current() {
            println!(
                "{}  el {:6.2}  az {:6.2}  range {:8.1} km  {}",
                now.format("%H:%M:%S"),
                state.elevation_deg,
                state.azimuth_deg,
                state.range_km,
                sat.next_event(&session.settings)
            );
        }

        if simulate {
            now += step;
        } else {
            std::thread::sleep(interval);
            now = Utc::now();
        }
    }

    if let Some(pass) = session.satellite.next_pass() {
        if !pass.is_empty() {
            println!("Next pass: {}", pass_summary(&pass));
        }
    }
    log::info!(
        "Ground track has {} points",
        session.satellite.orbit_track().len()
    );
    Ok(())
}

fn pass_summary(pass: &PassGeometry) -> String {
    match (pass.aos, pass.los) {
        (Some(aos), Some(los)) => format!(
            "AOS {}  LOS {}  max el {:.1}  orbit {}  ({} s)",
            aos.format("%Y-%m-%d %H:%M:%S"),
            los.format("%H:%M:%S"),
            pass.max_elevation_deg,
            pass.orbit_number,
            pass.duration_seconds()
        ),
        _ => "no pass".to_string(),
    }
}

fn parse_time(s: &str) -> Result<DateTime<Utc>, CliError> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CliError::Time(e.to_string()))
}
