//! pharmalink-locate: resolve and compare pharmacy locations from the terminal.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pharmalink_cli::output::{format_count, format_distance, format_duration, nearby_table, Status};
use pharmalink_cli::spinner;
use pharmalink_core::config::Config;
use pharmalink_core::error::exit_codes;
use pharmalink_core::{Error, ErrorCode};
use pharmalink_geo::{
    candidates_from_rows, centroid, directions_url, extract_coordinates, haversine_distance, nearby,
    place_url, GeoCoordinate, ProximityQuery,
};
use pharmalink_maps::{LocationResolver, Lookup, LookupMiss, MapsConfig};
use pharmalink_telemetry::TelemetryConfig;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "pharmalink-locate")]
#[command(about = "Resolve pharmacy locations and find nearby pharmacies")]
#[command(version)]
struct Cli {
    /// Path to pharmalink.toml
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Emit JSON on stdout
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract coordinates from a full map link (no network)
    Extract {
        /// Google Maps URL
        url: String,
    },

    /// Extract coordinates from a link, expanding short links first
    Resolve {
        /// Google Maps URL or short link
        url: String,
    },

    /// Geocode a free-text address
    Geocode {
        /// Address words, joined with spaces
        #[arg(required = true, num_args = 1..)]
        address: Vec<String>,
    },

    /// Locate a pharmacy profile: map link first, then address
    Locate {
        /// Stored map link
        #[arg(long)]
        map_link: Option<String>,

        /// Stored street address
        #[arg(long)]
        address: Option<String>,
    },

    /// Great-circle distance between two points
    Distance {
        /// First point as lat,lng
        #[arg(value_parser = parse_coordinate, allow_hyphen_values = true)]
        from: GeoCoordinate,

        /// Second point as lat,lng
        #[arg(value_parser = parse_coordinate, allow_hyphen_values = true)]
        to: GeoCoordinate,
    },

    /// List pharmacies within a radius, nearest first
    Nearby {
        /// JSON array of pharmacy rows
        #[arg(long)]
        rows: PathBuf,

        /// Origin as lat,lng (defaults to the configured fallback origin)
        #[arg(long, value_parser = parse_coordinate, allow_hyphen_values = true)]
        origin: Option<GeoCoordinate>,

        /// Radius in km (defaults to the configured radius)
        #[arg(long)]
        radius: Option<f64>,

        /// Show at most this many results
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Map center for a set of pharmacy rows
    Center {
        /// JSON array of pharmacy rows
        #[arg(long)]
        rows: PathBuf,
    },

    /// Google Maps directions link to a destination
    Directions {
        /// Destination as lat,lng
        #[arg(value_parser = parse_coordinate, allow_hyphen_values = true)]
        destination: GeoCoordinate,
    },
}

/// Parse `lat,lng` into a validated coordinate
fn parse_coordinate(input: &str) -> std::result::Result<GeoCoordinate, String> {
    let (lat, lng) = input
        .split_once(',')
        .ok_or_else(|| format!("expected lat,lng but got '{input}'"))?;

    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| format!("invalid latitude '{}'", lat.trim()))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .map_err(|_| format!("invalid longitude '{}'", lng.trim()))?;

    GeoCoordinate::new(lat, lng).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => std::process::exit(report_error(&e, cli.json)),
    };

    let level = if cli.verbose {
        "debug".to_string()
    } else {
        config.schema.logging.level.clone()
    };
    pharmalink_telemetry::init_with_config(
        TelemetryConfig::default()
            .with_log_level(level)
            .with_json(config.schema.logging.json),
    )?;

    let result = run(cli.command, &config, cli.json).await;

    let code = match result {
        Ok(code) => code,
        Err(e) => match e.downcast_ref::<Error>() {
            Some(err) => report_error(err, cli.json),
            None => {
                Status::error(&format!("{e:#}"));
                exit_codes::FAILURE
            }
        },
    };

    if cli.verbose {
        tracing::debug!(metrics = %pharmalink_telemetry::metrics().export_json(), "Run complete");
    }

    std::process::exit(code);
}

async fn run(command: Commands, config: &Config, json: bool) -> Result<i32> {
    match command {
        Commands::Extract { url } => Ok(run_extract(&url, json)),
        Commands::Resolve { url } => {
            let resolver = resolver(config)?;
            let pb = progress("Resolving link...", json);
            let start = Instant::now();
            let lookup = resolver.extract_from_link(&url).await;
            pb.finish_and_clear();
            Ok(print_lookup(&lookup, json, start))
        }
        Commands::Geocode { address } => {
            let resolver = resolver(config)?;
            let pb = progress("Geocoding address...", json);
            let start = Instant::now();
            let lookup = resolver.geocode_address(&address.join(" ")).await;
            pb.finish_and_clear();
            Ok(print_lookup(&lookup, json, start))
        }
        Commands::Locate { map_link, address } => {
            let resolver = resolver(config)?;
            let pb = progress("Locating pharmacy...", json);
            let start = Instant::now();
            let lookup = resolver
                .locate_profile(map_link.as_deref(), address.as_deref())
                .await;
            pb.finish_and_clear();
            Ok(print_lookup(&lookup, json, start))
        }
        Commands::Distance { from, to } => run_distance(&from, &to, json),
        Commands::Nearby {
            rows,
            origin,
            radius,
            limit,
        } => run_nearby(&rows, origin, radius, limit, config, json),
        Commands::Center { rows } => run_center(&rows, json),
        Commands::Directions { destination } => {
            let url = directions_url(&destination);
            if json {
                println!("{}", json!({ "destination": destination, "url": url }));
            } else {
                println!("{url}");
            }
            Ok(exit_codes::SUCCESS)
        }
    }
}

fn resolver(config: &Config) -> Result<LocationResolver> {
    let maps_config = MapsConfig::from_schema(&config.schema);
    LocationResolver::new(maps_config)
        .map_err(Error::from)
        .context("Failed to initialize maps client")
}

fn progress(message: &str, json: bool) -> indicatif::ProgressBar {
    if json {
        indicatif::ProgressBar::hidden()
    } else {
        spinner(message)
    }
}

fn run_extract(url: &str, json: bool) -> i32 {
    match extract_coordinates(url) {
        Some(coordinate) => {
            if json {
                println!("{}", json!({ "found": true, "coordinate": coordinate }));
            } else {
                Status::location("Coordinates", &coordinate);
            }
            exit_codes::SUCCESS
        }
        None => {
            if json {
                println!("{}", json!({ "found": false, "miss": LookupMiss::NoCoordinates }));
            } else {
                Status::warning("No coordinates found in link");
            }
            exit_codes::NOT_FOUND
        }
    }
}

fn print_lookup(lookup: &Lookup, json: bool, start: Instant) -> i32 {
    let elapsed = start.elapsed();
    match lookup {
        Lookup::Found(location) => {
            if json {
                println!("{}", json!({ "found": true, "location": location }));
            } else {
                Status::location(&format!("Location ({})", location.source), &location.coordinate);
                if let Some(address) = &location.formatted_address {
                    Status::info(address);
                }
                println!("   {}", place_url(&location.coordinate, 17));
                tracing::debug!(elapsed = %format_duration(elapsed), "Lookup finished");
            }
            exit_codes::SUCCESS
        }
        Lookup::NotFound(miss) => {
            if json {
                println!("{}", json!({ "found": false, "miss": miss }));
            } else {
                Status::warning(&format!("Location unavailable: {miss}"));
                if *miss == LookupMiss::MissingApiKey {
                    if let Some(suggestion) = Error::api_key_missing().suggestion {
                        Status::info(&suggestion);
                    }
                }
            }
            exit_codes::NOT_FOUND
        }
    }
}

fn run_distance(from: &GeoCoordinate, to: &GeoCoordinate, json: bool) -> Result<i32> {
    let km = haversine_distance(from, to);
    if json {
        println!(
            "{}",
            serde_json::to_string(&json!({ "from": from, "to": to, "distance_km": km }))?
        );
    } else {
        println!("{}", format_distance(km));
    }
    Ok(exit_codes::SUCCESS)
}

fn load_rows(path: &Path) -> Result<Vec<Value>> {
    if !path.exists() {
        return Err(Error::file_not_found(path).into());
    }
    let content = std::fs::read_to_string(path).map_err(Error::from)?;
    let value: Value = serde_json::from_str(&content).map_err(Error::from)?;

    match value {
        Value::Array(rows) => Ok(rows),
        _ => Err(Error::new(ErrorCode::InvalidFormat, "Rows file must contain a JSON array")
            .with_context(path.display().to_string())
            .into()),
    }
}

fn run_nearby(
    rows: &Path,
    origin: Option<GeoCoordinate>,
    radius: Option<f64>,
    limit: Option<usize>,
    config: &Config,
    json: bool,
) -> Result<i32> {
    let rows = load_rows(rows)?;
    let candidates = candidates_from_rows(&rows);

    let proximity = &config.schema.proximity;
    let origin = match origin {
        Some(origin) => origin,
        None => GeoCoordinate::new(
            proximity.fallback_origin.latitude,
            proximity.fallback_origin.longitude,
        )
        .map_err(|e| Error::invalid_config_value("proximity.fallback_origin", e.to_string()))?,
    };
    let radius_km = radius.unwrap_or(proximity.default_radius_km);

    let query = ProximityQuery::new(origin, radius_km, candidates)
        .map_err(|e| Error::invalid_input(e.to_string()))?;
    let mut results = nearby(&query);
    let total = results.len();
    let registry = pharmalink_telemetry::metrics();
    registry.gauge("nearby.candidates", query.candidates().len() as u64);
    registry.gauge("nearby.matches", total as u64);
    if let Some(limit) = limit {
        results.truncate(limit);
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "origin": origin,
                "radius_km": radius_km,
                "count": total,
                "results": results,
            }))?
        );
    } else if results.is_empty() {
        Status::info(&format!("No pharmacies within {}", format_distance(radius_km)));
    } else {
        Status::header(&format!(
            "{} within {}",
            format_count(total, "pharmacy", "pharmacies"),
            format_distance(radius_km)
        ));
        print!("{}", nearby_table(&results));
    }

    Ok(exit_codes::SUCCESS)
}

fn run_center(rows: &Path, json: bool) -> Result<i32> {
    let rows = load_rows(rows)?;
    let candidates = candidates_from_rows(&rows);
    let center = centroid(candidates.iter().filter_map(|c| c.coordinate.as_ref()));

    match center {
        Some(center) => {
            if json {
                println!("{}", json!({ "center": center, "url": place_url(&center, 12) }));
            } else {
                Status::location("Map center", &center);
                println!("   {}", place_url(&center, 12));
            }
            Ok(exit_codes::SUCCESS)
        }
        None => {
            if json {
                println!("{}", json!({ "center": null }));
            } else {
                Status::warning("No located pharmacies in rows file");
            }
            Ok(exit_codes::NOT_FOUND)
        }
    }
}

fn report_error(err: &Error, json: bool) -> i32 {
    if json {
        match serde_json::to_string(&err.to_report()) {
            Ok(report) => println!("{report}"),
            Err(_) => Status::error(&err.to_string()),
        }
    } else {
        Status::error(&err.to_string());
    }
    err.exit_code()
}
