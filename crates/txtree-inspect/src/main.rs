//! Command-line inspector for tree archives.

mod report;

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use txtree::{Coordinate, GeoPoint, Surface, Tile};

use crate::report::{DEFAULT_PRECISION, InfoReport, TileReport, TileSummary};

#[derive(Parser)]
#[command(about = "Inspect TX10 tree archives")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,

    /// Decimal places for printed coordinates.
    #[arg(long, global = true, default_value_t = DEFAULT_PRECISION)]
    precision: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Print the header and tree statistics.
    Info {
        /// Path to the archive.
        archive: PathBuf,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Find the tile covering a coordinate.
    Find {
        /// Path to the archive.
        archive: PathBuf,

        #[command(flatten)]
        location: Location,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Write the decompressed payload of the tile covering a coordinate.
    Extract {
        /// Path to the archive.
        archive: PathBuf,

        #[command(flatten)]
        location: Location,

        /// Output file.
        #[arg(long, short)]
        out: PathBuf,
    },
}

#[derive(clap::Args)]
struct Location {
    /// Longitude in degrees, east positive.
    #[arg(long, allow_negative_numbers = true)]
    lon: f64,

    /// Latitude in degrees, north positive.
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,

    /// Deepest level to descend to. Without it the deepest available tile is
    /// returned.
    #[arg(long)]
    level: Option<u32>,
}

impl Location {
    fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lon, self.lat)
    }

    fn find<'a>(&self, surface: &'a Surface) -> Result<Tile<'a>, String> {
        let point = GeoPoint::from(self.coordinate());
        surface
            .find_tile(point, self.level)
            .ok_or_else(|| format!("no tile covers {}", self.coordinate()))
    }
}

fn main() -> ExitCode {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();
    match run(args.command, args.precision) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, precision: usize) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Info { archive, json } => {
            let surface = open(&archive)?;
            let stats = surface.stats();
            let header = surface.archive().header();
            if json {
                let report = InfoReport::new(header, &stats);
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", InfoReport::new(header, &stats));
            }
        }
        Command::Find {
            archive,
            location,
            json,
        } => {
            let surface = open(&archive)?;
            let tile = location.find(&surface)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&TileSummary::new(&tile))?);
            } else {
                print!("{:.precision$}", TileReport(tile));
            }
        }
        Command::Extract {
            archive,
            location,
            out,
        } => {
            let surface = open(&archive)?;
            let tile = location.find(&surface)?;
            let payload = tile.fetch_payload()?;
            std::fs::write(&out, &payload)?;
            tracing::info!(
                "Wrote {} bytes from level {} tile {} to {}",
                payload.len(),
                tile.level(),
                tile.toc_index(),
                out.display()
            );
        }
    }
    Ok(())
}

fn open(path: &Path) -> txtree::Result<Surface> {
    tracing::debug!("Loading {}", path.display());
    Surface::open(path)
}
