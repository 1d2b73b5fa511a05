//! Tileharvest CLI - Command-line interface
//!
//! Selects a map region, snaps it to whole tiles, downloads the tiles through
//! a tile backend and waits for the backend's world generation task.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};
use tileharvest::coord::GeoPoint;

use commands::common::{parse_point, RegionArgs};
use error::CliError;

#[derive(Parser)]
#[command(name = "tileharvest")]
#[command(version = tileharvest::VERSION)]
#[command(about = "Download tile-aligned map regions for world generation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Snap a region to a square of whole tiles and print its corners
    Snap {
        #[command(flatten)]
        region: RegionArgs,

        /// Zoom level (default from config.ini)
        #[arg(long)]
        zoom: Option<u8>,
    },

    /// List the tiles covering a region
    Grid {
        #[command(flatten)]
        region: RegionArgs,

        /// Zoom level (default from config.ini)
        #[arg(long)]
        zoom: Option<u8>,

        /// Snap the region to whole tiles first, as `download` does
        #[arg(long)]
        snap: bool,

        /// Print each tile's URL for this preset name or template
        #[arg(long)]
        source: Option<String>,
    },

    /// List built-in tile sources
    Sources,

    /// Download a region through the backend and wait for world generation
    Download {
        #[command(flatten)]
        region: RegionArgs,

        /// Zoom level (default from config.ini)
        #[arg(long)]
        zoom: Option<u8>,

        /// Tiles requested concurrently
        #[arg(long)]
        parallel: Option<usize>,

        /// Per-request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Backend base URL
        #[arg(long)]
        server: Option<String>,

        /// Output directory on the backend
        #[arg(long)]
        output: Option<String>,

        /// Tile source preset name or URL template
        #[arg(long)]
        source: Option<String>,

        /// Launch location as lat,lon (default: centre of the snapped square)
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        launch: Option<GeoPoint>,
    },

    /// Query the backend's world generation task
    Status {
        /// Backend base URL
        #[arg(long)]
        server: Option<String>,

        /// Keep polling until the task completes
        #[arg(long)]
        wait: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result: Result<(), CliError> = match cli.command {
        Commands::Snap { region, zoom } => {
            commands::snap::run(commands::snap::SnapArgs { region, zoom })
        }
        Commands::Grid {
            region,
            zoom,
            snap,
            source,
        } => commands::grid::run(commands::grid::GridArgs {
            region,
            zoom,
            snap,
            source,
        }),
        Commands::Sources => {
            commands::sources::run();
            Ok(())
        }
        Commands::Download {
            region,
            zoom,
            parallel,
            timeout,
            server,
            output,
            source,
            launch,
        } => commands::download::run(commands::download::DownloadArgs {
            region,
            zoom,
            parallel,
            timeout,
            server,
            output,
            source,
            launch,
        }),
        Commands::Status { server, wait } => {
            commands::status::run(commands::status::StatusArgs { server, wait })
        }
    };

    if let Err(e) = result {
        e.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_download_args_parse() {
        let cli = Cli::try_parse_from([
            "tileharvest",
            "download",
            "--bbox",
            "-74.1,40.6,-73.9,40.8",
            "--zoom",
            "16",
            "--parallel",
            "8",
            "--launch",
            "40.7,-74.0",
        ])
        .unwrap();

        match cli.command {
            Commands::Download {
                region,
                zoom,
                parallel,
                launch,
                ..
            } => {
                assert_eq!(region.bbox.map(|b| b.west()), Some(-74.1));
                assert_eq!(zoom, Some(16));
                assert_eq!(parallel, Some(8));
                assert_eq!(launch, Some(GeoPoint::new(40.7, -74.0)));
            }
            _ => panic!("expected download command"),
        }
    }

    #[test]
    fn test_region_required() {
        assert!(Cli::try_parse_from(["tileharvest", "snap", "--zoom", "10"]).is_err());
        assert!(Cli::try_parse_from([
            "tileharvest",
            "grid",
            "--point",
            "1,1",
            "--point",
            "1,2",
            "--point",
            "2,2",
        ])
        .is_ok());
    }
}
