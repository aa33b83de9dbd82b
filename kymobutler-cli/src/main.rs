//! KymoButler CLI - Command-line interface
//!
//! This binary submits kymographs to a KymoButler analysis service and
//! exports what comes back.

mod commands;
mod error;
mod progress;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::analyze::AnalyzeArgs;
use commands::common::{DetectionArgs, ServiceArgs};
use commands::config::ConfigCommands;
use commands::parse::ParseArgs;
use commands::upload::UploadArgs;

#[derive(Parser)]
#[command(name = "kymobutler")]
#[command(version = kymobutler::VERSION)]
#[command(about = "Detect trajectories on kymographs with the KymoButler service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a kymograph for analysis and export the results
    Analyze {
        /// Kymograph image to analyse
        image: PathBuf,

        /// Directory receiving kymograph.png, overlay.png and tracks.json
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        #[command(flatten)]
        service: ServiceArgs,

        #[command(flatten)]
        detection: DetectionArgs,

        /// Keep one track point per frame
        #[arg(long)]
        dense: bool,

        /// Debug logging, and keep the raw response
        #[arg(long)]
        debug: bool,
    },

    /// Show usage statistics of the service
    Stats {
        #[command(flatten)]
        service: ServiceArgs,

        /// Debug logging, and keep the raw response
        #[arg(long)]
        debug: bool,
    },

    /// Upload corrected tracks for a kymograph
    Upload {
        /// Kymograph image the tracks belong to
        image: PathBuf,

        /// Tracks file, as written by the analyze command
        tracks: PathBuf,

        #[command(flatten)]
        service: ServiceArgs,

        /// Debug logging, and keep the raw response
        #[arg(long)]
        debug: bool,
    },

    /// Decode a saved response without contacting the service
    Parse {
        /// Raw response file
        response: PathBuf,

        /// Export the decoded results to this directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Accept JSON that is not pretty-printed the way the service does it
        #[arg(long)]
        lenient: bool,

        /// Keep one track point per frame
        #[arg(long)]
        dense: bool,
    },

    /// Create the configuration file with default settings
    Init,

    /// View or modify configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            image,
            output,
            service,
            detection,
            dense,
            debug,
        } => {
            commands::analyze::run(AnalyzeArgs {
                image,
                output,
                service,
                detection,
                dense,
                debug,
            })
            .await
        }
        Commands::Stats { service, debug } => commands::stats::run(service, debug).await,
        Commands::Upload {
            image,
            tracks,
            service,
            debug,
        } => {
            commands::upload::run(UploadArgs {
                image,
                tracks,
                service,
                debug,
            })
            .await
        }
        Commands::Parse {
            response,
            output,
            lenient,
            dense,
        } => commands::parse::run(ParseArgs {
            response,
            output,
            lenient,
            dense,
        }),
        Commands::Init => commands::init::run(),
        Commands::Config(command) => commands::config::run(command),
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
    fn test_analyze_arguments() {
        let cli = Cli::try_parse_from([
            "kymobutler",
            "analyze",
            "kymo.png",
            "--output",
            "out",
            "--threshold",
            "0.3",
            "--timeout",
            "30",
        ])
        .unwrap();

        match cli.command {
            Commands::Analyze {
                image,
                output,
                service,
                detection,
                dense,
                ..
            } => {
                assert_eq!(image, PathBuf::from("kymo.png"));
                assert_eq!(output, PathBuf::from("out"));
                assert_eq!(service.timeout, Some(30));
                assert_eq!(detection.threshold, Some(0.3));
                assert!(!dense);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_config_set_arguments() {
        let cli =
            Cli::try_parse_from(["kymobutler", "config", "set", "service.timeout", "60"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config(ConfigCommands::Set { ref key, ref value })
                if key == "service.timeout" && value == "60"
        ));
    }
}
