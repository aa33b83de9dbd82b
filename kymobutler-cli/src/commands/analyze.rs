//! Analyze command - submit a kymograph and export the detected tracks.

use std::path::PathBuf;

use kymobutler::export;
use tracing::info;

use super::common::{resolve_request, DetectionArgs, ServiceArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the analyze command.
pub struct AnalyzeArgs {
    pub image: PathBuf,
    pub output: PathBuf,
    pub service: ServiceArgs,
    pub detection: DetectionArgs,
    /// Keep tracks dense instead of reducing them to slope breakpoints.
    pub dense: bool,
    pub debug: bool,
}

/// Run the analyze command.
pub async fn run(args: AnalyzeArgs) -> Result<(), CliError> {
    let runner = CliRunner::with_debug(args.debug)?;
    runner.log_startup("analyze");
    args.service.validate()?;

    let image = runner.read_file(&args.image)?;
    let file_name = args
        .image
        .file_name()
        .map(|name| name.to_string_lossy().to_string());
    let request = resolve_request(image, file_name, &args.detection, runner.config())?;

    let client = runner.create_client(|config| {
        let config = args.service.apply(config);
        if args.dense {
            config.with_simplify_tracks(false)
        } else {
            config
        }
    })?;

    println!("Analysing {}", args.image.display());
    println!(
        "  Threshold: {}, minimum size: {}, minimum frames: {}",
        request.threshold(),
        request.minimum_size(),
        request.minimum_frames()
    );
    println!();

    let cancel = runner.cancellation_on_ctrl_c();
    let body = client.submit_analysis(&request, &cancel).await?;
    let result = client.decode(&body)?;

    runner.report(&result);

    let files = export::export_result(&result, &args.output)?;
    info!(tracks = result.tracks().len(), "Analysis exported");

    println!();
    println!("Tracks found: {}", result.tracks().len());
    for path in files.paths() {
        println!("  Saved {}", path.display());
    }

    Ok(())
}
