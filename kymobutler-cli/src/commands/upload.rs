//! Upload command - send corrected tracks back to the service.

use std::path::PathBuf;

use kymobutler::client::AnalysisRequest;
use kymobutler::export;

use super::common::ServiceArgs;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the upload command.
pub struct UploadArgs {
    pub image: PathBuf,
    pub tracks: PathBuf,
    pub service: ServiceArgs,
    pub debug: bool,
}

/// Run the upload command.
pub async fn run(args: UploadArgs) -> Result<(), CliError> {
    let runner = CliRunner::with_debug(args.debug)?;
    runner.log_startup("upload");
    args.service.validate()?;

    let image = runner.read_file(&args.image)?;
    let tracks = export::load_tracks(&args.tracks)?;

    let mut request = AnalysisRequest::new(image);
    if let Some(name) = args.image.file_name() {
        request = request.with_file_name(name.to_string_lossy());
    }

    println!(
        "Uploading {} with {} track(s)",
        args.image.display(),
        tracks.len()
    );

    let client = runner.create_client(|config| args.service.apply(config))?;
    let cancel = runner.cancellation_on_ctrl_c();

    let body = client.submit_correction(&request, &tracks, &cancel).await?;
    let result = client.decode(&body)?;

    runner.report(&result);
    Ok(())
}
