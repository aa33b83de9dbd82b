//! Parse command - decode a saved response without contacting the service.

use std::path::PathBuf;

use kymobutler::export;
use kymobutler::response::{DecodeOptions, ResponseDecoder};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the parse command.
pub struct ParseArgs {
    pub response: PathBuf,
    pub output: Option<PathBuf>,
    /// Skip the pretty-print check before parsing.
    pub lenient: bool,
    pub dense: bool,
}

/// Run the parse command.
pub fn run(args: ParseArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("parse");

    let body = runner.read_file(&args.response)?;
    let decoder = if args.lenient {
        ResponseDecoder::parse_unchecked(&body)?
    } else {
        ResponseDecoder::parse(&body)?
    };

    let options = DecodeOptions {
        simplify_tracks: !args.dense && runner.config().analysis.simplify_tracks,
    };
    let result = decoder.decode(&options);

    println!("Response: {}", args.response.display());
    println!("  Kymograph: {}", presence(result.has_kymograph()));
    println!("  Overlay: {}", presence(result.has_overlay()));
    println!("  Tracks: {}", result.tracks().len());
    println!();
    runner.report(&result);

    if let Some(dir) = &args.output {
        let files = export::export_result(&result, dir)?;
        println!();
        for path in files.paths() {
            println!("  Saved {}", path.display());
        }
    }

    Ok(())
}

fn presence(present: bool) -> &'static str {
    if present {
        "present"
    } else {
        "absent"
    }
}
