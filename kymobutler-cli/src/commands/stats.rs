//! Stats command - show the service's usage statistics.

use super::common::ServiceArgs;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the stats command.
pub async fn run(service: ServiceArgs, debug: bool) -> Result<(), CliError> {
    let runner = CliRunner::with_debug(debug)?;
    runner.log_startup("stats");
    service.validate()?;

    let client = runner.create_client(|config| service.apply(config))?;
    let cancel = runner.cancellation_on_ctrl_c();

    let body = client.request_statistics(&cancel).await?;
    let result = client.decode(&body)?;

    runner.report(&result);
    Ok(())
}
