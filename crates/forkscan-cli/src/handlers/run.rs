//! Coordinator command: generate, dispatch, aggregate, print.

use std::sync::Arc;

use forkscan_runtime::{Coordinator, ExecutableLauncher};
use tracing::debug;

use crate::error::CliError;
use crate::parser::Cli;
use crate::presentation::{render_json, render_report};

/// Run the coordinator with workers re-executed from the current binary.
pub async fn execute(cli: &Cli) -> Result<(), CliError> {
    let config = cli.run_config()?;
    let launcher = ExecutableLauncher::current_exe()?;
    debug!(program = %launcher.program().display(), "Worker launcher resolved");

    let timeout = config.timeout;
    let coordinator = Coordinator::new(config, Arc::new(launcher));
    let report = coordinator.run_generated().await?;

    if cli.json {
        let json = render_json(&report).map_err(|e| CliError::Core(e.to_string()))?;
        println!("{json}");
    } else {
        print!("{}", render_report(&report, timeout));
    }
    Ok(())
}
