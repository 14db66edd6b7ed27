use anyhow::Result;
use std::process::ExitCode;
use tracing::info;

use rfcsuite_checker::config::ConfigManager;
use rfcsuite_checker::report::ValidationReport;

fn main() -> Result<ExitCode> {
    let config = ConfigManager::from_cli_and_env()?;
    config.validate()?;
    config.init_logging()?;

    let loaded = config.load_suites();
    info!("Checking {} suite file(s)", loaded.len());

    let report = ValidationReport::from_loaded(loaded);
    if config.app.json_output {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.render_text());
    }

    Ok(ExitCode::from(report.exit_code()))
}
