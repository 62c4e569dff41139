//! Store probe entry point.
//!
//! # Responsibility
//! - Verify `flowdiagram_core` linkage and store bootstrap from the shell.
//! - Print deterministic `key=value` lines for quick sanity checks.

use flowdiagram_core::{GatewayRegistry, StoreConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("flowdiagram_core ping={}", flowdiagram_core::ping());
    println!("flowdiagram_core version={}", flowdiagram_core::core_version());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error={message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = StoreConfig::from_env().map_err(|err| err.to_string())?;
    let logging = config.init_logging().map_err(|err| err.to_string())?;
    println!("logging active={logging}");

    let registry = GatewayRegistry::open(&config).map_err(|err| err.to_string())?;
    let counts = registry.table_counts().map_err(|err| err.to_string())?;
    log::info!(
        "event=cli_probe module=cli status=ok diagrams={} blueprints={} workflows={} servers={}",
        counts.diagrams,
        counts.blueprints,
        counts.workflows,
        counts.servers
    );

    let store = config
        .db_path
        .as_ref()
        .map_or_else(|| ":memory:".to_string(), |path| path.display().to_string());
    println!("store={store}");
    println!("diagrams={}", counts.diagrams);
    println!("blueprints={}", counts.blueprints);
    println!("workflows={}", counts.workflows);
    println!("servers={}", counts.servers);
    Ok(())
}
