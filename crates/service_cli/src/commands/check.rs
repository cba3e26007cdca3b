//! Check command implementation
//!
//! Resolves the layered configuration and prints the effective values.

use dv01_core::config::{ENV_FIXED_SHOCKS_BP, ENV_LIMIT_PCT, ENV_TICK_VALUE};
use dv01_core::RiskConfig;
use tracing::info;

use crate::config::{build_config, CliOverrides, FileSettings};
use crate::Result;

/// Run the check command
pub fn run(settings: FileSettings, overrides: &CliOverrides) -> Result<()> {
    let config = build_config(settings.risk, overrides)?;
    info!("Configuration is valid");
    print!("{}", describe(&config));
    Ok(())
}

fn describe(config: &RiskConfig) -> String {
    format!(
        "tick_value      = {}\n\
         dv01_limit_pct  = {}\n\
         fixed_shocks_bp = {:?}\n\
         (environment: {}, {}, {})\n",
        config.tick_value,
        config.dv01_limit_pct,
        config.fixed_shocks_bp,
        ENV_TICK_VALUE,
        ENV_LIMIT_PCT,
        ENV_FIXED_SHOCKS_BP
    )
}
