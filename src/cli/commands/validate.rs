//! Validate configuration command.

use anyhow::Result;
use pairs_config::{render_config, validate_config, AppConfig};
use pairs_indicators::ZScoreMethod;
use std::path::Path;
use tracing::{debug, warn};

pub fn run(config_path: &Path, config: &AppConfig) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);
    if !config_path.exists() {
        println!("File not found, checking built-in defaults");
    }

    let warnings = match validate_config(config) {
        Ok(warnings) => warnings,
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!("Data dir: {}", config.data.dir.display());
    println!(
        "Kalman: Q={} R={} x0={} P0={}",
        config.kalman.filter.process_noise,
        config.kalman.filter.measurement_noise,
        config.kalman.initial_estimate,
        config.kalman.initial_covariance
    );
    match config.zscore {
        ZScoreMethod::FullSample => println!("Z-score: full sample"),
        ZScoreMethod::Rolling { window } => println!("Z-score: rolling {} bars", window),
    }
    println!(
        "Signals: entry |z| > {}, exit |z| < {}",
        config.signals.entry_z, config.signals.exit_z
    );
    println!(
        "Backtest: cash {} commission {} borrow {}",
        config.backtest.initial_cash, config.backtest.commission_rate, config.backtest.borrow_rate
    );
    for pair in &config.pairs {
        println!("Pair: {}", pair.label());
    }

    for warning in &warnings {
        warn!("{}", warning);
        println!("Warning: {}", warning);
    }

    debug!("Effective configuration:\n{}", render_config(config)?);
    Ok(())
}
