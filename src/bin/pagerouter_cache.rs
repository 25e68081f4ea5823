use pagerouter::cli::run_cli;
use pagerouter::logging::{init_logging_with_config, LogConfig};

fn main() -> anyhow::Result<()> {
    // Reports go to stdout; keep logs quiet unless asked for.
    let mut config = LogConfig::from_env();
    if std::env::var("PAGEROUTER_LOG_LEVEL").is_err() {
        config.log_level = "warn".to_string();
    }
    init_logging_with_config(&config)?;
    run_cli()
}
