//! commerce-mesh server
//!
//! ```sh
//! # Run with default config (~/.config/commerce-mesh/config.toml)
//! commerce-mesh
//!
//! # Custom config path and port
//! commerce-mesh --config /etc/commerce-mesh/config.toml --port 9090
//!
//! # Validate config without starting
//! commerce-mesh --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use commerce_mesh::config::{default_config_path, AppConfig, CONFIG_ENV};
use commerce_mesh::server::{init_tracing, run};

#[derive(Parser, Debug)]
#[command(
    name = "commerce-mesh",
    version,
    about = "Resilient aggregation layer for the commerce backend",
    long_about = "Serves carts, payments and shipments, enriching each with data \
                  owned by peer services through circuit breakers, retries and \
                  bulkheads.\n\n\
                  Default config: ~/.config/commerce-mesh/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(default_config_path);

    let loaded = AppConfig::load(&config_path);
    if cli.check {
        return match loaded {
            Ok(config) => {
                println!("Configuration is valid");
                println!("   Config file : {}", config_path.display());
                println!("   Address     : {}", config.address());
                println!("   Log level   : {}", config.logging.level);
                for (name, dep) in &config.dependencies {
                    println!("   {:<12}: {}", name, dep.base_url);
                }
                Ok(())
            }
            Err(e) => Err(e.into()),
        };
    }

    let mut config = match loaded {
        Ok(mut cfg) => {
            if let Some(ref level) = cli.log_level {
                cfg.logging.level = level.clone();
            }
            init_tracing(&cfg);
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            let mut cfg = AppConfig::default().with_default_dependencies();
            if let Some(ref level) = cli.log_level {
                cfg.logging.level = level.clone();
            }
            init_tracing(&cfg);
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
            cfg
        }
    };

    if let Some(port) = cli.port {
        info!("CLI override: port = {}", port);
        config.server.port = port;
    }

    run(config).await?;
    Ok(())
}
