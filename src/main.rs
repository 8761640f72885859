//! copyrouter - marketing-copy gateway over multiple AI text providers
//!
//! Serves content-generation requests by trying configured providers in
//! priority order and falling back to local copy when none answers.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use copyrouter::config::{Config, KeySource};
use copyrouter::router::Router;

#[derive(Parser)]
#[command(name = "copyrouter")]
#[command(about = "Marketing-copy gateway that routes generation requests across AI providers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.toml", env = "COPYROUTER_CONFIG")]
        config: String,

        /// Override listen address
        #[arg(short, long, env = "COPYROUTER_LISTEN")]
        listen: Option<String>,
    },

    /// Validate configuration file
    Check {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.toml", env = "COPYROUTER_CONFIG")]
        config: String,
    },

    /// Show configured providers in the order they are tried
    Providers {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.toml", env = "COPYROUTER_CONFIG")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "copyrouter=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, listen } => {
            tracing::info!(config = %config, "Loading configuration");
            let (mut loaded, key_sources) = Config::from_file_with_env(&config)?;
            log_key_sources(&key_sources);

            if let Some(addr) = listen {
                tracing::info!(listen = %addr, "Override listen address");
                loaded.server.listen = addr;
            }

            copyrouter::proxy::run_server(loaded).await
        }

        Commands::Check { config } => {
            let (loaded, key_sources) = Config::from_file_with_env(&config)?;
            println!("Configuration OK: {}", config);
            println!("  listen:     {}", loaded.server.listen);
            println!("  timeout_ms: {}", loaded.routing.timeout_ms);
            for (name, source) in &key_sources {
                match loaded.providers.iter().find(|p| &p.name == name) {
                    Some(p) => println!(
                        "  {:<16} {:<10} model {:<24} key: {}",
                        name, p.kind, p.model, source
                    ),
                    None => println!("  {:<16} key: {}", name, source),
                }
            }
            Ok(())
        }

        Commands::Providers { config } => {
            let (loaded, _) = Config::from_file_with_env(&config)?;
            let router = Router::from_config(&loaded, &reqwest::Client::new());

            if router.providers().is_empty() {
                println!("No providers configured; every prompt uses local fallback copy.");
                return Ok(());
            }

            for (i, provider) in router.providers().iter().enumerate() {
                let usable = if provider.has_credential() {
                    "ready"
                } else {
                    "no credential (skipped)"
                };
                println!(
                    "{:>2}. {:<16} timeout {:>6} ms  {}",
                    i + 1,
                    provider.name(),
                    provider.timeout().as_millis(),
                    usable
                );
            }
            Ok(())
        }
    }
}

fn log_key_sources(key_sources: &[(String, KeySource)]) {
    for (name, source) in key_sources {
        if *source == KeySource::None {
            tracing::warn!(provider = %name, "No API key resolved; provider will be skipped");
        } else {
            tracing::info!(provider = %name, source = %source, "API key resolved");
        }
    }
}
