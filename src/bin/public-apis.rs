use std::path::Path;

use anyhow::{anyhow, Result};
use clap::Parser;
use public_apis_client::config::loader;
use public_apis_client::config::settings::{ClientConfig, DEFAULT_SCHEME};
use public_apis_client::config::validator;
use public_apis_client::observability::metrics::get_metrics;
use public_apis_client::utils::logging::{self, LogLevel};
use public_apis_client::ApiClient;
use tokio_stream::StreamExt;
use tracing::{info, warn};

const DEFAULT_HOST: &str = "public-apis-api.herokuapp.com";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "public-apis.yaml")]
    config: String,
    /// overrides the configured host
    #[arg(long, env = "PUBLIC_APIS_HOST")]
    host: Option<String>,
    /// overrides the configured scheme
    #[arg(long)]
    scheme: Option<String>,
    /// stream a single category instead of all of them
    #[arg(long)]
    category: Option<String>,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// print prometheus metrics to stderr before exiting
    #[arg(long)]
    print_metrics: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // -------------------------------
    // 1. Load YAML config, fall back to defaults
    // -------------------------------

    let startup_logging = logging::startup(args.log_level);
    let config_path = Path::new(&args.config);
    if !config_path.exists() {
        warn!("config {} not found, using defaults", args.config);
    }
    let mut client_config = if config_path.exists() {
        loader::file_to_config(config_path).await?
    } else {
        ClientConfig::new(DEFAULT_SCHEME, DEFAULT_HOST)
    };
    if let Some(host) = &args.host {
        client_config.host = host.to_owned();
    }
    if let Some(scheme) = &args.scheme {
        client_config.scheme = scheme.to_owned();
    }
    validator::validate(&client_config)
        .map_err(|errors| anyhow!("invalid config: {}", errors.join("; ")))?;

    drop(startup_logging);
    logging::run(&client_config.logging, args.log_level);

    // -------------------------------
    // 2. Stream entries
    // -------------------------------

    let client = ApiClient::new(client_config)?;
    let mut stream = match &args.category {
        Some(category) => client.get_entries(category),
        None => client.get_apis(),
    };

    let mut total = 0usize;
    let mut outcome: Result<()> = Ok(());
    while let Some(item) = stream.next().await {
        match item {
            Ok(entries) => {
                total += entries.len();
                for entry in entries {
                    println!("{}", entry);
                }
            }
            Err(e) if e.is_no_more_data() => break,
            Err(e) => {
                outcome = Err(anyhow!(e));
                break;
            }
        }
    }
    info!("received {} entries", total);

    // -------------------------------
    // 3. Metrics
    // -------------------------------

    if args.print_metrics {
        eprintln!("{}", get_metrics().await.render()?);
    }

    outcome?;
    println!("Safely exited");
    Ok(())
}
