use clap::{Parser, Subcommand};
use imgdump::{BatchStatus, Config, DownloadOutcome, server::startup};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "imgdump")]
#[command(about = "Download batches of images concurrently")]
#[command(version = "1.0")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        #[arg(long, help = "Address to bind to", default_value = "0.0.0.0")]
        address: String,
        #[arg(long, default_value_t = 8080)]
        port: u16,
        #[command(flatten)]
        config: Config,
    },
    /// Download the given URLs once and exit
    Fetch {
        #[arg(required = true, help = "Image URLs")]
        urls: Vec<String>,
        #[command(flatten)]
        config: Config,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve {
            address,
            port,
            config,
        }) => {
            startup(config, address, port).await?;
        }

        Some(Commands::Fetch { urls, config }) => {
            let coordinator = config.build_coordinator().await?;
            let result = coordinator.fetch_all(urls).await;

            for outcome in result.outcomes() {
                match outcome {
                    DownloadOutcome::Success {
                        url,
                        artifact,
                        payload,
                        ..
                    } => println!("ok     {} -> {} ({} bytes)", url, artifact, payload.len()),
                    DownloadOutcome::Failure { url, error, .. } => {
                        println!("failed {}: {}", url, error)
                    }
                }
            }

            if result.status() != BatchStatus::AllSucceeded {
                return Err(format!(
                    "{} of {} downloads failed",
                    result.failed(),
                    result.len()
                )
                .into());
            }
        }

        None => {
            println!("Use --help for available commands");
        }
    }

    Ok(())
}

/// `RUST_LOG` directives when present and valid, otherwise `info`.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
