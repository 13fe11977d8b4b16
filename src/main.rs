use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vesper_gateway::Config;
use vesper_gateway::api::ApiServer;
use vesper_gateway::nlu::IntentModel;

/// Vesper - session gateway for voice assistant clients
#[derive(Parser)]
#[command(name = "vesper", version, about)]
struct Cli {
    /// Port for the event channel
    #[arg(long, env = "VESPER_PORT")]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Validate the intent model artifact
    CheckModel {
        /// Artifact path (defaults to the configured model path)
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,vesper_gateway=info",
        1 => "info,vesper_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load();
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    if let Some(Command::CheckModel { path }) = cli.command {
        return check_model(path.unwrap_or_else(|| config.model_path.clone())).await;
    }

    tracing::info!(
        port = config.server.port,
        language = %config.language.tag,
        stt = config.speech.stt_enabled,
        stt_provider = %config.speech.stt_provider,
        tts = config.speech.tts_enabled,
        "starting vesper gateway"
    );

    ApiServer::new(&config).run().await?;

    Ok(())
}

/// Validate that the intent model artifact loads
async fn check_model(path: PathBuf) -> anyhow::Result<()> {
    println!("Checking intent model at {}...", path.display());
    let model = IntentModel::load(&path).await?;
    println!("OK: {} intents", model.len());
    Ok(())
}
