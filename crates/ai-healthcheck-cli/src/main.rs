mod telemetry;

use std::process::ExitCode;
use std::time::Duration;

use ai_healthcheck::{HealthResult, check_chat_endpoint, check_vision_endpoint};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "az-ai-healthcheck",
    about = "Health checks for Azure OpenAI and Azure AI Vision endpoints"
)]
struct Cli {
    /// Per-request timeout in seconds.
    #[arg(
        long,
        global = true,
        env = "AI_HEALTHCHECK_TIMEOUT",
        default_value = "10",
        value_parser = parse_timeout
    )]
    timeout: Duration,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send a one-token chat completion to an Azure OpenAI deployment.
    Openai(OpenAiArgs),
    /// Submit a synthetic PNG to Azure AI Vision for captioning.
    Vision(VisionArgs),
    /// Run the Azure OpenAI check, then the Azure AI Vision check.
    All {
        #[command(flatten)]
        openai: OpenAiArgs,
        #[command(flatten)]
        vision: VisionArgs,
    },
}

#[derive(Args, Debug)]
struct OpenAiArgs {
    #[arg(long, env = "AZURE_OPENAI_ENDPOINT")]
    openai_endpoint: String,
    #[arg(long, env = "AZURE_OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: String,
    #[arg(long, env = "AZURE_OPENAI_API_VERSION")]
    api_version: String,
    #[arg(long, env = "AZURE_OPENAI_DEPLOYMENT")]
    deployment: String,
}

#[derive(Args, Debug)]
struct VisionArgs {
    #[arg(long, env = "AZURE_AI_VISION_ENDPOINT")]
    vision_endpoint: String,
    #[arg(long, env = "AZURE_AI_VISION_API_KEY", hide_env_values = true)]
    vision_api_key: String,
    /// Probe with a 1x1 image instead of the 50x50 minimum-size image.
    #[arg(long)]
    tiny_image: bool,
}

fn parse_timeout(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .parse()
        .map_err(|e| format!("invalid timeout {s:?}: {e}"))?;
    if secs <= 0.0 {
        return Err(format!("timeout must be positive, got {secs}"));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid timeout {s:?}: {e}"))
}

async fn run_openai(args: &OpenAiArgs, timeout: Duration) -> Result<HealthResult> {
    Ok(check_chat_endpoint(
        &args.openai_endpoint,
        &args.openai_api_key,
        &args.api_version,
        &args.deployment,
        timeout,
    )
    .await?)
}

async fn run_vision(args: &VisionArgs, timeout: Duration) -> Result<HealthResult> {
    Ok(check_vision_endpoint(
        &args.vision_endpoint,
        &args.vision_api_key,
        timeout,
        !args.tiny_image,
    )
    .await?)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    telemetry::init();

    let cli = Cli::parse();

    let results = match &cli.command {
        Commands::Openai(args) => vec![run_openai(args, cli.timeout).await?],
        Commands::Vision(args) => vec![run_vision(args, cli.timeout).await?],
        Commands::All { openai, vision } => vec![
            run_openai(openai, cli.timeout).await?,
            run_vision(vision, cli.timeout).await?,
        ],
    };

    for res in &results {
        println!("{}", serde_json::to_string(res)?);
    }

    let healthy = results.iter().all(HealthResult::ok);
    info!(healthy, checks = results.len(), "health checks complete");

    Ok(if healthy {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
