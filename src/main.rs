use clap::{ArgAction, Parser, Subcommand};
use rmcp::{transport::stdio, ServiceExt};
use std::process::ExitCode;

use profilebridge::client::{HttpProfileService, ProfileClient};
use profilebridge::config::BridgeConfig;
use profilebridge::error::classify;
use profilebridge::logging::{init_logging, LogLevel};
use profilebridge::mcp::BridgeMcpServer;
use profilebridge::report;

#[derive(Parser, Debug)]
#[command(name = "profilebridge")]
#[command(version)]
#[command(about = "MCP bridge for batched browser-profile lifecycle management")]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(long, short, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(long, short, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the MCP server on stdio (the default)
    Serve,
    /// Probe the profile service once and report the classified result
    Check,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        LogLevel::Quiet
    } else {
        LogLevel::from_verbosity(cli.verbose)
    };
    // Logs go to stderr only: stdout is reserved for the MCP protocol.
    init_logging(level);

    let config = match BridgeConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            return Ok(ExitCode::from(2));
        }
    };

    let service = match HttpProfileService::new(&config) {
        Ok(service) => service,
        Err(e) => {
            eprintln!("failed to initialize HTTP client: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };
    let client = ProfileClient::with_config(service, &config);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            tracing::info!(api_url = %config.api_url, "starting MCP server");
            let server = BridgeMcpServer::new(client);

            let service = server.serve(stdio()).await.map_err(|e| {
                tracing::error!("error starting MCP server: {}", e);
                e
            })?;
            service.waiting().await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check => match client.health_check().await {
            Ok(()) => {
                println!("profile service at {} is reachable", config.api_url);
                Ok(ExitCode::SUCCESS)
            }
            Err(signal) => {
                let classification = classify(&signal);
                println!("{}", report::render_classification(&classification, &signal));
                Ok(ExitCode::FAILURE)
            }
        },
    }
}
