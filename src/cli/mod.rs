pub mod client;
pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "tnet")]
#[command(about = "tnet - command-line client for the tenant networks API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, env = "TNET_URL", default_value = "http://127.0.0.1:8774", help = "API base URL")]
    pub url: String,

    #[arg(long, global = true, env = "TNET_TOKEN", hide_env_values = true, help = "Bearer token")]
    pub token: Option<String>,

    #[arg(long, global = true, help = "Request a specific compute microversion")]
    pub microversion: Option<String>,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Tenant network operations")]
    Networks {
        #[command(subcommand)]
        cmd: commands::networks::NetworksCommands,
    },

    #[command(about = "Mint a development token signed with the configured JWT secret")]
    Token(commands::token::TokenArgs),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Networks { cmd } => {
            let client = client::ApiClient::new(&cli.url, cli.token, cli.microversion)?;
            commands::networks::handle(cmd, &client, output_format).await
        }
        Commands::Token(args) => commands::token::handle(args, output_format),
    }
}
