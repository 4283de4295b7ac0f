pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "artenact")]
#[command(about = "Artenact admin CLI - profile store and story tooling")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create or update the profile table schema")]
    Migrate,

    #[command(about = "Show the stored profile for an identity")]
    Profile {
        #[arg(help = "Firebase uid of the profile owner")]
        uid: String,
    },

    #[command(about = "Generate a story from raw artisan text without saving it")]
    Refine(commands::story::RefineArgs),

    #[command(about = "Verify a Firebase ID token and print the identity it carries")]
    Verify {
        #[arg(help = "Firebase ID token")]
        token: String,
    },
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
    let config = AppConfig::from_env()?;

    match cli.command {
        Commands::Migrate => commands::store::migrate(&config, output_format).await,
        Commands::Profile { uid } => commands::store::show_profile(&config, &uid, output_format).await,
        Commands::Refine(args) => commands::story::refine(&config, args, output_format).await,
        Commands::Verify { token } => commands::auth::verify(&config, &token, output_format).await,
    }
}
