use clap::Parser;
use artenact_api::cli::{utils, Cli, OutputFormat};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    artenact_api::server::init_tracing();

    let cli = Cli::parse();
    let output_format = OutputFormat::from_cli(&cli);

    if let Err(e) = artenact_api::cli::run(cli).await {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => utils::output_error(&output_format, &format!("{e:?}")),
            _ => utils::output_error(&output_format, &format!("{e:#}")),
        }
        std::process::exit(1);
    }
}
