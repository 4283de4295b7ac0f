use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Args;
use serde_json::json;

use crate::cli::{utils, OutputFormat};
use crate::config::AppConfig;
use crate::services::{NarrativeGenerator, VertexNarrativeGenerator};
use crate::state::{http_client, GoogleServices};

#[derive(Debug, Args)]
pub struct RefineArgs {
    #[arg(help = "Raw artisan text", conflicts_with = "file", required_unless_present = "file")]
    pub text: Option<String>,

    #[arg(long, help = "Read the raw artisan text from a file")]
    pub file: Option<PathBuf>,
}

impl RefineArgs {
    fn raw_text(self) -> anyhow::Result<String> {
        match (self.text, self.file) {
            (Some(text), _) => Ok(text),
            (None, Some(path)) => std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display())),
            (None, None) => bail!("provide raw text or --file"),
        }
    }
}

pub async fn refine(config: &AppConfig, args: RefineArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let raw_text = args.raw_text()?;
    if raw_text.trim().is_empty() {
        bail!("raw text is empty");
    }

    let http = http_client()?;
    let google = GoogleServices::init(&config.google, http.clone())?;
    let narrator = VertexNarrativeGenerator::from_config(
        &config.google,
        google.vertex_project,
        http,
        Arc::clone(&google.tokens),
    );

    let story = narrator.generate(&raw_text).await?;

    match output_format {
        OutputFormat::Json => utils::output_success(
            &output_format,
            "Story generated",
            Some(json!({ "original_text": raw_text, "refined_story": story })),
        ),
        OutputFormat::Text => {
            println!("{}", story);
            Ok(())
        }
    }
}
