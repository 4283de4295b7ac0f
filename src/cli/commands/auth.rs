use serde_json::json;

use crate::auth::{FirebaseVerifier, IdentityVerifier};
use crate::cli::{utils, OutputFormat};
use crate::config::AppConfig;
use crate::state::{http_client, GoogleServices};

pub async fn verify(config: &AppConfig, token: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let http = http_client()?;
    let google = GoogleServices::init(&config.google, http.clone())?;
    let verifier = FirebaseVerifier::new(google.firebase_project, http);

    let identity = verifier.verify(token).await?;

    match output_format {
        OutputFormat::Json => utils::output_success(
            &output_format,
            "Token is valid",
            Some(json!({ "uid": identity.uid, "email": identity.email })),
        ),
        OutputFormat::Text => {
            utils::output_success(&output_format, "Token is valid", None)?;
            utils::output_fields(&[
                ("uid", Some(identity.uid.as_str())),
                ("email", identity.email.as_deref()),
            ]);
            Ok(())
        }
    }
}
