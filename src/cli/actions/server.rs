use crate::api::{self, AppState, Collections, WebConfig};
use crate::appwrite::{Appwrite, AppwriteConfig};
use anyhow::{Context, Result};
use secrecy::SecretString;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub appwrite_endpoint: String,
    pub appwrite_project: String,
    pub appwrite_api_key: SecretString,
    pub database_id: String,
    pub bucket_id: String,
    pub request_timeout_seconds: u64,
    pub collections: Collections,
    pub frontend_base_url: String,
    pub payment_link: Option<String>,
    pub session_ttl_seconds: i64,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the backend client cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let appwrite_config = AppwriteConfig::new(
        args.appwrite_endpoint,
        args.appwrite_project,
        args.appwrite_api_key,
    )
    .with_timeout_seconds(args.request_timeout_seconds);

    debug!("Backend config: {:?}", appwrite_config);

    let appwrite = Appwrite::new(appwrite_config).context("Failed to build backend client")?;

    let web_config = WebConfig::new(args.frontend_base_url)
        .with_payment_link(args.payment_link)
        .with_session_ttl_seconds(args.session_ttl_seconds);

    let state = AppState::new(
        appwrite,
        args.database_id,
        args.bucket_id,
        args.collections,
        web_config,
    );

    api::new(args.port, state).await
}
