use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_ENDPOINT: &str = "appwrite-endpoint";
pub const ARG_PROJECT: &str = "appwrite-project";
pub const ARG_API_KEY: &str = "appwrite-api-key";
pub const ARG_DATABASE_ID: &str = "database-id";
pub const ARG_BUCKET_ID: &str = "bucket-id";
pub const ARG_REQUEST_TIMEOUT: &str = "request-timeout-seconds";

#[derive(Debug)]
pub struct Options {
    pub endpoint: String,
    pub project_id: String,
    pub api_key: SecretString,
    pub database_id: String,
    pub bucket_id: String,
    pub request_timeout_seconds: u64,
}

impl Options {
    /// # Errors
    /// Returns an error if a required backend argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let required = |name: &str| -> Result<String> {
            matches
                .get_one::<String>(name)
                .cloned()
                .with_context(|| format!("missing required argument: --{name}"))
        };

        Ok(Self {
            endpoint: required(ARG_ENDPOINT)?,
            project_id: required(ARG_PROJECT)?,
            api_key: SecretString::from(required(ARG_API_KEY)?),
            database_id: required(ARG_DATABASE_ID)?,
            bucket_id: required(ARG_BUCKET_ID)?,
            request_timeout_seconds: matches
                .get_one::<u64>(ARG_REQUEST_TIMEOUT)
                .copied()
                .unwrap_or(10),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ENDPOINT)
                .long(ARG_ENDPOINT)
                .help("Backend API endpoint, example: https://cloud.appwrite.io/v1")
                .env("ZAMCARE_APPWRITE_ENDPOINT")
                .default_value("https://cloud.appwrite.io/v1"),
        )
        .arg(
            Arg::new(ARG_PROJECT)
                .long(ARG_PROJECT)
                .help("Backend project id")
                .env("ZAMCARE_APPWRITE_PROJECT")
                .required(true),
        )
        .arg(
            Arg::new(ARG_API_KEY)
                .long(ARG_API_KEY)
                .help("Backend server API key")
                .env("ZAMCARE_APPWRITE_API_KEY")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_DATABASE_ID)
                .long(ARG_DATABASE_ID)
                .help("Document database id")
                .env("ZAMCARE_DATABASE_ID")
                .required(true),
        )
        .arg(
            Arg::new(ARG_BUCKET_ID)
                .long(ARG_BUCKET_ID)
                .help("Storage bucket for uploaded photos")
                .env("ZAMCARE_BUCKET_ID")
                .default_value("photos"),
        )
        .arg(
            Arg::new(ARG_REQUEST_TIMEOUT)
                .long(ARG_REQUEST_TIMEOUT)
                .help("Timeout in seconds for every backend call")
                .env("ZAMCARE_REQUEST_TIMEOUT_SECONDS")
                .default_value("10")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}
