use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};

pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";
pub const ARG_PAYMENT_LINK: &str = "payment-link";
pub const ARG_SESSION_TTL: &str = "session-ttl-seconds";

#[derive(Debug)]
pub struct Options {
    pub frontend_base_url: String,
    pub payment_link: Option<String>,
    pub session_ttl_seconds: i64,
}

impl Options {
    /// # Errors
    /// Returns an error if the frontend base URL is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        Ok(Self {
            frontend_base_url: matches
                .get_one::<String>(ARG_FRONTEND_BASE_URL)
                .cloned()
                .context("missing required argument: --frontend-base-url")?,
            payment_link: matches.get_one::<String>(ARG_PAYMENT_LINK).cloned(),
            session_ttl_seconds: matches
                .get_one::<i64>(ARG_SESSION_TTL)
                .copied()
                .unwrap_or(43_200),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long(ARG_FRONTEND_BASE_URL)
                .help("Frontend base URL used for CORS and recovery links")
                .env("ZAMCARE_FRONTEND_BASE_URL")
                .default_value("http://localhost:8080"),
        )
        .arg(
            Arg::new(ARG_PAYMENT_LINK)
                .long(ARG_PAYMENT_LINK)
                .help("External payment page shown after a monetary donation")
                .env("ZAMCARE_PAYMENT_LINK"),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL)
                .long(ARG_SESSION_TTL)
                .help("Session cookie TTL in seconds")
                .env("ZAMCARE_SESSION_TTL_SECONDS")
                .default_value("43200")
                .value_parser(clap::value_parser!(i64)),
        )
}
