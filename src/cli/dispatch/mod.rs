//! Map parsed CLI arguments to the action the binary runs.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{appwrite, collections, web, ARG_PORT};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let appwrite_opts = appwrite::Options::parse(matches)?;
    let web_opts = web::Options::parse(matches)?;
    let collections = collections::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        appwrite_endpoint: appwrite_opts.endpoint,
        appwrite_project: appwrite_opts.project_id,
        appwrite_api_key: appwrite_opts.api_key,
        database_id: appwrite_opts.database_id,
        bucket_id: appwrite_opts.bucket_id,
        request_timeout_seconds: appwrite_opts.request_timeout_seconds,
        collections,
        frontend_base_url: web_opts.frontend_base_url,
        payment_link: web_opts.payment_link,
        session_ttl_seconds: web_opts.session_ttl_seconds,
    }))
}
