use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};

use crate::api::Collections;

/// `(argument, env var, default collection id)`
const COLLECTION_ARGS: [(&str, &str, &str); 8] = [
    ("users-collection", "ZAMCARE_USERS_COLLECTION", "users"),
    ("children-collection", "ZAMCARE_CHILDREN_COLLECTION", "children"),
    ("volunteers-collection", "ZAMCARE_VOLUNTEERS_COLLECTION", "volunteers"),
    (
        "opportunities-collection",
        "ZAMCARE_OPPORTUNITIES_COLLECTION",
        "volunteer_opportunities",
    ),
    (
        "child-donations-collection",
        "ZAMCARE_CHILD_DONATIONS_COLLECTION",
        "child_donations",
    ),
    (
        "orphanage-donations-collection",
        "ZAMCARE_ORPHANAGE_DONATIONS_COLLECTION",
        "orphanage_donations",
    ),
    (
        "goods-donations-collection",
        "ZAMCARE_GOODS_DONATIONS_COLLECTION",
        "goods_donations",
    ),
    (
        "volunteer-requests-collection",
        "ZAMCARE_VOLUNTEER_REQUESTS_COLLECTION",
        "volunteer_requests",
    ),
];

/// Collection ids from the parsed arguments.
///
/// # Errors
/// Returns an error if a collection argument is missing.
pub fn parse(matches: &ArgMatches) -> Result<Collections> {
    let get = |index: usize| -> Result<String> {
        let (name, _, _) = COLLECTION_ARGS[index];
        matches
            .get_one::<String>(name)
            .cloned()
            .with_context(|| format!("missing required argument: --{name}"))
    };

    Ok(Collections {
        users: get(0)?,
        children: get(1)?,
        volunteers: get(2)?,
        opportunities: get(3)?,
        child_donations: get(4)?,
        orphanage_donations: get(5)?,
        goods_donations: get(6)?,
        volunteer_requests: get(7)?,
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    COLLECTION_ARGS
        .iter()
        .fold(command, |command, (name, env, default)| {
            command.arg(
                Arg::new(*name)
                    .long(*name)
                    .help(format!("Collection id (default: {default})"))
                    .env(*env)
                    .default_value(*default),
            )
        })
}
