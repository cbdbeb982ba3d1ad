pub mod appwrite;
pub mod collections;
pub mod logging;
pub mod web;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const ARG_PORT: &str = "port";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("zamcare")
        .about("Donor, volunteer and orphanage coordination")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("ZAMCARE_PORT")
                .value_parser(clap::value_parser!(u16)),
        );

    let command = appwrite::with_args(command);
    let command = collections::with_args(command);
    let command = web::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 7] = [
        "zamcare",
        "--appwrite-project",
        "zamcare",
        "--appwrite-api-key",
        "server-key",
        "--database-id",
        "main",
    ];

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "zamcare");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Donor, volunteer and orphanage coordination".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_defaults() {
        temp_env::with_vars(
            [
                ("ZAMCARE_PORT", None::<&str>),
                ("ZAMCARE_BUCKET_ID", None),
                ("ZAMCARE_CHILDREN_COLLECTION", None),
                ("ZAMCARE_FRONTEND_BASE_URL", None),
            ],
            || {
                let matches = new().get_matches_from(REQUIRED);

                assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(8080));
                assert_eq!(
                    matches
                        .get_one::<String>(appwrite::ARG_BUCKET_ID)
                        .map(String::as_str),
                    Some("photos")
                );
                assert_eq!(
                    matches
                        .get_one::<String>("children-collection")
                        .map(String::as_str),
                    Some("children")
                );
                assert_eq!(
                    matches
                        .get_one::<String>(web::ARG_FRONTEND_BASE_URL)
                        .map(String::as_str),
                    Some("http://localhost:8080")
                );
            },
        );
    }

    #[test]
    fn test_missing_api_key() {
        temp_env::with_vars(
            [
                ("ZAMCARE_APPWRITE_API_KEY", None::<&str>),
                ("ZAMCARE_APPWRITE_PROJECT", Some("zamcare")),
                ("ZAMCARE_DATABASE_ID", Some("main")),
            ],
            || {
                let result = new().try_get_matches_from(vec!["zamcare"]);
                assert!(result.is_err());
            },
        );
    }

    #[test]
    fn test_log_level_env() {
        temp_env::with_vars([("ZAMCARE_LOG_LEVEL", Some("debug"))], || {
            let matches = new().get_matches_from(REQUIRED);
            assert_eq!(
                matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                Some(3)
            );
        });
    }

    #[test]
    fn test_verbosity_count() {
        temp_env::with_vars([("ZAMCARE_LOG_LEVEL", None::<&str>)], || {
            let mut args = REQUIRED.to_vec();
            args.push("-vv");
            let matches = new().get_matches_from(args);
            assert_eq!(
                matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                Some(2)
            );
        });
    }

    #[test]
    fn test_request_timeout_must_be_positive() {
        let mut args = REQUIRED.to_vec();
        args.extend(["--request-timeout-seconds", "0"]);
        assert!(new().try_get_matches_from(args).is_err());
    }
}
