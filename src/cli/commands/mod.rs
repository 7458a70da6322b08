pub mod auth;
pub mod logging;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

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

    let command = Command::new("custos")
        .about("Account authentication and authorization service")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("CUSTOS_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("dsn")
                .short('d')
                .long("dsn")
                .help("Postgres connection string; omit to run with the in-memory store")
                .env("CUSTOS_DSN"),
        );

    let command = logging::with_args(command);
    auth::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse_without_arguments() {
        temp_env::with_vars(
            [
                ("CUSTOS_PORT", None::<&str>),
                ("CUSTOS_DSN", None),
                ("CUSTOS_SESSION_TTL_SECONDS", None),
            ],
            || {
                let matches = new().get_matches_from(vec!["custos"]);
                assert_eq!(matches.get_one::<u16>("port").copied(), Some(8080));
                assert_eq!(
                    matches.get_one::<i64>(auth::ARG_SESSION_TTL_SECONDS).copied(),
                    Some(3600)
                );
                assert!(matches.get_one::<String>("dsn").is_none());
            },
        );
    }

    #[test]
    fn verbosity_counts_occurrences() {
        temp_env::with_var("CUSTOS_LOG_LEVEL", None::<&str>, || {
            let matches = new().get_matches_from(vec!["custos", "-vvv"]);
            assert_eq!(
                matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                Some(3)
            );
        });
    }
}
