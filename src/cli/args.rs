// CLASSIFICATION: COMMUNITY
// Filename: args.rs v0.1
// Date Modified: 2026-10-18
// Author: Lukas Bower

use clap::{Arg, ArgAction, Command};

/// Builds the argument parser for the executor bootstrap.
///
/// The supervisor passes bare words (`check`, `use-ivshm`,
/// `<anything> use-unix-socks`); they are collected verbatim and interpreted
/// by [`crate::bootstrap::Mode::from_args`].
pub fn build_cli() -> Command {
    Command::new("execboot")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Fuzzing executor bootstrap: feature probe, ivshm channels, virtio console")
        .disable_help_subcommand(true)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new("words")
                .value_name("ARGS")
                .help("Bootstrap words as passed by the supervisor")
                .num_args(0..)
                .trailing_var_arg(true)
                .allow_hyphen_values(true)
                .action(ArgAction::Append),
        )
}

/// Words after the program name, in order.
pub fn words(matches: &clap::ArgMatches) -> Vec<String> {
    matches
        .get_many::<String>("words")
        .map(|vals| vals.cloned().collect())
        .unwrap_or_default()
}
