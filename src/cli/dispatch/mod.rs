//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the action executed by the binary.

use crate::cli::actions::Action;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    Ok(Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        data_dir: matches
            .get_one::<String>("data-dir")
            .map(PathBuf::from)
            .context("missing required argument: --data-dir")?,
        cors_origin: matches.get_one::<String>("cors-origin").cloned(),
    })
}
