//! Resolve command - show the release a `skin` run would pick

use console::style;
use reskin_repo::VersionResolver;
use std::path::Path;

use crate::error::{CliError, Result};
use crate::util;

pub fn run(
    project: &Path,
    released_version: Option<&str>,
    settings: Option<&Path>,
    offline: bool,
) -> Result<()> {
    util::check_range(released_version)?;
    let current = util::load_project(project)?;
    let repository = util::load_repository(settings, offline)?;

    let constraint = released_version
        .map(str::to_string)
        .unwrap_or_else(|| format!("(,{})", current.version));
    let coordinates = current.coordinates();

    println!(
        "{} Searching releases of {} in {}",
        style("→").blue(),
        style(coordinates.key()).cyan(),
        constraint
    );

    let candidate = VersionResolver::new(&repository).resolve(&constraint, &coordinates)?;
    match candidate.version() {
        Some(version) => {
            println!("  {} {}", style("✓").green(), style(version).bold());
            Ok(())
        }
        None => Err(CliError::Resolution {
            message: format!(
                "No released version of {} in {}",
                coordinates.key(),
                candidate.range
            ),
            help: Some("Check the repository settings or widen --released-version".to_string()),
        }),
    }
}
