//! Reskin CLI - re-skin the documentation site of a previous Maven release

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod error;
mod exit_codes;
mod util;

use commands::skin::SkinArgs;

#[derive(Parser)]
#[command(name = "reskin")]
#[command(author = "Reskin Contributors")]
#[command(version)]
#[command(about = "Re-skin the documentation site of a previous Maven release", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output (also passed to Maven as -X)
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the current skin to the site of a released version and build it
    Skin(SkinArgs),

    /// Show which released version would be re-skinned
    Resolve {
        /// The current project's pom.xml
        #[arg(short, long, default_value = "pom.xml")]
        project: PathBuf,

        /// Version or range of the release; defaults to every version below the current one
        #[arg(long)]
        released_version: Option<String>,

        /// Repository settings file
        #[arg(long, env = "RESKIN_SETTINGS")]
        settings: Option<PathBuf>,

        /// Never contact remote repositories
        #[arg(long)]
        offline: bool,
    },
}

fn main() {
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    let result = match cli.command {
        Commands::Skin(args) => commands::skin::run(&args, cli.debug),
        Commands::Resolve {
            project,
            released_version,
            settings,
            offline,
        } => commands::resolve::run(
            &project,
            released_version.as_deref(),
            settings.as_deref(),
            offline,
        ),
    };

    if let Err(err) = result {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Log to stderr, filtered by `RESKIN_LOG` (info by default, debug with --debug)
fn init_tracing(debug: bool) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let default = if debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("RESKIN_LOG").unwrap_or_else(|_| EnvFilter::new(default)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
