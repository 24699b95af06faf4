//! locsync CLI: the `locsync` command.

mod cli;
mod commands;
mod config;
mod support;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_ENV: &str = "LOCSYNC_LOG";

fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let global = cli.global;

    match cli.command {
        Commands::Diff {
            report,
            allow_drift,
            json,
        } => commands::diff::run(
            global,
            commands::diff::Args {
                report,
                allow_drift,
                json,
            },
        ),

        Commands::Fill {
            export,
            dry_run,
            json,
        } => commands::fill::run(
            global,
            commands::fill::Args {
                export,
                dry_run,
                json,
            },
        ),

        Commands::Rebuild {
            in_place,
            dry_run,
            json,
        } => commands::rebuild::run(
            global,
            commands::rebuild::Args {
                in_place,
                dry_run,
                json,
            },
        ),

        Commands::Promote {
            donor,
            export,
            dry_run,
            json,
        } => commands::promote::run(
            global,
            commands::promote::Args {
                donor,
                export,
                dry_run,
                json,
            },
        ),

        Commands::Selfrefs {
            target,
            dry_run,
            json,
        } => commands::selfrefs::run(
            global,
            commands::selfrefs::Args {
                target,
                dry_run,
                json,
            },
        ),

        Commands::Empty { export, json } => {
            commands::empty::run(global, commands::empty::Args { export, json })
        }

        Commands::Stats { json } => commands::stats::run(global, json),

        Commands::Pending { export, json } => {
            commands::pending::run(global, commands::pending::Args { export, json })
        }

        Commands::Seed { dry_run, json } => commands::seed::run(global, dry_run, json),

        Commands::Declare {
            keys_file,
            value,
            dry_run,
            json,
        } => commands::declare::run(
            global,
            commands::declare::Args {
                keys_file,
                value,
                dry_run,
                json,
            },
        ),

        Commands::Init { locale, json } => commands::init::run(global, locale, json),
    }
}
