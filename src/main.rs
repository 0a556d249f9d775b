//! moodjournal - Mood journal with emotion analysis and voice entries
//!
//! Entry point for the moodjournal CLI application.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use moodjournal::cli::{commands, Cli, Commands};
use moodjournal::config::Settings;

fn init_logging(default_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    let verbose = cli.verbose;

    match cli.command {
        Commands::Completions { shell } => {
            moodjournal::cli::completions::print(shell);
        }
        Commands::Analyze { text, json } => {
            init_logging(if verbose { "debug" } else { "warn" });
            commands::analyze(&text, json)?;
        }
        command => {
            // Load configuration only for commands that touch storage or services.
            let settings = Settings::load()?;
            init_logging(if verbose {
                "debug"
            } else {
                settings.general.log_level.as_str()
            });

            match command {
                Commands::Entry(entry_cmd) => {
                    commands::entry_command(&settings, entry_cmd)?;
                }
                Commands::Stats { period, json } => {
                    commands::show_stats(&settings, period, json)?;
                }
                Commands::Record { video } => {
                    commands::record(&settings, video)?;
                }
                Commands::Voice {
                    file,
                    note,
                    upload,
                    json,
                } => {
                    commands::process_voice(&settings, &file, &note, upload, json).await?;
                }
                Commands::Upload { file, folder } => {
                    commands::upload_file(&settings, &file, folder).await?;
                }
                Commands::Config(config_cmd) => {
                    commands::config_command(&settings, config_cmd)?;
                }
                Commands::Completions { .. } | Commands::Analyze { .. } => unreachable!(),
            }
        }
    }

    Ok(())
}
