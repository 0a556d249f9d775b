//! CLI argument definitions using clap

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::analysis::StatsPeriod;

/// moodjournal - Mood journal with emotion analysis and voice entries
#[derive(Parser, Debug)]
#[command(name = "moodjournal")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run emotion analysis on a piece of text
    Analyze {
        /// Text to analyze
        text: String,

        /// Print the full analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// Journal entry management
    #[command(subcommand)]
    Entry(EntryCommand),

    /// Show mood statistics over a period
    Stats {
        /// Period to aggregate (week, month, year)
        #[arg(short, long, default_value = "week")]
        period: StatsPeriod,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record a clip from the default input device; press Enter to stop
    Record {
        /// Record video instead of audio
        #[arg(long)]
        video: bool,
    },

    /// Transcribe and analyze a voice entry
    Voice {
        /// Audio file to process
        file: PathBuf,

        /// Existing note text to merge the transcript into
        #[arg(short, long, default_value = "")]
        note: String,

        /// Upload the clip afterwards (the local file is removed)
        #[arg(long)]
        upload: bool,

        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// Upload a captured media file
    Upload {
        /// File to upload (removed afterwards)
        file: PathBuf,

        /// Remote folder (defaults to today's dated folder)
        #[arg(short, long)]
        folder: Option<String>,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum EntryCommand {
    /// Save the entry for a day, replacing any existing one
    Save {
        /// Day of the entry (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Mood score from 1 to 10
        #[arg(short, long)]
        mood: u8,

        /// Note text
        #[arg(short, long, default_value = "")]
        note: String,
    },

    /// Show the entry for a day
    Show {
        /// Day of the entry (YYYY-MM-DD)
        date: NaiveDate,
    },

    /// List all entries, newest first
    List,

    /// Print the days that have an entry, oldest first
    Dates,

    /// Delete the entry for a day
    Delete {
        /// Day of the entry (YYYY-MM-DD)
        date: NaiveDate,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}
