use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "segstream")]
#[command(author, version, about = "Segmented HTTP media streaming and measurement tool")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the track count, segment counts and track sizes of a movie
    SizeReport {
        /// Origin server URL
        server_url: String,

        /// Movie name on the origin
        movie: String,

        /// File to write the report to
        output: PathBuf,
    },

    /// Download every track segment by segment and report timing
    Download {
        /// Origin server URL
        server_url: String,

        /// Movie name on the origin
        movie: String,

        /// File to write the timing report to
        output: PathBuf,

        /// Directory for the downloaded track files
        #[arg(long, default_value = ".")]
        dest: PathBuf,
    },

    /// Stream one track to the local player socket
    Stream {
        /// Origin base URL
        base_url: String,

        /// Movie name on the origin
        movie: String,

        /// Index of the track to stream
        #[arg(allow_negative_numbers = true)]
        track: i64,

        /// Player address (overrides player.address from the config)
        #[arg(long)]
        player: Option<String>,
    },
}
