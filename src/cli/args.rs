use crate::models::{Padding, Variable};
use crate::utils::constants::DEFAULT_DATA_DIR;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ocean-extrema")]
#[command(about = "Per-timestamp min/max extraction from float32 ocean chunk files")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute extrema for each variable and merge them into the metadata file
    Run {
        #[arg(short, long, help = "Config file (TOML, YAML or JSON)")]
        config: Option<PathBuf>,

        #[arg(short, long, help = "Directory containing the chunk files")]
        data_dir: Option<PathBuf>,

        #[arg(
            short,
            long,
            help = "Metadata JSON path [default: <data-dir>/metadata.json]"
        )]
        metadata_path: Option<PathBuf>,

        #[arg(
            long,
            value_delimiter = ',',
            help = "Variables to process, in order (e.g. 'salt,theta')"
        )]
        variables: Option<Vec<Variable>>,

        #[arg(long, value_enum, help = "Date component padding in chunk filenames")]
        padding: Option<Padding>,

        #[arg(long, help = "Chunks per timestamp [default: 90]")]
        chunks: Option<usize>,

        #[arg(long, help = "Memory-map chunk files instead of buffered reads")]
        mmap: bool,

        #[arg(short, long, help = "Suppress per-file progress output")]
        quiet: bool,
    },

    /// List the timestamps found for a variable
    Dates {
        #[arg(short, long, default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,

        #[arg(long)]
        variable: Variable,
    },

    /// Display the contents of a metadata file
    Info {
        #[arg(short, long)]
        metadata_path: PathBuf,

        #[arg(
            short,
            long,
            default_value = "0",
            help = "Show local extrema for the first N timestamps of each variable"
        )]
        sample: usize,
    },
}
