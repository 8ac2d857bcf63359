use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Input .json project file
    pub input: PathBuf,
    /// Output directory
    pub output: PathBuf,
    /// Run the project's actors headless for this many ticks and write a trace
    #[arg(long)]
    pub ticks: Option<u64>,
    /// Seed for the dry run's random directions
    #[arg(long, requires = "ticks")]
    pub seed: Option<u64>,
}
