use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use twinpane_types::Side;

#[derive(Parser)]
#[command(
    name = "twinpane",
    about = "twinpane: line-aligned change chunks between two documents",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file with view configuration
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum SideArg {
    A,
    B,
}

impl From<SideArg> for Side {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::A => Side::A,
            SideArg::B => Side::B,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// List the changed chunks between two files
    Chunks(PairArgs),
    /// Show which unchanged spans a view would collapse
    Collapse(CollapseArgs),
    /// Copy the modified text of a chunk into the original file
    Accept(ResolveArgs),
    /// Revert a chunk of the modified file to the original text
    Reject(ResolveArgs),
    /// Check chunk invariants and incremental updates against rebuilds
    Check(CheckArgs),
}

#[derive(Args)]
pub struct PairArgs {
    /// The original document (A)
    pub original: PathBuf,
    /// The modified document (B)
    pub modified: PathBuf,
}

#[derive(Args)]
pub struct CollapseArgs {
    #[command(flatten)]
    pub pair: PairArgs,
    #[arg(long)]
    pub margin: Option<usize>,
    #[arg(long)]
    pub min_size: Option<usize>,
    #[arg(long)]
    pub side: Option<SideArg>,
}

#[derive(Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub pair: PairArgs,
    /// Byte offset in the modified document
    #[arg(long)]
    pub pos: usize,
    /// Write the result back instead of printing it
    #[arg(long)]
    pub write: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub pair: PairArgs,
    /// Number of simulated single-line edits
    #[arg(long, default_value = "20")]
    pub edits: usize,
    /// Override the update margin
    #[arg(long)]
    pub margin: Option<usize>,
}
