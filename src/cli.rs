use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "docsite-search")]
#[command(about = "Full-text search over static documentation sites", long_about = None)]
pub struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Search a site and print the ranked results
    Search {
        query: String,
        #[command(flatten)]
        site: SiteArgs,
        /// Minimum query latency in milliseconds (0 disables it)
        #[arg(long)]
        min_latency_ms: Option<u64>,
        /// Print the HTML result list instead of plain text
        #[arg(long)]
        html: bool,
    },
    /// Print the flattened page documents as JSON
    Documents {
        #[command(flatten)]
        site: SiteArgs,
    },
}

#[derive(Debug, clap::Args)]
pub struct SiteArgs {
    /// Base URL or generator output directory of the site
    #[arg(short, long)]
    pub site: Option<String>,
    /// Comma-separated section allow-list
    #[arg(long)]
    pub sections: Option<String>,
}
