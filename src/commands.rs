//! CLI command definitions

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch a program under a debug adapter and bind breakpoints into it
    Bind {
        /// Path to the program to debug
        #[arg(long)]
        program: PathBuf,

        /// Arguments to pass to the program
        #[arg(last = true)]
        args: Vec<String>,

        /// Debug adapter to use (default from config)
        #[arg(long)]
        adapter: Option<String>,

        /// Language the breakpoints are for (default from config)
        #[arg(long)]
        language: Option<String>,

        /// Condition attached to every breakpoint
        #[arg(long, short)]
        condition: Option<String>,

        /// Break once the hit count reaches this value
        #[arg(long)]
        hit_count: Option<u32>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Locations: file:line or function name
        #[arg(required = true)]
        locations: Vec<String>,
    },

    /// Resolve locations and report whether they could be bound, without a session
    Check {
        /// Language the breakpoints are for (default from config)
        #[arg(long)]
        language: Option<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Locations: file:line or function name
        #[arg(required = true)]
        locations: Vec<String>,
    },
}
