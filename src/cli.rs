//! Command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Turn job postings into tailored, portfolio-backed cold emails.
#[derive(Debug, Parser)]
#[command(name = "coldmail", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file (default: ./coldmail.toml if present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Ask for plain-text emails instead of Markdown.
    #[arg(long, global = true, default_value_t = false)]
    pub plain: bool,

    /// Retries per candidate on rate limiting.
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    /// Debug-level logging.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract job postings from cleaned page text and print them as JSON.
    Extract {
        /// Text file to read; stdin when omitted.
        file: Option<PathBuf>,
    },

    /// Extract postings, then draft one email per posting.
    Draft {
        /// Text file to read; stdin when omitted.
        file: Option<PathBuf>,

        /// Tone: Formal, Friendly, Confident, Persuasive, Enthusiastic, or free text.
        #[arg(long, default_value = "Confident")]
        tone: String,

        /// Call to action: Request an Interview, Ask for a Referral,
        /// Offer to Discuss Further, Request a Coffee Chat, or free text.
        #[arg(long, default_value = "Request an Interview")]
        cta: String,

        /// Portfolio TOML file with [[entry]] tags/url tables.
        #[arg(long)]
        portfolio: Option<PathBuf>,

        /// Also write each email to this directory.
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Show which credentials and candidates are configured.
    Check,
}
