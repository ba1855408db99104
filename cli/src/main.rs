//! powcore CLI
//!
//! Inspect the processor and run the proof-of-work primitives by hand.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{cryptonight, features, search, sha256, Backend, CnVariant};
use tracing_subscriber::EnvFilter;

// =============================================================================
// CLI DEFINITION
// =============================================================================

#[derive(Parser)]
#[command(name = "powcore")]
#[command(about = "Multiway SHA-256 and CryptoNight proof-of-work hashing", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log dispatcher decisions to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List detected CPU features and the selected lane backend
    Features {
        /// Show every flag, not only the enabled ones
        #[arg(short, long)]
        all: bool,
    },
    /// SHA-256 of short messages, batched across lanes
    Sha256 {
        /// Messages of at most 55 bytes each
        #[arg(value_name = "MESSAGE", required = true)]
        messages: Vec<String>,

        /// Treat messages as hex instead of text
        #[arg(long)]
        hex: bool,

        /// Lane backend to run on
        #[arg(short, long, value_enum, default_value_t = Backend::Auto)]
        backend: Backend,
    },
    /// CryptoNight of a hex-encoded block header blob
    Cryptonight {
        #[arg(value_name = "BLOB")]
        blob: String,

        /// Rule set; by default taken from the blob's major version
        #[arg(long, value_enum)]
        variant: Option<CnVariant>,

        /// Use the AES-NI path (variant 1 headers of 76 to 80 bytes)
        #[arg(long, conflicts_with = "variant")]
        fast: bool,
    },
    /// Scan nonces of a header blob for a hash meeting a difficulty
    Search {
        #[arg(value_name = "BLOB")]
        blob: String,

        /// Target difficulty
        #[arg(short, long, default_value_t = 1)]
        difficulty: u64,

        /// First nonce to try
        #[arg(long, default_value_t = 0)]
        start: u32,

        /// Number of nonces to try
        #[arg(short, long, default_value_t = 64)]
        count: u32,

        /// Worker threads (0 = one per core)
        #[arg(short, long, default_value_t = 0)]
        threads: usize,

        /// Use the AES-NI path when the blob and the processor allow it
        #[arg(long)]
        fast: bool,
    },
}

// =============================================================================
// ENTRY POINT
// =============================================================================

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Features { all } => features::run(all),
        Commands::Sha256 {
            messages,
            hex,
            backend,
        } => sha256::run(&messages, hex, backend)?,
        Commands::Cryptonight {
            blob,
            variant,
            fast,
        } => cryptonight::run(&blob, variant, fast)?,
        Commands::Search {
            blob,
            difficulty,
            start,
            count,
            threads,
            fast,
        } => search::run(&search::Job {
            blob: &blob,
            difficulty,
            start,
            count,
            threads,
            fast,
        })?,
    }

    Ok(())
}
