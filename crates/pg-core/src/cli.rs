//! Command-line surface for `guesser`.
//!
//! Each subcommand takes `train_path`, a `scheme` name, and a single
//! `gram_size_or_k` value whose meaning depends on `scheme` (the trie
//! depth for Modified Kneser-Ney, the Katz pruning threshold `K` for
//! Katz backoff) — this mirrors the original tool's argument contract,
//! where one positional slot serves both roles.

use crate::logging::{LogFormat, LogLevel};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Character-level n-gram password strength and guessing model.
#[derive(Parser)]
#[command(name = "guesser")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(Args, Debug)]
pub struct GlobalOpts {
    /// Deterministic PRNG seed; omit for OS entropy.
    #[arg(long, global = true, env = "PG_SEED")]
    pub seed: Option<u64>,

    /// Path to a TOML config file supplying defaults this invocation
    /// doesn't override (Modified Kneser-Ney discount parameter, etc).
    #[arg(long, global = true, env = "PG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Modified Kneser-Ney discount parameter count; unused for Katz.
    #[arg(long, global = true, env = "PG_KN_DISCOUNT")]
    pub kn_discount: Option<u32>,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log output format.
    #[arg(long, global = true, default_value = "human", env = "PG_LOG_FORMAT")]
    pub log_format: String,
}

impl GlobalOpts {
    pub fn log_level(&self) -> LogLevel {
        match self.verbose {
            0 => LogLevel::Info,
            1 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    pub fn log_format(&self) -> LogFormat {
        self.log_format.parse().unwrap_or_default()
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Train a model on `train_path` and write generated guesses to `output_path`.
    Train(TrainArgs),

    /// Train a model on `train_path` and print the probability of `string`.
    Score(ScoreArgs),

    /// Train a model on `train_path` and draw `count` random samples.
    Sample(SampleArgs),
}

#[derive(Args)]
pub struct TrainArgs {
    /// Path to a training file: one `string<TAB>count` row per line.
    pub train_path: PathBuf,

    /// Destination for one `string<TAB>probability` row per generated guess.
    pub output_path: PathBuf,

    /// Number of guesses to generate.
    pub count: u64,

    /// Smoothing scheme: `katz` or `modified-kn`.
    pub scheme: String,

    /// Trie depth for `modified-kn`, or the Katz pruning threshold `K` for `katz`.
    pub gram_size_or_k: u64,

    /// Require exactly `count` guesses (rather than a threshold-bounded
    /// approximation) by iteratively narrowing the search window.
    #[arg(long)]
    pub strict: bool,

    /// Use Monte Carlo rank estimation instead of exact threshold search.
    #[arg(long)]
    pub montecarlo: bool,

    /// Sample size for `--montecarlo`.
    #[arg(long, default_value_t = 10_000)]
    pub num_samples: usize,

    /// Run the full probability-mass sanity check after training.
    #[arg(long)]
    pub strict_sanity: bool,
}

#[derive(Args)]
pub struct ScoreArgs {
    pub train_path: PathBuf,
    pub scheme: String,
    pub gram_size_or_k: u64,
    pub string: String,
}

#[derive(Args)]
pub struct SampleArgs {
    pub train_path: PathBuf,
    pub scheme: String,
    pub gram_size_or_k: u64,
    pub count: u64,
}
