//! Typed error taxonomy shared by every crate in the workspace.
//!
//! Three categories distinguish "you called this wrong"
//! ([`ErrorCategory::InvalidArgument`]) from "the model's internal
//! invariants broke" ([`ErrorCategory::Sanity`]) from "the filesystem said
//! no" ([`ErrorCategory::Io`]) so the CLI can map each to a distinct, stable
//! exit code without the caller having to parse error strings.

use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse-grained bucket an [`Error`] falls into; used by the CLI to pick
/// an exit code and by callers who want to branch without matching on every
/// variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    InvalidArgument,
    Sanity,
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCategory::InvalidArgument => "invalid-argument",
            ErrorCategory::Sanity => "sanity",
            ErrorCategory::Io => "io",
        };
        f.write_str(s)
    }
}

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("unknown smoothing scheme {name:?}; expected \"katz\" or \"modified-kn\"")]
    UnknownScheme { name: String },

    #[error("gram size must be positive, got {value}")]
    NonPositiveGramSize { value: i64 },

    #[error("byte {byte:#04x} at position {position} in {context} is outside the printable alphabet (0x20..=0x7E)")]
    ByteOutOfAlphabet {
        byte: u8,
        position: usize,
        context: String,
    },

    #[error("Katz pruning threshold K={k} leaves cnt_end(root)={cnt_end} <= K; choose a smaller K or add more training data")]
    KatzThresholdTooLarge { k: u64, cnt_end: u64 },

    #[error("malformed argument: {message}")]
    MalformedArgument { message: String },

    #[error(
        "node {node} failed the normalisation check: transition probabilities summed to {sum}, expected 1 +/- {tolerance}"
    )]
    SanityViolation {
        node: usize,
        sum: f64,
        tolerance: f64,
    },

    #[error("model used before preprocess() completed")]
    Uninitialized,

    #[error("I/O error reading/writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {message}")]
    Config { message: String },
}

impl Error {
    /// Stable process exit code for this error, matching the CLI contract
    /// (`0` success, `10` invalid argument, `11` I/O error, `20` internal
    /// error).
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::InvalidArgument => 10,
            ErrorCategory::Io => 11,
            ErrorCategory::Sanity => 20,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::UnknownScheme { .. }
            | Error::NonPositiveGramSize { .. }
            | Error::ByteOutOfAlphabet { .. }
            | Error::KatzThresholdTooLarge { .. }
            | Error::MalformedArgument { .. }
            | Error::Config { .. } => ErrorCategory::InvalidArgument,
            Error::SanityViolation { .. } | Error::Uninitialized => ErrorCategory::Sanity,
            Error::Io { .. } => ErrorCategory::Io,
        }
    }

    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
