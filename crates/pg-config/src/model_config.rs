//! The typed configuration describing scheme choice, gram size, Katz
//! threshold or Kneser-Ney discount parameter, and sampler seed.

use crate::scheme::SchemeKind;
use serde::{Deserialize, Serialize};

/// Gram size used when the scheme is Katz backoff and the CLI/file/default
/// resolution did not set one explicitly. Katz prunes by count threshold
/// rather than context depth, so this only bounds counting-trie memory.
pub const DEFAULT_GRAM_SIZE: usize = 32;

/// Default Modified Kneser-Ney discount parameter `D`; `D=3` is the
/// standard "modified" variant, `D=1` degenerates to plain Kneser-Ney.
pub const DEFAULT_KN_DISCOUNT: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub scheme: SchemeKind,
    pub gram_size: usize,
    /// Required when `scheme == Katz`; the count-pruning threshold `K`.
    pub katz_k: Option<u64>,
    /// Used only when `scheme == ModifiedKn`.
    pub kn_discount: u32,
    /// Explicit sampler seed; `None` means seed from OS entropy.
    pub seed: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            scheme: SchemeKind::ModifiedKn,
            gram_size: DEFAULT_GRAM_SIZE,
            katz_k: None,
            kn_discount: DEFAULT_KN_DISCOUNT,
            seed: None,
        }
    }
}
