//! The seam between the shared trie substrate and the two smoothing
//! schemes: each [`Smoother`] says how much to prune on the way in, then
//! fills every node's `prob`/`prob_end`/`b`/`pf` on the way out.

use crate::node::Node;
use pg_common::Result;

pub trait Smoother {
    /// Count threshold below which a counting-trie node is dropped while
    /// building the frozen trie (`K` for Katz, `0` for Kneser-Ney).
    fn prune_threshold(&self) -> u64;

    /// Fill `prob`, `prob_end`, `b`, and `pf` for every node of the
    /// already fail-linked `tree`.
    fn fill_probabilities(&self, tree: &mut Vec<Node>, root: usize, start_idx: usize) -> Result<()>;
}
