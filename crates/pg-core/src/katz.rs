//! Katz backoff: raw relative-frequency estimates below the pruning
//! threshold `K`, backing off to progressively shorter contexts for
//! anything pruned away.

use crate::node::Node;
use crate::smoother::Smoother;
use pg_common::{Error, Result, CHAR_NUM};
use std::collections::VecDeque;

pub struct KatzBackoff {
    pub k: u64,
}

impl Smoother for KatzBackoff {
    fn prune_threshold(&self) -> u64 {
        self.k
    }

    fn fill_probabilities(&self, tree: &mut Vec<Node>, root: usize, start_idx: usize) -> Result<()> {
        tree[root].prob = 1.0 / CHAR_NUM as f64;

        if tree[root].cnt_end <= self.k {
            return Err(Error::KatzThresholdTooLarge {
                k: self.k,
                cnt_end: tree[root].cnt_end,
            });
        }

        get_probs(tree, root, root, start_idx);

        let mut queue: VecDeque<usize> = tree[root].children.node_indices().collect();
        queue.push_back(start_idx);
        while let Some(cur) = queue.pop_front() {
            if tree[cur].cnt_end == 0 {
                let fail = tree[cur].fail;
                tree[cur].prob_end = tree[cur].b * tree[fail].prob_end;
            }
            for ch in tree[cur].children.node_indices().collect::<Vec<_>>() {
                queue.push_back(ch);
            }
        }
        Ok(())
    }
}

/// Recursive, top-down fill of `prob`, `prob_end`, `b`, and `pf` for the
/// subtree rooted at `idx`. See §4.4 for the backoff-normaliser algebra.
fn get_probs(tree: &mut Vec<Node>, idx: usize, root: usize, start_idx: usize) {
    let fail_idx = tree[idx].fail;
    let cnt = tree[idx].cnt;
    let cnt_end = tree[idx].cnt_end;
    tree[idx].prob_end = cnt_end as f64 / cnt as f64;
    let mut pf = tree[idx].prob_end;

    let mut disc = cnt - cnt_end;
    let mut lowp_nom: u64 = if cnt_end > 0 { tree[fail_idx].cnt_end } else { 0 };

    let children: Vec<usize> = tree[idx].children.node_indices().collect();
    for ch_idx in children {
        let ch_cnt = tree[ch_idx].cnt;
        tree[ch_idx].prob = ch_cnt as f64 / cnt as f64;
        disc -= ch_cnt;
        let ch_fail = tree[ch_idx].fail;
        lowp_nom += tree[ch_fail].cnt;

        get_probs(tree, ch_idx, root, start_idx);

        let chpf = tree[ch_idx].prob * tree[ch_idx].pf;
        if chpf > pf {
            pf = chpf;
        }
    }

    let leftover = disc as f64 / cnt as f64;
    let lower_prob = if idx == root {
        get_probs(tree, start_idx, root, start_idx);
        let nom = tree[idx].children.len() + 1;
        if nom == CHAR_NUM {
            1.0
        } else {
            1.0 - nom as f64 / CHAR_NUM as f64
        }
    } else {
        let fail_cnt = tree[fail_idx].cnt;
        if lowp_nom == fail_cnt {
            1.0
        } else {
            1.0 - lowp_nom as f64 / fail_cnt as f64
        }
    };

    tree[idx].b = leftover / lower_prob;
    tree[idx].pf = pf.max(leftover);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::build_trie;
    use crate::counting_trie::CountingTrie;

    fn built(strings: &[&[u8]], gram_size: usize, k: u64) -> (Vec<Node>, usize, usize) {
        let mut counting = CountingTrie::new(gram_size);
        for s in strings {
            counting.add_sub(s, 1).unwrap();
        }
        build_trie(&counting, k)
    }

    #[test]
    fn rejects_threshold_not_exceeded_by_training_size() {
        let (mut tree, root, start_idx) = built(&[b"ab"], 8, 5);
        let smoother = KatzBackoff { k: 5 };
        let err = smoother
            .fill_probabilities(&mut tree, root, start_idx)
            .unwrap_err();
        assert!(matches!(err, Error::KatzThresholdTooLarge { .. }));
    }

    #[test]
    fn root_transitions_sum_to_one() {
        let (mut tree, root, start_idx) = built(&[b"ab", b"ab", b"ac", b"ad"], 8, 0);
        let smoother = KatzBackoff { k: 0 };
        smoother.fill_probabilities(&mut tree, root, start_idx).unwrap();

        let mut sum = tree[root].prob_end;
        for ch in tree[root].children.node_indices() {
            sum += tree[ch].prob;
        }
        let leftover_and_backoff_capacity = 1.0 - sum;
        assert!(leftover_and_backoff_capacity >= -1e-9);
    }
}
