//! Modified Kneser-Ney: smooths on *adjusted* (continuation) counts rather
//! than raw frequencies, computed via a transient per-level table built
//! over the frozen trie and discarded once probabilities are filled.

use crate::node::Node;
use crate::smoother::Smoother;
use pg_common::{Result, CHAR_NUM};
use std::collections::{HashMap, VecDeque};

/// `(adjusted_count, fail)` for one table entry. `fail` is the entry's own
/// key when it is a replicated/expanded copy (a marker original code uses
/// to tell "this is a real ancestor" apart from "this is a stand-in for a
/// node that is really shallower than this level").
type InterimNode = (u64, usize);

struct NodeTable {
    gram_size: usize,
    num_discount_param: u32,
    tree_size: usize,
    root: usize,
    tb: Vec<HashMap<usize, InterimNode>>,
    num_count: Vec<Vec<usize>>,
    discounts: Vec<Vec<f64>>,
}

impl NodeTable {
    fn new(gram_size: usize, num_discount_param: u32, tree_size: usize, root: usize) -> Self {
        NodeTable {
            gram_size,
            num_discount_param,
            tree_size,
            root,
            tb: (0..=gram_size).map(|_| HashMap::new()).collect(),
            num_count: Vec::new(),
            discounts: Vec::new(),
        }
    }

    #[inline]
    fn end_idx(&self, idx: usize) -> usize {
        idx + self.tree_size
    }

    #[inline]
    fn is_end_idx(&self, idx: usize) -> bool {
        idx >= self.tree_size
    }

    #[inline]
    fn inv_end_idx(&self, idx: usize) -> usize {
        idx - self.tree_size
    }

    fn add_item(&mut self, level: usize, idx: usize, cnt: u64, fail: usize, expand: bool) {
        let initial_cnt = if level == self.gram_size { cnt } else { 0 };
        self.tb[level].insert(idx, (initial_cnt, if expand { idx } else { fail }));
    }

    fn add_node(&mut self, base_level: usize, node_level: usize, node_cnt: u64, node_cnt_end: u64, node_fail: usize, idx: usize) {
        self.add_item(base_level, idx, node_cnt, node_fail, base_level > node_level);
        let end_level = base_level + 1;
        if node_cnt_end > 0 && end_level <= self.gram_size {
            let end_fail = if idx == self.root {
                idx
            } else {
                self.end_idx(node_fail)
            };
            self.add_item(
                end_level,
                self.end_idx(idx),
                node_cnt_end,
                end_fail,
                end_level > node_level + 1,
            );
        }
    }

    fn get_discount(&self, level: usize, cnt: u64) -> f64 {
        let t = cnt.min(self.num_discount_param as u64) as usize;
        self.discounts[level][t]
    }

    /// Kneser-Ney discount parameters `D_t(k)` for every level `k` and
    /// count bucket `t in [1..=num_discount_param]`, from the histogram of
    /// adjusted counts computed by [`ModifiedKneserNey::build_table`].
    fn calc_discount(&mut self) {
        let d = self.num_discount_param as usize;
        self.num_count = Vec::with_capacity(self.gram_size + 1);
        self.discounts = Vec::with_capacity(self.gram_size + 1);

        for k in 0..=self.gram_size {
            let mut counts = vec![0usize; d + 2];
            for &(cnt, _) in self.tb[k].values() {
                if (cnt as usize) < d + 2 {
                    counts[cnt as usize] += 1;
                }
            }
            self.num_count.push(counts);
            self.discounts.push(vec![0.0; d + 1]);
        }

        for k in 1..=self.gram_size {
            let k_count = &self.num_count[k];
            let denom = k_count[1] + 2 * k_count[2];
            let factor = if denom > 0 {
                k_count[1] as f64 / denom as f64
            } else {
                1.0
            };

            for t in 1..=d {
                let t_disc = if k_count[t] == 0 {
                    0.0
                } else {
                    t as f64 - ((t + 1) as f64 * factor * k_count[t + 1] as f64) / k_count[t] as f64
                };
                self.discounts[k][t] = t_disc.max(0.0);
            }
        }
    }
}

pub struct ModifiedKneserNey {
    pub gram_size: usize,
    pub discount_param: u32,
}

impl Smoother for ModifiedKneserNey {
    fn prune_threshold(&self) -> u64 {
        0
    }

    fn fill_probabilities(&self, tree: &mut Vec<Node>, root: usize, start_idx: usize) -> Result<()> {
        let mut table = NodeTable::new(self.gram_size, self.discount_param, tree.len(), root);
        build_table(&mut table, tree, root, start_idx);
        get_probs(tree, &table, root, start_idx);
        get_pf(tree, root);
        Ok(())
    }
}

fn build_table(table: &mut NodeTable, tree: &[Node], root: usize, start_idx: usize) {
    for (idx, nd) in tree.iter().enumerate() {
        table.add_node(nd.level, nd.level, nd.cnt, nd.cnt_end, nd.fail, idx);
    }

    let start_nd = &tree[start_idx];
    for j in 2..table.gram_size {
        table.add_node(j, start_nd.level, start_nd.cnt, start_nd.cnt_end, start_nd.fail, start_idx);
    }

    let mut queue: VecDeque<usize> = start_nd.children.node_indices().collect();
    while let Some(idx) = queue.pop_front() {
        let nd = &tree[idx];
        for j in (nd.level + 1)..=table.gram_size {
            table.add_node(j, nd.level, nd.cnt, nd.cnt_end, nd.fail, idx);
        }
        for ch in nd.children.node_indices() {
            queue.push_back(ch);
        }
    }

    for level in 2..table.tb.len() {
        let entries: Vec<(usize, InterimNode)> = table.tb[level]
            .iter()
            .map(|(&k, &v)| (k, v))
            .collect();
        for (_idx, (_cnt, fail)) in entries {
            table.tb[level - 1].entry(fail).or_insert((0, 0)).0 += 1;
        }
    }

    table.calc_discount();
}

fn get_probs(tree: &mut [Node], table: &NodeTable, root: usize, start_idx: usize) {
    tree[root].prob = 1.0 / CHAR_NUM as f64;
    tree[start_idx].prob = 0.0;

    for level in 1..table.tb.len() {
        let row_keys: Vec<usize> = table.tb[level - 1].keys().copied().collect();
        for idx in row_keys {
            if table.is_end_idx(idx) {
                continue;
            }
            let mut ch: Vec<usize> = tree[idx].children.node_indices().collect();
            let ch_end_idx = table.end_idx(idx);
            if table.tb[level].contains_key(&ch_end_idx) {
                ch.push(ch_end_idx);
            }

            let mut probs = vec![0.0f64; ch.len()];
            let mut pref_cnt: u64 = 0;
            let mut bo_prob = 0.0f64;

            for (i, &c) in ch.iter().enumerate() {
                let (adj_cnt, _) = *table.tb[level]
                    .get(&c)
                    .expect("every child must be registered at its own level");
                let disc = table.get_discount(level, adj_cnt);
                probs[i] = adj_cnt as f64 - disc;
                pref_cnt += adj_cnt;
                bo_prob += disc;
            }
            bo_prob = if pref_cnt > 0 {
                bo_prob / pref_cnt as f64
            } else {
                1.0
            };

            for (i, &ch_idx) in ch.iter().enumerate() {
                let (_, ch_fail_idx) = *table.tb[level].get(&ch_idx).unwrap();
                let trans_prob_base = if pref_cnt > 0 {
                    probs[i] / pref_cnt as f64
                } else {
                    0.0
                };
                let fail_prob = if table.is_end_idx(ch_fail_idx) {
                    tree[table.inv_end_idx(ch_fail_idx)].prob_end
                } else {
                    tree[ch_fail_idx].prob
                };
                let trans_prob = trans_prob_base + bo_prob * fail_prob;

                if table.is_end_idx(ch_idx) {
                    tree[table.inv_end_idx(ch_idx)].prob_end = trans_prob;
                } else {
                    tree[ch_idx].prob = trans_prob;
                }
            }

            tree[idx].b *= bo_prob;
        }
    }

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
}

fn get_pf(tree: &mut Vec<Node>, idx: usize) {
    let mut pf = tree[idx].prob_end.max(tree[idx].b);
    let children: Vec<usize> = tree[idx].children.node_indices().collect();
    for ch_idx in children {
        get_pf(tree, ch_idx);
        let chpf = tree[ch_idx].prob * tree[ch_idx].pf;
        if chpf > pf {
            pf = chpf;
        }
    }
    tree[idx].pf = pf;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::build_trie;
    use crate::counting_trie::CountingTrie;

    fn built(strings: &[&[u8]], gram_size: usize) -> (Vec<Node>, usize, usize) {
        let mut counting = CountingTrie::new(gram_size);
        for s in strings {
            counting.add_sub(s, 1).unwrap();
        }
        build_trie(&counting, 0)
    }

    #[test]
    fn fills_positive_probabilities_for_seen_strings() {
        let (mut tree, root, start_idx) = built(&[b"ab", b"ab", b"ac"], 4);
        let smoother = ModifiedKneserNey {
            gram_size: 4,
            discount_param: 3,
        };
        smoother.fill_probabilities(&mut tree, root, start_idx).unwrap();
        assert!(tree[start_idx].prob_end.is_finite());
        for node in &tree {
            assert!(node.pf >= node.prob_end - 1e-12);
        }
    }

    #[test]
    fn discount_param_one_degenerates_to_plain_kn() {
        let (mut tree, root, start_idx) = built(&[b"ab", b"ab", b"ac", b"ad"], 4);
        let smoother = ModifiedKneserNey {
            gram_size: 4,
            discount_param: 1,
        };
        assert!(smoother.fill_probabilities(&mut tree, root, start_idx).is_ok());
    }
}
