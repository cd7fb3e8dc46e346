//! Conversion of a [`CountingTrie`] into the frozen, fail-linked scoring
//! trie: `add_from_trie` copies surviving nodes (tail chains materialized),
//! `get_fail` computes Aho-Corasick-style fail links by BFS, and
//! `build_trie` ties the two together and carves the start node out of
//! root's children.

use crate::counting_trie::CountingTrie;
use crate::node::Node;
use pg_common::END_ORD;
use std::collections::VecDeque;

/// Copy the subtree rooted at `tx` (counting trie) into `tree`, dropping
/// any node whose count did not exceed `prune`. Leaves carrying a
/// compressed tail are expanded into a chain of unary nodes so the frozen
/// trie never stores tails.
fn add_from_trie(
    counting: &CountingTrie,
    tree: &mut Vec<Node>,
    edge_ord: usize,
    tx: usize,
    prune: u64,
    level: usize,
) -> usize {
    let sn = &counting.nodes[tx];
    debug_assert!(sn.cnt > prune);
    let cnt_end = if sn.cnt_end > prune { sn.cnt_end } else { 0 };

    let idx = tree.len();
    tree.push(Node::new(edge_ord, level, sn.cnt, cnt_end));

    if sn.children.is_empty() {
        let Some(tail) = sn.tail.clone() else {
            return idx;
        };
        tree[idx].cnt_end = 0; // restored onto the chain's terminal node below

        let mut prev = idx;
        let mut ch_level = level + 1;
        for &byte in &tail {
            let ord = pg_common::ord(byte);
            let ch_idx = tree.len();
            tree.push(Node::new(ord, ch_level, sn.cnt, 0));
            tree[prev].children.insert(ord, ch_idx);
            prev = ch_idx;
            ch_level += 1;
        }
        tree[prev].cnt_end = cnt_end;
        idx
    } else {
        let child_ords: Vec<(usize, usize)> = sn.children.iter().collect();
        for (ord, sn_ch) in child_ords {
            if counting.nodes[sn_ch].cnt <= prune {
                continue;
            }
            let ch_idx = add_from_trie(counting, tree, ord, sn_ch, prune, level + 1);
            tree[idx].children.insert(ord, ch_idx);
        }
        tree[idx].children.shrink_to_fit();
        idx
    }
}

/// Breadth-first fail-link computation: every child of root fails to
/// root; every deeper node's fail is its parent's fail, advanced by the
/// same edge character (guaranteed to exist, since root is a universal
/// fallback).
fn get_fail(tree: &mut [Node], root: usize) {
    let mut queue: VecDeque<usize> = VecDeque::new();
    for ch_idx in tree[root].children.node_indices().collect::<Vec<_>>() {
        tree[ch_idx].fail = root;
        queue.push_back(ch_idx);
    }

    while let Some(cur) = queue.pop_front() {
        let cur_fail = tree[cur].fail;
        let children: Vec<(usize, usize)> = tree[cur].children.iter().collect();
        for (ord, ch_idx) in children {
            let ch_fail = tree[cur_fail]
                .find_ch(ord)
                .expect("root is a universal fallback for every ordinal");
            tree[ch_idx].fail = ch_fail;
            queue.push_back(ch_idx);
        }
    }
}

/// Build the frozen trie from `counting`, pruning nodes whose count does
/// not exceed `prune`. Returns `(tree, root, start_idx)`.
pub fn build_trie(counting: &CountingTrie, prune: u64) -> (Vec<Node>, usize, usize) {
    let mut tree = Vec::new();
    let root = add_from_trie(counting, &mut tree, END_ORD, counting.root, prune, 0);
    tree.shrink_to_fit();

    let start_idx = tree[root].find_ch(END_ORD).expect("start node always survives pruning");
    tree[root].fail = root;
    get_fail(&mut tree, root);

    tree[root].children.remove(END_ORD);
    debug_assert_eq!(tree[root].cnt_end, 0);
    tree[root].cnt_end = tree[start_idx].cnt;

    (tree, root, start_idx)
}
