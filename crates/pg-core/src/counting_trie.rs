//! The ingestion-time trie: indexes every substring of every training
//! string up to `gram_size`, using tail compression so a uniquely-seen
//! continuation costs one allocation instead of a chain of one-child
//! nodes.

use crate::children::Children;
use pg_common::{alphabet, Error, Result, END_ORD};

#[derive(Debug, Clone, Default)]
pub struct CountingNode {
    pub cnt: u64,
    pub cnt_end: u64,
    pub children: Children,
    /// Compressed continuation shared by every node the chain would
    /// otherwise allocate; `None` once [`CountingTrie::pushdown`] has
    /// materialized the first character, or if this node was never a bare
    /// leaf.
    pub tail: Option<Vec<u8>>,
}

impl CountingNode {
    fn new(cnt: u64, tail: Option<Vec<u8>>) -> Self {
        CountingNode {
            cnt,
            cnt_end: 0,
            children: Children::new(),
            tail,
        }
    }
}

pub struct CountingTrie {
    pub nodes: Vec<CountingNode>,
    pub root: usize,
    pub start_ch: usize,
    pub gram_size: usize,
}

impl CountingTrie {
    pub fn new(gram_size: usize) -> Self {
        let mut nodes = Vec::with_capacity(pg_common::CHAR_NUM + 1);
        nodes.push(CountingNode::new(0, None)); // root
        for ord in 0..pg_common::CHAR_NUM {
            let node_idx = nodes.len();
            nodes.push(CountingNode::new(0, None));
            nodes[0].children.insert(ord, node_idx);
        }
        let start_ch = nodes[0].children.get(END_ORD).expect("start child seeded");
        CountingTrie {
            nodes,
            root: 0,
            start_ch,
            gram_size,
        }
    }

    fn add_node(&mut self, cnt: u64, tail: Option<Vec<u8>>) -> usize {
        self.nodes.push(CountingNode::new(cnt, tail));
        self.nodes.len() - 1
    }

    /// Materialize the first byte of a compressed tail as a real child
    /// node, shifting the remainder of the tail down. No-op on a node with
    /// no tail (already expanded, or never compressed).
    fn pushdown(&mut self, x: usize) {
        let Some(tail) = self.nodes[x].tail.take() else {
            return;
        };
        debug_assert!(!tail.is_empty());
        let first = tail[0];
        let rest = tail[1..].to_vec();
        let cnt = self.nodes[x].cnt;
        let cnt_end = self.nodes[x].cnt_end;
        let child_tail = if rest.is_empty() { None } else { Some(rest) };
        let child = self.add_node(cnt, child_tail);
        self.nodes[x].children.insert(alphabet::ord(first), child);
        self.nodes[child].cnt_end = cnt_end;
        self.nodes[x].cnt_end = 0;
    }

    /// Insert every prefix of `s` starting at `start`, stopping after
    /// `gram_size` bytes (one fewer when `start` is not the root, since
    /// the start sentinel already consumed one level of context).
    fn add_pfx(&mut self, s: &[u8], cnt: u64, start: usize) {
        let mut cur = start;
        let real_limit = if start == self.root {
            self.gram_size
        } else {
            self.gram_size.saturating_sub(1)
        };
        let pfx_len = s.len().min(real_limit);
        let reach_end = s.len() < real_limit;

        for (i, &c) in s.iter().take(pfx_len).enumerate() {
            self.pushdown(cur);
            self.nodes[cur].cnt += cnt;

            let ord = alphabet::ord(c);
            if let Some(kid) = self.nodes[cur].children.get(ord) {
                cur = kid;
            } else {
                let is_last = i == pfx_len - 1;
                let node = if is_last {
                    self.add_node(cnt, None)
                } else {
                    let tail: Vec<u8> = s[i + 1..pfx_len].to_vec();
                    self.add_node(cnt, Some(tail))
                };
                self.nodes[cur].children.insert(ord, node);
                if reach_end {
                    self.nodes[node].cnt_end = cnt;
                }
                return;
            }
        }

        self.pushdown(cur);
        self.nodes[cur].cnt += cnt;
        if reach_end {
            self.nodes[cur].cnt_end += cnt;
        }
    }

    /// Insert every substring of `s` into the trie: the whole string from
    /// the dedicated start node (the only insertion that may set
    /// `cnt_end` at the true terminal position), then every suffix from
    /// root.
    pub fn add_sub(&mut self, s: &[u8], cnt: u64) -> Result<()> {
        if let Err(pos) = alphabet::validate(s) {
            return Err(Error::ByteOutOfAlphabet {
                byte: s[pos],
                position: pos,
                context: "training row".to_string(),
            });
        }
        self.nodes[self.root].cnt += cnt;
        let start_ch = self.start_ch;
        self.add_pfx(s, cnt, start_ch);
        for i in 0..s.len() {
            self.add_pfx(&s[i..], cnt, self.root);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trie_has_96_first_level_children() {
        let trie = CountingTrie::new(8);
        assert_eq!(trie.nodes[trie.root].children.len(), pg_common::CHAR_NUM);
    }

    #[test]
    fn add_sub_rejects_non_printable_bytes() {
        let mut trie = CountingTrie::new(8);
        let err = trie.add_sub(b"ok\tbad", 1).unwrap_err();
        assert!(matches!(err, Error::ByteOutOfAlphabet { .. }));
    }

    #[test]
    fn single_string_updates_root_and_start_counts() {
        let mut trie = CountingTrie::new(8);
        trie.add_sub(b"ab", 3).unwrap();
        assert_eq!(trie.nodes[trie.root].cnt, 3);
        // "ab" inserted from start_ch, plus suffixes "ab" (root) and "b" (root).
        let start_a = trie.nodes[trie.start_ch].children.get(alphabet::ord(b'a'));
        assert!(start_a.is_some());
    }

    #[test]
    fn repeated_insertion_accumulates_counts() {
        let mut trie = CountingTrie::new(8);
        trie.add_sub(b"aa", 1).unwrap();
        trie.add_sub(b"aa", 1).unwrap();
        let root_a = trie.nodes[trie.root]
            .children
            .get(alphabet::ord(b'a'))
            .unwrap();
        // root_a accumulates from: suffix "aa" and suffix "a" both start with 'a',
        // so cnt should be at least 2*2 = 4 after two insertions of "aa".
        assert!(trie.nodes[root_a].cnt >= 4);
    }

    #[test]
    fn divergent_branch_triggers_pushdown() {
        let mut trie = CountingTrie::new(8);
        trie.add_sub(b"abcd", 1).unwrap();
        trie.add_sub(b"abef", 1).unwrap();
        let a = trie.nodes[trie.start_ch]
            .children
            .get(alphabet::ord(b'a'))
            .unwrap();
        let b = trie.nodes[a].children.get(alphabet::ord(b'b')).unwrap();
        // After divergence at 'c' vs 'e', node b must have two real children,
        // not a compressed tail.
        assert!(trie.nodes[b].tail.is_none());
        assert_eq!(trie.nodes[b].children.len(), 2);
    }
}
