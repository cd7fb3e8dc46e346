//! Scoring, enumeration, and sampling over a frozen, fail-linked trie.
//! Every function here takes the trie explicitly rather than reaching for
//! shared mutable state, so the oracle and threshold window the original
//! carried as model fields become ordinary call parameters instead (see
//! design note on mutable global-ish state).

use crate::children::BannedSet;
use crate::node::Node;
use crate::rank::RankEstimator;
use pg_common::{chr, ord, Result, StrProb, CHAR_NUM, END_ORD};
use pg_math::EPS;
use rand::Rng;

const PRUNE_EPS: f64 = 0.999;

/// Score a single transition out of `pred` on ordinal `c`. Returns
/// `(probability, next_node)`; `next_node` is meaningful only when `c` is
/// not the end sentinel.
pub fn ch_prob(tree: &[Node], root: usize, pred: usize, c: usize) -> (f64, usize) {
    if c == END_ORD {
        return (tree[pred].prob_end, pred);
    }
    if let Some(ch_idx) = tree[pred].find_ch(c) {
        return (tree[ch_idx].prob, ch_idx);
    }
    let fail_idx = tree[pred].fail;
    if pred == root {
        (tree[pred].b * tree[pred].prob, fail_idx)
    } else {
        let (p, nt) = ch_prob(tree, root, fail_idx, c);
        (tree[pred].b * p, nt)
    }
}

/// Full-string probability: walk `ch_prob` across every byte of `s` plus
/// the terminating end sentinel, starting from `start_idx`.
pub fn pwd_prob(tree: &[Node], root: usize, start_idx: usize, s: &[u8]) -> f64 {
    let mut p = 1.0;
    let mut cur = start_idx;
    for &byte in s {
        if p == 0.0 {
            break;
        }
        let (step, next) = ch_prob(tree, root, cur, ord(byte));
        p *= step;
        cur = next;
    }
    if p != 0.0 {
        let (step, _) = ch_prob(tree, root, cur, END_ORD);
        p *= step;
    }
    p
}

/// Verify every reachable node's transition probabilities sum to 1 within
/// tolerance. Returns the first violation found.
pub fn sanity_check(tree: &[Node], root: usize) -> Result<()> {
    for idx in 0..tree.len() {
        let mut sum = 0.0;
        for c in 0..CHAR_NUM {
            sum += ch_prob(tree, root, idx, c).0;
        }
        if (1.0 - sum).abs() >= EPS {
            return Err(pg_common::Error::SanityViolation {
                node: idx,
                sum,
                tolerance: EPS,
            });
        }
    }
    Ok(())
}

/// Pruned DFS over the window `(min_threshold, max_threshold]`, reporting
/// every matching `(string, probability)` to `sink` exactly once.
#[allow(clippy::too_many_arguments)]
pub fn ch_search(
    tree: &[Node],
    root: usize,
    min_threshold: f64,
    max_threshold: f64,
    idx: usize,
    s: &mut Vec<u8>,
    banned: BannedSet,
    p: f64,
    sink: &mut dyn FnMut(&[u8], f64),
) {
    let nd = &tree[idx];
    if p * nd.pf <= PRUNE_EPS * min_threshold {
        return;
    }

    if !banned.has(END_ORD) {
        let ch_p = p * nd.prob_end;
        if ch_p > min_threshold && ch_p <= max_threshold {
            sink(s, ch_p);
        }
    }

    for (c, ch_idx) in nd.children.iter().collect::<Vec<_>>() {
        if banned.has(c) {
            continue;
        }
        let ch_p = p * tree[ch_idx].prob;
        if ch_p <= min_threshold {
            continue;
        }
        s.push(chr(c));
        ch_search(
            tree,
            root,
            min_threshold,
            max_threshold,
            ch_idx,
            s,
            BannedSet::empty(),
            ch_p,
            sink,
        );
        s.pop();
    }

    let fail_p = p * nd.b;
    if fail_p <= min_threshold {
        return;
    }

    let mut fail_banned = banned.union_children(&nd.children);
    fail_banned.set(END_ORD);
    if fail_banned.all() {
        return;
    }

    if idx == root {
        let fail_p = fail_p * tree[root].prob;
        if fail_p <= min_threshold {
            return;
        }
        for c in 0..CHAR_NUM {
            if fail_banned.has(c) {
                continue;
            }
            s.push(chr(c));
            ch_search(
                tree,
                root,
                min_threshold,
                max_threshold,
                root,
                s,
                BannedSet::empty(),
                fail_p,
                sink,
            );
            s.pop();
        }
    } else {
        ch_search(
            tree,
            root,
            min_threshold,
            max_threshold,
            nd.fail,
            s,
            fail_banned,
            fail_p,
            sink,
        );
    }
}

/// CDF descent over the same transition order `ch_search` visits. Returns
/// `(ordinal, probability, next_node)`; a non-positive probability marks a
/// floating-point underflow the caller should retry.
fn sample_ch(tree: &[Node], root: usize, idx: usize, banned: BannedSet, mut rand_val: f64) -> (usize, f64, usize) {
    let nd = &tree[idx];

    if !banned.has(END_ORD) {
        let prob = nd.prob_end;
        rand_val -= prob;
        if rand_val < 0.0 {
            return (END_ORD, prob, idx);
        }
    }

    for (c, ch_idx) in nd.children.iter() {
        if banned.has(c) {
            continue;
        }
        let prob = tree[ch_idx].prob;
        rand_val -= prob;
        if rand_val < 0.0 {
            return (c, prob, ch_idx);
        }
    }

    let mut fail_banned = banned.union_children(&nd.children);
    fail_banned.set(END_ORD);
    if fail_banned.all() {
        return (END_ORD, -1.0, idx);
    }

    if idx == root {
        let prob = nd.b * nd.prob;
        for c in 0..CHAR_NUM {
            if fail_banned.has(c) {
                continue;
            }
            rand_val -= prob;
            if rand_val < 0.0 {
                return (c, prob, idx);
            }
        }
        (END_ORD, -1.0, idx)
    } else {
        debug_assert!(nd.b > 0.0);
        let (c, prob, next) = sample_ch(tree, root, nd.fail, fail_banned, rand_val / nd.b);
        (c, prob * nd.b, next)
    }
}

/// Draw one sample by repeated CDF descent from `start_idx`, retrying the
/// whole draw on the rare underflow `sample_ch` signals with a
/// non-positive probability.
pub fn sample(tree: &[Node], root: usize, start_idx: usize, rng: &mut impl Rng) -> StrProb {
    loop {
        let mut s = Vec::new();
        let mut p = 1.0;
        let mut idx = start_idx;
        let mut underflowed = false;

        loop {
            let rand_val: f64 = rng.random();
            let (c, trans_prob, next) = sample_ch(tree, root, idx, BannedSet::empty(), rand_val);
            if trans_prob <= 0.0 {
                underflowed = true;
                break;
            }
            p *= trans_prob;
            if c == END_ORD {
                break;
            }
            s.push(chr(c));
            idx = next;
        }

        if underflowed {
            continue;
        }
        debug_assert!((p - pwd_prob(tree, root, start_idx, &s)).abs() < EPS);
        return (s, p);
    }
}

/// All strings scoring in `(min_thres, max_thres]`, sorted descending by
/// probability.
pub fn generate_by_threshold(
    tree: &[Node],
    root: usize,
    start_idx: usize,
    min_thres: f64,
    max_thres: f64,
) -> Vec<StrProb> {
    let mut guesses: Vec<StrProb> = Vec::new();
    {
        let mut sink = |s: &[u8], p: f64| guesses.push((s.to_vec(), p));
        let mut buf = Vec::new();
        ch_search(tree, root, min_thres, max_thres, start_idx, &mut buf, BannedSet::empty(), 1.0, &mut sink);
    }
    guesses.sort_by(|a, b| b.1.partial_cmp(&a.1).expect("probabilities are never NaN"));
    guesses
}

/// Iteratively shrink the threshold window until at least `cnt` guesses
/// have been collected, per §4.6; optionally truncate to exactly `cnt`.
pub fn generate(tree: &[Node], root: usize, start_idx: usize, cnt: u64, strict: bool) -> Vec<StrProb> {
    if cnt == 0 {
        return Vec::new();
    }
    let mut guesses: Vec<StrProb> = Vec::new();
    let mut min_threshold = 1.0 / cnt as f64;
    let mut max_threshold = 1.0;

    // Each pass searches a window strictly below the previous one
    // (max_threshold becomes the old min_threshold), so results accumulate
    // across passes rather than being recomputed.
    while (guesses.len() as u64) < cnt {
        {
            let mut sink = |s: &[u8], p: f64| guesses.push((s.to_vec(), p));
            let mut buf = Vec::new();
            ch_search(tree, root, min_threshold, max_threshold, start_idx, &mut buf, BannedSet::empty(), 1.0, &mut sink);
        }
        let guesses_size = guesses.len().max(1) as f64;
        max_threshold = min_threshold;
        min_threshold /= (2.0_f64).max(1.5 * cnt as f64 / guesses_size);
    }

    guesses.sort_by(|a, b| b.1.partial_cmp(&a.1).expect("probabilities are never NaN"));
    if strict {
        guesses.truncate(cnt as usize);
    }
    guesses
}

/// Estimate a probability threshold by Monte Carlo sampling, then run
/// [`generate_by_threshold`] at that threshold.
pub fn generate_by_montecarlo(
    tree: &[Node],
    root: usize,
    start_idx: usize,
    rng: &mut impl Rng,
    cnt: u64,
    num_samples: usize,
) -> Vec<StrProb> {
    let samples: Vec<f64> = (0..num_samples)
        .map(|_| sample(tree, root, start_idx, rng).1)
        .collect();
    let estimator = RankEstimator::new(samples);
    let threshold = estimator.inv_position(cnt as f64 * 1.1);
    generate_by_threshold(tree, root, start_idx, threshold, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::build_trie;
    use crate::counting_trie::CountingTrie;
    use crate::katz::KatzBackoff;
    use crate::kneser_ney::ModifiedKneserNey;
    use crate::smoother::Smoother;
    use rand::SeedableRng;

    fn kn_model(strings: &[&[u8]], gram_size: usize) -> (Vec<Node>, usize, usize) {
        let mut counting = CountingTrie::new(gram_size);
        for s in strings {
            counting.add_sub(s, 1).unwrap();
        }
        let smoother = ModifiedKneserNey {
            gram_size,
            discount_param: 3,
        };
        let (mut tree, root, start_idx) = build_trie(&counting, smoother.prune_threshold());
        smoother.fill_probabilities(&mut tree, root, start_idx).unwrap();
        (tree, root, start_idx)
    }

    fn katz_model(strings: &[&[u8]], gram_size: usize, k: u64) -> (Vec<Node>, usize, usize) {
        let mut counting = CountingTrie::new(gram_size);
        for s in strings {
            counting.add_sub(s, 1).unwrap();
        }
        let smoother = KatzBackoff { k };
        let (mut tree, root, start_idx) = build_trie(&counting, smoother.prune_threshold());
        smoother.fill_probabilities(&mut tree, root, start_idx).unwrap();
        (tree, root, start_idx)
    }

    #[test]
    fn seen_strings_outscore_unseen() {
        let (tree, root, start_idx) = kn_model(&[b"ab", b"ab", b"ac"], 3);
        let p_ab = pwd_prob(&tree, root, start_idx, b"ab");
        let p_ac = pwd_prob(&tree, root, start_idx, b"ac");
        let p_ad = pwd_prob(&tree, root, start_idx, b"ad");
        assert!(p_ab > p_ac);
        assert!(p_ac > p_ad);
        assert!(p_ad > 0.0);
    }

    #[test]
    fn sanity_check_passes_after_preprocess() {
        let (tree, root, _start_idx) = kn_model(&[b"pass", b"pass", b"word"], 5);
        assert!(sanity_check(&tree, root).is_ok());
        let (tree, root, _start_idx) = katz_model(&[b"pass", b"pass", b"word"], 8, 0);
        assert!(sanity_check(&tree, root).is_ok());
    }

    #[test]
    fn sample_score_consistency() {
        let (tree, root, start_idx) = kn_model(&[b"password", b"password", b"letmein"], 8);
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let (s, p) = sample(&tree, root, start_idx, &mut rng);
            let rescored = pwd_prob(&tree, root, start_idx, &s);
            assert!((p - rescored).abs() < 1e-8);
        }
    }

    #[test]
    fn generate_zero_returns_empty() {
        let (tree, root, start_idx) = kn_model(&[b"ab"], 4);
        assert!(generate(&tree, root, start_idx, 0, false).is_empty());
    }

    #[test]
    fn generate_strict_returns_exact_count_sorted_descending() {
        let (tree, root, start_idx) = kn_model(&[b"password", b"password", b"123456"], 6);
        let guesses = generate(&tree, root, start_idx, 50, true);
        assert_eq!(guesses.len(), 50);
        for w in guesses.windows(2) {
            assert!(w[0].1 >= w[1].1);
        }
    }

    #[test]
    fn threshold_search_matches_generate_membership() {
        let (tree, root, start_idx) = kn_model(&[b"password", b"password", b"123456"], 6);
        let p = pwd_prob(&tree, root, start_idx, b"password");
        let results = generate_by_threshold(&tree, root, start_idx, p * 0.999, 1.0);
        assert!(results.iter().any(|(s, _)| s == b"password"));
    }

    proptest::proptest! {
        #[test]
        fn pwd_prob_is_always_a_probability(bytes in proptest::collection::vec(0x20u8..=0x7E, 0..12)) {
            let (tree, root, start_idx) = kn_model(&[b"password", b"hunter2", b"letmein"], 6);
            let p = pwd_prob(&tree, root, start_idx, &bytes);
            proptest::prop_assert!((0.0..=1.0).contains(&p));
        }
    }
}
