//! The public library surface: `new`, `add`, `train`, `score`, `sample`,
//! `generate*`. Wraps the counting trie during ingestion and the frozen,
//! scored trie afterwards; `train`/`preprocess` may run exactly once.

use crate::build::build_trie;
use crate::counting_trie::CountingTrie;
use crate::engine;
use crate::katz::KatzBackoff;
use crate::kneser_ney::ModifiedKneserNey;
use crate::node::Node;
use crate::smoother::Smoother;
use pg_common::{Error, Result, StrProb};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Number of initial PRNG draws discarded after OS-entropy seeding, to
/// mitigate seed collisions between runs started in the same instant
/// (mirrors the original's wall-clock-derived seed).
const SEED_DISCARD: u32 = 700_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeParams {
    Katz { k: u64 },
    ModifiedKn { discount_param: u32 },
}

enum Phase {
    Ingesting(CountingTrie),
    Trained { tree: Vec<Node>, root: usize, start_idx: usize },
}

pub struct Model {
    phase: Phase,
    gram_size: usize,
    scheme: SchemeParams,
    rng: StdRng,
}

impl Model {
    /// Construct an empty model ready for `add`/`train`. `gram_size`
    /// bounds counting-trie depth for both schemes; Katz additionally
    /// prunes by count via `scheme`'s `k`.
    pub fn new(scheme: SchemeParams, gram_size: usize, seed: Option<u64>) -> Result<Self> {
        if gram_size == 0 {
            return Err(Error::NonPositiveGramSize { value: 0 });
        }
        Ok(Model {
            phase: Phase::Ingesting(CountingTrie::new(gram_size)),
            gram_size,
            scheme,
            rng: make_rng(seed),
        })
    }

    /// Accumulate one training row with multiplicity `count`. Forbidden
    /// after `train`/`preprocess` has run.
    pub fn add(&mut self, s: &[u8], count: u64) -> Result<()> {
        match &mut self.phase {
            Phase::Ingesting(trie) => trie.add_sub(s, count),
            Phase::Trained { .. } => Err(Error::MalformedArgument {
                message: "cannot add training rows after preprocess".to_string(),
            }),
        }
    }

    /// Ingest every row of `data`, then freeze the model. Forbidden after
    /// an earlier `train`.
    pub fn train<'a, I>(&mut self, data: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a [u8], u64)>,
    {
        for (s, cnt) in data {
            self.add(s, cnt)?;
        }
        self.preprocess()
    }

    /// Convert the counting trie into the frozen, scored trie. Exposed
    /// separately from `train` so callers that built up counts via
    /// repeated `add` can still trigger it explicitly.
    pub fn preprocess(&mut self) -> Result<()> {
        let counting = match &self.phase {
            Phase::Ingesting(trie) => trie,
            Phase::Trained { .. } => {
                return Err(Error::MalformedArgument {
                    message: "preprocess already ran".to_string(),
                })
            }
        };

        let smoother: Box<dyn Smoother> = match self.scheme {
            SchemeParams::Katz { k } => Box::new(KatzBackoff { k }),
            SchemeParams::ModifiedKn { discount_param } => Box::new(ModifiedKneserNey {
                gram_size: self.gram_size,
                discount_param,
            }),
        };

        let (mut tree, root, start_idx) = build_trie(counting, smoother.prune_threshold());
        smoother.fill_probabilities(&mut tree, root, start_idx)?;
        self.phase = Phase::Trained { tree, root, start_idx };
        Ok(())
    }

    /// Run the full normalisation sanity check over every node. Not
    /// called automatically by `preprocess`; expensive on large models, so
    /// left to callers who want the extra assurance (tests, `--strict`
    /// CLI runs).
    pub fn sanity_check(&self) -> Result<()> {
        let (tree, root, _) = self.trained()?;
        engine::sanity_check(tree, root)
    }

    /// Model probability of `s`. Pure and reentrant.
    pub fn score(&self, s: &[u8]) -> Result<f64> {
        let (tree, root, start_idx) = self.trained()?;
        Ok(engine::pwd_prob(tree, root, start_idx, s))
    }

    /// Draw one sample, advancing the private PRNG.
    pub fn sample(&mut self) -> Result<StrProb> {
        let (tree, root, start_idx) = match &self.phase {
            Phase::Trained { tree, root, start_idx } => (tree, *root, *start_idx),
            Phase::Ingesting(_) => return Err(Error::Uninitialized),
        };
        Ok(engine::sample(tree, root, start_idx, &mut self.rng))
    }

    pub fn generate_by_threshold(&self, min: f64, max: f64) -> Result<Vec<StrProb>> {
        let (tree, root, start_idx) = self.trained()?;
        Ok(engine::generate_by_threshold(tree, root, start_idx, min, max))
    }

    pub fn generate(&self, count: u64, strict: bool) -> Result<Vec<StrProb>> {
        let (tree, root, start_idx) = self.trained()?;
        Ok(engine::generate(tree, root, start_idx, count, strict))
    }

    pub fn generate_by_montecarlo(&mut self, count: u64, num_samples: usize) -> Result<Vec<StrProb>> {
        let (tree, root, start_idx) = match &self.phase {
            Phase::Trained { tree, root, start_idx } => (tree, *root, *start_idx),
            Phase::Ingesting(_) => return Err(Error::Uninitialized),
        };
        Ok(engine::generate_by_montecarlo(
            tree,
            root,
            start_idx,
            &mut self.rng,
            count,
            num_samples,
        ))
    }

    fn trained(&self) -> Result<(&Vec<Node>, usize, usize)> {
        match &self.phase {
            Phase::Trained { tree, root, start_idx } => Ok((tree, *root, *start_idx)),
            Phase::Ingesting(_) => Err(Error::Uninitialized),
        }
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => {
            let mut rng = StdRng::from_os_rng();
            for _ in 0..SEED_DISCARD {
                let _: f64 = rng.random();
            }
            rng
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_training_set_fails_katz_preprocess() {
        let mut model = Model::new(SchemeParams::Katz { k: 0 }, 8, Some(1)).unwrap();
        let err = model.preprocess().unwrap_err();
        assert_eq!(err.category(), pg_common::ErrorCategory::InvalidArgument);
    }

    #[test]
    fn score_before_preprocess_is_uninitialized() {
        let model = Model::new(SchemeParams::ModifiedKn { discount_param: 3 }, 8, Some(1)).unwrap();
        assert!(matches!(model.score(b"abc"), Err(Error::Uninitialized)));
    }

    #[test]
    fn add_after_preprocess_is_rejected() {
        let mut model = Model::new(SchemeParams::ModifiedKn { discount_param: 3 }, 8, Some(1)).unwrap();
        model.train(vec![(b"ab".as_slice(), 1)]).unwrap();
        assert!(model.add(b"cd", 1).is_err());
    }

    #[test]
    fn single_training_string_scores_positive() {
        let mut model = Model::new(SchemeParams::ModifiedKn { discount_param: 3 }, 8, Some(1)).unwrap();
        model.train(vec![(b"hunter2".as_slice(), 1)]).unwrap();
        assert!(model.score(b"hunter2").unwrap() > 0.0);
        assert!(model.score(b"zzz").unwrap() > 0.0);
    }

    #[test]
    fn idempotent_training_single_call_vs_repeated_add() {
        let mut via_train = Model::new(SchemeParams::ModifiedKn { discount_param: 3 }, 6, Some(7)).unwrap();
        via_train
            .train(vec![(b"ab".as_slice(), 2), (b"ac".as_slice(), 1)])
            .unwrap();

        let mut via_add = Model::new(SchemeParams::ModifiedKn { discount_param: 3 }, 6, Some(7)).unwrap();
        via_add.add(b"ab", 1).unwrap();
        via_add.add(b"ab", 1).unwrap();
        via_add.add(b"ac", 1).unwrap();
        via_add.preprocess().unwrap();

        assert_eq!(via_train.score(b"ab").unwrap(), via_add.score(b"ab").unwrap());
        assert_eq!(via_train.score(b"ac").unwrap(), via_add.score(b"ac").unwrap());
    }
}
