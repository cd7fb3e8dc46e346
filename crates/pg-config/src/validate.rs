//! Validation that turns a syntactically well-formed [`ModelConfig`] into
//! one guaranteed safe to build a model from.

use crate::model_config::ModelConfig;
use crate::scheme::SchemeKind;
use pg_common::{Error, Result};

/// Check internal consistency of `cfg`: gram size must be positive, and a
/// Katz scheme must carry an explicit `katz_k`.
pub fn validate(cfg: &ModelConfig) -> Result<()> {
    if cfg.gram_size == 0 {
        return Err(Error::NonPositiveGramSize { value: 0 });
    }
    if cfg.scheme == SchemeKind::Katz && cfg.katz_k.is_none() {
        return Err(Error::MalformedArgument {
            message: "katz scheme requires katz_k".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_gram_size() {
        let cfg = ModelConfig {
            gram_size: 0,
            ..ModelConfig::default()
        };
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn katz_without_k_is_rejected() {
        let cfg = ModelConfig {
            scheme: SchemeKind::Katz,
            katz_k: None,
            ..ModelConfig::default()
        };
        let err = validate(&cfg).unwrap_err();
        assert_eq!(err.category(), pg_common::ErrorCategory::InvalidArgument);
    }

    #[test]
    fn katz_with_k_is_accepted() {
        let cfg = ModelConfig {
            scheme: SchemeKind::Katz,
            katz_k: Some(1),
            ..ModelConfig::default()
        };
        assert!(validate(&cfg).is_ok());
    }
}
