//! Layered configuration resolution: CLI flags override environment
//! variables, which override an optional TOML file, which overrides the
//! built-in default.

use crate::model_config::ModelConfig;
use crate::scheme::SchemeKind;
use pg_common::{Error, Result};
use std::path::Path;
use std::str::FromStr;

const ENV_SCHEME: &str = "PG_SCHEME";
const ENV_GRAM_SIZE: &str = "PG_GRAM_SIZE";
const ENV_KATZ_K: &str = "PG_KATZ_K";
const ENV_KN_DISCOUNT: &str = "PG_KN_DISCOUNT";
const ENV_SEED: &str = "PG_SEED";

/// Per-field overrides taken directly from parsed CLI flags. `None` means
/// "not given on the command line" and falls through to the next layer.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub scheme: Option<SchemeKind>,
    pub gram_size: Option<usize>,
    pub katz_k: Option<u64>,
    pub kn_discount: Option<u32>,
    pub seed: Option<u64>,
}

/// Resolve a [`ModelConfig`] from, in descending priority: `cli`,
/// environment variables, an optional TOML file at `config_path`, and
/// built-in defaults.
pub fn resolve_config(cli: &CliOverrides, config_path: Option<&Path>) -> Result<ModelConfig> {
    let mut cfg = match config_path {
        Some(path) => load_file(path)?,
        None => ModelConfig::default(),
    };

    if let Some(v) = env_scheme()? {
        cfg.scheme = v;
    }
    if let Some(v) = env_parsed::<usize>(ENV_GRAM_SIZE)? {
        cfg.gram_size = v;
    }
    if let Some(v) = env_parsed::<u64>(ENV_KATZ_K)? {
        cfg.katz_k = Some(v);
    }
    if let Some(v) = env_parsed::<u32>(ENV_KN_DISCOUNT)? {
        cfg.kn_discount = v;
    }
    if let Some(v) = env_parsed::<u64>(ENV_SEED)? {
        cfg.seed = Some(v);
    }

    if let Some(v) = cli.scheme {
        cfg.scheme = v;
    }
    if let Some(v) = cli.gram_size {
        cfg.gram_size = v;
    }
    if let Some(v) = cli.katz_k {
        cfg.katz_k = Some(v);
    }
    if let Some(v) = cli.kn_discount {
        cfg.kn_discount = v;
    }
    if let Some(v) = cli.seed {
        cfg.seed = Some(v);
    }

    Ok(cfg)
}

fn load_file(path: &Path) -> Result<ModelConfig> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path.display().to_string(), e))?;
    toml::from_str(&text).map_err(|e| Error::Config {
        message: format!("{}: {e}", path.display()),
    })
}

fn env_scheme() -> Result<Option<SchemeKind>> {
    match std::env::var(ENV_SCHEME) {
        Ok(v) => Ok(Some(SchemeKind::from_str(&v)?)),
        Err(_) => Ok(None),
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::MalformedArgument {
                message: format!("{key}={v} is not a valid value"),
            }),
        Err(_) => Ok(None),
    }
}
