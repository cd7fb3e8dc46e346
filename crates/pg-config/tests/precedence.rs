//! CLI > env > file > default precedence, exercised end-to-end through the
//! public `pg_config` surface.

use pg_config::{resolve_config, validate, CliOverrides, ModelConfig, SchemeKind};
use std::io::Write;
use std::sync::Mutex;

// Environment variables are process-global; serialize tests that touch them.
static ENV_LOCK: Mutex<()> = Mutex::new(());

#[test]
fn cli_beats_env_beats_file_beats_default() {
    let _guard = ENV_LOCK.lock().unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "scheme = \"katz\"\nkatz_k = 9\ngram_size = 11\n").unwrap();

    std::env::set_var("PG_GRAM_SIZE", "22");
    std::env::set_var("PG_SEED", "555");

    let cli = CliOverrides {
        scheme: Some(SchemeKind::ModifiedKn),
        ..Default::default()
    };
    let cfg = resolve_config(&cli, Some(file.path())).unwrap();

    // CLI wins for `scheme`.
    assert_eq!(cfg.scheme, SchemeKind::ModifiedKn);
    // Env wins for `gram_size` over the file's value.
    assert_eq!(cfg.gram_size, 22);
    // File wins for `katz_k` since neither CLI nor env set it.
    assert_eq!(cfg.katz_k, Some(9));
    // Env-only value passes through untouched.
    assert_eq!(cfg.seed, Some(555));

    std::env::remove_var("PG_GRAM_SIZE");
    std::env::remove_var("PG_SEED");
}

#[test]
fn no_overrides_and_no_file_yields_defaults() {
    let _guard = ENV_LOCK.lock().unwrap();
    let cfg = resolve_config(&CliOverrides::default(), None).unwrap();
    assert_eq!(cfg, ModelConfig::default());
}

#[test]
fn invalid_scheme_in_file_rejected_same_as_invalid_cli_flag() {
    let _guard = ENV_LOCK.lock().unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "scheme = \"quantum\"\n").unwrap();
    let from_file = resolve_config(&CliOverrides::default(), Some(file.path())).unwrap_err();

    let from_cli = "quantum".parse::<SchemeKind>().unwrap_err();

    assert_eq!(from_file.category(), pg_common::ErrorCategory::InvalidArgument);
    assert_eq!(from_cli.category(), pg_common::ErrorCategory::InvalidArgument);
}

#[test]
fn resolved_katz_config_without_k_fails_validation() {
    let _guard = ENV_LOCK.lock().unwrap();
    let cli = CliOverrides {
        scheme: Some(SchemeKind::Katz),
        ..Default::default()
    };
    let cfg = resolve_config(&cli, None).unwrap();
    assert!(validate(&cfg).is_err());
}
