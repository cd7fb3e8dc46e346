//! `guesser` — character-level n-gram password strength and guessing CLI.

use clap::Parser;
use pg_common::{Error, Result};
use pg_config::{resolve_config, validate, CliOverrides, SchemeKind};
use pg_core::cli::{Cli, Command, SampleArgs, ScoreArgs, TrainArgs};
use pg_core::exit_codes::ExitCode;
use pg_core::logging::{init_logging, LogConfig};
use pg_core::model::{Model, SchemeParams};
use std::io::{BufRead, Write};
use std::path::Path;
use std::str::FromStr;

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig {
        level: cli.global.log_level(),
        format: cli.global.log_format(),
    };
    init_logging(&log_config);

    let exit_code = run(&cli).unwrap_or_else(|err| {
        tracing::error!(error = %err, "guesser failed");
        ExitCode::from(&err)
    });

    std::process::exit(exit_code.as_i32());
}

fn run(cli: &Cli) -> Result<ExitCode> {
    match &cli.command {
        Command::Train(args) => {
            let (scheme, gram_size, seed) = resolve(cli, &args.scheme, args.gram_size_or_k)?;
            run_train(args, scheme, gram_size, seed)
        }
        Command::Score(args) => {
            let (scheme, gram_size, seed) = resolve(cli, &args.scheme, args.gram_size_or_k)?;
            run_score(args, scheme, gram_size, seed)
        }
        Command::Sample(args) => {
            let (scheme, gram_size, seed) = resolve(cli, &args.scheme, args.gram_size_or_k)?;
            run_sample(args, scheme, gram_size, seed)
        }
    }
}

/// Resolve the effective scheme, gram size, and seed for one invocation.
///
/// `gram_size_or_k` is a single CLI positional whose meaning depends on
/// `scheme`: the counting-trie depth for Modified Kneser-Ney, the Katz
/// pruning threshold `K` for Katz backoff (whose own trie depth instead
/// falls back to config/env/default, per `ModelConfig::DEFAULT_GRAM_SIZE`).
fn resolve(cli: &Cli, scheme: &str, gram_size_or_k: u64) -> Result<(SchemeParams, usize, Option<u64>)> {
    let scheme_kind = SchemeKind::from_str(scheme)?;

    let cli_overrides = match scheme_kind {
        SchemeKind::Katz => CliOverrides {
            scheme: Some(scheme_kind),
            gram_size: None,
            katz_k: Some(gram_size_or_k),
            kn_discount: cli.global.kn_discount,
            seed: cli.global.seed,
        },
        SchemeKind::ModifiedKn => CliOverrides {
            scheme: Some(scheme_kind),
            gram_size: Some(gram_size_or_k as usize),
            katz_k: None,
            kn_discount: cli.global.kn_discount,
            seed: cli.global.seed,
        },
    };

    let config = resolve_config(&cli_overrides, cli.global.config.as_deref())?;
    validate(&config)?;

    let scheme = match config.scheme {
        SchemeKind::Katz => SchemeParams::Katz {
            k: config.katz_k.expect("validated above"),
        },
        SchemeKind::ModifiedKn => SchemeParams::ModifiedKn {
            discount_param: config.kn_discount,
        },
    };

    Ok((scheme, config.gram_size, config.seed))
}

fn run_train(args: &TrainArgs, scheme: SchemeParams, gram_size: usize, seed: Option<u64>) -> Result<ExitCode> {
    let mut model = train_model(&args.train_path, scheme, gram_size, seed)?;

    if args.strict_sanity {
        model.sanity_check()?;
    }

    let guesses = if args.montecarlo {
        model.generate_by_montecarlo(args.count, args.num_samples)?
    } else {
        model.generate(args.count, args.strict)?
    };

    tracing::info!(rows = guesses.len(), "generated guesses");
    write_guesses(&args.output_path, &guesses)?;
    Ok(ExitCode::Ok)
}

fn run_score(args: &ScoreArgs, scheme: SchemeParams, gram_size: usize, seed: Option<u64>) -> Result<ExitCode> {
    let model = train_model(&args.train_path, scheme, gram_size, seed)?;
    let prob = model.score(args.string.as_bytes())?;
    println!("{prob}");
    Ok(ExitCode::Ok)
}

fn run_sample(args: &SampleArgs, scheme: SchemeParams, gram_size: usize, seed: Option<u64>) -> Result<ExitCode> {
    let mut model = train_model(&args.train_path, scheme, gram_size, seed)?;
    for _ in 0..args.count {
        let (s, prob) = model.sample()?;
        println!("{}\t{prob}", String::from_utf8_lossy(&s));
    }
    Ok(ExitCode::Ok)
}

fn train_model(train_path: &Path, scheme: SchemeParams, gram_size: usize, seed: Option<u64>) -> Result<Model> {
    let mut model = Model::new(scheme, gram_size, seed)?;

    let file = std::fs::File::open(train_path).map_err(|e| Error::io(train_path.display().to_string(), e))?;
    let reader = std::io::BufReader::new(file);
    let mut rows = 0u64;

    for line in reader.lines() {
        let line = line.map_err(|e| Error::io(train_path.display().to_string(), e))?;
        if line.is_empty() {
            continue;
        }
        let (s, cnt) = parse_row(&line)?;
        model.add(s.as_bytes(), cnt)?;
        rows += 1;
    }

    tracing::info!(rows, gram_size, "training data ingested");
    model.preprocess()?;
    Ok(model)
}

fn parse_row(line: &str) -> Result<(&str, u64)> {
    match line.rsplit_once('\t') {
        Some((s, cnt)) => {
            let cnt = cnt.trim().parse::<u64>().map_err(|_| Error::MalformedArgument {
                message: format!("invalid count column: {cnt:?}"),
            })?;
            Ok((s, cnt))
        }
        None => Ok((line, 1)),
    }
}

fn write_guesses(path: &Path, guesses: &[(Vec<u8>, f64)]) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| Error::io(path.display().to_string(), e))?;
    let mut writer = std::io::BufWriter::new(file);
    for (s, prob) in guesses {
        writeln!(writer, "{}\t{prob}", String::from_utf8_lossy(s))
            .map_err(|e| Error::io(path.display().to_string(), e))?;
    }
    writer.flush().map_err(|e| Error::io(path.display().to_string(), e))
}
