//! specverify - Verify spec documents against code
//!
//! `check` scores how well code implements each spec, `coverage` measures how
//! many discovered routes have a spec, `routes` lists the discovered routes.

use clap::Parser;
use eyre::{Result, WrapErr};
use owo_colors::OwoColorize;
use specverify::cli::{Cli, Command};
use specverify::config::{
    Config, DotEnv, find_config_file, load_config, resolve_api_key, write_default_config,
};
use specverify::output::{render_coverage, render_routes, render_summary};
use specverify::reconcile::reconcile;
use specverify::{CancelSignal, RouteExtractor, Verifier, VerifierOptions, logging};
use specverify_core::{DiskFiles, FileSystem, Judge, Route, RouteSource, RouteSourceKind, Summary};
use specverify_judge::new_judge;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = config_path(&cli);

    if let Command::Init { force } = &cli.command {
        logging::init(cli.verbose);
        return run_init(&config_path, *force);
    }

    let config = load_config(&config_path)?;
    logging::init(cli.verbose || config.verbose());

    let (cancel_handle, cancel) = CancelSignal::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("{} Interrupted, cancelling...", "!".red().bold());
            cancel_handle.cancel();
        }
    });

    let passed = match &cli.command {
        Command::Init { .. } => true,
        Command::Check {
            file,
            spec_type,
            group,
            threshold,
            fail_under,
            concurrency,
        } => {
            let mut options = VerifierOptions::from_config(&config);
            if let Some(fail_under) = fail_under {
                options.fail_under = *fail_under;
            }
            if let Some(concurrency) = concurrency {
                options.concurrency = *concurrency;
            }
            let threshold = threshold.unwrap_or(config.pass_threshold());
            let check = CheckArgs {
                file: file.as_deref(),
                spec_type: spec_type.as_deref(),
                group: group.as_deref(),
                threshold,
            };
            run_check(&cli, &config, options, check, cancel).await?
        }
        Command::Routes { keep_going } => run_routes(&cli, &config, *keep_going, cancel).await?,
        Command::Coverage { threshold } => run_coverage(&cli, &config, *threshold, cancel).await?,
    };

    if !passed {
        std::process::exit(1);
    }
    Ok(())
}

fn run_init(path: &Path, force: bool) -> Result<()> {
    write_default_config(path, force)?;
    eprintln!(
        "{} Wrote {}",
        "✓".green().bold(),
        path.display().to_string().cyan()
    );
    eprintln!(
        "  Set {} (or your provider's key variable) before running {}",
        "SPEC_VERIFY_API_KEY".yellow(),
        "specverify check".bold()
    );
    Ok(())
}

fn build_judge(cli: &Cli, config: &Config) -> Result<Arc<dyn Judge>> {
    let provider = cli.provider.as_deref().unwrap_or(config.provider());
    let dotenv = DotEnv::load(Path::new("."));
    let api_key = resolve_api_key(cli.api_key.as_deref(), provider, config, |key| {
        dotenv.var(key)
    })
    .unwrap_or_default();

    new_judge(provider, &api_key).wrap_err(
        "Set SPEC_VERIFY_API_KEY (or the provider's own key variable), pass --api-key, \
         or add ai_api_key to the config file",
    )
}

struct CheckArgs<'a> {
    file: Option<&'a Path>,
    spec_type: Option<&'a str>,
    group: Option<&'a str>,
    threshold: u8,
}

async fn run_check(
    cli: &Cli,
    config: &Config,
    options: VerifierOptions,
    args: CheckArgs<'_>,
    cancel: CancelSignal,
) -> Result<bool> {
    let judge = build_judge(cli, config)?;
    let fail_under = options.fail_under;
    let verifier = Verifier::new(Arc::new(DiskFiles), judge.clone(), options);

    eprintln!(
        "{} Verifying specs in {} with {}...",
        "->".blue().bold(),
        verifier.options().specs_dir.display(),
        judge.name().cyan()
    );

    let summary = match (args.file, args.group) {
        (Some(file), _) => {
            let result = verifier.verify_one(file).await?;
            let mut summary = Summary::from_results(vec![result]);
            summary.apply_fail_under(fail_under);
            summary
        }
        (None, Some(group)) => {
            let types = config.group_types(group).ok_or_else(|| {
                let known: Vec<&str> = config.groups.keys().map(String::as_str).collect();
                eyre::eyre!(
                    "Unknown group '{}' (known groups: {})",
                    group,
                    if known.is_empty() {
                        "none".to_string()
                    } else {
                        known.join(", ")
                    }
                )
            })?;
            verifier.verify_group(types, cancel).await?
        }
        (None, None) => verifier.verify_all(args.spec_type, cancel).await?,
    };

    print!(
        "{}",
        render_summary(&summary, cli.format, args.threshold, cli.verbose)
    );

    Ok(summary.total_specs == 0
        || (summary.is_passing(args.threshold) && summary.failing_specs.is_empty()))
}

/// An extractor for the configured sources, with a judge only when a source needs one
fn build_extractor(cli: &Cli, config: &Config, sources: &[RouteSource]) -> Result<RouteExtractor> {
    let fs: Arc<dyn FileSystem> = Arc::new(DiskFiles);
    let extractor = RouteExtractor::new(fs).with_max_batch_bytes(config.max_batch_bytes());

    let needs_judge = sources
        .iter()
        .any(|source| matches!(source.kind, RouteSourceKind::Framework(_)));
    if needs_judge {
        Ok(extractor.with_judge(build_judge(cli, config)?))
    } else {
        Ok(extractor)
    }
}

fn route_sources(config: &Config, config_path: &Path) -> Result<Vec<RouteSource>> {
    let sources = config
        .route_sources()
        .wrap_err_with(|| format!("Invalid route sources in {}", config_path.display()))?;
    if sources.is_empty() {
        eyre::bail!(
            "No route sources configured. Add a route_sources list to {}",
            config_path.display()
        );
    }
    Ok(sources)
}

async fn extract_routes(
    extractor: &RouteExtractor,
    sources: &[RouteSource],
    keep_going: bool,
    mut cancel: CancelSignal,
) -> Result<Vec<Route>> {
    let extraction = async {
        if keep_going {
            let (routes, failures) = extractor.extract_best_effort(sources).await;
            for failure in &failures {
                eprintln!(
                    "{} {} source skipped: {:#}",
                    "!".yellow().bold(),
                    failure.source_type,
                    failure.error
                );
            }
            Ok(routes)
        } else {
            extractor.extract_all(sources).await
        }
    };

    tokio::select! {
        routes = extraction => routes,
        _ = cancel.cancelled() => eyre::bail!("Route extraction was cancelled"),
    }
}

fn config_path(cli: &Cli) -> PathBuf {
    cli.config
        .clone()
        .unwrap_or_else(|| find_config_file(Path::new(".")))
}

async fn run_routes(
    cli: &Cli,
    config: &Config,
    keep_going: bool,
    cancel: CancelSignal,
) -> Result<bool> {
    let sources = route_sources(config, &config_path(cli))?;
    let extractor = build_extractor(cli, config, &sources)?;

    eprintln!(
        "{} Extracting routes from {} sources...",
        "->".blue().bold(),
        sources.len()
    );
    let routes = extract_routes(&extractor, &sources, keep_going, cancel).await?;

    print!("{}", render_routes(&routes, cli.format));
    Ok(true)
}

async fn run_coverage(
    cli: &Cli,
    config: &Config,
    threshold: f64,
    mut cancel: CancelSignal,
) -> Result<bool> {
    let sources = route_sources(config, &config_path(cli))?;
    let extractor = build_extractor(cli, config, &sources)?;

    eprintln!(
        "{} Measuring route coverage of {} against {} sources...",
        "->".blue().bold(),
        config.specs_dir().display(),
        sources.len()
    );
    let specs_dir = config.specs_dir();
    let report = tokio::select! {
        report = reconcile(&extractor, &sources, &specs_dir) => report?,
        _ = cancel.cancelled() => eyre::bail!("Coverage measurement was cancelled"),
    };

    print!("{}", render_coverage(&report, cli.format, cli.verbose));
    Ok(report.is_passing(threshold))
}
