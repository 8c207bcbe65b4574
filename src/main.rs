use anyhow::{Context, Result};
use clap::Parser;
use excise::cli::Args;
use excise::output;
use excise::{ScanOptions, Scanner};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG overrides the CLI flag, like any tracing-based tool.
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if args.debug {
        EnvFilter::new("excise=debug")
    } else {
        EnvFilter::new("excise=info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("excise v{}", env!("CARGO_PKG_VERSION"));
    anyhow::ensure!(
        args.input.exists(),
        "input file does not exist: {}",
        args.input.display()
    );

    let options = ScanOptions {
        extract: args.extract,
        recursion_depth: args.recursion_depth(),
        extraction_root: args.extraction_path.clone(),
        verbose: args.verbose,
    };
    let mut scanner = Scanner::new(options);

    info!("Opening {}...", args.input.display());
    let start = Instant::now();
    let results = scanner.scan(&args.input);

    output::print_results(&results, &args.input.display().to_string());
    if let Some(json_path) = &args.json_path {
        output::write_json_report(&results, json_path)
            .with_context(|| format!("writing report to {}", json_path.display()))?;
        info!("Report written to {}", json_path.display());
    }

    info!("Total elapsed time: {}ms", start.elapsed().as_millis());
    Ok(())
}
