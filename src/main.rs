use std::{path::PathBuf, process::ExitCode, time::Instant};

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub mod bm25;
pub mod cli;
pub mod crawler;
pub mod data_dir;
pub mod error;
pub mod extract;
pub mod ignore;
pub mod indexer;
pub mod query;
pub mod storage;
pub mod tokenize;

use bm25::Bm25Params;
use cli::{Cli, Command, FindArgs, IndexArgs};
use data_dir::DataDir;
use ignore::IgnoreSet;
use query::SearchParams;

fn init_tracing(verbose: u8) {
    let filter = if let Ok(env) = std::env::var("FILEBRAIN_LOG") {
        EnvFilter::new(env)
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run(cli: Cli) -> error::Result<()> {
    match cli.command {
        Command::Index(args) => {
            let data_dir = DataDir::resolve(cli.data_dir.as_deref())?;
            cmd_index(&data_dir, &args)
        }
        Command::Find(args) => {
            let data_dir = DataDir::resolve(cli.data_dir.as_deref())?;
            cmd_find(&data_dir, &args)
        }
        Command::Completions(args) => {
            args.generate();
            Ok(())
        }
    }
}

fn cmd_index(data_dir: &DataDir, args: &IndexArgs) -> error::Result<()> {
    let roots = if args.roots.is_empty() {
        default_roots()
    } else {
        args.roots.clone()
    };
    let ignore = IgnoreSet::load(args.ignore_config.as_deref());
    let extensions = args.extension_filter();
    let ocr = args.ocr.as_deref().and_then(extract::resolve_ocr);

    let total_start = Instant::now();

    let crawl_start = Instant::now();
    let records = crawler::discover(&roots, &ignore, extensions.as_ref())?;
    let crawl_ms = crawl_start.elapsed().as_secs_f64() * 1000.0;

    indexer::write_catalog(data_dir, &records)?;

    let build_start = Instant::now();
    let stats = indexer::build_index(
        data_dir,
        ocr.as_deref(),
        Bm25Params {
            k1: args.k1,
            b: args.b,
        },
    )?;
    let build_ms = build_start.elapsed().as_secs_f64() * 1000.0;
    let total_ms = total_start.elapsed().as_secs_f64() * 1000.0;

    println!(
        "Indexed {} documents ({} searchable) -> {}",
        records.len(),
        stats.documents,
        data_dir.catalog_path().display()
    );
    println!(
        "BM25 index stored in {}",
        data_dir.index_path().display()
    );
    println!(
        "Timing: crawl {crawl_ms:.1} ms | index {build_ms:.1} ms | total {total_ms:.1} ms"
    );
    Ok(())
}

fn cmd_find(data_dir: &DataDir, args: &FindArgs) -> error::Result<()> {
    let params = SearchParams {
        query: args.query.clone(),
        k: args.k,
        recency_boost: !args.no_recency_boost,
    };

    let start = Instant::now();
    let results = query::search(data_dir, &params)?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    if args.json {
        query::format_json(&results, &args.query)?;
    } else {
        query::format_human(&results, elapsed_ms);
    }
    Ok(())
}

/// Common user folders scanned when `index` is run without explicit roots.
fn default_roots() -> Vec<PathBuf> {
    [dirs::download_dir(), dirs::document_dir(), dirs::desktop_dir()]
        .into_iter()
        .flatten()
        .collect()
}
