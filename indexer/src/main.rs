use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use gutensearch_core::catalog::{save_catalog, scan_headers};
use gutensearch_core::{build_index, build_index_parallel, read_corpus, ControlLedger, StoreKind};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "gutensearch-indexer")]
#[command(about = "Build and publish the inverted index over a harvested datalake", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the index from the datalake and persist it through one backend
    Build {
        /// Root of the harvested corpus
        #[arg(long, default_value = "datalake")]
        datalake: PathBuf,
        /// Root for persisted index artifacts
        #[arg(long, default_value = "datamarts")]
        datamarts: PathBuf,
        /// Directory holding the control ledger
        #[arg(long, default_value = "control")]
        control: PathBuf,
        /// Persistence backend
        #[arg(long, value_enum, default_value = "monolith")]
        store: StoreArg,
        /// Indexing threads; 1 builds sequentially
        #[arg(long, default_value_t = 1)]
        jobs: usize,
    },
    /// Scan header files into the bibliographic catalog
    Catalog {
        #[arg(long, default_value = "datalake")]
        datalake: PathBuf,
        #[arg(long, default_value = "datamarts")]
        datamarts: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StoreArg {
    Monolith,
    Partitioned,
    Docstore,
}

impl From<StoreArg> for StoreKind {
    fn from(arg: StoreArg) -> Self {
        match arg {
            StoreArg::Monolith => StoreKind::Monolith,
            StoreArg::Partitioned => StoreKind::Partitioned,
            StoreArg::Docstore => StoreKind::DocStore,
        }
    }
}

/// Written next to the artifacts after every successful build.
#[derive(Serialize)]
struct BuildManifest {
    built_at: String,
    store: String,
    location: String,
    documents: usize,
    terms: usize,
    postings: usize,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { datalake, datamarts, control, store, jobs } => {
            run_build(&datalake, &datamarts, &control, store.into(), jobs)
        }
        Commands::Catalog { datalake, datamarts } => run_catalog(&datalake, &datamarts),
    }
}

fn run_build(
    datalake: &Path,
    datamarts: &Path,
    control: &Path,
    kind: StoreKind,
    jobs: usize,
) -> Result<()> {
    let started = Instant::now();
    tracing::info!(datalake = %datalake.display(), store = %kind, jobs, "starting build");

    let corpus = read_corpus(datalake);
    let documents = corpus.len();
    let out = if jobs > 1 {
        build_index_parallel(&corpus, jobs)
    } else {
        build_index(corpus)
    };
    tracing::info!(
        documents,
        terms = out.index.term_count(),
        postings = out.index.posting_count(),
        "index built"
    );

    let store = kind.open(datamarts)?;
    let location = store.persist(&out.index)?;

    let ledger = ControlLedger::new(control);
    ledger.record(&out.processed)?;

    let manifest = BuildManifest {
        built_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into()),
        store: kind.to_string(),
        location: location.clone(),
        documents,
        terms: out.index.term_count(),
        postings: out.index.posting_count(),
    };
    fs::create_dir_all(datamarts)?;
    fs::write(
        datamarts.join("manifest.json"),
        serde_json::to_vec_pretty(&manifest)?,
    )?;

    tracing::info!(
        location = %location,
        ledger = %ledger.path().display(),
        elapsed_s = started.elapsed().as_secs_f64(),
        "build complete"
    );
    Ok(())
}

fn run_catalog(datalake: &Path, datamarts: &Path) -> Result<()> {
    let started = Instant::now();
    let entries = scan_headers(datalake);
    save_catalog(datamarts, &entries)?;
    tracing::info!(
        entries = entries.len(),
        elapsed_s = started.elapsed().as_secs_f64(),
        "catalog built"
    );
    Ok(())
}
