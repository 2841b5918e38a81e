//! PharmacoScan query CLI.
//!
//! Thin front end over the query engine: parse flags, load the table,
//! run one request, export the result. Any failure prints an `ERROR:`
//! message and exits nonzero.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use pscan_engine::pscan_types::Tabular;
use pscan_engine::{
    parse_gene_text, parse_rsid_text, validate, write_table, AnnotationTable, CpicClient,
    QueryEngine, QueryError, QueryRequest, QueryResult,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Search a PharmacoScan probe annotation table by gene, rsID, or position.
#[derive(Parser, Debug)]
#[command(name = "pscan-query", version, about)]
struct Args {
    /// Path to the PharmacoScan annotation CSV
    #[arg(short, long)]
    file: PathBuf,

    /// Gene(s) to search for; comma-separated lists are accepted
    #[arg(short, long)]
    gene: Option<String>,

    /// rsID(s) to search for, in the form rs1234
    #[arg(short, long)]
    rsid: Option<String>,

    /// Chromosomal position to search for, e.g. 123456789
    #[arg(short, long)]
    position: Option<String>,

    /// Path to the output file; the extension picks the format
    #[arg(short, long, default_value = "./output.csv")]
    output: PathBuf,
}

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(written) => {
            tracing::info!("Results written to {}", written.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("ERROR: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> QueryResult<PathBuf> {
    let table = AnnotationTable::from_path(&args.file)?;
    tracing::info!(
        "Loaded {} probe records from {}",
        table.len(),
        args.file.display()
    );

    let request = build_request(args)?;
    let engine = QueryEngine::new(table);
    let outcome = engine.run(&request, &CpicClient::new())?;
    tracing::info!("Query matched {} result rows", Tabular::len(&outcome));

    write_table(&outcome, &args.output)
}

/// Turns the raw flag values into a validated-shape request.
///
/// Existence checks against the table happen inside the engine; this
/// only normalizes the text and rejects empty or malformed flags.
fn build_request(args: &Args) -> QueryResult<QueryRequest> {
    let mut request = QueryRequest::default();

    if let Some(text) = &args.gene {
        request.genes = parse_gene_text(text).ok_or(QueryError::NoInputSupplied)?;
    }
    if let Some(text) = &args.rsid {
        request.rsids = parse_rsid_text(text).ok_or_else(|| QueryError::RsidFormat {
            value: text.clone(),
        })?;
    }
    if let Some(text) = &args.position {
        request.position = Some(validate::parse_position(text)?);
    }

    if request.is_empty() {
        return Err(QueryError::NoInputSupplied);
    }

    Ok(request)
}
