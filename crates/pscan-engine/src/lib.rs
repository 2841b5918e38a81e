//! # pscan-engine
//!
//! Query, filter, and enrichment engine for PharmacoScan probe
//! annotation tables.
//!
//! The engine is the single core behind every front end: it loads the
//! reference table, parses and validates user-supplied identifiers,
//! filters and deduplicates rows, derives probe counts, optionally
//! merges in CPIC allele definition data fetched from PharmGKB, and
//! exports the result table. Front ends reduce to collect input → build
//! a [`QueryRequest`] → [`QueryEngine::run`] → render or
//! [`write_table`].
//!
//! ```no_run
//! use pscan_engine::{AnnotationTable, CpicClient, QueryEngine, QueryRequest, write_table};
//!
//! # fn main() -> pscan_engine::QueryResult<()> {
//! let table = AnnotationTable::from_path("annotations.csv")?;
//! let engine = QueryEngine::new(table);
//!
//! let request = QueryRequest {
//!     genes: vec!["CYP2D6".to_string()],
//!     ..Default::default()
//! };
//! let outcome = engine.run(&request, &CpicClient::new())?;
//! write_table(&outcome, "output.csv")?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod engine;
mod enrich;
mod error;
mod export;
mod filter;
mod input;
mod loader;
mod merge;
pub mod validate;

// Re-export pscan-types for convenience
pub use pscan_types;

pub use engine::{ArrayOutcome, QueryEngine, QueryOutcome, QueryRequest};
pub use enrich::{
    merge_allele_maps, parse_allele_workbook, AlleleMap, AlleleSource, CpicClient,
    StaticAlleleSource,
};
pub use error::{QueryError, QueryResult};
pub use export::write_table;
pub use filter::{GeneVariantTable, PresenceTable, SummaryTable};
pub use input::{
    detect_kind, parse_gene_text, parse_rsid_text, read_identifier_file, IdentifierKind,
    QueryInput,
};
pub use loader::{AnnotationTable, ArrayTable};
