//! User input parsing.
//!
//! Turns raw text or file input into a normalized list of identifiers,
//! independent of source. Gene lists split on newlines and commas; rsIDs
//! are extracted by pattern from anywhere in the text, so surrounding
//! prose is ignored. An empty parse is reported as "no data" (`None`),
//! never as an empty list.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use csv::ReaderBuilder;
use regex::Regex;
use pscan_types::normalize;

use crate::error::{QueryError, QueryResult};

/// Matches rs-numbers anywhere in free text.
fn rsid_extract_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)rs\d+").expect("valid rsID pattern"))
}

/// Which identifier type an input carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    /// Gene symbols.
    Gene,
    /// dbSNP rs-numbers.
    Rsid,
}

/// Parses freeform gene text into normalized symbols.
///
/// Splits on newlines, then commas; trims whitespace, uppercases, drops
/// empty tokens. Returns `None` when nothing usable remains.
///
/// # Examples
///
/// ```
/// use pscan_engine::parse_gene_text;
///
/// let genes = parse_gene_text("cyp2d6,\ncyp2c9 ").unwrap();
/// assert_eq!(genes, vec!["CYP2D6", "CYP2C9"]);
/// ```
pub fn parse_gene_text(text: &str) -> Option<Vec<String>> {
    let genes: Vec<String> = text
        .lines()
        .flat_map(|line| line.split(','))
        .map(normalize::gene)
        .filter(|gene| !gene.is_empty())
        .collect();

    if genes.is_empty() {
        None
    } else {
        Some(genes)
    }
}

/// Extracts every rs-number from freeform text, lowercased.
///
/// Duplicates are preserved; deduplication happens later at filter time.
/// Returns `None` when the text contains no rs-numbers.
///
/// # Examples
///
/// ```
/// use pscan_engine::parse_rsid_text;
///
/// let rsids = parse_rsid_text("see RS1234 and rs5678!").unwrap();
/// assert_eq!(rsids, vec!["rs1234", "rs5678"]);
/// ```
pub fn parse_rsid_text(text: &str) -> Option<Vec<String>> {
    let rsids: Vec<String> = rsid_extract_pattern()
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect();

    if rsids.is_empty() {
        None
    } else {
        Some(rsids)
    }
}

/// Guesses the identifier kind of a parsed token list.
///
/// If the first token contains an rs-number the list is treated as
/// rsIDs, otherwise as gene symbols.
pub fn detect_kind(tokens: &[String]) -> IdentifierKind {
    match tokens.first() {
        Some(first) if rsid_extract_pattern().is_match(first) => IdentifierKind::Rsid,
        _ => IdentifierKind::Gene,
    }
}

/// Reads identifiers of the given kind from a file.
///
/// Gene files are read as CSV: every cell on every line is one gene
/// token. rsID files are read as raw text and run through the same
/// rs-number extraction as typed input. Returns `Ok(None)` when the file
/// parses but contains no identifiers.
///
/// # Errors
///
/// [`QueryError::FileNotFound`], [`QueryError::PermissionDenied`], and
/// [`QueryError::Decode`] for the corresponding file problems.
pub fn read_identifier_file<P: AsRef<Path>>(
    path: P,
    kind: IdentifierKind,
) -> QueryResult<Option<Vec<String>>> {
    let path = path.as_ref();

    if !path.is_file() {
        return Err(QueryError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    match kind {
        IdentifierKind::Gene => read_gene_file(path),
        IdentifierKind::Rsid => {
            let text = fs::read_to_string(path).map_err(|e| QueryError::from_io(path, e))?;
            Ok(parse_rsid_text(&text))
        }
    }
}

fn read_gene_file(path: &Path) -> QueryResult<Option<Vec<String>>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| QueryError::from_csv(path, e))?;

    let mut genes = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| QueryError::from_csv(path, e))?;
        for cell in record.iter() {
            let gene = normalize::gene(cell);
            if !gene.is_empty() {
                genes.push(gene);
            }
        }
    }

    if genes.is_empty() {
        Ok(None)
    } else {
        Ok(Some(genes))
    }
}

/// One front end submission: freeform text and/or an uploaded file.
///
/// The two sources are mutually exclusive; resolution enforces that
/// rather than silently preferring one.
#[derive(Debug, Clone, Default)]
pub struct QueryInput {
    /// Freeform text typed by the user.
    pub text: Option<String>,
    /// Path of an uploaded identifier file.
    pub file: Option<PathBuf>,
}

impl QueryInput {
    /// Builds an input from freeform text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            file: None,
        }
    }

    /// Builds an input from an identifier file path.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            text: None,
            file: Some(path.into()),
        }
    }

    /// Resolves the input to a normalized identifier list.
    ///
    /// # Errors
    ///
    /// [`QueryError::ConflictingInput`] when both text and a file are
    /// supplied, regardless of which is non-empty;
    /// [`QueryError::NoInputSupplied`] when neither is supplied or the
    /// supplied source parses to nothing; file errors as in
    /// [`read_identifier_file`].
    pub fn resolve(&self, kind: IdentifierKind) -> QueryResult<Vec<String>> {
        match (&self.text, &self.file) {
            (Some(_), Some(_)) => Err(QueryError::ConflictingInput),
            (Some(text), None) => {
                let parsed = match kind {
                    IdentifierKind::Gene => parse_gene_text(text),
                    IdentifierKind::Rsid => parse_rsid_text(text),
                };
                parsed.ok_or(QueryError::NoInputSupplied)
            }
            (None, Some(path)) => {
                read_identifier_file(path, kind)?.ok_or(QueryError::NoInputSupplied)
            }
            (None, None) => Err(QueryError::NoInputSupplied),
        }
    }
}
