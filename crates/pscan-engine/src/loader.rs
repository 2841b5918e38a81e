//! Reference table loaders.
//!
//! Loads and normalizes the static annotation table into the in-memory
//! schema used by all queries. Two schema variants exist: the vendor
//! annotation CSV (CLI and web front ends) and the prebuilt array table
//! (GUI front end). Lines beginning with `#` are comments in both.
//!
//! Loaded tables are read-only for the rest of the process: every filter
//! operation returns a new table.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use pscan_types::{normalize, position_cell, ArrayRecord, Position, ProbeRecord, Tabular};

use crate::error::{QueryError, QueryResult};
use crate::validate::ReferenceLookup;

/// Expected columns in the vendor annotation CSV.
const ANNOTATION_COLUMNS: &[&str] = &[
    "Probe Set ID",
    "Associated Gene",
    "dbSNP RS ID",
    "Chromosome",
    "Physical Position",
];

/// Expected columns in the prebuilt array table.
const ARRAY_COLUMNS: &[&str] = &[
    "Probe Set ID",
    "Chromosome",
    "Position",
    "Ref",
    "Alt",
    "Gene",
    "Probe Count",
    "rsID",
];

/// Placeholder the vendor files use for missing values.
const MISSING: &str = "---";

/// The loaded vendor annotation table.
///
/// Holds one [`ProbeRecord`] per annotation row plus distinct-value
/// indexes used by the validator. Construct with [`AnnotationTable::
/// from_path`] or [`AnnotationTable::from_reader`].
#[derive(Debug, Clone)]
pub struct AnnotationTable {
    records: Vec<ProbeRecord>,
    genes: HashSet<String>,
    rsids: HashSet<String>,
    positions: HashSet<Position>,
}

impl AnnotationTable {
    /// Loads the annotation table from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::FileNotFound`] when the path does not exist,
    /// [`QueryError::PermissionDenied`] on access denial, and
    /// [`QueryError::Decode`] when the file is not valid CSV text or a
    /// required column is missing.
    pub fn from_path<P: AsRef<Path>>(path: P) -> QueryResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(QueryError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let file = File::open(path).map_err(|e| QueryError::from_io(path, e))?;
        Self::read_from(BufReader::new(file), path)
    }

    /// Loads the annotation table from any reader.
    pub fn from_reader<R: Read>(reader: R) -> QueryResult<Self> {
        Self::read_from(reader, Path::new("input"))
    }

    fn read_from<R: Read>(reader: R, path: &Path) -> QueryResult<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .comment(Some(b'#'))
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| QueryError::from_csv(path, e))?
            .clone();
        let idx = column_indexes(&headers, ANNOTATION_COLUMNS, path)?;

        let mut records = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(|e| QueryError::from_csv(path, e))?;
            records.push(ProbeRecord {
                probeset_id: field(&record, idx[0]),
                gene: normalize::gene(&optional_field(&record, idx[1])),
                rsid: normalize::rsid(&optional_field(&record, idx[2])),
                chrom: field(&record, idx[3]),
                pos: parse_position_field(&record, idx[4], path)?,
            });
        }

        Ok(Self::from_records(records))
    }

    /// Builds a table from already-parsed records.
    pub fn from_records(records: Vec<ProbeRecord>) -> Self {
        let mut genes = HashSet::new();
        let mut rsids = HashSet::new();
        let mut positions = HashSet::new();
        for record in &records {
            if !record.gene.is_empty() {
                genes.insert(record.gene.clone());
            }
            if !record.rsid.is_empty() {
                rsids.insert(record.rsid.clone());
            }
            if let Some(pos) = record.pos {
                positions.insert(pos);
            }
        }
        Self {
            records,
            genes,
            rsids,
            positions,
        }
    }

    /// The annotation rows, in file order.
    pub fn records(&self) -> &[ProbeRecord] {
        &self.records
    }

    /// Number of annotation rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ReferenceLookup for AnnotationTable {
    fn contains_gene(&self, gene: &str) -> bool {
        self.genes.contains(gene)
    }

    fn contains_rsid(&self, rsid: &str) -> bool {
        self.rsids.contains(rsid)
    }

    fn contains_position(&self, pos: Position) -> bool {
        self.positions.contains(&pos)
    }
}

impl Tabular for AnnotationTable {
    fn column_names(&self) -> Vec<String> {
        ["probeset_id", "gene", "rsid", "chrom", "pos"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.records
            .iter()
            .map(|r| {
                vec![
                    r.probeset_id.clone(),
                    r.gene.clone(),
                    r.rsid.clone(),
                    r.chrom.clone(),
                    position_cell(r.pos),
                ]
            })
            .collect()
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

/// The loaded prebuilt array table.
///
/// Same role as [`AnnotationTable`] for the simplified schema the GUI
/// front end ships with.
#[derive(Debug, Clone)]
pub struct ArrayTable {
    records: Vec<ArrayRecord>,
    genes: HashSet<String>,
    rsids: HashSet<String>,
    positions: HashSet<Position>,
}

impl ArrayTable {
    /// Loads the prebuilt array table from a CSV file.
    ///
    /// # Errors
    ///
    /// Same error mapping as [`AnnotationTable::from_path`].
    pub fn from_path<P: AsRef<Path>>(path: P) -> QueryResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(QueryError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let file = File::open(path).map_err(|e| QueryError::from_io(path, e))?;
        Self::read_from(BufReader::new(file), path)
    }

    /// Loads the prebuilt array table from any reader.
    pub fn from_reader<R: Read>(reader: R) -> QueryResult<Self> {
        Self::read_from(reader, Path::new("input"))
    }

    fn read_from<R: Read>(reader: R, path: &Path) -> QueryResult<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .comment(Some(b'#'))
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| QueryError::from_csv(path, e))?
            .clone();
        let idx = column_indexes(&headers, ARRAY_COLUMNS, path)?;

        let mut records = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(|e| QueryError::from_csv(path, e))?;
            records.push(ArrayRecord {
                probeset_id: field(&record, idx[0]),
                chrom: field(&record, idx[1]),
                pos: parse_position_field(&record, idx[2], path)?,
                reference: field(&record, idx[3]),
                alt: field(&record, idx[4]),
                gene: normalize::gene(&optional_field(&record, idx[5])),
                probe_count: parse_count_field(&record, idx[6], path)?,
                rsid: normalize::rsid(&optional_field(&record, idx[7])),
            });
        }

        Ok(Self::from_records(records))
    }

    /// Builds a table from already-parsed records.
    pub fn from_records(records: Vec<ArrayRecord>) -> Self {
        let mut genes = HashSet::new();
        let mut rsids = HashSet::new();
        let mut positions = HashSet::new();
        for record in &records {
            if !record.gene.is_empty() {
                genes.insert(record.gene.clone());
            }
            if !record.rsid.is_empty() {
                rsids.insert(record.rsid.clone());
            }
            if let Some(pos) = record.pos {
                positions.insert(pos);
            }
        }
        Self {
            records,
            genes,
            rsids,
            positions,
        }
    }

    /// The array rows, in file order.
    pub fn records(&self) -> &[ArrayRecord] {
        &self.records
    }

    /// Number of array rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct gene symbols carried by the table, sorted.
    ///
    /// Front ends use this to populate gene selection lists.
    pub fn gene_symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.genes.iter().cloned().collect();
        symbols.sort();
        symbols
    }
}

impl ReferenceLookup for ArrayTable {
    fn contains_gene(&self, gene: &str) -> bool {
        self.genes.contains(gene)
    }

    fn contains_rsid(&self, rsid: &str) -> bool {
        self.rsids.contains(rsid)
    }

    fn contains_position(&self, pos: Position) -> bool {
        self.positions.contains(&pos)
    }
}

/// Resolves the index of each required column, in the order given.
fn column_indexes(
    headers: &StringRecord,
    required: &[&str],
    path: &Path,
) -> QueryResult<Vec<usize>> {
    required
        .iter()
        .map(|name| {
            headers
                .iter()
                // Handle UTF-8 BOM at start of file
                .position(|h| h.trim_start_matches('\u{feff}').trim() == *name)
                .ok_or_else(|| QueryError::Decode {
                    path: path.display().to_string(),
                    detail: format!("missing required column '{name}'"),
                })
        })
        .collect()
}

fn field(record: &StringRecord, index: usize) -> String {
    record.get(index).unwrap_or("").trim().to_string()
}

/// Like [`field`], but maps the vendor missing-value placeholder to empty.
fn optional_field(record: &StringRecord, index: usize) -> String {
    let value = record.get(index).unwrap_or("").trim();
    if value == MISSING {
        String::new()
    } else {
        value.to_string()
    }
}

fn parse_position_field(
    record: &StringRecord,
    index: usize,
    path: &Path,
) -> QueryResult<Option<Position>> {
    let value = record.get(index).unwrap_or("").trim();
    if value.is_empty() || value == MISSING {
        return Ok(None);
    }
    value
        .parse::<Position>()
        .map(Some)
        .map_err(|_| QueryError::Decode {
            path: path.display().to_string(),
            detail: format!("invalid position value '{value}'"),
        })
}

fn parse_count_field(record: &StringRecord, index: usize, path: &Path) -> QueryResult<u32> {
    let value = record.get(index).unwrap_or("").trim();
    value.parse::<u32>().map_err(|_| QueryError::Decode {
        path: path.display().to_string(),
        detail: format!("invalid probe count value '{value}'"),
    })
}
