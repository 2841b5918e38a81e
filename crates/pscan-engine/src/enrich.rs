//! CPIC allele definition enrichment.
//!
//! Fetches the allele definition workbook for a gene from PharmGKB and
//! reshapes it into a mapping from rsID to the comma-joined names of the
//! alleles defined by a variant at that rsID. Enrichment is best effort:
//! every failure (network, status, unreadable workbook) is reported as
//! "no enrichment data" and logged, never as a query error.

use std::collections::{BTreeMap, HashMap};
use std::io::Cursor;
use std::time::Duration;

use calamine::{Data, Reader, Xlsx};
use pscan_types::normalize;

/// Mapping from lowercase rsID to a comma-joined allele name string.
pub type AlleleMap = BTreeMap<String, String>;

const CPIC_ATTACHMENT_BASE: &str = "https://api.pharmgkb.org/v1/download/file/attachment";

/// Bounded timeout for the blocking fetch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Allele data begins at this 0-indexed workbook row; the rows above it
/// are the table's title and coordinate banner.
const HEADER_ROW: usize = 5;

/// Source of allele definition data for a gene.
///
/// The query engine only depends on this trait, so tests and offline
/// deployments can substitute [`StaticAlleleSource`] for the network
/// client.
pub trait AlleleSource {
    /// Fetches the allele mapping for a gene, `None` when unavailable.
    fn fetch_alleles(&self, gene: &str) -> Option<AlleleMap>;
}

/// PharmGKB-backed allele definition client.
#[derive(Debug, Default)]
pub struct CpicClient {
    client: reqwest::blocking::Client,
}

impl CpicClient {
    /// Creates a client with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    fn attachment_url(gene: &str) -> String {
        format!("{CPIC_ATTACHMENT_BASE}/{gene}_allele_definition_table.xlsx")
    }
}

impl AlleleSource for CpicClient {
    fn fetch_alleles(&self, gene: &str) -> Option<AlleleMap> {
        let url = Self::attachment_url(gene);

        let response = match self.client.get(&url).timeout(FETCH_TIMEOUT).send() {
            Ok(response) => response,
            Err(err) => {
                tracing::info!(gene, error = %err, "Unable to reach CPIC allele info");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::info!(
                gene,
                status = %response.status(),
                "Unable to access CPIC allele info"
            );
            return None;
        }

        let bytes = match response.bytes() {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::info!(gene, error = %err, "Unable to read CPIC allele response");
                return None;
            }
        };

        match parse_allele_workbook(&bytes) {
            Some(map) if !map.is_empty() => Some(map),
            _ => {
                tracing::info!(gene, "CPIC allele workbook held no usable rows");
                None
            }
        }
    }
}

/// In-memory allele source for tests and offline runs.
///
/// # Examples
///
/// ```
/// use pscan_engine::{AlleleSource, StaticAlleleSource};
///
/// let source = StaticAlleleSource::new()
///     .with("CYP2D6", "rs1065852", "*10")
///     .with("CYP2D6", "rs1065852", "*36");
///
/// let map = source.fetch_alleles("CYP2D6").unwrap();
/// assert_eq!(map["rs1065852"], "*10, *36");
/// assert!(source.fetch_alleles("TPMT").is_none());
/// ```
#[derive(Debug, Default)]
pub struct StaticAlleleSource {
    genes: HashMap<String, AlleleMap>,
}

impl StaticAlleleSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one allele name under a gene's rsID, joining repeats.
    pub fn with(mut self, gene: &str, rsid: &str, allele: &str) -> Self {
        let map = self.genes.entry(normalize::gene(gene)).or_default();
        let entry = map.entry(normalize::rsid(rsid)).or_default();
        if !entry.is_empty() {
            entry.push_str(", ");
        }
        entry.push_str(allele);
        self
    }
}

impl AlleleSource for StaticAlleleSource {
    fn fetch_alleles(&self, gene: &str) -> Option<AlleleMap> {
        self.genes.get(gene).cloned()
    }
}

/// Reshapes an allele definition workbook into an [`AlleleMap`].
///
/// The header row names the variant (rsID) per column; the rows below it
/// are allele definitions whose first cell is the allele name. The first
/// definition row is the reference allele, non-missing at every
/// position, and is excluded so it does not tag every rsID. Columns with
/// a blank header (placeholder columns) and rows with a blank allele
/// name are excluded. For each remaining rsID the allele names with a
/// non-missing cell are joined, in sheet order, with `", "`.
///
/// Returns `None` when the bytes are not a readable workbook or hold no
/// sheet.
pub fn parse_allele_workbook(bytes: &[u8]) -> Option<AlleleMap> {
    let mut workbook = Xlsx::new(Cursor::new(bytes)).ok()?;
    let range = workbook.worksheet_range_at(0)?.ok()?;
    let rows: Vec<&[Data]> = range.rows().collect();

    let header = rows.get(HEADER_ROW)?;
    let data_rows = rows.get(HEADER_ROW + 2..).unwrap_or(&[]);

    let mut collected: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for row in data_rows {
        let allele = row.first().map(cell_text).unwrap_or_default();
        if allele.is_empty() {
            continue;
        }
        for (col, head) in header.iter().enumerate().skip(1) {
            let label = cell_text(head);
            if label.is_empty() {
                continue;
            }
            let value = row.get(col).map(cell_text).unwrap_or_default();
            if value.is_empty() {
                continue;
            }
            collected
                .entry(normalize::rsid(&label))
                .or_default()
                .push(allele.clone());
        }
    }

    Some(
        collected
            .into_iter()
            .map(|(rsid, alleles)| (rsid, alleles.join(", ")))
            .collect(),
    )
}

/// Unions per-gene allele maps; the first map wins on a repeated rsID.
pub fn merge_allele_maps<I: IntoIterator<Item = AlleleMap>>(maps: I) -> AlleleMap {
    let mut merged = AlleleMap::new();
    for map in maps {
        for (rsid, alleles) in map {
            merged.entry(rsid).or_insert(alleles);
        }
    }
    merged
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}
