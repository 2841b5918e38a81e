//! Prebuilt-schema array rows.
//!
//! The GUI and web front ends query a simplified table built offline from
//! the vendor annotation file. Its rows already carry ref/alt alleles and
//! a precomputed probe count. This module provides that row type and the
//! two result rows derived from it.

use crate::Position;

/// A row from the prebuilt array table.
///
/// # Source Columns
///
/// | Column | Canonical name |
/// |--------|----------------|
/// | Probe Set ID | `probeset_id` |
/// | Chromosome | `chrom` |
/// | Position | `pos` |
/// | Ref | `reference` |
/// | Alt | `alt` |
/// | Gene | `gene` |
/// | Probe Count | `probe_count` |
/// | rsID | `rsid` |
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArrayRecord {
    /// Identifier of the physical probe set targeting this site.
    pub probeset_id: String,
    /// Chromosome name.
    pub chrom: String,
    /// Physical position on the chromosome.
    pub pos: Option<Position>,
    /// Reference allele at this position.
    pub reference: String,
    /// Alternate allele at this position.
    pub alt: String,
    /// Associated gene symbol, uppercase.
    pub gene: String,
    /// Number of probes on the platform covering this position.
    pub probe_count: u32,
    /// dbSNP identifier, lowercase.
    pub rsid: String,
}

/// A gene-filtered projection of an [`ArrayRecord`].
///
/// Produced by the gene filter on the prebuilt table: the probeset and
/// chromosome columns are dropped and duplicate rows collapse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneVariant {
    /// Associated gene symbol, uppercase.
    pub gene: String,
    /// dbSNP identifier, lowercase.
    pub rsid: String,
    /// Physical position on the chromosome.
    pub pos: Option<Position>,
    /// Reference allele.
    pub reference: String,
    /// Alternate allele.
    pub alt: String,
    /// Number of probes covering this position.
    pub probe_count: u32,
}

/// An rsID lookup verdict.
///
/// One row per queried rsID. `on_array` records whether the platform
/// physically carries a probe for the identifier; queried rsIDs with no
/// matching reference row are still surfaced, with the gene left blank.
///
/// # Examples
///
/// ```
/// use pscan_types::RsidPresence;
///
/// let missing = RsidPresence {
///     gene: String::new(),
///     rsid: "rs99999999".to_string(),
///     on_array: false,
/// };
///
/// assert_eq!(missing.on_array_label(), "No");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RsidPresence {
    /// Gene associated with the matching probe, empty when off-array.
    pub gene: String,
    /// The queried dbSNP identifier, lowercase.
    pub rsid: String,
    /// Whether a probe for this rsID exists on the platform.
    pub on_array: bool,
}

impl RsidPresence {
    /// Renders the presence flag the way result tables display it.
    pub fn on_array_label(&self) -> &'static str {
        if self.on_array {
            "Yes"
        } else {
            "No"
        }
    }
}
