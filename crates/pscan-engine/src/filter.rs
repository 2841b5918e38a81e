//! Filter operations over the loaded reference tables.
//!
//! Three independent, composable filters (gene, rsID, position) plus the
//! probe-count derivation. Every operation takes `&self` and returns a
//! new table; the loaded reference table is never mutated. Result rows
//! are deduplicated by full-row identity after each step.

use std::collections::HashMap;
use std::hash::Hash;

use pscan_types::{
    position_cell, GeneVariant, Position, ProbeSummary, RsidPresence, Tabular,
};

use crate::loader::{AnnotationTable, ArrayTable};

/// Order-preserving full-row deduplication.
fn dedup_rows<T: Clone + Eq + Hash>(rows: Vec<T>) -> Vec<T> {
    let mut seen = std::collections::HashSet::with_capacity(rows.len());
    rows.into_iter().filter(|row| seen.insert(row.clone())).collect()
}

impl AnnotationTable {
    /// Selects rows whose gene is in the given set.
    pub fn filter_by_genes(&self, genes: &[String]) -> AnnotationTable {
        let rows = self
            .records()
            .iter()
            .filter(|r| genes.iter().any(|g| *g == r.gene))
            .cloned()
            .collect();
        AnnotationTable::from_records(dedup_rows(rows))
    }

    /// Selects rows whose rsID is in the given set.
    pub fn filter_by_rsids(&self, rsids: &[String]) -> AnnotationTable {
        let rows = self
            .records()
            .iter()
            .filter(|r| rsids.iter().any(|id| *id == r.rsid))
            .cloned()
            .collect();
        AnnotationTable::from_records(dedup_rows(rows))
    }

    /// Selects rows at exactly the given position.
    pub fn filter_by_position(&self, pos: Position) -> AnnotationTable {
        let rows = self
            .records()
            .iter()
            .filter(|r| r.pos == Some(pos))
            .cloned()
            .collect();
        AnnotationTable::from_records(dedup_rows(rows))
    }

    /// Collapses probes sharing a position into one summary row.
    ///
    /// Groups rows by position, counts occurrences, attaches the count,
    /// and drops the probeset column; rows that differed only by probeset
    /// then collapse. Output is sorted ascending by (gene, position).
    pub fn probe_counts(&self) -> SummaryTable {
        let mut counts: HashMap<Option<Position>, u32> = HashMap::new();
        for record in self.records() {
            *counts.entry(record.pos).or_insert(0) += 1;
        }

        let rows = self
            .records()
            .iter()
            .map(|r| ProbeSummary {
                gene: r.gene.clone(),
                rsid: r.rsid.clone(),
                chrom: r.chrom.clone(),
                pos: r.pos,
                probe_count: counts[&r.pos],
                allele: None,
            })
            .collect();

        let mut rows = dedup_rows(rows);
        rows.sort_by(|a, b| (&a.gene, a.pos).cmp(&(&b.gene, b.pos)));
        SummaryTable {
            rows,
            annotated: false,
        }
    }
}

/// The gene-path result table: position-collapsed probe summaries.
///
/// Produced by [`AnnotationTable::probe_counts`] and annotated in place
/// by the result merger when enrichment data arrived. Supports the same
/// narrowing filters as the reference table so front ends can AND
/// criteria together sequentially.
#[derive(Debug, Clone)]
pub struct SummaryTable {
    pub(crate) rows: Vec<ProbeSummary>,
    pub(crate) annotated: bool,
}

impl SummaryTable {
    /// The summary rows.
    pub fn rows(&self) -> &[ProbeSummary] {
        &self.rows
    }

    /// Whether enrichment data was merged in (the allele column exports
    /// only then).
    pub fn is_annotated(&self) -> bool {
        self.annotated
    }

    /// Selects rows whose rsID is in the given set.
    pub fn filter_by_rsids(&self, rsids: &[String]) -> SummaryTable {
        let rows = self
            .rows
            .iter()
            .filter(|r| rsids.iter().any(|id| *id == r.rsid))
            .cloned()
            .collect();
        SummaryTable {
            rows: dedup_rows(rows),
            annotated: self.annotated,
        }
    }

    /// Selects rows at exactly the given position.
    pub fn filter_by_position(&self, pos: Position) -> SummaryTable {
        let rows = self
            .rows
            .iter()
            .filter(|r| r.pos == Some(pos))
            .cloned()
            .collect();
        SummaryTable {
            rows: dedup_rows(rows),
            annotated: self.annotated,
        }
    }
}

impl Tabular for SummaryTable {
    fn column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = ["gene", "rsid", "chrom", "pos", "probe_count"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        if self.annotated {
            names.push("allele".to_string());
        }
        names
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| {
                let mut row = vec![
                    r.gene.clone(),
                    r.rsid.clone(),
                    r.chrom.clone(),
                    position_cell(r.pos),
                    r.probe_count.to_string(),
                ];
                if self.annotated {
                    row.push(r.allele.clone().unwrap_or_default());
                }
                row
            })
            .collect()
    }

    fn len(&self) -> usize {
        self.rows.len()
    }
}

impl ArrayTable {
    /// Selects and projects rows whose gene is in the given set.
    ///
    /// Output drops the probeset and chromosome columns, deduplicates,
    /// and sorts ascending by (gene, position).
    pub fn filter_by_genes(&self, genes: &[String]) -> GeneVariantTable {
        let rows = self
            .records()
            .iter()
            .filter(|r| genes.iter().any(|g| *g == r.gene))
            .map(|r| GeneVariant {
                gene: r.gene.clone(),
                rsid: r.rsid.clone(),
                pos: r.pos,
                reference: r.reference.clone(),
                alt: r.alt.clone(),
                probe_count: r.probe_count,
            })
            .collect();

        let mut rows = dedup_rows(rows);
        rows.sort_by(|a, b| (&a.gene, a.pos).cmp(&(&b.gene, b.pos)));
        GeneVariantTable { rows }
    }

    /// Reports, for each requested rsID, whether the platform carries it.
    ///
    /// Reference rows whose rsID was requested surface with
    /// `On Array=Yes`; requested rsIDs with no reference match are still
    /// surfaced, with `On Array=No` and a blank gene. Reference rows the
    /// user did not ask about are excluded.
    pub fn filter_by_rsids(&self, rsids: &[String]) -> PresenceTable {
        let requested = dedup_rows(rsids.to_vec());

        let mut rows = Vec::new();
        for rsid in &requested {
            let matches: Vec<RsidPresence> = self
                .records()
                .iter()
                .filter(|r| r.rsid == *rsid)
                .map(|r| RsidPresence {
                    gene: r.gene.clone(),
                    rsid: r.rsid.clone(),
                    on_array: true,
                })
                .collect();

            if matches.is_empty() {
                rows.push(RsidPresence {
                    gene: String::new(),
                    rsid: rsid.clone(),
                    on_array: false,
                });
            } else {
                rows.extend(matches);
            }
        }

        PresenceTable {
            rows: dedup_rows(rows),
        }
    }
}

/// Gene-filtered projection of the prebuilt array table.
#[derive(Debug, Clone)]
pub struct GeneVariantTable {
    rows: Vec<GeneVariant>,
}

impl GeneVariantTable {
    /// The projected rows.
    pub fn rows(&self) -> &[GeneVariant] {
        &self.rows
    }
}

impl Tabular for GeneVariantTable {
    fn column_names(&self) -> Vec<String> {
        ["Gene", "rsID", "Position", "Ref", "Alt", "Probe Count"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| {
                vec![
                    r.gene.clone(),
                    r.rsid.clone(),
                    position_cell(r.pos),
                    r.reference.clone(),
                    r.alt.clone(),
                    r.probe_count.to_string(),
                ]
            })
            .collect()
    }

    fn len(&self) -> usize {
        self.rows.len()
    }
}

/// On-array verdicts for a queried rsID list.
#[derive(Debug, Clone)]
pub struct PresenceTable {
    rows: Vec<RsidPresence>,
}

impl PresenceTable {
    /// The verdict rows.
    pub fn rows(&self) -> &[RsidPresence] {
        &self.rows
    }
}

impl Tabular for PresenceTable {
    fn column_names(&self) -> Vec<String> {
        ["Gene", "rsID", "On Array"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| {
                vec![
                    r.gene.clone(),
                    r.rsid.clone(),
                    r.on_array_label().to_string(),
                ]
            })
            .collect()
    }

    fn len(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pscan_types::{ArrayRecord, ProbeRecord};

    fn probe(probeset_id: &str, gene: &str, rsid: &str, pos: Option<Position>) -> ProbeRecord {
        ProbeRecord {
            probeset_id: probeset_id.to_string(),
            gene: gene.to_string(),
            rsid: rsid.to_string(),
            chrom: "22".to_string(),
            pos,
        }
    }

    fn annotation_table() -> AnnotationTable {
        AnnotationTable::from_records(vec![
            probe("AX-1", "CYP2D6", "rs1065852", Some(500)),
            probe("AX-2", "CYP2D6", "rs1065852", Some(500)),
            probe("AX-3", "CYP2D6", "rs1065852", Some(500)),
            probe("AX-4", "CYP2D6", "rs16947", Some(999)),
            probe("AX-5", "CYP2C19", "rs4244285", Some(1000)),
        ])
    }

    #[test]
    fn test_filter_by_genes_leaves_source_untouched() {
        let table = annotation_table();
        let filtered = table.filter_by_genes(&["CYP2D6".to_string()]);

        assert_eq!(filtered.len(), 4);
        assert_eq!(table.len(), 5);
    }

    #[test]
    fn test_filter_by_position_is_exact() {
        let table = annotation_table();

        let hits = table.filter_by_position(1000);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits.records()[0].rsid, "rs4244285");

        // Adjacent positions never match
        assert!(table.filter_by_position(999).records()[0].rsid == "rs16947");
        assert_eq!(table.filter_by_position(1001).len(), 0);
    }

    #[test]
    fn test_probe_count_collapses_shared_positions() {
        let table = annotation_table().filter_by_genes(&["CYP2D6".to_string()]);
        let summary = table.probe_counts();

        assert_eq!(summary.rows().len(), 2);
        let shared = summary
            .rows()
            .iter()
            .find(|r| r.pos == Some(500))
            .unwrap();
        assert_eq!(shared.probe_count, 3);
        let single = summary.rows().iter().find(|r| r.pos == Some(999)).unwrap();
        assert_eq!(single.probe_count, 1);
    }

    #[test]
    fn test_summary_narrowing_filters() {
        let summary = annotation_table().probe_counts();

        let by_rsid = summary.filter_by_rsids(&["rs16947".to_string()]);
        assert_eq!(by_rsid.rows().len(), 1);
        assert_eq!(by_rsid.rows()[0].pos, Some(999));

        let by_pos = summary.filter_by_position(500);
        assert_eq!(by_pos.rows().len(), 1);
        assert_eq!(by_pos.rows()[0].probe_count, 3);
    }

    #[test]
    fn test_summary_columns_without_annotation() {
        let summary = annotation_table().probe_counts();
        assert_eq!(
            summary.column_names(),
            vec!["gene", "rsid", "chrom", "pos", "probe_count"]
        );
    }

    fn array_record(gene: &str, rsid: &str, pos: Position) -> ArrayRecord {
        ArrayRecord {
            probeset_id: format!("AX-{pos}"),
            chrom: "10".to_string(),
            pos: Some(pos),
            reference: "G".to_string(),
            alt: "A".to_string(),
            gene: gene.to_string(),
            probe_count: 1,
            rsid: rsid.to_string(),
        }
    }

    #[test]
    fn test_array_gene_filter_projects_and_sorts() {
        let table = ArrayTable::from_records(vec![
            array_record("CYP2C19", "rs4986893", 94780653),
            array_record("CYP2C19", "rs4244285", 94781859),
            array_record("ABCB1", "rs1045642", 87509329),
        ]);

        let variants = table.filter_by_genes(&["CYP2C19".to_string()]);
        assert_eq!(variants.rows().len(), 2);
        assert_eq!(variants.rows()[0].rsid, "rs4986893");
        assert_eq!(variants.rows()[1].rsid, "rs4244285");
    }

    #[test]
    fn test_array_rsid_filter_flags_presence() {
        let table = ArrayTable::from_records(vec![
            array_record("CYP2C19", "rs4244285", 94781859),
            array_record("CYP2C19", "rs4244285", 94781859),
        ]);

        let presence = table.filter_by_rsids(&[
            "rs4244285".to_string(),
            "rs99999999".to_string(),
        ]);

        assert_eq!(presence.rows().len(), 2);
        let hit = &presence.rows()[0];
        assert_eq!(hit.rsid, "rs4244285");
        assert!(hit.on_array);
        assert_eq!(hit.gene, "CYP2C19");

        // A requested rsID with no probe is still surfaced
        let miss = &presence.rows()[1];
        assert_eq!(miss.rsid, "rs99999999");
        assert!(!miss.on_array);
        assert_eq!(miss.gene, "");
    }

    #[test]
    fn test_presence_table_cells() {
        let table = ArrayTable::from_records(vec![array_record("CYP2C19", "rs4244285", 94781859)]);
        let presence = table.filter_by_rsids(&["rs4244285".to_string(), "rs7".to_string()]);

        let cells = Tabular::rows(&presence);
        assert_eq!(cells[0], vec!["CYP2C19", "rs4244285", "Yes"]);
        assert_eq!(cells[1], vec!["", "rs7", "No"]);
    }
}
