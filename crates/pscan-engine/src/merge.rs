//! Result merging.
//!
//! Left-joins the enrichment mapping onto the gene-path summary table by
//! rsID. Rows with no matching enrichment entry keep an absent allele;
//! when enrichment produced nothing at all the table passes through
//! untouched and the allele column is never exported.

use crate::enrich::AlleleMap;
use crate::filter::SummaryTable;

impl SummaryTable {
    /// Left-joins allele names onto the summary rows by rsID.
    ///
    /// The returned table is marked annotated so the allele column
    /// exports; unmatched rows keep `allele: None` and render blank.
    pub fn merge_alleles(&self, alleles: &AlleleMap) -> SummaryTable {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                row.allele = alleles.get(&row.rsid).cloned();
                row
            })
            .collect();

        SummaryTable {
            rows,
            annotated: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::AnnotationTable;
    use pscan_types::{ProbeRecord, Tabular};

    fn summary() -> SummaryTable {
        AnnotationTable::from_records(vec![
            ProbeRecord {
                probeset_id: "AX-1".to_string(),
                gene: "CYP2D6".to_string(),
                rsid: "rs1065852".to_string(),
                chrom: "22".to_string(),
                pos: Some(42130692),
            },
            ProbeRecord {
                probeset_id: "AX-2".to_string(),
                gene: "CYP2D6".to_string(),
                rsid: "rs16947".to_string(),
                chrom: "22".to_string(),
                pos: Some(42127941),
            },
        ])
        .probe_counts()
    }

    #[test]
    fn test_merge_is_a_left_join() {
        let mut alleles = AlleleMap::new();
        alleles.insert("rs1065852".to_string(), "*10, *36".to_string());

        let merged = summary().merge_alleles(&alleles);

        assert_eq!(merged.rows().len(), 2);
        let matched = merged
            .rows()
            .iter()
            .find(|r| r.rsid == "rs1065852")
            .unwrap();
        assert_eq!(matched.allele.as_deref(), Some("*10, *36"));

        // Unmatched rows are retained with a blank allele, not dropped
        let unmatched = merged.rows().iter().find(|r| r.rsid == "rs16947").unwrap();
        assert_eq!(unmatched.allele, None);
    }

    #[test]
    fn test_merge_adds_the_allele_column() {
        let plain = summary();
        assert!(!plain.is_annotated());
        assert!(!plain.column_names().contains(&"allele".to_string()));

        let merged = plain.merge_alleles(&AlleleMap::new());
        assert!(merged.is_annotated());
        assert_eq!(merged.column_names().last().unwrap(), "allele");

        let cells = Tabular::rows(&merged);
        assert_eq!(cells[0].last().unwrap(), "");
    }
}
