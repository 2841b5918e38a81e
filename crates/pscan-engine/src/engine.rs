//! Request-scoped query orchestration.
//!
//! One engine instance holds the immutable loaded table; each query is
//! described by a [`QueryRequest`] value and runs to completion against
//! its own filtered copies, so concurrent callers need no locking. Every
//! front end reduces to: collect input, build a request, run it, render
//! the outcome.

use pscan_types::{Position, Tabular};

use crate::enrich::{merge_allele_maps, AlleleMap, AlleleSource};
use crate::error::{QueryError, QueryResult};
use crate::filter::{GeneVariantTable, PresenceTable, SummaryTable};
use crate::input::{detect_kind, IdentifierKind};
use crate::loader::{AnnotationTable, ArrayTable};
use crate::validate::{check_gene, check_position, check_rsid, check_rsid_format};

/// The criteria of one query, owned by the request that runs it.
///
/// Criteria are not mutually exclusive: a gene stage may be narrowed
/// further by rsID and position, in that order. At least one criterion
/// is required.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    /// Gene symbols to select.
    pub genes: Vec<String>,
    /// rsIDs to select.
    pub rsids: Vec<String>,
    /// Exact position to select.
    pub position: Option<Position>,
}

impl QueryRequest {
    /// Returns true if no criterion was supplied.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty() && self.rsids.is_empty() && self.position.is_none()
    }
}

/// The result table of a query, shape depending on the stages that ran.
///
/// A gene stage collapses probes and may carry allele annotations; a
/// query without one passes plain annotation rows through.
#[derive(Debug, Clone)]
pub enum QueryOutcome {
    /// Annotation rows selected without a gene stage.
    Probes(AnnotationTable),
    /// Position-collapsed summaries from a gene stage.
    Summary(SummaryTable),
}

impl Tabular for QueryOutcome {
    fn column_names(&self) -> Vec<String> {
        match self {
            QueryOutcome::Probes(table) => table.column_names(),
            QueryOutcome::Summary(table) => table.column_names(),
        }
    }

    fn rows(&self) -> Vec<Vec<String>> {
        match self {
            QueryOutcome::Probes(table) => Tabular::rows(table),
            QueryOutcome::Summary(table) => Tabular::rows(table),
        }
    }

    fn len(&self) -> usize {
        match self {
            QueryOutcome::Probes(table) => Tabular::len(table),
            QueryOutcome::Summary(table) => Tabular::len(table),
        }
    }
}

/// The query engine over a loaded annotation table.
pub struct QueryEngine {
    table: AnnotationTable,
}

impl QueryEngine {
    /// Creates an engine over the given table.
    pub fn new(table: AnnotationTable) -> Self {
        Self { table }
    }

    /// The loaded reference table.
    pub fn table(&self) -> &AnnotationTable {
        &self.table
    }

    /// Runs one query to completion.
    ///
    /// Stages apply in the original tool's order: gene select, probe
    /// count collapse, allele enrichment and merge, then rsID and
    /// position narrowing. Identifiers are validated against the loaded
    /// table before any filtering; enrichment failures never abort the
    /// query.
    ///
    /// # Errors
    ///
    /// [`QueryError::NoInputSupplied`] for an empty request, plus the
    /// validation kinds from [`crate::validate`].
    pub fn run(
        &self,
        request: &QueryRequest,
        alleles: &dyn AlleleSource,
    ) -> QueryResult<QueryOutcome> {
        if request.is_empty() {
            return Err(QueryError::NoInputSupplied);
        }

        let genes = request
            .genes
            .iter()
            .map(|gene| check_gene(&self.table, gene))
            .collect::<QueryResult<Vec<String>>>()?;
        let rsids = request
            .rsids
            .iter()
            .map(|rsid| check_rsid(&self.table, rsid))
            .collect::<QueryResult<Vec<String>>>()?;
        let position = match request.position {
            Some(pos) => Some(check_position(&self.table, pos)?),
            None => None,
        };

        let mut outcome = if genes.is_empty() {
            QueryOutcome::Probes(self.table.clone())
        } else {
            let summary = self.table.filter_by_genes(&genes).probe_counts();
            QueryOutcome::Summary(self.annotate(summary, &genes, alleles))
        };

        if !rsids.is_empty() {
            outcome = match outcome {
                QueryOutcome::Probes(table) => QueryOutcome::Probes(table.filter_by_rsids(&rsids)),
                QueryOutcome::Summary(table) => {
                    QueryOutcome::Summary(table.filter_by_rsids(&rsids))
                }
            };
        }

        if let Some(pos) = position {
            outcome = match outcome {
                QueryOutcome::Probes(table) => QueryOutcome::Probes(table.filter_by_position(pos)),
                QueryOutcome::Summary(table) => {
                    QueryOutcome::Summary(table.filter_by_position(pos))
                }
            };
        }

        Ok(outcome)
    }

    /// Fetches allele data for each queried gene and merges it in.
    fn annotate(
        &self,
        summary: SummaryTable,
        genes: &[String],
        alleles: &dyn AlleleSource,
    ) -> SummaryTable {
        let maps: Vec<AlleleMap> = genes
            .iter()
            .filter_map(|gene| alleles.fetch_alleles(gene))
            .collect();

        if maps.is_empty() {
            return summary;
        }

        tracing::debug!(
            genes = genes.len(),
            fetched = maps.len(),
            "Merging CPIC allele data"
        );
        summary.merge_alleles(&merge_allele_maps(maps))
    }
}

/// The result table of a prebuilt-table query.
#[derive(Debug, Clone)]
pub enum ArrayOutcome {
    /// Gene-filtered variant projection.
    Variants(GeneVariantTable),
    /// On-array verdicts for an rsID list.
    Presence(PresenceTable),
}

impl Tabular for ArrayOutcome {
    fn column_names(&self) -> Vec<String> {
        match self {
            ArrayOutcome::Variants(table) => table.column_names(),
            ArrayOutcome::Presence(table) => table.column_names(),
        }
    }

    fn rows(&self) -> Vec<Vec<String>> {
        match self {
            ArrayOutcome::Variants(table) => Tabular::rows(table),
            ArrayOutcome::Presence(table) => Tabular::rows(table),
        }
    }

    fn len(&self) -> usize {
        match self {
            ArrayOutcome::Variants(table) => Tabular::len(table),
            ArrayOutcome::Presence(table) => Tabular::len(table),
        }
    }
}

impl ArrayTable {
    /// Runs one identifier-list query against the prebuilt table.
    ///
    /// The identifier kind is detected from the first token: rs-numbers
    /// dispatch to the on-array filter, anything else to the gene
    /// filter. Genes must exist in the table; rsIDs only need the right
    /// shape, since absent ones are the point of the on-array report.
    pub fn query(&self, tokens: &[String]) -> QueryResult<ArrayOutcome> {
        if tokens.is_empty() {
            return Err(QueryError::NoInputSupplied);
        }

        match detect_kind(tokens) {
            IdentifierKind::Gene => {
                let genes = tokens
                    .iter()
                    .map(|token| check_gene(self, token))
                    .collect::<QueryResult<Vec<String>>>()?;
                Ok(ArrayOutcome::Variants(self.filter_by_genes(&genes)))
            }
            IdentifierKind::Rsid => {
                let rsids = tokens
                    .iter()
                    .map(|token| check_rsid_format(token))
                    .collect::<QueryResult<Vec<String>>>()?;
                Ok(ArrayOutcome::Presence(self.filter_by_rsids(&rsids)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::StaticAlleleSource;
    use pscan_types::{ArrayRecord, ProbeRecord};

    fn probe(probeset_id: &str, gene: &str, rsid: &str, pos: Position) -> ProbeRecord {
        ProbeRecord {
            probeset_id: probeset_id.to_string(),
            gene: gene.to_string(),
            rsid: rsid.to_string(),
            chrom: "22".to_string(),
            pos: Some(pos),
        }
    }

    fn engine() -> QueryEngine {
        QueryEngine::new(AnnotationTable::from_records(vec![
            probe("AX-1", "CYP2D6", "rs1065852", 42130692),
            probe("AX-2", "CYP2D6", "rs1065852", 42130692),
            probe("AX-3", "CYP2D6", "rs16947", 42127941),
            probe("AX-4", "CYP2C19", "rs4244285", 94781859),
        ]))
    }

    #[test]
    fn test_gene_query_with_enrichment() {
        let source = StaticAlleleSource::new().with("CYP2D6", "rs1065852", "*10");
        let request = QueryRequest {
            genes: vec!["cyp2d6".to_string()],
            ..Default::default()
        };

        let outcome = engine().run(&request, &source).unwrap();
        let summary = match outcome {
            QueryOutcome::Summary(summary) => summary,
            other => panic!("expected summary outcome, got {other:?}"),
        };

        assert!(summary.is_annotated());
        assert_eq!(summary.rows().len(), 2);
        let collapsed = summary
            .rows()
            .iter()
            .find(|r| r.pos == Some(42130692))
            .unwrap();
        assert_eq!(collapsed.probe_count, 2);
        assert_eq!(collapsed.allele.as_deref(), Some("*10"));
    }

    #[test]
    fn test_gene_query_without_enrichment() {
        let request = QueryRequest {
            genes: vec!["CYP2D6".to_string()],
            ..Default::default()
        };

        let outcome = engine().run(&request, &StaticAlleleSource::new()).unwrap();
        match outcome {
            QueryOutcome::Summary(summary) => assert!(!summary.is_annotated()),
            other => panic!("expected summary outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_gene_is_rejected_before_filtering() {
        let request = QueryRequest {
            genes: vec!["NOTAGENE".to_string()],
            ..Default::default()
        };

        let err = engine()
            .run(&request, &StaticAlleleSource::new())
            .unwrap_err();
        assert!(matches!(err, QueryError::UnknownGene { .. }));
    }

    #[test]
    fn test_rsid_only_query() {
        let request = QueryRequest {
            rsids: vec!["RS16947".to_string()],
            ..Default::default()
        };

        let outcome = engine().run(&request, &StaticAlleleSource::new()).unwrap();
        match outcome {
            QueryOutcome::Probes(table) => {
                assert_eq!(table.len(), 1);
                assert_eq!(table.records()[0].rsid, "rs16947");
            }
            other => panic!("expected probes outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_stages_compose_sequentially() {
        let request = QueryRequest {
            genes: vec!["CYP2D6".to_string()],
            rsids: vec!["rs1065852".to_string()],
            position: Some(42130692),
        };

        let outcome = engine().run(&request, &StaticAlleleSource::new()).unwrap();
        assert_eq!(Tabular::len(&outcome), 1);
    }

    #[test]
    fn test_empty_request_is_rejected() {
        let err = engine()
            .run(&QueryRequest::default(), &StaticAlleleSource::new())
            .unwrap_err();
        assert!(matches!(err, QueryError::NoInputSupplied));
    }

    fn array_table() -> ArrayTable {
        ArrayTable::from_records(vec![ArrayRecord {
            probeset_id: "AX-1".to_string(),
            chrom: "10".to_string(),
            pos: Some(94781859),
            reference: "G".to_string(),
            alt: "A".to_string(),
            gene: "CYP2C19".to_string(),
            probe_count: 1,
            rsid: "rs4244285".to_string(),
        }])
    }

    #[test]
    fn test_array_query_detects_genes() {
        let outcome = array_table().query(&["cyp2c19".to_string()]).unwrap();
        match outcome {
            ArrayOutcome::Variants(variants) => assert_eq!(variants.rows().len(), 1),
            other => panic!("expected variants outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_array_query_detects_rsids() {
        let tokens = vec!["rs4244285".to_string(), "rs999".to_string()];
        let outcome = array_table().query(&tokens).unwrap();
        match outcome {
            ArrayOutcome::Presence(presence) => {
                assert_eq!(presence.rows().len(), 2);
                assert!(presence.rows()[0].on_array);
                assert!(!presence.rows()[1].on_array);
            }
            other => panic!("expected presence outcome, got {other:?}"),
        }
    }
}
