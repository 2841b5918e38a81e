//! Input validation against the loaded reference table.
//!
//! Validation is pure: it only gates whether filtering proceeds. Format
//! problems and unknown identifiers are distinct error kinds so front
//! ends can tell the user which one they hit.

use std::sync::OnceLock;

use regex::Regex;
use pscan_types::{normalize, Position};

use crate::error::{QueryError, QueryResult};

/// Matches a complete rs-number and nothing else.
fn rsid_exact_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^rs\d+$").expect("valid rsID pattern"))
}

/// Distinct-value lookups on a loaded reference table.
///
/// Both loader variants implement this, so validation does not care which
/// schema a front end loaded.
pub trait ReferenceLookup {
    /// Whether the table carries the (normalized) gene symbol.
    fn contains_gene(&self, gene: &str) -> bool;
    /// Whether the table carries the (normalized) rsID.
    fn contains_rsid(&self, rsid: &str) -> bool;
    /// Whether the table carries a probe at the position.
    fn contains_position(&self, pos: Position) -> bool;
}

/// Validates a proposed gene symbol, returning its normalized form.
///
/// # Errors
///
/// [`QueryError::UnknownGene`] when the symbol is absent from the table.
pub fn check_gene<T: ReferenceLookup>(table: &T, gene: &str) -> QueryResult<String> {
    let gene = normalize::gene(gene);
    if table.contains_gene(&gene) {
        Ok(gene)
    } else {
        Err(QueryError::UnknownGene { gene })
    }
}

/// Validates a proposed rsID, returning its normalized form.
///
/// # Errors
///
/// [`QueryError::RsidFormat`] when the value is not `rs` + digits;
/// [`QueryError::UnknownRsid`] when no probe carries it.
pub fn check_rsid<T: ReferenceLookup>(table: &T, rsid: &str) -> QueryResult<String> {
    let rsid = check_rsid_format(rsid)?;
    if table.contains_rsid(&rsid) {
        Ok(rsid)
    } else {
        Err(QueryError::UnknownRsid { rsid })
    }
}

/// Validates only the shape of an rsID, returning its normalized form.
pub fn check_rsid_format(rsid: &str) -> QueryResult<String> {
    let trimmed = rsid.trim();
    if rsid_exact_pattern().is_match(trimmed) {
        Ok(normalize::rsid(trimmed))
    } else {
        Err(QueryError::RsidFormat {
            value: trimmed.to_string(),
        })
    }
}

/// Parses a position string without consulting the table.
///
/// # Errors
///
/// [`QueryError::PositionFormat`] when the value is not an unsigned
/// integer.
pub fn parse_position(value: &str) -> QueryResult<Position> {
    let trimmed = value.trim();
    trimmed
        .parse::<Position>()
        .map_err(|_| QueryError::PositionFormat {
            value: trimmed.to_string(),
        })
}

/// Validates that a probe exists at the given position.
///
/// # Errors
///
/// [`QueryError::UnknownPosition`] when no probe sits at the position.
pub fn check_position<T: ReferenceLookup>(table: &T, pos: Position) -> QueryResult<Position> {
    if table.contains_position(pos) {
        Ok(pos)
    } else {
        Err(QueryError::UnknownPosition { pos })
    }
}

/// Validates a position supplied as text: format first, then existence.
pub fn check_position_text<T: ReferenceLookup>(table: &T, value: &str) -> QueryResult<Position> {
    let pos = parse_position(value)?;
    check_position(table, pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::AnnotationTable;
    use pscan_types::ProbeRecord;

    fn table() -> AnnotationTable {
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
                gene: "CYP2C19".to_string(),
                rsid: "rs4244285".to_string(),
                chrom: "10".to_string(),
                pos: Some(94781859),
            },
        ])
    }

    #[test]
    fn test_check_gene() {
        let table = table();
        assert_eq!(check_gene(&table, "cyp2d6").unwrap(), "CYP2D6");
        assert!(matches!(
            check_gene(&table, "NOTAGENE"),
            Err(QueryError::UnknownGene { .. })
        ));
    }

    #[test]
    fn test_check_rsid_distinguishes_failure_kinds() {
        let table = table();
        assert_eq!(check_rsid(&table, "RS1065852").unwrap(), "rs1065852");

        // Malformed value: format error, not unknown identifier
        assert!(matches!(
            check_rsid(&table, "1065852"),
            Err(QueryError::RsidFormat { .. })
        ));
        assert!(matches!(
            check_rsid(&table, "rs12x4"),
            Err(QueryError::RsidFormat { .. })
        ));

        // Well-formed but absent from the table
        assert!(matches!(
            check_rsid(&table, "rs99999999"),
            Err(QueryError::UnknownRsid { .. })
        ));
    }

    #[test]
    fn test_check_position_distinguishes_failure_kinds() {
        let table = table();
        assert_eq!(check_position_text(&table, "42130692").unwrap(), 42130692);

        assert!(matches!(
            check_position_text(&table, "12,345"),
            Err(QueryError::PositionFormat { .. })
        ));
        assert!(matches!(
            check_position_text(&table, "1000"),
            Err(QueryError::UnknownPosition { .. })
        ));
    }
}
