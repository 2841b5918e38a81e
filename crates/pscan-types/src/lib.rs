//! # pscan-types
//!
//! Type definitions for PharmacoScan probe annotation data.
//!
//! This crate provides the row types shared by the query engine and its
//! front ends: reference rows for the two loader schemas (the vendor
//! annotation CSV and the prebuilt array table), the derived result rows
//! produced by filtering, and the [`Tabular`] trait that every exportable
//! result table implements.
//!
//! ## Features
//!
//! - `serde` (default): Enables serialization/deserialization support via
//!   serde. Disable this feature for zero-dependency usage.
//!
//! ## Usage
//!
//! ```rust
//! use pscan_types::{ProbeRecord, normalize};
//!
//! let record = ProbeRecord {
//!     probeset_id: "AX-11086525".to_string(),
//!     gene: normalize::gene("cyp2d6"),
//!     rsid: normalize::rsid("RS1065852"),
//!     chrom: "22".to_string(),
//!     pos: Some(42130692),
//! };
//!
//! assert_eq!(record.gene, "CYP2D6");
//! assert_eq!(record.rsid, "rs1065852");
//! ```
//!
//! ## Without Serde
//!
//! To use this crate without serde (zero dependencies):
//!
//! ```toml
//! [dependencies]
//! pscan-types = { version = "0.1", default-features = false }
//! ```

#![warn(missing_docs)]

mod array;
pub mod normalize;
mod position;
mod probe;
mod table;

// Re-export all public types at crate root
pub use array::{ArrayRecord, GeneVariant, RsidPresence};
pub use position::Position;
pub use probe::{ProbeRecord, ProbeSummary};
pub use table::{position_cell, Tabular};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_types_are_exported() {
        // Verify all types are accessible from crate root
        let _pos: Position = 42130692;
        let _record = ProbeRecord {
            probeset_id: String::new(),
            gene: String::new(),
            rsid: String::new(),
            chrom: String::new(),
            pos: None,
        };
        let _presence = RsidPresence {
            gene: String::new(),
            rsid: "rs1234".to_string(),
            on_array: false,
        };
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip() {
        let record = ProbeRecord {
            probeset_id: "AX-11086525".to_string(),
            gene: "CYP2D6".to_string(),
            rsid: "rs1065852".to_string(),
            chrom: "22".to_string(),
            pos: Some(42130692),
        };

        let json = serde_json::to_string(&record).unwrap();
        let parsed: ProbeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, parsed);
    }
}
