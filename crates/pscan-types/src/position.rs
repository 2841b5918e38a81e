//! Genomic position type.
//!
//! This module provides a type alias for physical chromosome positions.
//! Positions are 1-based coordinates on the genome build the annotation
//! table was produced against.

/// A physical position on a chromosome.
///
/// Positions are 1-based unsigned coordinates. Annotation rows without a
/// mapped position carry `Option<Position>::None` rather than a sentinel
/// string.
///
/// # Examples
///
/// ```
/// use pscan_types::Position;
///
/// let pos: Position = 42130692; // CYP2D6 *10 defining variant
/// ```
pub type Position = u64;
