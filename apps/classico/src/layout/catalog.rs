//! Row catalog — every distinct way to fill one pavement row.
//!
//! The catalog is built once per run:
//! 1. Enumerate all size sequences whose weights sum to the pavement width,
//!    trying large, then medium, then small at each position.
//! 2. Deduplicate by count triple; the first-generated arrangement wins.
//! 3. Filter by per-size thresholds, where the scarcest size is capped to keep
//!    the solver's search space small.

use std::collections::HashSet;

use crate::errors::ClassicoError;
use crate::layout::piece::{PieceCounts, PieceSize, RowComposition};

// ────────────────────────────────────────────────────────────────────────────
// Catalog type
// ────────────────────────────────────────────────────────────────────────────

/// Deduplicated, filtered row compositions for one pavement width.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub width: u32,
    pub rows: Vec<RowComposition>,
}

impl Catalog {
    /// Builds the catalog for `width` using the pallet counts as filter thresholds.
    ///
    /// Fails only when the scarce-size cap is undefined (a zero count).
    pub fn build(width: u32, pallet: PieceCounts) -> Result<Self, ClassicoError> {
        let thresholds = cap_counts(pallet, width).ok_or_else(|| {
            ClassicoError::Config(format!(
                "cannot derive a catalog cap from pallet counts ({pallet}) at width {width}; \
                 counts must be positive and the width in range"
            ))
        })?;

        let rows = dedup_by_counts(build_compositions(width))
            .into_iter()
            .filter(|row| thresholds.covers(&row.counts))
            .collect();

        Ok(Self { width, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RowComposition> {
        self.rows.iter()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Enumeration
// ────────────────────────────────────────────────────────────────────────────

/// Enumerates every size sequence whose weighted width equals `target_width`.
///
/// Width 0 yields a single empty composition.
pub fn build_compositions(target_width: u32) -> Vec<RowComposition> {
    let mut compositions = Vec::new();
    let mut prefix = Vec::new();
    extend_prefix(&mut prefix, 0, target_width, &mut compositions);
    compositions
}

fn extend_prefix(
    prefix: &mut Vec<PieceSize>,
    weight: u32,
    target_width: u32,
    out: &mut Vec<RowComposition>,
) {
    if weight == target_width {
        out.push(RowComposition::from_sizes(prefix));
        return;
    }
    for size in PieceSize::ALL {
        let next = weight + size.weight();
        if next > target_width {
            continue;
        }
        prefix.push(size);
        extend_prefix(prefix, next, target_width, out);
        prefix.pop();
    }
}

/// Keeps the first composition for each count triple, preserving order.
pub fn dedup_by_counts(compositions: Vec<RowComposition>) -> Vec<RowComposition> {
    let mut seen = HashSet::new();
    compositions
        .into_iter()
        .filter(|row| seen.insert(row.counts))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Scarce-size cap
// ────────────────────────────────────────────────────────────────────────────

/// The size with the fewest pieces. Ties go to small, then large, then medium.
pub fn scarce_size(counts: PieceCounts) -> PieceSize {
    let mut scarce = PieceSize::Small;
    for size in [PieceSize::Large, PieceSize::Medium] {
        if counts.get(size) < counts.get(scarce) {
            scarce = size;
        }
    }
    scarce
}

/// Replaces the scarce size's count with `8*width / ((total - scarce) / scarce) / 5`.
///
/// This bounds how many of the scarce pieces a single row may use. Returns
/// `None` when the formula divides by zero or overflows `u32`.
pub fn cap_counts(counts: PieceCounts, width: u32) -> Option<PieceCounts> {
    let scarce = scarce_size(counts);
    let scarce_count = counts.get(scarce);
    let others = PieceSize::ALL
        .into_iter()
        .filter(|&size| size != scarce)
        .try_fold(0u32, |sum, size| sum.checked_add(counts.get(size)))?;
    let ratio = others.checked_div(scarce_count)?;
    let cap = 8u32.checked_mul(width)?.checked_div(ratio)? / 5;
    Some(counts.with(scarce, cap))
}
