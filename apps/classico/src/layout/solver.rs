//! Layer solver — picks catalog rows that use up a layer's inventory with the least waste.
//!
//! # Search
//! `solve` is a plain recursive search over (availability, catalog). At every level it
//! tries each catalog row the current availability can pay for, solves the rest
//! recursively, and keeps the branch whose leftover weighted width is smallest.
//! Ties keep the earlier catalog row. There is no pruning beyond the base case, so
//! running time is exponential in the number of rows per layer; the catalog cap in
//! `catalog::cap_counts` is what keeps it tractable.
//!
//! Availability is passed by value, so branches share no mutable state.

use tracing::debug;

use crate::layout::catalog::Catalog;
use crate::layout::piece::{Layout, PieceCounts, RowComposition};

/// Recursion levels reported to a `SearchObserver`.
const PROGRESS_DEPTH: usize = 2;

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// Best layout found for one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Pieces left over after placing `layout`.
    pub remainder: PieceCounts,
    pub layout: Layout,
}

impl Solution {
    fn unfilled(available: PieceCounts) -> Self {
        Self {
            remainder: available,
            layout: Vec::new(),
        }
    }

    /// Weighted width of the leftover pieces.
    pub fn waste(&self) -> u32 {
        self.remainder.weighted_width()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Progress reporting
// ────────────────────────────────────────────────────────────────────────────

/// Receives progress from the outermost levels of the search.
pub trait SearchObserver {
    /// Called before catalog row `index` (of `total`) is considered at `depth`.
    fn on_branch(&self, depth: usize, index: usize, total: usize);
}

/// Discards progress.
pub struct NoopObserver;

impl SearchObserver for NoopObserver {
    fn on_branch(&self, _depth: usize, _index: usize, _total: usize) {}
}

/// Emits progress as `debug!` events.
pub struct TracingObserver;

impl SearchObserver for TracingObserver {
    fn on_branch(&self, depth: usize, index: usize, total: usize) {
        debug!(depth, row = index + 1, total, "Exploring catalog row");
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Search
// ────────────────────────────────────────────────────────────────────────────

/// Fills as many `target_width` rows as possible from `available`, minimizing waste.
///
/// The returned layout's row counts plus `remainder` always equal `available`.
pub fn solve(
    available: PieceCounts,
    target_width: u32,
    catalog: &Catalog,
    observer: &dyn SearchObserver,
) -> Solution {
    search(available, target_width, &catalog.rows, observer, 0)
}

fn search(
    available: PieceCounts,
    target_width: u32,
    rows: &[RowComposition],
    observer: &dyn SearchObserver,
    depth: usize,
) -> Solution {
    if available.weighted_width() < target_width {
        return Solution::unfilled(available);
    }

    let mut best: Option<(&RowComposition, Solution)> = None;
    for (index, row) in rows.iter().enumerate() {
        if depth < PROGRESS_DEPTH {
            observer.on_branch(depth, index, rows.len());
        }
        // An empty row consumes nothing and would recurse forever.
        if row.is_empty() {
            continue;
        }
        let Some(rest) = available.checked_sub(&row.counts) else {
            continue;
        };
        let branch = search(rest, target_width, rows, observer, depth + 1);
        let improves = best
            .as_ref()
            .map_or(true, |(_, current)| branch.waste() < current.waste());
        if improves {
            best = Some((row, branch));
        }
    }

    match best {
        Some((row, mut branch)) => {
            branch.layout.insert(0, row.clone());
            branch
        }
        None => Solution::unfilled(available),
    }
}
