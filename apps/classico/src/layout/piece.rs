//! Piece tags, count triples, and row compositions.
//!
//! Widths are measured in small-piece units: a large piece spans 3, a medium
//! piece 2, a small piece 1. Every other module in `layout` works on these types.

use std::fmt;
use std::ops::Add;

// ────────────────────────────────────────────────────────────────────────────
// Piece tags
// ────────────────────────────────────────────────────────────────────────────

/// The three physical piece sizes on a pallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceSize {
    Large,
    Medium,
    Small,
}

impl PieceSize {
    /// Enumeration order. Catalog generation relies on large being tried first.
    pub const ALL: [PieceSize; 3] = [PieceSize::Large, PieceSize::Medium, PieceSize::Small];

    /// Width in small-piece units.
    pub fn weight(self) -> u32 {
        match self {
            PieceSize::Large => 3,
            PieceSize::Medium => 2,
            PieceSize::Small => 1,
        }
    }

    /// Slot index of this size in a count triple or remainder vector.
    pub fn index(self) -> usize {
        match self {
            PieceSize::Large => 0,
            PieceSize::Medium => 1,
            PieceSize::Small => 2,
        }
    }
}

/// Visual color class of a placed piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tone {
    #[default]
    Primary,
    Alt,
}

/// A single placed piece: a size plus its color class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub size: PieceSize,
    pub tone: Tone,
}

impl Piece {
    pub fn primary(size: PieceSize) -> Self {
        Self {
            size,
            tone: Tone::Primary,
        }
    }

    /// Same size, alt color.
    pub fn to_alt(self) -> Self {
        Self {
            size: self.size,
            tone: Tone::Alt,
        }
    }

    pub fn is_alt(&self) -> bool {
        self.tone == Tone::Alt
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Count triples
// ────────────────────────────────────────────────────────────────────────────

/// Per-size piece counts. Used both for pallet inventory and for the
/// signature of a row composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PieceCounts {
    pub large: u32,
    pub medium: u32,
    pub small: u32,
}

impl PieceCounts {
    pub fn new(large: u32, medium: u32, small: u32) -> Self {
        Self {
            large,
            medium,
            small,
        }
    }

    pub fn get(&self, size: PieceSize) -> u32 {
        match size {
            PieceSize::Large => self.large,
            PieceSize::Medium => self.medium,
            PieceSize::Small => self.small,
        }
    }

    /// Returns a copy with the count for `size` replaced.
    pub fn with(mut self, size: PieceSize, count: u32) -> Self {
        match size {
            PieceSize::Large => self.large = count,
            PieceSize::Medium => self.medium = count,
            PieceSize::Small => self.small = count,
        }
        self
    }

    /// `3*large + 2*medium + small`.
    pub fn weighted_width(&self) -> u32 {
        PieceSize::ALL
            .iter()
            .map(|&size| self.get(size) * size.weight())
            .sum()
    }

    pub fn total(&self) -> u32 {
        self.large + self.medium + self.small
    }

    /// True if every count in `other` is available here.
    pub fn covers(&self, other: &PieceCounts) -> bool {
        self.large >= other.large && self.medium >= other.medium && self.small >= other.small
    }

    /// Removes `other` from these counts. `None` if any size would go negative.
    pub fn checked_sub(&self, other: &PieceCounts) -> Option<PieceCounts> {
        Some(PieceCounts {
            large: self.large.checked_sub(other.large)?,
            medium: self.medium.checked_sub(other.medium)?,
            small: self.small.checked_sub(other.small)?,
        })
    }
}

impl Add for PieceCounts {
    type Output = PieceCounts;

    fn add(self, rhs: PieceCounts) -> PieceCounts {
        PieceCounts {
            large: self.large + rhs.large,
            medium: self.medium + rhs.medium,
            small: self.small + rhs.small,
        }
    }
}

impl fmt::Display for PieceCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "large={} medium={} small={}",
            self.large, self.medium, self.small
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Row compositions
// ────────────────────────────────────────────────────────────────────────────

/// One row of pieces spanning the pavement width.
///
/// `counts` always matches the sizes in `pieces`; painting and shuffling only
/// change tones and order, never sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowComposition {
    pub pieces: Vec<Piece>,
    pub counts: PieceCounts,
}

impl RowComposition {
    /// Builds a primary-colored row from a size sequence.
    pub fn from_sizes(sizes: &[PieceSize]) -> Self {
        let mut counts = PieceCounts::default();
        for &size in sizes {
            counts = counts.with(size, counts.get(size) + 1);
        }
        Self {
            pieces: sizes.iter().map(|&size| Piece::primary(size)).collect(),
            counts,
        }
    }

    pub fn weighted_width(&self) -> u32 {
        self.counts.weighted_width()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }
}

/// One layer's rows, top to bottom.
pub type Layout = Vec<RowComposition>;

// ────────────────────────────────────────────────────────────────────────────
// Cross-layer remainder
// ────────────────────────────────────────────────────────────────────────────

/// Leftover pieces carried into the next layer, split by color class.
///
/// Slots: large, medium, small (primary) then large, medium, small (alt).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemainderVector(pub [u32; 6]);

impl RemainderVector {
    pub fn primary(&self, size: PieceSize) -> u32 {
        self.0[size.index()]
    }

    pub fn alt(&self, size: PieceSize) -> u32 {
        self.0[size.index() + 3]
    }

    pub fn set(&mut self, size: PieceSize, primary: u32, alt: u32) {
        self.0[size.index()] = primary;
        self.0[size.index() + 3] = alt;
    }

    /// Display slots paired with the piece they count, in slot order.
    pub fn slots(&self) -> impl Iterator<Item = (Piece, u32)> + '_ {
        PieceSize::ALL
            .into_iter()
            .map(move |size| (Piece::primary(size), self.primary(size)))
            .chain(
                PieceSize::ALL
                    .into_iter()
                    .map(move |size| (Piece::primary(size).to_alt(), self.alt(size))),
            )
    }
}
