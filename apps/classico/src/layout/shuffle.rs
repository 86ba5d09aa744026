//! Presentation shuffle. Counts and tones are untouched.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::layout::piece::RowComposition;

/// Permutes the pieces inside every row, then the rows themselves.
pub fn shuffle_layout<R: Rng + ?Sized>(layout: &mut [RowComposition], rng: &mut R) {
    for row in layout.iter_mut() {
        row.pieces.shuffle(rng);
    }
    layout.shuffle(rng);
}
