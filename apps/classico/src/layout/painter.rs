//! Remainder painting — marks pieces with the alt color so leftovers carried
//! between layers are split across both color classes.
//!
//! For each size, `n = nominal - prior_primary - prior_alt - post_solve` counts the
//! pieces consumed since the carry-over was last split. Of the layout's primary
//! pieces of that size, `n - n/2 + prior_alt` are chosen uniformly at random and
//! repainted. The post-solve remainder is then split again for the next layer:
//! the larger half stays primary, the smaller half becomes alt.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::layout::piece::{Layout, PieceCounts, PieceSize, RemainderVector};

/// Paints one layer and returns it with the remainder split for the next layer.
///
/// `nominal` is the inventory the solver received for this layer, `prior` the
/// split returned for the previous layer, and `post_solve` the solver's remainder.
pub fn paint<R: Rng + ?Sized>(
    mut layout: Layout,
    nominal: PieceCounts,
    prior: RemainderVector,
    post_solve: PieceCounts,
    rng: &mut R,
) -> (Layout, RemainderVector) {
    let mut next = RemainderVector::default();

    for size in PieceSize::ALL {
        let consumed = i64::from(nominal.get(size))
            - i64::from(prior.primary(size))
            - i64::from(prior.alt(size))
            - i64::from(post_solve.get(size));
        let wanted = consumed - consumed / 2 + i64::from(prior.alt(size));

        let mut locations: Vec<(usize, usize)> = layout
            .iter()
            .enumerate()
            .flat_map(|(row_idx, row)| {
                row.pieces
                    .iter()
                    .enumerate()
                    .filter(|(_, piece)| piece.size == size && !piece.is_alt())
                    .map(move |(pos, _)| (row_idx, pos))
            })
            .collect();
        locations.shuffle(rng);

        let count = usize::try_from(wanted.max(0))
            .unwrap_or(usize::MAX)
            .min(locations.len());
        for &(row_idx, pos) in &locations[..count] {
            let piece = &mut layout[row_idx].pieces[pos];
            *piece = piece.to_alt();
        }

        let carried = post_solve.get(size);
        next.set(size, carried - carried / 2, carried / 2);
    }

    (layout, next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::piece::{PieceSize::*, RowComposition};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn alt_count(layout: &Layout, size: PieceSize) -> usize {
        layout
            .iter()
            .flat_map(|row| row.pieces.iter())
            .filter(|p| p.size == size && p.is_alt())
            .count()
    }

    fn make_layout() -> Layout {
        vec![
            RowComposition::from_sizes(&[Large, Small, Small]),
            RowComposition::from_sizes(&[Large, Small, Small]),
            RowComposition::from_sizes(&[Small, Small, Small, Small, Small]),
        ]
    }

    #[test]
    fn test_first_layer_paints_half_rounded_up() {
        let mut rng = StdRng::seed_from_u64(7);
        let (painted, next) = paint(
            make_layout(),
            PieceCounts::new(2, 1, 10),
            RemainderVector::default(),
            PieceCounts::new(0, 1, 1),
            &mut rng,
        );
        // large: n = 2 → 1; medium: n = 0 → 0; small: n = 9 → 5
        assert_eq!(alt_count(&painted, Large), 1);
        assert_eq!(alt_count(&painted, Medium), 0);
        assert_eq!(alt_count(&painted, Small), 5);
        assert_eq!(next, RemainderVector([0, 1, 1, 0, 0, 0]));
    }

    #[test]
    fn test_prior_alt_adds_to_painted_count() {
        let mut rng = StdRng::seed_from_u64(11);
        let layout = vec![
            RowComposition::from_sizes(&[Small, Small, Small]),
            RowComposition::from_sizes(&[Small, Small, Small]),
        ];
        // n = 10 - 1 - 2 - 4 = 3 → 3 - 1 + 2 = 4
        let (painted, next) = paint(
            layout,
            PieceCounts::new(0, 0, 10),
            RemainderVector([0, 0, 1, 0, 0, 2]),
            PieceCounts::new(0, 0, 4),
            &mut rng,
        );
        assert_eq!(alt_count(&painted, Small), 4);
        assert_eq!(next.primary(Small), 2);
        assert_eq!(next.alt(Small), 2);
    }

    #[test]
    fn test_paint_count_clamped_to_available_pieces() {
        let mut rng = StdRng::seed_from_u64(3);
        let layout = vec![RowComposition::from_sizes(&[Medium, Medium, Medium])];
        let (painted, _) = paint(
            layout,
            PieceCounts::new(0, 20, 0),
            RemainderVector([0, 0, 0, 0, 9, 0]),
            PieceCounts::default(),
            &mut rng,
        );
        assert_eq!(alt_count(&painted, Medium), 3);
    }

    #[test]
    fn test_negative_count_paints_nothing() {
        let mut rng = StdRng::seed_from_u64(5);
        let (painted, next) = paint(
            make_layout(),
            PieceCounts::new(2, 0, 9),
            RemainderVector([0, 0, 12, 0, 0, 0]),
            PieceCounts::new(0, 0, 0),
            &mut rng,
        );
        // small: n = 9 - 12 = -3 → -3 - (-1) = -2
        assert_eq!(alt_count(&painted, Small), 0);
        assert_eq!(alt_count(&painted, Large), 1);
        assert_eq!(next, RemainderVector::default());
    }

    #[test]
    fn test_split_conserves_remainder() {
        let mut rng = StdRng::seed_from_u64(99);
        for carried in 0..12u32 {
            let post = PieceCounts::new(carried, carried + 1, carried * 2);
            let (_, next) = paint(
                Vec::new(),
                post,
                RemainderVector::default(),
                post,
                &mut rng,
            );
            for size in PieceSize::ALL {
                let c = post.get(size);
                assert_eq!(next.primary(size) + next.alt(size), c);
                assert_eq!(next.primary(size), c - c / 2);
            }
        }
    }

    #[test]
    fn test_painting_preserves_sizes_and_rows() {
        let mut rng = StdRng::seed_from_u64(21);
        let original = make_layout();
        let (painted, _) = paint(
            original.clone(),
            PieceCounts::new(2, 1, 10),
            RemainderVector::default(),
            PieceCounts::new(0, 1, 1),
            &mut rng,
        );
        assert_eq!(painted.len(), original.len());
        for (before, after) in original.iter().zip(&painted) {
            assert_eq!(before.counts, after.counts);
            let sizes_before: Vec<_> = before.pieces.iter().map(|p| p.size).collect();
            let sizes_after: Vec<_> = after.pieces.iter().map(|p| p.size).collect();
            assert_eq!(sizes_before, sizes_after);
        }
    }
}
