//! Layer orchestration — runs solve → paint → shuffle once per pallet layer.
//!
//! The loop owns the state threaded between layers: the inventory handed to the
//! solver (one pallet layer plus whatever the previous layer left over) and the
//! color-split remainder used by the painter. Cancellation is checked only
//! between layers; a layer that has started always completes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::Rng;
use tracing::{info, warn};

use crate::config::{PalletConfig, PavementConfig};
use crate::errors::ClassicoError;
use crate::layout::painter::paint;
use crate::layout::shuffle::shuffle_layout;
use crate::layout::solver::solve;
use crate::layout::{Catalog, Layout, PieceCounts, RemainderVector, SearchObserver};

// ────────────────────────────────────────────────────────────────────────────
// Collaborator seams
// ────────────────────────────────────────────────────────────────────────────

/// Receives each finished layer. The layout is moved in; no later layer can touch it.
pub trait LayerSink {
    fn accept(&mut self, layout: Layout, remainder: &RemainderVector)
        -> Result<(), ClassicoError>;
}

/// Cooperative cancellation flag shared between the signal listener and the run loop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Service
// ────────────────────────────────────────────────────────────────────────────

/// Outcome of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub layers_completed: u32,
    /// Solver remainder after the last completed layer.
    pub final_remainder: PieceCounts,
    /// Color split of `final_remainder`.
    pub color_remainder: RemainderVector,
    pub cancelled: bool,
}

pub struct LayoutService {
    pallet: PalletConfig,
    width: u32,
    catalog: Catalog,
}

impl LayoutService {
    /// Builds the row catalog once for the whole run.
    pub fn new(pallet: PalletConfig, pavement: PavementConfig) -> Result<Self, ClassicoError> {
        let catalog = Catalog::build(pavement.width, pallet.counts())?;
        info!(
            "Catalog built: {} row compositions for width {}",
            catalog.len(),
            pavement.width
        );
        Ok(Self {
            pallet,
            width: pavement.width,
            catalog,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Generates every pallet layer, handing each finished layer to `sink`.
    pub fn run<R: Rng + ?Sized>(
        &self,
        cancel: &CancelToken,
        rng: &mut R,
        observer: &dyn SearchObserver,
        sink: &mut dyn LayerSink,
    ) -> Result<RunReport, ClassicoError> {
        let nominal = self.pallet.counts();
        let mut inventory = nominal;
        let mut colors = RemainderVector::default();
        let mut report = RunReport {
            layers_completed: 0,
            final_remainder: PieceCounts::default(),
            color_remainder: colors,
            cancelled: false,
        };

        for layer in 0..self.pallet.layers {
            if cancel.is_cancelled() {
                warn!(
                    "Cancelled before layer {} of {}",
                    layer + 1,
                    self.pallet.layers
                );
                report.cancelled = true;
                break;
            }
            info!("Layer {} of {} ({inventory})", layer + 1, self.pallet.layers);

            let solution = solve(inventory, self.width, &self.catalog, observer);
            if solution.layout.is_empty() {
                warn!("Layer {} has no row that fits; inventory unchanged", layer + 1);
            }

            let (mut painted, next_colors) =
                paint(solution.layout, inventory, colors, solution.remainder, rng);
            colors = next_colors;
            inventory = nominal + solution.remainder;

            shuffle_layout(&mut painted, rng);
            sink.accept(painted, &colors)?;

            report.layers_completed += 1;
            report.final_remainder = solution.remainder;
            report.color_remainder = colors;
        }

        info!(
            "Remainder: large {} medium {} small {}",
            report.final_remainder.large, report.final_remainder.medium, report.final_remainder.small
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{NoopObserver, PieceSize};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Default)]
    struct CollectingSink {
        layers: Vec<(Layout, RemainderVector)>,
    }

    impl LayerSink for CollectingSink {
        fn accept(
            &mut self,
            layout: Layout,
            remainder: &RemainderVector,
        ) -> Result<(), ClassicoError> {
            self.layers.push((layout, *remainder));
            Ok(())
        }
    }

    /// Cancels the shared token as soon as the first layer arrives.
    struct CancellingSink {
        token: CancelToken,
        seen: u32,
    }

    impl LayerSink for CancellingSink {
        fn accept(&mut self, _: Layout, _: &RemainderVector) -> Result<(), ClassicoError> {
            self.seen += 1;
            self.token.cancel();
            Ok(())
        }
    }

    fn make_service(layers: u32) -> LayoutService {
        LayoutService::new(
            PalletConfig {
                large: 2,
                medium: 1,
                small: 10,
                layers,
            },
            PavementConfig { width: 5 },
        )
        .unwrap()
    }

    fn consumed(layout: &Layout) -> PieceCounts {
        layout
            .iter()
            .fold(PieceCounts::default(), |acc, row| acc + row.counts)
    }

    #[test]
    fn test_run_threads_remainder_between_layers() {
        let service = make_service(3);
        let mut rng = StdRng::seed_from_u64(17);
        let mut sink = CollectingSink::default();
        let report = service
            .run(&CancelToken::new(), &mut rng, &NoopObserver, &mut sink)
            .unwrap();

        assert_eq!(report.layers_completed, 3);
        assert!(!report.cancelled);
        assert_eq!(sink.layers.len(), 3);

        // Every piece handed out is either placed or still in the final remainder.
        let nominal = PieceCounts::new(2, 1, 10);
        let placed = sink
            .layers
            .iter()
            .fold(PieceCounts::default(), |acc, (layout, _)| acc + consumed(layout));
        assert_eq!(
            placed + report.final_remainder,
            nominal + nominal + nominal
        );

        for (layout, _) in &sink.layers {
            for row in layout {
                assert_eq!(row.weighted_width(), 5);
            }
        }
    }

    #[test]
    fn test_color_split_matches_final_remainder() {
        let service = make_service(2);
        let mut rng = StdRng::seed_from_u64(4);
        let mut sink = CollectingSink::default();
        let report = service
            .run(&CancelToken::new(), &mut rng, &NoopObserver, &mut sink)
            .unwrap();

        for size in PieceSize::ALL {
            let carried = report.final_remainder.get(size);
            assert_eq!(
                report.color_remainder.primary(size) + report.color_remainder.alt(size),
                carried
            );
        }
        assert_eq!(sink.layers.last().map(|(_, r)| *r), Some(report.color_remainder));
    }

    #[test]
    fn test_cancel_before_start_runs_nothing() {
        let service = make_service(4);
        let token = CancelToken::new();
        token.cancel();
        let mut sink = CollectingSink::default();
        let report = service
            .run(&token, &mut StdRng::seed_from_u64(0), &NoopObserver, &mut sink)
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.layers_completed, 0);
        assert!(sink.layers.is_empty());
    }

    #[test]
    fn test_cancel_takes_effect_at_layer_boundary() {
        let service = make_service(5);
        let token = CancelToken::new();
        let mut sink = CancellingSink {
            token: token.clone(),
            seen: 0,
        };
        let report = service
            .run(&token, &mut StdRng::seed_from_u64(9), &NoopObserver, &mut sink)
            .unwrap();

        assert_eq!(sink.seen, 1);
        assert_eq!(report.layers_completed, 1);
        assert!(report.cancelled);
    }

    #[test]
    fn test_zero_count_pallet_is_rejected() {
        let result = LayoutService::new(
            PalletConfig {
                large: 0,
                medium: 4,
                small: 4,
                layers: 1,
            },
            PavementConfig { width: 6 },
        );
        assert!(matches!(result, Err(ClassicoError::Config(_))));
    }
}
