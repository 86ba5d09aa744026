// Tile layout core
// Implements: row catalog, layer solver, remainder painting, presentation shuffle.
// Everything here is synchronous and single-threaded; the run loop calls it from spawn_blocking.

pub mod catalog;
pub mod painter;
pub mod piece;
pub mod shuffle;
pub mod solver;

// Re-export the public API consumed by the service and renderer.
pub use catalog::Catalog;
pub use piece::{Layout, Piece, PieceCounts, PieceSize, RemainderVector, RowComposition, Tone};
pub use solver::{NoopObserver, SearchObserver, Solution, TracingObserver};
