//! Debounced, epoch-stamped recomputation of annotated price levels from
//! visible-range change events.

pub mod levels;
pub mod projector;

pub use levels::RangeFractionOracle;
pub use projector::{LevelProjector, ProjectorConfig};
