//! Synthetic market simulation: bounded random-walk OHLC generation and
//! random window sampling with lookback/lookahead buffers.

pub mod generator;
pub mod window;

pub use generator::{GeneratorConfig, SeriesGenerator, TimeStep};
pub use window::select_window;
