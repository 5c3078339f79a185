//! Lottery number-set generator
//!
//! Draws sets of unique numbers, sorted ascending, the classic
//! "6 out of 49" way. A light/dark theme flag rides along for display.

pub mod error;
pub mod generator;
pub mod theme;

pub use error::{LotteryError, Result};
pub use generator::{DrawConfig, NumberSet, NumberSetGenerator};
pub use theme::Theme;

/// Draw the default five sets of 6 out of 49
pub fn quick_pick() -> Result<Vec<NumberSet>> {
    NumberSetGenerator::new(DrawConfig::default())?.generate(&mut rand::thread_rng())
}
