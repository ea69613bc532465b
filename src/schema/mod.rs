//! Schema module - Grid, palette, tileset and animation types.

mod asset;
mod config;
mod grid;
mod palette;
mod tileset;

pub use asset::*;
pub use config::*;
pub use grid::*;
pub use palette::*;
pub use tileset::*;
