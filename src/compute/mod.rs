//! Compute module - Frame analysis and execution.
//!
//! [`analyze`] turns a grid into draw commands; [`execute_frame`] replays
//! them onto a grid buffer. Replaying the commands of a frame onto the grid
//! they were analyzed against reproduces the frame exactly.

mod analyzer;
mod executor;

pub use analyzer::*;
pub use executor::*;
