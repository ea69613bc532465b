//! Levelshift - Tile-grid text-mode animations and their binary container.
//!
//! An asset holds an optional color palette, an optional set of monochrome
//! glyph tiles, and animations over a grid of cells. Each frame is stored as
//! a compact stream of draw commands describing only what changed since the
//! previous frame.
//!
//! # Architecture
//!
//! - `schema`: Data model (grids, palette, tileset, frames) and JSON projects
//! - `format`: Chunk container, section codecs and the command bytecode
//! - `compute`: Frame analyzer (grid to commands) and executor (commands to grid)
//! - `animation`: Recording grid sequences and replaying frames in order
//! - `render`: Rasterizing grids with a palette and tileset, GIF export
//! - `inspect`: Text listings of an asset
//!
//! # Example
//!
//! ```rust,no_run
//! use levelshift::{
//!     animation::{AnimationPlayer, AnimationRecorder},
//!     schema::{Asset, Cell, Grid},
//! };
//!
//! // Record two frames
//! let mut recorder = AnimationRecorder::new(4, 1, 0);
//! let mut grid = Grid::filled(4, 1, Cell::new(0, 1, 0, b'-'));
//! recorder.record_frame(10, &grid).unwrap();
//! grid.set(2, 0, Cell::new(0, 1, 0, b'*'));
//! recorder.record_frame(10, &grid).unwrap();
//! let (animation, stats) = recorder.finish();
//! println!("{stats}");
//!
//! // Encode, decode and replay
//! let bytes = Asset::new(None, None, vec![animation]).encode().unwrap();
//! let asset = Asset::decode(&bytes).unwrap();
//! let mut player = AnimationPlayer::new(&asset.animations[0]);
//! while let Some(frame) = player.next_frame().unwrap() {
//!     println!("{} ticks: {:?}", frame.duration, player.grid().cells()[2]);
//! }
//! ```

pub mod animation;
pub mod compute;
pub mod format;
pub mod inspect;
pub mod render;
pub mod schema;

// Re-export commonly used types
pub use animation::{AnimationPlayer, AnimationRecorder};
pub use format::{CodecError, Command};
pub use schema::{Asset, Grid, ProjectConfig};
