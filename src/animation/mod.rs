//! Animation recording and playback.
//!
//! Recording turns a sequence of fully rendered grids into frames of draw
//! commands, each one diffed against the grid before it. Playback applies
//! those frames in order to a persistent grid buffer:
//!
//! ```text
//! grids ──► AnimationRecorder / analyze_sequence ──► Animation
//! Animation ──► AnimationPlayer ──► grid after each frame
//! ```

mod player;
mod recorder;

pub use player::{AnimationPlayer, FrameIterator};
pub use recorder::{AnimationRecorder, RecorderStats, analyze_sequence};
