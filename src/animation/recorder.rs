//! Animation recorder for turning grid sequences into frames.

use log::debug;
use rayon::prelude::*;

use crate::compute::analyze;
use crate::format::{CodecError, Command, Result};
use crate::schema::{Animation, Frame, Grid};

/// Animation recorder that diffs each grid against the one before it.
///
/// Usage:
/// ```ignore
/// let mut recorder = AnimationRecorder::new(40, 25, 0);
/// for grid in &grids {
///     recorder.record_frame(1, grid)?;
/// }
/// let (animation, stats) = recorder.finish();
/// ```
#[derive(Debug)]
pub struct AnimationRecorder {
    animation: Animation,
    previous: Option<Grid>,
    stats: RecorderStats,
}

impl AnimationRecorder {
    pub fn new(width: u8, height: u8, loops: u8) -> Self {
        Self {
            animation: Animation::new(width, height, loops),
            previous: None,
            stats: RecorderStats::default(),
        }
    }

    /// Analyze `grid` against the previously recorded grid and append the
    /// resulting frame.
    pub fn record_frame(&mut self, duration: u16, grid: &Grid) -> Result<&Frame> {
        check_duration(duration)?;
        check_dims(&self.animation, grid)?;

        let commands = analyze(grid, self.previous.as_ref())?;
        let frame = Frame::new(duration, commands);
        self.stats.add(&frame)?;
        debug!(
            "Recorded frame {}: {} commands",
            self.animation.frames.len(),
            frame.commands.len()
        );

        match &mut self.previous {
            Some(previous) => previous.clone_from(grid),
            None => self.previous = Some(grid.clone()),
        }
        self.animation.frames.push(frame);
        Ok(&self.animation.frames[self.animation.frames.len() - 1])
    }

    /// Number of frames recorded so far.
    pub fn frames_written(&self) -> usize {
        self.animation.frames.len()
    }

    pub fn finish(self) -> (Animation, RecorderStats) {
        (self.animation, self.stats)
    }
}

/// Analyze a whole sequence of `(duration, grid)` pairs in parallel.
///
/// Frame `i` depends only on grids `i - 1` and `i`, so every frame is
/// analyzed independently. The result equals recording the grids one by
/// one with [`AnimationRecorder`].
pub fn analyze_sequence(
    width: u8,
    height: u8,
    loops: u8,
    grids: &[(u16, Grid)],
) -> Result<(Animation, RecorderStats)> {
    let mut animation = Animation::new(width, height, loops);
    for (duration, grid) in grids {
        check_duration(*duration)?;
        check_dims(&animation, grid)?;
    }

    animation.frames = grids
        .par_iter()
        .enumerate()
        .map(|(i, (duration, grid))| -> Result<Frame> {
            let previous = i.checked_sub(1).map(|p| &grids[p].1);
            Ok(Frame::new(*duration, analyze(grid, previous)?))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut stats = RecorderStats::default();
    for frame in &animation.frames {
        stats.add(frame)?;
    }
    debug!("Analyzed {} frames in parallel: {}", grids.len(), stats);
    Ok((animation, stats))
}

fn check_duration(duration: u16) -> Result<()> {
    if duration < 1 {
        return Err(CodecError::validation(format!(
            "Illegal frame duration: {duration}"
        )));
    }
    Ok(())
}

fn check_dims(animation: &Animation, grid: &Grid) -> Result<()> {
    let expected = (animation.width as usize, animation.height as usize);
    if grid.dims() != expected {
        return Err(CodecError::validation(format!(
            "Grid is {}x{}, animation is {}x{}",
            grid.width(),
            grid.height(),
            animation.width,
            animation.height
        )));
    }
    Ok(())
}

/// Statistics from a recording session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecorderStats {
    /// Total frames recorded.
    pub frame_count: usize,
    /// Total draw commands across all frames.
    pub command_count: usize,
    /// Encoded size of all command streams.
    pub command_bytes: usize,
    /// Cells carried over from the previous frame.
    pub cells_skipped: usize,
}

impl RecorderStats {
    fn add(&mut self, frame: &Frame) -> Result<()> {
        self.frame_count += 1;
        self.command_count += frame.commands.len();
        self.command_bytes += frame.encoded_len()?;
        self.cells_skipped += frame
            .commands
            .iter()
            .filter(|c| matches!(c, Command::Skip(_)))
            .map(Command::cells)
            .sum::<usize>();
        Ok(())
    }
}

impl std::fmt::Display for RecorderStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} frames, {} commands, {} bytes, {} cells skipped",
            self.frame_count, self.command_count, self.command_bytes, self.cells_skipped
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Cell;

    fn frames() -> Vec<(u16, Grid)> {
        let mut grids = Vec::new();
        for i in 0..6u8 {
            let mut grid = Grid::filled(8, 4, Cell::new(0, 1, 0, b' '));
            grid.set(i as usize, 1, Cell::new(2, 3, 0, b'@'));
            grids.push((1 + i as u16, grid));
        }
        grids
    }

    #[test]
    fn test_recorder_basic() {
        let mut recorder = AnimationRecorder::new(8, 4, 2);
        for (duration, grid) in frames() {
            recorder.record_frame(duration, &grid).unwrap();
        }
        assert_eq!(recorder.frames_written(), 6);

        let (animation, stats) = recorder.finish();
        assert_eq!(animation.loops, 2);
        assert_eq!(animation.frames.len(), 6);
        assert_eq!(animation.frames[3].duration, 4);
        assert_eq!(stats.frame_count, 6);
        assert!(stats.cells_skipped > 0);
        animation.validate(None, None).unwrap();
        // First frame has nothing to skip
        assert!(
            !animation.frames[0]
                .commands
                .iter()
                .any(|c| matches!(c, Command::Skip(_)))
        );
    }

    #[test]
    fn test_recorder_rejects_wrong_size() {
        let mut recorder = AnimationRecorder::new(8, 4, 0);
        let err = recorder.record_frame(1, &Grid::new(4, 8)).unwrap_err();
        assert!(matches!(err, CodecError::Validation(_)));
        assert_eq!(recorder.frames_written(), 0);
    }

    #[test]
    fn test_recorder_rejects_zero_duration() {
        let mut recorder = AnimationRecorder::new(2, 2, 0);
        let err = recorder.record_frame(0, &Grid::new(2, 2)).unwrap_err();
        assert!(matches!(err, CodecError::Validation(_)));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let grids = frames();
        let mut recorder = AnimationRecorder::new(8, 4, 0);
        for (duration, grid) in &grids {
            recorder.record_frame(*duration, grid).unwrap();
        }
        let sequential = recorder.finish();
        let parallel = analyze_sequence(8, 4, 0, &grids).unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_stats_display() {
        let stats = RecorderStats {
            frame_count: 2,
            command_count: 5,
            command_bytes: 9,
            cells_skipped: 30,
        };
        assert_eq!(
            stats.to_string(),
            "2 frames, 5 commands, 9 bytes, 30 cells skipped"
        );
    }
}
