//! Animation player for replaying decoded frames.

use log::trace;

use crate::compute::execute_frame;
use crate::format::{CodecError, Result};
use crate::schema::{Animation, Frame, Grid};

/// Replays an [`Animation`] onto a grid buffer it owns.
///
/// Frames only describe changes, so they must be applied strictly in order
/// starting from frame 0.
///
/// Usage:
/// ```ignore
/// let mut player = AnimationPlayer::new(&asset.animations[0]);
/// while let Some(frame) = player.next_frame()? {
///     show(player.grid(), frame.duration);
/// }
/// ```
#[derive(Debug)]
pub struct AnimationPlayer<'a> {
    animation: &'a Animation,
    grid: Grid,
    current: usize,
}

impl<'a> AnimationPlayer<'a> {
    pub fn new(animation: &'a Animation) -> Self {
        Self {
            animation,
            grid: blank_buffer(animation),
            current: 0,
        }
    }

    pub fn animation(&self) -> &'a Animation {
        self.animation
    }

    /// Buffer contents after the most recently applied frame.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Total number of frames.
    pub fn frame_count(&self) -> usize {
        self.animation.frames.len()
    }

    /// Index of the next frame to apply.
    pub fn position(&self) -> usize {
        self.current
    }

    /// Apply the next frame to the buffer.
    ///
    /// Returns `None` once every frame has been applied.
    pub fn next_frame(&mut self) -> Result<Option<&'a Frame>> {
        let animation = self.animation;
        let Some(frame) = animation.frames.get(self.current) else {
            return Ok(None);
        };

        let covered = execute_frame(&frame.commands, &mut self.grid)?;
        if covered != self.grid.len() {
            return Err(CodecError::format(format!(
                "Frame {} encodes {} cells, expected {}",
                self.current,
                covered,
                self.grid.len()
            )));
        }
        trace!("Applied frame {} ({} ticks)", self.current, frame.duration);

        self.current += 1;
        Ok(Some(frame))
    }

    /// Rewind to frame 0 with a cleared buffer.
    pub fn reset(&mut self) {
        self.grid = blank_buffer(self.animation);
        self.current = 0;
    }

    /// Iterate over the remaining frames as `(duration, grid)` snapshots.
    pub fn frames(&mut self) -> FrameIterator<'_, 'a> {
        FrameIterator { player: self }
    }
}

fn blank_buffer(animation: &Animation) -> Grid {
    Grid::new(animation.width as usize, animation.height as usize)
}

/// Iterator over animation frames.
pub struct FrameIterator<'p, 'a> {
    player: &'p mut AnimationPlayer<'a>,
}

impl Iterator for FrameIterator<'_, '_> {
    type Item = Result<(u16, Grid)>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.player.next_frame() {
            Ok(Some(frame)) => Some(Ok((frame.duration, self.player.grid.clone()))),
            Ok(None) => None,
            Err(e) => {
                // Later frames depend on this one; stop here
                self.player.current = self.player.frame_count();
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.player.frame_count() - self.player.current;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FrameIterator<'_, '_> {}
