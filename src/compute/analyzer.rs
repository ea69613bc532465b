//! Frame analyzer: turns a grid (and the grid shown before it) into draw
//! commands.
//!
//! The heuristic is greedy, left to right:
//!
//! 1. Cells unchanged since the previous frame are skipped.
//! 2. Three or more identical cells become a Fill.
//! 3. Anything else becomes a Run of same-styled cells, cut short where a
//!    skip or fill of three or more cells could start.
//!
//! Style commands (Transparent/Background, Foreground, Tag) are emitted just
//! before a Fill or Run whenever the cell's style differs from the last one
//! set. Players rely on this exact cost model, so the thresholds are fixed.

use crate::format::{CodecError, Command, MAX_SPAN, Result, command::MAX_SHORT_VALUE};
use crate::schema::{Cell, Grid, TRANSPARENT};

/// Minimum span for a skip or fill to interrupt a run.
pub const MIN_BREAK: usize = 3;

/// Minimum span encoded as a Fill.
pub const MIN_FILL: usize = 3;

/// Forward-looking span lengths for every cell of one frame.
#[derive(Debug, Clone)]
pub struct FrameAnalyzer<'a> {
    current: &'a Grid,
    /// Cells from here on that match the previous frame.
    skip_len: Vec<usize>,
    /// Cells from here on identical to this one.
    fill_len: Vec<usize>,
    /// Cells from here on sharing this cell's background, foreground and tag.
    run_len: Vec<usize>,
}

impl<'a> FrameAnalyzer<'a> {
    /// Analyze `current` against the grid shown before it, if any.
    pub fn new(current: &'a Grid, previous: Option<&Grid>) -> Result<Self> {
        if let Some(previous) = previous {
            if previous.dims() != current.dims() {
                return Err(CodecError::validation(format!(
                    "Previous grid is {}x{}, current grid is {}x{}",
                    previous.width(),
                    previous.height(),
                    current.width(),
                    current.height()
                )));
            }
        }
        for cell in current.cells() {
            check_cell(cell)?;
        }

        let cells = current.cells();
        let prev = previous.map(Grid::cells);
        let n = cells.len();

        let mut skip_len = vec![0; n];
        let mut fill_len = vec![0; n];
        let mut run_len = vec![0; n];

        let mut skip = 0;
        let mut fill = 1;
        let mut run = 1;
        for index in (0..n).rev() {
            skip = match prev {
                Some(prev) if prev[index] == cells[index] => skip + 1,
                _ => 0,
            };

            if index + 1 < n {
                let (a, b) = (&cells[index], &cells[index + 1]);
                if a.same_style(b) {
                    run += 1;
                    fill = if a.tile == b.tile { fill + 1 } else { 1 };
                } else {
                    run = 1;
                    fill = 1;
                }
            } else {
                // Last cell has no right neighbour
                run = 1;
                fill = 1;
            }

            skip_len[index] = skip;
            fill_len[index] = fill;
            run_len[index] = run;
        }

        Ok(Self {
            current,
            skip_len,
            fill_len,
            run_len,
        })
    }

    pub fn skip_len(&self) -> &[usize] {
        &self.skip_len
    }

    pub fn fill_len(&self) -> &[usize] {
        &self.fill_len
    }

    pub fn run_len(&self) -> &[usize] {
        &self.run_len
    }

    /// Synthesize the command list.
    pub fn commands(&self) -> Vec<Command> {
        let cells = self.current.cells();
        let n = cells.len();

        let mut commands = Vec::new();
        let mut style = StyleTracker::default();
        let mut index = 0;

        while index < n {
            if self.skip_len[index] > 0 {
                let count = self.skip_len[index].min(MAX_SPAN);
                commands.push(Command::Skip((count - 1) as u16));
                index += count;
                continue;
            }

            let cell = cells[index];
            let (count, structural) = if self.fill_len[index] >= MIN_FILL {
                let count = self.fill_len[index].min(MAX_SPAN);
                (count, Command::Fill((count - 1) as u16, cell.tile))
            } else {
                let mut count = self.run_len[index].min(MAX_SPAN);
                // Stop where a cheaper skip or fill can take over
                for offset in 1..count {
                    if self.skip_len[index + offset] >= MIN_BREAK
                        || self.fill_len[index + offset] >= MIN_BREAK
                    {
                        count = offset;
                        break;
                    }
                }
                let tiles = cells[index..index + count].iter().map(|c| c.tile).collect();
                (count, Command::Run(tiles))
            };

            style.update(&cell, &mut commands);
            commands.push(structural);
            index += count;
        }

        commands
    }
}

/// Analyze one frame.
pub fn analyze(current: &Grid, previous: Option<&Grid>) -> Result<Vec<Command>> {
    Ok(FrameAnalyzer::new(current, previous)?.commands())
}

/// Style last emitted within the current frame.
#[derive(Debug)]
struct StyleTracker {
    background: Option<u8>,
    foreground: Option<u8>,
    tag: u8,
}

impl Default for StyleTracker {
    fn default() -> Self {
        // Players start every frame with tag 0 and no colors
        Self {
            background: None,
            foreground: None,
            tag: 0,
        }
    }
}

impl StyleTracker {
    fn update(&mut self, cell: &Cell, commands: &mut Vec<Command>) {
        if self.background != Some(cell.background) {
            commands.push(if cell.background == TRANSPARENT {
                Command::Transparent
            } else {
                Command::Background(cell.background)
            });
            self.background = Some(cell.background);
        }
        if self.foreground != Some(cell.foreground) {
            commands.push(Command::Foreground(cell.foreground));
            self.foreground = Some(cell.foreground);
        }
        if self.tag != cell.tag {
            commands.push(Command::Tag(cell.tag));
            self.tag = cell.tag;
        }
    }
}

fn check_cell(cell: &Cell) -> Result<()> {
    let fields = [
        (cell.background, cell.background != TRANSPARENT),
        (cell.foreground, true),
        (cell.tag, true),
    ];
    for (value, checked) in fields {
        if checked && value > MAX_SHORT_VALUE {
            return Err(CodecError::ValueTooLarge {
                value: value as usize,
                bits: 5,
            });
        }
    }
    Ok(())
}
