//! Frame executor: applies draw commands to a persistent grid buffer.

use crate::format::{CodecError, Command, Result};
use crate::schema::{Cell, Grid, TRANSPARENT};

/// Cursor and pen state while one frame is drawn.
///
/// The grid is borrowed for the lifetime of the writer; cells not touched by
/// the commands keep whatever the previous frame left there.
#[derive(Debug)]
pub struct FrameWriter<'a> {
    grid: &'a mut Grid,
    cursor: usize,
    background: Option<u8>,
    foreground: Option<u8>,
    tag: u8,
}

impl<'a> FrameWriter<'a> {
    pub fn new(grid: &'a mut Grid) -> Self {
        Self {
            grid,
            cursor: 0,
            background: None,
            foreground: None,
            tag: 0,
        }
    }

    /// Cells consumed so far.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn execute(&mut self, command: &Command) -> Result<()> {
        match command {
            Command::Transparent => self.background = Some(TRANSPARENT),
            Command::Background(color) => self.background = Some(*color),
            Command::Foreground(color) => self.foreground = Some(*color),
            Command::Tag(tag) => self.tag = *tag,
            Command::Skip(_) => {
                let count = command.cells();
                self.reserve(count)?;
                self.cursor += count;
            }
            Command::Fill(_, tile) => {
                let count = command.cells();
                self.reserve(count)?;
                let cell = self.pen(*tile)?;
                self.grid.cells_mut()[self.cursor..self.cursor + count].fill(cell);
                self.cursor += count;
            }
            Command::Run(tiles) => {
                self.reserve(tiles.len())?;
                for &tile in tiles {
                    let cell = self.pen(tile)?;
                    self.grid.cells_mut()[self.cursor] = cell;
                    self.cursor += 1;
                }
            }
        }
        Ok(())
    }

    fn reserve(&self, count: usize) -> Result<()> {
        let end = self.cursor + count;
        if end > self.grid.len() {
            return Err(CodecError::format(format!(
                "Command writes to cell {} of a {}-cell grid",
                end - 1,
                self.grid.len()
            )));
        }
        Ok(())
    }

    fn pen(&self, tile: u8) -> Result<Cell> {
        let background = self.background.ok_or(CodecError::State("Background"))?;
        let foreground = self.foreground.ok_or(CodecError::State("Foreground"))?;
        Ok(Cell::new(background, foreground, self.tag, tile))
    }
}

/// Draw one frame's commands onto `grid`.
///
/// Returns the number of cells the commands covered.
pub fn execute_frame(commands: &[Command], grid: &mut Grid) -> Result<usize> {
    let mut writer = FrameWriter::new(grid);
    for command in commands {
        writer.execute(command)?;
    }
    Ok(writer.cursor())
}
