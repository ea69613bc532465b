//! Cell grid shared by the analyzer, the executor and the renderer.

use crate::format::{CodecError, Result};

/// Reserved background value meaning "no opaque color".
///
/// Never a real palette index: palettes hold at most 32 colors.
pub const TRANSPARENT: u8 = 255;

/// Tile value used by layer compositing to mark an empty overlay cell.
pub const BLANK_TILE: u8 = 32;

/// One grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    /// Palette index, or [`TRANSPARENT`].
    pub background: u8,
    /// Palette index (0-31).
    pub foreground: u8,
    /// Opaque per-cell annotation (0-31).
    pub tag: u8,
    /// Tile index.
    pub tile: u8,
}

impl Cell {
    /// Transparent background with the blank tile.
    pub const BLANK: Cell = Cell {
        background: TRANSPARENT,
        foreground: 0,
        tag: 0,
        tile: BLANK_TILE,
    };

    pub fn new(background: u8, foreground: u8, tag: u8, tile: u8) -> Self {
        Self {
            background,
            foreground,
            tag,
            tile,
        }
    }

    #[inline]
    pub fn is_transparent(&self) -> bool {
        self.background == TRANSPARENT
    }

    /// Transparent and blank: lets the layer below show through.
    #[inline]
    pub fn is_see_through(&self) -> bool {
        self.is_transparent() && self.tile == BLANK_TILE
    }

    /// Same background, foreground and tag (tile may differ).
    #[inline]
    pub fn same_style(&self, other: &Cell) -> bool {
        self.background == other.background
            && self.foreground == other.foreground
            && self.tag == other.tag
    }
}

/// Row-major `width x height` array of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Grid filled with `Cell::default()`.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, Cell::default())
    }

    /// Grid filled with [`Cell::BLANK`].
    pub fn blank(width: usize, height: usize) -> Self {
        Self::filled(width, height, Cell::BLANK)
    }

    pub fn filled(width: usize, height: usize, cell: Cell) -> Self {
        Self {
            width,
            height,
            cells: vec![cell; width * height],
        }
    }

    /// Build a grid from row-major cells.
    pub fn from_cells(width: usize, height: usize, cells: Vec<Cell>) -> Result<Self> {
        if cells.len() != width * height {
            return Err(CodecError::validation(format!(
                "Expected {} cells for a {}x{} grid, got {}",
                width * height,
                width,
                height,
                cells.len()
            )));
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(self.index(x, y))
    }

    /// Overwrite the cell at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the grid.
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        assert!(
            x < self.width && y < self.height,
            "({x}, {y}) outside {}x{} grid",
            self.width,
            self.height
        );
        let i = self.index(x, y);
        self.cells[i] = cell;
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        // `max(1)` keeps chunks() happy on zero-width grids
        self.cells.chunks(self.width.max(1))
    }

    pub fn fill(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    /// Lay `overlay` on top of this grid.
    ///
    /// Overlay cells replace the cells below them, except see-through cells
    /// (transparent background and blank tile) which keep the cell below.
    pub fn composite(&mut self, overlay: &Grid) -> Result<()> {
        if overlay.dims() != self.dims() {
            return Err(CodecError::validation(format!(
                "Cannot composite {}x{} layer onto {}x{} grid",
                overlay.width, overlay.height, self.width, self.height
            )));
        }
        for (base, top) in self.cells.iter_mut().zip(overlay.cells.iter()) {
            if !top.is_see_through() {
                *base = *top;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_indexing() {
        let mut grid = Grid::new(4, 3);
        assert_eq!(grid.len(), 12);
        assert_eq!(grid.index(1, 2), 9);

        let cell = Cell::new(1, 2, 3, 65);
        grid.set(1, 2, cell);
        assert_eq!(grid.get(1, 2), Some(&cell));
        assert_eq!(grid.cells()[9], cell);
        assert_eq!(grid.get(4, 0), None);
        assert_eq!(grid.rows().count(), 3);
    }

    #[test]
    #[should_panic(expected = "(2, 1) outside 2x1 grid")]
    fn test_set_out_of_bounds() {
        Grid::new(2, 1).set(2, 1, Cell::default());
    }

    #[test]
    fn test_from_cells_size_mismatch() {
        let err = Grid::from_cells(2, 2, vec![Cell::default(); 3]).unwrap_err();
        assert!(matches!(err, CodecError::Validation(_)));
    }

    #[test]
    fn test_composite_keeps_see_through() {
        let base_cell = Cell::new(1, 2, 0, 65);
        let mut base = Grid::filled(3, 1, base_cell);

        let mut overlay = Grid::blank(3, 1);
        // Opaque overlay cell replaces
        overlay.set(0, 0, Cell::new(4, 5, 1, 66));
        // Transparent but drawn tile also replaces
        overlay.set(1, 0, Cell::new(TRANSPARENT, 7, 3, 67));

        base.composite(&overlay).unwrap();
        assert_eq!(base.cells()[0], Cell::new(4, 5, 1, 66));
        assert_eq!(base.cells()[1], Cell::new(TRANSPARENT, 7, 3, 67));
        assert_eq!(base.cells()[2], base_cell);
    }

    #[test]
    fn test_composite_dimension_mismatch() {
        let mut base = Grid::new(3, 1);
        assert!(base.composite(&Grid::new(1, 3)).is_err());
    }
}
