//! Monochrome glyph tiles.

use crate::format::{CodecError, Result};

/// Glyph bitmap: `height` rows of `stride` bytes, MSB-first. A set bit is a
/// foreground pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    stride: usize,
    height: usize,
    data: Vec<u8>,
}

impl Tile {
    /// All-background tile.
    pub fn empty(stride: usize, height: usize) -> Self {
        Self {
            stride,
            height,
            data: vec![0; stride * height],
        }
    }

    pub fn from_bytes(stride: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        if data.len() != stride * height {
            return Err(CodecError::validation(format!(
                "Tile data is {} bytes, expected {}",
                data.len(),
                stride * height
            )));
        }
        Ok(Self {
            stride,
            height,
            data,
        })
    }

    /// Build a tile from ASCII rows where `#` marks a set pixel.
    pub fn from_rows<S: AsRef<str>>(rows: &[S], stride: usize) -> Self {
        let mut tile = Self::empty(stride, rows.len());
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.as_ref().chars().take(stride * 8).enumerate() {
                tile.set(x, y, ch == '#');
            }
        }
        tile
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Pixel at `(x, y)`; out-of-bounds reads are clear.
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.stride * 8 || y >= self.height {
            return false;
        }
        (self.data[y * self.stride + x / 8] >> (7 - (x & 7))) & 1 == 1
    }

    /// # Panics
    ///
    /// Panics if `x` is past the stride or `y` past the height.
    pub fn set(&mut self, x: usize, y: usize, bit: bool) {
        assert!(
            x < self.stride * 8 && y < self.height,
            "({x}, {y}) outside {}x{} tile",
            self.stride * 8,
            self.height
        );
        let mask = 0x80 >> (x & 7);
        let byte = &mut self.data[y * self.stride + x / 8];
        if bit {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
    }

    /// Nearest-neighbour resample of the `src_width x src_height` area of this
    /// tile to a new `dst_width x dst_height` tile.
    pub fn rescale(
        &self,
        src_width: usize,
        src_height: usize,
        dst_width: usize,
        dst_height: usize,
        dst_stride: usize,
    ) -> Tile {
        let mut out = Tile::empty(dst_stride, dst_height);
        if src_width == 0 || src_height == 0 {
            return out;
        }
        for y in 0..dst_height {
            let sy = y * src_height / dst_height;
            for x in 0..dst_width {
                let sx = x * src_width / dst_width;
                if self.get(sx, sy) {
                    out.set(x, y, true);
                }
            }
        }
        out
    }

    /// `#`/`.` rows, `width` pixels wide.
    pub fn to_rows(&self, width: usize) -> Vec<String> {
        (0..self.height)
            .map(|y| {
                (0..width)
                    .map(|x| if self.get(x, y) { '#' } else { '.' })
                    .collect()
            })
            .collect()
    }
}

/// Glyph set covering tile indices `first..=last`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tileset {
    /// Rendering width in pixels.
    pub width: u8,
    /// Rendering height in pixels.
    pub height: u8,
    /// Authoring width in pixels (before rescaling).
    pub square_width: u8,
    /// Authoring height in pixels (before rescaling).
    pub square_height: u8,
    /// Bytes per tile row.
    pub stride: u8,
    pub first: u8,
    pub last: u8,
    pub tiles: Vec<Tile>,
}

impl Tileset {
    /// Bytes needed to hold `width` pixels.
    pub fn stride_for(width: u8) -> u8 {
        width.div_ceil(8)
    }

    /// Number of tiles implied by the index range.
    #[inline]
    pub fn tile_count(&self) -> usize {
        (self.last as usize + 1).saturating_sub(self.first as usize)
    }

    #[inline]
    pub fn contains(&self, tile: u8) -> bool {
        tile >= self.first && tile <= self.last
    }

    /// Tile for the absolute index `tile`.
    pub fn tile(&self, tile: u8) -> Option<&Tile> {
        if !self.contains(tile) {
            return None;
        }
        self.tiles.get((tile - self.first) as usize)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width < 1 || self.height < 1 {
            return Err(CodecError::validation(format!(
                "Illegal tile size {}x{}",
                self.width, self.height
            )));
        }
        if self.square_width < 1 || self.square_height < 1 {
            return Err(CodecError::validation(format!(
                "Illegal authoring tile size {}x{}",
                self.square_width, self.square_height
            )));
        }
        if self.stride < 1 {
            return Err(CodecError::validation("Tile stride must be non-zero"));
        }
        if (self.stride as usize) * 8 < self.width as usize {
            return Err(CodecError::validation(format!(
                "Tile stride {} too small for width {}",
                self.stride, self.width
            )));
        }
        if self.last < self.first {
            return Err(CodecError::validation(format!(
                "Tile range [{}, {}] is inverted",
                self.first, self.last
            )));
        }
        if self.tiles.len() != self.tile_count() {
            return Err(CodecError::validation(format!(
                "Expected {} tiles, got {}",
                self.tile_count(),
                self.tiles.len()
            )));
        }
        let expected = self.stride as usize * self.height as usize;
        for (i, tile) in self.tiles.iter().enumerate() {
            if tile.as_bytes().len() != expected {
                return Err(CodecError::validation(format!(
                    "Tile {} is {} bytes, expected {}",
                    self.first as usize + i,
                    tile.as_bytes().len(),
                    expected
                )));
            }
        }
        Ok(())
    }
}
