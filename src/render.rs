//! Rasterizing decoded grids to pixels, and GIF export.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{debug, info};

use crate::animation::AnimationPlayer;
use crate::format::CodecError;
use crate::schema::{Animation, Asset, Color, Grid, Palette, TRANSPARENT, Tileset};

/// Milliseconds per frame tick (50 Hz).
pub const TICK_MS: u32 = 20;

/// Display time of a frame in milliseconds.
#[inline]
pub fn frame_delay_ms(duration: u16) -> u32 {
    duration as u32 * TICK_MS
}

/// Row-major image of palette indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedImage {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

/// Row-major RGB image, 3 bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbImage {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl RgbImage {
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 3;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]])
    }
}

/// Draws grids with a palette and tileset.
#[derive(Debug, Clone, Copy)]
pub struct Rasterizer<'a> {
    palette: &'a Palette,
    tileset: &'a Tileset,
    scale: usize,
}

impl<'a> Rasterizer<'a> {
    pub fn new(palette: &'a Palette, tileset: &'a Tileset, scale: usize) -> Self {
        Self {
            palette,
            tileset,
            scale: scale.max(1),
        }
    }

    /// Pixel size of one cell.
    pub fn cell_size(&self) -> (usize, usize) {
        (
            self.tileset.width as usize * self.scale,
            self.tileset.height as usize * self.scale,
        )
    }

    /// Pixel size of a whole grid.
    pub fn image_size(&self, grid: &Grid) -> (usize, usize) {
        let (cw, ch) = self.cell_size();
        (grid.width() * cw, grid.height() * ch)
    }

    pub fn render_indexed(&self, grid: &Grid) -> IndexedImage {
        let (cw, ch) = self.cell_size();
        let (width, height) = self.image_size(grid);
        let mut pixels = vec![0u8; width * height];

        for (row, cells) in grid.rows().enumerate() {
            for (column, cell) in cells.iter().enumerate() {
                let background = if cell.background == TRANSPARENT {
                    0
                } else {
                    cell.background
                };
                let tile = self.tileset.tile(cell.tile);
                for py in 0..ch {
                    let start = (row * ch + py) * width + column * cw;
                    let line = &mut pixels[start..start + cw];
                    match tile {
                        Some(tile) => {
                            let ty = py / self.scale;
                            for (px, pixel) in line.iter_mut().enumerate() {
                                *pixel = if tile.get(px / self.scale, ty) {
                                    cell.foreground
                                } else {
                                    background
                                };
                            }
                        }
                        None => line.fill(background),
                    }
                }
            }
        }

        IndexedImage {
            width,
            height,
            pixels,
        }
    }

    pub fn render(&self, grid: &Grid) -> RgbImage {
        let indexed = self.render_indexed(grid);
        let mut pixels = Vec::with_capacity(indexed.pixels.len() * 3);
        for &index in &indexed.pixels {
            let color = self.palette.get(index).unwrap_or(Color::BLACK);
            pixels.extend_from_slice(&color.to_array());
        }
        RgbImage {
            width: indexed.width,
            height: indexed.height,
            pixels,
        }
    }
}

/// GIF export errors.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Asset has no palette")]
    MissingPalette,
    #[error("Asset has no tileset")]
    MissingTileset,
    #[error("Asset has no animation {0}")]
    MissingAnimation(usize),
    #[error("Image size {width}x{height} exceeds the GIF limit")]
    TooLarge { width: usize, height: usize },
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("GIF encoding failed: {0}")]
    Gif(#[from] gif::EncodingError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Write animation `index` of `asset` as an animated GIF.
pub fn export_gif<W: Write>(
    asset: &Asset,
    index: usize,
    scale: usize,
    writer: W,
) -> Result<(), RenderError> {
    let palette = asset.palette.as_ref().ok_or(RenderError::MissingPalette)?;
    let tileset = asset.tileset.as_ref().ok_or(RenderError::MissingTileset)?;
    let animation = asset
        .animations
        .get(index)
        .ok_or(RenderError::MissingAnimation(index))?;

    let rasterizer = Rasterizer::new(palette, tileset, scale);
    let (width, height) = rasterizer.image_size(&Grid::new(
        animation.width as usize,
        animation.height as usize,
    ));
    let (Ok(gif_width), Ok(gif_height)) = (u16::try_from(width), u16::try_from(height)) else {
        return Err(RenderError::TooLarge { width, height });
    };

    let global_palette: Vec<u8> = palette.colors.iter().flat_map(|c| c.to_array()).collect();
    let mut encoder = gif::Encoder::new(writer, gif_width, gif_height, &global_palette)?;
    encoder.set_repeat(repeat_for(animation))?;

    let mut player = AnimationPlayer::new(animation);
    while let Some(frame) = player.next_frame()? {
        let image = rasterizer.render_indexed(player.grid());
        let mut gif_frame = gif::Frame {
            width: gif_width,
            height: gif_height,
            buffer: image.pixels.into(),
            ..gif::Frame::default()
        };
        // GIF delays are in centiseconds
        gif_frame.delay = u16::try_from(frame_delay_ms(frame.duration) / 10).unwrap_or(u16::MAX);
        encoder.write_frame(&gif_frame)?;
    }
    encoder.into_inner()?.flush()?;

    debug!(
        "Exported {} frames at {}x{}",
        animation.frames.len(),
        width,
        height
    );
    Ok(())
}

/// Write animation `index` of `asset` to a GIF file.
pub fn save_gif<P: AsRef<Path>>(
    asset: &Asset,
    index: usize,
    scale: usize,
    path: P,
) -> Result<(), RenderError> {
    let file = File::create(path.as_ref())?;
    export_gif(asset, index, scale, BufWriter::new(file))?;
    info!("GIF saved: {}", path.as_ref().display());
    Ok(())
}

fn repeat_for(animation: &Animation) -> gif::Repeat {
    // 0 means loop forever, as in most GIF viewers
    match animation.loops {
        0 => gif::Repeat::Infinite,
        n => gif::Repeat::Finite(n as u16),
    }
}
