//! JSON project configuration for authoring assets.

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{
    Animation, Asset, BLANK_TILE, Cell, Color, Grid, MAX_BITPLANES, Palette, TRANSPARENT, Tile,
    Tileset,
};
use crate::animation::analyze_sequence;
use crate::format::{CodecError, command::MAX_SHORT_VALUE};

fn default_duration() -> u16 {
    1
}

fn default_first() -> u8 {
    0
}

fn default_background() -> i16 {
    -1
}

/// Top-level project: palette, glyphs and animations to encode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// RGB colors. Empty means no palette section.
    #[serde(default)]
    pub palette: Vec<[u8; 3]>,
    #[serde(default)]
    pub tileset: Option<TilesetConfig>,
    #[serde(default)]
    pub animations: Vec<AnimationConfig>,
}

/// Glyphs authored as `#`/`.` rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TilesetConfig {
    /// Authoring width of each glyph in pixels.
    pub square_width: u8,
    /// Authoring height of each glyph in pixels.
    pub square_height: u8,
    /// Rendering width; defaults to `square_width`.
    #[serde(default)]
    pub width: Option<u8>,
    /// Rendering height; defaults to `square_height`.
    #[serde(default)]
    pub height: Option<u8>,
    /// Tile index of the first glyph.
    #[serde(default = "default_first")]
    pub first: u8,
    pub tiles: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    pub width: u8,
    pub height: u8,
    /// Extra repetitions (0 = play once).
    #[serde(default)]
    pub loops: u8,
    pub frames: Vec<FrameConfig>,
}

/// One frame, drawn by stacking its layers bottom to top.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameConfig {
    /// Display time in 50 Hz ticks.
    #[serde(default = "default_duration")]
    pub duration: u16,
    pub layers: Vec<LayerConfig>,
}

/// A layer of text in one style, plus individually placed cells.
///
/// Cells the layer does not mention are see-through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Background color for `text`; -1 is transparent.
    #[serde(default = "default_background")]
    pub background: i16,
    #[serde(default)]
    pub foreground: u8,
    #[serde(default)]
    pub tag: u8,
    /// Rows of characters, each character's code is its tile index.
    #[serde(default)]
    pub text: Vec<String>,
    #[serde(default)]
    pub cells: Vec<CellConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellConfig {
    pub x: u8,
    pub y: u8,
    /// -1 is transparent.
    #[serde(default = "default_background")]
    pub background: i16,
    #[serde(default)]
    pub foreground: u8,
    #[serde(default)]
    pub tag: u8,
    pub tile: u8,
}

impl Default for ProjectConfig {
    /// A ball bouncing across a three-row strip.
    fn default() -> Self {
        let glyph = |rows: &[&str]| -> Vec<String> { rows.iter().map(|r| r.to_string()).collect() };
        let strip = LayerConfig {
            background: 0,
            foreground: 1,
            tag: 0,
            text: vec!["        ".into(); 3],
            cells: vec![],
        };
        let frames = [0u8, 2, 4, 6, 4, 2]
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                let row = 1 + (i % 2) as u8;
                FrameConfig {
                    duration: 5,
                    layers: vec![
                        strip.clone(),
                        LayerConfig {
                            background: -1,
                            foreground: 2,
                            tag: 0,
                            text: vec![],
                            cells: vec![CellConfig {
                                x,
                                y: row,
                                background: -1,
                                foreground: 2,
                                tag: 1,
                                tile: b'!',
                            }],
                        },
                    ],
                }
            })
            .collect();

        Self {
            palette: vec![[0, 0, 0], [255, 255, 255], [136, 57, 50], [103, 182, 189]],
            tileset: Some(TilesetConfig {
                square_width: 4,
                square_height: 4,
                width: Some(8),
                height: Some(8),
                first: b' ',
                tiles: vec![
                    glyph(&["....", "....", "....", "...."]),
                    glyph(&[".##.", "####", "####", ".##."]),
                ],
            }),
            animations: vec![AnimationConfig {
                width: 8,
                height: 3,
                loops: 0,
                frames,
            }],
        }
    }
}

impl ProjectConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.palette.len() > 1 << MAX_BITPLANES {
            return Err(ConfigError::InvalidPalette(self.palette.len()));
        }
        if let Some(tileset) = &self.tileset {
            tileset.validate()?;
        }
        for (a, animation) in self.animations.iter().enumerate() {
            if animation.width == 0 || animation.height == 0 {
                return Err(ConfigError::InvalidDimensions { animation: a });
            }
            for (f, frame) in animation.frames.iter().enumerate() {
                if frame.duration == 0 {
                    return Err(ConfigError::InvalidDuration {
                        animation: a,
                        frame: f,
                    });
                }
                if frame.layers.is_empty() {
                    return Err(ConfigError::NoLayers {
                        animation: a,
                        frame: f,
                    });
                }
                for layer in &frame.layers {
                    layer.validate(animation.width, animation.height)?;
                }
            }
        }
        Ok(())
    }

    /// Render every frame, analyze it against the previous one and assemble
    /// a validated asset.
    pub fn build(&self) -> Result<Asset, ConfigError> {
        self.validate()?;

        let palette = if self.palette.is_empty() {
            None
        } else {
            let colors = self.palette.iter().copied().map(Color::from).collect();
            Some(Palette::from_colors(colors)?)
        };
        let tileset = self.tileset.as_ref().map(TilesetConfig::build);

        let mut animations = Vec::with_capacity(self.animations.len());
        for config in &self.animations {
            animations.push(config.build()?);
        }

        let asset = Asset::new(palette, tileset, animations);
        asset.validate()?;
        Ok(asset)
    }
}

impl TilesetConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.square_width == 0
            || self.square_height == 0
            || self.width == Some(0)
            || self.height == Some(0)
        {
            return Err(ConfigError::InvalidTileSize);
        }
        if self.tiles.is_empty() || self.first as usize + self.tiles.len() > 256 {
            return Err(ConfigError::InvalidTileRange {
                first: self.first,
                count: self.tiles.len(),
            });
        }
        for (i, rows) in self.tiles.iter().enumerate() {
            let fits = rows.len() == self.square_height as usize
                && rows
                    .iter()
                    .all(|row| row.chars().count() == self.square_width as usize);
            if !fits {
                return Err(ConfigError::InvalidGlyph {
                    tile: self.first as usize + i,
                    width: self.square_width,
                    height: self.square_height,
                });
            }
        }
        Ok(())
    }

    fn build(&self) -> Tileset {
        let width = self.width.unwrap_or(self.square_width);
        let height = self.height.unwrap_or(self.square_height);
        let stride = Tileset::stride_for(width);
        let source_stride = Tileset::stride_for(self.square_width) as usize;

        let tiles = self
            .tiles
            .iter()
            .map(|rows| {
                Tile::from_rows(rows, source_stride).rescale(
                    self.square_width as usize,
                    self.square_height as usize,
                    width as usize,
                    height as usize,
                    stride as usize,
                )
            })
            .collect();

        Tileset {
            width,
            height,
            square_width: self.square_width,
            square_height: self.square_height,
            stride,
            first: self.first,
            last: self.first + (self.tiles.len() - 1) as u8,
            tiles,
        }
    }
}

impl AnimationConfig {
    fn build(&self) -> Result<Animation, ConfigError> {
        let (width, height) = (self.width as usize, self.height as usize);
        let mut grids = Vec::with_capacity(self.frames.len());
        for frame in &self.frames {
            let mut grid = Grid::blank(width, height);
            for layer in &frame.layers {
                grid.composite(&layer.render(width, height))?;
            }
            grids.push((frame.duration, grid));
        }

        let (animation, stats) = analyze_sequence(self.width, self.height, self.loops, &grids)?;
        debug!("Built {}x{} animation: {}", self.width, self.height, stats);
        Ok(animation)
    }
}

impl LayerConfig {
    fn validate(&self, width: u8, height: u8) -> Result<(), ConfigError> {
        check_style(self.background, self.foreground, self.tag)?;
        if self.text.len() > height as usize {
            return Err(ConfigError::TextTooLarge { row: self.text.len() - 1 });
        }
        for (row, text) in self.text.iter().enumerate() {
            if text.chars().count() > width as usize {
                return Err(ConfigError::TextTooLarge { row });
            }
            if let Some(ch) = text.chars().find(|&c| u32::from(c) > 0xFF) {
                return Err(ConfigError::InvalidCharacter(ch));
            }
        }
        for cell in &self.cells {
            check_style(cell.background, cell.foreground, cell.tag)?;
            if cell.x >= width || cell.y >= height {
                return Err(ConfigError::CellOutOfBounds {
                    x: cell.x,
                    y: cell.y,
                });
            }
        }
        Ok(())
    }

    /// Render to a full-size grid; unmentioned cells are see-through.
    fn render(&self, width: usize, height: usize) -> Grid {
        let mut grid = Grid::blank(width, height);
        for (y, text) in self.text.iter().enumerate().take(height) {
            for (x, ch) in text.chars().enumerate().take(width) {
                let tile = u8::try_from(u32::from(ch)).unwrap_or(BLANK_TILE);
                grid.set(
                    x,
                    y,
                    Cell::new(background(self.background), self.foreground, self.tag, tile),
                );
            }
        }
        for cell in &self.cells {
            let (x, y) = (cell.x as usize, cell.y as usize);
            if x < width && y < height {
                grid.set(
                    x,
                    y,
                    Cell::new(background(cell.background), cell.foreground, cell.tag, cell.tile),
                );
            }
        }
        grid
    }
}

fn background(value: i16) -> u8 {
    u8::try_from(value).unwrap_or(TRANSPARENT)
}

fn check_style(background: i16, foreground: u8, tag: u8) -> Result<(), ConfigError> {
    let max = MAX_SHORT_VALUE as i16;
    if background < -1 || background > max {
        return Err(ConfigError::InvalidColor(background));
    }
    if foreground > MAX_SHORT_VALUE {
        return Err(ConfigError::InvalidColor(foreground.into()));
    }
    if tag > MAX_SHORT_VALUE {
        return Err(ConfigError::InvalidTag(tag));
    }
    Ok(())
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Palette holds at most 32 colors, got {0}")]
    InvalidPalette(usize),
    #[error("Tile sizes must be non-zero")]
    InvalidTileSize,
    #[error("{count} tiles starting at {first} do not fit in 0..=255")]
    InvalidTileRange { first: u8, count: usize },
    #[error("Glyph for tile {tile} must be {height} rows of {width} pixels")]
    InvalidGlyph { tile: usize, width: u8, height: u8 },
    #[error("Animation {animation} dimensions must be non-zero")]
    InvalidDimensions { animation: usize },
    #[error("Frame {frame} of animation {animation} has zero duration")]
    InvalidDuration { animation: usize, frame: usize },
    #[error("Frame {frame} of animation {animation} has no layers")]
    NoLayers { animation: usize, frame: usize },
    #[error("Layer text row {row} does not fit the animation")]
    TextTooLarge { row: usize },
    #[error("Character {0:?} has no tile index")]
    InvalidCharacter(char),
    #[error("Cell ({x}, {y}) lies outside the animation")]
    CellOutOfBounds { x: u8, y: u8 },
    #[error("Color {0} must be -1 (transparent) or 0..=31")]
    InvalidColor(i16),
    #[error("Tag {0} must be 0..=31")]
    InvalidTag(u8),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimationPlayer;

    #[test]
    fn test_default_builds() {
        let config = ProjectConfig::default();
        config.validate().unwrap();
        let asset = config.build().unwrap();

        assert_eq!(asset.palette.as_ref().unwrap().bitplanes, 2);
        let tileset = asset.tileset.as_ref().unwrap();
        assert_eq!((tileset.width, tileset.height, tileset.stride), (8, 8, 1));
        assert_eq!((tileset.first, tileset.last), (32, 33));
        assert_eq!(asset.animations[0].frames.len(), 6);

        let bytes = asset.encode().unwrap();
        assert_eq!(Asset::decode(&bytes).unwrap(), asset);
    }

    #[test]
    fn test_json_roundtrip_with_defaults() {
        let json = r#"{
            "animations": [{
                "width": 3,
                "height": 1,
                "frames": [{ "layers": [{ "background": 1, "foreground": 2, "text": ["AAA"] }] }]
            }]
        }"#;
        let config = ProjectConfig::from_json(json).unwrap();
        assert!(config.palette.is_empty());
        assert_eq!(config.animations[0].loops, 0);
        assert_eq!(config.animations[0].frames[0].duration, 1);
        assert_eq!(config.animations[0].frames[0].layers[0].tag, 0);

        let asset = config.build().unwrap();
        assert_eq!(
            asset.animations[0].frames[0].commands,
            vec![
                crate::format::Command::Background(1),
                crate::format::Command::Foreground(2),
                crate::format::Command::Fill(2, b'A'),
            ]
        );

        let json = serde_json::to_string(&config).unwrap();
        let reparsed = ProjectConfig::from_json(&json).unwrap();
        assert_eq!(reparsed.build().unwrap(), asset);
    }

    #[test]
    fn test_layers_composite() {
        let json = r#"{
            "animations": [{
                "width": 2,
                "height": 1,
                "frames": [{ "layers": [
                    { "background": 3, "foreground": 1, "text": ["ab"] },
                    { "foreground": 4, "tag": 2, "text": [" z"] }
                ] }]
            }]
        }"#;
        let asset = ProjectConfig::from_json(json).unwrap().build().unwrap();
        let mut player = AnimationPlayer::new(&asset.animations[0]);
        player.next_frame().unwrap();
        assert_eq!(player.grid().cells()[0], Cell::new(3, 1, 0, b'a'));
        assert_eq!(player.grid().cells()[1], Cell::new(TRANSPARENT, 4, 2, b'z'));
    }

    #[test]
    fn test_glyph_rescale() {
        let config = TilesetConfig {
            square_width: 2,
            square_height: 2,
            width: Some(4),
            height: Some(4),
            first: 0,
            tiles: vec![vec!["#.".into(), ".#".into()]],
        };
        let tileset = config.build();
        tileset.validate().unwrap();
        assert_eq!(
            tileset.tiles[0].to_rows(4),
            vec!["##..", "##..", "..##", "..##"]
        );
    }

    #[test]
    fn test_invalid_configs() {
        let mut config = ProjectConfig::default();
        config.palette = vec![[0, 0, 0]; 33];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPalette(33))
        ));

        let mut config = ProjectConfig::default();
        config.animations[0].frames[0].duration = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDuration { animation: 0, frame: 0 })
        ));

        let mut config = ProjectConfig::default();
        config.animations[0].frames[1].layers[1].cells[0].x = 8;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::CellOutOfBounds { x: 8, .. })
        ));

        let mut config = ProjectConfig::default();
        config.animations[0].frames[0].layers[0].background = 32;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidColor(32))
        ));

        let mut config = ProjectConfig::default();
        config.animations[0].frames[0].layers[0].text[0] = "         ".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TextTooLarge { row: 0 })
        ));
    }

    #[test]
    fn test_tiles_outside_tileset_fail_build() {
        let mut config = ProjectConfig::default();
        config.animations[0].frames[0].layers[0].text[0] = "xxxxxxxx".into();
        assert!(matches!(
            config.build(),
            Err(ConfigError::Codec(CodecError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            ProjectConfig::from_json("{ \"palette\": 3 }"),
            Err(ConfigError::Parse(_))
        ));
    }
}
