//! Frames, animations and the root asset.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use super::{Palette, Tileset};
use crate::format::{self, Command, CodecError, Result};

/// One frame of an animation: a duration and the commands that turn the
/// previous frame's grid into this one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Display time in ticks (at least 1).
    pub duration: u16,
    pub commands: Vec<Command>,
}

impl Frame {
    pub fn new(duration: u16, commands: Vec<Command>) -> Self {
        Self { duration, commands }
    }

    /// Total cells covered by the command list.
    pub fn coverage(&self) -> usize {
        format::coverage(&self.commands)
    }

    /// Size of the encoded command stream in bytes.
    pub fn encoded_len(&self) -> Result<usize> {
        let mut out = Vec::new();
        format::encode_commands(&self.commands, &mut out)?;
        Ok(out.len())
    }

    pub fn validate(
        &self,
        cells: usize,
        palette: Option<&Palette>,
        tileset: Option<&Tileset>,
    ) -> Result<()> {
        if self.duration < 1 {
            return Err(CodecError::validation(format!(
                "Illegal frame duration: {}",
                self.duration
            )));
        }
        for command in &self.commands {
            command.validate(palette, tileset)?;
        }
        // A trailing 0x00 is indistinguishable from chunk padding
        if self.commands.last() == Some(&Command::Transparent) {
            return Err(CodecError::format(
                "Frame cannot end with a Transparent command",
            ));
        }
        let coverage = self.coverage();
        if coverage != cells {
            return Err(CodecError::format(format!(
                "Frame encodes {coverage} cells, expected {cells}"
            )));
        }
        Ok(())
    }
}

/// A sequence of frames sharing one grid size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
    pub width: u8,
    pub height: u8,
    /// Number of loops, 0 = forever.
    pub loops: u8,
    pub frames: Vec<Frame>,
}

impl Animation {
    pub fn new(width: u8, height: u8, loops: u8) -> Self {
        Self {
            width,
            height,
            loops,
            frames: Vec::new(),
        }
    }

    /// Cells per frame.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Sum of frame durations in ticks.
    pub fn total_duration(&self) -> u64 {
        self.frames.iter().map(|f| f.duration as u64).sum()
    }

    pub fn validate(&self, palette: Option<&Palette>, tileset: Option<&Tileset>) -> Result<()> {
        if self.width < 1 || self.height < 1 {
            return Err(CodecError::validation(format!(
                "Illegal grid size {}x{}",
                self.width, self.height
            )));
        }
        let cells = self.cell_count();
        for (i, frame) in self.frames.iter().enumerate() {
            frame.validate(cells, palette, tileset).map_err(|e| match e {
                CodecError::Format(msg) => CodecError::Format(format!("frame {i}: {msg}")),
                CodecError::Validation(msg) => {
                    CodecError::Validation(format!("frame {i}: {msg}"))
                }
                other => other,
            })?;
        }
        Ok(())
    }
}

/// Root of the container: optional palette, optional tileset, animations.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Asset {
    pub palette: Option<Palette>,
    pub tileset: Option<Tileset>,
    pub animations: Vec<Animation>,
}

impl Asset {
    pub fn new(
        palette: Option<Palette>,
        tileset: Option<Tileset>,
        animations: Vec<Animation>,
    ) -> Self {
        Self {
            palette,
            tileset,
            animations,
        }
    }

    /// Check every section, and every command against the attached palette
    /// and tileset.
    pub fn validate(&self) -> Result<()> {
        if let Some(palette) = &self.palette {
            palette.validate()?;
        }
        if let Some(tileset) = &self.tileset {
            tileset.validate()?;
        }
        for animation in &self.animations {
            animation.validate(self.palette.as_ref(), self.tileset.as_ref())?;
        }
        Ok(())
    }

    /// Validate and serialize.
    pub fn encode(&self) -> Result<Vec<u8>> {
        self.validate()?;
        format::encode_asset(self)
    }

    /// Parse and validate.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let asset = format::decode_asset(bytes)?;
        asset.validate()?;
        Ok(asset)
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(&self.encode()?)?;
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let mut bytes = Vec::new();
        r.read_to_end(&mut bytes)?;
        Self::decode(&bytes)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.encode()?)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::decode(&fs::read(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Color;
    use tempfile::tempdir;

    fn test_asset() -> Asset {
        let mut animation = Animation::new(3, 1, 0);
        animation.frames.push(Frame::new(
            2,
            vec![
                Command::Background(1),
                Command::Foreground(2),
                Command::Fill(2, 65),
            ],
        ));
        animation.frames.push(Frame::new(1, vec![Command::Skip(2)]));
        Asset::new(
            Some(Palette::new(2, vec![Color::rgb(1, 2, 3); 4])),
            None,
            vec![animation],
        )
    }

    #[test]
    fn test_validate_ok() {
        let asset = test_asset();
        assert!(asset.validate().is_ok());
        assert_eq!(asset.animations[0].total_duration(), 3);
    }

    #[test]
    fn test_coverage_mismatch() {
        let mut asset = test_asset();
        asset.animations[0].frames[1].commands = vec![Command::Skip(1)];
        let err = asset.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid container: frame 1: Frame encodes 2 cells, expected 3"
        );
    }

    #[test]
    fn test_zero_duration() {
        let mut asset = test_asset();
        asset.animations[0].frames[0].duration = 0;
        assert!(matches!(asset.validate(), Err(CodecError::Validation(_))));
    }

    #[test]
    fn test_zero_dimensions() {
        let mut asset = test_asset();
        asset.animations[0].height = 0;
        assert!(matches!(asset.validate(), Err(CodecError::Validation(_))));
    }

    #[test]
    fn test_color_outside_palette() {
        let mut asset = test_asset();
        asset.animations[0].frames[0].commands[0] = Command::Background(4);
        assert!(matches!(
            asset.validate(),
            Err(CodecError::OutOfRange { .. })
        ));

        // Without a palette there is nothing to check against
        asset.palette = None;
        assert!(asset.validate().is_ok());
    }

    #[test]
    fn test_trailing_transparent_rejected() {
        let mut asset = test_asset();
        asset.animations[0].frames[1].commands.push(Command::Transparent);
        assert!(matches!(asset.validate(), Err(CodecError::Format(_))));
    }

    #[test]
    fn test_save_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.lvs");

        let asset = test_asset();
        asset.save(&path).unwrap();
        assert!(path.exists());

        let loaded = Asset::load(&path).unwrap();
        assert_eq!(loaded, asset);
    }

    #[test]
    fn test_write_read() {
        let asset = test_asset();
        let mut buf = Vec::new();
        asset.write_to(&mut buf).unwrap();

        let mut cursor = std::io::Cursor::new(&buf);
        assert_eq!(Asset::read_from(&mut cursor).unwrap(), asset);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = Asset::load(dir.path().join("missing.lvs")).unwrap_err();
        assert!(matches!(err, CodecError::Io(_)));
    }
}
