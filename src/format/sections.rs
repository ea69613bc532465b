//! Typed section codecs and the root container.
//!
//! ```text
//! P1 Palette:   bitplanes u8, (1 << bitplanes) x (r, g, b)
//! T1 Tileset:   width, height, square_width, square_height, stride, first, last (u8 each),
//!               (last - first + 1) x (stride * height) tile bytes
//! A1 Animation: width, height, loops (u8 each)
//! F1 Frame:     duration u16 (big-endian), command stream
//! ```
//!
//! The root is a flat chunk sequence. Frame chunks follow their Animation
//! chunk as siblings rather than nesting inside it.

use super::chunk::{Chunks, RawChunk, Section, Signature};
use super::command::{Command, encode_commands};
use super::error::{CodecError, Result};
use super::reader::ByteReader;
use crate::schema::{Animation, Asset, Color, Frame, MAX_BITPLANES, Palette, Tile, Tileset};

pub const PALETTE_SIGNATURE: Signature = *b"P1";
pub const TILESET_SIGNATURE: Signature = *b"T1";
pub const ANIMATION_SIGNATURE: Signature = *b"A1";
pub const FRAME_SIGNATURE: Signature = *b"F1";

/// Signatures accepted at the root of an asset.
pub const ROOT_SIGNATURES: [Signature; 4] = [
    PALETTE_SIGNATURE,
    TILESET_SIGNATURE,
    ANIMATION_SIGNATURE,
    FRAME_SIGNATURE,
];

impl Section for Palette {
    const SIGNATURE: Signature = PALETTE_SIGNATURE;

    fn write_body(&self, out: &mut Vec<u8>) -> Result<()> {
        out.push(self.bitplanes);
        for color in &self.colors {
            out.extend_from_slice(&color.to_array());
        }
        Ok(())
    }

    fn read_body(r: &mut ByteReader<'_>) -> Result<Self> {
        let bitplanes = r.read_u8("palette bitplanes")?;
        if bitplanes > MAX_BITPLANES {
            return Err(CodecError::validation(format!(
                "Illegal number of bitplanes: {bitplanes}"
            )));
        }
        let count = 1usize << bitplanes;
        let bytes = r.take(count * 3, "palette colors")?;
        let colors = bytes
            .chunks_exact(3)
            .map(|c| Color::rgb(c[0], c[1], c[2]))
            .collect();
        Ok(Palette::new(bitplanes, colors))
    }
}

impl Section for Tileset {
    const SIGNATURE: Signature = TILESET_SIGNATURE;

    fn write_body(&self, out: &mut Vec<u8>) -> Result<()> {
        out.extend_from_slice(&[
            self.width,
            self.height,
            self.square_width,
            self.square_height,
            self.stride,
            self.first,
            self.last,
        ]);
        for tile in &self.tiles {
            out.extend_from_slice(tile.as_bytes());
        }
        Ok(())
    }

    fn read_body(r: &mut ByteReader<'_>) -> Result<Self> {
        let header = r.take(7, "tileset header")?;
        let [width, height, square_width, square_height, stride, first, last] =
            [header[0], header[1], header[2], header[3], header[4], header[5], header[6]];
        if last < first {
            return Err(CodecError::validation(format!(
                "Tile range [{first}, {last}] is inverted"
            )));
        }

        let tile_size = stride as usize * height as usize;
        let count = (last - first) as usize + 1;
        let mut tiles = Vec::with_capacity(count);
        for _ in 0..count {
            let data = r.take(tile_size, "tile data")?;
            tiles.push(Tile::from_bytes(stride as usize, height as usize, data.to_vec())?);
        }

        Ok(Tileset {
            width,
            height,
            square_width,
            square_height,
            stride,
            first,
            last,
            tiles,
        })
    }
}

/// Fixed part of an Animation chunk. Its frames travel as sibling chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationHeader {
    pub width: u8,
    pub height: u8,
    pub loops: u8,
}

impl From<&Animation> for AnimationHeader {
    fn from(animation: &Animation) -> Self {
        Self {
            width: animation.width,
            height: animation.height,
            loops: animation.loops,
        }
    }
}

impl Section for AnimationHeader {
    const SIGNATURE: Signature = ANIMATION_SIGNATURE;

    fn write_body(&self, out: &mut Vec<u8>) -> Result<()> {
        out.extend_from_slice(&[self.width, self.height, self.loops]);
        Ok(())
    }

    fn read_body(r: &mut ByteReader<'_>) -> Result<Self> {
        let b = r.take(3, "animation header")?;
        Ok(Self {
            width: b[0],
            height: b[1],
            loops: b[2],
        })
    }
}

impl Section for Frame {
    const SIGNATURE: Signature = FRAME_SIGNATURE;

    fn write_body(&self, out: &mut Vec<u8>) -> Result<()> {
        out.extend_from_slice(&self.duration.to_be_bytes());
        encode_commands(&self.commands, out)
    }

    fn read_body(r: &mut ByteReader<'_>) -> Result<Self> {
        let duration = r.read_u16("frame duration")?;
        let mut commands = Vec::new();
        while !r.is_empty() {
            // A zero in header position as the very last byte is the chunk pad
            if r.remaining() == 1 && r.peek() == Some(0) {
                r.rest();
                break;
            }
            let command = Command::decode(r)?;
            log::trace!("decoded {command}");
            commands.push(command);
        }
        Ok(Frame::new(duration, commands))
    }
}

/// Serialize an asset as a flat chunk sequence.
pub fn encode_asset(asset: &Asset) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    if let Some(palette) = &asset.palette {
        palette.write_chunk(&mut out)?;
    }
    if let Some(tileset) = &asset.tileset {
        tileset.write_chunk(&mut out)?;
    }
    for animation in &asset.animations {
        AnimationHeader::from(animation).write_chunk(&mut out)?;
        for frame in &animation.frames {
            let start = out.len();
            frame.write_chunk(&mut out)?;
            log::trace!(
                "frame: {} commands, {} bytes",
                frame.commands.len(),
                out.len() - start
            );
        }
        log::debug!(
            "encoded {}x{} animation with {} frames",
            animation.width,
            animation.height,
            animation.frames.len()
        );
    }
    Ok(out)
}

/// Parse a flat chunk sequence into an asset. Does not validate.
pub fn decode_asset(bytes: &[u8]) -> Result<Asset> {
    let mut asset = Asset::default();

    // Each chunk is parsed before the next one is framed
    for chunk in Chunks::new(bytes) {
        let chunk = chunk?;
        match chunk.signature {
            PALETTE_SIGNATURE => {
                if asset.palette.is_some() {
                    return Err(duplicate(&chunk, "palette"));
                }
                asset.palette = Some(chunk.parse()?);
            }
            TILESET_SIGNATURE => {
                if asset.tileset.is_some() {
                    return Err(duplicate(&chunk, "tileset"));
                }
                asset.tileset = Some(chunk.parse()?);
            }
            ANIMATION_SIGNATURE => {
                let header: AnimationHeader = chunk.parse()?;
                asset
                    .animations
                    .push(Animation::new(header.width, header.height, header.loops));
            }
            FRAME_SIGNATURE => {
                let frame: Frame = chunk.parse()?;
                let animation = asset.animations.last_mut().ok_or_else(|| {
                    CodecError::format(format!(
                        "Frame chunk at offset {} precedes any animation",
                        chunk.offset
                    ))
                })?;
                animation.frames.push(frame);
            }
            _ => chunk.check_signature(&ROOT_SIGNATURES)?,
        }
    }

    Ok(asset)
}

fn duplicate(chunk: &RawChunk<'_>, what: &str) -> CodecError {
    CodecError::format(format!(
        "More than one {what} (second at offset {})",
        chunk.offset
    ))
}
