//! Draw-command instruction set.
//!
//! Every instruction starts with a header byte: the top 3 bits are the opcode,
//! the low 5 bits an inline immediate.
//!
//! ```text
//! 0 Transparent  5-bit (0)           background = TRANSPARENT
//! 1 Background   5-bit color         background = color
//! 2 Foreground   5-bit color         foreground = color
//! 3 Tag          5-bit tag           tag = tag
//! 4 Skip         12-bit count-1      advance cursor
//! 5 Fill         12-bit count-1      + 1 tile byte
//! 6 Run          12-bit length-1     + length tile bytes
//! ```
//!
//! 12-bit immediates use a short form when the value fits in 4 bits
//! (`0b000v_vvvv` with bit 4 clear). Otherwise bit 4 is set, the low nibble
//! holds bits 8-11 and one continuation byte holds bits 0-7.

use std::fmt;

use super::error::{CodecError, Result};
use super::reader::ByteReader;
use crate::schema::{Palette, Tileset};

/// Largest value of a 5-bit immediate.
pub const MAX_SHORT_VALUE: u8 = 0x1F;

/// Largest value of a 12-bit immediate.
pub const MAX_LONG_VALUE: u16 = 0x0FFF;

/// Largest cell count one Skip/Fill/Run can cover.
pub const MAX_SPAN: usize = MAX_LONG_VALUE as usize + 1;

const LONG_FLAG: u8 = 0x10;

/// Instruction opcode (top 3 bits of the header byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Transparent = 0,
    Background = 1,
    Foreground = 2,
    Tag = 3,
    Skip = 4,
    Fill = 5,
    Run = 6,
}

impl Opcode {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Opcode::Transparent),
            1 => Some(Opcode::Background),
            2 => Some(Opcode::Foreground),
            3 => Some(Opcode::Tag),
            4 => Some(Opcode::Skip),
            5 => Some(Opcode::Fill),
            6 => Some(Opcode::Run),
            _ => None,
        }
    }
}

/// One draw command.
///
/// Skip and Fill hold the stored immediate, i.e. the cell count minus one,
/// exactly as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    /// Background becomes transparent.
    Transparent,
    Background(u8),
    Foreground(u8),
    Tag(u8),
    /// Advance the cursor by `value + 1` cells without writing.
    Skip(u16),
    /// Write `value + 1` copies of a tile.
    Fill(u16, u8),
    /// Write a literal tile sequence.
    Run(Vec<u8>),
}

impl Command {
    /// Skip covering `count` cells.
    pub fn skip(count: usize) -> Result<Self> {
        Ok(Command::Skip(span_value(count)?))
    }

    /// Fill covering `count` cells.
    pub fn fill(count: usize, tile: u8) -> Result<Self> {
        Ok(Command::Fill(span_value(count)?, tile))
    }

    /// Run writing `tiles`.
    pub fn run(tiles: impl Into<Vec<u8>>) -> Result<Self> {
        let tiles = tiles.into();
        span_value(tiles.len())?;
        Ok(Command::Run(tiles))
    }

    pub fn opcode(&self) -> Opcode {
        match self {
            Command::Transparent => Opcode::Transparent,
            Command::Background(_) => Opcode::Background,
            Command::Foreground(_) => Opcode::Foreground,
            Command::Tag(_) => Opcode::Tag,
            Command::Skip(_) => Opcode::Skip,
            Command::Fill(..) => Opcode::Fill,
            Command::Run(_) => Opcode::Run,
        }
    }

    /// Number of grid cells this command advances over.
    pub fn cells(&self) -> usize {
        match self {
            Command::Transparent
            | Command::Background(_)
            | Command::Foreground(_)
            | Command::Tag(_) => 0,
            Command::Skip(v) | Command::Fill(v, _) => *v as usize + 1,
            Command::Run(tiles) => tiles.len(),
        }
    }

    /// Append the wire form of this command to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
        let opcode = self.opcode();
        match self {
            Command::Transparent => encode_short(opcode, 0, out),
            Command::Background(v) | Command::Foreground(v) | Command::Tag(v) => {
                encode_short(opcode, *v, out)
            }
            Command::Skip(v) => encode_long(opcode, *v as usize, out),
            Command::Fill(v, tile) => {
                encode_long(opcode, *v as usize, out)?;
                out.push(*tile);
                Ok(())
            }
            Command::Run(tiles) => {
                if tiles.is_empty() {
                    return Err(CodecError::EmptyRun);
                }
                encode_long(opcode, tiles.len() - 1, out)?;
                out.extend_from_slice(tiles);
                Ok(())
            }
        }
    }

    /// Read one command from `r`.
    pub fn decode(r: &mut ByteReader<'_>) -> Result<Self> {
        let header = r.read_u8("command header")?;
        let raw_opcode = header >> 5;
        let value = header & MAX_SHORT_VALUE;
        let opcode = Opcode::from_u8(raw_opcode).ok_or(CodecError::UnsupportedOpcode(raw_opcode))?;

        let command = match opcode {
            Opcode::Transparent => {
                if value != 0 {
                    return Err(CodecError::format(format!(
                        "Transparent command carries non-zero value {value}"
                    )));
                }
                Command::Transparent
            }
            Opcode::Background => Command::Background(value),
            Opcode::Foreground => Command::Foreground(value),
            Opcode::Tag => Command::Tag(value),
            Opcode::Skip => Command::Skip(decode_long(header, r)?),
            Opcode::Fill => {
                let count = decode_long(header, r)?;
                Command::Fill(count, r.read_u8("fill tile")?)
            }
            Opcode::Run => {
                let len = decode_long(header, r)? as usize + 1;
                Command::Run(r.take(len, "run tiles")?.to_vec())
            }
        };
        Ok(command)
    }

    /// Check color and tile operands against the attached palette and tileset.
    ///
    /// Bounds are only enforced for the sections that are present.
    pub fn validate(&self, palette: Option<&Palette>, tileset: Option<&Tileset>) -> Result<()> {
        match self {
            Command::Background(color) | Command::Foreground(color) => {
                if let Some(palette) = palette {
                    check_color(*color, palette)?;
                }
            }
            Command::Fill(_, tile) => {
                if let Some(tileset) = tileset {
                    check_tile(*tile, tileset)?;
                }
            }
            Command::Run(tiles) => {
                if tiles.is_empty() {
                    return Err(CodecError::EmptyRun);
                }
                if let Some(tileset) = tileset {
                    for &tile in tiles {
                        check_tile(tile, tileset)?;
                    }
                }
            }
            Command::Transparent | Command::Tag(_) | Command::Skip(_) => {}
        }
        Ok(())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Transparent => write!(f, "Transparent"),
            Command::Background(c) => write!(f, "Background (Color: {c})"),
            Command::Foreground(c) => write!(f, "Foreground (Color: {c})"),
            Command::Tag(t) => write!(f, "Tag ({t})"),
            Command::Skip(v) => write!(f, "Skip (Count: {})", *v as usize + 1),
            Command::Fill(v, tile) => write!(
                f,
                "Fill (Count: {}, Tile: {tile}, Text: \"{}\")",
                *v as usize + 1,
                printable(*tile)
            ),
            Command::Run(tiles) => {
                let text: String = tiles.iter().map(|&t| printable(t)).collect();
                write!(f, "Run (Tiles: {tiles:?}, Text: \"{text}\")")
            }
        }
    }
}

/// Printable ASCII for a tile index, `.` otherwise.
pub fn printable(tile: u8) -> char {
    if (0x20..0x7F).contains(&tile) {
        tile as char
    } else {
        '.'
    }
}

/// Decode a whole command stream.
pub fn decode_commands(bytes: &[u8]) -> Result<Vec<Command>> {
    let mut r = ByteReader::new(bytes);
    let mut commands = Vec::new();
    while !r.is_empty() {
        let command = Command::decode(&mut r)?;
        log::trace!("decoded {command}");
        commands.push(command);
    }
    Ok(commands)
}

/// Encode a whole command stream.
pub fn encode_commands(commands: &[Command], out: &mut Vec<u8>) -> Result<()> {
    for command in commands {
        command.encode(out)?;
    }
    Ok(())
}

/// Total cells covered by `commands`.
pub fn coverage(commands: &[Command]) -> usize {
    commands.iter().map(Command::cells).sum()
}

/// Header byte with a 5-bit inline value.
pub fn encode_short(opcode: Opcode, value: u8, out: &mut Vec<u8>) -> Result<()> {
    if value > MAX_SHORT_VALUE {
        return Err(CodecError::ValueTooLarge {
            value: value as usize,
            bits: 5,
        });
    }
    out.push((opcode as u8) << 5 | value);
    Ok(())
}

/// Header byte, plus a continuation byte when `value` needs more than 4 bits.
pub fn encode_long(opcode: Opcode, value: usize, out: &mut Vec<u8>) -> Result<()> {
    let op = (opcode as u8) << 5;
    if value < 0x10 {
        out.push(op | value as u8);
    } else if value <= MAX_LONG_VALUE as usize {
        out.push(op | LONG_FLAG | (value >> 8) as u8);
        out.push((value & 0xFF) as u8);
    } else {
        return Err(CodecError::ValueTooLarge { value, bits: 12 });
    }
    Ok(())
}

/// 12-bit immediate for a header already read from `r`.
pub fn decode_long(header: u8, r: &mut ByteReader<'_>) -> Result<u16> {
    let value = header & MAX_SHORT_VALUE;
    if value & LONG_FLAG == 0 {
        return Ok(value as u16);
    }
    let low = r.read_u8("immediate continuation byte")?;
    Ok(((value & 0x0F) as u16) << 8 | low as u16)
}

fn span_value(count: usize) -> Result<u16> {
    match count {
        0 => Err(CodecError::EmptyRun),
        n if n > MAX_SPAN => Err(CodecError::ValueTooLarge {
            value: n - 1,
            bits: 12,
        }),
        n => Ok((n - 1) as u16),
    }
}

fn check_color(color: u8, palette: &Palette) -> Result<()> {
    let max = palette.maximum_color();
    if color > max {
        return Err(CodecError::OutOfRange {
            what: "Color",
            value: color,
            min: 0,
            max,
        });
    }
    Ok(())
}

fn check_tile(tile: u8, tileset: &Tileset) -> Result<()> {
    if !tileset.contains(tile) {
        return Err(CodecError::OutOfRange {
            what: "Tile",
            value: tile,
            min: tileset.first,
            max: tileset.last,
        });
    }
    Ok(())
}
