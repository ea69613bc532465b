//! Human-readable listings of an asset.

use std::fmt::Write;

use crate::format::Command;
use crate::schema::{Animation, Asset, Palette, Tileset};

/// Indenting line writer.
struct Listing {
    out: String,
    verbose: bool,
    level: usize,
}

impl Listing {
    fn line(&mut self, text: impl std::fmt::Display) {
        // Writing to a String cannot fail
        let _ = writeln!(self.out, "{:indent$}{text}", "", indent = self.level * 2);
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self)) {
        self.level += 1;
        f(self);
        self.level -= 1;
    }
}

/// Section headers, geometry and per-animation statistics.
pub fn summary(asset: &Asset) -> String {
    list(asset, false)
}

/// Everything in [`summary`] plus colors, glyph bitmaps and every command.
pub fn dump(asset: &Asset) -> String {
    list(asset, true)
}

fn list(asset: &Asset, verbose: bool) -> String {
    let mut listing = Listing {
        out: String::new(),
        verbose,
        level: 0,
    };
    if let Some(palette) = &asset.palette {
        listing.line("Palette:");
        listing.nested(|l| list_palette(l, palette));
    }
    if let Some(tileset) = &asset.tileset {
        listing.line("Tileset:");
        listing.nested(|l| list_tileset(l, tileset));
    }
    for (i, animation) in asset.animations.iter().enumerate() {
        listing.line(format_args!("Animation {i}:"));
        listing.nested(|l| list_animation(l, animation));
    }
    listing.out
}

fn list_palette(l: &mut Listing, palette: &Palette) {
    l.line(format_args!("Bitplanes: {}", palette.bitplanes));
    if l.verbose {
        for (i, color) in palette.colors.iter().enumerate() {
            l.line(format_args!(
                "Color {i}: Red: {}, Green: {}, Blue: {}",
                color.red, color.green, color.blue
            ));
        }
    }
}

fn list_tileset(l: &mut Listing, tileset: &Tileset) {
    l.line(format_args!("Width: {}", tileset.width));
    l.line(format_args!("Height: {}", tileset.height));
    l.line(format_args!(
        "Square: {}x{}",
        tileset.square_width, tileset.square_height
    ));
    l.line(format_args!("Stride: {}", tileset.stride));
    l.line(format_args!("First: {}", tileset.first));
    l.line(format_args!("Last: {}", tileset.last));
    if l.verbose {
        for (i, tile) in tileset.tiles.iter().enumerate() {
            l.line(format_args!("Tile {}:", tileset.first as usize + i));
            l.nested(|l| {
                for row in tile.to_rows(tile.stride() * 8) {
                    l.line(row);
                }
            });
        }
    }
}

fn list_animation(l: &mut Listing, animation: &Animation) {
    l.line(format_args!(
        "Grid: {}x{}",
        animation.width, animation.height
    ));
    l.line(format_args!("Loops: {}", animation.loops));
    l.line(format_args!(
        "Frames: {} ({} ticks)",
        animation.frames.len(),
        animation.total_duration()
    ));

    let commands: usize = animation.frames.iter().map(|f| f.commands.len()).sum();
    let skipped: usize = animation
        .frames
        .iter()
        .flat_map(|f| &f.commands)
        .filter(|c| matches!(c, Command::Skip(_)))
        .map(Command::cells)
        .sum();
    l.line(format_args!(
        "Commands: {commands} ({skipped} of {} cells skipped)",
        animation.cell_count() * animation.frames.len()
    ));

    if l.verbose {
        for (i, frame) in animation.frames.iter().enumerate() {
            l.line(format_args!("Frame {i}:"));
            l.nested(|l| {
                l.line(format_args!("Duration: {}", frame.duration));
                l.line("Commands:");
                l.nested(|l| {
                    for command in &frame.commands {
                        l.line(command);
                    }
                });
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ProjectConfig;

    #[test]
    fn test_summary() {
        let asset = ProjectConfig::default().build().unwrap();
        let text = summary(&asset);
        assert!(text.starts_with("Palette:\n  Bitplanes: 2\n"));
        assert!(text.contains("Tileset:\n  Width: 8\n"));
        assert!(text.contains("Animation 0:\n  Grid: 8x3\n  Loops: 0\n  Frames: 6 (30 ticks)\n"));
        assert!(!text.contains("Color 0"));
        assert!(!text.contains("Frame 0:"));
    }

    #[test]
    fn test_dump() {
        let asset = ProjectConfig::default().build().unwrap();
        let text = dump(&asset);
        assert!(text.contains("  Color 1: Red: 255, Green: 255, Blue: 255\n"));
        assert!(text.contains("  Tile 33:\n    ..####..\n"));
        assert!(text.contains("  Frame 0:\n    Duration: 5\n    Commands:\n"));
        assert!(text.contains("      Background (Color: 0)\n"));
        assert!(text.contains("Text: \"!\""));
    }

    #[test]
    fn test_empty_asset() {
        assert_eq!(summary(&Asset::default()), "");
    }
}
