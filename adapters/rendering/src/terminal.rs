//! Writes text-grid frames to a byte stream, optionally with truecolor escapes.

use std::io::Write;

use anyhow::Context;

use crate::{Color, RenderingBackend, TextGrid, BACKGROUND_GLYPH};

const RESET: &str = "\x1b[0m";
const CLEAR_HOME: &str = "\x1b[H\x1b[2J";

/// Backend that prints each presented frame to `writer`.
#[derive(Debug)]
pub struct TerminalBackend<W> {
    writer: W,
    color: bool,
    redraw: bool,
    frames: u64,
}

impl<W: Write> TerminalBackend<W> {
    /// Creates a backend writing to `writer`; `color` enables ANSI truecolor.
    pub const fn new(writer: W, color: bool) -> Self {
        Self {
            writer,
            color,
            redraw: false,
            frames: 0,
        }
    }

    /// Clears the screen before every frame and ends lines with `\r\n`, as
    /// a terminal in raw mode needs.
    #[must_use]
    pub fn redrawing(mut self) -> Self {
        self.redraw = true;
        self
    }

    /// Number of frames presented so far.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Releases the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn frame_text(&self, grid: &TextGrid) -> String {
        if !self.color {
            return grid.render();
        }

        let mut text = String::new();
        for row in 0..grid.size().rows() {
            for cell in grid.row(row) {
                match cell {
                    Some(glyph) => {
                        let (red, green, blue) = Color::from_glyph_color(glyph.color).to_rgb_u8();
                        text.push_str(&format!(
                            "\x1b[38;2;{red};{green};{blue}m{}{RESET}",
                            glyph.character
                        ));
                    }
                    None => text.push(BACKGROUND_GLYPH),
                }
            }
            text.push('\n');
        }
        text.push_str(grid.status_line());
        text.push('\n');
        for line in grid.roster() {
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}

impl<W: Write> RenderingBackend for TerminalBackend<W> {
    fn present(&mut self, grid: &TextGrid) -> anyhow::Result<()> {
        let mut text = self.frame_text(grid);
        if self.redraw {
            text = format!("{CLEAR_HOME}{}", text.replace('\n', "\r\n"));
        } else if self.frames > 0 {
            writeln!(self.writer).context("failed to separate frames")?;
        }
        self.writer
            .write_all(text.as_bytes())
            .context("failed to write frame")?;
        self.writer.flush().context("failed to flush frame")?;
        self.frames += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use keyplay_core::{CellCoord, GlyphColor, GridSize};

    use super::*;
    use crate::GridCanvas;

    fn sample_grid() -> TextGrid {
        let mut grid = TextGrid::new(GridSize::new(1, 2)).expect("valid grid");
        grid.draw_char_at(CellCoord::new(0, 0), '@', GlyphColor::Red);
        grid.set_status_line("ready");
        grid
    }

    #[test]
    fn plain_frames_are_separated_by_blank_lines() {
        let mut backend = TerminalBackend::new(Vec::new(), false);
        let grid = sample_grid();
        backend.present(&grid).expect("first frame");
        backend.present(&grid).expect("second frame");

        assert_eq!(backend.frames(), 2);
        let output = String::from_utf8(backend.into_inner()).expect("utf-8");
        assert_eq!(output, "@·\nready\n\n@·\nready\n");
    }

    #[test]
    fn redrawn_frames_clear_the_screen_and_return_the_carriage() {
        let mut backend = TerminalBackend::new(Vec::new(), false).redrawing();
        let grid = sample_grid();
        backend.present(&grid).expect("first frame");
        backend.present(&grid).expect("second frame");

        let output = String::from_utf8(backend.into_inner()).expect("utf-8");
        assert_eq!(
            output,
            "\x1b[H\x1b[2J@·\r\nready\r\n\x1b[H\x1b[2J@·\r\nready\r\n"
        );
    }

    #[test]
    fn colored_frames_wrap_glyphs_in_truecolor_escapes() {
        let mut backend = TerminalBackend::new(Vec::new(), true);
        backend.present(&sample_grid()).expect("frame");

        let output = String::from_utf8(backend.into_inner()).expect("utf-8");
        assert_eq!(output, "\x1b[38;2;255;0;0m@\x1b[0m·\nready\n");
    }
}
