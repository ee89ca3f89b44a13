#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Keyplay adapters.

mod terminal;

use keyplay_core::{CellCoord, Event, GlyphColor, GridSize};
use std::{error::Error, fmt};

pub use terminal::TerminalBackend;

/// Character painted on cells that hold no glyph.
pub const BACKGROUND_GLYPH: char = '·';

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Creates the opaque color a glyph is painted with.
    #[must_use]
    pub const fn from_glyph_color(color: GlyphColor) -> Self {
        let (red, green, blue) = color.rgb();
        Self::from_rgb_u8(red, green, blue)
    }

    /// Byte RGB values, ignoring alpha.
    #[must_use]
    pub fn to_rgb_u8(self) -> (u8, u8, u8) {
        (
            channel_to_u8(self.red),
            channel_to_u8(self.green),
            channel_to_u8(self.blue),
        )
    }
}

fn channel_to_u8(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Character-grid surface a game draws onto.
pub trait GridCanvas {
    /// Paints `glyph` in `color` at `cell`.
    fn draw_char_at(&mut self, cell: CellCoord, glyph: char, color: GlyphColor);

    /// Restores `cell` to the background.
    fn erase_char_at(&mut self, cell: CellCoord);

    /// Replaces the one-line status bar.
    fn set_status_line(&mut self, text: &str);

    /// Replaces the side console with `lines`.
    fn write_roster(&mut self, lines: &[String]);
}

/// Routes world events to the canvas primitives they describe.
pub fn present<C>(canvas: &mut C, events: &[Event])
where
    C: GridCanvas + ?Sized,
{
    for event in events {
        match event {
            Event::GlyphDrawn { cell, glyph, color } => canvas.draw_char_at(*cell, *glyph, *color),
            Event::GlyphErased { cell } => canvas.erase_char_at(*cell),
            Event::StatusChanged { text } => canvas.set_status_line(text),
            Event::RosterChanged { lines } => canvas.write_roster(lines),
            Event::GameEnded { .. } => {}
        }
    }
}

/// Glyph occupying a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyph {
    /// Character drawn in the cell.
    pub character: char,
    /// Color the character is drawn with.
    pub color: GlyphColor,
}

/// In-memory text grid implementing [`GridCanvas`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextGrid {
    size: GridSize,
    cells: Vec<Option<Glyph>>,
    status: String,
    roster: Vec<String>,
}

impl TextGrid {
    /// Creates a blank grid.
    pub fn new(size: GridSize) -> Result<Self, RenderingError> {
        if size.rows() == 0 || size.columns() == 0 {
            return Err(RenderingError::EmptyGrid {
                rows: size.rows(),
                columns: size.columns(),
            });
        }
        let len = size.rows() as usize * size.columns() as usize;
        Ok(Self {
            size,
            cells: vec![None; len],
            status: String::new(),
            roster: Vec::new(),
        })
    }

    /// Dimensions of the grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Glyph painted at `cell`, if any.
    #[must_use]
    pub fn glyph_at(&self, cell: CellCoord) -> Option<Glyph> {
        self.index(cell).and_then(|index| self.cells[index])
    }

    /// Cells of one row from left to right; empty when out of range.
    #[must_use]
    pub fn row(&self, row: u32) -> &[Option<Glyph>] {
        if row >= self.size.rows() {
            return &[];
        }
        let width = self.size.columns() as usize;
        let start = row as usize * width;
        &self.cells[start..start + width]
    }

    /// Current status bar text.
    #[must_use]
    pub fn status_line(&self) -> &str {
        &self.status
    }

    /// Current side console lines.
    #[must_use]
    pub fn roster(&self) -> &[String] {
        &self.roster
    }

    /// Plain-text rendering: grid rows, then the status bar, then the roster.
    #[must_use]
    pub fn render(&self) -> String {
        let mut text = String::new();
        for row in 0..self.size.rows() {
            text.extend(
                self.row(row)
                    .iter()
                    .map(|cell| cell.map_or(BACKGROUND_GLYPH, |glyph| glyph.character)),
            );
            text.push('\n');
        }
        text.push_str(&self.status);
        text.push('\n');
        for line in &self.roster {
            text.push_str(line);
            text.push('\n');
        }
        text
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        self.size
            .contains(cell)
            .then(|| cell.row() as usize * self.size.columns() as usize + cell.column() as usize)
    }
}

impl GridCanvas for TextGrid {
    fn draw_char_at(&mut self, cell: CellCoord, glyph: char, color: GlyphColor) {
        if let Some(index) = self.index(cell) {
            self.cells[index] = Some(Glyph {
                character: glyph,
                color,
            });
        }
    }

    fn erase_char_at(&mut self, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            self.cells[index] = None;
        }
    }

    fn set_status_line(&mut self, text: &str) {
        text.clone_into(&mut self.status);
    }

    fn write_roster(&mut self, lines: &[String]) {
        lines.clone_into(&mut self.roster);
    }
}

/// Rendering backend capable of presenting Keyplay frames.
pub trait RenderingBackend {
    /// Presents the current contents of `grid`.
    fn present(&mut self, grid: &TextGrid) -> anyhow::Result<()>;
}

/// Errors that can occur when constructing rendering surfaces.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// Both dimensions must be positive to hold any cell.
    EmptyGrid {
        /// Requested row count.
        rows: u32,
        /// Requested column count.
        columns: u32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid { rows, columns } => {
                write!(
                    f,
                    "grid dimensions must be positive (received {rows}x{columns})"
                )
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use keyplay_core::GameOutcome;

    use super::*;

    fn grid() -> TextGrid {
        TextGrid::new(GridSize::new(2, 3)).expect("valid grid")
    }

    #[test]
    fn grid_creation_rejects_empty_dimensions_without_panicking() {
        let error = TextGrid::new(GridSize::new(0, 4)).expect_err("zero rows must be rejected");
        assert_eq!(error, RenderingError::EmptyGrid { rows: 0, columns: 4 });
        assert_eq!(
            error.to_string(),
            "grid dimensions must be positive (received 0x4)"
        );
    }

    #[test]
    fn present_routes_events_to_canvas() {
        let mut canvas = grid();
        let events = vec![
            Event::GlyphDrawn {
                cell: CellCoord::new(0, 1),
                glyph: '@',
                color: GlyphColor::White,
            },
            Event::GlyphDrawn {
                cell: CellCoord::new(1, 2),
                glyph: '7',
                color: GlyphColor::Pink,
            },
            Event::GlyphErased {
                cell: CellCoord::new(1, 2),
            },
            Event::StatusChanged {
                text: "Length: 3".to_owned(),
            },
            Event::RosterChanged {
                lines: vec!["Mouse      (M)   90".to_owned()],
            },
            Event::GameEnded {
                outcome: GameOutcome::Quit,
            },
        ];

        present(&mut canvas, &events);

        assert_eq!(
            canvas.glyph_at(CellCoord::new(0, 1)),
            Some(Glyph {
                character: '@',
                color: GlyphColor::White
            })
        );
        assert_eq!(canvas.glyph_at(CellCoord::new(1, 2)), None);
        assert_eq!(
            canvas.render(),
            "·@·\n···\nLength: 3\nMouse      (M)   90\n"
        );
    }

    #[test]
    fn out_of_range_cells_are_ignored() {
        let mut canvas = grid();
        canvas.draw_char_at(CellCoord::new(5, 5), 'x', GlyphColor::Red);
        canvas.erase_char_at(CellCoord::new(5, 5));
        assert_eq!(canvas, grid());
        assert!(canvas.row(9).is_empty());
    }

    #[test]
    fn glyph_colors_convert_to_bytes() {
        let color = Color::from_glyph_color(GlyphColor::DodgerBlue);
        assert_eq!(color.to_rgb_u8(), GlyphColor::DodgerBlue.rgb());
        assert_eq!(Color::new(2.0, -1.0, 0.5, 1.0).to_rgb_u8(), (255, 0, 128));
    }
}
