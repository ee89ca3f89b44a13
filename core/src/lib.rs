#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Keyplay grading harness.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and the playback driver
//! submit [`Command`] values carrying a single [`Key`], the world executes
//! them via its `apply` entry point, and then broadcasts [`Event`] values that
//! rendering adapters paint onto a text grid. Nothing in this crate mutates
//! state on its own.

use serde::{Deserialize, Serialize};

/// Grid dimensions shared by both games.
pub const DEFAULT_GRID: GridSize = GridSize::new(20, 30);

/// Describes which game a session simulates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    /// Snake that grows by eating candy and dies on collision.
    Snake,
    /// Player that forages a fixed roster of wandering creatures.
    Creatures,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Delivers one key press to the active game.
    PressKey {
        /// Key pressed by the user or replayed from a log.
        key: Key,
    },
    /// Requests a full repaint of every glyph and the status line.
    Repaint,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// A glyph was painted on a cell.
    GlyphDrawn {
        /// Cell receiving the glyph.
        cell: CellCoord,
        /// Character displayed in the cell.
        glyph: char,
        /// Color applied to the glyph.
        color: GlyphColor,
    },
    /// A cell was cleared back to the background.
    GlyphErased {
        /// Cell that was cleared.
        cell: CellCoord,
    },
    /// The one-line status text changed.
    StatusChanged {
        /// Complete replacement text for the status line.
        text: String,
    },
    /// The side console listing the remaining creatures changed.
    RosterChanged {
        /// Formatted report lines, one per creature.
        lines: Vec<String>,
    },
    /// The game reached a terminal state.
    GameEnded {
        /// Terminal state that was reached.
        outcome: GameOutcome,
    },
}

/// Terminal states shared by both games.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    /// The snake ran into a wall or its own body.
    Crashed,
    /// The player pressed the quit key.
    Quit,
    /// The player ate every creature.
    Won,
    /// The player ran out of calories.
    Starved,
}

/// Lifecycle state of a game session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum GameStatus {
    /// The game accepts further input.
    #[default]
    Running,
    /// The game ended; further input is ignored.
    Over(GameOutcome),
}

impl GameStatus {
    /// Reports whether the session reached a terminal state.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        matches!(self, Self::Over(_))
    }

    /// Terminal outcome, if any.
    #[must_use]
    pub const fn outcome(&self) -> Option<GameOutcome> {
        match self {
            Self::Running => None,
            Self::Over(outcome) => Some(*outcome),
        }
    }
}

/// Symbolic keys produced by the keystroke codec and the live keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedKey {
    /// Horizontal tab.
    Tab,
    /// Return key.
    Enter,
    /// Escape key.
    Escape,
    /// Space bar.
    Space,
    /// Backspace key.
    Backspace,
    /// Key the recorder could not identify.
    Unidentified,
    /// Up arrow.
    ArrowUp,
    /// Down arrow.
    ArrowDown,
    /// Right arrow.
    ArrowRight,
    /// Left arrow.
    ArrowLeft,
    /// Home key.
    Home,
    /// End key.
    End,
    /// Forward delete key.
    Delete,
}

impl NamedKey {
    /// DOM-style key value reported for the key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tab => "Tab",
            Self::Enter => "Enter",
            Self::Escape => "Escape",
            Self::Space => " ",
            Self::Backspace => "Backspace",
            Self::Unidentified => "Unidentified",
            Self::ArrowUp => "ArrowUp",
            Self::ArrowDown => "ArrowDown",
            Self::ArrowRight => "ArrowRight",
            Self::ArrowLeft => "ArrowLeft",
            Self::Home => "Home",
            Self::End => "End",
            Self::Delete => "Delete",
        }
    }
}

/// One input delivered to a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Key with a symbolic name.
    Named(NamedKey),
    /// Printable character typed on a live keyboard.
    Char(char),
    /// Raw numeric code replayed from a log without a symbolic mapping.
    Code(i64),
}

impl Key {
    /// Reports whether the key ends the game.
    ///
    /// Only live characters quit; a replayed numeric code never matches even
    /// when it equals the character's byte value.
    #[must_use]
    pub const fn is_quit(&self) -> bool {
        matches!(self, Self::Char('q' | 'Q'))
    }

    /// Heading selected by an arrow key, if the key is one.
    #[must_use]
    pub const fn arrow_heading(&self) -> Option<Heading> {
        match self {
            Self::Named(NamedKey::ArrowUp) => Some(Heading::UP),
            Self::Named(NamedKey::ArrowDown) => Some(Heading::DOWN),
            Self::Named(NamedKey::ArrowLeft) => Some(Heading::LEFT),
            Self::Named(NamedKey::ArrowRight) => Some(Heading::RIGHT),
            _ => None,
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named(named) => f.write_str(named.as_str()),
            Self::Char(character) => write!(f, "{character}"),
            Self::Code(code) => write!(f, "{code}"),
        }
    }
}

/// Location of a single grid cell expressed as row and column coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Cell reached by applying `heading` once, or `None` when it leaves `grid`.
    #[must_use]
    pub fn offset(self, heading: Heading, grid: GridSize) -> Option<Self> {
        let row = offset_axis(self.row, heading.d_row(), grid.rows())?;
        let column = offset_axis(self.column, heading.d_column(), grid.columns())?;
        Some(Self::new(row, column))
    }
}

fn offset_axis(value: u32, delta: i32, bound: u32) -> Option<u32> {
    let next = i64::from(value) + i64::from(delta);
    if next < 0 || next >= i64::from(bound) {
        return None;
    }
    u32::try_from(next).ok()
}

/// Per-turn displacement along each axis.
///
/// Snakes only ever hold one non-zero component; creatures may move
/// diagonally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Heading {
    d_row: i32,
    d_column: i32,
}

impl Heading {
    /// Not yet moving.
    pub const STILL: Self = Self::new(0, 0);
    /// Toward decreasing row indices.
    pub const UP: Self = Self::new(-1, 0);
    /// Toward increasing row indices.
    pub const DOWN: Self = Self::new(1, 0);
    /// Toward decreasing column indices.
    pub const LEFT: Self = Self::new(0, -1);
    /// Toward increasing column indices.
    pub const RIGHT: Self = Self::new(0, 1);

    /// Creates a heading from row and column deltas.
    #[must_use]
    pub const fn new(d_row: i32, d_column: i32) -> Self {
        Self { d_row, d_column }
    }

    /// Row delta applied per move.
    #[must_use]
    pub const fn d_row(&self) -> i32 {
        self.d_row
    }

    /// Column delta applied per move.
    #[must_use]
    pub const fn d_column(&self) -> i32 {
        self.d_column
    }

    /// Heading with the row component negated.
    #[must_use]
    pub const fn reflect_row(self) -> Self {
        Self::new(-self.d_row, self.d_column)
    }

    /// Heading with the column component negated.
    #[must_use]
    pub const fn reflect_column(self) -> Self {
        Self::new(self.d_row, -self.d_column)
    }
}

/// Dimensions of the text grid measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    rows: u32,
    columns: u32,
}

impl GridSize {
    /// Creates a new grid size.
    #[must_use]
    pub const fn new(rows: u32, columns: u32) -> Self {
        Self { rows, columns }
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.row() < self.rows && cell.column() < self.columns
    }
}

/// Named display colors used by glyphs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GlyphColor {
    /// `white`
    White,
    /// `red`
    Red,
    /// `lime`
    Lime,
    /// `yellow`
    Yellow,
    /// `cyan`
    Cyan,
    /// `magenta`
    Magenta,
    /// `orange`
    Orange,
    /// `pink`
    Pink,
    /// `aqua`
    Aqua,
    /// `green`
    Green,
    /// `violet`
    Violet,
    /// `crimson`
    Crimson,
    /// `deepskyblue`
    DeepSkyBlue,
    /// `chartreuse`
    Chartreuse,
    /// `gold`
    Gold,
    /// `tomato`
    Tomato,
    /// `dodgerblue`
    DodgerBlue,
    /// `orangered`
    OrangeRed,
}

impl GlyphColor {
    /// CSS name of the color.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Red => "red",
            Self::Lime => "lime",
            Self::Yellow => "yellow",
            Self::Cyan => "cyan",
            Self::Magenta => "magenta",
            Self::Orange => "orange",
            Self::Pink => "pink",
            Self::Aqua => "aqua",
            Self::Green => "green",
            Self::Violet => "violet",
            Self::Crimson => "crimson",
            Self::DeepSkyBlue => "deepskyblue",
            Self::Chartreuse => "chartreuse",
            Self::Gold => "gold",
            Self::Tomato => "tomato",
            Self::DodgerBlue => "dodgerblue",
            Self::OrangeRed => "orangered",
        }
    }

    /// Byte RGB components of the color.
    #[must_use]
    pub const fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::White => (0xff, 0xff, 0xff),
            Self::Red => (0xff, 0x00, 0x00),
            Self::Lime => (0x00, 0xff, 0x00),
            Self::Yellow => (0xff, 0xff, 0x00),
            Self::Cyan | Self::Aqua => (0x00, 0xff, 0xff),
            Self::Magenta => (0xff, 0x00, 0xff),
            Self::Orange => (0xff, 0xa5, 0x00),
            Self::Pink => (0xff, 0xc0, 0xcb),
            Self::Green => (0x00, 0x80, 0x00),
            Self::Violet => (0xee, 0x82, 0xee),
            Self::Crimson => (0xdc, 0x14, 0x3c),
            Self::DeepSkyBlue => (0x00, 0xbf, 0xff),
            Self::Chartreuse => (0x7f, 0xff, 0x00),
            Self::Gold => (0xff, 0xd7, 0x00),
            Self::Tomato => (0xff, 0x63, 0x47),
            Self::DodgerBlue => (0x1e, 0x90, 0xff),
            Self::OrangeRed => (0xff, 0x45, 0x00),
        }
    }
}
