#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game state for Keyplay sessions.
//!
//! A [`World`] hosts exactly one game, chosen when it is created. Every
//! mutation flows through [`apply`], which emits render [`Event`]s for
//! adapters; read-only access goes through the [`query`] module.

mod creatures;
mod snake;

use keyplay_core::{Command, Event, GameKind, GridSize, DEFAULT_GRID};
use keyplay_system_rand::{AnsiRand, DEFAULT_SEED};
use tracing::{debug, info};

use self::{creatures::CreatureGame, snake::SnakeGame};

/// Parameters fixed when a session starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldConfig {
    kind: GameKind,
    seed: u32,
    grid: GridSize,
}

impl WorldConfig {
    /// Creates a configuration for `kind` using the default seed and grid.
    #[must_use]
    pub const fn new(kind: GameKind) -> Self {
        Self {
            kind,
            seed: DEFAULT_SEED,
            grid: DEFAULT_GRID,
        }
    }

    /// Replaces the seed handed to the session's random generator.
    #[must_use]
    pub const fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Game the session simulates.
    #[must_use]
    pub const fn kind(&self) -> GameKind {
        self.kind
    }

    /// Seed handed to the session's random generator.
    #[must_use]
    pub const fn seed(&self) -> u32 {
        self.seed
    }
}

/// Represents the authoritative state of one game session.
#[derive(Clone, Debug)]
pub struct World {
    game: Game,
}

#[derive(Clone, Debug)]
enum Game {
    Snake(SnakeGame),
    Creatures(CreatureGame),
}

impl World {
    /// Starts a new session.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        let game = match config.kind {
            GameKind::Snake => {
                Game::Snake(SnakeGame::new(config.grid, AnsiRand::new(config.seed)))
            }
            GameKind::Creatures => Game::Creatures(CreatureGame::new(config.grid)),
        };
        Self { game }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::PressKey { key } => {
            let was_over = query::is_game_over(world);
            match &mut world.game {
                Game::Snake(game) => game.press(key, out_events),
                Game::Creatures(game) => game.press(key, out_events),
            }
            debug!(%key, turn = query::turn_count(world), "applied key");

            if was_over {
                return;
            }
            if let Some(outcome) = query::status(world).outcome() {
                info!(
                    ?outcome,
                    turns = query::turn_count(world),
                    status = %query::status_line(world),
                    "game ended"
                );
                out_events.push(Event::GameEnded { outcome });
            }
        }
        Command::Repaint => match &world.game {
            Game::Snake(game) => game.repaint(out_events),
            Game::Creatures(game) => game.repaint(out_events),
        },
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use keyplay_core::{CellCoord, GameKind, GameStatus, GlyphColor, GridSize, Heading};

    use super::{Game, World};

    /// Game hosted by the world.
    #[must_use]
    pub fn kind(world: &World) -> GameKind {
        match world.game {
            Game::Snake(_) => GameKind::Snake,
            Game::Creatures(_) => GameKind::Creatures,
        }
    }

    /// Lifecycle state of the session.
    #[must_use]
    pub fn status(world: &World) -> GameStatus {
        match &world.game {
            Game::Snake(game) => game.status(),
            Game::Creatures(game) => game.status(),
        }
    }

    /// Reports whether the session reached a terminal state.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        status(world).is_over()
    }

    /// Text shown on the one-line status bar.
    #[must_use]
    pub fn status_line(world: &World) -> String {
        match &world.game {
            Game::Snake(game) => game.status_line(),
            Game::Creatures(game) => game.status_line(),
        }
    }

    /// Number of turns evaluated so far.
    #[must_use]
    pub fn turn_count(world: &World) -> u32 {
        match &world.game {
            Game::Snake(game) => game.turn_count(),
            Game::Creatures(game) => game.turn_count(),
        }
    }

    /// Dimensions of the grid the game is played on.
    #[must_use]
    pub fn grid(world: &World) -> GridSize {
        match &world.game {
            Game::Snake(game) => game.grid(),
            Game::Creatures(game) => game.grid(),
        }
    }

    /// Captures the snake, or `None` in a creature session.
    #[must_use]
    pub fn snake(world: &World) -> Option<SnakeSnapshot> {
        let Game::Snake(game) = &world.game else {
            return None;
        };
        Some(SnakeSnapshot {
            body: game.body(),
            heading: game.heading(),
            pending_growth: game.pending_growth(),
            color: game.color(),
            metric: game.metric(),
        })
    }

    /// Captures the current candy, or `None` in a creature session or when
    /// the snake fills the grid.
    #[must_use]
    pub fn candy(world: &World) -> Option<CandySnapshot> {
        let Game::Snake(game) = &world.game else {
            return None;
        };
        game.candy().map(|candy| CandySnapshot {
            cell: candy.cell,
            calories: candy.calories,
            glyph: candy.glyph(),
            color: candy.color,
        })
    }

    /// Captures the player, or `None` in a snake session.
    #[must_use]
    pub fn player(world: &World) -> Option<PlayerSnapshot> {
        let Game::Creatures(game) = &world.game else {
            return None;
        };
        Some(PlayerSnapshot {
            cell: game.player_cell(),
            calories: game.player_calories(),
        })
    }

    /// Captures the creatures still at large, in roster order.
    #[must_use]
    pub fn creatures(world: &World) -> Vec<CreatureSnapshot> {
        let Game::Creatures(game) = &world.game else {
            return Vec::new();
        };
        game.creatures()
            .iter()
            .map(|creature| CreatureSnapshot {
                name: creature.name,
                glyph: creature.glyph,
                color: creature.color,
                cell: creature.cell,
                velocity: creature.velocity,
                calories: creature.calories,
                initial_calories: creature.initial_calories,
                resting: creature.resting,
            })
            .collect()
    }

    /// Side-console report of the remaining creatures.
    #[must_use]
    pub fn roster_lines(world: &World) -> Vec<String> {
        match &world.game {
            Game::Snake(_) => Vec::new(),
            Game::Creatures(game) => game.roster_lines(),
        }
    }

    /// Immutable representation of the snake.
    #[derive(Clone, Debug, PartialEq)]
    pub struct SnakeSnapshot {
        /// Occupied cells, head first.
        pub body: Vec<CellCoord>,
        /// Direction applied on the next turn.
        pub heading: Heading,
        /// Steps remaining during which the tail is kept.
        pub pending_growth: u32,
        /// Color of every segment.
        pub color: GlyphColor,
        /// Squared length over turns taken.
        pub metric: f64,
    }

    /// Immutable representation of the candy.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CandySnapshot {
        /// Cell holding the candy.
        pub cell: CellCoord,
        /// Growth granted when eaten.
        pub calories: u32,
        /// Digit drawn for the candy.
        pub glyph: char,
        /// Color the snake adopts after eating it.
        pub color: GlyphColor,
    }

    /// Immutable representation of the foraging player.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PlayerSnapshot {
        /// Cell occupied by the player.
        pub cell: CellCoord,
        /// Remaining calories.
        pub calories: i32,
    }

    /// Immutable representation of a single creature.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct CreatureSnapshot {
        /// Display name.
        pub name: &'static str,
        /// Character drawn for the creature.
        pub glyph: char,
        /// Glyph color.
        pub color: GlyphColor,
        /// Cell occupied by the creature.
        pub cell: CellCoord,
        /// Per-turn displacement.
        pub velocity: Heading,
        /// Current calories; may be negative while resting begins.
        pub calories: i32,
        /// Calories the creature started with.
        pub initial_calories: i32,
        /// Whether the creature is recovering instead of moving.
        pub resting: bool,
    }
}
