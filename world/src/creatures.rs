//! Creature foraging game: chase wandering creatures before you starve.

use keyplay_core::{CellCoord, Event, GameOutcome, GameStatus, GlyphColor, GridSize, Heading, Key};

const PLAYER_GLYPH: char = '@';
const PLAYER_START: CellCoord = CellCoord::new(5, 5);
const INITIAL_PLAYER_CALORIES: i32 = 120;
const PLAYER_CALORIES_PER_MOVE: i32 = 5;

const CREATURE_CALORIES_PER_MOVE: i32 = 5;
const CREATURE_CALORIES_PER_REST: i32 = 5;

const WIN_MESSAGE: &str = "Having eaten everything, player wins!";
const STARVED_MESSAGE: &str = "Having starved, player dies.";

#[derive(Clone, Debug)]
pub(crate) struct CreatureGame {
    grid: GridSize,
    player: Player,
    creatures: Vec<Creature>,
    turn_count: u32,
    status: GameStatus,
    message: Option<String>,
}

impl CreatureGame {
    pub(crate) fn new(grid: GridSize) -> Self {
        Self {
            grid,
            player: Player {
                cell: PLAYER_START,
                calories: INITIAL_PLAYER_CALORIES,
            },
            creatures: roster(),
            turn_count: 0,
            status: GameStatus::Running,
            message: None,
        }
    }

    pub(crate) fn press(&mut self, key: Key, out: &mut Vec<Event>) {
        if self.status.is_over() {
            return;
        }
        self.message = None;
        self.erase_all(out);

        let mut player_moved = false;
        if let Some(heading) = key.arrow_heading() {
            if let Some(next) = self.player.cell.offset(heading, self.grid) {
                self.player.cell = next;
                player_moved = true;
            }
        } else if key.is_quit() {
            self.status = GameStatus::Over(GameOutcome::Quit);
        }

        if !self.status.is_over() {
            if player_moved {
                self.player.calories -= PLAYER_CALORIES_PER_MOVE;
            }
            self.take_turn();
        }

        self.draw_all(out);
    }

    fn take_turn(&mut self) {
        for creature in &mut self.creatures {
            creature.take_turn(self.grid);
        }

        let player_cell = self.player.cell;
        if let Some(index) = self
            .creatures
            .iter()
            .position(|creature| creature.cell == player_cell)
        {
            let eaten = self.creatures.remove(index);
            self.player.calories += eaten.calories;
            self.message = Some(format!("Ate the {}", eaten.name));
            if self.creatures.is_empty() {
                self.message = Some(WIN_MESSAGE.to_owned());
                self.status = GameStatus::Over(GameOutcome::Won);
            }
        }

        if self.player.calories <= 0 {
            self.message = Some(STARVED_MESSAGE.to_owned());
            self.status = GameStatus::Over(GameOutcome::Starved);
        }
        self.turn_count = self.turn_count.saturating_add(1);
    }

    pub(crate) fn repaint(&self, out: &mut Vec<Event>) {
        self.draw_all(out);
    }

    fn erase_all(&self, out: &mut Vec<Event>) {
        for creature in &self.creatures {
            out.push(Event::GlyphErased {
                cell: creature.cell,
            });
        }
        out.push(Event::GlyphErased {
            cell: self.player.cell,
        });
    }

    fn draw_all(&self, out: &mut Vec<Event>) {
        for creature in &self.creatures {
            out.push(Event::GlyphDrawn {
                cell: creature.cell,
                glyph: creature.glyph,
                color: creature.color,
            });
        }
        out.push(Event::GlyphDrawn {
            cell: self.player.cell,
            glyph: PLAYER_GLYPH,
            color: GlyphColor::White,
        });
        out.push(Event::StatusChanged {
            text: self.status_line(),
        });
        out.push(Event::RosterChanged {
            lines: self.roster_lines(),
        });
    }

    pub(crate) fn status_line(&self) -> String {
        format!(
            "Turn {}. Player has {} cals. {}",
            self.turn_count,
            self.player.calories,
            self.message.as_deref().unwrap_or_default()
        )
    }

    pub(crate) fn roster_lines(&self) -> Vec<String> {
        self.creatures.iter().map(Creature::report_line).collect()
    }

    pub(crate) const fn status(&self) -> GameStatus {
        self.status
    }

    pub(crate) const fn turn_count(&self) -> u32 {
        self.turn_count
    }

    pub(crate) const fn grid(&self) -> GridSize {
        self.grid
    }

    pub(crate) const fn player_cell(&self) -> CellCoord {
        self.player.cell
    }

    pub(crate) const fn player_calories(&self) -> i32 {
        self.player.calories
    }

    pub(crate) fn creatures(&self) -> &[Creature] {
        &self.creatures
    }
}

#[derive(Clone, Copy, Debug)]
struct Player {
    cell: CellCoord,
    calories: i32,
}

/// Wandering creature that bounces off the grid edges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Creature {
    pub(crate) name: &'static str,
    pub(crate) glyph: char,
    pub(crate) color: GlyphColor,
    pub(crate) cell: CellCoord,
    pub(crate) velocity: Heading,
    pub(crate) calories: i32,
    pub(crate) initial_calories: i32,
    pub(crate) resting: bool,
}

impl Creature {
    #[allow(clippy::too_many_arguments)]
    fn new(
        name: &'static str,
        glyph: char,
        row: u32,
        column: u32,
        d_row: i32,
        d_column: i32,
        calories: i32,
        color: GlyphColor,
    ) -> Self {
        Self {
            name,
            glyph,
            color,
            cell: CellCoord::new(row, column),
            velocity: Heading::new(d_row, d_column),
            calories,
            initial_calories: calories,
            resting: false,
        }
    }

    fn take_turn(&mut self, grid: GridSize) {
        if self.resting {
            self.rest();
        } else {
            self.wander(grid);
        }
    }

    fn rest(&mut self) {
        self.calories += CREATURE_CALORIES_PER_REST;
        // calories > 0.75 * initial, kept in integers
        if self.calories * 4 > self.initial_calories * 3 {
            self.resting = false;
        }
    }

    fn wander(&mut self, grid: GridSize) {
        let (row, d_row) = bounce(self.cell.row(), self.velocity.d_row(), grid.rows());
        let (column, d_column) =
            bounce(self.cell.column(), self.velocity.d_column(), grid.columns());
        self.velocity = Heading::new(d_row, d_column);

        let candidate = CellCoord::new(row, column);
        if candidate == self.cell {
            return;
        }
        self.cell = candidate;
        self.calories -= CREATURE_CALORIES_PER_MOVE;
        if self.calories <= 0 {
            self.resting = true;
        }
    }

    fn report_line(&self) -> String {
        format!("{:<10} ({}) {:>4}", self.name, self.glyph, self.calories)
    }
}

/// Moves one axis by `delta`, negating `delta` when the move would leave
/// `0..bound`. Stays put if even the reflected move is out of range.
fn bounce(value: u32, delta: i32, bound: u32) -> (u32, i32) {
    let inside = |candidate: i64| candidate >= 0 && candidate < i64::from(bound);
    let mut delta = delta;
    let mut candidate = i64::from(value) + i64::from(delta);
    if !inside(candidate) {
        delta = -delta;
        candidate = i64::from(value) + i64::from(delta);
    }
    match u32::try_from(candidate) {
        Ok(next) if inside(candidate) => (next, delta),
        _ => (value, delta),
    }
}

fn roster() -> Vec<Creature> {
    use GlyphColor as C;
    vec![
        Creature::new("Mouse", 'M', 5, 2, 1, 1, 90, C::Aqua),
        Creature::new("Rabbit", 'R', 8, 27, 1, -1, 110, C::Green),
        Creature::new("Boar", 'B', 18, 18, -1, 0, 240, C::Yellow),
        Creature::new("Squirrel", 'S', 9, 4, -1, -1, 100, C::Violet),
        Creature::new("Deer", 'D', 12, 15, 1, 0, 350, C::Magenta),
        Creature::new("Fox", 'F', 6, 19, -1, 1, 150, C::Orange),
        Creature::new("Raccoon", 'C', 10, 7, 0, 1, 120, C::Crimson),
        Creature::new("Owl", 'O', 3, 25, 1, -1, 140, C::DeepSkyBlue),
        Creature::new("Hedgehog", 'H', 15, 10, -1, 1, 70, C::Chartreuse),
        Creature::new("Badger", 'A', 7, 12, 1, 1, 180, C::Gold),
        Creature::new("Porcupine", 'P', 18, 5, 0, -1, 130, C::Tomato),
        Creature::new("Skunk", 'K', 14, 23, 1, 0, 100, C::Cyan),
        Creature::new("Lynx", 'L', 4, 8, -1, 0, 210, C::DodgerBlue),
        Creature::new("Falcon", 'N', 1, 29, 0, 1, 160, C::OrangeRed),
    ]
}
