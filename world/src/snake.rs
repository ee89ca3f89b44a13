//! Snake game: steer toward candy, grow, and avoid walls and your own body.

use std::collections::VecDeque;

use keyplay_core::{CellCoord, Event, GameOutcome, GameStatus, GlyphColor, GridSize, Heading, Key};
use keyplay_system_rand::AnsiRand;

const HEAD_GLYPH: char = '@';
const BODY_GLYPH: char = 'o';
const CRASH_MESSAGE: &str = "Ouch, my nose!";

const INITIAL_BODY: [CellCoord; 3] = [
    CellCoord::new(5, 5),
    CellCoord::new(5, 4),
    CellCoord::new(5, 3),
];

const CANDY_COLORS: [GlyphColor; 7] = [
    GlyphColor::Red,
    GlyphColor::Lime,
    GlyphColor::Yellow,
    GlyphColor::Cyan,
    GlyphColor::Magenta,
    GlyphColor::Orange,
    GlyphColor::Pink,
];
const MIN_CANDY_CALORIES: i32 = 1;
const MAX_CANDY_CALORIES: i32 = 10;

#[derive(Clone, Debug)]
pub(crate) struct SnakeGame {
    grid: GridSize,
    rand: AnsiRand,
    snake: Snake,
    candy: Option<Candy>,
    turn_count: u32,
    status: GameStatus,
    message: Option<&'static str>,
}

impl SnakeGame {
    pub(crate) fn new(grid: GridSize, mut rand: AnsiRand) -> Self {
        let snake = Snake::new();
        let candy = Candy::spawn(&snake, grid, &mut rand);
        Self {
            grid,
            rand,
            snake,
            candy,
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

        if let Some(heading) = key.arrow_heading() {
            self.snake.heading = heading;
        } else if key.is_quit() {
            self.status = GameStatus::Over(GameOutcome::Quit);
            out.push(self.status_event());
            return;
        }

        match self.next_head() {
            Some(next) => self.advance(next, out),
            None => {
                self.status = GameStatus::Over(GameOutcome::Crashed);
                self.message = Some(CRASH_MESSAGE);
            }
        }
        self.turn_count = self.turn_count.saturating_add(1);
        out.push(self.status_event());
    }

    pub(crate) fn repaint(&self, out: &mut Vec<Event>) {
        if let Some(candy) = &self.candy {
            out.push(candy.draw());
        }
        self.snake.draw_all(out);
        out.push(self.status_event());
    }

    /// Cell the head enters next turn, or `None` when that move crashes.
    fn next_head(&self) -> Option<CellCoord> {
        let next = self.snake.head().offset(self.snake.heading, self.grid)?;
        (!self.snake.occupies(next)).then_some(next)
    }

    fn advance(&mut self, next: CellCoord, out: &mut Vec<Event>) {
        self.snake.step(next, out);

        let Some(candy) = self.candy else {
            return;
        };
        if candy.cell != next {
            return;
        }

        self.snake.calories = self.snake.calories.saturating_add(candy.calories);
        self.snake.color = candy.color;
        self.snake.draw_all(out);

        self.candy = Candy::spawn(&self.snake, self.grid, &mut self.rand);
        if let Some(candy) = &self.candy {
            out.push(candy.draw());
        }
    }

    fn status_event(&self) -> Event {
        Event::StatusChanged {
            text: self.status_line(),
        }
    }

    pub(crate) fn status_line(&self) -> String {
        let mut line = format!(
            "Length: {} Turns: {}. Metric: {}",
            self.snake.len(),
            self.turn_count,
            self.metric_text()
        );
        if let Some(message) = self.message {
            line.push_str(". ");
            line.push_str(message);
        }
        line
    }

    /// Squared length divided by turns taken, zero before the first turn.
    pub(crate) fn metric(&self) -> f64 {
        if self.turn_count == 0 {
            return 0.0;
        }
        let length = self.snake.len() as f64;
        length * length / f64::from(self.turn_count)
    }

    /// [`Self::metric`] to three decimals, exact halves rounded up.
    ///
    /// Computed from the integer ratio so `25 / 16` reads `1.563`, not the
    /// `1.562` that ties-to-even float formatting gives.
    fn metric_text(&self) -> String {
        if self.turn_count == 0 {
            return "0.000".to_owned();
        }
        let length = self.snake.len() as u64;
        let turns = u64::from(self.turn_count);
        let thousandths = (2 * length * length * 1000 + turns) / (2 * turns);
        format!("{}.{:03}", thousandths / 1000, thousandths % 1000)
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

    pub(crate) fn body(&self) -> Vec<CellCoord> {
        self.snake.body.iter().copied().collect()
    }

    pub(crate) const fn heading(&self) -> Heading {
        self.snake.heading
    }

    pub(crate) const fn pending_growth(&self) -> u32 {
        self.snake.calories
    }

    pub(crate) const fn color(&self) -> GlyphColor {
        self.snake.color
    }

    pub(crate) const fn candy(&self) -> Option<Candy> {
        self.candy
    }
}

#[derive(Clone, Debug)]
struct Snake {
    body: VecDeque<CellCoord>,
    heading: Heading,
    calories: u32,
    color: GlyphColor,
}

impl Snake {
    fn new() -> Self {
        Self {
            body: INITIAL_BODY.into_iter().collect(),
            heading: Heading::RIGHT,
            calories: 0,
            color: GlyphColor::White,
        }
    }

    fn head(&self) -> CellCoord {
        self.body.front().copied().unwrap_or(INITIAL_BODY[0])
    }

    fn len(&self) -> usize {
        self.body.len()
    }

    fn occupies(&self, cell: CellCoord) -> bool {
        self.body.iter().any(|segment| *segment == cell)
    }

    fn step(&mut self, next: CellCoord, out: &mut Vec<Event>) {
        out.push(Event::GlyphDrawn {
            cell: self.head(),
            glyph: BODY_GLYPH,
            color: self.color,
        });
        self.body.push_front(next);
        out.push(Event::GlyphDrawn {
            cell: next,
            glyph: HEAD_GLYPH,
            color: self.color,
        });

        if self.calories > 0 {
            self.calories -= 1;
        } else if let Some(tail) = self.body.pop_back() {
            out.push(Event::GlyphErased { cell: tail });
        }
    }

    fn draw_all(&self, out: &mut Vec<Event>) {
        for (index, segment) in self.body.iter().enumerate() {
            let glyph = if index == 0 { HEAD_GLYPH } else { BODY_GLYPH };
            out.push(Event::GlyphDrawn {
                cell: *segment,
                glyph,
                color: self.color,
            });
        }
    }
}

/// Collectible that grows the snake by its calorie value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Candy {
    pub(crate) cell: CellCoord,
    pub(crate) calories: u32,
    pub(crate) color: GlyphColor,
}

impl Candy {
    /// Places a candy on a random cell the snake does not cover.
    ///
    /// Draw order is row, column (repeated until free), color, calories.
    /// Returns `None` without drawing when the snake covers the whole grid.
    fn spawn(snake: &Snake, grid: GridSize, rand: &mut AnsiRand) -> Option<Self> {
        let capacity = u64::from(grid.rows()) * u64::from(grid.columns());
        if snake.len() as u64 >= capacity {
            return None;
        }

        let cell = loop {
            let row = draw_below(rand, grid.rows());
            let column = draw_below(rand, grid.columns());
            let cell = CellCoord::new(row, column);
            if !snake.occupies(cell) {
                break cell;
            }
        };
        let color = CANDY_COLORS[draw_below(rand, CANDY_COLORS.len() as u32) as usize];
        let calories = rand.between(MIN_CANDY_CALORIES, MAX_CANDY_CALORIES) as u32;
        Some(Self {
            cell,
            calories,
            color,
        })
    }

    pub(crate) fn glyph(&self) -> char {
        char::from_digit(self.calories, 10).unwrap_or('*')
    }

    fn draw(&self) -> Event {
        Event::GlyphDrawn {
            cell: self.cell,
            glyph: self.glyph(),
            color: self.color,
        }
    }
}

fn draw_below(rand: &mut AnsiRand, bound: u32) -> u32 {
    let bound = i32::try_from(bound).unwrap_or(i32::MAX);
    rand.between(0, bound) as u32
}
