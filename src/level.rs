use std::fs;
use std::path::Path;

use arrayvec::ArrayVec;
use log::{debug, trace, warn};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::{DEFAULT_MAX_ATTEMPTS, GameConfig};
use crate::error::GameError;
use crate::grid::{ALL_DIRECTIONS, Direction, Grid, MAX_SIZE, MIN_SIZE, Position, Tile};

/// Minimum number of walls a provided level must contain.
pub const MIN_WALLS: usize = 3;

/// What a level provider is asked to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelRequest {
    pub width: usize,
    pub height: usize,
    pub boxes: usize,
}

impl From<&GameConfig> for LevelRequest {
    fn from(config: &GameConfig) -> Self {
        LevelRequest {
            width: config.width,
            height: config.height,
            boxes: config.boxes,
        }
    }
}

impl LevelRequest {
    /// The request a finished grid satisfies, judged by its own size and box count.
    pub fn for_grid(grid: &Grid) -> Self {
        LevelRequest {
            width: grid.width(),
            height: grid.height(),
            boxes: grid.count(Tile::Box) + grid.count(Tile::BoxOnGoal),
        }
    }
}

/// Source of starting grids for new games.
pub trait LevelProvider {
    fn provide(&mut self, request: &LevelRequest) -> Result<Grid, GameError>;
}

/// Check that `grid` honours `request`: matching size, exactly `request.boxes` boxes
/// and as many goals, one player and at least [`MIN_WALLS`] walls.
pub fn validate_level(grid: &Grid, request: &LevelRequest) -> Result<(), GameError> {
    let invalid = |msg: String| Err(GameError::InvalidLevel(msg));

    if grid.width() != request.width || grid.height() != request.height {
        return invalid(format!(
            "Board is {}x{}, expected {}x{}",
            grid.width(),
            grid.height(),
            request.width,
            request.height
        ));
    }
    if grid.width() < MIN_SIZE || grid.height() < MIN_SIZE {
        return invalid(format!(
            "Board {}x{} is smaller than {}x{}",
            grid.width(),
            grid.height(),
            MIN_SIZE,
            MIN_SIZE
        ));
    }

    let boxes = grid.count(Tile::Box) + grid.count(Tile::BoxOnGoal);
    let goals = grid.count(Tile::Goal) + grid.count(Tile::BoxOnGoal);
    let players = grid.count(Tile::Player);
    let walls = grid.count(Tile::Wall);

    if boxes == 0 {
        return invalid("No boxes found on board".to_string());
    }
    if boxes != request.boxes {
        return invalid(format!(
            "Box count ({}) does not match requested count ({})",
            boxes, request.boxes
        ));
    }
    if goals != boxes {
        return invalid(format!(
            "Goal count ({}) does not match box count ({})",
            goals, boxes
        ));
    }
    if players != 1 {
        return invalid(format!("Expected one player, found {}", players));
    }
    if walls < MIN_WALLS {
        return invalid(format!(
            "Board has {} walls, at least {} required",
            walls, MIN_WALLS
        ));
    }
    Ok(())
}

/// Generates bordered rooms with scattered interior walls, retrying until a layout
/// passes the placement checks or the attempt budget runs out.
///
/// Generated levels are not checked for solvability.
pub struct RandomLevelProvider {
    rng: ChaCha8Rng,
    seed: u64,
    max_attempts: usize,
}

impl RandomLevelProvider {
    /// Use `seed` if given, otherwise draw one from the thread RNG.
    pub fn new(seed: Option<u64>, max_attempts: usize) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        RandomLevelProvider {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            max_attempts,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.seed, config.max_attempts)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Build one candidate layout. Returns None if the candidate is rejected.
    fn attempt(&mut self, request: &LevelRequest) -> Option<Grid> {
        let (width, height) = (request.width, request.height);
        let mut grid = Grid::new(width, height, Tile::Floor);

        let mut interior = Vec::with_capacity((width - 2) * (height - 2));
        for pos in grid.positions() {
            if pos.x() == 0 || pos.y() == 0 || pos.x() == width - 1 || pos.y() == height - 1 {
                grid.set(pos, Tile::Wall);
            } else {
                interior.push(pos);
            }
        }
        interior.shuffle(&mut self.rng);

        // Everything after the goals, boxes and player may become a wall.
        let reserved = 2 * request.boxes + 1;
        let spare = interior.len() - reserved;
        let inner_walls = self.rng.gen_range(0..=spare / 4);

        let mut cells = interior.into_iter();
        let goals: Vec<Position> = cells.by_ref().take(request.boxes).collect();
        let boxes: Vec<Position> = cells.by_ref().take(request.boxes).collect();
        let player = cells.next()?;

        for pos in goals {
            grid.set(pos, Tile::Goal);
        }
        for &pos in &boxes {
            grid.set(pos, Tile::Box);
        }
        grid.set(player, Tile::Player);
        for pos in cells.take(inner_walls) {
            grid.set(pos, Tile::Wall);
        }

        if let Some(pos) = boxes.iter().find(|&&pos| is_corner(&grid, pos)) {
            trace!("Rejected layout: box at {} is cornered", pos);
            return None;
        }
        if !is_connected(&grid, player) {
            trace!("Rejected layout: open cells are not connected");
            return None;
        }
        Some(grid)
    }
}

impl Default for RandomLevelProvider {
    fn default() -> Self {
        Self::new(None, DEFAULT_MAX_ATTEMPTS)
    }
}

impl LevelProvider for RandomLevelProvider {
    fn provide(&mut self, request: &LevelRequest) -> Result<Grid, GameError> {
        if request.width > MAX_SIZE || request.height > MAX_SIZE {
            warn!(
                "Cannot generate a {}x{} room, sides are limited to {}",
                request.width, request.height, MAX_SIZE
            );
            return Err(GameError::GenerationFailed { attempts: 0 });
        }
        let fits = request.width >= 3
            && request.height >= 3
            && (request.width - 2) * (request.height - 2) > 2 * request.boxes;
        if !fits {
            warn!(
                "Cannot place {} boxes, {} goals and a player inside a {}x{} room",
                request.boxes, request.boxes, request.width, request.height
            );
            return Err(GameError::GenerationFailed { attempts: 0 });
        }

        let seed = self.seed;
        let grid = retry(self.max_attempts, |attempt| {
            let grid = self.attempt(request)?;
            debug!(
                "Generated {}x{} level with {} boxes (seed {}, attempt {})",
                request.width, request.height, request.boxes, seed, attempt
            );
            Some(grid)
        });

        match grid {
            Some(grid) => {
                validate_level(&grid, request)?;
                Ok(grid)
            }
            None => {
                warn!(
                    "Gave up generating a {}x{} level with {} boxes after {} attempts",
                    request.width, request.height, request.boxes, self.max_attempts
                );
                Err(GameError::GenerationFailed {
                    attempts: self.max_attempts,
                })
            }
        }
    }
}

/// Call `attempt` with attempt numbers `1..=max_attempts` until it yields a value.
fn retry<T, F: FnMut(usize) -> Option<T>>(max_attempts: usize, mut attempt: F) -> Option<T> {
    (1..=max_attempts).find_map(|n| attempt(n))
}

fn is_blocked(grid: &Grid, pos: Position, dir: Direction) -> bool {
    match grid.offset(pos, dir) {
        Some(next) => grid.get(next) == Tile::Wall,
        None => true,
    }
}

/// A box off a goal with walls on two perpendicular sides can never be moved again.
fn is_corner(grid: &Grid, pos: Position) -> bool {
    let vertical = is_blocked(grid, pos, Direction::Up) || is_blocked(grid, pos, Direction::Down);
    let horizontal =
        is_blocked(grid, pos, Direction::Left) || is_blocked(grid, pos, Direction::Right);
    vertical && horizontal
}

/// Whether every non-wall cell can be reached from `start`.
fn is_connected(grid: &Grid, start: Position) -> bool {
    let mut visited = [[false; MAX_SIZE]; MAX_SIZE];
    let mut stack: ArrayVec<Position, { MAX_SIZE * MAX_SIZE }> = ArrayVec::new();

    stack.push(start);
    visited[start.y()][start.x()] = true;
    let mut reached = 1;

    while let Some(pos) = stack.pop() {
        for &dir in &ALL_DIRECTIONS {
            if let Some(next) = grid.offset(pos, dir) {
                if grid.get(next) != Tile::Wall && !visited[next.y()][next.x()] {
                    visited[next.y()][next.x()] = true;
                    reached += 1;
                    stack.push(next);
                }
            }
        }
    }

    reached == grid.positions().filter(|&pos| grid.get(pos) != Tile::Wall).count()
}

/// A collection of levels in XSB format, served in order to matching requests.
#[derive(Debug)]
pub struct TextLevelProvider {
    levels: Vec<Grid>,
    // served[i] is set once level i has been handed out
    served: Vec<bool>,
}

impl TextLevelProvider {
    /// Parse XSB-formatted levels from a string.
    ///
    /// The XSB format uses:
    /// - Lines starting with `;` as level separators/comments
    /// - Standard Sokoban characters (#, @, $, ., *, space)
    /// - Empty lines between levels (optional)
    pub fn from_text(contents: &str) -> Result<Self, GameError> {
        let mut levels = Vec::new();
        let mut current_level = String::new();

        for line in contents.lines() {
            let separator = line.trim_start().starts_with(';') || line.trim().is_empty();
            if separator {
                if !current_level.is_empty() {
                    levels.push(Grid::from_text(current_level.trim_end_matches('\n'))?);
                    current_level.clear();
                }
                continue;
            }

            current_level.push_str(line);
            current_level.push('\n');
        }

        // Don't forget the last level if file doesn't end with empty line
        if !current_level.is_empty() {
            levels.push(Grid::from_text(current_level.trim_end_matches('\n'))?);
        }

        let served = vec![false; levels.len()];
        Ok(TextLevelProvider { levels, served })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, GameError> {
        let contents = fs::read_to_string(path)?;
        Self::from_text(&contents)
    }

    /// Get the nth level (0-indexed).
    pub fn get(&self, index: usize) -> Option<&Grid> {
        self.levels.get(index)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl LevelProvider for TextLevelProvider {
    /// Serve the first level, in file order, that has not been served yet and whose
    /// size and box count match `request`. Levels that don't match stay available
    /// for later requests.
    fn provide(&mut self, request: &LevelRequest) -> Result<Grid, GameError> {
        let found = self
            .levels
            .iter()
            .zip(&self.served)
            .position(|(grid, &served)| !served && LevelRequest::for_grid(grid) == *request);

        match found {
            Some(index) => {
                self.served[index] = true;
                debug!("Serving level {} of {}", index + 1, self.levels.len());
                Ok(self.levels[index].clone())
            }
            None => Err(GameError::InvalidLevel(format!(
                "No remaining {}x{} level with {} boxes",
                request.width, request.height, request.boxes
            ))),
        }
    }
}
