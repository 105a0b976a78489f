use std::fmt;

use arrayvec::ArrayVec;
use log::{debug, info};

use crate::config::{Appearance, GameConfig};
use crate::error::GameError;
use crate::grid::{Direction, Grid, Position, Tile};
use crate::level::{LevelProvider, LevelRequest, RandomLevelProvider, validate_level};
use crate::registry::{BoxId, Registry};
use crate::render::render;

/// Why a move was not applied. None of these mutate the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveRejection {
    GameAlreadyWon,
    /// The target cell, or the cell a box would be pushed into, is off the board.
    OutOfBounds,
    Wall,
    BoxBlockedByWall,
    BoxBlockedByBox,
}

impl fmt::Display for MoveRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveRejection::GameAlreadyWon => write!(f, "game has already been won"),
            MoveRejection::OutOfBounds => write!(f, "edge of board"),
            MoveRejection::Wall => write!(f, "blocked by wall"),
            MoveRejection::BoxBlockedByWall => write!(f, "box blocked by wall"),
            MoveRejection::BoxBlockedByBox => write!(f, "box blocked by another box"),
        }
    }
}

/// What a successful move changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReport {
    pub direction: Direction,
    pub pushed: Option<BoxId>,
    /// True if this move completed the level.
    pub won: bool,
    /// Cells whose tile changed: the player's old cell, its new cell, and the pushed
    /// box's new cell if there was a push.
    pub changed: ArrayVec<Position, 3>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Playable,
    Won,
}

/// A single game session.
#[derive(Debug, Clone)]
pub struct Game {
    grid: Grid,
    original: Grid,
    registry: Registry,
    player: Position,
    moves: u32,
    status: Status,
    appearance: Appearance,
}

impl Game {
    /// Validate `config` and generate a level with the random provider.
    pub fn new(config: &GameConfig) -> Result<Self, GameError> {
        config.validate()?;
        let mut provider = RandomLevelProvider::from_config(config);
        Self::with_provider(config, &mut provider)
    }

    /// Validate `config` and take the starting grid from `provider`.
    pub fn with_provider<P: LevelProvider + ?Sized>(
        config: &GameConfig,
        provider: &mut P,
    ) -> Result<Self, GameError> {
        config.validate()?;
        let request = LevelRequest::from(config);
        let grid = provider.provide(&request)?;
        validate_level(&grid, &request)?;
        Self::start(grid, config.appearance.clone())
    }

    /// Start a game on a finished grid. The grid must pass [`validate_level`] for
    /// its own size and box count.
    pub fn from_grid(grid: Grid, appearance: Appearance) -> Result<Self, GameError> {
        appearance.validate()?;
        validate_level(&grid, &LevelRequest::for_grid(&grid))?;
        Self::start(grid, appearance)
    }

    /// Parse an XSB level and start a game on it with the default glyphs.
    pub fn from_text(text: &str) -> Result<Self, GameError> {
        Self::from_grid(Grid::from_text(text)?, Appearance::default())
    }

    fn start(grid: Grid, appearance: Appearance) -> Result<Self, GameError> {
        let (registry, player) = Registry::from_grid(&grid)?;
        info!(
            "Started {}x{} level with {} boxes, player at {}",
            grid.width(),
            grid.height(),
            registry.box_count(),
            player
        );
        Ok(Game {
            original: grid.clone(),
            grid,
            registry,
            player,
            moves: 0,
            status: Status::Playable,
            appearance,
        })
    }

    /// Restore the grid as first provided and rescan it. Box ids come out the same
    /// as on construction.
    pub fn reset(&mut self) {
        self.grid = self.original.clone();
        let (registry, player) = match Registry::from_grid(&self.grid) {
            Ok(scan) => scan,
            Err(err) => panic!("Original grid no longer scans: {}", err),
        };
        self.registry = registry;
        self.player = player;
        self.moves = 0;
        self.status = Status::Playable;
        debug!("Game reset");
    }

    /// Try to move the player one cell in `direction`, pushing a box if one is in
    /// the way. On rejection nothing changes.
    pub fn move_player(&mut self, direction: Direction) -> Result<MoveReport, MoveRejection> {
        let result = self.resolve(direction);
        if let Err(rejection) = result {
            debug!("Move {} from {} rejected: {}", direction, self.player, rejection);
        }
        result
    }

    pub fn move_up(&mut self) -> bool {
        self.move_player(Direction::Up).is_ok()
    }

    pub fn move_down(&mut self) -> bool {
        self.move_player(Direction::Down).is_ok()
    }

    pub fn move_left(&mut self) -> bool {
        self.move_player(Direction::Left).is_ok()
    }

    pub fn move_right(&mut self) -> bool {
        self.move_player(Direction::Right).is_ok()
    }

    fn resolve(&mut self, direction: Direction) -> Result<MoveReport, MoveRejection> {
        if self.status == Status::Won {
            return Err(MoveRejection::GameAlreadyWon);
        }

        let target = self
            .grid
            .offset(self.player, direction)
            .ok_or(MoveRejection::OutOfBounds)?;

        // All checks happen before the first mutation.
        let push = match self.grid.get(target) {
            Tile::Wall => return Err(MoveRejection::Wall),
            Tile::Box | Tile::BoxOnGoal => {
                let beyond = self
                    .grid
                    .offset(target, direction)
                    .ok_or(MoveRejection::OutOfBounds)?;
                match self.grid.get(beyond) {
                    Tile::Wall => return Err(MoveRejection::BoxBlockedByWall),
                    Tile::Box | Tile::BoxOnGoal => return Err(MoveRejection::BoxBlockedByBox),
                    Tile::Floor | Tile::Goal => Some(beyond),
                    Tile::Player => panic!("Second player at {}", beyond),
                }
            }
            Tile::Floor | Tile::Goal => None,
            Tile::Player => panic!("Second player at {}", target),
        };

        let mut changed = ArrayVec::new();
        changed.push(self.player);
        changed.push(target);

        let pushed = push.map(|beyond| {
            changed.push(beyond);
            self.push_box(target, beyond)
        });
        self.step_player(target);
        self.moves += 1;

        let won = pushed.is_some() && self.registry.all_goals_covered();
        if won {
            self.status = Status::Won;
            info!("Level solved in {} moves", self.moves);
        }

        Ok(MoveReport {
            direction,
            pushed,
            won,
            changed,
        })
    }

    /// Move the box at `from` into the empty cell `to`.
    fn push_box(&mut self, from: Position, to: Position) -> BoxId {
        let Some(id) = self.registry.box_at(from) else {
            panic!("No box registered at {}", from);
        };
        let under_to = self.grid.get(to);

        self.registry.move_box(id, from, to);
        self.grid.set(from, self.registry.last_tile_under(id));
        self.registry.set_last_tile_under(id, under_to);
        self.grid.set(
            to,
            if under_to == Tile::Goal {
                Tile::BoxOnGoal
            } else {
                Tile::Box
            },
        );
        id
    }

    /// Move the player into the empty cell `to`.
    fn step_player(&mut self, to: Position) {
        self.grid.set(self.player, self.registry.player_last_tile());
        self.registry.set_player_last_tile(self.grid.get(to));
        self.grid.set(to, Tile::Player);
        self.player = to;
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The grid as first provided, which `reset` restores.
    pub fn original_grid(&self) -> &Grid {
        &self.original
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_won(&self) -> bool {
        self.status == Status::Won
    }

    pub fn player(&self) -> Position {
        self.player
    }

    /// The kind of cell the player is standing on, Floor or Goal.
    pub fn tile_under_player(&self) -> Tile {
        self.registry.player_last_tile()
    }

    pub fn goals(&self) -> &[Position] {
        self.registry.goals()
    }

    pub fn box_count(&self) -> usize {
        self.registry.box_count()
    }

    pub fn box_ids(&self) -> impl Iterator<Item = BoxId> + use<> {
        self.registry.box_ids()
    }

    /// Current cell of box `id`, or None if the level has no such box.
    pub fn box_position(&self, id: BoxId) -> Option<Position> {
        self.registry.box_position(id)
    }

    pub fn box_at(&self, pos: Position) -> Option<BoxId> {
        self.registry.box_at(pos)
    }

    pub fn appearance(&self) -> &Appearance {
        &self.appearance
    }

    /// The current grid drawn with the configured glyphs.
    pub fn render(&self) -> String {
        render(&self.grid, &self.appearance)
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.grid)
    }
}
