use std::collections::HashMap;
use std::fmt;

use crate::error::GameError;
use crate::grid::{Grid, Position, Tile};

/// Stable box identifier. Ids are assigned in row-major scan order starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoxId(pub u16);

impl BoxId {
    fn slot(self) -> usize {
        assert!(self.0 >= 1, "Invalid box id: {}", self.0);
        (self.0 - 1) as usize
    }
}

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Box identities and positions, the tiles hidden beneath the boxes and the
/// player, and the goal set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    // positions[id - 1] is the current cell of box `id`
    positions: Vec<Position>,
    // last_tiles[id - 1] is the tile restored when box `id` leaves its cell
    last_tiles: Vec<Tile>,
    index: HashMap<Position, BoxId>,
    goals: Vec<Position>,
    player_last_tile: Tile,
}

impl Registry {
    /// Scan `grid` once in row-major order. Assigns box ids from 1, collects goal
    /// coordinates and locates the player.
    pub fn from_grid(grid: &Grid) -> Result<(Self, Position), GameError> {
        let mut registry = Registry {
            positions: Vec::new(),
            last_tiles: Vec::new(),
            index: HashMap::new(),
            goals: Vec::new(),
            player_last_tile: Tile::Floor,
        };
        let mut player = None;

        for pos in grid.positions() {
            match grid.get(pos) {
                Tile::Box => registry.add_box(pos, Tile::Floor),
                Tile::BoxOnGoal => {
                    registry.add_box(pos, Tile::Goal);
                    registry.goals.push(pos);
                }
                Tile::Goal => registry.goals.push(pos),
                Tile::Player => {
                    if player.is_some() {
                        return Err(GameError::InvalidLevel(
                            "Multiple players found".to_string(),
                        ));
                    }
                    player = Some(pos);
                }
                Tile::Floor | Tile::Wall => {}
            }
        }

        let player =
            player.ok_or_else(|| GameError::InvalidLevel("No player found on board".to_string()))?;
        Ok((registry, player))
    }

    fn add_box(&mut self, pos: Position, under: Tile) {
        let id = BoxId(self.positions.len() as u16 + 1);
        self.positions.push(pos);
        self.last_tiles.push(under);
        self.index.insert(pos, id);
    }

    pub fn box_at(&self, pos: Position) -> Option<BoxId> {
        self.index.get(&pos).copied()
    }

    /// Current cell of box `id`, or None if no such box exists.
    pub fn box_position(&self, id: BoxId) -> Option<Position> {
        let slot = usize::from(id.0).checked_sub(1)?;
        self.positions.get(slot).copied()
    }

    pub fn box_count(&self) -> usize {
        self.positions.len()
    }

    pub fn box_ids(&self) -> impl Iterator<Item = BoxId> + use<> {
        (1..=self.positions.len() as u16).map(BoxId)
    }

    /// Relocate box `id` from `from` to `to`.
    /// Panics if `from` does not hold `id` or `to` already holds a box; either means
    /// the caller skipped its own checks.
    pub fn move_box(&mut self, id: BoxId, from: Position, to: Position) {
        assert_eq!(
            self.index.get(&from),
            Some(&id),
            "Box {} is not at {}",
            id,
            from
        );
        if let Some(other) = self.index.get(&to) {
            panic!("Cannot move box {} to {}: occupied by box {}", id, to, other);
        }

        self.index.remove(&from);
        self.index.insert(to, id);
        self.positions[id.slot()] = to;
    }

    pub fn last_tile_under(&self, id: BoxId) -> Tile {
        self.last_tiles[id.slot()]
    }

    pub fn set_last_tile_under(&mut self, id: BoxId, tile: Tile) {
        self.last_tiles[id.slot()] = tile;
    }

    pub fn player_last_tile(&self) -> Tile {
        self.player_last_tile
    }

    pub fn set_player_last_tile(&mut self, tile: Tile) {
        self.player_last_tile = tile;
    }

    pub fn goals(&self) -> &[Position] {
        &self.goals
    }

    /// Win predicate: every goal holds a box.
    pub fn all_goals_covered(&self) -> bool {
        self.goals.iter().all(|goal| self.index.contains_key(goal))
    }
}
