use std::fmt;

use crate::error::GameError;

/// Largest supported board side. Positions are stored as `u8` pairs.
pub const MAX_SIZE: usize = 64;

/// Smallest supported board side.
pub const MIN_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tile {
    Floor,
    Wall,
    Goal,
    Player,
    Box,
    BoxOnGoal,
}

pub const ALL_TILES: [Tile; 6] = [
    Tile::Floor,
    Tile::Wall,
    Tile::Goal,
    Tile::Player,
    Tile::Box,
    Tile::BoxOnGoal,
];

impl Tile {
    pub fn is_box(self) -> bool {
        matches!(self, Tile::Box | Tile::BoxOnGoal)
    }

    /// Empty cells the player may step onto without pushing.
    pub fn is_passable(self) -> bool {
        matches!(self, Tile::Floor | Tile::Goal)
    }

    fn to_xsb(self) -> char {
        match self {
            Tile::Floor => ' ',
            Tile::Wall => '#',
            Tile::Goal => '.',
            Tile::Player => '@',
            Tile::Box => '$',
            Tile::BoxOnGoal => '*',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

pub const ALL_DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

impl Direction {
    pub fn delta(&self) -> (i8, i8) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "Up"),
            Direction::Down => write!(f, "Down"),
            Direction::Left => write!(f, "Left"),
            Direction::Right => write!(f, "Right"),
        }
    }
}

/// A board coordinate, `(x, y)` with `y` growing downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position(pub u8, pub u8);

impl Position {
    pub fn x(&self) -> usize {
        self.0 as usize
    }

    pub fn y(&self) -> usize {
        self.1 as usize
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

/// Row-major `width × height` array of tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    tiles: Vec<Tile>,
    width: u8,
    height: u8,
}

impl Grid {
    /// Create a grid filled with `fill`.
    ///
    /// Panics if either side is zero or larger than [`MAX_SIZE`].
    pub fn new(width: usize, height: usize, fill: Tile) -> Self {
        assert!(
            (1..=MAX_SIZE).contains(&width) && (1..=MAX_SIZE).contains(&height),
            "Grid size {}x{} outside 1..={}",
            width,
            height,
            MAX_SIZE
        );
        Grid {
            tiles: vec![fill; width * height],
            width: width as u8,
            height: height as u8,
        }
    }

    /// Parse a grid from XSB text.
    ///
    /// Characters:
    /// - `#` = Wall
    /// - ` `, `-`, `_` = Floor
    /// - `.` = Goal
    /// - `$` = Box
    /// - `*` = Box on goal
    /// - `@` = Player
    ///
    /// Short rows are padded with floor. A player standing on a goal (`+`) has no
    /// tile kind of its own and is rejected.
    pub fn from_text(text: &str) -> Result<Self, GameError> {
        let lines: Vec<&str> = text.lines().collect();

        if lines.is_empty() {
            return Err(GameError::InvalidLevel("Empty board".to_string()));
        }

        let height = lines.len();
        let width = lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);

        if width == 0 {
            return Err(GameError::InvalidLevel("Empty board".to_string()));
        }
        if width > MAX_SIZE {
            return Err(GameError::InvalidLevel(format!(
                "Board width {} exceeds maximum size {}",
                width, MAX_SIZE
            )));
        }
        if height > MAX_SIZE {
            return Err(GameError::InvalidLevel(format!(
                "Board height {} exceeds maximum size {}",
                height, MAX_SIZE
            )));
        }

        let mut grid = Grid::new(width, height, Tile::Floor);
        for (y, line) in lines.iter().enumerate() {
            for (x, ch) in line.chars().enumerate() {
                let tile = match ch {
                    '#' => Tile::Wall,
                    ' ' | '-' | '_' => Tile::Floor,
                    '.' => Tile::Goal,
                    '$' => Tile::Box,
                    '*' => Tile::BoxOnGoal,
                    '@' => Tile::Player,
                    _ => {
                        return Err(GameError::InvalidLevel(format!(
                            "Invalid character '{}' at position ({}, {})",
                            ch, x, y
                        )));
                    }
                };
                grid.set(Position(x as u8, y as u8), tile);
            }
        }

        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width as usize
    }

    pub fn height(&self) -> usize {
        self.height as usize
    }

    fn index(&self, pos: Position) -> usize {
        assert!(
            pos.x() < self.width() && pos.y() < self.height(),
            "Position {} out of bounds for {}x{} grid",
            pos,
            self.width,
            self.height
        );
        pos.y() * self.width() + pos.x()
    }

    pub fn get(&self, pos: Position) -> Tile {
        self.tiles[self.index(pos)]
    }

    pub fn set(&mut self, pos: Position, tile: Tile) {
        let idx = self.index(pos);
        self.tiles[idx] = tile;
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32
    }

    /// Step from `pos` one cell in `dir`.
    /// Returns None if the new position would leave the grid.
    pub fn offset(&self, pos: Position, dir: Direction) -> Option<Position> {
        let (dx, dy) = dir.delta();
        let new_x = pos.0 as i32 + dx as i32;
        let new_y = pos.1 as i32 + dy as i32;

        if self.in_bounds(new_x, new_y) {
            Some(Position(new_x as u8, new_y as u8))
        } else {
            None
        }
    }

    /// All positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + use<> {
        let (width, height) = (self.width, self.height);
        (0..height).flat_map(move |y| (0..width).map(move |x| Position(x, y)))
    }

    /// Number of cells holding `tile`.
    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|&&t| t == tile).count()
    }

    /// Rows of tiles, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.tiles.chunks(self.width())
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            let line: String = row.iter().map(|tile| tile.to_xsb()).collect();
            // Trim trailing spaces to match original input format
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_grid() {
        let input = "#####\n\
                     #@$.#\n\
                     #####";
        let grid = Grid::from_text(input).unwrap();

        assert_eq!(grid.width(), 5);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.get(Position(1, 1)), Tile::Player);
        assert_eq!(grid.get(Position(2, 1)), Tile::Box);
        assert_eq!(grid.get(Position(3, 1)), Tile::Goal);
        assert_eq!(grid.get(Position(0, 0)), Tile::Wall);
    }

    #[test]
    fn test_short_rows_padded_with_floor() {
        let input = "####\n\
                     #@\n\
                     #####";
        let grid = Grid::from_text(input).unwrap();
        assert_eq!(grid.width(), 5);
        assert_eq!(grid.get(Position(3, 1)), Tile::Floor);
        assert_eq!(grid.get(Position(4, 1)), Tile::Floor);
    }

    #[test]
    fn test_invalid_character() {
        let input = "####\n#@x#\n####";
        assert!(matches!(
            Grid::from_text(input),
            Err(GameError::InvalidLevel(_))
        ));
    }

    #[test]
    fn test_player_on_goal_rejected() {
        let input = "####\n#+$#\n####";
        assert!(Grid::from_text(input).is_err());
    }

    #[test]
    fn test_empty_board() {
        assert!(Grid::from_text("").is_err());
    }

    #[test]
    fn test_too_wide() {
        let input = "#".repeat(MAX_SIZE + 1);
        assert!(Grid::from_text(&input).is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let input = "#####\n\
                     # .##\n\
                     #*@ #\n\
                     # $ #\n\
                     #####";
        let grid = Grid::from_text(input).unwrap();
        assert_eq!(grid.to_string().trim_end(), input);
    }

    #[test]
    fn test_offset_edges() {
        let grid = Grid::new(5, 5, Tile::Floor);

        assert_eq!(grid.offset(Position(0, 2), Direction::Left), None);
        assert_eq!(grid.offset(Position(4, 2), Direction::Right), None);
        assert_eq!(grid.offset(Position(2, 0), Direction::Up), None);
        assert_eq!(grid.offset(Position(2, 4), Direction::Down), None);

        assert_eq!(
            grid.offset(Position(2, 2), Direction::Up),
            Some(Position(2, 1))
        );
        assert_eq!(
            grid.offset(Position(2, 2), Direction::Right),
            Some(Position(3, 2))
        );
    }

    #[test]
    fn test_positions_row_major() {
        let grid = Grid::new(2, 2, Tile::Floor);
        let positions: Vec<_> = grid.positions().collect();
        assert_eq!(
            positions,
            vec![Position(0, 0), Position(1, 0), Position(0, 1), Position(1, 1)]
        );
    }

    #[test]
    fn test_count() {
        let grid = Grid::from_text("#####\n#@$.#\n#####").unwrap();
        assert_eq!(grid.count(Tile::Wall), 12);
        assert_eq!(grid.count(Tile::Box), 1);
        assert_eq!(grid.count(Tile::Player), 1);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_get_out_of_bounds_panics() {
        let grid = Grid::new(5, 5, Tile::Floor);
        grid.get(Position(5, 0));
    }
}
