pub mod config;
pub mod error;
pub mod game;
pub mod grid;
pub mod level;
pub mod registry;
pub mod render;

pub use config::{Appearance, GameConfig};
pub use error::{ConfigErrorReason, GameError};
pub use game::{Game, MoveRejection, MoveReport, Status};
pub use grid::{Direction, Grid, Position, Tile};
pub use level::{LevelProvider, LevelRequest, RandomLevelProvider, TextLevelProvider};
pub use registry::BoxId;
