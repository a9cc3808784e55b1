//! Grid-world Pac-Man simulation.
//!
//! The simulation is a pure tick function over an owned [`GameState`]: the
//! player follows a latched direction, ghosts chase along breadth-first
//! shortest paths, and power pellets temporarily flip the collision rules.
//! Rendering and input devices live in the `pacman` binary.

pub mod commentary;
pub mod config;
pub mod entity;
pub mod game;
pub mod generate;
pub mod input;
pub mod maze;
pub mod pathfind;
pub mod schedule;

pub use config::{ConfigError, Rules, Scoring, Settings};
pub use entity::{Archetype, Dir, Ghost, Pos};
pub use game::{GameEvent, GameState, Phase, Session, TickReport};
pub use input::InputLatch;
pub use maze::{Maze, PelletKind, Tile};
pub use pathfind::find_path;
