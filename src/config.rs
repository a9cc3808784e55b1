use std::path::PathBuf;
use std::time::Duration;

use log::warn;
use thiserror::Error;

use crate::entity::{Archetype, Pos};
use crate::maze::Maze;

pub const DEFAULT_TICK_MS: u64 = 150;
pub const DEFAULT_RENDER_FPS: u64 = 60;
pub const DEFAULT_LIVES: u32 = 3;
pub const POWER_TICKS: u32 = 40;
pub const RANDOM_MAZE_W: usize = 21;
pub const RANDOM_MAZE_H: usize = 21;

const CLASSIC_MAZE: [&str; 21] = [
    "###################",
    "#o.......#.......o#",
    "#.##.###.#.###.##.#",
    "#.................#",
    "#.##.#.#####.#.##.#",
    "#....#...#...#....#",
    "####.### # ###.####",
    "####.#       #.####",
    "####.# ## ## #.####",
    "    .  #   #  .    ",
    "####.# ##### #.####",
    "####.#       #.####",
    "####.# ##### #.####",
    "#........#........#",
    "#.##.###.#.###.##.#",
    "#o.#..... .....#.o#",
    "##.#.#.#####.#.#.##",
    "#....#...#...#....#",
    "#.######.#.######.#",
    "#.................#",
    "###################",
];

/// Configuration defects. All of them are caught before the first tick.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("maze template is empty")]
    EmptyMaze,
    #[error("maze row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown maze glyph {glyph:?} at {pos}")]
    UnknownGlyph { glyph: char, pos: Pos },
    #[error("{what} at {pos} lies outside the maze")]
    OutOfBounds { what: &'static str, pos: Pos },
    #[error("{what} at {pos} is inside a wall")]
    OnWall { what: &'static str, pos: Pos },
    #[error("cell {pos} cannot be reached from the player spawn")]
    Unreachable { pos: Pos },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scoring {
    pub pellet: u32,
    pub power_pellet: u32,
    pub ghost: u32,
}

impl Default for Scoring {
    fn default() -> Self {
        Scoring {
            pellet: 10,
            power_pellet: 50,
            ghost: 200,
        }
    }
}

/// Everything fixed for the lifetime of a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rules {
    pub template: Vec<String>,
    pub player_spawn: Pos,
    pub ghost_spawns: [(Archetype, Pos); 4],
    /// Where frightened ghosts run to.
    pub retreat_corner: Pos,
    pub lives: u32,
    pub power_ticks: u32,
    pub scoring: Scoring,
}

impl Rules {
    pub fn classic() -> Rules {
        Rules {
            template: CLASSIC_MAZE.iter().map(|row| row.to_string()).collect(),
            player_spawn: Pos::new(9, 15),
            ghost_spawns: [
                (Archetype::Blinky, Pos::new(9, 7)),
                (Archetype::Pinky, Pos::new(8, 9)),
                (Archetype::Inky, Pos::new(9, 9)),
                (Archetype::Clyde, Pos::new(10, 9)),
            ],
            retreat_corner: Pos::new(1, 1),
            lives: DEFAULT_LIVES,
            power_ticks: POWER_TICKS,
            scoring: Scoring::default(),
        }
    }

    pub fn maze(&self) -> Result<Maze, ConfigError> {
        Maze::parse(self.template.as_slice())
    }

    /// Parses the template and checks spawns and connectivity.
    pub fn validate(&self) -> Result<Maze, ConfigError> {
        let maze = self.maze()?;

        let mut anchors = vec![("player spawn", self.player_spawn)];
        anchors.extend(
            self.ghost_spawns
                .iter()
                .map(|(archetype, pos)| (archetype.name(), *pos)),
        );
        anchors.push(("retreat corner", self.retreat_corner));
        for (what, pos) in anchors {
            if !maze.contains(pos) {
                return Err(ConfigError::OutOfBounds { what, pos });
            }
            if maze.is_wall(pos) {
                return Err(ConfigError::OnWall { what, pos });
            }
        }

        let reachable = maze.reachable_from(self.player_spawn);
        if let Some((pos, _)) = maze
            .cells()
            .find(|(pos, tile)| !tile.is_wall() && !reachable[pos.y * maze.width() + pos.x])
        {
            return Err(ConfigError::Unreachable { pos });
        }
        Ok(maze)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MazeSource {
    Classic,
    Random { seed: u64 },
}

/// Runtime knobs for the terminal front-end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub tick: Duration,
    pub render_fps: u64,
    pub maze: MazeSource,
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            tick: Duration::from_millis(DEFAULT_TICK_MS),
            render_fps: DEFAULT_RENDER_FPS,
            maze: MazeSource::Classic,
            log_file: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Settings {
        Settings::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Settings {
        let tick_ms = read_positive(&lookup, "PACMAN_TICK_MS").unwrap_or(DEFAULT_TICK_MS);
        let render_fps = read_positive(&lookup, "PACMAN_FPS").unwrap_or(DEFAULT_RENDER_FPS);

        let maze = match lookup("PACMAN_MAZE").as_deref().map(str::trim) {
            None | Some("") | Some("classic") => MazeSource::Classic,
            Some("random") => {
                let seed = match lookup("PACMAN_SEED") {
                    Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                        warn!("ignoring PACMAN_SEED={raw:?}: not a u64");
                        default_seed()
                    }),
                    None => default_seed(),
                };
                MazeSource::Random { seed }
            }
            Some(other) => {
                warn!("unknown PACMAN_MAZE={other:?}, using the classic maze");
                MazeSource::Classic
            }
        };

        let log_file = lookup("PACMAN_LOG")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Settings {
            tick: Duration::from_millis(tick_ms),
            render_fps,
            maze,
            log_file,
        }
    }
}

fn read_positive(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(v) if v > 0 => Some(v),
        _ => {
            warn!("ignoring {key}={raw:?}: expected a positive integer");
            None
        }
    }
}

fn default_seed() -> u64 {
    rand::random()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn classic_rules_validate() {
        let maze = Rules::classic().validate().unwrap();
        assert_eq!(maze.width(), 19);
        assert_eq!(maze.height(), 21);
        assert_eq!(maze.remaining_pellets(), 150);
    }

    #[test]
    fn spawn_on_wall_is_rejected() {
        let mut rules = Rules::classic();
        rules.player_spawn = Pos::new(0, 0);
        assert!(matches!(
            rules.validate(),
            Err(ConfigError::OnWall {
                what: "player spawn",
                ..
            })
        ));
    }

    #[test]
    fn ghost_outside_is_rejected() {
        let mut rules = Rules::classic();
        rules.ghost_spawns[2].1 = Pos::new(40, 1);
        assert!(matches!(
            rules.validate(),
            Err(ConfigError::OutOfBounds { what: "inky", .. })
        ));
    }

    #[test]
    fn disconnected_pocket_is_rejected() {
        let mut rules = Rules::classic();
        rules.template = ["#####", "#. #.", "#####"]
            .iter()
            .map(|row| row.to_string())
            .collect();
        rules.player_spawn = Pos::new(1, 1);
        rules.ghost_spawns = Archetype::ALL.map(|a| (a, Pos::new(1, 1)));
        rules.retreat_corner = Pos::new(2, 1);
        assert!(matches!(
            rules.validate(),
            Err(ConfigError::Unreachable { pos }) if pos == Pos::new(4, 1)
        ));
    }

    #[test]
    fn errors_name_the_cell() {
        let err = ConfigError::OnWall {
            what: "retreat corner",
            pos: Pos::new(0, 3),
        };
        assert_eq!(err.to_string(), "retreat corner at (0, 3) is inside a wall");
    }

    #[test]
    fn settings_default_when_unset() {
        assert_eq!(settings(&[]), Settings::default());
    }

    #[test]
    fn settings_read_environment() {
        let s = settings(&[
            ("PACMAN_TICK_MS", "90"),
            ("PACMAN_FPS", "30"),
            ("PACMAN_MAZE", "random"),
            ("PACMAN_SEED", "42"),
            ("PACMAN_LOG", "/tmp/pacman.log"),
        ]);
        assert_eq!(s.tick, Duration::from_millis(90));
        assert_eq!(s.render_fps, 30);
        assert_eq!(s.maze, MazeSource::Random { seed: 42 });
        assert_eq!(s.log_file, Some(PathBuf::from("/tmp/pacman.log")));
    }

    #[test]
    fn bad_values_fall_back() {
        let s = settings(&[
            ("PACMAN_TICK_MS", "0"),
            ("PACMAN_FPS", "fast"),
            ("PACMAN_MAZE", "spiral"),
        ]);
        assert_eq!(s.tick, Duration::from_millis(DEFAULT_TICK_MS));
        assert_eq!(s.render_fps, DEFAULT_RENDER_FPS);
        assert_eq!(s.maze, MazeSource::Classic);
    }
}
