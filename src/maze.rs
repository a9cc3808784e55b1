use std::collections::VecDeque;

use crate::config::{ConfigError, Scoring};
use crate::entity::{Dir, Pos};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tile {
    Empty,
    Wall,
    Pellet,
    PowerPellet,
}

impl Tile {
    fn from_glyph(glyph: char) -> Option<Tile> {
        match glyph {
            ' ' => Some(Tile::Empty),
            '#' => Some(Tile::Wall),
            '.' => Some(Tile::Pellet),
            'o' => Some(Tile::PowerPellet),
            _ => None,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            Tile::Empty => ' ',
            Tile::Wall => '#',
            Tile::Pellet => '.',
            Tile::PowerPellet => 'o',
        }
    }

    pub fn is_wall(self) -> bool {
        self == Tile::Wall
    }

    pub fn is_pellet(self) -> bool {
        matches!(self, Tile::Pellet | Tile::PowerPellet)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PelletKind {
    Normal,
    Power,
}

/// Result of stepping onto a cell: points earned and what was eaten, if anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Consumed {
    pub points: u32,
    pub kind: Option<PelletKind>,
}

/// Fixed-size tile grid, stored row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Maze {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
    pellets_left: usize,
}

impl Maze {
    /// Parses a template where `#` is a wall, `.` a pellet, `o` a power pellet
    /// and a space an empty cell.
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Maze, ConfigError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.as_ref().chars().count());
        if height == 0 || width == 0 {
            return Err(ConfigError::EmptyMaze);
        }

        let mut tiles = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != width {
                return Err(ConfigError::RaggedRow {
                    row: y,
                    expected: width,
                    found,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let tile = Tile::from_glyph(glyph).ok_or(ConfigError::UnknownGlyph {
                    glyph,
                    pos: Pos::new(x, y),
                })?;
                tiles.push(tile);
            }
        }
        Ok(Maze::from_tiles(width, height, tiles))
    }

    pub(crate) fn from_tiles(width: usize, height: usize, tiles: Vec<Tile>) -> Maze {
        debug_assert_eq!(tiles.len(), width * height);
        let pellets_left = tiles.iter().filter(|tile| tile.is_pellet()).count();
        Maze {
            width,
            height,
            tiles,
            pellets_left,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Tile lookup for an in-bounds cell.
    pub fn tile(&self, pos: Pos) -> Tile {
        self.tiles[pos.y * self.width + pos.x]
    }

    /// Tile lookup for arbitrary coordinates. Rows outside the grid read as
    /// walls; columns wrap around through the side tunnel.
    pub fn tile_at(&self, x: isize, y: isize) -> Tile {
        match self.wrap(x, y) {
            Some(pos) => self.tile(pos),
            None => Tile::Wall,
        }
    }

    pub fn is_wall(&self, pos: Pos) -> bool {
        self.tile(pos).is_wall()
    }

    /// Normalizes a coordinate pair. Columns wrap, rows never do.
    pub fn wrap(&self, x: isize, y: isize) -> Option<Pos> {
        if y < 0 || y >= self.height as isize {
            return None;
        }
        let x = x.rem_euclid(self.width as isize);
        Some(Pos::new(x as usize, y as usize))
    }

    /// The cell one step away in `dir`, with tunnel wraparound.
    pub fn neighbor(&self, pos: Pos, dir: Dir) -> Option<Pos> {
        let (dx, dy) = dir.delta();
        self.wrap(pos.x as isize + dx, pos.y as isize + dy)
    }

    /// The cell one step away in `dir` if it exists and is not a wall.
    pub fn open_neighbor(&self, pos: Pos, dir: Dir) -> Option<Pos> {
        self.neighbor(pos, dir).filter(|next| !self.is_wall(*next))
    }

    /// Eats whatever pellet sits on `pos`. This is the only way maze content changes.
    pub fn consume_pellet(&mut self, pos: Pos, scoring: &Scoring) -> Consumed {
        let idx = pos.y * self.width + pos.x;
        let consumed = match self.tiles[idx] {
            Tile::Pellet => Consumed {
                points: scoring.pellet,
                kind: Some(PelletKind::Normal),
            },
            Tile::PowerPellet => Consumed {
                points: scoring.power_pellet,
                kind: Some(PelletKind::Power),
            },
            Tile::Empty | Tile::Wall => {
                return Consumed {
                    points: 0,
                    kind: None,
                }
            }
        };
        self.tiles[idx] = Tile::Empty;
        self.pellets_left = self.pellets_left.saturating_sub(1);
        consumed
    }

    pub fn remaining_pellets(&self) -> usize {
        self.pellets_left
    }

    pub fn cells(&self) -> impl Iterator<Item = (Pos, Tile)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .map(move |(idx, tile)| (Pos::new(idx % self.width, idx / self.width), *tile))
    }

    /// Flood fill over open cells from `start`, following tunnel wraparound.
    pub fn reachable_from(&self, start: Pos) -> Vec<bool> {
        let mut seen = vec![false; self.width * self.height];
        if !self.contains(start) || self.is_wall(start) {
            return seen;
        }
        let mut q = VecDeque::new();
        seen[start.y * self.width + start.x] = true;
        q.push_back(start);
        while let Some(pos) = q.pop_front() {
            for dir in Dir::ALL {
                if let Some(next) = self.open_neighbor(pos, dir) {
                    let idx = next.y * self.width + next.x;
                    if !seen[idx] {
                        seen[idx] = true;
                        q.push_back(next);
                    }
                }
            }
        }
        seen
    }

    pub fn rows(&self) -> Vec<String> {
        self.tiles
            .chunks(self.width)
            .map(|row| row.iter().map(|tile| tile.glyph()).collect())
            .collect()
    }
}
