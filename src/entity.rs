use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Pos { x, y }
    }

    pub fn manhattan(self, other: Pos) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    /// Expansion order used everywhere a search needs to be reproducible.
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }
}

/// Cosmetic ghost identity. Only decides the spawn slot and the render color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Archetype {
    Blinky,
    Pinky,
    Inky,
    Clyde,
}

impl Archetype {
    pub const ALL: [Archetype; 4] = [
        Archetype::Blinky,
        Archetype::Pinky,
        Archetype::Inky,
        Archetype::Clyde,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Archetype::Blinky => "blinky",
            Archetype::Pinky => "pinky",
            Archetype::Inky => "inky",
            Archetype::Clyde => "clyde",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ghost {
    pub archetype: Archetype,
    pub pos: Pos,
    pub facing: Option<Dir>,
    pub frightened: bool,
}

impl Ghost {
    pub fn spawn(archetype: Archetype, pos: Pos) -> Self {
        Ghost {
            archetype,
            pos,
            facing: None,
            frightened: false,
        }
    }

    /// Moves one cell and records which way the step went.
    pub(crate) fn step_to(&mut self, next: Pos) {
        self.facing = direction_between(self.pos, next).or(self.facing);
        self.pos = next;
    }
}

fn direction_between(from: Pos, to: Pos) -> Option<Dir> {
    if from.x == to.x {
        if to.y + 1 == from.y {
            return Some(Dir::Up);
        }
        if from.y + 1 == to.y {
            return Some(Dir::Down);
        }
    } else if from.y == to.y {
        if to.x + 1 == from.x {
            return Some(Dir::Left);
        }
        if from.x + 1 == to.x {
            return Some(Dir::Right);
        }
    }
    None
}
