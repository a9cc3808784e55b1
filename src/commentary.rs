//! Short remarks tying what just happened on screen to the idea behind it.
//!
//! Everything here is static text. The front-end shows the remark for the
//! most important event of the latest tick and keeps the previous one when a
//! tick is quiet.

use crate::game::GameEvent;

pub const IDLE_REMARK: &str = "SYSTEM NOMINAL. Press space to start.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Concept {
    /// The maze as a 2D array of tiles.
    Matrix,
    /// Breadth-first search driving the ghosts.
    Bfs,
    /// Phase and ghost-mode state machines.
    Fsm,
    /// The FIFO frontier inside BFS.
    Queue,
}

impl Concept {
    pub fn label(self) -> &'static str {
        match self {
            Concept::Matrix => "MATRIX",
            Concept::Bfs => "BFS",
            Concept::Fsm => "FSM",
            Concept::Queue => "QUEUE",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Remark {
    pub text: &'static str,
    pub concept: Concept,
}

fn priority(event: &GameEvent) -> u8 {
    match event {
        GameEvent::GameOver | GameEvent::Victory => 6,
        GameEvent::LifeLost => 5,
        GameEvent::GhostEaten(_) => 4,
        GameEvent::PowerPelletEaten => 3,
        GameEvent::GhostNear => 2,
        GameEvent::PelletEaten => 1,
    }
}

/// The event worth talking about; earlier events win ties.
pub fn headline(events: &[GameEvent]) -> Option<&GameEvent> {
    events
        .iter()
        .rev()
        .max_by_key(|event| priority(event))
}

pub fn remark(event: &GameEvent) -> Remark {
    match event {
        GameEvent::PelletEaten => Remark {
            text: "maze[y][x] = EMPTY. One cell of the matrix rewritten.",
            concept: Concept::Matrix,
        },
        GameEvent::PowerPelletEaten => Remark {
            text: "Power pellet: every ghost switches CHASE -> FRIGHTENED.",
            concept: Concept::Fsm,
        },
        GameEvent::GhostNear => Remark {
            text: "BFS found you. Shortest path, no wasted steps.",
            concept: Concept::Bfs,
        },
        GameEvent::GhostEaten(_) => Remark {
            text: "Ghost sent home. The frontier restarts from its spawn.",
            concept: Concept::Queue,
        },
        GameEvent::LifeLost => Remark {
            text: "Collision on a shared cell. Back to spawn.",
            concept: Concept::Matrix,
        },
        GameEvent::GameOver => Remark {
            text: "Terminal state reached: GAME OVER. Press r.",
            concept: Concept::Fsm,
        },
        GameEvent::Victory => Remark {
            text: "Zero pellets left. Terminal state: WIN. Press r.",
            concept: Concept::Fsm,
        },
    }
}
