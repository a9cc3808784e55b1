use std::collections::VecDeque;

use log::trace;

use crate::entity::{Dir, Pos};
use crate::maze::Maze;

/// Shortest path from `start` to `target`, both ends included.
///
/// Neighbors are expanded in `Up, Down, Left, Right` order so ties always
/// resolve the same way. Ghost paths stay inside the grid: the side tunnel is
/// not an edge here. Returns `None` when the target cannot be reached.
pub fn find_path(maze: &Maze, start: Pos, target: Pos) -> Option<Vec<Pos>> {
    let result = search(maze, start, target);
    trace!("bfs {start} -> {target}: expanded {} cells", result.expanded);
    result.path
}

pub(crate) struct Search {
    pub path: Option<Vec<Pos>>,
    pub expanded: usize,
}

pub(crate) fn search(maze: &Maze, start: Pos, target: Pos) -> Search {
    let width = maze.width();
    if !maze.contains(start) || !maze.contains(target) {
        return Search {
            path: None,
            expanded: 0,
        };
    }

    let idx = |p: Pos| p.y * width + p.x;
    let mut parent: Vec<Option<Pos>> = vec![None; width * maze.height()];
    let mut visited = vec![false; width * maze.height()];
    let mut q = VecDeque::new();
    let mut expanded = 0;

    visited[idx(start)] = true;
    q.push_back(start);

    while let Some(pos) = q.pop_front() {
        expanded += 1;
        if pos == target {
            let mut path = vec![pos];
            let mut cur = pos;
            while let Some(prev) = parent[idx(cur)] {
                path.push(prev);
                cur = prev;
            }
            path.reverse();
            return Search {
                path: Some(path),
                expanded,
            };
        }
        for dir in Dir::ALL {
            let Some(next) = step_in_bounds(maze, pos, dir) else {
                continue;
            };
            if maze.is_wall(next) || visited[idx(next)] {
                continue;
            }
            visited[idx(next)] = true;
            parent[idx(next)] = Some(pos);
            q.push_back(next);
        }
    }

    Search {
        path: None,
        expanded,
    }
}

fn step_in_bounds(maze: &Maze, pos: Pos, dir: Dir) -> Option<Pos> {
    let (dx, dy) = dir.delta();
    let nx = pos.x as isize + dx;
    let ny = pos.y as isize + dy;
    if nx < 0 || ny < 0 {
        return None;
    }
    let next = Pos::new(nx as usize, ny as usize);
    maze.contains(next).then_some(next)
}
