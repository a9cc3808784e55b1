use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::config::{Rules, Scoring, DEFAULT_LIVES, POWER_TICKS};
use crate::entity::{Archetype, Dir, Pos};
use crate::maze::{Maze, Tile};

const MIN_SIDE: usize = 7;
const BRAID_CHANCE: f32 = 0.45;
const EXTRA_OPENINGS: f32 = 0.08;

/// Builds a random but reproducible set of rules.
///
/// Sides are rounded up to odd numbers of at least 7. The layout is a
/// randomized Prim maze with most dead ends braided away, a side tunnel
/// through the middle row and power pellets in the corners.
pub fn generate_rules(seed: u64, width: usize, height: usize) -> Rules {
    let width = odd_at_least(width);
    let height = odd_at_least(height);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut grid = carve_maze(&mut rng, width, height);

    let tunnel_row = (height / 2) | 1;
    let tunnel_row = tunnel_row.min(height - 2);
    grid[tunnel_row][0] = Tile::Empty;
    grid[tunnel_row][width - 1] = Tile::Empty;

    for (y, row) in grid.iter_mut().enumerate() {
        for (x, tile) in row.iter_mut().enumerate() {
            let in_tunnel = y == tunnel_row && (x == 0 || x == width - 1);
            if *tile == Tile::Empty && !in_tunnel {
                *tile = Tile::Pellet;
            }
        }
    }
    let corners = [
        Pos::new(1, 1),
        Pos::new(width - 2, 1),
        Pos::new(1, height - 2),
        Pos::new(width - 2, height - 2),
    ];
    for pos in corners {
        grid[pos.y][pos.x] = Tile::PowerPellet;
    }

    let maze = Maze::from_tiles(width, height, grid.into_iter().flatten().collect());
    let open: Vec<Pos> = maze
        .cells()
        .filter(|(_, tile)| !tile.is_wall())
        .map(|(pos, _)| pos)
        .collect();

    let bottom = Pos::new(width / 2, height - 2);
    let player_spawn = open
        .iter()
        .copied()
        .min_by_key(|pos| pos.manhattan(bottom))
        .unwrap_or(corners[0]);

    let centre = Pos::new(width / 2, height / 2);
    let mut near_centre: Vec<Pos> = open
        .iter()
        .copied()
        .filter(|pos| *pos != player_spawn)
        .collect();
    near_centre.sort_by_key(|pos| pos.manhattan(centre));
    let mut slots = near_centre.into_iter();
    let ghost_spawns =
        Archetype::ALL.map(|archetype| (archetype, slots.next().unwrap_or(corners[3])));

    Rules {
        template: maze.rows(),
        player_spawn,
        ghost_spawns,
        retreat_corner: corners[0],
        lives: DEFAULT_LIVES,
        power_ticks: POWER_TICKS,
        scoring: Scoring::default(),
    }
}

fn odd_at_least(side: usize) -> usize {
    let side = side.max(MIN_SIDE);
    if side % 2 == 0 {
        side + 1
    } else {
        side
    }
}

/// Cells sit on odd coordinates; the even lines between them are walls
/// until a passage is carved through.
fn carve_maze(rng: &mut impl Rng, width: usize, height: usize) -> Vec<Vec<Tile>> {
    let mut grid = vec![vec![Tile::Wall; width]; height];
    let cells_w = (width - 1) / 2;
    let cells_h = (height - 1) / 2;
    let mut in_maze = vec![vec![false; cells_w]; cells_h];
    let mut frontier: Vec<(usize, usize)> = Vec::new();

    let start = (rng.gen_range(0..cells_w), rng.gen_range(0..cells_h));
    in_maze[start.1][start.0] = true;
    carve_cell(&mut grid, start.0, start.1);
    add_frontier(start.0, start.1, cells_w, cells_h, &in_maze, &mut frontier);

    while !frontier.is_empty() {
        let idx = rng.gen_range(0..frontier.len());
        let (cx, cy) = frontier.swap_remove(idx);
        if in_maze[cy][cx] {
            continue;
        }

        let neighbors: Vec<(usize, usize)> = cell_neighbors(cx, cy, cells_w, cells_h)
            .filter(|&(nx, ny)| in_maze[ny][nx])
            .collect();
        let Some(&(nx, ny)) = neighbors.choose(rng) else {
            continue;
        };

        in_maze[cy][cx] = true;
        carve_between(&mut grid, cx, cy, nx, ny);
        carve_cell(&mut grid, cx, cy);
        add_frontier(cx, cy, cells_w, cells_h, &in_maze, &mut frontier);
    }

    braid(&mut grid, cells_w, cells_h, rng);
    grid
}

fn cell_neighbors(
    cx: usize,
    cy: usize,
    cells_w: usize,
    cells_h: usize,
) -> impl Iterator<Item = (usize, usize)> {
    Dir::ALL.into_iter().filter_map(move |dir| {
        let (dx, dy) = dir.delta();
        let nx = cx.checked_add_signed(dx)?;
        let ny = cy.checked_add_signed(dy)?;
        (nx < cells_w && ny < cells_h).then_some((nx, ny))
    })
}

fn add_frontier(
    cx: usize,
    cy: usize,
    cells_w: usize,
    cells_h: usize,
    in_maze: &[Vec<bool>],
    frontier: &mut Vec<(usize, usize)>,
) {
    frontier.extend(cell_neighbors(cx, cy, cells_w, cells_h).filter(|&(nx, ny)| !in_maze[ny][nx]));
}

fn carve_cell(grid: &mut [Vec<Tile>], cx: usize, cy: usize) {
    grid[cy * 2 + 1][cx * 2 + 1] = Tile::Empty;
}

fn carve_between(grid: &mut [Vec<Tile>], cx: usize, cy: usize, nx: usize, ny: usize) {
    let wall_x = cx + nx + 1;
    let wall_y = cy + ny + 1;
    grid[wall_y][wall_x] = Tile::Empty;
}

fn is_open_between(grid: &[Vec<Tile>], cx: usize, cy: usize, nx: usize, ny: usize) -> bool {
    grid[cy + ny + 1][cx + nx + 1] != Tile::Wall
}

/// Knocks extra holes into the perfect maze so ghosts can be dodged.
fn braid(grid: &mut [Vec<Tile>], cells_w: usize, cells_h: usize, rng: &mut impl Rng) {
    for cy in 0..cells_h {
        for cx in 0..cells_w {
            let (open, closed): (Vec<_>, Vec<_>) = cell_neighbors(cx, cy, cells_w, cells_h)
                .partition(|&(nx, ny)| is_open_between(grid, cx, cy, nx, ny));

            let dead_end = open.len() == 1;
            let chance = if dead_end { BRAID_CHANCE } else { EXTRA_OPENINGS };
            if closed.is_empty() || rng.gen::<f32>() >= chance {
                continue;
            }
            if let Some(&(nx, ny)) = closed.choose(rng) {
                carve_between(grid, cx, cy, nx, ny);
            }
        }
    }
}
