use std::io::{Stdout, Write};

use anyhow::Result;
use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::UnicodeWidthStr;

use pacman_grid::commentary::{self, Concept, IDLE_REMARK};
use pacman_grid::{Archetype, GameState, Phase, Pos, TickReport, Tile};

const CELL_W: usize = 2;
/// HUD above the maze, ghost status and commentary below it.
const CHROME_H: usize = 3;

/// Text shown around the maze that comes from tick reports rather than state.
#[derive(Clone, Debug)]
pub struct Hud {
    remark: &'static str,
    concept: Option<Concept>,
    path_cells: usize,
}

impl Default for Hud {
    fn default() -> Self {
        Hud {
            remark: IDLE_REMARK,
            concept: None,
            path_cells: 0,
        }
    }
}

impl Hud {
    pub fn absorb(&mut self, report: &TickReport) {
        self.path_cells = report.path_cells;
        if let Some(event) = commentary::headline(&report.events) {
            let remark = commentary::remark(event);
            self.remark = remark.text;
            self.concept = Some(remark.concept);
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player,
    Ghost,
    Frightened,
    Wall,
    Empty,
    Pellet,
    Power,
}

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    glyph: Glyph,
    color: Color,
}

/// Redraws only the cells and lines that changed since the last frame.
pub struct Renderer {
    last: Vec<Cell>,
    last_hud: String,
    last_footer: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            last: vec![
                Cell {
                    glyph: Glyph::Empty,
                    color: Color::Reset,
                };
                width * height
            ],
            last_hud: String::new(),
            last_footer: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    pub fn invalidate(&mut self) {
        self.needs_full = true;
    }

    pub fn render(&mut self, stdout: &mut Stdout, state: &GameState, hud: &Hud) -> Result<()> {
        let width = state.maze.width();
        let height = state.maze.height();
        let needed_h = (height + CHROME_H) as u16;
        let needed_w = (width * CELL_W) as u16;

        stdout.queue(MoveTo(0, 0))?;

        let (term_w, term_h) = terminal::size()?;
        if term_w < needed_w || term_h < needed_h {
            stdout.queue(Clear(ClearType::All))?;
            let msg = format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                needed_w, needed_h, term_w, term_h
            );
            stdout.queue(Print(msg))?;
            stdout.flush()?;
            self.needs_full = true;
            return Ok(());
        }

        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + 1;
        if origin_x != self.origin_x || origin_y != self.origin_y {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }
        if self.needs_full {
            stdout.queue(Clear(ClearType::All))?;
        }

        let status = hud_line(state);
        if self.needs_full || status != self.last_hud {
            self.print_line(stdout, self.origin_y - 1, &status, Color::White)?;
            self.last_hud = status;
        }

        for y in 0..height {
            for x in 0..width {
                let cell = cell_for(state, Pos::new(x, y));
                let idx = y * width + x;
                if self.needs_full || cell != self.last[idx] {
                    self.last[idx] = cell;
                    self.draw_cell(stdout, x, y, cell)?;
                }
            }
        }

        let footer = footer_line(state, hud);
        if self.needs_full || footer != self.last_footer {
            let row = self.origin_y + height as u16;
            self.print_line(stdout, row, &footer, Color::Grey)?;
            self.last_footer = footer;
        }
        self.needs_full = false;

        stdout.flush()?;
        Ok(())
    }

    fn print_line(&self, stdout: &mut Stdout, row: u16, text: &str, color: Color) -> Result<()> {
        stdout.queue(MoveTo(self.origin_x, row))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(SetForegroundColor(color))?;
        stdout.queue(Print(text))?;
        stdout.queue(ResetColor)?;
        Ok(())
    }

    fn draw_cell(&self, stdout: &mut Stdout, x: usize, y: usize, cell: Cell) -> Result<()> {
        let text = match cell.glyph {
            Glyph::Player => "😃",
            Glyph::Ghost => "👻",
            Glyph::Frightened => "😱",
            Glyph::Wall => "██",
            Glyph::Empty => "  ",
            Glyph::Pellet => "· ",
            Glyph::Power => "● ",
        };
        let x_pos = self.origin_x + (x * CELL_W) as u16;
        let y_pos = self.origin_y + y as u16;
        stdout.queue(MoveTo(x_pos, y_pos))?;
        stdout.queue(SetForegroundColor(cell.color))?;
        stdout.queue(Print(text))?;
        let w = UnicodeWidthStr::width(text);
        for _ in w..CELL_W {
            stdout.queue(Print(' '))?;
        }
        stdout.queue(ResetColor)?;
        Ok(())
    }
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Paused => "PAUSED (space)",
        Phase::Running => "PLAYING",
        Phase::GameOver => "GAME OVER (r)",
        Phase::Win => "VICTORY (r)",
    }
}

fn hud_line(state: &GameState) -> String {
    format!(
        "Score: {:05}  Lives: {}  Pellets: {}  Power: {}  {}",
        state.score,
        state.lives,
        state.maze.remaining_pellets(),
        state.power_ticks,
        phase_label(state.phase)
    )
}

fn footer_line(state: &GameState, hud: &Hud) -> String {
    let mode = if state.power_active() {
        "FRIGHTENED"
    } else {
        "CHASE"
    };
    let concept = hud.concept.map_or("", Concept::label);
    format!(
        "Ghosts: {mode}  BFS path load: {}  [{concept}] {}",
        hud.path_cells, hud.remark
    )
}

fn ghost_color(archetype: Archetype) -> Color {
    match archetype {
        Archetype::Blinky => Color::Red,
        Archetype::Pinky => Color::Magenta,
        Archetype::Inky => Color::Cyan,
        Archetype::Clyde => Color::DarkYellow,
    }
}

fn cell_for(state: &GameState, pos: Pos) -> Cell {
    if pos == state.player {
        return Cell {
            glyph: Glyph::Player,
            color: Color::Yellow,
        };
    }
    if let Some(ghost) = state.ghosts.iter().find(|g| g.pos == pos) {
        if ghost.frightened {
            return Cell {
                glyph: Glyph::Frightened,
                color: Color::Blue,
            };
        }
        return Cell {
            glyph: Glyph::Ghost,
            color: ghost_color(ghost.archetype),
        };
    }
    match state.maze.tile(pos) {
        Tile::Wall => Cell {
            glyph: Glyph::Wall,
            color: Color::Blue,
        },
        Tile::Empty => Cell {
            glyph: Glyph::Empty,
            color: Color::Reset,
        },
        Tile::Pellet => Cell {
            glyph: Glyph::Pellet,
            color: Color::White,
        },
        Tile::PowerPellet => Cell {
            glyph: Glyph::Power,
            color: Color::Magenta,
        },
    }
}
