use std::fs::File;
use std::io::{self, Stdout};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use log::{error, info};

use pacman_grid::config::{MazeSource, RANDOM_MAZE_H, RANDOM_MAZE_W};
use pacman_grid::generate::generate_rules;
use pacman_grid::schedule::Ticker;
use pacman_grid::{Dir, Rules, Session, Settings};

mod render;

use render::{Hud, Renderer};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Steer(Dir),
    TogglePause,
    Restart,
    Quit,
}

/// Raw mode, alternate screen and hidden cursor for as long as it lives.
struct TerminalGuard {
    stdout: Stdout,
}

impl TerminalGuard {
    fn acquire() -> Result<Self> {
        terminal::enable_raw_mode().context("failed to enable raw mode")?;
        let mut guard = TerminalGuard {
            stdout: io::stdout(),
        };
        guard
            .stdout
            .execute(EnterAlternateScreen)
            .context("failed to enter alternate screen")?;
        guard.stdout.execute(Hide).context("failed to hide cursor")?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(err) = self.stdout.execute(Show) {
            error!("failed to show cursor: {err}");
        }
        if let Err(err) = self.stdout.execute(LeaveAlternateScreen) {
            error!("failed to leave alternate screen: {err}");
        }
        if let Err(err) = terminal::disable_raw_mode() {
            error!("failed to disable raw mode: {err}");
        }
    }
}

fn main() -> Result<()> {
    let settings = Settings::from_env();
    init_logging(settings.log_file.as_deref())?;
    info!("starting with {settings:?}");

    let rules = match settings.maze {
        MazeSource::Classic => Rules::classic(),
        MazeSource::Random { seed } => {
            info!("generating random maze from seed {seed}");
            generate_rules(seed, RANDOM_MAZE_W, RANDOM_MAZE_H)
        }
    };
    let mut session = Session::new(rules).context("invalid maze configuration")?;

    let mut guard = TerminalGuard::acquire()?;
    let result = run(&mut guard.stdout, &mut session, &settings);
    drop(guard);

    let state = session.state();
    info!(
        "exiting in {:?} after {} ticks with score {}",
        state.phase, state.ticks, state.score
    );
    result
}

fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run(stdout: &mut Stdout, session: &mut Session, settings: &Settings) -> Result<()> {
    let maze = &session.state().maze;
    let mut renderer = Renderer::new(maze.width(), maze.height());
    let mut hud = Hud::default();
    let mut ticker = Ticker::new(settings.tick, Instant::now());
    let frame_time = Duration::from_micros(1_000_000 / settings.render_fps.max(1));

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            match command_for(key) {
                Some(Command::Steer(dir)) => session.request(dir),
                Some(Command::TogglePause) => session.toggle_pause(),
                Some(Command::Restart) => {
                    session.restart();
                    hud = Hud::default();
                    renderer.invalidate();
                }
                Some(Command::Quit) => return Ok(()),
                None => {}
            }
        }

        if ticker.poll(Instant::now()) {
            let report = session.tick();
            hud.absorb(&report);
        }
        renderer.render(stdout, session.state(), &hud)?;

        let nap = frame_time
            .saturating_sub(frame_start.elapsed())
            .min(ticker.remaining(Instant::now()));
        if !nap.is_zero() {
            thread::sleep(nap);
        }
    }
}

fn command_for(key: KeyEvent) -> Option<Command> {
    if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }
    let command = match key.code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('k') => Command::Steer(Dir::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('j') => Command::Steer(Dir::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('h') => Command::Steer(Dir::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('l') => Command::Steer(Dir::Right),
        KeyCode::Char(' ') | KeyCode::Char('p') => Command::TogglePause,
        KeyCode::Char('r') => Command::Restart,
        KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
        _ => return None,
    };
    Some(command)
}
