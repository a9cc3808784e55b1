use log::{debug, info};

use crate::config::{ConfigError, Rules};
use crate::entity::{Archetype, Dir, Ghost, Pos};
use crate::input::InputLatch;
use crate::maze::{Maze, PelletKind};
use crate::pathfind::find_path;

/// Manhattan distance at which a chasing ghost counts as close.
pub const GHOST_NEAR_DISTANCE: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Paused,
    Running,
    GameOver,
    Win,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::GameOver | Phase::Win)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    PelletEaten,
    PowerPelletEaten,
    GhostNear,
    GhostEaten(Archetype),
    LifeLost,
    GameOver,
    Victory,
}

/// What happened during one tick, for the HUD and commentary.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub events: Vec<GameEvent>,
    /// Sum of the lengths of every ghost path found this tick.
    pub path_cells: usize,
}

/// The whole simulation at one instant. Each tick produces a new value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    pub player: Pos,
    pub facing: Option<Dir>,
    pub score: u32,
    pub lives: u32,
    pub maze: Maze,
    pub ghosts: [Ghost; 4],
    pub phase: Phase,
    pub power_ticks: u32,
    pub ticks: u64,
}

impl GameState {
    /// Validates `rules` and builds the starting state, paused.
    pub fn new(rules: &Rules) -> Result<GameState, ConfigError> {
        let maze = rules.validate()?;
        Ok(GameState::fresh(rules, maze))
    }

    fn fresh(rules: &Rules, maze: Maze) -> GameState {
        GameState {
            player: rules.player_spawn,
            facing: None,
            score: 0,
            lives: rules.lives,
            maze,
            ghosts: rules
                .ghost_spawns
                .map(|(archetype, pos)| Ghost::spawn(archetype, pos)),
            phase: Phase::Paused,
            power_ticks: 0,
            ticks: 0,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.phase == Phase::Paused
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn is_win(&self) -> bool {
        self.phase == Phase::Win
    }

    pub fn power_active(&self) -> bool {
        self.power_ticks > 0
    }

    /// Advances one step. Outside `Running` the state comes back unchanged.
    pub fn tick(&self, latch: &InputLatch, rules: &Rules) -> (GameState, TickReport) {
        let mut next = self.clone();
        let mut report = TickReport::default();
        if next.phase != Phase::Running {
            return (next, report);
        }

        next.ticks += 1;
        next.steer(latch.get());
        next.move_player();
        next.consume_tile(rules, &mut report);
        next.power_ticks = next.power_ticks.saturating_sub(1);
        next.update_ghosts(rules, &mut report);
        next.handle_collisions(rules, &mut report);
        next.check_win(&mut report);
        (next, report)
    }

    fn steer(&mut self, wanted: Option<Dir>) {
        let Some(dir) = wanted else {
            return;
        };
        let (dx, dy) = dir.delta();
        let x = self.player.x as isize + dx;
        let y = self.player.y as isize + dy;
        if !self.maze.tile_at(x, y).is_wall() {
            self.facing = Some(dir);
        }
    }

    fn move_player(&mut self) {
        if let Some(dir) = self.facing {
            if let Some(next) = self.maze.open_neighbor(self.player, dir) {
                self.player = next;
            }
        }
    }

    fn consume_tile(&mut self, rules: &Rules, report: &mut TickReport) {
        let consumed = self.maze.consume_pellet(self.player, &rules.scoring);
        self.score += consumed.points;
        match consumed.kind {
            Some(PelletKind::Normal) => report.events.push(GameEvent::PelletEaten),
            Some(PelletKind::Power) => {
                self.power_ticks = rules.power_ticks;
                report.events.push(GameEvent::PowerPelletEaten);
            }
            None => {}
        }
    }

    fn update_ghosts(&mut self, rules: &Rules, report: &mut TickReport) {
        let frightened = self.power_active();
        let target = if frightened {
            rules.retreat_corner
        } else {
            self.player
        };

        for ghost in self.ghosts.iter_mut() {
            if let Some(path) = find_path(&self.maze, ghost.pos, target) {
                report.path_cells += path.len();
                if let Some(&step) = path.get(1) {
                    ghost.step_to(step);
                }
            }
            ghost.frightened = frightened;
        }

        if !frightened
            && self
                .ghosts
                .iter()
                .any(|ghost| ghost.pos.manhattan(self.player) <= GHOST_NEAR_DISTANCE)
        {
            report.events.push(GameEvent::GhostNear);
        }
    }

    fn handle_collisions(&mut self, rules: &Rules, report: &mut TickReport) {
        let frightened = self.power_active();
        for idx in 0..self.ghosts.len() {
            if self.ghosts[idx].pos != self.player {
                continue;
            }

            if frightened {
                let (archetype, spawn) = rules.ghost_spawns[idx];
                self.score += rules.scoring.ghost;
                self.ghosts[idx] = Ghost {
                    frightened: true,
                    ..Ghost::spawn(archetype, spawn)
                };
                debug!("{} eaten at {}", archetype.name(), self.player);
                report.events.push(GameEvent::GhostEaten(archetype));
                continue;
            }

            self.lives = self.lives.saturating_sub(1);
            debug!(
                "caught by {} at {}, {} lives left",
                self.ghosts[idx].archetype.name(),
                self.player,
                self.lives
            );
            self.player = rules.player_spawn;
            report.events.push(GameEvent::LifeLost);
            if self.lives == 0 {
                self.phase = Phase::GameOver;
                info!("game over after {} ticks, score {}", self.ticks, self.score);
                report.events.push(GameEvent::GameOver);
            }
            break;
        }
    }

    fn check_win(&mut self, report: &mut TickReport) {
        if self.phase == Phase::Running && self.maze.remaining_pellets() == 0 {
            self.phase = Phase::Win;
            info!("maze cleared after {} ticks, score {}", self.ticks, self.score);
            report.events.push(GameEvent::Victory);
        }
    }
}

/// Owns the rules, the current state and the input latch for one game.
#[derive(Clone, Debug)]
pub struct Session {
    rules: Rules,
    initial_maze: Maze,
    state: GameState,
    latch: InputLatch,
}

impl Session {
    pub fn new(rules: Rules) -> Result<Session, ConfigError> {
        let initial_maze = rules.validate()?;
        let state = GameState::fresh(&rules, initial_maze.clone());
        info!(
            "new session on a {}x{} maze with {} pellets",
            initial_maze.width(),
            initial_maze.height(),
            initial_maze.remaining_pellets()
        );
        Ok(Session {
            rules,
            initial_maze,
            state,
            latch: InputLatch::new(),
        })
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn latch(&self) -> &InputLatch {
        &self.latch
    }

    pub fn request(&mut self, dir: Dir) {
        self.latch.request(dir);
    }

    pub fn toggle_pause(&mut self) {
        self.state.phase = match self.state.phase {
            Phase::Paused => Phase::Running,
            Phase::Running => Phase::Paused,
            terminal => terminal,
        };
    }

    /// Throws the current game away and starts a new one, already running.
    pub fn restart(&mut self) {
        self.state = GameState::fresh(&self.rules, self.initial_maze.clone());
        self.state.phase = Phase::Running;
        self.latch.clear();
        info!("session restarted");
    }

    pub fn tick(&mut self) -> TickReport {
        let (next, report) = self.state.tick(&self.latch, &self.rules);
        self.state = next;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Scoring;
    use crate::maze::Tile;

    const CORRIDOR: [&str; 4] = [
        "##############",
        "#            #",
        "#.############",
        "##############",
    ];

    fn rules(template: &[&str], player: Pos, ghosts: [Pos; 4], retreat: Pos) -> Rules {
        Rules {
            template: template.iter().map(|row| row.to_string()).collect(),
            player_spawn: player,
            ghost_spawns: [
                (Archetype::Blinky, ghosts[0]),
                (Archetype::Pinky, ghosts[1]),
                (Archetype::Inky, ghosts[2]),
                (Archetype::Clyde, ghosts[3]),
            ],
            retreat_corner: retreat,
            lives: 3,
            power_ticks: 5,
            scoring: Scoring::default(),
        }
    }

    fn corridor() -> Session {
        let far = Pos::new(12, 1);
        let mut session = Session::new(rules(&CORRIDOR, Pos::new(1, 1), [far; 4], far)).unwrap();
        session.toggle_pause();
        session
    }

    #[test]
    fn starts_paused_and_ignores_ticks() {
        let mut session = Session::new(Rules::classic()).unwrap();
        let before = session.state().clone();
        session.request(Dir::Left);
        let report = session.tick();
        assert!(session.state().is_paused());
        assert_eq!(session.state(), &before);
        assert_eq!(report, TickReport::default());
    }

    #[test]
    fn pause_toggles_without_losing_progress() {
        let mut session = corridor();
        session.request(Dir::Right);
        session.tick();
        session.toggle_pause();
        let paused = session.state().clone();
        session.tick();
        assert_eq!(session.state(), &paused);
        session.toggle_pause();
        session.tick();
        assert_eq!(session.state().player, Pos::new(3, 1));
    }

    #[test]
    fn no_request_means_no_movement() {
        let mut session = corridor();
        session.tick();
        assert_eq!(session.state().player, Pos::new(1, 1));
        assert_eq!(session.state().facing, None);
    }

    #[test]
    fn wall_bump_keeps_position_and_facing() {
        let mut session = corridor();
        session.request(Dir::Up);
        session.tick();
        assert_eq!(session.state().player, Pos::new(1, 1));
        assert_eq!(session.state().facing, None);

        session.request(Dir::Right);
        session.tick();
        session.request(Dir::Left);
        session.tick();
        assert_eq!(session.state().player, Pos::new(1, 1));
        assert_eq!(session.state().facing, Some(Dir::Left));

        session.tick();
        assert_eq!(session.state().player, Pos::new(1, 1));
        assert_eq!(session.state().facing, Some(Dir::Left));
    }

    #[test]
    fn blocked_turn_is_retried_until_it_fits() {
        let template = ["#####", "#   #", "# # #", "#.  #", "#####"];
        let ghost = Pos::new(1, 3);
        let mut session =
            Session::new(rules(&template, Pos::new(1, 1), [ghost; 4], ghost)).unwrap();
        session.toggle_pause();
        session.request(Dir::Right);
        session.tick();
        assert_eq!(session.state().player, Pos::new(2, 1));
        // (2, 2) is a wall, so the player keeps going right.
        session.request(Dir::Down);
        session.tick();
        assert_eq!(session.state().player, Pos::new(3, 1));
        assert_eq!(session.state().facing, Some(Dir::Right));
        // Now the queued turn fits.
        session.tick();
        assert_eq!(session.state().facing, Some(Dir::Down));
        assert_eq!(session.state().player, Pos::new(3, 2));
    }

    #[test]
    fn tunnel_wraps_player_columns() {
        let template = ["#####", "  ...", "#####"];
        let ghost = Pos::new(2, 1);
        let mut session =
            Session::new(rules(&template, Pos::new(0, 1), [ghost; 4], ghost)).unwrap();
        session.toggle_pause();
        session.request(Dir::Left);
        session.tick();
        assert_eq!(session.state().player, Pos::new(4, 1));
        assert_eq!(session.state().score, 10);

        let mut session =
            Session::new(rules(&template, Pos::new(4, 1), [ghost; 4], ghost)).unwrap();
        session.toggle_pause();
        session.request(Dir::Right);
        session.tick();
        assert_eq!(session.state().player, Pos::new(0, 1));
    }

    #[test]
    fn ghosts_step_along_shortest_path() {
        let mut session = corridor();
        let report = session.tick();
        for ghost in &session.state().ghosts {
            assert_eq!(ghost.pos, Pos::new(11, 1));
            assert_eq!(ghost.facing, Some(Dir::Left));
            assert!(!ghost.frightened);
        }
        assert_eq!(report.path_cells, 4 * 12);
    }

    #[test]
    fn collision_costs_one_life_and_keeps_score() {
        let template = ["#######", "#     #", "#####.#"];
        let ghost = Pos::new(3, 1);
        let mut session =
            Session::new(rules(&template, Pos::new(1, 1), [ghost; 4], ghost)).unwrap();
        session.toggle_pause();
        session.request(Dir::Right);
        let report = session.tick();
        let state = session.state();
        assert_eq!(state.lives, 2);
        assert_eq!(state.player, Pos::new(1, 1));
        assert_eq!(state.score, 0);
        assert_eq!(state.phase, Phase::Running);
        assert_eq!(
            report.events.iter().filter(|e| **e == GameEvent::LifeLost).count(),
            1
        );
    }

    #[test]
    fn last_life_ends_the_game() {
        let template = ["#######", "#     #", "#####.#"];
        let ghost = Pos::new(3, 1);
        let mut r = rules(&template, Pos::new(1, 1), [ghost; 4], ghost);
        r.lives = 1;
        let mut session = Session::new(r).unwrap();
        session.toggle_pause();
        session.request(Dir::Right);
        let report = session.tick();
        assert!(session.state().is_game_over());
        assert_eq!(session.state().lives, 0);
        assert!(report.events.contains(&GameEvent::GameOver));

        let over = session.state().clone();
        session.toggle_pause();
        session.tick();
        assert_eq!(session.state(), &over);
    }

    #[test]
    fn game_over_beats_clearing_the_last_pellet() {
        let ghost = Pos::new(3, 0);
        let mut r = rules(&["  .  "], Pos::new(1, 0), [ghost; 4], Pos::new(4, 0));
        r.lives = 1;
        let mut session = Session::new(r).unwrap();
        session.toggle_pause();
        session.request(Dir::Right);
        let report = session.tick();
        let state = session.state();

        assert_eq!(state.maze.remaining_pellets(), 0);
        assert_eq!(state.phase, Phase::GameOver);
        assert!(report.events.contains(&GameEvent::PelletEaten));
        assert!(report.events.contains(&GameEvent::GameOver));
        assert!(!report.events.contains(&GameEvent::Victory));
    }

    #[test]
    fn steering_off_the_top_row_is_refused() {
        let corner = Pos::new(2, 1);
        let mut session =
            Session::new(rules(&["  .", "   "], Pos::new(0, 0), [corner; 4], corner)).unwrap();
        session.toggle_pause();
        session.request(Dir::Up);
        session.tick();
        assert_eq!(session.state().player, Pos::new(0, 0));
        assert_eq!(session.state().facing, None);
    }

    #[test]
    fn power_pellet_frightens_and_ghosts_get_eaten() {
        let template = ["#######", "# o   #", "#####.#"];
        let mut session = Session::new(rules(
            &template,
            Pos::new(1, 1),
            [Pos::new(3, 1), Pos::new(5, 2), Pos::new(5, 2), Pos::new(5, 2)],
            Pos::new(1, 1),
        ))
        .unwrap();
        session.toggle_pause();
        session.request(Dir::Right);
        let report = session.tick();
        let state = session.state();

        assert_eq!(state.power_ticks, 4);
        assert_eq!(state.score, 50 + 200);
        assert_eq!(state.lives, 3);
        assert_eq!(state.ghosts[0].pos, Pos::new(3, 1));
        assert_eq!(state.ghosts[1].pos, Pos::new(5, 1));
        assert!(state.ghosts.iter().all(|g| g.frightened));
        assert!(report.events.contains(&GameEvent::PowerPelletEaten));
        assert!(report
            .events
            .contains(&GameEvent::GhostEaten(Archetype::Blinky)));
    }

    #[test]
    fn power_mode_runs_out() {
        let template = ["#######", "#o    #", "#####.#"];
        let far = Pos::new(5, 2);
        let mut session = Session::new(rules(&template, Pos::new(1, 1), [far; 4], far)).unwrap();
        session.toggle_pause();
        session.tick();
        assert_eq!(session.state().power_ticks, 4);
        for expected in (0..4).rev() {
            session.tick();
            assert_eq!(session.state().power_ticks, expected);
        }
        assert!(!session.state().power_active());
        assert!(session.state().ghosts.iter().all(|g| !g.frightened));
    }

    #[test]
    fn clearing_the_maze_wins() {
        let mut session = corridor();
        session.request(Dir::Down);
        let report = session.tick();
        assert!(session.state().is_win());
        assert_eq!(session.state().score, 10);
        assert_eq!(session.state().maze.remaining_pellets(), 0);
        assert_eq!(session.state().maze.tile(Pos::new(1, 2)), Tile::Empty);
        assert!(report.events.contains(&GameEvent::Victory));

        session.toggle_pause();
        assert!(session.state().is_win());
    }

    #[test]
    fn restart_rebuilds_everything() {
        let mut session = corridor();
        session.request(Dir::Down);
        session.tick();
        assert!(session.state().is_win());

        session.restart();
        let state = session.state();
        assert_eq!(state.phase, Phase::Running);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, 3);
        assert_eq!(state.ticks, 0);
        assert_eq!(state.maze.remaining_pellets(), 1);
        assert_eq!(session.latch().get(), None);
    }

    #[test]
    fn ghost_near_is_reported_while_chasing() {
        let template = ["#########", "#       #", "#.#######"];
        let ghost = Pos::new(6, 1);
        let mut session =
            Session::new(rules(&template, Pos::new(1, 1), [ghost; 4], ghost)).unwrap();
        session.toggle_pause();
        let report = session.tick();
        assert!(!report.events.contains(&GameEvent::GhostNear));
        let report = session.tick();
        assert!(report.events.contains(&GameEvent::GhostNear));
    }

    #[test]
    fn invalid_rules_refuse_to_start() {
        let mut r = Rules::classic();
        r.retreat_corner = Pos::new(0, 0);
        assert!(Session::new(r).is_err());
    }
}
