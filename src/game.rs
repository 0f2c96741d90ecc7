//! Core game state and logic
//!
//! `Game` owns one board, one active piece, the lookahead spawner and the
//! score. All mutation happens in one of three places: an inbound command,
//! the repeating gravity timer, or the one-shot clear-delay timer. Each runs
//! to completion on `&mut self`, so none of them can see a half-updated board.
//!
//! Lifecycle of a piece:
//!
//! ```text
//! Falling --descend fails--> lock & scan --no rows--> spawn --> Falling
//!                                 |                     |
//!                                 |                     +--collides--> GameOver
//!                                 +--rows--> Clearing --delay--> remove, score, spawn
//! ```

use crate::board::Board;
use crate::piece::Piece;
use crate::score::Score;
use crate::spawner::{NextPiece, Spawner};
use crate::tetromino::TetrominoType;
use crate::timer::{Scheduler, TimerId};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, trace};

/// How long completed rows stay on screen before they are removed
pub const CLEAR_DELAY: Duration = Duration::from_millis(500);

/// Engine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// A piece is in play and accepts commands
    Falling,
    /// Completed rows are held for the clear delay; commands are ignored
    Clearing,
    /// Terminal
    GameOver,
}

/// Commands the game accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
}

/// Notifications for the presentation layer, drained with
/// [`Game::drain_events`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameEvent {
    RowsCleared { rows: usize, points: u64 },
    LevelUp { level: u32 },
    GameOver { final_score: u64 },
}

/// Per-game settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Delay between detecting completed rows and removing them
    pub clear_delay: Duration,
    /// Fixed piece sequence seed, random when None
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            clear_delay: CLEAR_DELAY,
            seed: None,
        }
    }
}

/// A drawn piece as seen by an observer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PieceView {
    pub kind: TetrominoType,
    pub shape: Vec<Vec<bool>>,
    pub color: u8,
    pub rgb: u32,
}

/// The active piece plus its anchor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveView {
    #[serde(flatten)]
    pub piece: PieceView,
    pub row: i32,
    pub col: i32,
}

/// Everything a renderer needs to draw one frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    pub board: Vec<Vec<u8>>,
    pub active: Option<ActiveView>,
    pub next: PieceView,
    pub score: u64,
    pub level: u32,
    pub lines: u32,
    pub phase: Phase,
    pub clearing_rows: Vec<usize>,
}

/// The main game struct
pub struct Game<S: Scheduler> {
    /// The game board
    board: Board,
    /// Current falling piece, None while clearing or after game over
    active: Option<Piece>,
    /// Lookahead and randomizer
    spawner: Spawner,
    /// Score tracking
    score: Score,
    phase: Phase,
    /// Rows waiting for the clear timer
    clearing_rows: Vec<usize>,
    gravity_timer: Option<TimerId>,
    clear_timer: Option<TimerId>,
    events: Vec<GameEvent>,
    config: GameConfig,
    scheduler: S,
}

impl<S: Scheduler> Game<S> {
    /// Start a game: empty board, first piece in play, gravity running
    pub fn new(config: GameConfig, scheduler: S) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut game = Self {
            board: Board::new(),
            active: None,
            spawner: Spawner::new(seed),
            score: Score::new(),
            phase: Phase::Falling,
            clearing_rows: Vec::new(),
            gravity_timer: None,
            clear_timer: None,
            events: Vec::new(),
            config,
            scheduler,
        };
        info!(seed, "starting game");
        game.start();
        game
    }

    /// Throw away the current game and start a fresh one on the same scheduler
    pub fn reset(&mut self) {
        self.teardown();
        let seed = self.config.seed.unwrap_or_else(rand::random);
        self.board = Board::new();
        self.active = None;
        self.spawner = Spawner::new(seed);
        self.score = Score::new();
        self.phase = Phase::Falling;
        self.clearing_rows.clear();
        self.events.clear();
        info!(seed, "game reset");
        self.start();
    }

    fn start(&mut self) {
        self.spawn_next();
        if self.phase == Phase::Falling {
            self.reschedule_gravity();
        }
    }

    /// Cancel every timer this game holds. Safe to call more than once.
    pub fn teardown(&mut self) {
        if let Some(id) = self.gravity_timer.take() {
            self.scheduler.cancel(id);
        }
        if let Some(id) = self.clear_timer.take() {
            self.scheduler.cancel(id);
        }
    }

    /// Process an action, returns whether the game state changed
    pub fn process_action(&mut self, action: Action) -> bool {
        match action {
            Action::MoveLeft => self.move_left(),
            Action::MoveRight => self.move_right(),
            Action::SoftDrop => self.soft_drop(),
            Action::Rotate => self.rotate(),
        }
    }

    pub fn move_left(&mut self) -> bool {
        self.shift(-1)
    }

    pub fn move_right(&mut self) -> bool {
        self.shift(1)
    }

    /// Move down one row, locking the piece if it cannot move.
    /// Both outcomes change the board state, so this only returns false
    /// when commands are not accepted.
    pub fn soft_drop(&mut self) -> bool {
        if self.phase != Phase::Falling {
            return false;
        }
        self.descend_or_lock();
        true
    }

    pub fn rotate(&mut self) -> bool {
        if self.phase != Phase::Falling {
            return false;
        }
        match &mut self.active {
            Some(piece) => piece.rotate(&self.board),
            None => false,
        }
    }

    fn shift(&mut self, d_col: i32) -> bool {
        if self.phase != Phase::Falling {
            return false;
        }
        match &mut self.active {
            Some(piece) => piece.try_move(d_col, &self.board),
            None => false,
        }
    }

    /// Run every timer that is due. Returns how many handlers ran.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Some(id) = self.scheduler.poll_due() {
            if self.on_timer(id) {
                handled += 1;
            }
        }
        handled
    }

    /// Dispatch one fired timer. Ids that belong to neither live timer are
    /// ignored.
    pub fn on_timer(&mut self, id: TimerId) -> bool {
        if self.gravity_timer == Some(id) {
            self.gravity_tick();
            true
        } else if self.clear_timer == Some(id) {
            self.clear_timer = None;
            self.finish_clear();
            true
        } else {
            trace!(?id, "ignoring stale timer");
            false
        }
    }

    fn gravity_tick(&mut self) {
        if self.phase != Phase::Falling {
            return;
        }
        self.descend_or_lock();
    }

    fn descend_or_lock(&mut self) {
        let Some(piece) = &mut self.active else {
            return;
        };
        if !piece.try_descend(&self.board) {
            self.lock_piece();
        }
    }

    /// Merge the active piece into the board and either spawn the next one
    /// or start clearing completed rows
    fn lock_piece(&mut self) {
        let Some(piece) = self.active.take() else {
            return;
        };

        self.board
            .merge_shape(&piece.shape, piece.row, piece.col, piece.color);
        debug!(kind = ?piece.kind, row = piece.row, col = piece.col, "piece locked");

        let rows = self.board.completed_rows();
        if rows.is_empty() {
            self.spawn_next();
            return;
        }

        debug!(?rows, "clearing rows");
        self.phase = Phase::Clearing;
        self.clearing_rows = rows;
        self.clear_timer = Some(self.scheduler.schedule_once(self.config.clear_delay));
    }

    fn finish_clear(&mut self) {
        let rows = std::mem::take(&mut self.clearing_rows);
        self.board.remove_rows(&rows);

        let level_before = self.score.level;
        let points = self.score.add_clear(rows.len());
        debug!(rows = rows.len(), points, total = self.score.points, "rows cleared");
        self.events.push(GameEvent::RowsCleared {
            rows: rows.len(),
            points,
        });
        if self.score.level != level_before {
            info!(level = self.score.level, "level up");
            self.events.push(GameEvent::LevelUp {
                level: self.score.level,
            });
        }
        if points > 0 {
            self.reschedule_gravity();
        }

        self.phase = Phase::Falling;
        self.spawn_next();
    }

    /// Bring the lookahead into play, ending the game if it does not fit
    fn spawn_next(&mut self) {
        let piece = Piece::spawn(self.spawner.advance());
        if !piece.fits(&self.board) {
            self.game_over();
            return;
        }
        trace!(kind = ?piece.kind, next = ?self.spawner.peek_next().kind, "spawned");
        self.active = Some(piece);
    }

    fn game_over(&mut self) {
        self.phase = Phase::GameOver;
        self.active = None;
        self.teardown();
        info!(score = self.score.points, level = self.score.level, "game over");
        self.events.push(GameEvent::GameOver {
            final_score: self.score.points,
        });
    }

    /// Replace the gravity timer with one at the current level's speed
    fn reschedule_gravity(&mut self) {
        if let Some(id) = self.gravity_timer.take() {
            self.scheduler.cancel(id);
        }
        let interval = self.score.drop_interval();
        debug!(?interval, level = self.score.level, "gravity rescheduled");
        self.gravity_timer = Some(self.scheduler.schedule_repeating(interval));
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active_piece(&self) -> Option<&Piece> {
        self.active.as_ref()
    }

    pub fn next_piece(&self) -> &NextPiece {
        self.spawner.peek_next()
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// Rows held on screen while clearing, empty otherwise
    pub fn clearing_rows(&self) -> &[usize] {
        &self.clearing_rows
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Take all events raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let next = self.spawner.peek_next();
        GameSnapshot {
            board: self.board.color_ids(),
            active: self.active.as_ref().map(|piece| ActiveView {
                piece: PieceView {
                    kind: piece.kind,
                    shape: piece.shape.to_rows(),
                    color: piece.color.get(),
                    rgb: piece.color.rgb(),
                },
                row: piece.row,
                col: piece.col,
            }),
            next: PieceView {
                kind: next.kind,
                shape: next.shape.to_rows(),
                color: next.color.get(),
                rgb: next.color.rgb(),
            },
            score: self.score.points,
            level: self.score.level,
            lines: self.score.lines,
            phase: self.phase,
            clearing_rows: self.clearing_rows.clone(),
        }
    }
}

impl<S: Scheduler> Drop for Game<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
