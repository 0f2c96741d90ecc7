//! BLOCKFALL - a falling-block puzzle engine
//!
//! Pure game rules with no rendering or input devices attached. A host feeds
//! discrete [`game::Action`]s in, pumps timers through a [`timer::Scheduler`],
//! and reads [`game::GameSnapshot`]s and [`game::GameEvent`]s back out.

pub mod board;
pub mod game;
pub mod piece;
pub mod score;
pub mod settings;
pub mod spawner;
pub mod tetromino;
pub mod timer;

pub use game::{Action, Game, GameConfig, GameEvent, GameSnapshot, Phase};
pub use timer::{ManualScheduler, RealtimeScheduler, Scheduler, TimerId};
