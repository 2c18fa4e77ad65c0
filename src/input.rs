//! Player actions and a compact script format for driving a session headlessly.
//!
//! Script characters (vim-style, like the terminal key map):
//! `h` left, `l` right, `j` down, space hard drop, `k` rotate, `p` pause,
//! `r` resume, `s` start, `x` reset, `.` wait one tick. Newlines and tabs are
//! ignored so long scripts can be wrapped.

use crate::game::GameState;
use rand::Rng;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    MoveDown,
    HardDrop,
    Rotate,
    Pause,
    Resume,
    Start,
    Reset,
    Wait,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("unknown action '{ch}' at position {pos}")]
    UnknownAction { ch: char, pos: usize },
}

impl Action {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            'h' => Some(Self::MoveLeft),
            'l' => Some(Self::MoveRight),
            'j' => Some(Self::MoveDown),
            ' ' => Some(Self::HardDrop),
            'k' => Some(Self::Rotate),
            'p' => Some(Self::Pause),
            'r' => Some(Self::Resume),
            's' => Some(Self::Start),
            'x' => Some(Self::Reset),
            '.' => Some(Self::Wait),
            _ => None,
        }
    }
}

/// Parse a script into actions, one per character.
pub fn parse_script(script: &str) -> Result<Vec<Action>, ScriptError> {
    script
        .chars()
        .enumerate()
        .filter(|(_, ch)| !matches!(ch, '\n' | '\r' | '\t'))
        .map(|(pos, ch)| Action::from_char(ch).ok_or(ScriptError::UnknownAction { ch, pos }))
        .collect()
}

impl<R: Rng> GameState<R> {
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::MoveLeft => self.move_left(),
            Action::MoveRight => self.move_right(),
            Action::MoveDown => self.move_down(),
            Action::HardDrop => self.hard_drop(),
            Action::Rotate => self.rotate(),
            Action::Pause => self.pause(),
            Action::Resume => self.resume(),
            Action::Start => self.start(),
            Action::Reset => self.reset(),
            Action::Wait => {}
        }
    }
}
