//! Game session error types.

use crossword_core::GenerateError;
use derive_more::{Display, Error, From};

/// Rejected session operation. Every variant except [`GameError::Generation`]
/// leaves the session untouched.
#[derive(Debug, Clone, Display, Error, From)]
pub enum GameError {
    /// No session with the given id.
    #[display("Game not found")]
    SessionNotFound,
    /// The session already left the waiting room.
    #[display("Game already started")]
    AlreadyStarted,
    /// No seat left in the session.
    #[display("Room is full (max {max} players)")]
    RoomFull {
        /// Seat limit.
        max: usize,
    },
    /// Someone else holds the turn.
    #[display("Not your turn")]
    NotYourTurn,
    /// No word with the given id.
    #[display("Word not found")]
    WordNotFound,
    /// The word was already guessed.
    #[display("Word already found")]
    WordAlreadyFound,
    /// The player is not part of the session.
    #[display("Player not found")]
    PlayerNotFound,
    /// Only the creator may start the game.
    #[display("Only the creator can start the game")]
    NotCreator,
    /// The game is waiting for players or already finished.
    #[display("Game is not in progress")]
    NotPlaying,
    /// Requested word count out of range.
    #[display("Word count must be between 1 and {max}")]
    InvalidWordCount {
        /// Largest accepted count.
        max: usize,
    },
    /// Blank player name.
    #[display("Player name must not be empty")]
    InvalidPlayerName,
    /// The crossword could not be generated.
    #[display("{_0}")]
    #[from]
    Generation(GenerateError),
}

impl GameError {
    /// Whether the error names a missing entity.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GameError::SessionNotFound | GameError::PlayerNotFound | GameError::WordNotFound
        )
    }
}
