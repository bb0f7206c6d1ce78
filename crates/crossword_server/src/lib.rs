//! Crossword party server library.
//!
//! Multiplayer sessions around a generated crossword: players join a room,
//! the creator starts the game, and players take turns guessing words for
//! points until every word is found.
//!
//! # Architecture
//!
//! - **Session**: in-memory session registry, turns, scores and win detection
//! - **Server**: REST API over the session registry (axum)
//! - **Config**: TOML server configuration and component wiring
//!
//! # Example
//!
//! ```no_run
//! use crossword_server::{ServerConfig, router};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::default();
//! let app = router(config.session_manager()?, config.cors());
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3001").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod server;
mod session;

// Crate-level exports - Configuration
pub use config::{ConfigError, CorsConfig, ServerConfig};

// Crate-level exports - Errors
pub use error::GameError;

// Crate-level exports - Server types
pub use server::{
    AppState, AttemptWordRequest, CreateGameRequest, ErrorBody, JoinGameRequest, PlayerRequest,
    router, serve,
};

// Crate-level exports - Session management
pub use session::{
    AttemptOutcome, CreatedGame, GameSession, GameStatus, GameView, JoinedGame, POINTS_PER_WORD,
    Player, PlayerId, SessionId, SessionManager, SessionSettings, WordView, number_spatially,
};
