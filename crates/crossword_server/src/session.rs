//! Game session management for HTTP multiplayer.

use crate::error::GameError;
use crossword_core::{
    Crossword, CrosswordGenerator, CrosswordWord, Direction, GridCell, NumberedGrid,
};
use derive_getters::Getters;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Unique identifier for a game session.
pub type SessionId = String;

/// Unique identifier for a player.
pub type PlayerId = String;

/// Points awarded for each word found.
pub const POINTS_PER_WORD: u32 = 10;

const ID_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
const ID_LEN: usize = 4;

/// Four-letter code from an alphabet without I and O.
fn random_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ID_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Draws codes until `taken` rejects none.
fn unique_code<R: Rng + ?Sized>(rng: &mut R, taken: impl Fn(&str) -> bool) -> String {
    loop {
        let code = random_code(rng);
        if !taken(&code) {
            return code;
        }
    }
}

/// Lifecycle of a session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameStatus {
    /// Players are joining.
    Waiting,
    /// Crossword generated, turns running.
    Playing,
    /// Every word found.
    Finished,
}

/// A player in a game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Player's unique ID.
    pub id: PlayerId,
    /// Player's name.
    pub name: String,
    /// Points earned.
    pub score: u32,
    /// Ready flag shown in the waiting room.
    pub is_ready: bool,
}

impl Player {
    fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            score: 0,
            is_ready: false,
        }
    }
}

/// Limits applied to every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct SessionSettings {
    /// Seats per session.
    max_players: usize,
    /// Largest word count a creator may ask for.
    max_word_count: usize,
}

impl SessionSettings {
    /// Creates session limits.
    pub fn new(max_players: usize, max_word_count: usize) -> Self {
        Self {
            max_players,
            max_word_count,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::new(6, 100)
    }
}

/// A game session.
#[derive(Debug, Clone, Getters)]
pub struct GameSession {
    /// Session ID.
    id: SessionId,
    /// Players in join order.
    players: Vec<Player>,
    /// Player who created the session.
    creator_id: PlayerId,
    /// Words requested at creation.
    word_count: usize,
    /// Placed words with answers.
    words: Vec<CrosswordWord>,
    /// Generated grid with every letter.
    solution: NumberedGrid,
    /// Grid shown to players. Letters appear once revealed.
    board: NumberedGrid,
    /// Index into `players` of whoever holds the turn.
    current_turn_index: usize,
    /// Lifecycle state.
    status: GameStatus,
    /// Set when the game finishes.
    winner: Option<Player>,
    /// Last successful operation, used for idle eviction.
    last_activity: Instant,
}

impl GameSession {
    /// Creates a session in the waiting room with its creator seated.
    #[instrument(skip(creator), fields(creator = %creator.name))]
    pub fn new(id: SessionId, creator: Player, word_count: usize, grid_size: usize) -> Self {
        info!(session_id = %id, "Creating new game session");
        Self {
            id,
            creator_id: creator.id.clone(),
            players: vec![creator],
            word_count,
            words: Vec::new(),
            solution: blank_grid(grid_size),
            board: blank_grid(grid_size),
            current_turn_index: 0,
            status: GameStatus::Waiting,
            winner: None,
            last_activity: Instant::now(),
        }
    }

    /// Gets the player with the given ID.
    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    /// Player holding the turn.
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_turn_index)
    }

    /// Whether every placed word has been found.
    pub fn all_found(&self) -> bool {
        !self.words.is_empty() && self.words.iter().all(CrosswordWord::is_found)
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    fn advance_turn(&mut self) {
        self.current_turn_index = (self.current_turn_index + 1) % self.players.len().max(1);
    }

    /// Seats a new player.
    #[instrument(skip(self, player), fields(session_id = %self.id, player_id = %player.id))]
    pub fn add_player(&mut self, player: Player, max_players: usize) -> Result<(), GameError> {
        if self.status != GameStatus::Waiting {
            warn!("Join attempted after start");
            return Err(GameError::AlreadyStarted);
        }
        if self.players.len() >= max_players {
            warn!(max_players, "Session is full");
            return Err(GameError::RoomFull { max: max_players });
        }
        info!(name = %player.name, "Player joined");
        self.players.push(player);
        Ok(())
    }

    /// Flips a player's ready flag and returns the new value.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn toggle_ready(&mut self, player_id: &str) -> Result<bool, GameError> {
        if self.status != GameStatus::Waiting {
            return Err(GameError::AlreadyStarted);
        }
        let player = self
            .players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or(GameError::PlayerNotFound)?;
        player.is_ready = !player.is_ready;
        debug!(is_ready = player.is_ready, "Toggled ready state");
        Ok(player.is_ready)
    }

    /// Checks that `player_id` may start the game now.
    pub fn ensure_can_start(&self, player_id: &str) -> Result<(), GameError> {
        if self.creator_id != player_id {
            warn!(session_id = %self.id, player_id, "Non-creator tried to start");
            return Err(GameError::NotCreator);
        }
        if self.status != GameStatus::Waiting {
            return Err(GameError::AlreadyStarted);
        }
        Ok(())
    }

    /// Stores a generated crossword and opens play.
    ///
    /// The grid's numbers are replaced by a row-major spatial numbering, and
    /// the board players see starts with every letter hidden.
    #[instrument(skip(self, crossword), fields(session_id = %self.id, words = crossword.len()))]
    pub fn begin(&mut self, crossword: Crossword) {
        let Crossword { words, mut grid } = crossword;
        number_spatially(&mut grid, &words);
        self.board = grid.masked();
        self.solution = grid;
        self.words = words;
        self.current_turn_index = 0;
        self.status = GameStatus::Playing;
        info!("Game started");
    }

    fn ensure_turn(&self, player_id: &str) -> Result<(), GameError> {
        if self.player(player_id).is_none() {
            warn!(session_id = %self.id, player_id, "Unknown player");
            return Err(GameError::PlayerNotFound);
        }
        if self.status != GameStatus::Playing {
            return Err(GameError::NotPlaying);
        }
        if self.current_player().map(|p| p.id.as_str()) != Some(player_id) {
            warn!(
                session_id = %self.id,
                player_id,
                current = ?self.current_player().map(|p| &p.id),
                "Player tried to act out of turn"
            );
            return Err(GameError::NotYourTurn);
        }
        Ok(())
    }

    /// Checks a guess for `word_id`. Returns whether it was correct.
    ///
    /// A hit reveals the word, awards [`POINTS_PER_WORD`] and keeps the turn.
    /// A miss passes the turn to the next player.
    #[instrument(skip(self, guess), fields(session_id = %self.id))]
    pub fn attempt_word(
        &mut self,
        player_id: &str,
        word_id: u32,
        guess: &str,
    ) -> Result<bool, GameError> {
        self.ensure_turn(player_id)?;

        let index = self
            .words
            .iter()
            .position(|w| w.id == word_id)
            .ok_or(GameError::WordNotFound)?;
        if self.words[index].is_found() {
            return Err(GameError::WordAlreadyFound);
        }

        if !self.words[index].matches_guess(guess) {
            info!(player_id, word_id, guess, "Wrong guess");
            self.advance_turn();
            return Ok(false);
        }

        let word = &mut self.words[index];
        word.found_by = Some(player_id.to_string());
        self.board.reveal(word);
        if let Some(player) = self.players.iter_mut().find(|p| p.id == player_id) {
            player.score += POINTS_PER_WORD;
        }
        info!(player_id, word_id, "Word found");

        if self.all_found() {
            self.status = GameStatus::Finished;
            self.winner = leader(&self.players).cloned();
            info!(
                winner = ?self.winner.as_ref().map(|p| &p.name),
                "Game finished"
            );
        }

        Ok(true)
    }

    /// Gives the turn to the next player.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn pass_turn(&mut self, player_id: &str) -> Result<(), GameError> {
        self.ensure_turn(player_id)?;
        self.advance_turn();
        debug!(next = self.current_turn_index, "Turn passed");
        Ok(())
    }

    /// Snapshot for clients. Answers stay hidden until found.
    pub fn view(&self) -> GameView {
        let words = self
            .words
            .iter()
            .map(|w| WordView {
                id: w.id,
                number: self
                    .board
                    .cell(w.start_row, w.start_col)
                    .and_then(|cell| cell.number),
                clue: w.clue.clone(),
                direction: w.direction,
                start_row: w.start_row,
                start_col: w.start_col,
                length: w.length,
                word: w.is_found().then(|| w.word.clone()),
                found_by: w.found_by.clone(),
            })
            .collect();

        GameView {
            id: self.id.clone(),
            players: self.players.clone(),
            words,
            grid: self.board.clone(),
            current_turn_index: self.current_turn_index,
            current_player_id: self.current_player().map(|p| p.id.clone()),
            status: self.status,
            winner: self.winner.clone(),
            creator_id: self.creator_id.clone(),
            word_count: self.word_count,
        }
    }
}

/// Grid shown while the session waits for its crossword.
fn blank_grid(size: usize) -> NumberedGrid {
    NumberedGrid::from_rows(vec![vec![GridCell::default(); size]; size])
}

/// Highest score, earliest player on ties.
fn leader(players: &[Player]) -> Option<&Player> {
    players.iter().fold(None, |best, player| match best {
        Some(best) if best.score >= player.score => Some(best),
        _ => Some(player),
    })
}

/// Renumbers the grid row-major: each open cell where a word starts gets the
/// next number. Any previous numbering is discarded.
pub fn number_spatially(grid: &mut NumberedGrid, words: &[CrosswordWord]) {
    grid.clear_numbers();
    let size = grid.size();
    let mut next = 1;
    for row in 0..size {
        for col in 0..size {
            let Some(cell) = grid.cell_mut(row, col) else {
                continue;
            };
            if cell.is_blocked || !words.iter().any(|w| w.starts_at(row, col)) {
                continue;
            }
            cell.number = Some(next);
            next += 1;
        }
    }
}

/// Client-facing word entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordView {
    /// Placement-order id used when guessing.
    pub id: u32,
    /// Spatial label on the grid.
    pub number: Option<u32>,
    /// Clue text.
    pub clue: String,
    /// Orientation.
    pub direction: Direction,
    /// Row of the first letter.
    pub start_row: usize,
    /// Column of the first letter.
    pub start_col: usize,
    /// Number of letters.
    pub length: usize,
    /// Answer, once found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
    /// Who found it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub found_by: Option<PlayerId>,
}

/// Client-facing session snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    /// Session ID.
    pub id: SessionId,
    /// Players in turn order.
    pub players: Vec<Player>,
    /// Words with hidden answers.
    pub words: Vec<WordView>,
    /// Board with revealed letters only.
    pub grid: NumberedGrid,
    /// Index of the player holding the turn.
    pub current_turn_index: usize,
    /// ID of the player holding the turn.
    pub current_player_id: Option<PlayerId>,
    /// Lifecycle state.
    pub status: GameStatus,
    /// Winner once finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Player>,
    /// Session creator.
    pub creator_id: PlayerId,
    /// Words requested at creation.
    pub word_count: usize,
}

/// Response to creating a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedGame {
    /// New session ID.
    pub game_id: SessionId,
    /// Creator's player ID.
    pub player_id: PlayerId,
    /// Initial snapshot.
    pub game: GameView,
}

/// Response to joining a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedGame {
    /// New player's ID.
    pub player_id: PlayerId,
    /// Snapshot after joining.
    pub game: GameView,
}

/// Response to a guess.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptOutcome {
    /// Whether the guess matched.
    pub correct: bool,
    /// Snapshot after the guess.
    pub game: GameView,
}

/// Manages all game sessions.
///
/// One mutex guards the registry, so every read-validate-mutate sequence on a
/// session runs without interleaving.
#[derive(Debug, Clone)]
pub struct SessionManager {
    sessions: Arc<Mutex<HashMap<SessionId, GameSession>>>,
    rng: Arc<Mutex<StdRng>>,
    generator: Arc<CrosswordGenerator>,
    settings: SessionSettings,
}

impl SessionManager {
    /// Creates a session manager. A seed makes ids and crosswords reproducible.
    #[instrument(skip(generator))]
    pub fn new(
        generator: Arc<CrosswordGenerator>,
        settings: SessionSettings,
        seed: Option<u64>,
    ) -> Self {
        info!("Creating session manager");
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            rng: Arc::new(Mutex::new(rng)),
            generator,
            settings,
        }
    }

    /// Session limits.
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    fn lock_sessions(&self) -> MutexGuard<'_, HashMap<SessionId, GameSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` on a session while holding the registry lock. The session's
    /// activity clock is refreshed when `f` succeeds.
    fn with_session<T>(
        &self,
        game_id: &str,
        f: impl FnOnce(&mut GameSession, &Self) -> Result<T, GameError>,
    ) -> Result<T, GameError> {
        let mut sessions = self.lock_sessions();
        let session = sessions.get_mut(game_id).ok_or_else(|| {
            debug!(session_id = game_id, "Session not found");
            GameError::SessionNotFound
        })?;
        let result = f(session, self)?;
        session.touch();
        Ok(result)
    }

    /// Creates a session with its creator seated.
    #[instrument(skip(self))]
    pub fn create_game(
        &self,
        player_name: &str,
        word_count: Option<usize>,
    ) -> Result<CreatedGame, GameError> {
        let name = validate_name(player_name)?;
        let word_count = word_count.unwrap_or(*self.generator.config().default_word_count());
        let max = self.settings.max_word_count;
        if !(1..=max).contains(&word_count) {
            warn!(word_count, max, "Rejected word count");
            return Err(GameError::InvalidWordCount { max });
        }

        let mut sessions = self.lock_sessions();
        let (game_id, player_id) = {
            let mut rng = self.lock_rng();
            let game_id = unique_code(&mut *rng, |code| sessions.contains_key(code));
            let player_id = random_code(&mut *rng);
            (game_id, player_id)
        };

        let creator = Player::new(player_id.clone(), name);
        let grid_size = *self.generator.config().grid_size();
        let session = GameSession::new(game_id.clone(), creator, word_count, grid_size);
        let game = session.view();
        sessions.insert(game_id.clone(), session);

        info!(session_id = %game_id, player_id = %player_id, word_count, "Created new session");
        Ok(CreatedGame {
            game_id,
            player_id,
            game,
        })
    }

    /// Seats a new player in a waiting session.
    #[instrument(skip(self))]
    pub fn join_game(&self, game_id: &str, player_name: &str) -> Result<JoinedGame, GameError> {
        let name = validate_name(player_name)?;
        self.with_session(game_id, |session, manager| {
            let player_id = unique_code(&mut *manager.lock_rng(), |code| {
                session.player(code).is_some()
            });
            session.add_player(
                Player::new(player_id.clone(), name),
                manager.settings.max_players,
            )?;
            Ok(JoinedGame {
                player_id,
                game: session.view(),
            })
        })
    }

    /// Flips a player's ready flag.
    #[instrument(skip(self))]
    pub fn toggle_ready(&self, game_id: &str, player_id: &str) -> Result<GameView, GameError> {
        self.with_session(game_id, |session, _| {
            session.toggle_ready(player_id)?;
            Ok(session.view())
        })
    }

    /// Generates the crossword and starts play. Creator only, exactly once.
    #[instrument(skip(self))]
    pub fn start_game(&self, game_id: &str, player_id: &str) -> Result<GameView, GameError> {
        self.with_session(game_id, |session, manager| {
            session.ensure_can_start(player_id)?;

            info!(word_count = session.word_count, "Generating crossword");
            let crossword = manager
                .generator
                .generate(session.word_count, &mut *manager.lock_rng())?;

            session.begin(crossword);
            info!(words = session.words.len(), "Game started with crossword");
            Ok(session.view())
        })
    }

    /// Submits a guess for the player holding the turn.
    #[instrument(skip(self, attempt))]
    pub fn attempt_word(
        &self,
        game_id: &str,
        player_id: &str,
        word_id: u32,
        attempt: &str,
    ) -> Result<AttemptOutcome, GameError> {
        self.with_session(game_id, |session, _| {
            let correct = session.attempt_word(player_id, word_id, attempt)?;
            Ok(AttemptOutcome {
                correct,
                game: session.view(),
            })
        })
    }

    /// Passes the turn.
    #[instrument(skip(self))]
    pub fn pass_turn(&self, game_id: &str, player_id: &str) -> Result<GameView, GameError> {
        self.with_session(game_id, |session, _| {
            session.pass_turn(player_id)?;
            Ok(session.view())
        })
    }

    /// Client snapshot of a session. Polling counts as activity, so a
    /// watched session is never evicted as idle.
    #[instrument(skip(self))]
    pub fn get_game(&self, game_id: &str) -> Result<GameView, GameError> {
        self.with_session(game_id, |session, _| Ok(session.view()))
    }

    /// Full copy of a session, answers included.
    #[instrument(skip(self))]
    pub fn get_session(&self, game_id: &str) -> Option<GameSession> {
        let session = self.lock_sessions().get(game_id).cloned();
        if session.is_none() {
            debug!(session_id = game_id, "Session not found");
        }
        session
    }

    /// Lists all active session IDs.
    #[instrument(skip(self))]
    pub fn list_sessions(&self) -> Vec<SessionId> {
        let ids: Vec<_> = self.lock_sessions().keys().cloned().collect();
        debug!(count = ids.len(), "Listed sessions");
        ids
    }

    /// Drops sessions idle for at least `max_idle`. Returns how many went.
    #[instrument(skip(self))]
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.lock_sessions();
        let before = sessions.len();
        sessions.retain(|_, session| session.last_activity.elapsed() < max_idle);
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(evicted, remaining = sessions.len(), "Evicted idle sessions");
        }
        evicted
    }
}

fn validate_name(name: &str) -> Result<String, GameError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(GameError::InvalidPlayerName);
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str, score: u32) -> Player {
        Player {
            id: id.to_string(),
            name: id.to_string(),
            score,
            is_ready: false,
        }
    }

    #[test]
    fn test_codes_use_alphabet() {
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..100 {
            let code = random_code(&mut rng);
            assert_eq!(code.len(), 4);
            assert!(code.bytes().all(|b| ID_ALPHABET.contains(&b)));
            assert!(!code.contains('I') && !code.contains('O'));
        }
    }

    #[test]
    fn test_unique_code_skips_taken() {
        let mut rng = StdRng::seed_from_u64(1);
        let first = random_code(&mut StdRng::seed_from_u64(1));
        let code = unique_code(&mut rng, |c| c == first);
        assert_ne!(code, first);
    }

    #[test]
    fn test_leader_prefers_earlier_on_tie() {
        let players = [player("A", 10), player("B", 20), player("C", 20)];
        assert_eq!(leader(&players).unwrap().id, "B");
        assert!(leader(&[]).is_none());
    }

    #[test]
    fn test_spatial_numbering_is_row_major() {
        let mut grid = blank_grid(5);
        if let Some(cell) = grid.cell_mut(0, 0) {
            cell.is_blocked = true;
        }
        let word = |id, row, col| CrosswordWord {
            id,
            word: "ab".to_string(),
            clue: String::new(),
            direction: Direction::Horizontal,
            start_row: row,
            start_col: col,
            length: 2,
            found_by: None,
        };
        // Placement ids out of spatial order; the blocked start is skipped.
        let words = [word(1, 3, 1), word(2, 0, 4), word(3, 0, 0)];
        number_spatially(&mut grid, &words);
        assert_eq!(grid.cell(0, 4).unwrap().number, Some(1));
        assert_eq!(grid.cell(3, 1).unwrap().number, Some(2));
        assert_eq!(grid.cell(0, 0).unwrap().number, None);
    }
}
