//! Game session: the sole owner of the authoritative position.
//!
//! All mutation goes through `play`/`undo`; searches run on a worker
//! thread against a value snapshot of the position, so the worker shares
//! nothing mutable with the session except the stop flag and the one-shot
//! result channel. At most one search is ever in flight: the session
//! joins its worker before a search request returns, which also makes it
//! impossible for `play` or `undo` to overlap a live search on the
//! owning thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::bounded;
use tracing::{debug, info, trace};

use crate::book::OpeningBook;
use crate::error::ChessError;
use crate::move_generator::MoveGenerator;
use crate::position::{Move, Position, UndoRecord};
use crate::search::{SearchResult, Searcher};
use crate::skill::SkillConfig;

/// Session state machine. `NotStarted` promotes to `InProgress` on the
/// first move; terminal states accept only undo or a reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    NotStarted,
    InProgress,
    Checkmate,
    Stalemate,
    Drawn,
}

/// Classification of the current position, as returned by `play`,
/// `undo`, and `status`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Check,
    Checkmate,
    Stalemate,
    DrawnByFiftyMoves,
    DrawnByRepetition,
    DrawnByInsufficientMaterial,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::InProgress | GameStatus::Check)
    }
}

/// Cloneable handle that interrupts the session's in-flight search from
/// any thread. Cancelling with nothing outstanding is a no-op.
#[derive(Clone)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One game: position, move history, and search dispatch.
pub struct GameSession {
    position: Position,
    history: Vec<(Move, UndoRecord)>,
    repetition_keys: Vec<u64>,
    state: GameState,
    generator: MoveGenerator,
    book: Option<Box<dyn OpeningBook>>,
    stop: Arc<AtomicBool>,
}

impl GameSession {
    /// A fresh game from the standard initial layout.
    pub fn new() -> Self {
        GameSession::from_position(Position::start())
    }

    /// A fresh game from an arbitrary starting position.
    pub fn from_position(position: Position) -> Self {
        let repetition_keys = vec![position.repetition_key()];
        GameSession {
            position,
            history: Vec::new(),
            repetition_keys,
            state: GameState::NotStarted,
            generator: MoveGenerator::new(),
            book: None,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Discard the game and start over from the standard layout. Valid
    /// in every state, including terminal ones.
    pub fn reset(&mut self) {
        self.reset_to(Position::start());
    }

    /// Discard the game and start over from the given position.
    pub fn reset_to(&mut self, position: Position) {
        self.cancel_search();
        self.repetition_keys = vec![position.repetition_key()];
        self.position = position;
        self.history.clear();
        self.state = GameState::NotStarted;
        info!("new game started");
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn moves_played(&self) -> usize {
        self.history.len()
    }

    /// Classification of the current position.
    pub fn status(&self) -> GameStatus {
        self.classify()
    }

    /// All legal moves in the current position.
    pub fn legal_moves(&self) -> Vec<Move> {
        self.generator.legal_moves(&self.position)
    }

    /// Install an opening book consulted before every search request.
    pub fn set_book<B: OpeningBook + 'static>(&mut self, book: B) {
        self.book = Some(Box::new(book));
    }

    /// Interrupt the in-flight search, if any. Idempotent; a no-op when
    /// nothing is outstanding.
    pub fn cancel_search(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// A handle other threads can use to interrupt this session's
    /// searches.
    pub fn cancel_token(&self) -> CancelToken {
        CancelToken(Arc::clone(&self.stop))
    }

    /// Play a move for the side to move. On success the move is pushed
    /// onto the history stack and the post-move status is returned; on
    /// failure position and history are untouched.
    pub fn play(&mut self, mv: Move) -> Result<GameStatus, ChessError> {
        self.ensure_active()?;

        let undo = self.position.apply(mv)?;
        self.history.push((mv, undo));
        self.repetition_keys.push(self.position.repetition_key());

        let status = self.classify();
        self.state = state_after(status);
        if status.is_terminal() {
            info!("game over after {}: {:?}", mv, status);
        }
        Ok(status)
    }

    /// Revert the most recent move. Stepping back out of a terminal
    /// state is legal and returns the game to `InProgress`.
    pub fn undo(&mut self) -> Result<GameStatus, ChessError> {
        let (mv, undo) = self.history.pop().ok_or(ChessError::EmptyHistory)?;
        self.position.unmake_move(mv, &undo);
        self.repetition_keys.pop();

        let status = self.classify();
        self.state = state_after(status);
        Ok(status)
    }

    /// Search the current position and play the chosen move. `None`
    /// means the position has no legal moves; consult `status` to tell
    /// checkmate from stalemate.
    pub fn request_computer_move(
        &mut self,
        config: &SkillConfig,
    ) -> Result<Option<Move>, ChessError> {
        self.ensure_active()?;

        if let Some(mv) = self.probe_book() {
            self.play(mv)?;
            return Ok(Some(mv));
        }

        let result = self.run_search(config);
        match result.best_move {
            Some(mv) => {
                self.play(mv)?;
                Ok(Some(mv))
            }
            None => Ok(None),
        }
    }

    /// Search the current position without playing anything. Pure query.
    pub fn hint(&mut self, config: &SkillConfig) -> Result<Option<Move>, ChessError> {
        self.ensure_active()?;

        if let Some(mv) = self.probe_book() {
            return Ok(Some(mv));
        }
        Ok(self.run_search(config).best_move)
    }

    fn ensure_active(&self) -> Result<(), ChessError> {
        match self.state {
            GameState::Checkmate | GameState::Stalemate | GameState::Drawn => {
                Err(ChessError::GameOver)
            }
            GameState::NotStarted | GameState::InProgress => Ok(()),
        }
    }

    /// Hand a snapshot to a worker thread and wait for its result. The
    /// bounded(1) channel is the single-writer/single-reader handoff;
    /// joining here is what keeps at most one search in flight per
    /// session.
    fn run_search(&self, config: &SkillConfig) -> SearchResult {
        self.stop.store(false, Ordering::SeqCst);

        let snapshot = self.position.clone();
        let worker_config = config.clone();
        let stop = Arc::clone(&self.stop);
        let (tx, rx) = bounded(1);

        debug!(
            "search requested: level {} depth {}",
            config.level(),
            config.max_depth()
        );
        let worker = thread::spawn(move || {
            let mut searcher = Searcher::new(stop);
            let result = searcher.search(&snapshot, &worker_config);
            let _ = tx.send(result);
        });

        match rx.recv() {
            Ok(result) => {
                let _ = worker.join();
                debug!(
                    "search finished: depth {} nodes {} best {:?}",
                    result.depth,
                    result.nodes,
                    result.best_move.map(|m| m.to_string())
                );
                result
            }
            // The worker can only disconnect by panicking; surface that
            // panic instead of inventing a move.
            Err(_) => match worker.join() {
                Err(panic) => std::panic::resume_unwind(panic),
                Ok(()) => unreachable!("search worker exited without a result"),
            },
        }
    }

    /// A book hit is only used after validating it against the legal
    /// move list.
    fn probe_book(&self) -> Option<Move> {
        let book = self.book.as_ref()?;
        let hit = book.probe(&self.position)?;
        let canonical = self
            .generator
            .legal_moves(&self.position)
            .into_iter()
            .find(|m| m.from == hit.from && m.to == hit.to && m.promotion == hit.promotion);
        match canonical {
            Some(mv) => {
                trace!("book move {}", mv);
                Some(mv)
            }
            None => {
                trace!("book move {} is not legal here, ignored", hit);
                None
            }
        }
    }

    fn classify(&self) -> GameStatus {
        let in_check = self.generator.is_in_check(&self.position);
        if self.generator.legal_moves(&self.position).is_empty() {
            return if in_check {
                GameStatus::Checkmate
            } else {
                GameStatus::Stalemate
            };
        }
        if self.position.is_fifty_moves() {
            return GameStatus::DrawnByFiftyMoves;
        }
        if self.repetition_count() >= 3 {
            return GameStatus::DrawnByRepetition;
        }
        if self.position.has_insufficient_material() {
            return GameStatus::DrawnByInsufficientMaterial;
        }
        if in_check {
            GameStatus::Check
        } else {
            GameStatus::InProgress
        }
    }

    fn repetition_count(&self) -> usize {
        match self.repetition_keys.last() {
            Some(&current) => self
                .repetition_keys
                .iter()
                .filter(|&&key| key == current)
                .count(),
            None => 0,
        }
    }
}

impl Default for GameSession {
    fn default() -> Self {
        GameSession::new()
    }
}

fn state_after(status: GameStatus) -> GameState {
    match status {
        GameStatus::InProgress | GameStatus::Check => GameState::InProgress,
        GameStatus::Checkmate => GameState::Checkmate,
        GameStatus::Stalemate => GameState::Stalemate,
        GameStatus::DrawnByFiftyMoves
        | GameStatus::DrawnByRepetition
        | GameStatus::DrawnByInsufficientMaterial => GameState::Drawn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::LineBook;
    use crate::position::{MoveKind, STARTING_FEN};
    use crate::types::parse_square;
    use std::time::{Duration, Instant};

    fn play(session: &mut GameSession, mv: &str) -> GameStatus {
        let found = session
            .legal_moves()
            .into_iter()
            .find(|m| m.to_string() == mv)
            .unwrap_or_else(|| panic!("{} is not legal here", mv));
        session.play(found).unwrap()
    }

    #[test]
    fn plays_legal_moves_and_tracks_state() {
        let mut session = GameSession::new();
        assert_eq!(session.state(), GameState::NotStarted);

        assert_eq!(play(&mut session, "e2e4"), GameStatus::InProgress);
        assert_eq!(session.state(), GameState::InProgress);
        assert_eq!(session.moves_played(), 1);
    }

    #[test]
    fn rejects_illegal_moves_without_side_effects() {
        let mut session = GameSession::new();
        let before = session.position().to_fen();
        let bad = Move::new(
            parse_square("e2").unwrap(),
            parse_square("e5").unwrap(),
            MoveKind::Normal,
        );

        assert_eq!(session.play(bad), Err(ChessError::IllegalMove(bad)));
        assert_eq!(session.position().to_fen(), before);
        assert_eq!(session.moves_played(), 0);
        assert_eq!(session.state(), GameState::NotStarted);
    }

    #[test]
    fn undo_on_empty_history_fails() {
        let mut session = GameSession::new();
        assert_eq!(session.undo(), Err(ChessError::EmptyHistory));
    }

    #[test]
    fn checkmate_locks_the_session_until_undo() {
        let mut session = GameSession::new();
        // Scholar's mate.
        play(&mut session, "e2e4");
        play(&mut session, "e7e5");
        play(&mut session, "f1c4");
        play(&mut session, "b8c6");
        play(&mut session, "d1h5");
        play(&mut session, "g8f6");
        assert_eq!(play(&mut session, "h5f7"), GameStatus::Checkmate);
        assert_eq!(session.state(), GameState::Checkmate);

        let any = session.legal_moves();
        assert!(any.is_empty());
        let mv = Move::new(
            parse_square("e8").unwrap(),
            parse_square("f7").unwrap(),
            MoveKind::Capture,
        );
        assert_eq!(session.play(mv), Err(ChessError::GameOver));
        assert_eq!(
            session.request_computer_move(&SkillConfig::from_level(1).unwrap()),
            Err(ChessError::GameOver)
        );

        // Stepping back out of the terminal state resumes the game.
        session.undo().unwrap();
        assert_eq!(session.state(), GameState::InProgress);
    }

    #[test]
    fn undo_after_computer_move_restores_the_position() {
        let mut session = GameSession::new();
        play(&mut session, "e2e4");

        let config = SkillConfig::from_level(1).unwrap();
        let reply = session.request_computer_move(&config).unwrap();
        assert!(reply.is_some());
        assert_eq!(session.moves_played(), 2);

        session.undo().unwrap();
        session.undo().unwrap();
        assert_eq!(session.position().to_fen(), STARTING_FEN);
        assert_eq!(session.state(), GameState::InProgress);
    }

    #[test]
    fn stalemate_surfaces_as_no_move() {
        let position = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let mut session = GameSession::from_position(position);

        assert_eq!(session.status(), GameStatus::Stalemate);
        let config = SkillConfig::from_level(5).unwrap();
        assert_eq!(session.request_computer_move(&config), Ok(None));
        assert_eq!(session.hint(&config), Ok(None));
    }

    #[test]
    fn threefold_repetition_is_drawn() {
        let mut session = GameSession::new();
        for _ in 0..2 {
            play(&mut session, "g1f3");
            play(&mut session, "g8f6");
            play(&mut session, "f3g1");
            let status = play(&mut session, "f6g8");
            if status == GameStatus::DrawnByRepetition {
                assert_eq!(session.state(), GameState::Drawn);
                return;
            }
        }
        panic!("repetition was not detected");
    }

    #[test]
    fn fifty_move_rule_is_drawn() {
        let position = Position::from_fen("4k3/8/8/8/8/8/8/4K2R w - - 99 80").unwrap();
        let mut session = GameSession::from_position(position);
        assert_eq!(play(&mut session, "h1h2"), GameStatus::DrawnByFiftyMoves);
        assert_eq!(session.state(), GameState::Drawn);
    }

    #[test]
    fn book_moves_bypass_the_search() {
        let mut book = LineBook::new();
        let start = Position::start();
        let e4 = Move::new(
            parse_square("e2").unwrap(),
            parse_square("e4").unwrap(),
            MoveKind::DoublePawnPush,
        );
        book.insert(&start, e4);

        let mut session = GameSession::new();
        session.set_book(book);

        let config = SkillConfig::from_level(10).unwrap();
        let chosen = session.request_computer_move(&config).unwrap();
        assert_eq!(chosen, Some(e4));
        assert_eq!(session.moves_played(), 1);
    }

    #[test]
    fn hint_never_mutates() {
        let mut session = GameSession::new();
        let before = session.position().to_fen();

        let config = SkillConfig::from_level(2).unwrap();
        let hint = session.hint(&config).unwrap();
        assert!(hint.is_some());
        assert_eq!(session.position().to_fen(), before);
        assert_eq!(session.moves_played(), 0);
        assert_eq!(session.state(), GameState::NotStarted);
    }

    #[test]
    fn cancel_token_interrupts_a_deep_search() {
        let mut session = GameSession::new();
        let token = session.cancel_token();

        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(100));
            token.cancel();
        });

        let config = SkillConfig::fixed(30, None, 0);
        let started = Instant::now();
        let hint = session.hint(&config).unwrap();
        canceller.join().unwrap();

        assert!(hint.is_some(), "the completed depth-1 result survives");
        assert!(
            started.elapsed() < Duration::from_secs(5),
            "cancellation was not observed"
        );
    }

    #[test]
    fn cancel_with_nothing_outstanding_is_a_no_op() {
        let mut session = GameSession::new();
        session.cancel_search();
        session.cancel_search();

        // The next request still runs: the flag is re-armed per search.
        let config = SkillConfig::from_level(1).unwrap();
        let reply = session.request_computer_move(&config).unwrap();
        assert!(reply.is_some());
    }

    #[test]
    fn reset_clears_history_and_state() {
        let mut session = GameSession::new();
        play(&mut session, "e2e4");
        play(&mut session, "e7e5");

        session.reset();
        assert_eq!(session.position().to_fen(), STARTING_FEN);
        assert_eq!(session.moves_played(), 0);
        assert_eq!(session.state(), GameState::NotStarted);
    }
}
