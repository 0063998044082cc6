//! Board state: the `Position` value, moves, undo records, and the FEN
//! codec.
//!
//! A `Position` is one board state plus side to move, castling rights,
//! en-passant target and the halfmove/fullmove counters. It is only ever
//! mutated through a move's application and its exact inverse: `make_move`
//! returns the `UndoRecord` that `unmake_move` consumes, and the public
//! `apply` validates against the legal move list first.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::ChessError;
use crate::move_generator::MoveGenerator;
use crate::types::{parse_square, square_name, Color, Piece, PieceKind};

/// FEN of the standard initial layout.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

// Rook home squares, used for castling-rights bookkeeping.
const A1: usize = 0;
const H1: usize = 7;
const A8: usize = 56;
const H8: usize = 63;

/// The four independent castling permissions, packed into one byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const WHITE_KING_SIDE: u8 = 1;
    pub const WHITE_QUEEN_SIDE: u8 = 2;
    pub const BLACK_KING_SIDE: u8 = 4;
    pub const BLACK_QUEEN_SIDE: u8 = 8;

    pub fn none() -> Self {
        CastlingRights(0)
    }

    pub fn all() -> Self {
        CastlingRights(0b1111)
    }

    #[inline]
    pub fn has(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    #[inline]
    pub fn king_side(self, color: Color) -> bool {
        match color {
            Color::White => self.has(Self::WHITE_KING_SIDE),
            Color::Black => self.has(Self::BLACK_KING_SIDE),
        }
    }

    #[inline]
    pub fn queen_side(self, color: Color) -> bool {
        match color {
            Color::White => self.has(Self::WHITE_QUEEN_SIDE),
            Color::Black => self.has(Self::BLACK_QUEEN_SIDE),
        }
    }

    #[inline]
    fn grant(&mut self, flag: u8) {
        self.0 |= flag;
    }

    #[inline]
    fn revoke(&mut self, flags: u8) {
        self.0 &= !flags;
    }

    fn revoke_all(&mut self, color: Color) {
        match color {
            Color::White => self.revoke(Self::WHITE_KING_SIDE | Self::WHITE_QUEEN_SIDE),
            Color::Black => self.revoke(Self::BLACK_KING_SIDE | Self::BLACK_QUEEN_SIDE),
        }
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        if self.has(Self::WHITE_KING_SIDE) {
            write!(f, "K")?;
        }
        if self.has(Self::WHITE_QUEEN_SIDE) {
            write!(f, "Q")?;
        }
        if self.has(Self::BLACK_KING_SIDE) {
            write!(f, "k")?;
        }
        if self.has(Self::BLACK_QUEEN_SIDE) {
            write!(f, "q")?;
        }
        Ok(())
    }
}

/// What a move does, beyond moving a piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Normal,
    Capture,
    EnPassant,
    CastleKingSide,
    CastleQueenSide,
    DoublePawnPush,
}

/// A move, meaningful only for the position it was generated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: usize,
    pub to: usize,
    pub kind: MoveKind,
    pub promotion: Option<PieceKind>,
}

impl Move {
    pub fn new(from: usize, to: usize, kind: MoveKind) -> Self {
        Move {
            from,
            to,
            kind,
            promotion: None,
        }
    }

    pub fn with_promotion(from: usize, to: usize, kind: MoveKind, promotion: PieceKind) -> Self {
        Move {
            from,
            to,
            kind,
            promotion: Some(promotion),
        }
    }

    pub fn is_capture(&self) -> bool {
        matches!(self.kind, MoveKind::Capture | MoveKind::EnPassant)
    }
}

impl fmt::Display for Move {
    /// Coordinate notation: "e2e4", "e7e8q".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", square_name(self.from), square_name(self.to))?;
        if let Some(kind) = self.promotion {
            let c = match kind {
                PieceKind::Queen => 'q',
                PieceKind::Rook => 'r',
                PieceKind::Bishop => 'b',
                PieceKind::Knight => 'n',
                _ => '?',
            };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

/// Everything needed to invert one move without recomputation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UndoRecord {
    pub captured: Option<Piece>,
    pub castling: CastlingRights,
    pub en_passant: Option<usize>,
    pub halfmove_clock: u16,
}

/// One board state plus side to move and rights.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    pieces: [Option<Piece>; 64],
    pub side_to_move: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<usize>,
    pub halfmove_clock: u16,
    pub fullmove_number: u16,
}

impl Position {
    /// The standard initial layout.
    pub fn start() -> Self {
        Position::from_fen(STARTING_FEN).expect("starting FEN is well formed")
    }

    /// An empty board, white to move. Building block for the FEN parser
    /// and for hand-constructed test positions.
    pub fn empty() -> Self {
        Position {
            pieces: [None; 64],
            side_to_move: Color::White,
            castling: CastlingRights::none(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    #[inline]
    pub fn piece_at(&self, sq: usize) -> Option<Piece> {
        self.pieces[sq]
    }

    pub fn set_piece(&mut self, sq: usize, piece: Piece) {
        self.pieces[sq] = Some(piece);
    }

    /// The square of the given side's king, if present.
    pub fn king_square(&self, color: Color) -> Option<usize> {
        let king = Piece::new(color, PieceKind::King);
        (0..64).find(|&sq| self.pieces[sq] == Some(king))
    }

    // ------------------------------------------------------------------
    // FEN
    // ------------------------------------------------------------------

    /// Parse a FEN string into a position.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let bad = |msg: &str| ChessError::InvalidFen(format!("{} in {:?}", msg, fen));

        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 2 {
            return Err(bad("expected at least placement and side fields"));
        }

        let mut position = Position::empty();

        let ranks: Vec<&str> = parts[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(bad("expected 8 ranks"));
        }
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                } else if let Some(piece) = Piece::from_fen_char(c) {
                    if file >= 8 {
                        return Err(bad("rank overflows 8 files"));
                    }
                    position.pieces[rank * 8 + file] = Some(piece);
                    file += 1;
                } else {
                    return Err(bad("unknown piece character"));
                }
            }
            if file != 8 {
                return Err(bad("rank does not cover 8 files"));
            }
        }

        position.side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(bad("side to move must be 'w' or 'b'")),
        };

        if parts.len() > 2 && parts[2] != "-" {
            for c in parts[2].chars() {
                match c {
                    'K' => position.castling.grant(CastlingRights::WHITE_KING_SIDE),
                    'Q' => position.castling.grant(CastlingRights::WHITE_QUEEN_SIDE),
                    'k' => position.castling.grant(CastlingRights::BLACK_KING_SIDE),
                    'q' => position.castling.grant(CastlingRights::BLACK_QUEEN_SIDE),
                    _ => return Err(bad("unknown castling flag")),
                }
            }
        }

        if parts.len() > 3 && parts[3] != "-" {
            position.en_passant =
                Some(parse_square(parts[3]).ok_or_else(|| bad("bad en-passant square"))?);
        }

        if parts.len() > 4 {
            position.halfmove_clock = parts[4]
                .parse()
                .map_err(|_| bad("bad halfmove clock"))?;
        }
        if parts.len() > 5 {
            position.fullmove_number = parts[5]
                .parse()
                .map_err(|_| bad("bad fullmove number"))?;
        }

        Ok(position)
    }

    /// Render the position as a FEN string.
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();

        for rank in (0..8).rev() {
            let mut empty_run = 0;
            for file in 0..8 {
                match self.pieces[rank * 8 + file] {
                    None => empty_run += 1,
                    Some(piece) => {
                        if empty_run > 0 {
                            fen.push_str(&empty_run.to_string());
                            empty_run = 0;
                        }
                        fen.push(piece.to_fen_char());
                    }
                }
            }
            if empty_run > 0 {
                fen.push_str(&empty_run.to_string());
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        fen.push_str(&format!(" {}", self.castling));

        fen.push(' ');
        match self.en_passant {
            Some(sq) => fen.push_str(&square_name(sq)),
            None => fen.push('-'),
        }

        fen.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));

        fen
    }

    // ------------------------------------------------------------------
    // Move application
    // ------------------------------------------------------------------

    /// Apply a caller-supplied move after validating it against the legal
    /// move list. The matching generated move is the one executed, so a
    /// mistagged kind on the input cannot corrupt state. On failure the
    /// position is untouched.
    pub fn apply(&mut self, mv: Move) -> Result<UndoRecord, ChessError> {
        let generator = MoveGenerator::new();
        let canonical = generator
            .legal_moves(self)
            .into_iter()
            .find(|m| m.from == mv.from && m.to == mv.to && m.promotion == mv.promotion)
            .ok_or(ChessError::IllegalMove(mv))?;
        Ok(self.make_move(canonical))
    }

    /// Exact inverse of `apply` for the same move and record.
    pub fn undo_move(&mut self, mv: Move, undo: &UndoRecord) {
        self.unmake_move(mv, undo);
    }

    /// Execute a generated move without a legality check. Callers inside
    /// the crate pair this with `unmake_move`; the pair is transactional
    /// and never observable mid-flight.
    pub(crate) fn make_move(&mut self, mv: Move) -> UndoRecord {
        let piece = self.pieces[mv.from].expect("move from an empty square");
        let mover = piece.color;

        let captured = match mv.kind {
            MoveKind::EnPassant => Some(Piece::new(mover.opposite(), PieceKind::Pawn)),
            _ => self.pieces[mv.to],
        };

        let undo = UndoRecord {
            captured,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
        };

        if piece.kind == PieceKind::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        if mv.kind == MoveKind::EnPassant {
            let behind = (mv.to as i32 - 8 * mover.forward()) as usize;
            self.pieces[behind] = None;
        }

        // Castling relocates the rook as well.
        match (mover, mv.kind) {
            (Color::White, MoveKind::CastleKingSide) => self.shift_rook(H1, 5),
            (Color::White, MoveKind::CastleQueenSide) => self.shift_rook(A1, 3),
            (Color::Black, MoveKind::CastleKingSide) => self.shift_rook(H8, 61),
            (Color::Black, MoveKind::CastleQueenSide) => self.shift_rook(A8, 59),
            _ => {}
        }

        self.pieces[mv.to] = Some(match mv.promotion {
            Some(kind) => Piece::new(mover, kind),
            None => piece,
        });
        self.pieces[mv.from] = None;

        if piece.kind == PieceKind::King {
            self.castling.revoke_all(mover);
        }
        // A rook moving off, or anything landing on, a rook home square
        // kills the matching right.
        for sq in [mv.from, mv.to] {
            match sq {
                A1 => self.castling.revoke(CastlingRights::WHITE_QUEEN_SIDE),
                H1 => self.castling.revoke(CastlingRights::WHITE_KING_SIDE),
                A8 => self.castling.revoke(CastlingRights::BLACK_QUEEN_SIDE),
                H8 => self.castling.revoke(CastlingRights::BLACK_KING_SIDE),
                _ => {}
            }
        }

        self.en_passant = match mv.kind {
            MoveKind::DoublePawnPush => Some((mv.from + mv.to) / 2),
            _ => None,
        };

        if mover == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = mover.opposite();

        undo
    }

    /// Invert `make_move`.
    pub(crate) fn unmake_move(&mut self, mv: Move, undo: &UndoRecord) {
        self.side_to_move = self.side_to_move.opposite();
        let mover = self.side_to_move;

        let moved = match mv.promotion {
            Some(_) => Piece::new(mover, PieceKind::Pawn),
            None => self.pieces[mv.to].expect("undo with empty destination"),
        };
        self.pieces[mv.from] = Some(moved);

        if mv.kind == MoveKind::EnPassant {
            self.pieces[mv.to] = None;
            let behind = (mv.to as i32 - 8 * mover.forward()) as usize;
            self.pieces[behind] = undo.captured;
        } else {
            self.pieces[mv.to] = undo.captured;
        }

        match (mover, mv.kind) {
            (Color::White, MoveKind::CastleKingSide) => self.shift_rook(5, H1),
            (Color::White, MoveKind::CastleQueenSide) => self.shift_rook(3, A1),
            (Color::Black, MoveKind::CastleKingSide) => self.shift_rook(61, H8),
            (Color::Black, MoveKind::CastleQueenSide) => self.shift_rook(59, A8),
            _ => {}
        }

        self.castling = undo.castling;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        if mover == Color::Black {
            self.fullmove_number -= 1;
        }
    }

    fn shift_rook(&mut self, from: usize, to: usize) {
        self.pieces[to] = self.pieces[from].take();
    }

    // ------------------------------------------------------------------
    // Draw predicates and the repetition hook
    // ------------------------------------------------------------------

    /// Fifty-move rule: 100 halfmoves without a pawn move or capture.
    pub fn is_fifty_moves(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Neither side can mate: bare kings, a lone minor piece, or
    /// opposite-colored lone bishops on same-colored squares.
    pub fn has_insufficient_material(&self) -> bool {
        let mut pieces: Vec<(Piece, usize)> = Vec::new();
        for sq in 0..64 {
            if let Some(piece) = self.pieces[sq] {
                pieces.push((piece, sq));
            }
        }

        match pieces.len() {
            2 => true,
            3 => pieces.iter().any(|(p, _)| {
                matches!(p.kind, PieceKind::Knight | PieceKind::Bishop)
            }),
            4 => {
                let bishops: Vec<(Color, usize)> = pieces
                    .iter()
                    .filter(|(p, _)| p.kind == PieceKind::Bishop)
                    .map(|(p, sq)| (p.color, *sq))
                    .collect();
                if let [(c1, sq1), (c2, sq2)] = bishops[..] {
                    let shade = |sq: usize| (sq / 8 + sq % 8) % 2;
                    c1 != c2 && shade(sq1) == shade(sq2)
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    /// Repetition key: placement, side to move, castling rights and
    /// en-passant target. Clocks are excluded so repeated positions hash
    /// equal. The session layer owns the key history and the threefold
    /// verdict.
    pub fn repetition_key(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.pieces.hash(&mut hasher);
        self.side_to_move.hash(&mut hasher);
        self.castling.hash(&mut hasher);
        self.en_passant.hash(&mut hasher);
        hasher.finish()
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  +---+---+---+---+---+---+---+---+")?;
        for rank in (0..8).rev() {
            write!(f, "{} |", rank + 1)?;
            for file in 0..8 {
                match self.pieces[rank * 8 + file] {
                    Some(piece) => write!(f, " {} |", piece.to_fen_char())?,
                    None => write!(f, "   |")?,
                }
            }
            writeln!(f)?;
            writeln!(f, "  +---+---+---+---+---+---+---+---+")?;
        }
        write!(f, "    a   b   c   d   e   f   g   h")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::parse_square;

    fn sq(name: &str) -> usize {
        parse_square(name).unwrap()
    }

    #[test]
    fn starting_fen_round_trips() {
        let position = Position::start();
        assert_eq!(position.to_fen(), STARTING_FEN);
        assert_eq!(position.side_to_move, Color::White);
        assert_eq!(position.castling, CastlingRights::all());
        assert_eq!(position.en_passant, None);
        assert_eq!(position.fullmove_number, 1);
    }

    #[test]
    fn complex_fen_round_trips() {
        // Kiwipete, plus an en-passant variant.
        let fens = [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 2",
            "8/8/8/8/8/8/8/K6k w - - 42 90",
        ];
        for fen in fens {
            assert_eq!(Position::from_fen(fen).unwrap().to_fen(), fen);
        }
    }

    #[test]
    fn bad_fens_are_rejected() {
        for fen in [
            "",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1",
            "rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNZ w KQkq - 0 1",
        ] {
            assert!(Position::from_fen(fen).is_err(), "accepted {:?}", fen);
        }
    }

    #[test]
    fn double_push_round_trips() {
        let mut position = Position::start();
        let original = position.clone();
        let mv = Move::new(sq("e2"), sq("e4"), MoveKind::DoublePawnPush);

        let undo = position.apply(mv).unwrap();
        assert_eq!(position.en_passant, Some(sq("e3")));
        assert_eq!(position.side_to_move, Color::Black);
        assert_eq!(position.halfmove_clock, 0);

        position.undo_move(mv, &undo);
        assert_eq!(position, original);
    }

    #[test]
    fn capture_round_trips() {
        let fen = "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2";
        let mut position = Position::from_fen(fen).unwrap();
        let original = position.clone();
        let mv = Move::new(sq("e4"), sq("d5"), MoveKind::Capture);

        let undo = position.apply(mv).unwrap();
        assert_eq!(
            position.piece_at(sq("d5")),
            Some(Piece::new(Color::White, PieceKind::Pawn))
        );
        position.undo_move(mv, &undo);
        assert_eq!(position, original);
    }

    #[test]
    fn en_passant_round_trips() {
        let fen = "rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 2";
        let mut position = Position::from_fen(fen).unwrap();
        let original = position.clone();
        let mv = Move::new(sq("d4"), sq("e3"), MoveKind::EnPassant);

        let undo = position.apply(mv).unwrap();
        assert_eq!(position.piece_at(sq("e4")), None, "captured pawn removed");
        assert_eq!(
            position.piece_at(sq("e3")),
            Some(Piece::new(Color::Black, PieceKind::Pawn))
        );
        position.undo_move(mv, &undo);
        assert_eq!(position, original);
    }

    #[test]
    fn castling_round_trips_and_updates_rights() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        let mut position = Position::from_fen(fen).unwrap();
        let original = position.clone();
        let mv = Move::new(sq("e1"), sq("g1"), MoveKind::CastleKingSide);

        let undo = position.apply(mv).unwrap();
        assert_eq!(
            position.piece_at(sq("f1")),
            Some(Piece::new(Color::White, PieceKind::Rook))
        );
        assert_eq!(
            position.piece_at(sq("g1")),
            Some(Piece::new(Color::White, PieceKind::King))
        );
        assert!(!position.castling.king_side(Color::White));
        assert!(!position.castling.queen_side(Color::White));
        assert!(position.castling.king_side(Color::Black));

        position.undo_move(mv, &undo);
        assert_eq!(position, original);
    }

    #[test]
    fn promotion_round_trips() {
        let fen = "8/P6k/8/8/8/8/8/K7 w - - 0 1";
        let mut position = Position::from_fen(fen).unwrap();
        let original = position.clone();
        let mv = Move::with_promotion(sq("a7"), sq("a8"), MoveKind::Normal, PieceKind::Queen);

        let undo = position.apply(mv).unwrap();
        assert_eq!(
            position.piece_at(sq("a8")),
            Some(Piece::new(Color::White, PieceKind::Queen))
        );
        position.undo_move(mv, &undo);
        assert_eq!(position, original);
    }

    #[test]
    fn illegal_apply_leaves_position_unchanged() {
        let mut position = Position::start();
        let original = position.clone();
        let mv = Move::new(sq("e2"), sq("e5"), MoveKind::Normal);

        assert_eq!(position.apply(mv), Err(ChessError::IllegalMove(mv)));
        assert_eq!(position, original);
    }

    #[test]
    fn rook_capture_revokes_castling_right() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        let mut position = Position::from_fen(fen).unwrap();
        // Ra1xa8 removes black's queen-side right along with white's.
        let mv = Move::new(sq("a1"), sq("a8"), MoveKind::Capture);
        position.apply(mv).unwrap();
        assert!(!position.castling.queen_side(Color::White));
        assert!(!position.castling.queen_side(Color::Black));
        assert!(position.castling.king_side(Color::Black));
    }

    #[test]
    fn insufficient_material_cases() {
        let insufficient = [
            "8/8/8/8/8/8/8/K6k w - - 0 1",
            "8/8/8/8/8/2n5/8/K6k w - - 0 1",
            "8/8/8/8/8/2B5/8/K6k w - - 0 1",
            // Opposite-colored lone bishops on same-shade squares.
            "8/8/8/3b4/8/1B6/8/K6k w - - 0 1",
        ];
        for fen in insufficient {
            assert!(
                Position::from_fen(fen).unwrap().has_insufficient_material(),
                "{} should be insufficient",
                fen
            );
        }

        let sufficient = [
            STARTING_FEN,
            "8/8/8/8/8/2R5/8/K6k w - - 0 1",
            "8/8/8/8/8/1BB5/8/K6k w - - 0 1",
        ];
        for fen in sufficient {
            assert!(
                !Position::from_fen(fen).unwrap().has_insufficient_material(),
                "{} should be sufficient",
                fen
            );
        }
    }

    #[test]
    fn repetition_key_tracks_side_and_rights() {
        let a = Position::from_fen("8/8/8/8/8/8/8/K6k w - - 0 1").unwrap();
        let b = Position::from_fen("8/8/8/8/8/8/8/K6k b - - 0 1").unwrap();
        let a_again = Position::from_fen("8/8/8/8/8/8/8/K6k w - - 57 99").unwrap();
        assert_ne!(a.repetition_key(), b.repetition_key());
        assert_eq!(a.repetition_key(), a_again.repetition_key(), "clocks excluded");
    }
}
