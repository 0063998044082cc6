//! Legal move generation.
//!
//! Generation is pseudo-legal per piece kind followed by a legality
//! filter: each candidate is applied to a scratch copy, the mover's king
//! is tested against the opponent's attack set, and the move is reverted.
//! The apply/undo pair is strictly local to this module; callers only
//! ever see the finished move list.
//!
//! Movement is expressed as (file, rank) deltas, so board edges fall out
//! of plain range checks instead of index arithmetic.

use crate::position::{Move, MoveKind, Position};
use crate::types::{Color, Piece, PieceKind};

pub(crate) const ROOK_DIRECTIONS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
pub(crate) const BISHOP_DIRECTIONS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
pub(crate) const KING_DIRECTIONS: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];
pub(crate) const KNIGHT_JUMPS: [(i32, i32); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// Step from a square by file/rank deltas; `None` off the board.
#[inline]
pub(crate) fn offset(sq: usize, file_delta: i32, rank_delta: i32) -> Option<usize> {
    let file = (sq % 8) as i32 + file_delta;
    let rank = (sq / 8) as i32 + rank_delta;
    if (0..8).contains(&file) && (0..8).contains(&rank) {
        Some((rank * 8 + file) as usize)
    } else {
        None
    }
}

/// Move generator for chess positions.
#[derive(Default)]
pub struct MoveGenerator;

impl MoveGenerator {
    pub fn new() -> Self {
        MoveGenerator
    }

    /// All strictly legal moves for the side to move.
    pub fn legal_moves(&self, position: &Position) -> Vec<Move> {
        let pseudo = self.pseudo_legal_moves(position);
        let mover = position.side_to_move;

        let mut scratch = position.clone();
        let mut legal = Vec::with_capacity(pseudo.len());
        for mv in pseudo {
            let undo = scratch.make_move(mv);
            let king = scratch
                .king_square(mover)
                .expect("side to move has no king");
            if !self.is_square_attacked(&scratch, king, mover.opposite()) {
                legal.push(mv);
            }
            scratch.unmake_move(mv, &undo);
        }
        legal
    }

    /// Moves obeying piece movement rules, king safety not yet checked.
    pub fn pseudo_legal_moves(&self, position: &Position) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        let mover = position.side_to_move;

        for sq in 0..64 {
            let piece = match position.piece_at(sq) {
                Some(p) if p.color == mover => p,
                _ => continue,
            };
            match piece.kind {
                PieceKind::Pawn => self.pawn_moves(position, sq, piece.color, &mut moves),
                PieceKind::Knight => self.knight_moves(position, sq, piece.color, &mut moves),
                PieceKind::Bishop => {
                    self.sliding_moves(position, sq, piece.color, &BISHOP_DIRECTIONS, &mut moves)
                }
                PieceKind::Rook => {
                    self.sliding_moves(position, sq, piece.color, &ROOK_DIRECTIONS, &mut moves)
                }
                PieceKind::Queen => {
                    self.sliding_moves(position, sq, piece.color, &KING_DIRECTIONS, &mut moves)
                }
                PieceKind::King => self.king_moves(position, sq, piece.color, &mut moves),
            }
        }

        moves
    }

    fn pawn_moves(&self, position: &Position, sq: usize, color: Color, moves: &mut Vec<Move>) {
        let dir = color.forward();
        let start_rank = match color {
            Color::White => 1,
            Color::Black => 6,
        };
        let promo_rank = match color {
            Color::White => 7,
            Color::Black => 0,
        };

        if let Some(one) = offset(sq, 0, dir) {
            if position.piece_at(one).is_none() {
                if one / 8 == promo_rank {
                    for kind in PieceKind::PROMOTIONS {
                        moves.push(Move::with_promotion(sq, one, MoveKind::Normal, kind));
                    }
                } else {
                    moves.push(Move::new(sq, one, MoveKind::Normal));
                    if sq / 8 == start_rank {
                        let two = offset(sq, 0, 2 * dir).expect("double push stays on board");
                        if position.piece_at(two).is_none() {
                            moves.push(Move::new(sq, two, MoveKind::DoublePawnPush));
                        }
                    }
                }
            }
        }

        for file_delta in [-1, 1] {
            let Some(target) = offset(sq, file_delta, dir) else {
                continue;
            };
            match position.piece_at(target) {
                Some(victim) if victim.color != color => {
                    if target / 8 == promo_rank {
                        for kind in PieceKind::PROMOTIONS {
                            moves.push(Move::with_promotion(sq, target, MoveKind::Capture, kind));
                        }
                    } else {
                        moves.push(Move::new(sq, target, MoveKind::Capture));
                    }
                }
                None if position.en_passant == Some(target) => {
                    moves.push(Move::new(sq, target, MoveKind::EnPassant));
                }
                _ => {}
            }
        }
    }

    fn knight_moves(&self, position: &Position, sq: usize, color: Color, moves: &mut Vec<Move>) {
        for (df, dr) in KNIGHT_JUMPS {
            let Some(target) = offset(sq, df, dr) else {
                continue;
            };
            match position.piece_at(target) {
                None => moves.push(Move::new(sq, target, MoveKind::Normal)),
                Some(victim) if victim.color != color => {
                    moves.push(Move::new(sq, target, MoveKind::Capture))
                }
                Some(_) => {}
            }
        }
    }

    fn sliding_moves(
        &self,
        position: &Position,
        sq: usize,
        color: Color,
        directions: &[(i32, i32)],
        moves: &mut Vec<Move>,
    ) {
        for &(df, dr) in directions {
            let mut current = sq;
            while let Some(target) = offset(current, df, dr) {
                match position.piece_at(target) {
                    None => {
                        moves.push(Move::new(sq, target, MoveKind::Normal));
                        current = target;
                    }
                    Some(victim) => {
                        if victim.color != color {
                            moves.push(Move::new(sq, target, MoveKind::Capture));
                        }
                        break;
                    }
                }
            }
        }
    }

    fn king_moves(&self, position: &Position, sq: usize, color: Color, moves: &mut Vec<Move>) {
        for (df, dr) in KING_DIRECTIONS {
            let Some(target) = offset(sq, df, dr) else {
                continue;
            };
            match position.piece_at(target) {
                None => moves.push(Move::new(sq, target, MoveKind::Normal)),
                Some(victim) if victim.color != color => {
                    moves.push(Move::new(sq, target, MoveKind::Capture))
                }
                Some(_) => {}
            }
        }

        // Castling: rights intact, rook at home, path empty, and the king
        // neither starts in, passes through, nor lands in check.
        let home = match color {
            Color::White => 4,
            Color::Black => 60,
        };
        if sq != home {
            return;
        }
        let enemy = color.opposite();
        let rook = Piece::new(color, PieceKind::Rook);

        if position.castling.king_side(color)
            && position.piece_at(home + 3) == Some(rook)
            && position.piece_at(home + 1).is_none()
            && position.piece_at(home + 2).is_none()
            && !self.is_square_attacked(position, home, enemy)
            && !self.is_square_attacked(position, home + 1, enemy)
            && !self.is_square_attacked(position, home + 2, enemy)
        {
            moves.push(Move::new(home, home + 2, MoveKind::CastleKingSide));
        }

        if position.castling.queen_side(color)
            && position.piece_at(home - 4) == Some(rook)
            && position.piece_at(home - 1).is_none()
            && position.piece_at(home - 2).is_none()
            && position.piece_at(home - 3).is_none()
            && !self.is_square_attacked(position, home, enemy)
            && !self.is_square_attacked(position, home - 1, enemy)
            && !self.is_square_attacked(position, home - 2, enemy)
        {
            moves.push(Move::new(home, home - 2, MoveKind::CastleQueenSide));
        }
    }

    /// Whether `by` attacks the given square.
    pub fn is_square_attacked(&self, position: &Position, sq: usize, by: Color) -> bool {
        // Pawns attack diagonally forward, so look one rank backward from
        // the target square.
        for file_delta in [-1, 1] {
            if let Some(from) = offset(sq, file_delta, -by.forward()) {
                if position.piece_at(from) == Some(Piece::new(by, PieceKind::Pawn)) {
                    return true;
                }
            }
        }

        for (df, dr) in KNIGHT_JUMPS {
            if let Some(from) = offset(sq, df, dr) {
                if position.piece_at(from) == Some(Piece::new(by, PieceKind::Knight)) {
                    return true;
                }
            }
        }

        for (df, dr) in KING_DIRECTIONS {
            if let Some(from) = offset(sq, df, dr) {
                if position.piece_at(from) == Some(Piece::new(by, PieceKind::King)) {
                    return true;
                }
            }
        }

        self.sliding_attack(position, sq, by, &ROOK_DIRECTIONS, PieceKind::Rook)
            || self.sliding_attack(position, sq, by, &BISHOP_DIRECTIONS, PieceKind::Bishop)
    }

    fn sliding_attack(
        &self,
        position: &Position,
        sq: usize,
        by: Color,
        directions: &[(i32, i32)],
        slider: PieceKind,
    ) -> bool {
        for &(df, dr) in directions {
            let mut current = sq;
            while let Some(target) = offset(current, df, dr) {
                match position.piece_at(target) {
                    None => current = target,
                    Some(piece) => {
                        if piece.color == by
                            && (piece.kind == slider || piece.kind == PieceKind::Queen)
                        {
                            return true;
                        }
                        break;
                    }
                }
            }
        }
        false
    }

    /// Whether the side to move is in check.
    pub fn is_in_check(&self, position: &Position) -> bool {
        let king = position
            .king_square(position.side_to_move)
            .expect("side to move has no king");
        self.is_square_attacked(position, king, position.side_to_move.opposite())
    }

    /// In check with no legal moves.
    pub fn is_checkmate(&self, position: &Position) -> bool {
        self.is_in_check(position) && self.legal_moves(position).is_empty()
    }

    /// Not in check with no legal moves.
    pub fn is_stalemate(&self, position: &Position) -> bool {
        !self.is_in_check(position) && self.legal_moves(position).is_empty()
    }

    /// Count leaf nodes of the legal move tree to the given depth.
    pub fn perft(&self, position: &mut Position, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }
        let moves = self.legal_moves(position);
        if depth == 1 {
            return moves.len() as u64;
        }
        let mut nodes = 0;
        for mv in moves {
            let undo = position.make_move(mv);
            nodes += self.perft(position, depth - 1);
            position.unmake_move(mv, &undo);
        }
        nodes
    }
}
