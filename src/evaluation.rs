//! Static position evaluation.
//!
//! Scores are centipawns from the perspective of the side to move,
//! positive favoring that side. The terms are material, piece-square
//! tables (with a separate king table once the board thins out),
//! mobility, central pawn occupancy, and the bishop pair. All weights are
//! deterministic, symmetric under color swap, and bounded far below the
//! mate sentinel used by the search.

use crate::move_generator::{offset, BISHOP_DIRECTIONS, KING_DIRECTIONS, KNIGHT_JUMPS, ROOK_DIRECTIONS};
use crate::position::Position;
use crate::types::{Color, PieceKind};

/// Material values indexed by `PieceKind::index()`. The king value only
/// matters for move ordering; it never enters a material sum.
pub const PIECE_VALUES: [i32; 6] = [100, 320, 330, 500, 900, 20000];

// Piece-square tables, white's perspective, a1 first. Black mirrors the
// rank.
const PAWN_PST: [i32; 64] = [
     0,   0,   0,   0,   0,   0,   0,   0,
     5,  10,  10, -20, -20,  10,  10,   5,
     5,  -5, -10,   0,   0, -10,  -5,   5,
     0,   0,   0,  20,  20,   0,   0,   0,
     5,   5,  10,  25,  25,  10,   5,   5,
    10,  10,  20,  30,  30,  20,  10,  10,
    50,  50,  50,  50,  50,  50,  50,  50,
     0,   0,   0,   0,   0,   0,   0,   0,
];

const KNIGHT_PST: [i32; 64] = [
   -50, -40, -30, -30, -30, -30, -40, -50,
   -40, -20,   0,   5,   5,   0, -20, -40,
   -30,   5,  10,  15,  15,  10,   5, -30,
   -30,   0,  15,  20,  20,  15,   0, -30,
   -30,   5,  15,  20,  20,  15,   5, -30,
   -30,   0,  10,  15,  15,  10,   0, -30,
   -40, -20,   0,   0,   0,   0, -20, -40,
   -50, -40, -30, -30, -30, -30, -40, -50,
];

const BISHOP_PST: [i32; 64] = [
   -20, -10, -10, -10, -10, -10, -10, -20,
   -10,   5,   0,   0,   0,   0,   5, -10,
   -10,  10,  10,  10,  10,  10,  10, -10,
   -10,   0,  10,  10,  10,  10,   0, -10,
   -10,   5,   5,  10,  10,   5,   5, -10,
   -10,   0,   5,  10,  10,   5,   0, -10,
   -10,   0,   0,   0,   0,   0,   0, -10,
   -20, -10, -10, -10, -10, -10, -10, -20,
];

const ROOK_PST: [i32; 64] = [
     0,   0,   0,   5,   5,   0,   0,   0,
    -5,   0,   0,   0,   0,   0,   0,  -5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
     5,  10,  10,  10,  10,  10,  10,   5,
     0,   0,   0,   0,   0,   0,   0,   0,
];

const QUEEN_PST: [i32; 64] = [
   -20, -10, -10,  -5,  -5, -10, -10, -20,
   -10,   0,   5,   0,   0,   0,   0, -10,
   -10,   5,   5,   5,   5,   5,   0, -10,
     0,   0,   5,   5,   5,   5,   0,  -5,
    -5,   0,   5,   5,   5,   5,   0,  -5,
   -10,   0,   5,   5,   5,   5,   0, -10,
   -10,   0,   0,   0,   0,   0,   0, -10,
   -20, -10, -10,  -5,  -5, -10, -10, -20,
];

const KING_MIDDLEGAME_PST: [i32; 64] = [
    20,  30,  10,   0,   0,  10,  30,  20,
    20,  20,   0,   0,   0,   0,  20,  20,
   -10, -20, -20, -20, -20, -20, -20, -10,
   -20, -30, -30, -40, -40, -30, -30, -20,
   -30, -40, -40, -50, -50, -40, -40, -30,
   -30, -40, -40, -50, -50, -40, -40, -30,
   -30, -40, -40, -50, -50, -40, -40, -30,
   -30, -40, -40, -50, -50, -40, -40, -30,
];

const KING_ENDGAME_PST: [i32; 64] = [
   -50, -30, -30, -30, -30, -30, -30, -50,
   -30, -30,   0,   0,   0,   0, -30, -30,
   -30, -10,  20,  30,  30,  20, -10, -30,
   -30, -10,  30,  40,  40,  30, -10, -30,
   -30, -10,  30,  40,  40,  30, -10, -30,
   -30, -10,  20,  30,  30,  20, -10, -30,
   -30, -20, -10,   0,   0, -10, -20, -30,
   -50, -40, -30, -20, -20, -30, -40, -50,
];

const KNIGHT_MOBILITY_BONUS: i32 = 4;
const BISHOP_MOBILITY_BONUS: i32 = 5;
const ROOK_MOBILITY_BONUS: i32 = 3;
const QUEEN_MOBILITY_BONUS: i32 = 2;

const BISHOP_PAIR_BONUS: i32 = 50;

// d4, e4, d5, e5
const CENTER_SQUARES: [usize; 4] = [27, 28, 35, 36];
const CENTER_PAWN_BONUS: i32 = 15;

// Per-side non-king material at or below this is treated as an endgame.
const ENDGAME_MATERIAL: i32 = 1300;

fn pst_value(kind: PieceKind, sq: usize, color: Color, endgame: bool) -> i32 {
    let table = match kind {
        PieceKind::Pawn => &PAWN_PST,
        PieceKind::Knight => &KNIGHT_PST,
        PieceKind::Bishop => &BISHOP_PST,
        PieceKind::Rook => &ROOK_PST,
        PieceKind::Queen => &QUEEN_PST,
        PieceKind::King => {
            if endgame {
                &KING_ENDGAME_PST
            } else {
                &KING_MIDDLEGAME_PST
            }
        }
    };
    let index = match color {
        Color::White => sq,
        Color::Black => (7 - sq / 8) * 8 + sq % 8,
    };
    table[index]
}

fn material(position: &Position, color: Color) -> i32 {
    let mut total = 0;
    for sq in 0..64 {
        if let Some(piece) = position.piece_at(sq) {
            if piece.color == color && piece.kind != PieceKind::King {
                total += PIECE_VALUES[piece.kind.index()];
            }
        }
    }
    total
}

/// Count reachable squares for a non-pawn piece; captures count, own
/// pieces block.
fn mobility(position: &Position, sq: usize, kind: PieceKind, color: Color) -> i32 {
    let mut count = 0;

    if kind == PieceKind::Knight {
        for (df, dr) in KNIGHT_JUMPS {
            if let Some(target) = offset(sq, df, dr) {
                match position.piece_at(target) {
                    Some(piece) if piece.color == color => {}
                    _ => count += 1,
                }
            }
        }
        return count;
    }

    let directions: &[(i32, i32)] = match kind {
        PieceKind::Bishop => &BISHOP_DIRECTIONS,
        PieceKind::Rook => &ROOK_DIRECTIONS,
        PieceKind::Queen => &KING_DIRECTIONS,
        _ => return 0,
    };
    for &(df, dr) in directions {
        let mut current = sq;
        while let Some(target) = offset(current, df, dr) {
            match position.piece_at(target) {
                None => {
                    count += 1;
                    current = target;
                }
                Some(piece) => {
                    if piece.color != color {
                        count += 1;
                    }
                    break;
                }
            }
        }
    }
    count
}

/// Evaluate the position in centipawns from the side to move's
/// perspective.
pub fn evaluate(position: &Position) -> i32 {
    let endgame = material(position, Color::White) <= ENDGAME_MATERIAL
        && material(position, Color::Black) <= ENDGAME_MATERIAL;

    let mut score = 0;
    let mut white_bishops = 0;
    let mut black_bishops = 0;

    for sq in 0..64 {
        let Some(piece) = position.piece_at(sq) else {
            continue;
        };

        let mut value = pst_value(piece.kind, sq, piece.color, endgame);
        if piece.kind != PieceKind::King {
            value += PIECE_VALUES[piece.kind.index()];
        }

        value += match piece.kind {
            PieceKind::Knight => {
                KNIGHT_MOBILITY_BONUS * mobility(position, sq, piece.kind, piece.color)
            }
            PieceKind::Bishop => {
                white_bishops += (piece.color == Color::White) as i32;
                black_bishops += (piece.color == Color::Black) as i32;
                BISHOP_MOBILITY_BONUS * mobility(position, sq, piece.kind, piece.color)
            }
            PieceKind::Rook => {
                ROOK_MOBILITY_BONUS * mobility(position, sq, piece.kind, piece.color)
            }
            PieceKind::Queen => {
                QUEEN_MOBILITY_BONUS * mobility(position, sq, piece.kind, piece.color)
            }
            _ => 0,
        };

        if piece.kind == PieceKind::Pawn && CENTER_SQUARES.contains(&sq) {
            value += CENTER_PAWN_BONUS;
        }

        match piece.color {
            Color::White => score += value,
            Color::Black => score -= value,
        }
    }

    if white_bishops >= 2 {
        score += BISHOP_PAIR_BONUS;
    }
    if black_bishops >= 2 {
        score -= BISHOP_PAIR_BONUS;
    }

    match position.side_to_move {
        Color::White => score,
        Color::Black => -score,
    }
}
