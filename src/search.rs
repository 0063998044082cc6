//! Time- and depth-bounded adversarial search.
//!
//! Iterative-deepening negamax with alpha-beta pruning. Each completed
//! iteration overwrites the running best, so a timeout or cancellation
//! always yields the last fully-completed iteration's result, never a
//! partial one. Quiescence extends leaf nodes through captures (and
//! check evasions) until the position is quiet. Move ordering is
//! MVV-LVA captures and promotions first, then killer moves — ordering
//! changes node counts, never results.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::evaluation::{evaluate, PIECE_VALUES};
use crate::move_generator::MoveGenerator;
use crate::position::{Move, MoveKind, Position};
use crate::skill::SkillConfig;
use crate::types::PieceKind;

pub const INFINITY: i32 = 100_000;
pub const MATE_SCORE: i32 = 50_000;

const MAX_PLY: usize = 64;
const QUIESCENCE_CAP: i32 = 8;
// Elapsed time and the cancel flag are polled once per this many nodes.
const NODE_CHECK_INTERVAL: u64 = 1024;

/// Outcome of one search request.
#[derive(Clone, Debug)]
pub struct SearchResult {
    /// Absent only when the position has no legal moves.
    pub best_move: Option<Move>,
    /// Centipawns from the mover's perspective.
    pub score: i32,
    /// The line the search considers best, best move first.
    pub pv: Vec<Move>,
    /// Deepest fully-completed iteration.
    pub depth: u8,
    /// Nodes visited across all iterations.
    pub nodes: u64,
}

/// One search worker. Reusable across requests; all per-request state is
/// reset on entry to `search`.
pub struct Searcher {
    generator: MoveGenerator,
    stop: Arc<AtomicBool>,
    deadline: Option<Instant>,
    aborted: bool,
    force_completion: bool,
    nodes: u64,
    killers: [[Option<Move>; 2]; MAX_PLY],
    quiescence_enabled: bool,
    rng: StdRng,
}

impl Searcher {
    /// The stop flag is shared with whoever may cancel this searcher.
    pub fn new(stop: Arc<AtomicBool>) -> Self {
        Searcher {
            generator: MoveGenerator::new(),
            stop,
            deadline: None,
            aborted: false,
            force_completion: false,
            nodes: 0,
            killers: [[None; 2]; MAX_PLY],
            quiescence_enabled: true,
            rng: StdRng::from_entropy(),
        }
    }

    /// Search a snapshot of the position within the configured budget.
    /// The caller's position is never mutated.
    pub fn search(&mut self, position: &Position, config: &SkillConfig) -> SearchResult {
        let mut scratch = position.clone();
        self.nodes = 0;
        self.aborted = false;
        self.killers = [[None; 2]; MAX_PLY];
        self.quiescence_enabled = config.quiescence;
        self.deadline = config.max_time.map(|budget| Instant::now() + budget);

        let root_moves = self.generator.legal_moves(&scratch);
        if root_moves.is_empty() {
            let score = if self.generator.is_in_check(&scratch) {
                -MATE_SCORE
            } else {
                0
            };
            return SearchResult {
                best_move: None,
                score,
                pv: Vec::new(),
                depth: 0,
                nodes: 0,
            };
        }

        let mut result = SearchResult {
            best_move: None,
            score: -INFINITY,
            pv: Vec::new(),
            depth: 0,
            nodes: 0,
        };

        for depth in 1..=config.max_depth {
            // Depth 1 always runs to completion so a move is available no
            // matter how tight the budget; the budget is observed from
            // depth 2 on.
            self.force_completion = depth == 1;
            if depth > 1 && self.out_of_budget() {
                break;
            }
            match self.search_root(&mut scratch, &root_moves, depth, config.randomization) {
                Some(iteration) => {
                    debug!(
                        "depth {} score {} nodes {} pv {}",
                        depth,
                        iteration.score,
                        self.nodes,
                        line(&iteration.pv)
                    );
                    result = iteration;
                }
                None => break,
            }
        }

        result.nodes = self.nodes;
        result
    }

    /// One full-width iteration at the given depth. `None` when the
    /// iteration was abandoned mid-flight.
    fn search_root(
        &mut self,
        position: &mut Position,
        root_moves: &[Move],
        depth: u8,
        randomization: i32,
    ) -> Option<SearchResult> {
        let window = randomization.max(0);
        let ordered = self.order_moves(position, root_moves.to_vec(), 0);

        let mut alpha = -INFINITY;
        let mut scored: Vec<(Move, i32, Vec<Move>)> = Vec::with_capacity(ordered.len());

        for mv in ordered {
            let undo = position.make_move(mv);
            let mut child_pv = Vec::new();
            // The root window is widened by the randomization factor so
            // every move within the window keeps an exact score.
            let score = -self.negamax(
                position,
                i32::from(depth) - 1,
                1,
                -INFINITY,
                -(alpha - window),
                &mut child_pv,
            );
            position.unmake_move(mv, &undo);
            if self.aborted {
                return None;
            }

            if score > alpha {
                alpha = score;
            }
            scored.push((mv, score, child_pv));
        }

        let best = scored.iter().map(|(_, score, _)| *score).max()?;

        let index = if window > 0 {
            let candidates: Vec<usize> =
                (0..scored.len()).filter(|&i| scored[i].1 >= best - window).collect();
            *candidates
                .choose(&mut self.rng)
                .expect("window always contains the best move")
        } else {
            // First-found best keeps zero-window searches deterministic.
            scored
                .iter()
                .position(|(_, score, _)| *score == best)
                .expect("best score came from this list")
        };

        let (mv, score, child_pv) = scored.swap_remove(index);
        let mut pv = Vec::with_capacity(child_pv.len() + 1);
        pv.push(mv);
        pv.extend(child_pv);

        Some(SearchResult {
            best_move: Some(mv),
            score,
            pv,
            depth,
            nodes: 0,
        })
    }

    fn negamax(
        &mut self,
        position: &mut Position,
        depth: i32,
        ply: usize,
        mut alpha: i32,
        beta: i32,
        pv: &mut Vec<Move>,
    ) -> i32 {
        if self.should_stop() {
            return 0;
        }
        self.nodes += 1;

        if position.is_fifty_moves() || position.has_insufficient_material() {
            return 0;
        }

        let moves = self.generator.legal_moves(position);
        if moves.is_empty() {
            // Closer mates score more extreme than distant ones.
            return if self.generator.is_in_check(position) {
                -(MATE_SCORE - ply as i32)
            } else {
                0
            };
        }

        if depth <= 0 {
            return if self.quiescence_enabled {
                self.quiescence(position, ply, 0, alpha, beta)
            } else {
                evaluate(position)
            };
        }

        let ordered = self.order_moves(position, moves, ply);
        let mut best = -INFINITY;

        for mv in ordered {
            let undo = position.make_move(mv);
            let mut child_pv = Vec::new();
            let score = -self.negamax(position, depth - 1, ply + 1, -beta, -alpha, &mut child_pv);
            position.unmake_move(mv, &undo);
            if self.aborted {
                return 0;
            }

            if score > best {
                best = score;
                if score > alpha {
                    alpha = score;
                    pv.clear();
                    pv.push(mv);
                    pv.append(&mut child_pv);
                }
            }
            if alpha >= beta {
                if !mv.is_capture() && mv.promotion.is_none() && ply < MAX_PLY {
                    self.killers[ply][1] = self.killers[ply][0];
                    self.killers[ply][0] = Some(mv);
                }
                break;
            }
        }

        best
    }

    /// Captures-only extension past the nominal leaf. When in check all
    /// evasions are searched instead, so mates at the horizon are not
    /// misread as quiet.
    fn quiescence(
        &mut self,
        position: &mut Position,
        ply: usize,
        qdepth: i32,
        mut alpha: i32,
        beta: i32,
    ) -> i32 {
        if self.should_stop() {
            return 0;
        }
        self.nodes += 1;

        let in_check = self.generator.is_in_check(position);

        if !in_check {
            let stand_pat = evaluate(position);
            if stand_pat >= beta {
                return beta;
            }
            if stand_pat > alpha {
                alpha = stand_pat;
            }
            if qdepth >= QUIESCENCE_CAP {
                return alpha;
            }
        }

        let moves = self.generator.legal_moves(position);
        if moves.is_empty() {
            return if in_check {
                -(MATE_SCORE - ply as i32)
            } else {
                0
            };
        }

        let mut selected: Vec<Move> = if in_check {
            moves
        } else {
            moves
                .into_iter()
                .filter(|m| m.is_capture() || m.promotion.is_some())
                .collect()
        };
        if selected.is_empty() {
            return alpha;
        }
        selected.sort_by_key(|m| std::cmp::Reverse(self.order_score(position, *m, ply)));

        for mv in selected {
            let undo = position.make_move(mv);
            let score = -self.quiescence(position, ply + 1, qdepth + 1, -beta, -alpha);
            position.unmake_move(mv, &undo);
            if self.aborted {
                return 0;
            }

            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }

        alpha
    }

    fn order_moves(&self, position: &Position, moves: Vec<Move>, ply: usize) -> Vec<Move> {
        let mut scored: Vec<(Move, i32)> = moves
            .into_iter()
            .map(|m| (m, self.order_score(position, m, ply)))
            .collect();
        // Stable sort: equal keys keep generation order, so ordering is
        // reproducible.
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored.into_iter().map(|(m, _)| m).collect()
    }

    fn order_score(&self, position: &Position, mv: Move, ply: usize) -> i32 {
        let mut score = 0;

        if mv.is_capture() {
            let victim = match mv.kind {
                MoveKind::EnPassant => PIECE_VALUES[PieceKind::Pawn.index()],
                _ => position
                    .piece_at(mv.to)
                    .map(|p| PIECE_VALUES[p.kind.index()])
                    .unwrap_or(0),
            };
            let attacker = position
                .piece_at(mv.from)
                .map(|p| PIECE_VALUES[p.kind.index()])
                .unwrap_or(0);
            score += 1_000_000 + 10 * victim - attacker;
        }

        if let Some(kind) = mv.promotion {
            score += 900_000 + PIECE_VALUES[kind.index()];
        }

        if ply < MAX_PLY {
            if self.killers[ply][0] == Some(mv) {
                score += 800_000;
            } else if self.killers[ply][1] == Some(mv) {
                score += 700_000;
            }
        }

        score
    }

    fn out_of_budget(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
            || self
                .deadline
                .map_or(false, |deadline| Instant::now() >= deadline)
    }

    fn should_stop(&mut self) -> bool {
        if self.aborted {
            return true;
        }
        if self.force_completion {
            return false;
        }
        if self.nodes % NODE_CHECK_INTERVAL == 0 {
            if self.stop.load(Ordering::Relaxed) {
                self.aborted = true;
                return true;
            }
            if let Some(deadline) = self.deadline {
                if Instant::now() >= deadline {
                    self.aborted = true;
                    return true;
                }
            }
        }
        false
    }
}

fn line(pv: &[Move]) -> String {
    pv.iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn searcher() -> Searcher {
        Searcher::new(Arc::new(AtomicBool::new(false)))
    }

    fn search_fen(fen: &str, config: &SkillConfig) -> SearchResult {
        let position = Position::from_fen(fen).unwrap();
        searcher().search(&position, config)
    }

    #[test]
    fn finds_a_back_rank_mate_in_one() {
        let config = SkillConfig::fixed(3, None, 0);
        let result = search_fen("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1", &config);

        let mv = result.best_move.expect("a move exists");
        assert_eq!(mv.to_string(), "a1a8");
        assert!(result.score >= MATE_SCORE - 10, "score {}", result.score);
        assert_eq!(result.pv.first(), Some(&mv));
    }

    #[test]
    fn zero_randomization_is_deterministic() {
        let config = SkillConfig::fixed(2, None, 0);
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let first = search_fen(fen, &config);
        let second = search_fen(fen, &config);

        assert_eq!(first.best_move, second.best_move);
        assert_eq!(first.score, second.score);
        assert_eq!(first.depth, second.depth);
        assert_eq!(first.pv, second.pv);
    }

    #[test]
    fn reaches_the_configured_depth_without_a_clock() {
        let config = SkillConfig::fixed(3, None, 0);
        let position = Position::start();
        let result = searcher().search(&position, &config);
        assert_eq!(result.depth, 3);
        assert!(result.nodes > 0);
    }

    #[test]
    fn respects_the_time_budget() {
        let config = SkillConfig::fixed(30, Some(Duration::from_millis(50)), 0);
        let position = Position::start();

        let started = Instant::now();
        let result = searcher().search(&position, &config);
        let elapsed = started.elapsed();

        assert!(result.best_move.is_some());
        assert!(result.depth >= 1);
        // Generous slack: the budget plus check-interval latency.
        assert!(elapsed < Duration::from_secs(5), "took {:?}", elapsed);
    }

    #[test]
    fn cancellation_keeps_the_last_completed_iteration() {
        let stop = Arc::new(AtomicBool::new(true));
        let mut searcher = Searcher::new(Arc::clone(&stop));
        let config = SkillConfig::fixed(30, None, 0);
        let position = Position::start();

        let result = searcher.search(&position, &config);
        assert_eq!(result.depth, 1, "only the forced first iteration ran");
        assert!(result.best_move.is_some());
    }

    #[test]
    fn terminal_positions_yield_no_move() {
        let config = SkillConfig::fixed(4, None, 0);

        let stalemate = search_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", &config);
        assert_eq!(stalemate.best_move, None);
        assert_eq!(stalemate.score, 0);

        let checkmate = search_fen("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1", &config);
        assert_eq!(checkmate.best_move, None);
        assert_eq!(checkmate.score, -MATE_SCORE);
    }

    #[test]
    fn randomized_choice_is_still_legal() {
        let generator = MoveGenerator::new();
        let position = Position::start();
        let legal = generator.legal_moves(&position);
        let config = SkillConfig::fixed(1, None, 400);

        for _ in 0..8 {
            let result = searcher().search(&position, &config);
            let mv = result.best_move.expect("a move exists");
            assert!(legal.contains(&mv), "{} is not legal", mv);
        }
    }

    #[test]
    fn quiescence_resolves_a_hanging_exchange() {
        // White to move; without quiescence depth 1 thinks QxQ wins a
        // queen outright, missing the recapture.
        let fen = "3qk3/3r4/8/8/8/8/3Q4/3RK3 w - - 0 1";
        let quiet = search_fen(fen, &SkillConfig::fixed(1, None, 0));
        assert!(quiet.best_move.is_some());
        // The quiesced score should not claim a whole queen of profit.
        assert!(quiet.score < 500, "score {}", quiet.score);
    }
}
