use crate::moves::{Move, RoundOutcome};
use crate::scoreboard::Scoreboard;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Plays the computer's side of a round
#[derive(Debug)]
pub struct RoundResolver {
    rng: StdRng,
}

impl RoundResolver {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic resolver for reproducible sessions
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform draw over the three moves
    pub fn draw(&mut self) -> Move {
        Move::ALL[self.rng.gen_range(0..Move::ALL.len())]
    }

    /// Draw a computer move, judge the round and record it on the board
    pub fn resolve(&mut self, user_move: Move, board: &mut Scoreboard) -> RoundOutcome {
        let computer_move = self.draw();
        let outcome = RoundOutcome::new(user_move, computer_move);
        board.record(outcome);

        tracing::debug!(
            "Resolved round: user={} computer={} winner={:?}",
            user_move,
            computer_move,
            outcome.winner
        );
        outcome
    }

    pub(crate) fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

impl Default for RoundResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::{judge, Winner};

    #[test]
    fn test_resolve_updates_board_once() {
        let mut resolver = RoundResolver::with_seed(7);
        let mut board = Scoreboard::new(5);

        for i in 0..20u32 {
            let outcome = resolver.resolve(Move::Paper, &mut board);
            assert_eq!(outcome.winner, judge(outcome.user_move, outcome.computer_move));
            assert_eq!(board.score().total(), i + 1);
            assert!(board.history().len() <= 5);
        }
    }

    #[test]
    fn test_draw_covers_all_moves() {
        let mut resolver = RoundResolver::with_seed(42);
        let mut seen = [0u32; 3];

        for _ in 0..3000 {
            match resolver.draw() {
                Move::Rock => seen[0] += 1,
                Move::Paper => seen[1] += 1,
                Move::Scissors => seen[2] += 1,
            }
        }

        for count in seen {
            assert!(count > 850 && count < 1150, "skewed draw: {:?}", seen);
        }
    }

    #[test]
    fn test_seeded_resolvers_agree() {
        let mut a = RoundResolver::with_seed(3);
        let mut b = RoundResolver::with_seed(3);
        let draws_a: Vec<_> = (0..16).map(|_| a.draw()).collect();
        let draws_b: Vec<_> = (0..16).map(|_| b.draw()).collect();
        assert_eq!(draws_a, draws_b);
    }

    #[test]
    fn test_tie_counted_as_tie() {
        let mut board = Scoreboard::new(5);
        board.record(RoundOutcome::new(Move::Rock, Move::Rock));
        assert_eq!(board.score().ties, 1);
        assert_eq!(board.history().latest().unwrap().outcome.winner, Winner::Tie);
    }
}
