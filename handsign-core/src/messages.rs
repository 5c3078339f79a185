//! Flavor text shown after a resolved round

use crate::moves::Winner;
use rand::seq::SliceRandom;
use rand::Rng;

const WIN_MESSAGES: &[&str] = &[
    "Nice one!",
    "You read that perfectly.",
    "The computer never saw it coming.",
    "Flawless victory!",
];

const LOSE_MESSAGES: &[&str] = &[
    "Better luck next round.",
    "The computer got you this time.",
    "So close!",
    "Shake it off and go again.",
];

const TIE_MESSAGES: &[&str] = &[
    "Great minds think alike.",
    "A stalemate!",
    "Same move, try again.",
];

pub fn pool(winner: Winner) -> &'static [&'static str] {
    match winner {
        Winner::User => WIN_MESSAGES,
        Winner::Computer => LOSE_MESSAGES,
        Winner::Tie => TIE_MESSAGES,
    }
}

pub fn pick<R: Rng + ?Sized>(winner: Winner, rng: &mut R) -> &'static str {
    pool(winner).choose(rng).copied().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_pick_from_matching_pool() {
        let mut rng = StdRng::seed_from_u64(1);
        for winner in [Winner::User, Winner::Computer, Winner::Tie] {
            for _ in 0..10 {
                let msg = pick(winner, &mut rng);
                assert!(pool(winner).contains(&msg));
            }
        }
    }
}
