use serde::{Deserialize, Serialize};
use std::fmt;

/// A rock-paper-scissors move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Rock,
    Paper,
    Scissors,
}

impl Move {
    pub const ALL: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

    /// The move this one defeats
    pub fn beats(self) -> Move {
        match self {
            Move::Rock => Move::Scissors,
            Move::Scissors => Move::Paper,
            Move::Paper => Move::Rock,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Move::Rock => "rock",
            Move::Paper => "paper",
            Move::Scissors => "scissors",
        }
    }

    /// Normalize a classifier label into a move.
    ///
    /// Labels are trimmed and lower-cased; the singular `scissor` is accepted.
    /// Anything else is an unrecognized gesture.
    pub fn from_label(label: &str) -> Option<Move> {
        match label.trim().to_lowercase().as_str() {
            "rock" => Some(Move::Rock),
            "paper" => Some(Move::Paper),
            "scissors" | "scissor" => Some(Move::Scissors),
            _ => None,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Move {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Move::from_label(s).ok_or_else(|| format!("unknown move '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    User,
    Computer,
    Tie,
}

/// Result of a single resolved round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub winner: Winner,
    pub user_move: Move,
    pub computer_move: Move,
}

impl RoundOutcome {
    pub fn new(user_move: Move, computer_move: Move) -> Self {
        Self {
            winner: judge(user_move, computer_move),
            user_move,
            computer_move,
        }
    }

    pub fn summary(&self) -> String {
        match self.winner {
            Winner::User => format!(
                "You won! {} beats {}",
                self.user_move, self.computer_move
            ),
            Winner::Computer => format!(
                "Computer won! {} beats {}",
                self.computer_move, self.user_move
            ),
            Winner::Tie => format!("Tie! Both chose {}", self.user_move),
        }
    }
}

/// Outcome table for a pair of moves
pub fn judge(user: Move, computer: Move) -> Winner {
    if user == computer {
        Winner::Tie
    } else if user.beats() == computer {
        Winner::User
    } else {
        Winner::Computer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beats_mapping() {
        assert_eq!(Move::Rock.beats(), Move::Scissors);
        assert_eq!(Move::Scissors.beats(), Move::Paper);
        assert_eq!(Move::Paper.beats(), Move::Rock);
    }

    #[test]
    fn test_beats_is_three_cycle() {
        for m in Move::ALL {
            assert_ne!(m.beats(), m);
            assert_ne!(m.beats().beats(), m);
            assert_eq!(m.beats().beats().beats(), m);
        }
    }

    #[test]
    fn test_exactly_one_outcome_per_pair() {
        for user in Move::ALL {
            for computer in Move::ALL {
                let winner = judge(user, computer);
                let tie = user == computer;
                let user_wins = user.beats() == computer;
                let computer_wins = computer.beats() == user;

                assert_eq!(
                    [tie, user_wins, computer_wins]
                        .iter()
                        .filter(|&&b| b)
                        .count(),
                    1
                );
                match winner {
                    Winner::Tie => assert!(tie),
                    Winner::User => assert!(user_wins),
                    Winner::Computer => assert!(computer_wins),
                }
            }
        }
    }

    #[test]
    fn test_label_normalization() {
        assert_eq!(Move::from_label("Scissor"), Some(Move::Scissors));
        assert_eq!(Move::from_label(" scissors "), Some(Move::Scissors));
        assert_eq!(Move::from_label("ROCK"), Some(Move::Rock));
        assert_eq!(Move::from_label("Paper\n"), Some(Move::Paper));
        assert_eq!(Move::from_label("lizard"), None);
        assert_eq!(Move::from_label(""), None);
    }

    #[test]
    fn test_summary_names_both_moves() {
        let outcome = RoundOutcome::new(Move::Paper, Move::Rock);
        assert_eq!(outcome.winner, Winner::User);
        assert_eq!(outcome.summary(), "You won! paper beats rock");

        let outcome = RoundOutcome::new(Move::Paper, Move::Scissors);
        assert_eq!(outcome.summary(), "Computer won! scissors beats paper");
    }
}
