use crate::moves::{RoundOutcome, Winner};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_CAPACITY: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub user_wins: u32,
    pub computer_wins: u32,
    pub ties: u32,
}

impl Score {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Number of resolved rounds
    pub fn total(&self) -> u32 {
        self.user_wins + self.computer_wins + self.ties
    }

    pub fn record(&mut self, winner: Winner) {
        match winner {
            Winner::User => self.user_wins += 1,
            Winner::Computer => self.computer_wins += 1,
            Winner::Tie => self.ties += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub summary: String,
    pub outcome: RoundOutcome,
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn from_outcome(outcome: RoundOutcome) -> Self {
        Self {
            summary: format!(
                "You: {} | Computer: {} | {}",
                outcome.user_move,
                outcome.computer_move,
                match outcome.winner {
                    Winner::User => "You won",
                    Winner::Computer => "Computer won",
                    Winner::Tie => "Tie",
                }
            ),
            outcome,
            recorded_at: Utc::now(),
        }
    }
}

/// Most-recent-first log of round summaries with a fixed capacity
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Prepend an entry, evicting the oldest once full
    pub fn push(&mut self, entry: HistoryEntry) {
        if self.capacity == 0 {
            return;
        }
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

/// Score and history for one session
#[derive(Debug, Clone, Default)]
pub struct Scoreboard {
    score: Score,
    history: History,
}

impl Scoreboard {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            score: Score::zero(),
            history: History::new(history_capacity),
        }
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn record(&mut self, outcome: RoundOutcome) {
        self.score.record(outcome.winner);
        self.history.push(HistoryEntry::from_outcome(outcome));
    }

    pub fn reset_score(&mut self) {
        self.score = Score::zero();
    }

    pub fn reset(&mut self) {
        self.score = Score::zero();
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::Move;

    #[test]
    fn test_score_records_one_counter() {
        let mut score = Score::zero();
        score.record(Winner::User);
        score.record(Winner::Tie);
        score.record(Winner::Tie);

        assert_eq!(score.user_wins, 1);
        assert_eq!(score.computer_wins, 0);
        assert_eq!(score.ties, 2);
        assert_eq!(score.total(), 3);
    }

    #[test]
    fn test_history_evicts_oldest() {
        let mut history = History::new(5);
        let moves = [Move::Rock, Move::Paper, Move::Scissors];

        for i in 0..7 {
            let outcome = RoundOutcome::new(moves[i % 3], Move::Rock);
            history.push(HistoryEntry::from_outcome(outcome));
            assert!(history.len() <= 5);
        }

        assert_eq!(history.len(), 5);
        // newest is the 7th push (index 6 -> rock)
        assert_eq!(history.latest().unwrap().outcome.user_move, Move::Rock);
        // oldest kept is the 3rd push (index 2 -> scissors)
        assert_eq!(
            history.iter().last().unwrap().outcome.user_move,
            Move::Scissors
        );
    }

    #[test]
    fn test_scoreboard_reset() {
        let mut board = Scoreboard::new(5);
        board.record(RoundOutcome::new(Move::Rock, Move::Scissors));
        board.record(RoundOutcome::new(Move::Rock, Move::Paper));

        assert_eq!(board.score().total(), 2);
        assert_eq!(board.history().len(), 2);

        board.reset();
        assert_eq!(board.score(), Score::zero());
        assert!(board.history().is_empty());
    }
}
