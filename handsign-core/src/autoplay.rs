//! Plays a round on its own once the live loop settles on a gesture

use crate::config::AutoPlayConfig;
use crate::matches::MatchState;
use crate::moves::Move;
use crate::session::Context;
use crate::webcam::DetectionListener;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Fires once the same move has been seen on enough consecutive frames
#[derive(Debug)]
pub struct Debouncer {
    stable_frames: u32,
    cooldown: Duration,
    streak: Option<(Move, u32)>,
    last_fired: Option<Instant>,
}

impl Debouncer {
    pub fn new(stable_frames: u32, cooldown: Duration) -> Self {
        Self {
            stable_frames: stable_frames.max(1),
            cooldown,
            streak: None,
            last_fired: None,
        }
    }

    pub fn from_config(config: &AutoPlayConfig) -> Self {
        Self::new(config.stable_frames, config.cooldown)
    }

    pub fn observe(&mut self, detected: Option<Move>, now: Instant) -> Option<Move> {
        let detected = match detected {
            Some(m) => m,
            None => {
                self.streak = None;
                return None;
            }
        };

        let count = match self.streak {
            Some((m, n)) if m == detected => n + 1,
            _ => 1,
        };
        self.streak = Some((detected, count));

        if count < self.stable_frames {
            return None;
        }
        if let Some(last) = self.last_fired {
            if now.duration_since(last) < self.cooldown {
                return None;
            }
        }

        self.last_fired = Some(now);
        self.streak = None;
        Some(detected)
    }

    pub fn clear(&mut self) {
        self.streak = None;
    }
}

pub(crate) struct AutoPlayer {
    ctx: Arc<Context>,
    match_state: Arc<Mutex<MatchState>>,
    debouncer: Mutex<Debouncer>,
}

impl AutoPlayer {
    pub fn new(ctx: Arc<Context>, match_state: Arc<Mutex<MatchState>>) -> Self {
        let debouncer = Debouncer::from_config(&ctx.config.auto_play);
        Self {
            ctx,
            match_state,
            debouncer: Mutex::new(debouncer),
        }
    }
}

impl DetectionListener for AutoPlayer {
    fn on_detection(&self, detected: Option<Move>) {
        // held through resolve so a match cannot start between the check and
        // the recorded round; lock order matches the match task
        let state = self.match_state.lock();
        if state.active {
            self.debouncer.lock().clear();
            return;
        }

        let fired = self.debouncer.lock().observe(detected, Instant::now());
        if let Some(user_move) = fired {
            tracing::debug!("Auto-play triggered with {}", user_move);
            self.ctx.resolve(None, user_move);
        }
        drop(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_stable_frames() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(3, Duration::from_secs(2));

        assert_eq!(debouncer.observe(Some(Move::Rock), start), None);
        assert_eq!(debouncer.observe(Some(Move::Rock), start), None);
        assert_eq!(debouncer.observe(Some(Move::Rock), start), Some(Move::Rock));
    }

    #[test]
    fn test_streak_broken_by_change_or_nothing() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(2, Duration::ZERO);

        assert_eq!(debouncer.observe(Some(Move::Rock), start), None);
        assert_eq!(debouncer.observe(Some(Move::Paper), start), None);
        assert_eq!(debouncer.observe(None, start), None);
        assert_eq!(debouncer.observe(Some(Move::Paper), start), None);
        assert_eq!(debouncer.observe(Some(Move::Paper), start), Some(Move::Paper));
    }

    #[test]
    fn test_cooldown_blocks_repeat() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(1, Duration::from_secs(3));

        assert_eq!(debouncer.observe(Some(Move::Scissors), start), Some(Move::Scissors));
        assert_eq!(
            debouncer.observe(Some(Move::Scissors), start + Duration::from_secs(1)),
            None
        );
        assert_eq!(
            debouncer.observe(Some(Move::Scissors), start + Duration::from_secs(4)),
            Some(Move::Scissors)
        );
    }
}
