use std::vec::Vec;

const RECENT_WINDOW: usize = 50;

/// Per-session round record for one game.
#[derive(Debug, Clone)]
pub struct RoundStats {
    pub won: u32,
    pub lost: u32,
    pub played: u32,
    pub streak: u32,
    pub best_streak: u32,
    pub recent: Vec<bool>,
}

impl RoundStats {
    pub fn new() -> Self {
        Self {
            won: 0,
            lost: 0,
            played: 0,
            streak: 0,
            best_streak: 0,
            recent: Vec::with_capacity(RECENT_WINDOW),
        }
    }

    pub fn record_round(&mut self, won: bool) {
        if won {
            self.won += 1;
            self.streak += 1;
            self.best_streak = self.best_streak.max(self.streak);
        } else {
            self.lost += 1;
            self.streak = 0;
        }

        self.recent.push(won);
        if self.recent.len() > RECENT_WINDOW {
            self.recent.remove(0);
        }

        self.played += 1;
    }

    pub fn win_rate(&self) -> f32 {
        if self.played == 0 {
            0.0
        } else {
            self.won as f32 / self.played as f32
        }
    }

    pub fn recent_rate(&self) -> f32 {
        if self.recent.is_empty() {
            return 0.0;
        }
        let wins = self.recent.iter().filter(|&&x| x).count();
        wins as f32 / self.recent.len() as f32
    }
}

impl Default for RoundStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streaks_reset_on_loss() {
        let mut s = RoundStats::new();
        s.record_round(true);
        s.record_round(true);
        s.record_round(false);
        s.record_round(true);
        assert_eq!(s.played, 4);
        assert_eq!(s.streak, 1);
        assert_eq!(s.best_streak, 2);
        assert!((s.win_rate() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn recent_window_is_bounded() {
        let mut s = RoundStats::new();
        for i in 0..(RECENT_WINDOW + 10) {
            s.record_round(i % 2 == 0);
        }
        assert_eq!(s.recent.len(), RECENT_WINDOW);
        assert!((s.recent_rate() - 0.5).abs() < 1e-6);
        assert_eq!(RoundStats::new().recent_rate(), 0.0);
    }
}
