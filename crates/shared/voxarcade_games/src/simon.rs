use crate::command::{Command, SimonColor};
use crate::event::GameEvent;
use crate::prng::Prng;
use crate::time::{after_ms, reached, Duration, Instant};

/// Gap before each colour during playback.
pub const STEP_DELAY_MS: u64 = 500;
/// Pause between a completed round and the next playback.
pub const NEXT_ROUND_DELAY_MS: u64 = 1_000;
pub const POINTS_PER_COLOR: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimonPhase {
    /// Showing the sequence; `next` is the element flashed at `at`.
    Playback { next: usize, at: Instant },
    /// Waiting for the player to repeat the sequence.
    Input,
    /// Round won; the sequence grows at `until`.
    Pause { until: Instant },
}

#[derive(Debug, Clone)]
pub struct SimonGame {
    sequence: Vec<SimonColor>,
    player: Vec<SimonColor>,
    phase: SimonPhase,
    pub score: u32,
    pub rounds: u32,
    rng: Prng,
}

impl SimonGame {
    pub fn new(seed: u64, now: Instant) -> Self {
        let mut g = Self {
            sequence: Vec::new(),
            player: Vec::new(),
            phase: SimonPhase::Input,
            score: 0,
            rounds: 0,
            rng: Prng::new(seed),
        };
        g.start(now);
        g
    }

    pub fn sequence(&self) -> &[SimonColor] {
        &self.sequence
    }

    pub fn player_input(&self) -> &[SimonColor] {
        &self.player
    }

    pub fn phase(&self) -> SimonPhase {
        self.phase
    }

    pub fn accepts_input(&self) -> bool {
        self.phase == SimonPhase::Input
    }

    pub fn apply(&mut self, command: &Command, now: Instant) -> Vec<GameEvent> {
        match command {
            Command::Color { color } => self.press(*color, now),
            _ => vec![GameEvent::Ignored],
        }
    }

    pub fn tick(&mut self, now: Instant) -> Vec<GameEvent> {
        let mut events = Vec::new();
        match self.phase {
            SimonPhase::Playback { mut next, mut at } => {
                while reached(now, at) && next < self.sequence.len() {
                    events.push(GameEvent::ColorFlashed {
                        color: self.sequence[next],
                    });
                    next += 1;
                    at += Duration::from_millis(STEP_DELAY_MS);
                }
                if next >= self.sequence.len() {
                    self.phase = SimonPhase::Input;
                    events.push(GameEvent::PlaybackDone);
                } else {
                    self.phase = SimonPhase::Playback { next, at };
                }
            }
            SimonPhase::Pause { until } if reached(now, until) => {
                self.extend();
                self.player.clear();
                self.begin_playback(now);
                events.push(GameEvent::NewRound);
            }
            _ => {}
        }
        events
    }

    fn press(&mut self, color: SimonColor, now: Instant) -> Vec<GameEvent> {
        if !self.accepts_input() {
            return vec![GameEvent::Ignored];
        }

        let pos = self.player.len();
        if self.sequence.get(pos) != Some(&color) {
            let score = self.score;
            self.start(now);
            return vec![GameEvent::GameOver { score }];
        }

        self.player.push(color);
        let mut events = vec![GameEvent::ColorAccepted { color }];

        if self.player.len() == self.sequence.len() {
            let points = POINTS_PER_COLOR * self.sequence.len() as u32;
            self.score += points;
            self.rounds += 1;
            self.phase = SimonPhase::Pause {
                until: after_ms(now, NEXT_ROUND_DELAY_MS),
            };
            events.push(GameEvent::RoundComplete { points });
        }
        events
    }

    /// Fresh game: one random colour, zero score, playback from the top.
    fn start(&mut self, now: Instant) {
        self.sequence.clear();
        self.extend();
        self.player.clear();
        self.score = 0;
        self.rounds = 0;
        self.begin_playback(now);
    }

    fn extend(&mut self) {
        if let Some(c) = self.rng.choose(&SimonColor::ALL) {
            self.sequence.push(c);
        }
    }

    fn begin_playback(&mut self, now: Instant) {
        self.phase = SimonPhase::Playback {
            next: 0,
            at: after_ms(now, STEP_DELAY_MS),
        };
    }
}
