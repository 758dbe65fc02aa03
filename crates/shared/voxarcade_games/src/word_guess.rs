use crate::command::Command;
use crate::event::GameEvent;
use crate::stage::WordStage;
use crate::time::{after_ms, reached, Duration, Instant};

pub const MAX_ATTEMPTS: u32 = 6;
pub const POINTS_PER_LETTER: u32 = 10;
pub const SOLVE_BONUS: u32 = 100;
pub const ADVANCE_DELAY_MS: u64 = 1_500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordPhase {
    /// Word shown unmasked; one second ticks off at `next_at`.
    Revealing { seconds_left: u32, next_at: Instant },
    Guessing,
    Won,
    Lost,
}

/// Word guess: memorise the word while it is shown, then rebuild it letter by
/// letter within six misses.
#[derive(Debug, Clone)]
pub struct WordGuessGame {
    stage: WordStage,
    guessed: Vec<char>,
    attempts_left: u32,
    phase: WordPhase,
    advance_at: Option<Instant>,
    pub score: u32,
}

impl WordGuessGame {
    pub fn new(stage: WordStage, now: Instant) -> Self {
        let mut g = Self {
            stage,
            guessed: Vec::new(),
            attempts_left: MAX_ATTEMPTS,
            phase: WordPhase::Guessing,
            advance_at: None,
            score: 0,
        };
        g.restart(now);
        g
    }

    pub fn stage(&self) -> &WordStage {
        &self.stage
    }

    pub fn word(&self) -> &'static str {
        self.stage.word
    }

    pub fn phase(&self) -> WordPhase {
        self.phase
    }

    pub fn attempts_left(&self) -> u32 {
        self.attempts_left
    }

    pub fn guessed(&self) -> &[char] {
        &self.guessed
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, WordPhase::Won | WordPhase::Lost)
    }

    /// The word as the player sees it: unmasked while revealing, otherwise
    /// `_` for every letter not yet guessed, space separated.
    pub fn display(&self) -> String {
        let revealing = matches!(self.phase, WordPhase::Revealing { .. });
        let mut out = String::with_capacity(self.word().len() * 2);
        for (i, c) in self.word().chars().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push(if revealing || self.guessed.contains(&c) {
                c
            } else {
                '_'
            });
        }
        out
    }

    pub fn load_stage(&mut self, stage: WordStage, now: Instant) {
        self.stage = stage;
        self.restart(now);
    }

    /// Same word again: attempts refilled, reveal countdown restarted.
    pub fn restart(&mut self, now: Instant) {
        self.guessed.clear();
        self.attempts_left = MAX_ATTEMPTS;
        self.advance_at = None;
        self.phase = if self.stage.reveal_seconds == 0 {
            WordPhase::Guessing
        } else {
            WordPhase::Revealing {
                seconds_left: self.stage.reveal_seconds,
                next_at: now + Duration::from_secs(1),
            }
        };
    }

    pub fn apply(&mut self, command: &Command, now: Instant) -> Vec<GameEvent> {
        match command {
            // A solved word still owes its level advance.
            Command::NewGame if self.advance_at.is_some() => vec![GameEvent::Ignored],
            Command::NewGame => {
                self.restart(now);
                vec![GameEvent::NewRound]
            }
            _ if self.phase != WordPhase::Guessing => vec![GameEvent::Ignored],
            Command::GuessLetter { letter } => self.guess(letter.to_ascii_uppercase(), now),
            Command::Solve { word } => self.solve(word, now),
            _ => vec![GameEvent::Ignored],
        }
    }

    pub fn tick(&mut self, now: Instant) -> Vec<GameEvent> {
        let mut events = Vec::new();
        match self.phase {
            WordPhase::Revealing {
                mut seconds_left,
                mut next_at,
            } => {
                while seconds_left > 0 && reached(now, next_at) {
                    seconds_left -= 1;
                    next_at += Duration::from_secs(1);
                }
                if seconds_left == 0 {
                    self.phase = WordPhase::Guessing;
                    events.push(GameEvent::WordMasked);
                } else {
                    self.phase = WordPhase::Revealing {
                        seconds_left,
                        next_at,
                    };
                }
            }
            WordPhase::Won => {
                if let Some(at) = self.advance_at {
                    if reached(now, at) {
                        self.advance_at = None;
                        events.push(GameEvent::LevelAdvance);
                    }
                }
            }
            _ => {}
        }
        events
    }

    fn guess(&mut self, letter: char, now: Instant) -> Vec<GameEvent> {
        if self.guessed.contains(&letter) {
            return vec![GameEvent::AlreadyGuessed { letter }];
        }
        self.guessed.push(letter);

        let hits = self.word().chars().filter(|&c| c == letter).count() as u32;
        if hits == 0 {
            let mut events = vec![GameEvent::LetterMiss { letter }];
            self.spend_attempt(&mut events);
            return events;
        }

        let points = POINTS_PER_LETTER * hits;
        self.score += points;
        let mut events = vec![GameEvent::LetterHit { letter, points }];
        if self.word().chars().all(|c| self.guessed.contains(&c)) {
            self.win(now, &mut events);
        }
        events
    }

    fn solve(&mut self, attempt: &str, now: Instant) -> Vec<GameEvent> {
        if !attempt.eq_ignore_ascii_case(self.word()) {
            let mut events = vec![GameEvent::WrongSolution];
            self.spend_attempt(&mut events);
            return events;
        }

        for c in self.word().chars() {
            if !self.guessed.contains(&c) {
                self.guessed.push(c);
            }
        }
        self.score += SOLVE_BONUS;
        let mut events = vec![GameEvent::Solved {
            points: SOLVE_BONUS,
        }];
        self.win(now, &mut events);
        events
    }

    fn spend_attempt(&mut self, events: &mut Vec<GameEvent>) {
        self.attempts_left = self.attempts_left.saturating_sub(1);
        if self.attempts_left == 0 {
            self.phase = WordPhase::Lost;
            events.push(GameEvent::Lost);
        }
    }

    fn win(&mut self, now: Instant, events: &mut Vec<GameEvent>) {
        self.phase = WordPhase::Won;
        self.advance_at = Some(after_ms(now, ADVANCE_DELAY_MS));
        events.push(GameEvent::Won);
    }
}
