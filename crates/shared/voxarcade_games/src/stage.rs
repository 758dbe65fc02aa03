//! Per-level configuration.
//!
//! Stages are computed from the level number on demand instead of being
//! generated up front.

use serde::{Deserialize, Serialize};

use crate::kind::GameKind;

/// Highest level any game can reach.
pub const MAX_LEVEL: u32 = 20_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
    Extreme,
}

impl Difficulty {
    pub fn from_level(level: u32) -> Self {
        match level {
            0..=5_000 => Difficulty::Easy,
            5_001..=10_000 => Difficulty::Normal,
            10_001..=15_000 => Difficulty::Hard,
            _ => Difficulty::Extreme,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Normal => "NORMAL",
            Difficulty::Hard => "HARD",
            Difficulty::Extreme => "EXTREME",
        }
    }

    /// `(max_time, min_time)` in seconds for timed stages.
    fn time_bounds(self) -> (u32, u32) {
        match self {
            Difficulty::Easy => (60, 30),
            Difficulty::Normal => (45, 25),
            Difficulty::Hard => (30, 20),
            Difficulty::Extreme => (20, 15),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdventureStage {
    pub level: u32,
    pub difficulty: Difficulty,
    pub grid_size: u32,
    pub obstacles: u32,
    pub power_ups: u32,
    /// Seconds.
    pub time_limit: u32,
}

impl AdventureStage {
    pub fn for_level(level: u32) -> Self {
        let level = clamp_level(level);
        let i = level - 1;
        let difficulty = Difficulty::from_level(level);
        let (max_time, min_time) = difficulty.time_bounds();
        Self {
            level,
            difficulty,
            grid_size: (8 + i / 1_000).min(20),
            obstacles: (5 + i / 500).min(40),
            power_ups: 5u32.saturating_sub(i / 4_000).max(1),
            time_limit: max_time.saturating_sub(i / 1_000).max(min_time),
        }
    }
}

/// The single word list used by the word-guess game.
pub const WORD_CORPUS: [&str; 10] = [
    "APPLE", "BANANA", "CHERRY", "DOLPHIN", "ELEPHANT", "FOREST", "GUITAR", "HAMMER", "ISLAND",
    "JACKET",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WordStage {
    pub level: u32,
    pub difficulty: Difficulty,
    pub word: &'static str,
    /// Seconds the word stays unmasked before guessing opens.
    pub reveal_seconds: u32,
}

impl WordStage {
    pub fn for_level(level: u32) -> Self {
        let level = clamp_level(level);
        let i = (level - 1) as usize;
        Self {
            level,
            difficulty: Difficulty::from_level(level),
            word: WORD_CORPUS[i % WORD_CORPUS.len()],
            reveal_seconds: 3,
        }
    }
}

/// Stage lookup by game kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Adventure(AdventureStage),
    Word(WordStage),
    /// Games whose rules do not change with the level.
    Fixed { level: u32, difficulty: Difficulty },
}

impl Stage {
    pub fn for_level(kind: GameKind, level: u32) -> Self {
        match kind {
            GameKind::Adventure => Stage::Adventure(AdventureStage::for_level(level)),
            GameKind::WordGuess => Stage::Word(WordStage::for_level(level)),
            GameKind::Memory | GameKind::Simon | GameKind::Quiz | GameKind::NumberGuess => {
                let level = clamp_level(level);
                Stage::Fixed {
                    level,
                    difficulty: Difficulty::from_level(level),
                }
            }
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        match self {
            Stage::Adventure(s) => s.difficulty,
            Stage::Word(s) => s.difficulty,
            Stage::Fixed { difficulty, .. } => *difficulty,
        }
    }
}

fn clamp_level(level: u32) -> u32 {
    level.clamp(1, MAX_LEVEL)
}
