//! Per-game level and score record, persisted as one JSON document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use voxarcade_games::stage::MAX_LEVEL;
use voxarcade_games::GameKind;

use crate::storage::{ChunkedStorage, KeyValueStore, StorageError};

pub const DEFAULT_STORAGE_KEY: &str = "game-storage";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameProgress {
    pub current_level: u32,
    pub highest_level: u32,
    pub total_score: u32,
}

impl Default for GameProgress {
    fn default() -> Self {
        Self {
            current_level: 1,
            highest_level: 1,
            total_score: 0,
        }
    }
}

impl GameProgress {
    /// Pull a stored record back inside `1 <= current <= highest <= MAX_LEVEL`.
    fn normalized(self) -> Self {
        let current_level = self.current_level.clamp(1, MAX_LEVEL);
        Self {
            current_level,
            highest_level: self.highest_level.clamp(current_level, MAX_LEVEL),
            total_score: self.total_score,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PersistedProgress {
    #[serde(default)]
    progress: BTreeMap<GameKind, GameProgress>,
}

/// Owns the progress map and writes it back after every change. Each game
/// kind's record is touched only through calls naming that kind.
pub struct ProgressStore<S: KeyValueStore> {
    storage: ChunkedStorage<S>,
    key: String,
    progress: BTreeMap<GameKind, GameProgress>,
}

impl<S: KeyValueStore> ProgressStore<S> {
    /// Load from `storage`, falling back to defaults on a missing or
    /// unreadable record.
    pub fn load(storage: ChunkedStorage<S>, key: impl Into<String>) -> Self {
        let key = key.into();
        let progress = match storage.load(&key) {
            None => BTreeMap::new(),
            Some(text) => match serde_json::from_str::<PersistedProgress>(&text) {
                Ok(p) => p
                    .progress
                    .into_iter()
                    .map(|(kind, record)| {
                        let fixed = record.normalized();
                        if fixed != record {
                            warn!(game = kind.label(), "stored progress out of range, clamped");
                        }
                        (kind, fixed)
                    })
                    .collect(),
                Err(e) => {
                    warn!("stored progress unreadable, starting fresh: {}", e);
                    BTreeMap::new()
                }
            },
        };
        Self {
            storage,
            key,
            progress,
        }
    }

    pub fn get(&self, kind: GameKind) -> GameProgress {
        self.progress.get(&kind).copied().unwrap_or_default()
    }

    pub fn storage(&self) -> &ChunkedStorage<S> {
        &self.storage
    }

    pub fn add_score(&mut self, kind: GameKind, points: u32) -> GameProgress {
        if points == 0 {
            return self.get(kind);
        }
        let p = self.progress.entry(kind).or_default();
        p.total_score = p.total_score.saturating_add(points);
        let updated = *p;
        self.persist();
        updated
    }

    /// Move to the next level (capped at `MAX_LEVEL`) and return it.
    pub fn advance_level(&mut self, kind: GameKind) -> u32 {
        let p = self.progress.entry(kind).or_default();
        p.current_level = p.current_level.saturating_add(1).min(MAX_LEVEL);
        p.highest_level = p.highest_level.max(p.current_level);
        let level = p.current_level;
        info!(game = kind.label(), level, "level unlocked");
        self.persist();
        level
    }

    pub fn reset(&mut self, kind: GameKind) {
        self.progress.insert(kind, GameProgress::default());
        info!(game = kind.label(), "progress reset");
        self.persist();
    }

    fn persist(&mut self) {
        if let Err(e) = self.try_persist() {
            warn!("could not persist progress: {}", e);
        }
    }

    fn try_persist(&mut self) -> Result<(), StorageError> {
        let record = PersistedProgress {
            progress: self.progress.clone(),
        };
        let text = serde_json::to_string(&record)?;
        self.storage.save(&self.key, &text)
    }
}
