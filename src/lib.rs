//! # voxarcade
//!
//! Host-side runtime for the voice arcade. Game rules live in
//! [`voxarcade_games`]; this crate adds what a host needs around them:
//!
//! - [`speech`]: recognizer lifecycle with auto-restart
//! - [`storage`] and [`progress`]: chunked key-value persistence of per-game level and score
//! - [`sound`]: named, cached, mutable sound cues
//! - [`arcade`]: the dispatcher tying a running game to all of the above
//!
//! Everything is synchronous. Delays are deadlines checked by
//! [`arcade::Arcade::tick`], so any event loop (tokio, a browser animation
//! frame, a test) can drive it.

pub mod arcade;
pub mod config;
pub mod notice;
pub mod paths;
pub mod progress;
pub mod sound;
pub mod speech;
pub mod storage;

pub use voxarcade_games as games;

pub use arcade::{ActiveGame, Arcade};
pub use config::{ArcadeConfig, ConfigError};
pub use notice::{Notice, NoticeLevel};
pub use progress::{GameProgress, ProgressStore};
pub use sound::{AudioError, AudioSink, SoundBoard};
pub use speech::{
    RecognitionOptions, Recognizer, RecognizerEvent, RecognizerFault, SessionSignal, SpeechError,
    SpeechSession,
};
pub use storage::{ChunkedStorage, KeyValueStore, MemoryStorage, StorageError};
