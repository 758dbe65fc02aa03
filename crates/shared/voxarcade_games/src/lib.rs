//! # voxarcade_games
//!
//! Game logic for the voice arcade: command parsing and the six per-game
//! state machines (grid adventure, memory match, Simon, word guess, number
//! guess, quiz).
//!
//! Every reducer is a plain struct driven by two entry points:
//!
//! - `apply(&Command, now)` for a parsed voice (or manual) command
//! - `tick(now)` to fire expired deadlines (countdowns, flip-back, playback)
//!
//! Both return the [`event::GameEvent`]s that happened, so the host can apply
//! score, level changes and sound cues without reaching into game state.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod command;
pub mod kind;
pub mod prng;
pub mod stage;

// WASM-safe monotonic time shim for games that use wall-clock pacing.
#[cfg(feature = "std")]
pub mod time;

// The reducers keep deadlines as `Instant`s and allocate freely. Keep them
// behind `std` so `no_std` consumers can still parse commands and compute
// stages.
#[cfg(feature = "std")]
pub mod adventure;
#[cfg(feature = "std")]
pub mod event;
#[cfg(feature = "std")]
pub mod memory;
#[cfg(feature = "std")]
pub mod number_guess;
#[cfg(feature = "std")]
pub mod quiz;
#[cfg(feature = "std")]
pub mod simon;
#[cfg(feature = "std")]
pub mod stats;
#[cfg(feature = "std")]
pub mod word_guess;

pub use command::{Command, Direction, NavDirection, SimonColor};
pub use kind::GameKind;
