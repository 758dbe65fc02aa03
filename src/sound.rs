//! Fire-and-forget sound effects.

use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_VOLUME: f32 = 0.5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioError {
    #[error("could not load sound {src}: {reason}")]
    Load { src: String, reason: String },
    #[error("playback failed: {0}")]
    Playback(String),
}

/// Something that can load and play short clips.
pub trait AudioSink {
    type Handle;

    fn load(&mut self, src: &str, volume: f32) -> Result<Self::Handle, AudioError>;
    fn play(&mut self, handle: &mut Self::Handle) -> Result<(), AudioError>;
    fn stop(&mut self, handle: &mut Self::Handle);
    fn unload(&mut self, handle: Self::Handle);
}

/// Asset path for a named cue.
pub fn cue_src(name: &str) -> String {
    format!("/sounds/{name}.mp3")
}

/// Plays clips by logical name, loading each one on first use and reusing
/// the handle afterwards.
pub struct SoundBoard<A: AudioSink> {
    sink: A,
    handles: HashMap<String, A::Handle>,
    muted: bool,
}

impl<A: AudioSink> SoundBoard<A> {
    pub fn new(sink: A, muted: bool) -> Self {
        Self {
            sink,
            handles: HashMap::new(),
            muted,
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        if muted {
            self.stop_all();
        }
        self.muted = muted;
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.set_muted(!self.muted);
        self.muted
    }

    pub fn sink(&self) -> &A {
        &self.sink
    }

    pub fn cached(&self) -> usize {
        self.handles.len()
    }

    /// Play `name` from `src`. Failures are logged and the cue is skipped.
    pub fn play(&mut self, name: &str, src: &str) {
        if self.muted {
            return;
        }
        if let Err(e) = self.try_play(name, src) {
            warn!(sound = name, "{}", e);
        }
    }

    pub fn play_cue(&mut self, name: &str) {
        let src = cue_src(name);
        self.play(name, &src);
    }

    fn try_play(&mut self, name: &str, src: &str) -> Result<(), AudioError> {
        let handle = match self.handles.entry(name.to_string()) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                debug!(sound = name, src, "loading sound");
                e.insert(self.sink.load(src, DEFAULT_VOLUME)?)
            }
        };
        self.sink.play(handle)
    }

    pub fn stop_all(&mut self) {
        for handle in self.handles.values_mut() {
            self.sink.stop(handle);
        }
    }

    pub fn unload_all(&mut self) {
        for (_, handle) in self.handles.drain() {
            self.sink.unload(handle);
        }
    }
}

/// Sink for hosts without audio output: every cue becomes a trace event.
#[derive(Debug, Default)]
pub struct TraceSink {
    pub played: u32,
}

impl AudioSink for TraceSink {
    type Handle = String;

    fn load(&mut self, src: &str, _volume: f32) -> Result<String, AudioError> {
        Ok(src.to_string())
    }

    fn play(&mut self, handle: &mut String) -> Result<(), AudioError> {
        self.played += 1;
        debug!(src = %handle, "sound");
        Ok(())
    }

    fn stop(&mut self, _handle: &mut String) {}

    fn unload(&mut self, _handle: String) {}
}
