//! Speech session manager.
//!
//! Wraps a host recognizer (browser Web Speech API, a stdin reader, a test
//! double) behind the [`Recognizer`] trait and owns the listening lifecycle:
//! single active handle, auto-restart on unexpected end, and the mapping from
//! raw recognizer faults to [`SpeechError`]s.
//!
//! The session is a plain state machine. The host forwards every
//! [`RecognizerEvent`] to [`SpeechSession::handle_event`] and acts on the
//! returned [`SessionSignal`]s, in arrival order.

use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeechError {
    #[error("Speech recognition is not supported on this host")]
    Unsupported,
    #[error("Please allow microphone access to use voice controls")]
    PermissionDenied,
    #[error("Speech recognition error: {0}")]
    Transcription(String),
    #[error("Failed to start speech recognition: {0}")]
    StartFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionOptions {
    pub locale: String,
    pub continuous: bool,
    pub interim_results: bool,
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            continuous: true,
            interim_results: false,
        }
    }
}

/// Error reported by the recognizer itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerFault {
    NotAllowed,
    /// Expected after a stop request.
    Aborted,
    Other(String),
}

impl RecognizerFault {
    /// Map a Web Speech API error code.
    pub fn from_code(code: &str) -> Self {
        match code {
            "not-allowed" => RecognizerFault::NotAllowed,
            "aborted" => RecognizerFault::Aborted,
            other => RecognizerFault::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerEvent {
    Started,
    /// Final transcript for one utterance.
    Result(String),
    Error(RecognizerFault),
    End,
}

/// A host speech-to-text capability.
pub trait Recognizer {
    fn is_supported(&self) -> bool;

    /// Begin a recognition stream. Lifecycle events arrive later through
    /// [`SpeechSession::handle_event`].
    fn start(&mut self, options: &RecognitionOptions) -> Result<(), SpeechError>;

    fn stop(&mut self);
}

/// What the session wants the host to know about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSignal {
    Started,
    Transcript(String),
    Stopped,
    Error(SpeechError),
}

pub struct SpeechSession<R: Recognizer> {
    recognizer: R,
    options: RecognitionOptions,
    // A recognizer handle has been started and not stopped.
    active: bool,
    listening: bool,
    restarts: u32,
    // End events still owed by handles this session stopped.
    stale_ends: u32,
}

impl<R: Recognizer> SpeechSession<R> {
    pub fn new(recognizer: R, options: RecognitionOptions) -> Self {
        Self {
            recognizer,
            options,
            active: false,
            listening: false,
            restarts: 0,
            stale_ends: 0,
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Number of automatic restarts since the last explicit start.
    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    pub fn recognizer_mut(&mut self) -> &mut R {
        &mut self.recognizer
    }

    pub fn start(&mut self) -> Vec<SessionSignal> {
        if !self.recognizer.is_supported() {
            warn!("speech recognition unsupported");
            return vec![SessionSignal::Error(SpeechError::Unsupported)];
        }

        if self.active {
            debug!("replacing active recognition handle");
            self.release_handle();
        }

        self.restarts = 0;
        match self.recognizer.start(&self.options) {
            Ok(()) => {
                self.active = true;
                self.listening = true;
                info!(locale = %self.options.locale, "speech session started");
                Vec::new()
            }
            Err(e) => {
                warn!("speech session failed to start: {}", e);
                self.listening = false;
                vec![SessionSignal::Error(e)]
            }
        }
    }

    /// Tear down the handle and suppress further restarts.
    pub fn stop(&mut self) -> Vec<SessionSignal> {
        if self.active {
            self.release_handle();
        }
        self.listening = false;
        info!("speech session stopped");
        vec![SessionSignal::Stopped]
    }

    pub fn handle_event(&mut self, event: RecognizerEvent) -> Vec<SessionSignal> {
        match event {
            RecognizerEvent::Started => {
                // Restarts re-emit Started; only the first one is news.
                if self.listening && self.restarts == 0 {
                    vec![SessionSignal::Started]
                } else {
                    Vec::new()
                }
            }
            // Delivered even after stop(): stopping only cancels restarts.
            RecognizerEvent::Result(text) => vec![SessionSignal::Transcript(text)],
            RecognizerEvent::Error(fault) => self.handle_fault(fault),
            RecognizerEvent::End => self.handle_end(),
        }
    }

    fn handle_fault(&mut self, fault: RecognizerFault) -> Vec<SessionSignal> {
        match fault {
            RecognizerFault::Aborted => Vec::new(),
            RecognizerFault::NotAllowed => {
                warn!("microphone permission denied");
                let mut signals = vec![SessionSignal::Error(SpeechError::PermissionDenied)];
                signals.extend(self.stop());
                signals
            }
            RecognizerFault::Other(code) => {
                warn!(code = %code, "transcription error");
                vec![SessionSignal::Error(SpeechError::Transcription(code))]
            }
        }
    }

    fn release_handle(&mut self) {
        self.recognizer.stop();
        self.active = false;
        self.stale_ends += 1;
    }

    fn handle_end(&mut self) -> Vec<SessionSignal> {
        if self.stale_ends > 0 {
            self.stale_ends -= 1;
            debug!(pending = self.stale_ends, "end of a released handle");
            return Vec::new();
        }

        // The live handle is gone either way.
        self.active = false;
        if !self.listening {
            return Vec::new();
        }

        match self.recognizer.start(&self.options) {
            Ok(()) => {
                self.active = true;
                self.restarts += 1;
                debug!(restarts = self.restarts, "recognizer ended; restarted");
                Vec::new()
            }
            Err(e) => {
                warn!("recognizer restart failed: {}", e);
                let reason = match e {
                    SpeechError::StartFailed(reason) => reason,
                    other => other.to_string(),
                };
                let mut signals = vec![SessionSignal::Error(SpeechError::StartFailed(reason))];
                signals.extend(self.stop());
                signals
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Recognizer double that records calls and can be told to fail.
    #[derive(Debug, Default)]
    struct ScriptedRecognizer {
        pub unsupported: bool,
        pub fail_next_start: bool,
        /// Reject `start` on a running recognizer, like the browser does.
        pub strict: bool,
        pub running: bool,
        pub starts: u32,
        pub stops: u32,
    }

    impl Recognizer for ScriptedRecognizer {
        fn is_supported(&self) -> bool {
            !self.unsupported
        }

        fn start(&mut self, _options: &RecognitionOptions) -> Result<(), SpeechError> {
            if self.fail_next_start {
                self.fail_next_start = false;
                return Err(SpeechError::StartFailed("device busy".to_string()));
            }
            if self.strict && self.running {
                return Err(SpeechError::StartFailed("InvalidStateError".to_string()));
            }
            self.running = true;
            self.starts += 1;
            Ok(())
        }

        fn stop(&mut self) {
            self.running = false;
            self.stops += 1;
        }
    }

    fn session() -> SpeechSession<ScriptedRecognizer> {
        SpeechSession::new(ScriptedRecognizer::default(), RecognitionOptions::default())
    }

    #[test]
    fn default_options_are_continuous_final_only() {
        let o = RecognitionOptions::default();
        assert_eq!(o.locale, "en-US");
        assert!(o.continuous);
        assert!(!o.interim_results);
    }

    #[test]
    fn unsupported_host_reports_and_never_listens() {
        let mut s = SpeechSession::new(
            ScriptedRecognizer {
                unsupported: true,
                ..Default::default()
            },
            RecognitionOptions::default(),
        );
        assert_eq!(s.start(), vec![SessionSignal::Error(SpeechError::Unsupported)]);
        assert!(!s.is_listening());
        assert_eq!(s.recognizer().starts, 0);
    }

    #[test]
    fn end_while_listening_restarts_exactly_once() {
        let mut s = session();
        s.start();
        assert_eq!(s.handle_event(RecognizerEvent::Started), vec![SessionSignal::Started]);

        assert!(s.handle_event(RecognizerEvent::End).is_empty());
        assert_eq!(s.recognizer().starts, 2);
        assert_eq!(s.restarts(), 1);
        // The restarted stream's Started is not re-announced.
        assert!(s.handle_event(RecognizerEvent::Started).is_empty());
        assert!(s.is_listening());
    }

    #[test]
    fn end_after_stop_does_not_restart() {
        let mut s = session();
        s.start();
        assert_eq!(s.stop(), vec![SessionSignal::Stopped]);
        assert!(s.handle_event(RecognizerEvent::End).is_empty());
        assert_eq!(s.recognizer().starts, 1);
        assert_eq!(s.recognizer().stops, 1);
    }

    #[test]
    fn permission_denied_stops_without_restart() {
        let mut s = session();
        s.start();
        let signals = s.handle_event(RecognizerEvent::Error(RecognizerFault::from_code(
            "not-allowed",
        )));
        assert_eq!(
            signals,
            vec![
                SessionSignal::Error(SpeechError::PermissionDenied),
                SessionSignal::Stopped
            ]
        );
        assert!(s.handle_event(RecognizerEvent::End).is_empty());
        assert_eq!(s.recognizer().starts, 1);
    }

    #[test]
    fn aborted_is_silent_and_other_faults_keep_listening() {
        let mut s = session();
        s.start();
        assert!(s
            .handle_event(RecognizerEvent::Error(RecognizerFault::from_code("aborted")))
            .is_empty());
        assert_eq!(
            s.handle_event(RecognizerEvent::Error(RecognizerFault::from_code("network"))),
            vec![SessionSignal::Error(SpeechError::Transcription(
                "network".to_string()
            ))]
        );
        assert!(s.is_listening());
    }

    #[test]
    fn failed_restart_stops_the_session() {
        let mut s = session();
        s.start();
        s.recognizer_mut().fail_next_start = true;
        let signals = s.handle_event(RecognizerEvent::End);
        assert_eq!(
            signals,
            vec![
                SessionSignal::Error(SpeechError::StartFailed("device busy".to_string())),
                SessionSignal::Stopped
            ]
        );
        assert!(!s.is_listening());
    }

    #[test]
    fn starting_twice_replaces_the_handle() {
        let mut s = session();
        s.start();
        s.start();
        assert_eq!(s.recognizer().stops, 1);
        assert_eq!(s.recognizer().starts, 2);
    }

    fn strict_session() -> SpeechSession<ScriptedRecognizer> {
        SpeechSession::new(
            ScriptedRecognizer {
                strict: true,
                ..Default::default()
            },
            RecognitionOptions::default(),
        )
    }

    #[test]
    fn end_of_replaced_handle_keeps_listening() {
        let mut s = strict_session();
        s.start();
        s.start();
        assert!(s.handle_event(RecognizerEvent::End).is_empty());
        assert!(s.is_listening());
        assert_eq!(s.recognizer().starts, 2);
        assert_eq!(s.restarts(), 0);

        // The live stream ending afterwards still restarts.
        s.recognizer_mut().running = false;
        assert!(s.handle_event(RecognizerEvent::End).is_empty());
        assert_eq!(s.restarts(), 1);
        assert_eq!(s.recognizer().starts, 3);
    }

    #[test]
    fn end_of_stopped_handle_after_restart_is_ignored() {
        let mut s = strict_session();
        s.start();
        s.stop();
        s.start();
        assert!(s.handle_event(RecognizerEvent::End).is_empty());
        assert!(s.is_listening());
        assert_eq!(s.recognizer().starts, 2);
    }

    #[test]
    fn transcripts_after_stop_are_still_delivered() {
        let mut s = session();
        s.start();
        s.stop();
        assert_eq!(
            s.handle_event(RecognizerEvent::Result("up".to_string())),
            vec![SessionSignal::Transcript("up".to_string())]
        );
    }
}
