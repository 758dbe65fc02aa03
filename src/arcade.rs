//! The arcade: routes transcripts to the active game and applies what the
//! game reports to progress, sound and notices.

use std::collections::BTreeMap;

use tracing::{debug, info};
use voxarcade_games::adventure::AdventureGame;
use voxarcade_games::command::{self, Command};
use voxarcade_games::event::GameEvent;
use voxarcade_games::memory::MemoryGame;
use voxarcade_games::number_guess::NumberGuessGame;
use voxarcade_games::prng::Prng;
use voxarcade_games::quiz::QuizGame;
use voxarcade_games::simon::SimonGame;
use voxarcade_games::stage::Stage;
use voxarcade_games::stats::RoundStats;
use voxarcade_games::time::Instant;
use voxarcade_games::word_guess::WordGuessGame;
use voxarcade_games::GameKind;

use crate::notice::Notice;
use crate::progress::{GameProgress, ProgressStore};
use crate::sound::{AudioSink, SoundBoard};
use crate::speech::SessionSignal;
use crate::storage::KeyValueStore;

/// One running game.
#[derive(Debug, Clone)]
pub enum ActiveGame {
    Adventure(AdventureGame),
    Memory(MemoryGame),
    Simon(SimonGame),
    Quiz(QuizGame),
    WordGuess(WordGuessGame),
    NumberGuess(NumberGuessGame),
}

impl ActiveGame {
    pub fn new(kind: GameKind, level: u32, seed: u64, now: Instant) -> Self {
        match Stage::for_level(kind, level) {
            Stage::Adventure(stage) => ActiveGame::Adventure(AdventureGame::new(stage, seed, now)),
            Stage::Word(stage) => ActiveGame::WordGuess(WordGuessGame::new(stage, now)),
            // Only level-independent kinds map to a fixed stage.
            Stage::Fixed { .. } => match kind {
                GameKind::Memory => ActiveGame::Memory(MemoryGame::new(seed)),
                GameKind::Simon => ActiveGame::Simon(SimonGame::new(seed, now)),
                GameKind::Quiz => ActiveGame::Quiz(QuizGame::new()),
                _ => ActiveGame::NumberGuess(NumberGuessGame::new(seed)),
            },
        }
    }

    pub fn kind(&self) -> GameKind {
        match self {
            ActiveGame::Adventure(_) => GameKind::Adventure,
            ActiveGame::Memory(_) => GameKind::Memory,
            ActiveGame::Simon(_) => GameKind::Simon,
            ActiveGame::Quiz(_) => GameKind::Quiz,
            ActiveGame::WordGuess(_) => GameKind::WordGuess,
            ActiveGame::NumberGuess(_) => GameKind::NumberGuess,
        }
    }

    pub fn apply(&mut self, command: &Command, now: Instant) -> Vec<GameEvent> {
        match self {
            ActiveGame::Adventure(g) => g.apply(command, now),
            ActiveGame::Memory(g) => g.apply(command, now),
            ActiveGame::Simon(g) => g.apply(command, now),
            ActiveGame::Quiz(g) => g.apply(command),
            ActiveGame::WordGuess(g) => g.apply(command, now),
            ActiveGame::NumberGuess(g) => g.apply(command),
        }
    }

    pub fn tick(&mut self, now: Instant) -> Vec<GameEvent> {
        match self {
            ActiveGame::Adventure(g) => g.tick(now),
            ActiveGame::Memory(g) => g.tick(now),
            ActiveGame::Simon(g) => g.tick(now),
            ActiveGame::WordGuess(g) => g.tick(now),
            ActiveGame::Quiz(_) | ActiveGame::NumberGuess(_) => Vec::new(),
        }
    }

    /// Switch to `level`'s stage. Games whose rules don't depend on the level
    /// keep their current state.
    pub fn load_level(&mut self, level: u32, now: Instant) {
        let stage = Stage::for_level(self.kind(), level);
        match (self, stage) {
            (ActiveGame::Adventure(g), Stage::Adventure(stage)) => g.load_stage(stage, now),
            (ActiveGame::WordGuess(g), Stage::Word(stage)) => g.load_stage(stage, now),
            _ => {}
        }
    }
}

/// Dispatcher over the six games.
///
/// Owns the progress store (injected, never global) and the sound board.
/// Hosts feed it transcripts or speech-session signals and call
/// [`Arcade::tick`] regularly so reducer deadlines fire.
pub struct Arcade<S: KeyValueStore, A: AudioSink> {
    progress: ProgressStore<S>,
    sound: SoundBoard<A>,
    active: Option<ActiveGame>,
    notices: Vec<Notice>,
    stats: BTreeMap<GameKind, RoundStats>,
    rng: Prng,
    // Points credited since the current game was entered.
    session_points: u32,
}

impl<S: KeyValueStore, A: AudioSink> Arcade<S, A> {
    pub fn new(progress: ProgressStore<S>, sound: SoundBoard<A>, seed: u64) -> Self {
        Self {
            progress,
            sound,
            active: None,
            notices: Vec::new(),
            stats: BTreeMap::new(),
            rng: Prng::new(seed),
            session_points: 0,
        }
    }

    pub fn active(&self) -> Option<&ActiveGame> {
        self.active.as_ref()
    }

    pub fn active_kind(&self) -> Option<GameKind> {
        self.active.as_ref().map(ActiveGame::kind)
    }

    pub fn progress(&self, kind: GameKind) -> GameProgress {
        self.progress.get(kind)
    }

    pub fn progress_store(&self) -> &ProgressStore<S> {
        &self.progress
    }

    pub fn sound(&self) -> &SoundBoard<A> {
        &self.sound
    }

    pub fn sound_mut(&mut self) -> &mut SoundBoard<A> {
        &mut self.sound
    }

    /// Stage of the active game at its current level.
    pub fn stage(&self) -> Option<Stage> {
        let kind = self.active_kind()?;
        Some(Stage::for_level(kind, self.progress.get(kind).current_level))
    }

    pub fn stats(&self, kind: GameKind) -> Option<&RoundStats> {
        self.stats.get(&kind)
    }

    pub fn session_points(&self) -> u32 {
        self.session_points
    }

    /// Start `kind` at its saved level. Any running game is dropped.
    pub fn enter(&mut self, kind: GameKind, now: Instant) {
        let level = self.progress.get(kind).current_level;
        let seed = self.rng.fork_seed();
        self.active = Some(ActiveGame::new(kind, level, seed, now));
        self.session_points = 0;
        info!(game = kind.label(), level, "entered game");
    }

    pub fn leave(&mut self) {
        if let Some(game) = self.active.take() {
            info!(game = game.kind().label(), "left game");
        }
        self.session_points = 0;
    }

    /// Parse `text` for the active game and apply it. Returns the command
    /// that was recognised, if any.
    pub fn handle_transcript(&mut self, text: &str, now: Instant) -> Option<Command> {
        let kind = self.active_kind()?;
        let Some(cmd) = command::parse(kind, text) else {
            debug!(game = kind.label(), transcript = text, "no command recognised");
            return None;
        };
        debug!(game = kind.label(), ?cmd, "command");
        self.handle_command(&cmd, now);
        Some(cmd)
    }

    /// Apply an already-typed command (manual controls skip parsing).
    pub fn handle_command(&mut self, cmd: &Command, now: Instant) -> Vec<GameEvent> {
        let Some(game) = self.active.as_mut() else {
            return Vec::new();
        };
        let events = game.apply(cmd, now);
        self.process_events(&events, now);
        events
    }

    pub fn tick(&mut self, now: Instant) -> Vec<GameEvent> {
        let Some(game) = self.active.as_mut() else {
            return Vec::new();
        };
        let events = game.tick(now);
        self.process_events(&events, now);
        events
    }

    /// Route a speech-session signal. Transcripts go to the active game;
    /// lifecycle changes and errors become notices.
    pub fn handle_signal(&mut self, signal: SessionSignal, now: Instant) -> Option<Command> {
        match signal {
            SessionSignal::Transcript(text) => return self.handle_transcript(&text, now),
            SessionSignal::Started => self.notices.push(Notice::success("Voice control activated")),
            SessionSignal::Stopped => {
                self.notices.push(Notice::success("Voice control deactivated"))
            }
            SessionSignal::Error(e) => self.notices.push(Notice::error(e.to_string())),
        }
        None
    }

    /// Back to level 1 with no score. The running game, if it is `kind`,
    /// restarts at level 1.
    pub fn reset_progress(&mut self, kind: GameKind, now: Instant) {
        self.progress.reset(kind);
        self.notices.push(Notice::success("Progress Reset"));
        if self.active_kind() == Some(kind) {
            self.enter(kind, now);
        }
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn process_events(&mut self, events: &[GameEvent], now: Instant) {
        let Some(kind) = self.active_kind() else {
            return;
        };

        for event in events {
            let points = event.points();
            if points > 0 {
                self.progress.add_score(kind, points);
                self.session_points = self.session_points.saturating_add(points);
            }

            if let Some(cue) = event.sound_cue() {
                self.sound.play_cue(cue);
            }

            if let Some(won) = event.round_result() {
                self.stats.entry(kind).or_default().record_round(won);
            }

            if let Some(notice) = notice_for(event) {
                self.notices.push(notice);
            }

            if *event == GameEvent::LevelAdvance {
                let level = self.progress.advance_level(kind);
                self.notices
                    .push(Notice::success(format!("Level {level} Unlocked!")));
                if let Some(game) = self.active.as_mut() {
                    game.load_level(level, now);
                }
            }
        }
    }
}

fn notice_for(event: &GameEvent) -> Option<Notice> {
    let notice = match event {
        GameEvent::PowerUp { points } => Notice::success(format!("+{points} points!")),
        GameEvent::LevelComplete { points } => {
            Notice::success(format!("Level Complete! +{points} points!"))
        }
        GameEvent::TimeUp => Notice::error("Time's up! Try again."),
        GameEvent::AlreadyGuessed { .. } => Notice::error("Letter already guessed!"),
        GameEvent::LetterMiss { .. } => Notice::error("Incorrect guess!"),
        GameEvent::WrongSolution => Notice::error("Incorrect solution!"),
        GameEvent::GameOver { score } => Notice::error(format!("Game over! Score: {score}")),
        GameEvent::NumberFound { points, guesses } => {
            Notice::success(format!("Found it in {guesses} guesses! +{points} points!"))
        }
        _ => return None,
    };
    Some(notice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::DEFAULT_STORAGE_KEY;
    use crate::sound::TraceSink;
    use crate::speech::SpeechError;
    use crate::storage::{ChunkedStorage, MemoryStorage};
    use voxarcade_games::time::Duration;

    fn arcade() -> Arcade<MemoryStorage, TraceSink> {
        let progress =
            ProgressStore::load(ChunkedStorage::new(MemoryStorage::new()), DEFAULT_STORAGE_KEY);
        Arcade::new(progress, SoundBoard::new(TraceSink::default(), false), 1)
    }

    fn quiz(arcade: &Arcade<MemoryStorage, TraceSink>) -> &QuizGame {
        match arcade.active() {
            Some(ActiveGame::Quiz(q)) => q,
            other => panic!("expected quiz, got {other:?}"),
        }
    }

    #[test]
    fn each_kind_builds_its_own_game() {
        let now = Instant::now();
        for kind in GameKind::ALL {
            let game = ActiveGame::new(kind, 1, 9, now);
            assert_eq!(game.kind(), kind);
        }
        match ActiveGame::new(GameKind::WordGuess, 3, 9, now) {
            ActiveGame::WordGuess(g) => assert_eq!(g.word(), "CHERRY"),
            other => panic!("expected word guess, got {other:?}"),
        }
    }

    #[test]
    fn stage_follows_active_game_and_level() {
        let now = Instant::now();
        let mut a = arcade();
        assert_eq!(a.stage(), None);

        a.enter(GameKind::Adventure, now);
        match a.stage() {
            Some(Stage::Adventure(s)) => assert_eq!(s.level, 1),
            other => panic!("expected adventure stage, got {other:?}"),
        }

        a.enter(GameKind::Quiz, now);
        assert!(matches!(a.stage(), Some(Stage::Fixed { level: 1, .. })));
    }

    #[test]
    fn transcripts_without_a_game_are_dropped() {
        let mut a = arcade();
        assert_eq!(a.handle_transcript("up", Instant::now()), None);
    }

    #[test]
    fn quiz_answer_credits_progress_and_stats() {
        let now = Instant::now();
        let mut a = arcade();
        a.enter(GameKind::Quiz, now);

        assert_eq!(
            a.handle_transcript("Answer 3", now),
            Some(Command::Answer { index: 2 })
        );
        assert_eq!(a.progress(GameKind::Quiz).total_score, 100);
        assert_eq!(a.session_points(), 100);
        assert_eq!(quiz(&a).answer_for(0), Some(2));

        let stats = a.stats(GameKind::Quiz).unwrap();
        assert_eq!((stats.played, stats.won), (1, 1));
        // The correct-answer cue played.
        assert_eq!(a.sound().sink().played, 1);
    }

    #[test]
    fn unrecognised_transcript_changes_nothing() {
        let now = Instant::now();
        let mut a = arcade();
        a.enter(GameKind::Quiz, now);
        assert_eq!(a.handle_transcript("answer 7", now), None);
        assert_eq!(a.handle_transcript("hello", now), None);
        assert_eq!(quiz(&a).answered_count(), 0);
        assert_eq!(a.progress(GameKind::Quiz).total_score, 0);
    }

    #[test]
    fn word_guess_win_advances_level_and_loads_next_word() {
        let now = Instant::now();
        let mut a = arcade();
        a.enter(GameKind::WordGuess, now);

        let masked = now + Duration::from_secs(3);
        assert_eq!(a.tick(masked), vec![GameEvent::WordMasked]);
        a.handle_transcript("solve apple", masked);
        assert_eq!(a.progress(GameKind::WordGuess).total_score, 100);

        let later = masked + Duration::from_millis(1_500);
        assert_eq!(a.tick(later), vec![GameEvent::LevelAdvance]);

        let p = a.progress(GameKind::WordGuess);
        assert_eq!((p.current_level, p.highest_level), (2, 2));
        match a.active() {
            Some(ActiveGame::WordGuess(g)) => assert_eq!(g.word(), "BANANA"),
            other => panic!("expected word guess, got {other:?}"),
        }
        let notices = a.drain_notices();
        assert!(notices.contains(&Notice::success("Level 2 Unlocked!")));
        assert!(a.drain_notices().is_empty());
    }

    #[test]
    fn scores_are_kept_per_game() {
        let now = Instant::now();
        let mut a = arcade();
        a.enter(GameKind::Quiz, now);
        a.handle_transcript("answer 3", now);
        a.enter(GameKind::NumberGuess, now);
        a.handle_transcript("guess 0", now);

        assert_eq!(a.progress(GameKind::Quiz).total_score, 100);
        assert_eq!(a.progress(GameKind::NumberGuess).total_score, 0);
        assert_eq!(a.session_points(), 0);
    }

    #[test]
    fn speech_signals_become_notices_or_commands() {
        let now = Instant::now();
        let mut a = arcade();
        a.enter(GameKind::Simon, now);

        assert_eq!(a.handle_signal(SessionSignal::Started, now), None);
        a.handle_signal(SessionSignal::Error(SpeechError::PermissionDenied), now);
        let notices = a.drain_notices();
        assert_eq!(notices[0], Notice::success("Voice control activated"));
        assert!(notices[1].is_error());

        // Simon is still in playback, so the colour is recognised but ignored.
        assert!(a
            .handle_signal(SessionSignal::Transcript("red".to_string()), now)
            .is_some());
    }

    #[test]
    fn reset_restarts_the_running_game_at_level_one() {
        let now = Instant::now();
        let mut a = arcade();
        a.enter(GameKind::WordGuess, now);
        let masked = now + Duration::from_secs(3);
        a.tick(masked);
        a.handle_transcript("solve apple", masked);
        a.tick(masked + Duration::from_millis(1_500));
        assert_eq!(a.progress(GameKind::WordGuess).current_level, 2);

        a.reset_progress(GameKind::WordGuess, masked);
        assert_eq!(a.progress(GameKind::WordGuess), GameProgress::default());
        match a.active() {
            Some(ActiveGame::WordGuess(g)) => assert_eq!(g.word(), "APPLE"),
            other => panic!("expected word guess, got {other:?}"),
        }
    }

    #[test]
    fn leaving_drops_game_state() {
        let now = Instant::now();
        let mut a = arcade();
        a.enter(GameKind::Memory, now);
        a.leave();
        assert!(a.active().is_none());
        assert!(a.tick(now).is_empty());
    }
}
