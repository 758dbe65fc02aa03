use crate::command::{Direction, SimonColor};
use crate::number_guess::Hint;

/// Something a reducer reports after a command or a clock tick.
///
/// Events carry their own point value so the host can credit score without
/// knowing game rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// Command recognised but not applicable in the current state.
    Ignored,

    // Adventure
    Moved { direction: Direction },
    Bump,
    PowerUp { points: u32 },
    LevelComplete { points: u32 },
    TimeUp,

    // Memory
    CardFlipped { index: usize },
    PairMatched { points: u32 },
    PairMissed,
    CardsHidden,
    BoardCleared,

    // Simon
    ColorFlashed { color: SimonColor },
    PlaybackDone,
    ColorAccepted { color: SimonColor },
    RoundComplete { points: u32 },
    GameOver { score: u32 },

    // Word guess
    WordMasked,
    LetterHit { letter: char, points: u32 },
    LetterMiss { letter: char },
    AlreadyGuessed { letter: char },
    Solved { points: u32 },
    WrongSolution,
    Won,
    Lost,

    // Number guess
    NumberGuessed { value: u32, hint: Hint },
    NumberFound { points: u32, guesses: u32 },

    // Quiz
    QuestionAnswered { correct: bool, points: u32 },
    QuestionChanged { index: usize },

    /// Fresh board/round/word for the same level.
    NewRound,
    /// The level was won and the delay before advancing has elapsed.
    LevelAdvance,
}

impl GameEvent {
    pub fn points(&self) -> u32 {
        match self {
            GameEvent::PowerUp { points }
            | GameEvent::LevelComplete { points }
            | GameEvent::PairMatched { points }
            | GameEvent::RoundComplete { points }
            | GameEvent::LetterHit { points, .. }
            | GameEvent::Solved { points }
            | GameEvent::NumberFound { points, .. }
            | GameEvent::QuestionAnswered { points, .. } => *points,
            _ => 0,
        }
    }

    /// Sound effect name for this event, if any.
    pub fn sound_cue(&self) -> Option<&'static str> {
        match self {
            GameEvent::Moved { .. } => Some("move"),
            GameEvent::Bump => Some("bump"),
            GameEvent::PowerUp { .. } => Some("powerup"),
            GameEvent::LevelComplete { .. } => Some("complete"),
            GameEvent::CardFlipped { .. } => Some("flip"),
            GameEvent::PairMatched { .. } | GameEvent::LetterHit { .. } => Some("correct"),
            GameEvent::LetterMiss { .. } | GameEvent::WrongSolution | GameEvent::PairMissed => {
                Some("wrong")
            }
            GameEvent::ColorFlashed { color } | GameEvent::ColorAccepted { color } => {
                Some(color.as_str())
            }
            GameEvent::Solved { .. } | GameEvent::Won | GameEvent::NumberFound { .. } => {
                Some("win")
            }
            GameEvent::GameOver { .. } | GameEvent::Lost | GameEvent::TimeUp => Some("lose"),
            GameEvent::QuestionAnswered { correct: true, .. } => Some("correct"),
            GameEvent::QuestionAnswered { correct: false, .. } => Some("wrong"),
            GameEvent::LevelAdvance => Some("levelup"),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameEvent::Ignored => "ignored",
            GameEvent::Moved { .. } => "moved",
            GameEvent::Bump => "bump",
            GameEvent::PowerUp { .. } => "power_up",
            GameEvent::LevelComplete { .. } => "level_complete",
            GameEvent::TimeUp => "time_up",
            GameEvent::CardFlipped { .. } => "card_flipped",
            GameEvent::PairMatched { .. } => "pair_matched",
            GameEvent::PairMissed => "pair_missed",
            GameEvent::CardsHidden => "cards_hidden",
            GameEvent::BoardCleared => "board_cleared",
            GameEvent::ColorFlashed { .. } => "color_flashed",
            GameEvent::PlaybackDone => "playback_done",
            GameEvent::ColorAccepted { .. } => "color_accepted",
            GameEvent::RoundComplete { .. } => "round_complete",
            GameEvent::GameOver { .. } => "game_over",
            GameEvent::WordMasked => "word_masked",
            GameEvent::LetterHit { .. } => "letter_hit",
            GameEvent::LetterMiss { .. } => "letter_miss",
            GameEvent::AlreadyGuessed { .. } => "already_guessed",
            GameEvent::Solved { .. } => "solved",
            GameEvent::WrongSolution => "wrong_solution",
            GameEvent::Won => "won",
            GameEvent::Lost => "lost",
            GameEvent::NumberGuessed { .. } => "number_guessed",
            GameEvent::NumberFound { .. } => "number_found",
            GameEvent::QuestionAnswered { .. } => "question_answered",
            GameEvent::QuestionChanged { .. } => "question_changed",
            GameEvent::NewRound => "new_round",
            GameEvent::LevelAdvance => "level_advance",
        }
    }

    /// Whether this event closes a round (for [`crate::stats::RoundStats`]):
    /// `Some(true)` for a win, `Some(false)` for a loss.
    pub fn round_result(&self) -> Option<bool> {
        match self {
            GameEvent::LevelComplete { .. }
            | GameEvent::BoardCleared
            | GameEvent::Won
            | GameEvent::NumberFound { .. } => Some(true),
            GameEvent::TimeUp | GameEvent::GameOver { .. } | GameEvent::Lost => Some(false),
            GameEvent::QuestionAnswered { correct, .. } => Some(*correct),
            _ => None,
        }
    }
}

/// Total points across a batch of events.
pub fn total_points(events: &[GameEvent]) -> u32 {
    events.iter().map(GameEvent::points).sum()
}
