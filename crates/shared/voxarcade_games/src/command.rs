//! Transcript → command parsing.
//!
//! Each game has a small literal vocabulary. Matching is case-insensitive and
//! substring based; the first pattern that matches wins. Anything else yields
//! `None` and is silently ignored by the caller.
//!
//! | game         | patterns, in match order                                   |
//! |--------------|------------------------------------------------------------|
//! | adventure    | `up`, `down`, `left`, `right`, `next level`, `restart`     |
//! | memory       | `flip <n>` (1-based), `reset`                              |
//! | simon        | whole transcript is `red` / `blue` / `green` / `yellow`    |
//! | quiz         | `answer <n>` (1..=4), `next`, `previous`                   |
//! | word guess   | `guess <letter>`, `solve <word>`, `new game`               |
//! | number guess | `guess <n>`, `new game`                                    |

#[cfg(not(feature = "std"))]
use alloc::string::String;

use serde::{Deserialize, Serialize};

use crate::kind::GameKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Grid delta `(dx, dy)`; `y` grows downward.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavDirection {
    Next,
    Previous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimonColor {
    Red,
    Blue,
    Green,
    Yellow,
}

impl SimonColor {
    pub const ALL: [SimonColor; 4] = [
        SimonColor::Red,
        SimonColor::Blue,
        SimonColor::Green,
        SimonColor::Yellow,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SimonColor::Red => "red",
            SimonColor::Blue => "blue",
            SimonColor::Green => "green",
            SimonColor::Yellow => "yellow",
        }
    }

    pub fn from_word(word: &str) -> Option<Self> {
        SimonColor::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(word))
    }
}

/// A typed instruction for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Move { direction: Direction },
    NextLevel,
    Restart,
    /// Zero-based card index.
    Flip { index: usize },
    Color { color: SimonColor },
    /// Zero-based option index.
    Answer { index: usize },
    Navigate { direction: NavDirection },
    /// Upper-case ASCII letter.
    GuessLetter { letter: char },
    /// Upper-case attempt at the whole word.
    Solve { word: String },
    GuessNumber { value: u32 },
    Reset,
    NewGame,
}

/// Number of options every quiz question offers.
pub const QUIZ_OPTIONS: usize = 4;

/// Parse `transcript` with the vocabulary of `kind`.
pub fn parse(kind: GameKind, transcript: &str) -> Option<Command> {
    let text = transcript.to_lowercase();
    match kind {
        GameKind::Adventure => parse_adventure(&text),
        GameKind::Memory => parse_memory(&text),
        GameKind::Simon => parse_simon(&text),
        GameKind::Quiz => parse_quiz(&text),
        GameKind::WordGuess => parse_word_guess(&text),
        GameKind::NumberGuess => parse_number_guess(&text),
    }
}

fn parse_adventure(text: &str) -> Option<Command> {
    let text = text.trim();
    if text.contains("up") {
        Some(Command::Move {
            direction: Direction::Up,
        })
    } else if text.contains("down") {
        Some(Command::Move {
            direction: Direction::Down,
        })
    } else if text.contains("left") {
        Some(Command::Move {
            direction: Direction::Left,
        })
    } else if text.contains("right") {
        Some(Command::Move {
            direction: Direction::Right,
        })
    } else if text.contains("next level") {
        Some(Command::NextLevel)
    } else if text.contains("restart") {
        Some(Command::Restart)
    } else {
        None
    }
}

fn parse_memory(text: &str) -> Option<Command> {
    if let Some(n) = capture_number(text, "flip ") {
        // "flip 0" names no card.
        let index = (n as usize).checked_sub(1)?;
        return Some(Command::Flip { index });
    }
    if text.contains("reset") {
        return Some(Command::Reset);
    }
    None
}

fn parse_simon(text: &str) -> Option<Command> {
    SimonColor::from_word(text.trim()).map(|color| Command::Color { color })
}

fn parse_quiz(text: &str) -> Option<Command> {
    if let Some(n) = capture_number(text, "answer ") {
        // An answer outside 1..=4 is consumed without effect; it never falls
        // through to navigation.
        let index = (n as usize).checked_sub(1)?;
        if index >= QUIZ_OPTIONS {
            return None;
        }
        return Some(Command::Answer { index });
    }
    if text.contains("next") {
        Some(Command::Navigate {
            direction: NavDirection::Next,
        })
    } else if text.contains("previous") {
        Some(Command::Navigate {
            direction: NavDirection::Previous,
        })
    } else {
        None
    }
}

fn parse_word_guess(text: &str) -> Option<Command> {
    if let Some(letter) = capture(text, "guess ", |c| c.is_ascii_alphabetic()) {
        let letter = letter.chars().next()?.to_ascii_uppercase();
        return Some(Command::GuessLetter { letter });
    }
    if let Some(word) = capture(text, "solve ", |c| c.is_ascii_alphanumeric() || c == '_') {
        return Some(Command::Solve {
            word: word.to_ascii_uppercase(),
        });
    }
    if text.contains("new game") {
        return Some(Command::NewGame);
    }
    None
}

fn parse_number_guess(text: &str) -> Option<Command> {
    if let Some(value) = capture_number(text, "guess ") {
        return Some(Command::GuessNumber { value });
    }
    if text.contains("new game") {
        return Some(Command::NewGame);
    }
    None
}

/// First run of `accept` characters directly after any occurrence of `keyword`.
///
/// `keyword` carries its trailing space, so `capture("flip 3", "flip ", ..)`
/// yields `"3"`. Later occurrences are tried when an earlier one is not
/// followed by an accepted character.
fn capture<'a>(text: &'a str, keyword: &str, accept: impl Fn(char) -> bool) -> Option<&'a str> {
    for (at, _) in text.match_indices(keyword) {
        let rest = &text[at + keyword.len()..];
        let end = rest
            .char_indices()
            .find(|&(_, c)| !accept(c))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        if end > 0 {
            return Some(&rest[..end]);
        }
    }
    None
}

/// Like [`capture`] for ASCII digits. Values too large for `u32` saturate so
/// they stay out of range for every game rather than failing to parse.
fn capture_number(text: &str, keyword: &str) -> Option<u32> {
    let digits = capture(text, keyword, |c| c.is_ascii_digit())?;
    Some(digits.bytes().fold(0u32, |acc, b| {
        acc.saturating_mul(10).saturating_add(u32::from(b - b'0'))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(direction: Direction) -> Option<Command> {
        Some(Command::Move { direction })
    }

    #[test]
    fn adventure_vocabulary_first_match_wins() {
        assert_eq!(parse(GameKind::Adventure, "Up"), mv(Direction::Up));
        assert_eq!(parse(GameKind::Adventure, "go down please"), mv(Direction::Down));
        assert_eq!(parse(GameKind::Adventure, " LEFT "), mv(Direction::Left));
        assert_eq!(parse(GameKind::Adventure, "right"), mv(Direction::Right));
        // "up" is checked before "down".
        assert_eq!(parse(GameKind::Adventure, "up and down"), mv(Direction::Up));
        assert_eq!(parse(GameKind::Adventure, "next level"), Some(Command::NextLevel));
        assert_eq!(parse(GameKind::Adventure, "restart"), Some(Command::Restart));
        assert_eq!(parse(GameKind::Adventure, "jump"), None);
    }

    #[test]
    fn memory_flip_is_one_based() {
        assert_eq!(
            parse(GameKind::Memory, "Flip 1"),
            Some(Command::Flip { index: 0 })
        );
        assert_eq!(
            parse(GameKind::Memory, "please flip 16 now"),
            Some(Command::Flip { index: 15 })
        );
        // Out of range still parses; the board ignores it.
        assert_eq!(
            parse(GameKind::Memory, "flip 40"),
            Some(Command::Flip { index: 39 })
        );
        assert_eq!(parse(GameKind::Memory, "flip 0"), None);
        assert_eq!(parse(GameKind::Memory, "flip it"), None);
        assert_eq!(parse(GameKind::Memory, "reset"), Some(Command::Reset));
    }

    #[test]
    fn simon_needs_exact_colour() {
        assert_eq!(
            parse(GameKind::Simon, " Red "),
            Some(Command::Color {
                color: SimonColor::Red
            })
        );
        assert_eq!(parse(GameKind::Simon, "red please"), None);
        assert_eq!(parse(GameKind::Simon, "purple"), None);
    }

    #[test]
    fn quiz_answers_and_navigation() {
        assert_eq!(
            parse(GameKind::Quiz, "answer 3"),
            Some(Command::Answer { index: 2 })
        );
        assert_eq!(parse(GameKind::Quiz, "answer 5"), None);
        // An out-of-range answer does not fall through to "next".
        assert_eq!(parse(GameKind::Quiz, "answer 9 next"), None);
        assert_eq!(
            parse(GameKind::Quiz, "Next"),
            Some(Command::Navigate {
                direction: NavDirection::Next
            })
        );
        assert_eq!(
            parse(GameKind::Quiz, "previous"),
            Some(Command::Navigate {
                direction: NavDirection::Previous
            })
        );
    }

    #[test]
    fn word_guess_letter_before_solve() {
        assert_eq!(
            parse(GameKind::WordGuess, "guess e"),
            Some(Command::GuessLetter { letter: 'E' })
        );
        // Like `guess (\w)`, only the first character after "guess " counts.
        assert_eq!(
            parse(GameKind::WordGuess, "guess apple"),
            Some(Command::GuessLetter { letter: 'A' })
        );
        assert_eq!(
            parse(GameKind::WordGuess, "solve banana"),
            Some(Command::Solve {
                word: "BANANA".to_string()
            })
        );
        assert_eq!(parse(GameKind::WordGuess, "new game"), Some(Command::NewGame));
        assert_eq!(parse(GameKind::WordGuess, "guess"), None);
    }

    #[test]
    fn number_guess_saturates_large_values() {
        assert_eq!(
            parse(GameKind::NumberGuess, "I guess 42"),
            Some(Command::GuessNumber { value: 42 })
        );
        assert_eq!(
            parse(GameKind::NumberGuess, "guess 99999999999999"),
            Some(Command::GuessNumber { value: u32::MAX })
        );
        assert_eq!(
            parse(GameKind::NumberGuess, "guess what, guess 7"),
            Some(Command::GuessNumber { value: 7 })
        );
        assert_eq!(parse(GameKind::NumberGuess, "New Game"), Some(Command::NewGame));
    }
}
