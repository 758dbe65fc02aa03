use serde::{Deserialize, Serialize};

/// The fixed set of games in the arcade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Adventure,
    Memory,
    Simon,
    Quiz,
    #[serde(rename = "wordguess")]
    WordGuess,
    #[serde(rename = "numberguess")]
    NumberGuess,
}

impl GameKind {
    pub const ALL: [GameKind; 6] = [
        GameKind::Adventure,
        GameKind::Memory,
        GameKind::Simon,
        GameKind::Quiz,
        GameKind::WordGuess,
        GameKind::NumberGuess,
    ];

    /// Stable key used in persisted progress records.
    pub fn label(self) -> &'static str {
        match self {
            GameKind::Adventure => "adventure",
            GameKind::Memory => "memory",
            GameKind::Simon => "simon",
            GameKind::Quiz => "quiz",
            GameKind::WordGuess => "wordguess",
            GameKind::NumberGuess => "numberguess",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            GameKind::Adventure => "Voice Adventure",
            GameKind::Memory => "Memory Match",
            GameKind::Simon => "Simon Says",
            GameKind::Quiz => "Voice Quiz",
            GameKind::WordGuess => "Word Guess",
            GameKind::NumberGuess => "Number Guess",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        GameKind::ALL
            .into_iter()
            .find(|k| k.label().eq_ignore_ascii_case(label))
    }

    /// Spoken/typed vocabulary for this game, as `(command, description)` pairs.
    pub fn commands(self) -> &'static [(&'static str, &'static str)] {
        match self {
            GameKind::Adventure => &[
                ("up", "Move player upward"),
                ("down", "Move player downward"),
                ("left", "Move player left"),
                ("right", "Move player right"),
                ("next level", "Go to next level"),
                ("restart", "Restart current level"),
            ],
            GameKind::Memory => &[
                ("flip 1-16", "Flip a card by its number"),
                ("reset", "Reset the game"),
            ],
            GameKind::Simon => &[
                ("red", "Select red color"),
                ("blue", "Select blue color"),
                ("green", "Select green color"),
                ("yellow", "Select yellow color"),
            ],
            GameKind::Quiz => &[
                ("answer 1-4", "Select answer by number"),
                ("next", "Go to next question"),
                ("previous", "Go to previous question"),
            ],
            GameKind::WordGuess => &[
                ("guess [letter]", "Guess a letter"),
                ("solve [word]", "Try to solve the word"),
                ("new game", "Start a new game"),
            ],
            GameKind::NumberGuess => &[
                ("guess [number]", "Make a guess"),
                ("new game", "Start a new game"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for kind in GameKind::ALL {
            assert_eq!(GameKind::from_label(kind.label()), Some(kind));
        }
        assert_eq!(GameKind::from_label(" WordGuess "), Some(GameKind::WordGuess));
        assert_eq!(GameKind::from_label("pong"), None);
    }
}
