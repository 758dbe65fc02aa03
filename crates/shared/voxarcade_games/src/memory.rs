use crate::command::Command;
use crate::event::GameEvent;
use crate::prng::Prng;
use crate::time::{after_ms, reached, Instant};

pub const PAIRS: usize = 8;
pub const MATCH_POINTS: u32 = 100;
/// How long a mismatched pair stays face-up.
pub const FLIP_BACK_DELAY_MS: u64 = 1_000;
/// Pause after the last pair before a fresh board is dealt.
pub const NEW_BOARD_DELAY_MS: u64 = 1_500;

pub const SYMBOLS: [&str; PAIRS] = ["🎮", "🎲", "🎯", "🎪", "🎨", "🎭", "🎸", "🎺"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: usize,
    pub value: &'static str,
    pub face_up: bool,
    pub matched: bool,
}

/// Memory match over a 4x4 board of eight symbol pairs.
#[derive(Debug, Clone)]
pub struct MemoryGame {
    cards: Vec<Card>,
    // Face-up cards that are not matched yet (0, 1 or 2).
    pending: Vec<usize>,
    flip_back_at: Option<Instant>,
    new_board_at: Option<Instant>,
    pub score: u32,
    pub matches: u32,
    rng: Prng,
}

impl MemoryGame {
    pub fn new(seed: u64) -> Self {
        let mut g = Self {
            cards: Vec::with_capacity(PAIRS * 2),
            pending: Vec::with_capacity(2),
            flip_back_at: None,
            new_board_at: None,
            score: 0,
            matches: 0,
            rng: Prng::new(seed),
        };
        g.deal();
        g
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// True while a mismatched pair is showing and flips are rejected.
    pub fn is_resolving(&self) -> bool {
        self.flip_back_at.is_some()
    }

    pub fn is_cleared(&self) -> bool {
        self.matches as usize == PAIRS
    }

    pub fn apply(&mut self, command: &Command, now: Instant) -> Vec<GameEvent> {
        match command {
            Command::Flip { index } => self.flip(*index, now),
            // The cleared board still owes its level advance.
            Command::Reset if self.new_board_at.is_some() => vec![GameEvent::Ignored],
            Command::Reset => {
                self.deal();
                self.score = 0;
                self.matches = 0;
                vec![GameEvent::NewRound]
            }
            _ => vec![GameEvent::Ignored],
        }
    }

    pub fn tick(&mut self, now: Instant) -> Vec<GameEvent> {
        let mut events = Vec::new();

        if let Some(at) = self.flip_back_at {
            if reached(now, at) {
                for &i in &self.pending {
                    self.cards[i].face_up = false;
                }
                self.pending.clear();
                self.flip_back_at = None;
                events.push(GameEvent::CardsHidden);
            }
        }

        if let Some(at) = self.new_board_at {
            if reached(now, at) {
                self.deal();
                self.matches = 0;
                events.push(GameEvent::NewRound);
                events.push(GameEvent::LevelAdvance);
            }
        }
        events
    }

    fn flip(&mut self, index: usize, now: Instant) -> Vec<GameEvent> {
        if self.flip_back_at.is_some() || self.new_board_at.is_some() {
            return vec![GameEvent::Ignored];
        }
        let Some(card) = self.cards.get_mut(index) else {
            return vec![GameEvent::Ignored];
        };
        if card.matched || card.face_up {
            return vec![GameEvent::Ignored];
        }
        card.face_up = true;

        let mut events = vec![GameEvent::CardFlipped { index }];

        let Some(&first) = self.pending.first() else {
            self.pending.push(index);
            return events;
        };

        if self.cards[first].value == self.cards[index].value {
            self.cards[first].matched = true;
            self.cards[index].matched = true;
            self.pending.clear();
            self.score += MATCH_POINTS;
            self.matches += 1;
            events.push(GameEvent::PairMatched {
                points: MATCH_POINTS,
            });
            if self.is_cleared() {
                self.new_board_at = Some(after_ms(now, NEW_BOARD_DELAY_MS));
                events.push(GameEvent::BoardCleared);
            }
        } else {
            self.pending.push(index);
            self.flip_back_at = Some(after_ms(now, FLIP_BACK_DELAY_MS));
            events.push(GameEvent::PairMissed);
        }
        events
    }

    fn deal(&mut self) {
        let mut values: Vec<&'static str> = SYMBOLS.iter().chain(SYMBOLS.iter()).copied().collect();
        self.rng.shuffle(&mut values);
        self.cards = values
            .into_iter()
            .enumerate()
            .map(|(id, value)| Card {
                id,
                value,
                face_up: false,
                matched: false,
            })
            .collect();
        self.pending.clear();
        self.flip_back_at = None;
        self.new_board_at = None;
    }

    #[cfg(test)]
    fn pair_of(&self, index: usize) -> usize {
        let value = self.cards[index].value;
        (0..self.cards.len())
            .find(|&j| j != index && self.cards[j].value == value)
            .unwrap()
    }

    #[cfg(test)]
    fn non_pair_of(&self, index: usize) -> usize {
        let value = self.cards[index].value;
        (0..self.cards.len())
            .find(|&j| self.cards[j].value != value)
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::total_points;
    use crate::time::Duration;

    fn flip(index: usize) -> Command {
        Command::Flip { index }
    }

    #[test]
    fn board_has_eight_pairs() {
        let g = MemoryGame::new(3);
        assert_eq!(g.cards().len(), 16);
        for symbol in SYMBOLS {
            assert_eq!(g.cards().iter().filter(|c| c.value == symbol).count(), 2);
        }
    }

    #[test]
    fn matching_pair_scores_exactly_100() {
        let now = Instant::now();
        let mut g = MemoryGame::new(11);
        let j = g.pair_of(0);

        let mut events = g.apply(&flip(0), now);
        events.extend(g.apply(&flip(j), now));
        assert_eq!(total_points(&events), MATCH_POINTS);
        assert!(g.cards()[0].matched && g.cards()[j].matched);

        // Matched cards can't be flipped again.
        assert_eq!(g.apply(&flip(0), now), vec![GameEvent::Ignored]);
    }

    #[test]
    fn mismatch_hides_both_after_delay_and_blocks_flips() {
        let now = Instant::now();
        let mut g = MemoryGame::new(11);
        let j = g.non_pair_of(0);
        let k = g.pair_of(0);

        g.apply(&flip(0), now);
        let events = g.apply(&flip(j), now);
        assert!(events.contains(&GameEvent::PairMissed));
        assert_eq!(total_points(&events), 0);
        assert!(g.is_resolving());
        assert_eq!(g.apply(&flip(k), now), vec![GameEvent::Ignored]);

        assert!(g.tick(now + Duration::from_millis(500)).is_empty());
        let events = g.tick(now + Duration::from_millis(FLIP_BACK_DELAY_MS));
        assert_eq!(events, vec![GameEvent::CardsHidden]);
        assert!(!g.cards()[0].face_up && !g.cards()[j].face_up);
        assert_eq!(g.score, 0);
    }

    #[test]
    fn flipping_same_card_twice_is_a_no_op() {
        let now = Instant::now();
        let mut g = MemoryGame::new(5);
        g.apply(&flip(4), now);
        assert_eq!(g.apply(&flip(4), now), vec![GameEvent::Ignored]);
        assert_eq!(g.apply(&flip(16), now), vec![GameEvent::Ignored]);
    }

    #[test]
    fn clearing_board_deals_a_new_one_and_advances() {
        let now = Instant::now();
        let mut g = MemoryGame::new(21);
        let mut events = Vec::new();
        for i in 0..16 {
            if g.cards()[i].matched {
                continue;
            }
            let j = g.pair_of(i);
            events.extend(g.apply(&flip(i), now));
            events.extend(g.apply(&flip(j), now));
        }
        assert!(events.contains(&GameEvent::BoardCleared));
        assert_eq!(g.score, 800);

        let events = g.tick(now + Duration::from_millis(NEW_BOARD_DELAY_MS));
        assert_eq!(events, vec![GameEvent::NewRound, GameEvent::LevelAdvance]);
        assert_eq!(g.matches, 0);
        assert_eq!(g.score, 800);
        assert!(g.cards().iter().all(|c| !c.matched && !c.face_up));
    }

    #[test]
    fn reset_waits_for_pending_advance() {
        let now = Instant::now();
        let mut g = MemoryGame::new(21);
        for i in 0..16 {
            if g.cards()[i].matched {
                continue;
            }
            let j = g.pair_of(i);
            g.apply(&flip(i), now);
            g.apply(&flip(j), now);
        }
        assert!(g.is_cleared());
        assert_eq!(g.apply(&Command::Reset, now), vec![GameEvent::Ignored]);
        assert_eq!(
            g.tick(now + Duration::from_millis(NEW_BOARD_DELAY_MS)),
            vec![GameEvent::NewRound, GameEvent::LevelAdvance]
        );
        assert_eq!(g.apply(&Command::Reset, now), vec![GameEvent::NewRound]);
    }

    #[test]
    fn reset_zeroes_score_and_matches() {
        let now = Instant::now();
        let mut g = MemoryGame::new(8);
        let j = g.pair_of(0);
        g.apply(&flip(0), now);
        g.apply(&flip(j), now);
        assert_eq!(g.apply(&Command::Reset, now), vec![GameEvent::NewRound]);
        assert_eq!(g.score, 0);
        assert_eq!(g.matches, 0);
    }
}
