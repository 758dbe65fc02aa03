use crate::command::Command;
use crate::event::GameEvent;
use crate::prng::Prng;

pub const MIN_NUMBER: u32 = 1;
pub const MAX_NUMBER: u32 = 100;
pub const BASE_POINTS: u32 = 100;
pub const POINTS_PER_GUESS: u32 = 10;
pub const MIN_POINTS: u32 = 10;

/// Direction from the most recent guess to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hint {
    /// No guess yet.
    None,
    Higher,
    Lower,
    Correct,
}

impl Hint {
    pub fn message(self) -> &'static str {
        match self {
            Hint::None => "Make your first guess!",
            Hint::Higher => "Higher!",
            Hint::Lower => "Lower!",
            Hint::Correct => "You got it!",
        }
    }
}

/// Points for finding the target on guess number `guesses`.
pub fn award_for(guesses: u32) -> u32 {
    BASE_POINTS
        .saturating_sub(POINTS_PER_GUESS.saturating_mul(guesses))
        .max(MIN_POINTS)
}

#[derive(Debug, Clone)]
pub struct NumberGuessGame {
    target: u32,
    guesses: Vec<u32>,
    pub score: u32,
    rng: Prng,
}

impl NumberGuessGame {
    pub fn new(seed: u64) -> Self {
        let mut g = Self {
            target: MIN_NUMBER,
            guesses: Vec::new(),
            score: 0,
            rng: Prng::new(seed),
        };
        g.new_game();
        g
    }

    pub fn guesses(&self) -> &[u32] {
        &self.guesses
    }

    pub fn is_solved(&self) -> bool {
        self.guesses.contains(&self.target)
    }

    pub fn hint(&self) -> Hint {
        match self.guesses.last() {
            None => Hint::None,
            Some(&g) if g == self.target => Hint::Correct,
            Some(&g) if g > self.target => Hint::Lower,
            Some(_) => Hint::Higher,
        }
    }

    /// Re-roll the target and clear history. Cumulative score is kept.
    pub fn new_game(&mut self) {
        self.target = self.rng.gen_inclusive_u32(MIN_NUMBER, MAX_NUMBER);
        self.guesses.clear();
    }

    pub fn apply(&mut self, command: &Command) -> Vec<GameEvent> {
        match command {
            Command::GuessNumber { value } => self.guess(*value),
            Command::NewGame => {
                self.new_game();
                vec![GameEvent::NewRound]
            }
            _ => vec![GameEvent::Ignored],
        }
    }

    fn guess(&mut self, value: u32) -> Vec<GameEvent> {
        if !(MIN_NUMBER..=MAX_NUMBER).contains(&value)
            || self.is_solved()
            || self.guesses.contains(&value)
        {
            return vec![GameEvent::Ignored];
        }

        self.guesses.push(value);
        let mut events = vec![GameEvent::NumberGuessed {
            value,
            hint: self.hint(),
        }];

        if value == self.target {
            let guesses = self.guesses.len() as u32;
            let points = award_for(guesses);
            self.score += points;
            events.push(GameEvent::NumberFound { points, guesses });
        }
        events
    }

    #[cfg(test)]
    fn target(&self) -> u32 {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::total_points;

    fn guess(value: u32) -> Command {
        Command::GuessNumber { value }
    }

    #[test]
    fn award_decays_and_floors() {
        assert_eq!(award_for(1), 90);
        assert_eq!(award_for(2), 80);
        assert_eq!(award_for(9), 10);
        assert_eq!(award_for(40), 10);
    }

    #[test]
    fn second_guess_hit_awards_eighty_once() {
        let mut g = NumberGuessGame::new(77);
        let target = g.target();
        let miss = if target == MAX_NUMBER { MIN_NUMBER } else { MAX_NUMBER };

        let events = g.apply(&guess(miss));
        assert_eq!(total_points(&events), 0);
        let events = g.apply(&guess(target));
        assert_eq!(total_points(&events), 80);
        assert_eq!(g.hint(), Hint::Correct);

        // Solved: further guesses, including the target, do nothing.
        assert_eq!(g.apply(&guess(target)), vec![GameEvent::Ignored]);
        assert_eq!(g.score, 80);
    }

    #[test]
    fn repeated_and_out_of_range_guesses_are_no_ops() {
        let mut g = NumberGuessGame::new(5);
        let target = g.target();
        let miss = if target == 50 { 51 } else { 50 };

        g.apply(&guess(miss));
        assert_eq!(g.apply(&guess(miss)), vec![GameEvent::Ignored]);
        assert_eq!(g.apply(&guess(0)), vec![GameEvent::Ignored]);
        assert_eq!(g.apply(&guess(101)), vec![GameEvent::Ignored]);
        assert_eq!(g.guesses(), &[miss]);
        let expected = if miss > target { Hint::Lower } else { Hint::Higher };
        assert_eq!(g.hint(), expected);
    }

    #[test]
    fn new_game_keeps_score() {
        let mut g = NumberGuessGame::new(12);
        let target = g.target();
        g.apply(&guess(target));
        assert_eq!(g.score, 90);

        assert_eq!(g.apply(&Command::NewGame), vec![GameEvent::NewRound]);
        assert!(g.guesses().is_empty());
        assert_eq!(g.hint(), Hint::None);
        assert_eq!(g.score, 90);
    }
}
