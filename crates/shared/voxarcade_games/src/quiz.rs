use crate::command::{Command, NavDirection, QUIZ_OPTIONS};
use crate::event::GameEvent;

pub const CORRECT_POINTS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub category: &'static str,
    pub text: &'static str,
    pub options: [&'static str; QUIZ_OPTIONS],
    pub correct: usize,
}

pub const QUESTIONS: [Question; 3] = [
    Question {
        category: "Geography",
        text: "What is the capital of France?",
        options: ["London", "Berlin", "Paris", "Madrid"],
        correct: 2,
    },
    Question {
        category: "Science",
        text: "Which planet is known as the Red Planet?",
        options: ["Venus", "Mars", "Jupiter", "Saturn"],
        correct: 1,
    },
    Question {
        category: "Nature",
        text: "What is the largest mammal in the world?",
        options: ["African Elephant", "Blue Whale", "Giraffe", "Hippopotamus"],
        correct: 1,
    },
];

#[derive(Debug, Clone)]
pub struct QuizGame {
    questions: &'static [Question],
    current: usize,
    // Chosen option per question, once answered.
    answers: Vec<Option<usize>>,
    pub score: u32,
}

impl Default for QuizGame {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizGame {
    pub fn new() -> Self {
        Self::with_questions(&QUESTIONS)
    }

    pub fn with_questions(questions: &'static [Question]) -> Self {
        Self {
            questions,
            current: 0,
            answers: vec![None; questions.len()],
            score: 0,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    pub fn answer_for(&self, index: usize) -> Option<usize> {
        self.answers.get(index).copied().flatten()
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    pub fn apply(&mut self, command: &Command) -> Vec<GameEvent> {
        match command {
            Command::Answer { index } => self.answer(*index),
            Command::Navigate { direction } => self.navigate(*direction),
            _ => vec![GameEvent::Ignored],
        }
    }

    fn answer(&mut self, option: usize) -> Vec<GameEvent> {
        let Some(question) = self.questions.get(self.current) else {
            return vec![GameEvent::Ignored];
        };
        if option >= QUIZ_OPTIONS || self.answers[self.current].is_some() {
            return vec![GameEvent::Ignored];
        }

        self.answers[self.current] = Some(option);
        let correct = option == question.correct;
        let points = if correct { CORRECT_POINTS } else { 0 };
        self.score += points;
        vec![GameEvent::QuestionAnswered { correct, points }]
    }

    fn navigate(&mut self, direction: NavDirection) -> Vec<GameEvent> {
        let last = self.questions.len().saturating_sub(1);
        let next = match direction {
            NavDirection::Next => (self.current + 1).min(last),
            NavDirection::Previous => self.current.saturating_sub(1),
        };
        if next == self.current {
            return vec![GameEvent::Ignored];
        }
        self.current = next;
        vec![GameEvent::QuestionChanged { index: next }]
    }
}
