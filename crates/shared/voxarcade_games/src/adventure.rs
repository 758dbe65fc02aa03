use std::collections::VecDeque;

use crate::command::{Command, Direction};
use crate::event::GameEvent;
use crate::prng::Prng;
use crate::stage::AdventureStage;
use crate::time::{after_ms, reached, Duration, Instant};

pub const POWER_UP_POINTS: u32 = 50;
pub const COMPLETION_BASE_POINTS: u32 = 100;
/// Pause between reaching the goal and loading the next level.
pub const ADVANCE_DELAY_MS: u64 = 1_500;

// Re-sample obstacle layouts that wall off the goal, up to this many times.
const LAYOUT_ATTEMPTS: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: u32,
    pub y: u32,
}

impl Cell {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Neighbour in `direction`, or `None` when that leaves a `grid_size` grid.
    pub fn step(self, direction: Direction, grid_size: u32) -> Option<Cell> {
        let (dx, dy) = direction.delta();
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        if x >= grid_size || y >= grid_size {
            return None;
        }
        Some(Cell::new(x, y))
    }

    fn idx(self, grid_size: u32) -> usize {
        (self.y as usize) * (grid_size as usize) + (self.x as usize)
    }
}

/// Grid adventure: walk from the top-left corner to the goal in the
/// bottom-right corner before the clock runs out.
#[derive(Debug, Clone)]
pub struct AdventureGame {
    stage: AdventureStage,
    pub position: Cell,
    pub target: Cell,
    obstacles: Vec<Cell>,
    power_ups: Vec<Cell>,
    time_left: u32,
    complete: bool,
    rng: Prng,
    next_second_at: Instant,
    advance_at: Option<Instant>,
}

impl AdventureGame {
    pub fn new(stage: AdventureStage, seed: u64, now: Instant) -> Self {
        let mut g = Self {
            stage,
            position: Cell::new(0, 0),
            target: Cell::new(0, 0),
            obstacles: Vec::new(),
            power_ups: Vec::new(),
            time_left: stage.time_limit,
            complete: false,
            rng: Prng::new(seed),
            next_second_at: now,
            advance_at: None,
        };
        g.restart(now);
        g
    }

    pub fn stage(&self) -> &AdventureStage {
        &self.stage
    }

    pub fn grid_size(&self) -> u32 {
        self.stage.grid_size.max(2)
    }

    pub fn obstacles(&self) -> &[Cell] {
        &self.obstacles
    }

    pub fn power_ups(&self) -> &[Cell] {
        &self.power_ups
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Switch to another level's configuration and lay it out.
    pub fn load_stage(&mut self, stage: AdventureStage, now: Instant) {
        self.stage = stage;
        self.restart(now);
    }

    /// Re-roll obstacles and power-ups, return to the start and refill the clock.
    pub fn restart(&mut self, now: Instant) {
        let n = self.grid_size();
        self.position = Cell::new(0, 0);
        self.target = Cell::new(n - 1, n - 1);
        self.generate_layout();
        self.time_left = self.stage.time_limit;
        self.complete = false;
        self.next_second_at = now + Duration::from_secs(1);
        self.advance_at = None;
    }

    pub fn apply(&mut self, command: &Command, now: Instant) -> Vec<GameEvent> {
        match command {
            Command::NextLevel if self.complete && self.advance_at.is_some() => {
                self.advance_at = None;
                vec![GameEvent::LevelAdvance]
            }
            // Nothing else is accepted while the level-complete pause runs.
            _ if self.complete => vec![GameEvent::Ignored],
            Command::Move { direction } => self.try_move(*direction, now),
            Command::Restart => {
                self.restart(now);
                vec![GameEvent::NewRound]
            }
            _ => vec![GameEvent::Ignored],
        }
    }

    /// Count the clock down and fire the level-advance delay.
    pub fn tick(&mut self, now: Instant) -> Vec<GameEvent> {
        let mut events = Vec::new();

        if self.complete {
            if let Some(at) = self.advance_at {
                if reached(now, at) {
                    self.advance_at = None;
                    events.push(GameEvent::LevelAdvance);
                }
            }
            return events;
        }

        while self.time_left > 0 && reached(now, self.next_second_at) {
            self.time_left -= 1;
            self.next_second_at += Duration::from_secs(1);
        }

        if self.time_left == 0 {
            // Out of time: same level again, score untouched.
            events.push(GameEvent::TimeUp);
            self.restart(now);
        }
        events
    }

    fn try_move(&mut self, direction: Direction, now: Instant) -> Vec<GameEvent> {
        let n = self.grid_size();
        let Some(next) = self.position.step(direction, n) else {
            return vec![GameEvent::Bump];
        };
        if self.obstacles.contains(&next) {
            return vec![GameEvent::Bump];
        }

        self.position = next;
        let mut events = vec![GameEvent::Moved { direction }];

        if let Some(i) = self.power_ups.iter().position(|&p| p == next) {
            self.power_ups.remove(i);
            events.push(GameEvent::PowerUp {
                points: POWER_UP_POINTS,
            });
        }

        if next == self.target {
            self.complete = true;
            self.advance_at = Some(after_ms(now, ADVANCE_DELAY_MS));
            events.push(GameEvent::LevelComplete {
                points: COMPLETION_BASE_POINTS + self.time_left,
            });
        }
        events
    }

    fn generate_layout(&mut self) {
        let n = self.grid_size();
        let start = self.position;
        let goal = self.target;
        // Leave at least one free cell besides start and goal.
        let free = (n * n) as usize - 2;
        let obstacle_count = (self.stage.obstacles as usize).min(free.saturating_sub(1));

        let mut obstacles = Vec::new();
        for attempt in 0..LAYOUT_ATTEMPTS {
            obstacles = sample_cells(&mut self.rng, n, obstacle_count, &[start, goal]);
            if goal_reachable(n, &obstacles, start, goal) {
                break;
            }
            if attempt + 1 == LAYOUT_ATTEMPTS {
                // Give up on the obstacles rather than ship a dead level.
                obstacles.clear();
            }
        }

        let mut taken = obstacles.clone();
        taken.push(start);
        taken.push(goal);
        let power_count = (self.stage.power_ups as usize).min((n * n) as usize - taken.len());
        self.power_ups = sample_cells(&mut self.rng, n, power_count, &taken);
        self.obstacles = obstacles;
    }

    #[cfg(test)]
    fn set_layout(&mut self, obstacles: Vec<Cell>, power_ups: Vec<Cell>) {
        self.obstacles = obstacles;
        self.power_ups = power_ups;
    }
}

/// `count` distinct uniform cells, none of them in `taken`.
fn sample_cells(rng: &mut Prng, n: u32, count: usize, taken: &[Cell]) -> Vec<Cell> {
    let mut out = Vec::with_capacity(count);
    while out.len() < count {
        let c = Cell::new(
            rng.gen_range_usize(0, n as usize) as u32,
            rng.gen_range_usize(0, n as usize) as u32,
        );
        if taken.contains(&c) || out.contains(&c) {
            continue;
        }
        out.push(c);
    }
    out
}

fn goal_reachable(n: u32, obstacles: &[Cell], start: Cell, goal: Cell) -> bool {
    let mut blocked = vec![false; (n as usize) * (n as usize)];
    for o in obstacles {
        blocked[o.idx(n)] = true;
    }

    let mut queue = VecDeque::new();
    blocked[start.idx(n)] = true;
    queue.push_back(start);

    while let Some(c) = queue.pop_front() {
        if c == goal {
            return true;
        }
        for d in [Direction::Up, Direction::Right, Direction::Down, Direction::Left] {
            if let Some(next) = c.step(d, n) {
                let i = next.idx(n);
                if !blocked[i] {
                    blocked[i] = true;
                    queue.push_back(next);
                }
            }
        }
    }
    false
}
