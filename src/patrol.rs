use std::{collections::HashSet, fmt};

use crate::grid::{GridMap, Position, Translation};

/// Unique cells the guard stood on.
pub type VisitedPositions = HashSet<Position>;
/// Unique (position, heading) pairs the guard passed through.
pub type VisitedStates = HashSet<AgentState>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Heading {
    North,
    East,
    South,
    West,
}

impl Heading {
    /// Turns 90 degrees clockwise.
    pub fn turn(self) -> Self {
        match self {
            Heading::North => Heading::East,
            Heading::East => Heading::South,
            Heading::South => Heading::West,
            Heading::West => Heading::North,
        }
    }

    pub(crate) fn translation(self) -> Translation {
        match self {
            Heading::North => Translation::Subtract((1, 0)),
            Heading::East => Translation::Add((0, 1)),
            Heading::South => Translation::Add((1, 0)),
            Heading::West => Translation::Subtract((0, 1)),
        }
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Heading::North => write!(f, "^"),
            Heading::East => write!(f, ">"),
            Heading::South => write!(f, "v"),
            Heading::West => write!(f, "<"),
        }
    }
}

/// Everything needed to resume the patrol from a given point.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AgentState {
    pub position: Position,
    pub heading: Heading,
}

impl AgentState {
    pub fn new(position: Position, heading: Heading) -> Self {
        Self { position, heading }
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.heading, self.position)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StepResult {
    Moved,
    Turned,
    Exited,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopOutcome {
    Exited(VisitedPositions),
    LoopDetected,
}

impl LoopOutcome {
    pub fn is_loop(&self) -> bool {
        matches!(self, LoopOutcome::LoopDetected)
    }
}

/// Advances the guard by one step.
/// Looks at the cell ahead: off the grid means the guard leaves, a wall means
/// a turn in place, anything else means moving into it.
pub fn step(grid: &GridMap, state: AgentState) -> (AgentState, StepResult) {
    match grid.ray(state.position, state.heading).next() {
        // The state is left untouched, the caller stops here.
        None => (state, StepResult::Exited),
        Some(ahead) if grid.is_wall(ahead) => (
            AgentState {
                heading: state.heading.turn(),
                ..state
            },
            StepResult::Turned,
        ),
        Some(ahead) => (
            AgentState {
                position: ahead,
                ..state
            },
            StepResult::Moved,
        ),
    }
}

/// Iterator over the steps of a patrol.
/// Yields the state after each step, the final item is always `Exited`
/// unless the guard never leaves.
#[derive(Debug, Clone)]
pub struct Patrol<'a> {
    grid: &'a GridMap,
    state: AgentState,
    exited: bool,
}

impl<'a> Patrol<'a> {
    pub fn new(grid: &'a GridMap, start: AgentState) -> Self {
        Self {
            grid,
            state: start,
            exited: false,
        }
    }
}

impl Iterator for Patrol<'_> {
    type Item = (AgentState, StepResult);

    fn next(&mut self) -> Option<Self::Item> {
        if self.exited {
            return None;
        }

        let (state, result) = step(self.grid, self.state);
        self.state = state;
        self.exited = result == StepResult::Exited;

        Some((state, result))
    }
}

/// Follows the guard until it leaves the grid and returns every cell it stood on,
/// the start included.
/// The walk is capped at the grid's state bound, so a grid that already traps
/// the guard yields the cells reached before the cap.
pub fn run_track(grid: &GridMap, start: AgentState) -> VisitedPositions {
    let mut visited = HashSet::from([start.position]);
    for (state, _) in Patrol::new(grid, start).take(grid.state_bound()) {
        visited.insert(state.position);
    }

    visited
}

/// Follows the guard until it either leaves the grid or repeats a state.
pub fn run_with_loop_detection(grid: &GridMap, start: AgentState) -> LoopOutcome {
    let mut seen = VisitedStates::new();
    let mut visited = VisitedPositions::new();
    let mut state = start;

    loop {
        if !seen.insert(state) {
            return LoopOutcome::LoopDetected;
        }
        visited.insert(state.position);

        match step(grid, state) {
            (_, StepResult::Exited) => return LoopOutcome::Exited(visited),
            (next, _) => state = next,
        }
    }
}
