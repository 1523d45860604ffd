pub mod config;
pub mod grid;
pub mod logging;
pub mod patrol;
pub mod search;

pub use grid::{parse_input, Cell, GridError, GridMap, Position, Ray};
pub use patrol::{
    run_track, run_with_loop_detection, step, AgentState, Heading, LoopOutcome, Patrol,
    StepResult, VisitedPositions, VisitedStates,
};
pub use search::{
    candidates, count_loop_causing_obstructions, search, search_with_trail, CandidateSet,
    SearchOptions, Strategy,
};

/// Both puzzle answers for one grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Answers {
    /// Distinct cells the guard covers before leaving.
    pub visited: usize,
    /// Single obstructions that trap the guard in a loop.
    pub loop_obstructions: usize,
}

/// A solved grid, kept around for drawing the trail.
#[derive(Debug, Clone)]
pub struct Solution {
    pub grid: GridMap,
    pub start: AgentState,
    /// Cells of the unobstructed patrol.
    pub trail: VisitedPositions,
    pub answers: Answers,
}

/// Parses the puzzle text, runs the unobstructed patrol once, then the obstruction search.
/// Fails if the guard never leaves the grid, since part 1 has no answer then.
pub fn solve(input: &str, options: &SearchOptions) -> Result<Solution, GridError> {
    let (grid, start) = parse_input(input)?;

    let trail = match run_with_loop_detection(&grid, start) {
        LoopOutcome::Exited(trail) => trail,
        LoopOutcome::LoopDetected => return Err(GridError::GuardNeverLeaves(start.position)),
    };
    let loop_obstructions = search_with_trail(&grid, start, *options, Some(&trail))?;

    Ok(Solution {
        answers: Answers {
            visited: trail.len(),
            loop_obstructions,
        },
        grid,
        start,
        trail,
    })
}
