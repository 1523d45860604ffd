use clap::ValueEnum;
use itertools::Itertools;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, info};

use crate::{
    grid::{Cell, GridError, GridMap, Position},
    patrol::{run_with_loop_detection, AgentState, LoopOutcome, VisitedPositions},
};

/// How the trials are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Strategy {
    /// One grid, mutated and restored between trials.
    Sequential,
    /// Trials spread over the rayon pool, each on its own copy of the grid.
    #[default]
    Parallel,
}

/// Which cells are tried as obstructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CandidateSet {
    /// Every empty cell except the start.
    All,
    /// Only cells on the unobstructed patrol, the start excluded.
    #[default]
    Path,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchOptions {
    pub strategy: Strategy,
    pub candidates: CandidateSet,
}

/// Cells worth placing an obstruction on, in row-major order.
/// Never returns a wall or the guard's starting cell.
/// `trail` is the unobstructed patrol when it leaves the grid; without one the
/// path can't be told apart from the rest, so every cell is a candidate.
pub fn candidates(
    grid: &GridMap,
    start: AgentState,
    set: CandidateSet,
    trail: Option<&VisitedPositions>,
) -> Vec<Position> {
    let pool: Vec<Position> = match (set, trail) {
        (CandidateSet::Path, Some(trail)) => trail.iter().copied().collect(),
        _ => grid.positions().collect(),
    };

    pool.into_iter()
        .filter(|&pos| pos != start.position && grid.get(pos) == Some(Cell::Empty))
        .sorted()
        .collect()
}

/// Counts the empty cells that trap the guard in a loop once walled off.
/// Tries every candidate in turn on the given grid, which is restored after each trial.
pub fn count_loop_causing_obstructions(
    grid: &mut GridMap,
    start: AgentState,
) -> Result<usize, GridError> {
    let candidates = candidates(grid, start, CandidateSet::All, None);
    count_sequential(grid, start, &candidates)
}

/// Same count as `count_loop_causing_obstructions`, with the candidate set and
/// execution strategy picked by `options`. The given grid is left untouched.
pub fn search(
    grid: &GridMap,
    start: AgentState,
    options: SearchOptions,
) -> Result<usize, GridError> {
    let trail = match run_with_loop_detection(grid, start) {
        LoopOutcome::Exited(trail) => Some(trail),
        LoopOutcome::LoopDetected => None,
    };
    search_with_trail(grid, start, options, trail.as_ref())
}

/// `search` for callers that already ran the unobstructed patrol.
/// `trail` must be that patrol's visited cells, or None if it never left.
pub fn search_with_trail(
    grid: &GridMap,
    start: AgentState,
    options: SearchOptions,
    trail: Option<&VisitedPositions>,
) -> Result<usize, GridError> {
    let candidates = candidates(grid, start, options.candidates, trail);

    let count = match options.strategy {
        Strategy::Sequential => count_sequential(&mut grid.clone(), start, &candidates)?,
        Strategy::Parallel => count_parallel(grid, start, &candidates)?,
    };

    info!(
        candidates = candidates.len(),
        strategy = ?options.strategy,
        loops = count,
        "obstruction search finished"
    );

    Ok(count)
}

fn count_sequential(
    grid: &mut GridMap,
    start: AgentState,
    candidates: &[Position],
) -> Result<usize, GridError> {
    let mut counter = 0;
    for &pos in candidates {
        grid.place_obstruction(pos)?;
        let outcome = run_with_loop_detection(grid, start);
        grid.remove_obstruction(pos);

        if outcome.is_loop() {
            debug!(%pos, "obstruction traps the guard");
            counter += 1;
        }
    }

    Ok(counter)
}

fn count_parallel(
    grid: &GridMap,
    start: AgentState,
    candidates: &[Position],
) -> Result<usize, GridError> {
    candidates
        .par_iter()
        .map(|&pos| -> Result<bool, GridError> {
            // Each trial owns its grid, nothing is shared between workers.
            let mut trial = grid.clone();
            trial.place_obstruction(pos)?;
            let looped = run_with_loop_detection(&trial, start).is_loop();
            if looped {
                debug!(%pos, "obstruction traps the guard");
            }
            Ok(looped)
        })
        .try_fold(
            || 0,
            |count, looped| looped.map(|l| count + usize::from(l)),
        )
        .try_reduce(|| 0, |a, b| Ok(a + b))
}
