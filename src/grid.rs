use std::{collections::HashSet, fmt};

use itertools::Itertools;
use thiserror::Error;

use crate::patrol::{AgentState, Heading};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("Malformed grid: row {row} has {found} cells, expected {expected}")]
    MalformedGrid {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("No guard found in input")]
    NoGuardFound,
    #[error("Multiple guards found in input: {0} and {1}")]
    MultipleGuards(Position, Position),
    #[error("Invalid cell at ({0},{1}): {2:?}")]
    InvalidCell(usize, usize, char),
    #[error("Position {0} is already a wall")]
    AlreadyWall(Position),
    #[error("Tried to access an OoB position {0}")]
    OutOfBounds(Position),
    #[error("Guard starting at {0} never leaves the grid")]
    GuardNeverLeaves(Position),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Wall,
}

/// A cell address on the grid. Origin is the upper left cell.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Returns the position one unit away in the given heading.
    /// Returns None if the move would underflow, which always means leaving the grid.
    pub fn neighbour(self, heading: Heading) -> Option<Position> {
        heading.translation().apply(self)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

pub(crate) enum Translation {
    Add((usize, usize)),
    Subtract((usize, usize)),
}

impl Translation {
    /// Consumes the translation and returns the new position, assuming it didn't underflow.
    fn apply(self, pos: Position) -> Option<Position> {
        match self {
            Translation::Add((dr, dc)) => Some(Position::new(pos.row + dr, pos.col + dc)),
            Translation::Subtract((dr, dc)) => Some(Position::new(
                pos.row.checked_sub(dr)?,
                pos.col.checked_sub(dc)?,
            )),
        }
    }
}

/// 2d top down map of the patrol area.
/// The shape is fixed at load, only single cells can be toggled between
/// `Empty` and `Wall` through `place_obstruction`/`remove_obstruction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridMap {
    rows: usize,
    cols: usize,
    cells: Vec<Vec<Cell>>,
}

impl GridMap {
    /// Builds a grid from rows of characters.
    /// `.` is empty, `#` is a wall and `^` marks the guard, who starts facing north.
    pub fn load<I, S>(lines: I) -> Result<(GridMap, AgentState), GridError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cells: Vec<Vec<Cell>> = Vec::new();
        let mut guard: Option<Position> = None;

        for (row, line) in lines.into_iter().enumerate() {
            let line = line.as_ref();
            let mut cell_row = Vec::with_capacity(line.len());
            for (col, symbol) in line.chars().enumerate() {
                match symbol {
                    '.' => cell_row.push(Cell::Empty),
                    '#' => cell_row.push(Cell::Wall),
                    '^' => {
                        let pos = Position::new(row, col);
                        if let Some(first) = guard {
                            return Err(GridError::MultipleGuards(first, pos));
                        }
                        guard = Some(pos);
                        cell_row.push(Cell::Empty);
                    }
                    _ => return Err(GridError::InvalidCell(row, col, symbol)),
                }
            }

            if let Some(first) = cells.first() {
                if first.len() != cell_row.len() {
                    return Err(GridError::MalformedGrid {
                        row,
                        expected: first.len(),
                        found: cell_row.len(),
                    });
                }
            }
            cells.push(cell_row);
        }

        let Some(position) = guard else {
            return Err(GridError::NoGuardFound);
        };

        let grid = GridMap {
            rows: cells.len(),
            cols: cells.first().map_or(0, Vec::len),
            cells,
        };

        Ok((grid, AgentState::new(position, Heading::North)))
    }

    /// Get the number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Get the number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of distinct agent states the grid can hold, four headings per cell.
    pub fn state_bound(&self) -> usize {
        self.rows * self.cols * 4
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    pub fn get(&self, pos: Position) -> Option<Cell> {
        if !self.in_bounds(pos) {
            return None;
        }

        Some(self.cells[pos.row][pos.col])
    }

    /// Out of bounds positions are never walls.
    pub fn is_wall(&self, pos: Position) -> bool {
        self.get(pos) == Some(Cell::Wall)
    }

    pub fn place_obstruction(&mut self, pos: Position) -> Result<(), GridError> {
        let cell = self.cell_mut(pos)?;
        if *cell == Cell::Wall {
            return Err(GridError::AlreadyWall(pos));
        }
        *cell = Cell::Wall;

        Ok(())
    }

    /// Resets the cell to `Empty` whatever it held before.
    /// Positions outside the grid are ignored.
    pub fn remove_obstruction(&mut self, pos: Position) {
        if let Ok(cell) = self.cell_mut(pos) {
            *cell = Cell::Empty;
        }
    }

    fn cell_mut(&mut self, pos: Position) -> Result<&mut Cell, GridError> {
        if !self.in_bounds(pos) {
            return Err(GridError::OutOfBounds(pos));
        }

        Ok(&mut self.cells[pos.row][pos.col])
    }

    /// Every position of the grid in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows)
            .cartesian_product(0..self.cols)
            .map(|(row, col)| Position::new(row, col))
    }

    /// Lazily walks the cells strictly ahead of `from` until the edge of the grid.
    pub fn ray(&self, from: Position, heading: Heading) -> Ray<'_> {
        Ray {
            grid: self,
            cursor: from,
            heading,
        }
    }

    /// Draws the grid with every visited cell marked `X` and the start marked `^`.
    pub fn render_trail(&self, visited: &HashSet<Position>, start: Position) -> String {
        self.cells
            .iter()
            .enumerate()
            .map(|(row, cells)| {
                cells
                    .iter()
                    .enumerate()
                    .map(|(col, cell)| {
                        let pos = Position::new(row, col);
                        match cell {
                            Cell::Wall => '#',
                            Cell::Empty if pos == start => '^',
                            Cell::Empty if visited.contains(&pos) => 'X',
                            Cell::Empty => '.',
                        }
                    })
                    .collect::<String>()
            })
            .join("\n")
    }
}

impl fmt::Display for GridMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            let line: String = row
                .iter()
                .map(|cell| match cell {
                    Cell::Empty => '.',
                    Cell::Wall => '#',
                })
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Finite sequence of in-bounds positions along one heading.
/// Cloning a ray restarts the walk from the same point.
#[derive(Debug, Clone)]
pub struct Ray<'a> {
    grid: &'a GridMap,
    cursor: Position,
    heading: Heading,
}

impl Iterator for Ray<'_> {
    type Item = Position;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self
            .cursor
            .neighbour(self.heading)
            .filter(|pos| self.grid.in_bounds(*pos))?;
        self.cursor = next;
        Some(next)
    }
}

/// Splits raw puzzle text into rows and loads it.
/// Surrounding whitespace on the input and on each row is ignored.
pub fn parse_input(input: &str) -> Result<(GridMap, AgentState), GridError> {
    GridMap::load(input.trim().lines().map(str::trim))
}

#[cfg(test)]
mod test {
    use super::*;

    const TEST_INPUT: &str = r#"
        ....#.....
        .........#
        ..........
        ..#.......
        .......#..
        ..........
        .#..^.....
        ........#.
        #.........
        ......#...
"#;

    fn create_test_grid() -> GridMap {
        use Cell::*;
        GridMap {
            rows: 10,
            cols: 10,
            cells: vec![
                vec![Empty, Empty, Empty, Empty, Wall, Empty, Empty, Empty, Empty, Empty],
                vec![Empty, Empty, Empty, Empty, Empty, Empty, Empty, Empty, Empty, Wall],
                vec![Empty, Empty, Empty, Empty, Empty, Empty, Empty, Empty, Empty, Empty],
                vec![Empty, Empty, Wall, Empty, Empty, Empty, Empty, Empty, Empty, Empty],
                vec![Empty, Empty, Empty, Empty, Empty, Empty, Empty, Wall, Empty, Empty],
                vec![Empty, Empty, Empty, Empty, Empty, Empty, Empty, Empty, Empty, Empty],
                vec![Empty, Wall, Empty, Empty, Empty, Empty, Empty, Empty, Empty, Empty],
                vec![Empty, Empty, Empty, Empty, Empty, Empty, Empty, Empty, Wall, Empty],
                vec![Wall, Empty, Empty, Empty, Empty, Empty, Empty, Empty, Empty, Empty],
                vec![Empty, Empty, Empty, Empty, Empty, Empty, Wall, Empty, Empty, Empty],
            ],
        }
    }

    #[test]
    fn test_parse_input() {
        let (grid, start) = parse_input(TEST_INPUT).unwrap();

        assert_eq!(create_test_grid(), grid);
        assert_eq!(AgentState::new(Position::new(6, 4), Heading::North), start);
    }

    #[test]
    fn test_load_inconsistent_rows() {
        let err = GridMap::load(["..^.", "...", "...."]).unwrap_err();

        assert_eq!(
            GridError::MalformedGrid {
                row: 1,
                expected: 4,
                found: 3
            },
            err
        );
    }

    #[test]
    fn test_load_errors() {
        assert_eq!(
            GridError::NoGuardFound,
            GridMap::load(["....", ".#.."]).unwrap_err()
        );
        assert_eq!(
            GridError::InvalidCell(1, 2, 'O'),
            GridMap::load(["..^.", "..O."]).unwrap_err()
        );
        assert_eq!(
            GridError::MultipleGuards(Position::new(0, 2), Position::new(1, 0)),
            GridMap::load(["..^.", "^..."]).unwrap_err()
        );
        assert_eq!(GridError::NoGuardFound, parse_input("").unwrap_err());
    }

    #[test]
    fn test_get_position() {
        let grid = create_test_grid();

        // OOB East
        assert_eq!(None, grid.get(Position::new(0, 10)));
        // OOB South
        assert_eq!(None, grid.get(Position::new(10, 0)));
        assert_eq!(Some(Cell::Empty), grid.get(Position::new(0, 0)));
        assert_eq!(Some(Cell::Wall), grid.get(Position::new(0, 4)));
        assert!(!grid.is_wall(Position::new(10, 4)));
    }

    #[test]
    fn test_place_and_remove_obstruction() {
        let mut grid = create_test_grid();
        let before = grid.clone();
        let pos = Position::new(3, 3);

        grid.place_obstruction(pos).unwrap();
        assert!(grid.is_wall(pos));
        grid.remove_obstruction(pos);
        assert_eq!(before, grid);

        // Every empty cell survives the round trip.
        let empties: Vec<_> = before
            .positions()
            .filter(|p| before.get(*p) == Some(Cell::Empty))
            .collect();
        for pos in empties {
            grid.place_obstruction(pos).unwrap();
            grid.remove_obstruction(pos);
        }
        assert_eq!(before, grid);
    }

    #[test]
    fn test_place_obstruction_errors() {
        let mut grid = create_test_grid();

        assert_eq!(
            Err(GridError::AlreadyWall(Position::new(0, 4))),
            grid.place_obstruction(Position::new(0, 4))
        );
        assert_eq!(
            Err(GridError::OutOfBounds(Position::new(4, 10))),
            grid.place_obstruction(Position::new(4, 10))
        );
        // Removing is idempotent and never fails.
        grid.remove_obstruction(Position::new(0, 4));
        grid.remove_obstruction(Position::new(0, 4));
        grid.remove_obstruction(Position::new(40, 40));
        assert_eq!(Some(Cell::Empty), grid.get(Position::new(0, 4)));
    }

    #[test]
    fn test_ray() {
        let grid = create_test_grid();
        let ray = grid.ray(Position::new(6, 4), Heading::North);

        let cells: Vec<_> = ray.clone().collect();
        assert_eq!(
            vec![
                Position::new(5, 4),
                Position::new(4, 4),
                Position::new(3, 4),
                Position::new(2, 4),
                Position::new(1, 4),
                Position::new(0, 4),
            ],
            cells
        );
        // Restarting yields the same walk.
        assert_eq!(cells, ray.collect::<Vec<_>>());

        assert_eq!(0, grid.ray(Position::new(3, 9), Heading::East).count());
        assert_eq!(
            Some(Position::new(9, 0)),
            grid.ray(Position::new(0, 0), Heading::South).last()
        );
    }

    #[test]
    fn test_render() {
        let (grid, start) = GridMap::load([".#.", ".^.", "..."]).unwrap();
        let visited = HashSet::from([Position::new(0, 0), Position::new(1, 1)]);

        // The start is an ordinary empty cell once loaded.
        assert_eq!(".#.\n...\n...\n", grid.to_string());
        assert_eq!("X#.\n.^.\n...", grid.render_trail(&visited, start.position));
    }
}
