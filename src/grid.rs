use std::fmt;

/// Heading of the snek on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// True if turning from `self` to `other` would be a 180-degree turn
    pub fn is_opposite(&self, other: Direction) -> bool {
        self.opposite() == other
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}

/// Unit-less step, scaled by the grid unit when applied to a [`Cell`].
#[derive(Clone, Copy, Debug, PartialEq)]
struct CellDelta {
    x: i32,
    y: i32,
}

impl From<Direction> for CellDelta {
    fn from(dir: Direction) -> Self {
        match dir {
            Direction::Up => CellDelta { x: 0, y: -1 },
            Direction::Down => CellDelta { x: 0, y: 1 },
            Direction::Left => CellDelta { x: -1, y: 0 },
            Direction::Right => CellDelta { x: 1, y: 0 },
        }
    }
}

/// A grid-aligned position in field pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Cell { x, y }
    }

    /// The neighbouring cell one unit away. No bounds handling: callers check
    /// the result against the [`Field`].
    pub fn stepped(&self, direction: Direction, unit: i32) -> Cell {
        let delta = CellDelta::from(direction);
        Cell {
            x: self.x + delta.x * unit,
            y: self.y + delta.y * unit,
        }
    }

    pub fn is_aligned(&self, unit: i32) -> bool {
        self.x % unit == 0 && self.y % unit == 0
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Cell { x, y }
    }
}

/// The play field rectangle, in pixels, with its grid unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    pub width: i32,
    pub height: i32,
    pub unit: i32,
}

impl Field {
    pub fn columns(&self) -> i32 {
        self.width / self.unit
    }

    pub fn rows(&self) -> i32 {
        self.height / self.unit
    }

    pub fn cell_count(&self) -> usize {
        (self.columns() as usize) * (self.rows() as usize)
    }

    /// True if `cell` lies within `[0, width - unit] x [0, height - unit]`
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0
            && cell.x <= self.width - self.unit
            && cell.y >= 0
            && cell.y <= self.height - self.unit
    }

    /// Cell at the given column and row
    pub fn cell_at(&self, column: i32, row: i32) -> Cell {
        Cell::new(column * self.unit, row * self.unit)
    }

    /// Column and row of a cell
    pub fn grid_index(&self, cell: Cell) -> (i32, i32) {
        (cell.x / self.unit, cell.y / self.unit)
    }
}
