use crate::error::{Result, SimError};
use crate::types::{CellKind, Position};

/// Built-in warehouse floor: `S` start, `A` warehouse, `R` recharge,
/// `1` free, `0` obstacle.
pub const DEFAULT_MAP: &str = "\
A11RA1
111111
111011
1S1111";

/// Static warehouse floor plan. Immutable after loading; all mutation
/// (items, robot) lives in [`crate::world::WorldState`].
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<CellKind>,
    start: Position,
}

impl Grid {
    /// Parses a rectangular character map. Rejects ragged rows, unknown
    /// codes, maps without exactly one start cell, and maps missing a
    /// warehouse or a recharge station.
    pub fn parse(text: &str) -> Result<Self> {
        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        if lines.is_empty() {
            return Err(SimError::EmptyMap);
        }

        let width = lines[0].chars().count();
        let height = lines.len();
        let mut cells = Vec::with_capacity(width * height);
        let mut starts = Vec::new();
        let mut warehouses = 0usize;
        let mut recharges = 0usize;

        for (y, line) in lines.iter().enumerate() {
            let row_width = line.chars().count();
            if row_width != width {
                return Err(SimError::RaggedRow {
                    row: y,
                    found: row_width,
                    expected: width,
                });
            }
            for (x, code) in line.chars().enumerate() {
                let kind = match code {
                    '1' => CellKind::Free,
                    '0' => CellKind::Obstacle,
                    'S' => CellKind::Start,
                    'A' => CellKind::Warehouse,
                    'R' => CellKind::Recharge,
                    other => {
                        return Err(SimError::UnknownCellCode { code: other, x, y });
                    }
                };
                match kind {
                    CellKind::Start => starts.push(Position::new(x, y)),
                    CellKind::Warehouse => warehouses += 1,
                    CellKind::Recharge => recharges += 1,
                    _ => {}
                }
                cells.push(kind);
            }
        }

        if starts.len() != 1 {
            return Err(SimError::StartCellCount(starts.len()));
        }
        if warehouses == 0 {
            return Err(SimError::NoWarehouse);
        }
        if recharges == 0 {
            return Err(SimError::NoRechargeStation);
        }

        Ok(Self {
            width,
            height,
            cells,
            start: starts[0],
        })
    }

    /// The built-in 6x4 floor plan.
    pub fn default_map() -> Self {
        // DEFAULT_MAP is a compile-time constant known to be well formed.
        Self::parse(DEFAULT_MAP).expect("built-in map is valid")
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Cell kind at `pos`, `None` out of bounds. Never panics so the
    /// path search stays total.
    pub fn cell_kind(&self, pos: Position) -> Option<CellKind> {
        if self.in_bounds(pos) {
            Some(self.cells[pos.y * self.width + pos.x])
        } else {
            None
        }
    }

    /// A cell the robot may stand on: in bounds and not an obstacle.
    pub fn is_traversable(&self, pos: Position) -> bool {
        matches!(
            self.cell_kind(pos),
            Some(CellKind::Free | CellKind::Start | CellKind::Warehouse | CellKind::Recharge)
        )
    }

    /// The orthogonal neighbors of `pos` that stay in bounds and are not
    /// obstacles, each with unit edge cost. Empty for out-of-bounds input.
    pub fn neighbors(&self, pos: Position) -> Vec<(Position, u32)> {
        if !self.in_bounds(pos) {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(4);
        let candidates = [
            (pos.x as isize, pos.y as isize - 1),
            (pos.x as isize, pos.y as isize + 1),
            (pos.x as isize + 1, pos.y as isize),
            (pos.x as isize - 1, pos.y as isize),
        ];
        for (nx, ny) in candidates {
            if nx < 0 || ny < 0 {
                continue;
            }
            let neighbor = Position::new(nx as usize, ny as usize);
            if self.is_traversable(neighbor) {
                out.push((neighbor, 1));
            }
        }
        out
    }

    /// Every position whose cell is of the requested kind, in row-major order.
    pub fn all_of_kind(&self, kind: CellKind) -> Vec<Position> {
        let mut out = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = Position::new(x, y);
                if self.cells[y * self.width + x] == kind {
                    out.push(pos);
                }
            }
        }
        out
    }
}
