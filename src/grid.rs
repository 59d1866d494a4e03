use crate::constants::{
    CLASSIC_LAYOUT, CODE_OPEN, CODE_PICKUP, CODE_POWER_PICKUP, CODE_WALL,
};
use crate::error::LayoutError;
use crate::types::{CellKind, ConsumedKind, Direction, Position};

#[derive(Clone, Debug)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<CellKind>,
    initial: Vec<CellKind>,
}

impl Grid {
    pub fn classic() -> Self {
        let rows: Vec<&[u8]> = CLASSIC_LAYOUT.iter().map(|row| row.as_slice()).collect();
        match Self::from_codes(&rows) {
            Ok(grid) => grid,
            Err(error) => panic!("compiled-in layout is invalid: {error}"),
        }
    }

    pub fn from_codes(rows: &[&[u8]]) -> Result<Self, LayoutError> {
        let width = rows.first().map(|row| row.len()).unwrap_or(0);
        if rows.is_empty() || width == 0 {
            return Err(LayoutError::Empty);
        }
        let mut cells = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(LayoutError::Ragged {
                    row: y,
                    found: row.len(),
                    expected: width,
                });
            }
            for (x, code) in row.iter().enumerate() {
                let kind = match *code {
                    CODE_OPEN => CellKind::Empty,
                    CODE_WALL => CellKind::Wall,
                    CODE_PICKUP => CellKind::Pickup,
                    CODE_POWER_PICKUP => CellKind::PowerPickup,
                    other => {
                        return Err(LayoutError::UnknownCode {
                            code: char::from(b'0'.saturating_add(other)),
                            x,
                            y,
                        })
                    }
                };
                cells.push(kind);
            }
        }
        Ok(Self::from_cells(width, rows.len(), cells))
    }

    // `#` wall, `.` pickup, `o` power pickup, space or `_` open floor.
    pub fn from_ascii(text: &str) -> Result<Self, LayoutError> {
        let rows: Vec<&str> = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .collect();
        let width = rows.first().map(|row| row.chars().count()).unwrap_or(0);
        if width == 0 {
            return Err(LayoutError::Empty);
        }
        let mut cells = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(LayoutError::Ragged {
                    row: y,
                    found,
                    expected: width,
                });
            }
            for (x, ch) in row.chars().enumerate() {
                let kind = match ch {
                    '#' => CellKind::Wall,
                    '.' => CellKind::Pickup,
                    'o' => CellKind::PowerPickup,
                    ' ' | '_' => CellKind::Empty,
                    code => return Err(LayoutError::UnknownCode { code, x, y }),
                };
                cells.push(kind);
            }
        }
        Ok(Self::from_cells(width, rows.len(), cells))
    }

    fn from_cells(width: usize, height: usize, cells: Vec<CellKind>) -> Self {
        Self {
            width: width as i32,
            height: height as i32,
            initial: cells.clone(),
            cells,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn cells(&self) -> &[CellKind] {
        &self.cells
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    pub(crate) fn index_of(&self, pos: Position) -> Option<usize> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some((pos.y * self.width + pos.x) as usize)
    }

    pub(crate) fn position_of(&self, index: usize) -> Position {
        let index = index as i32;
        Position::new(index % self.width, index / self.width)
    }

    pub(crate) fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_walkable(&self, pos: Position) -> bool {
        self.index_of(pos)
            .map(|idx| self.cells[idx] != CellKind::Wall)
            .unwrap_or(false)
    }

    /// Panics when `pos` lies outside the grid.
    pub fn cell_kind(&self, pos: Position) -> CellKind {
        let Some(idx) = self.index_of(pos) else {
            panic!(
                "cell query out of bounds: ({}, {}) on {}x{} grid",
                pos.x, pos.y, self.width, self.height
            );
        };
        self.cells[idx]
    }

    /// Panics when `pos` lies outside the grid.
    pub fn consume(&mut self, pos: Position) -> Option<ConsumedKind> {
        let Some(idx) = self.index_of(pos) else {
            panic!(
                "consume out of bounds: ({}, {}) on {}x{} grid",
                pos.x, pos.y, self.width, self.height
            );
        };
        let consumed = match self.cells[idx] {
            CellKind::Pickup => ConsumedKind::Pickup,
            CellKind::PowerPickup => ConsumedKind::PowerPickup,
            CellKind::Empty | CellKind::Wall => return None,
        };
        self.cells[idx] = CellKind::Empty;
        Some(consumed)
    }

    pub fn remaining_targets(&self) -> bool {
        self.cells.iter().any(|kind| is_target(*kind))
    }

    pub fn remaining_count(&self) -> usize {
        self.cells.iter().filter(|kind| is_target(**kind)).count()
    }

    pub fn reset(&mut self) {
        self.cells.clone_from(&self.initial);
    }

    pub fn walkable_neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        Direction::ALL
            .into_iter()
            .map(move |dir| pos.offset(dir))
            .filter(|next| self.is_walkable(*next))
    }

    pub fn walkable_cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, kind)| **kind != CellKind::Wall)
            .map(|(idx, _)| self.position_of(idx))
    }
}

fn is_target(kind: CellKind) -> bool {
    matches!(kind, CellKind::Pickup | CellKind::PowerPickup)
}
