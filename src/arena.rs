//! Arena: the settled-cell grid, row sweep and read-only snapshots.

use crate::shape::ColorTag;
use std::collections::VecDeque;

/// Single cell: either empty or settled with a colour tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(ColorTag),
}

impl Cell {
    #[inline]
    pub fn is_occupied(&self) -> bool {
        matches!(self, Self::Occupied(_))
    }
}

/// Settled grid. y=0 is top; dimensions are fixed at construction.
#[derive(Debug, Clone)]
pub struct Arena {
    width: usize,
    height: usize,
    /// rows[y][x] = cell. rows[0] is top.
    rows: VecDeque<Vec<Cell>>,
}

impl Arena {
    pub fn new(width: u16, height: u16) -> Self {
        let (w, h) = (width as usize, height as usize);
        let rows = (0..h).map(|_| vec![Cell::Empty; w]).collect();
        Self {
            width: w,
            height: h,
            rows,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        if !self.in_bounds(x, y) {
            return None;
        }
        self.rows.get(y as usize).and_then(|row| row.get(x as usize)).copied()
    }

    /// True if (x, y) is outside the grid or holds a settled cell.
    #[inline]
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_none_or(|c| c.is_occupied())
    }

    /// Write a cell; out-of-bounds writes are dropped.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if self.in_bounds(x, y) {
            if let Some(row) = self.rows.get_mut(y as usize) {
                row[x as usize] = cell;
            }
        }
    }

    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.fill(Cell::Empty);
        }
    }

    pub fn row_is_full(&self, y: usize) -> bool {
        self.rows
            .get(y)
            .is_some_and(|row| row.iter().all(Cell::is_occupied))
    }

    pub fn occupied_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.iter().filter(|c| c.is_occupied()).count())
            .sum()
    }

    pub fn is_full(&self) -> bool {
        self.occupied_count() == self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.occupied_count() == 0
    }

    /// Remove full rows scanning bottom to top (row 0 is never cleared).
    /// Each removed row is replaced by an empty row at the top and the same
    /// index is checked again. Returns the number of rows removed.
    pub fn sweep_full_rows(&mut self) -> u32 {
        let mut cleared = 0u32;
        let mut y = self.height.saturating_sub(1);
        while y > 0 {
            if self.row_is_full(y) {
                self.rows.remove(y);
                self.rows.push_front(vec![Cell::Empty; self.width]);
                cleared += 1;
            } else {
                y -= 1;
            }
        }
        cleared
    }

    /// Owned copy of the grid for renderers.
    pub fn snapshot(&self) -> ArenaSnapshot {
        ArenaSnapshot {
            width: self.width,
            height: self.height,
            cells: self.rows.iter().flatten().copied().collect(),
        }
    }
}

/// Read-only, row-major copy of the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaSnapshot {
    pub width: usize,
    pub height: usize,
    cells: Vec<Cell>,
}

impl ArenaSnapshot {
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y * self.width + x).copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1))
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_occupied()).count()
    }
}
