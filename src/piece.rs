//! Falling piece: shape, continuous position, fall rate.

use crate::shape::{ColorTag, ShapeKind};

/// One falling unit. Position is in cell units; y may be fractional and
/// negative (above the arena). Grid cells are always obtained by flooring.
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    pub kind: ShapeKind,
    pub x: f64,
    pub y: f64,
    /// Cells per second.
    pub fall_rate: f64,
    pub color: ColorTag,
    /// Sub-cell distance not yet applied (stepped motion only).
    pub(crate) pending: f64,
}

impl Piece {
    pub fn new(kind: ShapeKind, x: i32, y: i32, fall_rate: f64) -> Self {
        Self {
            kind,
            x: f64::from(x),
            y: f64::from(y),
            fall_rate,
            color: kind.color(),
            pending: 0.0,
        }
    }

    /// Snapped origin used by collision, merge and rendering alike.
    #[inline]
    pub fn grid_origin(&self) -> (i32, i32) {
        (self.x.floor() as i32, self.y.floor() as i32)
    }

    /// Absolute grid cells of the shape at the current position.
    pub fn grid_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.kind.cells().iter().map(move |&(dx, dy)| {
            (
                (self.x + f64::from(dx)).floor() as i32,
                (self.y + f64::from(dy)).floor() as i32,
            )
        })
    }

    pub fn snapshot(&self) -> PieceSnapshot {
        PieceSnapshot {
            kind: self.kind,
            cells: self.kind.cells(),
            position: (self.x, self.y),
            color: self.color,
        }
    }
}

/// Read-only view of an active piece for renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct PieceSnapshot {
    pub kind: ShapeKind,
    /// Offsets relative to `position`.
    pub cells: &'static [(i8, i8)],
    pub position: (f64, f64),
    pub color: ColorTag,
}

impl PieceSnapshot {
    pub fn grid_cells(&self) -> Vec<(i32, i32)> {
        let (x, y) = self.position;
        self.cells
            .iter()
            .map(|&(dx, dy)| {
                (
                    (x + f64::from(dx)).floor() as i32,
                    (y + f64::from(dy)).floor() as i32,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_cells_floor_fractional_position() {
        let mut p = Piece::new(ShapeKind::Domino, 3, 0, 1.0);
        p.y = 4.99;
        let cells: Vec<_> = p.grid_cells().collect();
        assert_eq!(cells, vec![(3, 4), (4, 4)]);
    }

    #[test]
    fn test_grid_cells_floor_negative_position() {
        let mut p = Piece::new(ShapeKind::Mono, 0, 0, 1.0);
        p.y = -0.25;
        assert_eq!(p.grid_origin(), (0, -1));
    }

    #[test]
    fn test_snapshot_matches_piece() {
        let mut p = Piece::new(ShapeKind::T, 2, -2, 3.0);
        p.y = 1.5;
        let snap = p.snapshot();
        assert_eq!(snap.color, ShapeKind::T.color());
        assert_eq!(snap.grid_cells(), p.grid_cells().collect::<Vec<_>>());
    }
}
