//! Collision predicate and merge. Both snap with `floor`.

use crate::arena::{Arena, Cell};
use crate::piece::Piece;

/// True if any shape cell is outside the side walls, at or below the floor,
/// or on a settled cell. Rows above the arena (y < 0) do not block.
pub fn collides(arena: &Arena, piece: &Piece) -> bool {
    let (w, h) = (arena.width() as i32, arena.height() as i32);
    piece.grid_cells().any(|(x, y)| {
        if x < 0 || x >= w || y >= h {
            return true;
        }
        y >= 0 && arena.is_occupied(x, y)
    })
}

/// Write the piece's cells into the arena; cells outside the grid are dropped.
/// Returns how many cells were written.
pub fn merge(arena: &mut Arena, piece: &Piece) -> usize {
    let mut written = 0;
    for (x, y) in piece.grid_cells() {
        if arena.get(x, y).is_some() {
            arena.set(x, y, Cell::Occupied(piece.color));
            written += 1;
        }
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::ShapeKind;

    #[test]
    fn test_collides_with_walls_and_floor() {
        let arena = Arena::new(10, 20);
        assert!(collides(&arena, &Piece::new(ShapeKind::I, -1, 0, 1.0)));
        assert!(collides(&arena, &Piece::new(ShapeKind::I, 7, 0, 1.0)));
        assert!(collides(&arena, &Piece::new(ShapeKind::O, 0, 19, 1.0)));
        assert!(!collides(&arena, &Piece::new(ShapeKind::I, 6, 19, 1.0)));
    }

    #[test]
    fn test_above_arena_does_not_collide() {
        let arena = Arena::new(10, 20);
        assert!(!collides(&arena, &Piece::new(ShapeKind::I, 4, -4, 1.0)));
        // side walls still apply above the arena
        assert!(collides(&arena, &Piece::new(ShapeKind::I, 8, -4, 1.0)));
    }

    #[test]
    fn test_collides_with_settled_cell() {
        let mut arena = Arena::new(10, 20);
        arena.set(5, 10, Cell::Occupied(1));
        let mut p = Piece::new(ShapeKind::I, 4, 9, 1.0);
        assert!(!collides(&arena, &p));
        p.y = 10.4;
        assert!(collides(&arena, &p));
    }

    #[test]
    fn test_merge_uses_floor_and_drops_offgrid() {
        let mut arena = Arena::new(4, 4);
        let mut p = Piece::new(ShapeKind::O, 2, 0, 1.0);
        p.y = -0.5;
        // origin snaps to row -1: top half is dropped
        assert_eq!(merge(&mut arena, &p), 2);
        assert_eq!(arena.get(2, 0), Some(Cell::Occupied(ShapeKind::O.color())));
        assert_eq!(arena.get(3, 0), Some(Cell::Occupied(ShapeKind::O.color())));
        assert_eq!(arena.occupied_count(), 2);
    }
}
