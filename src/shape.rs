//! Shape catalog: closed set of piece templates (offsets + colour tag).

/// Colour tag carried by a shape and written into the arena on merge.
/// The host maps tags to real colours; the engine never interprets them.
pub type ColorTag = u8;

/// Number of distinct colour tags used by the built-in shapes.
pub const COLOR_TAGS: usize = 8;

/// Piece templates. The seven tetrominoes plus two filler pieces used by the
/// deterministic fill sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
    /// 1×1 filler.
    Mono,
    /// 2×1 horizontal filler.
    Domino,
}

impl ShapeKind {
    pub const TETROMINOES: [Self; 7] = [Self::I, Self::O, Self::T, Self::S, Self::Z, Self::J, Self::L];

    pub const ALL: [Self; 9] = [
        Self::I,
        Self::O,
        Self::T,
        Self::S,
        Self::Z,
        Self::J,
        Self::L,
        Self::Mono,
        Self::Domino,
    ];

    /// Cells relative to the local origin (0,0); each (dx, dy), y grows downwards.
    pub fn cells(&self) -> &'static [(i8, i8)] {
        match self {
            Self::I => &[(0, 0), (1, 0), (2, 0), (3, 0)],
            Self::O => &[(0, 0), (1, 0), (0, 1), (1, 1)],
            Self::T => &[(0, 0), (1, 0), (2, 0), (1, 1)],
            Self::S => &[(0, 1), (1, 1), (1, 0), (2, 0)],
            Self::Z => &[(0, 0), (1, 0), (1, 1), (2, 1)],
            Self::J => &[(0, 0), (0, 1), (1, 0), (2, 0)],
            Self::L => &[(0, 0), (1, 0), (2, 0), (2, 1)],
            Self::Mono => &[(0, 0)],
            Self::Domino => &[(0, 0), (1, 0)],
        }
    }

    /// Colour tag: 0 cyan, 1 yellow, 2 magenta, 3 green, 4 red, 5 blue, 6 orange, 7 grey.
    pub fn color(&self) -> ColorTag {
        match self {
            Self::I => 0,
            Self::O => 1,
            Self::T => 2,
            Self::S => 3,
            Self::Z => 4,
            Self::J => 5,
            Self::L => 6,
            Self::Mono | Self::Domino => 7,
        }
    }

    /// Bounding-box width in cells.
    pub fn width(&self) -> u16 {
        self.cells().iter().map(|&(dx, _)| dx as u16 + 1).max().unwrap_or(0)
    }

    /// Bounding-box height in cells.
    pub fn height(&self) -> u16 {
        self.cells().iter().map(|&(_, dy)| dy as u16 + 1).max().unwrap_or(0)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::I => "I",
            Self::O => "O",
            Self::T => "T",
            Self::S => "S",
            Self::Z => "Z",
            Self::J => "J",
            Self::L => "L",
            Self::Mono => "mono",
            Self::Domino => "domino",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tetrominoes_have_four_cells() {
        for kind in ShapeKind::TETROMINOES {
            assert_eq!(kind.cells().len(), 4, "{}", kind.name());
        }
    }

    #[test]
    fn test_bounding_boxes() {
        assert_eq!((ShapeKind::I.width(), ShapeKind::I.height()), (4, 1));
        assert_eq!((ShapeKind::O.width(), ShapeKind::O.height()), (2, 2));
        assert_eq!((ShapeKind::T.width(), ShapeKind::T.height()), (3, 2));
        assert_eq!((ShapeKind::Domino.width(), ShapeKind::Domino.height()), (2, 1));
        assert_eq!((ShapeKind::Mono.width(), ShapeKind::Mono.height()), (1, 1));
    }

    #[test]
    fn test_offsets_unique_and_non_negative() {
        for kind in ShapeKind::ALL {
            let cells = kind.cells();
            for (i, a) in cells.iter().enumerate() {
                assert!(a.0 >= 0 && a.1 >= 0);
                assert!(!cells[i + 1..].contains(a), "{} repeats {:?}", kind.name(), a);
            }
        }
    }

    #[test]
    fn test_color_tags_in_range() {
        for kind in ShapeKind::ALL {
            assert!((kind.color() as usize) < COLOR_TAGS);
        }
    }
}
