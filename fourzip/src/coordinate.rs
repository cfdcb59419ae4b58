//! Locations inside an image and the four quadrants a block splits into.

use std::fmt;

/// The row and column of a pixel. Used as the upper left corner of a block
/// while walking the quadtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Coordinate {
    row: usize,
    col: usize,
}

impl Coordinate {
    /// Upper left corner of the whole image.
    pub const ORIGIN: Coordinate = Coordinate { row: 0, col: 0 };

    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub const fn row(&self) -> usize {
        self.row
    }

    pub const fn col(&self) -> usize {
        self.col
    }

    /// The upper left corner of `quadrant`, where `size` is the side length
    /// of the quadrant itself (half of the enclosing block).
    pub fn offset(&self, quadrant: Quadrant, size: usize) -> Self {
        Self {
            row: self.row + quadrant.row_delta(size),
            col: self.col + quadrant.col_delta(size),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One of the four sub-blocks of a square block.
///
/// The declaration order is the order children are stored in a split node
/// and the order they appear in a compressed file. Do not reorder.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    UpperLeft = 0,
    UpperRight = 1,
    LowerLeft = 2,
    LowerRight = 3,
}

impl Quadrant {
    /// Every quadrant, in storage order.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::UpperLeft,
        Quadrant::UpperRight,
        Quadrant::LowerLeft,
        Quadrant::LowerRight,
    ];

    /// Row and column multipliers, each 0 or 1.
    const fn multipliers(self) -> (usize, usize) {
        match self {
            Quadrant::UpperLeft => (0, 0),
            Quadrant::UpperRight => (0, 1),
            Quadrant::LowerLeft => (1, 0),
            Quadrant::LowerRight => (1, 1),
        }
    }

    /// How far down this quadrant starts from the upper left corner of the
    /// enclosing block.
    ///
    /// Ex. `LowerLeft.row_delta(4)` is `4`
    pub const fn row_delta(self, size: usize) -> usize {
        self.multipliers().0 * size
    }

    /// How far right this quadrant starts from the upper left corner of the
    /// enclosing block.
    ///
    /// Ex. `LowerLeft.col_delta(4)` is `0`
    pub const fn col_delta(self, size: usize) -> usize {
        self.multipliers().1 * size
    }

    /// Position of this quadrant's child in a split node.
    pub const fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas() {
        let deltas: Vec<_> = Quadrant::ALL
            .iter()
            .map(|q| (q.row_delta(8), q.col_delta(8)))
            .collect();

        assert_eq!(deltas, [(0, 0), (0, 8), (8, 0), (8, 8)]);
    }

    #[test]
    fn offset_from_corner() {
        let corner = Coordinate::new(4, 12);

        assert_eq!(corner.offset(Quadrant::UpperLeft, 2), Coordinate::new(4, 12));
        assert_eq!(corner.offset(Quadrant::UpperRight, 2), Coordinate::new(4, 14));
        assert_eq!(corner.offset(Quadrant::LowerLeft, 2), Coordinate::new(6, 12));
        assert_eq!(corner.offset(Quadrant::LowerRight, 2), Coordinate::new(6, 14));
    }

    #[test]
    fn storage_order() {
        let indices: Vec<_> = Quadrant::ALL.iter().map(|q| q.index()).collect();
        assert_eq!(indices, [0, 1, 2, 3]);
    }

    #[test]
    fn display() {
        assert_eq!(Coordinate::ORIGIN.to_string(), "(0, 0)");
        assert_eq!(Coordinate::new(3, 7).to_string(), "(3, 7)");
    }
}
