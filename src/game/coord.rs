//! Coordinates and compass directions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A cell coordinate on a grid.
///
/// Coordinates carry no bounds of their own; validity is relative to the
/// grid they are used with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    /// X coordinate (column).
    pub x: u16,
    /// Y coordinate (row).
    pub y: u16,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Translate by a signed offset.
    ///
    /// Returns `None` when the result would leave the `u16` range; callers
    /// still have to check it against their grid.
    #[must_use]
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        let x = u16::try_from(i32::from(self.x).checked_add(dx)?).ok()?;
        let y = u16::try_from(i32::from(self.y).checked_add(dy)?).ok()?;
        Some(Self { x, y })
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the eight compass offsets a player can move by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Up.
    North,
    /// Down.
    South,
    /// Right.
    East,
    /// Left.
    West,
    /// Up and right.
    NorthEast,
    /// Up and left.
    NorthWest,
    /// Down and right.
    SouthEast,
    /// Down and left.
    SouthWest,
}

impl Direction {
    /// All eight directions.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    /// The `(dx, dy)` unit offset, with y growing downward.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::NorthEast => (1, -1),
            Direction::NorthWest => (-1, -1),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (-1, 1),
        }
    }

    /// The direction with unit offset `(dx, dy)`, if there is one.
    #[must_use]
    pub const fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        match (dx, dy) {
            (0, -1) => Some(Direction::North),
            (0, 1) => Some(Direction::South),
            (1, 0) => Some(Direction::East),
            (-1, 0) => Some(Direction::West),
            (1, -1) => Some(Direction::NorthEast),
            (-1, -1) => Some(Direction::NorthWest),
            (1, 1) => Some(Direction::SouthEast),
            (-1, 1) => Some(Direction::SouthWest),
            _ => None,
        }
    }

    /// The opposite direction.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::NorthEast => Direction::SouthWest,
            Direction::NorthWest => Direction::SouthEast,
            Direction::SouthEast => Direction::NorthWest,
            Direction::SouthWest => Direction::NorthEast,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_within_range() {
        let coord = Coord::new(5, 5);
        assert_eq!(coord.offset(1, -1), Some(Coord::new(6, 4)));
        assert_eq!(coord.offset(0, 0), Some(coord));
    }

    #[test]
    fn test_offset_underflow() {
        assert_eq!(Coord::new(0, 3).offset(-1, 0), None);
        assert_eq!(Coord::new(3, 0).offset(0, -1), None);
    }

    #[test]
    fn test_offset_overflow_is_none() {
        assert_eq!(Coord::new(5, 5).offset(i32::MAX, 0), None);
        assert_eq!(Coord::new(5, 5).offset(0, i32::MIN), None);
        assert_eq!(Coord::new(u16::MAX, 0).offset(1, 0), None);
    }

    #[test]
    fn test_from_delta_inverts_delta() {
        for dir in Direction::ALL {
            let (dx, dy) = dir.delta();
            assert_eq!(Direction::from_delta(dx, dy), Some(dir));
        }
        assert_eq!(Direction::from_delta(0, 0), None);
        assert_eq!(Direction::from_delta(2, 0), None);
        assert_eq!(Direction::from_delta(-1, i32::MIN), None);
    }

    #[test]
    fn test_reverse_cancels_delta() {
        for dir in Direction::ALL {
            let (dx, dy) = dir.delta();
            let (rx, ry) = dir.reverse().delta();
            assert_eq!((dx + rx, dy + ry), (0, 0), "{dir:?}");
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Coord::new(3, 7).to_string(), "(3, 7)");
    }
}
