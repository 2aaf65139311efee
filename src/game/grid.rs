//! Cell and grid types.

// Grid indices are bounded by u16 dimensions, so the casts below are lossless.
#![allow(clippy::cast_possible_truncation)]

use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::GridError;
use crate::game::{Coord, PlayerId};

/// The state of a single grid cell.
///
/// Each variant maps to exactly one character of the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    /// Solid rock, or a cell the viewer has never seen (`' '`).
    Blank,
    /// Open room floor (`'.'`).
    Floor,
    /// Passage between rooms (`'#'`).
    Passage,
    /// An unclaimed gold pile (`'*'`).
    Gold,
    /// Any other printable map symbol, kept verbatim (`'-'`, `'|'`, `'+'`, ...).
    Wall(u8),
    /// A live player, by id (`'A'..='Z'`).
    Player(PlayerId),
    /// The viewer's own position in a sight grid (`'@'`).
    Viewer,
}

impl Cell {
    /// Decode a map or wire character.
    #[must_use]
    pub const fn from_char(c: char) -> Self {
        match c {
            '.' => Cell::Floor,
            '#' => Cell::Passage,
            '*' => Cell::Gold,
            '@' => Cell::Viewer,
            'A'..='Z' => Cell::Player(c as u8 - b'A'),
            c if c.is_ascii_graphic() => Cell::Wall(c as u8),
            _ => Cell::Blank,
        }
    }

    /// Encode as a wire character.
    #[must_use]
    pub const fn to_char(self) -> char {
        match self {
            Cell::Blank => ' ',
            Cell::Floor => '.',
            Cell::Passage => '#',
            Cell::Gold => '*',
            Cell::Wall(b) => b as char,
            Cell::Player(id) => (b'A' + id) as char,
            Cell::Viewer => '@',
        }
    }

    /// Whether a player may step onto this cell when it is unoccupied.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        matches!(self, Cell::Floor | Cell::Passage | Cell::Gold)
    }

    /// Whether line of sight passes through this cell.
    #[must_use]
    pub const fn is_transparent(self) -> bool {
        matches!(self, Cell::Floor | Cell::Gold)
    }
}

/// A fixed-size rectangular buffer of cells.
///
/// The buffer always holds exactly `width * height` cells in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid filled with one cell value.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ZeroDimension`] if width or height is zero.
    pub fn new(width: u16, height: u16, fill: Cell) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::ZeroDimension {
                width: usize::from(width),
                height: usize::from(height),
            });
        }

        let size = usize::from(width) * usize::from(height);
        Ok(Self {
            width,
            height,
            cells: vec![fill; size],
        })
    }

    /// Create a grid where every cell is [`Cell::Blank`].
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ZeroDimension`] if width or height is zero.
    pub fn blank(width: u16, height: u16) -> Result<Self, GridError> {
        Self::new(width, height, Cell::Blank)
    }

    /// Build a grid from map text, one row per line.
    ///
    /// The width is the longest line; shorter lines are padded with blanks.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::EmptyMap`] if the text has no cells, or
    /// [`GridError::TooLarge`] if it does not fit `u16` dimensions.
    pub fn parse(text: &str) -> Result<Self, GridError> {
        let rows: Vec<&str> = text.lines().collect();
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);
        let height = rows.len();
        if width == 0 || height == 0 {
            return Err(GridError::EmptyMap);
        }

        let too_large = || GridError::TooLarge { width, height };
        let w = u16::try_from(width).map_err(|_| too_large())?;
        let h = u16::try_from(height).map_err(|_| too_large())?;

        let mut cells = Vec::with_capacity(width * height);
        for row in rows {
            let before = cells.len();
            cells.extend(row.chars().map(Cell::from_char));
            cells.resize(before + width, Cell::Blank);
        }

        Ok(Self {
            width: w,
            height: h,
            cells,
        })
    }

    /// Read and parse a map file.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Io`] if the file cannot be read, or any error
    /// from [`Grid::parse`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GridError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Wrap an existing row-major buffer.
    pub(crate) fn from_cells(width: u16, height: u16, cells: Vec<Cell>) -> Self {
        debug_assert_eq!(cells.len(), usize::from(width) * usize::from(height));
        Self {
            width,
            height,
            cells,
        }
    }

    /// Width in cells.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in cells.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Raw cells in row-major order.
    #[must_use]
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Check if a coordinate is within the grid.
    #[must_use]
    pub const fn in_bounds(&self, coord: Coord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    fn index(&self, coord: Coord) -> Result<usize, GridError> {
        if self.in_bounds(coord) {
            Ok(usize::from(coord.y) * usize::from(self.width) + usize::from(coord.x))
        } else {
            Err(GridError::OutOfBounds {
                coord,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Get the cell at a coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if the coordinate is outside the grid.
    pub fn get(&self, coord: Coord) -> Result<Cell, GridError> {
        self.index(coord).map(|idx| self.cells[idx])
    }

    /// Set the cell at a coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if the coordinate is outside the grid.
    pub fn set(&mut self, coord: Coord, cell: Cell) -> Result<(), GridError> {
        let idx = self.index(coord)?;
        self.cells[idx] = cell;
        Ok(())
    }

    /// Iterate over all coordinates and cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, Cell)> + '_ {
        let width = usize::from(self.width);
        self.cells.iter().enumerate().map(move |(idx, &cell)| {
            let x = (idx % width) as u16;
            let y = (idx / width) as u16;
            (Coord::new(x, y), cell)
        })
    }

    /// Count the cells matching a predicate.
    #[must_use]
    pub fn count(&self, pred: impl Fn(Cell) -> bool) -> usize {
        self.cells.iter().filter(|&&cell| pred(cell)).count()
    }

    /// Fail if the grid draws gold, a player or a viewer marker.
    ///
    /// Map files hold terrain only; gold and players are placed by the game.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::NotTerrain`] for the first such cell.
    pub fn ensure_terrain(&self) -> Result<(), GridError> {
        match self
            .iter()
            .find(|&(_, cell)| matches!(cell, Cell::Gold | Cell::Player(_) | Cell::Viewer))
        {
            Some((coord, cell)) => Err(GridError::NotTerrain {
                coord,
                symbol: cell.to_char(),
            }),
            None => Ok(()),
        }
    }

    /// Fail unless `other` has the same dimensions as `self`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DimensionMismatch`] when the sizes differ.
    pub fn ensure_same_size(&self, other: &Grid) -> Result<(), GridError> {
        if self.width == other.width && self.height == other.height {
            Ok(())
        } else {
            Err(GridError::DimensionMismatch {
                expected_width: self.width,
                expected_height: self.height,
                actual_width: other.width,
                actual_height: other.height,
            })
        }
    }

    /// The wire form: every cell in row-major order, no delimiters.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.cells.iter().map(|cell| cell.to_char()).collect()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(usize::from(self.width)) {
            let line: String = row.iter().map(|cell| cell.to_char()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
