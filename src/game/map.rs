//! The pair of grids that make up a match map.

use crate::error::GridError;
use crate::game::Grid;

/// The game map.
///
/// The master grid is the source of truth for terrain and gold. The working
/// grid is the master grid with live players stamped in; it is disposable
/// and rebuilt after every event.
#[derive(Debug, Clone)]
pub struct Map {
    /// Terrain and gold, never any players.
    master: Grid,
    /// Master plus player overlay.
    working: Grid,
}

impl Map {
    /// Build a map from a master and a working grid.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DimensionMismatch`] if the grids differ in size.
    pub fn new(master: Grid, working: Grid) -> Result<Self, GridError> {
        master.ensure_same_size(&working)?;
        Ok(Self { master, working })
    }

    /// Build a map whose master and working grids start as copies of `grid`.
    #[must_use]
    pub fn from_grid(grid: Grid) -> Self {
        Self {
            working: grid.clone(),
            master: grid,
        }
    }

    /// Width in cells.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.master.width()
    }

    /// Height in cells.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.master.height()
    }

    /// The master grid.
    #[must_use]
    pub fn master(&self) -> &Grid {
        &self.master
    }

    /// Mutable access to the master grid.
    #[must_use]
    pub fn master_mut(&mut self) -> &mut Grid {
        &mut self.master
    }

    /// Replace the master grid.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DimensionMismatch`] if `grid` has different dimensions.
    pub fn set_master(&mut self, grid: Grid) -> Result<(), GridError> {
        self.master.ensure_same_size(&grid)?;
        self.master = grid;
        Ok(())
    }

    /// The working grid.
    #[must_use]
    pub fn working(&self) -> &Grid {
        &self.working
    }

    /// Mutable access to the working grid.
    #[must_use]
    pub fn working_mut(&mut self) -> &mut Grid {
        &mut self.working
    }

    /// Replace the working grid, dropping the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DimensionMismatch`] if `grid` has different dimensions.
    pub fn set_working(&mut self, grid: Grid) -> Result<(), GridError> {
        self.master.ensure_same_size(&grid)?;
        self.working = grid;
        Ok(())
    }

    /// Borrow both grids at once, master first.
    #[must_use]
    pub fn grids(&self) -> (&Grid, &Grid) {
        (&self.master, &self.working)
    }
}
