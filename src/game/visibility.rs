//! Line-of-sight and per-player sight grids.
//!
//! A target cell is visible from a viewpoint when the straight line between
//! their centers is not blocked. The line is tested twice: once stepping
//! column by column (checking the row it crosses in each column) and once
//! stepping row by row. Where the line passes exactly through a cell, that
//! cell must be transparent; where it passes between two cells, at least one
//! of them must be. Only floor and gold are transparent.
//!
//! Crossings are computed with exact integer arithmetic, so a line is never
//! misclassified by floating-point rounding.

use crate::error::GridError;
use crate::game::{Cell, Coord, Grid};

/// Check whether `target` is visible from `viewpoint` on the terrain grid.
///
/// The viewpoint itself, and any target sharing its row or column with no
/// cells in between, is always visible.
///
/// # Errors
///
/// Returns [`GridError::OutOfBounds`] if either point lies outside `terrain`.
pub fn is_visible(terrain: &Grid, viewpoint: Coord, target: Coord) -> Result<bool, GridError> {
    terrain.get(viewpoint)?;
    terrain.get(target)?;
    Ok(line_clear(terrain, viewpoint, target))
}

fn line_clear(terrain: &Grid, from: Coord, to: Coord) -> bool {
    let columns = sweep_clear(
        (i32::from(from.x), i32::from(from.y)),
        (i32::from(to.x), i32::from(to.y)),
        |major, minor| transparent(terrain, major, minor),
    );
    columns
        && sweep_clear(
            (i32::from(from.y), i32::from(from.x)),
            (i32::from(to.y), i32::from(to.x)),
            |major, minor| transparent(terrain, minor, major),
        )
}

/// Step along the major axis from `from` to `to`, checking every
/// intermediate crossing on the minor axis.
fn sweep_clear(from: (i32, i32), to: (i32, i32), open: impl Fn(i32, i32) -> bool) -> bool {
    let d_major = to.0 - from.0;
    let d_minor = to.1 - from.1;
    if d_major == 0 {
        return true;
    }

    let dir = d_major.signum();
    (1..d_major.abs()).all(|i| {
        let step = i * dir;
        let major = from.0 + step;
        let (whole, exact) = crossing(step * d_minor, d_major);
        let minor = from.1 + whole;
        if exact {
            open(major, minor)
        } else {
            open(major, minor) || open(major, minor + 1)
        }
    })
}

/// Floor of `num / den`, and whether the division is exact.
fn crossing(num: i32, den: i32) -> (i32, bool) {
    let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
    (num.div_euclid(den), num.rem_euclid(den) == 0)
}

fn transparent(terrain: &Grid, x: i32, y: i32) -> bool {
    let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(y)) else {
        return false;
    };
    terrain
        .get(Coord::new(x, y))
        .is_ok_and(Cell::is_transparent)
}

/// What a player recalls about a cell they have seen but cannot see now.
///
/// Memory keeps terrain only: never another player, and never gold.
const fn remembered(terrain: Cell) -> Cell {
    match terrain {
        Cell::Gold | Cell::Player(_) | Cell::Viewer => Cell::Floor,
        other => other,
    }
}

impl Grid {
    /// Compute a player's new sight grid.
    ///
    /// `self` is the master (terrain) grid, `working` the grid with live
    /// players stamped in, and `prior` the player's previous sight grid.
    /// Cells that are blank in `working` stay blank. Visible cells show
    /// their live `working` value; cells seen before show remembered
    /// terrain; everything else is blank.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DimensionMismatch`] if the three grids differ in
    /// size, or [`GridError::OutOfBounds`] if `viewpoint` is outside them.
    pub fn visibility(&self, working: &Grid, prior: &Grid, viewpoint: Coord) -> Result<Grid, GridError> {
        self.ensure_same_size(working)?;
        self.ensure_same_size(prior)?;
        self.get(viewpoint)?;

        let cells = working
            .iter()
            .zip(prior.cells())
            .zip(self.cells())
            .map(|(((coord, live), &seen), &terrain)| {
                if live == Cell::Blank {
                    Cell::Blank
                } else if line_clear(self, viewpoint, coord) {
                    live
                } else if seen != Cell::Blank {
                    remembered(terrain)
                } else {
                    Cell::Blank
                }
            })
            .collect();

        Ok(Grid::from_cells(self.width(), self.height(), cells))
    }
}
