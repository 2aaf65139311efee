//! Gold economy: pile placement and per-pile awards.
//!
//! # Award Model
//!
//! Every pile except the last is worth a random share near the average
//! `remaining / piles`:
//!
//! - deviation = trunc(average / 1.5)
//! - award = trunc(average) - deviation / 2 + uniform[0, deviation)
//!
//! The award is then clamped to `[1, remaining - (piles - 1)]`, which keeps
//! every pile still on the map worth at least one nugget. The last pile
//! awards whatever is left, so the purse totals always add up to the
//! starting gold.

// Award arithmetic truncates like the integer model above describes.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap
)]

use rand::Rng;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::GameError;
use crate::game::{Cell, Coord, Map};

/// Counters for the gold still in play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GoldLedger {
    /// Gold in the game at the start; constant.
    total: u32,
    /// Gold not yet collected.
    remaining: u32,
    /// Piles not yet collected.
    piles: u32,
}

impl GoldLedger {
    /// Create a ledger for `piles` piles sharing `total` gold.
    #[must_use]
    pub const fn new(total: u32, piles: u32) -> Self {
        Self {
            total,
            remaining: total,
            piles,
        }
    }

    /// Gold in the game at the start.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.total
    }

    /// Gold not yet collected.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Piles not yet collected.
    #[must_use]
    pub const fn piles(&self) -> u32 {
        self.piles
    }

    /// Gold collected so far, across all players.
    #[must_use]
    pub const fn collected(&self) -> u32 {
        self.total - self.remaining
    }

    /// True once all gold has been collected.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Claim one pile, returning the gold it held.
    ///
    /// Returns 0 when no piles remain.
    pub fn claim<R: Rng>(&mut self, rng: &mut R) -> u32 {
        if self.piles == 0 {
            return 0;
        }

        let amount = award(self.remaining, self.piles, rng);
        self.remaining -= amount;
        self.piles -= 1;
        debug!(
            amount,
            remaining = self.remaining,
            piles = self.piles,
            "gold pile claimed"
        );
        amount
    }
}

/// Compute the award for one pile out of `piles` holding `remaining` gold.
///
/// Never exceeds `remaining`; see the module docs for the distribution.
#[must_use]
pub fn award<R: Rng>(remaining: u32, piles: u32, rng: &mut R) -> u32 {
    if piles <= 1 {
        return remaining;
    }
    if remaining == 0 {
        return 0;
    }

    let average = f64::from(remaining) / f64::from(piles);
    let deviation = (average / 1.5) as u32;
    let base = i64::from(average as u32);
    let raw = if deviation == 0 {
        base
    } else {
        base - i64::from(deviation / 2) + i64::from(rng.gen_range(0..deviation))
    };

    let ceiling = i64::from(remaining.saturating_sub(piles - 1).max(1));
    let amount = raw.clamp(1, ceiling);
    if amount != raw {
        warn!(raw, amount, remaining, piles, "gold award clamped");
    }
    amount as u32
}

/// Scatter `piles` gold piles over open floor, marking both grids.
///
/// Cells are drawn uniformly at random; a draw that lands on anything but
/// bare floor is retried, up to `attempts` draws in total.
///
/// # Errors
///
/// Returns [`GameError::GoldPlacement`] if the map has fewer open floor cells
/// than requested piles, or the attempt budget runs out.
pub fn place_piles<R: Rng>(
    map: &mut Map,
    piles: u32,
    attempts: u32,
    rng: &mut R,
) -> Result<Vec<Coord>, GameError> {
    let open = map.master().count(|cell| cell == Cell::Floor);
    if open < piles as usize {
        return Err(GameError::GoldPlacement {
            requested: piles,
            placed: 0,
            attempts: 0,
        });
    }

    let (width, height) = (map.width(), map.height());
    let mut placed = Vec::with_capacity(piles as usize);
    let mut tries = 0u32;

    while placed.len() < piles as usize {
        if tries >= attempts {
            return Err(GameError::GoldPlacement {
                requested: piles,
                placed: placed.len() as u32,
                attempts: tries,
            });
        }
        tries += 1;

        let coord = Coord::new(rng.gen_range(0..width), rng.gen_range(0..height));
        if map.master().get(coord)? == Cell::Floor {
            map.master_mut().set(coord, Cell::Gold)?;
            map.working_mut().set(coord, Cell::Gold)?;
            placed.push(coord);
        }
    }

    debug!(piles, tries, "gold placed");
    Ok(placed)
}
