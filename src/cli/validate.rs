//! Map validation command implementation.

use super::{CliError, Tuning};
use nuggets::{Cell, Grid};
use std::path::Path;

/// Execute the validate command.
///
/// # Errors
///
/// Returns an error if the map cannot be read, or cannot hold the
/// configured gold piles.
pub(crate) fn execute(map: &Path, tuning: &Tuning) -> Result<(), CliError> {
    let config = tuning.resolve()?;
    let grid = Grid::load(map)
        .map_err(|e| CliError::new(format!("Failed to read {}: {e}", map.display())))?;

    println!("Validating: {}", map.display());
    println!();

    let floor = grid.count(|c| c == Cell::Floor);
    let passage = grid.count(|c| c == Cell::Passage);
    let stray = grid.count(|c| matches!(c, Cell::Gold | Cell::Player(_) | Cell::Viewer));

    println!("Summary:");
    println!("  Size:         {} x {}", grid.width(), grid.height());
    println!("  Open floor:   {floor}");
    println!("  Passages:     {passage}");
    println!();

    let fits_gold = floor >= config.gold_max_piles as usize;
    print_check(
        &format!("room for {} gold piles", config.gold_max_piles),
        fits_gold,
    );
    let fits_roster = floor >= config.gold_max_piles as usize + 1;
    print_check("room for a player beside the gold", fits_roster);
    print_check("no gold or players drawn in the map", stray == 0);

    if !fits_gold || !fits_roster {
        return Err(CliError::new("Map is too small for the gold configuration"));
    }
    if stray > 0 {
        return Err(CliError::new(format!("Map contains {stray} occupant or gold cells")));
    }

    println!();
    println!("Validation successful!");
    Ok(())
}

fn print_check(name: &str, ok: bool) {
    let status = if ok { "OK" } else { "FAILED" };
    let symbol = if ok { "✓" } else { "✗" };
    println!("  {symbol} {name}: {status}");
}
