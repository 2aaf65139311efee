//! End-of-match score report.

use std::fmt;

use serde::Serialize;

/// One roster slot in the final report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryEntry {
    /// Player letter.
    pub alias: char,
    /// Gold collected.
    pub score: u32,
    /// Player name.
    pub name: String,
}

/// The final report, one entry per roster slot in join order.
///
/// Displays as the `GAME OVER:` block sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    /// Entries in join order, players who quit included.
    pub entries: Vec<SummaryEntry>,
}

impl Summary {
    /// The entry with the most gold, first joiner winning ties.
    #[must_use]
    pub fn leader(&self) -> Option<&SummaryEntry> {
        self.entries
            .iter()
            .rev()
            .max_by_key(|entry| entry.score)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "GAME OVER:")?;
        for entry in &self.entries {
            writeln!(f, "{} \t{} \t{}", entry.alias, entry.score, entry.name)?;
        }
        Ok(())
    }
}
