//! Core domain types for crosswords.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Orientation of a placed word.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    /// Reads left to right along a row.
    Horizontal,
    /// Reads top to bottom along a column.
    Vertical,
}

impl Direction {
    /// Returns the crossing direction.
    pub fn perpendicular(self) -> Self {
        match self {
            Direction::Horizontal => Direction::Vertical,
            Direction::Vertical => Direction::Horizontal,
        }
    }

    /// Row and column delta between consecutive letters.
    pub fn step(self) -> (usize, usize) {
        match self {
            Direction::Horizontal => (0, 1),
            Direction::Vertical => (1, 0),
        }
    }
}

/// Yields `(row, col, letter)` for every letter of `word` laid out from the start cell.
pub(crate) fn span(
    word: &str,
    direction: Direction,
    start_row: usize,
    start_col: usize,
) -> impl Iterator<Item = (usize, usize, char)> + '_ {
    let (dr, dc) = direction.step();
    word.chars()
        .enumerate()
        .map(move |(i, ch)| (start_row + dr * i, start_col + dc * i, ch))
}

/// A cell of the presentation grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    /// Letter shown in the cell, if any.
    pub letter: Option<char>,
    /// Whether the cell is a black square.
    pub is_blocked: bool,
    /// Clue label printed in the corner of the cell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
}

/// Square presentation grid, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NumberedGrid {
    rows: Vec<Vec<GridCell>>,
}

impl NumberedGrid {
    /// Wraps pre-built rows.
    pub fn from_rows(rows: Vec<Vec<GridCell>>) -> Self {
        Self { rows }
    }

    /// Side length of the grid.
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    /// Returns all rows.
    pub fn rows(&self) -> &[Vec<GridCell>] {
        &self.rows
    }

    /// Iterates every cell with its coordinates.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &GridCell)> {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter().enumerate().map(move |(c, cell)| (r, c, cell))
        })
    }

    /// Gets the cell at the given coordinates.
    pub fn cell(&self, row: usize, col: usize) -> Option<&GridCell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Gets a mutable cell at the given coordinates.
    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut GridCell> {
        self.rows.get_mut(row).and_then(|r| r.get_mut(col))
    }

    /// Removes every clue label.
    pub fn clear_numbers(&mut self) {
        for cell in self.rows.iter_mut().flatten() {
            cell.number = None;
        }
    }

    /// Copy of the grid with all letters hidden. Blocks and numbers are kept.
    pub fn masked(&self) -> Self {
        let mut masked = self.clone();
        for cell in masked.rows.iter_mut().flatten() {
            cell.letter = None;
        }
        masked
    }

    /// Writes the letters of `word` into its cells.
    pub fn reveal(&mut self, word: &CrosswordWord) {
        for (row, col, letter) in word.cells() {
            if let Some(cell) = self.cell_mut(row, col) {
                cell.letter = Some(letter);
            }
        }
    }
}

impl fmt::Display for NumberedGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            let line: Vec<String> = row
                .iter()
                .map(|cell| match (cell.is_blocked, cell.letter) {
                    (true, _) => "#".to_string(),
                    (false, Some(letter)) => letter.to_uppercase().to_string(),
                    (false, None) => ".".to_string(),
                })
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

/// A placed word together with its clue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrosswordWord {
    /// 1-based placement order. Not spatial.
    pub id: u32,
    /// The answer.
    pub word: String,
    /// Clue shown to players.
    pub clue: String,
    /// Orientation.
    pub direction: Direction,
    /// Row of the first letter.
    pub start_row: usize,
    /// Column of the first letter.
    pub start_col: usize,
    /// Number of letters.
    pub length: usize,
    /// Player who guessed the word, if anyone has.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub found_by: Option<String>,
}

impl CrosswordWord {
    /// Iterates `(row, col, letter)` over the word's cells.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, char)> + '_ {
        span(&self.word, self.direction, self.start_row, self.start_col)
    }

    /// Whether some player has found this word.
    pub fn is_found(&self) -> bool {
        self.found_by.is_some()
    }

    /// Case-insensitive comparison against the full answer.
    pub fn matches_guess(&self, guess: &str) -> bool {
        guess.to_uppercase() == self.word.to_uppercase()
    }

    /// Whether the word starts at the given cell.
    pub fn starts_at(&self, row: usize, col: usize) -> bool {
        self.start_row == row && self.start_col == col
    }
}

/// Result of a generation: placed words and the numbered grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crossword {
    /// Placed words in placement order.
    pub words: Vec<CrosswordWord>,
    /// Fully blocked-in grid with letters and numbers.
    pub grid: NumberedGrid,
}

impl Crossword {
    /// Number of placed words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true if no word was placed.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl fmt::Display for Crossword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.grid)?;
        writeln!(f)?;
        for word in &self.words {
            let number = self
                .grid
                .cell(word.start_row, word.start_col)
                .and_then(|cell| cell.number)
                .unwrap_or(word.id);
            writeln!(
                f,
                "{:>3}. [{}] {} ({})",
                number, word.direction, word.clue, word.length
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, direction: Direction, row: usize, col: usize) -> CrosswordWord {
        CrosswordWord {
            id: 1,
            word: text.to_string(),
            clue: String::new(),
            direction,
            start_row: row,
            start_col: col,
            length: text.chars().count(),
            found_by: None,
        }
    }

    #[test]
    fn test_perpendicular_flips() {
        assert_eq!(Direction::Horizontal.perpendicular(), Direction::Vertical);
        assert_eq!(Direction::Vertical.perpendicular(), Direction::Horizontal);
    }

    #[test]
    fn test_vertical_cells() {
        let w = word("sapo", Direction::Vertical, 3, 5);
        let cells: Vec<_> = w.cells().collect();
        assert_eq!(cells, vec![(3, 5, 's'), (4, 5, 'a'), (5, 5, 'p'), (6, 5, 'o')]);
    }

    #[test]
    fn test_matches_guess_ignores_case() {
        let w = word("casa", Direction::Horizontal, 0, 0);
        assert!(w.matches_guess("CASA"));
        assert!(w.matches_guess("CaSa"));
        assert!(!w.matches_guess("casas"));
    }

    #[test]
    fn test_masked_keeps_blocks_and_numbers() {
        let grid = NumberedGrid::from_rows(vec![vec![
            GridCell {
                letter: Some('a'),
                is_blocked: false,
                number: Some(1),
            },
            GridCell {
                letter: None,
                is_blocked: true,
                number: None,
            },
        ]]);
        let masked = grid.masked();
        assert_eq!(masked.rows()[0][0].letter, None);
        assert_eq!(masked.rows()[0][0].number, Some(1));
        assert!(masked.rows()[0][1].is_blocked);
    }

    #[test]
    fn test_direction_serializes_lowercase() {
        let json = serde_json::to_string(&Direction::Horizontal).unwrap();
        assert_eq!(json, "\"horizontal\"");
        assert_eq!(Direction::Vertical.to_string(), "vertical");
    }
}
