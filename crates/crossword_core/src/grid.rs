//! Working grid used while an attempt places words.

use crate::types::{CrosswordWord, Direction, GridCell, NumberedGrid, span};
use derive_new::new;
use tracing::instrument;

/// State of one cell in the working grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    /// Nothing placed yet.
    #[default]
    Empty,
    /// Holds a letter of a placed word.
    Letter(char),
    /// Black square.
    Blocked,
}

/// A word committed at a position and direction.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Placement {
    word: String,
    direction: Direction,
    start_row: usize,
    start_col: usize,
}

impl Placement {
    /// The placed word.
    pub fn word(&self) -> &str {
        &self.word
    }

    /// Orientation.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Row of the first letter.
    pub fn start_row(&self) -> usize {
        self.start_row
    }

    /// Column of the first letter.
    pub fn start_col(&self) -> usize {
        self.start_col
    }

    /// Length in letters.
    pub fn len(&self) -> usize {
        self.word.chars().count()
    }

    /// Returns true for a zero-length word.
    pub fn is_empty(&self) -> bool {
        self.word.is_empty()
    }

    /// Iterates `(row, col, letter)` over the cells the word covers.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, char)> + '_ {
        span(&self.word, self.direction, self.start_row, self.start_col)
    }

    /// Attaches an id and clue, consuming the placement.
    pub fn into_word(self, id: u32, clue: String) -> CrosswordWord {
        let length = self.len();
        CrosswordWord {
            id,
            word: self.word,
            clue,
            direction: self.direction,
            start_row: self.start_row,
            start_col: self.start_col,
            length,
            found_by: None,
        }
    }
}

/// Square working grid, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates an empty grid of `size × size` cells.
    #[instrument]
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Cell::Empty; size * size],
        }
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.size
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.size && col < self.size).then(|| row * self.size + col)
    }

    /// Gets the cell at the given coordinates, `None` when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        self.index(row, col).map(|i| self.cells[i])
    }

    /// Checks whether `word` fits at the given start without leaving the grid
    /// or contradicting a letter already there.
    pub fn fits(&self, word: &str, direction: Direction, start_row: usize, start_col: usize) -> bool {
        span(word, direction, start_row, start_col).all(|(row, col, letter)| {
            match self.get(row, col) {
                Some(Cell::Empty) => true,
                Some(Cell::Letter(existing)) => existing == letter,
                Some(Cell::Blocked) | None => false,
            }
        })
    }

    /// Checks whether the placement can be committed.
    pub fn can_place(&self, placement: &Placement) -> bool {
        self.fits(
            placement.word(),
            placement.direction(),
            placement.start_row(),
            placement.start_col(),
        )
    }

    /// Writes every letter of the placement. Callers validate with
    /// [`Grid::can_place`] first.
    pub fn place(&mut self, placement: &Placement) {
        debug_assert!(self.can_place(placement), "placement conflicts with grid");
        for (row, col, letter) in placement.cells() {
            if let Some(i) = self.index(row, col) {
                self.cells[i] = Cell::Letter(letter);
            }
        }
    }

    /// Blocks the fixed decorative spots that are still empty.
    pub fn add_design_blocks(&mut self) {
        for (row, col) in design_spots(self.size) {
            let (Ok(row), Ok(col)) = (usize::try_from(row), usize::try_from(col)) else {
                continue;
            };
            if let Some(i) = self.index(row, col)
                && self.cells[i] == Cell::Empty
            {
                self.cells[i] = Cell::Blocked;
            }
        }
    }

    /// Turns every remaining empty cell into a block.
    pub fn fill_empty_with_blocks(&mut self) {
        for cell in self.cells.iter_mut().filter(|c| **c == Cell::Empty) {
            *cell = Cell::Blocked;
        }
    }

    /// True once no cell is empty.
    pub fn is_complete(&self) -> bool {
        !self.cells.contains(&Cell::Empty)
    }

    /// Builds the presentation grid. A cell is numbered with the id of the
    /// word starting there; on a shared start the lowest id wins.
    pub fn numbered(&self, words: &[CrosswordWord]) -> NumberedGrid {
        let mut rows: Vec<Vec<GridCell>> = self
            .cells
            .chunks(self.size.max(1))
            .take(self.size)
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        Cell::Letter(letter) => GridCell {
                            letter: Some(*letter),
                            is_blocked: false,
                            number: None,
                        },
                        Cell::Blocked => GridCell {
                            letter: None,
                            is_blocked: true,
                            number: None,
                        },
                        Cell::Empty => GridCell::default(),
                    })
                    .collect()
            })
            .collect();

        for word in words {
            if let Some(cell) = rows
                .get_mut(word.start_row)
                .and_then(|row| row.get_mut(word.start_col))
                && cell.number.is_none_or(|n| word.id < n)
            {
                cell.number = Some(word.id);
            }
        }

        NumberedGrid::from_rows(rows)
    }
}

/// Corners, center and symmetric offsets, scaled to the grid side.
fn design_spots(size: usize) -> [(isize, isize); 13] {
    let s = size as isize;
    let m = s / 2;
    [
        (2, 2),
        (2, s - 3),
        (s - 3, 2),
        (s - 3, s - 3),
        (m, m),
        (4, 4),
        (4, s - 5),
        (s - 5, 4),
        (s - 5, s - 5),
        (m - 2, m),
        (m + 2, m),
        (m, m - 2),
        (m, m + 2),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_design_spots_for_standard_grid() {
        let spots = design_spots(15);
        assert!(spots.contains(&(2, 12)));
        assert!(spots.contains(&(7, 7)));
        assert!(spots.contains(&(10, 10)));
    }

    #[test]
    fn test_design_blocks_skip_out_of_bounds() {
        let mut grid = Grid::new(3);
        grid.add_design_blocks();
        // Corners and center land inside a 3x3 grid, the offset spots do not.
        assert_eq!(grid.get(0, 0), Some(Cell::Blocked));
        assert_eq!(grid.get(1, 1), Some(Cell::Blocked));
        assert_eq!(grid.get(2, 2), Some(Cell::Blocked));
        assert_eq!(grid.get(0, 1), Some(Cell::Empty));
        assert_eq!(grid.get(1, 2), Some(Cell::Empty));
    }

    #[test]
    fn test_place_rejects_conflict() {
        let mut grid = Grid::new(5);
        grid.place(&Placement::new("casa".into(), Direction::Horizontal, 0, 0));
        assert!(!grid.fits("rio", Direction::Vertical, 0, 1));
        assert!(grid.fits("ave", Direction::Vertical, 0, 1));
    }
}
