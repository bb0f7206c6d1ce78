//! Crossword construction: greedy first-fit placement with best-of-N retries.
//!
//! A single attempt seeds the grid with one word across the middle row, then
//! walks the rest of a shuffled pool and commits each word at the first
//! perpendicular crossing that fits. Yield is stochastic, so [`CrosswordGenerator::generate`]
//! repeats attempts with fresh randomness and keeps the best one.

use crate::error::{GenerateError, GenerateErrorKind};
use crate::grid::{Grid, Placement};
use crate::types::{Crossword, CrosswordWord, Direction};
use crate::words::WordSource;
use derive_getters::Getters;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Tunables for the generator.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Side length of the square grid.
    #[serde(default = "default_grid_size")]
    grid_size: usize,

    /// Attempts made before settling for the best result.
    #[serde(default = "default_max_attempts")]
    max_attempts: usize,

    /// Target of the last-resort attempt when every attempt came up empty.
    #[serde(default = "default_fallback_word_count")]
    fallback_word_count: usize,

    /// Target used when the caller does not ask for a specific count.
    #[serde(default = "default_word_count")]
    default_word_count: usize,
}

#[instrument]
fn default_grid_size() -> usize {
    15
}

#[instrument]
fn default_max_attempts() -> usize {
    10
}

#[instrument]
fn default_fallback_word_count() -> usize {
    15
}

#[instrument]
fn default_word_count() -> usize {
    30
}

impl GeneratorConfig {
    /// Creates a configuration.
    pub fn new(
        grid_size: usize,
        max_attempts: usize,
        fallback_word_count: usize,
        default_word_count: usize,
    ) -> Self {
        Self {
            grid_size,
            max_attempts,
            fallback_word_count,
            default_word_count,
        }
    }

    /// Same configuration with a different grid side.
    pub fn with_grid_size(mut self, grid_size: usize) -> Self {
        self.grid_size = grid_size;
        self
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new(
            default_grid_size(),
            default_max_attempts(),
            default_fallback_word_count(),
            default_word_count(),
        )
    }
}

/// Builds crosswords from a word source.
#[derive(Debug, Clone)]
pub struct CrosswordGenerator {
    source: Arc<dyn WordSource>,
    words: Vec<String>,
    config: GeneratorConfig,
}

impl CrosswordGenerator {
    /// Creates a generator and snapshots the source's word list as the default pool.
    #[instrument(skip(source), fields(grid_size = config.grid_size))]
    pub fn new(source: Arc<dyn WordSource>, config: GeneratorConfig) -> Self {
        let words = source.all_words();
        info!(pool = words.len(), "Crossword generator ready");
        Self {
            source,
            words,
            config,
        }
    }

    /// Generator settings.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Default word pool.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Generates a crossword from the default pool.
    ///
    /// # Errors
    ///
    /// Only when every attempt fails and the fallback attempt fails too,
    /// which in practice means the pool is empty or its words do not fit.
    #[instrument(skip(self, rng))]
    pub fn generate<R: Rng + ?Sized>(
        &self,
        target: usize,
        rng: &mut R,
    ) -> Result<Crossword, GenerateError> {
        self.generate_from_pool(target, &self.words, rng)
    }

    /// Generates a crossword from an explicit pool.
    ///
    /// Runs up to `max_attempts` attempts and returns the first that places
    /// `target` words. Otherwise returns the attempt that placed the most
    /// words. If no attempt placed anything, one last attempt with
    /// `fallback_word_count` is made and its error propagates.
    #[instrument(skip(self, pool, rng), fields(pool = pool.len()))]
    pub fn generate_from_pool<R: Rng + ?Sized>(
        &self,
        target: usize,
        pool: &[String],
        rng: &mut R,
    ) -> Result<Crossword, GenerateError> {
        let target = target.max(1);
        info!(target, "Generating crossword");

        let mut best: Option<Crossword> = None;

        for attempt in 1..=self.config.max_attempts {
            debug!(attempt, max = self.config.max_attempts, "Starting attempt");

            match self.attempt(target, pool, rng) {
                Ok(crossword) if crossword.len() >= target => {
                    info!(attempt, placed = crossword.len(), "Target reached");
                    return Ok(crossword);
                }
                Ok(crossword) => {
                    let best_len = best.as_ref().map_or(0, Crossword::len);
                    debug!(attempt, placed = crossword.len(), best_len, "Attempt fell short");
                    if crossword.len() > best_len {
                        best = Some(crossword);
                    }
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Attempt failed");
                }
            }
        }

        if let Some(best) = best {
            warn!(placed = best.len(), target, "Returning best-effort crossword");
            return Ok(best);
        }

        let fallback = self.config.fallback_word_count;
        warn!(fallback, "No attempt placed a word, running fallback attempt");
        self.attempt(fallback, pool, rng)
    }

    /// Runs one attempt: seed, first-fit placement, blocks, numbering and clues.
    #[instrument(skip(self, pool, rng), fields(pool = pool.len()))]
    pub fn attempt<R: Rng + ?Sized>(
        &self,
        target: usize,
        pool: &[String],
        rng: &mut R,
    ) -> Result<Crossword, GenerateError> {
        let size = self.config.grid_size;
        let mut grid = Grid::new(size);

        let mut shuffled = pool.to_vec();
        shuffled.shuffle(rng);
        let mut remaining = shuffled.into_iter();

        let seed = remaining
            .next()
            .ok_or_else(|| GenerateError::new(GenerateErrorKind::EmptyPool))?;
        let seed = seed_placement(seed, size)?;
        debug!(seed = seed.word(), col = seed.start_col(), "Seed placed");
        grid.place(&seed);

        let mut placed = vec![seed];
        for candidate in remaining {
            if placed.len() >= target {
                break;
            }
            if let Some(placement) = first_fit(&grid, &placed, &candidate) {
                grid.place(&placement);
                placed.push(placement);
            }
        }

        grid.add_design_blocks();
        grid.fill_empty_with_blocks();

        let clues: Vec<String> = placed.iter().map(|p| self.source.clue(p.word())).collect();
        let words: Vec<CrosswordWord> = placed
            .into_iter()
            .zip(clues)
            .zip(1..)
            .map(|((placement, clue), id)| placement.into_word(id, clue))
            .collect();
        let grid = grid.numbered(&words);

        debug!(placed = words.len(), target, "Attempt finished");
        Ok(Crossword { words, grid })
    }
}

/// Centers the seed horizontally on the middle row.
fn seed_placement(word: String, size: usize) -> Result<Placement, GenerateError> {
    let len = word.chars().count();
    if len > size {
        return Err(GenerateError::new(GenerateErrorKind::WordTooLong {
            word,
            grid_size: size,
        }));
    }
    Ok(Placement::new(
        word,
        Direction::Horizontal,
        size / 2,
        (size - len) / 2,
    ))
}

/// First valid crossing of `candidate` with a placed word.
///
/// Search order: placed words in placement order, then letter index of the
/// placed word, then letter index of the candidate.
fn first_fit(grid: &Grid, placed: &[Placement], candidate: &str) -> Option<Placement> {
    let letters: Vec<char> = candidate.chars().collect();

    for existing in placed {
        let direction = existing.direction().perpendicular();

        for (cross_row, cross_col, letter) in existing.cells() {
            for (j, _) in letters.iter().enumerate().filter(|(_, c)| **c == letter) {
                let start = match direction {
                    Direction::Horizontal => cross_col.checked_sub(j).map(|col| (cross_row, col)),
                    Direction::Vertical => cross_row.checked_sub(j).map(|row| (row, cross_col)),
                };
                let Some((start_row, start_col)) = start else {
                    continue;
                };

                if grid.fits(candidate, direction, start_row, start_col) {
                    return Some(Placement::new(
                        candidate.to_string(),
                        direction,
                        start_row,
                        start_col,
                    ));
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_centered() {
        let seed = seed_placement("casa".to_string(), 15).unwrap();
        assert_eq!(seed.start_row(), 7);
        assert_eq!(seed.start_col(), 5);
        assert_eq!(seed.direction(), Direction::Horizontal);
    }

    #[test]
    fn test_seed_too_long() {
        let err = seed_placement("abcdef".to_string(), 5).unwrap_err();
        assert!(matches!(err.kind, GenerateErrorKind::WordTooLong { grid_size: 5, .. }));
    }

    #[test]
    fn test_first_fit_uses_first_matching_letter() {
        let mut grid = Grid::new(15);
        let seed = Placement::new("casa".into(), Direction::Horizontal, 7, 5);
        grid.place(&seed);

        // "sapo" first matches the 'a' at casa[1] with sapo[1].
        let placement = first_fit(&grid, &[seed], "sapo").unwrap();
        assert_eq!(placement.direction(), Direction::Vertical);
        assert_eq!((placement.start_row(), placement.start_col()), (6, 6));
    }

    #[test]
    fn test_first_fit_no_shared_letter() {
        let mut grid = Grid::new(15);
        let seed = Placement::new("casa".into(), Direction::Horizontal, 7, 5);
        grid.place(&seed);
        assert!(first_fit(&grid, &[seed], "rio").is_none());
    }

    #[test]
    fn test_first_fit_skips_out_of_bounds() {
        let mut grid = Grid::new(5);
        let seed = Placement::new("casa".into(), Direction::Horizontal, 0, 0);
        grid.place(&seed);
        // Every 'a' in "bala" would start it above row 0.
        assert!(first_fit(&grid, &[seed.clone()], "bala").is_none());
        let placement = first_fit(&grid, &[seed], "asno").unwrap();
        assert_eq!((placement.start_row(), placement.start_col()), (0, 1));
    }
}
