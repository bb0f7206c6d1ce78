//! Crossword construction library.
//!
//! Builds square crossword grids from a pool of candidate words: a seed word
//! across the middle row, greedy first-fit crossings for the rest, decorative
//! blocks, a fill pass, clue numbering and a best-of-N retry policy.
//!
//! # Example
//!
//! ```no_run
//! use crossword_core::{CrosswordGenerator, Dictionary, GeneratorConfig};
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dictionary = Arc::new(Dictionary::builtin()?);
//! let generator = CrosswordGenerator::new(dictionary, GeneratorConfig::default());
//! let crossword = generator.generate(30, &mut rand::thread_rng())?;
//! println!("{crossword}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod generator;
mod grid;
mod types;
mod words;

pub use error::{DictionaryError, GenerateError, GenerateErrorKind};
pub use generator::{CrosswordGenerator, GeneratorConfig};
pub use grid::{Cell, Grid, Placement};
pub use types::{Crossword, CrosswordWord, Direction, GridCell, NumberedGrid};
pub use words::{
    Dictionary, DictionaryStats, MAX_WORD_LEN, MIN_WORD_LEN, WordSource, fallback_clue,
};
