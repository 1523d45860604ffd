use std::path::PathBuf;

use clap::Parser;

use crate::search::{CandidateSet, SearchOptions, Strategy};

/// Traces a guard's patrol and counts the obstructions that would trap it.
#[derive(Debug, Parser)]
pub struct Config {
    /// Puzzle input, one grid row per line.
    #[arg(default_value = "input.txt")]
    pub input_path: PathBuf,

    /// How obstruction trials are executed.
    #[arg(long, value_enum, default_value_t)]
    pub strategy: Strategy,

    /// Which cells are tried as obstructions.
    #[arg(long, value_enum, default_value_t)]
    pub candidates: CandidateSet,

    /// Print the grid with the guard's trail after the answers.
    #[arg(long)]
    pub show_trail: bool,
}

impl Config {
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            strategy: self.strategy,
            candidates: self.candidates,
        }
    }
}
