mod maze;
mod memory;
mod race;

pub use maze::MazeSolver;
pub use memory::MemorySolver;
pub use race::{count_cheats, savings_histogram, RaceSolver};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::common::Solution;
use crate::config::{Config, Puzzle};
use crate::map::Map;
use crate::scenario::{read_obstacles, Scenario};
use crate::stat::Stats;

pub trait Solver {
    fn solve(&mut self, config: &Config) -> Solution;

    fn stats(&self) -> &Stats;
}

/// Loads the configured input and builds the matching solver.
pub fn from_config(config: &Config) -> anyhow::Result<Box<dyn Solver>> {
    let solver: Box<dyn Solver> = match config.puzzle {
        Puzzle::Maze => Box::new(MazeSolver::new(Map::from_file(input_path(config)?)?)),
        Puzzle::Race => Box::new(RaceSolver::new(Map::from_file(input_path(config)?)?)),
        Puzzle::Memory => {
            let obstacles = match &config.input_path {
                Some(path) => read_obstacles(path)?,
                None => {
                    info!(
                        "No input file specified, generating obstacles from seed {}",
                        config.seed
                    );
                    let mut rng = StdRng::seed_from_u64(config.seed);
                    Scenario::generate(config.grid_size, usize::MAX, &mut rng)
                }
            };
            Box::new(MemorySolver::new(config.grid_size, obstacles)?)
        }
    };
    Ok(solver)
}

fn input_path(config: &Config) -> anyhow::Result<&str> {
    config
        .input_path
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("Puzzle {:?} needs an input path", config.puzzle))
}
