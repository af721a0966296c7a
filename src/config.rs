use anyhow::{anyhow, ensure};
use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::algorithm::Frontier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Puzzle {
    /// Reindeer maze: turning costs, tiles on every best path.
    Maze,
    /// Falling obstacles: steps after a prefix, first obstacle cutting the route.
    Memory,
    /// Racetrack: shortcuts through walls saving enough steps.
    Race,
}

#[derive(Parser, Debug)]
#[command(
    name = "Grid Paths",
    about = "Shortest paths over character grids: mazes, falling obstacles, racetrack cheats",
    version = "1.0"
)]
pub struct Cli {
    #[arg(long, help = "Path to a YAML config file")]
    pub config: Option<String>,

    #[arg(long, value_enum, help = "Puzzle to solve")]
    pub puzzle: Option<Puzzle>,

    #[arg(long, help = "Path to the puzzle input")]
    pub input_path: Option<String>,

    #[arg(long, help = "Path of the JSON report to write")]
    pub output_path: Option<String>,

    #[arg(long, help = "Side length of the obstacle field")]
    pub grid_size: Option<usize>,

    #[arg(long, help = "Number of obstacles fallen for part one")]
    pub obstacle_count: Option<usize>,

    #[arg(long, help = "Cost of a quarter turn in the maze")]
    pub turn_penalty: Option<usize>,

    #[arg(long, help = "Cheat length for part one")]
    pub cheat_budget: Option<usize>,

    #[arg(long, help = "Cheat length for part two")]
    pub cheat_budget_two: Option<usize>,

    #[arg(long, help = "Minimum saved steps for part one")]
    pub threshold: Option<usize>,

    #[arg(long, help = "Minimum saved steps for part two")]
    pub threshold_two: Option<usize>,

    #[arg(long, value_enum, help = "Frontier used by the shortest-path search")]
    pub frontier: Option<Frontier>,

    #[arg(long, help = "Seed for generated obstacle fields")]
    pub seed: Option<u64>,

    #[arg(long, help = "Expected answer of part one")]
    pub expect_part_one: Option<String>,

    #[arg(long, help = "Expected answer of part two")]
    pub expect_part_two: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub puzzle: Puzzle,
    pub input_path: Option<String>,
    pub output_path: Option<String>,
    pub grid_size: usize,
    pub obstacle_count: usize,
    pub turn_penalty: usize,
    pub cheat_budget: usize,
    pub cheat_budget_two: usize,
    pub threshold: usize,
    pub threshold_two: usize,
    pub frontier: Frontier,
    pub seed: u64,
    pub expect_part_one: Option<String>,
    pub expect_part_two: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            puzzle: Puzzle::Maze,
            input_path: None,
            output_path: None,
            grid_size: 71,
            obstacle_count: 1024,
            turn_penalty: 1000,
            cheat_budget: 2,
            cheat_budget_two: 20,
            threshold: 100,
            threshold_two: 100,
            frontier: Frontier::BinaryHeap,
            seed: 0,
            expect_part_one: None,
            expect_part_two: None,
        }
    }
}

impl Config {
    /// Deserializes a config. Validation happens once the command line has
    /// been merged in, see [`Config::override_from_command_line`].
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn override_from_command_line(mut self, cli: &Cli) -> anyhow::Result<Self> {
        if let Some(puzzle) = cli.puzzle {
            self.puzzle = puzzle;
        }
        if let Some(input_path) = &cli.input_path {
            self.input_path = Some(input_path.clone());
        }
        if let Some(output_path) = &cli.output_path {
            self.output_path = Some(output_path.clone());
        }
        if let Some(grid_size) = cli.grid_size {
            self.grid_size = grid_size;
        }
        if let Some(obstacle_count) = cli.obstacle_count {
            self.obstacle_count = obstacle_count;
        }
        if let Some(turn_penalty) = cli.turn_penalty {
            self.turn_penalty = turn_penalty;
        }
        if let Some(cheat_budget) = cli.cheat_budget {
            self.cheat_budget = cheat_budget;
        }
        if let Some(cheat_budget_two) = cli.cheat_budget_two {
            self.cheat_budget_two = cheat_budget_two;
        }
        if let Some(threshold) = cli.threshold {
            self.threshold = threshold;
        }
        if let Some(threshold_two) = cli.threshold_two {
            self.threshold_two = threshold_two;
        }
        if let Some(frontier) = cli.frontier {
            self.frontier = frontier;
        }
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        if let Some(expected) = &cli.expect_part_one {
            self.expect_part_one = Some(expected.clone());
        }
        if let Some(expected) = &cli.expect_part_two {
            self.expect_part_two = Some(expected.clone());
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.grid_size > 0, "Grid size must be positive");

        match self.puzzle {
            Puzzle::Maze | Puzzle::Race => {
                if self.input_path.is_none() {
                    return Err(anyhow!("Puzzle {:?} needs an input path", self.puzzle));
                }
            }
            // Without an input the obstacles are generated from the seed.
            Puzzle::Memory => {}
        }

        if self.puzzle == Puzzle::Maze {
            ensure!(
                self.turn_penalty > 0,
                "Turn penalty must be greater than 0, got {}",
                self.turn_penalty
            );
        }
        Ok(())
    }
}
