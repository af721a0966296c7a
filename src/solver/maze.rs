use super::Solver;
use crate::algorithm::{dijkstra, SearchOptions, ShortestPaths, Ties, UNREACHABLE};
use crate::common::{Answer, Direction, Position, Solution, State};
use crate::config::Config;
use crate::graph::{MoveRule, TurningCost, Unblocked};
use crate::map::Map;
use crate::stat::Stats;

use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info};

/// Lowest turning-cost score from start to goal, and the tiles lying on any
/// path achieving it.
pub struct MazeSolver {
    map: Map,
    stats: Stats,
}

impl MazeSolver {
    pub fn new(map: Map) -> Self {
        MazeSolver {
            map,
            stats: Stats::default(),
        }
    }

    fn search(&mut self, config: &Config) -> (TurningCost, ShortestPaths<State>) {
        let rule = TurningCost {
            turn_penalty: config.turn_penalty,
            initial_facing: Direction::East,
        };
        let map = &self.map;
        // Ties must survive for the tile count, so one KeepAll run serves both parts.
        let paths = dijkstra(
            &[rule.start_state(map.start)],
            |state, out| rule.successors(map, &Unblocked, state, out),
            SearchOptions {
                frontier: config.frontier,
                ties: Ties::KeepAll,
            },
            &mut self.stats,
        );
        (rule, paths)
    }

    fn goal_states(&self) -> impl Iterator<Item = State> + '_ {
        Direction::ALL
            .into_iter()
            .map(|facing| State::facing(self.map.goal, facing))
    }

    pub fn lowest_score(&mut self, config: &Config) -> Option<usize> {
        let (_, paths) = self.search(config);
        best_score(&paths, self.goal_states())
    }

    pub fn best_tiles(&mut self, config: &Config) -> Option<HashSet<Position>> {
        let (_, paths) = self.search(config);
        let score = best_score(&paths, self.goal_states())?;
        Some(tiles_on_best_paths(&paths, self.goal_states(), score))
    }
}

fn best_score(paths: &ShortestPaths<State>, goals: impl Iterator<Item = State>) -> Option<usize> {
    goals
        .map(|goal| paths.distance(&goal))
        .min()
        .filter(|&score| score != UNREACHABLE)
}

fn tiles_on_best_paths(
    paths: &ShortestPaths<State>,
    goals: impl Iterator<Item = State>,
    score: usize,
) -> HashSet<Position> {
    let best_goals: Vec<State> = goals.filter(|goal| paths.distance(goal) == score).collect();
    paths
        .states_on_optimal_paths(best_goals)
        .into_iter()
        .map(|state| state.position)
        .collect()
}

impl Solver for MazeSolver {
    fn solve(&mut self, config: &Config) -> Solution {
        let solve_start_time = Instant::now();

        let (rule, paths) = self.search(config);
        debug!("turn penalty {}, reached {} states", rule.turn_penalty, paths.len());

        let solution = match best_score(&paths, self.goal_states()) {
            Some(score) => {
                let tiles = tiles_on_best_paths(&paths, self.goal_states(), score);
                Solution {
                    part_one: Some(Answer::Number(score)),
                    part_two: Some(Answer::Number(tiles.len())),
                }
            }
            None => {
                info!("goal {} is unreachable", self.map.goal);
                Solution::default()
            }
        };

        self.stats.time_us = solve_start_time.elapsed().as_micros() as usize;
        solution
    }

    fn stats(&self) -> &Stats {
        &self.stats
    }
}
