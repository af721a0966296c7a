use super::Solver;
use crate::algorithm::{dijkstra, Frontier, SearchOptions, Ties};
use crate::common::{Answer, Position, Solution, State};
use crate::config::Config;
use crate::graph::{MoveRule, UniformCost, Unblocked};
use crate::map::Map;
use crate::stat::Stats;

use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info};

/// Shortcuts through the walls of a single-lane racetrack.
pub struct RaceSolver {
    map: Map,
    stats: Stats,
}

impl RaceSolver {
    pub fn new(map: Map) -> Self {
        RaceSolver {
            map,
            stats: Stats::default(),
        }
    }

    /// The shortest start-to-goal route, one position per step.
    pub fn racetrack(&mut self, frontier: Frontier) -> Option<Vec<Position>> {
        let map = &self.map;
        let paths = dijkstra(
            &[State::at(map.start)],
            |state, out| UniformCost.successors(map, &Unblocked, state, out),
            SearchOptions {
                frontier,
                ties: Ties::Strict,
            },
            &mut self.stats,
        );
        let path = paths.path_to(State::at(map.goal))?;
        Some(path.into_iter().map(|state| state.position).collect())
    }
}

/// Counts shortcuts per number of saved steps. A shortcut jumps from track
/// index `i` to a later index `j` at most `budget` cells away (Manhattan),
/// saving `(j - i) - distance` steps. Only savings `>= threshold` are kept.
pub fn savings_histogram(
    track: &[Position],
    budget: usize,
    threshold: usize,
) -> BTreeMap<usize, usize> {
    let mut histogram = BTreeMap::new();
    for (i, from) in track.iter().enumerate() {
        for (offset, to) in track[i + 1..].iter().enumerate() {
            let distance = from.manhattan(to);
            if distance > budget {
                continue;
            }
            let saved = (offset + 1).saturating_sub(distance);
            if saved >= threshold && saved > 0 {
                *histogram.entry(saved).or_insert(0) += 1;
            }
        }
    }
    histogram
}

pub fn count_cheats(track: &[Position], budget: usize, threshold: usize) -> usize {
    savings_histogram(track, budget, threshold).values().sum()
}

impl Solver for RaceSolver {
    fn solve(&mut self, config: &Config) -> Solution {
        let solve_start_time = Instant::now();

        let Some(track) = self.racetrack(config.frontier) else {
            info!("goal {} is unreachable", self.map.goal);
            self.stats.time_us = solve_start_time.elapsed().as_micros() as usize;
            return Solution::default();
        };
        debug!("racetrack of {} steps", track.len() - 1);

        let part_one = count_cheats(&track, config.cheat_budget, config.threshold);
        let part_two = count_cheats(&track, config.cheat_budget_two, config.threshold_two);

        self.stats.time_us = solve_start_time.elapsed().as_micros() as usize;
        Solution {
            part_one: Some(Answer::Number(part_one)),
            part_two: Some(Answer::Number(part_two)),
        }
    }

    fn stats(&self) -> &Stats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Puzzle;

    fn sample_track() -> Vec<Position> {
        let map = Map::from_file("map_file/race/sample.txt").unwrap();
        RaceSolver::new(map).racetrack(Frontier::BinaryHeap).unwrap()
    }

    #[test]
    fn test_racetrack_follows_the_lane() {
        let track = sample_track();
        assert_eq!(track.len() - 1, 84);
        assert_eq!(track.first(), Some(&Position::new(1, 3)));
        assert_eq!(track.last(), Some(&Position::new(5, 7)));
        assert!(track.windows(2).all(|step| step[0].manhattan(&step[1]) == 1));
    }

    #[test]
    fn test_short_cheats() {
        let track = sample_track();
        assert_eq!(count_cheats(&track, 2, 2), 44);

        let histogram = savings_histogram(&track, 2, 1);
        let expected = BTreeMap::from([
            (2, 14),
            (4, 14),
            (6, 2),
            (8, 4),
            (10, 2),
            (12, 3),
            (20, 1),
            (36, 1),
            (38, 1),
            (40, 1),
            (64, 1),
        ]);
        assert_eq!(histogram, expected);
    }

    #[test]
    fn test_long_cheats() {
        let track = sample_track();
        assert_eq!(count_cheats(&track, 20, 50), 285);
        assert_eq!(savings_histogram(&track, 20, 76), BTreeMap::from([(76, 3)]));
    }

    #[test]
    fn test_sample_solution() {
        let config = Config {
            puzzle: Puzzle::Race,
            threshold: 2,
            threshold_two: 50,
            ..Config::default()
        };
        let map = Map::from_file("map_file/race/sample.txt").unwrap();
        let solution = RaceSolver::new(map).solve(&config);
        assert_eq!(solution.part_one, Some(Answer::Number(44)));
        assert_eq!(solution.part_two, Some(Answer::Number(285)));
    }

    #[test]
    fn test_unreachable_goal_has_no_answers() {
        let map: Map = "S#E".parse().unwrap();
        let solution = RaceSolver::new(map).solve(&Config::default());
        assert_eq!(solution, Solution::default());
    }

    #[test]
    fn test_straight_track_has_no_cheats() {
        let track: Vec<Position> = (0..10).map(|x| Position::new(x, 0)).collect();
        assert_eq!(count_cheats(&track, 20, 1), 0);
    }
}
