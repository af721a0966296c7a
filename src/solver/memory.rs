use super::Solver;
use crate::algorithm::{search_goal, Frontier};
use crate::common::{Answer, Position, Solution, State};
use crate::config::Config;
use crate::graph::{MoveRule, UniformCost};
use crate::map::Map;
use crate::stat::Stats;

use anyhow::ensure;
use std::time::Instant;
use tracing::{debug, info, instrument};

const NEVER: usize = usize::MAX;

/// Square field on which obstacles fall one after another. Walks from the
/// top-left corner to the bottom-right one.
pub struct MemorySolver {
    map: Map,
    obstacles: Vec<Position>,
    // Index of the first obstacle landing on each cell, row-major.
    fallen_at: Vec<usize>,
    stats: Stats,
}

impl MemorySolver {
    pub fn new(size: usize, obstacles: Vec<Position>) -> anyhow::Result<Self> {
        ensure!(size > 0, "field size must be positive");
        let goal = Position {
            x: size - 1,
            y: size - 1,
        };
        let map = Map::open_field(size, size, Position { x: 0, y: 0 }, goal)?;

        let mut fallen_at = vec![NEVER; size * size];
        for (index, obstacle) in obstacles.iter().enumerate() {
            ensure!(
                map.in_bounds(*obstacle),
                "obstacle {index} at {obstacle} is outside the {size}x{size} field"
            );
            let cell = &mut fallen_at[obstacle.y * size + obstacle.x];
            *cell = (*cell).min(index);
        }

        Ok(MemorySolver {
            map,
            obstacles,
            fallen_at,
            stats: Stats::default(),
        })
    }

    pub fn obstacles(&self) -> &[Position] {
        &self.obstacles
    }

    /// Fewest steps from start to goal once the first `fallen` obstacles are down.
    #[instrument(skip(self), level = "debug")]
    pub fn min_steps(&mut self, fallen: usize, frontier: Frontier) -> Option<usize> {
        let map = &self.map;
        let fallen_at = &self.fallen_at;
        let width = map.width;
        let blocked = |position: Position| fallen_at[position.y * width + position.x] < fallen;

        if blocked(map.start) {
            return None;
        }
        search_goal(
            State::at(map.start),
            |state, out| UniformCost.successors(map, &blocked, state, out),
            |state| state.position == map.goal,
            frontier,
            &mut self.stats,
        )
        .map(|(_, steps)| steps)
    }

    pub fn can_reach(&mut self, fallen: usize, frontier: Frontier) -> bool {
        self.stats.reachability_probes += 1;
        self.min_steps(fallen, frontier).is_some()
    }

    /// The obstacle whose landing first cuts the start off from the goal,
    /// with its index in the fall order. `None` if the route survives every
    /// obstacle.
    ///
    /// Binary search over the number of fallen obstacles. This relies on
    /// reachability never coming back once lost, which holds because
    /// obstacles only ever add walls; [`MemorySolver::is_monotonic`] checks it.
    pub fn first_blocking(&mut self, frontier: Frontier) -> Option<(usize, Position)> {
        let total = self.obstacles.len();
        if self.can_reach(total, frontier) {
            info!("route survives all {total} obstacles");
            return None;
        }

        // Invariant: reachable with `last_ok` fallen, cut off with `first_cut`.
        let mut last_ok = 0;
        let mut first_cut = total;
        while first_cut - last_ok > 1 {
            let probe = last_ok + (first_cut - last_ok) / 2;
            if self.can_reach(probe, frontier) {
                last_ok = probe;
            } else {
                first_cut = probe;
            }
            debug!("probe {probe}: reachable up to {last_ok}, cut at {first_cut}");
        }

        let index = first_cut - 1;
        Some((index, self.obstacles[index]))
    }

    /// Whether reachability is non-increasing over every prefix of the fall order.
    pub fn is_monotonic(&mut self, frontier: Frontier) -> bool {
        let mut was_reachable = true;
        for fallen in 0..=self.obstacles.len() {
            let reachable = self.can_reach(fallen, frontier);
            if reachable && !was_reachable {
                return false;
            }
            was_reachable = reachable;
        }
        true
    }
}

impl Solver for MemorySolver {
    fn solve(&mut self, config: &Config) -> Solution {
        let solve_start_time = Instant::now();

        let fallen = config.obstacle_count.min(self.obstacles.len());
        let steps = self.min_steps(fallen, config.frontier);
        if steps.is_none() {
            info!("goal is cut off after {fallen} obstacles");
        }
        let blocking = self.first_blocking(config.frontier);
        if let Some((index, position)) = blocking {
            debug!("obstacle {index} at {position} cuts the route");
        }
        self.stats.time_us = solve_start_time.elapsed().as_micros() as usize;
        Solution {
            part_one: steps.map(Answer::Number),
            part_two: blocking.map(|(_, position)| Answer::Position(position)),
        }
    }

    fn stats(&self) -> &Stats {
        &self.stats
    }
}
