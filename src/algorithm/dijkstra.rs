use super::{construct_path, Trace};
use crate::common::{LowLevelNode, Path};
use crate::stat::Stats;

use serde::{Deserialize, Serialize};
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use tracing::{debug, instrument, trace};

/// Distance of a state the search never reached.
pub const UNREACHABLE: usize = usize::MAX;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum Frontier {
    /// Binary heap, O((V + E) log V).
    #[default]
    #[serde(rename = "heap")]
    #[value(name = "heap")]
    BinaryHeap,
    /// Picks the minimum by scanning every unfinalized state, O(V^2).
    #[serde(rename = "scan")]
    #[value(name = "scan")]
    LinearScan,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Ties {
    /// One predecessor per state, updated on strictly shorter distances.
    #[default]
    Strict,
    /// Every predecessor reaching a state at its minimum distance.
    KeepAll,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub frontier: Frontier,
    pub ties: Ties,
}

/// Distance and predecessor maps produced by one search.
#[derive(Debug, Clone)]
pub struct ShortestPaths<S> {
    starts: Vec<S>,
    distances: HashMap<S, usize>,
    trace: Trace<S>,
}

impl<S: Copy + Eq + Hash> ShortestPaths<S> {
    fn new(starts: &[S]) -> Self {
        ShortestPaths {
            starts: starts.to_vec(),
            distances: HashMap::new(),
            trace: HashMap::new(),
        }
    }

    /// Minimum distance to `state`, or [`UNREACHABLE`].
    pub fn distance(&self, state: &S) -> usize {
        self.distances.get(state).copied().unwrap_or(UNREACHABLE)
    }

    pub fn is_reachable(&self, state: &S) -> bool {
        self.distances.contains_key(state)
    }

    pub fn predecessors(&self, state: &S) -> &[S] {
        self.trace.get(state).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of states the search reached.
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    pub fn reached(&self) -> impl Iterator<Item = (&S, &usize)> {
        self.distances.iter()
    }

    /// Ordered states from a start to `goal`, both inclusive.
    pub fn path_to(&self, goal: S) -> Option<Path<S>> {
        if !self.is_reachable(&goal) {
            return None;
        }
        let path = construct_path(&self.trace, goal);
        let from_start = path.first().is_some_and(|first| self.starts.contains(first));
        from_start.then_some(path)
    }

    /// Every state lying on some minimum-cost path to one of `goals`.
    /// Only complete when the search ran with [`Ties::KeepAll`].
    pub fn states_on_optimal_paths<I>(&self, goals: I) -> HashSet<S>
    where
        I: IntoIterator<Item = S>,
    {
        let mut stack: Vec<S> = goals
            .into_iter()
            .filter(|goal| self.is_reachable(goal))
            .collect();
        let mut seen: HashSet<S> = stack.iter().copied().collect();

        while let Some(current) = stack.pop() {
            for &previous in self.predecessors(&current) {
                if seen.insert(previous) {
                    stack.push(previous);
                }
            }
        }
        seen
    }

    /// Records `tentative` as a distance to `next` via `from`.
    /// Returns true when `next` has to be (re)inserted into the frontier.
    fn relax(&mut self, from: S, next: S, tentative: usize, ties: Ties) -> bool {
        match self.distances.get(&next) {
            Some(&known) if tentative > known => false,
            Some(&known) if tentative == known => {
                if ties == Ties::KeepAll {
                    let previous = self.trace.entry(next).or_default();
                    if !previous.contains(&from) {
                        previous.push(from);
                    }
                }
                false
            }
            _ => {
                self.distances.insert(next, tentative);
                self.trace.insert(next, vec![from]);
                true
            }
        }
    }
}

enum OpenList<S> {
    Heap(BinaryHeap<LowLevelNode<S>>),
    Scan(HashMap<S, usize>),
}

impl<S: Copy + Ord + Hash> OpenList<S> {
    fn new(frontier: Frontier) -> Self {
        match frontier {
            Frontier::BinaryHeap => OpenList::Heap(BinaryHeap::new()),
            Frontier::LinearScan => OpenList::Scan(HashMap::new()),
        }
    }

    fn push(&mut self, state: S, g_cost: usize) {
        match self {
            OpenList::Heap(heap) => heap.push(LowLevelNode { state, g_cost }),
            OpenList::Scan(open) => {
                let known = open.entry(state).or_insert(g_cost);
                *known = (*known).min(g_cost);
            }
        }
    }

    fn pop(&mut self) -> Option<LowLevelNode<S>> {
        match self {
            OpenList::Heap(heap) => heap.pop(),
            OpenList::Scan(open) => {
                let (&state, &g_cost) = open
                    .iter()
                    .min_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)))?;
                open.remove(&state);
                Some(LowLevelNode { state, g_cost })
            }
        }
    }
}

/// Single-source (or multi-source) shortest paths over a lazily generated
/// graph. Runs until the frontier is empty.
#[instrument(
    skip_all,
    name = "dijkstra",
    fields(starts = starts.len(), frontier = ?options.frontier, ties = ?options.ties),
    level = "debug"
)]
pub fn dijkstra<S, F>(
    starts: &[S],
    mut successors: F,
    options: SearchOptions,
    stats: &mut Stats,
) -> ShortestPaths<S>
where
    S: Copy + Ord + Hash + Debug,
    F: FnMut(&S, &mut Vec<(S, usize)>),
{
    stats.searches += 1;

    let mut result = ShortestPaths::new(starts);
    let mut open = OpenList::new(options.frontier);
    let mut closed = HashSet::new();
    let mut buffer = Vec::new();

    for &start in starts {
        if result.distances.insert(start, 0).is_none() {
            open.push(start, 0);
            stats.pushed_states += 1;
        }
    }

    while let Some(current) = open.pop() {
        // Stale heap entries for states finalized at a lower cost.
        if current.g_cost > result.distance(&current.state) || !closed.insert(current.state) {
            continue;
        }
        trace!("expand state: {current:?}");
        stats.expanded_states += 1;

        buffer.clear();
        successors(&current.state, &mut buffer);
        for (next, weight) in buffer.drain(..) {
            let tentative = current.g_cost.saturating_add(weight);
            if result.relax(current.state, next, tentative, options.ties) {
                open.push(next, tentative);
                stats.pushed_states += 1;
            }
        }
    }

    debug!("reached {} states", result.len());
    result
}

/// Strict search that stops at the first finalized state satisfying
/// `is_goal`. Returns that state and its distance.
#[instrument(
    skip_all,
    name = "search_goal",
    fields(start = ?start, frontier = ?frontier),
    level = "debug"
)]
pub fn search_goal<S, F, G>(
    start: S,
    mut successors: F,
    is_goal: G,
    frontier: Frontier,
    stats: &mut Stats,
) -> Option<(S, usize)>
where
    S: Copy + Ord + Hash + Debug,
    F: FnMut(&S, &mut Vec<(S, usize)>),
    G: Fn(&S) -> bool,
{
    stats.searches += 1;

    let mut distances = HashMap::from([(start, 0)]);
    let mut open = OpenList::new(frontier);
    let mut closed = HashSet::new();
    let mut buffer = Vec::new();
    open.push(start, 0);
    stats.pushed_states += 1;

    while let Some(current) = open.pop() {
        if current.g_cost > distances[&current.state] || !closed.insert(current.state) {
            continue;
        }
        stats.expanded_states += 1;

        if is_goal(&current.state) {
            debug!("goal {:?} at distance {}", current.state, current.g_cost);
            return Some((current.state, current.g_cost));
        }

        buffer.clear();
        successors(&current.state, &mut buffer);
        for (next, weight) in buffer.drain(..) {
            let tentative = current.g_cost.saturating_add(weight);
            if tentative < *distances.get(&next).unwrap_or(&UNREACHABLE) {
                distances.insert(next, tentative);
                open.push(next, tentative);
                stats.pushed_states += 1;
            }
        }
    }

    debug!("cannot reach goal");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Position, State};
    use crate::graph::{MoveRule, TurningCost, UniformCost, Unblocked};
    use crate::map::Map;

    // Helper function to setup tracing
    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .try_init();
    }

    fn solve<R: MoveRule>(map: &Map, rule: &R, options: SearchOptions) -> ShortestPaths<State> {
        let stats = &mut Stats::default();
        dijkstra(
            &[rule.start_state(map.start)],
            |state, out| rule.successors(map, &Unblocked, state, out),
            options,
            stats,
        )
    }

    fn samples() -> Vec<Map> {
        [
            "map_file/maze/sample-1.txt",
            "map_file/maze/sample-2.txt",
            "map_file/race/sample.txt",
        ]
        .iter()
        .map(|path| Map::from_file(path).unwrap())
        .collect()
    }

    fn edge_cost(rule: &TurningCost, from: &State, to: &State) -> usize {
        if from.position == to.position {
            rule.turn_penalty
        } else {
            1
        }
    }

    #[test]
    fn test_start_distance_is_zero() {
        init_tracing();
        for map in samples() {
            let paths = solve(&map, &UniformCost, SearchOptions::default());
            assert_eq!(paths.distance(&State::at(map.start)), 0);
            assert_eq!(paths.path_to(State::at(map.start)), Some(vec![State::at(map.start)]));
        }
    }

    #[test]
    fn test_uniform_path_length_matches_distance() {
        init_tracing();
        for map in samples() {
            let paths = solve(&map, &UniformCost, SearchOptions::default());
            for (state, &distance) in paths.reached() {
                let path = paths.path_to(*state).unwrap();
                assert_eq!(path.len() - 1, distance);
                assert_eq!(path[0], State::at(map.start));
                for step in path.windows(2) {
                    assert_eq!(step[0].position.manhattan(&step[1].position), 1);
                }
            }
        }
    }

    #[test]
    fn test_turning_path_cost_matches_distance() {
        init_tracing();
        let rule = TurningCost::default();
        for map in samples() {
            let paths = solve(&map, &rule, SearchOptions::default());
            for (state, &distance) in paths.reached() {
                let path = paths.path_to(*state).unwrap();
                let cost: usize = path
                    .windows(2)
                    .map(|step| edge_cost(&rule, &step[0], &step[1]))
                    .sum();
                assert_eq!(cost, distance);
            }
        }
    }

    #[test]
    fn test_frontiers_agree() {
        init_tracing();
        let rule = TurningCost::default();
        for map in samples() {
            let heap = solve(&map, &rule, SearchOptions::default());
            let scan = solve(
                &map,
                &rule,
                SearchOptions {
                    frontier: Frontier::LinearScan,
                    ties: Ties::Strict,
                },
            );
            assert_eq!(heap.len(), scan.len());
            for (state, distance) in heap.reached() {
                assert_eq!(scan.distance(state), *distance);
            }
        }
    }

    #[test]
    fn test_keep_all_ties_agrees_on_distances() {
        init_tracing();
        let rule = TurningCost::default();
        for map in samples() {
            let strict = solve(&map, &rule, SearchOptions::default());
            let keep_all = solve(
                &map,
                &rule,
                SearchOptions {
                    frontier: Frontier::BinaryHeap,
                    ties: Ties::KeepAll,
                },
            );
            for (state, distance) in strict.reached() {
                assert_eq!(keep_all.distance(state), *distance);
                assert!(strict.predecessors(state).len() <= 1);
                assert!(keep_all
                    .predecessors(state)
                    .iter()
                    .all(|previous| keep_all.distance(previous) < *distance));
            }
        }
    }

    #[test]
    fn test_keep_all_records_both_routes() {
        // Two equal routes around the middle wall.
        let map: Map = "#####\n#S..#\n#.#.#\n#..E#\n#####".parse().unwrap();
        let paths = solve(
            &map,
            &UniformCost,
            SearchOptions {
                frontier: Frontier::BinaryHeap,
                ties: Ties::KeepAll,
            },
        );
        let goal = State::at(map.goal);
        assert_eq!(paths.distance(&goal), 4);
        assert_eq!(paths.predecessors(&goal).len(), 2);
        assert_eq!(paths.states_on_optimal_paths([goal]).len(), 8);
    }

    #[test]
    fn test_search_is_deterministic() {
        init_tracing();
        let map = Map::from_file("map_file/maze/sample-2.txt").unwrap();
        let rule = TurningCost::default();
        let first = solve(&map, &rule, SearchOptions::default());
        for _ in 0..3 {
            let again = solve(&map, &rule, SearchOptions::default());
            for facing in crate::common::Direction::ALL {
                let goal = State::facing(map.goal, facing);
                assert_eq!(first.distance(&goal), again.distance(&goal));
                assert_eq!(first.path_to(goal), again.path_to(goal));
            }
        }
    }

    #[test]
    fn test_unreachable_goal() {
        let map: Map = "S#E".parse().unwrap();
        let paths = solve(&map, &UniformCost, SearchOptions::default());
        let goal = State::at(map.goal);
        assert!(!paths.is_reachable(&goal));
        assert_eq!(paths.distance(&goal), UNREACHABLE);
        assert_eq!(paths.path_to(goal), None);
        assert!(paths.states_on_optimal_paths([goal]).is_empty());
    }

    #[test]
    fn test_search_goal_stops_early() {
        init_tracing();
        let map = Map::from_file("map_file/race/sample.txt").unwrap();
        let full_stats = &mut Stats::default();
        let full = dijkstra(
            &[State::at(map.start)],
            |state, out| UniformCost.successors(&map, &Unblocked, state, out),
            SearchOptions::default(),
            full_stats,
        );

        for frontier in [Frontier::BinaryHeap, Frontier::LinearScan] {
            let stats = &mut Stats::default();
            let found = search_goal(
                State::at(map.start),
                |state, out| UniformCost.successors(&map, &Unblocked, state, out),
                |state| state.position == map.goal,
                frontier,
                stats,
            );
            assert_eq!(found, Some((State::at(map.goal), 84)));
            assert_eq!(full.distance(&State::at(map.goal)), 84);
            assert!(stats.expanded_states <= full_stats.expanded_states);
        }

        let stats = &mut Stats::default();
        let missing = search_goal(
            State::at(map.start),
            |state, out| UniformCost.successors(&map, &Unblocked, state, out),
            |state| state.position == Position::new(0, 0),
            Frontier::BinaryHeap,
            stats,
        );
        assert_eq!(missing, None);
    }
}
