mod dijkstra;

pub use dijkstra::{
    dijkstra, search_goal, Frontier, SearchOptions, ShortestPaths, Ties, UNREACHABLE,
};

use std::collections::HashMap;
use std::hash::Hash;

use crate::common::Path;

type Trace<S> = HashMap<S, Vec<S>>;

/// Follows the first recorded predecessor of each state back from `current`.
pub(crate) fn construct_path<S: Copy + Eq + Hash>(trace: &Trace<S>, mut current: S) -> Path<S> {
    let mut path = vec![current];
    while let Some(&previous) = trace.get(&current).and_then(|previous| previous.first()) {
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}
