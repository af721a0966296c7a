use std::cmp::Ordering;

/// Frontier entry of the shortest-path search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LowLevelNode<S> {
    pub(crate) state: S,
    pub(crate) g_cost: usize,
}

// BinaryHeap is a max-heap, so the cheapest node must compare greatest.
impl<S: Ord> Ord for LowLevelNode<S> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .g_cost
            .cmp(&self.g_cost)
            // Same cost: pop the smaller state first so runs are reproducible.
            .then_with(|| other.state.cmp(&self.state))
    }
}

impl<S: Ord> PartialOrd for LowLevelNode<S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
