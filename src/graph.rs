use crate::common::{Direction, Position, State};
use crate::map::Map;

/// Extra cells that are treated as walls on top of the map.
pub trait Blocked {
    fn is_blocked(&self, position: Position) -> bool;
}

/// No cells blocked beyond the map's own walls.
pub struct Unblocked;

impl Blocked for Unblocked {
    fn is_blocked(&self, _position: Position) -> bool {
        false
    }
}

impl<F: Fn(Position) -> bool> Blocked for F {
    fn is_blocked(&self, position: Position) -> bool {
        self(position)
    }
}

/// Movement rules turning the grid into a weighted graph of `State`s.
/// Edges are produced on demand for the state being expanded.
pub trait MoveRule {
    fn start_state(&self, position: Position) -> State;

    fn successors(
        &self,
        map: &Map,
        blocked: &dyn Blocked,
        state: &State,
        out: &mut Vec<(State, usize)>,
    );

    fn is_open(&self, map: &Map, blocked: &dyn Blocked, position: Position) -> bool {
        map.is_passable(position) && !blocked.is_blocked(position)
    }
}

/// Plain orthogonal moves, each costing 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformCost;

impl MoveRule for UniformCost {
    fn start_state(&self, position: Position) -> State {
        State::at(position)
    }

    fn successors(
        &self,
        map: &Map,
        blocked: &dyn Blocked,
        state: &State,
        out: &mut Vec<(State, usize)>,
    ) {
        for direction in Direction::ALL {
            if let Some(next) = map.step(state.position, direction) {
                if self.is_open(map, blocked, next) {
                    out.push((State::at(next), 1));
                }
            }
        }
    }
}

/// Moves forward for 1, or rotates a quarter turn in place for `turn_penalty`.
#[derive(Debug, Clone, Copy)]
pub struct TurningCost {
    pub turn_penalty: usize,
    pub initial_facing: Direction,
}

impl Default for TurningCost {
    fn default() -> Self {
        TurningCost {
            turn_penalty: 1000,
            initial_facing: Direction::East,
        }
    }
}

impl MoveRule for TurningCost {
    fn start_state(&self, position: Position) -> State {
        State::facing(position, self.initial_facing)
    }

    fn successors(
        &self,
        map: &Map,
        blocked: &dyn Blocked,
        state: &State,
        out: &mut Vec<(State, usize)>,
    ) {
        let facing = state.facing.unwrap_or(self.initial_facing);

        out.push((
            State::facing(state.position, facing.clockwise()),
            self.turn_penalty,
        ));
        out.push((
            State::facing(state.position, facing.counter_clockwise()),
            self.turn_penalty,
        ));

        if let Some(forward) = map.step(state.position, facing) {
            if self.is_open(map, blocked, forward) {
                out.push((State::facing(forward, facing), 1));
            }
        }
    }
}
