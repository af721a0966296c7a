use anyhow::{bail, ensure, Context};
use std::str::FromStr;

use crate::common::{Direction, Position};
use crate::scenario::read_grid_lines;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    passable: bool,
}

impl Tile {
    pub fn is_passable(&self) -> bool {
        self.passable
    }
}

#[derive(Debug, Clone)]
pub struct Map {
    pub height: usize,
    pub width: usize,
    pub grid: Vec<Vec<Tile>>, // Indexed as grid[y][x]
    pub start: Position,
    pub goal: Position,
}

impl Map {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        Map::from_lines(read_grid_lines(path)?)
            .with_context(|| format!("failed to parse map {path}"))
    }

    /// Builds a map from grid rows. `#` is a wall, `S` or `^` the start,
    /// `E` the goal; anything else is open floor.
    pub fn from_lines<I, L>(lines: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        let mut grid: Vec<Vec<Tile>> = Vec::new();
        let mut start = None;
        let mut goal = None;

        for (y, line) in lines.into_iter().enumerate() {
            let line = line.as_ref().trim_end();
            let mut row = Vec::with_capacity(line.len());
            for (x, ch) in line.chars().enumerate() {
                let position = Position { x, y };
                // A repeated marker overrides the earlier one.
                match ch {
                    'S' | '^' => start = Some(position),
                    'E' => goal = Some(position),
                    _ => {}
                }
                row.push(Tile {
                    passable: ch != '#',
                });
            }

            if let Some(first) = grid.first() {
                ensure!(
                    row.len() == first.len(),
                    "row {y} has length {}, expected {}",
                    row.len(),
                    first.len()
                );
            }
            grid.push(row);
        }

        if grid.is_empty() || grid[0].is_empty() {
            bail!("map is empty");
        }
        let start = start.context("no start marker in map")?;
        let goal = goal.context("no end marker in map")?;

        Ok(Map {
            height: grid.len(),
            width: grid[0].len(),
            grid,
            start,
            goal,
        })
    }

    /// A wall-free `width` x `height` field.
    pub fn open_field(
        width: usize,
        height: usize,
        start: Position,
        goal: Position,
    ) -> anyhow::Result<Self> {
        ensure!(width > 0 && height > 0, "field must not be empty");
        let map = Map {
            height,
            width,
            grid: vec![vec![Tile { passable: true }; width]; height],
            start,
            goal,
        };
        ensure!(map.in_bounds(start), "start {start} is outside the field");
        ensure!(map.in_bounds(goal), "goal {goal} is outside the field");
        Ok(map)
    }

    pub fn in_bounds(&self, position: Position) -> bool {
        position.x < self.width && position.y < self.height
    }

    pub fn is_passable(&self, position: Position) -> bool {
        self.in_bounds(position) && self.grid[position.y][position.x].is_passable()
    }

    /// The adjacent cell in `direction`, if it lies on the map.
    pub fn step(&self, position: Position, direction: Direction) -> Option<Position> {
        let (dx, dy) = direction.offset();
        let next = Position {
            x: position.x.checked_add_signed(dx)?,
            y: position.y.checked_add_signed(dy)?,
        };
        self.in_bounds(next).then_some(next)
    }
}

impl FromStr for Map {
    type Err = anyhow::Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Map::from_lines(text.trim_end().lines())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_map() {
        let map = Map::from_file("map_file/maze/sample-1.txt").unwrap();

        assert_eq!(map.height, 15);
        assert_eq!(map.width, 15);
        assert_eq!(map.start, Position::new(1, 13));
        assert_eq!(map.goal, Position::new(13, 1));

        assert!(!map.is_passable(Position::new(0, 0)));
        assert!(map.is_passable(Position::new(1, 1)));
        assert!(map.is_passable(map.start));
        assert!(map.is_passable(map.goal));
        assert!(!map.is_passable(Position::new(15, 1)));
        assert!(!map.is_passable(Position::new(0, 13)));
        assert!(map.is_passable(Position::new(2, 13)));
    }

    #[test]
    fn test_read_race_map() {
        let map = Map::from_file("map_file/race/sample.txt").unwrap();
        assert_eq!((map.width, map.height), (15, 15));
        assert!(Map::from_file("map_file/race/missing.txt").is_err());
    }

    #[test]
    fn test_marker_symbols() {
        let map: Map = "#^.\n#1E".parse().unwrap();
        assert_eq!(map.start, Position::new(1, 0));
        assert_eq!(map.goal, Position::new(2, 1));
        assert!(map.is_passable(Position::new(1, 1)));
        assert!(!map.is_passable(Position::new(0, 1)));
    }

    #[test]
    fn test_missing_markers() {
        let err = "#..E".parse::<Map>().unwrap_err();
        assert!(err.to_string().contains("no start"));

        let err = "#S..".parse::<Map>().unwrap_err();
        assert!(err.to_string().contains("no end"));

        assert!("".parse::<Map>().is_err());
    }

    #[test]
    fn test_ragged_rows() {
        let err = "S...\n..\n...E".parse::<Map>().unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_step_stays_in_bounds() {
        let map = Map::open_field(3, 3, Position::new(0, 0), Position::new(2, 2)).unwrap();
        assert_eq!(map.step(Position::new(0, 0), Direction::North), None);
        assert_eq!(map.step(Position::new(0, 0), Direction::West), None);
        assert_eq!(
            map.step(Position::new(0, 0), Direction::East),
            Some(Position::new(1, 0))
        );
        assert_eq!(map.step(Position::new(2, 2), Direction::South), None);
        assert!(Map::open_field(3, 3, Position::new(0, 0), Position::new(3, 0)).is_err());
    }
}
