use anyhow::{Context, Result};
use rand::prelude::*;
use std::fs;
use tracing::info;

use crate::common::Position;

/// Lines of an input file, without the trailing blank lines.
pub fn read_grid_lines(path: &str) -> Result<Vec<String>> {
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    Ok(text.trim_end().lines().map(str::to_owned).collect())
}

/// Parses `x,y` lines into positions. Blank lines are skipped.
pub fn parse_obstacles<I, L>(lines: I) -> Result<Vec<Position>>
where
    I: IntoIterator<Item = L>,
    L: AsRef<str>,
{
    lines
        .into_iter()
        .enumerate()
        .filter(|(_, line)| !line.as_ref().trim().is_empty())
        .map(|(number, line)| {
            let line = line.as_ref().trim();
            let (x, y) = line
                .split_once(',')
                .with_context(|| format!("line {}: expected `x,y`, got {line:?}", number + 1))?;
            let x = x
                .trim()
                .parse::<usize>()
                .with_context(|| format!("line {}: bad x coordinate {x:?}", number + 1))?;
            let y = y
                .trim()
                .parse::<usize>()
                .with_context(|| format!("line {}: bad y coordinate {y:?}", number + 1))?;
            Ok::<_, anyhow::Error>(Position { x, y })
        })
        .collect()
}

pub fn read_obstacles(path: &str) -> Result<Vec<Position>> {
    parse_obstacles(read_grid_lines(path)?).with_context(|| format!("failed to parse {path}"))
}

pub struct Scenario;

impl Scenario {
    /// A random drop order over a `size` x `size` field. Start `(0,0)` and
    /// goal `(size-1,size-1)` are never dropped on. At most `count` drops.
    pub fn generate<R: Rng + ?Sized>(size: usize, count: usize, rng: &mut R) -> Vec<Position> {
        let start = Position { x: 0, y: 0 };
        let goal = Position {
            x: size.saturating_sub(1),
            y: size.saturating_sub(1),
        };

        let mut cells: Vec<Position> = (0..size)
            .flat_map(|y| (0..size).map(move |x| Position { x, y }))
            .filter(|&position| position != start && position != goal)
            .collect();
        cells.shuffle(rng);
        cells.truncate(count);

        info!("Generate {} obstacles on a {size}x{size} field", cells.len());
        cells
    }
}
