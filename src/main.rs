use grid_paths::common::{Answer, Solution};
use grid_paths::config::{Cli, Config, Puzzle};
use grid_paths::solver;
use grid_paths::stat::Stats;

use anyhow::{ensure, Context};
use clap::Parser;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use tracing::{info, Level};

#[derive(Serialize)]
struct Report<'a> {
    puzzle: Puzzle,
    input_path: Option<&'a str>,
    solution: &'a Solution,
    stats: &'a Stats,
}

fn check_answer(part: &str, answer: Option<&Answer>, expected: Option<&str>) -> anyhow::Result<()> {
    let Some(expected) = expected else {
        return Ok(());
    };
    let answer = answer.map(Answer::to_string);
    ensure!(
        answer.as_deref() == Some(expected),
        "{part} answer {answer:?} does not match expected {expected:?}"
    );
    info!("{part} matches expected answer {expected}");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config = if let Some(config_file) = cli.config.as_ref() {
        let config_str = std::fs::read_to_string(config_file)
            .with_context(|| format!("failed to read config file: {config_file}"))?;
        Config::from_yaml_str(&config_str)
            .with_context(|| format!("error with config file: {config_file}"))?
    } else {
        info!("No config file specified, using default config");
        Config::default()
    }
    .override_from_command_line(&cli)?;

    let mut solver = solver::from_config(&config)?;
    let solution = solver.solve(&config);
    solver.stats().print();

    match &solution.part_one {
        Some(part_one) => println!("part one: {part_one}"),
        None => println!("part one: unreachable"),
    }
    if let Some(part_two) = &solution.part_two {
        println!("part two: {part_two}");
    }

    check_answer(
        "part one",
        solution.part_one.as_ref(),
        config.expect_part_one.as_deref(),
    )?;
    check_answer(
        "part two",
        solution.part_two.as_ref(),
        config.expect_part_two.as_deref(),
    )?;

    if let Some(output_path) = &config.output_path {
        let file = File::create(output_path)
            .with_context(|| format!("failed to create report {output_path}"))?;
        let report = Report {
            puzzle: config.puzzle,
            input_path: config.input_path.as_deref(),
            solution: &solution,
            stats: solver.stats(),
        };
        serde_json::to_writer_pretty(BufWriter::new(file), &report)?;
        info!("Report written to {output_path}");
    }

    Ok(())
}
