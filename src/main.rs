use anyhow::{Context, Result};
use clap::Parser;
use guard_patrol::{config::Config, logging, solve};
use tracing::info;

fn main() -> Result<()> {
    let config = Config::parse();
    logging::init();

    let raw_input = std::fs::read_to_string(&config.input_path).with_context(|| {
        format!(
            "Failed to read input file({}).",
            config.input_path.display()
        )
    })?;
    let solution = solve(&raw_input, &config.search_options()).with_context(|| {
        format!("Failed to solve grid from {}.", config.input_path.display())
    })?;
    info!(
        rows = solution.grid.rows(),
        cols = solution.grid.cols(),
        start = %solution.start,
        "grid solved"
    );

    println!("Part 1: {}", solution.answers.visited);
    println!("Part 2: {}", solution.answers.loop_obstructions);

    if config.show_trail {
        println!(
            "{}",
            solution
                .grid
                .render_trail(&solution.trail, solution.start.position)
        );
    }

    Ok(())
}
