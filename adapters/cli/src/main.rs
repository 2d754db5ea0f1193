#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that sends an agent across an ASCII level.

mod level;

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use platform_nav_core::{jump_frames, AgentConfig, TileCoord};
use platform_nav_system_motion::Bot;
use platform_nav_world::query;
use tracing_subscriber::EnvFilter;

/// Plans and replays a jump-aware route across a tile level.
#[derive(Debug, Parser)]
#[command(name = "platform-nav", version)]
struct Cli {
    /// ASCII level: `#` block, `-` one-way platform, `.` empty, `S` start, `G` goal.
    level: PathBuf,
    /// TOML file overriding the default agent settings.
    #[arg(long)]
    agent: Option<PathBuf>,
    /// Simulated frames per second.
    #[arg(long, default_value_t = 60)]
    fps: u32,
    /// Frames to simulate before giving up on the route.
    #[arg(long, default_value_t = 10_000)]
    max_ticks: u32,
}

/// Entry point for the platform navigation command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if cli.fps == 0 {
        bail!("--fps must be greater than zero");
    }

    let source = fs::read_to_string(&cli.level)
        .with_context(|| format!("failed to read level {}", cli.level.display()))?;
    let level = level::parse(&source)
        .with_context(|| format!("failed to parse level {}", cli.level.display()))?;
    let config = match &cli.agent {
        Some(path) => load_agent(path)?,
        None => AgentConfig::default(),
    };

    let map = query::map(&level.world);
    tracing::info!(
        size = map.size(),
        edits = level.edits,
        start = ?level.start,
        goal = ?level.goal,
        "level loaded"
    );

    let mut bot = Bot::new(config, map.tile_to_world(level.start));
    if !bot.tap_tile(map, level.goal) {
        println!(
            "no route from ({}, {}) to ({}, {})",
            level.start.x(),
            level.start.y(),
            level.goal.x(),
            level.goal.y()
        );
        return Ok(());
    }

    println!("route: {}", describe_path(bot.path()));
    for (from, to) in jump_segments(bot.path()) {
        let rise = to.y() - from.y();
        println!(
            "jump ({}, {}) -> ({}, {}): rise {rise}, {} frames",
            from.x(),
            from.y(),
            to.x(),
            to.y(),
            jump_frames(rise)
        );
    }

    let dt = Duration::from_secs_f64(1.0 / f64::from(cli.fps));
    let mut ticks = 0;
    while ticks < cli.max_ticks {
        ticks += 1;
        if !bot.update(map, dt) {
            break;
        }
    }

    let position = bot.position();
    if bot.current_node().is_some() {
        bail!(
            "agent still travelling after {ticks} ticks at ({:.2}, {:.2})",
            position.x,
            position.y
        );
    }
    println!(
        "arrived at ({:.2}, {:.2}) after {ticks} ticks",
        position.x, position.y
    );
    Ok(())
}

fn load_agent(path: &Path) -> Result<AgentConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read agent config {}", path.display()))?;
    let config: AgentConfig = toml::from_str(&contents)
        .with_context(|| format!("failed to parse agent config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid agent config {}", path.display()))?;
    Ok(config)
}

fn describe_path(path: &[TileCoord]) -> String {
    path.iter()
        .map(|tile| format!("({}, {})", tile.x(), tile.y()))
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn jump_segments(path: &[TileCoord]) -> impl Iterator<Item = (TileCoord, TileCoord)> + '_ {
    path.windows(2)
        .map(|pair| (pair[0], pair[1]))
        .filter(|(from, to)| to.y() > from.y())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_paths_in_travel_order() {
        let path = [TileCoord::new(5, 2), TileCoord::new(6, 2)];
        assert_eq!(describe_path(&path), "(5, 2) -> (6, 2)");
        assert_eq!(describe_path(&[]), "");
    }

    #[test]
    fn jump_segments_only_include_rises() {
        let path = [
            TileCoord::new(9, 2),
            TileCoord::new(9, 5),
            TileCoord::new(10, 5),
            TileCoord::new(11, 2),
        ];
        let jumps: Vec<_> = jump_segments(&path).collect();
        assert_eq!(jumps, vec![(TileCoord::new(9, 2), TileCoord::new(9, 5))]);
    }
}
