//! TOML-backed demo configuration.

use std::path::Path;

use anyhow::{Context, Result};
use colony_core::SimConfig;
use colony_flock::BoidConfig;
use colony_path::PathfindingConfig;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub sim:         SimConfig,
    pub pathfinding: PathfindingConfig,
    pub map:         MapConfig,
    pub patrol:      PatrolConfig,
    pub flock:       FlockConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub width:  u32,
    pub height: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self { width: 64, height: 64 }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrolConfig {
    pub agents:     usize,
    /// Waypoints per patrol route.
    pub waypoints:  usize,
    /// Ticks spent at each waypoint before walking on.
    pub wait_ticks: u32,
}

impl Default for PatrolConfig {
    fn default() -> Self {
        Self { agents: 16, waypoints: 4, wait_ticks: 5 }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockConfig {
    pub boids:  usize,
    /// Boids start uniformly inside a square of this side.
    pub spread: f32,
    pub boid:   BoidConfig,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self { boids: 100, spread: 30.0, boid: BoidConfig::default() }
    }
}

impl DemoConfig {
    /// Read `path`, or fall back to defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        config.sim.validate().context("invalid [sim] section")?;
        anyhow::ensure!(config.map.width > 0 && config.map.height > 0, "map must be at least 1x1");
        Ok(config)
    }
}
