//! Run configuration for the headless driver.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use sim_physics::{Geometry, ParameterEdit, SimConfig, SimulationParameters};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub params: SimulationParameters,
    pub geometry: Geometry,
    pub sim: SimConfig,
    /// Host frame length, seconds.
    pub frame: f64,
    /// Host seconds to run.
    pub duration: f64,
    /// Host seconds between status lines.
    pub print_interval: f64,
    /// Host seconds between trajectory samples.
    pub record_interval: f64,
    /// Visible trail, seconds.
    pub trail_length: f64,
    /// Where to write the trajectory, if anywhere.
    pub output: Option<PathBuf>,
    pub events: Vec<ScheduledEvent>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            params: SimulationParameters::default(),
            geometry: Geometry::default(),
            sim: SimConfig::default(),
            frame: 1.0 / 60.0,
            duration: 10.0,
            print_interval: 0.5,
            record_interval: 0.05,
            trail_length: 0.0,
            output: None,
            events: Vec::new(),
        }
    }
}

/// Something to do once the host clock reaches `at`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub at: f64,
    pub action: Action,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Set(ParameterEdit),
    Restart,
    TogglePause,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading run configuration {}", path.display()))?;
        let config: RunConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing run configuration {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.frame.is_finite() && self.frame > 0.0,
            "frame must be positive, got {}",
            self.frame
        );
        ensure!(
            self.duration.is_finite() && self.duration >= 0.0,
            "duration must not be negative, got {}",
            self.duration
        );
        ensure!(
            self.print_interval > 0.0 && self.record_interval > 0.0,
            "print and record intervals must be positive"
        );
        Ok(())
    }

    /// Events ordered by time.
    pub fn schedule(&self) -> Vec<ScheduledEvent> {
        let mut events = self.events.clone();
        events.sort_by(|a, b| a.at.total_cmp(&b.at));
        events
    }
}
