//! Recording of the simulated motion for offline inspection.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sim_physics::{Geometry, Gyroscope, SimulationParameters};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Host time, seconds.
    pub t: f64,
    /// Simulated time since the last restart.
    pub elapsed: f64,
    pub phase: f64,
    pub orientation: na::UnitQuaternion<f64>,
    pub momentum: na::Vector3<f64>,
    pub tip: na::Point3<f64>,
}

#[derive(Debug, Clone, Serialize)]
struct Recording<'a> {
    params: &'a SimulationParameters,
    geometry: &'a Geometry,
    samples: &'a [Sample],
}

#[derive(Debug, Clone)]
pub struct Trajectory {
    interval: f64,
    next: f64,
    samples: Vec<Sample>,
}

impl Trajectory {
    pub fn new(interval: f64) -> Self {
        Self {
            interval,
            next: 0.0,
            samples: Vec::new(),
        }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Take a sample if `t` has reached the next recording time.
    pub fn observe(&mut self, t: f64, gyro: &Gyroscope) {
        if t < self.next {
            return;
        }
        self.samples.push(Sample {
            t,
            elapsed: gyro.elapsed(),
            phase: gyro.phase(),
            orientation: *gyro.orientation(),
            momentum: *gyro.angular_momentum(),
            tip: gyro.tip(),
        });
        while self.next <= t {
            self.next += self.interval;
        }
    }

    /// Write the recording as CBOR when the extension is `.cbor`, JSON
    /// otherwise.
    pub fn write(&self, path: &Path, gyro: &Gyroscope) -> Result<()> {
        let recording = Recording {
            params: gyro.params(),
            geometry: gyro.geometry(),
            samples: &self.samples,
        };
        let file =
            File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let writer = BufWriter::new(file);

        match path.extension().and_then(|e| e.to_str()) {
            Some("cbor") => serde_cbor::to_writer(writer, &recording)
                .with_context(|| format!("writing CBOR to {}", path.display()))?,
            _ => serde_json::to_writer_pretty(writer, &recording)
                .with_context(|| format!("writing JSON to {}", path.display()))?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_physics::SimConfig;

    #[test]
    fn samples_on_the_record_interval() {
        let gyro = Gyroscope::new(
            SimulationParameters::default(),
            Geometry::default(),
            SimConfig::default(),
        )
        .unwrap();
        let mut trajectory = Trajectory::new(0.25);
        for i in 0..=16 {
            trajectory.observe(i as f64 * 0.0625, &gyro);
        }
        let times: Vec<f64> = trajectory.samples().iter().map(|s| s.t).collect();
        assert_eq!(times, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }
}
