//! The gyroscope simulation: fixed-step time keeping, live parameter edits
//! and resynchronization after an edit.

use bevy::ecs::component::Component;
use bevy::log::{debug, info, warn};
use na::{Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::animation::Animation;
use crate::attitude::{Integrator, RigidBodyState};
use crate::error::ParamError;
use crate::params::{Geometry, SimulationParameters, SpinSense};
use crate::phase::{PhaseTracker, deprecession};
use crate::trail::TrailBuffer;

/// Longest trail that can be requested, seconds.
pub const MAX_TRAIL_LENGTH: f64 = 10.0;

/// Numerical settings. None of these are physical; the stall guard values
/// in particular are empirical.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Integration step, seconds.
    pub step: f64,
    /// Catch-up gives up after this many consecutive steps without phase
    /// progress.
    pub stall_limit: u32,
    /// Catch-up gives up when the phase drops by more than this in one step.
    pub regress_tolerance: f64,
    /// Seconds between two trail samples.
    pub trail_interval: f64,
    /// Trail samples kept.
    pub trail_capacity: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            step: 1.0e-4,
            stall_limit: 1000,
            regress_tolerance: 1.0e-3,
            trail_interval: 0.02,
            trail_capacity: 500,
        }
    }
}

/// One live edit, as issued by a control surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "param", content = "value", rename_all = "snake_case")]
pub enum ParameterEdit {
    Slope(f64),
    SpinRate(f64),
    SpinSense(SpinSense),
    Precession(Option<f64>),
    Radius(f64),
    LeverLength(f64),
    /// Visible trail, seconds. Does not touch the physics.
    TrailLength(f64),
}

/// Result of a resynchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResyncOutcome {
    /// Catch-up steps taken.
    pub steps: u64,
    /// False when the stall guard gave up before the old phase was reached.
    pub completed: bool,
}

#[derive(Debug, Clone, Component)]
pub struct Gyroscope {
    params: SimulationParameters,
    geometry: Geometry,
    config: SimConfig,
    state: RigidBodyState,
    tracker: PhaseTracker,
    trail: TrailBuffer,
    /// Wall-clock time not yet consumed by whole steps.
    time_buffer: f64,
    /// Simulated seconds since the last restart.
    elapsed: f64,
    /// Steps since the last restart, catch-up excluded.
    steps: u64,
    paused: bool,
    /// Set when a step went non-finite; only a restart clears it.
    frozen: bool,
    resync_pending: bool,
}

impl Gyroscope {
    pub fn new(
        params: SimulationParameters,
        geometry: Geometry,
        config: SimConfig,
    ) -> Result<Self, ParamError> {
        params.validate()?;
        geometry.validate()?;
        ParamError::check("step", config.step, f64::MIN_POSITIVE, f64::MAX)?;
        ParamError::check(
            "trail_interval",
            config.trail_interval,
            f64::MIN_POSITIVE,
            f64::MAX,
        )?;

        let state = params.initial_state(&geometry);
        let mut gyro = Self {
            params,
            geometry,
            config,
            state,
            tracker: PhaseTracker::new(),
            trail: TrailBuffer::new(config.trail_capacity, config.trail_interval),
            time_buffer: 0.0,
            elapsed: 0.0,
            steps: 0,
            paused: false,
            frozen: false,
            resync_pending: false,
        };
        gyro.tracker.observe(&gyro.state);
        gyro.trail.reset(gyro.tip());
        Ok(gyro)
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn state(&self) -> &RigidBodyState {
        &self.state
    }

    pub fn orientation(&self) -> &UnitQuaternion<f64> {
        &self.state.q_s
    }

    pub fn angular_momentum(&self) -> &Vector3<f64> {
        &self.state.l_w
    }

    /// Angular momentum scaled for drawing as an arrow.
    pub fn momentum_display(&self) -> Vector3<f64> {
        self.state.l_w * self.geometry.momentum_display_scale()
    }

    pub fn phase(&self) -> f64 {
        self.tracker.phase()
    }

    /// Disc center, relative to the pivot.
    pub fn tip(&self) -> Point3<f64> {
        Point3::from(self.state.axis() * self.geometry.lever_length)
    }

    pub fn trail(&self) -> &TrailBuffer {
        &self.trail
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// True after a non-finite step, until the next restart.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn resync_pending(&self) -> bool {
        self.resync_pending
    }

    /// Steady precession rate implied by the current initial spin, degrees
    /// per second.
    pub fn regular_precession(&self) -> f64 {
        self.params.regular_precession(&self.geometry)
    }

    fn integrator(&self) -> Integrator {
        Integrator::new(&self.params, self.geometry, self.config.step)
    }

    /// Replace the parameters. A resync is queued if anything changed.
    pub fn set_params(&mut self, params: SimulationParameters) -> Result<(), ParamError> {
        params.validate()?;
        if params != self.params {
            self.params = params;
            self.resync_pending = true;
        }
        Ok(())
    }

    /// Copy in the body geometry. A resync is queued if it changed.
    pub fn set_geometry(&mut self, geometry: Geometry) -> Result<(), ParamError> {
        geometry.validate()?;
        if geometry != self.geometry {
            self.geometry = geometry;
            self.resync_pending = true;
        }
        Ok(())
    }

    fn edit_params(
        &mut self,
        edit: impl FnOnce(&mut SimulationParameters),
    ) -> Result<(), ParamError> {
        let mut params = self.params;
        edit(&mut params);
        self.set_params(params)
    }

    pub fn set_slope(&mut self, slope: f64) -> Result<(), ParamError> {
        self.edit_params(|p| p.slope = slope)
    }

    pub fn set_spin_rate(&mut self, spin_rate: f64) -> Result<(), ParamError> {
        self.edit_params(|p| p.spin_rate = spin_rate)
    }

    pub fn set_spin_sense(&mut self, spin_sense: SpinSense) -> Result<(), ParamError> {
        self.edit_params(|p| p.spin_sense = spin_sense)
    }

    pub fn set_precession(&mut self, precession: Option<f64>) -> Result<(), ParamError> {
        self.edit_params(|p| p.precession = precession)
    }

    pub fn set_radius(&mut self, radius: f64) -> Result<(), ParamError> {
        self.set_geometry(Geometry {
            radius,
            ..self.geometry
        })
    }

    pub fn set_lever_length(&mut self, lever_length: f64) -> Result<(), ParamError> {
        self.set_geometry(Geometry {
            lever_length,
            ..self.geometry
        })
    }

    /// Visible trail length in seconds.
    pub fn set_trail_length(&mut self, seconds: f64) -> Result<(), ParamError> {
        let seconds = ParamError::check("trail_length", seconds, 0.0, MAX_TRAIL_LENGTH)?;
        self.trail.set_draw_duration(seconds);
        Ok(())
    }

    pub fn apply(&mut self, edit: ParameterEdit) -> Result<(), ParamError> {
        match edit {
            ParameterEdit::Slope(v) => self.set_slope(v),
            ParameterEdit::SpinRate(v) => self.set_spin_rate(v),
            ParameterEdit::SpinSense(v) => self.set_spin_sense(v),
            ParameterEdit::Precession(v) => self.set_precession(v),
            ParameterEdit::Radius(v) => self.set_radius(v),
            ParameterEdit::LeverLength(v) => self.set_lever_length(v),
            ParameterEdit::TrailLength(v) => self.set_trail_length(v),
        }
    }

    fn reinitialize(&mut self) {
        self.state = self.params.initial_state(&self.geometry);
        self.tracker.reset();
        self.tracker.observe(&self.state);
    }

    /// One integration step. A step that produces a non-finite state is
    /// rolled back and the simulation frozen until restarted.
    fn step_with(&mut self, integrator: &Integrator) -> bool {
        let previous = self.state;
        integrator.step(&mut self.state);
        if !self.state.is_finite() {
            warn!(
                "Non-finite state after {} steps ({:.4} s), freezing",
                self.steps, self.elapsed
            );
            self.state = previous;
            self.frozen = true;
            self.paused = true;
            self.time_buffer = 0.0;
            return false;
        }

        self.tracker.observe(&self.state);
        self.trail.record(integrator.dt, self.tip());
        self.elapsed += integrator.dt;
        self.steps += 1;
        true
    }

    /// Re-derive the state from the current parameters while keeping the
    /// visible configuration continuous.
    ///
    /// The fresh state is run forward until its nutation phase catches up
    /// with the old one, then turned about the vertical so its precession
    /// heading matches the old heading.
    pub fn resync(&mut self) -> ResyncOutcome {
        self.resync_pending = false;
        let frame = deprecession(&self.state.l_w);
        let target = self.tracker.phase();

        self.reinitialize();
        let integrator = self.integrator();
        let mut previous = self.tracker.phase();
        let mut stalled = 0;
        let mut steps = 0;

        let completed = loop {
            if previous >= target {
                break true;
            }
            integrator.step(&mut self.state);
            steps += 1;
            if !self.state.is_finite() {
                // Fall back to the plain initial state.
                self.reinitialize();
                break false;
            }

            let phase = self.tracker.observe(&self.state);
            let delta = phase - previous;
            if delta < -self.config.regress_tolerance {
                break false;
            }
            if delta <= 0.0 {
                stalled += 1;
                if stalled > self.config.stall_limit {
                    break false;
                }
            } else {
                stalled = 0;
            }
            previous = phase;
        };

        let correction = frame.inverse() * deprecession(&self.state.l_w);
        self.state.rotate(&correction);

        if completed {
            debug!(
                "Resynced to phase {:.4} after {} catch-up steps",
                target, steps
            );
        } else {
            warn!(
                "Catch-up abandoned after {} steps at phase {:.4} of {:.4}",
                steps,
                self.tracker.phase(),
                target
            );
        }
        ResyncOutcome { steps, completed }
    }
}

impl Animation for Gyroscope {
    fn advance(&mut self, dt: f64) -> usize {
        if self.resync_pending {
            self.resync();
        }
        if self.paused || !dt.is_finite() || dt <= 0.0 {
            return 0;
        }

        self.time_buffer += dt;
        let integrator = self.integrator();
        let mut taken = 0;
        while self.time_buffer >= integrator.dt {
            self.time_buffer -= integrator.dt;
            if !self.step_with(&integrator) {
                break;
            }
            taken += 1;
        }
        taken
    }

    fn restart(&mut self) {
        info!("Restarting gyroscope at slope {:.1}°", self.params.slope);
        self.reinitialize();
        self.trail.reset(self.tip());
        self.time_buffer = 0.0;
        self.elapsed = 0.0;
        self.steps = 0;
        self.resync_pending = false;
        if self.frozen {
            self.frozen = false;
            self.paused = false;
        }
    }

    fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    fn is_paused(&self) -> bool {
        self.paused
    }
}
