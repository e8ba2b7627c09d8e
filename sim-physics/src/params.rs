//! Simulation parameters and the analytic initial conditions derived from them.
//!
//! The world frame is Y-up, right handed. Gravity pulls along -Y and the disc
//! axis is the body +Z axis.

use std::f64::consts::{PI, TAU};

use na::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::attitude::RigidBodyState;
use crate::error::ParamError;

/// Accepted slope interval, degrees from the upward vertical.
pub const SLOPE_RANGE: (f64, f64) = (0.0, 180.0);
/// Accepted initial spin rate interval, revolutions per second.
pub const SPIN_RATE_RANGE: (f64, f64) = (0.5, 10.0);
/// Accepted precession override interval, degrees per second.
pub const PRECESSION_RANGE: (f64, f64) = (-180.0, 180.0);
/// Accepted disc radius interval.
pub const RADIUS_RANGE: (f64, f64) = (0.5, 5.0);
/// Accepted lever length interval.
pub const LEVER_RANGE: (f64, f64) = (1.0, 10.0);

/// Direction the disc spins about its own axis, seen from the tip looking
/// back at the pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinSense {
    Clockwise,
    #[default]
    CounterClockwise,
}

impl SpinSense {
    /// +1 for counter-clockwise, -1 for clockwise.
    pub fn sign(self) -> f64 {
        match self {
            SpinSense::Clockwise => -1.0,
            SpinSense::CounterClockwise => 1.0,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            SpinSense::Clockwise => SpinSense::CounterClockwise,
            SpinSense::CounterClockwise => SpinSense::Clockwise,
        }
    }
}

/// Shape of the disc body. This belongs to the scene object; the simulator
/// only keeps a copy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geometry {
    /// Disc radius.
    pub radius: f64,
    /// Distance from the pivot to the disc center along the axle.
    pub lever_length: f64,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            radius: 2.5,
            lever_length: 5.0,
        }
    }
}

impl Geometry {
    pub fn new(radius: f64, lever_length: f64) -> Self {
        Self {
            radius,
            lever_length,
        }
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        ParamError::check("radius", self.radius, RADIUS_RANGE.0, RADIUS_RANGE.1)?;
        ParamError::check(
            "lever_length",
            self.lever_length,
            LEVER_RANGE.0,
            LEVER_RANGE.1,
        )?;
        Ok(())
    }

    /// Spin inertia of the disc, `I0 = m r²`.
    pub fn spin_inertia(&self, mass: f64) -> f64 {
        mass * self.radius * self.radius
    }

    /// Inertia about an axis tilted by `tilt` radians from the disc axis.
    ///
    /// Blends the spin inertia with the transverse one and adds the
    /// parallel-axis term of the lever arm.
    pub fn effective_inertia(&self, mass: f64, tilt: f64) -> f64 {
        let i0 = self.spin_inertia(mass);
        let cos = tilt.cos();
        let arm = self.lever_length * tilt.sin();
        i0 * (1.0 + cos * cos) / 2.0 + mass * arm * arm
    }

    /// Scale applied to the angular momentum before it is drawn.
    pub fn momentum_display_scale(&self) -> f64 {
        1.0 / (self.radius * self.radius * PI)
    }
}

/// Everything needed to derive the initial state, except the geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// Disc mass.
    pub mass: f64,
    /// Gravitational acceleration.
    pub gravity: f64,
    /// Initial spin rate, revolutions per second.
    pub spin_rate: f64,
    pub spin_sense: SpinSense,
    /// Initial axis slope, degrees from the upward vertical.
    pub slope: f64,
    /// Optional initial precession rate about the vertical, degrees per
    /// second. `None` releases the disc without precession.
    pub precession: Option<f64>,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            mass: 1.0,
            gravity: 9.81,
            spin_rate: 1.0,
            spin_sense: SpinSense::CounterClockwise,
            slope: 90.0,
            precession: None,
        }
    }
}

impl SimulationParameters {
    pub fn validate(&self) -> Result<(), ParamError> {
        ParamError::check("mass", self.mass, f64::MIN_POSITIVE, f64::MAX)?;
        ParamError::check("gravity", self.gravity, 0.0, f64::MAX)?;
        ParamError::check(
            "spin_rate",
            self.spin_rate,
            SPIN_RATE_RANGE.0,
            SPIN_RATE_RANGE.1,
        )?;
        ParamError::check("slope", self.slope, SLOPE_RANGE.0, SLOPE_RANGE.1)?;
        if let Some(rate) = self.precession {
            ParamError::check("precession", rate, PRECESSION_RANGE.0, PRECESSION_RANGE.1)?;
        }
        Ok(())
    }

    /// Signed spin rate in radians per second. This is the only place the
    /// spin sense enters the physics.
    pub fn spin_velocity(&self) -> f64 {
        TAU * self.spin_rate * self.spin_sense.sign()
    }

    /// Initial orientation: the body Z axis tilted `slope` degrees away from
    /// world +Y, inside the Y-Z plane.
    pub fn initial_orientation(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_axis_angle(&Vector3::x_axis(), (self.slope - 90.0).to_radians())
    }

    /// Closed-form initial state for these parameters.
    ///
    /// The angular velocity is the spin about the axis plus the requested
    /// precession about the vertical; the momentum is that velocity times
    /// the effective inertia at the resulting tilt.
    pub fn initial_state(&self, geometry: &Geometry) -> RigidBodyState {
        let q_s = self.initial_orientation();
        let axis = q_s * Vector3::z();
        let precession = self.precession.unwrap_or(0.0).to_radians();
        let omega = axis * self.spin_velocity() + Vector3::y() * precession;
        let inertia = geometry.effective_inertia(self.mass, axis.angle(&omega));
        RigidBodyState::new(q_s, omega * inertia)
    }

    /// Steady ("regular") precession rate implied by the initial spin, in
    /// degrees per second.
    ///
    /// Uses the gyroscopic balance `Ω I0 ω = m g s`, which holds for any
    /// slope as long as the spin dominates.
    pub fn regular_precession(&self, geometry: &Geometry) -> f64 {
        let torque = self.mass * self.gravity * geometry.lever_length;
        let spin_momentum = geometry.spin_inertia(self.mass) * self.spin_velocity();
        (torque / spin_momentum).to_degrees()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn slope_places_axis() {
        let mut params = SimulationParameters::default();
        let geometry = Geometry::default();

        params.slope = 90.0;
        let axis = params.initial_state(&geometry).axis();
        assert_relative_eq!(axis, Vector3::z(), epsilon = 1e-12);

        params.slope = 0.0;
        let axis = params.initial_state(&geometry).axis();
        assert_relative_eq!(axis, Vector3::y(), epsilon = 1e-12);

        params.slope = 180.0;
        let axis = params.initial_state(&geometry).axis();
        assert_relative_eq!(axis, -Vector3::y(), epsilon = 1e-12);
    }

    #[test]
    fn momentum_follows_spin_sense() {
        let geometry = Geometry::new(1.0, 1.0);
        let mut params = SimulationParameters::default();

        let ccw = params.initial_state(&geometry);
        params.spin_sense = SpinSense::Clockwise;
        let cw = params.initial_state(&geometry);

        assert_relative_eq!(ccw.l_w, Vector3::z() * TAU, epsilon = 1e-12);
        assert_relative_eq!(cw.l_w, -ccw.l_w, epsilon = 1e-12);
        assert_relative_eq!(cw.q_s, ccw.q_s, epsilon = 1e-12);
    }

    #[test]
    fn precession_override_tilts_momentum() {
        let geometry = Geometry::new(1.0, 1.0);
        let params = SimulationParameters {
            precession: Some(90.0),
            ..Default::default()
        };
        let state = params.initial_state(&geometry);

        let omega = Vector3::new(0.0, std::f64::consts::FRAC_PI_2, TAU);
        let inertia = geometry.effective_inertia(params.mass, Vector3::z().angle(&omega));
        assert_relative_eq!(state.l_w, omega * inertia, epsilon = 1e-12);
        assert!(inertia > geometry.spin_inertia(params.mass));
    }

    #[test]
    fn effective_inertia_limits() {
        let geometry = Geometry::new(2.0, 3.0);
        assert_relative_eq!(geometry.effective_inertia(1.0, 0.0), 4.0);
        assert_relative_eq!(geometry.effective_inertia(1.0, PI), 4.0, epsilon = 1e-12);
        // Perpendicular: half the spin inertia plus the full lever term.
        assert_relative_eq!(geometry.effective_inertia(1.0, PI / 2.0), 2.0 + 9.0, epsilon = 1e-12);
    }

    #[test]
    fn regular_precession_estimate() {
        let geometry = Geometry::new(1.0, 1.0);
        let mut params = SimulationParameters {
            gravity: 10.0,
            ..Default::default()
        };
        let rate = params.regular_precession(&geometry);
        assert_relative_eq!(rate, (10.0 / TAU).to_degrees(), epsilon = 1e-9);

        params.spin_sense = SpinSense::Clockwise;
        assert_relative_eq!(params.regular_precession(&geometry), -rate, epsilon = 1e-9);
    }

    #[test]
    fn validation_rejects_out_of_range() {
        let params = SimulationParameters {
            slope: 200.0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ParamError::OutOfRange { name: "slope", .. })
        ));

        let params = SimulationParameters {
            precession: Some(f64::NAN),
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ParamError::NonFinite { name: "precession", .. })
        ));

        assert!(Geometry::new(0.1, 5.0).validate().is_err());
        assert!(Geometry::default().validate().is_ok());
        assert!(SimulationParameters::default().validate().is_ok());
    }
}
