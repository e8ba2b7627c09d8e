//! Attitude state of the spinning disc and the fixed-step integrator that
//! advances it under gravity.

use na::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::params::{Geometry, SimulationParameters};

/// Below this |L|² the momentum increment is added without splitting it.
const MIN_MOMENTUM_SQUARED: f64 = 1e-18;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidBodyState {
    /// Orientation: body -> world. Body +Z is the disc axis.
    pub q_s: UnitQuaternion<f64>,
    /// Angular momentum in WORLD frame.
    pub l_w: Vector3<f64>,
}

impl RigidBodyState {
    pub fn new(q_s: UnitQuaternion<f64>, l_w: Vector3<f64>) -> Self {
        Self { q_s, l_w }
    }

    /// Unit disc axis in world frame.
    pub fn axis(&self) -> Vector3<f64> {
        self.q_s * Vector3::z()
    }

    /// Apply a world-frame rotation to both the pose and the momentum.
    pub fn rotate(&mut self, r: &UnitQuaternion<f64>) {
        self.q_s = UnitQuaternion::new_normalize((r * self.q_s).into_inner());
        self.l_w = r * self.l_w;
    }

    pub fn is_finite(&self) -> bool {
        self.q_s.coords.iter().all(|c| c.is_finite()) && self.l_w.iter().all(|c| c.is_finite())
    }
}

/// Explicit fixed-step integrator for a disc hanging from a pivot.
///
/// The momentum is kicked by the gravity torque about the pivot, then the
/// body turns about the momentum direction at `|L| / I`, with `I` the
/// effective inertia at the current tilt between axis and momentum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Integrator {
    pub mass: f64,
    pub gravity: f64,
    pub geometry: Geometry,
    /// Step size, seconds.
    pub dt: f64,
}

impl Integrator {
    pub fn new(params: &SimulationParameters, geometry: Geometry, dt: f64) -> Self {
        Self {
            mass: params.mass,
            gravity: params.gravity,
            geometry,
            dt,
        }
    }

    /// Gravity torque about the pivot for the given axis.
    pub fn torque(&self, axis: &Vector3<f64>) -> Vector3<f64> {
        let force = Vector3::new(0.0, -self.mass * self.gravity, 0.0);
        (axis * self.geometry.lever_length).cross(&force)
    }

    pub fn step(&self, state: &mut RigidBodyState) {
        // The torque has to see the axis from before this step.
        let axis = state.axis();
        let dl = self.torque(&axis) * self.dt;

        // --- KICK: split the increment along and across L ---
        let l_sq = state.l_w.norm_squared();
        if l_sq > MIN_MOMENTUM_SQUARED {
            let along = state.l_w * (dl.dot(&state.l_w) / l_sq);
            let turn = state.l_w.cross(&dl) / l_sq;
            state.l_w += along;
            state.l_w = UnitQuaternion::from_scaled_axis(turn) * state.l_w;
        } else {
            state.l_w += dl;
        }

        // --- DRIFT: turn the body about L ---
        let tilt = axis.angle(&state.l_w);
        let inertia = self.geometry.effective_inertia(self.mass, tilt);
        if inertia > 0.0 {
            let dq = UnitQuaternion::from_scaled_axis(state.l_w * (self.dt / inertia));
            state.q_s = UnitQuaternion::new_normalize((dq * state.q_s).into_inner());
        }
    }
}
