//! Nutation phase detection.
//!
//! The axis is viewed in a frame that follows the horizontal heading of the
//! angular momentum, which strips out the slow precession. What remains is a
//! closed loop traced once per nutation cycle. The phase is the direction of
//! the latest point seen from the center of the circle through the last
//! three points.

use std::collections::VecDeque;
use std::f64::consts::TAU;

use na::{Point2, UnitQuaternion, Vector3};

use crate::attitude::RigidBodyState;

/// Determinants smaller than this are treated as collinear.
const COLLINEAR_EPS: f64 = 1e-24;

/// Horizontal momentum shorter than this has no usable heading.
const MIN_HEADING: f64 = 1e-12;

const WINDOW: usize = 3;

/// The circle through three points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleFit {
    pub center: Point2<f64>,
    pub radius: f64,
    /// True when the points wind clockwise from first to last.
    pub clockwise: bool,
}

/// Fit the unique circle through `a`, `b` and `c`.
///
/// Returns `None` when the points are (nearly) collinear.
pub fn fit_circle(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> Option<CircleFit> {
    let det = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    if det.abs() < COLLINEAR_EPS {
        return None;
    }

    let pa = a.coords.norm_squared();
    let pb = b.coords.norm_squared();
    let pc = c.coords.norm_squared();
    let center = Point2::new(
        (pa * (b.y - c.y) + pb * (c.y - a.y) + pc * (a.y - b.y)) / det,
        (pa * (c.x - b.x) + pb * (a.x - c.x) + pc * (b.x - a.x)) / det,
    );

    Some(CircleFit {
        center,
        radius: (a - center).norm(),
        clockwise: det < 0.0,
    })
}

/// Rotation about the vertical that turns the horizontal heading of `l_w`
/// onto +Z.
pub fn deprecession(l_w: &Vector3<f64>) -> UnitQuaternion<f64> {
    if l_w.x.hypot(l_w.z) < MIN_HEADING {
        return UnitQuaternion::identity();
    }
    let heading = l_w.x.atan2(l_w.z);
    UnitQuaternion::from_axis_angle(&Vector3::y_axis(), -heading)
}

/// The disc axis in the de-precessed frame, without its vertical component.
pub fn project(state: &RigidBodyState) -> Point2<f64> {
    let axis = deprecession(&state.l_w) * state.axis();
    Point2::new(axis.x, axis.z)
}

#[derive(Debug, Clone, Default)]
pub struct PhaseTracker {
    window: VecDeque<Point2<f64>>,
    /// Raw angle of the first complete window; phase 0 is measured from it.
    origin: Option<f64>,
    phase: f64,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.window.clear();
        self.origin = None;
        self.phase = 0.0;
    }

    /// Current phase in `[0, 1)`.
    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn samples(&self) -> usize {
        self.window.len()
    }

    /// Add the current axis to the window and return the updated phase.
    pub fn observe(&mut self, state: &RigidBodyState) -> f64 {
        self.push(project(state))
    }

    pub fn push(&mut self, point: Point2<f64>) -> f64 {
        if self.window.len() == WINDOW {
            self.window.pop_front();
        }
        self.window.push_back(point);

        if self.window.len() < WINDOW {
            self.phase = 0.0;
            return self.phase;
        }

        // A degenerate triple keeps whatever phase we had.
        let Some(fit) = fit_circle(&self.window[0], &self.window[1], &self.window[2]) else {
            return self.phase;
        };

        let rel = self.window[2] - fit.center;
        let mut angle = rel.y.atan2(rel.x);
        if fit.clockwise {
            angle = -angle;
        }
        let origin = *self.origin.get_or_insert(angle);
        self.phase = ((angle - origin) / TAU).rem_euclid(1.0);
        // rem_euclid can round up to exactly 1.0 for tiny negative inputs.
        if self.phase >= 1.0 {
            self.phase = 0.0;
        }
        self.phase
    }
}
