//! Physics simulation library for a spinning disc on a pivot.
//!
//! The core integrates the orientation and angular momentum of the disc
//! under gravity, tracks the phase of its nutation, and resynchronizes the
//! motion when parameters are edited while it runs.

extern crate nalgebra as na;

pub mod animation;
pub mod attitude;
pub mod error;
pub mod gyroscope;
pub mod params;
pub mod phase;
pub mod plugin;
pub mod trail;

pub use animation::Animation;
pub use attitude::{Integrator, RigidBodyState};
pub use error::ParamError;
pub use gyroscope::{Gyroscope, ParameterEdit, ResyncOutcome, SimConfig};
pub use params::{Geometry, SimulationParameters, SpinSense};
pub use phase::{CircleFit, PhaseTracker, fit_circle};
pub use plugin::{DiscBody, GyroPlugin};
pub use trail::TrailBuffer;
