//! Bevy glue: drive every `Gyroscope` from the frame clock and write its
//! orientation into the entity's `Transform`.

use bevy::prelude::*;

use crate::animation::Animation;
use crate::gyroscope::Gyroscope;
use crate::params::Geometry;

/// Shape of the disc as owned by the scene. Edits here reach the simulation
/// through change detection.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct DiscBody {
    pub radius: f64,
    pub lever_length: f64,
}

impl DiscBody {
    pub fn new(radius: f64, lever_length: f64) -> Self {
        Self {
            radius,
            lever_length,
        }
    }

    pub fn geometry(&self) -> Geometry {
        Geometry::new(self.radius, self.lever_length)
    }
}

#[derive(Default)]
pub struct GyroPlugin;

impl Plugin for GyroPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (sync_geometry, advance_gyroscopes, write_orientation).chain(),
        );
    }
}

fn sync_geometry(mut query: Query<(&DiscBody, &mut Gyroscope), Changed<DiscBody>>) {
    for (body, mut gyro) in query.iter_mut() {
        if let Err(err) = gyro.set_geometry(body.geometry()) {
            warn!("Ignoring disc geometry: {}", err);
        }
    }
}

fn advance_gyroscopes(time: Res<Time>, mut query: Query<&mut Gyroscope>) {
    let dt = time.delta_secs_f64();
    for mut gyro in query.iter_mut() {
        gyro.advance(dt);
    }
}

fn write_orientation(mut query: Query<(&Gyroscope, &mut Transform)>) {
    for (gyro, mut transform) in query.iter_mut() {
        transform.rotation = sim_quat_to_bevy(gyro.orientation());
    }
}

/// Both frames are Y-up, so this is a plain precision change.
pub fn sim_quat_to_bevy(q: &na::UnitQuaternion<f64>) -> Quat {
    Quat::from_array([q.i as f32, q.j as f32, q.k as f32, q.w as f32])
}
