//! Headless gyroscope run.
//!
//! Hosts the simulation in a minimal Bevy app with a fixed frame length,
//! applies the scheduled edits from the run configuration and prints the
//! disc state as it goes.

// Recommended alias.
extern crate nalgebra as na;

mod config;
mod trajectory;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use clap::Parser;
use sim_physics::{Animation, DiscBody, GyroPlugin, Gyroscope, ParameterEdit};

use crate::config::{Action, RunConfig};
use crate::trajectory::Trajectory;

#[derive(Parser, Debug)]
#[command(about = "Run the gyroscope simulation without a window")]
struct Args {
    /// JSON run configuration. Built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the recorded trajectory here (.json or .cbor).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override the configured duration, in seconds.
    #[arg(short, long)]
    duration: Option<f64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    if let Some(duration) = args.duration {
        config.duration = duration;
    }
    config.validate()?;

    let mut gyro = Gyroscope::new(config.params, config.geometry, config.sim)?;
    gyro.set_trail_length(config.trail_length)?;

    let mut app = App::new();
    app.add_plugins((MinimalPlugins, LogPlugin::default(), GyroPlugin));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        config.frame,
    )));

    info!(
        "Regular precession estimate: {:.3} deg/s",
        gyro.regular_precession()
    );

    let body = DiscBody::new(config.geometry.radius, config.geometry.lever_length);
    let entity = app
        .world_mut()
        .spawn((Name::new("Gyroscope"), body, gyro, Transform::default()))
        .id();

    let mut schedule = config.schedule().into_iter().peekable();
    let mut trajectory = Trajectory::new(config.record_interval);
    let mut clock = 0.0;
    let mut next_print = 0.0;

    while clock < config.duration {
        while let Some(event) = schedule.next_if(|e| e.at <= clock) {
            apply(app.world_mut(), entity, event.action)?;
        }

        app.update();
        clock += config.frame;

        let gyro = app
            .world()
            .get::<Gyroscope>(entity)
            .context("gyroscope entity vanished")?;
        trajectory.observe(clock, gyro);
        if clock >= next_print {
            show(clock, gyro);
            next_print += config.print_interval;
        }
    }

    if let Some(path) = args.output.or(config.output) {
        let gyro = app
            .world()
            .get::<Gyroscope>(entity)
            .context("gyroscope entity vanished")?;
        trajectory.write(&path, gyro)?;
        info!(
            "Wrote {} samples to {}",
            trajectory.samples().len(),
            path.display()
        );
    }

    Ok(())
}

/// Carry out a scheduled action. Geometry goes to the body, which owns it;
/// everything else goes straight to the simulation.
fn apply(world: &mut World, entity: Entity, action: Action) -> Result<()> {
    match action {
        Action::Set(ParameterEdit::Radius(radius)) => {
            body_mut(world, entity)?.radius = radius;
        }
        Action::Set(ParameterEdit::LeverLength(length)) => {
            body_mut(world, entity)?.lever_length = length;
        }
        Action::Set(edit) => {
            if let Err(err) = gyro_mut(world, entity)?.apply(edit) {
                warn!("Skipping {:?}: {}", edit, err);
            }
        }
        Action::Restart => gyro_mut(world, entity)?.restart(),
        Action::TogglePause => {
            let paused = gyro_mut(world, entity)?.toggle_pause();
            info!("Paused: {}", paused);
        }
    }
    Ok(())
}

fn body_mut(world: &mut World, entity: Entity) -> Result<Mut<'_, DiscBody>> {
    world
        .get_mut::<DiscBody>(entity)
        .context("disc body entity vanished")
}

fn gyro_mut(world: &mut World, entity: Entity) -> Result<Mut<'_, Gyroscope>> {
    world
        .get_mut::<Gyroscope>(entity)
        .context("gyroscope entity vanished")
}

/// Print the current slope, heading and nutation phase.
fn show(clock: f64, gyro: &Gyroscope) {
    let axis = gyro.state().axis();
    let slope = axis.angle(&na::Vector3::y()).to_degrees();
    let heading = axis.x.atan2(axis.z).to_degrees();
    println!(
        "Time: {:6.3} s Sim: {:6.3} s Slope: {:7.3}° Heading: {:8.3}° Phase: {:.3} |L|: {:.4}",
        clock,
        gyro.elapsed(),
        slope,
        heading,
        gyro.phase(),
        gyro.angular_momentum().norm(),
    );
}
