use approx::assert_relative_eq;
use sim_physics::{Animation, Geometry, Gyroscope, SimConfig, SimulationParameters, SpinSense};

const STEP: f64 = 1.0e-4;

fn lab_gyroscope() -> Gyroscope {
    let params = SimulationParameters {
        mass: 1.0,
        gravity: 10.0,
        spin_rate: 1.0,
        spin_sense: SpinSense::CounterClockwise,
        slope: 90.0,
        precession: None,
    };
    let config = SimConfig {
        step: STEP,
        ..Default::default()
    };
    Gyroscope::new(params, Geometry::new(1.0, 1.0), config).unwrap()
}

#[test]
fn one_simulated_second() {
    let mut gyro = lab_gyroscope();
    let l0 = gyro.angular_momentum().norm();

    let mut previous = gyro.phase();
    let mut wraps = 0;
    // One step's worth of time per frame drains exactly one step.
    for _ in 0..10_000 {
        assert_eq!(gyro.advance(STEP), 1);
        assert_relative_eq!(gyro.orientation().coords.norm(), 1.0, epsilon = 1e-6);

        let phase = gyro.phase();
        if phase < previous - 0.5 {
            wraps += 1;
        }
        previous = phase;
    }

    assert_eq!(gyro.steps(), 10_000);
    assert_relative_eq!(gyro.elapsed(), 1.0, epsilon = 1e-9);
    let l1 = gyro.angular_momentum().norm();
    assert!((l1 - l0).abs() / l0 < 0.01, "|L| moved from {l0} to {l1}");
    assert!(wraps >= 1, "phase never completed a cycle");

    // 0.02 s trail samples over one second, plus the seed.
    assert!(gyro.trail().len() >= 50);
}

#[test]
fn identical_runs_match() {
    let mut a = lab_gyroscope();
    let mut b = lab_gyroscope();
    let frames = [0.016, 0.017, 0.0005, 0.033, 0.016];
    for dt in frames.iter().cycle().take(60) {
        assert_eq!(a.advance(*dt), b.advance(*dt));
        assert_eq!(a.state(), b.state());
        assert_eq!(a.phase(), b.phase());
    }
}

#[test]
fn lever_edit_mid_run_is_continuous() {
    let mut gyro = lab_gyroscope();
    for _ in 0..400 {
        gyro.advance(1.0 / 800.0);
    }
    let axis = gyro.state().axis();

    gyro.set_lever_length(1.001).unwrap();
    gyro.advance(0.0);

    assert!(gyro.state().axis().angle(&axis) < 1e-3);
    assert_eq!(gyro.geometry().lever_length, 1.001);
}

#[test]
fn clockwise_spin_mirrors_precession() {
    let mut ccw = lab_gyroscope();
    let mut cw = lab_gyroscope();
    cw.set_spin_sense(SpinSense::Clockwise).unwrap();
    cw.restart();

    for _ in 0..2000 {
        ccw.advance(STEP);
        cw.advance(STEP);
    }

    // Same sag, opposite sideways drift.
    let a = ccw.state().axis();
    let b = cw.state().axis();
    assert_relative_eq!(a.y, b.y, epsilon = 1e-9);
    assert_relative_eq!(a.x, -b.x, epsilon = 1e-9);
    assert!(a.x.abs() > 1e-3);
    assert!(cw.regular_precession() < 0.0);
}
