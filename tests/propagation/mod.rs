use crate::{earth_test_state, test_epoch};
use approx::assert_abs_diff_eq;
use arcprop::cosmic::{KeplerianElements, EARTH};
use arcprop::dynamics::{Drag, ForceModel, GravityModel};
use arcprop::md::Trajectory;
use arcprop::propagators::*;
use arcprop::time::Unit;
use rstest::*;
use std::sync::Arc;

#[fixture]
fn two_body() -> ForceModel {
    ForceModel::new(EARTH)
}

#[rstest]
fn rk4_returns_after_one_period(two_body: ForceModel) {
    let _ = pretty_env_logger::try_init();
    let init = earth_test_state();
    let period = KeplerianElements::from_cartesian(&init)
        .unwrap()
        .elements()
        .period();

    let setup = Propagator::rk4(two_body, PropOpts::with_fixed_step_s(5.0));
    let mut prop = setup.with(init);
    let rslt = prop.for_duration(period * Unit::Second).unwrap();

    assert_abs_diff_eq!(
        rslt.epoch.difference(&init.epoch),
        period,
        epsilon = 1e-6
    );
    let pos_err = (rslt.position - init.position).norm();
    let vel_err = (rslt.velocity - init.velocity).norm();
    assert!(pos_err < 1.0, "RK4 did not return after one period: {pos_err} m");
    assert!(vel_err < 1e-3, "RK4 did not return after one period: {vel_err} m/s");
}

#[rstest]
fn rk4_matches_kepler(two_body: ForceModel) {
    let init = earth_test_state();
    let stop = test_epoch() + 2 * Unit::Hour;

    let setup = Propagator::rk4(two_body, PropOpts::with_fixed_step_s(10.0));
    let rk_traj = setup
        .with(init)
        .step(&test_epoch(), &stop, 10 * Unit::Minute)
        .unwrap();
    let kep_traj = KeplerPropagator::new(init)
        .unwrap()
        .step(&test_epoch(), &stop, 10 * Unit::Minute)
        .unwrap();

    assert_eq!(rk_traj.len(), 13);
    assert_eq!(kep_traj.len(), 13);
    for (rk, kep) in rk_traj.iter().zip(kep_traj.iter()) {
        assert_eq!(rk.epoch, kep.epoch);
        assert!(rk.eq_within(kep, 1.0, 1e-3), "{rk:e}\n{kep:e}");
    }
}

#[test]
fn perturbations_change_the_orbit() {
    let init = earth_test_state();
    let duration = 6 * Unit::Hour;

    let mut j2 = ForceModel::new(EARTH);
    j2.add_gravity(GravityModel::j2(EARTH));
    let mut drag = ForceModel::new(EARTH);
    drag.set_drag(Drag::default());

    let two_body = Propagator::rk4(ForceModel::new(EARTH), PropOpts::default())
        .with(init)
        .for_duration(duration)
        .unwrap();
    let with_j2 = Propagator::rk4(j2, PropOpts::default())
        .with(init)
        .for_duration(duration)
        .unwrap();
    let with_drag = Propagator::rk4(drag, PropOpts::default())
        .with(init)
        .for_duration(duration)
        .unwrap();

    // J2 dominates drag by orders of magnitude
    let j2_offset = (with_j2.position - two_body.position).norm();
    let drag_offset = (with_drag.position - two_body.position).norm();
    assert!(j2_offset > 1_000.0, "J2 offset {j2_offset} m");
    assert!(drag_offset > 0.0);
    assert!(drag_offset < j2_offset);
    // Drag dissipates energy
    assert!(with_drag.energy() < two_body.energy());
}

#[test]
fn kepler_step_samples() {
    let init = earth_test_state();
    let mut prop = KeplerPropagator::new(init).unwrap();
    let traj = prop
        .step(&test_epoch(), &(test_epoch() + 1 * Unit::Hour), 7 * Unit::Minute)
        .unwrap();
    // 0, 7, ..., 56 minutes: the stop epoch is not a multiple of the interval
    assert_eq!(traj.len(), 9);
    assert_eq!(traj.first().unwrap().epoch, test_epoch());
    assert_abs_diff_eq!(
        traj.last().unwrap().epoch.difference(&test_epoch()),
        56.0 * 60.0,
        epsilon = 1e-9
    );
    assert!(prop
        .step(&test_epoch(), &test_epoch(), 0 * Unit::Second)
        .is_err());
}

#[test]
fn interpolated_replays_trajectory() {
    let init = earth_test_state();
    let traj: Trajectory = KeplerPropagator::new(init)
        .unwrap()
        .step(&test_epoch(), &(test_epoch() + 2 * Unit::Hour), 1 * Unit::Minute)
        .unwrap();

    let mut replay = InterpolatedPropagator::new(Arc::new(traj)).unwrap();
    let mut kepler = KeplerPropagator::new(init).unwrap();
    let epoch = test_epoch() + 4321.5 * Unit::Second;
    let interpolated = replay.propagate(&epoch).unwrap();
    let truth = kepler.propagate(&epoch).unwrap();
    assert!(interpolated.eq_within(&truth, 1e-3, 1e-6));

    assert!(InterpolatedPropagator::new(Arc::new(Trajectory::default())).is_err());
}
