use crate::{earth_test_state, test_epoch};
use approx::assert_abs_diff_eq;
use arcprop::cosmic::EARTH;
use arcprop::md::trajectory::{STK_VERSION, STK_WRITER};
use arcprop::md::Trajectory;
use arcprop::propagators::{KeplerPropagator, StatePropagator};
use arcprop::time::Unit;

#[test]
fn stk_round_trip() {
    let traj = KeplerPropagator::new(earth_test_state())
        .unwrap()
        .step(&test_epoch(), &(test_epoch() + 3 * Unit::Hour), 17 * Unit::Minute)
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("round_trip.e");
    traj.write_stk(&path).unwrap();
    let reloaded = Trajectory::from_stk_file(&path).unwrap();

    assert_eq!(reloaded.len(), traj.len());
    assert_eq!(reloaded.central_body, EARTH);
    assert_abs_diff_eq!(
        reloaded.epoch.difference(&traj.epoch),
        0.0,
        epsilon = 1e-6
    );
    for (orig, read) in traj.iter().zip(reloaded.iter()) {
        assert_abs_diff_eq!(read.epoch.difference(&orig.epoch), 0.0, epsilon = 1e-6);
        // Fifteen significant digits are written
        assert!((read.position - orig.position).amax() < 1e-6);
        assert!((read.velocity - orig.velocity).amax() < 1e-9);
    }
}

#[test]
fn stk_header_without_states() {
    let traj = Trajectory::new(test_epoch(), EARTH);
    let lines = traj.format_stk().unwrap();
    assert_eq!(lines[0], STK_VERSION);
    assert_eq!(lines[1], STK_WRITER);
    assert_eq!(lines[2], "BEGIN Ephemeris");
    assert_eq!(lines[3], "NumberOfEphemerisPoints 0");
    assert_eq!(lines[4], "ScenarioEpoch 01 Jan 2019 00:00:00.000000");
    assert_eq!(lines[5], "CentralBody Earth");
    assert_eq!(lines[6], "CoordinateSystem ICRF");
    assert_eq!(lines[7], "EphemerisTimePosVel");
    assert_eq!(lines.last().unwrap(), "END Ephemeris");
    assert_eq!(lines.len(), 9);

    let reparsed = Trajectory::parse_stk(&lines.join("\n"), "memory").unwrap();
    assert!(reparsed.is_empty());
}

#[test]
fn stk_malformed() {
    let traj = Trajectory::new(test_epoch(), EARTH);
    let mut lines = traj.format_stk().unwrap();
    lines[3] = "NumberOfEphemerisPoints 2".to_string();
    assert!(Trajectory::parse_stk(&lines.join("\n"), "memory").is_err());

    let no_body: Vec<String> = traj
        .format_stk()
        .unwrap()
        .into_iter()
        .filter(|l| !l.starts_with("CentralBody"))
        .collect();
    assert!(Trajectory::parse_stk(&no_body.join("\n"), "memory").is_err());

    assert!(Trajectory::from_stk_file("/nonexistent/ephem.e").is_err());
}

#[test]
fn interpolation_bounds() {
    let traj = KeplerPropagator::new(earth_test_state())
        .unwrap()
        .step(&test_epoch(), &(test_epoch() + 1 * Unit::Hour), 10 * Unit::Minute)
        .unwrap();
    let first = *traj.first().unwrap();
    let last = *traj.last().unwrap();

    // Clamped outside of the sampled span
    assert_eq!(traj.interpolate(&(test_epoch() - 1 * Unit::Hour)).unwrap(), first);
    assert_eq!(traj.interpolate(&(test_epoch() + 2 * Unit::Hour)).unwrap(), last);

    let mid = traj.interpolate(&(test_epoch() + 25 * Unit::Minute)).unwrap();
    assert_abs_diff_eq!(mid.epoch.difference(&test_epoch()), 1_500.0, epsilon = 1e-9);
    let truth = KeplerPropagator::new(earth_test_state())
        .unwrap()
        .propagate(&mid.epoch)
        .unwrap();
    assert!(mid.eq_within(&truth, 1e-3, 1e-6), "{mid:e}\n{truth:e}");

    assert!(Trajectory::new(test_epoch(), EARTH)
        .interpolate(&test_epoch())
        .is_err());
}
