use crate::{earth_test_state, test_epoch, test_time_data};
use approx::assert_abs_diff_eq;
use arcprop::cosmic::{
    AstroError, CartesianState, ElementsResult, Frame, KeplerianElements, TableBodyProvider, EARTH,
    LUNA, SUN,
};
use arcprop::cosmic::earth_orientation::EARTH_ROTATION_RATE;
use arcprop::linalg::Vector3;
use arcprop::md::Trajectory;
use arcprop::time::Unit;
use rstest::*;

#[test]
fn earth_state_elements_round_trip() {
    let state = earth_test_state();
    let elements = KeplerianElements::from_cartesian(&state).unwrap();
    assert!(!elements.is_degenerate());
    let back = elements.elements().to_cartesian();

    let pos_err = (back.position - state.position).norm() / state.rmag();
    let vel_err = (back.velocity - state.velocity).norm() / state.vmag();
    assert!(pos_err < 1e-6, "position error {pos_err}");
    assert!(vel_err < 1e-6, "velocity error {vel_err}");
    assert_eq!(back.epoch, state.epoch);
    assert_eq!(back.central_body, EARTH);
}

#[rstest]
#[case(7_000e3, 0.001, 28.5, 45.0, 90.0, 10.0)]
#[case(26_600e3, 0.74, 63.4, 270.0, 270.0, 180.0)]
#[case(42_164e3, 0.1, 5.0, 120.0, 300.0, 359.0)]
#[case(384_400e3, 0.0549, 98.0, 10.0, 20.0, 200.0)]
fn elements_idempotence(
    #[case] sma: f64,
    #[case] ecc: f64,
    #[case] inc: f64,
    #[case] raan: f64,
    #[case] aop: f64,
    #[case] ta: f64,
) {
    let elements =
        KeplerianElements::from_degrees(EARTH, test_epoch(), sma, ecc, inc, raan, aop, ta);
    let state = elements.to_cartesian();
    let again = KeplerianElements::from_cartesian(&state)
        .unwrap()
        .elements()
        .to_cartesian();
    assert!(
        state.eq_within(&again, 1e-6 * state.rmag(), 1e-6 * state.vmag()),
        "{state:e}\n{again:e}"
    );
}

#[test]
fn degenerate_orbit_is_flagged() {
    // Equatorial orbit: the node vector vanishes
    let state = CartesianState::inertial(
        EARTH,
        test_epoch(),
        Vector3::new(7_000e3, 0.0, 0.0),
        Vector3::new(0.0, 7_600.0, 0.0),
    );
    match KeplerianElements::from_cartesian(&state).unwrap() {
        ElementsResult::Degenerate { elements, .. } => {
            assert!(elements.raan.is_finite());
            assert!(elements.aop.is_finite());
            assert!(elements.ta.is_finite());
        }
        ElementsResult::Elements(_) => panic!("equatorial orbit not flagged"),
    }
}

#[test]
fn kepler_propagation_reversible() {
    let elements = KeplerianElements::from_cartesian(&earth_test_state())
        .unwrap()
        .elements();
    let later = elements
        .propagate(&(test_epoch() + 3 * Unit::Hour))
        .unwrap();
    assert!(later.ta != elements.ta);
    let back = later.propagate(&test_epoch()).unwrap();
    assert_abs_diff_eq!(
        arcprop::utils::between_pm_pi(back.ta - elements.ta),
        0.0,
        epsilon = 1e-9
    );

    let one_period = elements
        .propagate(&(test_epoch() + elements.period() * Unit::Second))
        .unwrap();
    assert_abs_diff_eq!(
        arcprop::utils::between_pm_pi(one_period.ta - elements.ta),
        0.0,
        epsilon = 1e-9
    );
}

#[test]
fn hyperbolic_propagation_fails() {
    let mut elements = KeplerianElements::from_cartesian(&earth_test_state())
        .unwrap()
        .elements();
    elements.ecc = 1.2;
    elements.sma = -elements.sma;
    assert!(matches!(
        elements.propagate(&(test_epoch() + 1 * Unit::Hour)),
        Err(AstroError::NonElliptical { .. })
    ));
}

#[rstest]
#[case(0.0)]
#[case(3_600.0)]
#[case(86_400.0 * 180.0)]
fn frame_round_trip(#[case] offset_s: f64) {
    let data = test_time_data();
    let mut state = earth_test_state();
    state.epoch = state.epoch.increment(offset_s);

    let fixed = state.to_body_fixed_with(&data).unwrap();
    assert_eq!(fixed.frame, Frame::BodyFixed);
    // Rotations keep the radius
    assert_abs_diff_eq!(fixed.rmag(), state.rmag(), epsilon = 1e-6);

    let inertial = fixed.to_inertial_with(&data).unwrap();
    assert_eq!(inertial.frame, Frame::Inertial);
    assert!(inertial.eq_within(&state, 1e-6, 1e-9), "{inertial:e}\n{state:e}");
}

#[test]
fn fixed_frame_velocity_includes_rotation() {
    let data = test_time_data();
    // Geostationary point rotating with the Earth has no velocity in the fixed frame
    let r = 42_164_172.0;
    let w = EARTH_ROTATION_RATE;
    let fixed = CartesianState::body_fixed(
        EARTH,
        test_epoch(),
        Vector3::new(r, 0.0, 0.0),
        Vector3::zeros(),
    );
    let inertial = fixed.to_inertial_with(&data).unwrap();
    assert_abs_diff_eq!(inertial.vmag(), w * r, epsilon = 1e-2);
    assert_abs_diff_eq!(inertial.velocity.dot(&inertial.position), 0.0, epsilon = 1.0);
}

#[test]
fn non_earth_fixed_frames_unsupported() {
    let data = test_time_data();
    let mut state = earth_test_state();
    state.central_body = LUNA;
    assert!(matches!(
        state.to_body_fixed_with(&data),
        Err(AstroError::UnsupportedBodyFixed { .. })
    ));
}

#[test]
fn central_body_change() {
    let epoch = test_epoch();
    let earth_from_sun = CartesianState::inertial(
        SUN,
        epoch,
        Vector3::new(1.496e11, 0.0, 0.0),
        Vector3::new(0.0, 29_780.0, 0.0),
    );
    let luna_from_earth = CartesianState::inertial(
        EARTH,
        epoch,
        Vector3::new(0.0, 3.844e8, 0.0),
        Vector3::new(-1_022.0, 0.0, 0.0),
    );
    let provider = TableBodyProvider::new()
        .with(
            EARTH,
            Trajectory::from_states(vec![earth_from_sun], epoch, SUN),
        )
        .with(
            LUNA,
            Trajectory::from_states(vec![luna_from_earth], epoch, EARTH),
        );

    let sc = earth_test_state();
    let from_luna = sc.change_central_body(&LUNA, &provider).unwrap();
    assert_eq!(from_luna.central_body, LUNA);
    assert_abs_diff_eq!(
        (from_luna.position - (sc.position - luna_from_earth.position)).norm(),
        0.0,
        epsilon = 1e-3
    );

    let from_sun = sc.to_solar(&provider).unwrap();
    assert_eq!(from_sun.central_body, SUN);
    assert_abs_diff_eq!(
        (from_sun.velocity - (sc.velocity + earth_from_sun.velocity)).norm(),
        0.0,
        epsilon = 1e-9
    );
}
