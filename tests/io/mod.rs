use crate::earth_test_state;
use arcprop::io::{run_config_file, ConfigRepr, PropagationMethod, RunConfig};
use arcprop::md::Trajectory;
use arcprop::ArcError;
use std::path::Path;

fn run_file(ephem_path: &Path, method: &str) -> String {
    format!(
        r#"
ARC_INITIAL_CONDITIONS:
  INPUT:
    INITIAL_STATE:
      CARTESIAN:
        CENTRAL_BODY: EARTH
        EPOCH: "2019-01-01T00:00:00"
        POSITION: {{X: -698891.686, Y: 6023436.003, Z: 3041793.014}}
        VELOCITY: {{X: -4987.520, Y: -3082.634, Z: 4941.720}}
        FRAME: J2000
  PROPAGATION:
    STOP_TIME: "2019-01-01T01:00:00"
    PROPAGATION_STEP: 300
    INTEGRATION_STEP: 10
    METHOD: {method}
  OUTPUT:
    EPHEMERIS:
      FILENAME: {}
      FORMAT: STK
"#,
        ephem_path.display()
    )
}

#[test]
fn run_kepler_and_rk4() {
    let _ = pretty_env_logger::try_init();
    let dir = tempfile::tempdir().unwrap();

    let mut finals = Vec::new();
    for method in ["KEPLER", "RUNGE_KUTTA_4"] {
        let ephem_path = dir.path().join(format!("{method}.e"));
        let cfg_path = dir.path().join(format!("{method}.yaml"));
        std::fs::write(&cfg_path, run_file(&ephem_path, method)).unwrap();

        let cfg = RunConfig::load(&cfg_path).unwrap();
        assert_eq!(
            cfg.run.propagation.method == PropagationMethod::Kepler,
            method == "KEPLER"
        );

        let traj = run_config_file(&cfg_path).unwrap();
        // One hour every five minutes
        assert_eq!(traj.len(), 13);

        let written = Trajectory::from_stk_file(&ephem_path).unwrap();
        assert_eq!(written.len(), traj.len());
        finals.push(*written.last().unwrap());
    }

    // Same initial state and two-body dynamics in both runs
    assert!((finals[0].position - finals[1].position).norm() < 1.0);
}

#[test]
fn run_legacy_root_key() {
    let dir = tempfile::tempdir().unwrap();
    let ephem_path = dir.path().join("legacy.e");
    let yaml = run_file(&ephem_path, "KEPLER").replace("ARC_INITIAL_CONDITIONS", "ARC_RUN");
    let cfg = RunConfig::loads(&yaml).unwrap();
    assert_eq!(cfg.initial_state().unwrap(), earth_test_state());
}

#[test]
fn run_missing_file() {
    assert!(matches!(
        run_config_file("/nonexistent/run.yaml"),
        Err(ArcError::Config { .. })
    ));
}
