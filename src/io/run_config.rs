/*
    ArcProp, orbit propagation and reference frame engine
    Copyright (C) 2023 Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use super::{
    duration_from_str, duration_to_str, epoch_from_str, epoch_to_str, maybe_epoch_from_str,
    maybe_epoch_to_str, ConfigAstroSnafu, ConfigError, ConfigRepr,
};
use crate::cosmic::{CartesianState, CelestialBody, EARTH};
use crate::dynamics::{AtmosphereModel, Drag, ForceModel, GravityModel};
use crate::errors::ArcError;
use crate::linalg::Vector3;
use crate::md::trajectory::Trajectory;
use crate::propagators::{KeplerPropagator, PropOpts, Propagator, StatePropagator};
use crate::time::{Duration, TimeValue, Unit};
use serde_derive::{Deserialize, Serialize};
use snafu::ResultExt;
use std::collections::BTreeMap;
use std::path::Path;
use typed_builder::TypedBuilder;

/// Root of a run file
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(rename = "ARC_INITIAL_CONDITIONS", alias = "ARC_RUN")]
    pub run: RunDefinition,
}

impl ConfigRepr for RunConfig {}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunDefinition {
    #[serde(rename = "INPUT")]
    pub input: InputConfig,
    #[serde(rename = "PROPAGATION")]
    pub propagation: PropagationConfig,
    #[serde(rename = "OUTPUT", default)]
    pub output: OutputConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(rename = "INITIAL_STATE")]
    pub initial_state: InitialStateConfig,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InitialStateConfig {
    #[serde(rename = "CARTESIAN", default)]
    pub cartesian: Option<CartesianConfig>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Xyz {
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
    #[serde(rename = "Z")]
    pub z: f64,
}

impl From<Xyz> for Vector3<f64> {
    fn from(xyz: Xyz) -> Self {
        Vector3::new(xyz.x, xyz.y, xyz.z)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CartesianConfig {
    #[serde(rename = "CENTRAL_BODY")]
    pub central_body: String,
    #[serde(
        rename = "EPOCH",
        serialize_with = "epoch_to_str",
        deserialize_with = "epoch_from_str"
    )]
    pub epoch: TimeValue,
    /// In meters
    #[serde(rename = "POSITION")]
    pub position: Xyz,
    /// In meters per second
    #[serde(rename = "VELOCITY")]
    pub velocity: Xyz,
    #[serde(rename = "FRAME")]
    pub frame: String,
}

impl CartesianConfig {
    /// Builds the inertial initial state. Earth fixed states (`ITRF` or `ECF`) are rotated into
    /// the Earth centered inertial frame.
    pub fn to_state(&self) -> Result<CartesianState, ConfigError> {
        let body = CelestialBody::from_name(&self.central_body).context(ConfigAstroSnafu)?;
        let position = self.position.into();
        let velocity = self.velocity.into();
        match self.frame.to_uppercase().as_str() {
            "ICRF" | "J2000" | "ECI" => {
                Ok(CartesianState::inertial(body, self.epoch, position, velocity))
            }
            "ITRF" | "ECF" => CartesianState::body_fixed(EARTH, self.epoch, position, velocity)
                .to_inertial()
                .context(ConfigAstroSnafu),
            _ => Err(ConfigError::InvalidConfig {
                msg: format!("unsupported coordinate frame `{}`", self.frame),
            }),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropagationMethod {
    #[default]
    #[serde(rename = "RUNGE_KUTTA_4")]
    RungeKutta4,
    #[serde(rename = "KEPLER")]
    Kepler,
}

fn default_propagation_step() -> Duration {
    60.0 * Unit::Second
}

fn default_integration_step() -> Duration {
    15.0 * Unit::Second
}

#[derive(Clone, Debug, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
pub struct PropagationConfig {
    /// Defaults to the epoch of the initial state
    #[serde(
        rename = "START_TIME",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "maybe_epoch_to_str",
        deserialize_with = "maybe_epoch_from_str"
    )]
    #[builder(default, setter(strip_option))]
    pub start_time: Option<TimeValue>,
    #[serde(
        rename = "STOP_TIME",
        serialize_with = "epoch_to_str",
        deserialize_with = "epoch_from_str"
    )]
    pub stop_time: TimeValue,
    /// Sampling of the output trajectory
    #[serde(
        rename = "PROPAGATION_STEP",
        default = "default_propagation_step",
        serialize_with = "duration_to_str",
        deserialize_with = "duration_from_str"
    )]
    #[builder(default = default_propagation_step())]
    pub propagation_step: Duration,
    /// Sub-step of the numerical integrator
    #[serde(
        rename = "INTEGRATION_STEP",
        default = "default_integration_step",
        serialize_with = "duration_to_str",
        deserialize_with = "duration_from_str"
    )]
    #[builder(default = default_integration_step())]
    pub integration_step: Duration,
    #[serde(rename = "METHOD", default)]
    #[builder(default)]
    pub method: PropagationMethod,
    #[serde(rename = "MODELS", default)]
    #[builder(default)]
    pub models: ModelsConfig,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Gravity sources keyed by body name
    #[serde(rename = "GRAVITY", default)]
    pub gravity: BTreeMap<String, GravityConfig>,
    #[serde(rename = "ATMOSPHERE", default, skip_serializing_if = "Option::is_none")]
    pub atmosphere: Option<AtmosphereConfig>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GravityConfig {
    #[serde(rename = "ASPHERICAL", default)]
    pub aspherical: bool,
    /// Only `J2` is supported
    #[serde(rename = "GEOPOTENTIAL_MODEL", default, skip_serializing_if = "Option::is_none")]
    pub geopotential_model: Option<String>,
    #[serde(rename = "GEOPOTENTIAL_DEGREE", default)]
    pub degree: u16,
    #[serde(rename = "GEOPOTENTIAL_ORDER", default)]
    pub order: u16,
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct AtmosphereConfig {
    #[serde(rename = "MODEL", default)]
    pub model: AtmosphereModel,
    #[serde(rename = "DRAG_COEFF", default = "default_cd")]
    pub cd: f64,
    /// In m^2
    #[serde(rename = "AREA", default = "default_area")]
    pub area: f64,
    /// In kg
    #[serde(rename = "MASS", default = "default_mass")]
    pub mass: f64,
}

fn default_cd() -> f64 {
    Drag::default().cd
}

fn default_area() -> f64 {
    Drag::default().area
}

fn default_mass() -> f64 {
    Drag::default().mass
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(rename = "EPHEMERIS", default)]
    pub ephemeris: EphemerisOutputConfig,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EphemerisFormat {
    #[default]
    #[serde(rename = "STK")]
    Stk,
}

fn default_filename() -> String {
    "arc.out".to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EphemerisOutputConfig {
    #[serde(rename = "FILENAME", default = "default_filename")]
    pub filename: String,
    #[serde(rename = "FORMAT", default)]
    pub format: EphemerisFormat,
}

impl Default for EphemerisOutputConfig {
    fn default() -> Self {
        Self {
            filename: default_filename(),
            format: EphemerisFormat::default(),
        }
    }
}

impl ModelsConfig {
    /// Builds the force model acting on a spacecraft about the provided central body.
    ///
    /// The central body is always a gravity source, spherical unless configured otherwise.
    pub fn force_model(&self, central_body: CelestialBody) -> Result<ForceModel, ConfigError> {
        let mut fm = ForceModel::new(central_body);
        for (name, grav) in &self.gravity {
            let body = CelestialBody::from_name(name).context(ConfigAstroSnafu)?;
            if let Some(model) = &grav.geopotential_model {
                if !model.eq_ignore_ascii_case("J2") {
                    return Err(ConfigError::InvalidConfig {
                        msg: format!("unsupported geopotential model `{model}` for {name}"),
                    });
                }
            }
            fm.add_gravity(GravityModel::new(
                body,
                grav.aspherical,
                grav.degree,
                grav.order,
            ));
        }
        if let Some(atmosphere) = &self.atmosphere {
            fm.set_drag(Drag::new(
                central_body,
                atmosphere.model,
                atmosphere.mass,
                atmosphere.area,
                atmosphere.cd,
            ));
        }
        Ok(fm)
    }
}

impl RunConfig {
    /// Returns the inertial initial state of this run.
    pub fn initial_state(&self) -> Result<CartesianState, ConfigError> {
        match &self.run.input.initial_state.cartesian {
            Some(cartesian) => cartesian.to_state(),
            None => Err(ConfigError::InvalidConfig {
                msg: "unsupported initial state type, expected a CARTESIAN state".to_string(),
            }),
        }
    }

    /// Propagates the initial state over the configured span and returns the sampled trajectory.
    pub fn propagate(&self) -> Result<Trajectory, ArcError> {
        let state = self.initial_state()?;
        let prop_cfg = &self.run.propagation;
        let start = prop_cfg.start_time.unwrap_or(state.epoch);

        info!(
            "Propagating {} from {} to {} ({:?})",
            state.central_body.name,
            start.to_iso(),
            prop_cfg.stop_time.to_iso(),
            prop_cfg.method
        );

        let traj = match prop_cfg.method {
            PropagationMethod::RungeKutta4 => {
                let fm = prop_cfg.models.force_model(state.central_body)?;
                debug!("{fm}");
                let setup =
                    Propagator::rk4(fm, PropOpts::with_fixed_step(prop_cfg.integration_step));
                setup.with(state).step(
                    &start,
                    &prop_cfg.stop_time,
                    prop_cfg.propagation_step,
                )?
            }
            PropagationMethod::Kepler => KeplerPropagator::new(state)?.step(
                &start,
                &prop_cfg.stop_time,
                prop_cfg.propagation_step,
            )?,
        };
        Ok(traj)
    }

    /// Propagates and writes the requested output products.
    pub fn run(&self) -> Result<Trajectory, ArcError> {
        let traj = self.propagate()?;
        let ephem = &self.run.output.ephemeris;
        match ephem.format {
            EphemerisFormat::Stk => traj.write_stk(&ephem.filename)?,
        }
        Ok(traj)
    }
}

/// Loads the run file at the provided path, propagates, and writes the output products.
pub fn run_config_file<P: AsRef<Path>>(path: P) -> Result<Trajectory, ArcError> {
    let cfg = RunConfig::load(path)?;
    cfg.run()
}

#[cfg(test)]
mod ut_run_config {
    use super::*;
    use crate::cosmic::Frame;

    const RUN: &str = r#"
ARC_INITIAL_CONDITIONS:
  INPUT:
    INITIAL_STATE:
      CARTESIAN:
        CENTRAL_BODY: Earth
        EPOCH: "2019-01-01T00:00:00"
        POSITION: {X: -698891.686, Y: 6023436.003, Z: 3041793.014}
        VELOCITY: {X: -4987.520, Y: -3082.634, Z: 4941.720}
        FRAME: ICRF
  PROPAGATION:
    STOP_TIME: "2019-01-01T00:10:00"
    PROPAGATION_STEP: 120
    INTEGRATION_STEP: "10 s"
    MODELS:
      GRAVITY:
        Earth:
          ASPHERICAL: true
          GEOPOTENTIAL_MODEL: J2
          GEOPOTENTIAL_DEGREE: 2
      ATMOSPHERE:
        MODEL: US_STANDARD_1976
        MASS: 500
"#;

    #[test]
    fn test_parse_run() {
        let cfg = RunConfig::loads(RUN).unwrap();
        let prop = &cfg.run.propagation;
        assert_eq!(prop.propagation_step, 120.0 * Unit::Second);
        assert_eq!(prop.integration_step, 10.0 * Unit::Second);
        assert_eq!(prop.method, PropagationMethod::RungeKutta4);
        assert!(prop.start_time.is_none());
        assert_eq!(cfg.run.output.ephemeris.filename, "arc.out");

        let atmosphere = prop.models.atmosphere.unwrap();
        assert_eq!(atmosphere.mass, 500.0);
        assert_eq!(atmosphere.cd, 1.2);

        let state = cfg.initial_state().unwrap();
        assert_eq!(state.frame, Frame::Inertial);
        assert_eq!(state.central_body, EARTH);
        assert_eq!(state.position.x, -698_891.686);

        let fm = prop.models.force_model(state.central_body).unwrap();
        assert_eq!(fm.gravity_models().count(), 1);
        assert!(fm.gravity_models().all(|g| g.aspherical && g.degree == 2));
        assert_eq!(fm.drag.unwrap().mass, 500.0);
    }

    #[test]
    fn test_invalid_inputs() {
        let bad_frame = RUN.replace("FRAME: ICRF", "FRAME: GCRF");
        let cfg = RunConfig::loads(&bad_frame).unwrap();
        assert!(matches!(
            cfg.initial_state(),
            Err(ConfigError::InvalidConfig { .. })
        ));

        let bad_body = RUN.replace("CENTRAL_BODY: Earth", "CENTRAL_BODY: Pluto");
        let cfg = RunConfig::loads(&bad_body).unwrap();
        assert!(matches!(
            cfg.initial_state(),
            Err(ConfigError::ConfigAstro { .. })
        ));

        let bad_model = RUN.replace("GEOPOTENTIAL_MODEL: J2", "GEOPOTENTIAL_MODEL: EGM96");
        let cfg = RunConfig::loads(&bad_model).unwrap();
        assert!(cfg.run.propagation.models.force_model(EARTH).is_err());

        assert!(matches!(
            RunConfig::loads("ARC_INITIAL_CONDITIONS: 3"),
            Err(ConfigError::ParseConfig { .. })
        ));
        assert!(matches!(
            RunConfig::load("/nonexistent/run.yaml"),
            Err(ConfigError::ReadConfig { .. })
        ));
    }

    #[test]
    fn test_builder() {
        let cfg = PropagationConfig::builder()
            .stop_time(TimeValue::j2000())
            .build();
        assert_eq!(cfg.propagation_step, 60.0 * Unit::Second);
        assert_eq!(cfg.integration_step, 15.0 * Unit::Second);
        assert_eq!(cfg.method, PropagationMethod::RungeKutta4);
    }
}
