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

use super::{AccelModel, DynamicsAstroSnafu, DynamicsError};
use crate::cosmic::{BodyStateProvider, CartesianState, CelestialBody};
use crate::linalg::Vector3;
use snafu::ResultExt;
use std::fmt;

/// Gravity of a single body, either the central body of the spacecraft or a third body.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GravityModel {
    pub body: CelestialBody,
    /// Whether to include the oblateness (J2) of the body
    pub aspherical: bool,
    /// Geopotential degree, only J2 (degree 2, order 0) is modeled.
    pub degree: u16,
    pub order: u16,
}

impl GravityModel {
    /// Point mass gravity of the provided body
    pub fn spherical(body: CelestialBody) -> Self {
        Self {
            body,
            aspherical: false,
            degree: 0,
            order: 0,
        }
    }

    /// Point mass and J2 gravity of the provided body
    pub fn j2(body: CelestialBody) -> Self {
        Self {
            body,
            aspherical: true,
            degree: 2,
            order: 0,
        }
    }

    pub fn new(body: CelestialBody, aspherical: bool, degree: u16, order: u16) -> Self {
        Self {
            body,
            aspherical,
            degree,
            order,
        }
    }

    /// Position of the spacecraft relative to this gravity body, and of this body relative to the
    /// central body of the spacecraft.
    fn geometry(
        &self,
        osc: &CartesianState,
        provider: &dyn BodyStateProvider,
    ) -> Result<(Vector3<f64>, Vector3<f64>), DynamicsError> {
        if osc.central_body.id == self.body.id {
            return Ok((osc.position, Vector3::zeros()));
        }
        let body_state = provider
            .state(&self.body, &osc.epoch)
            .and_then(|state| state.change_central_body(&osc.central_body, provider))
            .context(DynamicsAstroSnafu)?;
        Ok((osc.position - body_state.position, body_state.position))
    }

    /// Point mass acceleration, including the indirect term for third bodies.
    pub fn spherical_accel(
        &self,
        osc: &CartesianState,
        provider: &dyn BodyStateProvider,
    ) -> Result<Vector3<f64>, DynamicsError> {
        if osc.central_body.id == self.body.id {
            return Ok(-self.body.mu / osc.rmag().powi(3) * osc.position);
        }

        let (sc_rel, body_pos) = self.geometry(osc, provider)?;
        // Perturber as seen from the spacecraft
        let s = -sc_rel;
        let a_den = s.norm().powi(3);
        let mut b_den = body_pos.norm().powi(3);
        if b_den == 0.0 {
            b_den = 1.0;
        }
        Ok(self.body.mu * (s / a_den - body_pos / b_den))
    }

    /// J2 acceleration in the body's equatorial frame, approximated by the inertial frame.
    pub fn j2_accel(&self, r: &Vector3<f64>) -> Vector3<f64> {
        let rmag = r.norm();
        let z2_r2 = (r.z / rmag).powi(2);
        let factor =
            -1.5 * self.body.j2() * self.body.mu * self.body.equatorial_radius.powi(2) / rmag.powi(5);
        Vector3::new(
            factor * r.x * (1.0 - 5.0 * z2_r2),
            factor * r.y * (1.0 - 5.0 * z2_r2),
            factor * r.z * (3.0 - 5.0 * z2_r2),
        )
    }
}

impl AccelModel for GravityModel {
    fn eom(
        &self,
        osc: &CartesianState,
        provider: &dyn BodyStateProvider,
    ) -> Result<Vector3<f64>, DynamicsError> {
        let mut accel = self.spherical_accel(osc, provider)?;
        if self.aspherical {
            let (sc_rel, _) = self.geometry(osc, provider)?;
            accel += self.j2_accel(&sc_rel);
        }
        Ok(accel)
    }
}

impl fmt::Display for GravityModel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "[GravityModel]")?;
        writeln!(f, " Body: {}", self.body)?;
        writeln!(f, " Aspherical: {}", self.aspherical)?;
        write!(f, " Geopotential Degree/Order: {}/{}", self.degree, self.order)
    }
}

#[cfg(test)]
mod ut_gravity {
    use super::*;
    use crate::cosmic::{TableBodyProvider, EARTH, LUNA};
    use crate::md::Trajectory;
    use crate::time::TimeValue;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn leo() -> CartesianState {
        CartesianState::inertial(
            EARTH,
            TimeValue::j2000(),
            Vector3::new(7_000_000.0, 0.0, 0.0),
            Vector3::new(0.0, 7_546.0, 0.0),
        )
    }

    #[test]
    fn test_central_body() {
        let accel = GravityModel::spherical(EARTH)
            .eom(&leo(), &TableBodyProvider::new())
            .unwrap();
        assert_relative_eq!(accel.x, -EARTH.mu / 7_000_000.0_f64.powi(2), max_relative = 1e-12);
        assert_eq!(accel.y, 0.0);
    }

    #[test]
    fn test_j2() {
        let model = GravityModel::j2(EARTH);
        // In the equatorial plane, J2 pulls towards the body
        let accel = model.j2_accel(&Vector3::new(7_000_000.0, 0.0, 0.0));
        assert!(accel.x < 0.0);
        assert_abs_diff_eq!(accel.z, 0.0);
        // Over the pole, J2 pushes away
        let accel = model.j2_accel(&Vector3::new(0.0, 0.0, 7_000_000.0));
        assert!(accel.z > 0.0);
        // Order of magnitude of J2 vs. point mass
        let ratio = model.j2_accel(&Vector3::new(7e6, 0.0, 0.0)).norm() / (EARTH.mu / 49e12);
        assert!(ratio > 1e-4 && ratio < 1e-2, "{ratio}");
    }

    #[test]
    fn test_third_body() {
        let epoch = TimeValue::j2000();
        let moon_pos = Vector3::new(384_400_000.0, 0.0, 0.0);
        let provider = TableBodyProvider::new().with(
            LUNA,
            Trajectory::from_states(
                vec![CartesianState::inertial(EARTH, epoch, moon_pos, Vector3::zeros())],
                epoch,
                EARTH,
            ),
        );
        let accel = GravityModel::spherical(LUNA).eom(&leo(), &provider).unwrap();
        let s = moon_pos - leo().position;
        let expected = LUNA.mu * (s / s.norm().powi(3) - moon_pos / moon_pos.norm().powi(3));
        assert_abs_diff_eq!(accel, expected, epsilon = 1e-15);
        // Tidal acceleration points towards the Moon for a spacecraft between Earth and Moon
        assert!(accel.x > 0.0);

        assert!(GravityModel::spherical(LUNA)
            .eom(&leo(), &TableBodyProvider::new())
            .is_err());
    }
}
