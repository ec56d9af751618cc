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

use super::rotations::{Euler3Axis, EulerRotation};
use crate::linalg::Vector3;
use crate::time::{time_data, EopParams, TimeDataProvider, TimeError, TimeScale, TimeValue};
use crate::utils::{eval_poly, marcsec_to_radians};
use std::fmt;

/// Earth rotation rate used by the frame chain, in rad/s.
pub const EARTH_ROTATION_RATE: f64 = 7.292_115_855_3e-5;

/// Number of terms in the IAU 1980 nutation series.
pub const IAU_1980_TERMS: usize = 106;

/// IAU 1980 nutation series. Each row holds the multipliers of the Moon anomaly, the Sun anomaly,
/// the Moon argument of latitude, the Moon elongation and the Moon RAAN, followed by the
/// coefficients A, B (longitude) and C, D (obliquity), in 0.0001 arcseconds.
#[rustfmt::skip]
pub const IAU_1980_NUTATION: [[f64; 9]; IAU_1980_TERMS] = [
    [0.0, 0.0, 0.0, 0.0, 1.0, -171996.0, -174.2, 92025.0, 8.9],
    [0.0, 0.0, 2.0, -2.0, 2.0, -13187.0, -1.6, 5736.0, -3.1],
    [0.0, 0.0, 2.0, 0.0, 2.0, -2274.0, -0.2, 977.0, -0.5],
    [0.0, 0.0, 0.0, 0.0, 2.0, 2062.0, 0.2, -895.0, 0.5],
    [0.0, 1.0, 0.0, 0.0, 0.0, 1426.0, -3.4, 54.0, -0.1],
    [1.0, 0.0, 0.0, 0.0, 0.0, 712.0, 0.1, -7.0, 0.0],
    [0.0, 1.0, 2.0, -2.0, 2.0, -517.0, 1.2, 224.0, -0.6],
    [0.0, 0.0, 2.0, 0.0, 1.0, -386.0, -0.4, 200.0, 0.0],
    [1.0, 0.0, 2.0, 0.0, 2.0, -301.0, 0.0, 129.0, -0.1],
    [0.0, -1.0, 2.0, -2.0, 2.0, 217.0, -0.5, -95.0, 0.3],
    [1.0, 0.0, 0.0, -2.0, 0.0, -158.0, 0.0, -1.0, 0.0],
    [0.0, 0.0, 2.0, -2.0, 1.0, 129.0, 0.1, -70.0, 0.0],
    [-1.0, 0.0, 2.0, 0.0, 2.0, 123.0, 0.0, -53.0, 0.0],
    [1.0, 0.0, 0.0, 0.0, 1.0, 63.0, 0.1, -33.0, 0.0],
    [0.0, 0.0, 0.0, 2.0, 0.0, 63.0, 0.0, -2.0, 0.0],
    [-1.0, 0.0, 2.0, 2.0, 2.0, -59.0, 0.0, 26.0, 0.0],
    [-1.0, 0.0, 0.0, 0.0, 1.0, -58.0, -0.1, 32.0, 0.0],
    [1.0, 0.0, 2.0, 0.0, 1.0, -51.0, 0.0, 27.0, 0.0],
    [2.0, 0.0, 0.0, -2.0, 0.0, 48.0, 0.0, 1.0, 0.0],
    [-2.0, 0.0, 2.0, 0.0, 1.0, 46.0, 0.0, -24.0, 0.0],
    [0.0, 0.0, 2.0, 2.0, 2.0, -38.0, 0.0, 16.0, 0.0],
    [2.0, 0.0, 2.0, 0.0, 2.0, -31.0, 0.0, 13.0, 0.0],
    [2.0, 0.0, 0.0, 0.0, 0.0, 29.0, 0.0, -1.0, 0.0],
    [1.0, 0.0, 2.0, -2.0, 2.0, 29.0, 0.0, -12.0, 0.0],
    [0.0, 0.0, 2.0, 0.0, 0.0, 26.0, 0.0, -1.0, 0.0],
    [0.0, 0.0, 2.0, -2.0, 0.0, -22.0, 0.0, 0.0, 0.0],
    [-1.0, 0.0, 2.0, 0.0, 1.0, 21.0, 0.0, -10.0, 0.0],
    [0.0, 2.0, 0.0, 0.0, 0.0, 17.0, -0.1, 0.0, 0.0],
    [0.0, 2.0, 2.0, -2.0, 2.0, -16.0, 0.1, 7.0, 0.0],
    [-1.0, 0.0, 0.0, 2.0, 1.0, 16.0, 0.0, -8.0, 0.0],
    [0.0, 1.0, 0.0, 0.0, 1.0, -15.0, 0.0, 9.0, 0.0],
    [1.0, 0.0, 0.0, -2.0, 1.0, -13.0, 0.0, 7.0, 0.0],
    [0.0, -1.0, 0.0, 0.0, 1.0, -12.0, 0.0, 6.0, 0.0],
    [2.0, 0.0, -2.0, 0.0, 0.0, 11.0, 0.0, 0.0, 0.0],
    [-1.0, 0.0, 2.0, 2.0, 1.0, -10.0, 0.0, 5.0, 0.0],
    [1.0, 0.0, 2.0, 2.0, 2.0, -8.0, 0.0, 3.0, 0.0],
    [0.0, -1.0, 2.0, 0.0, 2.0, -7.0, 0.0, 3.0, 0.0],
    [0.0, 0.0, 2.0, 2.0, 1.0, -7.0, 0.0, 3.0, 0.0],
    [1.0, 1.0, 0.0, -2.0, 0.0, -7.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 2.0, 0.0, 2.0, 7.0, 0.0, -3.0, 0.0],
    [-2.0, 0.0, 0.0, 2.0, 1.0, -6.0, 0.0, 3.0, 0.0],
    [0.0, 0.0, 0.0, 2.0, 1.0, -6.0, 0.0, 3.0, 0.0],
    [2.0, 0.0, 2.0, -2.0, 2.0, 6.0, 0.0, -3.0, 0.0],
    [1.0, 0.0, 0.0, 2.0, 0.0, 6.0, 0.0, 0.0, 0.0],
    [1.0, 0.0, 2.0, -2.0, 1.0, 6.0, 0.0, -3.0, 0.0],
    [0.0, 0.0, 0.0, -2.0, 1.0, -5.0, 0.0, 3.0, 0.0],
    [0.0, -1.0, 2.0, -2.0, 1.0, -5.0, 0.0, 3.0, 0.0],
    [2.0, 0.0, 2.0, 0.0, 1.0, -5.0, 0.0, 3.0, 0.0],
    [1.0, -1.0, 0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0, -1.0, 0.0, -4.0, 0.0, 0.0, 0.0],
    [0.0, 0.0, 0.0, 1.0, 0.0, -4.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, -2.0, 0.0, -4.0, 0.0, 0.0, 0.0],
    [1.0, 0.0, -2.0, 0.0, 0.0, 4.0, 0.0, 0.0, 0.0],
    [2.0, 0.0, 0.0, -2.0, 1.0, 4.0, 0.0, -2.0, 0.0],
    [0.0, 1.0, 2.0, -2.0, 1.0, 4.0, 0.0, -2.0, 0.0],
    [1.0, 1.0, 0.0, 0.0, 0.0, -3.0, 0.0, 0.0, 0.0],
    [1.0, -1.0, 0.0, -1.0, 0.0, -3.0, 0.0, 0.0, 0.0],
    [-1.0, -1.0, 2.0, 2.0, 2.0, -3.0, 0.0, 1.0, 0.0],
    [0.0, -1.0, 2.0, 2.0, 2.0, -3.0, 0.0, 1.0, 0.0],
    [1.0, -1.0, 2.0, 0.0, 2.0, -3.0, 0.0, 1.0, 0.0],
    [3.0, 0.0, 2.0, 0.0, 2.0, -3.0, 0.0, 1.0, 0.0],
    [-2.0, 0.0, 2.0, 0.0, 2.0, -3.0, 0.0, 1.0, 0.0],
    [1.0, 0.0, 2.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0],
    [-1.0, 0.0, 2.0, 4.0, 2.0, -2.0, 0.0, 1.0, 0.0],
    [1.0, 0.0, 0.0, 0.0, 2.0, -2.0, 0.0, 1.0, 0.0],
    [-1.0, 0.0, 2.0, -2.0, 1.0, -2.0, 0.0, 1.0, 0.0],
    [0.0, -2.0, 2.0, -2.0, 1.0, -2.0, 0.0, 1.0, 0.0],
    [-2.0, 0.0, 0.0, 0.0, 1.0, -2.0, 0.0, 1.0, 0.0],
    [2.0, 0.0, 0.0, 0.0, 1.0, 2.0, 0.0, -1.0, 0.0],
    [3.0, 0.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0],
    [1.0, 1.0, 2.0, 0.0, 2.0, 2.0, 0.0, -1.0, 0.0],
    [0.0, 0.0, 2.0, 1.0, 2.0, 2.0, 0.0, -1.0, 0.0],
    [1.0, 0.0, 0.0, 2.0, 1.0, -1.0, 0.0, 0.0, 0.0],
    [1.0, 0.0, 2.0, 2.0, 1.0, -1.0, 0.0, 1.0, 0.0],
    [1.0, 1.0, 0.0, -2.0, 1.0, -1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 2.0, 0.0, -1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 2.0, -2.0, 0.0, -1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, -2.0, 2.0, 0.0, -1.0, 0.0, 0.0, 0.0],
    [1.0, 0.0, -2.0, 2.0, 0.0, -1.0, 0.0, 0.0, 0.0],
    [1.0, 0.0, -2.0, -2.0, 0.0, -1.0, 0.0, 0.0, 0.0],
    [1.0, 0.0, 2.0, -2.0, 0.0, -1.0, 0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0, -4.0, 0.0, -1.0, 0.0, 0.0, 0.0],
    [2.0, 0.0, 0.0, -4.0, 0.0, -1.0, 0.0, 0.0, 0.0],
    [0.0, 0.0, 2.0, 4.0, 2.0, -1.0, 0.0, 0.0, 0.0],
    [0.0, 0.0, 2.0, -1.0, 2.0, -1.0, 0.0, 0.0, 0.0],
    [-2.0, 0.0, 2.0, 4.0, 2.0, -1.0, 0.0, 1.0, 0.0],
    [2.0, 0.0, 2.0, 2.0, 2.0, -1.0, 0.0, 0.0, 0.0],
    [0.0, -1.0, 2.0, 0.0, 1.0, -1.0, 0.0, 0.0, 0.0],
    [0.0, 0.0, -2.0, 0.0, 1.0, -1.0, 0.0, 0.0, 0.0],
    [0.0, 0.0, 4.0, -2.0, 2.0, 1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0, 2.0, 1.0, 0.0, 0.0, 0.0],
    [1.0, 1.0, 2.0, -2.0, 2.0, 1.0, 0.0, -1.0, 0.0],
    [3.0, 0.0, 2.0, -2.0, 2.0, 1.0, 0.0, 0.0, 0.0],
    [-2.0, 0.0, 2.0, 2.0, 2.0, 1.0, 0.0, -1.0, 0.0],
    [-1.0, 0.0, 0.0, 0.0, 2.0, 1.0, 0.0, -1.0, 0.0],
    [0.0, 0.0, -2.0, 2.0, 1.0, 1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 2.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0],
    [-1.0, 0.0, 4.0, 0.0, 2.0, 1.0, 0.0, 0.0, 0.0],
    [2.0, 1.0, 0.0, -2.0, 0.0, 1.0, 0.0, 0.0, 0.0],
    [2.0, 0.0, 0.0, 2.0, 0.0, 1.0, 0.0, 0.0, 0.0],
    [2.0, 0.0, 2.0, -2.0, 1.0, 1.0, 0.0, -1.0, 0.0],
    [2.0, 0.0, -2.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0],
    [1.0, -1.0, 0.0, -2.0, 0.0, 1.0, 0.0, 0.0, 0.0],
    [-1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0],
    [-1.0, -1.0, 0.0, 2.0, 1.0, 1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0],
];

/// Precession angles (IAU 1980), in radians.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Precession {
    pub zeta: f64,
    pub theta: f64,
    pub zed: f64,
}

impl Precession {
    /// Computes the precession angles from the TDB Julian centuries past J2000.
    pub fn from_tdb_centuries(t: f64) -> Self {
        let zeta = eval_poly(t, &[0.0, 0.640_616_1, 0.000_083_9, 5.0e-6]);
        let theta = eval_poly(t, &[0.0, 0.556_753, -0.000_118_5, -1.16e-5]);
        let zed = eval_poly(t, &[0.0, 0.640_616_1, 0.000_304_1, 5.1e-6]);
        Self {
            zeta: zeta.to_radians(),
            theta: theta.to_radians(),
            zed: zed.to_radians(),
        }
    }

    pub fn at(epoch: &TimeValue) -> Result<Self, TimeError> {
        Self::at_with(epoch, time_data().as_ref())
    }

    pub fn at_with(epoch: &TimeValue, provider: &dyn TimeDataProvider) -> Result<Self, TimeError> {
        let tdb = epoch.to_scale_with(TimeScale::TDB, provider)?;
        Ok(Self::from_tdb_centuries(tdb.julian_centuries()))
    }

    /// Rotation from the inertial frame to the mean-of-date frame.
    pub fn rotation(&self) -> Euler3Axis {
        Euler3Axis::new(
            EulerRotation::R3(-self.zeta),
            EulerRotation::R2(self.theta),
            EulerRotation::R3(-self.zed),
        )
    }
}

/// Nutation in longitude and obliquity, with the mean obliquity of the ecliptic, in radians.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Nutation {
    pub delta_psi: f64,
    pub delta_eps: f64,
    pub mean_eps: f64,
}

impl Nutation {
    /// Evaluates the first `n_terms` of the IAU 1980 series at the TDB Julian centuries past J2000.
    pub fn from_tdb_centuries(t: f64, n_terms: usize) -> Self {
        let r = 360.0;
        let mean_eps = eval_poly(t, &[23.439_291, -0.013_004, -1.64e-7, 5.04e-7]).to_radians();

        // Fundamental arguments, in degrees
        let moon_anom = eval_poly(
            t,
            &[134.963_402_51, 1325.0 * r + 198.867_560_5, 0.008_855_3, 1.4343e-5],
        );
        let moon_lat = eval_poly(
            t,
            &[93.272_090_62, 1342.0 * r + 82.017_457_7, -0.003_542, -2.88e-7],
        );
        let moon_raan = eval_poly(
            t,
            &[125.044_555_01, -(5.0 * r + 134.136_185_1), 0.002_075_6, 2.139e-6],
        );
        let sun_anom = eval_poly(
            t,
            &[357.529_109_18, 99.0 * r + 359.050_291_1, -0.000_153_7, 3.8e-8],
        );
        let moon_elong = eval_poly(
            t,
            &[297.850_195_47, 1236.0 * r + 307.111_446_9, -0.001_769_6, 1.831e-6],
        );

        let mut delta_psi = 0.0;
        let mut delta_eps = 0.0;
        for row in IAU_1980_NUTATION.iter().take(n_terms) {
            let arg = (row[0] * moon_anom
                + row[1] * sun_anom
                + row[2] * moon_lat
                + row[3] * moon_elong
                + row[4] * moon_raan)
                .to_radians();
            delta_psi += (row[5] + row[6] * t) * arg.sin();
            delta_eps += (row[7] + row[8] * t) * arg.cos();
        }

        Self {
            delta_psi: marcsec_to_radians(delta_psi),
            delta_eps: marcsec_to_radians(delta_eps),
            mean_eps,
        }
    }

    pub fn at(epoch: &TimeValue, n_terms: usize) -> Result<Self, TimeError> {
        Self::at_with(epoch, n_terms, time_data().as_ref())
    }

    pub fn at_with(
        epoch: &TimeValue,
        n_terms: usize,
        provider: &dyn TimeDataProvider,
    ) -> Result<Self, TimeError> {
        let tdb = epoch.to_scale_with(TimeScale::TDB, provider)?;
        Ok(Self::from_tdb_centuries(tdb.julian_centuries(), n_terms))
    }

    /// True obliquity of the ecliptic
    pub fn true_obliquity(&self) -> f64 {
        self.mean_eps + self.delta_eps
    }

    pub fn equation_of_equinoxes(&self) -> f64 {
        self.delta_psi * self.true_obliquity().cos()
    }

    /// Rotation from the mean-of-date frame to the true-of-date frame.
    pub fn rotation(&self) -> Euler3Axis {
        Euler3Axis::new(
            EulerRotation::R1(self.mean_eps),
            EulerRotation::R3(-self.delta_psi),
            EulerRotation::R1(-self.true_obliquity()),
        )
    }
}

/// Earth rotation vector at the provided epoch, in rad/s. Length of day variations are not modeled.
pub fn earth_rotation(_epoch: &TimeValue) -> Vector3<f64> {
    Vector3::new(0.0, 0.0, EARTH_ROTATION_RATE)
}

/// Full orientation of the Earth at an epoch: everything needed to rotate between the
/// inertial (ICRF) and the Earth fixed (ITRF) frames.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EarthOrientation {
    pub precession: Precession,
    pub nutation: Nutation,
    /// Greenwich mean sidereal time, in radians
    pub gmst: f64,
    pub eop: EopParams,
    pub rotation: Vector3<f64>,
}

impl EarthOrientation {
    /// Computes the orientation using the process-wide time data.
    pub fn at(epoch: &TimeValue) -> Result<Self, TimeError> {
        Self::at_with(epoch, time_data().as_ref())
    }

    pub fn at_with(epoch: &TimeValue, provider: &dyn TimeDataProvider) -> Result<Self, TimeError> {
        let utc = epoch.to_scale_with(TimeScale::UTC, provider)?;
        Ok(Self {
            precession: Precession::at_with(&utc, provider)?,
            nutation: Nutation::at_with(&utc, IAU_1980_TERMS, provider)?,
            gmst: utc.gmst_angle_with(provider)?,
            eop: provider.earth_orientation(utc.mjd())?,
            rotation: earth_rotation(&utc),
        })
    }

    /// Greenwich apparent sidereal angle, i.e. GMST corrected by the equation of the equinoxes.
    pub fn apparent_sidereal_angle(&self) -> f64 {
        self.gmst + self.nutation.equation_of_equinoxes()
    }

    /// Rotation from the pseudo Earth fixed frame to the Earth fixed frame.
    pub fn polar_motion(&self) -> Euler3Axis {
        Euler3Axis::new(
            EulerRotation::R1(-self.eop.pm_y),
            EulerRotation::R2(-self.eop.pm_x),
            EulerRotation::R3(0.0),
        )
    }

    /// Rotates an inertial position and velocity into the Earth fixed frame.
    pub fn inertial_to_fixed(
        &self,
        position: &Vector3<f64>,
        velocity: &Vector3<f64>,
    ) -> (Vector3<f64>, Vector3<f64>) {
        let to_tod = self.nutation.rotation().dcm() * self.precession.rotation().dcm();
        let r_tod = to_tod * position;
        let v_tod = to_tod * velocity;

        let sidereal = EulerRotation::R3(self.apparent_sidereal_angle());
        let r_pef = sidereal.rotate(&r_tod);
        let v_pef = sidereal.rotate(&v_tod) + (-self.rotation).cross(&r_pef);

        let pm = self.polar_motion().dcm();
        (pm * r_pef, pm * v_pef)
    }

    /// Rotates an Earth fixed position and velocity into the inertial frame, exactly undoing
    /// [EarthOrientation::inertial_to_fixed].
    pub fn fixed_to_inertial(
        &self,
        position: &Vector3<f64>,
        velocity: &Vector3<f64>,
    ) -> (Vector3<f64>, Vector3<f64>) {
        let pm = self.polar_motion().inverse().dcm();
        let r_pef = pm * position;
        let v_pef = pm * velocity;

        let sidereal = EulerRotation::R3(-self.apparent_sidereal_angle());
        let r_tod = sidereal.rotate(&r_pef);
        let v_tod = sidereal.rotate(&(v_pef + self.rotation.cross(&r_pef)));

        let to_icrf =
            self.precession.rotation().inverse().dcm() * self.nutation.rotation().inverse().dcm();
        (to_icrf * r_tod, to_icrf * v_tod)
    }
}

impl fmt::Display for EarthOrientation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[EarthOrientation] {{ zeta: {:.6e}, theta: {:.6e}, zed: {:.6e}, dpsi: {:.6e}, deps: {:.6e}, eps: {:.9}, gmst: {:.9} }}",
            self.precession.zeta,
            self.precession.theta,
            self.precession.zed,
            self.nutation.delta_psi,
            self.nutation.delta_eps,
            self.nutation.mean_eps,
            self.gmst
        )
    }
}
