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

use crate::linalg::Matrix3;
use std::f64::consts::{PI, TAU};

/// Evaluates the polynomial with the provided coefficients (constant term first) at `x` using Horner's method.
pub fn eval_poly(x: f64, coeffs: &[f64]) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Converts ten-thousandths of an arcsecond into radians.
pub fn marcsec_to_radians(value: f64) -> f64 {
    (value / 3600.0 / 10_000.0).to_radians()
}

/// Converts arcseconds into radians.
pub fn arcsec_to_radians(value: f64) -> f64 {
    (value / 3600.0).to_radians()
}

/// Signed angular distance from `reference` to `angle`, in ]-pi; pi].
pub fn signed_angle_diff(angle: f64, reference: f64) -> f64 {
    (angle - reference).sin().atan2((angle - reference).cos())
}

/// Returns either `angle` or `2*pi - angle`, whichever lies closest to `reference`.
///
/// Closed form anomaly conversions through `acos` only return values in [0; pi], so the
/// half plane is recovered from a reference anomaly which is known to be in the same half plane.
pub fn match_half_plane(angle: f64, reference: f64) -> f64 {
    let mirrored = TAU - angle;
    if signed_angle_diff(angle, reference).abs() < signed_angle_diff(mirrored, reference).abs() {
        angle
    } else {
        mirrored
    }
}

/// Returns the provided angle bounded between 0.0 and 2*pi (radians)
pub fn between_0_tau(angle: f64) -> f64 {
    angle.rem_euclid(TAU)
}

/// Returns the provided angle bounded between -pi and pi (radians)
pub fn between_pm_pi(angle: f64) -> f64 {
    let bounded = between_0_tau(angle);
    if bounded > PI {
        bounded - TAU
    } else {
        bounded
    }
}

/// Returns a passive rotation matrix about the X axis.
pub fn r1(angle_rad: f64) -> Matrix3<f64> {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(1.0, 0.0, 0.0, 0.0, c, s, 0.0, -s, c)
}

/// Returns a passive rotation matrix about the Y axis.
pub fn r2(angle_rad: f64) -> Matrix3<f64> {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(c, 0.0, -s, 0.0, 1.0, 0.0, s, 0.0, c)
}

/// Returns a passive rotation matrix about the Z axis.
pub fn r3(angle_rad: f64) -> Matrix3<f64> {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0)
}

/// Checks whether the provided rotation matrix is a proper rotation (orthonormal with a unit determinant).
pub fn is_rotation(m: &Matrix3<f64>) -> bool {
    let esp = 1e-12;
    (m * m.transpose() - Matrix3::identity()).norm() < esp && (m.determinant() - 1.0).abs() < esp
}
