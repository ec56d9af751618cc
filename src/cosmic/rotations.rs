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

use crate::linalg::{Matrix3, Vector3};
use crate::utils::{r1, r2, r3};

/// Defines an Euler rotation, angle must be in radians
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EulerRotation {
    R1(f64),
    R2(f64),
    R3(f64),
}

impl EulerRotation {
    pub fn r1_from_degrees(angle_deg: f64) -> Self {
        Self::R1(angle_deg.to_radians())
    }
    pub fn r2_from_degrees(angle_deg: f64) -> Self {
        Self::R2(angle_deg.to_radians())
    }
    pub fn r3_from_degrees(angle_deg: f64) -> Self {
        Self::R3(angle_deg.to_radians())
    }

    /// Get the DCM from this Euler rotation
    pub fn dcm(&self) -> Matrix3<f64> {
        match *self {
            Self::R1(angle) => r1(angle),
            Self::R2(angle) => r2(angle),
            Self::R3(angle) => r3(angle),
        }
    }

    /// Same axis, opposite angle
    pub fn inverse(&self) -> Self {
        match *self {
            Self::R1(angle) => Self::R1(-angle),
            Self::R2(angle) => Self::R2(-angle),
            Self::R3(angle) => Self::R3(-angle),
        }
    }

    pub fn rotate(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.dcm() * v
    }
}

/// A fixed three-axis Euler rotation, applied first to last.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Euler3Axis {
    /// The first rotation (e.g. R3)
    pub first: EulerRotation,
    /// The second rotation (e.g. R1)
    pub second: EulerRotation,
    /// The third and final rotation (e.g. R3, to complete a 3-1-3 rotation)
    pub third: EulerRotation,
}

impl Euler3Axis {
    pub fn new(first: EulerRotation, second: EulerRotation, third: EulerRotation) -> Self {
        Self {
            first,
            second,
            third,
        }
    }

    pub fn dcm(&self) -> Matrix3<f64> {
        self.third.dcm() * self.second.dcm() * self.first.dcm()
    }

    /// The rotation undoing this one: same angles, opposite signs, reverse order.
    pub fn inverse(&self) -> Self {
        Self {
            first: self.third.inverse(),
            second: self.second.inverse(),
            third: self.first.inverse(),
        }
    }

    pub fn rotate(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.dcm() * v
    }
}
