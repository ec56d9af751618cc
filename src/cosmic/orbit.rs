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

use super::earth_orientation::EarthOrientation;
use super::{AstroError, AstroTimeSnafu, CelestialBody, Frame, EARTH};
use crate::linalg::{Vector3, Vector6};
use crate::time::{TimeDataProvider, TimeValue};
use snafu::ResultExt;
use std::fmt;
use std::ops::{Add, Neg, Sub};

/// Position and velocity of an object about a central body, at an epoch, in a given frame.
///
/// Positions are in meters and velocities in meters per second. States are values: every
/// conversion returns a new state.
#[derive(Copy, Clone, Debug)]
pub struct CartesianState {
    pub central_body: CelestialBody,
    pub epoch: TimeValue,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub frame: Frame,
}

impl CartesianState {
    pub fn new(
        central_body: CelestialBody,
        epoch: TimeValue,
        position: Vector3<f64>,
        velocity: Vector3<f64>,
        frame: Frame,
    ) -> Self {
        Self {
            central_body,
            epoch,
            position,
            velocity,
            frame,
        }
    }

    /// Creates a new state in the inertial frame of the central body (ICRF).
    pub fn inertial(
        central_body: CelestialBody,
        epoch: TimeValue,
        position: Vector3<f64>,
        velocity: Vector3<f64>,
    ) -> Self {
        Self::new(central_body, epoch, position, velocity, Frame::Inertial)
    }

    /// Creates a new state in the body fixed frame of the central body (ITRF for the Earth).
    pub fn body_fixed(
        central_body: CelestialBody,
        epoch: TimeValue,
        position: Vector3<f64>,
        velocity: Vector3<f64>,
    ) -> Self {
        Self::new(central_body, epoch, position, velocity, Frame::BodyFixed)
    }

    /// Creates a new state from its position and velocity stacked in a six-vector.
    pub fn from_vector(
        central_body: CelestialBody,
        epoch: TimeValue,
        pos_vel: &Vector6<f64>,
        frame: Frame,
    ) -> Self {
        Self::new(
            central_body,
            epoch,
            pos_vel.fixed_rows::<3>(0).into_owned(),
            pos_vel.fixed_rows::<3>(3).into_owned(),
            frame,
        )
    }

    /// Returns the position and velocity stacked in a six-vector.
    pub fn to_vector(&self) -> Vector6<f64> {
        Vector6::new(
            self.position.x,
            self.position.y,
            self.position.z,
            self.velocity.x,
            self.velocity.y,
            self.velocity.z,
        )
    }

    /// Builds a trial state `delta_t_s` seconds after this one, from the provided six-vector.
    pub fn with_state_vector(&self, delta_t_s: f64, pos_vel: &Vector6<f64>) -> Self {
        Self::from_vector(
            self.central_body,
            self.epoch.increment(delta_t_s),
            pos_vel,
            self.frame,
        )
    }

    /// Copies this state with the provided epoch.
    pub fn with_epoch(&self, epoch: TimeValue) -> Self {
        let mut me = *self;
        me.epoch = epoch;
        me
    }

    /// Returns the position of `self` relative to the provided origin.
    pub fn change_origin(&self, origin: &Vector3<f64>) -> Vector3<f64> {
        self.position - origin
    }

    pub fn rmag(&self) -> f64 {
        self.position.norm()
    }

    pub fn vmag(&self) -> f64 {
        self.velocity.norm()
    }

    /// Specific angular momentum vector, in m^2/s
    pub fn hvec(&self) -> Vector3<f64> {
        self.position.cross(&self.velocity)
    }

    /// Specific orbital energy, in m^2/s^2
    pub fn energy(&self) -> f64 {
        self.vmag().powi(2) / 2.0 - self.central_body.mu / self.rmag()
    }

    /// Eccentricity vector
    pub fn evec(&self) -> Vector3<f64> {
        let mu = self.central_body.mu;
        ((self.vmag().powi(2) - mu / self.rmag()) * self.position
            - self.position.dot(&self.velocity) * self.velocity)
            / mu
    }

    /// Converts an inertial state of the Earth into the Earth fixed frame using the process-wide time data.
    /// A state already in the body fixed frame is returned unchanged.
    pub fn to_body_fixed(&self) -> Result<Self, AstroError> {
        match self.frame {
            Frame::BodyFixed => Ok(*self),
            Frame::Inertial => {
                self.ensure_earth()?;
                let orientation = EarthOrientation::at(&self.epoch).context(AstroTimeSnafu)?;
                Ok(self.rotate_to_body_fixed(&orientation))
            }
        }
    }

    /// Converts a body fixed state of the Earth into the inertial frame using the process-wide time data.
    /// A state already in the inertial frame is returned unchanged.
    pub fn to_inertial(&self) -> Result<Self, AstroError> {
        match self.frame {
            Frame::Inertial => Ok(*self),
            Frame::BodyFixed => {
                self.ensure_earth()?;
                let orientation = EarthOrientation::at(&self.epoch).context(AstroTimeSnafu)?;
                Ok(self.rotate_to_inertial(&orientation))
            }
        }
    }

    /// Same as [CartesianState::to_body_fixed] with explicit time data.
    pub fn to_body_fixed_with(&self, provider: &dyn TimeDataProvider) -> Result<Self, AstroError> {
        match self.frame {
            Frame::BodyFixed => Ok(*self),
            Frame::Inertial => {
                self.ensure_earth()?;
                let orientation =
                    EarthOrientation::at_with(&self.epoch, provider).context(AstroTimeSnafu)?;
                Ok(self.rotate_to_body_fixed(&orientation))
            }
        }
    }

    /// Same as [CartesianState::to_inertial] with explicit time data.
    pub fn to_inertial_with(&self, provider: &dyn TimeDataProvider) -> Result<Self, AstroError> {
        match self.frame {
            Frame::Inertial => Ok(*self),
            Frame::BodyFixed => {
                self.ensure_earth()?;
                let orientation =
                    EarthOrientation::at_with(&self.epoch, provider).context(AstroTimeSnafu)?;
                Ok(self.rotate_to_inertial(&orientation))
            }
        }
    }

    fn rotate_to_body_fixed(&self, orientation: &EarthOrientation) -> Self {
        let (position, velocity) = orientation.inertial_to_fixed(&self.position, &self.velocity);
        Self::body_fixed(self.central_body, self.epoch, position, velocity)
    }

    fn rotate_to_inertial(&self, orientation: &EarthOrientation) -> Self {
        let (position, velocity) = orientation.fixed_to_inertial(&self.position, &self.velocity);
        Self::inertial(self.central_body, self.epoch, position, velocity)
    }

    fn ensure_earth(&self) -> Result<(), AstroError> {
        if self.central_body.id == EARTH.id {
            Ok(())
        } else {
            Err(AstroError::UnsupportedBodyFixed {
                body: self.central_body.name,
            })
        }
    }

    pub(crate) fn ensure_inertial(&self) -> Result<(), AstroError> {
        if self.frame == Frame::Inertial {
            Ok(())
        } else {
            Err(AstroError::FrameMismatch {
                expected: Frame::Inertial,
                got: self.frame,
            })
        }
    }

    /// Returns whether both states match in epoch, central body and frame, and their
    /// position (m) and velocity (m/s) components are within the provided tolerances.
    pub fn eq_within(&self, other: &Self, position_tol: f64, velocity_tol: f64) -> bool {
        self.epoch == other.epoch
            && self.central_body.id == other.central_body.id
            && self.frame == other.frame
            && (self.position - other.position).amax() < position_tol
            && (self.velocity - other.velocity).amax() < velocity_tol
    }
}

impl PartialEq for CartesianState {
    /// Two states are equal if their position are within one micrometer and velocities within one nanometer per second.
    fn eq(&self, other: &Self) -> bool {
        self.eq_within(other, 1e-6, 1e-9)
    }
}

impl Add for CartesianState {
    type Output = Self;

    /// Adds both states' vectors, keeping the metadata of `self`.
    fn add(self, other: Self) -> Self {
        Self::new(
            self.central_body,
            self.epoch,
            self.position + other.position,
            self.velocity + other.velocity,
            self.frame,
        )
    }
}

impl Sub for CartesianState {
    type Output = Self;

    /// Subtracts both states' vectors, keeping the metadata of `self`.
    fn sub(self, other: Self) -> Self {
        Self::new(
            self.central_body,
            self.epoch,
            self.position - other.position,
            self.velocity - other.velocity,
            self.frame,
        )
    }
}

impl Neg for CartesianState {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(
            self.central_body,
            self.epoch,
            -self.position,
            -self.velocity,
            self.frame,
        )
    }
}

impl fmt::Display for CartesianState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "[{}]", self.frame)?;
        writeln!(f, " Central Body: {}", self.central_body)?;
        writeln!(f, " Epoch: {}", self.epoch)?;
        writeln!(
            f,
            " Position: [{}, {}, {}] m",
            self.position.x, self.position.y, self.position.z
        )?;
        write!(
            f,
            " Velocity: [{}, {}, {}] m/s",
            self.velocity.x, self.velocity.y, self.velocity.z
        )
    }
}

#[allow(clippy::format_in_format_args)]
impl fmt::LowerExp for CartesianState {
    // Prints as Cartesian in scientific notation with units
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let decimals = f.precision().unwrap_or(6);
        write!(
            f,
            "[{} {}] {}\tposition = [{}, {}, {}] m\tvelocity = [{}, {}, {}] m/s",
            self.central_body.name,
            self.frame,
            self.epoch.to_iso(),
            format!("{:.*e}", decimals, self.position.x),
            format!("{:.*e}", decimals, self.position.y),
            format!("{:.*e}", decimals, self.position.z),
            format!("{:.*e}", decimals, self.velocity.x),
            format!("{:.*e}", decimals, self.velocity.y),
            format!("{:.*e}", decimals, self.velocity.z)
        )
    }
}
