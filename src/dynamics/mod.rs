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

use crate::cosmic::{AstroError, BodyStateProvider, CartesianState};
use crate::linalg::{Vector3, Vector6};
use snafu::Snafu;
use std::fmt;

/// Point mass, third body and J2 gravity.
pub mod gravity;
pub use self::gravity::*;

/// Atmospheric drag models.
pub mod drag;
pub use self::drag::*;

/// Composition of the gravity sources and drag acting on a spacecraft.
pub mod force_model;
pub use self::force_model::*;

/// A trait for models with equations of motion that can be integrated.
///
/// The integrated vector is the position (m) and velocity (m/s) of an inertial state.
pub trait Dynamics: Send + Sync {
    /// Defines the equations of motion.
    ///
    /// - `delta_t`: Time in seconds past the context epoch.
    /// - `state_vec`: The state vector, which changes at each integration step.
    /// - `state_ctx`: The state context, used to rebuild the state from the state vector.
    fn eom(
        &self,
        delta_t: f64,
        state_vec: &Vector6<f64>,
        state_ctx: &CartesianState,
    ) -> Result<Vector6<f64>, DynamicsError>;

    /// Performs final changes after each successful integration step.
    fn finally(&self, next_state: CartesianState) -> Result<CartesianState, DynamicsError> {
        Ok(next_state)
    }
}

/// A trait for immutable dynamics that return an acceleration (e.g. gravity or drag).
pub trait AccelModel: Send + Sync + fmt::Display {
    /// Returns the acceleration, in m/s^2, acting on the provided osculating state.
    fn eom(
        &self,
        osc: &CartesianState,
        provider: &dyn BodyStateProvider,
    ) -> Result<Vector3<f64>, DynamicsError>;
}

/// Dynamical model errors.
#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DynamicsError {
    /// Astrodynamics error.
    #[snafu(display("dynamical model encountered an astro error: {source}"))]
    DynamicsAstro { source: AstroError },
    #[snafu(display("{model} produced a non finite acceleration at {epoch}"))]
    NonFiniteAccel { model: String, epoch: String },
}
