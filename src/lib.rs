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

/*! # arcprop

Orbit propagation engine: multi-scale time values, IAU-1980 Earth reference frames, Keplerian and
fixed step Runge Kutta propagators, planetary body states, and STK ephemeris files.
*/

/// Time scales (UTC, UT1, TAI, TT, TDB), leap second and Earth orientation tables.
pub mod time;

/// Provides the Keplerian and fixed step Runge Kutta propagators.
pub mod propagators;

/// Gravity and drag accelerations, combined into a force model.
pub mod dynamics;

/// Provides the solar system bodies, reference frames, orbital states, and body state management.
pub mod cosmic;

/// Utility functions shared by different modules, and which may be useful to engineers.
pub mod utils;

mod errors;
/// Functions which may fail return an error, and the run-level errors are collected here.
pub use self::errors::ArcError;

/// YAML run configuration.
pub mod io;

/// Ephemerides, their interpolation, and their STK representation.
pub mod md;

#[macro_use]
extern crate log;
#[macro_use]
extern crate lazy_static;
extern crate nalgebra as na;

/// Re-export nalgebra
pub mod linalg {
    pub use na::base::*;
}

pub use self::cosmic::{CartesianState, CelestialBody, Frame, KeplerianElements};
pub use self::md::Trajectory;
pub use self::time::{TimeScale, TimeValue};
