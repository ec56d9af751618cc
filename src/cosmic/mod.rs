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

use crate::md::trajectory::TrajError;
use crate::time::TimeError;
use serde_derive::{Deserialize, Serialize};
use snafu::prelude::*;
use std::fmt;

mod bodies;
pub use self::bodies::*;

mod body_state;
pub use self::body_state::*;

/// Precession, nutation, sidereal rotation and polar motion of the Earth.
pub mod earth_orientation;
pub use self::earth_orientation::EarthOrientation;

mod elements;
pub use self::elements::*;

mod orbit;
pub use self::orbit::*;

mod rotations;
pub use self::rotations::*;

/// The kind of frame a state is expressed in.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frame {
    /// Quasi-inertial frame (ICRF, J2000), centered on the central body
    #[default]
    Inertial,
    /// Frame rotating with the central body (ITRF for the Earth)
    BodyFixed,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Inertial => write!(f, "ICRF"),
            Self::BodyFixed => write!(f, "ITRF"),
        }
    }
}

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AstroError {
    #[snafu(display("no celestial body with NAIF ID {id}"))]
    UnknownBodyId { id: i32 },
    #[snafu(display("celestial body `{name}` is not defined"))]
    UnknownBodyName { name: String },
    #[snafu(display("time conversion failed during astro computation: {source}"))]
    AstroTime { source: TimeError },
    #[snafu(display("body fixed frame is only modeled for the Earth, not {body}"))]
    UnsupportedBodyFixed { body: &'static str },
    #[snafu(display("operation requires a state in {expected} but it is in {got}"))]
    FrameMismatch { expected: Frame, got: Frame },
    #[snafu(display("propagation of body {body} failed: {source}"))]
    BodyState {
        body: &'static str,
        #[snafu(source(from(TrajError, Box::new)))]
        source: Box<TrajError>,
    },
    #[snafu(display("analytic propagation requires an elliptical orbit but eccentricity is {ecc}"))]
    NonElliptical { ecc: f64 },
    #[snafu(display("no ephemeris available for {body}"))]
    NoEphemeris { body: &'static str },
    #[snafu(display(
        "recursion limit of {depth} reached while resolving the heliocentric state of {body}"
    ))]
    RecursionLimit { body: &'static str, depth: usize },
}
