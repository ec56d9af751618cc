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

use crate::cosmic::AstroError;
use crate::time::TimeError;
use snafu::prelude::*;

mod stk;
mod traj;

pub use stk::{STK_VERSION, STK_WRITER};
pub use traj::Trajectory;

#[derive(PartialEq, Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TrajError {
    #[snafu(display("trajectory has no states"))]
    NoStates,
    #[snafu(display("could not access {path}: {details}"))]
    Io { path: String, details: String },
    #[snafu(display("{path}:{line}: {details}"))]
    Parse {
        path: String,
        line: usize,
        details: String,
    },
    #[snafu(display("{path}: missing `{keyword}` header"))]
    MissingHeader {
        path: String,
        keyword: &'static str,
    },
    #[snafu(display("{path}: expected {expected} ephemeris points but found {found}"))]
    PointCount {
        path: String,
        expected: usize,
        found: usize,
    },
    #[snafu(display("trajectory interpolation failed: {source}"))]
    TrajAstro { source: AstroError },
    #[snafu(display("trajectory epoch handling failed: {source}"))]
    TrajTime { source: TimeError },
}
