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
use crate::dynamics::DynamicsError;
use crate::io::ConfigError;
use crate::md::trajectory::TrajError;
use crate::propagators::PropagationError;
use crate::time::TimeError;
use snafu::prelude::*;

/// Any error which may happen while running a propagation end to end.
#[derive(Debug, PartialEq, Snafu)]
pub enum ArcError {
    #[snafu(context(false), display("time error: {source}"))]
    Time { source: TimeError },
    #[snafu(context(false), display("astro error: {source}"))]
    Astro { source: AstroError },
    #[snafu(context(false), display("dynamics error: {source}"))]
    Dynamics { source: DynamicsError },
    #[snafu(context(false), display("propagation error: {source}"))]
    Propagation { source: PropagationError },
    #[snafu(context(false), display("ephemeris error: {source}"))]
    Trajectory { source: TrajError },
    #[snafu(context(false), display("{source}"))]
    Config { source: ConfigError },
}
