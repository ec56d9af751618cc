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

use snafu::prelude::*;
use std::fmt;

// Re-Export
mod instance;
pub use instance::*;
mod propagator;
pub use propagator::*;
mod rk_methods;
pub use rk_methods::*;
mod options;
pub use options::*;
mod kepler;
pub use kepler::*;
mod interpolated;
pub use interpolated::*;

use crate::cosmic::{AstroError, CartesianState};
use crate::dynamics::DynamicsError;
use crate::md::trajectory::{TrajError, Trajectory};
use crate::time::{Duration, TimeValue};

/// Two epochs closer than this, in seconds, are considered equal when stepping.
pub const EPOCH_TOLERANCE_S: f64 = 1e-9;

/// Stores the details of the previous integration step of a given propagator. Access as `my_prop.clone().latest_details()`.
#[derive(Copy, Clone, Debug)]
pub struct IntegrationDetails {
    /// step size used
    pub step: Duration,
    /// number of steps taken since the instance was created
    pub steps: usize,
}

impl fmt::Display for IntegrationDetails {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "IntegrationDetails {{step: {}, steps: {}}}",
            self.step, self.steps
        )
    }
}

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PropagationError {
    #[snafu(display("encountered a dynamics error {source}"))]
    Dynamics { source: DynamicsError },
    #[snafu(display("propagation failed because {source}"))]
    PropAstro { source: AstroError },
    #[snafu(display("propagation failed on the trajectory: {source}"))]
    PropTraj { source: TrajError },
    #[snafu(display("step size must be strictly positive, got {step_s} s"))]
    InvalidStep { step_s: f64 },
    #[snafu(display("propagation cancelled at {epoch}"))]
    Cancelled { epoch: String },
}

/// Capability shared by all propagators: provide the state at any epoch, or a sampled trajectory.
pub trait StatePropagator {
    /// Latest computed state
    fn state(&self) -> CartesianState;

    /// Returns the state at the requested epoch.
    fn propagate(&mut self, epoch: &TimeValue) -> Result<CartesianState, PropagationError>;

    /// Builds a trajectory of the states from `start` to `stop` (included if reached), every `interval`.
    ///
    /// The trajectory is empty if `stop` is before `start`.
    fn step(
        &mut self,
        start: &TimeValue,
        stop: &TimeValue,
        interval: Duration,
    ) -> Result<Trajectory, PropagationError> {
        let interval_s = interval.to_seconds();
        if interval_s <= 0.0 || !interval_s.is_finite() {
            return Err(PropagationError::InvalidStep { step_s: interval_s });
        }

        let mut traj = Trajectory::new(*start, self.state().central_body);
        for i in 0.. {
            // Computed from the start to avoid accumulating rounding errors
            let epoch = start.increment(i as f64 * interval_s);
            if stop.difference(&epoch) < -EPOCH_TOLERANCE_S {
                break;
            }
            traj.push(self.propagate(&epoch)?);
        }
        Ok(traj)
    }
}
