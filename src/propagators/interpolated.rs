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

use super::{PropTrajSnafu, PropagationError, StatePropagator};
use crate::cosmic::CartesianState;
use crate::md::trajectory::{TrajError, Trajectory};
use crate::time::TimeValue;
use snafu::ResultExt;
use std::sync::Arc;

/// Propagator reading the states off an existing trajectory, cf. [Trajectory::interpolate].
#[derive(Clone, Debug)]
pub struct InterpolatedPropagator {
    pub trajectory: Arc<Trajectory>,
    state: CartesianState,
}

impl InterpolatedPropagator {
    /// Initializes the propagator on the first state of the trajectory, which must not be empty.
    pub fn new(trajectory: Arc<Trajectory>) -> Result<Self, PropagationError> {
        let state = *trajectory
            .first()
            .ok_or(TrajError::NoStates)
            .context(PropTrajSnafu)?;
        Ok(Self { trajectory, state })
    }
}

impl StatePropagator for InterpolatedPropagator {
    fn state(&self) -> CartesianState {
        self.state
    }

    fn propagate(&mut self, epoch: &TimeValue) -> Result<CartesianState, PropagationError> {
        self.state = self.trajectory.interpolate(epoch).context(PropTrajSnafu)?;
        Ok(self.state)
    }
}

#[cfg(test)]
mod ut_interpolated {
    use super::*;
    use crate::cosmic::EARTH;
    use crate::linalg::Vector3;
    use crate::time::Unit;

    #[test]
    fn test_interpolated() {
        assert_eq!(
            InterpolatedPropagator::new(Arc::new(Trajectory::new(TimeValue::j2000(), EARTH)))
                .unwrap_err(),
            PropagationError::PropTraj {
                source: TrajError::NoStates
            }
        );

        let epoch = TimeValue::j2000();
        let state = CartesianState::inertial(
            EARTH,
            epoch,
            Vector3::new(7e6, 0.0, 0.0),
            Vector3::new(0.0, 7.5e3, 0.0),
        );
        let traj = Trajectory::from_states(vec![state], epoch, EARTH);
        let mut prop = InterpolatedPropagator::new(Arc::new(traj)).unwrap();
        assert_eq!(prop.state(), state);
        // Clamped onto the single state
        let resampled = prop
            .step(&epoch, &epoch.increment(120.0), 60.0 * Unit::Second)
            .unwrap();
        assert_eq!(resampled.len(), 3);
        assert!(resampled.iter().all(|s| *s == state));
    }
}
