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

use super::{PropAstroSnafu, PropagationError, StatePropagator};
use crate::cosmic::{CartesianState, KeplerianElements};
use crate::time::TimeValue;
use snafu::ResultExt;

/// Analytic two-body propagator: the osculating elements of the initial state are propagated
/// with Kepler's equation.
#[derive(Copy, Clone, Debug)]
pub struct KeplerPropagator {
    pub elements: KeplerianElements,
    state: CartesianState,
}

impl KeplerPropagator {
    /// Initializes the propagator from an inertial state.
    pub fn new(state: CartesianState) -> Result<Self, PropagationError> {
        let elements = KeplerianElements::from_cartesian(&state)
            .context(PropAstroSnafu)?
            .elements();
        Ok(Self { elements, state })
    }

    pub fn from_elements(elements: KeplerianElements) -> Self {
        Self {
            elements,
            state: elements.to_cartesian(),
        }
    }
}

impl StatePropagator for KeplerPropagator {
    fn state(&self) -> CartesianState {
        self.state
    }

    fn propagate(&mut self, epoch: &TimeValue) -> Result<CartesianState, PropagationError> {
        self.state = self
            .elements
            .propagate(epoch)
            .context(PropAstroSnafu)?
            .to_cartesian();
        Ok(self.state)
    }
}

#[cfg(test)]
mod ut_kepler {
    use super::*;
    use crate::cosmic::EARTH;
    use crate::time::Unit;
    use approx::assert_relative_eq;

    #[test]
    fn test_kepler_step() {
        let elements = KeplerianElements::from_degrees(
            EARTH,
            TimeValue::j2000(),
            7_200_000.0,
            0.01,
            51.6,
            120.0,
            90.0,
            0.0,
        );
        let mut prop = KeplerPropagator::from_elements(elements);
        let period = elements.period();
        let start = elements.epoch;
        let stop = start.increment(period);
        let traj = prop.step(&start, &stop, (period / 10.0) * Unit::Second).unwrap();
        assert_eq!(traj.len(), 11);
        assert_eq!(traj.central_body, EARTH);
        let first = traj.first().unwrap();
        let last = traj.last().unwrap();
        for i in 0..3 {
            assert_relative_eq!(last.position[i], first.position[i], epsilon = 1e-3, max_relative = 1e-8);
        }
        assert!(prop.step(&start, &stop, 0.0 * Unit::Second).is_err());
    }
}
