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

use super::{TrajAstroSnafu, TrajError};
use crate::cosmic::{CartesianState, CelestialBody, KeplerianElements, SUN};
use crate::time::TimeValue;
use snafu::ResultExt;
use std::fmt;

/// An ordered, time-tagged table of inertial states about a single central body.
///
/// States must be supplied in chronological order, this is not checked.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    pub states: Vec<CartesianState>,
    /// Reference epoch: state times are serialized as offsets from this epoch
    pub epoch: TimeValue,
    pub central_body: CelestialBody,
}

impl Default for Trajectory {
    fn default() -> Self {
        Self::new(TimeValue::j2000(), SUN)
    }
}

impl Trajectory {
    /// Creates an empty trajectory
    pub fn new(epoch: TimeValue, central_body: CelestialBody) -> Self {
        Self {
            states: Vec::new(),
            epoch,
            central_body,
        }
    }

    pub fn from_states(
        states: Vec<CartesianState>,
        epoch: TimeValue,
        central_body: CelestialBody,
    ) -> Self {
        Self {
            states,
            epoch,
            central_body,
        }
    }

    /// Appends a state, which must be later than all of the existing ones.
    pub fn push(&mut self, state: CartesianState) {
        self.states.push(state);
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Returns the first state in this ephemeris
    pub fn first(&self) -> Option<&CartesianState> {
        self.states.first()
    }

    /// Returns the last state in this ephemeris
    pub fn last(&self) -> Option<&CartesianState> {
        self.states.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CartesianState> {
        self.states.iter()
    }

    /// Estimates the state at the requested epoch.
    ///
    /// Requests outside of the covered span return the boundary state. Otherwise, an anchor state
    /// is picked in proportion of the elapsed time over the span (exact for evenly spaced states),
    /// and its osculating elements are propagated to the requested epoch with two-body motion.
    /// The accuracy therefore degrades as the sampling gets sparser relative to the perturbations
    /// which were present when the trajectory was generated.
    pub fn interpolate(&self, epoch: &TimeValue) -> Result<CartesianState, TrajError> {
        let (first, last) = match (self.states.first(), self.states.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(TrajError::NoStates),
        };

        if *epoch >= last.epoch {
            return Ok(*last);
        } else if *epoch <= first.epoch {
            return Ok(*first);
        }

        let fraction = epoch.difference(&first.epoch) / last.epoch.difference(&first.epoch);
        let idx = ((fraction * (self.states.len() - 1) as f64).floor() as usize)
            .min(self.states.len() - 1);
        let anchor = &self.states[idx];

        Ok(KeplerianElements::from_cartesian(anchor)
            .context(TrajAstroSnafu)?
            .elements()
            .propagate(epoch)
            .context(TrajAstroSnafu)?
            .to_cartesian())
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a CartesianState;
    type IntoIter = std::slice::Iter<'a, CartesianState>;

    fn into_iter(self) -> Self::IntoIter {
        self.states.iter()
    }
}

impl fmt::Display for Trajectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[Ephemeris] {{ Epoch: {}, Number of states: {}, Central body: {} }}",
            self.epoch.to_iso(),
            self.states.len(),
            self.central_body.name
        )
    }
}
