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

use super::{IntegrationDetails, PropInstance, PropOpts, RK4Fixed, RK};
use crate::cosmic::CartesianState;
use crate::dynamics::Dynamics;
use crate::linalg::Vector6;

/// A Propagator allows propagating a set of dynamics forward or backward in time.
/// It includes the options and the set of coefficients used for the monomorphic instance.
#[derive(Clone, Debug)]
pub struct Propagator<D: Dynamics> {
    pub dynamics: D, // Stores the dynamics used. *Must* use this to get the latest values
    pub opts: PropOpts, // Stores the integration options (step size and cancellation flag)
    order: u8,          // Order of the integrator
    stages: usize,      // Number of stages, i.e. how many times the derivatives will be called
    a_coeffs: &'static [f64],
    b_coeffs: &'static [f64],
}

impl<D: Dynamics> Propagator<D> {
    /// Each propagator must be initialized with `new` which stores propagator information.
    pub fn new<T: RK>(dynamics: D, opts: PropOpts) -> Self {
        Self {
            dynamics,
            opts,
            stages: T::STAGES,
            order: T::ORDER,
            a_coeffs: T::A_COEFFS,
            b_coeffs: T::B_COEFFS,
        }
    }

    /// A fixed step RK4 propagator with custom propagator options.
    pub fn rk4(dynamics: D, opts: PropOpts) -> Self {
        Self::new::<RK4Fixed>(dynamics, opts)
    }

    /// Default propagator is an RK4 with the default PropOpts.
    pub fn default(dynamics: D) -> Self {
        Self::rk4(dynamics, PropOpts::default())
    }

    pub fn order(&self) -> u8 {
        self.order
    }

    pub fn stages(&self) -> usize {
        self.stages
    }

    pub(crate) fn a_coeffs(&self) -> &'static [f64] {
        self.a_coeffs
    }

    pub(crate) fn b_coeffs(&self) -> &'static [f64] {
        self.b_coeffs
    }

    pub fn with(&self, state: CartesianState) -> PropInstance<'_, D> {
        // Pre-allocate the k used in the propagator
        let k = vec![Vector6::zeros(); self.stages];
        PropInstance {
            state,
            prop: self,
            details: IntegrationDetails {
                step: self.opts.step,
                steps: 0,
            },
            step_size: self.opts.step,
            k,
        }
    }
}
