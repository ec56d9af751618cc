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

use super::{
    DynamicsSnafu, IntegrationDetails, PropagationError, Propagator, StatePropagator,
    EPOCH_TOLERANCE_S,
};
use crate::cosmic::CartesianState;
use crate::dynamics::Dynamics;
use crate::linalg::Vector6;
use crate::time::{Duration, TimeValue, Unit};
use snafu::ResultExt;
use std::time::Instant;

/// A propagator instance: the propagator setup along with the state it propagates.
#[derive(Debug)]
pub struct PropInstance<'a, D: Dynamics> {
    /// The state of this propagator instance
    pub state: CartesianState,
    /// The propagator setup (kind, stages, etc.)
    pub prop: &'a Propagator<D>,
    /// Stores the details of the previous integration step
    pub details: IntegrationDetails,
    pub(crate) step_size: Duration, // Stores the step for the _next_ call
    // Allows us to do pre-allocation of the ki vectors
    pub(crate) k: Vec<Vector6<f64>>,
}

impl<'a, D: Dynamics> PropInstance<'a, D> {
    /// Allows setting the step size of the propagator
    pub fn set_step(&mut self, step_size: Duration) {
        self.step_size = step_size;
    }

    /// This method propagates the provided Dynamics for the provided duration.
    ///
    /// Sub-steps of the propagator step are taken toward the target, the last one being shortened
    /// as needed. The propagation ends when the state is within [EPOCH_TOLERANCE_S] of the target,
    /// and the final epoch is then exactly the target epoch.
    pub fn for_duration(&mut self, duration: Duration) -> Result<CartesianState, PropagationError> {
        let duration_s = duration.to_seconds();
        if duration_s.abs() <= EPOCH_TOLERANCE_S {
            return Ok(self.state);
        }

        let step_s = self.step_size.to_seconds().abs();
        if step_s <= 0.0 || !step_s.is_finite() {
            return Err(PropagationError::InvalidStep { step_s });
        }

        let stop_time = self.state.epoch.increment(duration_s);

        let tick = Instant::now();
        let log_progress = duration.abs() >= 2 * Unit::Minute;

        if log_progress {
            info!("Propagating for {} until {}", duration, stop_time.to_iso());
        }
        // Call `finally` on the current state to set anything up
        self.state = self.prop.dynamics.finally(self.state).context(DynamicsSnafu)?;

        let direction = duration_s.signum();
        let nominal_step = self.step_size;
        loop {
            let remaining = stop_time.difference(&self.state.epoch);
            if remaining.abs() <= EPOCH_TOLERANCE_S {
                // Snap onto the target to prevent accumulating rounding errors over multiple calls
                self.state.epoch = stop_time;
                self.set_step(nominal_step);
                if log_progress {
                    let tock: Duration = tick.elapsed().into();
                    info!("Done in {}", tock);
                }
                return Ok(self.state);
            }

            if self.prop.opts.is_cancelled() {
                self.set_step(nominal_step);
                warn!("propagation cancelled at {}", self.state.epoch.to_iso());
                return Err(PropagationError::Cancelled {
                    epoch: self.state.epoch.to_iso(),
                });
            }

            if remaining.abs() < step_s {
                // Take one final step of exactly the needed duration until the stop time
                self.set_step(remaining * Unit::Second);
            } else {
                self.set_step(direction * step_s * Unit::Second);
            }
            self.single_step()?;
        }
    }

    /// Propagates the provided Dynamics until the provided epoch. Returns the end state.
    pub fn until_epoch(&mut self, end_time: &TimeValue) -> Result<CartesianState, PropagationError> {
        let duration = end_time.difference(&self.state.epoch) * Unit::Second;
        self.for_duration(duration)
    }

    /// Take a single propagator step of the current step size.
    pub fn single_step(&mut self) -> Result<(), PropagationError> {
        let (t, state_vec) = self.derive()?;
        self.state = self.state.with_state_vector(t.to_seconds(), &state_vec);
        self.state = self.prop.dynamics.finally(self.state).context(DynamicsSnafu)?;
        self.details.steps += 1;

        Ok(())
    }

    /// This method integrates whichever function is provided as `d_xdt`. Everything passed to this function is in **seconds**.
    ///
    /// This function returns the step sized used (as a Duration) and the new state as y_{n+1} = y_n + \frac{dy_n}{dt}.
    /// To get the integration details, check `self.latest_details`.
    fn derive(&mut self) -> Result<(Duration, Vector6<f64>), PropagationError> {
        let state_vec = &self.state.to_vector();
        let state_ctx = &self.state;
        let step_size = self.step_size.to_seconds();
        let a_coeffs = self.prop.a_coeffs();

        self.k[0] = self
            .prop
            .dynamics
            .eom(0.0, state_vec, state_ctx)
            .context(DynamicsSnafu)?;
        let mut a_idx: usize = 0;
        for i in 0..(self.prop.stages() - 1) {
            // Let's compute the c_i by summing the relevant items from the list of coefficients.
            // \sum_{j=1}^{i-1} a_ij  ∀ i ∈ [2, s]
            let mut ci: f64 = 0.0;
            // The wi stores the a_{s1} * k_1 + a_{s2} * k_2 + ... + a_{s, s-1} * k_{s-1} +
            let mut wi = Vector6::zeros();
            for kj in &self.k[0..i + 1] {
                let a_ij = a_coeffs[a_idx];
                ci += a_ij;
                wi += a_ij * kj;
                a_idx += 1;
            }

            self.k[i + 1] = self
                .prop
                .dynamics
                .eom(ci * step_size, &(state_vec + step_size * wi), state_ctx)
                .context(DynamicsSnafu)?;
        }

        let mut next_state = *state_vec;
        for (ki, b_i) in self.k.iter().zip(self.prop.b_coeffs()) {
            next_state += step_size * b_i * ki;
        }

        self.details.step = self.step_size;
        Ok((self.details.step, next_state))
    }

    /// Copy the details of the latest integration step.
    pub fn latest_details(&self) -> IntegrationDetails {
        self.details
    }
}

impl<'a, D: Dynamics> StatePropagator for PropInstance<'a, D> {
    fn state(&self) -> CartesianState {
        self.state
    }

    fn propagate(&mut self, epoch: &TimeValue) -> Result<CartesianState, PropagationError> {
        self.until_epoch(epoch)
    }
}
