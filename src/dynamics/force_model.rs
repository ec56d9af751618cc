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

use super::{AccelModel, Drag, Dynamics, DynamicsAstroSnafu, DynamicsError, GravityModel};
use crate::cosmic::{default_body_provider, BodyStateProvider, CartesianState, CelestialBody};
use crate::linalg::{Vector3, Vector6};
use snafu::ResultExt;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Sum of the gravity sources, keyed by body ID, and of the optional drag acting on a spacecraft.
#[derive(Clone)]
pub struct ForceModel {
    gravity: BTreeMap<i32, GravityModel>,
    pub drag: Option<Drag>,
    provider: Arc<dyn BodyStateProvider>,
}

impl ForceModel {
    /// Point mass gravity of the central body only, using the process-wide body state provider.
    pub fn new(central_body: CelestialBody) -> Self {
        Self::with_provider(central_body, default_body_provider())
    }

    /// Point mass gravity of the central body only, third body states coming from the provided provider.
    pub fn with_provider(central_body: CelestialBody, provider: Arc<dyn BodyStateProvider>) -> Self {
        let mut me = Self {
            gravity: BTreeMap::new(),
            drag: None,
            provider,
        };
        me.add_gravity(GravityModel::spherical(central_body));
        me
    }

    /// Adds a gravity source. A source of the same body is replaced.
    pub fn add_gravity(&mut self, model: GravityModel) {
        if self.gravity.insert(model.body.id, model).is_some() {
            debug!("replaced the gravity model of {}", model.body.name);
        }
    }

    pub fn set_drag(&mut self, drag: Drag) {
        self.drag = Some(drag);
    }

    pub fn gravity_models(&self) -> impl Iterator<Item = &GravityModel> {
        self.gravity.values()
    }

    pub fn provider(&self) -> &dyn BodyStateProvider {
        self.provider.as_ref()
    }

    /// Total acceleration acting on the provided inertial state, in m/s^2.
    pub fn acceleration(&self, state: &CartesianState) -> Result<Vector3<f64>, DynamicsError> {
        state.ensure_inertial().context(DynamicsAstroSnafu)?;

        let mut accel = Vector3::zeros();
        for model in self.gravity.values() {
            accel += model.eom(state, self.provider())?;
        }
        if let Some(drag) = &self.drag {
            accel += drag.eom(state, self.provider())?;
        }

        if accel.iter().any(|a| !a.is_finite()) {
            return Err(DynamicsError::NonFiniteAccel {
                model: self.to_string(),
                epoch: state.epoch.to_iso(),
            });
        }
        Ok(accel)
    }
}

impl Dynamics for ForceModel {
    fn eom(
        &self,
        delta_t: f64,
        state_vec: &Vector6<f64>,
        state_ctx: &CartesianState,
    ) -> Result<Vector6<f64>, DynamicsError> {
        let osc = state_ctx.with_state_vector(delta_t, state_vec);
        let accel = self.acceleration(&osc)?;
        Ok(Vector6::from_iterator(
            osc.velocity.iter().chain(accel.iter()).cloned(),
        ))
    }
}

impl fmt::Display for ForceModel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "[ForceModel]")?;
        write!(f, " Gravity models:")?;
        for model in self.gravity.values() {
            write!(
                f,
                "\n - {}{}",
                model.body.name,
                if model.aspherical { " (J2)" } else { "" }
            )?;
        }
        if let Some(drag) = &self.drag {
            write!(f, "\n Drag: {drag}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ForceModel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self}")
    }
}
