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

use super::{AccelModel, DynamicsError};
use crate::cosmic::{BodyStateProvider, CartesianState, CelestialBody, EARTH};
use crate::linalg::Vector3;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// U.S. Standard Atmosphere 1976 exponential model: base altitude (m), base density (kg/m^3), scale height (m).
#[rustfmt::skip]
pub const STD1976_TABLE: [[f64; 3]; 28] = [
    [0.0, 1.225, 7.249e3],
    [25_000.0, 3.899e-2, 6.349e3],
    [30_000.0, 1.774e-2, 6.682e3],
    [40_000.0, 3.972e-3, 7.554e3],
    [50_000.0, 1.057e-3, 8.382e3],
    [60_000.0, 3.206e-4, 7.714e3],
    [70_000.0, 8.77e-5, 6.549e3],
    [80_000.0, 1.905e-5, 5.799e3],
    [90_000.0, 3.396e-6, 5.382e3],
    [100_000.0, 5.297e-7, 5.877e3],
    [110_000.0, 9.661e-8, 7.263e3],
    [120_000.0, 2.438e-8, 9.473e3],
    [130_000.0, 8.484e-9, 12.636e3],
    [140_000.0, 3.845e-9, 16.149e3],
    [150_000.0, 2.07e-9, 22.523e3],
    [180_000.0, 5.464e-10, 29.74e3],
    [200_000.0, 2.789e-10, 37.105e3],
    [250_000.0, 7.248e-11, 45.546e3],
    [300_000.0, 2.418e-11, 53.628e3],
    [350_000.0, 9.518e-12, 53.298e3],
    [400_000.0, 3.725e-12, 58.515e3],
    [450_000.0, 1.585e-12, 60.828e3],
    [500_000.0, 6.967e-13, 63.822e3],
    [600_000.0, 1.454e-13, 71.835e3],
    [700_000.0, 3.614e-14, 88.667e3],
    [800_000.0, 1.17e-14, 124.64e3],
    [900_000.0, 5.245e-15, 181.05e3],
    [1_000_000.0, 3.019e-15, 268.0e3],
];

/// Density models
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AtmosphereModel {
    /// Exponential model with the U.S. Standard Atmosphere 1976 bands
    #[default]
    #[serde(rename = "US_STANDARD_1976")]
    Standard1976,
    /// Not modeled yet, the density is always zero
    #[serde(rename = "HARRIS_PRIESTER")]
    HarrisPriester,
}

impl AtmosphereModel {
    /// Atmospheric density, in kg/m^3, at the provided altitude above the equatorial radius.
    pub fn density(&self, altitude: f64) -> f64 {
        match self {
            Self::Standard1976 => {
                // Below the first band, the first band is used. Above the last one, the last is extrapolated.
                let band = STD1976_TABLE
                    .iter()
                    .rposition(|row| row[0] <= altitude)
                    .unwrap_or(0);
                let [base_alt, base_rho, scale_height] = STD1976_TABLE[band];
                base_rho * (-(altitude - base_alt) / scale_height).exp()
            }
            Self::HarrisPriester => 0.0,
        }
    }
}

impl fmt::Display for AtmosphereModel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Standard1976 => write!(f, "US Standard 1976"),
            Self::HarrisPriester => write!(f, "Harris-Priester"),
        }
    }
}

/// `Drag` is the atmospheric drag acting on a spacecraft of constant mass and cross section.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Drag {
    /// Body whose atmosphere is modeled
    pub body: CelestialBody,
    pub model: AtmosphereModel,
    /// Spacecraft mass, in kg
    pub mass: f64,
    /// Cross sectional area, in m^2
    pub area: f64,
    /// Coefficient of drag
    pub cd: f64,
}

impl Default for Drag {
    fn default() -> Self {
        Self {
            body: EARTH,
            model: AtmosphereModel::Standard1976,
            mass: 1000.0,
            area: 4.0,
            cd: 1.2,
        }
    }
}

impl Drag {
    pub fn new(body: CelestialBody, model: AtmosphereModel, mass: f64, area: f64, cd: f64) -> Self {
        Self {
            body,
            model,
            mass,
            area,
            cd,
        }
    }

    /// Density at the position of the provided state
    pub fn density(&self, osc: &CartesianState) -> f64 {
        self.model
            .density(osc.rmag() - self.body.equatorial_radius)
    }
}

impl AccelModel for Drag {
    fn eom(
        &self,
        osc: &CartesianState,
        _provider: &dyn BodyStateProvider,
    ) -> Result<Vector3<f64>, DynamicsError> {
        let rho = self.density(osc);
        // Velocity relative to the co-rotating atmosphere
        let velocity = osc.velocity + (-self.body.rotation()).cross(&osc.position);
        let vmag = velocity.norm();
        if vmag == 0.0 {
            return Ok(Vector3::zeros());
        }
        let accel_mag = 0.5 * rho * (self.cd * self.area / self.mass) * vmag.powi(2);
        Ok(-accel_mag * velocity / vmag)
    }
}

impl fmt::Display for Drag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} drag about {} (mass = {} kg, area = {} m^2, Cd = {})",
            self.model, self.body.name, self.mass, self.area, self.cd
        )
    }
}
