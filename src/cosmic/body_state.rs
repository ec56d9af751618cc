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

use super::{AstroError, BodyStateSnafu, CartesianState, CelestialBody, SUN};
use crate::linalg::Vector3;
use crate::md::trajectory::Trajectory;
use crate::time::TimeValue;
use snafu::ResultExt;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Maximum number of central body hops when resolving a heliocentric state
pub const MAX_RECENTER_DEPTH: usize = 8;

/// Provides the inertial state of a celestial body with respect to its own central body.
pub trait BodyStateProvider: Send + Sync + fmt::Debug {
    /// Returns the state of `body` at `epoch`. The Sun is the origin and has a null state.
    fn state(&self, body: &CelestialBody, epoch: &TimeValue) -> Result<CartesianState, AstroError>;
}

fn sun_state(epoch: &TimeValue) -> CartesianState {
    CartesianState::inertial(SUN, *epoch, Vector3::zeros(), Vector3::zeros())
}

/// Body states interpolated from STK ephemeris files named `<body>.txt` (lower case) in the data directory.
///
/// Each file is read at most once, on first use, until [EphemerisBodyProvider::reset] is called.
#[derive(Debug)]
pub struct EphemerisBodyProvider {
    data_dir: PathBuf,
    cache: RwLock<HashMap<i32, Arc<Trajectory>>>,
}

impl Default for EphemerisBodyProvider {
    fn default() -> Self {
        Self::new("data/planetary")
    }
}

impl EphemerisBodyProvider {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the ephemeris file of the provided body
    pub fn path_of(&self, body: &CelestialBody) -> PathBuf {
        self.data_dir
            .join(format!("{}.txt", body.name.to_lowercase()))
    }

    /// Drops all loaded ephemerides.
    pub fn reset(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn trajectory(&self, body: &CelestialBody) -> Result<Arc<Trajectory>, AstroError> {
        if let Some(traj) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&body.id)
        {
            return Ok(traj.clone());
        }

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have loaded it while we were waiting for the lock
        if let Some(traj) = cache.get(&body.id) {
            return Ok(traj.clone());
        }

        let path = self.path_of(body);
        let traj = Arc::new(Trajectory::from_stk_file(&path).context(BodyStateSnafu { body: body.name })?);
        debug!(
            "loaded {} states for {} from {}",
            traj.len(),
            body.name,
            path.display()
        );
        cache.insert(body.id, traj.clone());
        Ok(traj)
    }
}

impl BodyStateProvider for EphemerisBodyProvider {
    fn state(&self, body: &CelestialBody, epoch: &TimeValue) -> Result<CartesianState, AstroError> {
        if body.is_sun() {
            return Ok(sun_state(epoch));
        }
        self.trajectory(body)?
            .interpolate(epoch)
            .context(BodyStateSnafu { body: body.name })
    }
}

/// Body states interpolated from trajectories held in memory, keyed by body ID.
#[derive(Clone, Debug, Default)]
pub struct TableBodyProvider {
    trajectories: HashMap<i32, Trajectory>,
}

impl TableBodyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the trajectory of the provided body, replacing any previous one.
    pub fn with(mut self, body: CelestialBody, traj: Trajectory) -> Self {
        self.insert(body, traj);
        self
    }

    pub fn insert(&mut self, body: CelestialBody, traj: Trajectory) {
        self.trajectories.insert(body.id, traj);
    }
}

impl BodyStateProvider for TableBodyProvider {
    fn state(&self, body: &CelestialBody, epoch: &TimeValue) -> Result<CartesianState, AstroError> {
        if body.is_sun() {
            return Ok(sun_state(epoch));
        }
        self.trajectories
            .get(&body.id)
            .ok_or(AstroError::NoEphemeris { body: body.name })?
            .interpolate(epoch)
            .context(BodyStateSnafu { body: body.name })
    }
}

lazy_static! {
    static ref BODY_STATES: Arc<EphemerisBodyProvider> = Arc::new(EphemerisBodyProvider::default());
}

/// Returns the process-wide body state provider, reading from `data/planetary`.
pub fn default_body_provider() -> Arc<EphemerisBodyProvider> {
    BODY_STATES.clone()
}

impl CartesianState {
    /// Returns this state with respect to the Sun.
    pub fn to_solar(&self, provider: &dyn BodyStateProvider) -> Result<Self, AstroError> {
        self.to_solar_at_depth(provider, 0)
    }

    fn to_solar_at_depth(
        &self,
        provider: &dyn BodyStateProvider,
        depth: usize,
    ) -> Result<Self, AstroError> {
        self.ensure_inertial()?;
        if self.central_body.is_sun() {
            return Ok(*self);
        }
        if depth >= MAX_RECENTER_DEPTH {
            warn!(
                "stopped resolving the heliocentric state of {} after {depth} central bodies",
                self.central_body.name
            );
            return Err(AstroError::RecursionLimit {
                body: self.central_body.name,
                depth,
            });
        }

        let central = provider
            .state(&self.central_body, &self.epoch)?
            .to_solar_at_depth(provider, depth + 1)?;

        Ok(Self::inertial(
            SUN,
            self.epoch,
            self.position + central.position,
            self.velocity + central.velocity,
        ))
    }

    /// Returns this state with respect to the provided central body.
    pub fn change_central_body(
        &self,
        body: &CelestialBody,
        provider: &dyn BodyStateProvider,
    ) -> Result<Self, AstroError> {
        if self.central_body.id == body.id {
            return Ok(*self);
        }

        let solar = self.to_solar(provider)?;
        if body.is_sun() {
            return Ok(solar);
        }

        let body_solar = provider.state(body, &self.epoch)?.to_solar(provider)?;

        Ok(Self::inertial(
            *body,
            self.epoch,
            solar.position - body_solar.position,
            solar.velocity - body_solar.velocity,
        ))
    }
}
