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

use super::{AstroError, CartesianState, CelestialBody, Euler3Axis, EulerRotation};
use crate::linalg::Vector3;
use crate::time::TimeValue;
use crate::utils::{between_0_tau, match_half_plane};
use std::f64::consts::TAU;
use std::fmt;

/// Maximum number of iterations when solving Kepler's equation
pub const KEPLER_MAX_ITER: usize = 32;
/// Convergence threshold on successive eccentric anomaly estimates, in radians
pub const KEPLER_TOL: f64 = 1e-12;
/// Eccentricity, and sine of the inclination, under which the orbit is considered degenerate
pub const DEGENERACY_TOL: f64 = 1e-11;

/// Classical Keplerian elements of a two-body orbit. Distances in meters, angles in radians.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct KeplerianElements {
    pub central_body: CelestialBody,
    pub epoch: TimeValue,
    /// Semi-major axis
    pub sma: f64,
    /// Eccentricity
    pub ecc: f64,
    /// Inclination
    pub inc: f64,
    /// Right ascension of the ascending node
    pub raan: f64,
    /// Argument of periapsis
    pub aop: f64,
    /// True anomaly
    pub ta: f64,
}

/// Why some angles of an element set are undefined.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Degeneracy {
    /// No periapsis: argument of periapsis and true anomaly are undefined
    Circular,
    /// No line of nodes: the right ascension of the ascending node is undefined
    Equatorial,
    CircularEquatorial,
}

impl fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Circular => write!(f, "circular orbit"),
            Self::Equatorial => write!(f, "equatorial orbit"),
            Self::CircularEquatorial => write!(f, "circular equatorial orbit"),
        }
    }
}

/// Outcome of extracting elements from a Cartesian state.
///
/// Undefined angles of degenerate orbits are set to zero, and the degeneracy is reported alongside.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ElementsResult {
    Elements(KeplerianElements),
    Degenerate {
        elements: KeplerianElements,
        reason: Degeneracy,
    },
}

impl ElementsResult {
    /// Returns the elements, with undefined angles set to zero if degenerate.
    pub fn elements(&self) -> KeplerianElements {
        match *self {
            Self::Elements(elements) => elements,
            Self::Degenerate { elements, .. } => elements,
        }
    }

    pub fn degeneracy(&self) -> Option<Degeneracy> {
        match *self {
            Self::Elements(_) => None,
            Self::Degenerate { reason, .. } => Some(reason),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.degeneracy().is_some()
    }
}

impl KeplerianElements {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        central_body: CelestialBody,
        epoch: TimeValue,
        sma: f64,
        ecc: f64,
        inc: f64,
        raan: f64,
        aop: f64,
        ta: f64,
    ) -> Self {
        Self {
            central_body,
            epoch,
            sma,
            ecc,
            inc,
            raan,
            aop,
            ta,
        }
    }

    /// Same as [KeplerianElements::new] with all angles in degrees.
    #[allow(clippy::too_many_arguments)]
    pub fn from_degrees(
        central_body: CelestialBody,
        epoch: TimeValue,
        sma: f64,
        ecc: f64,
        inc_deg: f64,
        raan_deg: f64,
        aop_deg: f64,
        ta_deg: f64,
    ) -> Self {
        Self::new(
            central_body,
            epoch,
            sma,
            ecc,
            inc_deg.to_radians(),
            raan_deg.to_radians(),
            aop_deg.to_radians(),
            ta_deg.to_radians(),
        )
    }

    /// Computes the elements of an inertial state.
    pub fn from_cartesian(state: &CartesianState) -> Result<ElementsResult, AstroError> {
        state.ensure_inertial()?;

        let mu = state.central_body.mu;
        let r = state.position;
        let v = state.velocity;

        let sma = -mu / (2.0 * state.energy());
        let hvec = state.hvec();
        let evec = state.evec();
        let ecc = evec.norm();
        let inc = safe_acos(hvec.z / hvec.norm());

        let nvec = Vector3::new(-hvec.y, hvec.x, 0.0);

        let mut raan = safe_acos(nvec.x / nvec.norm());
        if nvec.y < 0.0 {
            raan = TAU - raan;
        }

        let mut aop = safe_acos(nvec.dot(&evec) / (nvec.norm() * ecc));
        if evec.z < 0.0 {
            aop = TAU - aop;
        }

        let mut ta = safe_acos(evec.dot(&r) / (ecc * r.norm()));
        if r.dot(&v) < 0.0 {
            ta = TAU - ta;
        }

        let equatorial = raan.is_nan() || nvec.norm() < DEGENERACY_TOL * hvec.norm();
        let circular = ecc < DEGENERACY_TOL || ta.is_nan() || (aop.is_nan() && !equatorial);

        let elements = Self::new(
            state.central_body,
            state.epoch,
            sma,
            ecc,
            inc,
            zero_if_nan(raan),
            zero_if_nan(aop),
            zero_if_nan(ta),
        );

        let reason = match (circular, equatorial) {
            (false, false) => return Ok(ElementsResult::Elements(elements)),
            (true, false) => Degeneracy::Circular,
            (false, true) => Degeneracy::Equatorial,
            (true, true) => Degeneracy::CircularEquatorial,
        };
        warn!("{reason} at {}: undefined angles set to zero", state.epoch.to_iso());
        Ok(ElementsResult::Degenerate { elements, reason })
    }

    /// Computes the inertial Cartesian state of these elements.
    pub fn to_cartesian(&self) -> CartesianState {
        let p = self.semi_latus_rectum();
        let (sin_ta, cos_ta) = self.ta.sin_cos();
        let radius = p / (1.0 + self.ecc * cos_ta);

        let r_pqw = Vector3::new(radius * cos_ta, radius * sin_ta, 0.0);
        let v_pqw = (self.central_body.mu / p).sqrt() * Vector3::new(-sin_ta, self.ecc + cos_ta, 0.0);

        let pqw_to_inertial = self.perifocal_rotation().dcm();

        CartesianState::inertial(
            self.central_body,
            self.epoch,
            pqw_to_inertial * r_pqw,
            pqw_to_inertial * v_pqw,
        )
    }

    /// Rotation from the perifocal frame to the inertial frame.
    pub fn perifocal_rotation(&self) -> Euler3Axis {
        Euler3Axis::new(
            EulerRotation::R3(-self.aop),
            EulerRotation::R1(-self.inc),
            EulerRotation::R3(-self.raan),
        )
    }

    pub fn semi_latus_rectum(&self) -> f64 {
        self.sma * (1.0 - self.ecc.powi(2))
    }

    /// Mean motion, in rad/s
    pub fn mean_motion(&self) -> f64 {
        (self.central_body.mu / self.sma.powi(3)).sqrt()
    }

    /// Orbital period, in seconds
    pub fn period(&self) -> f64 {
        TAU / self.mean_motion()
    }

    pub fn eccentric_anomaly(&self) -> f64 {
        true_to_eccentric(self.ta, self.ecc)
    }

    pub fn mean_anomaly(&self) -> f64 {
        eccentric_to_mean(self.eccentric_anomaly(), self.ecc)
    }

    /// Propagates these elements to the requested epoch assuming two-body motion.
    ///
    /// Only the true anomaly changes. Works both forward and backward in time.
    pub fn propagate(&self, epoch: &TimeValue) -> Result<Self, AstroError> {
        if !(0.0..1.0).contains(&self.ecc) {
            return Err(AstroError::NonElliptical { ecc: self.ecc });
        }

        let delta_t = epoch.difference(&self.epoch);
        let mean_anomaly = between_0_tau(self.mean_anomaly() + self.mean_motion() * delta_t);
        let ecc_anomaly = solve_kepler(mean_anomaly, self.ecc);

        let mut me = *self;
        me.epoch = *epoch;
        me.ta = eccentric_to_true(ecc_anomaly, self.ecc);
        Ok(me)
    }
}

impl fmt::Display for KeplerianElements {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "[KeplerianElements]")?;
        writeln!(f, " Central Body: {}", self.central_body)?;
        writeln!(f, " Epoch: {}", self.epoch)?;
        writeln!(f, " SMA: {} m", self.sma)?;
        writeln!(f, " ECC: {}", self.ecc)?;
        writeln!(f, " INC: {} deg", self.inc.to_degrees())?;
        writeln!(f, " RAAN: {} deg", self.raan.to_degrees())?;
        writeln!(f, " AOP: {} deg", self.aop.to_degrees())?;
        write!(f, " TA: {} deg", self.ta.to_degrees())
    }
}

fn safe_acos(value: f64) -> f64 {
    value.clamp(-1.0, 1.0).acos()
}

fn zero_if_nan(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

/// Converts a true anomaly into the eccentric anomaly in the same half plane.
pub fn true_to_eccentric(ta: f64, ecc: f64) -> f64 {
    let cos_ta = ta.cos();
    let ecc_anomaly = safe_acos((ecc + cos_ta) / (1.0 + ecc * cos_ta));
    match_half_plane(ecc_anomaly, between_0_tau(ta))
}

/// Converts an eccentric anomaly into the true anomaly in the same half plane.
pub fn eccentric_to_true(ecc_anomaly: f64, ecc: f64) -> f64 {
    let cos_e = ecc_anomaly.cos();
    let ta = safe_acos((cos_e - ecc) / (1.0 - ecc * cos_e));
    match_half_plane(ta, between_0_tau(ecc_anomaly))
}

/// Kepler's equation
pub fn eccentric_to_mean(ecc_anomaly: f64, ecc: f64) -> f64 {
    between_0_tau(ecc_anomaly - ecc * ecc_anomaly.sin())
}

/// Solves Kepler's equation `M = E - e sin E` for the eccentric anomaly of an elliptical orbit.
///
/// Iterates on the Newton map until two successive estimates are within [KEPLER_TOL]; if that
/// does not happen within [KEPLER_MAX_ITER] iterations, the last estimate is returned.
pub fn solve_kepler(mean_anomaly: f64, ecc: f64) -> f64 {
    let mean_anomaly = between_0_tau(mean_anomaly);
    let mut ecc_anomaly = if ecc > 0.8 { std::f64::consts::PI } else { mean_anomaly };

    for _ in 0..KEPLER_MAX_ITER {
        let next = ecc_anomaly
            - (ecc_anomaly - ecc * ecc_anomaly.sin() - mean_anomaly)
                / (1.0 - ecc * ecc_anomaly.cos());
        if (next - ecc_anomaly).abs() < KEPLER_TOL {
            return between_0_tau(next);
        }
        ecc_anomaly = next;
    }

    warn!(
        "Kepler's equation did not converge in {KEPLER_MAX_ITER} iterations (M = {mean_anomaly}, e = {ecc})"
    );
    between_0_tau(ecc_anomaly)
}
