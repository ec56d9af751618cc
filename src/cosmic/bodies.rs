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

use super::AstroError;
use crate::linalg::Vector3;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

/// Physical constants of a celestial body, identified by its NAIF ID.
///
/// Lengths are in meters, the gravitational parameter in m^3/s^2, and the rotation rate in rad/s.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CelestialBody {
    pub id: i32,
    pub name: &'static str,
    pub mu: f64,
    pub equatorial_radius: f64,
    pub polar_radius: f64,
    /// Spin rate about the body's Z axis (negative for retrograde rotators)
    pub rotation_rate: f64,
}

pub const SUN: CelestialBody = CelestialBody {
    id: 10,
    name: "Sun",
    mu: 132_712_440_018_000_003_072.0,
    equatorial_radius: 69_570_000_000.0,
    polar_radius: 69_570_000_000.0,
    rotation_rate: 2.865_329_649_057_472_2e-6,
};

pub const MERCURY: CelestialBody = CelestialBody {
    id: 199,
    name: "Mercury",
    mu: 22_032_000_000_000.0,
    equatorial_radius: 2_439_700.0,
    polar_radius: 2_439_700.0,
    rotation_rate: 1.240_013_030_109_886e-6,
};

pub const VENUS: CelestialBody = CelestialBody {
    id: 299,
    name: "Venus",
    mu: 324_859_000_000_000.0,
    equatorial_radius: 6_051_800.0,
    polar_radius: 6_051_800.0,
    rotation_rate: -2.992_398_738_488_947e-7,
};

pub const EARTH: CelestialBody = CelestialBody {
    id: 399,
    name: "Earth",
    mu: 398_600_441_800_000.0,
    equatorial_radius: 6_378_137.0,
    polar_radius: 6_356_752.3,
    rotation_rate: 7.292_115_024_135_738e-5,
};

pub const LUNA: CelestialBody = CelestialBody {
    id: 301,
    name: "Luna",
    mu: 4_904_869_500_000.0,
    equatorial_radius: 1_738_100.0,
    polar_radius: 1_736_000.0,
    rotation_rate: 2.661_699_527_215_069_2e-6,
};

pub const MARS: CelestialBody = CelestialBody {
    id: 499,
    name: "Mars",
    mu: 42_828_370_000_000.0,
    equatorial_radius: 3_396_200.0,
    polar_radius: 3_376_200.0,
    rotation_rate: 7.088_218_111_185_524e-5,
};

pub const JUPITER: CelestialBody = CelestialBody {
    id: 599,
    name: "Jupiter",
    mu: 126_686_534_900_000_000.0,
    equatorial_radius: 71_492_000.0,
    polar_radius: 66_854_000.0,
    rotation_rate: 0.000_177_340_581_282_294_25,
};

pub const SATURN: CelestialBody = CelestialBody {
    id: 699,
    name: "Saturn",
    mu: 37_931_187_900_000_000.0,
    equatorial_radius: 60_268_000.0,
    polar_radius: 54_364_000.0,
    rotation_rate: 0.000_170_709_042_644_202_85,
};

pub const URANUS: CelestialBody = CelestialBody {
    id: 799,
    name: "Uranus",
    mu: 5_793_939_900_000_000.0,
    equatorial_radius: 25_559_000.0,
    polar_radius: 24_973_000.0,
    rotation_rate: -0.000_101_237_665_371_668_16,
};

pub const NEPTUNE: CelestialBody = CelestialBody {
    id: 899,
    name: "Neptune",
    mu: 6_836_529_900_000_000.0,
    equatorial_radius: 24_764_000.0,
    polar_radius: 24_341_000.0,
    rotation_rate: 0.000_108_338_252_761_907_48,
};

/// All of the registered bodies, Sun first.
pub const BODIES: [CelestialBody; 10] = [
    SUN, MERCURY, VENUS, EARTH, LUNA, MARS, JUPITER, SATURN, URANUS, NEPTUNE,
];

impl CelestialBody {
    /// Returns the body with the provided NAIF ID.
    pub fn from_id(id: i32) -> Result<Self, AstroError> {
        BODIES
            .iter()
            .find(|body| body.id == id)
            .copied()
            .ok_or(AstroError::UnknownBodyId { id })
    }

    /// Returns the body with the provided common name, case insensitive (`Moon` is an alias of `Luna`).
    pub fn from_name(name: &str) -> Result<Self, AstroError> {
        match name.trim().to_uppercase().as_str() {
            "SUN" => Ok(SUN),
            "MERCURY" => Ok(MERCURY),
            "VENUS" => Ok(VENUS),
            "EARTH" => Ok(EARTH),
            "MOON" | "LUNA" => Ok(LUNA),
            "MARS" => Ok(MARS),
            "JUPITER" => Ok(JUPITER),
            "SATURN" => Ok(SATURN),
            "URANUS" => Ok(URANUS),
            "NEPTUNE" => Ok(NEPTUNE),
            _ => Err(AstroError::UnknownBodyName {
                name: name.to_string(),
            }),
        }
    }

    /// Rotation vector, in rad/s
    pub fn rotation(&self) -> Vector3<f64> {
        Vector3::new(0.0, 0.0, self.rotation_rate)
    }

    pub fn flattening(&self) -> f64 {
        (self.equatorial_radius - self.polar_radius) / self.equatorial_radius
    }

    /// Second zonal harmonic derived from the flattening and the rotation rate.
    pub fn j2(&self) -> f64 {
        2.0 * self.flattening() / 3.0
            - self.equatorial_radius.powi(3) * self.rotation_rate.powi(2) / (3.0 * self.mu)
    }

    pub fn is_sun(&self) -> bool {
        self.id == SUN.id
    }
}

impl fmt::Display for CelestialBody {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[CelestialBody] {{ ID: {}, Name: {} }}", self.id, self.name)
    }
}

impl TryFrom<i32> for CelestialBody {
    type Error = AstroError;

    fn try_from(id: i32) -> Result<Self, Self::Error> {
        Self::from_id(id)
    }
}

impl FromStr for CelestialBody {
    type Err = AstroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl Serialize for CelestialBody {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name)
    }
}

impl<'de> Deserialize<'de> for CelestialBody {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Self::from_name(&name).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod ut_bodies {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lookup() {
        for body in BODIES {
            assert_eq!(CelestialBody::from_id(body.id).unwrap(), body);
            assert_eq!(CelestialBody::from_name(body.name).unwrap(), body);
            assert_eq!(
                CelestialBody::from_name(&body.name.to_lowercase()).unwrap(),
                body
            );
        }
        assert_eq!(CelestialBody::from_name("MOON").unwrap(), LUNA);
        assert_eq!("moon".parse::<CelestialBody>().unwrap().id, 301);
        assert_eq!(
            CelestialBody::from_id(42),
            Err(AstroError::UnknownBodyId { id: 42 })
        );
        assert!(CelestialBody::from_name("Pluto").is_err());
    }

    #[test]
    fn test_physical() {
        assert_eq!(SUN.flattening(), 0.0);
        assert_relative_eq!(EARTH.flattening(), 0.003_352_810_7, max_relative = 1e-6);
        // Derived J2 is within a few percent of the EGM value
        assert!((EARTH.j2() - 1.082_63e-3).abs() < 0.1e-3);
        assert_eq!(EARTH.rotation(), Vector3::new(0.0, 0.0, EARTH.rotation_rate));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            format!("{EARTH}"),
            "[CelestialBody] { ID: 399, Name: Earth }"
        );
    }
}
