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

use super::{TrajError, TrajTimeSnafu, Trajectory};
use crate::cosmic::{CartesianState, CelestialBody};
use crate::linalg::Vector6;
use crate::time::{TimeScale, TimeValue};
use regex::Regex;
use snafu::ResultExt;
use std::fs;
use std::path::Path;

pub const STK_VERSION: &str = "stk.v.11.0";
pub const STK_WRITER: &str = "# WrittenBy ArcProp";

const SCENARIO_EPOCH_PATTERN: &str = "%d %b %Y %H:%M:%S";
const BEGIN: &str = "BEGIN Ephemeris";
const END: &str = "END Ephemeris";
const POINTS_FORMAT: &str = "EphemerisTimePosVel";

lazy_static! {
    static ref HEADER_REGEX: Regex = Regex::new(r"^(\w+)\s+(.+)$").unwrap();
}

/// Formats like C's `%.14e`, i.e. with a signed exponent of at least two digits.
fn sci(value: f64) -> String {
    let formatted = format!("{value:.14e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or_default();
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exponent.abs())
        }
        None => formatted,
    }
}

impl Trajectory {
    /// Formats this trajectory as the lines of an STK ephemeris (`.e`) file.
    pub fn format_stk(&self) -> Result<Vec<String>, TrajError> {
        let mut lines = Vec::with_capacity(self.states.len() + 9);
        lines.push(STK_VERSION.to_string());
        lines.push(STK_WRITER.to_string());
        lines.push(BEGIN.to_string());
        lines.push(format!("NumberOfEphemerisPoints {}", self.states.len()));
        lines.push(format!(
            "ScenarioEpoch {}",
            self.epoch
                .format_fractional(SCENARIO_EPOCH_PATTERN)
                .context(TrajTimeSnafu)?
        ));
        lines.push(format!("CentralBody {}", self.central_body.name));
        lines.push("CoordinateSystem ICRF".to_string());
        lines.push(POINTS_FORMAT.to_string());
        for state in &self.states {
            lines.push(format!(
                "{} {} {} {} {} {} {}",
                sci(state.epoch.difference(&self.epoch)),
                sci(state.position.x),
                sci(state.position.y),
                sci(state.position.z),
                sci(state.velocity.x),
                sci(state.velocity.y),
                sci(state.velocity.z)
            ));
        }
        lines.push(END.to_string());
        Ok(lines)
    }

    /// Writes this trajectory to an STK ephemeris file.
    pub fn write_stk<P: AsRef<Path>>(&self, path: P) -> Result<(), TrajError> {
        let path = path.as_ref();
        let mut content = self.format_stk()?.join("\n");
        content.push('\n');
        fs::write(path, content).map_err(|e| TrajError::Io {
            path: path.display().to_string(),
            details: e.to_string(),
        })?;
        info!(
            "wrote {} states to {}",
            self.states.len(),
            path.display()
        );
        Ok(())
    }

    /// Reads a trajectory from an STK ephemeris file.
    pub fn from_stk_file<P: AsRef<Path>>(path: P) -> Result<Self, TrajError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| TrajError::Io {
            path: path.display().to_string(),
            details: e.to_string(),
        })?;
        Self::parse_stk(&content, &path.display().to_string())
    }

    /// Parses the content of an STK ephemeris file, `path` is only used in error messages.
    ///
    /// Lines which are not recognized outside of the points block are ignored.
    pub fn parse_stk(content: &str, path: &str) -> Result<Self, TrajError> {
        let parse_err = |line: usize, details: String| TrajError::Parse {
            path: path.to_string(),
            line,
            details,
        };

        let mut expected: Option<usize> = None;
        let mut epoch: Option<TimeValue> = None;
        let mut central_body: Option<CelestialBody> = None;
        let mut rows: Vec<(usize, Vector6<f64>, f64)> = Vec::new();
        let mut in_points = false;

        for (idx, raw_line) in content.lines().enumerate() {
            let lno = idx + 1;
            let line = raw_line.trim();

            if in_points {
                if line == END {
                    in_points = false;
                } else if !line.is_empty() {
                    let values = line
                        .split_whitespace()
                        .map(|token| token.parse::<f64>())
                        .collect::<Result<Vec<f64>, _>>()
                        .map_err(|e| parse_err(lno, format!("invalid ephemeris point: {e}")))?;
                    if values.len() != 7 {
                        return Err(parse_err(
                            lno,
                            format!("expected 7 values per point but found {}", values.len()),
                        ));
                    }
                    let pos_vel = Vector6::from_row_slice(&values[1..]);
                    rows.push((lno, pos_vel, values[0]));
                }
                continue;
            }

            if line == POINTS_FORMAT {
                in_points = true;
                continue;
            }

            let Some(caps) = HEADER_REGEX.captures(line) else {
                continue;
            };
            let value = caps[2].trim();
            match &caps[1] {
                "NumberOfEphemerisPoints" => {
                    expected = Some(value.parse::<usize>().map_err(|e| {
                        parse_err(lno, format!("invalid number of points `{value}`: {e}"))
                    })?);
                }
                "ScenarioEpoch" => {
                    epoch = Some(
                        TimeValue::from_format_str(value, SCENARIO_EPOCH_PATTERN, TimeScale::UTC)
                            .context(TrajTimeSnafu)?,
                    );
                }
                "CentralBody" => {
                    central_body = Some(
                        CelestialBody::from_name(value)
                            .map_err(|e| parse_err(lno, e.to_string()))?,
                    );
                }
                "CoordinateSystem" => {
                    if !matches!(value, "ICRF" | "J2000") {
                        return Err(parse_err(
                            lno,
                            format!("unsupported coordinate system `{value}`"),
                        ));
                    }
                }
                _ => {}
            }
        }

        let epoch = epoch.ok_or_else(|| TrajError::MissingHeader {
            path: path.to_string(),
            keyword: "ScenarioEpoch",
        })?;
        let central_body = central_body.ok_or_else(|| TrajError::MissingHeader {
            path: path.to_string(),
            keyword: "CentralBody",
        })?;

        if let Some(expected) = expected {
            if expected != rows.len() {
                return Err(TrajError::PointCount {
                    path: path.to_string(),
                    expected,
                    found: rows.len(),
                });
            }
        }

        let states = rows
            .iter()
            .map(|(_, pos_vel, offset)| {
                CartesianState::from_vector(
                    central_body,
                    epoch.increment(*offset),
                    pos_vel,
                    Default::default(),
                )
            })
            .collect();

        Ok(Self::from_states(states, epoch, central_body))
    }
}

#[cfg(test)]
mod ut_stk {
    use super::*;
    use crate::cosmic::{EARTH, LUNA};
    use crate::linalg::Vector3;

    fn traj() -> Trajectory {
        let epoch = TimeValue::from_iso("2023-06-01T12:00:00.5", TimeScale::UTC).unwrap();
        let states = (0..3)
            .map(|i| {
                let dt = 60.0 * i as f64;
                CartesianState::inertial(
                    EARTH,
                    epoch.increment(dt),
                    Vector3::new(7_000_000.0 + dt, -1_234.567_89, 0.0),
                    Vector3::new(-0.001, 7_546.049_108, 1.0e-9),
                )
            })
            .collect();
        Trajectory::from_states(states, epoch, EARTH)
    }

    #[test]
    fn test_sci() {
        assert_eq!(sci(0.0), "0.00000000000000e+00");
        assert_eq!(sci(60.0), "6.00000000000000e+01");
        assert_eq!(sci(-0.001), "-1.00000000000000e-03");
        assert_eq!(sci(1.5e120), "1.50000000000000e+120");
    }

    #[test]
    fn test_format() {
        let lines = traj().format_stk().unwrap();
        assert_eq!(lines[0], STK_VERSION);
        assert_eq!(lines[1], STK_WRITER);
        assert_eq!(lines[2], "BEGIN Ephemeris");
        assert_eq!(lines[3], "NumberOfEphemerisPoints 3");
        assert_eq!(lines[4], "ScenarioEpoch 01 Jun 2023 12:00:00.500000");
        assert_eq!(lines[5], "CentralBody Earth");
        assert_eq!(lines[6], "CoordinateSystem ICRF");
        assert_eq!(lines[7], "EphemerisTimePosVel");
        assert!(lines[8].starts_with("0.00000000000000e+00 7.00000000000000e+06 "));
        assert_eq!(lines[11], "END Ephemeris");
    }

    #[test]
    fn test_parse_errors() {
        let mut lines = traj().format_stk().unwrap();
        lines[3] = "NumberOfEphemerisPoints 4".to_string();
        assert!(matches!(
            Trajectory::parse_stk(&lines.join("\n"), "bad.e"),
            Err(TrajError::PointCount { expected: 4, found: 3, .. })
        ));

        let mut lines = traj().format_stk().unwrap();
        lines[9] = "60 1 2 3".to_string();
        assert!(matches!(
            Trajectory::parse_stk(&lines.join("\n"), "bad.e"),
            Err(TrajError::Parse { line: 10, .. })
        ));

        let mut lines = traj().format_stk().unwrap();
        lines.remove(5);
        assert_eq!(
            Trajectory::parse_stk(&lines.join("\n"), "bad.e"),
            Err(TrajError::MissingHeader {
                path: "bad.e".to_string(),
                keyword: "CentralBody"
            })
        );
    }

    #[test]
    fn test_parse_ignores_unknown() {
        let content = "stk.v.11.0\n# some comment\nBEGIN Ephemeris\nInterpolationMethod Lagrange\nScenarioEpoch 01 Jun 2023 12:00:00\nCentralBody Moon\nEphemerisTimePosVel\n\n0.0 1e6 0 0 0 1.6e3 0\nEND Ephemeris\nEND Ephemeris\n";
        let traj = Trajectory::parse_stk(content, "moon.e").unwrap();
        assert_eq!(traj.central_body, LUNA);
        assert_eq!(traj.len(), 1);
        assert_eq!(traj.states[0].velocity.y, 1.6e3);
    }
}
