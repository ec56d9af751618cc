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

use super::TimeError;
use lazy_static::lazy_static;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Default name of the leap second file in the data directory.
pub const LEAP_SECOND_FILE: &str = "leap_second.txt";
/// Default name of the IERS finals file in the data directory.
pub const FINALS_FILE: &str = "finals.all";

/// Provides the leap seconds and Earth orientation parameters needed by the time scale conversions.
pub trait TimeDataProvider: Send + Sync + fmt::Debug {
    /// Returns TAI - UTC, in seconds, at the provided UTC offset past J2000.
    fn leap_seconds(&self, seconds_since_j2000: f64) -> Result<f64, TimeError>;

    /// Returns the Earth orientation parameters at the provided Modified Julian Date.
    fn earth_orientation(&self, mjd: f64) -> Result<EopParams, TimeError>;
}

/// Step function of the leap seconds, ordered by their UTC offset past J2000.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LeapSecondTable {
    entries: Vec<(f64, f64)>,
}

impl LeapSecondTable {
    /// Builds the table from `(seconds since J2000, leap second value)` pairs, sorting them if needed.
    pub fn from_entries(mut entries: Vec<(f64, f64)>) -> Self {
        entries.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { entries }
    }

    /// Parses lines of `<seconds since J2000> <value>`; rows where either value is zero are skipped.
    pub fn parse(content: &str, path: &str) -> Result<Self, TimeError> {
        let mut entries = Vec::new();
        for (lno, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace().map(|f| f.parse::<f64>());
            match (fields.next(), fields.next()) {
                (Some(Ok(secs)), Some(Ok(val))) => {
                    if secs != 0.0 && val != 0.0 {
                        entries.push((secs, val));
                    }
                }
                _ => {
                    return Err(TimeError::DataFileParse {
                        path: path.to_string(),
                        line: lno + 1,
                        details: format!("expected two numbers, got `{line}`"),
                    })
                }
            }
        }
        Ok(Self::from_entries(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the leap second value in effect at the provided offset.
    ///
    /// Before the first entry this is zero, after the last entry the last known value is kept.
    pub fn lookup(&self, seconds_since_j2000: f64) -> Result<f64, TimeError> {
        if self.entries.is_empty() {
            return Err(TimeError::EmptyTable {
                table: "leap seconds",
            });
        }
        let idx = self
            .entries
            .partition_point(|(secs, _)| *secs <= seconds_since_j2000);
        if idx == 0 {
            Ok(0.0)
        } else {
            Ok(self.entries[idx - 1].1)
        }
    }
}

/// Earth orientation parameters at a given day.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct EopParams {
    pub mjd: f64,
    /// Polar motion x, in radians
    pub pm_x: f64,
    /// Polar motion y, in radians
    pub pm_y: f64,
    /// UT1 - UTC, in seconds
    pub ut1_utc: f64,
    /// Excess length of day, in seconds
    pub lod: f64,
    pub dx: f64,
    pub dy: f64,
}

impl EopParams {
    /// Seven element layout of the finals data: `[mjd, pm_x, pm_y, ut1_utc, lod, dx, dy]`.
    pub fn as_array(&self) -> [f64; 7] {
        [
            self.mjd,
            self.pm_x,
            self.pm_y,
            self.ut1_utc,
            self.lod,
            self.dx,
            self.dy,
        ]
    }
}

/// Daily Earth orientation parameters, ordered by MJD. An empty table yields all zeros.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EopTable {
    rows: Vec<EopParams>,
}

impl EopTable {
    pub fn from_rows(mut rows: Vec<EopParams>) -> Self {
        rows.sort_by(|a, b| a.mjd.total_cmp(&b.mjd));
        Self { rows }
    }

    /// Parses the fixed width IERS `finals.all` format (polar motion in arcseconds, UT1-UTC in seconds).
    /// Rows without the Bulletin A polar motion and UT1 values are skipped.
    pub fn parse_finals(content: &str) -> Self {
        let field = |line: &str, start: usize, end: usize| -> Option<f64> {
            line.get(start..end.min(line.len()))
                .and_then(|s| s.trim().parse::<f64>().ok())
        };
        let rows = content
            .lines()
            .filter_map(|line| {
                Some(EopParams {
                    mjd: field(line, 7, 15)?,
                    pm_x: crate::utils::arcsec_to_radians(field(line, 18, 27)?),
                    pm_y: crate::utils::arcsec_to_radians(field(line, 37, 46)?),
                    ut1_utc: field(line, 58, 68)?,
                    lod: field(line, 79, 86).unwrap_or(0.0) * 1e-3,
                    dx: 0.0,
                    dy: 0.0,
                })
            })
            .collect();
        Self::from_rows(rows)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the parameters of the day containing the provided MJD, or zeros outside of the table.
    pub fn lookup(&self, mjd: f64) -> EopParams {
        let idx = self.rows.partition_point(|row| row.mjd <= mjd);
        if idx == 0 || (idx == self.rows.len() && mjd >= self.rows[idx - 1].mjd + 1.0) {
            EopParams {
                mjd,
                ..Default::default()
            }
        } else {
            self.rows[idx - 1]
        }
    }
}

/// In-memory time data, mostly useful for tests and embedded data.
#[derive(Clone, Debug, Default)]
pub struct StaticTimeData {
    pub leap_seconds: LeapSecondTable,
    pub eop: EopTable,
}

impl StaticTimeData {
    pub fn new(leap_seconds: LeapSecondTable, eop: EopTable) -> Self {
        Self { leap_seconds, eop }
    }
}

impl TimeDataProvider for StaticTimeData {
    fn leap_seconds(&self, seconds_since_j2000: f64) -> Result<f64, TimeError> {
        self.leap_seconds.lookup(seconds_since_j2000)
    }

    fn earth_orientation(&self, mjd: f64) -> Result<EopParams, TimeError> {
        Ok(self.eop.lookup(mjd))
    }
}

/// File backed time data, loaded on first use and cached until [FileTimeData::reset].
///
/// The leap second file is required. The finals file is optional: when missing, the
/// Earth orientation parameters are all zeros.
#[derive(Debug)]
pub struct FileTimeData {
    data_dir: PathBuf,
    leap_seconds: RwLock<Option<Arc<LeapSecondTable>>>,
    eop: RwLock<Option<Arc<EopTable>>>,
}

impl Default for FileTimeData {
    fn default() -> Self {
        Self::new("data")
    }
}

impl FileTimeData {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            leap_seconds: RwLock::new(None),
            eop: RwLock::new(None),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Drops the cached tables so that the next lookup reads the files again.
    pub fn reset(&self) {
        *self
            .leap_seconds
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        *self.eop.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn leap_table(&self) -> Result<Arc<LeapSecondTable>, TimeError> {
        if let Some(table) = self
            .leap_seconds
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Ok(table.clone());
        }
        let mut guard = self
            .leap_seconds
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        // Another thread may have loaded it while we were waiting on the lock
        if let Some(table) = guard.as_ref() {
            return Ok(table.clone());
        }
        let path = self.data_dir.join(LEAP_SECOND_FILE);
        let path_str = path.display().to_string();
        let content = fs::read_to_string(&path).map_err(|e| TimeError::DataFileRead {
            path: path_str.clone(),
            details: e.to_string(),
        })?;
        let table = LeapSecondTable::parse(&content, &path_str)?;
        if table.is_empty() {
            return Err(TimeError::EmptyTable {
                table: "leap seconds",
            });
        }
        debug!("loaded {} leap seconds from {path_str}", table.len());
        let table = Arc::new(table);
        *guard = Some(table.clone());
        Ok(table)
    }

    fn eop_table(&self) -> Arc<EopTable> {
        if let Some(table) = self
            .eop
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return table.clone();
        }
        let mut guard = self.eop.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(table) = guard.as_ref() {
            return table.clone();
        }
        let path = self.data_dir.join(FINALS_FILE);
        let table = match fs::read_to_string(&path) {
            Ok(content) => {
                let table = EopTable::parse_finals(&content);
                debug!("loaded {} EOP rows from {}", table.len(), path.display());
                table
            }
            Err(e) => {
                debug!("no EOP data ({e}), using zero polar motion and UT1-UTC");
                EopTable::default()
            }
        };
        let table = Arc::new(table);
        *guard = Some(table.clone());
        table
    }
}

impl TimeDataProvider for FileTimeData {
    fn leap_seconds(&self, seconds_since_j2000: f64) -> Result<f64, TimeError> {
        self.leap_table()?.lookup(seconds_since_j2000)
    }

    fn earth_orientation(&self, mjd: f64) -> Result<EopParams, TimeError> {
        Ok(self.eop_table().lookup(mjd))
    }
}

lazy_static! {
    static ref TIME_DATA: RwLock<Arc<dyn TimeDataProvider>> =
        RwLock::new(Arc::new(FileTimeData::default()));
}

/// Returns the process-wide time data provider, which reads from `data/` unless replaced.
pub fn time_data() -> Arc<dyn TimeDataProvider> {
    TIME_DATA
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Replaces the process-wide time data provider.
pub fn set_time_data_provider(provider: Arc<dyn TimeDataProvider>) {
    *TIME_DATA.write().unwrap_or_else(PoisonError::into_inner) = provider;
}

#[cfg(test)]
mod ut_time_data {
    use super::*;

    #[test]
    fn test_leap_lookup() {
        let table = LeapSecondTable::from_entries(vec![(100.0, 11.0), (-50.0, 10.0), (300.0, 12.0)]);
        assert_eq!(table.lookup(-51.0).unwrap(), 0.0);
        assert_eq!(table.lookup(-50.0).unwrap(), 10.0);
        assert_eq!(table.lookup(99.9).unwrap(), 10.0);
        assert_eq!(table.lookup(100.0).unwrap(), 11.0);
        // Second to last interval, which a linear scan stopping early would miss
        assert_eq!(table.lookup(299.0).unwrap(), 11.0);
        assert_eq!(table.lookup(300.0).unwrap(), 12.0);
        assert_eq!(table.lookup(1e9).unwrap(), 12.0);
    }

    #[test]
    fn test_leap_monotonic() {
        let table = LeapSecondTable::from_entries(vec![(0.0, 1.0), (10.0, 2.0), (20.0, 5.0)]);
        let mut prev = table.lookup(-100.0).unwrap();
        assert_eq!(prev, 0.0);
        for i in -100..100 {
            let cur = table.lookup(f64::from(i) * 0.5).unwrap();
            assert!(cur >= prev);
            prev = cur;
        }
    }

    #[test]
    fn test_empty_leap_table() {
        assert_eq!(
            LeapSecondTable::default().lookup(0.0),
            Err(TimeError::EmptyTable {
                table: "leap seconds"
            })
        );
    }

    #[test]
    fn test_leap_parse() {
        let table = LeapSecondTable::parse("# header\n-10.5 10\n0 5\n20.0 0\n30 11\n\n", "mem").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup(31.0).unwrap(), 11.0);
        assert!(matches!(
            LeapSecondTable::parse("12 abc", "mem"),
            Err(TimeError::DataFileParse { line: 1, .. })
        ));
    }

    #[test]
    fn test_eop_lookup() {
        let table = EopTable::from_rows(vec![
            EopParams {
                mjd: 51544.0,
                pm_x: 1e-7,
                pm_y: 2e-7,
                ut1_utc: 0.35,
                ..Default::default()
            },
            EopParams {
                mjd: 51545.0,
                pm_x: 3e-7,
                pm_y: 4e-7,
                ut1_utc: 0.34,
                ..Default::default()
            },
        ]);
        assert_eq!(table.lookup(51544.5).ut1_utc, 0.35);
        assert_eq!(table.lookup(51545.2).as_array()[3], 0.34);
        assert_eq!(table.lookup(51543.0).ut1_utc, 0.0);
        assert_eq!(table.lookup(51547.0).as_array()[1..], [0.0; 6]);
        assert!(EopTable::default().lookup(51544.0).as_array()[1..]
            .iter()
            .all(|v| *v == 0.0));
    }

    #[test]
    fn test_file_provider() {
        let provider = FileTimeData::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data"));
        // 2017 leap second
        assert_eq!(provider.leap_seconds(6e8).unwrap(), 37.0);
        assert_eq!(provider.leap_seconds(-1e10).unwrap(), 0.0);
        provider.reset();
        assert_eq!(provider.leap_seconds(0.0).unwrap(), 32.0);

        let missing = FileTimeData::new("/nonexistent/arcprop");
        assert!(matches!(
            missing.leap_seconds(0.0),
            Err(TimeError::DataFileRead { .. })
        ));
        // Missing finals are not an error
        assert_eq!(missing.earth_orientation(51544.0).unwrap().ut1_utc, 0.0);
    }
}
