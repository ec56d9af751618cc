use crate::test_time_data;
use approx::assert_abs_diff_eq;
use arcprop::time::{LeapSecondTable, TimeDataProvider, TimeScale, TimeValue, Unit};
use rstest::*;

#[test]
fn leap_seconds_monotonic() {
    let data = test_time_data();
    // Nothing is tabulated before 1972
    assert_eq!(data.leap_seconds(-1.0e9).unwrap(), 0.0);

    let mut prev = 0.0;
    let mut t = -1.0e9;
    while t < 1.0e9 {
        let leap = data.leap_seconds(t).unwrap();
        assert!(leap >= prev, "leap seconds decreased at {t}");
        prev = leap;
        t += 86_400.0 * 30.0;
    }
    assert_eq!(prev, 37.0);
}

#[test]
fn leap_seconds_step() {
    let table = LeapSecondTable::from_entries(vec![(0.0, 32.0), (500.0, 33.0)]);
    assert_eq!(table.lookup(-0.1).unwrap(), 0.0);
    assert_eq!(table.lookup(0.0).unwrap(), 32.0);
    assert_eq!(table.lookup(499.9).unwrap(), 32.0);
    assert_eq!(table.lookup(1.0e6).unwrap(), 33.0);
}

#[rstest]
#[case(TimeScale::TAI)]
#[case(TimeScale::TT)]
#[case(TimeScale::TDB)]
#[case(TimeScale::UT1)]
fn scale_round_trip(#[case] scale: TimeScale) {
    let data = test_time_data();
    let utc = TimeValue::from_iso("2019-06-21T12:34:56", TimeScale::UTC).unwrap();
    let other = utc.to_scale_with(scale, &data).unwrap();
    assert_eq!(other.scale(), scale);
    let back = other.to_scale_with(TimeScale::UTC, &data).unwrap();
    assert_abs_diff_eq!(back.difference(&utc), 0.0, epsilon = 1e-6);
}

#[test]
fn tai_tt_offsets() {
    let data = test_time_data();
    let utc = TimeValue::from_iso("2019-06-21T00:00:00", TimeScale::UTC).unwrap();
    let tai = utc.to_scale_with(TimeScale::TAI, &data).unwrap();
    let tt = utc.to_scale_with(TimeScale::TT, &data).unwrap();
    assert_abs_diff_eq!(tai.difference(&utc), 37.0, epsilon = 1e-9);
    assert_abs_diff_eq!(tt.difference(&tai), 32.184, epsilon = 1e-9);
}

#[test]
fn iso_and_arithmetic() {
    let epoch: TimeValue = "2000-01-01T11:58:55.815918".parse().unwrap();
    assert_abs_diff_eq!(epoch.seconds_since_j2000(), 0.0, epsilon = 1e-6);
    assert_eq!(TimeValue::j2000().to_iso(), "2000-01-01T11:58:55.815918");

    let later = epoch + 1 * Unit::Day;
    assert_abs_diff_eq!(later.difference(&epoch), 86_400.0, epsilon = 1e-9);
    assert_abs_diff_eq!((later - epoch).to_seconds(), 86_400.0, epsilon = 1e-6);
    assert!(later > epoch);
    assert_abs_diff_eq!(later.increment(-86_400.0).difference(&epoch), 0.0, epsilon = 1e-6);

    let tdb: TimeValue = "2019-01-01T00:00:00 TDB".parse().unwrap();
    assert_eq!(tdb.scale(), TimeScale::TDB);
    assert!("2019-01-01T00:00:00 GPST".parse::<TimeValue>().is_err());
    assert!("not a date".parse::<TimeValue>().is_err());
}
