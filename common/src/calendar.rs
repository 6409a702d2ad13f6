//! Business (Jalali) calendar adapter.
//!
//! Entities carry their business dates as [`Date`] labels in the
//! `YYYY/MM/DD` form, while absolute ordering and storage comparisons go
//! through the proleptic Gregorian conversion provided here. The civil
//! conversion is the standard break-year Jalaali algorithm over Julian day
//! numbers.

use std::{fmt, str::FromStr};

use derive_more::{Display, Error};

use crate::DateTimeOf;

/// Years at which the length of the 33-year leap cycle changes.
const BREAKS: [i32; 20] = [
    -61, 9, 38, 199, 426, 686, 756, 818, 1111, 1181, 1210, 1635, 2060, 2097,
    2192, 2262, 2324, 2394, 2456, 3178,
];

/// A date in the business calendar.
#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(try_from = "String", into = "String")
)]
pub struct Date {
    /// Year of this [`Date`].
    year: u16,

    /// Month of this [`Date`], `1..=12`.
    month: u8,

    /// Day of this [`Date`], `1..=31`.
    day: u8,
}

impl Date {
    /// Creates a new [`Date`] if the given components form a valid business
    /// calendar date.
    #[must_use]
    pub fn new(year: u16, month: u8, day: u8) -> Option<Self> {
        if i32::from(year) >= BREAKS[BREAKS.len() - 1] {
            return None;
        }
        if month < 1 || month > 12 || day < 1 {
            return None;
        }
        if day > days_in_month(year, month) {
            return None;
        }
        Some(Self { year, month, day })
    }

    /// Returns the year of this [`Date`].
    #[must_use]
    pub const fn year(self) -> u16 {
        self.year
    }

    /// Returns the month of this [`Date`], `1..=12`.
    #[must_use]
    pub const fn month(self) -> u8 {
        self.month
    }

    /// Returns the day of this [`Date`], `1..=31`.
    #[must_use]
    pub const fn day(self) -> u8 {
        self.day
    }

    /// Creates a new [`Date`] from the provided proleptic Gregorian date.
    #[must_use]
    pub fn from_gregorian(year: i32, month: u8, day: u8) -> Self {
        let (jy, jm, jd) = d2j(g2d(year, i32::from(month), i32::from(day)));
        Self {
            year: jy.try_into().unwrap_or(0),
            month: jm as u8,
            day: jd as u8,
        }
    }

    /// Returns the proleptic Gregorian `(year, month, day)` of this [`Date`].
    #[must_use]
    pub fn to_gregorian(self) -> (i32, u8, u8) {
        let (gy, gm, gd) = d2g(self.julian_day());
        (gy, gm as u8, gd as u8)
    }

    /// Creates a new [`Date`] labelling the day the provided instant falls
    /// on (UTC).
    #[must_use]
    pub fn from_datetime<Of: ?Sized>(dt: &DateTimeOf<Of>) -> Self {
        let (gy, gm, gd) = dt.date_parts();
        Self::from_gregorian(gy, gm, gd)
    }

    /// Creates a new [`Date`] labelling the current day (UTC).
    #[must_use]
    pub fn today() -> Self {
        Self::from_datetime(&DateTimeOf::<()>::now())
    }

    /// Returns the Julian day number of this [`Date`].
    #[must_use]
    pub fn julian_day(self) -> i32 {
        j2d(
            i32::from(self.year),
            i32::from(self.month),
            i32::from(self.day),
        )
    }

    /// Returns this [`Date`] shifted by the provided number of days.
    #[must_use]
    pub fn offset(self, days: i32) -> Self {
        let (jy, jm, jd) = d2j(self.julian_day() + days);
        Self {
            year: jy.try_into().unwrap_or(0),
            month: jm as u8,
            day: jd as u8,
        }
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}/{:02}/{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for Date {
    type Err = InvalidDate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/');
        let year = parts.next().and_then(|p| p.parse().ok());
        let month = parts.next().and_then(|p| p.parse().ok());
        let day = parts.next().and_then(|p| p.parse().ok());
        if parts.next().is_some() {
            return Err(InvalidDate);
        }
        match (year, month, day) {
            (Some(y), Some(m), Some(d)) => {
                Self::new(y, m, d).ok_or(InvalidDate)
            }
            _ => Err(InvalidDate),
        }
    }
}

impl TryFrom<String> for Date {
    type Error = InvalidDate;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Date> for String {
    fn from(date: Date) -> Self {
        date.to_string()
    }
}

/// Error of parsing a [`Date`] from a `YYYY/MM/DD` label.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("invalid business calendar date")]
pub struct InvalidDate;

/// Indicates whether the provided business year is a leap year.
#[must_use]
pub fn is_leap_year(year: u16) -> bool {
    jal_cal(i32::from(year)).leap == 0
}

/// Returns the number of days in the provided business month.
#[must_use]
pub fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1..=6 => 31,
        7..=11 => 30,
        12 => {
            if is_leap_year(year) {
                30
            } else {
                29
            }
        }
        _ => 0,
    }
}

/// Returns `n` consecutive day labels starting at `from` (inclusive).
#[must_use]
pub fn next_days(from: Date, n: usize) -> Vec<Date> {
    (0..n).map(|i| from.offset(i as i32)).collect()
}

/// Returns `n` consecutive day labels ending at `until` (inclusive), oldest
/// first.
#[must_use]
pub fn past_days(until: Date, n: usize) -> Vec<Date> {
    let n = i32::try_from(n).unwrap_or(i32::MAX);
    (0..n).rev().map(|i| until.offset(-i)).collect()
}

/// Returns every day label of the provided business month, in order.
#[must_use]
pub fn month_days(year: u16, month: u8) -> Vec<Date> {
    (1..=days_in_month(year, month))
        .filter_map(|day| Date::new(year, month, day))
        .collect()
}

/// Result of the break-year cycle computation for a single business year.
struct Cycle {
    /// Years passed since the last leap year, `0..=4` (`0` means the year
    /// itself is leap).
    leap: i32,

    /// Gregorian year the business year's first day falls into.
    gy: i32,

    /// Gregorian March day of the business year's first day.
    march: i32,
}

/// Computes the leap cycle data of the provided business year.
fn jal_cal(jy: i32) -> Cycle {
    let gy = jy + 621;
    let mut leap_j = -14;
    let mut jp = BREAKS[0];
    let mut jump = 0;

    for &jm in &BREAKS[1..] {
        jump = jm - jp;
        if jy < jm {
            break;
        }
        leap_j += jump / 33 * 8 + jump % 33 / 4;
        jp = jm;
    }

    let mut n = jy - jp;
    leap_j += n / 33 * 8 + (n % 33 + 3) / 4;
    if jump % 33 == 4 && jump - n == 4 {
        leap_j += 1;
    }

    let leap_g = gy / 4 - (gy / 100 + 1) * 3 / 4 - 150;
    let march = 20 + leap_j - leap_g;

    if jump - n < 6 {
        n = n - jump + (jump + 4) / 33 * 33;
    }
    let mut leap = ((n + 1) % 33 - 1) % 4;
    if leap == -1 {
        leap = 4;
    }

    Cycle { leap, gy, march }
}

/// Converts a business date to its Julian day number.
fn j2d(jy: i32, jm: i32, jd: i32) -> i32 {
    let r = jal_cal(jy);
    g2d(r.gy, 3, r.march) + (jm - 1) * 31 - jm / 7 * (jm - 7) + jd - 1
}

/// Converts a Julian day number to a business `(year, month, day)`.
fn d2j(jdn: i32) -> (i32, i32, i32) {
    let (gy, _, _) = d2g(jdn);
    let mut jy = gy - 621;
    let r = jal_cal(jy);
    let jdn1f = g2d(gy, 3, r.march);

    let mut k = jdn - jdn1f;
    if k >= 0 {
        if k <= 185 {
            return (jy, 1 + k / 31, k % 31 + 1);
        }
        k -= 186;
    } else {
        jy -= 1;
        k += 179;
        if r.leap == 1 {
            k += 1;
        }
    }
    (jy, 7 + k / 30, k % 30 + 1)
}

/// Converts a proleptic Gregorian date to its Julian day number.
fn g2d(gy: i32, gm: i32, gd: i32) -> i32 {
    let d = (gy + (gm - 8) / 6 + 100_100) * 1461 / 4
        + (153 * ((gm + 9) % 12) + 2) / 5
        + gd
        - 34_840_408;
    d - (gy + 100_100 + (gm - 8) / 6) / 100 * 3 / 4 + 752
}

/// Converts a Julian day number to a proleptic Gregorian
/// `(year, month, day)`.
fn d2g(jdn: i32) -> (i32, i32, i32) {
    let mut j = 4 * jdn + 139_361_631;
    j += (4 * jdn + 183_187_720) / 146_097 * 3 / 4 * 4 - 3908;
    let i = j % 1461 / 4 * 5 + 308;
    let gd = i % 153 / 5 + 1;
    let gm = i / 153 % 12 + 1;
    let gy = j / 1461 - 100_100 + (8 - gm) / 12;
    (gy, gm, gd)
}

#[cfg(test)]
mod spec {
    use super::{
        days_in_month, is_leap_year, month_days, next_days, past_days, Date,
    };

    #[test]
    fn converts_known_dates() {
        assert_eq!(
            Date::from_gregorian(2024, 3, 20),
            Date::new(1403, 1, 1).unwrap(),
        );
        assert_eq!(
            Date::from_gregorian(2026, 3, 21),
            Date::new(1405, 1, 1).unwrap(),
        );
        assert_eq!(
            Date::from_gregorian(1970, 1, 1),
            Date::new(1348, 10, 11).unwrap(),
        );
    }

    #[test]
    fn round_trips() {
        for (y, m, d) in [(1403, 1, 1), (1403, 12, 30), (1405, 5, 15)] {
            let date = Date::new(y, m, d).unwrap();
            let (gy, gm, gd) = date.to_gregorian();
            assert_eq!(Date::from_gregorian(gy, gm, gd), date);
        }
    }

    #[test]
    fn leap_years() {
        assert!(is_leap_year(1399));
        assert!(is_leap_year(1403));
        assert!(!is_leap_year(1404));
        assert_eq!(days_in_month(1403, 12), 30);
        assert_eq!(days_in_month(1404, 12), 29);
    }

    #[test]
    fn validates_components() {
        assert!(Date::new(1403, 12, 30).is_some());
        assert!(Date::new(1404, 12, 30).is_none());
        assert!(Date::new(1403, 13, 1).is_none());
        assert!(Date::new(1403, 0, 1).is_none());
        assert!(Date::new(1403, 1, 32).is_none());
    }

    #[test]
    fn labels() {
        let date = Date::new(1405, 5, 15).unwrap();
        assert_eq!(date.to_string(), "1405/05/15");
        assert_eq!("1405/05/15".parse::<Date>().unwrap(), date);
        assert!("1405-05-15".parse::<Date>().is_err());
        assert!("1405/13/01".parse::<Date>().is_err());
    }

    #[test]
    fn windows_cross_month_bounds() {
        let from = Date::new(1403, 6, 30).unwrap();
        let days = next_days(from, 3);
        assert_eq!(days[0], from);
        assert_eq!(days[1], Date::new(1403, 6, 31).unwrap());
        assert_eq!(days[2], Date::new(1403, 7, 1).unwrap());

        let until = Date::new(1404, 1, 1).unwrap();
        let days = past_days(until, 2);
        assert_eq!(days[0], Date::new(1403, 12, 30).unwrap());
        assert_eq!(days[1], until);

        assert_eq!(month_days(1403, 12).len(), 30);
        assert_eq!(month_days(1404, 12).len(), 29);
    }
}
