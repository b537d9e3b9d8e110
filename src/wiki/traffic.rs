// src/wiki/traffic.rs
//
// Monthly pageview series and the four rollups written per case.

use std::collections::BTreeMap;
use std::fmt;

use time::Date;

use crate::config::consts::UNAVAILABLE;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u8,
}

pub type MonthlySeries = BTreeMap<YearMonth, u64>;

impl YearMonth {
    pub fn new(year: i32, month: u8) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: Date) -> Self {
        Self { year: date.year(), month: u8::from(date.month()) }
    }

    fn index(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    fn from_index(i: i64) -> Self {
        Self {
            year: i.div_euclid(12) as i32,
            month: (i.rem_euclid(12) + 1) as u8,
        }
    }

    /// Shift by `months` (negative goes back).
    pub fn offset(self, months: i64) -> Self {
        Self::from_index(self.index() + months)
    }

    /// "2015070100" (pageview API form) → 2015-07.
    pub fn parse_timestamp(ts: &str) -> Option<Self> {
        let year = ts.get(0..4)?.parse().ok()?;
        let month = ts.get(4..6)?.parse().ok()?;
        Self::new(year, month)
    }

    pub fn api_timestamp(self) -> String {
        format!("{:04}{:02}0100", self.year, self.month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Last fully completed month relative to `today`.
pub fn reference_month(today: Date) -> YearMonth {
    YearMonth::from_date(today).offset(-1)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rollups {
    pub all_time: u64,
    pub last_12_months: u64,
    pub last_6_months: u64,
    pub last_month: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Traffic {
    Available(Rollups),
    /// Pageviews could not be fetched after retries.
    Unavailable,
}

impl Traffic {
    /// Cells in VIEW_COLUMNS order.
    pub fn cells(&self) -> [String; 4] {
        match self {
            Traffic::Available(r) => [
                r.all_time.to_string(),
                r.last_12_months.to_string(),
                r.last_6_months.to_string(),
                r.last_month.to_string(),
            ],
            Traffic::Unavailable => std::array::from_fn(|_| s!(UNAVAILABLE)),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Traffic::Available(_))
    }
}

/// Trailing windows end at `reference` inclusive. Months missing from the
/// series count as zero. Months after `reference` are ignored.
pub fn rollups(series: &MonthlySeries, reference: YearMonth) -> Rollups {
    let trailing = |n: i64| -> u64 {
        let from = reference.offset(1 - n);
        series.range(from..=reference).map(|(_, v)| *v).sum()
    };
    Rollups {
        all_time: series.range(..=reference).map(|(_, v)| *v).sum(),
        last_12_months: trailing(12),
        last_6_months: trailing(6),
        last_month: trailing(1),
    }
}

/// Months with views recorded before the API's reliable start.
pub fn early_months(series: &MonthlySeries, reliable_from: YearMonth) -> usize {
    series.range(..reliable_from).filter(|(_, v)| **v > 0).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn ym(y: i32, m: u8) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    #[test]
    fn offsets_cross_year_boundaries() {
        assert_eq!(ym(2024, 1).offset(-1), ym(2023, 12));
        assert_eq!(ym(2023, 12).offset(1), ym(2024, 1));
        assert_eq!(ym(2024, 6).offset(-17), ym(2023, 1));
    }

    #[test]
    fn reference_is_previous_month() {
        assert_eq!(reference_month(date!(2024 - 03 - 15)), ym(2024, 2));
        assert_eq!(reference_month(date!(2024 - 01 - 01)), ym(2023, 12));
    }

    #[test]
    fn timestamps() {
        assert_eq!(YearMonth::parse_timestamp("2015070100"), Some(ym(2015, 7)));
        assert_eq!(YearMonth::parse_timestamp("2015130100"), None);
        assert_eq!(ym(2008, 1).api_timestamp(), "2008010100");
        assert_eq!(ym(2008, 1).to_string(), "2008-01");
    }

    #[test]
    fn rollups_treat_gaps_as_zero() {
        let mut s = MonthlySeries::new();
        // 2023-01 .. 2024-02 at 10 each, with 2023-11 missing
        for i in 0..14 {
            let m = ym(2023, 1).offset(i);
            if m != ym(2023, 11) {
                s.insert(m, 10);
            }
        }
        s.insert(ym(2010, 5), 1000);

        let r = rollups(&s, ym(2024, 2));
        assert_eq!(r.last_month, 10);
        assert_eq!(r.last_6_months, 50);
        assert_eq!(r.last_12_months, 110);
        assert_eq!(r.all_time, 1130);
        assert!(r.all_time >= r.last_12_months && r.last_12_months >= r.last_6_months);
    }

    #[test]
    fn months_after_reference_ignored() {
        let mut s = MonthlySeries::new();
        s.insert(ym(2024, 2), 5);
        s.insert(ym(2024, 3), 999);
        let r = rollups(&s, ym(2024, 2));
        assert_eq!(r, Rollups { all_time: 5, last_12_months: 5, last_6_months: 5, last_month: 5 });
    }

    #[test]
    fn empty_series_is_all_zero() {
        assert_eq!(rollups(&MonthlySeries::new(), ym(2024, 2)), Rollups::default());
    }

    #[test]
    fn unavailable_cells() {
        assert_eq!(Traffic::Unavailable.cells(), [UNAVAILABLE; 4].map(|c| s!(c)));
    }

    #[test]
    fn counts_early_months() {
        let mut s = MonthlySeries::new();
        s.insert(ym(2014, 3), 4);
        s.insert(ym(2015, 6), 0);
        s.insert(ym(2015, 7), 9);
        assert_eq!(early_months(&s, ym(2015, 7)), 1);
    }
}
