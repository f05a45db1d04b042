use crate::record::Money;
use crate::table::SalesTable;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Summed total sales per region, keyed in ascending name order.
pub type RegionAggregate = BTreeMap<String, Money>;

/// Summed total sales per time bucket, keyed in calendar order.
pub type TimeAggregate = BTreeMap<Period, Money>;

/// Time bucket granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Month,
    Quarter,
}

/// Calendar bucket an invoice date falls into
///
/// The derived ordering compares year before month or quarter, which is
/// calendar order. One aggregate only ever holds a single variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Period {
    Day(NaiveDate),
    Month { year: i32, month: u32 },
    Quarter { year: i32, quarter: u32 },
}

impl Period {
    pub fn of(date: NaiveDate, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Day => Period::Day(date),
            Granularity::Month => Period::Month {
                year: date.year(),
                month: date.month(),
            },
            Granularity::Quarter => Period::Quarter {
                year: date.year(),
                quarter: (date.month() - 1) / 3 + 1,
            },
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Day(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Period::Month { year, month } => write!(f, "{:04}-{:02}", year, month),
            Period::Quarter { year, quarter } => write!(f, "{:04}Q{}", year, quarter),
        }
    }
}

impl Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub fn by_region(subset: &SalesTable) -> RegionAggregate {
    let mut totals = RegionAggregate::new();
    for record in subset {
        *totals.entry(record.region.clone()).or_default() += record.total_sales;
    }
    totals
}

pub fn by_period(subset: &SalesTable, granularity: Granularity) -> TimeAggregate {
    let mut totals = TimeAggregate::new();
    for record in subset {
        *totals
            .entry(Period::of(record.invoice_date, granularity))
            .or_default() += record.total_sales;
    }
    totals
}

pub fn by_day(subset: &SalesTable) -> TimeAggregate {
    by_period(subset, Granularity::Day)
}

pub fn by_month(subset: &SalesTable) -> TimeAggregate {
    by_period(subset, Granularity::Month)
}

pub fn by_quarter(subset: &SalesTable) -> TimeAggregate {
    by_period(subset, Granularity::Quarter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn quarters_follow_calendar() {
        assert_eq!(
            Period::of(date(2021, 3, 31), Granularity::Quarter),
            Period::Quarter { year: 2021, quarter: 1 }
        );
        assert_eq!(
            Period::of(date(2021, 4, 1), Granularity::Quarter),
            Period::Quarter { year: 2021, quarter: 2 }
        );
        assert_eq!(
            Period::of(date(2021, 12, 1), Granularity::Quarter).to_string(),
            "2021Q4"
        );
    }

    #[test]
    fn months_sort_by_period_not_label() {
        // "2021-10" < "2021-9" as strings, but September comes first
        let september = Period::Month { year: 2021, month: 9 };
        let october = Period::Month { year: 2021, month: 10 };
        let next_january = Period::Month { year: 2022, month: 1 };
        assert!(september < october);
        assert!(october < next_january);
        assert_eq!(september.to_string(), "2021-09");
    }

    #[test]
    fn empty_subset_gives_empty_aggregates() {
        let empty = SalesTable::default();
        assert!(by_region(&empty).is_empty());
        assert!(by_day(&empty).is_empty());
        assert!(by_month(&empty).is_empty());
        assert!(by_quarter(&empty).is_empty());
    }
}
