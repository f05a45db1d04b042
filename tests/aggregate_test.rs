mod common;

use common::{date, record, sample_table};
use sales_dashboard::aggregate::{by_day, by_month, by_quarter, by_region};
use sales_dashboard::{Money, Period, SalesTable, TimeAggregate};

fn subsets() -> Vec<SalesTable> {
    let table = sample_table();
    let mut subsets = vec![table.clone(), SalesTable::default()];
    for retailer in table.retailers() {
        subsets.push(table.filter(&retailer, date(2020, 1, 1), date(2021, 12, 31)));
        subsets.push(table.filter(&retailer, date(2020, 2, 1), date(2020, 12, 31)));
        subsets.push(table.filter(&retailer, date(2019, 1, 1), date(2019, 12, 31)));
    }
    subsets
}

fn assert_strictly_increasing(series: &TimeAggregate) {
    let keys: Vec<&Period> = series.keys().collect();
    for pair in keys.windows(2) {
        assert!(pair[0] < pair[1], "{} should precede {}", pair[0], pair[1]);
    }
}

#[test]
fn test_region_totals_sum_to_subset_total() {
    for subset in subsets() {
        let total: Money = by_region(&subset).values().sum();
        assert_eq!(total, subset.total_sales());
    }
    println!("✓ Region totals add up for every subset");
}

#[test]
fn test_time_totals_sum_to_subset_total() {
    for subset in subsets() {
        for series in [by_day(&subset), by_month(&subset), by_quarter(&subset)] {
            let total: Money = series.values().sum();
            assert_eq!(total, subset.total_sales());
            assert_strictly_increasing(&series);
        }
    }
    println!("✓ Day, month and quarter totals add up and stay chronological");
}

#[test]
fn test_region_grouping() {
    let walmart = sample_table().filter("Walmart", date(2020, 1, 1), date(2021, 12, 31));
    let regions = by_region(&walmart);

    let names: Vec<&str> = regions.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["Northeast", "South", "Southeast", "West"]);
    assert_eq!(regions["Southeast"], Money::from_cents(120_000 + 40_025 + 18_000 + 33_333));
    assert_eq!(regions["South"], Money::from_cents(75_000 + 22_000));
}

#[test]
fn test_daily_buckets_merge_same_date() {
    let walmart = sample_table().filter("Walmart", date(2020, 1, 1), date(2020, 1, 31));
    let daily = by_day(&walmart);
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[&Period::Day(date(2020, 1, 3))], Money::from_cents(160_025));
}

#[test]
fn test_monthly_and_quarterly_order_crosses_years() {
    let walmart = sample_table().filter("Walmart", date(2020, 1, 1), date(2021, 12, 31));

    let months: Vec<String> = by_month(&walmart).keys().map(ToString::to_string).collect();
    assert_eq!(
        months,
        vec!["2020-01", "2020-02", "2020-04", "2020-10", "2020-12", "2021-01", "2021-06"]
    );

    let quarters = by_quarter(&walmart);
    let labels: Vec<String> = quarters.keys().map(ToString::to_string).collect();
    assert_eq!(labels, vec!["2020Q1", "2020Q2", "2020Q4", "2021Q1", "2021Q2"]);
    assert_eq!(
        quarters[&Period::Quarter { year: 2020, quarter: 4 }],
        Money::from_cents(22_000 + 18_000)
    );
}

#[test]
fn test_foot_locker_example() {
    let table = SalesTable::new(vec![
        record("Foot Locker", date(2021, 1, 5), "West", 100_000),
        record("Foot Locker", date(2021, 2, 10), "West", 200_000),
    ]);
    let subset = table.filter("Foot Locker", date(2021, 1, 1), date(2021, 1, 31));

    let regions = by_region(&subset);
    assert_eq!(regions.len(), 1);
    assert_eq!(regions["West"], Money::from_cents(100_000));

    let months = by_month(&subset);
    assert_eq!(months.len(), 1);
    assert_eq!(
        months[&Period::Month { year: 2021, month: 1 }],
        Money::from_cents(100_000)
    );
}

#[test]
fn test_range_before_first_record_is_empty_everywhere() {
    let subset = sample_table().filter("Walmart", date(2019, 1, 1), date(2019, 12, 31));
    assert!(subset.is_empty());
    assert!(by_region(&subset).is_empty());
    assert!(by_day(&subset).is_empty());
    assert!(by_month(&subset).is_empty());
    assert!(by_quarter(&subset).is_empty());
    assert_eq!(by_region(&subset).values().sum::<Money>(), Money::ZERO);
}
