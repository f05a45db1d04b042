#![allow(dead_code)]

use chrono::NaiveDate;
use sales_dashboard::{Money, SalesRecord, SalesTable};
use std::fs;
use std::path::{Path, PathBuf};

pub const HEADER: &str = "Retailer,Retailer ID,Invoice Date,Region,State,City,Product,Price per Unit,Units Sold,Total Sales,Operating Profit,Operating Margin,Sales Method";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// Helper to build a record with the fields the filter and aggregates look at
pub fn record(retailer: &str, invoice_date: NaiveDate, region: &str, total_cents: i64) -> SalesRecord {
    SalesRecord {
        retailer: retailer.to_string(),
        retailer_id: 1185732,
        invoice_date,
        region: region.to_string(),
        state: "New York".to_string(),
        city: "New York".to_string(),
        product: "Men's Street Footwear".to_string(),
        price_per_unit: Money::from_cents(5000),
        units_sold: 12,
        total_sales: Money::from_cents(total_cents),
        operating_profit: Money::from_cents(total_cents / 2),
        operating_margin: 0.5,
        sales_method: "In-store".to_string(),
    }
}

/// A mixed table: several retailers, regions, months and quarters, with some
/// dates repeated so that daily buckets merge rows.
pub fn sample_table() -> SalesTable {
    SalesTable::new(vec![
        record("Walmart", date(2020, 1, 3), "Southeast", 120_000),
        record("Foot Locker", date(2020, 1, 3), "Northeast", 98_050),
        record("Walmart", date(2020, 1, 3), "Southeast", 40_025),
        record("Walmart", date(2020, 2, 14), "South", 75_000),
        record("Amazon", date(2020, 3, 31), "West", 310_000),
        record("Walmart", date(2020, 4, 1), "West", 64_000),
        record("Foot Locker", date(2020, 9, 30), "Midwest", 55_500),
        record("Walmart", date(2020, 10, 1), "South", 22_000),
        record("Walmart", date(2020, 12, 31), "Southeast", 18_000),
        record("Kohl's", date(2021, 1, 1), "West", 43_210),
        record("Walmart", date(2021, 1, 1), "Northeast", 91_000),
        record("Walmart", date(2021, 6, 15), "Southeast", 33_333),
        record("Foot Locker", date(2021, 12, 31), "West", 12_345),
    ])
}

/// One CSV data line, without the leading throwaway column.
pub fn csv_line(retailer: &str, invoice_date: &str, region: &str, total_sales: &str) -> String {
    format!(
        "{},1185732,{},{},California,San Francisco,Men's Street Footwear,50,20,{},350,0.35,In-store",
        retailer, invoice_date, region, total_sales
    )
}

/// A full sheet in the source layout: three banner rows, then the header and
/// data rows, each behind one empty leading column.
pub fn sheet_csv(header: &str, lines: &[String]) -> String {
    let mut content = String::from(",Adidas Sales Database\n,\n,\n");
    content.push(',');
    content.push_str(header);
    content.push('\n');
    for line in lines {
        content.push(',');
        content.push_str(line);
        content.push('\n');
    }
    content
}

pub fn write_fixture(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("fixture should be writable");
    path
}
