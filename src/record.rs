use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Fixed-point currency amount held as whole cents.
///
/// Spreadsheet values arrive as floats; they are rounded to the nearest cent
/// once at load time so that every later sum is exact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a float amount, rejecting NaN, infinities and values outside
    /// the representable range.
    pub fn from_f64(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }
        let cents = (amount * 100.0).round();
        if cents.abs() >= i64::MAX as f64 {
            return None;
        }
        Some(Money(cents as i64))
    }

    /// Parses currency text such as `1234.5`, `$1,234.50` or `-$20`.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let digits: String = rest
            .trim_start_matches('$')
            .chars()
            .filter(|c| *c != ',')
            .collect();
        if digits.is_empty() {
            return None;
        }
        let value: f64 = digits.parse().ok()?;
        Money::from_f64(if negative { -value } else { value })
    }

    pub fn cents(self) -> i64 {
        self.0
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

/// One cleaned row of the sales sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRecord {
    pub retailer: String,
    pub retailer_id: i64,
    pub invoice_date: NaiveDate,
    pub region: String,
    pub state: String,
    pub city: String,
    pub product: String,
    pub price_per_unit: Money,
    pub units_sold: i64,
    pub total_sales: Money,
    pub operating_profit: Money,
    pub operating_margin: f64,
    pub sales_method: String,
}

/// Column headers in sheet order.
pub const COLUMNS: [&str; 13] = [
    "Retailer",
    "Retailer ID",
    "Invoice Date",
    "Region",
    "State",
    "City",
    "Product",
    "Price per Unit",
    "Units Sold",
    "Total Sales",
    "Operating Profit",
    "Operating Margin",
    "Sales Method",
];

impl SalesRecord {
    /// Display strings for each column, in [`COLUMNS`] order.
    pub fn display_fields(&self) -> Vec<String> {
        vec![
            self.retailer.clone(),
            self.retailer_id.to_string(),
            self.invoice_date.format("%Y-%m-%d").to_string(),
            self.region.clone(),
            self.state.clone(),
            self.city.clone(),
            self.product.clone(),
            self.price_per_unit.to_string(),
            self.units_sold.to_string(),
            self.total_sales.to_string(),
            self.operating_profit.to_string(),
            format!("{:.2}", self.operating_margin),
            self.sales_method.clone(),
        ]
    }
}
