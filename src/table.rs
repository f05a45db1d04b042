use crate::record::{Money, SalesRecord};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Ordered, read-only collection of cleaned sales records.
///
/// The full table is built once by the loader and shared behind an `Arc`;
/// filtered subsets are fresh tables that are dropped after each render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesTable {
    records: Vec<SalesRecord>,
}

impl SalesTable {
    pub fn new(records: Vec<SalesRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SalesRecord> {
        self.records.iter()
    }

    /// Rows for `retailer` (exact, case-sensitive match) whose invoice date
    /// lies in `[start, end]`. An inverted range yields an empty table.
    pub fn filter(&self, retailer: &str, start: NaiveDate, end: NaiveDate) -> SalesTable {
        let records = self
            .records
            .iter()
            .filter(|r| r.retailer == retailer)
            .filter(|r| r.invoice_date >= start && r.invoice_date <= end)
            .cloned()
            .collect();
        SalesTable { records }
    }

    /// Distinct retailer names in ascending order.
    pub fn retailers(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.retailer.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Earliest and latest invoice dates, or `None` for an empty table.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.invoice_date).min()?;
        let max = self.records.iter().map(|r| r.invoice_date).max()?;
        Some((min, max))
    }

    pub fn total_sales(&self) -> Money {
        self.records.iter().map(|r| r.total_sales).sum()
    }

    /// The first `n` records by invoice date; ties keep file order.
    pub fn earliest(&self, n: usize) -> Vec<&SalesRecord> {
        let mut sorted: Vec<&SalesRecord> = self.records.iter().collect();
        sorted.sort_by_key(|r| r.invoice_date);
        sorted.truncate(n);
        sorted
    }
}

impl<'a> IntoIterator for &'a SalesTable {
    type Item = &'a SalesRecord;
    type IntoIter = std::slice::Iter<'a, SalesRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<SalesRecord> for SalesTable {
    fn from_iter<I: IntoIterator<Item = SalesRecord>>(iter: I) -> Self {
        SalesTable {
            records: iter.into_iter().collect(),
        }
    }
}
