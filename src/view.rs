//! Selection handling and the per-render snapshot.
//!
//! Data flows one way: a [`Selection`] is filtered into a subset, the subset
//! is aggregated, and every output of a render cycle reads the same
//! [`Snapshot`]. Nothing is cached between cycles.

use crate::aggregate::{self, Granularity, RegionAggregate, TimeAggregate};
use crate::config::DashboardConfig;
use crate::error::SchemaError;
use crate::record::{Money, SalesRecord};
use crate::table::SalesTable;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

/// Number of rows shown in the preview table.
pub const PREVIEW_ROWS: usize = 5;

/// Retailer and inclusive date range chosen in the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub retailer: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Raw control values as submitted by the browser. Missing or blank
/// values fall back to the dashboard defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewQuery {
    #[serde(default)]
    pub retailer: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub start: Option<NaiveDate>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub end: Option<NaiveDate>,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Shared, immutable context behind every request.
#[derive(Debug, Clone)]
pub struct Dashboard {
    table: Arc<SalesTable>,
    retailers: Vec<String>,
    bounds: (NaiveDate, NaiveDate),
    default_retailer: String,
    chart_size: (u32, u32),
}

impl Dashboard {
    /// Wraps a loaded table. The configured default retailer is used when the
    /// table has it, otherwise the first retailer in sorted order.
    pub fn new(table: Arc<SalesTable>, config: &DashboardConfig) -> Result<Self, SchemaError> {
        let bounds = table.date_bounds().ok_or(SchemaError::NoRecords)?;
        let retailers = table.retailers();
        let default_retailer = if retailers.contains(&config.default_retailer) {
            config.default_retailer.clone()
        } else {
            retailers.first().cloned().ok_or(SchemaError::NoRecords)?
        };

        Ok(Self {
            table,
            retailers,
            bounds,
            default_retailer,
            chart_size: (config.chart_width, config.chart_height),
        })
    }

    pub fn table(&self) -> &SalesTable {
        &self.table
    }

    /// Retailer choices for the dropdown, sorted ascending.
    pub fn retailers(&self) -> &[String] {
        &self.retailers
    }

    /// Earliest and latest invoice dates across the whole table.
    pub fn bounds(&self) -> (NaiveDate, NaiveDate) {
        self.bounds
    }

    pub fn default_retailer(&self) -> &str {
        &self.default_retailer
    }

    pub fn chart_size(&self) -> (u32, u32) {
        self.chart_size
    }

    pub fn default_selection(&self) -> Selection {
        Selection {
            retailer: self.default_retailer.clone(),
            start: self.bounds.0,
            end: self.bounds.1,
        }
    }

    /// Turns submitted control values into a selection.
    pub fn resolve(&self, query: &ViewQuery) -> Selection {
        let requested = query
            .retailer
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty());
        let retailer = match requested {
            Some(name) if self.retailers.iter().any(|known| known == name) => name.to_string(),
            Some(name) => {
                log::warn!(
                    "unknown retailer {:?}, falling back to {}",
                    name,
                    self.default_retailer
                );
                self.default_retailer.clone()
            }
            None => self.default_retailer.clone(),
        };

        Selection {
            retailer,
            start: query.start.unwrap_or(self.bounds.0),
            end: query.end.unwrap_or(self.bounds.1),
        }
    }

    pub fn snapshot(&self, selection: &Selection) -> Snapshot {
        Snapshot::compute(&self.table, selection)
    }
}

/// Everything one render cycle needs, computed once from a selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub selection: Selection,
    pub subset: SalesTable,
    pub by_region: RegionAggregate,
    pub daily: TimeAggregate,
    pub monthly: TimeAggregate,
    pub quarterly: TimeAggregate,
}

impl Snapshot {
    pub fn compute(table: &SalesTable, selection: &Selection) -> Self {
        let subset = table.filter(&selection.retailer, selection.start, selection.end);
        log::debug!(
            "recomputed {} {}..={}: {} records",
            selection.retailer,
            selection.start,
            selection.end,
            subset.len()
        );

        Self {
            selection: selection.clone(),
            by_region: aggregate::by_region(&subset),
            daily: aggregate::by_day(&subset),
            monthly: aggregate::by_month(&subset),
            quarterly: aggregate::by_quarter(&subset),
            subset,
        }
    }

    pub fn series(&self, granularity: Granularity) -> &TimeAggregate {
        match granularity {
            Granularity::Day => &self.daily,
            Granularity::Month => &self.monthly,
            Granularity::Quarter => &self.quarterly,
        }
    }

    /// The earliest-dated records of the subset.
    pub fn preview(&self) -> Vec<&SalesRecord> {
        self.subset.earliest(PREVIEW_ROWS)
    }

    pub fn summary(&self) -> Summary<'_> {
        Summary {
            selection: &self.selection,
            record_count: self.subset.len(),
            total_sales: self.subset.total_sales(),
            regions: self
                .by_region
                .iter()
                .map(|(region, total)| Bucket {
                    label: region.clone(),
                    total_sales: *total,
                })
                .collect(),
            daily: buckets(&self.daily),
            monthly: buckets(&self.monthly),
            quarterly: buckets(&self.quarterly),
            preview: self.preview(),
        }
    }
}

/// One labelled aggregate value, in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub total_sales: Money,
}

fn buckets(series: &TimeAggregate) -> Vec<Bucket> {
    series
        .iter()
        .map(|(period, total)| Bucket {
            label: period.to_string(),
            total_sales: *total,
        })
        .collect()
}

/// JSON view of a snapshot.
#[derive(Debug, Serialize)]
pub struct Summary<'a> {
    pub selection: &'a Selection,
    pub record_count: usize,
    pub total_sales: Money,
    pub regions: Vec<Bucket>,
    pub daily: Vec<Bucket>,
    pub monthly: Vec<Bucket>,
    pub quarterly: Vec<Bucket>,
    pub preview: Vec<&'a SalesRecord>,
}
