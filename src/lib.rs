/*!
# Sales Dashboard

A browser-based dashboard over a spreadsheet of retail sales records, built in Rust.

## Overview

The operator points the server at one workbook (or a CSV export of it). The
sheet is loaded and cleaned once at startup and held in memory, read-only,
for the life of the process. A user then picks a retailer and an inclusive
date range and gets regional and time-series rollups of total sales.

## Architecture

Data moves through a simple chain; each stage is pure and recomputed
whenever its input changes:

```text
controls (retailer, date range)
   -> filter      SalesTable::filter
   -> aggregate   by_region / by_day / by_month / by_quarter
   -> render      bar, pie, three line charts, preview table
```

### Backend Layer
- **Technologies**: Rust, axum, handlebars, plotters
- **Core Components**:
  - Loader/Cleaner - Reads xlsx/xls/ods (calamine) or CSV, strips the banner, checks the header, types every cell
  - Filter Engine - Retailer and inclusive date-range subset
  - Aggregator - Sums of total sales by region and by day, month and quarter
  - Presentation - SVG charts and the dashboard page

### Frontend Layer
- **Technologies**: HTML, CSS
- A single page with a retailer dropdown and a date range. Changing either
  one resubmits the form, which recomputes the page.

## Modules

- **record**: `SalesRecord` and the fixed-point `Money` type
- **table**: `SalesTable` with filtering and table-wide queries
- **loader**: File loading and cleaning
- **aggregate**: Region and calendar-period rollups
- **view**: Selection resolution and the per-render `Snapshot`
- **charts**: Chart generation with plotters
- **page**: Dashboard page rendering
- **downloader**: Export of the filtered subset (CSV, XLSX)
- **app**: Routing
- **config**: Runtime settings
- **error**: Error types

## REST API Endpoints

All endpoints take the optional query parameters `retailer`, `start` and `end`.

- `/` - The dashboard page
- `/charts/{bar|pie|daily|monthly|quarterly}` - One chart as SVG (204 when empty)
- `/api/summary` - Aggregates and preview rows as JSON
- `/export/csv`, `/export/xlsx` - The filtered records as a download
*/

pub mod aggregate;
#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod charts;
pub mod config;
pub mod downloader;
pub mod error;
pub mod loader;
#[cfg(feature = "web")]
pub mod page;
pub mod record;
pub mod table;
pub mod view;

pub use aggregate::{Granularity, Period, RegionAggregate, TimeAggregate};
pub use config::DashboardConfig;
pub use error::{DashboardError, LoadError, RenderError, SchemaError};
pub use loader::load_table;
pub use record::{Money, SalesRecord};
pub use table::SalesTable;
pub use view::{Dashboard, Selection, Snapshot, ViewQuery};
