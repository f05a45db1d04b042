#![cfg(feature = "web")]
use crate::aggregate::Granularity;
use crate::charts::{self, ChartOptions};
use crate::error::RenderError;
use crate::record::COLUMNS;
use crate::view::{Dashboard, Selection, Snapshot};
use handlebars::{Handlebars, TemplateError};
use serde::Serialize;

const DASHBOARD_TEMPLATE: &str = "dashboard";
const CHART_UNAVAILABLE: &str = r#"<p class="chart-error">Chart unavailable</p>"#;

/// The five chart outputs of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Pie,
    Daily,
    Monthly,
    Quarterly,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::Bar,
        ChartKind::Pie,
        ChartKind::Daily,
        ChartKind::Monthly,
        ChartKind::Quarterly,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Pie => "pie",
            ChartKind::Daily => "daily",
            ChartKind::Monthly => "monthly",
            ChartKind::Quarterly => "quarterly",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::Bar => "Total Sales by Region",
            ChartKind::Pie => "Share of Sales by Region",
            ChartKind::Daily => "Total Sales by Invoice Date",
            ChartKind::Monthly => "Total Sales monthly",
            ChartKind::Quarterly => "Total Sales quarterly",
        }
    }

    /// Draws this chart from the snapshot; `Ok(None)` when its aggregate
    /// is empty.
    pub fn render(
        self,
        snapshot: &Snapshot,
        (width, height): (u32, u32),
    ) -> Result<Option<String>, RenderError> {
        let options = ChartOptions::titled(self.title(), width, height);
        match self {
            ChartKind::Bar => charts::bar_chart(&snapshot.by_region, &options),
            ChartKind::Pie => charts::pie_chart(&snapshot.by_region, &options),
            ChartKind::Daily => charts::line_chart(snapshot.series(Granularity::Day), &options),
            ChartKind::Monthly => {
                charts::line_chart(snapshot.series(Granularity::Month), &options)
            }
            ChartKind::Quarterly => {
                charts::line_chart(snapshot.series(Granularity::Quarter), &options)
            }
        }
    }
}

#[derive(Serialize)]
struct RetailerOption<'a> {
    name: &'a str,
    selected: bool,
}

#[derive(Serialize)]
struct PageModel<'a> {
    retailers: Vec<RetailerOption<'a>>,
    start: String,
    end: String,
    min_date: String,
    max_date: String,
    query: String,
    record_count: usize,
    total_sales: String,
    bar_chart: Option<String>,
    pie_chart: Option<String>,
    daily_chart: Option<String>,
    monthly_chart: Option<String>,
    quarterly_chart: Option<String>,
    columns: &'static [&'static str],
    preview: Vec<Vec<String>>,
}

/// Registers the page templates.
pub fn templates() -> Result<Handlebars<'static>, Box<TemplateError>> {
    let mut handlebars = Handlebars::new();
    handlebars
        .register_template_string(DASHBOARD_TEMPLATE, include_str!("./templates/dashboard.hbs"))
        .map_err(Box::new)?;
    Ok(handlebars)
}

/// Query string that reproduces a selection, for chart and export links.
pub fn selection_query(selection: &Selection) -> String {
    format!(
        "retailer={}&start={}&end={}",
        urlencoding::encode(&selection.retailer),
        selection.start.format("%Y-%m-%d"),
        selection.end.format("%Y-%m-%d"),
    )
}

// A chart that fails to draw is logged and replaced by a notice so the rest
// of the page still renders.
fn chart_slot(kind: ChartKind, snapshot: &Snapshot, size: (u32, u32)) -> Option<String> {
    match kind.render(snapshot, size) {
        Ok(svg) => svg,
        Err(e) => {
            log::error!("{} chart failed: {}", kind.name(), e);
            Some(CHART_UNAVAILABLE.to_string())
        }
    }
}

/// Renders the full dashboard page for one snapshot.
pub fn render_page(
    handlebars: &Handlebars<'_>,
    dashboard: &Dashboard,
    snapshot: &Snapshot,
) -> Result<String, RenderError> {
    let selection = &snapshot.selection;
    let (min_date, max_date) = dashboard.bounds();
    let size = dashboard.chart_size();

    let model = PageModel {
        retailers: dashboard
            .retailers()
            .iter()
            .map(|name| RetailerOption {
                name,
                selected: *name == selection.retailer,
            })
            .collect(),
        start: selection.start.format("%Y-%m-%d").to_string(),
        end: selection.end.format("%Y-%m-%d").to_string(),
        min_date: min_date.format("%Y-%m-%d").to_string(),
        max_date: max_date.format("%Y-%m-%d").to_string(),
        query: selection_query(selection),
        record_count: snapshot.subset.len(),
        total_sales: charts::format_thousands(snapshot.subset.total_sales().to_f64()),
        bar_chart: chart_slot(ChartKind::Bar, snapshot, size),
        pie_chart: chart_slot(ChartKind::Pie, snapshot, size),
        daily_chart: chart_slot(ChartKind::Daily, snapshot, size),
        monthly_chart: chart_slot(ChartKind::Monthly, snapshot, size),
        quarterly_chart: chart_slot(ChartKind::Quarterly, snapshot, size),
        columns: &COLUMNS,
        preview: snapshot
            .preview()
            .into_iter()
            .map(|record| record.display_fields())
            .collect(),
    };

    Ok(handlebars.render(DASHBOARD_TEMPLATE, &model)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn chart_names_round_trip() {
        assert_eq!(ChartKind::ALL.len(), 5);
        for kind in ChartKind::ALL {
            assert_eq!(ChartKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ChartKind::from_name("scatter"), None);
    }

    #[test]
    fn query_encodes_retailer() {
        let selection = Selection {
            retailer: "Sports Direct & Co".to_string(),
            start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2021, 12, 31).unwrap(),
        };
        assert_eq!(
            selection_query(&selection),
            "retailer=Sports%20Direct%20%26%20Co&start=2020-01-01&end=2021-12-31"
        );
    }

    #[test]
    fn template_registers() {
        assert!(templates().is_ok());
    }
}
