#![cfg(not(tarpaulin_include))]
#![cfg(feature = "web")]
use crate::aggregate::{RegionAggregate, TimeAggregate};
use crate::error::RenderError;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::f64::consts::{FRAC_PI_2, TAU};

/// Configuration options for chart generation
///
/// Every chart is drawn to an in-memory SVG document of this size.
#[derive(Clone, Debug)]
pub struct ChartOptions {
    /// Title displayed at the top of the chart
    pub title: String,

    /// Width of the chart in pixels
    pub width: u32,

    /// Height of the chart in pixels
    pub height: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: "Chart".to_string(),
            width: 640,
            height: 480,
        }
    }
}

impl ChartOptions {
    pub fn titled(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
        }
    }
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Chart(e.to_string())
    }
}

/// Formats an amount in thousands with one decimal, e.g. `12.3K`.
pub fn format_thousands(value: f64) -> String {
    format!("{:.1}K", value / 1000.0)
}

/// Formats a share in `[0, 1]` as a percentage with one decimal.
pub fn format_percent(share: f64) -> String {
    format!("{:.1}%", share * 100.0)
}

// Y axis always includes zero and leaves headroom for value labels
fn value_range(values: &[f64]) -> std::ops::Range<f64> {
    let low = values.iter().copied().fold(0.0, f64::min);
    let high = values.iter().copied().fold(0.0, f64::max) * 1.15;
    if high > low { low..high } else { low..low + 1.0 }
}

fn label_style(size: u32) -> TextStyle<'static> {
    TextStyle::from(("sans-serif", size).into_font()).pos(Pos::new(HPos::Center, VPos::Center))
}

/// Creates a bar chart of total sales per region
///
/// Bars carry their value in thousands above them and the y axis uses the
/// same format.
///
/// # Returns
/// * `Ok(None)` when there are no regions to draw
/// * `Ok(Some(svg))` with the SVG document otherwise
pub fn bar_chart(
    regions: &RegionAggregate,
    options: &ChartOptions,
) -> Result<Option<String>, RenderError> {
    if regions.is_empty() {
        return Ok(None);
    }

    let names: Vec<&str> = regions.keys().map(String::as_str).collect();
    let values: Vec<f64> = regions.values().map(|v| v.to_f64()).collect();

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&options.title, ("sans-serif", 24).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(
                (0u32..names.len() as u32).into_segmented(),
                value_range(&values),
            )?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(names.len() + 1)
            .x_label_formatter(&|x| match x {
                SegmentValue::CenterOf(i) => names
                    .get(*i as usize)
                    .map(|name| name.to_string())
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .y_label_formatter(&|y| format_thousands(*y))
            .y_desc("Total Sales")
            .draw()?;

        chart.draw_series(
            Histogram::vertical(&chart)
                .style(BLUE.mix(0.8).filled())
                .margin(12)
                .data(values.iter().enumerate().map(|(i, v)| (i as u32, *v))),
        )?;

        let value_label = TextStyle::from(("sans-serif", 14).into_font())
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        chart.draw_series(values.iter().enumerate().map(|(i, v)| {
            Text::new(
                format_thousands(*v),
                (SegmentValue::CenterOf(i as u32), *v),
                value_label.clone(),
            )
        }))?;

        root.present()?;
    }

    Ok(Some(svg))
}

/// Creates a pie chart of each region's share of total sales
///
/// Slices are labelled with the region name and its share to one decimal.
/// A subset whose total is not positive has no meaningful shares and is
/// treated like an empty one.
pub fn pie_chart(
    regions: &RegionAggregate,
    options: &ChartOptions,
) -> Result<Option<String>, RenderError> {
    let total: f64 = regions.values().map(|v| v.to_f64()).sum();
    if regions.is_empty() || total <= 0.0 {
        return Ok(None);
    }

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE)?;
        let area = root.titled(&options.title, ("sans-serif", 24).into_font())?;

        let (width, height) = area.dim_in_pixel();
        let center = (width as i32 / 2, height as i32 / 2);
        let radius = f64::from(width.min(height)) * 0.35;
        let point_at = |angle: f64, distance: f64| {
            (
                center.0 + (distance * angle.cos()).round() as i32,
                center.1 + (distance * angle.sin()).round() as i32,
            )
        };

        // Start at twelve o'clock and sweep clockwise
        let mut angle = -FRAC_PI_2;
        for (index, (region, value)) in regions.iter().enumerate() {
            let share = value.to_f64() / total;
            if share <= 0.0 {
                continue;
            }
            let sweep = share * TAU;
            let steps = (share * 120.0).ceil().max(2.0) as usize;

            let mut outline = Vec::with_capacity(steps + 2);
            outline.push(center);
            outline.extend(
                (0..=steps).map(|s| point_at(angle + sweep * s as f64 / steps as f64, radius)),
            );
            area.draw(&Polygon::new(outline, Palette99::pick(index).filled()))?;

            let label = format!("{} {}", region, format_percent(share));
            area.draw(&Text::new(
                label,
                point_at(angle + sweep / 2.0, radius * 1.22),
                label_style(14),
            ))?;

            angle += sweep;
        }

        root.present()?;
    }

    Ok(Some(svg))
}

/// Creates a line chart of a time series
///
/// Buckets are spaced evenly in calendar order and labelled with their
/// period. Gridlines are on and the y axis is in thousands.
pub fn line_chart(
    series: &TimeAggregate,
    options: &ChartOptions,
) -> Result<Option<String>, RenderError> {
    if series.is_empty() {
        return Ok(None);
    }

    let labels: Vec<String> = series.keys().map(ToString::to_string).collect();
    let values: Vec<f64> = series.values().map(|v| v.to_f64()).collect();
    let x_range = if labels.len() == 1 {
        -0.5..0.5
    } else {
        0.0..(labels.len() - 1) as f64
    };

    let label_at = |x: f64| {
        let nearest = x.round();
        if (x - nearest).abs() > 1e-6 || nearest < 0.0 {
            return String::new();
        }
        labels.get(nearest as usize).cloned().unwrap_or_default()
    };

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&options.title, ("sans-serif", 24).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, value_range(&values))?;

        chart
            .configure_mesh()
            .x_labels(labels.len().min(12))
            .x_label_formatter(&|x| label_at(*x))
            .y_label_formatter(&|y| format_thousands(*y))
            .draw()?;

        chart.draw_series(LineSeries::new(
            values.iter().enumerate().map(|(i, v)| (i as f64, *v)),
            &BLUE,
        ))?;
        chart.draw_series(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| Circle::new((i as f64, *v), 3, BLUE.filled())),
        )?;

        root.present()?;
    }

    Ok(Some(svg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Money;

    #[test]
    fn formats_thousands_with_one_decimal() {
        assert_eq!(format_thousands(12_345.0), "12.3K");
        assert_eq!(format_thousands(1_000.0), "1.0K");
        assert_eq!(format_thousands(0.0), "0.0K");
    }

    #[test]
    fn formats_percentages_with_one_decimal() {
        assert_eq!(format_percent(0.25), "25.0%");
        assert_eq!(format_percent(1.0 / 3.0), "33.3%");
    }

    #[test]
    fn value_range_includes_zero() {
        let range = value_range(&[200.0]);
        assert_eq!(range.start, 0.0);
        assert!(range.end > 200.0);
        assert_eq!(value_range(&[0.0]), 0.0..1.0);
        assert_eq!(value_range(&[-100.0, 50.0]).start, -100.0);
    }

    #[test]
    fn empty_aggregates_render_nothing() {
        let options = ChartOptions::default();
        assert!(bar_chart(&RegionAggregate::new(), &options).unwrap().is_none());
        assert!(pie_chart(&RegionAggregate::new(), &options).unwrap().is_none());
        assert!(line_chart(&TimeAggregate::new(), &options).unwrap().is_none());
    }

    fn regions(pairs: &[(&str, i64)]) -> RegionAggregate {
        pairs
            .iter()
            .map(|(name, cents)| (name.to_string(), Money::from_cents(*cents)))
            .collect()
    }

    #[test]
    fn bar_chart_labels_values_in_thousands() {
        let options = ChartOptions::titled("Total Sales by Region", 640, 480);
        let svg = bar_chart(&regions(&[("West", 1_234_500), ("East", 500_000)]), &options)
            .unwrap()
            .unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Total Sales by Region"));
        assert!(svg.contains("12.3K"));
        assert!(svg.contains("5.0K"));
        assert!(svg.contains("West"));
        assert!(svg.contains("East"));
    }

    #[test]
    fn pie_chart_labels_shares() {
        let svg = pie_chart(&regions(&[("West", 712), ("East", 288)]), &ChartOptions::default())
            .unwrap()
            .unwrap();
        assert!(svg.contains("West 71.2%"));
        assert!(svg.contains("East 28.8%"));
        assert_eq!(svg.matches("<polygon").count(), 2);
    }

    #[test]
    fn line_chart_draws_series_and_grid() {
        use crate::aggregate::Period;

        let mut series = TimeAggregate::new();
        for (month, cents) in [(1, 100_000), (2, 250_000), (3, 175_000)] {
            series.insert(Period::Month { year: 2021, month }, Money::from_cents(cents));
        }
        let svg = line_chart(&series, &ChartOptions::titled("Total Sales monthly", 640, 480))
            .unwrap()
            .unwrap();
        assert!(svg.contains("Total Sales monthly"));
        assert!(svg.contains("2021-02"));
        assert!(svg.contains("0.0K"));
        // Series line plus the mesh gridlines
        let lines = svg.matches("<polyline").count() + svg.matches("<line").count();
        assert!(lines > 2, "expected gridlines, found {} lines", lines);
        assert_eq!(svg.matches("<circle").count(), 3);
    }

    #[test]
    fn zero_total_pie_renders_nothing() {
        let mut regions = RegionAggregate::new();
        regions.insert("West".to_string(), Money::ZERO);
        let pie = pie_chart(&regions, &ChartOptions::default()).unwrap();
        assert!(pie.is_none());
    }
}
