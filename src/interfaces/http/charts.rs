//! Server-side SVG rendering of the two report charts

use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::FontStyle;
use serde::Serialize;

use crate::domain::bug_report::{CategoryCount, ClassificationReport};
use crate::domain::error::{AppError, Result};

type DrawResult = std::result::Result<(), Box<dyn std::error::Error>>;

/// Pastel qualitative palette, cycled when there are more slices than colors
const PALETTE: [RGBColor; 10] = [
    RGBColor(0xa1, 0xc9, 0xf4),
    RGBColor(0xff, 0xb4, 0x82),
    RGBColor(0x8d, 0xe5, 0xa1),
    RGBColor(0xff, 0x9f, 0x9b),
    RGBColor(0xd0, 0xbb, 0xff),
    RGBColor(0xde, 0xbb, 0x9b),
    RGBColor(0xfa, 0xb0, 0xe4),
    RGBColor(0xcf, 0xcf, 0xcf),
    RGBColor(0xff, 0xfe, 0xa3),
    RGBColor(0xb9, 0xf2, 0xf0),
];

const PIE_SIZE: (u32, u32) = (560, 400);
const BAR_SIZE: (u32, u32) = (560, 320);
const PIE_RADIUS: f64 = 160.0;
/// Percentage labels sit at this fraction of the radius
const PIE_LABEL_DISTANCE: f64 = 0.7;
const FONT: &str = "sans-serif";

#[derive(Debug, Clone, Serialize)]
pub struct ReportCharts {
    pub pie: Option<String>,
    pub bar: Option<String>,
}

impl ReportCharts {
    /// Charts for whichever aggregates the report carries
    pub fn render(report: &ClassificationReport) -> Result<Self> {
        Ok(Self {
            pie: report
                .type_distribution
                .as_deref()
                .map(render_pie)
                .transpose()?,
            bar: report
                .logic_issue_distribution
                .as_deref()
                .map(render_bar)
                .transpose()?,
        })
    }
}

fn color(idx: usize) -> RGBColor {
    PALETTE[idx % PALETTE.len()]
}

/// Render onto an in-memory SVG document
fn render_svg<F>(size: (u32, u32), draw: F) -> Result<String>
where
    F: FnOnce(&DrawingArea<SVGBackend, Shift>) -> DrawResult,
{
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;
        draw(&root).map_err(chart_error)?;
        root.present().map_err(chart_error)?;
    }
    Ok(svg)
}

fn chart_error(e: impl std::fmt::Display) -> AppError {
    AppError::Internal(format!("Chart rendering failed: {}", e))
}

fn draw_no_data(area: &DrawingArea<SVGBackend, Shift>) -> DrawResult {
    let (width, height) = area.dim_in_pixel();
    area.draw(&Text::new(
        "No data",
        (width as i32 / 2 - 28, height as i32 / 2),
        (FONT, 16).into_font().color(&BLACK.mix(0.5)),
    ))?;
    Ok(())
}

/// Pie of counts by bug type with percentage labels and a "Bug Types" legend.
///
/// Slices run counter-clockwise from 12 o'clock in `counts` order.
pub fn render_pie(counts: &[CategoryCount]) -> Result<String> {
    render_svg(PIE_SIZE, |root| {
        let total: usize = counts.iter().map(|c| c.count).sum();
        if total == 0 {
            return draw_no_data(root);
        }

        let (pie_area, legend_area) = root.split_horizontally(400);

        // Pie draws clockwise, so the reversed slice order read clockwise from
        // the top equals the original order read counter-clockwise.
        let sizes: Vec<f64> = counts.iter().rev().map(|c| c.count as f64).collect();
        let colors: Vec<RGBColor> = (0..counts.len()).rev().map(color).collect();
        let labels: Vec<String> = counts
            .iter()
            .rev()
            .map(|c| format!("{:.1}%", c.count as f64 * 100.0 / total as f64))
            .collect();

        let center = (200, 200);
        let radius = PIE_RADIUS;
        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(-90.0);
        pie.label_style((FONT, 12).into_font().color(&BLACK));
        pie.label_offset(-(PIE_RADIUS * (1.0 - PIE_LABEL_DISTANCE)));
        pie_area.draw(&pie)?;

        legend_area.draw(&Text::new(
            "Bug Types",
            (0, 50),
            (FONT, 14).into_font().style(FontStyle::Bold),
        ))?;
        for (idx, item) in counts.iter().enumerate() {
            let y = 76 + idx as i32 * 22;
            legend_area.draw(&Rectangle::new([(0, y), (14, y + 14)], color(idx).filled()))?;
            legend_area.draw(&Text::new(
                item.label.as_str(),
                (20, y + 1),
                (FONT, 12).into_font(),
            ))?;
        }
        Ok(())
    })
}

/// One bar per bug type with its count above it
pub fn render_bar(counts: &[CategoryCount]) -> Result<String> {
    render_svg(BAR_SIZE, |root| {
        let max = counts.iter().map(|c| c.count).max().unwrap_or(0);
        if max == 0 {
            return draw_no_data(root);
        }

        let labels: Vec<&str> = counts.iter().map(|c| c.label.as_str()).collect();
        let y_top = max as i32 + (max as i32 / 5).max(1);

        let mut chart = ChartBuilder::on(root)
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(40)
            .build_cartesian_2d((0..counts.len() as i32).into_segmented(), 0..y_top)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .y_desc("Count")
            .x_labels(counts.len())
            .x_label_formatter(&|value| match value {
                SegmentValue::CenterOf(idx) => labels
                    .get(*idx as usize)
                    .map(|label| label.to_string())
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .label_style((FONT, 12))
            .draw()?;

        chart.draw_series(counts.iter().enumerate().map(|(idx, item)| {
            let idx = idx as i32;
            let mut bar = Rectangle::new(
                [
                    (SegmentValue::Exact(idx), 0),
                    (SegmentValue::Exact(idx + 1), item.count as i32),
                ],
                PALETTE[0].filled(),
            );
            bar.set_margin(0, 0, 12, 12);
            bar
        }))?;

        chart.draw_series(counts.iter().enumerate().map(|(idx, item)| {
            EmptyElement::at((SegmentValue::CenterOf(idx as i32), item.count as i32))
                + Text::new(item.count.to_string(), (-4, -18), (FONT, 12).into_font())
        }))?;

        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(items: &[(&str, usize)]) -> Vec<CategoryCount> {
        items
            .iter()
            .map(|(label, count)| CategoryCount::new(*label, *count))
            .collect()
    }

    #[test]
    fn test_pie_labels_and_legend() {
        let svg = render_pie(&counts(&[("Server", 2), ("UI", 1)])).unwrap();
        let lower = svg.to_lowercase();

        assert!(svg.contains("<svg"));
        assert!(svg.contains("66.7%"));
        assert!(svg.contains("33.3%"));
        assert!(svg.contains("Bug Types"));
        assert!(svg.contains("Server"));
        assert!(lower.contains("#a1c9f4"));
        assert!(lower.contains("#ffb482"));
    }

    #[test]
    fn test_single_slice_is_whole_pie() {
        let svg = render_pie(&counts(&[("DB", 4)])).unwrap();
        assert!(svg.contains("100.0%"));
    }

    #[test]
    fn test_bar_value_and_category_labels() {
        let svg = render_bar(&counts(&[("Server", 2), ("UI", 1)])).unwrap();
        assert!(svg.contains("Server"));
        assert!(svg.contains("UI"));
        assert!(svg.contains("Count"));
        assert!(svg.to_lowercase().contains("#a1c9f4"));
    }

    #[test]
    fn test_empty_counts_render_placeholder() {
        assert!(render_pie(&[]).unwrap().contains("No data"));
        assert!(render_bar(&[]).unwrap().contains("No data"));
    }

    #[test]
    fn test_labels_are_escaped() {
        let svg = render_pie(&counts(&[("<b>&x", 1)])).unwrap();
        assert!(svg.contains("&lt;b&gt;&amp;x"));
        assert!(!svg.contains("<b>"));
    }

    #[test]
    fn test_report_without_aggregates_has_no_charts() {
        let report = ClassificationReport {
            run_id: "run".to_string(),
            file_name: "bugs.csv".to_string(),
            file_digest: String::new(),
            columns_found: vec!["Details".to_string()],
            dropped_rows: 0,
            rows: Vec::new(),
            type_distribution: None,
            logic_issue_distribution: Some(counts(&[("API", 3)])),
            warnings: Vec::new(),
            generated_at: String::new(),
        };
        let charts = ReportCharts::render(&report).unwrap();
        assert!(charts.pie.is_none());
        assert!(charts.bar.unwrap().contains("API"));
    }
}
