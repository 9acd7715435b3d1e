//! Report charts drawn with plotters into inline SVG strings.

use gizi_core::metrics::RocCurve;
use gizi_core::report::{GroupedCount, Histogram};
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::warn;

use crate::render::escape;

type DrawResult = Result<(), Box<dyn std::error::Error>>;

const BAR_SIZE: (u32, u32) = (560, 300);
const ROC_SIZE: (u32, u32) = (460, 420);

const PALETTE: [RGBColor; 6] = [
    RGBColor(76, 175, 80),
    RGBColor(33, 150, 243),
    RGBColor(255, 152, 0),
    RGBColor(233, 30, 99),
    RGBColor(156, 39, 176),
    RGBColor(96, 125, 139),
];

const CHANCE_LINE: RGBColor = RGBColor(160, 160, 160);

fn color(i: usize) -> RGBColor {
    PALETTE[i % PALETTE.len()]
}

/// Run `draw` on a white SVG canvas and return the markup. A failed chart
/// becomes an inline error note so the rest of the page still renders.
fn render_svg<F>(size: (u32, u32), draw: F) -> String
where
    F: FnOnce(&DrawingArea<SVGBackend<'_>, Shift>) -> DrawResult,
{
    let mut svg = String::new();
    let outcome = {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        let run = || -> DrawResult {
            root.fill(&WHITE)?;
            draw(&root)?;
            root.present()?;
            Ok(())
        };
        run()
    };

    match outcome {
        Ok(()) => svg,
        Err(err) => {
            warn!("Chart rendering failed: {}", err);
            format!(
                "<p class=\"banner error\">Grafik gagal dibuat: {}</p>\n",
                escape(&err.to_string())
            )
        }
    }
}

/// Label for an integer tick on a categorical axis; blank elsewhere.
fn category_label(labels: &[&str], x: f64) -> String {
    let rounded = x.round();
    if (x - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels
        .get(rounded as usize)
        .map(|label| label.to_string())
        .unwrap_or_default()
}

fn y_ceiling(max: f64) -> f64 {
    max.max(1.0) * 1.15
}

/// One bar per category.
pub fn bar_chart(title: &str, bars: &[(String, f64)]) -> String {
    render_svg(BAR_SIZE, |root| {
        let n = bars.len().max(1);
        let labels: Vec<&str> = bars.iter().map(|(label, _)| label.as_str()).collect();
        let y_max = y_ceiling(bars.iter().map(|(_, v)| *v).fold(0.0, f64::max));

        let mut chart = ChartBuilder::on(root)
            .caption(title, ("sans-serif", 18))
            .margin(15)
            .x_label_area_size(35)
            .y_label_area_size(45)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&|x| category_label(&labels, *x))
            .y_desc("Jumlah")
            .draw()?;

        chart.draw_series(bars.iter().enumerate().map(|(i, (_, value))| {
            let x = i as f64;
            Rectangle::new([(x - 0.35, 0.0), (x + 0.35, *value)], color(i).filled())
        }))?;
        Ok(())
    })
}

/// Bars grouped by sex, one coloured series per status.
pub fn grouped_bar_chart(title: &str, counts: &[GroupedCount]) -> String {
    let mut sexes: Vec<&str> = counts.iter().map(|c| c.sex.as_str()).collect();
    sexes.sort_unstable();
    sexes.dedup();
    let mut statuses: Vec<&str> = counts.iter().map(|c| c.status.as_str()).collect();
    statuses.sort_unstable();
    statuses.dedup();

    render_svg(BAR_SIZE, |root| {
        let groups = sexes.len().max(1);
        let bar_w = 0.8 / statuses.len().max(1) as f64;
        let y_max = y_ceiling(counts.iter().map(|c| c.count).max().unwrap_or(0) as f64);

        let mut chart = ChartBuilder::on(root)
            .caption(title, ("sans-serif", 18))
            .margin(15)
            .x_label_area_size(35)
            .y_label_area_size(45)
            .build_cartesian_2d(-0.5f64..(groups as f64 - 0.5), 0f64..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(groups)
            .x_label_formatter(&|x| category_label(&sexes, *x))
            .y_desc("Jumlah")
            .draw()?;

        for (s, status) in statuses.iter().enumerate() {
            let fill = color(s);
            chart
                .draw_series(sexes.iter().enumerate().map(|(g, sex)| {
                    let count = counts
                        .iter()
                        .find(|c| c.sex == *sex && c.status == *status)
                        .map_or(0, |c| c.count);
                    let left = g as f64 - 0.4 + bar_w * s as f64;
                    Rectangle::new([(left, 0.0), (left + bar_w * 0.9, count as f64)], fill.filled())
                }))?
                .label(*status)
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], fill.filled()));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
        Ok(())
    })
}

/// Equal-width bins on the column's own value axis.
pub fn histogram_chart(hist: &Histogram) -> String {
    render_svg(BAR_SIZE, |root| {
        let (lo, hi) = match (hist.bins.first(), hist.bins.last()) {
            (Some(first), Some(last)) => (first.lower, last.upper),
            _ => (0.0, 1.0),
        };
        let y_max = y_ceiling(hist.bins.iter().map(|b| b.count).max().unwrap_or(0) as f64);

        let mut chart = ChartBuilder::on(root)
            .caption(&hist.column, ("sans-serif", 18))
            .margin(15)
            .x_label_area_size(35)
            .y_label_area_size(45)
            .build_cartesian_2d(lo..hi, 0f64..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(hist.column.as_str())
            .y_desc("Jumlah")
            .draw()?;

        chart.draw_series(hist.bins.iter().map(|bin| {
            Rectangle::new([(bin.lower, 0.0), (bin.upper, bin.count as f64)], color(1).filled())
        }))?;
        Ok(())
    })
}

/// One line per class plus the chance diagonal.
pub fn roc_chart(curves: &[RocCurve]) -> String {
    render_svg(ROC_SIZE, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption("ROC Curve", ("sans-serif", 18))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(45)
            .build_cartesian_2d(0f64..1f64, 0f64..1f64)?;

        chart
            .configure_mesh()
            .x_desc("False Positive Rate")
            .y_desc("True Positive Rate")
            .draw()?;

        chart.draw_series(LineSeries::new(vec![(0.0, 0.0), (1.0, 1.0)], &CHANCE_LINE))?;

        for (i, curve) in curves.iter().enumerate() {
            let stroke = color(i);
            let label = match curve.auc {
                Some(auc) => format!("{} (AUC = {:.2})", curve.label, auc),
                None => format!("{} (AUC n/a)", curve.label),
            };
            chart
                .draw_series(LineSeries::new(
                    curve.points.iter().map(|p| (p.fpr, p.tpr)),
                    stroke.stroke_width(2),
                ))?
                .label(label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], stroke.stroke_width(2)));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::LowerRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
        Ok(())
    })
}
