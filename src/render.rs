//! SVG charts for ride totals, simulation metrics and rate distributions.

use anyhow::Result;
use chrono::NaiveTime;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::analyzers::distribution::{GaussianFit, Histogram};
use crate::analyzers::evaluation::{EvalData, metric_label};
use crate::analyzers::types::Tally;
use crate::output::ensure_parent;

const CHART_SIZE: (u32, u32) = (1200, 700);

fn svg_root(out_path: &Path) -> Result<DrawingArea<SVGBackend<'_>, Shift>> {
    ensure_parent(out_path)?;
    debug!(path = %out_path.display(), "Rendering chart");
    let root = SVGBackend::new(out_path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    Ok(root)
}

fn parse_clock(label: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(label, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(label, "%H:%M"))
        .ok()
}

/// Time buckets in clock order when every label is a clock time, otherwise
/// in first-seen order.
pub fn time_order(tally: &Tally<String>) -> Vec<(&String, u64)> {
    let mut bars: Vec<_> = tally.iter().collect();
    let clocks: Option<Vec<NaiveTime>> =
        bars.iter().map(|(label, _)| parse_clock(label)).collect();
    if let Some(clocks) = clocks {
        let mut keyed: Vec<_> = clocks.into_iter().zip(bars).collect();
        keyed.sort_by_key(|(clock, _)| *clock);
        bars = keyed.into_iter().map(|(_, bar)| bar).collect();
    }
    bars
}

fn segment_label(labels: &[String], value: &SegmentValue<u32>) -> String {
    match value {
        SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
        _ => String::new(),
    }
}

/// Bar chart of riders per time bucket. Nothing is written for an empty tally.
#[tracing::instrument(skip(out_path, time_totals), fields(path = %out_path.display()))]
pub fn render_time_totals(out_path: &Path, time_totals: &Tally<String>) -> Result<()> {
    if time_totals.is_empty() {
        info!("No time buckets to chart");
        return Ok(());
    }

    let bars = time_order(time_totals);
    let labels: Vec<String> = bars.iter().map(|(label, _)| label.to_string()).collect();
    let y_max = bars.iter().map(|(_, c)| *c).max().unwrap_or(0).max(1) * 11 / 10 + 1;

    let root = svg_root(out_path)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Riders per time bucket", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..bars.len() as u32).into_segmented(), 0u64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("time")
        .y_desc("riders")
        .x_labels(labels.len())
        .x_label_formatter(&|v| segment_label(&labels, v))
        .draw()?;

    chart.draw_series(
        plotters::series::Histogram::vertical(&chart)
            .style(BLUE.mix(0.7).filled())
            .margin(2)
            .data(bars.iter().enumerate().map(|(i, (_, c))| (i as u32, *c))),
    )?;

    root.present()?;
    info!(bars = labels.len(), "Time totals chart written");
    Ok(())
}

/// Chart file for one metric: `<dir>/<metric lower>[_<identifier>].svg`.
pub fn metric_chart_path(img_dir: &Path, metric: &str, identifier: &str) -> PathBuf {
    let suffix = if identifier.is_empty() {
        String::new()
    } else {
        format!("_{identifier}")
    };
    img_dir.join(format!("{}{}.svg", metric.to_lowercase(), suffix))
}

fn render_metric(out_path: &Path, metric: &str, values: &[f64]) -> Result<()> {
    let (mut lo, mut hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
    if lo == hi {
        lo -= 1.0;
        hi += 1.0;
    }
    let x_max = values.len().saturating_sub(1).max(1) as f64;

    let root = svg_root(out_path)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..x_max, lo..hi)?;

    chart
        .configure_mesh()
        .x_desc("minutes")
        .y_desc(metric_label(metric))
        .draw()?;

    chart.draw_series(LineSeries::new(
        values.iter().enumerate().map(|(i, v)| (i as f64, *v)),
        &BLUE,
    ))?;

    root.present()?;
    Ok(())
}

/// One line chart per metric, value against sample index.
#[tracing::instrument(skip(img_dir, data), fields(img_dir = %img_dir.display()))]
pub fn render_metric_series(
    img_dir: &Path,
    identifier: &str,
    data: &EvalData,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for (metric, values) in data.series() {
        if values.is_empty() {
            continue;
        }
        let out_path = metric_chart_path(img_dir, metric, identifier);
        render_metric(&out_path, metric, values)?;
        written.push(out_path);
    }

    info!(charts = written.len(), "Metric charts written");
    Ok(written)
}

/// Histogram bars with the fitted normal curve drawn on top.
#[tracing::instrument(skip_all, fields(path = %out_path.display()))]
pub fn render_distribution(
    out_path: &Path,
    histogram: &Histogram,
    fit: &GaussianFit,
) -> Result<()> {
    if histogram.is_empty() {
        info!("No values to chart");
        return Ok(());
    }

    let curve = fit.curve(histogram.len());
    let bar_max = histogram.bins().iter().copied().max().unwrap_or(0) as f64;
    let curve_max = curve
        .as_deref()
        .unwrap_or_default()
        .iter()
        .copied()
        .fold(0.0, f64::max);
    let y_max = bar_max.max(curve_max).max(1.0) * 1.1;
    let labels: Vec<String> = (0..histogram.len()).map(|x| x.to_string()).collect();

    let root = svg_root(out_path)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Disappointment rates", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..histogram.len() as u32).into_segmented(), 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|v| segment_label(&labels, v))
        .draw()?;

    chart.draw_series(
        plotters::series::Histogram::vertical(&chart)
            .style(BLUE.mix(0.6).filled())
            .margin(1)
            .data(
                histogram
                    .bins()
                    .iter()
                    .enumerate()
                    .map(|(x, n)| (x as u32, *n as f64)),
            ),
    )?;

    if let Some(curve) = curve {
        chart.draw_series(LineSeries::new(
            curve
                .into_iter()
                .enumerate()
                .map(|(x, y)| (SegmentValue::CenterOf(x as u32), y)),
            &RED,
        ))?;
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::distribution::ValueCounts;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    #[test]
    fn test_time_order_sorts_clock_labels() {
        let mut tally = Tally::default();
        tally.add("09:00".to_string(), 1);
        tally.add("08:15".to_string(), 2);
        tally.add("08:15:30".to_string(), 3);

        let order: Vec<_> = time_order(&tally).into_iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(order, vec!["08:15", "08:15:30", "09:00"]);
    }

    #[test]
    fn test_time_order_keeps_first_seen_for_other_labels() {
        let mut tally = Tally::default();
        tally.add("late".to_string(), 1);
        tally.add("08:15".to_string(), 2);

        let order: Vec<_> = time_order(&tally).into_iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(order, vec!["late", "08:15"]);
    }

    #[test]
    fn test_metric_chart_path() {
        let dir = Path::new("eval_out");
        assert_eq!(
            metric_chart_path(dir, "EXPENSES", ""),
            dir.join("expenses.svg")
        );
        assert_eq!(
            metric_chart_path(dir, "EXPENSES", "run1"),
            dir.join("expenses_run1.svg")
        );
    }

    #[test]
    fn test_render_time_totals_writes_svg() {
        let path = temp_path("passenger_stats_test_times.svg");
        let _ = fs::remove_file(&path);

        let mut tally = Tally::default();
        tally.add("08:00".to_string(), 8);
        tally.add("08:15".to_string(), 3);
        render_time_totals(&path, &tally).unwrap();

        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_render_time_totals_empty_writes_nothing() {
        let path = temp_path("passenger_stats_test_times_empty.svg");
        let _ = fs::remove_file(&path);

        render_time_totals(&path, &Tally::default()).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_render_metric_series_one_file_per_metric() {
        let dir = temp_path("passenger_stats_test_metric_charts");
        let _ = fs::remove_dir_all(&dir);

        let mut data = EvalData::default();
        data.insert("0", "EXPENSES", 1.0);
        data.insert("1", "EXPENSES", 2.0);
        data.insert("0", "AVERAGE_UTILIZATION", 0.5);

        let written = render_metric_series(&dir, "t", &data).unwrap();
        assert_eq!(written.len(), 2);
        assert!(dir.join("expenses_t.svg").exists());
        assert!(dir.join("average_utilization_t.svg").exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_render_distribution_writes_svg() {
        let path = temp_path("passenger_stats_test_distribution.svg");
        let _ = fs::remove_file(&path);

        let mut counts = ValueCounts::default();
        for v in [1.0, 1.0, 2.0, 3.2, 3.0, 3.0, 3.0] {
            counts.add(v);
        }
        let histogram = Histogram::from_counts(&counts);
        let fit = GaussianFit::from_counts(&counts);
        render_distribution(&path, &histogram, &fit).unwrap();

        assert!(fs::read_to_string(&path).unwrap().contains("<svg"));

        fs::remove_file(&path).unwrap();
    }
}
