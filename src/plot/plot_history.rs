use log::info;
use plotters::prelude::*;
use std::path::Path;

use crate::core::output::TrainingHistory;

/// Renders test accuracy (left) and log-scale mean cost (right) per epoch to
/// a PNG. The baseline evaluation, when present, is drawn as epoch 0.
pub fn plot_history<P: AsRef<Path>>(
    history: &TrainingHistory,
    filename: P,
) -> Result<(), Box<dyn std::error::Error>> {
    let filename = filename.as_ref();
    let root = BitMapBackend::new(filename, (1200, 500)).into_drawing_area();
    root.fill(&WHITE)?;
    let (left, right) = root.split_horizontally(600);

    let mut points: Vec<(usize, f64, f64)> = Vec::with_capacity(history.epochs.len() + 1);
    if let Some(base) = history.baseline {
        points.push((0, base.percentage(), base.cost));
    }
    for report in &history.epochs {
        points.push((report.epoch, report.evaluation.percentage(), report.evaluation.cost));
    }
    let last_epoch = points.last().map_or(1, |p| p.0.max(1));

    let mut chart = ChartBuilder::on(&left)
        .caption("Test Accuracy", ("sans-serif", 30).into_font())
        .margin(5)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0..last_epoch, 0.0..100.0)?;

    chart
        .configure_mesh()
        .x_desc("Epoch")
        .y_desc("Accuracy (%)")
        .draw()?;

    chart.draw_series(LineSeries::new(
        points.iter().map(|&(epoch, accuracy, _)| (epoch, accuracy)),
        &BLUE,
    ))?;

    // Adjust costs to avoid log of zero
    let log_costs: Vec<(usize, f64)> = points
        .iter()
        .map(|&(epoch, _, cost)| (epoch, cost.max(1e-10).log10()))
        .collect();

    let mut y_min = log_costs.iter().map(|p| p.1).fold(f64::INFINITY, f64::min).floor();
    let mut y_max = log_costs.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max).ceil();
    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = -1.0;
        y_max = 1.0;
    } else if y_min >= y_max {
        y_min -= 1.0;
        y_max += 1.0;
    }

    let mut chart = ChartBuilder::on(&right)
        .caption("Mean Cost (Log Scale)", ("sans-serif", 30).into_font())
        .margin(5)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0..last_epoch, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Epoch")
        .y_desc("Cost (Log Scale)")
        .y_label_formatter(&|y| format!("1e{:.0}", y))
        .draw()?;

    chart.draw_series(LineSeries::new(log_costs.iter().copied(), &RED))?;

    root.present()?;
    info!("Training plot has been saved as '{}'", filename.display());

    Ok(())
}
