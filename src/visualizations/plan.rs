//! visualizations/plan.rs - Wall Plan Rendering
//!
//! Renders a set of wall solids into a plan-view bitmap for inspection:
//! baselines as thin dashed strokes, boundary polygons as solid outlines.
//! This is a developer-facing debug surface, not part of the UI contract.

use plotters::prelude::*;

use crate::geometry::types::{BoundingBox, WallSolid};

/// Render wall solids to a PNG plan view
pub fn plot_walls(
    walls: &[WallSolid],
    output_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(output_path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    if walls.is_empty() {
        root.present()?;
        return Ok(());
    }

    let bbox = walls
        .iter()
        .map(WallSolid::bounding_box)
        .fold(BoundingBox::empty(), |acc, b| acc.union(&b));
    let x_buffer = bbox.width().max(1.0) * 0.05;
    let y_buffer = bbox.height().max(1.0) * 0.05;

    // No captions or axis labels: the plan stays renderable on headless
    // machines without font support.
    let mut chart = ChartBuilder::on(&root).margin(10).build_cartesian_2d(
        (bbox.min_x - x_buffer)..(bbox.max_x + x_buffer),
        (bbox.min_y - y_buffer)..(bbox.max_y + y_buffer),
    )?;

    for wall in walls {
        chart.draw_series(LineSeries::new(
            wall.baseline.coords(),
            BLUE.mix(0.5).stroke_width(1),
        ))?;
        for polygon in &wall.polygons {
            chart.draw_series(LineSeries::new(
                polygon.outer.points.iter().copied(),
                BLACK.stroke_width(2),
            ))?;
            for hole in &polygon.holes {
                chart.draw_series(LineSeries::new(
                    hole.points.iter().copied(),
                    RED.stroke_width(1),
                ))?;
            }
        }
    }

    root.present()?;
    Ok(())
}
