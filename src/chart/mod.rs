//! Chart rendering.
//!
//! Renders a composed [`ChartSpec`] to an SVG file: every agent's
//! health trajectory as a thin semi-transparent line on the primary
//! axis, the sick-count curve on a zero-aligned secondary axis, and the
//! statistics box in the corner chosen by the composer.

pub mod compose;

pub use compose::{align_zero, annotation_lines, compose, ChartSpec, Corner};

use crate::config::ChartConfig;
use crate::models::TrajectorySet;
use anyhow::{Context, Result};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

// Fixed layout areas around the plot, in pixels.
const MARGIN: i32 = 10;
const LABEL_AREA: i32 = 50;
const CAPTION_HEIGHT: i32 = 30;
const ANNOTATION_LINE_HEIGHT: i32 = 16;
const ANNOTATION_INSET: i32 = 12;

/// Render one chart to an SVG file.
pub fn render_svg(
    spec: &ChartSpec,
    set: &TrajectorySet,
    config: &ChartConfig,
    path: &Path,
) -> Result<()> {
    let size = (config.width, config.height);
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)
        .with_context(|| format!("failed to prepare chart {}", path.display()))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(MARGIN as u32)
        .caption(&spec.title, ("sans-serif", 20))
        .x_label_area_size(LABEL_AREA as u32)
        .y_label_area_size(LABEL_AREA as u32)
        .right_y_label_area_size(LABEL_AREA as u32)
        .build_cartesian_2d(
            spec.x_range.0..spec.x_range.1,
            spec.health_range.0..spec.health_range.1,
        )?
        .set_secondary_coord(
            spec.x_range.0..spec.x_range.1,
            spec.sick_range.0..spec.sick_range.1,
        );

    chart
        .configure_mesh()
        .x_desc(&config.x_label)
        .y_desc(&config.y_label)
        .bold_line_style(BLACK.mix(config.grid_alpha))
        .light_line_style(TRANSPARENT)
        .draw()?;

    let sick_color = named_color(&config.sick_color);
    chart
        .configure_secondary_axes()
        .y_desc(&config.sick_label)
        .label_style(("sans-serif", 12).into_font().color(&sick_color))
        .draw()?;

    // One thin semi-transparent line per agent.
    for (agent, row) in set.health.iter().enumerate() {
        let color = Palette99::pick(agent).mix(config.trajectory_alpha);
        chart.draw_series(LineSeries::new(
            set.t.iter().copied().zip(row.iter().copied()),
            color.stroke_width(config.trajectory_stroke),
        ))?;
    }

    chart.draw_secondary_series(LineSeries::new(
        set.t.iter().copied().zip(set.n_sick.iter().copied()),
        sick_color.stroke_width(config.sick_stroke),
    ))?;

    draw_annotation(&root, spec, config)?;

    root.present()
        .with_context(|| format!("failed to write chart {}", path.display()))?;
    Ok(())
}

/// Draw the statistics box, right-aligned in the configured corner.
fn draw_annotation(
    root: &DrawingArea<SVGBackend, plotters::coord::Shift>,
    spec: &ChartSpec,
    config: &ChartConfig,
) -> Result<()> {
    let lines = &spec.annotation.lines;
    let width = config.width as i32;
    let height = config.height as i32;

    // Inside edge of the plot area, next to the secondary axis.
    let x = width - MARGIN - LABEL_AREA - ANNOTATION_INSET;

    for (i, line) in lines.iter().enumerate() {
        let (y, v_pos) = match spec.annotation.corner {
            Corner::UpperRight => {
                let top = MARGIN + CAPTION_HEIGHT + ANNOTATION_INSET;
                (top + i as i32 * ANNOTATION_LINE_HEIGHT, VPos::Top)
            }
            Corner::LowerRight => {
                let bottom = height - MARGIN - LABEL_AREA - ANNOTATION_INSET;
                let offset = (lines.len() - 1 - i) as i32 * ANNOTATION_LINE_HEIGHT;
                (bottom - offset, VPos::Bottom)
            }
        };

        let style = ("sans-serif", 14)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Right, v_pos));
        root.draw_text(line, &style, (x, y))?;
    }

    Ok(())
}

/// Resolve a configured color name to a drawing color.
fn named_color(name: &str) -> RGBColor {
    match name.to_ascii_lowercase().as_str() {
        "black" => BLACK,
        "blue" => BLUE,
        "green" => GREEN,
        "magenta" => MAGENTA,
        "orange" => RGBColor(255, 165, 0),
        _ => RED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::extract;
    use std::fs;

    #[test]
    fn test_render_svg_smoke() {
        let t = vec![0.0, 1.0, 2.0, 3.0];
        let n_sick = vec![0.0, 1.0, 2.0, 0.0];
        let set = TrajectorySet::new(
            t.clone(),
            n_sick.clone(),
            vec![
                vec![10.0, 60.0, 40.0, 5.0],
                vec![0.0, 20.0, 70.0, 10.0],
            ],
            2,
        )
        .unwrap();
        let stats = extract(&t, &n_sick, 2);
        let spec = compose(&set, &stats, "job_0");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job_0.svg");
        render_svg(&spec, &set, &ChartConfig::default(), &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("<svg"));
        assert!(content.contains("job_0"));
        assert!(content.contains("t_eradicate"));
    }

    #[test]
    fn test_named_color_fallback() {
        assert_eq!(named_color("blue"), BLUE);
        assert_eq!(named_color("Red"), RED);
        assert_eq!(named_color("no-such-color"), RED);
    }
}
