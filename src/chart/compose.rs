//! Pure chart composition.
//!
//! Builds a renderable description of the dual-axis chart: axis ranges,
//! the zero-alignment transform for the secondary axis, and the
//! annotated statistics box. Keeping this free of any drawing backend
//! makes the layout decisions testable on their own.

use crate::models::{EpidemicStats, Outcome, TrajectorySet};

/// Placement of the statistics box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    UpperRight,
    LowerRight,
}

/// The annotated statistics box.
#[derive(Debug, Clone)]
pub struct AnnotationBox {
    pub corner: Corner,
    /// One formatted line per statistic, undefined values shown as nan.
    pub lines: Vec<String>,
}

/// Backend-independent description of one chart.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub title: String,
    pub x_range: (f64, f64),
    /// Primary axis range, fixed to the health scale.
    pub health_range: (f64, f64),
    /// Secondary axis range, shifted so y=0 lines up with the primary.
    pub sick_range: (f64, f64),
    pub annotation: AnnotationBox,
}

/// Compose the chart description for one run.
pub fn compose(set: &TrajectorySet, stats: &EpidemicStats, title: &str) -> ChartSpec {
    let x_range = (set.t[0], set.t[set.len() - 1]);
    let health_range = (0.0, 100.0);
    let sick_range = align_zero(health_range, (0.0, set.population as f64));

    // Full infection pushes the action to the top of the chart, so the
    // box goes to the free lower corner; otherwise it sits on top.
    let corner = match stats.outcome {
        Outcome::FullInfection => Corner::LowerRight,
        _ => Corner::UpperRight,
    };

    ChartSpec {
        title: title.to_string(),
        x_range,
        health_range,
        sick_range,
        annotation: AnnotationBox {
            corner,
            lines: annotation_lines(stats),
        },
    }
}

/// Shift the secondary axis range so that the value 0 maps to the same
/// vertical fraction as 0 does on the primary axis. The span of the
/// secondary range is preserved.
pub fn align_zero(primary: (f64, f64), secondary: (f64, f64)) -> (f64, f64) {
    let (p0, p1) = primary;
    let (s0, s1) = secondary;
    let span = s1 - s0;
    if (p1 - p0).abs() < f64::EPSILON || span.abs() < f64::EPSILON {
        return secondary;
    }

    let zero_fraction = (0.0 - p0) / (p1 - p0);
    let new_s0 = -zero_fraction * span;
    (new_s0, new_s0 + span)
}

/// Format the six statistics for the annotation box, in table order.
pub fn annotation_lines(stats: &EpidemicStats) -> Vec<String> {
    vec![
        format!("N_max = {}", stats.n_max),
        format!("p_max = {:.1}%", stats.p_max * 100.0),
        format!("t_crit = {}", fmt_time(stats.t_crit)),
        format!("t_rise = {}", fmt_time(stats.t_rise)),
        format!("t_heal = {}", fmt_time(stats.t_heal)),
        format!("t_eradicate = {}", fmt_time(stats.t_eradicate)),
    ]
}

fn fmt_time(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "nan".to_string(),
    }
}
