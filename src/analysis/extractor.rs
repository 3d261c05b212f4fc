//! Threshold-crossing statistic extraction.
//!
//! Given a time vector and a sick-count series this module computes the
//! scalar epidemic statistics: the peak count and fraction, the
//! logistic-growth onset markers when the run reached full infection,
//! and the heal/eradication times when the outbreak died out.
//!
//! The crossing markers use the *last* index still satisfying the
//! predicate, which keeps the estimates stable when the series
//! fluctuates around the threshold.

use crate::models::{EpidemicStats, Outcome};

/// Extract the statistics record from one run.
///
/// `t` and `n_sick` must have equal length; `population` is N. The two
/// conditional statistic pairs are populated by at most one branch:
/// full infection (`n_max == N`) yields `t_crit`/`t_rise`, a series
/// ending at zero yields `t_heal`/`t_eradicate`, and a partial ongoing
/// outbreak leaves all four undefined.
pub fn extract(t: &[f64], n_sick: &[f64], population: usize) -> EpidemicStats {
    debug_assert_eq!(t.len(), n_sick.len());

    let n = population as f64;
    let n_max = n_sick.iter().cloned().fold(0.0_f64, f64::max);
    let p_max = n_max / n;

    let mut stats = EpidemicStats {
        n_max: n_max as u32,
        p_max,
        t_crit: None,
        t_rise: None,
        t_heal: None,
        t_eradicate: None,
        outcome: Outcome::Ongoing,
    };

    if n_max as u32 == population as u32 {
        stats.outcome = Outcome::FullInfection;

        // Onset marker: last time the count was still at or below N/e.
        let crit = last_where(t, n_sick, |v| v <= n / std::f64::consts::E);
        // Saturation marker at the complementary 1 - 1/e threshold.
        let settle = last_where(t, n_sick, |v| v <= n * (1.0 - 1.0 / std::f64::consts::E));

        // A degenerate instantaneous jump to full infection can leave a
        // predicate with no matching index; the fields stay undefined
        // rather than erroring.
        stats.t_crit = crit;
        stats.t_rise = match (crit, settle) {
            (Some(c), Some(s)) => Some(s - c),
            _ => None,
        };
    } else if n_sick.last() == Some(&0.0) {
        stats.outcome = Outcome::Eradicated;

        // Single-remaining-case bracket: span between the first and last
        // instants with exactly one sick agent. A lone instant gives a
        // zero-length span.
        let first_one = first_where(t, n_sick, |v| v == 1.0);
        let last_one = last_where(t, n_sick, |v| v == 1.0);
        stats.t_heal = match (first_one, last_one) {
            (Some(first), Some(last)) => Some(last - first),
            _ => None,
        };

        // Reports the final return to zero, not the first: an oscillating
        // series that re-ignites and dies again counts from the last
        // extinction.
        stats.t_eradicate = last_where(t, n_sick, |v| v == 0.0);
    }

    stats
}

/// Time of the last index whose sick count satisfies the predicate.
fn last_where(t: &[f64], n_sick: &[f64], pred: impl Fn(f64) -> bool) -> Option<f64> {
    n_sick
        .iter()
        .rposition(|&v| pred(v))
        .map(|i| t[i])
}

/// Time of the first index whose sick count satisfies the predicate.
fn first_where(t: &[f64], n_sick: &[f64], pred: impl Fn(f64) -> bool) -> Option<f64> {
    n_sick
        .iter()
        .position(|&v| pred(v))
        .map(|i| t[i])
}
