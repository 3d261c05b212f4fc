//! Data models for the epidemic-curve analyzer.
//!
//! This module contains the core data structures shared across the
//! pipeline: parsed trajectory sets, extracted statistics, and the
//! per-batch report types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A parsed simulation run: time vector, sick-count series, and the
/// per-agent health matrix.
#[derive(Debug, Clone)]
pub struct TrajectorySet {
    /// Time points, strictly increasing.
    pub t: Vec<f64>,
    /// Number of sick agents at each time point (integral values stored
    /// as f64, matching the on-disk representation).
    pub n_sick: Vec<f64>,
    /// Health values in [0, 100]; `health[agent][i]` is agent's health
    /// at time `t[i]`.
    pub health: Vec<Vec<f64>>,
    /// Population size N.
    pub population: usize,
}

impl TrajectorySet {
    /// Build a trajectory set, checking the structural invariants.
    pub fn new(
        t: Vec<f64>,
        n_sick: Vec<f64>,
        health: Vec<Vec<f64>>,
        population: usize,
    ) -> Result<Self, String> {
        if t.is_empty() {
            return Err("empty time series".to_string());
        }
        if n_sick.len() != t.len() {
            return Err(format!(
                "sick-count series length {} does not match {} time points",
                n_sick.len(),
                t.len()
            ));
        }
        if !t.windows(2).all(|w| w[0] < w[1]) {
            return Err("time points are not strictly increasing".to_string());
        }
        for (agent, row) in health.iter().enumerate() {
            if row.len() != t.len() {
                return Err(format!(
                    "agent {} has {} samples, expected {}",
                    agent,
                    row.len(),
                    t.len()
                ));
            }
        }
        if n_sick
            .iter()
            .any(|&n| !(0.0..=population as f64).contains(&n))
        {
            return Err(format!("sick count outside [0, {}]", population));
        }

        Ok(Self {
            t,
            n_sick,
            health,
            population,
        })
    }

    /// Number of time points.
    pub fn len(&self) -> usize {
        self.t.len()
    }

    /// Number of agent trajectories actually recorded (may be fewer than
    /// the population when the writer subsamples).
    pub fn agent_count(&self) -> usize {
        self.health.len()
    }
}

/// How a run ended, derived from the sick-count series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The sick count reached the full population at least once.
    FullInfection,
    /// The run never reached full infection and ends with zero sick.
    Eradicated,
    /// Partial outbreak, still active at the end of the series.
    Ongoing,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::FullInfection => write!(f, "full infection"),
            Outcome::Eradicated => write!(f, "eradicated"),
            Outcome::Ongoing => write!(f, "ongoing"),
        }
    }
}

/// Scalar statistics extracted from one run.
///
/// `n_max` and `p_max` are always defined. The two pairs
/// (`t_crit`, `t_rise`) and (`t_heal`, `t_eradicate`) are mutually
/// exclusive: the first is populated only on full infection, the second
/// only on eradication. Fields outside the active branch stay `None`,
/// never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpidemicStats {
    /// Peak sick count.
    pub n_max: u32,
    /// Peak sick fraction, `n_max / N`.
    pub p_max: f64,
    /// Last time the sick count was at or below N/e.
    pub t_crit: Option<f64>,
    /// Rise interval between the 1/e and 1-1/e crossings.
    pub t_rise: Option<f64>,
    /// Span between the first and last single-remaining-case instants.
    pub t_heal: Option<f64>,
    /// Time of the last return to zero sick.
    pub t_eradicate: Option<f64>,
    /// Which branch populated the conditional fields.
    pub outcome: Outcome,
}

/// One discovered input file, decoupled from how it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFile {
    /// Model identifier, taken from the data directory name.
    pub model_id: String,
    /// Job name, the file stem.
    pub job: String,
    /// Full path to the CSV file.
    pub path: std::path::PathBuf,
}

/// Summary of one processed run, as written to the results table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub job: String,
    pub stats: EpidemicStats,
}

/// Per-model report for the JSON output mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Model identifier this report covers.
    pub model_id: String,
    /// When the batch ran.
    pub generated_at: DateTime<Utc>,
    /// One entry per processed run file.
    pub runs: Vec<RunSummary>,
}

impl BatchReport {
    pub fn new(model_id: String) -> Self {
        Self {
            model_id,
            generated_at: Utc::now(),
            runs: Vec::new(),
        }
    }
}
