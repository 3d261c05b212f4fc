//! Summary table output.
//!
//! Writes one results file per model: a CSV table with one row per
//! processed run, or a JSON report carrying the same statistics plus
//! batch metadata. Undefined statistics are written as `nan` and
//! recovered as undefined when a row is parsed back.

use crate::models::{BatchReport, EpidemicStats, Outcome};
use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Column headers of the summary table, in row order.
pub const HEADER: &str = "N_max, p_max, t_crit, t_rise, t_heal, t_eradicate";

/// Writer for one model's CSV summary table.
///
/// The file is truncated and the header written when the writer is
/// created; rows are appended as runs complete.
pub struct SummaryWriter {
    file: File,
}

impl SummaryWriter {
    /// Create (or truncate) the summary file and write the header.
    pub fn create(path: &Path) -> Result<Self> {
        let mut file = File::create(path)
            .with_context(|| format!("failed to create summary file {}", path.display()))?;
        writeln!(file, "{}", HEADER)?;
        Ok(Self { file })
    }

    /// Append one statistics row.
    pub fn append(&mut self, stats: &EpidemicStats) -> Result<()> {
        writeln!(self.file, "{}", format_row(stats)).context("failed to append summary row")
    }
}

/// Format one statistics record as a CSV row.
///
/// `N_max` is written as an integer, everything else as a float;
/// undefined values become `nan`.
pub fn format_row(stats: &EpidemicStats) -> String {
    let mut fields = vec![stats.n_max.to_string(), format_value(Some(stats.p_max))];
    for value in [stats.t_crit, stats.t_rise, stats.t_heal, stats.t_eradicate] {
        fields.push(format_value(value));
    }
    fields.join(",")
}

fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "nan".to_string(),
    }
}

/// Parse a summary row back into a statistics record.
///
/// The outcome is reconstructed from the defined/undefined pattern.
#[allow(dead_code)] // Utility for tooling that post-processes result tables
pub fn parse_row(row: &str) -> Result<EpidemicStats> {
    let fields: Vec<&str> = row.split(',').map(str::trim).collect();
    if fields.len() != 6 {
        anyhow::bail!("expected 6 fields, found {}", fields.len());
    }

    let parse = |s: &str| -> Result<Option<f64>> {
        if s == "nan" {
            return Ok(None);
        }
        let v: f64 = s
            .parse()
            .with_context(|| format!("invalid summary field {:?}", s))?;
        Ok(if v.is_nan() { None } else { Some(v) })
    };

    let n_max = parse(fields[0])?
        .context("N_max must be defined")? as u32;
    let p_max = parse(fields[1])?.context("p_max must be defined")?;
    let t_crit = parse(fields[2])?;
    let t_rise = parse(fields[3])?;
    let t_heal = parse(fields[4])?;
    let t_eradicate = parse(fields[5])?;

    let outcome = if t_crit.is_some() || t_rise.is_some() {
        Outcome::FullInfection
    } else if t_eradicate.is_some() {
        Outcome::Eradicated
    } else {
        Outcome::Ongoing
    };

    Ok(EpidemicStats {
        n_max,
        p_max,
        t_crit,
        t_rise,
        t_heal,
        t_eradicate,
        outcome,
    })
}

/// Write a per-model JSON report.
pub fn write_json_report(report: &BatchReport, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(report)?;
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("failed to create JSON report {}", path.display()))?;
    file.write_all(content.as_bytes())?;
    file.write_all(b"\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RunSummary;
    use std::fs;

    fn full_stats() -> EpidemicStats {
        EpidemicStats {
            n_max: 100,
            p_max: 1.0,
            t_crit: Some(1.5),
            t_rise: Some(0.25),
            t_heal: None,
            t_eradicate: None,
            outcome: Outcome::FullInfection,
        }
    }

    fn eradicated_stats() -> EpidemicStats {
        EpidemicStats {
            n_max: 5,
            p_max: 0.1,
            t_crit: None,
            t_rise: None,
            t_heal: Some(0.0),
            t_eradicate: Some(4.0),
            outcome: Outcome::Eradicated,
        }
    }

    #[test]
    fn test_format_row_full_infection() {
        assert_eq!(format_row(&full_stats()), "100,1,1.5,0.25,nan,nan");
    }

    #[test]
    fn test_format_row_eradicated() {
        assert_eq!(format_row(&eradicated_stats()), "5,0.1,nan,nan,0,4");
    }

    #[test]
    fn test_row_round_trip_preserves_defined_pattern() {
        for stats in [full_stats(), eradicated_stats()] {
            let parsed = parse_row(&format_row(&stats)).unwrap();
            assert_eq!(parsed.n_max, stats.n_max);
            assert_eq!(parsed.t_crit.is_some(), stats.t_crit.is_some());
            assert_eq!(parsed.t_rise.is_some(), stats.t_rise.is_some());
            assert_eq!(parsed.t_heal.is_some(), stats.t_heal.is_some());
            assert_eq!(parsed.t_eradicate.is_some(), stats.t_eradicate.is_some());
            assert_eq!(parsed.outcome, stats.outcome);
            assert!((parsed.p_max - stats.p_max).abs() < 1e-9);
        }
    }

    #[test]
    fn test_parse_row_rejects_wrong_field_count() {
        assert!(parse_row("1,2,3").is_err());
    }

    #[test]
    fn test_parse_row_rejects_garbage() {
        assert!(parse_row("a,b,c,d,e,f").is_err());
    }

    #[test]
    fn test_summary_writer_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0.csv");

        let mut writer = SummaryWriter::create(&path).unwrap();
        writer.append(&full_stats()).unwrap();
        writer.append(&eradicated_stats()).unwrap();
        drop(writer);

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER);
        assert!(lines[1].starts_with("100,"));
        assert!(lines[2].ends_with(",4"));
    }

    #[test]
    fn test_summary_writer_truncates_previous_batch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0.csv");
        fs::write(&path, "stale content\n").unwrap();

        let writer = SummaryWriter::create(&path).unwrap();
        drop(writer);

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, format!("{}\n", HEADER));
    }

    #[test]
    fn test_json_report_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0.json");

        let mut report = BatchReport::new("0".to_string());
        report.runs.push(RunSummary {
            job: "job_a".to_string(),
            stats: eradicated_stats(),
        });
        write_json_report(&report, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let parsed: BatchReport = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.model_id, "0");
        assert_eq!(parsed.runs.len(), 1);
        assert_eq!(parsed.runs[0].stats.t_eradicate, Some(4.0));
        assert_eq!(parsed.runs[0].stats.t_crit, None);
    }
}
