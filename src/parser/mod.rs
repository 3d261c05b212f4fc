//! Trajectory file parsing.
//!
//! Reads the simulation output format: an optional first line holding
//! the population size N, followed by one delimiter-separated row per
//! time step: `time;sick_count;health_1;...;health_N;`. The writer
//! terminates every row with a trailing delimiter, which is tolerated.
//!
//! Two variants are handled:
//! - headerless files, where N is derived from the column count;
//! - files without the sick-count column, detected by comparing N
//!   against the column count, where the counts are derived from the
//!   health values and the configured sick threshold.

use crate::models::TrajectorySet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors produced while reading a trajectory file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("file contains no data rows")]
    Empty,

    #[error("line {line}: field {column} is not a number: {value:?}")]
    BadField {
        line: usize,
        column: usize,
        value: String,
    },

    #[error("line {line}: expected {expected} columns, found {found}")]
    ColumnCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid trajectory data: {0}")]
    Invalid(String),
}

/// Parser settings, typically taken from the `[parser]` config section.
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Field delimiter, `;` in the simulation output.
    pub delimiter: char,
    /// Health value at or above which an agent counts as sick, used
    /// when the file lacks a sick-count column.
    pub sick_threshold: f64,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            delimiter: ';',
            sick_threshold: 50.0,
        }
    }
}

/// Read and parse one trajectory file.
pub fn parse_file(path: &Path, options: &ParserOptions) -> Result<TrajectorySet, ParseError> {
    let content = fs::read_to_string(path)?;
    parse_str(&content, options)
}

/// Parse trajectory data from a string.
pub fn parse_str(content: &str, options: &ParserOptions) -> Result<TrajectorySet, ParseError> {
    let mut lines = content.lines().enumerate().peekable();

    // Header variant: a lone integer N on the first line. A first line
    // containing the delimiter is already a data row.
    let mut population: Option<usize> = None;
    if let Some(&(_, first)) = lines.peek() {
        let trimmed = first.trim();
        if !trimmed.contains(options.delimiter) {
            population = Some(trimmed.parse::<usize>().map_err(|_| ParseError::BadField {
                line: 1,
                column: 1,
                value: trimmed.to_string(),
            })?);
            lines.next();
        }
    }

    let mut t = Vec::new();
    let mut rows: Vec<Vec<f64>> = Vec::new();
    let mut expected_columns: Option<usize> = None;

    for (index, line) in lines {
        let line_no = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        // Trailing delimiter from the writer leaves an empty last field.
        let trimmed = trimmed.strip_suffix(options.delimiter).unwrap_or(trimmed);

        let mut fields = Vec::new();
        for (col, raw) in trimmed.split(options.delimiter).enumerate() {
            let value = raw.trim().parse::<f64>().map_err(|_| ParseError::BadField {
                line: line_no,
                column: col + 1,
                value: raw.trim().to_string(),
            })?;
            fields.push(value);
        }

        match expected_columns {
            None => expected_columns = Some(fields.len()),
            Some(expected) if fields.len() != expected => {
                return Err(ParseError::ColumnCount {
                    line: line_no,
                    expected,
                    found: fields.len(),
                });
            }
            Some(_) => {}
        }

        if fields.len() < 2 {
            return Err(ParseError::ColumnCount {
                line: line_no,
                expected: 2,
                found: fields.len(),
            });
        }

        t.push(fields[0]);
        fields.remove(0);
        rows.push(fields);
    }

    if rows.is_empty() {
        return Err(ParseError::Empty);
    }

    let data_columns = rows[0].len();

    // Decide the layout. With a header, a column count of exactly N
    // means the sick-count column is absent; N + 1 means it is present.
    // Headerless files are assumed to carry the sick-count column, so
    // N is the remaining column count.
    let (population, has_sick_column) = match population {
        Some(n) if data_columns == n => (n, false),
        Some(n) => (n, true),
        None => (data_columns - 1, true),
    };

    let (n_sick, health_rows): (Vec<f64>, Vec<Vec<f64>>) = if has_sick_column {
        rows.into_iter()
            .map(|mut row| {
                let sick = row.remove(0);
                (sick, row)
            })
            .unzip()
    } else {
        rows.into_iter()
            .map(|row| {
                let sick = row.iter().filter(|&&h| h >= options.sick_threshold).count();
                (sick as f64, row)
            })
            .unzip()
    };

    // Transpose time-major rows into per-agent trajectories.
    let agents = health_rows[0].len();
    let mut health = vec![Vec::with_capacity(t.len()); agents];
    for row in &health_rows {
        for (agent, &value) in row.iter().enumerate() {
            health[agent].push(value);
        }
    }

    TrajectorySet::new(t, n_sick, health, population).map_err(ParseError::Invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> ParserOptions {
        ParserOptions::default()
    }

    #[test]
    fn test_parse_with_header_and_sick_column() {
        let content = "3\n0.0;0;10;20;30;\n1.0;1;60;20;30;\n2.0;2;70;80;30;\n";
        let set = parse_str(content, &opts()).unwrap();

        assert_eq!(set.population, 3);
        assert_eq!(set.t, vec![0.0, 1.0, 2.0]);
        assert_eq!(set.n_sick, vec![0.0, 1.0, 2.0]);
        assert_eq!(set.agent_count(), 3);
        assert_eq!(set.health[0], vec![10.0, 60.0, 70.0]);
    }

    #[test]
    fn test_parse_headerless_assumes_sick_column() {
        let content = "0.0;0;10;20\n1.0;2;60;70\n";
        let set = parse_str(content, &opts()).unwrap();

        assert_eq!(set.population, 2);
        assert_eq!(set.n_sick, vec![0.0, 2.0]);
        assert_eq!(set.agent_count(), 2);
    }

    #[test]
    fn test_parse_without_sick_column_derives_counts() {
        // Header N = 3 and exactly 3 data columns: no sick-count column.
        let content = "3\n0.0;10;20;30;\n1.0;60;20;30;\n2.0;70;80;30;\n";
        let set = parse_str(content, &opts()).unwrap();

        assert_eq!(set.population, 3);
        // Threshold 50: one agent sick at t=1, two at t=2.
        assert_eq!(set.n_sick, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_parse_tolerates_missing_trailing_delimiter() {
        let content = "2\n0.0;0;10;20\n1.0;1;60;20\n";
        let set = parse_str(content, &opts()).unwrap();
        assert_eq!(set.agent_count(), 2);
    }

    #[test]
    fn test_parse_rejects_non_numeric_field() {
        let content = "2\n0.0;0;abc;20;\n";
        match parse_str(content, &opts()) {
            Err(ParseError::BadField { line, column, value }) => {
                assert_eq!(line, 2);
                assert_eq!(column, 3);
                assert_eq!(value, "abc");
            }
            other => panic!("expected BadField, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_ragged_rows() {
        let content = "2\n0.0;0;10;20;\n1.0;1;60;\n";
        match parse_str(content, &opts()) {
            Err(ParseError::ColumnCount { line, expected, found }) => {
                assert_eq!(line, 3);
                assert_eq!(expected, 4);
                assert_eq!(found, 3);
            }
            other => panic!("expected ColumnCount, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_empty_input() {
        assert!(matches!(parse_str("5\n", &opts()), Err(ParseError::Empty)));
    }

    #[test]
    fn test_parse_rejects_non_increasing_time() {
        let content = "2\n1.0;0;10;20;\n1.0;1;60;20;\n";
        assert!(matches!(
            parse_str(content, &opts()),
            Err(ParseError::Invalid(_))
        ));
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let content = "2\n0.0;0;10;20;\n\n1.0;1;60;20;\n";
        let set = parse_str(content, &opts()).unwrap();
        assert_eq!(set.len(), 2);
    }
}
