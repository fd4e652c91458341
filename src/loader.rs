//! Process-set input adapters.
//!
//! # Line format
//!
//! One process per line, four whitespace-separated integers:
//!
//! ```text
//! pid arrival_time burst_time priority
//! ```
//!
//! Blank lines are skipped. Values are only parsed here; range checks
//! (positive burst, unique pids, …) belong to
//! [`validate_processes`](crate::validation::validate_processes).
//!
//! # Inline format
//!
//! `ARRIVAL,BURST[,PRIORITY]`, used by the command line.

use log::warn;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::ProcessSpec;

const FIELD_NAMES: [&str; 4] = ["pid", "arrival_time", "burst_time", "priority"];

/// A line that could not be turned into a process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// 1-based line number (0 for inline specs).
    pub line: usize,
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// The offending text, trimmed.
    pub content: String,
}

/// Categories of parse failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The line does not have the expected number of fields.
    WrongFieldCount {
        /// Fields actually present.
        found: usize,
    },
    /// A field is not an integer.
    InvalidInteger {
        /// Field name.
        field: &'static str,
        /// Raw value.
        value: String,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(f, "line {}: ", self.line)?;
        }
        match &self.kind {
            ParseErrorKind::WrongFieldCount { found } => {
                write!(f, "unexpected field count {found} ('{}')", self.content)
            }
            ParseErrorKind::InvalidInteger { field, value } => {
                write!(f, "{field} '{value}' is not an integer ('{}')", self.content)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Result of lenient parsing: every good line plus every bad one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedProcesses {
    /// Successfully parsed processes, in file order.
    pub processes: Vec<ProcessSpec>,
    /// One entry per rejected line.
    pub errors: Vec<ParseError>,
}

impl ParsedProcesses {
    /// Whether every non-blank line parsed.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Failure to load a process file.
#[derive(Debug)]
pub enum LoadError {
    /// The file could not be read.
    Io {
        /// Path that was opened.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// A line was malformed (strict mode only).
    Parse(ParseError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, source } => {
                write!(f, "cannot read {}: {source}", path.display())
            }
            LoadError::Parse(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Parse(e) => Some(e),
        }
    }
}

impl From<ParseError> for LoadError {
    fn from(e: ParseError) -> Self {
        LoadError::Parse(e)
    }
}

fn parse_line(number: usize, line: &str) -> Result<ProcessSpec, ParseError> {
    let content = line.trim();
    let fields: Vec<&str> = content.split_whitespace().collect();
    if fields.len() != FIELD_NAMES.len() {
        return Err(ParseError {
            line: number,
            kind: ParseErrorKind::WrongFieldCount {
                found: fields.len(),
            },
            content: content.to_string(),
        });
    }

    let mut values = [0i64; 4];
    for (slot, (&field, raw)) in values.iter_mut().zip(FIELD_NAMES.iter().zip(&fields)) {
        *slot = raw.parse().map_err(|_| ParseError {
            line: number,
            kind: ParseErrorKind::InvalidInteger {
                field,
                value: raw.to_string(),
            },
            content: content.to_string(),
        })?;
    }

    let [pid, arrival, burst, priority] = values;
    Ok(ProcessSpec::new(arrival, burst)
        .with_pid(pid)
        .with_priority(priority))
}

fn numbered_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty())
}

/// Parses the line format, keeping good lines and reporting bad ones.
pub fn parse_processes(text: &str) -> ParsedProcesses {
    let mut parsed = ParsedProcesses::default();
    for (number, line) in numbered_lines(text) {
        match parse_line(number, line) {
            Ok(spec) => parsed.processes.push(spec),
            Err(e) => {
                warn!("skipping {e}");
                parsed.errors.push(e);
            }
        }
    }
    parsed
}

/// Parses the line format, failing on the first bad line.
pub fn parse_processes_strict(text: &str) -> Result<Vec<ProcessSpec>, ParseError> {
    numbered_lines(text)
        .map(|(number, line)| parse_line(number, line))
        .collect()
}

/// Reads and parses a process file.
///
/// In lenient mode bad lines are dropped and returned in
/// [`ParsedProcesses::errors`]; in strict mode the first bad line fails
/// the whole import and the result is always clean.
pub fn load_processes(path: impl AsRef<Path>, strict: bool) -> Result<ParsedProcesses, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if strict {
        Ok(ParsedProcesses {
            processes: parse_processes_strict(&text)?,
            errors: Vec::new(),
        })
    } else {
        Ok(parse_processes(&text))
    }
}

/// Parses one `ARRIVAL,BURST[,PRIORITY]` spec.
pub fn parse_inline_spec(s: &str) -> Result<ProcessSpec, ParseError> {
    let content = s.trim();
    let fields: Vec<&str> = content.split(',').map(str::trim).collect();
    if !(2..=3).contains(&fields.len()) {
        return Err(ParseError {
            line: 0,
            kind: ParseErrorKind::WrongFieldCount {
                found: fields.len(),
            },
            content: content.to_string(),
        });
    }

    let parse = |field: &'static str, raw: &str| {
        raw.parse::<i64>().map_err(|_| ParseError {
            line: 0,
            kind: ParseErrorKind::InvalidInteger {
                field,
                value: raw.to_string(),
            },
            content: content.to_string(),
        })
    };

    let mut spec = ProcessSpec::new(parse("arrival_time", fields[0])?, parse("burst_time", fields[1])?);
    if let Some(raw) = fields.get(2).copied() {
        spec = spec.with_priority(parse("priority", raw)?);
    }
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "1 0 8 2\n2 1 4 1\n\n   \n3 2 9 3\n";

    #[test]
    fn test_parse_sample() {
        let parsed = parse_processes(SAMPLE);
        assert!(parsed.is_clean());
        assert_eq!(parsed.processes.len(), 3);
        assert_eq!(
            parsed.processes[1],
            ProcessSpec::new(1, 4).with_pid(2).with_priority(1)
        );
    }

    #[test]
    fn test_lenient_keeps_good_lines() {
        let text = "1 0 8 2\n2 1 4\n3 x 9 3\n4 3 5 0\n";
        let parsed = parse_processes(text);
        let pids: Vec<Option<i64>> = parsed.processes.iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![Some(1), Some(4)]);

        assert_eq!(parsed.errors.len(), 2);
        assert_eq!(parsed.errors[0].line, 2);
        assert_eq!(parsed.errors[0].kind, ParseErrorKind::WrongFieldCount { found: 3 });
        assert_eq!(
            parsed.errors[1].kind,
            ParseErrorKind::InvalidInteger {
                field: "arrival_time",
                value: "x".to_string()
            }
        );
        assert_eq!(parsed.errors[1].content, "3 x 9 3");
    }

    #[test]
    fn test_strict_fails_atomically() {
        let err = parse_processes_strict("1 0 8 2\n2 1 4 1 9\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.kind, ParseErrorKind::WrongFieldCount { found: 5 });
        assert_eq!(parse_processes_strict(SAMPLE).unwrap().len(), 3);
    }

    #[test]
    fn test_negative_values_parse() {
        // Range checks are left to validation
        let specs = parse_processes_strict("1 -2 0 -1").unwrap();
        assert_eq!(specs[0].arrival_time, -2);
        assert_eq!(specs[0].burst_time, 0);
    }

    #[test]
    fn test_error_display() {
        let err = parse_processes_strict("7 0 abc 1").unwrap_err();
        assert_eq!(
            err.to_string(),
            "line 1: burst_time 'abc' is not an integer ('7 0 abc 1')"
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_processes("/nonexistent/processes.txt", false).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_load_file() {
        let path = std::env::temp_dir().join(format!("cpu_schedule_loader_{}.txt", std::process::id()));
        fs::write(&path, "1 0 5 1\nbad line\n2 2 3 1\n").unwrap();

        let lenient = load_processes(&path, false).unwrap();
        assert_eq!(lenient.processes.len(), 2);
        assert_eq!(lenient.errors.len(), 1);
        assert_eq!(lenient.errors[0].line, 2);
        assert_eq!(lenient.errors[0].content, "bad line");
        let err = load_processes(&path, true).unwrap_err();
        assert!(matches!(err, LoadError::Parse(ParseError { line: 2, .. })));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_inline_spec() {
        assert_eq!(parse_inline_spec("0,5").unwrap(), ProcessSpec::new(0, 5));
        assert_eq!(
            parse_inline_spec(" 2, 3 ,1 ").unwrap(),
            ProcessSpec::new(2, 3).with_priority(1)
        );
        assert_eq!(
            parse_inline_spec("1").unwrap_err().kind,
            ParseErrorKind::WrongFieldCount { found: 1 }
        );
        assert!(matches!(
            parse_inline_spec("1,two").unwrap_err().kind,
            ParseErrorKind::InvalidInteger { field: "burst_time", .. }
        ));
    }
}
