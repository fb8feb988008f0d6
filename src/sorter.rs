use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Serialize;

use crate::error::{SortError, SortResult};
use crate::groups::{Coast, CoastGroups};

pub const DEFAULT_SEPARATOR: &str = " ";
pub const DEFAULT_WEST_OUTPUT: &str = "westcoast_samples.csv";
pub const DEFAULT_EAST_OUTPUT: &str = "eastcoast_samples.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Path(PathBuf),
    Stdin,
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::Path(path) => write!(f, "{}", path.display()),
            InputSource::Stdin => f.write_str("<stdin>"),
        }
    }
}

/// What to do with a line that has no location field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    #[default]
    Fail,
    Skip,
}

#[derive(Debug, Clone)]
pub struct SortConfig {
    pub separator: String,
    pub input: InputSource,
    pub west_output: PathBuf,
    pub east_output: PathBuf,
    pub malformed: MalformedPolicy,
}

impl SortConfig {
    pub fn new(input: InputSource) -> Self {
        SortConfig {
            separator: DEFAULT_SEPARATOR.to_string(),
            input,
            west_output: PathBuf::from(DEFAULT_WEST_OUTPUT),
            east_output: PathBuf::from(DEFAULT_EAST_OUTPUT),
            malformed: MalformedPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SortSummary {
    pub total: usize,
    pub west: usize,
    pub east: usize,
    pub discarded: usize,
    pub malformed: usize,
    /// 1-based line numbers of skipped malformed lines
    pub malformed_lines: Vec<usize>,
}

impl SortSummary {
    pub fn write_json(&self, path: &Path) -> SortResult<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(io::Error::from)
            .map_err(|source| SortError::WriteSummary { path: path.to_path_buf(), source })?;
        fs::write(path, json + "\n")
            .map_err(|source| SortError::WriteSummary { path: path.to_path_buf(), source })
    }
}

/// Lines routed to each coast, verbatim and in input order
#[derive(Debug, Default)]
pub struct SortedLines {
    pub west: Vec<u8>,
    pub east: Vec<u8>,
    pub summary: SortSummary,
}

/// Splits `text` into lines that keep their terminator.
///
/// `\n`, `\r\n` and a lone `\r` all end a line.
fn raw_lines(text: &str) -> impl Iterator<Item = &str> {
    let bytes = text.as_bytes();
    let mut start = 0;
    std::iter::from_fn(move || {
        if start >= bytes.len() {
            return None;
        }
        let end = match bytes[start..].iter().position(|&b| b == b'\n' || b == b'\r') {
            Some(off) => {
                let i = start + off;
                if bytes[i] == b'\r' && bytes.get(i + 1) == Some(&b'\n') { i + 2 } else { i + 1 }
            }
            None => bytes.len(),
        };
        let line = &text[start..end];
        start = end;
        Some(line)
    })
}

fn strip_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Splits one line into `(sample_id, location)`.
///
/// Fields after the second are ignored. Returns `None` when the line has
/// fewer than two fields.
pub fn split_record<'a>(line: &'a str, separator: &str) -> Option<(&'a str, &'a str)> {
    let mut fields = strip_terminator(line).split(separator);
    let sample_id = fields.next()?;
    let location = fields.next()?;
    Some((sample_id, location))
}

pub fn sort_lines(
    text: &str,
    separator: &str,
    groups: &CoastGroups,
    policy: MalformedPolicy,
) -> SortResult<SortedLines> {
    if separator.is_empty() {
        return Err(SortError::InvalidSeparator);
    }

    let mut sorted = SortedLines::default();

    for (idx, raw_line) in raw_lines(text).enumerate() {
        let line_number = idx + 1;
        sorted.summary.total += 1;

        let Some((sample_id, location)) = split_record(raw_line, separator) else {
            match policy {
                MalformedPolicy::Fail => {
                    return Err(SortError::MalformedRecord {
                        line_number,
                        line: strip_terminator(raw_line).to_string(),
                    });
                }
                MalformedPolicy::Skip => {
                    warn!("Skipping malformed line {}: {:?}", line_number, strip_terminator(raw_line));
                    sorted.summary.malformed += 1;
                    sorted.summary.malformed_lines.push(line_number);
                    continue;
                }
            }
        };

        match groups.classify(location) {
            Some(Coast::West) => {
                sorted.west.extend_from_slice(raw_line.as_bytes());
                sorted.summary.west += 1;
            }
            Some(Coast::East) => {
                sorted.east.extend_from_slice(raw_line.as_bytes());
                sorted.summary.east += 1;
            }
            None => {
                debug!("Discarding {} from unmapped location {:?}", sample_id, location);
                sorted.summary.discarded += 1;
            }
        }
    }

    Ok(sorted)
}

fn read_input(input: &InputSource) -> SortResult<String> {
    let read_err = |source| SortError::ReadInput { input: input.to_string(), source };
    match input {
        InputSource::Path(path) => fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                SortError::InputNotFound { path: path.clone() }
            } else {
                read_err(source)
            }
        }),
        InputSource::Stdin => {
            let mut text = String::new();
            io::stdin().lock().read_to_string(&mut text).map_err(read_err)?;
            Ok(text)
        }
    }
}

fn write_output(path: &Path, contents: &[u8]) -> SortResult<()> {
    let write_err = |source| SortError::WriteOutput { path: path.to_path_buf(), source };
    let mut writer = BufWriter::new(File::create(path).map_err(write_err)?);
    writer.write_all(contents).map_err(write_err)?;
    writer.flush().map_err(write_err)
}

/// Reads the input, classifies every line and rewrites both coast files.
///
/// Nothing is written until the whole input has been classified, so a
/// failed run leaves existing outputs as they were.
pub fn organize(config: &SortConfig, groups: &CoastGroups) -> SortResult<SortSummary> {
    info!("Reading samples from {}", config.input);
    let text = read_input(&config.input)?;

    let sorted = sort_lines(&text, &config.separator, groups, config.malformed)?;

    write_output(&config.west_output, &sorted.west)?;
    info!("Wrote {} west coast samples to {}", sorted.summary.west, config.west_output.display());
    write_output(&config.east_output, &sorted.east)?;
    info!("Wrote {} east coast samples to {}", sorted.summary.east, config.east_output.display());

    if sorted.summary.discarded > 0 {
        warn!("{} samples matched neither coast and were dropped", sorted.summary.discarded);
    }

    Ok(sorted.summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &str = "mouse1 california\nmouse2 maryland\nmouse3 new_york\nmouse4 oregon\nmouse5 texas\n";

    fn lines(bytes: &[u8]) -> Vec<&str> {
        std::str::from_utf8(bytes).unwrap().lines().collect()
    }

    #[test]
    fn split_record_takes_second_field() {
        assert_eq!(split_record("mouse1 california\n", " "), Some(("mouse1", "california")));
        assert_eq!(split_record("mouse1,oregon,extra", ","), Some(("mouse1", "oregon")));
        assert_eq!(split_record("mouse1 oregon\r\n", " "), Some(("mouse1", "oregon")));
        assert_eq!(split_record("mouse1\n", " "), None);
        assert_eq!(split_record("", " "), None);
    }

    #[test]
    fn sorts_reference_example() {
        let sorted = sort_lines(SAMPLES, " ", &CoastGroups::default(), MalformedPolicy::Fail).unwrap();
        assert_eq!(lines(&sorted.west), vec!["mouse1 california", "mouse4 oregon"]);
        assert_eq!(lines(&sorted.east), vec!["mouse2 maryland", "mouse3 new_york"]);
        assert_eq!(
            sorted.summary,
            SortSummary { total: 5, west: 2, east: 2, discarded: 1, malformed: 0, malformed_lines: vec![] }
        );
    }

    #[test]
    fn keeps_lines_verbatim() {
        let text = "a oregon\r\nb maryland";
        let sorted = sort_lines(text, " ", &CoastGroups::default(), MalformedPolicy::Fail).unwrap();
        assert_eq!(sorted.west, b"a oregon\r\n");
        assert_eq!(sorted.east, b"b maryland");
    }

    #[test]
    fn lone_carriage_return_ends_a_line() {
        let text = "mouse1 california\rmouse2 maryland\rmouse3 texas\r";
        let sorted = sort_lines(text, " ", &CoastGroups::default(), MalformedPolicy::Fail).unwrap();
        assert_eq!(sorted.west, b"mouse1 california\r");
        assert_eq!(sorted.east, b"mouse2 maryland\r");
        assert_eq!(sorted.summary.total, 3);
        assert_eq!(sorted.summary.discarded, 1);
    }

    #[test]
    fn mixed_line_endings_are_each_one_line() {
        let lines: Vec<_> = raw_lines("a oregon\r\nb oregon\rc oregon\nd oregon").collect();
        assert_eq!(lines, vec!["a oregon\r\n", "b oregon\r", "c oregon\n", "d oregon"]);
    }

    #[test]
    fn fail_policy_reports_line_number() {
        let text = "mouse1 california\nmouse2\nmouse3 oregon\n";
        match sort_lines(text, " ", &CoastGroups::default(), MalformedPolicy::Fail) {
            Err(SortError::MalformedRecord { line_number, line }) => {
                assert_eq!(line_number, 2);
                assert_eq!(line, "mouse2");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn skip_policy_records_malformed_lines() {
        let text = "mouse1 california\nmouse2\n\nmouse3 oregon\n";
        let sorted = sort_lines(text, " ", &CoastGroups::default(), MalformedPolicy::Skip).unwrap();
        assert_eq!(lines(&sorted.west), vec!["mouse1 california", "mouse3 oregon"]);
        assert_eq!(sorted.summary.malformed, 2);
        assert_eq!(sorted.summary.malformed_lines, vec![2, 3]);
        assert_eq!(sorted.summary.total, 4);
    }

    #[test]
    fn multi_character_separator() {
        let text = "mouse1::oregon\nmouse2::maryland\n";
        let sorted = sort_lines(text, "::", &CoastGroups::default(), MalformedPolicy::Fail).unwrap();
        assert_eq!(lines(&sorted.west), vec!["mouse1::oregon"]);
        assert_eq!(lines(&sorted.east), vec!["mouse2::maryland"]);
    }

    #[test]
    fn rejects_empty_separator() {
        assert!(matches!(
            sort_lines(SAMPLES, "", &CoastGroups::default(), MalformedPolicy::Fail),
            Err(SortError::InvalidSeparator)
        ));
    }

    #[test]
    fn empty_input_yields_empty_outputs() {
        let sorted = sort_lines("", " ", &CoastGroups::default(), MalformedPolicy::Fail).unwrap();
        assert!(sorted.west.is_empty());
        assert!(sorted.east.is_empty());
        assert_eq!(sorted.summary, SortSummary::default());
    }
}
