pub mod types;

pub use types::{OutputPaths, Written, OUTPUT_KEY};

use crate::timesheet::Timesheet;
use colored::Colorize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, instrument};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report file: {0}")]
    FileWrite(#[from] std::io::Error),

    #[error("Failed to write CSV report: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to encode JSON report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write both reports, overwriting whatever is already there.
///
/// The CSV is written first; if the JSON write then fails the CSV is left
/// in place.
#[instrument(skip(timesheet), fields(authors = timesheet.len()))]
pub fn output(timesheet: &Timesheet, paths: &OutputPaths) -> Result<Written, ReportError> {
    debug!(path = %paths.csv.display(), "writing CSV report");
    write_csv(timesheet, &paths.csv)?;
    debug!(path = %paths.json.display(), "writing JSON report");
    write_json(timesheet, &paths.json)?;

    Ok(Written {
        paths: paths.clone(),
        authors: timesheet.len(),
    })
}

/// One row per author.
///
/// Header is `Author,Hours` for decimal timesheets and `Author,Hours,Time`
/// for structured ones. Hours always carry two decimals.
pub fn write_csv(timesheet: &Timesheet, path: &Path) -> Result<(), ReportError> {
    let mut writer = csv::WriterBuilder::new().from_path(path)?;
    match timesheet {
        Timesheet::Hours(totals) => {
            writer.write_record(["Author", "Hours"])?;
            for (author, hours) in totals {
                let hours = format!("{:.2}", hours);
                writer.write_record([author.as_str(), hours.as_str()])?;
            }
        }
        Timesheet::Structured(totals) => {
            writer.write_record(["Author", "Hours", "Time"])?;
            for (author, time) in totals {
                let hours = format!("{:.2}", time.hours_decimal);
                let display = time.to_string();
                writer.write_record([author.as_str(), hours.as_str(), display.as_str()])?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

/// The whole mapping, pretty-printed, keys in first-seen order.
pub fn write_json(timesheet: &Timesheet, path: &Path) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(timesheet)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Publish a step output for later workflow steps.
///
/// Appends `key=value` to the GITHUB_OUTPUT file when one is configured.
/// Outside Actions the value is only logged.
pub fn publish_output(key: &str, value: &str, output_file: Option<&Path>) -> Result<(), ReportError> {
    match output_file {
        Some(file) => {
            let mut file = OpenOptions::new().create(true).append(true).open(file)?;
            writeln!(file, "{}={}", key, value)?;
            debug!(key, value, "published step output");
        }
        None => info!(key, value, "no GITHUB_OUTPUT configured, output not published"),
    }
    Ok(())
}

/// Print the per-author totals and the completion line to stdout.
pub fn print_summary(timesheet: &Timesheet, written: &Written) {
    println!();
    if timesheet.is_empty() {
        println!("{}", "No time recorded this week.".yellow());
    } else {
        match timesheet {
            Timesheet::Hours(totals) => {
                for (author, hours) in totals {
                    println!("  {:<24} {:>8.2}h", author.bold(), hours);
                }
            }
            Timesheet::Structured(totals) => {
                for (author, time) in totals {
                    println!(
                        "  {:<24} {:>8.2}h  ({})",
                        author.bold(),
                        time.hours_decimal,
                        time
                    );
                }
            }
        }
    }
    println!();
    println!(
        "{} {} & {}",
        "Timesheet generated:".green().bold(),
        written.paths.csv.display(),
        written.paths.json.display()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timesheet::StructuredTime;
    use indexmap::IndexMap;

    fn hours_timesheet() -> Timesheet {
        let mut totals = IndexMap::new();
        totals.insert("zed".to_string(), 2.5);
        totals.insert("amy".to_string(), 1.0 / 3.0);
        Timesheet::Hours(totals)
    }

    fn structured_timesheet() -> Timesheet {
        let mut totals = IndexMap::new();
        totals.insert(
            "alice".to_string(),
            StructuredTime {
                hours_decimal: 2.25,
                hours: 2,
                minutes: 15,
            },
        );
        Timesheet::Structured(totals)
    }

    #[test]
    fn test_write_csv_hours() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timesheet.csv");
        write_csv(&hours_timesheet(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Author,Hours\nzed,2.50\namy,0.33\n");
    }

    #[test]
    fn test_write_csv_structured() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timesheet.csv");
        write_csv(&structured_timesheet(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Author,Hours,Time\nalice,2.25,2h15min\n");
    }

    #[test]
    fn test_write_csv_empty_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timesheet.csv");
        write_csv(&Timesheet::Hours(IndexMap::new()), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Author,Hours\n");
    }

    #[test]
    fn test_write_json_hours() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timesheet.json");
        write_json(&hours_timesheet(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.find("\"zed\"").unwrap() < content.find("\"amy\"").unwrap());
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["zed"], 2.5);
    }

    #[test]
    fn test_write_json_structured_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timesheet.json");
        write_json(&structured_timesheet(), &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "alice": { "hoursDecimal": 2.25, "hours": 2, "minutes": 15 }
            })
        );
    }

    #[test]
    fn test_output_overwrites_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths::in_dir(dir.path());
        std::fs::write(&paths.csv, "stale contents that are much longer than the report\n").unwrap();
        std::fs::write(&paths.json, "stale").unwrap();

        let written = output(&structured_timesheet(), &paths).unwrap();
        assert_eq!(written.authors, 1);
        assert_eq!(
            std::fs::read_to_string(&paths.csv).unwrap(),
            "Author,Hours,Time\nalice,2.25,2h15min\n"
        );
        assert!(!std::fs::read_to_string(&paths.json).unwrap().contains("stale"));
    }

    #[test]
    fn test_output_to_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths::in_dir(&dir.path().join("missing"));
        assert!(output(&hours_timesheet(), &paths).is_err());
    }

    #[test]
    fn test_publish_output_appends() {
        let dir = tempfile::tempdir().unwrap();
        let sink = dir.path().join("github_output");
        std::fs::write(&sink, "previous=step\n").unwrap();

        publish_output(OUTPUT_KEY, "timesheet.csv", Some(&sink)).unwrap();

        let content = std::fs::read_to_string(&sink).unwrap();
        assert_eq!(content, "previous=step\ntimesheet_file=timesheet.csv\n");
    }

    #[test]
    fn test_publish_output_without_sink() {
        publish_output(OUTPUT_KEY, "timesheet.csv", None).unwrap();
    }

    #[test]
    fn test_print_summary_does_not_panic() {
        let written = Written {
            paths: OutputPaths::default(),
            authors: 1,
        };
        print_summary(&structured_timesheet(), &written);
        print_summary(&Timesheet::Hours(IndexMap::new()), &written);
    }
}
