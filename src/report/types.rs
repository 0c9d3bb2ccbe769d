use std::path::{Path, PathBuf};

/// File name of the tabular report.
pub const CSV_FILE: &str = "timesheet.csv";
/// File name of the structured report.
pub const JSON_FILE: &str = "timesheet.json";
/// Step output key under which the CSV path is published.
pub const OUTPUT_KEY: &str = "timesheet_file";

/// Where the two reports land. Both are overwritten on every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub csv: PathBuf,
    pub json: PathBuf,
}

impl Default for OutputPaths {
    /// Bare file names, relative to the working directory.
    fn default() -> Self {
        Self {
            csv: PathBuf::from(CSV_FILE),
            json: PathBuf::from(JSON_FILE),
        }
    }
}

impl OutputPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            csv: dir.join(CSV_FILE),
            json: dir.join(JSON_FILE),
        }
    }
}

/// What a successful report step produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written {
    pub paths: OutputPaths,
    pub authors: usize,
}
