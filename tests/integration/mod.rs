// Integration test utilities and common code
// WHY: Grid and document fixtures are written to a temp dir so the CLI and the library read the same files

#![allow(dead_code)]

use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Temporary directory holding JSON store fixtures
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();

        Self {
            temp_dir,
            root_path,
        }
    }

    /// Write raw content to a file below the fixture root
    pub fn create_file<P: AsRef<Path>>(&self, relative_path: P, content: &str) -> PathBuf {
        let file_path = self.root_path.join(relative_path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        fs::write(&file_path, content).expect("Failed to write fixture file");
        file_path
    }

    /// Grid fixture with `rows` rows of `columns` cells named `r{row}c{column}`
    pub fn create_grid<P: AsRef<Path>>(
        &self,
        relative_path: P,
        columns: usize,
        rows: usize,
        cursor: i64,
    ) -> PathBuf {
        self.create_grid_with(relative_path, generated_rows(columns, rows), cursor)
    }

    pub fn create_grid_with<P: AsRef<Path>>(
        &self,
        relative_path: P,
        rows: Vec<Vec<String>>,
        cursor: i64,
    ) -> PathBuf {
        let grid = json!({ "base_name": "COLUMN", "rows": rows, "cursor": cursor });
        self.create_file(relative_path, &grid.to_string())
    }

    /// Document fixture; each inner vector is one page of lines
    pub fn create_document<P: AsRef<Path>>(&self, relative_path: P, pages: &[Vec<&str>]) -> PathBuf {
        let pages: Vec<_> = pages
            .iter()
            .map(|lines| json!({ "width": 80.0, "lines": lines }))
            .collect();
        self.create_file(relative_path, &json!({ "pages": pages }).to_string())
    }

    pub fn path(&self, relative_path: &str) -> PathBuf {
        self.root_path.join(relative_path)
    }
}

pub fn generated_rows(columns: usize, rows: usize) -> Vec<Vec<String>> {
    (1..=rows)
        .map(|r| (1..=columns).map(|c| format!("r{r}c{c}")).collect())
        .collect()
}

/// Run the built `fieldprobe` binary
pub fn run_cli<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    Command::new(env!("CARGO_BIN_EXE_fieldprobe"))
        .args(args)
        .output()
        .expect("Failed to run fieldprobe")
}

/// Parse every stdout line as JSON
pub fn json_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("stdout line is not JSON"))
        .collect()
}
