//! Common test utilities for levelshift-polars tests

#![allow(dead_code)]

use polars::prelude::*;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// Frame with a `code` key and a `rate` value column
pub fn create_rate_df(codes: &[&str], rates: &[f64]) -> DataFrame {
    df!["code" => codes, "rate" => rates].unwrap()
}

/// Extract a single f64 value from a result DataFrame
pub fn extract_f64(df: &DataFrame, col_name: &str, row: usize) -> Option<f64> {
    df.column(col_name).unwrap().f64().unwrap().get(row)
}

/// Write `contents` to `name` inside a fresh temp dir
pub fn write_csv(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    (dir, path)
}
