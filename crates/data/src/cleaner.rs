//! Offline CSV cleaning for the use case dataset
//!
//! Normalises header names, adds missing required columns, removes duplicate
//! (company, use case) rows and derives the slug columns, then writes the
//! result atomically.

use chrono::Local;
use navigator_common::fsutil::write_atomic;
use navigator_common::{NavigatorError, Result};
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::slug::slugify;
use crate::store::REQUIRED_COLUMNS;

/// Summary of one cleaning run
#[derive(Debug, Clone, Serialize)]
pub struct CleanReport {
    pub output: PathBuf,
    pub original_rows: usize,
    pub original_columns: usize,
    pub final_rows: usize,
    pub final_columns: usize,
    pub duplicates_removed: usize,
    pub added_columns: Vec<String>,
    pub columns: Vec<String>,
}

/// Known header spellings mapped onto canonical column names
fn column_alias(name: &str) -> Option<&'static str> {
    let canonical = match name {
        "ai type" | "ai_type" | "aitype" | "ai-type" | "type of ai" | "ai technology" => "ai_type",
        "business function" | "business_function" | "businessfunction" | "business-function"
        | "function" | "department" => "business_function",
        "company" | "organization" | "company name" | "org" => "company",
        "use case" | "use_case" | "use case name" | "use_case_name" | "usecase" | "case name"
        | "project" => "use_case_name",
        "outcome" | "result" | "impact" | "benefits" | "results" => "outcome",
        "source" | "link" | "url" | "source_link" | "reference" => "source_link",
        "ai_type_slug" | "aitype_slug" | "ai_slug" => "ai_type_slug",
        "business_function_slug" | "function_slug" | "business_slug" => "business_function_slug",
        _ => return None,
    };
    Some(canonical)
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

fn non_word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w]").expect("valid regex"))
}

/// Canonical column name for a raw CSV header
pub fn normalize_column_name(raw: &str) -> String {
    let name = raw.trim().to_lowercase();
    if let Some(canonical) = column_alias(&name) {
        return canonical.to_string();
    }

    let name = whitespace_re().replace_all(&name, "_");
    non_word_re().replace_all(&name, "").into_owned()
}

/// Header row plus data rows, all rows padded to the header width
#[derive(Debug, Clone, PartialEq, Eq)]
struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn normalize_headers(&mut self) {
        let mut seen = HashSet::new();
        let mut keep = Vec::with_capacity(self.headers.len());

        for header in &self.headers {
            let name = normalize_column_name(header);
            if seen.insert(name.clone()) {
                keep.push(Some(name));
            } else {
                warn!("Dropping duplicate column '{}' (normalised to '{}')", header, name);
                keep.push(None);
            }
        }

        self.rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&keep)
                    .filter(|(_, k)| k.is_some())
                    .map(|(cell, _)| cell.clone())
                    .collect()
            })
            .collect();
        self.headers = keep.into_iter().flatten().collect();
    }

    fn ensure_required_columns(&mut self) -> Vec<String> {
        let mut added = Vec::new();
        for column in REQUIRED_COLUMNS {
            if self.column(column).is_none() {
                info!("Added missing column: {}", column);
                self.push_column(column, |_| String::new());
                added.push(column.to_string());
            }
        }
        added
    }

    fn remove_duplicates(&mut self) -> usize {
        let (Some(company), Some(name)) = (self.column("company"), self.column("use_case_name")) else {
            return 0;
        };

        let before = self.rows.len();
        let mut seen = HashSet::new();
        self.rows
            .retain(|row| seen.insert((row[company].clone(), row[name].clone())));

        let removed = before - self.rows.len();
        if removed > 0 {
            info!("Removed {} duplicate entries", removed);
        }
        removed
    }

    fn generate_slugs(&mut self) -> Vec<String> {
        let mut added = Vec::new();
        for (source, slug_column) in [
            ("ai_type", "ai_type_slug"),
            ("business_function", "business_function_slug"),
        ] {
            if self.column(slug_column).is_some() {
                continue;
            }
            if let Some(idx) = self.column(source) {
                self.push_column(slug_column, |row| slugify(&row[idx]));
                added.push(slug_column.to_string());
            }
        }
        added
    }

    fn push_column(&mut self, name: &str, value: impl Fn(&[String]) -> String) {
        for row in &mut self.rows {
            let cell = value(row);
            row.push(cell);
        }
        self.headers.push(name.to_string());
    }
}

fn read_table(input: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(input)
        .map_err(|e| NavigatorError::data_load(format!("failed to open input CSV: {}", e)))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| NavigatorError::data_load(format!("unreadable header row: {}", e)))?
        .iter()
        .map(str::to_string)
        .collect();

    let width = headers.len();
    let mut rows = Vec::new();
    for (row_num, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            NavigatorError::data_load(format!("failed to read row {}: {}", row_num + 1, e))
        })?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(width, String::new());
        rows.push(row);
    }

    Ok(Table { headers, rows })
}

fn write_table(table: &Table, output: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let to_err = |e: csv::Error| NavigatorError::internal(format!("failed to encode CSV: {}", e));

    writer.write_record(&table.headers).map_err(to_err)?;
    for row in &table.rows {
        writer.write_record(row).map_err(to_err)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| NavigatorError::internal(format!("failed to flush CSV: {}", e)))?;
    write_atomic(output, &bytes)?;
    Ok(())
}

/// `<stem>_cleaned_<timestamp>.csv` next to the input
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data".to_string());
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    input.with_file_name(format!("{}_cleaned_{}.csv", stem, timestamp))
}

/// Clean a raw CSV export into the shape the record store expects
pub fn clean_csv(input: &Path, output: Option<&Path>) -> Result<CleanReport> {
    info!("Loading data from {}", input.display());
    if !input.is_file() {
        return Err(NavigatorError::data_load("input CSV not found"));
    }

    let mut table = read_table(input)?;
    let original_rows = table.rows.len();
    let original_columns = table.headers.len();
    info!(
        "Original data: {} rows, {} columns ({})",
        original_rows,
        original_columns,
        table.headers.join(", ")
    );

    table.normalize_headers();
    let mut added_columns = table.ensure_required_columns();
    let duplicates_removed = table.remove_duplicates();
    added_columns.extend(table.generate_slugs());

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(input));
    write_table(&table, &output)?;

    info!(
        "Cleaned data saved to {}: {} rows, {} columns",
        output.display(),
        table.rows.len(),
        table.headers.len()
    );

    Ok(CleanReport {
        output,
        original_rows,
        original_columns,
        final_rows: table.rows.len(),
        final_columns: table.headers.len(),
        duplicates_removed,
        added_columns,
        columns: table.headers,
    })
}
