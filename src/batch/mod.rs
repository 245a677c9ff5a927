//! # Batch Conversion
//!
//! Splits whole pages into their tables and converts each table into a
//! workbook, driven by a [`BatchConfig`]. For a source with output directory
//! `out`, every table of the page is written to `out/table{i}.html` and its
//! workbook to `out_excel/table{i}.xlsx`. A source whose input matches several
//! files gets one subdirectory per file, named after the file stem.
//!
//! A table that fails to convert is logged and counted; the batch carries on.

pub mod config;

use crate::error::ResultMessage;
use crate::error::TableSheetError;
use crate::html::find_tables;
use crate::html::ExtractOptions;
use crate::spreadsheet::RenderOptions;
use anyhow::Context;
use anyhow::Result;
use encoding_rs::Encoding;
use encoding_rs::WINDOWS_1252;
use std::borrow::Cow;
use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tracing::error;
use tracing::info;
use tracing::warn;

pub use config::BatchConfig;
pub use config::DefaultSettings;
pub use config::Source;

/// Suffix of the directory receiving the workbooks.
const EXCEL_DIR_SUFFIX: &str = "_excel";

/// Counts for one batch run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub tables_found: usize,
    pub converted: usize,
    pub failed: usize,
    /// Input files that could not be read
    pub pages_failed: usize,
}

/// Runs every source of the configuration.
///
/// # Errors
///
/// Fails on an invalid base URL or input pattern, or when an output directory
/// cannot be written. Per-table conversion failures are only counted.
pub fn run(config: &BatchConfig) -> Result<BatchReport> {
    let extract = config.defaults.extract_options().context("Invalid base_url in default_settings")?;
    let options = config.defaults.render_options();
    let mut report = BatchReport::default();

    for source in &config.sources {
        let name = source.name.as_deref().unwrap_or(&source.input);
        let files = expand_input(&source.input).with_context(|| format!("Invalid input for source '{}'", name))?;
        if files.is_empty() {
            warn!("Source '{}': no files match '{}'", name, source.input);
            continue;
        }
        info!("Source '{}': {} file(s)", name, files.len());

        for file in &files {
            let output_dir = match (files.len(), file.file_stem()) {
                (1, _) | (_, None) => source.output_dir.clone(),
                (_, Some(stem)) => source.output_dir.join(stem),
            };
            let html = match read_html(file) {
                Ok(html) => html,
                Err(error) => {
                    error!("{}", error);
                    report.pages_failed += 1;
                    continue;
                }
            };
            let file_report = convert_page(&html, &output_dir, &extract, &options)
                .with_context(|| format!("Cannot write tables of '{}'", file.display()))?;
            report.tables_found += file_report.tables_found;
            report.converted += file_report.converted;
            report.failed += file_report.failed;
        }
    }

    info!(
        "Batch finished: {} table(s) found, {} converted, {} failed, {} unreadable file(s)",
        report.tables_found, report.converted, report.failed, report.pages_failed
    );
    Ok(report)
}

/// Splits one page into `output_dir` and converts every table next to it.
pub fn convert_page(html: &str, output_dir: &Path, extract: &ExtractOptions, options: &RenderOptions) -> Result<BatchReport> {
    let tables = split_tables(html, output_dir)?;
    let mut report = BatchReport {
        tables_found: tables.len(),
        ..BatchReport::default()
    };
    if tables.is_empty() {
        warn!("No tables found for '{}'", output_dir.display());
        return Ok(report);
    }

    let excel_dir = excel_dir_for(output_dir);
    fs::create_dir_all(&excel_dir).with_context(|| format!("Cannot create '{}'", excel_dir.display()))?;
    for (index, table_path) in tables.iter().enumerate() {
        let target = excel_dir.join(format!("table{index}.xlsx"));
        match convert_file(table_path, &target, extract, options) {
            Ok(()) => report.converted += 1,
            Err(error) => {
                error!("{}", error);
                report.failed += 1;
            }
        }
    }
    info!(
        "Converted {}/{} table(s) into '{}'",
        report.converted,
        report.tables_found,
        excel_dir.display()
    );
    Ok(report)
}

/// Writes every top-level table of `html` to `output_dir/table{i}.html`.
pub fn split_tables(html: &str, output_dir: &Path) -> Result<Vec<PathBuf>, TableSheetError> {
    let tables = find_tables(html);
    if tables.is_empty() {
        return Ok(Vec::new());
    }
    fs::create_dir_all(output_dir)?;
    let mut paths = Vec::with_capacity(tables.len());
    for (index, table) in tables.iter().enumerate() {
        let path = output_dir.join(format!("table{index}.html"));
        fs::write(&path, table)?;
        paths.push(path);
    }
    Ok(paths)
}

/// Converts one table file into one workbook.
pub fn convert_file(input: &Path, output: &Path, extract: &ExtractOptions, options: &RenderOptions) -> Result<(), TableSheetError> {
    let html = read_html(input)?;
    let model = crate::parse_with(&html, extract).with_prefix(&input.display().to_string())?;
    crate::render(&model, options)
        .write_xlsx(output)
        .with_prefix(&output.display().to_string())
}

/// Reads an HTML file, decoding it per [`decode_html`].
pub fn read_html(path: &Path) -> Result<String, TableSheetError> {
    let bytes = fs::read(path).map_err(TableSheetError::from).with_prefix(&path.display().to_string())?;
    Ok(decode_html(&bytes).into_owned())
}

/// Decodes page bytes: a byte order mark wins, then UTF-8, then windows-1252.
pub fn decode_html(bytes: &[u8]) -> Cow<'_, str> {
    if let Some((encoding, bom_length)) = Encoding::for_bom(bytes) {
        return encoding.decode_without_bom_handling(&bytes[bom_length..]).0;
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => WINDOWS_1252.decode_without_bom_handling(bytes).0,
    }
}

/// Expands a path or glob pattern into the matching non-directory paths, in sorted order.
pub fn expand_input(pattern: &str) -> Result<Vec<PathBuf>, TableSheetError> {
    let mut files = Vec::new();
    for entry in glob::glob(pattern)? {
        let path = entry?;
        if !path.is_dir() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// `out/tables` -> `out/tables_excel`.
pub fn excel_dir_for(output_dir: &Path) -> PathBuf {
    let normalized = output_dir.components().collect::<PathBuf>();
    let mut name = OsString::from(normalized.as_os_str());
    name.push(EXCEL_DIR_SUFFIX);
    PathBuf::from(name)
}
