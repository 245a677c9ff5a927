//! Batch configuration, accepted in several JSON shapes and normalized into
//! one list of [`Source`]s.

use crate::html::ExtractOptions;
use crate::spreadsheet::RenderOptions;
use crate::spreadsheet::DEFAULT_WIDTH_CAP;
use anyhow::Context;
use anyhow::Result;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Output directory of the single-input shape when none is given.
const DEFAULT_OUTPUT_DIR: &str = "tables/output";

/// Parent of the derived directories of the input-list shape when none is given.
const DEFAULT_OUTPUT_BASE_DIR: &str = "tables";

/// Longest directory name derived from an input.
const MAX_DIR_NAME: usize = 50;

static UNSAFE_DIR_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\-]+").expect("Hardcode regex pattern"));

/// One page (or glob of pages) to split and convert.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub name: Option<String>,
    /// File path or glob pattern
    pub input: String,
    /// Receives `table{i}.html`; workbooks go to the sibling `<output_dir>_excel`
    pub output_dir: PathBuf,
}

/// Settings applied to every conversion of a batch.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DefaultSettings {
    pub alternate_colors: bool,
    /// Attached to the top-left cell of every workbook
    pub hyperlink: Option<String>,
    pub width_cap: usize,
    /// Origin for root-relative links; the extractor default when absent
    pub base_url: Option<String>,
}

impl Default for DefaultSettings {
    fn default() -> Self {
        Self {
            alternate_colors: true,
            hyperlink: None,
            width_cap: DEFAULT_WIDTH_CAP,
            base_url: None,
        }
    }
}

impl DefaultSettings {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            corner_hyperlink: self.hyperlink.clone(),
            alternating_shading: self.alternate_colors,
            width_cap: self.width_cap,
            ..RenderOptions::default()
        }
    }

    pub fn extract_options(&self) -> Result<ExtractOptions, url::ParseError> {
        match &self.base_url {
            Some(base_url) => ExtractOptions::with_base_url(base_url),
            None => Ok(ExtractOptions::default()),
        }
    }
}

/// Every key any accepted shape uses.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    #[serde(alias = "urls")]
    inputs: Option<Vec<String>>,
    output_base_dir: Option<PathBuf>,
    sources: Option<Vec<Source>>,
    #[serde(alias = "input_url")]
    input: Option<String>,
    output_dir: Option<PathBuf>,
    default_settings: DefaultSettings,
}

/// Normalized batch configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchConfig {
    pub sources: Vec<Source>,
    pub defaults: DefaultSettings,
}

impl BatchConfig {
    /// Parses and normalizes a configuration document.
    ///
    /// Shapes are tried in order: an `inputs` list (each input gets a directory
    /// under `output_base_dir` named after it), a `sources` array, a single
    /// `input`. A document matching none of them has no sources.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw = serde_json::from_str::<RawConfig>(json)?;
        let sources = if let Some(inputs) = raw.inputs {
            let base_dir = raw.output_base_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_BASE_DIR));
            inputs
                .into_iter()
                .enumerate()
                .map(|(index, input)| Source {
                    name: Some(format!("Source {}", index + 1)),
                    output_dir: base_dir.join(dir_name_for(&input)),
                    input,
                })
                .collect()
        } else if let Some(sources) = raw.sources {
            sources
        } else if let Some(input) = raw.input {
            vec![Source {
                name: Some("Single Source".to_owned()),
                input,
                output_dir: raw.output_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            }]
        } else {
            Vec::new()
        };
        Ok(Self {
            sources,
            defaults: raw.default_settings,
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).with_context(|| format!("Cannot read config '{}'", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Invalid config '{}'", path.display()))
    }
}

/// Derives a file-system safe directory name from an input path or URL.
pub fn dir_name_for(input: &str) -> String {
    let trimmed = input
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(input)
        .trim_start_matches("www.");
    let trimmed = trimmed.split(['?', '#']).next().unwrap_or_default();
    let name = UNSAFE_DIR_CHARS.replace_all(trimmed, "_");
    let name = name.trim_matches('_').chars().take(MAX_DIR_NAME).collect::<String>();
    if name.is_empty() {
        "unknown".to_owned()
    } else {
        name
    }
}
