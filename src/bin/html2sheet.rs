//! html2sheet CLI - convert financial-filing HTML tables into formatted xlsx sheets

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use html2sheet::batch;
use html2sheet::batch::BatchConfig;
use html2sheet::html::find_tables;
use html2sheet::spreadsheet::xlsx::read_cells;
use html2sheet::spreadsheet::DEFAULT_WIDTH_CAP;
use html2sheet::ExtractOptions;
use html2sheet::RenderOptions;
use html2sheet::TableModel;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "html2sheet")]
#[command(version)]
#[command(about = "Convert semi-structured HTML tables from financial filings into formatted xlsx sheets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one table of an HTML file into an xlsx workbook
    Convert {
        /// HTML file holding the table
        input: PathBuf,

        /// Workbook to write
        #[arg(short, long)]
        output: PathBuf,

        /// Which table of the page to convert (0-based)
        #[arg(short, long, default_value_t = 0)]
        table: usize,

        #[command(flatten)]
        extract: ExtractArgs,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Print the table model of one table as JSON
    Parse {
        /// HTML file holding the table
        input: PathBuf,

        /// Which table of the page to parse (0-based)
        #[arg(short, long, default_value_t = 0)]
        table: usize,

        /// Pretty print the JSON
        #[arg(short, long)]
        pretty: bool,

        #[command(flatten)]
        extract: ExtractArgs,
    },

    /// Render a table model JSON file into an xlsx workbook
    Render {
        /// Table model JSON, as printed by `parse`
        input: PathBuf,

        /// Workbook to write
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Split a page into one `table{i}.html` file per table
    Tables {
        /// HTML page
        input: PathBuf,

        /// Directory receiving the table files
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Split and convert every page named by a JSON batch config
    Batch {
        /// Batch configuration file
        config: PathBuf,
    },

    /// Print the cells of an xlsx workbook, tab separated
    Inspect {
        /// Workbook to read
        input: PathBuf,
    },
}

#[derive(Args)]
struct ExtractArgs {
    /// Origin joined onto links starting with `/`
    #[arg(long)]
    base_url: Option<String>,
}

impl ExtractArgs {
    fn options(&self) -> Result<ExtractOptions> {
        match &self.base_url {
            Some(base_url) => ExtractOptions::with_base_url(base_url).with_context(|| format!("Invalid base url '{}'", base_url)),
            None => Ok(ExtractOptions::default()),
        }
    }
}

#[derive(Args)]
struct RenderArgs {
    /// URL to attach to the top-left cell
    #[arg(short, long)]
    link: Option<String>,

    /// Alternate gray and white row fills
    #[arg(short, long)]
    alternate: bool,

    /// Maximum column width, in characters
    #[arg(short, long, default_value_t = DEFAULT_WIDTH_CAP)]
    width_cap: usize,
}

impl RenderArgs {
    fn options(&self) -> RenderOptions {
        RenderOptions {
            corner_hyperlink: self.link.clone(),
            alternating_shading: self.alternate,
            width_cap: self.width_cap,
            ..RenderOptions::default()
        }
    }
}

fn main() -> Result<()> {
    init_tracing("info");
    let cli = Cli::parse();
    match cli.command {
        Commands::Convert { input, output, table, extract, render } => {
            let html = select_table(&input, table)?;
            let model = html2sheet::parse_with(&html, &extract.options()?).with_context(|| input.display().to_string())?;
            html2sheet::render(&model, &render.options())
                .write_xlsx(&output)
                .with_context(|| format!("Cannot write '{}'", output.display()))?;
            info!("Wrote {} rows x {} columns to '{}'", model.row_count, model.column_count, output.display());
        }
        Commands::Parse { input, table, pretty, extract } => {
            let html = select_table(&input, table)?;
            let model = html2sheet::parse_with(&html, &extract.options()?).with_context(|| input.display().to_string())?;
            println!("{}", model.to_json(pretty)?);
        }
        Commands::Render { input, output, render } => {
            let json = fs::read_to_string(&input).with_context(|| format!("Cannot read '{}'", input.display()))?;
            let model = TableModel::from_json(&json).with_context(|| input.display().to_string())?;
            html2sheet::render(&model, &render.options())
                .write_xlsx(&output)
                .with_context(|| format!("Cannot write '{}'", output.display()))?;
        }
        Commands::Tables { input, output } => {
            let html = batch::read_html(&input)?;
            let paths = batch::split_tables(&html, &output)?;
            info!("Wrote {} table(s) to '{}'", paths.len(), output.display());
        }
        Commands::Batch { config } => {
            let config = BatchConfig::load(&config)?;
            let report = batch::run(&config)?;
            if report.pages_failed > 0 {
                bail!("{} input file(s) could not be read", report.pages_failed);
            }
            if report.failed > 0 {
                bail!("{} of {} table(s) failed to convert", report.failed, report.tables_found);
            }
        }
        Commands::Inspect { input } => {
            let bytes = fs::read(&input).with_context(|| format!("Cannot read '{}'", input.display()))?;
            for row in read_cells(&bytes).with_context(|| input.display().to_string())? {
                println!("{}", row.join("\t"));
            }
        }
    }
    Ok(())
}

/// Reads a page and returns the outer HTML of its `index`-th table.
fn select_table(path: &Path, index: usize) -> Result<String> {
    let html = batch::read_html(path)?;
    let mut tables = find_tables(&html);
    if tables.is_empty() {
        // Let the parser report the missing table.
        return Ok(html);
    }
    if index >= tables.len() {
        bail!("'{}' has {} table(s), no table {}", path.display(), tables.len(), index);
    }
    Ok(tables.swap_remove(index))
}

fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_writer(std::io::stderr).with_env_filter(filter).init();
}
