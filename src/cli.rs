//! Command-line surface. Without a subcommand the binary launches the
//! terminal UI; the subcommands run the same store operations headlessly.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::models::{Field, SearchField, SortOrder};
use crate::store::{Document, OpenOutcome, SaveOutcome};
use crate::ui::{run_app, App};
use crate::view::ViewState;

#[derive(Parser, Debug)]
#[command(name = "jornadas", version, about = "Manage jornada records stored as JSON")]
pub struct Cli {
    /// JSON file to open on start-up
    pub file: Option<PathBuf>,

    /// Alternative config file (defaults to ~/.jornada-manager/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Rows per page, overriding the config
    #[arg(long, global = true)]
    pub page_size: Option<usize>,

    #[command(subcommand)]
    pub cmd: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Validate a JSON file and print how many records it holds
    Check { file: PathBuf },
    /// Convert a JSON file into CSV
    ExportCsv {
        file: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Convert a CSV file into a JSON records file
    ImportCsv {
        csv: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print one page of records, optionally filtered and sorted
    List {
        file: PathBuf,
        /// Field to search in (a file key such as `ubicacion`, or `all`)
        #[arg(long, default_value = "all")]
        search_field: SearchField,
        /// Case-insensitive substring to look for
        #[arg(long, default_value = "")]
        term: String,
        /// Field to sort by (defaults to the config)
        #[arg(long)]
        sort: Option<Field>,
        /// Sort ascending instead of the configured order
        #[arg(long)]
        asc: bool,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
}

impl Cli {
    /// Whether this invocation takes over the terminal.
    pub fn is_interactive(&self) -> bool {
        self.cmd.is_none()
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?.with_page_size(cli.page_size)?;

    match cli.cmd {
        None => {
            let mut document = Document::new();
            let mut startup_error = None;
            if let Some(path) = cli.file.as_deref() {
                if let OpenOutcome::Failed(err) = document.open(Some(path)) {
                    startup_error = Some(format!("Could not open {}: {err}", path.display()));
                }
            }
            let mut app = App::new(document, config);
            if let Some(message) = startup_error {
                app.report_error(message);
            }
            run_app(&mut app)
        }
        Some(Cmd::Check { file }) => {
            let document = open_document(&file)?;
            println!(
                "{}: {} records",
                file.display(),
                document.store().len()
            );
            Ok(())
        }
        Some(Cmd::ExportCsv { file, out }) => {
            let document = open_document(&file)?;
            let written = expect_written(document.export_csv(Some(&out)))?;
            println!(
                "Exported {} records to {}",
                document.store().len(),
                written.display()
            );
            Ok(())
        }
        Some(Cmd::ImportCsv { csv, out }) => {
            let mut document = Document::new();
            expect_loaded(document.import_csv(Some(&csv)))?;
            let written = expect_written(document.save_as(Some(&out)))?;
            println!(
                "Imported {} records into {}",
                document.store().len(),
                written.display()
            );
            Ok(())
        }
        Some(Cmd::List {
            file,
            search_field,
            term,
            sort,
            asc,
            page,
        }) => {
            let document = open_document(&file)?;
            let order = if asc { SortOrder::Asc } else { config.sort_order };
            let state = ViewState::new(sort.unwrap_or(config.sort_field), order)
                .apply_filter(search_field, &term);
            let state = ViewState { page, ..state };
            let page = state.project(document.store(), config.page_size);

            let header: Vec<&str> = Field::ALL.into_iter().map(Field::label).collect();
            println!("{}", header.join("\t"));
            for record in &page.items {
                let row: Vec<&str> = Field::ALL.into_iter().map(|f| record.get(f)).collect();
                println!("{}", row.join("\t"));
            }
            println!(
                "-- page {} of {} ({} records)",
                page.number, page.total_pages, page.total_records
            );
            Ok(())
        }
    }
}

fn open_document(path: &Path) -> Result<Document> {
    let mut document = Document::new();
    expect_loaded(document.open(Some(path)))?;
    Ok(document)
}

fn expect_loaded(outcome: OpenOutcome) -> Result<usize> {
    match outcome {
        OpenOutcome::Loaded { records, .. } => Ok(records),
        OpenOutcome::Cancelled => bail!("operation cancelled"),
        OpenOutcome::Failed(err) => Err(anyhow!(err)),
    }
}

fn expect_written(outcome: SaveOutcome) -> Result<PathBuf> {
    match outcome {
        SaveOutcome::Written(path) => Ok(path),
        SaveOutcome::Cancelled => bail!("operation cancelled"),
        SaveOutcome::Failed(err) => Err(anyhow!(err)),
    }
}
