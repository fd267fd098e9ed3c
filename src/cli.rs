use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::sheet::ColumnNames;

pub const DEFAULT_SERIAL_COLUMN: &str = "S.No";
pub const DEFAULT_DESCRIPTION_COLUMN: &str = "Description";
pub const DEFAULT_RELEVANCE_COLUMN: &str = "D1";

#[derive(Parser, Debug)]
#[command(
    name = "checklist-filter",
    version,
    about = "Rule-based relevance filter for engineering checklists"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the project, tester and feature choices found in a sheet.
    Options(OptionsArgs),
    /// Classify a sheet and write the points that need manual confirmation.
    Resolve(ResolveArgs),
    /// Classify a sheet, merge confirmations and write the filtered checklist.
    Filter(FilterArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SheetArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub vocabulary_path: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_SERIAL_COLUMN)]
    pub serial_column: String,

    #[arg(long, default_value = DEFAULT_DESCRIPTION_COLUMN)]
    pub description_column: String,

    #[arg(long, default_value = DEFAULT_RELEVANCE_COLUMN)]
    pub relevance_column: String,
}

impl SheetArgs {
    pub fn column_names(&self) -> ColumnNames {
        ColumnNames {
            serial: self.serial_column.clone(),
            description: self.description_column.clone(),
            relevance: self.relevance_column.clone(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct SelectionArgs {
    /// Defaults to the first project tagged in the sheet, or All when none is.
    #[arg(long)]
    pub project: Option<String>,

    /// Defaults to the first tester tagged in the sheet, or All when none is.
    #[arg(long)]
    pub tester: Option<String>,

    /// Feature flag as NAME=true|false; repeatable.
    #[arg(long = "feature")]
    pub features: Vec<String>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct OptionsArgs {
    #[command(flatten)]
    pub sheet: SheetArgs,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub sheet: SheetArgs,

    #[command(flatten)]
    pub selection: SelectionArgs,

    #[arg(long)]
    pub confirmations_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    #[command(flatten)]
    pub sheet: SheetArgs,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Confirmation manifest written by `resolve`.
    #[arg(long)]
    pub confirmations_path: Option<PathBuf>,

    /// Confirm every undecided main point with this serial; repeatable.
    #[arg(long = "confirm")]
    pub confirm_serials: Vec<String>,

    #[arg(long)]
    pub output_path: Option<PathBuf>,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub relevant_first: bool,
}
