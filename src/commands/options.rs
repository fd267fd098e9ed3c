use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::{OptionsArgs, OutputFormat};
use crate::commands::checklist::load_checklist;
use crate::relevance::SelectionOptions;

pub fn run(args: OptionsArgs) -> Result<()> {
    let checklist = load_checklist(&args.sheet)?;
    let options = checklist.rules.selection_options(&checklist.annotated);

    info!(
        projects = options.projects.len(),
        testers = options.testers.len(),
        "selection options collected"
    );

    match args.format {
        OutputFormat::Json => write_json_options(&options),
        OutputFormat::Text => write_text_options(&options),
    }
}

fn write_json_options(options: &SelectionOptions) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, options)
        .context("failed to serialize options json output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

fn write_text_options(options: &SelectionOptions) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    writeln!(output, "Projects: {}", options.projects.join(", "))?;
    writeln!(output, "Testers: {}", options.testers.join(", "))?;
    if options.features.is_empty() {
        writeln!(output, "Features: (none)")?;
    } else {
        writeln!(output, "Features: {}", options.features.join(", "))?;
    }
    output.flush()?;
    Ok(())
}
