use std::io::{self, BufWriter, IsTerminal, Read, Write};
use std::{fs, path::PathBuf};

use ajoq_lang::{Filter, Sort, Value};
use clap::Parser;
use miette::{IntoDiagnostic, WrapErr};

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "ajoq")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(after_help = "# Examples:\n\n\
    ## To select records with a filter:\n\
    ajoq --filter '{\"n\": {\"$gt\": 30}}' records.json\n\n\
    ## To sort newline-delimited records read from stdin:\n\
    cat records.ndjson | ajoq --sort '{\"name\": \"asc\", \"age\": -1}'\n\n\
    ## To show the compiled filter:\n\
    ajoq --explain --filter '{\"tags\": {\"$in\": [\"a\", \"b\"]}}'")]
#[command(
    about = "ajoq filters and sorts JSON records with MongoDB-style query specifications.",
    long_about = None
)]
pub struct Cli {
    /// Filter specification as JSON
    #[arg(short, long, value_name = "JSON")]
    filter: Option<String>,

    /// Sort specification as JSON
    #[arg(short, long, value_name = "JSON")]
    sort: Option<String>,

    /// Print the compiled filter and sort instead of the records
    #[arg(long, default_value_t = false)]
    explain: bool,

    /// Print the output on a single line
    #[arg(short, long, default_value_t = false)]
    compact: bool,

    /// Maximum nesting depth accepted in specifications
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,

    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,

    /// JSON array or newline-delimited JSON files; stdin when omitted
    files: Vec<PathBuf>,
}

impl Cli {
    pub fn run(&self) -> miette::Result<()> {
        self.run_with(Config::from_env())
    }

    pub fn run_with(&self, config: Config) -> miette::Result<()> {
        let options = config.with_max_depth(self.max_depth).options();

        let filter_spec = match &self.filter {
            Some(text) => parse_spec(text).wrap_err("invalid --filter")?,
            None => Value::new_object(),
        };
        let filter = ajoq_lang::create_filter_with_options(&filter_spec, &options)?;

        let sort_spec = self
            .sort
            .as_deref()
            .map(|text| parse_spec(text).wrap_err("invalid --sort"))
            .transpose()?;
        let sort = ajoq_lang::create_sort_with_options(sort_spec.as_ref(), &options)?;

        if self.explain {
            return self.write(&explain(&filter, self.sort.as_ref().map(|_| &sort)));
        }

        let records = self
            .read_contents()?
            .into_iter()
            .map(|(file, content)| {
                parse_records(&content).wrap_err_with(|| match file {
                    Some(file) => format!("failed to read records from {}", file.display()),
                    None => "failed to read records from stdin".to_string(),
                })
            })
            .collect::<miette::Result<Vec<_>>>()?
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();

        let mut selected = filter
            .filter(&records)
            .map_err(ajoq_lang::Error::from)?
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();
        sort.sort(&mut selected);
        tracing::debug!(read = records.len(), selected = selected.len(), "applied filter");

        let output = if self.compact {
            serde_json::to_string(&selected)
        } else {
            serde_json::to_string_pretty(&selected)
        }
        .into_diagnostic()?;

        self.write(&output)
    }

    fn read_contents(&self) -> miette::Result<Vec<(Option<PathBuf>, String)>> {
        if !self.files.is_empty() {
            return self
                .files
                .iter()
                .map(|file| {
                    fs::read_to_string(file)
                        .into_diagnostic()
                        .wrap_err_with(|| format!("failed to open {}", file.display()))
                        .map(|content| (Some(file.clone()), content))
                })
                .collect();
        }

        if io::stdin().is_terminal() {
            return Ok(vec![(None, "".to_string())]);
        }

        let mut input = String::new();
        io::stdin().read_to_string(&mut input).into_diagnostic()?;
        Ok(vec![(None, input)])
    }

    fn write(&self, text: &str) -> miette::Result<()> {
        let mut handle = BufWriter::new(io::stdout().lock());
        writeln!(handle, "{text}").into_diagnostic()?;
        handle.flush().into_diagnostic()
    }
}

fn parse_spec(text: &str) -> miette::Result<Value> {
    let json = serde_json::from_str::<serde_json::Value>(text).into_diagnostic()?;
    Ok(ajoq_lang::from_json(json).map_err(ajoq_lang::Error::from)?)
}

/// Reads a JSON array of records, or one record per non-blank line.
fn parse_records(content: &str) -> miette::Result<Vec<Value>> {
    let trimmed = content.trim_start();

    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') {
        return serde_json::from_str::<Vec<Value>>(trimmed).into_diagnostic();
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str::<Value>(line)
                .into_diagnostic()
                .wrap_err_with(|| format!("invalid record on line {}", i + 1))
        })
        .collect()
}

fn explain(filter: &Filter, sort: Option<&Sort>) -> String {
    match sort {
        Some(sort) => format!("// filter\n{}\n// sort\n{}", filter.source(), sort.source()),
        None => filter.source().to_string(),
    }
}
