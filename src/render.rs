use comfy_table::{presets, CellAlignment, Table};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::prelude::*;
use crate::sort::{ColumnKind, SortColumn};
use crate::units::{format_stake, Token};

pub const HEADERS: [&str; 12] = [
    "Operator",
    "Network",
    "Address",
    "Total Staked POND",
    "Staked POND",
    "Staked MPond",
    "Relayers",
    "Fee (%)",
    "Performance",
    "Tickets",
    "APR MPond (%)",
    "APR POND (%)",
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
    Tsv,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "table" => Ok(Self::Table),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "tsv" => Ok(Self::Tsv),
            "markdown" => Ok(Self::Markdown),
            x => Err(Error::config(format!("unsupported output format {x:?}"))),
        }
    }
}

/// Visible cells of a record, in [`HEADERS`] order. The composite stake only
/// shows up formatted as the total column.
pub fn row(record: &OperatorRecord) -> Vec<String> {
    vec![
        record.operator_name.clone(),
        record.network.to_string(),
        record.address.clone(),
        format_stake(record.total_staked_pond_equivalent, Token::Pond),
        format_stake(record.staked_pond, Token::Pond),
        format_stake(record.staked_mpond, Token::MPond),
        record.relayers.to_string(),
        record.commission.to_string(),
        record.latency_score.to_string(),
        record.tickets.to_string(),
        record.apr_mpond.to_string(),
        record.apr_pond.to_string(),
    ]
}

fn grid(headers: &[&str], rows: &[Vec<String>], preset: &str) -> String {
    let mut table = Table::new();
    table.load_preset(preset).set_header(headers.to_vec());

    for row in rows {
        table.add_row(row.clone());
    }

    for column in SortColumn::ALL.iter().take(headers.len()) {
        if column.kind() == ColumnKind::Text {
            continue;
        }

        if let Some(x) = table.column_mut(column.index()) {
            x.set_cell_alignment(CellAlignment::Right);
        }
    }

    table.to_string()
}

/// Pipes inside a markdown cell would split it in two.
fn escape_pipes(rows: &[Vec<String>]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|x| x.replace('|', "\\|")).collect())
        .collect()
}

fn delimited(headers: &[&str], rows: &[Vec<String>], delimiter: u8) -> Result<String, Error> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(vec![]);

    writer.write_record(headers).map_err(std::io::Error::from)?;

    for row in rows {
        writer.write_record(row).map_err(std::io::Error::from)?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;

    String::from_utf8(bytes).map_err(Error::parse)
}

fn json(headers: &[&str], rows: &[Vec<String>]) -> Result<String, Error> {
    let objects: Vec<Map<String, Value>> = rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .zip(row)
                .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
                .collect()
        })
        .collect();

    serde_json::to_string_pretty(&objects).map_err(Error::parse)
}

/// Renders already stringified rows under the given headers.
pub fn render_rows(
    headers: &[&str],
    rows: &[Vec<String>],
    format: OutputFormat,
) -> Result<String, Error> {
    match format {
        OutputFormat::Table => Ok(grid(headers, rows, presets::ASCII_FULL)),
        OutputFormat::Markdown => Ok(grid(
            headers,
            &escape_pipes(rows),
            presets::ASCII_MARKDOWN,
        )),
        OutputFormat::Csv => delimited(headers, rows, b','),
        OutputFormat::Tsv => delimited(headers, rows, b'\t'),
        OutputFormat::Json => json(headers, rows),
    }
}

pub fn render(records: &[OperatorRecord], format: OutputFormat) -> Result<String, Error> {
    let rows: Vec<_> = records.iter().map(row).collect();
    render_rows(&HEADERS, &rows, format)
}

/// Same as [`render`] for a format given by name.
pub fn render_named(records: &[OperatorRecord], format: &str) -> Result<String, Error> {
    render(records, format.parse()?)
}
