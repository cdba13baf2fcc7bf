use litequery_config::display::{DisplaySettings, TableStyle};
use litequery_db::{Row, Value};
use nu_ansi_term::Color::{Cyan, Green, LightRed, Yellow};
use tabled::{
    builder::Builder,
    settings::{peaker::PriorityMax, themes::BorderCorrection, Panel, Style, Width},
    Table,
};
use tracing::info;

use crate::{
    error::CliResult,
    utils::{term_width, truncate, Colored},
};

/// Renders one cell. Blobs are summarized by size.
pub fn format_value(value: &Value, settings: &DisplaySettings) -> String {
    match value {
        Value::Null => format!("{}", Colored(LightRed, settings.null_text())),
        Value::Integer(i) => format!("{}", Colored(Cyan, i)),
        Value::Real(f) => format!("{}", Colored(Cyan, f)),
        Value::Text(s) => truncate(s, settings.max_cell_width()),
        Value::Blob(b) => format!("{}", Colored(Yellow, format!("<{} bytes>", b.len()))),
    }
}

fn apply_style(table: &mut Table, style: TableStyle) {
    match style {
        TableStyle::Rounded => {
            table.with(Style::rounded()).with(BorderCorrection {});
        }
        TableStyle::Ascii => {
            table.with(Style::ascii());
        }
        TableStyle::Blank => {
            table.with(Style::blank());
        }
    }
}

/// Builds a table with the columns of the first row as header.
pub fn rows_table(rows: &[Row], settings: &DisplaySettings, title: Option<&str>) -> Option<String> {
    let first = rows.first()?;

    let mut builder = Builder::new();
    builder.push_record(
        first
            .columns()
            .iter()
            .map(|c| format!("{}", Colored(Green, c))),
    );
    for row in rows {
        builder.push_record(row.values().iter().map(|v| format_value(v, settings)));
    }

    let mut table = builder.build();
    if let Some(title) = title {
        table.with(Panel::header(title));
    }
    apply_style(&mut table, settings.table_style());
    table.with(Width::wrap(term_width()).priority(PriorityMax::default()));

    Some(table.to_string())
}

/// Prints rows as a table, or as a JSON array when `json` is set.
pub fn print_rows(rows: &[Row], json: bool, settings: &DisplaySettings) -> CliResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
        return Ok(());
    }

    match rows_table(rows, settings, None) {
        Some(table) => {
            info!("\n{table}");
            info!(
                "{} row{}",
                Colored(Cyan, rows.len()),
                if rows.len() == 1 { "" } else { "s" }
            );
        }
        None => info!("No rows"),
    }
    Ok(())
}
