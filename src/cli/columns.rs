use std::path::PathBuf;

use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fmt::month_label;
use crate::importer::load_table;
use crate::normalize::normalize_cell;
use crate::projector::{column_roles, ColumnRole};
use crate::schema::map_fields;

use super::{resolve_settings, DecodeArgs};

pub fn run(file: &str, decode: &DecodeArgs) -> Result<()> {
    let file_path = PathBuf::from(file);
    let settings = resolve_settings(decode, &[]);
    let raw = load_table(&file_path, &settings.decode_options())?;
    let mapping = map_fields(&raw.column_names());
    let roles = column_roles(&raw, &mapping, settings.unit_column);

    let mut table = Table::new();
    table.set_header(vec!["#", "Column", "Matched as", "Role", "Period"]);
    for (i, (col, role)) in raw.columns().iter().zip(&roles).enumerate() {
        let (role_name, period) = describe(role);
        table.add_row(vec![
            Cell::new(i),
            Cell::new(&col.name),
            Cell::new(normalize_cell(&col.header).display()),
            Cell::new(role_name),
            Cell::new(period),
        ]);
    }
    println!("{table}");

    let dates = roles.iter().filter(|r| matches!(r, ColumnRole::Date(_))).count();
    println!("{} columns, {} month columns, {} rows", raw.width(), dates, raw.row_count());
    if roles.len() <= settings.unit_column {
        println!("No column at unit position {}.", settings.unit_column);
    }
    Ok(())
}

fn describe(role: &ColumnRole) -> (String, String) {
    match role {
        ColumnRole::Field(field) => (format!("field: {}", field.label()), String::new()),
        ColumnRole::Units => ("units".to_string(), String::new()),
        ColumnRole::Date(date) => ("month".to_string(), format!("{} ({date})", month_label(*date))),
        ColumnRole::Ignored => ("ignored".to_string(), String::new()),
    }
}
