use chrono::NaiveDate;
use tracing::{debug, info};

use crate::dates::classify;
use crate::error::{Result, VpError};
use crate::models::{
    Cell, Column, DateColumn, DatedColumn, Field, FieldMapping, RawTable, WorkingTable,
};

pub const UNITS_COLUMN: &str = "Unidades";

const LEADING_FIELDS: [Field; 3] = [Field::Regional, Field::Empreendimento, Field::Modulo];
const TRAILING_FIELDS: [Field; 2] = [Field::Tipologia, Field::FonteCurva];

/// What a raw column is used for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnRole {
    Field(Field),
    Units,
    Date(NaiveDate),
    Ignored,
}

/// Role of every raw column, in physical order.
pub fn column_roles(table: &RawTable, mapping: &FieldMapping, unit_column: usize) -> Vec<ColumnRole> {
    table
        .columns()
        .iter()
        .enumerate()
        .map(|(i, col)| {
            if i == unit_column {
                return ColumnRole::Units;
            }
            if let Some((field, _)) = mapping.mapped_columns().find(|(_, c)| *c == col.name) {
                return ColumnRole::Field(field);
            }
            match classify(&col.header) {
                Some(date) => ColumnRole::Date(date),
                None => ColumnRole::Ignored,
            }
        })
        .collect()
}

/// Columns whose header resolves to a date, sorted by date. Ties keep physical order.
pub fn date_columns(table: &RawTable, mapping: &FieldMapping, unit_column: usize) -> Vec<DateColumn> {
    let mut found: Vec<DateColumn> = column_roles(table, mapping, unit_column)
        .into_iter()
        .zip(table.columns())
        .enumerate()
        .filter_map(|(position, (role, col))| match role {
            ColumnRole::Date(date) => Some(DateColumn {
                name: col.name.clone(),
                position,
                date,
            }),
            _ => None,
        })
        .collect();
    found.sort_by_key(|d| d.date);
    found
}

/// Build the working table: descriptive columns in canonical order, then date columns.
///
/// The unit column is taken by position and replaced by a numeric `Unidades` column.
pub fn project(table: &RawTable, mapping: &FieldMapping, unit_column: usize) -> Result<WorkingTable> {
    let missing_group = || VpError::MissingRequiredField(Field::Empreendimento.label().to_string());
    let group_name = mapping.get(Field::Empreendimento).ok_or_else(missing_group)?;
    let group_column = table.column(group_name).ok_or_else(missing_group)?;

    let unit = table
        .columns()
        .get(unit_column)
        .ok_or(VpError::MissingUnitColumn {
            index: unit_column,
            width: table.width(),
        })?;
    let units: Vec<f64> = unit.cells.iter().map(Cell::as_number).collect();
    debug!(column = %unit.name, position = unit_column, "unit column");

    let field_column = |field: Field| {
        mapping.get(field).and_then(|name| table.column(name)).map(|c| Column {
            name: c.name.clone(),
            cells: c.cells.clone(),
        })
    };

    let mut descriptive: Vec<Column> = LEADING_FIELDS.into_iter().filter_map(field_column).collect();
    descriptive.push(Column {
        name: UNITS_COLUMN.to_string(),
        cells: units.iter().map(|u| Cell::Number(*u)).collect(),
    });
    descriptive.extend(TRAILING_FIELDS.into_iter().filter_map(field_column));

    let dates: Vec<DatedColumn> = date_columns(table, mapping, unit_column)
        .into_iter()
        .map(|column| {
            debug!(column = %column.name, date = %column.date, "date column");
            DatedColumn {
                cells: table.columns()[column.position].cells.clone(),
                column,
            }
        })
        .collect();

    info!(
        rows = table.row_count(),
        descriptive = descriptive.len(),
        dates = dates.len(),
        "projected working table"
    );

    Ok(WorkingTable {
        descriptive,
        dates,
        groups: group_column.cells.iter().map(Cell::group_key).collect(),
        vp: vec![None; units.len()],
        units,
    })
}
