use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::indicators::{group_ratios, vp_by_group, year_indicators};
use crate::models::{DateColumn, Field, GroupRatio, RawTable, WorkingTable, YearIndicators};
use crate::projector::project;
use crate::schema::map_fields;

pub struct ReportOptions {
    pub unit_column: usize,
    pub years: Vec<i32>,
}

/// Everything computed for one Forecast file.
#[derive(Debug, Serialize)]
pub struct ForecastReport {
    pub rows: usize,
    pub date_columns: Vec<DateColumn>,
    pub years: Vec<YearIndicators>,
    pub projects: Vec<GroupRatio>,
    #[serde(skip)]
    pub table: WorkingTable,
}

/// Map fields, project the working table and compute every indicator.
///
/// Fails only when the table cannot be projected (no `Empreendimento`, no unit column);
/// bad cells and unparsable headers degrade to zeros and excluded columns.
pub fn build_report(raw: &RawTable, opts: &ReportOptions) -> Result<ForecastReport> {
    let mapping = map_fields(&raw.column_names());
    for field in Field::ALL {
        match mapping.get(field) {
            Some(column) => debug!(field = field.label(), column, "mapped field"),
            None => debug!(field = field.label(), "field not found"),
        }
    }

    let table = project(raw, &mapping, opts.unit_column)?;
    let vp = vp_by_group(&table);
    let table = table.with_vp(vp);

    let years: Vec<YearIndicators> = opts
        .years
        .iter()
        .map(|&year| year_indicators(&table, year))
        .collect();
    for y in &years {
        info!(year = y.year, vp = ?y.vp, total_units = y.total_units, months = y.months, "year indicators");
    }

    Ok(ForecastReport {
        rows: table.row_count(),
        date_columns: table.date_columns().cloned().collect(),
        projects: group_ratios(&table),
        years,
        table,
    })
}
