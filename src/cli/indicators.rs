use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::error::Result;
use crate::fmt::{month_label, percent, units};
use crate::importer::load_table;
use crate::reports::{build_report, ForecastReport, ReportOptions};

use super::{resolve_settings, DecodeArgs};

pub struct View {
    pub projects: bool,
    pub full: bool,
    pub json: bool,
}

pub fn run(file: &str, decode: &DecodeArgs, years: &[i32], view: View) -> Result<()> {
    let file_path = PathBuf::from(file);
    let settings = resolve_settings(decode, years);

    let raw = load_table(&file_path, &settings.decode_options())?;
    let report = build_report(
        &raw,
        &ReportOptions {
            unit_column: settings.unit_column,
            years: settings.target_years.clone(),
        },
    )?;

    if view.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{}\n{}",
        "VP & UP Indicators".bold(),
        years_table(&report)
    );
    if report.date_columns.is_empty() {
        println!("No month columns were recognised.");
    }
    if view.projects {
        println!("\n{}\n{}", "VP by project".bold(), projects_table(&report));
    }
    if view.full {
        println!("\n{}\n{}", "Working table".bold(), working_table(&report));
    }
    Ok(())
}

fn ratio_cell(ratio: Option<f64>) -> Cell {
    let cell = match ratio {
        Some(_) => Cell::new(percent(ratio)),
        None => Cell::new(percent(None).dimmed()),
    };
    cell.set_alignment(CellAlignment::Right)
}

fn number_cell(val: f64) -> Cell {
    Cell::new(units(val)).set_alignment(CellAlignment::Right)
}

fn years_table(report: &ForecastReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Year", "VP", "Units", "Months"]);
    for y in &report.years {
        table.add_row(vec![
            Cell::new(y.year),
            ratio_cell(y.vp),
            number_cell(y.total_units),
            Cell::new(y.months).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

fn projects_table(report: &ForecastReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Empreendimento", "Rows", "Unidades", "Months with UP", "UP", "VP"]);
    for p in &report.projects {
        table.add_row(vec![
            Cell::new(&p.empreendimento),
            Cell::new(p.rows).set_alignment(CellAlignment::Right),
            number_cell(p.unidades_total),
            Cell::new(p.meses_com_up).set_alignment(CellAlignment::Right),
            number_cell(p.soma_up),
            ratio_cell(p.vp),
        ]);
    }
    table
}

fn working_table(report: &ForecastReport) -> Table {
    let t = &report.table;
    let mut header: Vec<String> = t.descriptive.iter().map(|c| c.name.clone()).collect();
    header.extend(t.date_columns().map(|d| month_label(d.date)));
    header.push("VP".to_string());

    let mut table = Table::new();
    table.set_header(header);
    for row in 0..t.row_count() {
        let mut cells: Vec<Cell> = t
            .descriptive
            .iter()
            .map(|c| Cell::new(c.cells[row].display()))
            .collect();
        cells.extend(
            t.dates
                .iter()
                .map(|d| Cell::new(d.cells[row].display()).set_alignment(CellAlignment::Right)),
        );
        cells.push(ratio_cell(t.vp[row]));
        table.add_row(cells);
    }
    table
}
