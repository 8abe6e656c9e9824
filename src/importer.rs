use std::path::Path;

use tracing::{debug, info};

use crate::error::{Result, VpError};
use crate::models::{Cell, RawTable};

/// Where and how to find the Forecast table inside a file.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    pub sheet: String,
    /// Zero-based row holding the column headers; rows above it are skipped.
    pub header_row: usize,
    pub delimiter: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceKind {
    Workbook,
    Csv,
}

impl SourceKind {
    pub fn detect(file_path: &Path) -> Result<Self> {
        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(Self::Workbook),
            "csv" | "txt" => Ok(Self::Csv),
            "" => Err(VpError::UnsupportedFormat("(no extension)".to_string())),
            other => Err(VpError::UnsupportedFormat(format!(".{other}"))),
        }
    }
}

/// Decode a Forecast file into a raw table.
pub fn load_table(file_path: &Path, opts: &DecodeOptions) -> Result<RawTable> {
    let kind = SourceKind::detect(file_path)?;
    let grid = match kind {
        SourceKind::Workbook => read_workbook_grid(file_path, &opts.sheet)?,
        SourceKind::Csv => read_csv_grid(file_path, opts.delimiter)?,
    };
    let table = table_from_grid(grid, opts.header_row)?;
    info!(
        file = %file_path.display(),
        ?kind,
        rows = table.row_count(),
        columns = table.width(),
        "decoded table"
    );
    Ok(table)
}

/// Split a cell grid at the header row: the header row names the columns,
/// everything below it is data.
pub fn table_from_grid(grid: Vec<Vec<Cell>>, header_row: usize) -> Result<RawTable> {
    if header_row >= grid.len() {
        return Err(VpError::HeaderRowOutOfRange {
            row: header_row,
            rows: grid.len(),
        });
    }
    let mut rows = grid.into_iter().skip(header_row);
    let header = rows.next().unwrap_or_default();
    Ok(RawTable::from_rows(header, rows.collect()))
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn read_csv_grid(file_path: &Path, delimiter: u8) -> Result<Vec<Vec<Cell>>> {
    let file = std::fs::File::open(file_path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(std::io::BufReader::new(file));
    let mut grid = Vec::new();
    for result in rdr.byte_records() {
        let record = result?;
        let row: Vec<Cell> = record.iter().map(decode_field).map(csv_cell).collect();
        grid.push(row);
    }
    if let Some(Cell::Text(s)) = grid.first_mut().and_then(|r| r.first_mut()) {
        if s.starts_with('\u{feff}') {
            s.remove(0);
        }
    }
    debug!(rows = grid.len(), "read csv");
    Ok(grid)
}

/// UTF-8 when valid, otherwise Latin-1 (spreadsheet exports on Windows).
fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn csv_cell(field: String) -> Cell {
    if field.is_empty() {
        Cell::Empty
    } else {
        Cell::text(field)
    }
}

// ---------------------------------------------------------------------------
// Workbooks (feature-gated)
// ---------------------------------------------------------------------------

#[cfg(feature = "excel")]
fn read_workbook_grid(file_path: &Path, sheet: &str) -> Result<Vec<Vec<Cell>>> {
    use calamine::Reader;

    let mut workbook = calamine::open_workbook_auto(file_path)?;
    let names = workbook.sheet_names();
    if !names.iter().any(|n| n == sheet) {
        return Err(VpError::SheetNotFound {
            sheet: sheet.to_string(),
            available: names.join(", "),
        });
    }
    let range = workbook.worksheet_range(sheet)?;

    // Keep absolute positions: the header offset and the unit column index count
    // from A1 even when the used range starts further in.
    let (first_row, first_col) = range.start().unwrap_or((0, 0));
    let mut grid: Vec<Vec<Cell>> = vec![Vec::new(); first_row as usize];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; first_col as usize];
        cells.extend(row.iter().map(workbook_cell));
        grid.push(cells);
    }
    debug!(sheet, rows = grid.len(), "read worksheet");
    Ok(grid)
}

#[cfg(not(feature = "excel"))]
fn read_workbook_grid(file_path: &Path, _sheet: &str) -> Result<Vec<Vec<Cell>>> {
    let ext = file_path
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();
    Err(VpError::UnsupportedFormat(format!(
        ".{ext} (built without workbook support)"
    )))
}

#[cfg(feature = "excel")]
fn workbook_cell(data: &calamine::Data) -> Cell {
    use calamine::Data;
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) if dt.is_duration() => Cell::Number(dt.as_f64()),
        Data::DateTime(dt) => crate::dates::serial_to_date(dt.as_f64())
            .map(Cell::Date)
            .unwrap_or(Cell::Empty),
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|d| chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map(Cell::Date)
            .unwrap_or_else(|| Cell::Text(s.clone())),
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(e.to_string()),
    }
}
