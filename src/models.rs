use chrono::NaiveDate;
use serde::Serialize;

/// A single spreadsheet value as handed over by a decoder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    Date(NaiveDate),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Numeric coercion used for unit counts and month values.
    /// Anything that is not a finite number becomes 0.
    pub fn as_number(&self) -> f64 {
        let n = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Empty | Self::Date(_) => 0.0,
        };
        if n.is_finite() {
            n
        } else {
            0.0
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Key used to partition rows into groups. Blank cells belong to no group.
    pub fn group_key(&self) -> Option<GroupKey> {
        match self {
            Self::Empty => None,
            Self::Text(s) if s.is_empty() => None,
            Self::Number(n) if n.is_nan() => None,
            // -0.0 and 0.0 are the same project
            Self::Number(n) => Some(GroupKey::Number((n + 0.0).to_bits())),
            Self::Text(s) => Some(GroupKey::Text(s.clone())),
            Self::Bool(b) => Some(GroupKey::Bool(*b)),
            Self::Date(d) => Some(GroupKey::Date(*d)),
        }
    }

    /// Text rendering used for header names and table output.
    pub fn display(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
            Self::Bool(true) => "True".to_string(),
            Self::Bool(false) => "False".to_string(),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Typed `Empreendimento` value. A number and the text spelling it are different groups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    /// `f64` bit pattern
    Number(u64),
    Text(String),
    Bool(bool),
    Date(NaiveDate),
}

impl GroupKey {
    pub fn label(&self) -> String {
        match self {
            Self::Number(bits) => Cell::Number(f64::from_bits(*bits)).display(),
            Self::Text(s) => s.clone(),
            Self::Bool(b) => Cell::Bool(*b).display(),
            Self::Date(d) => Cell::Date(*d).display(),
        }
    }
}

/// A decoded column: its text name, the original header value and its cells.
#[derive(Debug, Clone)]
pub struct RawColumn {
    pub name: String,
    pub header: Cell,
    pub cells: Vec<Cell>,
}

/// Decoded sheet contents. Columns are in physical order and all have the same length.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    columns: Vec<RawColumn>,
    rows: usize,
}

impl RawTable {
    /// Build a table from a header row and data rows.
    ///
    /// Ragged rows are padded with empty cells. Header names are coerced to text:
    /// blank headers become `Unnamed: <i>` and repeated names get `.1`, `.2`, ... suffixes.
    pub fn from_rows(header: Vec<Cell>, rows: Vec<Vec<Cell>>) -> Self {
        let width = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(header.len()))
            .max()
            .unwrap_or(0);

        let mut names: Vec<String> = Vec::with_capacity(width);
        let mut columns: Vec<RawColumn> = Vec::with_capacity(width);
        for i in 0..width {
            let header_cell = header.get(i).cloned().unwrap_or(Cell::Empty);
            let base = if header_cell.is_blank() {
                format!("Unnamed: {i}")
            } else {
                header_cell.display()
            };
            let name = dedupe_name(&names, base);
            names.push(name.clone());
            columns.push(RawColumn {
                name,
                header: header_cell,
                cells: Vec::with_capacity(rows.len()),
            });
        }

        for row in &rows {
            for (i, col) in columns.iter_mut().enumerate() {
                col.cells.push(row.get(i).cloned().unwrap_or(Cell::Empty));
            }
        }

        Self {
            columns,
            rows: rows.len(),
        }
    }

    pub fn columns(&self) -> &[RawColumn] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&RawColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }
}

fn dedupe_name(existing: &[String], base: String) -> String {
    if !existing.contains(&base) {
        return base;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{base}.{n}");
        if !existing.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

// ---------------------------------------------------------------------------
// Field vocabulary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Field {
    Regional,
    Empreendimento,
    Modulo,
    Unidades,
    Tipologia,
    FonteCurva,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Regional,
        Field::Empreendimento,
        Field::Modulo,
        Field::Unidades,
        Field::Tipologia,
        Field::FonteCurva,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Regional => "Regional",
            Self::Empreendimento => "Empreendimento",
            Self::Modulo => "Módulo",
            Self::Unidades => "Unidades",
            Self::Tipologia => "Tipologia",
            Self::FonteCurva => "Fonte Curva",
        }
    }
}

/// Which raw column, if any, holds each logical field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMapping {
    columns: [Option<String>; 6],
}

impl FieldMapping {
    pub(crate) fn from_array(columns: [Option<String>; 6]) -> Self {
        Self { columns }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.columns[field as usize].as_deref()
    }

    /// Every column claimed by a field, in vocabulary order.
    pub fn mapped_columns(&self) -> impl Iterator<Item = (Field, &str)> {
        Field::ALL
            .into_iter()
            .filter_map(move |f| self.get(f).map(|c| (f, c)))
    }
}

// ---------------------------------------------------------------------------
// Working table
// ---------------------------------------------------------------------------

/// A raw column recognised as a calendar period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateColumn {
    pub name: String,
    pub position: usize,
    pub date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone)]
pub struct DatedColumn {
    pub column: DateColumn,
    pub cells: Vec<Cell>,
}

/// Descriptive columns followed by date columns in chronological order,
/// with the numeric `Unidades` column and, once computed, the `VP` column.
#[derive(Debug, Clone)]
pub struct WorkingTable {
    pub descriptive: Vec<Column>,
    pub dates: Vec<DatedColumn>,
    pub units: Vec<f64>,
    pub groups: Vec<Option<GroupKey>>,
    pub vp: Vec<Option<f64>>,
}

impl WorkingTable {
    pub fn row_count(&self) -> usize {
        self.units.len()
    }

    pub fn date_columns(&self) -> impl Iterator<Item = &DateColumn> {
        self.dates.iter().map(|d| &d.column)
    }

    /// Same table with the `VP` column replaced.
    pub fn with_vp(self, vp: Vec<Option<f64>>) -> Self {
        Self { vp, ..self }
    }
}

// ---------------------------------------------------------------------------
// Indicator results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRatio {
    pub empreendimento: String,
    pub rows: usize,
    pub unidades_total: f64,
    pub soma_up: f64,
    pub meses_com_up: usize,
    pub vp: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearIndicators {
    pub year: i32,
    pub vp: Option<f64>,
    pub total_units: f64,
    pub months: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_key_keeps_numbers_and_text_apart() {
        let number = Cell::Number(1.0).group_key();
        let text = Cell::text("1").group_key();
        assert_ne!(number, text);
        assert_eq!(number.as_ref().map(GroupKey::label), Some("1".to_string()));
        assert_eq!(text.as_ref().map(GroupKey::label), Some("1".to_string()));
        assert_eq!(Cell::Number(-0.0).group_key(), Cell::Number(0.0).group_key());
    }

    #[test]
    fn test_blank_cells_have_no_group() {
        assert_eq!(Cell::Empty.group_key(), None);
        assert_eq!(Cell::text("").group_key(), None);
        assert_eq!(Cell::Number(f64::NAN).group_key(), None);
        assert!(Cell::text(" ").group_key().is_some());
    }

    #[test]
    fn test_from_rows_names_blank_and_repeated_headers() {
        let t = RawTable::from_rows(
            vec![Cell::text("Obs"), Cell::Empty, Cell::text("Obs"), Cell::Number(46023.0)],
            vec![vec![Cell::text("a")]],
        );
        assert_eq!(t.column_names(), vec!["Obs", "Unnamed: 1", "Obs.1", "46023"]);
        assert_eq!(t.columns()[3].cells, vec![Cell::Empty]);
    }
}
