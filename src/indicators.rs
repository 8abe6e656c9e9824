use std::collections::HashMap;

use chrono::Datelike;
use tracing::trace;

use crate::models::{DatedColumn, GroupKey, GroupRatio, WorkingTable, YearIndicators};

// ---------------------------------------------------------------------------
// Utilization ratio core
// ---------------------------------------------------------------------------

/// Positive absorption of a set of rows over a set of month columns.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Utilization {
    soma_up: f64,
    meses_com_up: usize,
    unidades_total: f64,
}

impl Utilization {
    fn measure(table: &WorkingTable, rows: &[usize], columns: &[&DatedColumn]) -> Self {
        let mut soma_up = 0.0;
        let mut meses_com_up = 0;
        for col in columns {
            let mut active = false;
            for &r in rows {
                let v = col.cells[r].as_number();
                if v > 0.0 {
                    soma_up += v;
                    active = true;
                }
            }
            if active {
                meses_com_up += 1;
            }
        }
        let unidades_total = rows.iter().map(|&r| table.units[r]).sum();
        Self {
            soma_up,
            meses_com_up,
            unidades_total,
        }
    }

    /// `unidades_total * meses_com_up`, when both are positive.
    fn denominator(&self) -> Option<f64> {
        if self.meses_com_up > 0 && self.unidades_total > 0.0 {
            Some(self.unidades_total * self.meses_com_up as f64)
        } else {
            None
        }
    }

    fn ratio(&self) -> Option<f64> {
        self.denominator().map(|d| self.soma_up / d)
    }
}

/// Row indices per `Empreendimento`, in order of first appearance.
/// Rows without a group key are left out.
fn partition(table: &WorkingTable) -> Vec<(&GroupKey, Vec<usize>)> {
    let mut index: HashMap<&GroupKey, usize> = HashMap::new();
    let mut groups: Vec<(&GroupKey, Vec<usize>)> = Vec::new();
    for (row, key) in table.groups.iter().enumerate() {
        let Some(key) = key.as_ref() else { continue };
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push((key, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(row);
    }
    groups
}

// ---------------------------------------------------------------------------
// Per-group VP
// ---------------------------------------------------------------------------

fn measure_groups(table: &WorkingTable) -> Vec<(&GroupKey, Vec<usize>, Utilization)> {
    let columns: Vec<&DatedColumn> = table.dates.iter().collect();
    partition(table)
        .into_iter()
        .map(|(key, rows)| {
            let u = Utilization::measure(table, &rows, &columns);
            trace!(group = ?key, soma_up = u.soma_up, meses = u.meses_com_up, "group utilization");
            (key, rows, u)
        })
        .collect()
}

/// VP breakdown for every group over all date columns.
pub fn group_ratios(table: &WorkingTable) -> Vec<GroupRatio> {
    measure_groups(table)
        .into_iter()
        .map(|(key, rows, u)| GroupRatio {
            empreendimento: key.label(),
            rows: rows.len(),
            unidades_total: u.unidades_total,
            soma_up: u.soma_up,
            meses_com_up: u.meses_com_up,
            vp: u.ratio(),
        })
        .collect()
}

/// Per-row VP: each row gets the ratio of its group.
pub fn vp_by_group(table: &WorkingTable) -> Vec<Option<f64>> {
    let by_group: HashMap<&GroupKey, Option<f64>> = measure_groups(table)
        .into_iter()
        .map(|(key, _, u)| (key, u.ratio()))
        .collect();
    table
        .groups
        .iter()
        .map(|key| key.as_ref().and_then(|k| by_group.get(k).copied().flatten()))
        .collect()
}

// ---------------------------------------------------------------------------
// Per-year indicators
// ---------------------------------------------------------------------------

/// Pooled VP and raw unit total over the date columns of one calendar year.
pub fn year_indicators(table: &WorkingTable, year: i32) -> YearIndicators {
    let columns: Vec<&DatedColumn> = table
        .dates
        .iter()
        .filter(|d| d.column.date.year() == year)
        .collect();

    if columns.is_empty() {
        return YearIndicators {
            year,
            vp: None,
            total_units: 0.0,
            months: 0,
        };
    }

    let total_units: f64 = columns
        .iter()
        .flat_map(|c| c.cells.iter())
        .map(|cell| cell.as_number())
        .sum();

    let mut soma_up = 0.0;
    let mut denominator = 0.0;
    for (_, rows) in partition(table) {
        let u = Utilization::measure(table, &rows, &columns);
        if let Some(d) = u.denominator() {
            soma_up += u.soma_up;
            denominator += d;
        }
    }

    YearIndicators {
        year,
        vp: if denominator == 0.0 {
            None
        } else {
            Some(soma_up / denominator)
        },
        total_units,
        months: columns.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cell, DateColumn};
    use chrono::NaiveDate;

    fn col(name: &str, y: i32, m: u32, values: &[f64]) -> DatedColumn {
        DatedColumn {
            column: DateColumn {
                name: name.to_string(),
                position: 0,
                date: NaiveDate::from_ymd_opt(y, m, 1).unwrap(),
            },
            cells: values.iter().map(|v| Cell::Number(*v)).collect(),
        }
    }

    fn working(groups: &[&str], units: &[f64], dates: Vec<DatedColumn>) -> WorkingTable {
        WorkingTable {
            descriptive: Vec::new(),
            dates,
            units: units.to_vec(),
            groups: groups
                .iter()
                .map(|g| Cell::text(*g).group_key())
                .collect(),
            vp: vec![None; units.len()],
        }
    }

    #[test]
    fn test_vp_single_row_group() {
        let t = working(
            &["Alpha"],
            &[100.0],
            vec![col("jan/26", 2026, 1, &[10.0]), col("fev/26", 2026, 2, &[0.0])],
        );
        let g = &group_ratios(&t)[0];
        assert_eq!(g.meses_com_up, 1);
        assert_eq!(g.soma_up, 10.0);
        assert!((g.vp.unwrap() - 0.10).abs() < 1e-12);
        assert_eq!(vp_by_group(&t), vec![g.vp]);
    }

    #[test]
    fn test_vp_zero_units_is_undefined() {
        let t = working(&["Alpha"], &[0.0], vec![col("jan/26", 2026, 1, &[10.0])]);
        assert_eq!(vp_by_group(&t), vec![None]);
    }

    #[test]
    fn test_vp_no_active_month_is_undefined() {
        let t = working(&["Alpha"], &[50.0], vec![col("jan/26", 2026, 1, &[-3.0])]);
        let g = &group_ratios(&t)[0];
        assert_eq!(g.meses_com_up, 0);
        assert_eq!(g.vp, None);
    }

    #[test]
    fn test_vp_broadcast_and_negative_cells_ignored() {
        // Alpha: rows 0 and 2, units 60 + 40, months jan (5 + 5) and mar (10), feb -4 skipped
        let t = working(
            &["Alpha", "Beta", "Alpha", ""],
            &[60.0, 10.0, 40.0, 99.0],
            vec![
                col("jan/26", 2026, 1, &[5.0, 0.0, 5.0, 7.0]),
                col("fev/26", 2026, 2, &[-4.0, 2.0, 0.0, 7.0]),
                col("mar/26", 2026, 3, &[0.0, 0.0, 10.0, 7.0]),
            ],
        );
        let vp = vp_by_group(&t);
        let alpha = 20.0 / (100.0 * 2.0);
        let beta = 2.0 / (10.0 * 1.0);
        assert!((vp[0].unwrap() - alpha).abs() < 1e-12);
        assert!((vp[2].unwrap() - alpha).abs() < 1e-12);
        assert!((vp[1].unwrap() - beta).abs() < 1e-12);
        assert_eq!(vp[3], None);
        assert_eq!(group_ratios(&t).len(), 2);
    }

    #[test]
    fn test_numeric_and_text_keys_are_separate_groups() {
        let mut t = working(&["", ""], &[100.0, 0.0], vec![col("jan/26", 2026, 1, &[10.0, 0.0])]);
        t.groups = vec![Cell::Number(1.0).group_key(), Cell::text("1").group_key()];

        let groups = group_ratios(&t);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].empreendimento, "1");
        assert_eq!(groups[1].empreendimento, "1");
        assert_eq!(vp_by_group(&t), vec![Some(0.1), None]);
    }

    #[test]
    fn test_text_cells_coerced_in_month_columns() {
        let mut c = col("jan/26", 2026, 1, &[0.0, 0.0]);
        c.cells = vec![Cell::text("8"), Cell::text("n/a")];
        let t = working(&["Alpha", "Alpha"], &[10.0, 10.0], vec![c]);
        let g = &group_ratios(&t)[0];
        assert_eq!(g.soma_up, 8.0);
        assert!((g.vp.unwrap() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_year_without_columns() {
        let t = working(
            &["Alpha"],
            &[10.0],
            vec![
                col("dez/25", 2025, 12, &[1.0]),
                col("jan/26", 2026, 1, &[1.0]),
                col("fev/26", 2026, 2, &[1.0]),
            ],
        );
        let y = year_indicators(&t, 2027);
        assert_eq!(y.vp, None);
        assert_eq!(y.total_units, 0.0);
        assert_eq!(y.months, 0);
    }

    #[test]
    fn test_year_total_is_raw_sum_over_all_rows() {
        let t = working(
            &["Alpha", ""],
            &[10.0, 0.0],
            vec![
                col("dez/25", 2025, 12, &[100.0, 100.0]),
                col("jan/26", 2026, 1, &[3.0, 4.0]),
                col("fev/26", 2026, 2, &[-1.0, 2.5]),
            ],
        );
        let y = year_indicators(&t, 2026);
        assert_eq!(y.total_units, 8.5);
        assert_eq!(y.months, 2);
        // Alpha only: soma_up 3, one active month, 10 units
        assert!((y.vp.unwrap() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_year_ratio_is_pooled_not_averaged() {
        let t = working(
            &["Alpha", "Beta", "Gamma"],
            &[100.0, 10.0, 0.0],
            vec![
                col("jan/27", 2027, 1, &[10.0, 5.0, 50.0]),
                col("fev/27", 2027, 2, &[0.0, 5.0, 50.0]),
            ],
        );
        let y = year_indicators(&t, 2027);
        // Alpha: 10 / (100 * 1); Beta: 10 / (10 * 2); Gamma has no units and is excluded
        let pooled = (10.0 + 10.0) / (100.0 + 20.0);
        assert!((y.vp.unwrap() - pooled).abs() < 1e-12);
        assert_eq!(y.total_units, 120.0);
    }

    #[test]
    fn test_year_with_zero_pooled_denominator() {
        let t = working(&["Alpha"], &[0.0], vec![col("jan/26", 2026, 1, &[4.0])]);
        let y = year_indicators(&t, 2026);
        assert_eq!(y.vp, None);
        assert_eq!(y.total_units, 4.0);
    }

    #[test]
    fn test_duplicate_month_columns_count_separately() {
        let t = working(
            &["Alpha"],
            &[10.0],
            vec![col("jan/26", 2026, 1, &[2.0]), col("01/2026", 2026, 1, &[3.0])],
        );
        let g = &group_ratios(&t)[0];
        assert_eq!(g.meses_com_up, 2);
        assert!((g.vp.unwrap() - 5.0 / 20.0).abs() < 1e-12);
    }
}
