pub mod columns;
pub mod config;
pub mod indicators;
pub mod status;

use clap::{Args, Parser, Subcommand};

use crate::settings::Settings;

#[derive(Parser)]
#[command(
    name = "vpup",
    version,
    about = "VP & UP indicators from Forecast spreadsheets."
)]
pub struct Cli {
    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute VP and unit totals per target year from a Forecast file.
    Indicators {
        /// Path to the Forecast workbook (.xlsx, .xls, .xlsb, .ods) or CSV export
        file: String,
        #[command(flatten)]
        decode: DecodeArgs,
        /// Target year (repeatable; default from settings: 2026 and 2027)
        #[arg(long = "year")]
        years: Vec<i32>,
        /// Also show VP per project (Empreendimento)
        #[arg(long)]
        projects: bool,
        /// Also show the full working table
        #[arg(long)]
        full: bool,
        /// Print the report as JSON instead of tables
        #[arg(long, conflicts_with_all = ["projects", "full"])]
        json: bool,
    },
    /// Show how every column of a Forecast file is classified.
    Columns {
        /// Path to the Forecast workbook or CSV export
        file: String,
        #[command(flatten)]
        decode: DecodeArgs,
    },
    /// Update saved settings and print them.
    Config {
        #[command(flatten)]
        decode: DecodeArgs,
        /// Target year (repeatable; replaces the saved list)
        #[arg(long = "year")]
        years: Vec<i32>,
    },
    /// Show the active settings and where they are stored.
    Status,
}

/// Overrides for how a Forecast file is read.
#[derive(Args, Debug, Default, Clone)]
pub struct DecodeArgs {
    /// Worksheet name (default: Forecast)
    #[arg(long)]
    pub sheet: Option<String>,
    /// Zero-based row holding the column headers (default: 2)
    #[arg(long = "header-row")]
    pub header_row: Option<usize>,
    /// Zero-based position of the unit-count column (default: 9)
    #[arg(long = "unit-column")]
    pub unit_column: Option<usize>,
    /// Field delimiter for CSV input (default: ,)
    #[arg(long)]
    pub delimiter: Option<char>,
}

impl DecodeArgs {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(sheet) = &self.sheet {
            settings.sheet_name = sheet.clone();
        }
        if let Some(row) = self.header_row {
            settings.header_row = row;
        }
        if let Some(col) = self.unit_column {
            settings.unit_column = col;
        }
        if let Some(d) = self.delimiter {
            settings.csv_delimiter = d;
        }
    }
}

pub(crate) fn resolve_settings(decode: &DecodeArgs, years: &[i32]) -> Settings {
    let mut settings = crate::settings::load_settings();
    decode.apply(&mut settings);
    if !years.is_empty() {
        settings.target_years = years.to_vec();
    }
    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_args_override_settings() {
        let mut s = Settings::default();
        let args = DecodeArgs {
            sheet: Some("Base".to_string()),
            header_row: None,
            unit_column: Some(3),
            delimiter: Some(';'),
        };
        args.apply(&mut s);
        assert_eq!(s.sheet_name, "Base");
        assert_eq!(s.header_row, 2);
        assert_eq!(s.unit_column, 3);
        assert_eq!(s.csv_delimiter, ';');
    }

    #[test]
    fn test_cli_parses_repeated_years() {
        let cli = Cli::parse_from(["vpup", "indicators", "f.csv", "--year", "2026", "--year", "2030", "-vv"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Indicators { file, years, .. } => {
                assert_eq!(file, "f.csv");
                assert_eq!(years, vec![2026, 2030]);
            }
            _ => panic!("expected indicators"),
        }
    }
}
