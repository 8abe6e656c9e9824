use crate::error::Result;
use crate::settings::{load_settings, settings_path, Settings};

pub fn run() -> Result<()> {
    let path = settings_path();
    let source = if path.exists() { "" } else { " (not found, using defaults)" };
    println!("Settings:     {}{source}", path.display());
    print_settings(&load_settings());
    Ok(())
}

pub(crate) fn print_settings(settings: &Settings) {
    let years: Vec<String> = settings.target_years.iter().map(i32::to_string).collect();
    println!("Sheet:        {}", settings.sheet_name);
    println!("Header row:   {}", settings.header_row);
    println!("Unit column:  {}", settings.unit_column);
    println!("Years:        {}", years.join(", "));
    println!("Delimiter:    {:?}", settings.csv_delimiter);
}
