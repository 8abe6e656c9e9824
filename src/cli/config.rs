use crate::error::Result;
use crate::settings::save_settings;

use super::{resolve_settings, status, DecodeArgs};

pub fn run(decode: &DecodeArgs, years: &[i32]) -> Result<()> {
    let settings = resolve_settings(decode, years);
    save_settings(&settings)?;
    println!("Settings saved.");
    status::print_settings(&settings);
    Ok(())
}
