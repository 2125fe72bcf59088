use std::path::PathBuf;

use chrono::Utc;
use clap::Args;
use focusplan_core::EnergyCurveModel;

use super::snapshot::{load_preferences, parse_date};

#[derive(Args)]
pub struct EnergyArgs {
    /// Day to chart (YYYY-MM-DD); defaults to today on the local clock
    #[arg(long)]
    date: Option<String>,
    /// Preferences file with the energy peaks
    #[arg(long)]
    prefs: Option<PathBuf>,
}

pub fn run(args: EnergyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let prefs = load_preferences(args.prefs.as_deref())?;
    let date = match args.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => prefs.local_date(Utc::now()),
    };
    let model = EnergyCurveModel::from_preferences(&prefs);
    print!("{}", model.render_ascii_chart(date, 6, 22));
    Ok(())
}
