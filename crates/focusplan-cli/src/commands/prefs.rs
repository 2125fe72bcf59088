use std::path::PathBuf;

use clap::Subcommand;
use focusplan_core::preferences::{apply_patch, preset, preset_names};

use super::snapshot::{load_preferences, preferences_path};

#[derive(Subcommand)]
pub enum PrefsAction {
    /// Print all preferences as TOML
    Show,
    /// Get a preference value
    Get {
        /// Dot-separated key (e.g. "weights.urgency", "work_start")
        key: String,
    },
    /// Set a preference value
    Set {
        /// Dot-separated key
        key: String,
        /// New value
        value: String,
    },
    /// Apply a built-in preset
    Preset {
        /// Preset name (see `prefs presets`)
        name: String,
    },
    /// List built-in presets
    Presets,
}

pub fn run(action: PrefsAction, file: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let file = file.as_deref();
    match action {
        PrefsAction::Show => {
            let prefs = load_preferences(file)?;
            print!("{}", toml::to_string_pretty(&prefs)?);
        }
        PrefsAction::Get { key } => {
            let prefs = load_preferences(file)?;
            match prefs.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        PrefsAction::Set { key, value } => {
            let prefs = load_preferences(file)?.with_value(&key, &value)?;
            prefs.validate()?;
            prefs.save(&preferences_path(file)?)?;
            println!("ok");
        }
        PrefsAction::Preset { name } => {
            let patches = preset(&name)?;
            let prefs = apply_patch(&load_preferences(file)?, patches)?;
            prefs.save(&preferences_path(file)?)?;
            println!("applied preset {name}");
        }
        PrefsAction::Presets => {
            for name in preset_names() {
                println!("{name}");
            }
        }
    }
    Ok(())
}
