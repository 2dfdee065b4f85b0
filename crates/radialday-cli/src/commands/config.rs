//! Engine settings: snap grid, dial geometry and gesture thresholds.
//!
//! Keys are dotted paths into the TOML file, e.g. `dial.outer_radius`.
//! Values are validated before anything is written back.

use clap::Subcommand;
use radialday_core::EngineConfig;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one setting
    Get {
        /// Dotted key (e.g. "snap_interval", "dial.hit_tolerance", "gestures.long_press_ms")
        key: String,
    },
    /// Change one setting and save it
    Set {
        /// Dotted key
        key: String,
        /// Value; snap_interval accepts 5, 10, 15 or 30
        value: String,
    },
    /// Print every setting as JSON
    List,
    /// Print where the settings file lives
    Path,
    /// Restore the default grid, dial and gestures
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let value = EngineConfig::load()?
                .get(&key)
                .ok_or_else(|| format!("unknown key: {key}"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = EngineConfig::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("{key} = {}", config.get(&key).unwrap_or(value));
        }
        ConfigAction::List => {
            let config = EngineConfig::load()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Path => {
            println!("{}", EngineConfig::path()?.display());
        }
        ConfigAction::Reset => {
            EngineConfig::default().save()?;
            println!("dial settings reset to defaults");
        }
    }
    Ok(())
}
